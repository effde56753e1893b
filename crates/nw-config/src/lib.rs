//! Configuration management for nodeweb.
//!
//! Parses `nodeweb.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! Dataset URLs support environment variable expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Expanded fields:
//! - `data.releases_url`
//! - `data.banners_url`
//! - `data.nvm_url`

mod expand;

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override content source directory.
    pub content_dir: Option<PathBuf>,
    /// Override manifest output directory.
    pub output_dir: Option<PathBuf>,
    /// Override cache enabled flag.
    pub cache_enabled: Option<bool>,
    /// Override external dataset fetching.
    pub data_enabled: Option<bool>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "nodeweb.toml";

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Content source directories.
    pub content: ContentConfig,
    /// URL roots for the content domains.
    pub routes: RoutesConfig,
    /// Supported locales and message bundles.
    pub i18n: I18nConfig,
    /// YAML navigation descriptors.
    pub navigation: NavigationConfig,
    /// Hand-authored redirect map.
    pub redirects: RedirectsConfig,
    /// External dataset sources.
    pub data: DataConfig,
    /// Build output.
    pub build: BuildConfig,

    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

/// Content source configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ContentConfig {
    /// Root directory scanned for Markdown/MDX content.
    pub dir: PathBuf,
    /// Blog content root. Files under it follow the dated filename convention.
    ///
    /// Defaults to `<dir>/blog`; use [`ContentConfig::blog_dir`] for the effective path.
    #[serde(rename = "blog_dir")]
    pub blog_dir_override: Option<PathBuf>,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("content"),
            blog_dir_override: None,
        }
    }
}

impl ContentConfig {
    /// Effective blog content root.
    pub fn blog_dir(&self) -> PathBuf {
        self.blog_dir_override
            .clone()
            .unwrap_or_else(|| self.dir.join("blog"))
    }
}

/// URL roots for blog, learn and API pages.
///
/// Roots start with `/` and carry no trailing slash.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RoutesConfig {
    /// Blog URL root.
    pub blog: String,
    /// Learn URL root.
    pub learn: String,
    /// API documentation URL root.
    pub api: String,
    /// Landing page name inside each API version.
    pub api_landing: String,
}

impl Default for RoutesConfig {
    fn default() -> Self {
        Self {
            blog: "/blog".to_owned(),
            learn: "/learn".to_owned(),
            api: "/api".to_owned(),
            api_landing: "documentation".to_owned(),
        }
    }
}

/// Localization configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct I18nConfig {
    /// Default locale code.
    pub default: String,
    /// Ordered list of supported locale codes.
    pub locales: Vec<String>,
    /// Directory holding one `<code>.json` bundle per locale.
    pub messages_dir: PathBuf,
}

impl Default for I18nConfig {
    fn default() -> Self {
        Self {
            default: "en".to_owned(),
            locales: vec!["en".to_owned()],
            messages_dir: PathBuf::from("src/i18n/locales"),
        }
    }
}

/// Navigation descriptor configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct NavigationConfig {
    /// Learn navigation descriptor.
    pub learn: PathBuf,
    /// API navigation descriptor, applied once per documented version.
    pub api_types: PathBuf,
    /// Reject descriptor items that match no content record.
    pub strict: bool,
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            learn: PathBuf::from("src/data/learn.yaml"),
            api_types: PathBuf::from("src/data/apiTypes.yaml"),
            strict: false,
        }
    }
}

/// Static redirect configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct RedirectsConfig {
    /// JSON object mapping old paths to new paths.
    pub file: PathBuf,
}

impl Default for RedirectsConfig {
    fn default() -> Self {
        Self {
            file: PathBuf::from("src/data/redirects.json"),
        }
    }
}

/// External dataset configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// Whether datasets are fetched during the build.
    pub enabled: bool,
    /// Release schedule JSON.
    pub releases_url: String,
    /// Promotional banner JSON.
    pub banners_url: String,
    /// Latest nvm release JSON.
    pub nvm_url: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            releases_url: "https://raw.githubusercontent.com/nodejs/Release/main/schedule.json"
                .to_owned(),
            banners_url: "https://nodejs.org/site.json".to_owned(),
            nvm_url: "https://api.github.com/repos/nvm-sh/nvm/releases/latest".to_owned(),
            timeout_secs: 30,
        }
    }
}

/// Build output configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Directory the manifest is written to.
    pub output_dir: PathBuf,
    /// Whether the dataset cache is used.
    pub cache_enabled: bool,
    /// Project data directory (`.nodeweb/`).
    #[serde(skip)]
    pub project_dir: PathBuf,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("public"),
            cache_enabled: true,
            project_dir: PathBuf::from(".nodeweb"),
        }
    }
}

impl BuildConfig {
    /// Cache directory path (.nodeweb/cache/).
    #[must_use]
    pub fn cache_dir(&self) -> PathBuf {
        self.project_dir.join("cache")
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`data.nvm_url`").
        field: String,
        /// Error message (e.g., "${`NVM_URL`} not set").
        message: String,
    },
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

/// Require a URL field to use http:// or https:// scheme.
fn require_http_url(url: &str, field: &str) -> Result<(), ConfigError> {
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(ConfigError::Validation(format!(
            "{field} must start with http:// or https://"
        )));
    }
    Ok(())
}

/// Require a route root to be absolute (leading `/`).
fn require_route_root(value: &str, field: &str) -> Result<(), ConfigError> {
    if !value.starts_with('/') {
        return Err(ConfigError::Validation(format!(
            "{field} must start with '/'"
        )));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `nodeweb.toml` in current directory and parents.
    ///
    /// CLI settings are applied after loading and path resolution, allowing CLI
    /// arguments to take precedence over config file values. Validation runs
    /// last, so overrides are validated too.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, parsing fails,
    /// or the final configuration is invalid.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default_with_cwd()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }
        config.validate()?;

        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(content_dir) = &settings.content_dir {
            // An explicit blog root is moved into the overridden content tree.
            if let Some(blog_dir) = &mut self.content.blog_dir_override {
                let blog_name = blog_dir
                    .file_name()
                    .map_or_else(|| PathBuf::from("blog"), PathBuf::from);
                *blog_dir = content_dir.join(blog_name);
            }
            self.content.dir.clone_from(content_dir);
        }
        if let Some(output_dir) = &settings.output_dir {
            self.build.output_dir.clone_from(output_dir);
        }
        if let Some(cache_enabled) = settings.cache_enabled {
            self.build.cache_enabled = cache_enabled;
        }
        if let Some(data_enabled) = settings.data_enabled {
            self.data.enabled = data_enabled;
        }
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Create default config with paths relative to current working directory.
    fn default_with_cwd() -> Self {
        let cwd = std::env::current_dir().unwrap_or_default();
        Self::default_with_base(&cwd)
    }

    /// Create default config with paths relative to given base directory.
    fn default_with_base(base: &Path) -> Self {
        let mut config = Self {
            content: ContentConfig::default(),
            routes: RoutesConfig::default(),
            i18n: I18nConfig::default(),
            navigation: NavigationConfig::default(),
            redirects: RedirectsConfig::default(),
            data: DataConfig::default(),
            build: BuildConfig::default(),
            config_path: None,
        };
        config.resolve_paths(base);
        config
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        // Expand environment variables before validation
        config.expand_env_vars()?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve_paths(config_dir);
        config.normalize_routes();
        config.config_path = Some(path.to_path_buf());

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// Called automatically by [`Config::load`].
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_routes()?;
        self.validate_i18n()?;
        self.validate_data()?;
        Ok(())
    }

    fn validate_routes(&self) -> Result<(), ConfigError> {
        require_route_root(&self.routes.blog, "routes.blog")?;
        require_route_root(&self.routes.learn, "routes.learn")?;
        require_route_root(&self.routes.api, "routes.api")?;
        require_non_empty(&self.routes.api_landing, "routes.api_landing")?;
        Ok(())
    }

    fn validate_i18n(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.i18n.default, "i18n.default")?;
        if self.i18n.locales.is_empty() {
            return Err(ConfigError::Validation(
                "i18n.locales cannot be empty".to_owned(),
            ));
        }
        for (i, code) in self.i18n.locales.iter().enumerate() {
            require_non_empty(code, "i18n.locales")?;
            if self.i18n.locales[..i].contains(code) {
                return Err(ConfigError::Validation(format!(
                    "i18n.locales contains duplicate locale '{code}'"
                )));
            }
        }
        if !self.i18n.locales.contains(&self.i18n.default) {
            return Err(ConfigError::Validation(format!(
                "i18n.default '{}' must be listed in i18n.locales",
                self.i18n.default
            )));
        }
        Ok(())
    }

    fn validate_data(&self) -> Result<(), ConfigError> {
        if !self.data.enabled {
            return Ok(());
        }
        require_http_url(&self.data.releases_url, "data.releases_url")?;
        require_http_url(&self.data.banners_url, "data.banners_url")?;
        require_http_url(&self.data.nvm_url, "data.nvm_url")?;
        if self.data.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "data.timeout_secs must be greater than 0".to_owned(),
            ));
        }
        Ok(())
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        self.data.releases_url = expand::expand_env(&self.data.releases_url, "data.releases_url")?;
        self.data.banners_url = expand::expand_env(&self.data.banners_url, "data.banners_url")?;
        self.data.nvm_url = expand::expand_env(&self.data.nvm_url, "data.nvm_url")?;
        Ok(())
    }

    /// Resolve relative paths against the config directory.
    ///
    /// Absolute paths are kept as-is.
    fn resolve_paths(&mut self, config_dir: &Path) {
        let resolve = |path: &mut PathBuf| {
            if path.is_relative() {
                *path = config_dir.join(&*path);
            }
        };

        resolve(&mut self.content.dir);
        if let Some(blog_dir) = &mut self.content.blog_dir_override {
            resolve(blog_dir);
        }
        resolve(&mut self.i18n.messages_dir);
        resolve(&mut self.navigation.learn);
        resolve(&mut self.navigation.api_types);
        resolve(&mut self.redirects.file);
        resolve(&mut self.build.output_dir);
        self.build.project_dir = config_dir.join(".nodeweb");
    }

    /// Strip trailing slashes from route roots.
    fn normalize_routes(&mut self) {
        for root in [
            &mut self.routes.blog,
            &mut self.routes.learn,
            &mut self.routes.api,
        ] {
            while root.len() > 1 && root.ends_with('/') {
                root.pop();
            }
        }
    }
}
