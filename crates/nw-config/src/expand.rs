//! `${VAR}` expansion in data source URLs.
//!
//! `${VAR}` must be set; `${VAR:-default}` falls back to `default`. Bare
//! `$VAR` is left alone, so URLs containing `$` pass through unchanged.

use std::borrow::Cow;

use crate::ConfigError;

/// Name of an unset variable referenced without a default.
struct UnsetVar(String);

/// Expand `${VAR}` references in the value of config field `field`.
pub(crate) fn expand_env(value: &str, field: &str) -> Result<String, ConfigError> {
    if !value.contains("${") {
        return Ok(value.to_owned());
    }

    let lookup = |name: &str| {
        std::env::var(name)
            .map(Some)
            .map_err(|_| UnsetVar(name.to_owned()))
    };
    shellexpand::env_with_context(value, lookup)
        .map(Cow::into_owned)
        .map_err(|e| ConfigError::EnvVar {
            field: field.to_owned(),
            message: format!("${{{}}} not set", e.cause.0),
        })
}
