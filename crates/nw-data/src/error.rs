//! Dataset fetch errors.

/// Failure of a single dataset source.
///
/// Any failure aborts the whole fetch phase.
#[derive(Debug, thiserror::Error)]
#[error("dataset {source_name}: {kind}")]
pub struct FetchError {
    /// Name of the failing source.
    pub source_name: String,
    /// What went wrong.
    pub kind: FetchErrorKind,
}

impl FetchError {
    pub(crate) fn new(source_name: &str, kind: FetchErrorKind) -> Self {
        Self {
            source_name: source_name.to_owned(),
            kind,
        }
    }
}

/// Kind of dataset fetch failure.
#[derive(Debug, thiserror::Error)]
pub enum FetchErrorKind {
    /// Transport failure (DNS, TLS, timeout).
    #[error("HTTP error: {0}")]
    Http(String),
    /// Server answered with an error status.
    #[error("HTTP {status}: {body}")]
    Status {
        /// Response status code.
        status: u16,
        /// Response body, possibly truncated.
        body: String,
    },
    /// Reading the response body failed.
    #[error("I/O error: {0}")]
    Io(String),
    /// The body is not valid JSON.
    #[error("invalid JSON: {0}")]
    Json(String),
    /// The JSON does not have the expected shape.
    #[error("unexpected payload: {0}")]
    Shape(String),
    /// An offline build found no cached payload.
    #[error("no cached payload available offline")]
    NotCached,
}

impl From<serde_json::Error> for FetchErrorKind {
    fn from(e: serde_json::Error) -> Self {
        if e.is_data() {
            Self::Shape(e.to_string())
        } else {
            Self::Json(e.to_string())
        }
    }
}
