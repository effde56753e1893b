//! Blocking HTTP access for dataset sources.

use std::collections::HashMap;
use std::time::Duration;

use ureq::Agent;

use crate::error::FetchErrorKind;

/// Error bodies longer than this are truncated in messages.
const MAX_ERROR_BODY: usize = 512;

const USER_AGENT: &str = concat!("nodeweb/", env!("CARGO_PKG_VERSION"));

/// Blocking `GET` returning the response body.
///
/// Implementations must be shareable across the fetch thread pool.
pub trait HttpFetch: Send + Sync {
    /// Fetch `url`.
    ///
    /// # Errors
    ///
    /// Returns a [`FetchErrorKind`] for transport failures and non-success
    /// status codes.
    fn get(&self, url: &str) -> Result<Vec<u8>, FetchErrorKind>;
}

/// Create an HTTP agent with a global per-request timeout.
///
/// Status codes are returned as responses, not errors, so the caller can
/// report the error body.
#[must_use]
pub fn create_agent(timeout: Duration) -> Agent {
    Agent::config_builder()
        .timeout_global(Some(timeout))
        .http_status_as_error(false)
        .build()
        .into()
}

/// [`HttpFetch`] backed by a `ureq` agent.
pub struct UreqFetch {
    agent: Agent,
}

impl UreqFetch {
    /// Create a fetcher with the given request timeout.
    #[must_use]
    pub fn new(timeout: Duration) -> Self {
        Self {
            agent: create_agent(timeout),
        }
    }
}

impl HttpFetch for UreqFetch {
    fn get(&self, url: &str) -> Result<Vec<u8>, FetchErrorKind> {
        let response = self
            .agent
            .get(url)
            .header("User-Agent", USER_AGENT)
            .header("Accept", "application/json")
            .call()
            .map_err(|e| FetchErrorKind::Http(e.to_string()))?;

        let status = response.status().as_u16();
        let mut body = response.into_body();

        if status >= 400 {
            let mut text = body
                .read_to_string()
                .unwrap_or_else(|_| String::from("(unable to read error body)"));
            if text.len() > MAX_ERROR_BODY {
                let mut cut = MAX_ERROR_BODY;
                while !text.is_char_boundary(cut) {
                    cut -= 1;
                }
                text.truncate(cut);
            }
            return Err(FetchErrorKind::Status { status, body: text });
        }

        body.read_to_vec()
            .map_err(|e| FetchErrorKind::Io(e.to_string()))
    }
}

/// In-memory [`HttpFetch`] serving canned responses by URL.
///
/// Unknown URLs answer `404`.
#[derive(Debug, Default, Clone)]
pub struct MemoryFetch {
    responses: HashMap<String, Result<Vec<u8>, u16>>,
}

impl MemoryFetch {
    /// Serve `body` for `url`.
    #[must_use]
    pub fn with_body(mut self, url: &str, body: impl Into<Vec<u8>>) -> Self {
        self.responses.insert(url.to_owned(), Ok(body.into()));
        self
    }

    /// Answer `url` with an error status.
    #[must_use]
    pub fn with_status(mut self, url: &str, status: u16) -> Self {
        self.responses.insert(url.to_owned(), Err(status));
        self
    }
}

impl HttpFetch for MemoryFetch {
    fn get(&self, url: &str) -> Result<Vec<u8>, FetchErrorKind> {
        match self.responses.get(url) {
            Some(Ok(body)) => Ok(body.clone()),
            Some(Err(status)) => Err(FetchErrorKind::Status {
                status: *status,
                body: String::new(),
            }),
            None => Err(FetchErrorKind::Status {
                status: 404,
                body: format!("no canned response for {url}"),
            }),
        }
    }
}
