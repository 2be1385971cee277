//! Where the daemon document comes from.
//!
//! The document is fetched once per request and never cached. [`HttpSource`]
//! is the production source; [`StaticSource`] serves a fixed body and is what
//! tests and embedders use.

use std::io::Read;
use std::sync::Arc;

/// The published daemon document.
pub const DEFAULT_URL: &str = "https://daemon.wallykroeker.com/daemon.md";

/// Why the document could not be fetched.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// The upstream answered with a non-success status.
    #[error("Failed to fetch daemon.md: {0}")]
    Status(u16),
    /// The upstream could not be reached.
    #[error("{0}")]
    Transport(String),
    #[error("failed to read daemon.md: {0}")]
    Io(#[from] std::io::Error),
}

/// The fetched body was not UTF-8 text.
#[derive(Debug, thiserror::Error)]
#[error("document is not valid UTF-8: {0}")]
pub struct DecodeError(#[from] std::string::FromUtf8Error);

/// A provider of the raw document.
///
/// Implementations are shared between connection threads.
pub trait DocumentSource: Send + Sync {
    fn fetch(&self) -> Result<Vec<u8>, FetchError>;
}

impl<T: DocumentSource + ?Sized> DocumentSource for Arc<T> {
    fn fetch(&self) -> Result<Vec<u8>, FetchError> {
        (**self).fetch()
    }
}

/// Decodes a fetched body as text.
pub fn decode(bytes: Vec<u8>) -> Result<String, DecodeError> {
    Ok(String::from_utf8(bytes)?)
}

/// Fetches the document with a blocking GET.
///
/// No retries and no timeouts beyond the client's defaults.
pub struct HttpSource {
    agent: ureq::Agent,
    url: String,
}

impl HttpSource {
    pub fn new(url: impl Into<String>) -> Self {
        HttpSource {
            agent: ureq::AgentBuilder::new().build(),
            url: url.into(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl DocumentSource for HttpSource {
    fn fetch(&self) -> Result<Vec<u8>, FetchError> {
        let response = self.agent.get(&self.url).call().map_err(|e| match e {
            ureq::Error::Status(code, _) => FetchError::Status(code),
            ureq::Error::Transport(transport) => FetchError::Transport(transport.to_string()),
        })?;
        let mut body = Vec::new();
        response.into_reader().read_to_end(&mut body)?;
        Ok(body)
    }
}

/// Serves the same bytes on every fetch.
#[derive(Debug, Clone)]
pub struct StaticSource {
    body: Vec<u8>,
}

impl StaticSource {
    pub fn new(body: impl Into<Vec<u8>>) -> Self {
        StaticSource { body: body.into() }
    }
}

impl DocumentSource for StaticSource {
    fn fetch(&self) -> Result<Vec<u8>, FetchError> {
        Ok(self.body.clone())
    }
}
