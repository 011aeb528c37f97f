//! Relay error types

use thiserror::Error;

/// Errors raised while relaying an article
///
/// Every variant is terminal for the run. Errors raised deep inside the
/// session are wrapped in [`RelayError::Context`] naming the step that failed;
/// use [`RelayError::root`] to match on the underlying cause.
#[derive(Error, Debug)]
pub enum RelayError {
    /// IO error during network or process operations
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Policy file exists but could not be read
    #[error("error opening config file {path}: {source}")]
    ConfigRead {
        /// Path of the policy file
        path: String,
        /// Underlying read error
        #[source]
        source: std::io::Error,
    },

    /// Policy file is not valid JSON for the expected shape
    #[error("error parsing config file {path}: {source}")]
    ConfigParse {
        /// Path of the policy file
        path: String,
        /// Underlying decode error
        #[source]
        source: serde_json::Error,
    },

    /// Invalid `host:port` value or other bad setting
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// No armored block in the input
    #[error("no encrypted payload found in input")]
    NoPayload,

    /// Decryption backend failed
    #[error("decryption failed: {0}")]
    Decrypt(String),

    /// Article carries a header on the denylist
    #[error("article contains blocked header: {0}")]
    BlockedHeader(String),

    /// Article exceeds the configured ceiling
    #[error("article size exceeds {} KB", .limit / 1024)]
    ArticleTooLarge {
        /// Article length in bytes
        size: usize,
        /// Configured ceiling in bytes
        limit: usize,
    },

    /// SOCKS5 negotiation failed
    #[error("SOCKS5 proxy error: {0}")]
    Proxy(String),

    /// Server answered POST with something other than 340
    #[error("server did not accept POST command: {0}")]
    PostNotAccepted(String),

    /// Server answered the article with something other than 240
    #[error("article transfer failed: {0}")]
    TransferFailed(String),

    /// Connect or read timed out
    #[error("Connection timeout")]
    Timeout,

    /// Peer closed the stream before a full line arrived
    #[error("Connection closed")]
    ConnectionClosed,

    /// Error annotated with the step where it happened
    #[error("{context}: {source}")]
    Context {
        /// Step description
        context: &'static str,
        /// Wrapped error
        #[source]
        source: Box<RelayError>,
    },
}

impl RelayError {
    /// Innermost error, skipping any [`RelayError::Context`] layers
    pub fn root(&self) -> &RelayError {
        match self {
            RelayError::Context { source, .. } => source.root(),
            other => other,
        }
    }
}

/// Attach step context to a fallible result
pub trait ResultExt<T> {
    /// Wrap the error (if any) with `context`
    fn context(self, context: &'static str) -> Result<T>;
}

impl<T, E: Into<RelayError>> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, context: &'static str) -> Result<T> {
        self.map_err(|e| RelayError::Context {
            context,
            source: Box::new(e.into()),
        })
    }
}

/// Result type alias using RelayError
pub type Result<T> = std::result::Result<T, RelayError>;
