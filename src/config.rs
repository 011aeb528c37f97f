//! Relay configuration

use crate::error::{RelayError, Result};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Default NNTP server
pub const DEFAULT_SERVER: &str = "news.tcpreset.net:119";

/// Default SOCKS5 proxy (local Tor daemon)
pub const DEFAULT_PROXY: &str = "127.0.0.1:9050";

/// Default article size ceiling (64 KiB)
pub const DEFAULT_MAX_ARTICLE_SIZE: usize = 64 * 1024;

/// Default policy file, relative to the working directory
pub const DEFAULT_POLICY_FILE: &str = "m2n.json";

/// TCP connect plus SOCKS5 negotiation timeout in seconds
const CONNECT_TIMEOUT_SECS: u64 = 120;

/// A `host:port` network address
///
/// The host is kept as text so hostnames can be resolved by the proxy
/// rather than locally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    /// Hostname or literal IP address (without brackets)
    pub host: String,
    /// TCP port
    pub port: u16,
}

impl Endpoint {
    /// Create an endpoint from its parts
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }
}

impl FromStr for Endpoint {
    type Err = RelayError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || RelayError::InvalidConfig(format!("invalid address '{}'", s));

        let (host, port) = if let Some(rest) = s.strip_prefix('[') {
            // [v6]:port
            let (host, port) = rest.split_once("]:").ok_or_else(invalid)?;
            (host, port)
        } else {
            s.rsplit_once(':').ok_or_else(invalid)?
        };

        if host.is_empty() {
            return Err(invalid());
        }
        let port = port.parse::<u16>().map_err(|_| invalid())?;

        Ok(Self::new(host, port))
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.host.contains(':') {
            write!(f, "[{}]:{}", self.host, self.port)
        } else {
            write!(f, "{}:{}", self.host, self.port)
        }
    }
}

/// What standard input carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputMode {
    /// Already-decrypted article text
    #[default]
    Plain,
    /// Mail containing an ASCII-armored PGP block to extract and decrypt
    Encrypted,
}

/// Settings for one relay run
///
/// # Example
///
/// ```
/// use newsrelay::{Endpoint, RelayConfig};
///
/// let config = RelayConfig::default()
///     .with_server(Endpoint::new("news.example.com", 119))
///     .with_max_article_size(32 * 1024);
/// assert_eq!(config.proxy.to_string(), "127.0.0.1:9050");
/// ```
#[must_use]
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// Upstream NNTP server
    pub server: Endpoint,
    /// SOCKS5 proxy used to reach the server
    pub proxy: Endpoint,
    /// Largest article accepted, in bytes
    pub max_article_size: usize,
    /// Interpretation of standard input
    pub input: InputMode,
    /// Limit on dialing the proxy and completing the SOCKS5 handshake
    pub connect_timeout: Option<Duration>,
    /// Limit on each response line read; unset by default, so a slow server
    /// reply over the proxy is still waited for
    pub read_timeout: Option<Duration>,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            server: Endpoint::new("news.tcpreset.net", 119),
            proxy: Endpoint::new("127.0.0.1", 9050),
            max_article_size: DEFAULT_MAX_ARTICLE_SIZE,
            input: InputMode::Plain,
            connect_timeout: Some(Duration::from_secs(CONNECT_TIMEOUT_SECS)),
            read_timeout: None,
        }
    }
}

impl RelayConfig {
    /// Set the upstream NNTP server
    pub fn with_server(mut self, server: Endpoint) -> Self {
        self.server = server;
        self
    }

    /// Set the SOCKS5 proxy
    pub fn with_proxy(mut self, proxy: Endpoint) -> Self {
        self.proxy = proxy;
        self
    }

    /// Set the article size ceiling
    pub fn with_max_article_size(mut self, max: usize) -> Self {
        self.max_article_size = max;
        self
    }

    /// Set the input mode
    pub fn with_input(mut self, input: InputMode) -> Self {
        self.input = input;
        self
    }

    /// Set connect and read timeouts (`None` waits forever)
    pub fn with_timeouts(mut self, connect: Option<Duration>, read: Option<Duration>) -> Self {
        self.connect_timeout = connect;
        self.read_timeout = read;
        self
    }
}
