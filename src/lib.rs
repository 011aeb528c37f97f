#![doc = include_str!("../README.md")]

/// Raw article text and header/body views
pub mod article;
mod client;
/// NNTP command builders and response parsers
pub mod commands;
mod config;
mod error;
/// Header denylist policy
pub mod filter;
/// Encrypted payload extraction and decryption backends
pub mod payload;
mod relay;
mod response;
/// SOCKS5 client handshake
pub mod socks;

pub use article::Article;
pub use client::{NntpPoster, SessionState};
pub use config::{
    DEFAULT_MAX_ARTICLE_SIZE, DEFAULT_POLICY_FILE, DEFAULT_PROXY, DEFAULT_SERVER, Endpoint,
    InputMode, RelayConfig,
};
pub use error::{RelayError, Result, ResultExt};
pub use filter::{Denylist, PolicyConfig};
pub use payload::{Decryptor, GpgDecryptor, extract_armored};
pub use relay::{Relay, read_stdin};
pub use response::{NntpResponse, codes};
