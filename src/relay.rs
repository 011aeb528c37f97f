//! Relay pipeline
//!
//! input → (extract → decrypt) → header filter → size check → post

use crate::article::Article;
use crate::client::NntpPoster;
use crate::config::{InputMode, RelayConfig};
use crate::error::{RelayError, Result, ResultExt};
use crate::filter::Denylist;
use crate::payload::{Decryptor, extract_armored};
use crate::response::NntpResponse;
use tracing::{debug, info};

/// Sequences one relay run
///
/// # Example
///
/// ```no_run
/// use newsrelay::{Denylist, GpgDecryptor, Relay, RelayConfig};
///
/// # async fn example() -> newsrelay::Result<()> {
/// let denylist = Denylist::load("m2n.json")?;
/// let relay = Relay::new(RelayConfig::default(), denylist, GpgDecryptor::default());
///
/// let result = relay.run(b"Newsgroups: alt.test\r\n\r\nhello\r\n").await?;
/// print!("{}", result.raw);
/// # Ok(())
/// # }
/// ```
pub struct Relay<D> {
    config: RelayConfig,
    denylist: Denylist,
    decryptor: D,
}

impl<D: Decryptor> Relay<D> {
    /// Create a relay from its configuration, policy and decryption backend
    pub fn new(config: RelayConfig, denylist: Denylist, decryptor: D) -> Self {
        Self {
            config,
            denylist,
            decryptor,
        }
    }

    /// Turn raw input into an article that passed every local check
    ///
    /// No network activity happens here.
    ///
    /// # Errors
    ///
    /// - [`RelayError::NoPayload`] / [`RelayError::Decrypt`] - encrypted input mode only
    /// - [`RelayError::BlockedHeader`] - denylisted header present
    /// - [`RelayError::ArticleTooLarge`] - over the configured ceiling
    pub async fn prepare(&self, input: &[u8]) -> Result<Article> {
        let article = match self.config.input {
            InputMode::Plain => Article::new(input),
            InputMode::Encrypted => {
                let block = extract_armored(input)?;
                debug!("Found {} byte encrypted payload", block.len());
                Article::new(self.decryptor.decrypt(block).await?)
            }
        };

        self.denylist.check(&article)?;

        if article.len() > self.config.max_article_size {
            return Err(RelayError::ArticleTooLarge {
                size: article.len(),
                limit: self.config.max_article_size,
            });
        }

        Ok(article)
    }

    /// Relay `input` as one article
    ///
    /// Returns the server's final response line on success.
    ///
    /// # Errors
    ///
    /// Any error from [`Relay::prepare`], [`NntpPoster::connect`] or
    /// [`NntpPoster::post`].
    pub async fn run(&self, input: &[u8]) -> Result<NntpResponse> {
        let article = self.prepare(input).await?;
        info!(
            "Relaying {} byte article to {} via {}",
            article.len(),
            self.config.server,
            self.config.proxy
        );

        let poster = NntpPoster::connect(&self.config).await?;
        let response = poster.post(&article).await?;

        info!("Server accepted article: {}", response.raw.trim_end());
        Ok(response)
    }
}

/// Read all of standard input
pub async fn read_stdin() -> Result<Vec<u8>> {
    use tokio::io::AsyncReadExt;

    let mut input = Vec::new();
    tokio::io::stdin()
        .read_to_end(&mut input)
        .await
        .context("error reading input")?;
    Ok(input)
}
