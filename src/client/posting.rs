use crate::article::Article;
use crate::commands;
use crate::error::{RelayError, Result, ResultExt};
use crate::response::{NntpResponse, codes};
use tracing::debug;

use super::NntpPoster;
use super::state::SessionState;

impl NntpPoster {
    /// Post one article (RFC 3977 Section 6.3.1) and end the session
    ///
    /// # Two-Phase Protocol
    ///
    /// 1. Client sends POST
    /// 2. Server responds 340 to continue; anything else aborts before a
    ///    single article byte is written
    /// 3. Client sends the article verbatim, a CRLF if the article does not
    ///    already end with one, then the terminating `.` line
    /// 4. Server responds 240 on success; anything else is a failure
    ///
    /// After a 240 the client sends QUIT without waiting for the reply. The
    /// stream is shut down before this method returns, on every path.
    ///
    /// Lines starting with `.` are sent as-is; the article is not
    /// dot-stuffed.
    ///
    /// # Errors
    ///
    /// - [`RelayError::PostNotAccepted`] - POST answered with anything but 340
    /// - [`RelayError::TransferFailed`] - article answered with anything but 240
    /// - [`RelayError::ConnectionClosed`] / [`RelayError::Timeout`] /
    ///   [`RelayError::Io`] - stream failure, wrapped with the failing step
    pub async fn post(mut self, article: &Article) -> Result<NntpResponse> {
        debug!("Posting article ({} bytes)", article.len());

        let result = self.exchange(article).await;
        if let Err(e) = &result {
            debug!("Posting aborted in state {:?}: {}", self.state, e);
            self.transition(SessionState::Aborted);
        }

        self.close().await;
        result
    }

    async fn exchange(&mut self, article: &Article) -> Result<NntpResponse> {
        // Phase 1: Send POST command
        self.send_command(commands::post())
            .await
            .context("error sending POST command")?;
        self.transition(SessionState::PostRequested);

        let response = self
            .read_response()
            .await
            .context("error sending POST command")?;

        if !response.is(codes::SEND_ARTICLE) {
            if response.is(codes::POSTING_NOT_PERMITTED) {
                debug!("Server does not permit posting");
            }
            return Err(RelayError::PostNotAccepted(
                response.raw.trim_end().to_string(),
            ));
        }

        // Phase 2: Send article text exactly as given
        self.transition(SessionState::Sending);
        self.send_article(article)
            .await
            .context("error sending article")?;
        self.transition(SessionState::AwaitingResult);

        let response = self
            .read_response()
            .await
            .context("error reading server response")?;

        if !response.is(codes::ARTICLE_POSTED) {
            if response.is(codes::POSTING_FAILED) {
                debug!("Server rejected the article");
            }
            return Err(RelayError::TransferFailed(
                response.raw.trim_end().to_string(),
            ));
        }

        self.transition(SessionState::Done);
        debug!("Article posted successfully");

        // Courtesy only; the article is already accepted
        if let Err(e) = self.send_command(commands::quit()).await {
            debug!("QUIT not delivered: {}", e);
        }

        Ok(response)
    }

    async fn send_article(&mut self, article: &Article) -> Result<()> {
        self.write_raw(article.as_bytes()).await?;
        if !article.ends_with_crlf() {
            self.write_raw(commands::CRLF.as_bytes()).await?;
        }
        self.write_raw(commands::END_OF_ARTICLE.as_bytes()).await?;
        self.flush().await
    }
}
