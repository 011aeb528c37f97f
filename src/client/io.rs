//! Low-level I/O for the posting session

use super::NntpPoster;
use crate::error::{RelayError, Result};
use crate::response::NntpResponse;
use std::future::Future;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt};
use tokio::time::timeout;
use tracing::trace;

/// Run `fut`, failing with [`RelayError::Timeout`] if `limit` elapses first
pub(super) async fn with_timeout<F, T>(limit: Option<Duration>, fut: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match limit {
        Some(limit) => timeout(limit, fut).await.map_err(|_| RelayError::Timeout)?,
        None => fut.await,
    }
}

impl NntpPoster {
    /// Send a command to the server
    pub(super) async fn send_command(&mut self, command: &str) -> Result<()> {
        trace!("Sending command: {}", command.trim());
        self.stream.get_mut().write_all(command.as_bytes()).await?;
        self.stream.get_mut().flush().await?;
        Ok(())
    }

    /// Write bytes without flushing
    pub(super) async fn write_raw(&mut self, data: &[u8]) -> Result<()> {
        self.stream.get_mut().write_all(data).await?;
        Ok(())
    }

    /// Flush buffered writes
    pub(super) async fn flush(&mut self) -> Result<()> {
        self.stream.get_mut().flush().await?;
        Ok(())
    }

    /// Read one CRLF-terminated response line
    ///
    /// A stream that ends before a full line arrives yields
    /// [`RelayError::ConnectionClosed`].
    pub(super) async fn read_response(&mut self) -> Result<NntpResponse> {
        let limit = self.read_timeout;
        let stream = &mut self.stream;

        let read_future = async move {
            let mut line_bytes = Vec::with_capacity(512);
            stream.read_until(b'\n', &mut line_bytes).await?;

            if !line_bytes.ends_with(b"\n") {
                return Err(RelayError::ConnectionClosed);
            }

            let line = String::from_utf8_lossy(&line_bytes).into_owned();
            trace!("Received: {}", line.trim_end());
            Ok(NntpResponse::from_line(line))
        };

        with_timeout(limit, read_future).await
    }

    /// Shut down the write half; the socket is released when `self` drops
    pub(super) async fn close(&mut self) {
        if let Err(e) = self.stream.get_mut().shutdown().await {
            trace!("Shutdown after session: {}", e);
        }
    }
}
