//! Connection management for the posting session
//!
//! Dials the SOCKS5 proxy, tunnels to the NNTP server and reads the
//! greeting.

use crate::config::{Endpoint, RelayConfig};
use crate::error::{Result, ResultExt};
use crate::socks;
use tokio::io::BufReader;
use tokio::net::TcpStream;
use tracing::debug;

use super::NntpPoster;
use super::io::with_timeout;
use super::state::SessionState;

/// Open a TCP stream to `proxy` and negotiate a tunnel to `target`
async fn dial(proxy: &Endpoint, target: &Endpoint) -> Result<TcpStream> {
    let mut stream = TcpStream::connect((proxy.host.as_str(), proxy.port)).await?;

    // Small request/response exchange: send commands immediately
    stream.set_nodelay(true)?;

    socks::handshake(&mut stream, target).await?;
    Ok(stream)
}

impl NntpPoster {
    /// Connect to the NNTP server through the SOCKS5 proxy and read the greeting
    ///
    /// The greeting is logged but not interpreted; servers that refuse
    /// posting say so again in response to POST.
    ///
    /// # Errors
    ///
    /// - [`RelayError::Io`](crate::RelayError::Io) - proxy unreachable
    /// - [`RelayError::Proxy`](crate::RelayError::Proxy) - SOCKS5 negotiation failed
    /// - [`RelayError::Timeout`](crate::RelayError::Timeout) - connect or greeting timed out
    /// - [`RelayError::ConnectionClosed`](crate::RelayError::ConnectionClosed) - no greeting line
    ///
    /// Each is wrapped with the step that failed.
    pub async fn connect(config: &RelayConfig) -> Result<Self> {
        debug!(
            "Connecting to NNTP server {} via SOCKS5 proxy {}",
            config.server, config.proxy
        );

        let stream = with_timeout(config.connect_timeout, dial(&config.proxy, &config.server))
            .await
            .context("error connecting to the server through the proxy")?;

        let mut poster = Self {
            stream: BufReader::new(stream),
            state: SessionState::Connected,
            read_timeout: config.read_timeout,
        };

        let greeting = match poster.read_response().await {
            Ok(greeting) => greeting,
            Err(e) => {
                poster.transition(SessionState::Aborted);
                poster.close().await;
                return Err(e).context("error reading server greeting");
            }
        };
        debug!("Server greeting: {}", greeting.raw.trim_end());
        poster.transition(SessionState::Greeted);

        Ok(poster)
    }
}
