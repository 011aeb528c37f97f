//! NNTP posting session over a SOCKS5 tunnel

mod connection;
mod io;
mod posting;
mod state;

pub use state::SessionState;

use std::time::Duration;
use tokio::io::BufReader;
use tokio::net::TcpStream;
use tracing::{debug, trace};

/// One proxied NNTP session that posts a single article
///
/// # Example
///
/// ```no_run
/// use newsrelay::{Article, NntpPoster, RelayConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = RelayConfig::default();
/// let poster = NntpPoster::connect(&config).await?;
///
/// let article = Article::new("Newsgroups: alt.test\r\nSubject: hi\r\n\r\nbody\r\n");
/// let result = poster.post(&article).await?;
/// print!("{}", result.raw);
/// # Ok(())
/// # }
/// ```
#[must_use]
pub struct NntpPoster {
    /// Tunnelled stream (both reader and writer)
    stream: BufReader<TcpStream>,
    /// Position in the POST exchange
    state: SessionState,
    /// Limit on each response line read
    read_timeout: Option<Duration>,
}

impl NntpPoster {
    /// Current session state
    pub fn state(&self) -> SessionState {
        self.state
    }

    fn transition(&mut self, next: SessionState) {
        trace!("Session state {:?} -> {:?}", self.state, next);
        self.state = next;
    }
}

impl Drop for NntpPoster {
    fn drop(&mut self) {
        debug!("NntpPoster dropped in state {:?}", self.state);
    }
}
