//! Posting session state

/// Where a posting session is in the POST exchange
///
/// `Connected → Greeted → PostRequested → Sending → AwaitingResult → Done`,
/// with `Aborted` reachable from any non-terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Proxied stream established, greeting not yet read
    Connected,
    /// Greeting line received
    Greeted,
    /// POST sent, waiting for 340
    PostRequested,
    /// Writing article bytes and the end marker
    Sending,
    /// Article sent, waiting for the result line
    AwaitingResult,
    /// Server answered 240
    Done,
    /// Session failed; nothing more is sent
    Aborted,
}
