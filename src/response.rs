//! NNTP response lines and status codes

/// One NNTP response line
///
/// `raw` keeps the line exactly as received (including CRLF) so it can be
/// echoed or attached to a diagnostic. `code` is `None` when the line does
/// not start with three ASCII digits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NntpResponse {
    /// 3-digit NNTP response code
    pub code: Option<u16>,
    /// Text after the code
    pub message: String,
    /// Line as received
    pub raw: String,
}

impl NntpResponse {
    /// Parse a response line; never fails
    pub fn from_line(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let line = raw.trim_end_matches(['\r', '\n']);
        let (code, message) = match crate::commands::parse_response_line(line) {
            Some((code, message)) => (Some(code), message),
            None => (None, line.to_string()),
        };
        Self { code, message, raw }
    }

    /// Whether the status code equals `code`
    pub fn is(&self, code: u16) -> bool {
        self.code == Some(code)
    }
}

/// NNTP response codes used when posting (RFC 3977)
pub mod codes {
    /// Article posted successfully (RFC 3977 Section 6.3.1)
    pub const ARTICLE_POSTED: u16 = 240;
    /// Send article to be posted
    pub const SEND_ARTICLE: u16 = 340;
    /// Posting not permitted (RFC 3977 Section 6.3.1)
    pub const POSTING_NOT_PERMITTED: u16 = 440;
    /// Posting failed (RFC 3977 Section 6.3.1)
    pub const POSTING_FAILED: u16 = 441;
}
