//! NNTP command builders and response parsers

/// Parse NNTP response line into code and message
///
/// The code is the first three characters, which must be ASCII digits;
/// `None` otherwise.
pub fn parse_response_line(line: &str) -> Option<(u16, String)> {
    let bytes = line.as_bytes();
    if bytes.len() < 3
        || !bytes[0].is_ascii_digit()
        || !bytes[1].is_ascii_digit()
        || !bytes[2].is_ascii_digit()
    {
        return None;
    }

    // Safe to slice since we verified ASCII
    let code = line[0..3].parse::<u16>().unwrap_or_default();

    let message = line.get(4..).unwrap_or_default().to_string();

    Some((code, message))
}

/// Build POST command (RFC 3977 §6.3.1)
///
/// Server responds with 340 if ready to accept. After 340 the client sends
/// the article terminated by [`END_OF_ARTICLE`].
pub fn post() -> &'static str {
    "POST\r\n"
}

/// Build QUIT command
pub fn quit() -> &'static str {
    "QUIT\r\n"
}

/// Line terminator appended to articles that do not already end in one
pub const CRLF: &str = "\r\n";

/// Terminating dot line of a multi-line block
pub const END_OF_ARTICLE: &str = ".\r\n";
