//! Raw article text
//!
//! An article is an RFC 5322-style message: a header block, a blank line,
//! then the body. The relay forwards the bytes exactly as received, so this
//! type only offers read-only views over them.

use std::borrow::Cow;

/// Article bytes as they will be sent to the server
///
/// # Examples
///
/// ```
/// use newsrelay::Article;
///
/// let article = Article::new("From: a@example.com\r\nSubject: hi\r\n\r\nbody\r\n");
/// let headers: Vec<_> = article.header_lines().collect();
/// assert_eq!(headers, ["From: a@example.com\r", "Subject: hi\r"]);
/// assert!(article.ends_with_crlf());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Article {
    raw: Vec<u8>,
}

/// End of the header block: an empty line, or one holding only CR
fn is_blank(line: &[u8]) -> bool {
    line.is_empty() || line == b"\r"
}

impl Article {
    /// Wrap raw article bytes
    pub fn new(raw: impl Into<Vec<u8>>) -> Self {
        Self { raw: raw.into() }
    }

    /// Length in bytes
    pub fn len(&self) -> usize {
        self.raw.len()
    }

    /// True for a zero-length article
    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// The unmodified bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.raw
    }

    /// Whether the last two bytes are already CRLF
    pub fn ends_with_crlf(&self) -> bool {
        self.raw.ends_with(b"\r\n")
    }

    fn lines(&self) -> impl Iterator<Item = &[u8]> {
        self.raw.split(|&b| b == b'\n')
    }

    /// Lines before the first blank line
    ///
    /// Lines are split on LF, so a CRLF-terminated header keeps its trailing
    /// CR. Invalid UTF-8 is replaced lossily in the returned view only.
    pub fn header_lines(&self) -> impl Iterator<Item = Cow<'_, str>> {
        self.lines()
            .take_while(|line| !is_blank(line))
            .map(String::from_utf8_lossy)
    }

    /// Lines after the first blank line
    pub fn body_lines(&self) -> impl Iterator<Item = Cow<'_, str>> {
        self.lines()
            .skip_while(|line| !is_blank(line))
            .skip(1)
            .map(String::from_utf8_lossy)
    }
}

impl From<String> for Article {
    fn from(text: String) -> Self {
        Self::new(text)
    }
}

impl From<Vec<u8>> for Article {
    fn from(raw: Vec<u8>) -> Self {
        Self::new(raw)
    }
}
