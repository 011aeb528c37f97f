//! Header denylist policy
//!
//! The filter is a gate, not a parser: it scans the header block of an
//! [`Article`] and rejects it when any header name matches a denylisted
//! name case-insensitively. The body is never inspected.

use crate::article::Article;
use crate::error::{RelayError, Result};
use serde::Deserialize;
use std::path::Path;
use tracing::debug;

/// On-disk policy document
///
/// Only `blocked_headers` is recognized; other fields are ignored.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct PolicyConfig {
    /// Header names that must not appear in a relayed article
    #[serde(default)]
    pub blocked_headers: Option<Vec<String>>,
}

/// Set of forbidden header names
#[derive(Debug, Default, Clone)]
pub struct Denylist {
    /// Original entries, in file order
    entries: Vec<String>,
    /// Lowercased `"<entry>:"` prefixes
    prefixes: Vec<String>,
}

impl Denylist {
    /// Build a denylist from header names
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let entries: Vec<String> = names.into_iter().map(Into::into).collect();
        let prefixes = entries
            .iter()
            .map(|name| format!("{}:", name.to_lowercase()))
            .collect();
        Self { entries, prefixes }
    }

    /// Load the denylist from a JSON policy file
    ///
    /// A missing file yields an empty denylist. Any other read error, or a
    /// document that does not decode, is a hard failure.
    ///
    /// # Errors
    ///
    /// - [`RelayError::ConfigRead`] - file exists but cannot be read
    /// - [`RelayError::ConfigParse`] - file is not a valid policy document
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let data = match std::fs::read(path) {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No policy file at {}, denylist is empty", path.display());
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(RelayError::ConfigRead {
                    path: path.display().to_string(),
                    source,
                });
            }
        };

        let policy: PolicyConfig =
            serde_json::from_slice(&data).map_err(|source| RelayError::ConfigParse {
                path: path.display().to_string(),
                source,
            })?;

        let denylist = Self::new(policy.blocked_headers.unwrap_or_default());
        debug!(
            "Loaded {} blocked header(s) from {}",
            denylist.len(),
            path.display()
        );
        Ok(denylist)
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when nothing is blocked
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries as configured
    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    /// Check an article against the denylist
    ///
    /// Stops at the first offending header.
    ///
    /// # Errors
    ///
    /// [`RelayError::BlockedHeader`] with the header name as it is written in
    /// the article (the text before its first colon).
    pub fn check(&self, article: &Article) -> Result<()> {
        if self.is_empty() {
            return Ok(());
        }

        for line in article.header_lines() {
            let lower = line.to_lowercase();
            if self.prefixes.iter().any(|prefix| lower.starts_with(prefix)) {
                let name = line.split(':').next().unwrap_or_default();
                debug!("Rejecting article: blocked header {}", name);
                return Err(RelayError::BlockedHeader(name.to_string()));
            }
        }

        Ok(())
    }
}
