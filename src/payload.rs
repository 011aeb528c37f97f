//! Encrypted payload extraction and decryption
//!
//! The relay treats decryption as a capability: anything implementing
//! [`Decryptor`] can turn the armored block into article text.
//! [`GpgDecryptor`] is the stock backend and shells out to `gpg`.

use crate::error::{RelayError, Result};
use std::future::Future;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, warn};

/// First line of an ASCII-armored PGP message
pub const BEGIN_MARKER: &str = "-----BEGIN PGP MESSAGE-----";

/// Last line of an ASCII-armored PGP message
pub const END_MARKER: &str = "-----END PGP MESSAGE-----";

/// Locate the armored block in a mail message
///
/// Returns the bytes from the begin marker line through the end of the end
/// marker line, markers included. Marker lines must match exactly, apart
/// from a trailing CR. When the end marker is missing the block runs to the
/// end of the input.
///
/// # Errors
///
/// [`RelayError::NoPayload`] if no begin marker line is present.
pub fn extract_armored(input: &[u8]) -> Result<&[u8]> {
    let mut start = None;
    let mut offset = 0;

    for line in input.split_inclusive(|&b| b == b'\n') {
        let content = trim_eol(line);
        match start {
            None if content == BEGIN_MARKER.as_bytes() => start = Some(offset),
            Some(begin) if content == END_MARKER.as_bytes() => {
                return Ok(&input[begin..offset + line.len()]);
            }
            _ => {}
        }
        offset += line.len();
    }

    match start {
        Some(begin) => Ok(&input[begin..]),
        None => Err(RelayError::NoPayload),
    }
}

fn trim_eol(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}

/// Turns an encrypted blob into plaintext
///
/// Success must yield exactly the decrypted bytes, without framing.
pub trait Decryptor {
    /// Decrypt `ciphertext`
    ///
    /// # Errors
    ///
    /// [`RelayError::Decrypt`] with a diagnostic message.
    fn decrypt(&self, ciphertext: &[u8]) -> impl Future<Output = Result<Vec<u8>>> + Send;
}

/// Decrypts by running `gpg --batch --decrypt`
#[derive(Debug, Clone)]
pub struct GpgDecryptor {
    /// Program to run
    pub program: PathBuf,
    /// File holding the key passphrase, passed with loopback pinentry
    pub passphrase_file: Option<PathBuf>,
}

impl Default for GpgDecryptor {
    fn default() -> Self {
        Self {
            program: PathBuf::from("gpg"),
            passphrase_file: None,
        }
    }
}

impl GpgDecryptor {
    /// Use `program` instead of `gpg` from `PATH`
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            passphrase_file: None,
        }
    }

    /// Unlock the key with the passphrase stored in `path`
    pub fn with_passphrase_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.passphrase_file = Some(path.into());
        self
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(["--batch", "--quiet", "--no-tty"]);
        if let Some(path) = &self.passphrase_file {
            cmd.args(["--pinentry-mode", "loopback", "--passphrase-file"]);
            cmd.arg(path);
        }
        cmd.arg("--decrypt")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        cmd
    }
}

impl Decryptor for GpgDecryptor {
    async fn decrypt(&self, ciphertext: &[u8]) -> Result<Vec<u8>> {
        debug!("Running {} to decrypt payload", self.program.display());

        let mut child = self.command().spawn().map_err(|e| {
            RelayError::Decrypt(format!("cannot run {}: {}", self.program.display(), e))
        })?;

        // Feed stdin from a separate task so a chatty child cannot deadlock us
        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| RelayError::Decrypt("child stdin unavailable".to_string()))?;
        let input = ciphertext.to_vec();
        let writer = tokio::spawn(async move {
            let result = stdin.write_all(&input).await;
            drop(stdin);
            result
        });

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| RelayError::Decrypt(format!("waiting for gpg: {}", e)))?;

        if let Ok(Err(e)) = writer.await {
            debug!("gpg closed stdin early: {}", e);
        }

        let diagnostics = String::from_utf8_lossy(&output.stderr);
        let diagnostics = diagnostics.trim();

        if !output.status.success() {
            return Err(RelayError::Decrypt(if diagnostics.is_empty() {
                format!("gpg exited with {}", output.status)
            } else {
                diagnostics.to_string()
            }));
        }

        if !diagnostics.is_empty() {
            warn!("gpg: {}", diagnostics);
        }

        Ok(output.stdout)
    }
}
