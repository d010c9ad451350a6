//! Document loading and identity.
//!
//! A [`Document`] is the uploaded byte stream plus its SHA-256 content hash.
//! The bytes live only for the session; the hash is the stable identifier the
//! [`crate::progress::ProgressStore`] keys on, so the same file re-opened
//! next week resumes at the same page regardless of filename or location.
//!
//! Input can be a local path or an HTTP(S) URL. Either way the `%PDF` magic
//! is validated before the bytes are accepted, so callers get a meaningful
//! error instead of a pdfium failure deep inside rendering.

use crate::error::CompanionError;
use sha2::{Digest, Sha256};
use std::path::PathBuf;
use tracing::{debug, info};

/// An opened PDF: raw bytes, content hash, and where it came from.
#[derive(Clone)]
pub struct Document {
    bytes: Vec<u8>,
    hash: String,
    origin: String,
}

// Manual impl: deriving Debug would print the whole byte buffer.
impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Document")
            .field("origin", &self.origin)
            .field("hash", &self.hash)
            .field("len", &self.bytes.len())
            .finish()
    }
}

impl Document {
    /// Wrap raw PDF bytes, validating the `%PDF` magic and computing the hash.
    ///
    /// `origin` is a display label (path or URL) used in error messages.
    pub fn from_bytes(bytes: Vec<u8>, origin: impl Into<String>) -> Result<Self, CompanionError> {
        let origin = origin.into();

        if bytes.len() < 4 || &bytes[..4] != b"%PDF" {
            let mut magic = [0u8; 4];
            let n = bytes.len().min(4);
            magic[..n].copy_from_slice(&bytes[..n]);
            return Err(CompanionError::NotAPdf { origin, magic });
        }

        let hash = content_hash(&bytes);
        debug!("Opened document '{}' ({} bytes, {})", origin, bytes.len(), hash);

        Ok(Self { bytes, hash, origin })
    }

    /// Open a document from a local path or an HTTP(S) URL.
    pub async fn open(input: &str, timeout_secs: u64) -> Result<Self, CompanionError> {
        if is_url(input) {
            let bytes = download(input, timeout_secs).await?;
            Self::from_bytes(bytes, input)
        } else {
            let bytes = read_local(input)?;
            Self::from_bytes(bytes, input)
        }
    }

    /// Raw PDF bytes.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// SHA-256 hex digest of the raw bytes; the document's stable identifier.
    pub fn content_hash(&self) -> &str {
        &self.hash
    }

    /// The path or URL this document was opened from.
    pub fn origin(&self) -> &str {
        &self.origin
    }
}

/// SHA-256 hex digest of a byte slice.
///
/// Deterministic by construction: identical bytes always yield the identical
/// digest, which is what makes it usable as a progress key.
pub fn content_hash(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

/// Check if the input string looks like a URL.
pub fn is_url(input: &str) -> bool {
    input.starts_with("http://") || input.starts_with("https://")
}

/// Read a local file, mapping the usual io failures to library errors.
fn read_local(path_str: &str) -> Result<Vec<u8>, CompanionError> {
    let path = PathBuf::from(path_str);

    match std::fs::read(&path) {
        Ok(bytes) => Ok(bytes),
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            Err(CompanionError::PermissionDenied { path })
        }
        Err(_) => Err(CompanionError::FileNotFound { path }),
    }
}

/// Download a URL into memory.
async fn download(url: &str, timeout_secs: u64) -> Result<Vec<u8>, CompanionError> {
    info!("Downloading PDF from: {}", url);

    let client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| CompanionError::DownloadFailed {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

    let response = client.get(url).send().await.map_err(|e| {
        if e.is_timeout() {
            CompanionError::DownloadTimeout {
                url: url.to_string(),
                secs: timeout_secs,
            }
        } else {
            CompanionError::DownloadFailed {
                url: url.to_string(),
                reason: e.to_string(),
            }
        }
    })?;

    if !response.status().is_success() {
        return Err(CompanionError::DownloadFailed {
            url: url.to_string(),
            reason: format!("HTTP {}", response.status()),
        });
    }

    let bytes = response
        .bytes()
        .await
        .map_err(|e| CompanionError::DownloadFailed {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

    info!("Downloaded {} bytes", bytes.len());
    Ok(bytes.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_url() {
        assert!(is_url("https://example.com/doc.pdf"));
        assert!(is_url("http://example.com/doc.pdf"));
        assert!(!is_url("/tmp/doc.pdf"));
        assert!(!is_url("doc.pdf"));
        assert!(!is_url(""));
    }

    #[test]
    fn content_hash_is_deterministic() {
        let a = content_hash(b"identical bytes");
        let b = content_hash(b"identical bytes");
        assert_eq!(a, b);
        assert_ne!(a, content_hash(b"different bytes"));
    }

    #[test]
    fn content_hash_known_vector() {
        // SHA-256 of the empty string.
        assert_eq!(
            content_hash(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn from_bytes_accepts_pdf_magic() {
        let doc = Document::from_bytes(b"%PDF-1.7 rest".to_vec(), "book.pdf").unwrap();
        assert_eq!(doc.origin(), "book.pdf");
        assert_eq!(doc.content_hash().len(), 64);
    }

    #[test]
    fn from_bytes_rejects_non_pdf() {
        let err = Document::from_bytes(b"hello world".to_vec(), "notes.txt").unwrap_err();
        assert!(matches!(err, CompanionError::NotAPdf { .. }));
    }

    #[test]
    fn from_bytes_rejects_short_input() {
        let err = Document::from_bytes(b"%P".to_vec(), "tiny").unwrap_err();
        assert!(matches!(err, CompanionError::NotAPdf { .. }));
    }
}
