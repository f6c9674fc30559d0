//! Blob storage for application documents.

pub mod local;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::Path;
use std::time::Duration;
use uuid::Uuid;

use crate::error::{Error, Result};

pub use local::LocalDocumentStorage;

const ALLOWED_EXTENSIONS: [&str; 9] = ["pdf", "doc", "docx", "txt", "rtf", "jpg", "jpeg", "png", "webp"];

/// Maximum accepted size of a single uploaded document.
pub const MAX_DOCUMENT_BYTES: usize = 20 * 1024 * 1024;

#[derive(Debug, Clone, Serialize)]
pub struct SignedUrl {
    pub url: String,
    pub expires_at: DateTime<Utc>,
}

#[async_trait]
pub trait DocumentStorage: Send + Sync {
    async fn upload(&self, path: &str, data: Bytes) -> Result<()>;
    async fn download(&self, path: &str) -> Result<Bytes>;
    /// Time-limited read link for `path`.
    fn signed_url(&self, path: &str, ttl: Duration) -> Result<SignedUrl>;
    fn verify_signed(&self, path: &str, expires: i64, signature: &str) -> Result<()>;
}

/// Storage key for a candidate's upload:
/// `<candidate>/<millis>_<random>_<file name>`. Keys never repeat, even for
/// same-named files written in the same millisecond.
pub fn document_path(candidate_id: Uuid, file_name: &str, now: DateTime<Utc>) -> String {
    format!(
        "{}/{}_{}_{}",
        candidate_id,
        now.timestamp_millis(),
        Uuid::new_v4().simple(),
        sanitize_file_name(file_name)
    )
}

fn sanitize_file_name(name: &str) -> String {
    let base = Path::new(name)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("document");
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let trimmed = cleaned.trim_start_matches('.');
    if trimmed.is_empty() {
        "document".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Rejects unknown extensions and files whose leading bytes contradict the
/// extension they claim.
pub fn validate_upload(file_name: &str, data: &[u8]) -> Result<()> {
    if data.is_empty() {
        return Err(Error::BadRequest(format!("{} is empty", file_name)));
    }
    if data.len() > MAX_DOCUMENT_BYTES {
        return Err(Error::BadRequest(format!("{} exceeds the upload size limit", file_name)));
    }

    let ext = Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();

    if !ALLOWED_EXTENSIONS.contains(&ext.as_str()) {
        return Err(Error::BadRequest(format!("File type .{} is not allowed", ext)));
    }
    if ext == "pdf" && !data.starts_with(b"%PDF") {
        return Err(Error::BadRequest("Invalid PDF file content".into()));
    }
    if (ext == "jpg" || ext == "jpeg") && !data.starts_with(&[0xFF, 0xD8]) {
        return Err(Error::BadRequest("Invalid JPEG file content".into()));
    }
    if ext == "png" && !data.starts_with(&[0x89, 0x50, 0x4E, 0x47]) {
        return Err(Error::BadRequest("Invalid PNG file content".into()));
    }
    Ok(())
}

/// Rejects keys that could escape the storage root.
pub(crate) fn ensure_relative_key(path: &str) -> Result<()> {
    let suspicious = path.is_empty()
        || path.starts_with('/')
        || path.contains('\\')
        || path.split('/').any(|segment| segment == ".." || segment.is_empty());
    if suspicious {
        return Err(Error::BadRequest(format!("Invalid document path '{}'", path)));
    }
    Ok(())
}
