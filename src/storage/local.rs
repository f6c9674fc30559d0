use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, TimeZone, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::path::PathBuf;
use std::time::Duration;
use subtle::ConstantTimeEq;
use tokio::fs;
use url::Url;

use super::{ensure_relative_key, DocumentStorage, SignedUrl};
use crate::error::{Error, Result};

type HmacSha256 = Hmac<Sha256>;

/// Stores documents on the local filesystem and hands out HMAC-signed links
/// served by `GET /api/documents`.
#[derive(Clone)]
pub struct LocalDocumentStorage {
    root: PathBuf,
    secret: Vec<u8>,
    base_url: String,
}

impl LocalDocumentStorage {
    pub fn new(root: impl Into<PathBuf>, secret: &str, base_url: &str) -> Self {
        Self {
            root: root.into(),
            secret: secret.as_bytes().to_vec(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn full_path(&self, path: &str) -> Result<PathBuf> {
        ensure_relative_key(path)?;
        Ok(self.root.join(path))
    }

    fn signature(&self, path: &str, expires: i64) -> Result<String> {
        let mut mac = HmacSha256::new_from_slice(&self.secret)
            .map_err(|e| Error::Internal(format!("Invalid signing key: {}", e)))?;
        mac.update(path.as_bytes());
        mac.update(b"\n");
        mac.update(expires.to_string().as_bytes());
        Ok(hex::encode(mac.finalize().into_bytes()))
    }

    pub fn signed_url_at(&self, path: &str, ttl: Duration, now: DateTime<Utc>) -> Result<SignedUrl> {
        ensure_relative_key(path)?;
        let ttl = chrono::Duration::from_std(ttl)
            .map_err(|e| Error::Internal(format!("Invalid link lifetime: {}", e)))?;
        let expires_at = now + ttl;
        let expires = expires_at.timestamp();
        let signature = self.signature(path, expires)?;

        let mut url = Url::parse(&format!("{}/api/documents", self.base_url))
            .map_err(|e| Error::Config(format!("Invalid PUBLIC_BASE_URL: {}", e)))?;
        url.query_pairs_mut()
            .append_pair("path", path)
            .append_pair("expires", &expires.to_string())
            .append_pair("signature", &signature);

        Ok(SignedUrl {
            url: url.to_string(),
            expires_at: Utc.timestamp_opt(expires, 0).single().unwrap_or(expires_at),
        })
    }

    pub fn verify_signed_at(
        &self,
        path: &str,
        expires: i64,
        signature: &str,
        now: DateTime<Utc>,
    ) -> Result<()> {
        if now.timestamp() > expires {
            return Err(Error::Forbidden("Document link has expired".to_string()));
        }
        let expected = self.signature(path, expires)?;
        if expected.as_bytes().ct_eq(signature.as_bytes()).into() {
            Ok(())
        } else {
            Err(Error::Forbidden("Invalid document signature".to_string()))
        }
    }
}

#[async_trait]
impl DocumentStorage for LocalDocumentStorage {
    async fn upload(&self, path: &str, data: Bytes) -> Result<()> {
        let full = self.full_path(path)?;
        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| Error::Storage(format!("Failed to create {}: {}", parent.display(), e)))?;
        }
        fs::write(&full, &data).await.map_err(|e| {
            tracing::error!(path, error = %e, "failed to write document");
            Error::Storage(format!("Failed to save file: {}", e))
        })?;
        tracing::debug!(path, bytes = data.len(), "document stored");
        Ok(())
    }

    async fn download(&self, path: &str) -> Result<Bytes> {
        let full = self.full_path(path)?;
        match fs::read(&full).await {
            Ok(data) => Ok(Bytes::from(data)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(Error::NotFound(format!("Document {} not found", path)))
            }
            Err(e) => Err(Error::Io(e)),
        }
    }

    fn signed_url(&self, path: &str, ttl: Duration) -> Result<SignedUrl> {
        self.signed_url_at(path, ttl, Utc::now())
    }

    fn verify_signed(&self, path: &str, expires: i64, signature: &str) -> Result<()> {
        self.verify_signed_at(path, expires, signature, Utc::now())
    }
}
