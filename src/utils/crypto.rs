use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::{DateTime, Utc};
use rand::{rngs::OsRng, Rng};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::{Error, Result};

pub fn hash_password(plain: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| Error::Internal(format!("Failed to hash password: {}", e)))
}

pub fn verify_password(plain: &str, hashed: &str) -> Result<bool> {
    let parsed_hash = PasswordHash::new(hashed)
        .map_err(|e| Error::Internal(format!("Stored password hash is malformed: {}", e)))?;
    Ok(Argon2::default()
        .verify_password(plain.as_bytes(), &parsed_hash)
        .is_ok())
}

/// Lowercase hex SHA-256 of a document's bytes.
pub fn hash_document(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerReceipt {
    pub verified: bool,
    pub timestamp: DateTime<Utc>,
    pub transaction_id: String,
}

/// Simulated ledger lookup for a document hash. Always succeeds.
pub fn verify_on_chain(hash: &str) -> LedgerReceipt {
    let nonce: u64 = rand::thread_rng().gen();
    tracing::debug!(hash, "simulated ledger lookup");
    LedgerReceipt {
        verified: true,
        timestamp: Utc::now(),
        transaction_id: format!("0x{:x}", nonce),
    }
}
