//! Selfie-versus-name identity check used before an application is sent.

pub mod gemini;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use gemini::GeminiVerifier;

pub const BUSY_REASON: &str = "Verification system busy.";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityMatch {
    pub is_match: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    pub reason: String,
}

impl IdentityMatch {
    /// Result reported whenever the oracle cannot produce an answer.
    pub fn busy() -> Self {
        Self {
            is_match: false,
            confidence: None,
            reason: BUSY_REASON.to_string(),
        }
    }
}

/// Never fails: transport and parsing problems collapse into
/// [`IdentityMatch::busy`].
#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    async fn verify(&self, image_jpeg: &[u8], user_name: &str) -> IdentityMatch;
}

/// Offline stand-in used when no API key is configured.
#[derive(Debug, Clone, Default)]
pub struct SimulatedVerifier;

#[async_trait]
impl IdentityVerifier for SimulatedVerifier {
    async fn verify(&self, image_jpeg: &[u8], user_name: &str) -> IdentityMatch {
        if image_jpeg.is_empty() || user_name.trim().is_empty() {
            return IdentityMatch {
                is_match: false,
                confidence: Some(0.0),
                reason: "No image or name provided.".to_string(),
            };
        }
        tracing::debug!(user_name, "simulated identity check");
        IdentityMatch {
            is_match: true,
            confidence: Some(0.9),
            reason: format!("Simulated check accepted the photo for {}.", user_name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_format_uses_camel_case() {
        let parsed: IdentityMatch =
            serde_json::from_str(r#"{"isMatch":true,"confidence":0.8,"reason":"ok"}"#).unwrap();
        assert!(parsed.is_match);
        assert_eq!(parsed.confidence, Some(0.8));

        let busy = serde_json::to_value(IdentityMatch::busy()).unwrap();
        assert_eq!(busy, serde_json::json!({"isMatch": false, "reason": BUSY_REASON}));
    }

    #[tokio::test]
    async fn simulated_verifier_needs_an_image() {
        let verifier = SimulatedVerifier;
        assert!(!verifier.verify(&[], "Dara").await.is_match);
        assert!(verifier.verify(&[0xFF, 0xD8, 0x00], "Dara").await.is_match);
    }
}
