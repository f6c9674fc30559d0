use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use reqwest::Client;
use serde_json::{json, Value as JsonValue};
use std::time::Duration;

use super::{IdentityMatch, IdentityVerifier};
use crate::error::{Error, Result};

const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";

#[derive(Clone)]
pub struct GeminiVerifier {
    client: Client,
    api_key: String,
    model: String,
    endpoint: String,
}

impl GeminiVerifier {
    pub fn new(api_key: String, model: String, client: Client) -> Self {
        Self {
            client,
            api_key,
            model,
            endpoint: DEFAULT_ENDPOINT.to_string(),
        }
    }

    pub fn with_endpoint(mut self, endpoint: &str) -> Self {
        self.endpoint = endpoint.trim_end_matches('/').to_string();
        self
    }

    fn request_body(image_jpeg: &[u8], user_name: &str) -> JsonValue {
        let prompt = format!(
            "Verify if this user image matches the identity of \"{}\". This is a simulated identity \
             check for a professional job platform based in Cambodia. Respond with a boolean for \
             match and a short reason.",
            user_name
        );
        json!({
            "contents": [{
                "parts": [
                    { "text": prompt },
                    { "inline_data": { "mime_type": "image/jpeg", "data": BASE64.encode(image_jpeg) } }
                ]
            }],
            "generationConfig": {
                "responseMimeType": "application/json",
                "responseSchema": {
                    "type": "OBJECT",
                    "properties": {
                        "isMatch": { "type": "BOOLEAN" },
                        "confidence": { "type": "NUMBER" },
                        "reason": { "type": "STRING" }
                    },
                    "required": ["isMatch", "reason"]
                }
            }
        })
    }

    async fn generate(&self, image_jpeg: &[u8], user_name: &str) -> Result<IdentityMatch> {
        let url = format!("{}/models/{}:generateContent", self.endpoint, self.model);
        let res = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&Self::request_body(image_jpeg, user_name))
            .timeout(Duration::from_secs(30))
            .send()
            .await?;

        if !res.status().is_success() {
            let status = res.status();
            let text = res.text().await.unwrap_or_default();
            return Err(Error::Backend {
                status: status.as_u16(),
                message: format!("Gemini API error: {}", text),
            });
        }

        let body: JsonValue = res.json().await?;
        parse_response(&body)
    }
}

/// Pulls the JSON answer out of the first candidate's text part.
pub(crate) fn parse_response(body: &JsonValue) -> Result<IdentityMatch> {
    let text = body
        .get("candidates")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("content"))
        .and_then(|c| c.get("parts"))
        .and_then(|p| p.get(0))
        .and_then(|p| p.get("text"))
        .and_then(|t| t.as_str())
        .unwrap_or("{}");
    Ok(serde_json::from_str(text)?)
}

#[async_trait]
impl IdentityVerifier for GeminiVerifier {
    async fn verify(&self, image_jpeg: &[u8], user_name: &str) -> IdentityMatch {
        match self.generate(image_jpeg, user_name).await {
            Ok(result) => {
                tracing::info!(user_name, is_match = result.is_match, "identity check completed");
                result
            }
            Err(e) => {
                tracing::error!(error = %e, "identity verification error");
                IdentityMatch::busy()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_the_first_candidate_text() {
        let body = json!({
            "candidates": [{
                "content": { "parts": [{ "text": "{\"isMatch\":true,\"confidence\":0.93,\"reason\":\"Face matches\"}" }] }
            }]
        });
        let parsed = parse_response(&body).unwrap();
        assert!(parsed.is_match);
        assert_eq!(parsed.reason, "Face matches");
    }

    #[test]
    fn missing_text_is_an_error() {
        assert!(parse_response(&json!({ "candidates": [] })).is_err());
    }

    #[test]
    fn request_embeds_the_image_as_base64() {
        let body = GeminiVerifier::request_body(b"jpeg", "Dara");
        assert_eq!(body["contents"][0]["parts"][1]["inline_data"]["data"], "anBlZw==");
        assert!(body["contents"][0]["parts"][0]["text"]
            .as_str()
            .unwrap()
            .contains("\"Dara\""));
    }

    #[tokio::test]
    async fn unreachable_oracle_reports_busy() {
        let verifier = GeminiVerifier::new("key".into(), "model".into(), Client::new())
            .with_endpoint("http://127.0.0.1:9");
        assert_eq!(verifier.verify(b"jpeg", "Dara").await, IdentityMatch::busy());
    }
}
