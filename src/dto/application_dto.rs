use bytes::Bytes;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::error::{Error, Result};
use crate::models::{Application, ApplicationStatus};
use crate::utils::crypto::LedgerReceipt;

/// Multipart field prefix for a requirement's file: `doc:<requirement name>`.
pub const DOCUMENT_FIELD_PREFIX: &str = "doc:";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusUpdatePayload {
    pub status: ApplicationStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ByJobsQuery {
    /// Comma-separated job ids.
    #[serde(default)]
    pub ids: String,
}

impl ByJobsQuery {
    pub fn job_ids(&self) -> Result<Vec<Uuid>> {
        self.ids
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| {
                Uuid::parse_str(s).map_err(|_| Error::BadRequest(format!("Invalid job id '{}'", s)))
            })
            .collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct DocumentLinkPayload {
    #[validate(length(min = 1))]
    pub requirement: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentQuery {
    pub path: String,
    pub expires: i64,
    pub signature: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct IdentityVerifyPayload {
    /// JPEG bytes, base64 encoded.
    #[validate(length(min = 1))]
    pub image_base64: String,
    pub user_name: Option<String>,
}

/// One file pulled out of a submission form.
#[derive(Debug, Clone)]
pub struct UploadedDocument {
    pub requirement: String,
    pub file_name: String,
    pub data: Bytes,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentReceipt {
    pub requirement: String,
    pub path: String,
    pub sha256: String,
    pub ledger: LedgerReceipt,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmissionReceipt {
    pub application: Application,
    pub documents: Vec<DocumentReceipt>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn job_ids_parse_from_comma_list() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let query = ByJobsQuery {
            ids: format!("{}, {},", a, b),
        };
        assert_eq!(query.job_ids().unwrap(), vec![a, b]);

        let empty = ByJobsQuery { ids: String::new() };
        assert!(empty.job_ids().unwrap().is_empty());

        let bad = ByJobsQuery { ids: "nope".into() };
        assert!(bad.job_ids().is_err());
    }
}
