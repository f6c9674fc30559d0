use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{types::Json, FromRow};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Hiring-funnel position of one application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    Pending,
    InterviewSet,
    Passed,
    FailedShortlist,
    FailedInterview,
}

impl ApplicationStatus {
    pub const ALL: [ApplicationStatus; 5] = [
        ApplicationStatus::Pending,
        ApplicationStatus::InterviewSet,
        ApplicationStatus::Passed,
        ApplicationStatus::FailedShortlist,
        ApplicationStatus::FailedInterview,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "pending",
            ApplicationStatus::InterviewSet => "interview_set",
            ApplicationStatus::Passed => "passed",
            ApplicationStatus::FailedShortlist => "failed_shortlist",
            ApplicationStatus::FailedInterview => "failed_interview",
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            ApplicationStatus::Passed
                | ApplicationStatus::FailedShortlist
                | ApplicationStatus::FailedInterview
        )
    }

    pub fn is_failure(self) -> bool {
        matches!(
            self,
            ApplicationStatus::FailedShortlist | ApplicationStatus::FailedInterview
        )
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApplicationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ApplicationStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| format!("unknown application status '{}'", s))
    }
}

/// One candidate's submission against one job posting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Application {
    pub id: Uuid,
    pub job_id: Uuid,
    pub candidate_id: Uuid,
    pub status: ApplicationStatus,
    /// Requirement name to storage path.
    #[serde(default)]
    pub uploaded_docs: BTreeMap<String, String>,
    pub submitted_at: DateTime<Utc>,
    pub verified: bool,
    #[serde(default)]
    pub candidate_name: Option<String>,
}

/// Insert payload for the `applications` table. Status is always `pending`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewApplication {
    pub job_id: Uuid,
    pub candidate_id: Uuid,
    pub candidate_name: Option<String>,
    pub uploaded_docs: BTreeMap<String, String>,
    pub verified: bool,
    pub submitted_at: DateTime<Utc>,
}

#[derive(Debug, FromRow)]
pub struct ApplicationRecord {
    pub id: Uuid,
    pub job_id: Uuid,
    pub candidate_id: Uuid,
    pub status: String,
    pub uploaded_docs: Option<Json<BTreeMap<String, String>>>,
    pub submitted_at: DateTime<Utc>,
    pub verified: bool,
    pub candidate_name: Option<String>,
}

impl TryFrom<ApplicationRecord> for Application {
    type Error = crate::error::Error;

    fn try_from(row: ApplicationRecord) -> Result<Self, Self::Error> {
        let status = row
            .status
            .parse()
            .map_err(crate::error::Error::Internal)?;
        Ok(Self {
            id: row.id,
            job_id: row.job_id,
            candidate_id: row.candidate_id,
            status,
            uploaded_docs: row.uploaded_docs.map(|d| d.0).unwrap_or_default(),
            submitted_at: row.submitted_at,
            verified: row.verified,
            candidate_name: row.candidate_name,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_through_its_wire_name() {
        for status in ApplicationStatus::ALL {
            assert_eq!(status.as_str().parse::<ApplicationStatus>(), Ok(status));
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(json, format!("\"{}\"", status.as_str()));
        }
    }

    #[test]
    fn unknown_status_is_rejected() {
        assert!("hired".parse::<ApplicationStatus>().is_err());
        assert!(serde_json::from_str::<ApplicationStatus>("\"archived\"").is_err());
    }

    #[test]
    fn exactly_three_statuses_are_terminal() {
        let terminal: Vec<_> = ApplicationStatus::ALL
            .into_iter()
            .filter(|s| s.is_terminal())
            .collect();
        assert_eq!(
            terminal,
            vec![
                ApplicationStatus::Passed,
                ApplicationStatus::FailedShortlist,
                ApplicationStatus::FailedInterview
            ]
        );
    }

    #[test]
    fn record_with_bad_status_fails_conversion() {
        let row = ApplicationRecord {
            id: Uuid::new_v4(),
            job_id: Uuid::new_v4(),
            candidate_id: Uuid::new_v4(),
            status: "archived".into(),
            uploaded_docs: None,
            submitted_at: Utc::now(),
            verified: true,
            candidate_name: None,
        };
        assert!(Application::try_from(row).is_err());
    }
}
