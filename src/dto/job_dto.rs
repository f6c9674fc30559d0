use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::lifecycle::JobApplicantSummary;
use crate::models::{JobType, Requirement};

pub const REQUIRED_FIELDS_MESSAGE: &str =
    "Please fill in all required fields (Title, Workplace, Salary, Hours).";

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct CreateJobPayload {
    #[serde(default)]
    #[validate(length(max = 200))]
    pub title: String,
    pub company: Option<String>,
    #[serde(default)]
    pub workplace: String,
    pub job_type: Option<JobType>,
    #[serde(default)]
    pub sector: String,
    #[serde(default)]
    pub salary: String,
    #[serde(default)]
    pub working_hours: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub role_details: String,
    #[serde(default)]
    pub requirements: Vec<Requirement>,
    pub end_date: Option<NaiveDate>,
    #[validate(length(max = 40))]
    pub contact_phone: Option<String>,
}

impl CreateJobPayload {
    /// Title, workplace, salary and working hours must be non-blank.
    pub fn has_required_fields(&self) -> bool {
        [&self.title, &self.workplace, &self.salary, &self.working_hours]
            .iter()
            .all(|field| !field.trim().is_empty())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OwnedJobIdsResponse {
    pub ids: Vec<Uuid>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EmployerDashboardResponse {
    pub jobs: Vec<JobApplicantSummary>,
    pub total_applicants: usize,
    pub pending_total: usize,
}

impl From<Vec<JobApplicantSummary>> for EmployerDashboardResponse {
    fn from(jobs: Vec<JobApplicantSummary>) -> Self {
        let total_applicants = jobs.iter().map(|j| j.applicant_total).sum();
        let pending_total = jobs.iter().map(|j| j.pending_count).sum();
        Self {
            jobs,
            total_applicants,
            pending_total,
        }
    }
}
