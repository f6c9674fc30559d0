use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{types::Json, FromRow};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JobType {
    #[serde(rename = "Full-time")]
    FullTime,
    #[serde(rename = "Part-time")]
    PartTime,
    #[serde(rename = "Freelance")]
    Freelance,
    #[serde(rename = "Student-friendly")]
    StudentFriendly,
}

impl JobType {
    pub const ALL: [JobType; 4] = [
        JobType::FullTime,
        JobType::PartTime,
        JobType::Freelance,
        JobType::StudentFriendly,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            JobType::FullTime => "Full-time",
            JobType::PartTime => "Part-time",
            JobType::Freelance => "Freelance",
            JobType::StudentFriendly => "Student-friendly",
        }
    }
}

impl fmt::Display for JobType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JobType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        JobType::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown job type '{}'", s))
    }
}

/// A document the employer asks candidates to upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Requirement {
    pub name: String,
    pub why: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instruction: Option<String>,
}

impl Requirement {
    pub fn new(name: &str, why: &str, instruction: Option<&str>) -> Self {
        Self {
            name: name.to_string(),
            why: why.to_string(),
            instruction: instruction.map(str::to_string),
        }
    }
}

/// Requirements pre-filled on a fresh job form.
pub fn default_requirements() -> Vec<Requirement> {
    vec![
        Requirement::new("CV / Resume", "Professional background", Some("PDF format required.")),
        Requirement::new("ID / Passport", "Identity verification", Some("Clear scan.")),
    ]
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub id: Uuid,
    pub employer_id: Uuid,
    pub title: String,
    pub company: String,
    pub workplace: String,
    pub job_type: JobType,
    pub sector: String,
    pub salary: String,
    pub working_hours: String,
    pub requirements: Vec<Requirement>,
    pub description: String,
    pub role_details: String,
    pub posted_at: DateTime<Utc>,
    pub end_date: NaiveDate,
    pub contact_email: String,
    pub contact_phone: Option<String>,
    pub created_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Job {
    pub fn is_active(&self) -> bool {
        self.deleted_at.is_none()
    }
}

/// Insert payload for the `jobs` table.
#[derive(Debug, Clone)]
pub struct NewJob {
    pub employer_id: Uuid,
    pub title: String,
    pub company: String,
    pub workplace: String,
    pub job_type: JobType,
    pub sector: String,
    pub salary: String,
    pub working_hours: String,
    pub requirements: Vec<Requirement>,
    pub description: String,
    pub role_details: String,
    pub posted_at: DateTime<Utc>,
    pub end_date: NaiveDate,
    pub contact_email: String,
    pub contact_phone: Option<String>,
}

#[derive(Debug, FromRow)]
pub struct JobRecord {
    pub id: Uuid,
    pub employer_id: Uuid,
    pub title: String,
    pub company: String,
    pub workplace: String,
    pub job_type: String,
    pub sector: String,
    pub salary: String,
    pub working_hours: String,
    pub requirements: Option<Json<Vec<Requirement>>>,
    pub description: String,
    pub role_details: String,
    pub posted_at: DateTime<Utc>,
    pub end_date: NaiveDate,
    pub contact_email: String,
    pub contact_phone: Option<String>,
    pub created_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl TryFrom<JobRecord> for Job {
    type Error = crate::error::Error;

    fn try_from(row: JobRecord) -> Result<Self, Self::Error> {
        let job_type = row
            .job_type
            .parse()
            .map_err(crate::error::Error::Internal)?;
        Ok(Self {
            id: row.id,
            employer_id: row.employer_id,
            title: row.title,
            company: row.company,
            workplace: row.workplace,
            job_type,
            sector: row.sector,
            salary: row.salary,
            working_hours: row.working_hours,
            requirements: row.requirements.map(|r| r.0).unwrap_or_default(),
            description: row.description,
            role_details: row.role_details,
            posted_at: row.posted_at,
            end_date: row.end_date,
            contact_email: row.contact_email,
            contact_phone: row.contact_phone,
            created_at: row.created_at,
            deleted_at: row.deleted_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn job_type_uses_display_labels_on_the_wire() {
        let json = serde_json::to_string(&JobType::StudentFriendly).unwrap();
        assert_eq!(json, "\"Student-friendly\"");
        assert_eq!("part-time".parse::<JobType>().unwrap(), JobType::PartTime);
        assert!("Internship".parse::<JobType>().is_err());
    }

    #[test]
    fn requirement_instruction_is_optional() {
        let req: Requirement =
            serde_json::from_str(r#"{"name":"Portfolio Link","why":"See your work"}"#).unwrap();
        assert_eq!(req.instruction, None);
    }
}
