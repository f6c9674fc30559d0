use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Candidate,
    Employer,
}

impl UserRole {
    pub fn as_str(self) -> &'static str {
        match self {
            UserRole::Candidate => "candidate",
            UserRole::Employer => "employer",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "candidate" => Ok(UserRole::Candidate),
            "employer" => Ok(UserRole::Employer),
            other => Err(format!("unknown role '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub id: Uuid,
    pub role: UserRole,
    pub full_name: String,
    pub company_name: String,
    pub is_verified: bool,
}

#[derive(Debug, FromRow)]
pub struct ProfileRecord {
    pub id: Uuid,
    pub role: String,
    pub full_name: Option<String>,
    pub company_name: Option<String>,
    pub is_verified: Option<bool>,
}

impl TryFrom<ProfileRecord> for Profile {
    type Error = crate::error::Error;

    fn try_from(row: ProfileRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            role: row.role.parse().map_err(crate::error::Error::Internal)?,
            full_name: row.full_name.unwrap_or_default(),
            company_name: row.company_name.unwrap_or_default(),
            is_verified: row.is_verified.unwrap_or(false),
        })
    }
}

/// Details captured at sign-up, kept on the account so a profile can be
/// rebuilt when the `profiles` row is missing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignUpMetadata {
    pub full_name: Option<String>,
    pub role: Option<UserRole>,
    pub company_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserAccount {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub metadata: SignUpMetadata,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, FromRow)]
pub struct UserAccountRecord {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub full_name: Option<String>,
    pub role: Option<String>,
    pub company_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<UserAccountRecord> for UserAccount {
    fn from(row: UserAccountRecord) -> Self {
        Self {
            id: row.id,
            email: row.email,
            password_hash: row.password_hash,
            metadata: SignUpMetadata {
                full_name: row.full_name,
                role: row.role.and_then(|r| r.parse().ok()),
                company_name: row.company_name,
            },
            created_at: row.created_at,
        }
    }
}
