//! Persistence for jobs, applications, profiles and accounts.
//!
//! Services talk to the store only through [`JobBoardRepository`]; the
//! Postgres implementation backs production and the in-memory one backs demo
//! mode and tests.

pub mod memory;
pub mod postgres;
pub mod seed;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::Result;
use crate::models::{
    Application, ApplicationStatus, Job, NewApplication, NewJob, Profile, SignUpMetadata,
    UserAccount,
};

pub use memory::InMemoryRepository;
pub use postgres::PgRepository;

#[async_trait]
pub trait JobBoardRepository: Send + Sync {
    /// Jobs without a deletion marker, newest first.
    async fn list_active_jobs(&self) -> Result<Vec<Job>>;
    async fn get_job(&self, id: Uuid) -> Result<Job>;
    async fn insert_job(&self, job: NewJob) -> Result<Job>;
    async fn soft_delete_job(&self, id: Uuid, deleted_at: DateTime<Utc>) -> Result<()>;
    async fn owned_job_ids(&self, employer_id: Uuid) -> Result<Vec<Uuid>>;

    async fn get_application(&self, id: Uuid) -> Result<Application>;
    async fn insert_application(&self, app: NewApplication) -> Result<Application>;
    /// Writes `next` only if the stored status is still `expected`. Returns
    /// whether a row changed.
    async fn update_application_status(
        &self,
        id: Uuid,
        expected: ApplicationStatus,
        next: ApplicationStatus,
    ) -> Result<bool>;
    async fn applications_for_candidate(&self, candidate_id: Uuid) -> Result<Vec<Application>>;
    /// Applications joined through `jobs.employer_id`.
    async fn applications_for_employer(&self, employer_id: Uuid) -> Result<Vec<Application>>;
    async fn applications_for_jobs(&self, job_ids: &[Uuid]) -> Result<Vec<Application>>;

    async fn get_profile(&self, id: Uuid) -> Result<Option<Profile>>;
    async fn insert_profile(&self, profile: &Profile) -> Result<()>;
    async fn update_company_name(&self, id: Uuid, company_name: &str) -> Result<()>;

    async fn create_user(
        &self,
        email: &str,
        password_hash: &str,
        metadata: &SignUpMetadata,
    ) -> Result<UserAccount>;
    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserAccount>>;
    async fn get_user(&self, id: Uuid) -> Result<Option<UserAccount>>;
}
