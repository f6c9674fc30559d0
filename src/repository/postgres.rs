use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{types::Json, PgPool};
use uuid::Uuid;

use super::JobBoardRepository;
use crate::error::{Error, Result};
use crate::models::application::ApplicationRecord;
use crate::models::job::JobRecord;
use crate::models::profile::{ProfileRecord, UserAccountRecord};
use crate::models::{
    Application, ApplicationStatus, Job, NewApplication, NewJob, Profile, SignUpMetadata,
    UserAccount,
};

const JOB_COLUMNS: &str = "id, employer_id, title, company, workplace, job_type, sector, salary, \
     working_hours, requirements, description, role_details, posted_at, end_date, contact_email, \
     contact_phone, created_at, deleted_at";

const APPLICATION_COLUMNS: &str =
    "id, job_id, candidate_id, status, uploaded_docs, submitted_at, verified, candidate_name";

#[derive(Clone)]
pub struct PgRepository {
    pool: PgPool,
}

impl PgRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn into_jobs(rows: Vec<JobRecord>) -> Result<Vec<Job>> {
    rows.into_iter().map(Job::try_from).collect()
}

fn into_applications(rows: Vec<ApplicationRecord>) -> Result<Vec<Application>> {
    rows.into_iter().map(Application::try_from).collect()
}

#[async_trait]
impl JobBoardRepository for PgRepository {
    async fn list_active_jobs(&self) -> Result<Vec<Job>> {
        let query = format!(
            "SELECT {} FROM jobs WHERE deleted_at IS NULL ORDER BY created_at DESC",
            JOB_COLUMNS
        );
        let rows = sqlx::query_as::<_, JobRecord>(&query)
            .fetch_all(&self.pool)
            .await?;
        into_jobs(rows)
    }

    async fn get_job(&self, id: Uuid) -> Result<Job> {
        let query = format!("SELECT {} FROM jobs WHERE id = $1", JOB_COLUMNS);
        let row = sqlx::query_as::<_, JobRecord>(&query)
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        row.try_into()
    }

    async fn insert_job(&self, job: NewJob) -> Result<Job> {
        let query = format!(
            r#"
            INSERT INTO jobs (
                employer_id, title, company, workplace, job_type,
                sector, salary, working_hours, requirements, description,
                role_details, posted_at, end_date, contact_email, contact_phone
            ) VALUES (
                $1,$2,$3,$4,$5,
                $6,$7,$8,$9,$10,
                $11,$12,$13,$14,$15
            )
            RETURNING {}
            "#,
            JOB_COLUMNS
        );
        let row = sqlx::query_as::<_, JobRecord>(&query)
            .bind(job.employer_id)
            .bind(&job.title)
            .bind(&job.company)
            .bind(&job.workplace)
            .bind(job.job_type.as_str())
            .bind(&job.sector)
            .bind(&job.salary)
            .bind(&job.working_hours)
            .bind(Json(&job.requirements))
            .bind(&job.description)
            .bind(&job.role_details)
            .bind(job.posted_at)
            .bind(job.end_date)
            .bind(&job.contact_email)
            .bind(&job.contact_phone)
            .fetch_one(&self.pool)
            .await?;
        row.try_into()
    }

    async fn soft_delete_job(&self, id: Uuid, deleted_at: DateTime<Utc>) -> Result<()> {
        let res = sqlx::query("UPDATE jobs SET deleted_at = $2 WHERE id = $1")
            .bind(id)
            .bind(deleted_at)
            .execute(&self.pool)
            .await?;
        if res.rows_affected() == 0 {
            return Err(Error::NotFound(format!("Job {} not found", id)));
        }
        Ok(())
    }

    async fn owned_job_ids(&self, employer_id: Uuid) -> Result<Vec<Uuid>> {
        let ids = sqlx::query_scalar::<_, Uuid>("SELECT id FROM jobs WHERE employer_id = $1")
            .bind(employer_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(ids)
    }

    async fn get_application(&self, id: Uuid) -> Result<Application> {
        let query = format!("SELECT {} FROM applications WHERE id = $1", APPLICATION_COLUMNS);
        let row = sqlx::query_as::<_, ApplicationRecord>(&query)
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        row.try_into()
    }

    async fn insert_application(&self, app: NewApplication) -> Result<Application> {
        let query = format!(
            r#"
            INSERT INTO applications (job_id, candidate_id, candidate_name, status, uploaded_docs, verified, submitted_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {}
            "#,
            APPLICATION_COLUMNS
        );
        let row = sqlx::query_as::<_, ApplicationRecord>(&query)
            .bind(app.job_id)
            .bind(app.candidate_id)
            .bind(&app.candidate_name)
            .bind(ApplicationStatus::Pending.as_str())
            .bind(Json(&app.uploaded_docs))
            .bind(app.verified)
            .bind(app.submitted_at)
            .fetch_one(&self.pool)
            .await?;
        row.try_into()
    }

    async fn update_application_status(
        &self,
        id: Uuid,
        expected: ApplicationStatus,
        next: ApplicationStatus,
    ) -> Result<bool> {
        let res = sqlx::query("UPDATE applications SET status = $3 WHERE id = $1 AND status = $2")
            .bind(id)
            .bind(expected.as_str())
            .bind(next.as_str())
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected() == 1)
    }

    async fn applications_for_candidate(&self, candidate_id: Uuid) -> Result<Vec<Application>> {
        let query = format!(
            "SELECT {} FROM applications WHERE candidate_id = $1 ORDER BY submitted_at DESC",
            APPLICATION_COLUMNS
        );
        let rows = sqlx::query_as::<_, ApplicationRecord>(&query)
            .bind(candidate_id)
            .fetch_all(&self.pool)
            .await?;
        into_applications(rows)
    }

    async fn applications_for_employer(&self, employer_id: Uuid) -> Result<Vec<Application>> {
        let rows = sqlx::query_as::<_, ApplicationRecord>(
            r#"
            SELECT a.id, a.job_id, a.candidate_id, a.status, a.uploaded_docs, a.submitted_at, a.verified, a.candidate_name
            FROM applications a
            JOIN jobs j ON j.id = a.job_id
            WHERE j.employer_id = $1
            ORDER BY a.submitted_at DESC
            "#,
        )
        .bind(employer_id)
        .fetch_all(&self.pool)
        .await?;
        into_applications(rows)
    }

    async fn applications_for_jobs(&self, job_ids: &[Uuid]) -> Result<Vec<Application>> {
        if job_ids.is_empty() {
            return Ok(Vec::new());
        }
        let query = format!(
            "SELECT {} FROM applications WHERE job_id = ANY($1) ORDER BY submitted_at DESC",
            APPLICATION_COLUMNS
        );
        let rows = sqlx::query_as::<_, ApplicationRecord>(&query)
            .bind(job_ids)
            .fetch_all(&self.pool)
            .await?;
        into_applications(rows)
    }

    async fn get_profile(&self, id: Uuid) -> Result<Option<Profile>> {
        let row = sqlx::query_as::<_, ProfileRecord>(
            "SELECT id, role, full_name, company_name, is_verified FROM profiles WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(Profile::try_from).transpose()
    }

    async fn insert_profile(&self, profile: &Profile) -> Result<()> {
        sqlx::query(
            "INSERT INTO profiles (id, role, full_name, company_name, is_verified) VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(profile.id)
        .bind(profile.role.as_str())
        .bind(&profile.full_name)
        .bind(&profile.company_name)
        .bind(profile.is_verified)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn update_company_name(&self, id: Uuid, company_name: &str) -> Result<()> {
        sqlx::query("UPDATE profiles SET company_name = $2 WHERE id = $1")
            .bind(id)
            .bind(company_name)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn create_user(
        &self,
        email: &str,
        password_hash: &str,
        metadata: &SignUpMetadata,
    ) -> Result<UserAccount> {
        let row = sqlx::query_as::<_, UserAccountRecord>(
            r#"
            INSERT INTO users (email, password_hash, full_name, role, company_name)
            VALUES (LOWER($1), $2, $3, $4, $5)
            RETURNING id, email, password_hash, full_name, role, company_name, created_at
            "#,
        )
        .bind(email)
        .bind(password_hash)
        .bind(&metadata.full_name)
        .bind(metadata.role.map(|r| r.as_str()))
        .bind(&metadata.company_name)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match Error::from(e) {
            Error::Conflict(_) => Error::Conflict("User already registered".to_string()),
            other => other,
        })?;
        Ok(row.into())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserAccount>> {
        let row = sqlx::query_as::<_, UserAccountRecord>(
            "SELECT id, email, password_hash, full_name, role, company_name, created_at FROM users WHERE email = LOWER($1)",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Into::into))
    }

    async fn get_user(&self, id: Uuid) -> Result<Option<UserAccount>> {
        let row = sqlx::query_as::<_, UserAccountRecord>(
            "SELECT id, email, password_hash, full_name, role, company_name, created_at FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Into::into))
    }
}
