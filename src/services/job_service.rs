use chrono::{Duration, Utc};
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use super::profile_service::ProfileService;
use crate::dto::job_dto::{CreateJobPayload, REQUIRED_FIELDS_MESSAGE};
use crate::error::{Error, Result};
use crate::lifecycle::{employer_dashboard, JobApplicantSummary};
use crate::middleware::auth::CurrentUser;
use crate::models::job::default_requirements;
use crate::models::{Job, JobType, NewJob, Profile, UserRole};
use crate::repository::JobBoardRepository;

pub const FALLBACK_COMPANY: &str = "Hiring Company";
const DEFAULT_OPEN_DAYS: i64 = 30;

#[derive(Clone)]
pub struct JobService {
    repo: Arc<dyn JobBoardRepository>,
    profiles: ProfileService,
}

impl JobService {
    pub fn new(repo: Arc<dyn JobBoardRepository>, profiles: ProfileService) -> Self {
        Self { repo, profiles }
    }

    pub async fn list_active(&self) -> Result<Vec<Job>> {
        self.repo.list_active_jobs().await
    }

    /// Publishes a listing for the signed-in employer. The employer's profile
    /// row is created or refreshed first; failures there are logged and the
    /// insert still runs.
    pub async fn post(&self, actor: &CurrentUser, payload: CreateJobPayload) -> Result<Job> {
        actor.require_employer()?;
        if !payload.has_required_fields() {
            return Err(Error::BadRequest(REQUIRED_FIELDS_MESSAGE.to_string()));
        }
        payload.validate()?;
        if payload.requirements.iter().any(|r| r.name.trim().is_empty()) {
            return Err(Error::BadRequest("Every requirement needs a name".to_string()));
        }

        let account = self.profiles.account(actor.id).await?;
        let stored = self.repo.get_profile(actor.id).await?;
        let company = resolve_company(
            payload.company.as_deref(),
            stored.as_ref(),
            account.metadata.company_name.as_deref(),
        );

        match stored {
            None => {
                let profile = Profile {
                    id: actor.id,
                    role: UserRole::Employer,
                    full_name: account
                        .metadata
                        .full_name
                        .clone()
                        .unwrap_or_else(|| account.email.clone()),
                    company_name: company.clone(),
                    is_verified: true,
                };
                if let Err(e) = self.profiles.ensure_profile(profile).await {
                    tracing::error!(employer_id = %actor.id, error = %e, "profile creation error");
                }
            }
            Some(existing) => {
                if company != FALLBACK_COMPANY && company != existing.company_name {
                    if let Err(e) = self.repo.update_company_name(actor.id, &company).await {
                        tracing::warn!(employer_id = %actor.id, error = %e, "profile update warning");
                    }
                }
            }
        }

        let now = Utc::now();
        let new_job = NewJob {
            employer_id: actor.id,
            title: payload.title.trim().to_string(),
            company,
            workplace: payload.workplace.trim().to_string(),
            job_type: payload.job_type.unwrap_or(JobType::FullTime),
            sector: payload.sector,
            salary: payload.salary.trim().to_string(),
            working_hours: payload.working_hours.trim().to_string(),
            requirements: if payload.requirements.is_empty() {
                default_requirements()
            } else {
                payload.requirements
            },
            description: payload.description,
            role_details: payload.role_details,
            posted_at: now,
            end_date: payload
                .end_date
                .unwrap_or_else(|| (now + Duration::days(DEFAULT_OPEN_DAYS)).date_naive()),
            contact_email: account.email,
            contact_phone: payload.contact_phone.filter(|p| !p.trim().is_empty()),
        };

        let job = self.repo.insert_job(new_job).await.map_err(|e| {
            tracing::error!(employer_id = %actor.id, error = %e, "job post error");
            e
        })?;
        tracing::info!(job_id = %job.id, employer_id = %actor.id, "job posted");
        Ok(job)
    }

    pub async fn soft_delete(&self, actor: &CurrentUser, job_id: Uuid) -> Result<()> {
        actor.require_employer()?;
        let job = self.repo.get_job(job_id).await?;
        if job.employer_id != actor.id {
            return Err(Error::Forbidden(
                "Only the employer who posted this job can remove it".to_string(),
            ));
        }
        if !job.is_active() {
            return Ok(());
        }
        self.repo.soft_delete_job(job_id, Utc::now()).await?;
        tracing::info!(job_id = %job_id, "job removed");
        Ok(())
    }

    pub async fn owned_ids(&self, actor: &CurrentUser) -> Result<Vec<Uuid>> {
        actor.require_employer()?;
        self.repo.owned_job_ids(actor.id).await
    }

    pub async fn dashboard(&self, actor: &CurrentUser) -> Result<Vec<JobApplicantSummary>> {
        actor.require_employer()?;
        let jobs = self.repo.list_active_jobs().await?;
        let owned = self.repo.owned_job_ids(actor.id).await?;
        let apps = self.repo.applications_for_jobs(&owned).await?;
        Ok(employer_dashboard(&jobs, &apps, actor.id))
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Company shown on a new listing: form value, then stored profile, then
/// sign-up metadata, then a placeholder.
pub fn resolve_company(
    form: Option<&str>,
    profile: Option<&Profile>,
    metadata: Option<&str>,
) -> String {
    non_blank(form)
        .or_else(|| non_blank(profile.map(|p| p.company_name.as_str())))
        .or_else(|| non_blank(metadata))
        .unwrap_or(FALLBACK_COMPANY)
        .to_string()
}
