use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::JobBoardRepository;
use crate::error::{Error, Result};
use crate::models::{
    Application, ApplicationStatus, Job, NewApplication, NewJob, Profile, SignUpMetadata,
    UserAccount,
};

/// Row-level policy switches, mirroring the rejections a hosted backend's
/// access-control layer can produce.
#[derive(Debug, Clone, Copy, Default)]
pub struct AccessPolicy {
    /// Reject the employer's joined applications query.
    pub deny_employer_join: bool,
    /// Reject every status write.
    pub deny_status_updates: bool,
}

#[derive(Default)]
struct State {
    jobs: Vec<Job>,
    applications: Vec<Application>,
    profiles: HashMap<Uuid, Profile>,
    users: HashMap<Uuid, UserAccount>,
    policy: AccessPolicy,
}

/// Process-local repository used in demo mode and by tests. Nothing survives
/// a restart.
#[derive(Default)]
pub struct InMemoryRepository {
    state: RwLock<State>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_jobs(jobs: Vec<Job>) -> Self {
        Self {
            state: RwLock::new(State {
                jobs,
                ..State::default()
            }),
        }
    }

    pub async fn set_policy(&self, policy: AccessPolicy) {
        self.state.write().await.policy = policy;
    }

    pub async fn job_count(&self) -> usize {
        self.state.read().await.jobs.len()
    }
}

fn newest_first(jobs: &mut [Job]) {
    jobs.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}

/// Latest submission first; among equal timestamps the later insert wins.
fn latest_submitted<'a>(apps: impl DoubleEndedIterator<Item = &'a Application>) -> Vec<Application> {
    let mut out: Vec<Application> = apps.rev().cloned().collect();
    out.sort_by(|a, b| b.submitted_at.cmp(&a.submitted_at));
    out
}

#[async_trait]
impl JobBoardRepository for InMemoryRepository {
    async fn list_active_jobs(&self) -> Result<Vec<Job>> {
        let state = self.state.read().await;
        let mut jobs: Vec<Job> = state.jobs.iter().filter(|j| j.is_active()).cloned().collect();
        newest_first(&mut jobs);
        Ok(jobs)
    }

    async fn get_job(&self, id: Uuid) -> Result<Job> {
        let state = self.state.read().await;
        state
            .jobs
            .iter()
            .find(|j| j.id == id)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("Job {} not found", id)))
    }

    async fn insert_job(&self, job: NewJob) -> Result<Job> {
        let mut state = self.state.write().await;
        if !state.profiles.contains_key(&job.employer_id) {
            return Err(Error::Conflict(
                "insert on jobs violates foreign key to profiles".to_string(),
            ));
        }
        let row = Job {
            id: Uuid::new_v4(),
            employer_id: job.employer_id,
            title: job.title,
            company: job.company,
            workplace: job.workplace,
            job_type: job.job_type,
            sector: job.sector,
            salary: job.salary,
            working_hours: job.working_hours,
            requirements: job.requirements,
            description: job.description,
            role_details: job.role_details,
            posted_at: job.posted_at,
            end_date: job.end_date,
            contact_email: job.contact_email,
            contact_phone: job.contact_phone,
            created_at: Utc::now(),
            deleted_at: None,
        };
        state.jobs.push(row.clone());
        Ok(row)
    }

    async fn soft_delete_job(&self, id: Uuid, deleted_at: DateTime<Utc>) -> Result<()> {
        let mut state = self.state.write().await;
        let job = state
            .jobs
            .iter_mut()
            .find(|j| j.id == id)
            .ok_or_else(|| Error::NotFound(format!("Job {} not found", id)))?;
        job.deleted_at = Some(deleted_at);
        Ok(())
    }

    async fn owned_job_ids(&self, employer_id: Uuid) -> Result<Vec<Uuid>> {
        let state = self.state.read().await;
        Ok(state
            .jobs
            .iter()
            .filter(|j| j.employer_id == employer_id)
            .map(|j| j.id)
            .collect())
    }

    async fn get_application(&self, id: Uuid) -> Result<Application> {
        let state = self.state.read().await;
        state
            .applications
            .iter()
            .find(|a| a.id == id)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("Application {} not found", id)))
    }

    async fn insert_application(&self, app: NewApplication) -> Result<Application> {
        let mut state = self.state.write().await;
        if !state.jobs.iter().any(|j| j.id == app.job_id) {
            return Err(Error::NotFound(format!("Job {} not found", app.job_id)));
        }
        let row = Application {
            id: Uuid::new_v4(),
            job_id: app.job_id,
            candidate_id: app.candidate_id,
            status: ApplicationStatus::Pending,
            uploaded_docs: app.uploaded_docs,
            submitted_at: app.submitted_at,
            verified: app.verified,
            candidate_name: app.candidate_name,
        };
        state.applications.push(row.clone());
        Ok(row)
    }

    async fn update_application_status(
        &self,
        id: Uuid,
        expected: ApplicationStatus,
        next: ApplicationStatus,
    ) -> Result<bool> {
        let mut state = self.state.write().await;
        if state.policy.deny_status_updates {
            return Err(Error::Forbidden(
                "new row violates row-level security policy for table \"applications\"".to_string(),
            ));
        }
        match state
            .applications
            .iter_mut()
            .find(|a| a.id == id && a.status == expected)
        {
            Some(app) => {
                app.status = next;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn applications_for_candidate(&self, candidate_id: Uuid) -> Result<Vec<Application>> {
        let state = self.state.read().await;
        Ok(latest_submitted(
            state.applications.iter().filter(|a| a.candidate_id == candidate_id),
        ))
    }

    async fn applications_for_employer(&self, employer_id: Uuid) -> Result<Vec<Application>> {
        let state = self.state.read().await;
        if state.policy.deny_employer_join {
            return Err(Error::Forbidden(
                "permission denied for table jobs".to_string(),
            ));
        }
        Ok(latest_submitted(state.applications.iter().filter(|a| {
            state
                .jobs
                .iter()
                .any(|j| j.id == a.job_id && j.employer_id == employer_id)
        })))
    }

    async fn applications_for_jobs(&self, job_ids: &[Uuid]) -> Result<Vec<Application>> {
        let state = self.state.read().await;
        Ok(latest_submitted(
            state.applications.iter().filter(|a| job_ids.contains(&a.job_id)),
        ))
    }

    async fn get_profile(&self, id: Uuid) -> Result<Option<Profile>> {
        Ok(self.state.read().await.profiles.get(&id).cloned())
    }

    async fn insert_profile(&self, profile: &Profile) -> Result<()> {
        let mut state = self.state.write().await;
        if state.profiles.contains_key(&profile.id) {
            return Err(Error::Conflict(
                "duplicate key value violates unique constraint \"profiles_pkey\"".to_string(),
            ));
        }
        state.profiles.insert(profile.id, profile.clone());
        Ok(())
    }

    async fn update_company_name(&self, id: Uuid, company_name: &str) -> Result<()> {
        let mut state = self.state.write().await;
        let profile = state
            .profiles
            .get_mut(&id)
            .ok_or_else(|| Error::NotFound(format!("Profile {} not found", id)))?;
        profile.company_name = company_name.to_string();
        Ok(())
    }

    async fn create_user(
        &self,
        email: &str,
        password_hash: &str,
        metadata: &SignUpMetadata,
    ) -> Result<UserAccount> {
        let mut state = self.state.write().await;
        if state
            .users
            .values()
            .any(|u| u.email.eq_ignore_ascii_case(email))
        {
            return Err(Error::Conflict("User already registered".to_string()));
        }
        let user = UserAccount {
            id: Uuid::new_v4(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            metadata: metadata.clone(),
            created_at: Utc::now(),
        };
        state.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserAccount>> {
        let state = self.state.read().await;
        Ok(state
            .users
            .values()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn get_user(&self, id: Uuid) -> Result<Option<UserAccount>> {
        Ok(self.state.read().await.users.get(&id).cloned())
    }
}
