use chrono::Utc;
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

use super::profile_service::ProfileService;
use crate::dto::application_dto::{DocumentReceipt, SubmissionReceipt, UploadedDocument};
use crate::error::{Error, Result};
use crate::lifecycle::{ensure_transition, roadmap, Roadmap};
use crate::middleware::auth::CurrentUser;
use crate::models::{Application, ApplicationStatus, Job, NewApplication, Profile, UserRole};
use crate::repository::JobBoardRepository;
use crate::storage::{document_path, validate_upload, DocumentStorage, SignedUrl};
use crate::utils::crypto::{hash_document, verify_on_chain};

#[derive(Clone)]
pub struct ApplicationService {
    repo: Arc<dyn JobBoardRepository>,
    storage: Arc<dyn DocumentStorage>,
    profiles: ProfileService,
    signed_url_ttl: Duration,
}

impl ApplicationService {
    pub fn new(
        repo: Arc<dyn JobBoardRepository>,
        storage: Arc<dyn DocumentStorage>,
        profiles: ProfileService,
        signed_url_ttl: Duration,
    ) -> Self {
        Self {
            repo,
            storage,
            profiles,
            signed_url_ttl,
        }
    }

    /// Uploads each document, makes sure the candidate has a profile row,
    /// then inserts a `pending` application. A document whose upload fails
    /// is left out of `uploaded_docs`; earlier uploads are not rolled back if
    /// the insert fails.
    pub async fn submit(
        &self,
        actor: &CurrentUser,
        job_id: Uuid,
        documents: Vec<UploadedDocument>,
    ) -> Result<SubmissionReceipt> {
        actor.require_candidate()?;
        let job = self.repo.get_job(job_id).await?;
        if !job.is_active() {
            return Err(Error::BadRequest(
                "This job is no longer accepting applications".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for doc in &documents {
            if !seen.insert(doc.requirement.as_str()) {
                return Err(Error::BadRequest(format!(
                    "Duplicate document for requirement '{}'",
                    doc.requirement
                )));
            }
            validate_upload(&doc.file_name, &doc.data)?;
        }

        let mut uploaded_docs = BTreeMap::new();
        let mut receipts = Vec::with_capacity(documents.len());
        for doc in documents {
            let path = document_path(actor.id, &doc.file_name, Utc::now());
            let sha256 = hash_document(&doc.data);
            if let Err(e) = self.storage.upload(&path, doc.data).await {
                tracing::warn!(requirement = %doc.requirement, error = %e, "document upload skipped");
                continue;
            }
            receipts.push(DocumentReceipt {
                requirement: doc.requirement.clone(),
                path: path.clone(),
                ledger: verify_on_chain(&sha256),
                sha256,
            });
            uploaded_docs.insert(doc.requirement, path);
        }

        let profile = self.profiles.effective_profile(actor.id).await?;
        let candidate = Profile {
            role: UserRole::Candidate,
            company_name: String::new(),
            is_verified: true,
            ..profile.clone()
        };
        if let Err(e) = self.profiles.ensure_profile(candidate).await {
            tracing::warn!(candidate_id = %actor.id, error = %e, "profile insert warning");
        }

        let application = self
            .repo
            .insert_application(NewApplication {
                job_id,
                candidate_id: actor.id,
                candidate_name: Some(profile.full_name),
                uploaded_docs,
                verified: true,
                submitted_at: Utc::now(),
            })
            .await?;

        tracing::info!(
            application_id = %application.id,
            job_id = %job_id,
            documents = receipts.len(),
            "application submitted"
        );
        Ok(SubmissionReceipt {
            application,
            documents: receipts,
        })
    }

    /// Moves an application along the hiring funnel. Only the employer who
    /// owns the job may do so, only along a legal edge, and only if nobody
    /// changed the status since it was read.
    pub async fn transition(
        &self,
        actor: &CurrentUser,
        application_id: Uuid,
        next: ApplicationStatus,
    ) -> Result<Application> {
        let app = self.repo.get_application(application_id).await?;
        let job = self.repo.get_job(app.job_id).await?;
        if !actor.is_employer() || job.employer_id != actor.id {
            return Err(Error::Forbidden(
                "Only the employer who posted this job can update its applications".to_string(),
            ));
        }

        let event = ensure_transition(app.status, next)?;
        let applied = self
            .repo
            .update_application_status(application_id, app.status, next)
            .await?;
        if !applied {
            return Err(Error::Conflict(
                "Application status changed since it was loaded; refresh and try again".to_string(),
            ));
        }

        tracing::info!(
            application_id = %application_id,
            from = %app.status,
            to = %next,
            ?event,
            "application status updated"
        );
        Ok(Application { status: next, ..app })
    }

    /// Candidates see their own applications; employers see those against
    /// their jobs through the joined query.
    pub async fn list_for_actor(&self, actor: &CurrentUser) -> Result<Vec<Application>> {
        match actor.role {
            UserRole::Candidate => self.repo.applications_for_candidate(actor.id).await,
            UserRole::Employer => self.repo.applications_for_employer(actor.id).await,
        }
    }

    /// Applications for the requested jobs, restricted to jobs the employer owns.
    pub async fn for_jobs(&self, actor: &CurrentUser, job_ids: &[Uuid]) -> Result<Vec<Application>> {
        actor.require_employer()?;
        let owned: HashSet<Uuid> = self.repo.owned_job_ids(actor.id).await?.into_iter().collect();
        let allowed: Vec<Uuid> = job_ids.iter().copied().filter(|id| owned.contains(id)).collect();
        self.repo.applications_for_jobs(&allowed).await
    }

    async fn visible_application(&self, actor: &CurrentUser, id: Uuid) -> Result<(Application, Job)> {
        let app = self.repo.get_application(id).await?;
        let job = self.repo.get_job(app.job_id).await?;
        let visible = app.candidate_id == actor.id || (actor.is_employer() && job.employer_id == actor.id);
        if !visible {
            return Err(Error::Forbidden("You cannot view this application".to_string()));
        }
        Ok((app, job))
    }

    pub async fn roadmap(&self, actor: &CurrentUser, id: Uuid) -> Result<Roadmap> {
        let (app, _) = self.visible_application(actor, id).await?;
        Ok(roadmap(app.status))
    }

    pub async fn document_link(
        &self,
        actor: &CurrentUser,
        id: Uuid,
        requirement: &str,
    ) -> Result<SignedUrl> {
        let (app, _) = self.visible_application(actor, id).await?;
        let path = app.uploaded_docs.get(requirement).ok_or_else(|| {
            Error::NotFound(format!("No document uploaded for '{}'", requirement))
        })?;
        self.storage.signed_url(path, self.signed_url_ttl)
    }
}
