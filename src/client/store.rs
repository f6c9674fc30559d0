use std::collections::BTreeSet;
use uuid::Uuid;

use crate::lifecycle::{self, roadmap, JobApplicantSummary, Roadmap};
use crate::models::{Application, ApplicationStatus, Job, JobType};

/// Which listings the job feed shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FeedFilter {
    #[default]
    All,
    Type(JobType),
    Saved,
}

/// Owns the client's copy of jobs and applications. All mutation goes
/// through the commands below; readers get slices or clones.
#[derive(Debug, Clone, Default)]
pub struct BoardStore {
    jobs: Vec<Job>,
    applications: Vec<Application>,
    saved_jobs: BTreeSet<Uuid>,
}

impl BoardStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_jobs(jobs: Vec<Job>) -> Self {
        Self {
            jobs,
            ..Self::default()
        }
    }

    pub fn jobs(&self) -> &[Job] {
        &self.jobs
    }

    pub fn applications(&self) -> &[Application] {
        &self.applications
    }

    pub fn application(&self, id: Uuid) -> Option<&Application> {
        self.applications.iter().find(|a| a.id == id)
    }

    pub fn job(&self, id: Uuid) -> Option<&Job> {
        self.jobs.iter().find(|j| j.id == id)
    }

    pub fn replace_jobs(&mut self, jobs: Vec<Job>) {
        self.jobs = jobs;
    }

    /// New submissions go to the front.
    pub fn insert_application(&mut self, app: Application) {
        self.applications.insert(0, app);
    }

    /// Sets the status of one application and touches nothing else. Returns
    /// false when the id is not in the store.
    pub fn patch_application_status(&mut self, id: Uuid, status: ApplicationStatus) -> bool {
        match self.applications.iter_mut().find(|a| a.id == id) {
            Some(app) => {
                app.status = status;
                true
            }
            None => false,
        }
    }

    pub fn replace_all_from_poll(&mut self, apps: Vec<Application>) {
        self.applications = apps;
    }

    /// Flips the saved flag for a job and returns the new state.
    pub fn toggle_saved(&mut self, job_id: Uuid) -> bool {
        if self.saved_jobs.remove(&job_id) {
            false
        } else {
            self.saved_jobs.insert(job_id);
            true
        }
    }

    pub fn is_saved(&self, job_id: Uuid) -> bool {
        self.saved_jobs.contains(&job_id)
    }

    pub fn feed(&self, filter: FeedFilter) -> Vec<&Job> {
        self.jobs
            .iter()
            .filter(|job| match filter {
                FeedFilter::All => true,
                FeedFilter::Type(job_type) => job.job_type == job_type,
                FeedFilter::Saved => self.saved_jobs.contains(&job.id),
            })
            .collect()
    }

    pub fn pending_count(&self, job_id: Uuid) -> usize {
        lifecycle::pending_count(&self.applications, job_id)
    }

    pub fn applicant_total(&self, job_id: Uuid) -> usize {
        lifecycle::applicant_total(&self.applications, job_id)
    }

    pub fn dashboard(&self, employer_id: Uuid) -> Vec<JobApplicantSummary> {
        lifecycle::employer_dashboard(&self.jobs, &self.applications, employer_id)
    }

    pub fn roadmap(&self, application_id: Uuid) -> Option<Roadmap> {
        self.application(application_id).map(|a| roadmap(a.status))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::seed::sample_jobs;
    use chrono::Utc;
    use std::collections::BTreeMap;

    fn app(job_id: Uuid, status: ApplicationStatus) -> Application {
        Application {
            id: Uuid::new_v4(),
            job_id,
            candidate_id: Uuid::new_v4(),
            status,
            uploaded_docs: BTreeMap::from([("CV / Resume".to_string(), "c/1_cv.pdf".to_string())]),
            submitted_at: Utc::now(),
            verified: true,
            candidate_name: Some("Chenda".into()),
        }
    }

    #[test]
    fn insert_prepends_and_patch_touches_only_status() {
        let job = Uuid::new_v4();
        let mut store = BoardStore::new();
        let first = app(job, ApplicationStatus::Pending);
        let second = app(job, ApplicationStatus::Pending);
        store.insert_application(first.clone());
        store.insert_application(second.clone());
        assert_eq!(store.applications()[0].id, second.id);

        assert!(store.patch_application_status(first.id, ApplicationStatus::InterviewSet));
        let patched = store.application(first.id).unwrap();
        assert_eq!(
            patched,
            &Application {
                status: ApplicationStatus::InterviewSet,
                ..first
            }
        );
        assert_eq!(store.application(second.id).unwrap(), &second);
        assert!(!store.patch_application_status(Uuid::new_v4(), ApplicationStatus::Passed));
    }

    #[test]
    fn derived_counts_follow_the_collection() {
        let job = Uuid::new_v4();
        let other = Uuid::new_v4();
        let mut store = BoardStore::new();
        store.replace_all_from_poll(vec![
            app(job, ApplicationStatus::Pending),
            app(job, ApplicationStatus::Pending),
            app(job, ApplicationStatus::InterviewSet),
            app(other, ApplicationStatus::Pending),
        ]);
        assert_eq!(store.pending_count(job), 2);
        assert_eq!(store.applicant_total(job), 3);
        assert_eq!(store.applicant_total(other), 1);
    }

    #[test]
    fn feed_filters_by_type_and_saved() {
        let mut store = BoardStore::with_jobs(sample_jobs(Uuid::new_v4()));
        assert_eq!(store.feed(FeedFilter::All).len(), 4);
        assert_eq!(store.feed(FeedFilter::Type(JobType::FullTime)).len(), 2);
        assert!(store.feed(FeedFilter::Saved).is_empty());

        let barista = store.jobs()[1].id;
        assert!(store.toggle_saved(barista));
        assert_eq!(store.feed(FeedFilter::Saved)[0].id, barista);
        assert!(!store.toggle_saved(barista));
        assert!(!store.is_saved(barista));
    }
}
