//! Read-only views derived from the full application collection. Nothing here
//! is stored; callers recompute on every read.

use serde::Serialize;
use uuid::Uuid;

use crate::models::{Application, ApplicationStatus, Job};

pub fn applications_for_job(apps: &[Application], job_id: Uuid) -> impl Iterator<Item = &Application> {
    apps.iter().filter(move |a| a.job_id == job_id)
}

/// Applications against `job_id` still waiting for a shortlist decision.
pub fn pending_count(apps: &[Application], job_id: Uuid) -> usize {
    applications_for_job(apps, job_id)
        .filter(|a| a.status == ApplicationStatus::Pending)
        .count()
}

pub fn applicant_total(apps: &[Application], job_id: Uuid) -> usize {
    applications_for_job(apps, job_id).count()
}

#[derive(Debug, Clone, Serialize)]
pub struct JobApplicantSummary {
    pub job: Job,
    pub applicant_total: usize,
    pub pending_count: usize,
    pub has_new_applicants: bool,
}

/// One row per active job owned by `employer_id`, in the order given.
pub fn employer_dashboard(
    jobs: &[Job],
    apps: &[Application],
    employer_id: Uuid,
) -> Vec<JobApplicantSummary> {
    jobs.iter()
        .filter(|job| job.employer_id == employer_id && job.is_active())
        .map(|job| {
            let pending = pending_count(apps, job.id);
            JobApplicantSummary {
                job: job.clone(),
                applicant_total: applicant_total(apps, job.id),
                pending_count: pending,
                has_new_applicants: pending > 0,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::seed::sample_jobs;
    use chrono::Utc;
    use std::collections::BTreeMap;

    fn app(job_id: Uuid, candidate_id: Uuid, status: ApplicationStatus) -> Application {
        Application {
            id: Uuid::new_v4(),
            job_id,
            candidate_id,
            status,
            uploaded_docs: BTreeMap::new(),
            submitted_at: Utc::now(),
            verified: true,
            candidate_name: None,
        }
    }

    #[test]
    fn pending_count_ignores_other_statuses() {
        let job = Uuid::new_v4();
        let apps = vec![
            app(job, Uuid::new_v4(), ApplicationStatus::Pending),
            app(job, Uuid::new_v4(), ApplicationStatus::Pending),
            app(job, Uuid::new_v4(), ApplicationStatus::InterviewSet),
        ];
        assert_eq!(pending_count(&apps, job), 2);
    }

    #[test]
    fn applicant_total_counts_every_candidate_on_the_job_only() {
        let job = Uuid::new_v4();
        let other_job = Uuid::new_v4();
        let apps = vec![
            app(job, Uuid::new_v4(), ApplicationStatus::Pending),
            app(job, Uuid::new_v4(), ApplicationStatus::Passed),
            app(other_job, Uuid::new_v4(), ApplicationStatus::Pending),
        ];
        assert_eq!(applicant_total(&apps, job), 2);
        assert_eq!(applicant_total(&apps, other_job), 1);
    }

    #[test]
    fn dashboard_lists_only_owned_active_jobs() {
        let employer = Uuid::new_v4();
        let mut jobs = sample_jobs(employer);
        jobs[1].employer_id = Uuid::new_v4();
        jobs[2].deleted_at = Some(Utc::now());

        let apps = vec![
            app(jobs[0].id, Uuid::new_v4(), ApplicationStatus::Pending),
            app(jobs[0].id, Uuid::new_v4(), ApplicationStatus::FailedShortlist),
        ];
        let rows = employer_dashboard(&jobs, &apps, employer);
        let ids: Vec<_> = rows.iter().map(|r| r.job.id).collect();
        assert!(ids.contains(&jobs[0].id));
        assert!(!ids.contains(&jobs[1].id));
        assert!(!ids.contains(&jobs[2].id));

        let first = rows.iter().find(|r| r.job.id == jobs[0].id).unwrap();
        assert_eq!(first.applicant_total, 2);
        assert_eq!(first.pending_count, 1);
        assert!(first.has_new_applicants);
    }
}
