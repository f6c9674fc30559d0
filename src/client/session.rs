use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use super::backend::BoardBackend;
use super::store::BoardStore;
use super::verification::{simulate_face_scan, ScanOutcome};
use crate::dto::application_dto::UploadedDocument;
use crate::error::Result;
use crate::lifecycle::ensure_transition;
use crate::middleware::auth::CurrentUser;
use crate::models::{Application, ApplicationStatus, UserRole};

pub const SIGN_IN_REQUIRED: &str = "Please Sign In to continue.";
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(10);

/// Message meant for the person using the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub message: String,
}

impl Notice {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// A signed-in (or anonymous) client view of the board. `establish` loads
/// everything once and then re-fetches on a fixed interval until `end` is
/// called or the session is dropped.
///
/// Local writes and the poll are not coordinated: a poll that started before
/// a write can land after it and briefly show the old state.
pub struct SyncSession {
    backend: Arc<dyn BoardBackend>,
    actor: Option<CurrentUser>,
    store: Arc<RwLock<BoardStore>>,
    poll_interval: Duration,
    cancel: CancellationToken,
    poller: Option<JoinHandle<()>>,
}

impl SyncSession {
    pub fn new(
        backend: Arc<dyn BoardBackend>,
        actor: Option<CurrentUser>,
        poll_interval: Duration,
    ) -> Self {
        Self::with_store(backend, actor, poll_interval, BoardStore::new())
    }

    pub fn with_store(
        backend: Arc<dyn BoardBackend>,
        actor: Option<CurrentUser>,
        poll_interval: Duration,
        store: BoardStore,
    ) -> Self {
        Self {
            backend,
            actor,
            store: Arc::new(RwLock::new(store)),
            poll_interval,
            cancel: CancellationToken::new(),
            poller: None,
        }
    }

    pub fn actor(&self) -> Option<CurrentUser> {
        self.actor
    }

    pub fn store(&self) -> Arc<RwLock<BoardStore>> {
        self.store.clone()
    }

    pub async fn snapshot(&self) -> BoardStore {
        self.store.read().await.clone()
    }

    pub fn is_polling(&self) -> bool {
        self.poller.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Full refresh now, then one every `poll_interval` while signed in.
    /// Anonymous sessions only get the initial job feed.
    pub async fn establish(&mut self) {
        self.refresh().await;
        if self.poller.is_some() || self.actor.is_none() {
            return;
        }

        let backend = self.backend.clone();
        let store = self.store.clone();
        let actor = self.actor;
        let cancel = self.cancel.clone();
        let period = self.poll_interval;

        self.poller = Some(tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = ticker.tick() => reconcile(backend.as_ref(), actor, &store).await,
                }
            }
            tracing::debug!("board poll stopped");
        }));
        tracing::info!(interval_secs = period.as_secs(), "board poll started");
    }

    pub async fn refresh(&self) {
        reconcile(self.backend.as_ref(), self.actor, &self.store).await;
    }

    /// Stops the poll. A later `establish` starts a new one.
    pub fn end(&mut self) {
        std::mem::take(&mut self.cancel).cancel();
        self.poller = None;
    }

    /// Moves one application to `new_status`. The move is checked against
    /// the cached record before any network call; on success only that
    /// record's status changes in the store.
    pub async fn transition(
        &self,
        application_id: Uuid,
        new_status: ApplicationStatus,
    ) -> std::result::Result<(), Notice> {
        let current = self
            .store
            .read()
            .await
            .application(application_id)
            .map(|a| a.status);
        let Some(current) = current else {
            return Err(status_failure("Application not found"));
        };
        if let Err(e) = ensure_transition(current, new_status) {
            return Err(status_failure(e));
        }

        match self.backend.update_status(application_id, new_status).await {
            Ok(_) => {
                self.store
                    .write()
                    .await
                    .patch_application_status(application_id, new_status);
                Ok(())
            }
            Err(e) => {
                tracing::warn!(application_id = %application_id, error = %e, "status update failed");
                Err(status_failure(e.user_message()))
            }
        }
    }

    pub async fn submit_application(
        &self,
        job_id: Uuid,
        documents: Vec<UploadedDocument>,
    ) -> std::result::Result<Application, Notice> {
        if self.actor.is_none() {
            return Err(Notice::new(SIGN_IN_REQUIRED));
        }
        match self.backend.submit_application(job_id, documents).await {
            Ok(app) => {
                self.store.write().await.insert_application(app.clone());
                Ok(app)
            }
            Err(e) => {
                tracing::warn!(job_id = %job_id, error = %e, "application submit failed");
                Err(Notice::new(format!(
                    "Failed to submit application: {}",
                    e.user_message()
                )))
            }
        }
    }

    pub async fn face_scan(&self, camera_available: bool) -> ScanOutcome {
        simulate_face_scan(self.actor.is_some(), camera_available).await
    }

    pub async fn toggle_saved(&self, job_id: Uuid) -> bool {
        self.store.write().await.toggle_saved(job_id)
    }
}

impl Drop for SyncSession {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

fn status_failure(reason: impl fmt::Display) -> Notice {
    Notice::new(format!("Failed to update status: {}", reason))
}

/// One full refresh. Failures keep the previous snapshot of whatever could
/// not be fetched.
async fn reconcile(
    backend: &dyn BoardBackend,
    actor: Option<CurrentUser>,
    store: &RwLock<BoardStore>,
) {
    match backend.list_jobs().await {
        Ok(jobs) if !jobs.is_empty() => store.write().await.replace_jobs(jobs),
        Ok(_) => tracing::debug!("job feed came back empty; keeping current listings"),
        Err(e) => tracing::warn!(error = %e, "job refresh failed"),
    }

    let Some(actor) = actor else {
        return;
    };
    let fetched = match actor.role {
        UserRole::Candidate => backend.list_applications().await.map(Some),
        UserRole::Employer => employer_applications(backend).await,
    };
    match fetched {
        Ok(Some(apps)) => store.write().await.replace_all_from_poll(apps),
        Ok(None) => {}
        Err(e) => tracing::warn!(error = %e, "application refresh failed"),
    }
}

/// The joined query first; if access control rejects it, the owned job ids
/// and then applications filtered by them. `None` means keep what we have.
async fn employer_applications(backend: &dyn BoardBackend) -> Result<Option<Vec<Application>>> {
    match backend.list_applications().await {
        Ok(apps) => Ok(Some(apps)),
        Err(e) if e.is_permission_denied() => {
            tracing::warn!(error = %e, "joined applications query rejected; using owned job ids");
            let ids = backend.owned_job_ids().await?;
            if ids.is_empty() {
                return Ok(None);
            }
            backend.applications_for_jobs(ids).await.map(Some)
        }
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::backend::MockBoardBackend;
    use crate::error::Error;
    use crate::repository::seed::sample_jobs;
    use chrono::Utc;
    use std::collections::BTreeMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn app(job_id: Uuid, status: ApplicationStatus) -> Application {
        Application {
            id: Uuid::new_v4(),
            job_id,
            candidate_id: Uuid::new_v4(),
            status,
            uploaded_docs: BTreeMap::from([("ID / Passport".to_string(), "c/1_id.png".to_string())]),
            submitted_at: Utc::now(),
            verified: true,
            candidate_name: Some("Rithy".into()),
        }
    }

    fn employer() -> CurrentUser {
        CurrentUser {
            id: Uuid::new_v4(),
            role: UserRole::Employer,
        }
    }

    fn candidate() -> CurrentUser {
        CurrentUser {
            id: Uuid::new_v4(),
            role: UserRole::Candidate,
        }
    }

    fn seeded(mock: MockBoardBackend, actor: CurrentUser, apps: Vec<Application>) -> SyncSession {
        let mut store = BoardStore::new();
        store.replace_all_from_poll(apps);
        SyncSession::with_store(Arc::new(mock), Some(actor), DEFAULT_POLL_INTERVAL, store)
    }

    #[tokio::test]
    async fn successful_transition_patches_only_status() {
        let job = Uuid::new_v4();
        let target = app(job, ApplicationStatus::Pending);
        let bystander = app(job, ApplicationStatus::Pending);

        let mut mock = MockBoardBackend::new();
        let returned = Application {
            status: ApplicationStatus::InterviewSet,
            ..target.clone()
        };
        let target_id = target.id;
        mock.expect_update_status()
            .withf(move |id, status| *id == target_id && *status == ApplicationStatus::InterviewSet)
            .times(1)
            .returning(move |_, _| Ok(returned.clone()));

        let session = seeded(mock, employer(), vec![target.clone(), bystander.clone()]);
        session
            .transition(target.id, ApplicationStatus::InterviewSet)
            .await
            .unwrap();

        let snapshot = session.snapshot().await;
        assert_eq!(
            snapshot.application(target.id).unwrap(),
            &Application {
                status: ApplicationStatus::InterviewSet,
                ..target
            }
        );
        assert_eq!(snapshot.application(bystander.id).unwrap(), &bystander);
    }

    #[tokio::test]
    async fn illegal_transition_never_reaches_the_backend() {
        let done = app(Uuid::new_v4(), ApplicationStatus::Passed);
        let mock = MockBoardBackend::new();
        let session = seeded(mock, employer(), vec![done.clone()]);

        let notice = session
            .transition(done.id, ApplicationStatus::FailedInterview)
            .await
            .unwrap_err();
        assert!(notice.message.starts_with("Failed to update status: "));
        assert_eq!(session.snapshot().await.applications(), &[done]);
    }

    #[tokio::test]
    async fn rejected_write_leaves_store_unchanged() {
        let pending = app(Uuid::new_v4(), ApplicationStatus::Pending);
        let mut mock = MockBoardBackend::new();
        mock.expect_update_status().times(1).returning(|_, _| {
            Err(Error::Backend {
                status: 403,
                message: "new row violates row-level security policy".into(),
            })
        });
        let session = seeded(mock, employer(), vec![pending.clone()]);

        let notice = session
            .transition(pending.id, ApplicationStatus::FailedShortlist)
            .await
            .unwrap_err();
        assert_eq!(
            notice,
            Notice::new("Failed to update status: new row violates row-level security policy")
        );
        assert_eq!(session.snapshot().await.applications(), &[pending]);
    }

    #[tokio::test]
    async fn employer_refresh_falls_back_to_owned_job_ids() {
        let jobs = sample_jobs(Uuid::new_v4());
        let owned = jobs[0].id;
        let visible = app(owned, ApplicationStatus::Pending);

        let mut mock = MockBoardBackend::new();
        let listing = jobs.clone();
        mock.expect_list_jobs().returning(move || Ok(listing.clone()));
        mock.expect_list_applications()
            .times(1)
            .returning(|| Err(Error::Forbidden("permission denied for table jobs".into())));
        mock.expect_owned_job_ids()
            .times(1)
            .returning(move || Ok(vec![owned]));
        let fallback = visible.clone();
        mock.expect_applications_for_jobs()
            .withf(move |ids| ids == &vec![owned])
            .times(1)
            .returning(move |_| Ok(vec![fallback.clone()]));

        let session = seeded(mock, employer(), vec![]);
        session.refresh().await;

        let snapshot = session.snapshot().await;
        assert_eq!(snapshot.jobs().len(), 4);
        assert_eq!(snapshot.applications(), &[visible]);
    }

    #[tokio::test]
    async fn fallback_with_no_owned_jobs_keeps_previous_snapshot() {
        let previous = app(Uuid::new_v4(), ApplicationStatus::InterviewSet);
        let mut mock = MockBoardBackend::new();
        mock.expect_list_jobs().returning(|| Ok(vec![]));
        mock.expect_list_applications()
            .returning(|| Err(Error::Forbidden("denied".into())));
        mock.expect_owned_job_ids().returning(|| Ok(vec![]));
        mock.expect_applications_for_jobs().never();

        let session = seeded(mock, employer(), vec![previous.clone()]);
        session.refresh().await;
        assert_eq!(session.snapshot().await.applications(), &[previous]);
    }

    #[tokio::test]
    async fn other_errors_skip_the_fallback() {
        let previous = app(Uuid::new_v4(), ApplicationStatus::Pending);
        let mut mock = MockBoardBackend::new();
        mock.expect_list_jobs()
            .returning(|| Err(Error::Internal("down".into())));
        mock.expect_list_applications()
            .returning(|| Err(Error::Internal("down".into())));
        mock.expect_owned_job_ids().never();

        let session = seeded(mock, employer(), vec![previous.clone()]);
        session.refresh().await;
        assert_eq!(session.snapshot().await.applications(), &[previous]);
    }

    #[tokio::test]
    async fn candidate_poll_replaces_collection_wholesale() {
        let stale = app(Uuid::new_v4(), ApplicationStatus::Pending);
        let fresh = app(Uuid::new_v4(), ApplicationStatus::FailedShortlist);
        let mut mock = MockBoardBackend::new();
        mock.expect_list_jobs().returning(|| Ok(vec![]));
        let polled = fresh.clone();
        mock.expect_list_applications()
            .returning(move || Ok(vec![polled.clone()]));

        let session = seeded(mock, candidate(), vec![stale]);
        session.refresh().await;
        assert_eq!(session.snapshot().await.applications(), &[fresh]);
    }

    #[tokio::test]
    async fn submission_is_prepended() {
        let job = Uuid::new_v4();
        let older = app(job, ApplicationStatus::InterviewSet);
        let created = app(job, ApplicationStatus::Pending);
        let mut mock = MockBoardBackend::new();
        let returned = created.clone();
        mock.expect_submit_application()
            .times(1)
            .returning(move |_, _| Ok(returned.clone()));

        let session = seeded(mock, candidate(), vec![older.clone()]);
        session.submit_application(job, vec![]).await.unwrap();
        assert_eq!(session.snapshot().await.applications(), &[created, older]);
    }

    #[tokio::test]
    async fn failed_submission_surfaces_notice() {
        let mut mock = MockBoardBackend::new();
        mock.expect_submit_application().returning(|_, _| {
            Err(Error::Backend {
                status: 404,
                message: "Job not found".into(),
            })
        });
        let session = seeded(mock, candidate(), vec![]);
        let notice = session
            .submit_application(Uuid::new_v4(), vec![])
            .await
            .unwrap_err();
        assert_eq!(notice.message, "Failed to submit application: Job not found");
        assert!(session.snapshot().await.applications().is_empty());
    }

    #[tokio::test]
    async fn signed_out_submit_asks_for_sign_in() {
        let session = SyncSession::new(Arc::new(MockBoardBackend::new()), None, DEFAULT_POLL_INTERVAL);
        let notice = session.submit_application(Uuid::new_v4(), vec![]).await.unwrap_err();
        assert_eq!(notice.message, SIGN_IN_REQUIRED);
    }

    #[tokio::test(start_paused = true)]
    async fn poll_runs_every_interval_until_ended() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut mock = MockBoardBackend::new();
        let counter = calls.clone();
        mock.expect_list_jobs().returning(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(vec![])
        });
        mock.expect_list_applications().returning(|| Ok(vec![]));

        let mut session = SyncSession::new(Arc::new(mock), Some(candidate()), DEFAULT_POLL_INTERVAL);
        session.establish().await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(session.is_polling());

        tokio::time::sleep(Duration::from_millis(10_500)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 3);

        session.end();
        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn poll_resumes_after_end_and_establish() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut mock = MockBoardBackend::new();
        let counter = calls.clone();
        mock.expect_list_jobs().returning(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(vec![])
        });
        mock.expect_list_applications().returning(|| Ok(vec![]));

        let mut session = SyncSession::new(Arc::new(mock), Some(employer()), DEFAULT_POLL_INTERVAL);
        session.establish().await;
        session.end();
        assert!(!session.is_polling());

        session.establish().await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert!(session.is_polling());

        tokio::time::sleep(Duration::from_secs(35)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 5);
        assert!(session.is_polling());
    }

    #[tokio::test(start_paused = true)]
    async fn anonymous_session_loads_jobs_once_without_polling() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut mock = MockBoardBackend::new();
        let counter = calls.clone();
        mock.expect_list_jobs().returning(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(sample_jobs(Uuid::new_v4()))
        });
        mock.expect_list_applications().never();

        let mut session = SyncSession::new(Arc::new(mock), None, DEFAULT_POLL_INTERVAL);
        session.establish().await;
        assert!(!session.is_polling());
        assert_eq!(session.snapshot().await.jobs().len(), 4);

        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
