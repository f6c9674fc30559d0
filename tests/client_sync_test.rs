use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use jobboard_backend::{
    client::{BoardBackend, LocalBoardBackend, Notice, SyncSession},
    dto::{
        application_dto::UploadedDocument,
        auth_dto::SignUpPayload,
        job_dto::CreateJobPayload,
    },
    identity::SimulatedVerifier,
    middleware::auth::CurrentUser,
    models::{ApplicationStatus, Requirement, UserRole},
    repository::{memory::AccessPolicy, InMemoryRepository},
    storage::LocalDocumentStorage,
    AppState, StateSettings,
};
use uuid::Uuid;

struct Board {
    repo: Arc<InMemoryRepository>,
    state: AppState,
}

fn board() -> Board {
    let repo = Arc::new(InMemoryRepository::new());
    let dir = std::env::temp_dir().join(format!("jobboard-client-{}", Uuid::new_v4()));
    let state = AppState::new(
        repo.clone(),
        Arc::new(LocalDocumentStorage::new(dir, "secret", "http://localhost:8080")),
        Arc::new(SimulatedVerifier),
        StateSettings {
            jwt_secret: "test_secret_key".to_string(),
            jwt_ttl_hours: 1,
            signed_url_ttl: Duration::from_secs(60),
        },
    );
    Board { repo, state }
}

async fn account(state: &AppState, email: &str, role: UserRole) -> CurrentUser {
    let session = state
        .auth_service
        .sign_up(SignUpPayload {
            email: email.to_string(),
            password: "secret123".to_string(),
            full_name: Some(format!("{:?} person", role)),
            role: Some(role),
            company_name: (role == UserRole::Employer).then(|| "Tonle Logistics".to_string()),
        })
        .await
        .expect("sign up");
    CurrentUser {
        id: session.user_id,
        role,
    }
}

fn listing(title: &str) -> CreateJobPayload {
    CreateJobPayload {
        title: title.to_string(),
        workplace: "Chamkarmon, Phnom Penh".to_string(),
        salary: "$400".to_string(),
        working_hours: "9AM - 6PM".to_string(),
        requirements: vec![Requirement::new("CV / Resume", "Background", None::<&str>)],
        ..CreateJobPayload::default()
    }
}

fn cv() -> UploadedDocument {
    UploadedDocument {
        requirement: "CV / Resume".to_string(),
        file_name: "cv.pdf".to_string(),
        data: Bytes::from_static(b"%PDF-1.4 resume"),
    }
}

#[tokio::test]
async fn candidate_and_employer_sessions_stay_in_step() {
    let Board { repo: _, state } = board();
    let employer = account(&state, "ops@tonle.com", UserRole::Employer).await;
    let candidate = account(&state, "malis@example.com", UserRole::Candidate).await;
    let job = state
        .job_service
        .post(&employer, listing("Warehouse Supervisor"))
        .await
        .expect("post job");

    let mut candidate_session = SyncSession::new(
        Arc::new(LocalBoardBackend::new(state.clone(), candidate)),
        Some(candidate),
        Duration::from_secs(10),
    );
    candidate_session.establish().await;
    assert_eq!(candidate_session.snapshot().await.jobs().len(), 1);

    let submitted = candidate_session
        .submit_application(job.id, vec![cv()])
        .await
        .expect("submit");
    assert_eq!(submitted.status, ApplicationStatus::Pending);
    assert!(submitted.uploaded_docs.contains_key("CV / Resume"));

    let mut employer_session = SyncSession::new(
        Arc::new(LocalBoardBackend::new(state.clone(), employer)),
        Some(employer),
        Duration::from_secs(10),
    );
    employer_session.establish().await;
    let snapshot = employer_session.snapshot().await;
    assert_eq!(snapshot.applications().len(), 1);
    assert_eq!(snapshot.pending_count(job.id), 1);

    employer_session
        .transition(submitted.id, ApplicationStatus::FailedShortlist)
        .await
        .expect("reject");
    let notice = employer_session
        .transition(submitted.id, ApplicationStatus::InterviewSet)
        .await
        .unwrap_err();
    assert!(notice.message.starts_with("Failed to update status: "));

    candidate_session.refresh().await;
    let roadmap = candidate_session
        .snapshot()
        .await
        .roadmap(submitted.id)
        .expect("roadmap");
    assert!(roadmap.stage_failed);

    candidate_session.end();
    employer_session.end();
}

#[tokio::test]
async fn employer_falls_back_when_joined_query_is_denied() {
    let Board { repo, state } = board();
    let employer = account(&state, "ops@tonle.com", UserRole::Employer).await;
    let other = account(&state, "hr@other.com", UserRole::Employer).await;
    let candidate = account(&state, "malis@example.com", UserRole::Candidate).await;

    let mine = state.job_service.post(&employer, listing("Driver")).await.unwrap();
    let theirs = state.job_service.post(&other, listing("Cashier")).await.unwrap();
    let applicant = LocalBoardBackend::new(state.clone(), candidate);
    let to_mine = applicant.submit_application(mine.id, vec![cv()]).await.unwrap();
    applicant.submit_application(theirs.id, vec![cv()]).await.unwrap();

    repo.set_policy(AccessPolicy {
        deny_employer_join: true,
        ..AccessPolicy::default()
    })
    .await;

    let session = SyncSession::new(
        Arc::new(LocalBoardBackend::new(state.clone(), employer)),
        Some(employer),
        Duration::from_secs(10),
    );
    session.refresh().await;

    let snapshot = session.snapshot().await;
    assert_eq!(snapshot.applications().len(), 1);
    assert_eq!(snapshot.applications()[0].id, to_mine.id);
    assert_eq!(snapshot.jobs().len(), 2);
}

#[tokio::test]
async fn denied_status_write_keeps_cached_status() {
    let Board { repo, state } = board();
    let employer = account(&state, "ops@tonle.com", UserRole::Employer).await;
    let candidate = account(&state, "malis@example.com", UserRole::Candidate).await;
    let job = state.job_service.post(&employer, listing("Driver")).await.unwrap();
    let app = LocalBoardBackend::new(state.clone(), candidate)
        .submit_application(job.id, vec![cv()])
        .await
        .unwrap();

    let session = SyncSession::new(
        Arc::new(LocalBoardBackend::new(state.clone(), employer)),
        Some(employer),
        Duration::from_secs(10),
    );
    session.refresh().await;

    repo.set_policy(AccessPolicy {
        deny_status_updates: true,
        ..AccessPolicy::default()
    })
    .await;

    let notice = session
        .transition(app.id, ApplicationStatus::InterviewSet)
        .await
        .unwrap_err();
    assert_eq!(
        notice,
        Notice::new(
            "Failed to update status: new row violates row-level security policy for table \"applications\""
        )
    );
    assert_eq!(
        session.snapshot().await.application(app.id).unwrap().status,
        ApplicationStatus::Pending
    );
}
