use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use jobboard_backend::{
    client::{HttpBoardClient, Notice, SyncSession},
    dto::{
        application_dto::UploadedDocument,
        auth_dto::SignUpPayload,
        job_dto::CreateJobPayload,
    },
    identity::SimulatedVerifier,
    middleware::auth::CurrentUser,
    models::{ApplicationStatus, Requirement, UserRole},
    repository::{memory::AccessPolicy, InMemoryRepository, JobBoardRepository},
    routes::build_router,
    storage::LocalDocumentStorage,
    AppState, StateSettings,
};
use tokio::net::TcpListener;
use uuid::Uuid;

async fn serve() -> (String, Arc<InMemoryRepository>, AppState) {
    let repo = Arc::new(InMemoryRepository::new());
    let dir = std::env::temp_dir().join(format!("jobboard-http-{}", Uuid::new_v4()));
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let base_url = format!("http://{}", listener.local_addr().expect("addr"));
    let state = AppState::new(
        repo.clone(),
        Arc::new(LocalDocumentStorage::new(dir, "secret", &base_url)),
        Arc::new(SimulatedVerifier),
        StateSettings {
            jwt_secret: "test_secret_key".to_string(),
            jwt_ttl_hours: 1,
            signed_url_ttl: Duration::from_secs(60),
        },
    );
    let app = build_router(state.clone(), 1000);
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    (base_url, repo, state)
}

async fn signed_in(base_url: &str, email: &str, role: UserRole) -> (HttpBoardClient, CurrentUser) {
    let mut client = HttpBoardClient::new(base_url, reqwest::Client::new());
    let session = client
        .sign_up(&SignUpPayload {
            email: email.to_string(),
            password: "secret123".to_string(),
            full_name: Some("Chan Dara".to_string()),
            role: Some(role),
            company_name: (role == UserRole::Employer).then(|| "Sabay Tours".to_string()),
        })
        .await
        .expect("sign up over http");
    (
        client,
        CurrentUser {
            id: session.user_id,
            role,
        },
    )
}

#[tokio::test]
async fn sessions_over_http_submit_fall_back_and_patch() {
    let (base_url, repo, state) = serve().await;
    let (employer_client, employer) = signed_in(&base_url, "ops@sabay.com", UserRole::Employer).await;
    let (candidate_client, candidate) = signed_in(&base_url, "nita@example.com", UserRole::Candidate).await;

    let job = state
        .job_service
        .post(
            &employer,
            CreateJobPayload {
                title: "Tour Guide".to_string(),
                workplace: "Siem Reap".to_string(),
                salary: "$500".to_string(),
                working_hours: "Shifts".to_string(),
                requirements: vec![Requirement::new("CV / Resume", "Background", None)],
                ..CreateJobPayload::default()
            },
        )
        .await
        .expect("post job");

    let mut candidate_session = SyncSession::new(
        Arc::new(candidate_client),
        Some(candidate),
        Duration::from_secs(10),
    );
    candidate_session.establish().await;
    assert_eq!(candidate_session.snapshot().await.jobs().len(), 1);

    let submitted = candidate_session
        .submit_application(
            job.id,
            vec![UploadedDocument {
                requirement: "CV / Resume".to_string(),
                file_name: "cv.pdf".to_string(),
                data: Bytes::from_static(b"%PDF-1.4 guide"),
            }],
        )
        .await
        .expect("multipart submit");
    assert!(submitted.uploaded_docs.contains_key("CV / Resume"));
    candidate_session.end();

    // Joined query rejected with 403: the session goes through owned ids and by-jobs.
    repo.set_policy(AccessPolicy {
        deny_employer_join: true,
        ..AccessPolicy::default()
    })
    .await;
    let employer_session = SyncSession::new(
        Arc::new(employer_client),
        Some(employer),
        Duration::from_secs(10),
    );
    employer_session.refresh().await;
    let snapshot = employer_session.snapshot().await;
    assert_eq!(snapshot.applications().len(), 1);
    assert_eq!(snapshot.applications()[0].id, submitted.id);

    employer_session
        .transition(submitted.id, ApplicationStatus::InterviewSet)
        .await
        .expect("patch over http");
    assert_eq!(
        employer_session.snapshot().await.application(submitted.id).unwrap().status,
        ApplicationStatus::InterviewSet
    );
    assert_eq!(
        repo.get_application(submitted.id).await.unwrap().status,
        ApplicationStatus::InterviewSet
    );

    repo.set_policy(AccessPolicy {
        deny_status_updates: true,
        ..AccessPolicy::default()
    })
    .await;
    let notice = employer_session
        .transition(submitted.id, ApplicationStatus::Passed)
        .await
        .unwrap_err();
    assert_eq!(
        notice,
        Notice::new(
            "Failed to update status: new row violates row-level security policy for table \"applications\""
        )
    );
    assert_eq!(
        employer_session.snapshot().await.application(submitted.id).unwrap().status,
        ApplicationStatus::InterviewSet
    );
}
