pub mod applications;
pub mod auth;
pub mod docs;
pub mod documents;
pub mod health;
pub mod identity;
pub mod jobs;

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, patch, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::middleware::{auth::require_session, cors::api_cors, rate_limit};
use crate::AppState;

const MAX_BODY_BYTES: usize = 50 * 1024 * 1024;

pub fn build_router(state: AppState, api_rps: u32) -> Router {
    let public_api = Router::new()
        .route("/api/auth/sign-up", post(auth::sign_up))
        .route("/api/auth/sign-in", post(auth::sign_in))
        .route("/api/jobs", get(jobs::list_jobs))
        .route("/api/documents", get(documents::download_document))
        .route("/api/openapi.json", get(docs::openapi_json));

    let session_api = Router::new()
        .route("/api/profile", get(auth::get_profile))
        .route("/api/jobs", post(jobs::create_job))
        .route("/api/jobs/mine/ids", get(jobs::owned_job_ids))
        .route("/api/jobs/:id", delete(jobs::delete_job))
        .route("/api/employer/dashboard", get(jobs::employer_dashboard))
        .route(
            "/api/applications",
            get(applications::list_applications).post(applications::submit_application),
        )
        .route(
            "/api/applications/by-jobs",
            get(applications::applications_by_jobs),
        )
        .route(
            "/api/applications/:id/status",
            patch(applications::update_status),
        )
        .route(
            "/api/applications/:id/roadmap",
            get(applications::application_roadmap),
        )
        .route(
            "/api/applications/:id/documents/link",
            post(applications::document_link),
        )
        .route("/api/identity/verify", post(identity::verify_identity))
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            require_session,
        ));

    let api = public_api
        .merge(session_api)
        .layer(axum::middleware::from_fn_with_state(
            rate_limit::new_rps_state(api_rps),
            rate_limit::rps_middleware,
        ));

    Router::new()
        .route("/health", get(health::health))
        .merge(api)
        .with_state(state)
        .layer(api_cors())
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
}
