use axum::Json;
use utoipa::OpenApi;

use super::{applications, auth, documents, health, identity, jobs};

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health,
        auth::sign_up,
        auth::sign_in,
        auth::get_profile,
        jobs::list_jobs,
        jobs::create_job,
        jobs::delete_job,
        jobs::owned_job_ids,
        jobs::employer_dashboard,
        applications::list_applications,
        applications::applications_by_jobs,
        applications::submit_application,
        applications::update_status,
        applications::application_roadmap,
        applications::document_link,
        documents::download_document,
        identity::verify_identity,
    ),
    info(title = "Job board API")
)]
pub struct ApiDoc;

pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
