use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::dto::application_dto::{
    ByJobsQuery, DocumentLinkPayload, StatusUpdatePayload, SubmissionReceipt, UploadedDocument,
    DOCUMENT_FIELD_PREFIX,
};
use crate::error::{Error, Result};
use crate::lifecycle::Roadmap;
use crate::middleware::auth::CurrentUser;
use crate::models::Application;
use crate::storage::SignedUrl;
use crate::AppState;

#[utoipa::path(
    get,
    path = "/api/applications",
    responses(
        (status = 200, description = "Candidate's own applications, or applications against the employer's jobs", body = [Application]),
        (status = 403, description = "Joined query rejected by access policy")
    )
)]
#[axum::debug_handler]
pub async fn list_applications(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Result<impl IntoResponse> {
    let apps = state.application_service.list_for_actor(&user).await?;
    Ok(Json(apps))
}

#[utoipa::path(
    get,
    path = "/api/applications/by-jobs",
    params(
        ("ids" = String, Query, description = "Comma-separated job ids")
    ),
    responses(
        (status = 200, description = "Applications for the owned subset of the given jobs", body = [Application])
    )
)]
#[axum::debug_handler]
pub async fn applications_by_jobs(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Query(query): Query<ByJobsQuery>,
) -> Result<impl IntoResponse> {
    let ids = query.job_ids()?;
    let apps = state.application_service.for_jobs(&user, &ids).await?;
    Ok(Json(apps))
}

/// Multipart form: a `job_id` text field plus one `doc:<requirement>` file
/// field per uploaded document.
#[utoipa::path(
    post,
    path = "/api/applications",
    responses(
        (status = 201, description = "Application submitted", body = SubmissionReceipt),
        (status = 400, description = "Missing job_id or invalid document"),
        (status = 403, description = "Caller is not a candidate")
    )
)]
#[axum::debug_handler]
pub async fn submit_application(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse> {
    let mut job_id = None;
    let mut documents = Vec::new();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        if name == "job_id" {
            let raw = field.text().await?;
            let parsed = Uuid::parse_str(raw.trim())
                .map_err(|_| Error::BadRequest("job_id must be a UUID".to_string()))?;
            job_id = Some(parsed);
        } else if let Some(requirement) = name.strip_prefix(DOCUMENT_FIELD_PREFIX) {
            let file_name = field.file_name().unwrap_or("document").to_string();
            let data = field.bytes().await?;
            documents.push(UploadedDocument {
                requirement: requirement.to_string(),
                file_name,
                data,
            });
        } else {
            tracing::debug!(field = %name, "ignoring unknown form field");
        }
    }

    let job_id = job_id.ok_or_else(|| Error::BadRequest("job_id is required".to_string()))?;
    let receipt = state
        .application_service
        .submit(&user, job_id, documents)
        .await?;
    Ok((StatusCode::CREATED, Json(receipt)))
}

#[utoipa::path(
    patch,
    path = "/api/applications/{id}/status",
    params(
        ("id" = Uuid, Path, description = "Application ID")
    ),
    request_body = StatusUpdatePayload,
    responses(
        (status = 200, description = "Status updated", body = Application),
        (status = 403, description = "Caller does not own the job"),
        (status = 409, description = "Status changed concurrently"),
        (status = 422, description = "Transition not allowed from the current status")
    )
)]
#[axum::debug_handler]
pub async fn update_status(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    Json(payload): Json<StatusUpdatePayload>,
) -> Result<impl IntoResponse> {
    let app = state
        .application_service
        .transition(&user, id, payload.status)
        .await?;
    Ok(Json(app))
}

#[utoipa::path(
    get,
    path = "/api/applications/{id}/roadmap",
    params(
        ("id" = Uuid, Path, description = "Application ID")
    ),
    responses(
        (status = 200, description = "Review / Interview / Hired progress", body = Roadmap)
    )
)]
#[axum::debug_handler]
pub async fn application_roadmap(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let roadmap = state.application_service.roadmap(&user, id).await?;
    Ok(Json(roadmap))
}

#[utoipa::path(
    post,
    path = "/api/applications/{id}/documents/link",
    params(
        ("id" = Uuid, Path, description = "Application ID")
    ),
    request_body = DocumentLinkPayload,
    responses(
        (status = 200, description = "Short-lived signed download link", body = SignedUrl),
        (status = 404, description = "No document for that requirement")
    )
)]
#[axum::debug_handler]
pub async fn document_link(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    Json(payload): Json<DocumentLinkPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let link = state
        .application_service
        .document_link(&user, id, &payload.requirement)
        .await?;
    Ok(Json(link))
}
