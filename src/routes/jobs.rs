use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use uuid::Uuid;

use crate::dto::job_dto::{CreateJobPayload, EmployerDashboardResponse, OwnedJobIdsResponse};
use crate::error::Result;
use crate::middleware::auth::CurrentUser;
use crate::models::Job;
use crate::AppState;

#[utoipa::path(
    get,
    path = "/api/jobs",
    responses(
        (status = 200, description = "Active listings, newest first", body = [Job])
    )
)]
#[axum::debug_handler]
pub async fn list_jobs(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let jobs = state.job_service.list_active().await?;
    Ok(Json(jobs))
}

#[utoipa::path(
    post,
    path = "/api/jobs",
    request_body = CreateJobPayload,
    responses(
        (status = 201, description = "Listing published", body = Job),
        (status = 400, description = "Required fields missing"),
        (status = 403, description = "Caller is not an employer")
    )
)]
#[axum::debug_handler]
pub async fn create_job(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(payload): Json<CreateJobPayload>,
) -> Result<impl IntoResponse> {
    let job = state.job_service.post(&user, payload).await?;
    Ok((StatusCode::CREATED, Json(job)))
}

#[utoipa::path(
    delete,
    path = "/api/jobs/{id}",
    params(
        ("id" = Uuid, Path, description = "Job ID")
    ),
    responses(
        (status = 204, description = "Listing removed"),
        (status = 403, description = "Caller does not own the listing"),
        (status = 404, description = "Job not found")
    )
)]
#[axum::debug_handler]
pub async fn delete_job(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    state.job_service.soft_delete(&user, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/api/jobs/mine/ids",
    responses(
        (status = 200, description = "Ids of every job the employer posted", body = OwnedJobIdsResponse)
    )
)]
#[axum::debug_handler]
pub async fn owned_job_ids(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Result<impl IntoResponse> {
    let ids = state.job_service.owned_ids(&user).await?;
    Ok(Json(OwnedJobIdsResponse { ids }))
}

#[utoipa::path(
    get,
    path = "/api/employer/dashboard",
    responses(
        (status = 200, description = "Applicant counts per active listing", body = EmployerDashboardResponse)
    )
)]
#[axum::debug_handler]
pub async fn employer_dashboard(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Result<impl IntoResponse> {
    let rows = state.job_service.dashboard(&user).await?;
    Ok(Json(EmployerDashboardResponse::from(rows)))
}
