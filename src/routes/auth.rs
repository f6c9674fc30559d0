use axum::{extract::State, http::StatusCode, response::IntoResponse, Extension, Json};

use crate::dto::auth_dto::{AuthResponse, SignInPayload, SignUpPayload};
use crate::error::Result;
use crate::middleware::auth::CurrentUser;
use crate::models::Profile;
use crate::AppState;

#[utoipa::path(
    post,
    path = "/api/auth/sign-up",
    request_body = SignUpPayload,
    responses(
        (status = 201, description = "Account created", body = AuthResponse),
        (status = 400, description = "Invalid payload"),
        (status = 409, description = "Account already exists")
    )
)]
#[axum::debug_handler]
pub async fn sign_up(
    State(state): State<AppState>,
    Json(payload): Json<SignUpPayload>,
) -> Result<impl IntoResponse> {
    let session = state.auth_service.sign_up(payload).await?;
    Ok((StatusCode::CREATED, Json(session)))
}

#[utoipa::path(
    post,
    path = "/api/auth/sign-in",
    request_body = SignInPayload,
    responses(
        (status = 200, description = "Signed in", body = AuthResponse),
        (status = 401, description = "Invalid login credentials")
    )
)]
#[axum::debug_handler]
pub async fn sign_in(
    State(state): State<AppState>,
    Json(payload): Json<SignInPayload>,
) -> Result<impl IntoResponse> {
    let session = state.auth_service.sign_in(payload).await?;
    Ok(Json(session))
}

#[utoipa::path(
    get,
    path = "/api/profile",
    responses(
        (status = 200, description = "Effective profile of the signed-in user", body = Profile),
        (status = 401, description = "Missing or invalid token")
    )
)]
#[axum::debug_handler]
pub async fn get_profile(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Result<impl IntoResponse> {
    let profile = state.profile_service.effective_profile(user.id).await?;
    Ok(Json(profile))
}
