use axum::{extract::State, response::IntoResponse, Extension, Json};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use validator::Validate;

use crate::dto::application_dto::IdentityVerifyPayload;
use crate::error::{Error, Result};
use crate::identity::IdentityMatch;
use crate::middleware::auth::CurrentUser;
use crate::AppState;

#[utoipa::path(
    post,
    path = "/api/identity/verify",
    request_body = IdentityVerifyPayload,
    responses(
        (status = 200, description = "Match verdict; oracle failures report a busy verdict", body = IdentityMatch),
        (status = 400, description = "Image is not valid base64")
    )
)]
#[axum::debug_handler]
pub async fn verify_identity(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(payload): Json<IdentityVerifyPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let image = BASE64
        .decode(payload.image_base64.trim())
        .map_err(|_| Error::BadRequest("image_base64 is not valid base64".to_string()))?;

    let user_name = match payload.user_name.filter(|n| !n.trim().is_empty()) {
        Some(name) => name,
        None => state.profile_service.effective_profile(user.id).await?.full_name,
    };

    let verdict = state.identity.verify(&image, &user_name).await;
    Ok(Json(verdict))
}
