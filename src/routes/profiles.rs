use axum::{
    extract::{Path, State},
    response::{IntoResponse, Json},
    Extension,
};

use crate::{
    dto::profile_dto::ProfileResponse,
    error::{Error, Result},
    services::session_service::Claims,
    AppState,
};

#[utoipa::path(
    get,
    path = "/api/me",
    responses(
        (status = 200, description = "The signed-in profile", body = Json<ProfileResponse>),
        (status = 401, description = "Missing or invalid session token")
    )
)]
#[axum::debug_handler]
pub async fn me(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse> {
    let id = claims.profile_id()?;
    let profile = state
        .profiles
        .find_by_id(id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("Profile not found: {}", id)))?;
    Ok(Json(ProfileResponse::from(profile)))
}

#[utoipa::path(
    get,
    path = "/api/profiles/by-email/{email}",
    params(
        ("email" = String, Path, description = "Profile email")
    ),
    responses(
        (status = 200, description = "Profile found", body = Json<ProfileResponse>),
        (status = 404, description = "Profile not found")
    )
)]
#[axum::debug_handler]
pub async fn get_profile_by_email(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> Result<impl IntoResponse> {
    let profile = state
        .profiles
        .find_by_email(&email)
        .await?
        .ok_or_else(|| Error::NotFound(format!("Profile not found: {}", email)))?;
    Ok(Json(ProfileResponse::from(profile)))
}
