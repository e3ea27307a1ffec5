use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    Extension,
};
use uuid::Uuid;

use crate::{
    dto::shadowing_dto::{RejectShadowingPayload, ShadowingRequestResponse},
    error::Result,
    models::shadowing_request::ShadowingRequest,
    services::session_service::Claims,
    AppState,
};

fn responses(requests: Vec<ShadowingRequest>) -> Json<Vec<ShadowingRequestResponse>> {
    Json(requests.into_iter().map(Into::into).collect())
}

#[utoipa::path(
    post,
    path = "/api/interviews/{id}/shadowing-requests",
    params(
        ("id" = Uuid, Path, description = "Interview ID")
    ),
    responses(
        (status = 201, description = "Shadowing requested by the caller", body = Json<ShadowingRequestResponse>),
        (status = 404, description = "Interview or shadower not found")
    )
)]
#[axum::debug_handler]
pub async fn request_shadowing(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(interview_id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let shadower_id = claims.profile_id()?;
    let request = state
        .shadowing_service
        .request(interview_id, shadower_id)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(ShadowingRequestResponse::from(request)),
    ))
}

#[utoipa::path(
    get,
    path = "/api/interviews/{id}/shadowing-requests",
    params(
        ("id" = Uuid, Path, description = "Interview ID")
    ),
    responses(
        (status = 200, description = "Shadowing requests for the interview", body = Json<Vec<ShadowingRequestResponse>>),
        (status = 404, description = "Interview not found")
    )
)]
#[axum::debug_handler]
pub async fn list_for_interview(
    State(state): State<AppState>,
    Path(interview_id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let requests = state
        .shadowing_service
        .list_for_interview(interview_id)
        .await?;
    Ok(responses(requests))
}

#[utoipa::path(
    get,
    path = "/api/shadowing-requests/mine",
    responses(
        (status = 200, description = "The caller's shadowing requests", body = Json<Vec<ShadowingRequestResponse>>)
    )
)]
#[axum::debug_handler]
pub async fn list_mine(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse> {
    let requests = state
        .shadowing_service
        .list_for_shadower(claims.profile_id()?)
        .await?;
    Ok(responses(requests))
}

#[utoipa::path(
    post,
    path = "/api/shadowing-requests/{id}/cancel",
    params(
        ("id" = Uuid, Path, description = "Shadowing request ID")
    ),
    responses(
        (status = 200, description = "Request cancelled", body = Json<ShadowingRequestResponse>),
        (status = 404, description = "Request not found"),
        (status = 409, description = "Request is no longer pending")
    )
)]
#[axum::debug_handler]
pub async fn cancel(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let request = state.shadowing_service.cancel(id).await?;
    Ok(Json(ShadowingRequestResponse::from(request)))
}

#[utoipa::path(
    post,
    path = "/api/shadowing-requests/{id}/approve",
    params(
        ("id" = Uuid, Path, description = "Shadowing request ID")
    ),
    responses(
        (status = 200, description = "Request approved", body = Json<ShadowingRequestResponse>),
        (status = 404, description = "Request not found"),
        (status = 409, description = "Request is no longer pending")
    )
)]
#[axum::debug_handler]
pub async fn approve(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let request = state.shadowing_service.approve(id).await?;
    Ok(Json(ShadowingRequestResponse::from(request)))
}

#[utoipa::path(
    post,
    path = "/api/shadowing-requests/{id}/reject",
    params(
        ("id" = Uuid, Path, description = "Shadowing request ID")
    ),
    request_body = RejectShadowingPayload,
    responses(
        (status = 200, description = "Request rejected", body = Json<ShadowingRequestResponse>),
        (status = 404, description = "Request not found"),
        (status = 409, description = "Request is no longer pending")
    )
)]
#[axum::debug_handler]
pub async fn reject(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<RejectShadowingPayload>,
) -> Result<impl IntoResponse> {
    let request = state.shadowing_service.reject(id, payload.reason).await?;
    Ok(Json(ShadowingRequestResponse::from(request)))
}
