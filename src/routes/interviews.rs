use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::interview_dto::{
        CreateInterviewPayload, InterviewDetailResponse, InterviewListQuery,
        InterviewListResponse, InterviewResponse, UpdateInterviewPayload,
    },
    error::Result,
    AppState,
};

#[utoipa::path(
    post,
    path = "/api/interviews",
    request_body = CreateInterviewPayload,
    responses(
        (status = 201, description = "Interview scheduled", body = Json<InterviewResponse>),
        (status = 400, description = "Invalid payload"),
        (status = 404, description = "Interviewer not found")
    )
)]
#[axum::debug_handler]
pub async fn create_interview(
    State(state): State<AppState>,
    Json(payload): Json<CreateInterviewPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let interview = state.interview_service.create(payload).await?;
    Ok((StatusCode::CREATED, Json(InterviewResponse::from(interview))))
}

#[utoipa::path(
    get,
    path = "/api/interviews",
    params(
        ("page" = Option<i64>, Query, description = "Page number, starting at 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page")
    ),
    responses(
        (status = 200, description = "Interviews, newest start time first", body = Json<InterviewListResponse>)
    )
)]
#[axum::debug_handler]
pub async fn list_interviews(
    State(state): State<AppState>,
    Query(query): Query<InterviewListQuery>,
) -> Result<impl IntoResponse> {
    let result = state.interview_service.list(query).await?;
    Ok(Json(InterviewListResponse::from(result)))
}

#[utoipa::path(
    get,
    path = "/api/interviews/{id}",
    params(
        ("id" = Uuid, Path, description = "Interview ID")
    ),
    responses(
        (status = 200, description = "Interview with its shadowing requests", body = Json<InterviewDetailResponse>),
        (status = 404, description = "Interview not found")
    )
)]
#[axum::debug_handler]
pub async fn get_interview(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let detail = state.interview_service.get_detail(id).await?;
    Ok(Json(InterviewDetailResponse::from(detail)))
}

#[utoipa::path(
    put,
    path = "/api/interviews/{id}",
    params(
        ("id" = Uuid, Path, description = "Interview ID")
    ),
    request_body = UpdateInterviewPayload,
    responses(
        (status = 200, description = "Interview updated", body = Json<InterviewResponse>),
        (status = 400, description = "Invalid payload"),
        (status = 404, description = "Interview not found")
    )
)]
#[axum::debug_handler]
pub async fn update_interview(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateInterviewPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let interview = state.interview_service.update(id, payload).await?;
    Ok(Json(InterviewResponse::from(interview)))
}

#[utoipa::path(
    delete,
    path = "/api/interviews/{id}",
    params(
        ("id" = Uuid, Path, description = "Interview ID")
    ),
    responses(
        (status = 204, description = "Interview deleted"),
        (status = 404, description = "Interview not found")
    )
)]
#[axum::debug_handler]
pub async fn delete_interview(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    state.interview_service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
