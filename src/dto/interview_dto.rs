use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::dto::shadowing_dto::ShadowingRequestResponse;
use crate::models::interview::{Interview, InterviewStatus};
use crate::services::interview_service::{InterviewDetail, InterviewList};
use crate::utils::validation::{in_the_future, not_blank, ordered_window};

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[validate(schema(function = "create_window"))]
pub struct CreateInterviewPayload {
    pub interviewer_id: Uuid,
    pub candidate_info: Option<JsonValue>,
    #[validate(custom(function = "not_blank"))]
    pub tech_stack: String,
    #[validate(custom(function = "in_the_future"))]
    pub start_time: DateTime<Utc>,
    #[validate(custom(function = "in_the_future"))]
    pub end_time: DateTime<Utc>,
}

/// Full replacement of the mutable interview fields.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[validate(schema(function = "update_window"))]
pub struct UpdateInterviewPayload {
    pub candidate_info: Option<JsonValue>,
    #[validate(custom(function = "not_blank"))]
    pub tech_stack: String,
    #[validate(custom(function = "in_the_future"))]
    pub start_time: DateTime<Utc>,
    #[validate(custom(function = "in_the_future"))]
    pub end_time: DateTime<Utc>,
    pub status: InterviewStatus,
}

fn create_window(payload: &CreateInterviewPayload) -> Result<(), ValidationError> {
    ordered_window(&payload.start_time, &payload.end_time)
}

fn update_window(payload: &UpdateInterviewPayload) -> Result<(), ValidationError> {
    ordered_window(&payload.start_time, &payload.end_time)
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct InterviewListQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterviewResponse {
    pub id: Uuid,
    pub interviewer_id: Uuid,
    pub google_event_id: Option<String>,
    pub candidate_info: Option<JsonValue>,
    pub tech_stack: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub status: InterviewStatus,
}

impl From<Interview> for InterviewResponse {
    fn from(interview: Interview) -> Self {
        Self {
            id: interview.id,
            interviewer_id: interview.interviewer_id,
            google_event_id: interview.google_event_id,
            candidate_info: interview.candidate_info,
            tech_stack: interview.tech_stack,
            start_time: interview.start_time,
            end_time: interview.end_time,
            status: interview.status,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterviewDetailResponse {
    #[serde(flatten)]
    pub interview: InterviewResponse,
    pub shadowing_requests: Vec<ShadowingRequestResponse>,
}

impl From<InterviewDetail> for InterviewDetailResponse {
    fn from(detail: InterviewDetail) -> Self {
        Self {
            interview: detail.interview.into(),
            shadowing_requests: detail
                .shadowing_requests
                .into_iter()
                .map(Into::into)
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterviewListResponse {
    pub items: Vec<InterviewResponse>,
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
    pub total_pages: i64,
}

impl From<InterviewList> for InterviewListResponse {
    fn from(list: InterviewList) -> Self {
        Self {
            items: list.items.into_iter().map(Into::into).collect(),
            total: list.total,
            page: list.page,
            per_page: list.per_page,
            total_pages: list.total_pages,
        }
    }
}
