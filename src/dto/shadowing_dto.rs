use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::shadowing_request::{ShadowingRequest, ShadowingStatus};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RejectShadowingPayload {
    #[serde(default)]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShadowingRequestResponse {
    pub id: Uuid,
    pub interview_id: Uuid,
    pub shadower_id: Uuid,
    pub status: ShadowingStatus,
    pub reason: Option<String>,
}

impl From<ShadowingRequest> for ShadowingRequestResponse {
    fn from(request: ShadowingRequest) -> Self {
        Self {
            id: request.id,
            interview_id: request.interview_id,
            shadower_id: request.shadower_id,
            status: request.status,
            reason: request.reason,
        }
    }
}
