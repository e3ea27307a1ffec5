use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InterviewStatus {
    Scheduled,
    Completed,
    Cancelled,
}

impl InterviewStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InterviewStatus::Scheduled => "SCHEDULED",
            InterviewStatus::Completed => "COMPLETED",
            InterviewStatus::Cancelled => "CANCELLED",
        }
    }
}

impl fmt::Display for InterviewStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InterviewStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "SCHEDULED" => Ok(InterviewStatus::Scheduled),
            "COMPLETED" => Ok(InterviewStatus::Completed),
            "CANCELLED" => Ok(InterviewStatus::Cancelled),
            other => Err(format!("unknown interview status: {}", other)),
        }
    }
}

impl TryFrom<String> for InterviewStatus {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Interview {
    pub id: Uuid,
    pub interviewer_id: Uuid,
    pub google_event_id: Option<String>,
    pub candidate_info: Option<JsonValue>,
    pub tech_stack: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    #[sqlx(try_from = "String")]
    pub status: InterviewStatus,
}

impl Interview {
    /// Name shown on the calendar invite.
    pub fn candidate_name(&self) -> String {
        self.candidate_info
            .as_ref()
            .and_then(|info| info.get("name"))
            .filter(|name| !name.is_null())
            .map(|name| match name {
                JsonValue::String(s) => s.clone(),
                other => other.to_string(),
            })
            .unwrap_or_else(|| "Unknown".to_string())
    }
}
