use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::{Error, Result};

/// PENDING is the only state a request can leave; the other three are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ShadowingStatus {
    Pending,
    Cancelled,
    Approved,
    Rejected,
}

impl ShadowingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ShadowingStatus::Pending => "PENDING",
            ShadowingStatus::Cancelled => "CANCELLED",
            ShadowingStatus::Approved => "APPROVED",
            ShadowingStatus::Rejected => "REJECTED",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, ShadowingStatus::Pending)
    }
}

impl fmt::Display for ShadowingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ShadowingStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(ShadowingStatus::Pending),
            "CANCELLED" => Ok(ShadowingStatus::Cancelled),
            "APPROVED" => Ok(ShadowingStatus::Approved),
            "REJECTED" => Ok(ShadowingStatus::Rejected),
            other => Err(format!("unknown shadowing status: {}", other)),
        }
    }
}

impl TryFrom<String> for ShadowingStatus {
    type Error = String;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        value.parse()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct ShadowingRequest {
    pub id: Uuid,
    pub interview_id: Uuid,
    pub shadower_id: Uuid,
    #[sqlx(try_from = "String")]
    pub status: ShadowingStatus,
    pub reason: Option<String>,
}

impl ShadowingRequest {
    pub fn pending(interview_id: Uuid, shadower_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            interview_id,
            shadower_id,
            status: ShadowingStatus::Pending,
            reason: None,
        }
    }

    pub fn cancel(&mut self) -> Result<()> {
        self.leave_pending(ShadowingStatus::Cancelled)
    }

    pub fn approve(&mut self) -> Result<()> {
        self.leave_pending(ShadowingStatus::Approved)
    }

    pub fn reject(&mut self, reason: Option<String>) -> Result<()> {
        self.leave_pending(ShadowingStatus::Rejected)?;
        self.reason = reason;
        Ok(())
    }

    fn leave_pending(&mut self, next: ShadowingStatus) -> Result<()> {
        if self.status.is_terminal() {
            return Err(Error::InvalidTransition {
                current: self.status,
            });
        }
        self.status = next;
        Ok(())
    }
}
