use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

pub const DEFAULT_ROLE: &str = "interviewer";

/// Provider-side calendar used when a profile has no calendar address.
pub const PRIMARY_CALENDAR: &str = "primary";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Profile {
    pub id: Uuid,
    pub email: String,
    pub role: String,
    pub calendar_email: Option<String>,
    #[serde(skip_serializing)]
    pub google_sub: Option<String>,
    /// Vault ciphertext, never plaintext.
    #[serde(skip_serializing)]
    pub google_access_token: Option<String>,
    /// Vault ciphertext, never plaintext.
    #[serde(skip_serializing)]
    pub google_refresh_token: Option<String>,
    #[serde(skip_serializing)]
    pub google_token_expiry: Option<DateTime<Utc>>,
}

impl Profile {
    /// A profile seen for the first time at login.
    pub fn first_login(google_sub: &str, email: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            email: email.to_string(),
            role: DEFAULT_ROLE.to_string(),
            calendar_email: Some(email.to_string()),
            google_sub: Some(google_sub.to_string()),
            google_access_token: None,
            google_refresh_token: None,
            google_token_expiry: None,
        }
    }

    pub fn calendar_id(&self) -> &str {
        self.calendar_email
            .as_deref()
            .filter(|address| !address.trim().is_empty())
            .unwrap_or(PRIMARY_CALENDAR)
    }

    pub fn credentials_expired(&self, now: DateTime<Utc>) -> bool {
        self.google_token_expiry
            .map(|expiry| expiry < now)
            .unwrap_or(false)
    }
}
