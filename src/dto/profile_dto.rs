use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::profile::Profile;

/// Public view of a profile. Provider credentials never leave the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileResponse {
    pub id: Uuid,
    pub email: String,
    pub role: String,
    pub calendar_email: Option<String>,
}

impl From<Profile> for ProfileResponse {
    fn from(profile: Profile) -> Self {
        Self {
            id: profile.id,
            email: profile.email,
            role: profile.role,
            calendar_email: profile.calendar_email,
        }
    }
}
