//! Google Calendar bridge.
//!
//! Every call first makes sure the interviewer's access credential is live,
//! refreshing and persisting it when the stored expiry has passed. Two calls
//! racing on the same expired profile may both refresh; the last save wins.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, RequestBuilder, Response};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use tracing::{debug, error, warn};
use url::Url;
use uuid::Uuid;

use crate::database::ProfileStore;
use crate::error::{Error, Result};
use crate::models::{interview::Interview, profile::Profile};
use crate::services::google_oauth::GoogleOAuthClient;
use crate::utils::{crypto::TokenVault, time};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CalendarBridge: Send + Sync {
    async fn create_event(&self, interviewer: &Profile, interview: &Interview) -> Result<String>;

    async fn update_event(&self, interviewer: &Profile, interview: &Interview) -> Result<()>;

    async fn delete_event(&self, interviewer: &Profile, event_id: &str) -> Result<()>;

    /// Read-modify-write of the attendee list; concurrent additions to the
    /// same event can lose one of the attendees.
    async fn add_attendee(
        &self,
        interviewer: &Profile,
        event_id: &str,
        attendee_email: &str,
    ) -> Result<()>;
}

/// Outcome of a calendar side effect attached to a scheduling operation.
/// The calendar is a projection, so callers settle a failure into a log
/// line instead of failing the operation.
#[must_use = "calendar outcomes must be settled explicitly"]
#[derive(Debug)]
pub enum CalendarSync<T> {
    Synced(T),
    /// Nothing to sync, e.g. no event attached.
    Skipped,
    Failed(Error),
}

impl<T> From<Result<T>> for CalendarSync<T> {
    fn from(result: Result<T>) -> Self {
        match result {
            Ok(value) => CalendarSync::Synced(value),
            Err(err) => CalendarSync::Failed(err),
        }
    }
}

impl<T> CalendarSync<T> {
    pub fn settle(self, action: &str, subject_id: Uuid) -> Option<T> {
        match self {
            CalendarSync::Synced(value) => Some(value),
            CalendarSync::Skipped => None,
            CalendarSync::Failed(err @ Error::Decryption(_)) => {
                error!(%subject_id, action, error = %err, "stored calendar credential is unreadable");
                None
            }
            CalendarSync::Failed(err) => {
                warn!(%subject_id, action, error = %err, "calendar sync failed, continuing without it");
                None
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDateTime {
    pub date_time: DateTime<Utc>,
}

/// Keeps whatever else Google reports about an attendee so a patch does
/// not wipe response status and the like.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventAttendee {
    pub email: String,
    #[serde(flatten)]
    pub details: Map<String, JsonValue>,
}

impl EventAttendee {
    pub fn new(email: &str) -> Self {
        Self {
            email: email.to_string(),
            details: Map::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEvent {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<EventDateTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<EventDateTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attendees: Option<Vec<EventAttendee>>,
}

#[derive(Debug, Deserialize)]
struct CreatedEvent {
    id: String,
}

#[derive(Debug, Default, Deserialize)]
struct EventAttendees {
    #[serde(default)]
    attendees: Option<Vec<EventAttendee>>,
}

pub fn build_event(interview: &Interview) -> CalendarEvent {
    let mut description = format!("Tech Stack: {}", interview.tech_stack);
    if let Some(info) = &interview.candidate_info {
        description.push_str(&format!("\nCandidate Info: {}", info));
    }

    CalendarEvent {
        id: None,
        summary: Some(format!(
            "{} Interview - {}",
            interview.tech_stack,
            interview.candidate_name()
        )),
        description: Some(description),
        start: Some(EventDateTime {
            date_time: interview.start_time,
        }),
        end: Some(EventDateTime {
            date_time: interview.end_time,
        }),
        attendees: None,
    }
}

#[derive(Clone)]
pub struct GoogleCalendarService {
    http: Client,
    api_base: String,
    oauth: GoogleOAuthClient,
    vault: Arc<TokenVault>,
    profiles: Arc<dyn ProfileStore>,
}

impl GoogleCalendarService {
    pub fn new(
        http: Client,
        api_base: String,
        oauth: GoogleOAuthClient,
        vault: Arc<TokenVault>,
        profiles: Arc<dyn ProfileStore>,
    ) -> Self {
        Self {
            http,
            api_base,
            oauth,
            vault,
            profiles,
        }
    }

    /// Check expiry, refresh and persist if needed, then hand back a usable
    /// access credential.
    async fn access_token(&self, profile: &Profile) -> Result<String> {
        let now = time::now();
        if !profile.credentials_expired(now) {
            return self
                .vault
                .decrypt(profile.google_access_token.as_deref())?
                .ok_or_else(|| {
                    Error::Calendar(format!(
                        "profile {} has no calendar access credential",
                        profile.id
                    ))
                });
        }

        let refresh_token = self
            .vault
            .decrypt(profile.google_refresh_token.as_deref())?
            .ok_or_else(|| {
                Error::Calendar(format!(
                    "profile {} has an expired credential and no refresh credential",
                    profile.id
                ))
            })?;

        let grant = self
            .oauth
            .refresh_access_token(&refresh_token)
            .await
            .map_err(|e| Error::Calendar(format!("credential refresh failed: {}", e)))?;

        let mut refreshed = profile.clone();
        refreshed.google_access_token = Some(self.vault.seal(&grant.access_token)?);
        refreshed.google_token_expiry = Some(time::expires_after(
            now,
            grant.expires_in.unwrap_or(time::DEFAULT_TTL_SECONDS),
        ));
        self.profiles.save(&refreshed).await?;
        debug!(profile_id = %profile.id, "refreshed Google access credential");

        Ok(grant.access_token)
    }

    fn events_url(&self, calendar_id: &str, event_id: Option<&str>) -> Result<Url> {
        let mut url = Url::parse(&self.api_base)
            .map_err(|e| Error::Config(format!("invalid calendar API URL: {}", e)))?;
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| Error::Config("calendar API URL cannot be a base".into()))?;
            segments
                .pop_if_empty()
                .push("calendars")
                .push(calendar_id)
                .push("events");
            if let Some(event_id) = event_id {
                segments.push(event_id);
            }
        }
        Ok(url)
    }

    async fn send(&self, request: RequestBuilder, action: &str) -> Result<Response> {
        let response = request
            .send()
            .await
            .map_err(|e| Error::Calendar(format!("{} request failed: {}", action, e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Calendar(format!(
                "{} returned {}: {}",
                action,
                status.as_u16(),
                body
            )));
        }
        Ok(response)
    }
}

#[async_trait]
impl CalendarBridge for GoogleCalendarService {
    async fn create_event(&self, interviewer: &Profile, interview: &Interview) -> Result<String> {
        let token = self.access_token(interviewer).await?;
        let url = self.events_url(interviewer.calendar_id(), None)?;

        let response = self
            .send(
                self.http.post(url).bearer_auth(token).json(&build_event(interview)),
                "create event",
            )
            .await?;
        let created: CreatedEvent = response
            .json()
            .await
            .map_err(|e| Error::Calendar(format!("unreadable created event: {}", e)))?;

        debug!(event_id = %created.id, interview_id = %interview.id, "created calendar event");
        Ok(created.id)
    }

    async fn update_event(&self, interviewer: &Profile, interview: &Interview) -> Result<()> {
        let event_id = interview.google_event_id.as_deref().ok_or_else(|| {
            Error::Calendar(format!("interview {} has no calendar event", interview.id))
        })?;
        let token = self.access_token(interviewer).await?;
        let url = self.events_url(interviewer.calendar_id(), Some(event_id))?;

        self.send(
            self.http.put(url).bearer_auth(token).json(&build_event(interview)),
            "update event",
        )
        .await?;

        debug!(event_id, "updated calendar event");
        Ok(())
    }

    async fn delete_event(&self, interviewer: &Profile, event_id: &str) -> Result<()> {
        let token = self.access_token(interviewer).await?;
        let url = self.events_url(interviewer.calendar_id(), Some(event_id))?;

        self.send(self.http.delete(url).bearer_auth(token), "delete event")
            .await?;

        debug!(event_id, "deleted calendar event");
        Ok(())
    }

    async fn add_attendee(
        &self,
        interviewer: &Profile,
        event_id: &str,
        attendee_email: &str,
    ) -> Result<()> {
        let token = self.access_token(interviewer).await?;
        let url = self.events_url(interviewer.calendar_id(), Some(event_id))?;

        let current: EventAttendees = self
            .send(self.http.get(url.clone()).bearer_auth(&token), "get event")
            .await?
            .json()
            .await
            .map_err(|e| Error::Calendar(format!("unreadable event: {}", e)))?;

        let mut attendees = current.attendees.unwrap_or_default();
        attendees.push(EventAttendee::new(attendee_email));

        let patch = CalendarEvent {
            attendees: Some(attendees),
            ..CalendarEvent::default()
        };
        self.send(
            self.http
                .patch(url)
                .query(&[("sendUpdates", "all")])
                .bearer_auth(&token)
                .json(&patch),
            "patch attendees",
        )
        .await?;

        debug!(event_id, attendee = attendee_email, "added calendar attendee");
        Ok(())
    }
}
