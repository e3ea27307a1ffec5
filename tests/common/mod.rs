#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    response::Response,
    Router,
};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::{Duration, Utc};
use serde_json::{json, Value as JsonValue};
use tower::ServiceExt;
use uuid::Uuid;
use wiremock::MockServer;

use interview_hub_backend::{
    config::{Config, GoogleConfig},
    database::{InterviewStore, ProfileStore, ShadowingRequestStore},
    error::Result,
    models::{
        interview::{Interview, InterviewStatus},
        profile::Profile,
        shadowing_request::ShadowingRequest,
    },
    routes,
    utils::crypto::TokenVault,
    AppState,
};

pub const JWT_SECRET: &str = "integration-jwt-secret";
pub const VAULT_KEY: &str = "integration-vault-key";
pub const FRONTEND_URL: &str = "http://localhost:4200";
pub const SEEDED_ACCESS_TOKEN: &str = "ya29.seeded";

/// All three stores in one place so interview deletion can cascade.
#[derive(Default)]
pub struct MemoryDb {
    pub profiles: Mutex<HashMap<Uuid, Profile>>,
    pub interviews: Mutex<HashMap<Uuid, Interview>>,
    pub requests: Mutex<HashMap<Uuid, ShadowingRequest>>,
}

impl MemoryDb {
    pub fn profile(&self, id: Uuid) -> Option<Profile> {
        self.profiles.lock().unwrap().get(&id).cloned()
    }

    pub fn profile_count(&self) -> usize {
        self.profiles.lock().unwrap().len()
    }

    pub fn interview(&self, id: Uuid) -> Option<Interview> {
        self.interviews.lock().unwrap().get(&id).cloned()
    }

    pub fn request(&self, id: Uuid) -> Option<ShadowingRequest> {
        self.requests.lock().unwrap().get(&id).cloned()
    }
}

#[async_trait]
impl ProfileStore for MemoryDb {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Profile>> {
        Ok(self.profile(id))
    }

    async fn find_by_google_sub(&self, google_sub: &str) -> Result<Option<Profile>> {
        Ok(self
            .profiles
            .lock()
            .unwrap()
            .values()
            .find(|p| p.google_sub.as_deref() == Some(google_sub))
            .cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Profile>> {
        Ok(self
            .profiles
            .lock()
            .unwrap()
            .values()
            .find(|p| p.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn save(&self, profile: &Profile) -> Result<Profile> {
        let mut profiles = self.profiles.lock().unwrap();
        let mut saved = profile.clone();
        if let Some(existing) = profiles.get(&profile.id) {
            if existing.google_sub.is_some() {
                saved.google_sub = existing.google_sub.clone();
            }
        }
        profiles.insert(saved.id, saved.clone());
        Ok(saved)
    }
}

#[async_trait]
impl InterviewStore for MemoryDb {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Interview>> {
        Ok(self.interview(id))
    }

    async fn save(&self, interview: &Interview) -> Result<Interview> {
        self.interviews
            .lock()
            .unwrap()
            .insert(interview.id, interview.clone());
        Ok(interview.clone())
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        self.interviews.lock().unwrap().remove(&id);
        self.requests
            .lock()
            .unwrap()
            .retain(|_, r| r.interview_id != id);
        Ok(())
    }

    async fn list(&self, offset: i64, limit: i64) -> Result<Vec<Interview>> {
        let mut items: Vec<Interview> = self.interviews.lock().unwrap().values().cloned().collect();
        items.sort_by(|a, b| b.start_time.cmp(&a.start_time));
        Ok(items
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect())
    }

    async fn count(&self) -> Result<i64> {
        Ok(self.interviews.lock().unwrap().len() as i64)
    }
}

#[async_trait]
impl ShadowingRequestStore for MemoryDb {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<ShadowingRequest>> {
        Ok(self.request(id))
    }

    async fn save(&self, request: &ShadowingRequest) -> Result<ShadowingRequest> {
        self.requests
            .lock()
            .unwrap()
            .insert(request.id, request.clone());
        Ok(request.clone())
    }

    async fn list_by_interview(&self, interview_id: Uuid) -> Result<Vec<ShadowingRequest>> {
        Ok(self
            .requests
            .lock()
            .unwrap()
            .values()
            .filter(|r| r.interview_id == interview_id)
            .cloned()
            .collect())
    }

    async fn list_by_shadower(&self, shadower_id: Uuid) -> Result<Vec<ShadowingRequest>> {
        Ok(self
            .requests
            .lock()
            .unwrap()
            .values()
            .filter(|r| r.shadower_id == shadower_id)
            .cloned()
            .collect())
    }
}

pub fn test_config(google_base: &str) -> Config {
    Config {
        server_address: "127.0.0.1:0".into(),
        database_url: "postgres://unused".into(),
        jwt_secret: JWT_SECRET.into(),
        jwt_expiration_seconds: 36000,
        token_encryption_key: VAULT_KEY.into(),
        google: GoogleConfig {
            client_id: "test-client-id".into(),
            client_secret: "test-client-secret".into(),
            redirect_uri: "http://localhost:8080/auth/google/callback".into(),
            auth_url: "https://accounts.google.com/o/oauth2/v2/auth".into(),
            token_url: format!("{}/token", google_base),
            calendar_api_url: format!("{}/calendar/v3", google_base),
        },
        frontend_url: FRONTEND_URL.into(),
        required_domain: "gm2dev.com".into(),
    }
}

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub db: Arc<MemoryDb>,
    pub google: MockServer,
    pub vault: TokenVault,
}

impl TestApp {
    pub async fn spawn() -> Self {
        let google = MockServer::start().await;
        let db = Arc::new(MemoryDb::default());
        let state = AppState::from_stores(
            &test_config(&google.uri()),
            db.clone(),
            db.clone(),
            db.clone(),
        )
        .expect("app state");

        Self {
            router: routes::router(state.clone()),
            state,
            db,
            google,
            vault: TokenVault::new(VAULT_KEY).expect("vault"),
        }
    }

    /// A profile holding a live, vault-sealed Google credential.
    pub async fn seed_profile(&self, sub: &str, email: &str) -> Profile {
        let mut profile = Profile::first_login(sub, email);
        profile.google_access_token = Some(self.vault.seal(SEEDED_ACCESS_TOKEN).unwrap());
        profile.google_refresh_token = Some(self.vault.seal("1//seeded-refresh").unwrap());
        profile.google_token_expiry = Some(Utc::now() + Duration::hours(1));
        ProfileStore::save(self.db.as_ref(), &profile).await.unwrap()
    }

    pub async fn seed_interview(
        &self,
        interviewer: &Profile,
        event_id: Option<&str>,
        starts_in_days: i64,
    ) -> Interview {
        let start = Utc::now() + Duration::days(starts_in_days);
        let interview = Interview {
            id: Uuid::new_v4(),
            interviewer_id: interviewer.id,
            google_event_id: event_id.map(str::to_string),
            candidate_info: Some(json!({"name": "Jane Doe"})),
            tech_stack: "Java".into(),
            start_time: start,
            end_time: start + Duration::hours(1),
            status: InterviewStatus::Scheduled,
        };
        InterviewStore::save(self.db.as_ref(), &interview)
            .await
            .unwrap()
    }

    pub fn bearer(&self, profile: &Profile) -> String {
        format!(
            "Bearer {}",
            self.state.session_issuer.issue(profile).unwrap()
        )
    }

    pub async fn send(&self, request: Request<Body>) -> Response {
        self.router.clone().oneshot(request).await.unwrap()
    }

    pub async fn send_json(&self, request: Request<Body>) -> (StatusCode, JsonValue) {
        let response = self.send(request).await;
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            JsonValue::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }
}

pub fn authed(method: &str, uri: &str, bearer: &str, body: Option<JsonValue>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, bearer);
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

/// Unsigned identity token; only the payload is read.
pub fn id_token(sub: &str, email: &str, hd: Option<&str>) -> String {
    let mut claims = json!({"sub": sub, "email": email, "email_verified": true});
    if let Some(hd) = hd {
        claims["hd"] = json!(hd);
    }
    format!(
        "{}.{}.signature",
        URL_SAFE_NO_PAD.encode(br#"{"alg":"RS256","typ":"JWT"}"#),
        URL_SAFE_NO_PAD.encode(claims.to_string())
    )
}
