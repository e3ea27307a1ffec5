pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod utils;

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use sqlx::PgPool;

use crate::config::Config;
use crate::database::{
    InterviewStore, PgInterviewStore, PgProfileStore, PgShadowingRequestStore, ProfileStore,
    ShadowingRequestStore,
};
use crate::error::{Error, Result};
use crate::services::{
    auth_service::AuthService, calendar_service::GoogleCalendarService,
    google_oauth::GoogleOAuthClient, interview_service::InterviewService,
    session_service::SessionIssuer, shadowing_service::ShadowingService,
};
use crate::utils::crypto::TokenVault;

const PROVIDER_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Clone)]
pub struct AppState {
    pub profiles: Arc<dyn ProfileStore>,
    pub session_issuer: Arc<SessionIssuer>,
    pub auth_service: AuthService,
    pub interview_service: InterviewService,
    pub shadowing_service: ShadowingService,
    pub frontend_url: String,
}

impl AppState {
    pub fn new(pool: PgPool, config: &Config) -> Result<Self> {
        Self::from_stores(
            config,
            Arc::new(PgProfileStore::new(pool.clone())),
            Arc::new(PgInterviewStore::new(pool.clone())),
            Arc::new(PgShadowingRequestStore::new(pool)),
        )
    }

    /// Wires every service over the given stores. Google endpoints come
    /// from `config`, so tests can point them at a local mock server.
    pub fn from_stores(
        config: &Config,
        profiles: Arc<dyn ProfileStore>,
        interviews: Arc<dyn InterviewStore>,
        requests: Arc<dyn ShadowingRequestStore>,
    ) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(PROVIDER_TIMEOUT)
            .build()
            .map_err(|e| Error::Config(format!("failed to build HTTP client: {}", e)))?;

        let vault = Arc::new(TokenVault::new(&config.token_encryption_key)?);
        let session_issuer = Arc::new(SessionIssuer::new(
            &config.jwt_secret,
            config.jwt_expiration_seconds,
        ));
        let oauth = GoogleOAuthClient::new(&config.google, http_client.clone());

        let calendar = Arc::new(GoogleCalendarService::new(
            http_client,
            config.google.calendar_api_url.clone(),
            oauth.clone(),
            vault.clone(),
            profiles.clone(),
        ));

        let auth_service = AuthService::new(
            &config.google,
            &config.required_domain,
            oauth,
            profiles.clone(),
            vault,
            session_issuer.clone(),
        );
        let interview_service = InterviewService::new(
            interviews.clone(),
            profiles.clone(),
            requests.clone(),
            calendar.clone(),
        );
        let shadowing_service =
            ShadowingService::new(requests, interviews, profiles.clone(), calendar);

        Ok(Self {
            profiles,
            session_issuer,
            auth_service,
            interview_service,
            shadowing_service,
            frontend_url: config.frontend_url.clone(),
        })
    }
}
