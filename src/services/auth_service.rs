use std::sync::Arc;

use tracing::{info, warn};
use url::Url;

use crate::config::GoogleConfig;
use crate::database::ProfileStore;
use crate::error::{Error, Result};
use crate::models::profile::Profile;
use crate::services::google_oauth::{decode_id_token, GoogleOAuthClient};
use crate::services::session_service::SessionIssuer;
use crate::utils::{crypto::TokenVault, time};

const SCOPES: &str = "openid email profile https://www.googleapis.com/auth/calendar.events";

#[derive(Debug, Clone, PartialEq)]
pub struct LoginOutcome {
    pub token: String,
    pub email: String,
    pub expires_in: i64,
}

#[derive(Clone)]
pub struct AuthService {
    oauth: GoogleOAuthClient,
    profiles: Arc<dyn ProfileStore>,
    vault: Arc<TokenVault>,
    sessions: Arc<SessionIssuer>,
    client_id: String,
    auth_url: String,
    redirect_uri: String,
    required_domain: String,
}

impl AuthService {
    pub fn new(
        google: &GoogleConfig,
        required_domain: &str,
        oauth: GoogleOAuthClient,
        profiles: Arc<dyn ProfileStore>,
        vault: Arc<TokenVault>,
        sessions: Arc<SessionIssuer>,
    ) -> Self {
        Self {
            oauth,
            profiles,
            vault,
            sessions,
            client_id: google.client_id.clone(),
            auth_url: google.auth_url.clone(),
            redirect_uri: google.redirect_uri.clone(),
            required_domain: required_domain.to_string(),
        }
    }

    pub fn build_authorization_url(&self) -> Result<String> {
        let url = Url::parse_with_params(
            &self.auth_url,
            &[
                ("client_id", self.client_id.as_str()),
                ("redirect_uri", self.redirect_uri.as_str()),
                ("response_type", "code"),
                ("scope", SCOPES),
                ("access_type", "offline"),
                ("prompt", "consent"),
                ("hd", self.required_domain.as_str()),
            ],
        )
        .map_err(|e| Error::Config(format!("invalid Google authorization URL: {}", e)))?;
        Ok(url.into())
    }

    /// Exchanges an authorization code, gates on the hosted domain, upserts
    /// the profile keyed by Google subject and issues a session token.
    /// Nothing is persisted unless the domain check passes.
    pub async fn complete_login(
        &self,
        code: &str,
        redirect_uri: Option<&str>,
    ) -> Result<LoginOutcome> {
        let redirect_uri = redirect_uri.unwrap_or(&self.redirect_uri);
        let grant = self.oauth.exchange_code(code, redirect_uri).await?;

        let id_token = grant
            .id_token
            .as_deref()
            .ok_or_else(|| Error::TransientExchange("token response has no id_token".into()))?;
        let identity = decode_id_token(id_token)?;

        if identity.hd.as_deref() != Some(self.required_domain.as_str()) {
            warn!(
                hosted_domain = identity.hd.as_deref().unwrap_or("<none>"),
                "login rejected: account outside the required domain"
            );
            return Err(Error::AccessDenied(format!(
                "Access restricted to @{} accounts",
                self.required_domain
            )));
        }

        let email = identity
            .email
            .ok_or_else(|| Error::TransientExchange("id_token has no email claim".into()))?;

        let mut profile = match self.profiles.find_by_google_sub(&identity.sub).await? {
            Some(existing) => existing,
            None => {
                info!("first login for {}", email);
                Profile::first_login(&identity.sub, &email)
            }
        };

        profile.email = email.clone();
        profile.calendar_email = Some(email.clone());
        profile.google_access_token = Some(self.vault.seal(&grant.access_token)?);
        if let Some(refresh_token) = grant.refresh_token.as_deref() {
            profile.google_refresh_token = Some(self.vault.seal(refresh_token)?);
        }
        if let Some(expires_in) = grant.expires_in {
            profile.google_token_expiry = Some(time::expires_after(time::now(), expires_in));
        }

        let profile = self.profiles.save(&profile).await?;
        let token = self.sessions.issue(&profile)?;

        Ok(LoginOutcome {
            token,
            email,
            expires_in: self.sessions.ttl_seconds(),
        })
    }
}
