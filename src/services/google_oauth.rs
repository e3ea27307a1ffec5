use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use reqwest::Client;
use serde::Deserialize;
use tracing::error;

use crate::config::GoogleConfig;
use crate::error::{Error, Result};

/// Token endpoint response, for both code exchange and refresh.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenGrant {
    pub access_token: String,
    /// Omitted by Google on most repeat consents and on refresh.
    pub refresh_token: Option<String>,
    pub expires_in: Option<i64>,
    pub id_token: Option<String>,
}

/// The identity token claims the login gate reads.
#[derive(Debug, Clone, Deserialize)]
pub struct IdTokenClaims {
    pub sub: String,
    pub email: Option<String>,
    /// Hosted domain; absent for personal accounts.
    pub hd: Option<String>,
}

#[derive(Clone)]
pub struct GoogleOAuthClient {
    http: Client,
    client_id: String,
    client_secret: String,
    token_url: String,
}

impl GoogleOAuthClient {
    pub fn new(google: &GoogleConfig, http: Client) -> Self {
        Self {
            http,
            client_id: google.client_id.clone(),
            client_secret: google.client_secret.clone(),
            token_url: google.token_url.clone(),
        }
    }

    pub async fn exchange_code(&self, code: &str, redirect_uri: &str) -> Result<TokenGrant> {
        self.request_token(&[
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("code", code),
            ("grant_type", "authorization_code"),
            ("redirect_uri", redirect_uri),
        ])
        .await
    }

    pub async fn refresh_access_token(&self, refresh_token: &str) -> Result<TokenGrant> {
        self.request_token(&[
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("refresh_token", refresh_token),
            ("grant_type", "refresh_token"),
        ])
        .await
    }

    async fn request_token(&self, params: &[(&str, &str)]) -> Result<TokenGrant> {
        let response = self
            .http
            .post(&self.token_url)
            .form(params)
            .send()
            .await
            .map_err(|e| {
                error!(error = ?e, "Google token endpoint unreachable");
                Error::TransientExchange(format!("token endpoint unreachable: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(status = status.as_u16(), body = %body, "Google token endpoint rejected request");
            return Err(Error::TransientExchange(format!(
                "token endpoint returned {}",
                status.as_u16()
            )));
        }

        response.json::<TokenGrant>().await.map_err(|e| {
            Error::TransientExchange(format!("unreadable token endpoint response: {}", e))
        })
    }
}

/// Reads the payload of an identity token received straight from the token
/// endpoint over TLS, which is what vouches for it here.
pub fn decode_id_token(id_token: &str) -> Result<IdTokenClaims> {
    let payload = id_token
        .split('.')
        .nth(1)
        .ok_or_else(|| Error::TransientExchange("malformed id_token".into()))?;
    let bytes = URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .map_err(|e| Error::TransientExchange(format!("malformed id_token payload: {}", e)))?;
    serde_json::from_slice::<IdTokenClaims>(&bytes)
        .map_err(|e| Error::TransientExchange(format!("unreadable id_token claims: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn id_token(claims: serde_json::Value) -> String {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"RS256","typ":"JWT"}"#);
        let payload = URL_SAFE_NO_PAD.encode(claims.to_string());
        format!("{}.{}.signature", header, payload)
    }

    #[test]
    fn decodes_hosted_domain_subject_and_email() {
        let token = id_token(json!({
            "sub": "sub-123",
            "email": "user@gm2dev.com",
            "hd": "gm2dev.com",
            "iss": "https://accounts.google.com"
        }));
        let claims = decode_id_token(&token).unwrap();
        assert_eq!(claims.sub, "sub-123");
        assert_eq!(claims.email.as_deref(), Some("user@gm2dev.com"));
        assert_eq!(claims.hd.as_deref(), Some("gm2dev.com"));
    }

    #[test]
    fn personal_accounts_have_no_hosted_domain() {
        let token = id_token(json!({"sub": "sub-9", "email": "someone@gmail.com"}));
        assert_eq!(decode_id_token(&token).unwrap().hd, None);
    }

    #[test]
    fn garbage_is_a_transient_exchange_error() {
        assert!(matches!(
            decode_id_token("not-a-jwt"),
            Err(Error::TransientExchange(_))
        ));
        assert!(matches!(
            decode_id_token("a.%%%.c"),
            Err(Error::TransientExchange(_))
        ));
        let no_subject = id_token(json!({"email": "x@gm2dev.com"}));
        assert!(matches!(
            decode_id_token(&no_subject),
            Err(Error::TransientExchange(_))
        ));
    }
}
