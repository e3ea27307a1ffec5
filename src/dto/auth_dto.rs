use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize)]
pub struct GoogleCallbackQuery {
    pub code: String,
}

/// Code exchange for clients that run their own consent redirect.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenExchangeForm {
    pub code: String,
    pub redirect_uri: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

impl TokenResponse {
    pub fn bearer(access_token: String, expires_in: i64) -> Self {
        Self {
            access_token,
            token_type: "Bearer".to_string(),
            expires_in,
        }
    }
}
