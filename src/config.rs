use crate::error::{Error, Result};
use dotenvy::dotenv;
use std::env;
use std::sync::OnceLock;

pub const REQUIRED_DOMAIN: &str = "gm2dev.com";

const DEFAULT_JWT_EXPIRATION_SECONDS: i64 = 36000;
const DEFAULT_GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const DEFAULT_GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const DEFAULT_GOOGLE_CALENDAR_API_URL: &str = "https://www.googleapis.com/calendar/v3";

#[derive(Debug, Clone)]
pub struct Config {
    pub server_address: String,
    pub database_url: String,
    pub jwt_secret: String,
    pub jwt_expiration_seconds: i64,
    pub token_encryption_key: String,
    pub google: GoogleConfig,
    pub frontend_url: String,
    pub required_domain: String,
}

/// OAuth client registration plus the provider endpoints it talks to.
#[derive(Debug, Clone)]
pub struct GoogleConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    pub auth_url: String,
    pub token_url: String,
    pub calendar_api_url: String,
}

pub static CONFIG: OnceLock<Config> = OnceLock::new();

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        Ok(Self {
            server_address: get_env("SERVER_ADDRESS")?,
            database_url: get_env("DATABASE_URL")?,
            jwt_secret: get_env("JWT_SECRET")?,
            jwt_expiration_seconds: get_env_parse_or(
                "JWT_EXPIRATION_SECONDS",
                DEFAULT_JWT_EXPIRATION_SECONDS,
            )?,
            token_encryption_key: get_env("TOKEN_ENCRYPTION_KEY")?,
            google: GoogleConfig {
                client_id: get_env("GOOGLE_CLIENT_ID")?,
                client_secret: get_env("GOOGLE_CLIENT_SECRET")?,
                redirect_uri: get_env("GOOGLE_REDIRECT_URI")?,
                auth_url: get_env_or("GOOGLE_AUTH_URL", DEFAULT_GOOGLE_AUTH_URL),
                token_url: get_env_or("GOOGLE_TOKEN_URL", DEFAULT_GOOGLE_TOKEN_URL),
                calendar_api_url: get_env_or(
                    "GOOGLE_CALENDAR_API_URL",
                    DEFAULT_GOOGLE_CALENDAR_API_URL,
                ),
            },
            frontend_url: get_env("FRONTEND_URL")?,
            required_domain: REQUIRED_DOMAIN.to_string(),
        })
    }
}

fn get_env(name: &str) -> Result<String> {
    env::var(name).map_err(|_| Error::Config(format!("Missing environment variable: {}", name)))
}

fn get_env_or(name: &str, default: &str) -> String {
    env::var(name)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn get_env_parse_or<T>(name: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map_err(|e| Error::Config(format!("Invalid value for {}: {}", name, e))),
        _ => Ok(default),
    }
}

pub fn init_config() -> Result<()> {
    let config = Config::from_env()?;
    CONFIG
        .set(config)
        .map_err(|_| Error::Config("Configuration has already been initialized".to_string()))?;
    Ok(())
}

pub fn get_config() -> &'static Config {
    CONFIG
        .get()
        .expect("Configuration has not been initialized")
}
