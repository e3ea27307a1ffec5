use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::Result;
use crate::models::profile::Profile;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Profile>>;

    /// Sole lookup key during login.
    async fn find_by_google_sub(&self, google_sub: &str) -> Result<Option<Profile>>;

    async fn find_by_email(&self, email: &str) -> Result<Option<Profile>>;

    /// Insert or update by id. A stored `google_sub` is never replaced.
    async fn save(&self, profile: &Profile) -> Result<Profile>;
}

const PROFILE_COLUMNS: &str = "id, email, role, calendar_email, google_sub, google_access_token, google_refresh_token, google_token_expiry";

#[derive(Clone)]
pub struct PgProfileStore {
    pool: PgPool,
}

impl PgProfileStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProfileStore for PgProfileStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Profile>> {
        let query = format!("SELECT {} FROM profiles WHERE id = $1", PROFILE_COLUMNS);
        let profile = sqlx::query_as::<_, Profile>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(profile)
    }

    async fn find_by_google_sub(&self, google_sub: &str) -> Result<Option<Profile>> {
        let query = format!("SELECT {} FROM profiles WHERE google_sub = $1", PROFILE_COLUMNS);
        let profile = sqlx::query_as::<_, Profile>(&query)
            .bind(google_sub)
            .fetch_optional(&self.pool)
            .await?;
        Ok(profile)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Profile>> {
        let query = format!(
            "SELECT {} FROM profiles WHERE LOWER(email) = LOWER($1) LIMIT 1",
            PROFILE_COLUMNS
        );
        let profile = sqlx::query_as::<_, Profile>(&query)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(profile)
    }

    async fn save(&self, profile: &Profile) -> Result<Profile> {
        let query = format!(
            r#"
            INSERT INTO profiles (
                id, email, role, calendar_email, google_sub,
                google_access_token, google_refresh_token, google_token_expiry
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (id) DO UPDATE SET
                email = EXCLUDED.email,
                role = EXCLUDED.role,
                calendar_email = EXCLUDED.calendar_email,
                google_sub = COALESCE(profiles.google_sub, EXCLUDED.google_sub),
                google_access_token = EXCLUDED.google_access_token,
                google_refresh_token = EXCLUDED.google_refresh_token,
                google_token_expiry = EXCLUDED.google_token_expiry,
                updated_at = NOW()
            RETURNING {}
            "#,
            PROFILE_COLUMNS
        );
        let saved = sqlx::query_as::<_, Profile>(&query)
            .bind(profile.id)
            .bind(&profile.email)
            .bind(&profile.role)
            .bind(&profile.calendar_email)
            .bind(&profile.google_sub)
            .bind(&profile.google_access_token)
            .bind(&profile.google_refresh_token)
            .bind(profile.google_token_expiry)
            .fetch_one(&self.pool)
            .await?;
        Ok(saved)
    }
}
