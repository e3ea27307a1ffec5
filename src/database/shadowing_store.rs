use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::Result;
use crate::models::shadowing_request::ShadowingRequest;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ShadowingRequestStore: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<ShadowingRequest>>;

    /// Insert or update by id.
    async fn save(&self, request: &ShadowingRequest) -> Result<ShadowingRequest>;

    async fn list_by_interview(&self, interview_id: Uuid) -> Result<Vec<ShadowingRequest>>;

    async fn list_by_shadower(&self, shadower_id: Uuid) -> Result<Vec<ShadowingRequest>>;
}

const REQUEST_COLUMNS: &str = "id, interview_id, shadower_id, status, reason";

#[derive(Clone)]
pub struct PgShadowingRequestStore {
    pool: PgPool,
}

impl PgShadowingRequestStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ShadowingRequestStore for PgShadowingRequestStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<ShadowingRequest>> {
        let query = format!(
            "SELECT {} FROM shadowing_requests WHERE id = $1",
            REQUEST_COLUMNS
        );
        let request = sqlx::query_as::<_, ShadowingRequest>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(request)
    }

    async fn save(&self, request: &ShadowingRequest) -> Result<ShadowingRequest> {
        let query = format!(
            r#"
            INSERT INTO shadowing_requests (id, interview_id, shadower_id, status, reason)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (id) DO UPDATE SET
                status = EXCLUDED.status,
                reason = EXCLUDED.reason,
                updated_at = NOW()
            RETURNING {}
            "#,
            REQUEST_COLUMNS
        );
        let saved = sqlx::query_as::<_, ShadowingRequest>(&query)
            .bind(request.id)
            .bind(request.interview_id)
            .bind(request.shadower_id)
            .bind(request.status.as_str())
            .bind(&request.reason)
            .fetch_one(&self.pool)
            .await?;
        Ok(saved)
    }

    async fn list_by_interview(&self, interview_id: Uuid) -> Result<Vec<ShadowingRequest>> {
        let query = format!(
            "SELECT {} FROM shadowing_requests WHERE interview_id = $1 ORDER BY created_at ASC",
            REQUEST_COLUMNS
        );
        let items = sqlx::query_as::<_, ShadowingRequest>(&query)
            .bind(interview_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(items)
    }

    async fn list_by_shadower(&self, shadower_id: Uuid) -> Result<Vec<ShadowingRequest>> {
        let query = format!(
            "SELECT {} FROM shadowing_requests WHERE shadower_id = $1 ORDER BY created_at DESC",
            REQUEST_COLUMNS
        );
        let items = sqlx::query_as::<_, ShadowingRequest>(&query)
            .bind(shadower_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(items)
    }
}
