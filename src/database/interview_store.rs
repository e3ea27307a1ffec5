use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::Result;
use crate::models::interview::Interview;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait InterviewStore: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Interview>>;

    /// Insert or update by id.
    async fn save(&self, interview: &Interview) -> Result<Interview>;

    /// Removes the interview and, by cascade, its shadowing requests.
    async fn delete(&self, id: Uuid) -> Result<()>;

    /// Newest start time first.
    async fn list(&self, offset: i64, limit: i64) -> Result<Vec<Interview>>;

    async fn count(&self) -> Result<i64>;
}

const INTERVIEW_COLUMNS: &str =
    "id, interviewer_id, google_event_id, candidate_info, tech_stack, start_time, end_time, status";

#[derive(Clone)]
pub struct PgInterviewStore {
    pool: PgPool,
}

impl PgInterviewStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl InterviewStore for PgInterviewStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Interview>> {
        let query = format!("SELECT {} FROM interviews WHERE id = $1", INTERVIEW_COLUMNS);
        let interview = sqlx::query_as::<_, Interview>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(interview)
    }

    async fn save(&self, interview: &Interview) -> Result<Interview> {
        let query = format!(
            r#"
            INSERT INTO interviews (
                id, interviewer_id, google_event_id, candidate_info,
                tech_stack, start_time, end_time, status
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (id) DO UPDATE SET
                google_event_id = EXCLUDED.google_event_id,
                candidate_info = EXCLUDED.candidate_info,
                tech_stack = EXCLUDED.tech_stack,
                start_time = EXCLUDED.start_time,
                end_time = EXCLUDED.end_time,
                status = EXCLUDED.status,
                updated_at = NOW()
            RETURNING {}
            "#,
            INTERVIEW_COLUMNS
        );
        let saved = sqlx::query_as::<_, Interview>(&query)
            .bind(interview.id)
            .bind(interview.interviewer_id)
            .bind(&interview.google_event_id)
            .bind(&interview.candidate_info)
            .bind(&interview.tech_stack)
            .bind(interview.start_time)
            .bind(interview.end_time)
            .bind(interview.status.as_str())
            .fetch_one(&self.pool)
            .await?;
        Ok(saved)
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        sqlx::query("DELETE FROM interviews WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn list(&self, offset: i64, limit: i64) -> Result<Vec<Interview>> {
        let query = format!(
            "SELECT {} FROM interviews ORDER BY start_time DESC LIMIT $1 OFFSET $2",
            INTERVIEW_COLUMNS
        );
        let items = sqlx::query_as::<_, Interview>(&query)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;
        Ok(items)
    }

    async fn count(&self) -> Result<i64> {
        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM interviews")
            .fetch_one(&self.pool)
            .await?;
        Ok(total)
    }
}
