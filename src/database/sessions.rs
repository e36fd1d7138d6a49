use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use super::manager::DatabaseError;

/// A stored session row. The quoted column names are a fixed external
/// table contract owned by migration tooling.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    #[sqlx(rename = "SessionId")]
    pub id: i32,
    #[sqlx(rename = "Title")]
    pub title: Option<String>,
    #[serde(rename = "abstract")]
    #[sqlx(rename = "Abstract")]
    pub abstract_: Option<String>,
    #[sqlx(rename = "UserId")]
    pub user_id: Option<String>,
}

/// Client-supplied session body. Unrecognized fields are ignored, which
/// is also what discards any client attempt to set `userId` directly.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SessionDraft {
    pub title: Option<String>,
    #[serde(rename = "abstract")]
    pub abstract_: Option<String>,
}

#[derive(Clone)]
pub struct SessionStore {
    pool: PgPool,
}

impl SessionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a session stamped with the authenticated user id.
    ///
    /// Single durable write; the storage-generated key comes back with the
    /// row. Never retried and never deduplicated, so repeated identical
    /// calls create distinct rows.
    pub async fn insert(
        &self,
        draft: SessionDraft,
        user_id: Option<String>,
    ) -> Result<Session, DatabaseError> {
        let session = sqlx::query_as::<_, Session>(
            r#"INSERT INTO "Sessions" ("Title", "Abstract", "UserId")
               VALUES ($1, $2, $3)
               RETURNING "SessionId", "Title", "Abstract", "UserId""#,
        )
        .bind(draft.title)
        .bind(draft.abstract_)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(session)
    }

    /// Pings the database to verify connectivity
    pub async fn ping(&self) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
