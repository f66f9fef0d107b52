use async_trait::async_trait;
use chrono::Utc;
use sqlx::{error::ErrorKind, PgPool};
use tracing::info;
use uuid::Uuid;

use crate::models::{Post, PostPayload};

use super::{PostStore, StoreError};

/// Postgres-backed post store.
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Connect and bring the schema up to date. This is what the connection
    /// cache's production connector runs, at most once per attempt.
    pub async fn connect(database_url: &str) -> anyhow::Result<Self> {
        let pool = PgPool::connect(database_url).await?;
        sqlx::migrate!("./migrations").run(&pool).await?;
        info!("Database migrations applied");
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Constraint violations become `Rejected` so the write path can answer 400;
/// everything else is a backend failure.
fn map_sqlx_err(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        if matches!(
            db_err.kind(),
            ErrorKind::CheckViolation | ErrorKind::NotNullViolation
        ) {
            return StoreError::Rejected(db_err.message().to_string());
        }
    }
    StoreError::Backend(err.into())
}

#[async_trait]
impl PostStore for PgStore {
    async fn list(&self) -> Result<Vec<Post>, StoreError> {
        sqlx::query_as::<_, Post>(
            "SELECT id, title, content, author, created_at, updated_at \
             FROM posts ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_err)
    }

    async fn create(&self, payload: &PostPayload) -> Result<Post, StoreError> {
        // One timestamp bound twice keeps created_at == updated_at exact.
        let now = Utc::now();
        sqlx::query_as::<_, Post>(
            r#"
            INSERT INTO posts (title, content, author, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $4)
            RETURNING id, title, content, author, created_at, updated_at
            "#,
        )
        .bind(&payload.title)
        .bind(&payload.content)
        .bind(&payload.author)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx_err)
    }

    async fn find(&self, id: Uuid) -> Result<Option<Post>, StoreError> {
        sqlx::query_as::<_, Post>(
            "SELECT id, title, content, author, created_at, updated_at \
             FROM posts WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_err)
    }

    async fn update(&self, id: Uuid, payload: &PostPayload) -> Result<Option<Post>, StoreError> {
        sqlx::query_as::<_, Post>(
            r#"
            UPDATE posts
            SET title = $2, content = $3, author = $4, updated_at = $5
            WHERE id = $1
            RETURNING id, title, content, author, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(&payload.title)
        .bind(&payload.content)
        .bind(&payload.author)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_err)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_err)?;
        Ok(result.rows_affected() > 0)
    }
}
