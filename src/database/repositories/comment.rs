//! Comment repository implementation

use sqlx::PgPool;
use chrono::Utc;
use crate::models::comment::{Comment, CommentWithAuthor};
use crate::utils::errors::Result;

#[derive(Clone)]
#[derive(Debug)]
pub struct CommentRepository {
    pool: PgPool,
}

impl CommentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, event_id: i64, user_id: i64, content: &str) -> Result<Comment> {
        let comment = sqlx::query_as::<_, Comment>(
            r#"
            INSERT INTO comments (event_id, user_id, content, created_at)
            VALUES ($1, $2, $3, $4)
            RETURNING id, event_id, user_id, content, created_at
            "#
        )
        .bind(event_id)
        .bind(user_id)
        .bind(content)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(comment)
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<Comment>> {
        let comment = sqlx::query_as::<_, Comment>(
            "SELECT id, event_id, user_id, content, created_at FROM comments WHERE id = $1"
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(comment)
    }

    /// Comments of an event with their authors, oldest first
    pub async fn list_for_event(&self, event_id: i64) -> Result<Vec<CommentWithAuthor>> {
        let comments = sqlx::query_as::<_, CommentWithAuthor>(
            r#"
            SELECT c.id, c.event_id, c.user_id, c.content, c.created_at,
                   u.name AS author_name, u.username AS author_username, u.avatar_url AS author_avatar_url
            FROM comments c
            INNER JOIN users u ON u.id = c.user_id
            WHERE c.event_id = $1
            ORDER BY c.created_at ASC, c.id ASC
            "#
        )
        .bind(event_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(comments)
    }

    pub async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM comments WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
