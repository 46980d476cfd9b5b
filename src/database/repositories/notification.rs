//! Notification repository implementation

use sqlx::{PgConnection, PgPool, Postgres, QueryBuilder};
use chrono::Utc;
use crate::models::notification::{NewNotification, Notification};
use crate::utils::errors::Result;

const NOTIFICATION_COLUMNS: &str =
    "id, user_id, type, message, related_id, data, is_read, read_at, created_at";

const BINDS_PER_ROW: usize = 6;
const MAX_ROWS_PER_INSERT: usize = u16::MAX as usize / BINDS_PER_ROW;

#[derive(Clone)]
#[derive(Debug)]
pub struct NotificationRepository {
    pool: PgPool,
}

impl NotificationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert one notification on the caller's transaction
    pub async fn insert(&self, conn: &mut PgConnection, new: &NewNotification) -> Result<Notification> {
        let notification = sqlx::query_as::<_, Notification>(&format!(
            r#"
            INSERT INTO notifications (user_id, type, message, related_id, data, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {NOTIFICATION_COLUMNS}
            "#
        ))
        .bind(new.user_id)
        .bind(new.kind.as_str())
        .bind(&new.message)
        .bind(new.related_id)
        .bind(&new.data)
        .bind(Utc::now())
        .fetch_one(conn)
        .await?;

        Ok(notification)
    }

    /// Insert a batch in order on the caller's transaction; returns the row count
    ///
    /// Rows are split into statements that stay under the Postgres limit of
    /// 65535 bind parameters.
    pub async fn insert_many(&self, conn: &mut PgConnection, batch: &[NewNotification]) -> Result<u64> {
        let now = Utc::now();
        let mut inserted = 0;

        for chunk in batch.chunks(MAX_ROWS_PER_INSERT) {
            let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(
                "INSERT INTO notifications (user_id, type, message, related_id, data, created_at) ",
            );
            builder.push_values(chunk, |mut row, n| {
                row.push_bind(n.user_id)
                    .push_bind(n.kind.as_str())
                    .push_bind(n.message.clone())
                    .push_bind(n.related_id)
                    .push_bind(n.data.clone())
                    .push_bind(now);
            });

            inserted += builder.build().execute(&mut *conn).await?.rows_affected();
        }

        Ok(inserted)
    }

    /// Notifications of a user, newest first
    pub async fn list_for_user(
        &self,
        user_id: i64,
        unread_only: bool,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Notification>> {
        let notifications = sqlx::query_as::<_, Notification>(&format!(
            r#"
            SELECT {NOTIFICATION_COLUMNS} FROM notifications
            WHERE user_id = $1 AND (NOT $2 OR is_read = FALSE)
            ORDER BY created_at DESC, id DESC
            LIMIT $3 OFFSET $4
            "#
        ))
        .bind(user_id)
        .bind(unread_only)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(notifications)
    }

    /// Notifications that point at a participation
    pub async fn list_for_related(&self, related_id: i64) -> Result<Vec<Notification>> {
        let notifications = sqlx::query_as::<_, Notification>(&format!(
            "SELECT {NOTIFICATION_COLUMNS} FROM notifications WHERE related_id = $1 ORDER BY id ASC"
        ))
        .bind(related_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(notifications)
    }

    pub async fn unread_count(&self, user_id: i64) -> Result<i64> {
        let count: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM notifications WHERE user_id = $1 AND is_read = FALSE"
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count.0)
    }

    /// Mark one notification read; None when it is missing or not the user's
    pub async fn mark_read(&self, id: i64, user_id: i64) -> Result<Option<Notification>> {
        let notification = sqlx::query_as::<_, Notification>(&format!(
            r#"
            UPDATE notifications
            SET is_read = TRUE, read_at = COALESCE(read_at, $3)
            WHERE id = $1 AND user_id = $2
            RETURNING {NOTIFICATION_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(user_id)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        Ok(notification)
    }

    pub async fn mark_all_read(&self, user_id: i64) -> Result<u64> {
        let result = sqlx::query(
            "UPDATE notifications SET is_read = TRUE, read_at = $2 WHERE user_id = $1 AND is_read = FALSE"
        )
        .bind(user_id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// Delete a notification owned by `user_id`
    pub async fn delete(&self, id: i64, user_id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM notifications WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
