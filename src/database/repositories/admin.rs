//! Admin repository implementation

use sqlx::PgPool;
use chrono::Utc;
use crate::models::admin::{Admin, Setting, SystemStats};
use crate::utils::errors::Result;

#[derive(Clone)]
#[derive(Debug)]
pub struct AdminRepository {
    pool: PgPool,
}

impl AdminRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // Admin grants

    /// Check if user has admin rights
    pub async fn is_admin(&self, user_id: i64) -> Result<bool> {
        let exists: (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM admins WHERE user_id = $1)")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(exists.0)
    }

    /// Grant admin rights; granting twice keeps the first grant
    pub async fn grant(&self, user_id: i64, granted_by: Option<i64>) -> Result<Admin> {
        let admin = sqlx::query_as::<_, Admin>(
            r#"
            INSERT INTO admins (user_id, granted_by, granted_at)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id) DO UPDATE SET user_id = EXCLUDED.user_id
            RETURNING user_id, granted_by, granted_at
            "#
        )
        .bind(user_id)
        .bind(granted_by)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(admin)
    }

    pub async fn revoke(&self, user_id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM admins WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    // Settings

    pub async fn list_settings(&self) -> Result<Vec<Setting>> {
        let settings = sqlx::query_as::<_, Setting>(
            "SELECT key, value, updated_by, updated_at FROM settings ORDER BY key ASC"
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(settings)
    }

    pub async fn get_setting(&self, key: &str) -> Result<Option<Setting>> {
        let setting = sqlx::query_as::<_, Setting>(
            "SELECT key, value, updated_by, updated_at FROM settings WHERE key = $1"
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;

        Ok(setting)
    }

    /// Insert or replace a setting
    pub async fn upsert_setting(&self, key: &str, value: serde_json::Value, updated_by: i64) -> Result<Setting> {
        let setting = sqlx::query_as::<_, Setting>(
            r#"
            INSERT INTO settings (key, value, updated_by, updated_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (key) DO UPDATE
            SET value = EXCLUDED.value, updated_by = EXCLUDED.updated_by, updated_at = EXCLUDED.updated_at
            RETURNING key, value, updated_by, updated_at
            "#
        )
        .bind(key)
        .bind(value)
        .bind(updated_by)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(setting)
    }

    // Statistics

    /// Dashboard counters in one round trip
    pub async fn stats(&self) -> Result<SystemStats> {
        let stats = sqlx::query_as::<_, SystemStats>(
            r#"
            SELECT
                (SELECT COUNT(*) FROM users) AS users,
                (SELECT COUNT(*) FROM users WHERE status = 'online') AS users_online,
                (SELECT COUNT(*) FROM events) AS events,
                (SELECT COUNT(*) FROM events WHERE status = 'scheduled') AS events_scheduled,
                (SELECT COUNT(*) FROM events WHERE status = 'ongoing') AS events_ongoing,
                (SELECT COUNT(*) FROM participations WHERE status = 'pending') AS pending_requests,
                (SELECT COUNT(*) FROM participations WHERE status = 'invited') AS open_invitations,
                (SELECT COUNT(*) FROM notifications WHERE is_read = FALSE) AS notifications_unread,
                (SELECT COUNT(*) FROM activities) AS activities
            "#
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(stats)
    }
}
