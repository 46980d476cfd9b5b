//! Activity repository implementation

use sqlx::PgPool;
use chrono::Utc;
use crate::models::activity::{Activity, EntityType, NewActivity};
use crate::utils::errors::Result;

const ACTIVITY_COLUMNS: &str = "id, user_id, action, entity_type, entity_id, details, created_at";

#[derive(Clone)]
#[derive(Debug)]
pub struct ActivityRepository {
    pool: PgPool,
}

impl ActivityRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Append an activity record
    pub async fn insert(&self, new: NewActivity) -> Result<Activity> {
        let activity = sqlx::query_as::<_, Activity>(&format!(
            r#"
            INSERT INTO activities (user_id, action, entity_type, entity_id, details, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {ACTIVITY_COLUMNS}
            "#
        ))
        .bind(new.user_id)
        .bind(new.action.as_str())
        .bind(new.entity_type.as_str())
        .bind(new.entity_id)
        .bind(new.details)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(activity)
    }

    /// List activities, newest first
    pub async fn list(
        &self,
        entity_type: Option<EntityType>,
        user_id: Option<i64>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Activity>> {
        let activities = sqlx::query_as::<_, Activity>(&format!(
            r#"
            SELECT {ACTIVITY_COLUMNS} FROM activities
            WHERE ($1::TEXT IS NULL OR entity_type = $1)
              AND ($2::BIGINT IS NULL OR user_id = $2)
            ORDER BY created_at DESC, id DESC
            LIMIT $3 OFFSET $4
            "#
        ))
        .bind(entity_type.map(|e| e.as_str()))
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(activities)
    }

    /// Activities recorded for one entity, oldest first
    pub async fn list_for_entity(&self, entity_type: EntityType, entity_id: i64) -> Result<Vec<Activity>> {
        let activities = sqlx::query_as::<_, Activity>(&format!(
            r#"
            SELECT {ACTIVITY_COLUMNS} FROM activities
            WHERE entity_type = $1 AND entity_id = $2
            ORDER BY created_at ASC, id ASC
            "#
        ))
        .bind(entity_type.as_str())
        .bind(entity_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(activities)
    }
}
