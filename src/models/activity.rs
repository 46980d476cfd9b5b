//! Activity (audit log) model

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;

use super::UnknownVariant;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityAction {
    Created,
    Updated,
    Deleted,
}

impl ActivityAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityAction::Created => "created",
            ActivityAction::Updated => "updated",
            ActivityAction::Deleted => "deleted",
        }
    }
}

impl TryFrom<String> for ActivityAction {
    type Error = UnknownVariant;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "created" => Ok(ActivityAction::Created),
            "updated" => Ok(ActivityAction::Updated),
            "deleted" => Ok(ActivityAction::Deleted),
            _ => Err(UnknownVariant::new("activity action", value)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityType {
    Event,
    User,
}

impl EntityType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityType::Event => "event",
            EntityType::User => "user",
        }
    }
}

impl TryFrom<String> for EntityType {
    type Error = UnknownVariant;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "event" => Ok(EntityType::Event),
            "user" => Ok(EntityType::User),
            _ => Err(UnknownVariant::new("entity type", value)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Activity {
    pub id: i64,
    pub user_id: Option<i64>,
    #[sqlx(try_from = "String")]
    pub action: ActivityAction,
    #[sqlx(try_from = "String")]
    pub entity_type: EntityType,
    pub entity_id: i64,
    pub details: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewActivity {
    pub user_id: i64,
    pub action: ActivityAction,
    pub entity_type: EntityType,
    pub entity_id: i64,
    pub details: serde_json::Value,
}

/// Filters for the admin activity feed
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ActivityFilter {
    pub entity_type: Option<EntityType>,
    pub user_id: Option<i64>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}
