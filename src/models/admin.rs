//! Admin model

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Admin-managed key/value setting
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Setting {
    pub key: String,
    pub value: serde_json::Value,
    pub updated_by: Option<i64>,
    pub updated_at: DateTime<Utc>,
}

/// Grant of admin rights to a user
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Admin {
    pub user_id: i64,
    pub granted_by: Option<i64>,
    pub granted_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpsertSettingRequest {
    pub value: serde_json::Value,
}

/// Row counts shown on the admin dashboard
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct SystemStats {
    pub users: i64,
    pub users_online: i64,
    pub events: i64,
    pub events_scheduled: i64,
    pub events_ongoing: i64,
    pub pending_requests: i64,
    pub open_invitations: i64,
    pub notifications_unread: i64,
    pub activities: i64,
}
