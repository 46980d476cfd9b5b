//! Admin service implementation

use crate::database::DatabaseService;
use crate::models::{Activity, ActivityFilter, Setting, SystemStats, User};
use crate::services::activity::ActivityService;
use crate::utils::errors::{EventHubError, Result};
use crate::utils::logging::log_admin_action;

const MAX_SETTING_KEY_LENGTH: usize = 100;

#[derive(Clone)]
pub struct AdminService {
    db: DatabaseService,
    activity: ActivityService,
}

impl AdminService {
    pub fn new(db: DatabaseService, activity: ActivityService) -> Self {
        Self { db, activity }
    }

    pub async fn is_admin(&self, user_id: i64) -> Result<bool> {
        self.db.admin.is_admin(user_id).await
    }

    pub async fn activities(&self, filter: &ActivityFilter) -> Result<Vec<Activity>> {
        self.activity.list(filter).await
    }

    pub async fn stats(&self) -> Result<SystemStats> {
        self.db.admin.stats().await
    }

    pub async fn settings(&self) -> Result<Vec<Setting>> {
        self.db.admin.list_settings().await
    }

    /// Create or replace a setting
    pub async fn put_setting(&self, admin: &User, key: &str, value: serde_json::Value) -> Result<Setting> {
        validate_setting_key(key)?;
        let setting = self.db.admin.upsert_setting(key, value, admin.id).await?;
        log_admin_action(admin.id, "put_setting", Some(key), None);
        Ok(setting)
    }
}

fn validate_setting_key(key: &str) -> Result<()> {
    let valid = !key.is_empty()
        && key.len() <= MAX_SETTING_KEY_LENGTH
        && key.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'));
    if !valid {
        return Err(EventHubError::Validation(
            "Setting keys use letters, digits, dots, dashes and underscores".to_string(),
        ));
    }
    Ok(())
}
