//! Activity logger
//!
//! Audit records are written after the primary change has committed. A failed
//! write is reported on the log and never reaches the caller.

use serde::Serialize;
use tracing::{debug, warn};
use crate::database::DatabaseService;
use crate::models::{Activity, ActivityAction, ActivityFilter, EntityType, NewActivity};
use crate::utils::errors::Result;
use crate::utils::helpers::{calculate_offset, clamp_page_size};

#[derive(Clone)]
pub struct ActivityService {
    db: DatabaseService,
}

impl ActivityService {
    pub fn new(db: DatabaseService) -> Self {
        Self { db }
    }

    /// Record an action; errors are logged and swallowed
    pub async fn record<T: Serialize>(
        &self,
        actor_id: i64,
        action: ActivityAction,
        entity_type: EntityType,
        entity_id: i64,
        snapshot: &T,
    ) {
        let details = match serde_json::to_value(snapshot) {
            Ok(value) => value,
            Err(e) => {
                warn!(error = %e, entity = entity_type.as_str(), entity_id = entity_id, "Failed to serialize activity details");
                serde_json::Value::Null
            }
        };

        let new = NewActivity { user_id: actor_id, action, entity_type, entity_id, details };
        match self.db.activities.insert(new).await {
            Ok(activity) => debug!(activity_id = activity.id, action = action.as_str(), "Activity recorded"),
            Err(e) => warn!(
                error = %e,
                actor_id = actor_id,
                action = action.as_str(),
                entity = entity_type.as_str(),
                entity_id = entity_id,
                "Failed to record activity"
            ),
        }
    }

    /// Admin feed, newest first
    pub async fn list(&self, filter: &ActivityFilter) -> Result<Vec<Activity>> {
        let limit = clamp_page_size(filter.limit, 50, 200);
        let offset = calculate_offset(filter.page.unwrap_or(1), limit);
        self.db.activities.list(filter.entity_type, filter.user_id, limit, offset).await
    }
}
