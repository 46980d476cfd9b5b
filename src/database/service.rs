//! Database service layer
//!
//! This module provides a high-level interface to database operations

use crate::database::{
    DatabasePool, DbTransaction, UserRepository, EventRepository, ParticipationRepository,
    NotificationRepository, ActivityRepository, CommentRepository, AdminRepository,
};
use crate::models::{Event, User};
use crate::utils::errors::{EventHubError, Result};

#[derive(Debug, Clone)]
pub struct DatabaseService {
    pool: DatabasePool,
    pub users: UserRepository,
    pub events: EventRepository,
    pub participations: ParticipationRepository,
    pub notifications: NotificationRepository,
    pub activities: ActivityRepository,
    pub comments: CommentRepository,
    pub admin: AdminRepository,
}

impl DatabaseService {
    pub fn new(pool: DatabasePool) -> Self {
        Self {
            users: UserRepository::new(pool.clone()),
            events: EventRepository::new(pool.clone()),
            participations: ParticipationRepository::new(pool.clone()),
            notifications: NotificationRepository::new(pool.clone()),
            activities: ActivityRepository::new(pool.clone()),
            comments: CommentRepository::new(pool.clone()),
            admin: AdminRepository::new(pool.clone()),
            pool,
        }
    }

    pub fn pool(&self) -> &DatabasePool {
        &self.pool
    }

    /// Start a transaction on the shared pool
    pub async fn begin(&self) -> Result<DbTransaction> {
        Ok(self.pool.begin().await?)
    }

    /// Load an event or fail with NotFound
    pub async fn require_event(&self, event_id: i64) -> Result<Event> {
        self.events
            .find_by_id(event_id)
            .await?
            .ok_or_else(|| EventHubError::not_found("Event", event_id))
    }

    /// Load a user or fail with NotFound
    pub async fn require_user(&self, user_id: i64) -> Result<User> {
        self.users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| EventHubError::not_found("User", user_id))
    }

    /// Close the pool; pending connections finish first
    pub async fn close(&self) {
        self.pool.close().await;
        tracing::info!("Database pool closed");
    }
}
