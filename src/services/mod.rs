//! Services module
//!
//! This module contains business logic services

pub mod activity;
pub mod admin;
pub mod auth;
pub mod comment;
pub mod event;
pub mod image_host;
pub mod notification;
pub mod participation;
pub mod schedule;
pub mod sweep;
pub mod user;

// Re-export commonly used services
pub use activity::ActivityService;
pub use admin::AdminService;
pub use auth::{AuthService, Claims};
pub use comment::CommentService;
pub use event::{EventPage, EventService};
pub use image_host::ImageHostClient;
pub use notification::{MessageTemplate, NotificationService};
pub use participation::{JoinRequestOutcome, ParticipationService};
pub use sweep::{SweepReport, SweepService};
pub use user::UserService;

use crate::config::settings::Settings;
use crate::database::{health_check, DatabaseService};
use crate::utils::errors::Result;

/// Service factory for creating and managing all services
#[derive(Clone)]
pub struct ServiceFactory {
    pub db: DatabaseService,
    pub auth_service: AuthService,
    pub user_service: UserService,
    pub event_service: EventService,
    pub participation_service: ParticipationService,
    pub notification_service: NotificationService,
    pub comment_service: CommentService,
    pub admin_service: AdminService,
    pub sweep_service: SweepService,
}

impl ServiceFactory {
    /// Create a new ServiceFactory with all services initialized
    pub fn new(settings: &Settings, db: DatabaseService) -> Result<Self> {
        let image_host = match (&settings.image_host, settings.features.avatar_upload) {
            (Some(config), true) => Some(ImageHostClient::new(config.clone())?),
            _ => None,
        };

        let auth_service = AuthService::new(settings.auth.clone());
        let activity_service = ActivityService::new(db.clone());
        let notification_service = NotificationService::new(db.clone());
        let user_service = UserService::new(db.clone(), auth_service.clone(), activity_service.clone(), image_host);
        let event_service = EventService::new(db.clone(), activity_service.clone());
        let participation_service = ParticipationService::new(db.clone(), notification_service.clone());
        let comment_service = CommentService::new(db.clone(), event_service.clone());
        let admin_service = AdminService::new(db.clone(), activity_service);
        let sweep_service = SweepService::new(db.clone());

        Ok(Self {
            db,
            auth_service,
            user_service,
            event_service,
            participation_service,
            notification_service,
            comment_service,
            admin_service,
            sweep_service,
        })
    }

    /// Health check for all services
    pub async fn health_check(&self) -> ServiceHealthStatus {
        let database_healthy = health_check(self.db.pool()).await.is_ok();

        ServiceHealthStatus {
            database_healthy,
        }
    }
}

/// Health status for all services
#[derive(Debug, Clone, serde::Serialize)]
pub struct ServiceHealthStatus {
    pub database_healthy: bool,
}

impl ServiceHealthStatus {
    /// Check if all critical services are healthy
    pub fn is_healthy(&self) -> bool {
        self.database_healthy
    }

    /// Get list of unhealthy services
    pub fn get_issues(&self) -> Vec<String> {
        let mut issues = Vec::new();

        if !self.database_healthy {
            issues.push("Database connection failed".to_string());
        }

        issues
    }
}
