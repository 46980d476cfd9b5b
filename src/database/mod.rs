//! Database module
//!
//! This module handles database connections and operations

pub mod connection;
pub mod repositories;
pub mod service;

// Re-export commonly used database components
pub use connection::{DatabasePool, DbTransaction, create_pool, run_migrations, health_check, finish};
pub use repositories::{
    UserRepository, EventRepository, ParticipationRepository, NotificationRepository,
    ActivityRepository, CommentRepository, AdminRepository,
};
pub use service::DatabaseService;
