//! Database repositories module
//!
//! This module contains all repository implementations for data access

pub mod user;
pub mod event;
pub mod participation;
pub mod notification;
pub mod activity;
pub mod comment;
pub mod admin;

// Re-export repositories
pub use user::UserRepository;
pub use event::EventRepository;
pub use participation::ParticipationRepository;
pub use notification::NotificationRepository;
pub use activity::ActivityRepository;
pub use comment::CommentRepository;
pub use admin::AdminRepository;
