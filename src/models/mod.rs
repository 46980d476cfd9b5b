//! Data models module
//!
//! This module contains all data structures used throughout the application

pub mod user;
pub mod event;
pub mod participation;
pub mod notification;
pub mod activity;
pub mod comment;
pub mod admin;

// Re-export commonly used models
pub use user::{
    User, UserStatus, PublicUser, CreateUserRequest, UpdateUserRequest, RegisterRequest, LoginRequest,
    ChangePasswordRequest,
};
pub use event::{Event, EventStatus, EventFilter, Slot, Schedule, EventSummary, CreateEventRequest, UpdateEventRequest};
pub use participation::{
    Participation, ParticipationKind, ParticipationStatus, NewParticipation, RequestAction,
    InvitationAction, ReminderTarget, ParticipationDetails,
};
pub use notification::{Notification, NotificationType, NewNotification, SenderSnapshot};
pub use activity::{Activity, ActivityAction, ActivityFilter, EntityType, NewActivity};
pub use comment::{Comment, CommentWithAuthor, CreateCommentRequest};
pub use admin::{Admin, Setting, SystemStats, UpsertSettingRequest};

/// A text column held a value no enum variant maps to
#[derive(Debug, thiserror::Error)]
#[error("unknown {what}: {value}")]
pub struct UnknownVariant {
    pub what: &'static str,
    pub value: String,
}

impl UnknownVariant {
    pub fn new(what: &'static str, value: String) -> Self {
        Self { what, value }
    }
}
