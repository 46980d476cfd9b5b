//! Notification model

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;

use super::UnknownVariant;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NotificationType {
    JoinRequest,
    RequestApproved,
    RequestDeclined,
    Invitation,
    InvitationAccepted,
    InvitationDeclined,
    InvitationReminder,
    EventReminder,
}

impl NotificationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationType::JoinRequest => "joinRequest",
            NotificationType::RequestApproved => "requestApproved",
            NotificationType::RequestDeclined => "requestDeclined",
            NotificationType::Invitation => "invitation",
            NotificationType::InvitationAccepted => "invitationAccepted",
            NotificationType::InvitationDeclined => "invitationDeclined",
            NotificationType::InvitationReminder => "invitationReminder",
            NotificationType::EventReminder => "eventReminder",
        }
    }
}

impl TryFrom<String> for NotificationType {
    type Error = UnknownVariant;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "joinRequest" => Ok(NotificationType::JoinRequest),
            "requestApproved" => Ok(NotificationType::RequestApproved),
            "requestDeclined" => Ok(NotificationType::RequestDeclined),
            "invitation" => Ok(NotificationType::Invitation),
            "invitationAccepted" => Ok(NotificationType::InvitationAccepted),
            "invitationDeclined" => Ok(NotificationType::InvitationDeclined),
            "invitationReminder" => Ok(NotificationType::InvitationReminder),
            "eventReminder" => Ok(NotificationType::EventReminder),
            _ => Err(UnknownVariant::new("notification type", value)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Notification {
    pub id: i64,
    pub user_id: i64,
    #[serde(rename = "type")]
    #[sqlx(rename = "type", try_from = "String")]
    pub kind: NotificationType,
    pub message: String,
    pub related_id: Option<i64>,
    pub data: serde_json::Value,
    pub is_read: bool,
    pub read_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Notification ready to be inserted
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewNotification {
    pub user_id: i64,
    pub kind: NotificationType,
    pub message: String,
    pub related_id: Option<i64>,
    pub data: serde_json::Value,
}

/// Snapshot of the user who triggered a notification
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SenderSnapshot {
    pub id: i64,
    pub name: String,
    pub username: String,
    pub email: String,
    pub avatar_url: Option<String>,
}

impl From<&super::User> for SenderSnapshot {
    fn from(user: &super::User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            username: user.username.clone(),
            email: user.email.clone(),
            avatar_url: user.avatar_url.clone(),
        }
    }
}
