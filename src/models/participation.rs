//! Participation model
//!
//! A participation links a user to an event. Requests are filed by the user and
//! need the organizer's approval; invitations are issued by the organizer and
//! need the invitee's answer. Both share one table and differ by `kind`.

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;

use super::UnknownVariant;
use super::event::EventSummary;
use super::user::PublicUser;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParticipationStatus {
    Pending,
    Invited,
    Approved,
    Rejected,
}

impl ParticipationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParticipationStatus::Pending => "pending",
            ParticipationStatus::Invited => "invited",
            ParticipationStatus::Approved => "approved",
            ParticipationStatus::Rejected => "rejected",
        }
    }

    /// Pending requests and open invitations still await an answer
    pub fn is_open(&self) -> bool {
        matches!(self, ParticipationStatus::Pending | ParticipationStatus::Invited)
    }
}

impl std::fmt::Display for ParticipationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for ParticipationStatus {
    type Error = UnknownVariant;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "pending" => Ok(ParticipationStatus::Pending),
            "invited" => Ok(ParticipationStatus::Invited),
            "approved" => Ok(ParticipationStatus::Approved),
            "rejected" => Ok(ParticipationStatus::Rejected),
            _ => Err(UnknownVariant::new("participation status", value)),
        }
    }
}

/// Who initiated the participation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ParticipationKind {
    Request {
        message: Option<String>,
    },
    Invitation {
        #[serde(rename = "invitedBy")]
        invited_by: i64,
        message: Option<String>,
    },
}

impl ParticipationKind {
    pub fn tag(&self) -> &'static str {
        match self {
            ParticipationKind::Request { .. } => "request",
            ParticipationKind::Invitation { .. } => "invitation",
        }
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            ParticipationKind::Request { message } | ParticipationKind::Invitation { message, .. } => {
                message.as_deref()
            }
        }
    }

    pub fn invited_by(&self) -> Option<i64> {
        match self {
            ParticipationKind::Invitation { invited_by, .. } => Some(*invited_by),
            ParticipationKind::Request { .. } => None,
        }
    }
}

/// Serialized with `_id` and camelCase keys, like every participation response
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Participation {
    #[serde(rename = "_id")]
    pub id: i64,
    pub event_id: i64,
    pub user_id: i64,
    pub status: ParticipationStatus,
    #[serde(flatten)]
    pub kind: ParticipationKind,
    pub responded_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Participation {
    pub fn is_request(&self) -> bool {
        matches!(self.kind, ParticipationKind::Request { .. })
    }

    pub fn is_invitation(&self) -> bool {
        matches!(self.kind, ParticipationKind::Invitation { .. })
    }
}

/// Participation with the event and user it links, for listings
#[derive(Debug, Clone, Serialize)]
pub struct ParticipationDetails {
    #[serde(flatten)]
    pub participation: Participation,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event: Option<EventSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<PublicUser>,
}

/// Raw `participations` row
#[derive(Debug, Clone, FromRow)]
pub struct ParticipationRow {
    pub id: i64,
    pub event_id: i64,
    pub user_id: i64,
    pub kind: String,
    pub status: String,
    pub invited_by: Option<i64>,
    pub message: Option<String>,
    pub responded_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<ParticipationRow> for Participation {
    type Error = UnknownVariant;

    fn try_from(row: ParticipationRow) -> Result<Self, Self::Error> {
        let kind = match (row.kind.as_str(), row.invited_by) {
            ("request", _) => ParticipationKind::Request { message: row.message },
            ("invitation", Some(invited_by)) => ParticipationKind::Invitation {
                invited_by,
                message: row.message,
            },
            _ => return Err(UnknownVariant::new("participation kind", row.kind)),
        };

        Ok(Self {
            id: row.id,
            event_id: row.event_id,
            user_id: row.user_id,
            status: ParticipationStatus::try_from(row.status)?,
            kind,
            responded_at: row.responded_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// New participation to insert
#[derive(Debug, Clone)]
pub struct NewParticipation {
    pub event_id: i64,
    pub user_id: i64,
    pub status: ParticipationStatus,
    pub kind: ParticipationKind,
}

impl NewParticipation {
    pub fn request(event_id: i64, user_id: i64, message: Option<String>) -> Self {
        Self {
            event_id,
            user_id,
            status: ParticipationStatus::Pending,
            kind: ParticipationKind::Request { message },
        }
    }

    pub fn invitation(event_id: i64, user_id: i64, invited_by: i64, message: Option<String>) -> Self {
        Self {
            event_id,
            user_id,
            status: ParticipationStatus::Invited,
            kind: ParticipationKind::Invitation { invited_by, message },
        }
    }
}

/// Organizer decision on a join request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestAction {
    Approve,
    Decline,
}

/// Invitee answer to an invitation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvitationAction {
    Accept,
    Decline,
}

/// Which participants a reminder batch targets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReminderTarget {
    PendingInvitees,
    ApprovedAttendees,
}
