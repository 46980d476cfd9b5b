//! Notification service implementation
//!
//! This service renders notification messages from templates and serves the
//! recipient-facing notification operations (listing, read state, deletion).
//! Workflow notifications are composed here but written by the caller inside
//! its own transaction.

use std::collections::HashMap;
use std::sync::Arc;
use serde_json::json;
use tracing::debug;
use crate::database::DatabaseService;
use crate::models::{Event, NewNotification, Notification, NotificationType, Participation, SenderSnapshot, User};
use crate::utils::errors::{EventHubError, Result};
use crate::utils::helpers::{calculate_offset, clamp_page_size};

/// Message template for one notification type
#[derive(Debug, Clone)]
pub struct MessageTemplate {
    pub kind: NotificationType,
    /// One-line message stored in `notifications.message`
    pub headline: String,
    /// Long-form text stored in the JSON payload
    pub body: String,
}

/// Parameters substituted into `{name}` placeholders
pub type TemplateParams = HashMap<&'static str, String>;

/// Notification service for composing and managing notifications
#[derive(Clone)]
pub struct NotificationService {
    db: DatabaseService,
    templates: Arc<HashMap<NotificationType, MessageTemplate>>,
}

impl NotificationService {
    /// Create a new NotificationService instance
    pub fn new(db: DatabaseService) -> Self {
        Self {
            db,
            templates: Arc::new(load_default_templates()),
        }
    }

    /// Render a template with parameters
    pub fn render(&self, kind: NotificationType, params: &TemplateParams) -> Result<(String, String)> {
        let template = self.templates
            .get(&kind)
            .ok_or_else(|| EventHubError::Config(format!("Template not found: {}", kind.as_str())))?;

        Ok((format_message(&template.headline, params), format_message(&template.body, params)))
    }

    /// Build a notification for `recipient_id` about `participation`
    pub fn compose(
        &self,
        kind: NotificationType,
        recipient_id: i64,
        participation: &Participation,
        event: &Event,
        sender: &User,
        params: &TemplateParams,
    ) -> Result<NewNotification> {
        let (message, body) = self.render(kind, params)?;

        Ok(NewNotification {
            user_id: recipient_id,
            kind,
            message,
            related_id: Some(participation.id),
            data: json!({
                "message": body,
                "eventId": event.id,
                "sender": SenderSnapshot::from(sender),
            }),
        })
    }

    /// Notification to the organizer about a new join request
    pub fn join_request(
        &self,
        event: &Event,
        requester: &User,
        participation: &Participation,
    ) -> Result<NewNotification> {
        let mut params = event_params(event);
        params.insert("requester_name", requester.name.clone());
        params.insert("requester_username", requester.username.clone());
        params.insert("note", note_line(participation.kind.message()));

        self.compose(NotificationType::JoinRequest, event.organizer_id, participation, event, requester, &params)
    }

    /// Notification to the requester about the organizer's decision
    pub fn request_resolved(
        &self,
        event: &Event,
        organizer: &User,
        participation: &Participation,
        approved: bool,
    ) -> Result<NewNotification> {
        let kind = if approved { NotificationType::RequestApproved } else { NotificationType::RequestDeclined };
        let params = organizer_params(event, organizer);

        self.compose(kind, participation.user_id, participation, event, organizer, &params)
    }

    /// Notification to the invitee about a new invitation
    pub fn invitation(
        &self,
        event: &Event,
        organizer: &User,
        participation: &Participation,
    ) -> Result<NewNotification> {
        let mut params = organizer_params(event, organizer);
        params.insert("note", note_line(participation.kind.message()));

        self.compose(NotificationType::Invitation, participation.user_id, participation, event, organizer, &params)
    }

    /// Notification to the organizer about the invitee's answer
    pub fn invitation_answered(
        &self,
        event: &Event,
        invitee: &User,
        participation: &Participation,
        accepted: bool,
    ) -> Result<NewNotification> {
        let kind = if accepted { NotificationType::InvitationAccepted } else { NotificationType::InvitationDeclined };
        let mut params = event_params(event);
        params.insert("invitee_name", invitee.name.clone());
        params.insert("invitee_username", invitee.username.clone());

        self.compose(kind, event.organizer_id, participation, event, invitee, &params)
    }

    /// Reminder for one participation (pending invitation or approved attendance)
    pub fn reminder(
        &self,
        kind: NotificationType,
        event: &Event,
        organizer: &User,
        participation: &Participation,
    ) -> Result<NewNotification> {
        let params = organizer_params(event, organizer);
        self.compose(kind, participation.user_id, participation, event, organizer, &params)
    }

    /// List notifications of a user
    pub async fn list(&self, user_id: i64, unread_only: bool, page: Option<i64>, limit: Option<i64>) -> Result<Vec<Notification>> {
        let limit = clamp_page_size(limit, 50, 200);
        let offset = calculate_offset(page.unwrap_or(1), limit);
        self.db.notifications.list_for_user(user_id, unread_only, limit, offset).await
    }

    pub async fn unread_count(&self, user_id: i64) -> Result<i64> {
        self.db.notifications.unread_count(user_id).await
    }

    /// Mark one of the user's notifications read
    pub async fn mark_read(&self, user_id: i64, notification_id: i64) -> Result<Notification> {
        self.db.notifications
            .mark_read(notification_id, user_id)
            .await?
            .ok_or_else(|| EventHubError::not_found("Notification", notification_id))
    }

    pub async fn mark_all_read(&self, user_id: i64) -> Result<u64> {
        let updated = self.db.notifications.mark_all_read(user_id).await?;
        debug!(user_id = user_id, updated = updated, "Marked notifications read");
        Ok(updated)
    }

    /// Delete one of the user's notifications
    pub async fn delete(&self, user_id: i64, notification_id: i64) -> Result<()> {
        if !self.db.notifications.delete(notification_id, user_id).await? {
            return Err(EventHubError::not_found("Notification", notification_id));
        }
        Ok(())
    }
}

/// Replace `{key}` placeholders; unknown placeholders are left as-is
pub fn format_message(template: &str, params: &TemplateParams) -> String {
    let mut formatted = template.to_string();
    for (key, value) in params {
        let placeholder = format!("{{{}}}", key);
        formatted = formatted.replace(&placeholder, value);
    }
    formatted
}

/// Placeholders every event-related template can use
pub fn event_params(event: &Event) -> TemplateParams {
    let schedule = event.schedule();
    let mut params = TemplateParams::new();
    params.insert("event_title", event.title.clone());
    params.insert("event_start", schedule.start.to_string());
    params.insert("event_time", schedule.format_range());
    params.insert("event_location", event.location.clone().unwrap_or_else(|| "TBA".to_string()));
    params
}

fn organizer_params(event: &Event, organizer: &User) -> TemplateParams {
    let mut params = event_params(event);
    params.insert("organizer_name", organizer.name.clone());
    params.insert("organizer_username", organizer.username.clone());
    params.insert("organizer_email", organizer.email.clone());
    params
}

fn note_line(message: Option<&str>) -> String {
    match message.map(str::trim).filter(|m| !m.is_empty()) {
        Some(m) => format!("\n\nMessage: {}", m),
        None => String::new(),
    }
}

/// Load default message templates
fn load_default_templates() -> HashMap<NotificationType, MessageTemplate> {
    let entries = [
        (
            NotificationType::JoinRequest,
            "{requester_name} wants to join {event_title}",
            "{requester_name} (@{requester_username}) asked to join \"{event_title}\" ({event_time}).{note}",
        ),
        (
            NotificationType::RequestApproved,
            "Your request to join {event_title} was approved",
            "Good news! {organizer_name} approved your request to join \"{event_title}\".\n\n\
             When: {event_time}\nWhere: {event_location}\n\n\
             Questions? Contact {organizer_name} at {organizer_email}.",
        ),
        (
            NotificationType::RequestDeclined,
            "Your request to join {event_title} was declined",
            "{organizer_name} declined your request to join \"{event_title}\" ({event_time}).",
        ),
        (
            NotificationType::Invitation,
            "{organizer_name} invited you to {event_title}",
            "{organizer_name} (@{organizer_username}) invited you to \"{event_title}\".\n\n\
             When: {event_time}\nWhere: {event_location}{note}",
        ),
        (
            NotificationType::InvitationAccepted,
            "{invitee_name} accepted your invitation to {event_title}",
            "{invitee_name} (@{invitee_username}) will attend \"{event_title}\" ({event_time}).",
        ),
        (
            NotificationType::InvitationDeclined,
            "{invitee_name} declined your invitation to {event_title}",
            "{invitee_name} (@{invitee_username}) will not attend \"{event_title}\" ({event_time}).",
        ),
        (
            NotificationType::InvitationReminder,
            "Reminder: you have a pending invitation to {event_title}",
            "{organizer_name} is still waiting for your answer to the invitation to \"{event_title}\".\n\n\
             When: {event_time}\nWhere: {event_location}\n\n\
             Contact: {organizer_name} ({organizer_email})",
        ),
        (
            NotificationType::EventReminder,
            "Reminder: {event_title} starts {event_start}",
            "This is a reminder that \"{event_title}\" is coming up.\n\n\
             When: {event_time}\nWhere: {event_location}\n\n\
             Organizer: {organizer_name} ({organizer_email})",
        ),
    ];

    entries
        .into_iter()
        .map(|(kind, headline, body)| {
            (kind, MessageTemplate { kind, headline: headline.to_string(), body: body.to_string() })
        })
        .collect()
}
