//! Participation workflow
//!
//! Join requests, invitations and reminders. Every mutating operation runs in
//! one transaction that starts by locking the event row, so concurrent
//! approvals and duplicate submissions for the same event serialize. Capacity
//! is taken with a conditional update; the `events_capacity_bounds` CHECK is the
//! last line.

use std::collections::HashMap;
use sqlx::PgConnection;
use tracing::info;
use crate::database::{finish, DatabaseService};
use crate::models::{
    Event, EventSummary, InvitationAction, NewParticipation, NotificationType, Participation,
    ParticipationDetails, ParticipationStatus, PublicUser, ReminderTarget, RequestAction, User,
};
use crate::services::notification::NotificationService;
use crate::services::schedule::find_conflicts;
use crate::utils::errors::{EventHubError, Result};
use crate::utils::logging::{log_participation_action, log_workflow_rejection};

/// Result of a successful join request
#[derive(Debug, Clone)]
pub struct JoinRequestOutcome {
    pub participation: Participation,
    pub event: Event,
}

#[derive(Clone)]
pub struct ParticipationService {
    db: DatabaseService,
    notifications: NotificationService,
}

impl ParticipationService {
    pub fn new(db: DatabaseService, notifications: NotificationService) -> Self {
        Self { db, notifications }
    }

    /// File a join request for `event_id` on behalf of `user`
    pub async fn submit_join_request(
        &self,
        user: &User,
        event_id: i64,
        message: Option<String>,
    ) -> Result<JoinRequestOutcome> {
        let mut tx = self.db.begin().await?;
        let result = self.submit_join_request_in(&mut tx, user, event_id, message).await;
        let outcome = finish(tx, result).await.inspect_err(|e| {
            log_workflow_rejection(event_id, user.id, "request_join", &e.to_string());
        })?;

        log_participation_action(outcome.participation.id, event_id, "request_join", user.id);
        Ok(outcome)
    }

    async fn submit_join_request_in(
        &self,
        conn: &mut PgConnection,
        user: &User,
        event_id: i64,
        message: Option<String>,
    ) -> Result<JoinRequestOutcome> {
        let event = self.lock_event(conn, event_id).await?;
        check_joinable(&event, user.id)?;

        if let Some(existing) = self.db.participations.find_latest_for_pair(&mut *conn, event_id, user.id).await? {
            return Err(EventHubError::Duplicate {
                reason: duplicate_reason(existing.status).to_string(),
                status: existing.status,
                participation_id: existing.id,
            });
        }

        let commitments = self.db.events.get_commitments(&mut *conn, user.id, event_id).await?;
        let conflicts = find_conflicts(&event.schedule(), commitments);
        if !conflicts.is_empty() {
            return Err(EventHubError::SchedulingConflict { conflicts });
        }

        let message = message.map(|m| m.trim().to_string()).filter(|m| !m.is_empty());
        let participation = self.db.participations
            .insert(&mut *conn, NewParticipation::request(event_id, user.id, message))
            .await?;

        let notification = self.notifications.join_request(&event, user, &participation)?;
        self.db.notifications.insert(&mut *conn, &notification).await?;

        Ok(JoinRequestOutcome { participation, event })
    }

    /// Approve or decline a pending join request
    pub async fn resolve_join_request(
        &self,
        organizer: &User,
        event_id: i64,
        request_id: i64,
        action: RequestAction,
    ) -> Result<Participation> {
        let mut tx = self.db.begin().await?;
        let result = self.resolve_join_request_in(&mut tx, organizer, event_id, request_id, action).await;
        let participation = finish(tx, result).await?;

        let label = match action {
            RequestAction::Approve => "approve_request",
            RequestAction::Decline => "decline_request",
        };
        log_participation_action(participation.id, event_id, label, organizer.id);
        Ok(participation)
    }

    async fn resolve_join_request_in(
        &self,
        conn: &mut PgConnection,
        organizer: &User,
        event_id: i64,
        request_id: i64,
        action: RequestAction,
    ) -> Result<Participation> {
        let event = self.lock_event(conn, event_id).await?;

        let request = self.db.participations
            .find_by_id_in(&mut *conn, request_id)
            .await?
            .filter(|p| p.event_id == event_id && p.is_request())
            .ok_or_else(|| EventHubError::not_found("Join request", request_id))?;

        if request.status != ParticipationStatus::Pending {
            return Err(EventHubError::InvalidState(format!(
                "Request has already been processed ({})",
                request.status
            )));
        }
        ensure_organizer(&event, organizer.id)?;
        ensure_open(&event)?;

        let (status, approved) = match action {
            RequestAction::Approve => {
                self.take_seat(conn, &event).await?;
                (ParticipationStatus::Approved, true)
            }
            RequestAction::Decline => (ParticipationStatus::Rejected, false),
        };

        let updated = self.db.participations.update_status(&mut *conn, request.id, status).await?;
        let notification = self.notifications.request_resolved(&event, organizer, &updated, approved)?;
        self.db.notifications.insert(&mut *conn, &notification).await?;

        Ok(updated)
    }

    /// Invite `invitee_id` to an event the caller organizes
    pub async fn invite(
        &self,
        organizer: &User,
        event_id: i64,
        invitee_id: i64,
        message: Option<String>,
    ) -> Result<Participation> {
        let mut tx = self.db.begin().await?;
        let result = self.invite_in(&mut tx, organizer, event_id, invitee_id, message).await;
        let participation = finish(tx, result).await?;

        log_participation_action(participation.id, event_id, "invite", organizer.id);
        Ok(participation)
    }

    async fn invite_in(
        &self,
        conn: &mut PgConnection,
        organizer: &User,
        event_id: i64,
        invitee_id: i64,
        message: Option<String>,
    ) -> Result<Participation> {
        let event = self.lock_event(conn, event_id).await?;
        ensure_organizer(&event, organizer.id)?;
        ensure_open(&event)?;

        if invitee_id == organizer.id {
            return Err(EventHubError::Validation("You cannot invite yourself".to_string()));
        }
        self.db.users
            .find_by_id_in(&mut *conn, invitee_id)
            .await?
            .ok_or_else(|| EventHubError::not_found("User", invitee_id))?;

        if let Some(existing) = self.db.participations.find_active_for_pair(&mut *conn, event_id, invitee_id).await? {
            return Err(EventHubError::Duplicate {
                reason: invitee_duplicate_reason(existing.status).to_string(),
                status: existing.status,
                participation_id: existing.id,
            });
        }

        let message = message.map(|m| m.trim().to_string()).filter(|m| !m.is_empty());
        let participation = self.db.participations
            .insert(&mut *conn, NewParticipation::invitation(event_id, invitee_id, organizer.id, message))
            .await?;

        let notification = self.notifications.invitation(&event, organizer, &participation)?;
        self.db.notifications.insert(&mut *conn, &notification).await?;

        Ok(participation)
    }

    /// Accept or decline an invitation addressed to the caller
    pub async fn respond_to_invitation(
        &self,
        invitee: &User,
        event_id: i64,
        invitation_id: i64,
        action: InvitationAction,
    ) -> Result<Participation> {
        let mut tx = self.db.begin().await?;
        let result = self.respond_in(&mut tx, invitee, event_id, invitation_id, action).await;
        let participation = finish(tx, result).await?;

        let label = match action {
            InvitationAction::Accept => "accept_invitation",
            InvitationAction::Decline => "decline_invitation",
        };
        log_participation_action(participation.id, event_id, label, invitee.id);
        Ok(participation)
    }

    async fn respond_in(
        &self,
        conn: &mut PgConnection,
        invitee: &User,
        event_id: i64,
        invitation_id: i64,
        action: InvitationAction,
    ) -> Result<Participation> {
        let event = self.lock_event(conn, event_id).await?;

        let invitation = self.db.participations
            .find_by_id_in(&mut *conn, invitation_id)
            .await?
            .filter(|p| p.event_id == event_id && p.is_invitation())
            .ok_or_else(|| EventHubError::not_found("Invitation", invitation_id))?;

        if invitation.user_id != invitee.id {
            return Err(EventHubError::Forbidden("This invitation is addressed to another user".to_string()));
        }
        if invitation.status != ParticipationStatus::Invited {
            return Err(EventHubError::InvalidState(format!(
                "Invitation has already been answered ({})",
                invitation.status
            )));
        }
        ensure_open(&event)?;

        let (status, accepted) = match action {
            InvitationAction::Accept => {
                self.take_seat(conn, &event).await?;
                (ParticipationStatus::Approved, true)
            }
            InvitationAction::Decline => (ParticipationStatus::Rejected, false),
        };

        let updated = self.db.participations.update_status(&mut *conn, invitation.id, status).await?;
        let notification = self.notifications.invitation_answered(&event, invitee, &updated, accepted)?;
        self.db.notifications.insert(&mut *conn, &notification).await?;

        Ok(updated)
    }

    /// Send one reminder per matching participation; returns how many were sent
    pub async fn send_reminders(&self, organizer: &User, event_id: i64, target: ReminderTarget) -> Result<u64> {
        let mut tx = self.db.begin().await?;
        let result = self.send_reminders_in(&mut tx, organizer, event_id, target).await;
        let count = finish(tx, result).await?;

        info!(event_id = event_id, organizer_id = organizer.id, target = ?target, count = count, "Reminders sent");
        Ok(count)
    }

    async fn send_reminders_in(
        &self,
        conn: &mut PgConnection,
        organizer: &User,
        event_id: i64,
        target: ReminderTarget,
    ) -> Result<u64> {
        let event = self.lock_event(conn, event_id).await?;
        ensure_organizer(&event, organizer.id)?;
        ensure_open(&event)?;

        let kind = match target {
            ReminderTarget::PendingInvitees => NotificationType::InvitationReminder,
            ReminderTarget::ApprovedAttendees => NotificationType::EventReminder,
        };

        let recipients = self.db.participations.list_reminder_targets(&mut *conn, event_id, target).await?;
        let batch = recipients
            .iter()
            .map(|p| self.notifications.reminder(kind, &event, organizer, p))
            .collect::<Result<Vec<_>>>()?;

        self.db.notifications.insert_many(&mut *conn, &batch).await
    }

    /// Pending join requests of an event, organizer only
    pub async fn list_pending_requests(&self, organizer: &User, event_id: i64) -> Result<Vec<ParticipationDetails>> {
        let event = self.db.require_event(event_id).await?;
        ensure_organizer(&event, organizer.id)?;

        let requests: Vec<Participation> = self.db.participations
            .list_by_event(event_id, ParticipationStatus::Pending)
            .await?
            .into_iter()
            .filter(Participation::is_request)
            .collect();

        self.with_users(requests).await
    }

    /// Approved attendees of an event
    pub async fn list_participants(&self, viewer: &User, event_id: i64) -> Result<Vec<PublicUser>> {
        let event = self.db.require_event(event_id).await?;
        if !event.publicity
            && event.organizer_id != viewer.id
            && !self.db.participations.is_involved(event_id, viewer.id).await?
        {
            return Err(EventHubError::not_found("Event", event_id));
        }

        let approved = self.db.participations.list_by_event(event_id, ParticipationStatus::Approved).await?;
        let ids: Vec<i64> = approved.iter().map(|p| p.user_id).collect();
        let users = self.db.users.find_by_ids(&ids).await?;
        Ok(users.iter().map(PublicUser::from).collect())
    }

    /// Invitations addressed to the caller, with their events
    pub async fn list_invitations(&self, user: &User) -> Result<Vec<ParticipationDetails>> {
        let invitations = self.db.participations.list_invitations_for_user(user.id).await?;
        self.with_events(invitations).await
    }

    /// The caller's own participations, optionally narrowed to a status
    pub async fn list_participations(
        &self,
        user: &User,
        status: Option<ParticipationStatus>,
    ) -> Result<Vec<ParticipationDetails>> {
        let participations = self.db.participations.list_by_user(user.id, status).await?;
        self.with_events(participations).await
    }

    async fn lock_event(&self, conn: &mut PgConnection, event_id: i64) -> Result<Event> {
        self.db.events
            .lock_for_update(conn, event_id)
            .await?
            .ok_or_else(|| EventHubError::not_found("Event", event_id))
    }

    async fn take_seat(&self, conn: &mut PgConnection, event: &Event) -> Result<()> {
        if !self.db.events.try_increment_attendees(conn, event.id).await? {
            return Err(EventHubError::Capacity);
        }
        Ok(())
    }

    async fn with_users(&self, participations: Vec<Participation>) -> Result<Vec<ParticipationDetails>> {
        let ids: Vec<i64> = participations.iter().map(|p| p.user_id).collect();
        let users: HashMap<i64, PublicUser> = self.db.users
            .find_by_ids(&ids)
            .await?
            .iter()
            .map(|u| (u.id, PublicUser::from(u)))
            .collect();

        Ok(participations
            .into_iter()
            .map(|p| ParticipationDetails {
                user: users.get(&p.user_id).cloned(),
                event: None,
                participation: p,
            })
            .collect())
    }

    async fn with_events(&self, participations: Vec<Participation>) -> Result<Vec<ParticipationDetails>> {
        let mut ids: Vec<i64> = participations.iter().map(|p| p.event_id).collect();
        ids.sort_unstable();
        ids.dedup();
        let events: HashMap<i64, EventSummary> = self.db.events
            .find_by_ids(&ids)
            .await?
            .iter()
            .map(|e| (e.id, EventSummary::from(e)))
            .collect();

        Ok(participations
            .into_iter()
            .map(|p| ParticipationDetails {
                event: events.get(&p.event_id).cloned(),
                user: None,
                participation: p,
            })
            .collect())
    }
}

/// Checks a join request must pass before any participation lookup
pub fn check_joinable(event: &Event, user_id: i64) -> Result<()> {
    ensure_open(event)?;
    if !event.publicity {
        return Err(EventHubError::Validation(
            "This event is private; you need an invitation to join".to_string(),
        ));
    }
    if !event.has_capacity() {
        return Err(EventHubError::Capacity);
    }
    if event.organizer_id == user_id {
        return Err(EventHubError::Validation("You are the organizer of this event".to_string()));
    }
    Ok(())
}

/// Why a second join request is refused, given the existing status
pub fn duplicate_reason(status: ParticipationStatus) -> &'static str {
    match status {
        ParticipationStatus::Approved => "You are already attending this event",
        ParticipationStatus::Invited => "You already have a pending invitation to this event",
        ParticipationStatus::Rejected => "Your participation in this event was previously declined",
        ParticipationStatus::Pending => "You already have a pending request for this event",
    }
}

fn invitee_duplicate_reason(status: ParticipationStatus) -> &'static str {
    match status {
        ParticipationStatus::Approved => "User is already attending this event",
        ParticipationStatus::Invited => "User already has a pending invitation to this event",
        _ => "User already has a pending request for this event",
    }
}

fn ensure_organizer(event: &Event, user_id: i64) -> Result<()> {
    if event.organizer_id != user_id {
        return Err(EventHubError::Forbidden("Only the event organizer can do this".to_string()));
    }
    Ok(())
}

fn ensure_open(event: &Event) -> Result<()> {
    if event.is_closed() {
        return Err(EventHubError::InvalidState(format!("Event has {}", event.status)));
    }
    Ok(())
}
