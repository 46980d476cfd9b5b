//! Event service implementation
//!
//! Event CRUD. Organizers own their events; status moves forward through the
//! sweep, and the only manual change is cancellation.

use sqlx::PgConnection;
use tracing::info;
use crate::database::{finish, DatabaseService};
use crate::models::{
    ActivityAction, CreateEventRequest, EntityType, Event, EventFilter, EventStatus, UpdateEventRequest, User,
};
use crate::services::activity::ActivityService;
use crate::utils::errors::{EventHubError, Result};
use crate::utils::helpers::{calculate_offset, clamp_page_size};
use crate::utils::logging::log_event_action;

const MAX_TITLE_LENGTH: usize = 200;
const MAX_SUMMARY_LENGTH: usize = 500;

/// One page of events
#[derive(Debug, Clone, serde::Serialize)]
pub struct EventPage {
    pub events: Vec<Event>,
    pub total: i64,
    pub page: i64,
    pub limit: i64,
}

#[derive(Clone)]
pub struct EventService {
    db: DatabaseService,
    activity: ActivityService,
}

impl EventService {
    pub fn new(db: DatabaseService, activity: ActivityService) -> Self {
        Self { db, activity }
    }

    /// Create an event organized by `organizer`
    pub async fn create(&self, organizer: &User, mut request: CreateEventRequest) -> Result<Event> {
        request.title = validate_title(&request.title)?;
        validate_summary(request.summary.as_deref())?;
        if request.max_attendees < 1 {
            return Err(EventHubError::Validation("max_attendees must be at least 1".to_string()));
        }
        if !request.schedule().is_well_formed() {
            return Err(EventHubError::Validation("Event must end after it starts".to_string()));
        }

        let event = self.db.events.create(organizer.id, request).await?;
        log_event_action(event.id, "created", organizer.id, Some(&event.title));
        self.activity
            .record(organizer.id, ActivityAction::Created, EntityType::Event, event.id, &event)
            .await;

        Ok(event)
    }

    /// Get an event the viewer may see
    pub async fn get(&self, viewer: &User, event_id: i64) -> Result<Event> {
        let event = self.db.require_event(event_id).await?;
        if !self.can_view(&event, viewer.id).await? {
            // private events are invisible to outsiders
            return Err(EventHubError::not_found("Event", event_id));
        }
        Ok(event)
    }

    /// Public events are visible to everybody; private ones to the organizer and participants
    pub async fn can_view(&self, event: &Event, viewer_id: i64) -> Result<bool> {
        if event.publicity || event.organizer_id == viewer_id {
            return Ok(true);
        }
        self.db.participations.is_involved(event.id, viewer_id).await
    }

    /// Public events, soonest first
    pub async fn list_public(&self, filter: &EventFilter) -> Result<EventPage> {
        let limit = clamp_page_size(filter.limit, 20, 100);
        let page = filter.page.unwrap_or(1).max(1);
        let offset = calculate_offset(page, limit);

        let events = self.db.events.list_public(filter.status, limit, offset).await?;
        let total = self.db.events.count_public(filter.status).await?;
        Ok(EventPage { events, total, page, limit })
    }

    /// Events organized by the user
    pub async fn list_organized(&self, user: &User) -> Result<Vec<Event>> {
        self.db.events.get_user_events(user.id).await
    }

    /// Events the user attends
    pub async fn list_attending(&self, user: &User) -> Result<Vec<Event>> {
        self.db.events.get_user_attending_events(user.id).await
    }

    /// Update an event; organizer only
    pub async fn update(&self, organizer: &User, event_id: i64, request: UpdateEventRequest) -> Result<Event> {
        let mut tx = self.db.begin().await?;
        let result = self.update_in(&mut tx, organizer, event_id, request).await;
        let event = finish(tx, result).await?;

        log_event_action(event.id, "updated", organizer.id, None);
        self.activity
            .record(organizer.id, ActivityAction::Updated, EntityType::Event, event.id, &event)
            .await;

        Ok(event)
    }

    async fn update_in(
        &self,
        conn: &mut PgConnection,
        organizer: &User,
        event_id: i64,
        mut request: UpdateEventRequest,
    ) -> Result<Event> {
        let event = self.db.events
            .lock_for_update(&mut *conn, event_id)
            .await?
            .ok_or_else(|| EventHubError::not_found("Event", event_id))?;

        if event.organizer_id != organizer.id {
            return Err(EventHubError::Forbidden("Only the event organizer can edit this event".to_string()));
        }
        check_update(&event, &request)?;
        if let Some(title) = &request.title {
            request.title = Some(validate_title(title)?);
        }
        validate_summary(request.summary.as_deref())?;

        self.db.events.update(conn, event_id, request).await
    }

    /// Delete an event; organizer or admin
    pub async fn delete(&self, user: &User, event_id: i64) -> Result<()> {
        let event = self.db.require_event(event_id).await?;
        if event.organizer_id != user.id && !self.db.admin.is_admin(user.id).await? {
            return Err(EventHubError::Forbidden("Only the organizer or an admin can delete this event".to_string()));
        }

        if !self.db.events.delete(event_id).await? {
            return Err(EventHubError::not_found("Event", event_id));
        }

        info!(event_id = event_id, user_id = user.id, "Event deleted");
        self.activity
            .record(user.id, ActivityAction::Deleted, EntityType::Event, event_id, &event)
            .await;
        Ok(())
    }
}

/// Rules an update must satisfy against the current event
pub fn check_update(event: &Event, request: &UpdateEventRequest) -> Result<()> {
    if event.is_closed() {
        return Err(EventHubError::InvalidState(format!("Event has {} and can no longer be edited", event.status)));
    }
    if let Some(status) = request.status {
        if status != event.status && status != EventStatus::Cancelled {
            return Err(EventHubError::Validation("Event status can only be changed to cancelled".to_string()));
        }
    }
    if let Some(max) = request.max_attendees {
        if max < 1 {
            return Err(EventHubError::Validation("max_attendees must be at least 1".to_string()));
        }
        if max < event.cur_attendees {
            return Err(EventHubError::Validation(format!(
                "max_attendees cannot be lower than the {} approved attendee(s)",
                event.cur_attendees
            )));
        }
    }
    if !request.merged_schedule(event).is_well_formed() {
        return Err(EventHubError::Validation("Event must end after it starts".to_string()));
    }
    Ok(())
}

fn validate_title(title: &str) -> Result<String> {
    let title = title.trim();
    if title.is_empty() || title.chars().count() > MAX_TITLE_LENGTH {
        return Err(EventHubError::Validation(format!(
            "Title must be between 1 and {} characters",
            MAX_TITLE_LENGTH
        )));
    }
    Ok(title.to_string())
}

fn validate_summary(summary: Option<&str>) -> Result<()> {
    if summary.is_some_and(|s| s.chars().count() > MAX_SUMMARY_LENGTH) {
        return Err(EventHubError::Validation(format!(
            "Summary must be at most {} characters",
            MAX_SUMMARY_LENGTH
        )));
    }
    Ok(())
}
