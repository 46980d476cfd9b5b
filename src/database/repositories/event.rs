//! Event repository implementation

use sqlx::{PgConnection, PgPool};
use chrono::{NaiveDate, NaiveTime, Utc};
use crate::models::event::{Event, EventStatus, CreateEventRequest, UpdateEventRequest};
use crate::utils::errors::{EventHubError, Result};

const EVENT_COLUMNS: &str = "id, title, description, summary, start_date, start_time, end_date, end_time, \
     location, event_type, image_url, max_attendees, cur_attendees, publicity, organizer_id, status, \
     created_at, updated_at";

#[derive(Clone)]
#[derive(Debug)]
pub struct EventRepository {
    pool: PgPool,
}

impl EventRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new event
    pub async fn create(&self, organizer_id: i64, request: CreateEventRequest) -> Result<Event> {
        let event = sqlx::query_as::<_, Event>(&format!(
            r#"
            INSERT INTO events (title, description, summary, start_date, start_time, end_date, end_time,
                                location, event_type, image_url, max_attendees, publicity, organizer_id,
                                created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $14)
            RETURNING {EVENT_COLUMNS}
            "#
        ))
        .bind(request.title)
        .bind(request.description)
        .bind(request.summary)
        .bind(request.start_date)
        .bind(request.start_time)
        .bind(request.end_date)
        .bind(request.end_time)
        .bind(request.location)
        .bind(request.event_type)
        .bind(request.image_url)
        .bind(request.max_attendees)
        .bind(request.publicity)
        .bind(organizer_id)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(event)
    }

    /// Find event by ID
    pub async fn find_by_id(&self, id: i64) -> Result<Option<Event>> {
        let event = sqlx::query_as::<_, Event>(&format!("SELECT {EVENT_COLUMNS} FROM events WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(event)
    }

    /// Load several events at once; missing ids are skipped
    pub async fn find_by_ids(&self, ids: &[i64]) -> Result<Vec<Event>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let events = sqlx::query_as::<_, Event>(&format!("SELECT {EVENT_COLUMNS} FROM events WHERE id = ANY($1)"))
            .bind(ids)
            .fetch_all(&self.pool)
            .await?;

        Ok(events)
    }

    /// Load the event and hold its row lock until the transaction ends
    ///
    /// Every participation change for an event goes through this lock, so
    /// capacity checks and duplicate checks see a stable row.
    pub async fn lock_for_update(&self, conn: &mut PgConnection, id: i64) -> Result<Option<Event>> {
        let event = sqlx::query_as::<_, Event>(&format!(
            "SELECT {EVENT_COLUMNS} FROM events WHERE id = $1 FOR UPDATE"
        ))
        .bind(id)
        .fetch_optional(conn)
        .await?;

        Ok(event)
    }

    /// Take one seat if any is left; returns false when the event is full
    pub async fn try_increment_attendees(&self, conn: &mut PgConnection, id: i64) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE events
            SET cur_attendees = cur_attendees + 1, updated_at = $2
            WHERE id = $1 AND cur_attendees < max_attendees
            "#
        )
        .bind(id)
        .bind(Utc::now())
        .execute(conn)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    /// Update event
    pub async fn update(&self, conn: &mut PgConnection, id: i64, request: UpdateEventRequest) -> Result<Event> {
        let event = sqlx::query_as::<_, Event>(&format!(
            r#"
            UPDATE events
            SET title = COALESCE($2, title),
                description = COALESCE($3, description),
                summary = COALESCE($4, summary),
                start_date = COALESCE($5, start_date),
                start_time = COALESCE($6, start_time),
                end_date = COALESCE($7, end_date),
                end_time = COALESCE($8, end_time),
                location = COALESCE($9, location),
                event_type = COALESCE($10, event_type),
                image_url = COALESCE($11, image_url),
                max_attendees = COALESCE($12, max_attendees),
                publicity = COALESCE($13, publicity),
                status = COALESCE($14, status),
                updated_at = $15
            WHERE id = $1
            RETURNING {EVENT_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(request.title)
        .bind(request.description)
        .bind(request.summary)
        .bind(request.start_date)
        .bind(request.start_time)
        .bind(request.end_date)
        .bind(request.end_time)
        .bind(request.location)
        .bind(request.event_type)
        .bind(request.image_url)
        .bind(request.max_attendees)
        .bind(request.publicity)
        .bind(request.status.map(|s| s.as_str()))
        .bind(Utc::now())
        .fetch_optional(conn)
        .await?
        .ok_or_else(|| EventHubError::not_found("Event", id))?;

        Ok(event)
    }

    /// Delete event
    pub async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM events WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// List public events, soonest first
    pub async fn list_public(&self, status: Option<EventStatus>, limit: i64, offset: i64) -> Result<Vec<Event>> {
        let events = sqlx::query_as::<_, Event>(&format!(
            r#"
            SELECT {EVENT_COLUMNS} FROM events
            WHERE publicity = TRUE AND ($1::TEXT IS NULL OR status = $1)
            ORDER BY start_date ASC, start_time ASC
            LIMIT $2 OFFSET $3
            "#
        ))
        .bind(status.map(|s| s.as_str()))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(events)
    }

    /// Count public events for pagination
    pub async fn count_public(&self, status: Option<EventStatus>) -> Result<i64> {
        let count: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM events WHERE publicity = TRUE AND ($1::TEXT IS NULL OR status = $1)"
        )
        .bind(status.map(|s| s.as_str()))
        .fetch_one(&self.pool)
        .await?;

        Ok(count.0)
    }

    /// Get events organized by user
    pub async fn get_user_events(&self, user_id: i64) -> Result<Vec<Event>> {
        let events = sqlx::query_as::<_, Event>(&format!(
            "SELECT {EVENT_COLUMNS} FROM events WHERE organizer_id = $1 ORDER BY start_date ASC, start_time ASC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(events)
    }

    /// Get events the user attends as approved participant
    pub async fn get_user_attending_events(&self, user_id: i64) -> Result<Vec<Event>> {
        let events = sqlx::query_as::<_, Event>(&format!(
            r#"
            SELECT {columns}
            FROM events e
            INNER JOIN participations p ON e.id = p.event_id
            WHERE p.user_id = $1 AND p.status = 'approved'
            ORDER BY e.start_date ASC, e.start_time ASC
            "#,
            columns = prefixed_columns("e"),
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(events)
    }

    /// Events that could collide with a new commitment of `user_id`
    ///
    /// Returns approved-attendance events and organized events (flagged by the
    /// boolean), skipping cancelled ones and `exclude_event_id`.
    pub async fn get_commitments(
        &self,
        conn: &mut PgConnection,
        user_id: i64,
        exclude_event_id: i64,
    ) -> Result<Vec<(Event, bool)>> {
        let attending = sqlx::query_as::<_, Event>(&format!(
            r#"
            SELECT {columns}
            FROM events e
            INNER JOIN participations p ON e.id = p.event_id
            WHERE p.user_id = $1 AND p.status = 'approved'
              AND e.status <> 'cancelled' AND e.id <> $2
            "#,
            columns = prefixed_columns("e"),
        ))
        .bind(user_id)
        .bind(exclude_event_id)
        .fetch_all(&mut *conn)
        .await?;

        let organizing = sqlx::query_as::<_, Event>(&format!(
            r#"
            SELECT {EVENT_COLUMNS} FROM events
            WHERE organizer_id = $1 AND status <> 'cancelled' AND id <> $2
            "#
        ))
        .bind(user_id)
        .bind(exclude_event_id)
        .fetch_all(&mut *conn)
        .await?;

        Ok(attending
            .into_iter()
            .map(|e| (e, false))
            .chain(organizing.into_iter().map(|e| (e, true)))
            .collect())
    }

    /// Events in `status` whose boundary (start or end) is at or before now
    pub async fn find_due(
        &self,
        status: EventStatus,
        today: NaiveDate,
        now: NaiveTime,
    ) -> Result<Vec<Event>> {
        let (date_col, time_col) = match status {
            EventStatus::Scheduled => ("start_date", "start_time"),
            _ => ("end_date", "end_time"),
        };

        let events = sqlx::query_as::<_, Event>(&format!(
            r#"
            SELECT {EVENT_COLUMNS} FROM events
            WHERE status = $1 AND ({date_col} < $2 OR ({date_col} = $2 AND {time_col} <= $3))
            ORDER BY {date_col} ASC, {time_col} ASC
            "#
        ))
        .bind(status.as_str())
        .bind(today)
        .bind(now)
        .fetch_all(&self.pool)
        .await?;

        Ok(events)
    }

    /// Move an event from `from` to `to`; no-op if it already moved
    pub async fn transition_status(&self, id: i64, from: EventStatus, to: EventStatus) -> Result<bool> {
        let result = sqlx::query("UPDATE events SET status = $3, updated_at = $4 WHERE id = $1 AND status = $2")
            .bind(id)
            .bind(from.as_str())
            .bind(to.as_str())
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() == 1)
    }

    /// Count organized events that are not over yet
    pub async fn count_active_organized(&self, user_id: i64) -> Result<i64> {
        let count: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM events WHERE organizer_id = $1 AND status IN ('scheduled', 'ongoing')"
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count.0)
    }

    /// Count all organized events
    pub async fn count_organized(&self, user_id: i64) -> Result<i64> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM events WHERE organizer_id = $1")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count.0)
    }

    /// Count total events
    pub async fn count(&self) -> Result<i64> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM events")
            .fetch_one(&self.pool)
            .await?;

        Ok(count.0)
    }
}

fn prefixed_columns(alias: &str) -> String {
    EVENT_COLUMNS
        .split(',')
        .map(|c| format!("{}.{}", alias, c.trim()))
        .collect::<Vec<_>>()
        .join(", ")
}
