//! Participation repository implementation
//!
//! Mutating methods take a `PgConnection` so the workflow can run them inside
//! the transaction that holds the event row lock.

use sqlx::{PgConnection, PgPool};
use chrono::Utc;
use crate::models::participation::{
    NewParticipation, Participation, ParticipationRow, ParticipationStatus, ReminderTarget,
};
use crate::utils::errors::{EventHubError, Result};

const PARTICIPATION_COLUMNS: &str =
    "id, event_id, user_id, kind, status, invited_by, message, responded_at, created_at, updated_at";

#[derive(Clone)]
#[derive(Debug)]
pub struct ParticipationRepository {
    pool: PgPool,
}

fn decode(row: ParticipationRow) -> Result<Participation> {
    Participation::try_from(row).map_err(|e| EventHubError::Database(sqlx::Error::Decode(Box::new(e))))
}

fn decode_all(rows: Vec<ParticipationRow>) -> Result<Vec<Participation>> {
    rows.into_iter().map(decode).collect()
}

impl ParticipationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a request or invitation
    pub async fn insert(&self, conn: &mut PgConnection, new: NewParticipation) -> Result<Participation> {
        let row = sqlx::query_as::<_, ParticipationRow>(&format!(
            r#"
            INSERT INTO participations (event_id, user_id, kind, status, invited_by, message, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $7)
            RETURNING {PARTICIPATION_COLUMNS}
            "#
        ))
        .bind(new.event_id)
        .bind(new.user_id)
        .bind(new.kind.tag())
        .bind(new.status.as_str())
        .bind(new.kind.invited_by())
        .bind(new.kind.message())
        .bind(Utc::now())
        .fetch_one(conn)
        .await
        .map_err(|err| match err {
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                EventHubError::InvalidState("An open request or invitation already exists for this user".to_string())
            }
            other => EventHubError::from_db(other),
        })?;

        decode(row)
    }

    /// Find participation by ID
    pub async fn find_by_id(&self, id: i64) -> Result<Option<Participation>> {
        let row = sqlx::query_as::<_, ParticipationRow>(&format!(
            "SELECT {PARTICIPATION_COLUMNS} FROM participations WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(decode).transpose()
    }

    /// Re-read a participation inside the transaction that locked its event
    pub async fn find_by_id_in(&self, conn: &mut PgConnection, id: i64) -> Result<Option<Participation>> {
        let row = sqlx::query_as::<_, ParticipationRow>(&format!(
            "SELECT {PARTICIPATION_COLUMNS} FROM participations WHERE id = $1 FOR UPDATE"
        ))
        .bind(id)
        .fetch_optional(conn)
        .await?;

        row.map(decode).transpose()
    }

    /// Most recent participation of `user_id` in `event_id`, whatever its status
    pub async fn find_latest_for_pair(
        &self,
        conn: &mut PgConnection,
        event_id: i64,
        user_id: i64,
    ) -> Result<Option<Participation>> {
        let row = sqlx::query_as::<_, ParticipationRow>(&format!(
            r#"
            SELECT {PARTICIPATION_COLUMNS} FROM participations
            WHERE event_id = $1 AND user_id = $2
            ORDER BY created_at DESC, id DESC
            LIMIT 1
            "#
        ))
        .bind(event_id)
        .bind(user_id)
        .fetch_optional(conn)
        .await?;

        row.map(decode).transpose()
    }

    /// Pending, invited or approved participation for the pair, if any
    pub async fn find_active_for_pair(
        &self,
        conn: &mut PgConnection,
        event_id: i64,
        user_id: i64,
    ) -> Result<Option<Participation>> {
        let row = sqlx::query_as::<_, ParticipationRow>(&format!(
            r#"
            SELECT {PARTICIPATION_COLUMNS} FROM participations
            WHERE event_id = $1 AND user_id = $2 AND status IN ('pending', 'invited', 'approved')
            ORDER BY created_at DESC, id DESC
            LIMIT 1
            "#
        ))
        .bind(event_id)
        .bind(user_id)
        .fetch_optional(conn)
        .await?;

        row.map(decode).transpose()
    }

    /// Record an answer: set the status and stamp `responded_at`
    pub async fn update_status(
        &self,
        conn: &mut PgConnection,
        id: i64,
        status: ParticipationStatus,
    ) -> Result<Participation> {
        let now = Utc::now();
        let row = sqlx::query_as::<_, ParticipationRow>(&format!(
            r#"
            UPDATE participations
            SET status = $2, responded_at = $3, updated_at = $3
            WHERE id = $1
            RETURNING {PARTICIPATION_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(status.as_str())
        .bind(now)
        .fetch_optional(conn)
        .await?
        .ok_or_else(|| EventHubError::not_found("Participation", id))?;

        decode(row)
    }

    /// Participations of an event in the given status, oldest first
    pub async fn list_by_event(&self, event_id: i64, status: ParticipationStatus) -> Result<Vec<Participation>> {
        let rows = sqlx::query_as::<_, ParticipationRow>(&format!(
            r#"
            SELECT {PARTICIPATION_COLUMNS} FROM participations
            WHERE event_id = $1 AND status = $2
            ORDER BY created_at ASC, id ASC
            "#
        ))
        .bind(event_id)
        .bind(status.as_str())
        .fetch_all(&self.pool)
        .await?;

        decode_all(rows)
    }

    /// Recipients of a reminder batch, in insertion order
    pub async fn list_reminder_targets(
        &self,
        conn: &mut PgConnection,
        event_id: i64,
        target: ReminderTarget,
    ) -> Result<Vec<Participation>> {
        let status = match target {
            ReminderTarget::PendingInvitees => ParticipationStatus::Invited,
            ReminderTarget::ApprovedAttendees => ParticipationStatus::Approved,
        };

        let rows = sqlx::query_as::<_, ParticipationRow>(&format!(
            r#"
            SELECT {PARTICIPATION_COLUMNS} FROM participations
            WHERE event_id = $1 AND status = $2
            ORDER BY id ASC
            "#
        ))
        .bind(event_id)
        .bind(status.as_str())
        .fetch_all(conn)
        .await?;

        decode_all(rows)
    }

    /// Participations of a user, newest first, optionally narrowed to a status
    pub async fn list_by_user(&self, user_id: i64, status: Option<ParticipationStatus>) -> Result<Vec<Participation>> {
        let rows = sqlx::query_as::<_, ParticipationRow>(&format!(
            r#"
            SELECT {PARTICIPATION_COLUMNS} FROM participations
            WHERE user_id = $1 AND ($2::TEXT IS NULL OR status = $2)
            ORDER BY created_at DESC, id DESC
            "#
        ))
        .bind(user_id)
        .bind(status.map(|s| s.as_str()))
        .fetch_all(&self.pool)
        .await?;

        decode_all(rows)
    }

    /// Invitations addressed to a user, newest first
    pub async fn list_invitations_for_user(&self, user_id: i64) -> Result<Vec<Participation>> {
        let rows = sqlx::query_as::<_, ParticipationRow>(&format!(
            r#"
            SELECT {PARTICIPATION_COLUMNS} FROM participations
            WHERE user_id = $1 AND kind = 'invitation'
            ORDER BY created_at DESC, id DESC
            "#
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        decode_all(rows)
    }

    /// Whether the user attends or is invited to the event
    pub async fn is_involved(&self, event_id: i64, user_id: i64) -> Result<bool> {
        let exists: (bool,) = sqlx::query_as(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM participations
                WHERE event_id = $1 AND user_id = $2 AND status IN ('invited', 'approved')
            )
            "#
        )
        .bind(event_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists.0)
    }

    /// Count participations of an event in a status
    pub async fn count_by_event(&self, event_id: i64, status: ParticipationStatus) -> Result<i64> {
        let count: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM participations WHERE event_id = $1 AND status = $2"
        )
        .bind(event_id)
        .bind(status.as_str())
        .fetch_one(&self.pool)
        .await?;

        Ok(count.0)
    }
}
