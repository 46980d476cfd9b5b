//! Event model

use serde::{Deserialize, Serialize};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use sqlx::FromRow;

use super::UnknownVariant;
use crate::utils::helpers::{clock_time, format_date_time};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Event {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub summary: Option<String>,
    pub start_date: NaiveDate,
    #[serde(with = "clock_time")]
    pub start_time: NaiveTime,
    pub end_date: NaiveDate,
    #[serde(with = "clock_time")]
    pub end_time: NaiveTime,
    pub location: Option<String>,
    #[serde(rename = "type")]
    pub event_type: Option<String>,
    pub image_url: Option<String>,
    pub max_attendees: i32,
    pub cur_attendees: i32,
    pub publicity: bool,
    pub organizer_id: i64,
    #[sqlx(try_from = "String")]
    pub status: EventStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Event {
    pub fn schedule(&self) -> Schedule {
        Schedule {
            start: Slot::new(self.start_date, self.start_time),
            end: Slot::new(self.end_date, self.end_time),
        }
    }

    pub fn has_capacity(&self) -> bool {
        self.cur_attendees < self.max_attendees
    }

    pub fn remaining_capacity(&self) -> i32 {
        (self.max_attendees - self.cur_attendees).max(0)
    }

    pub fn is_closed(&self) -> bool {
        self.status.is_closed()
    }
}

/// A calendar date paired with a clock time
///
/// Ordering compares the date first and the time only when dates are equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Slot {
    pub date: NaiveDate,
    pub time: NaiveTime,
}

impl Slot {
    pub fn new(date: NaiveDate, time: NaiveTime) -> Self {
        Self { date, time }
    }
}

impl std::fmt::Display for Slot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&format_date_time(self.date, self.time))
    }
}

/// Half-open `[start, end)` interval of an event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Schedule {
    pub start: Slot,
    pub end: Slot,
}

impl Schedule {
    pub fn overlaps(&self, other: &Schedule) -> bool {
        other.end > self.start && other.start < self.end
    }

    pub fn is_well_formed(&self) -> bool {
        self.end > self.start
    }

    pub fn format_range(&self) -> String {
        format!("{} - {}", self.start, self.end)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    Scheduled,
    Ongoing,
    Ended,
    Cancelled,
}

impl EventStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventStatus::Scheduled => "scheduled",
            EventStatus::Ongoing => "ongoing",
            EventStatus::Ended => "ended",
            EventStatus::Cancelled => "cancelled",
        }
    }

    /// Ended and cancelled events accept no further participation changes
    pub fn is_closed(&self) -> bool {
        matches!(self, EventStatus::Ended | EventStatus::Cancelled)
    }
}

impl std::fmt::Display for EventStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for EventStatus {
    type Error = UnknownVariant;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "scheduled" => Ok(EventStatus::Scheduled),
            "ongoing" => Ok(EventStatus::Ongoing),
            "ended" => Ok(EventStatus::Ended),
            "cancelled" => Ok(EventStatus::Cancelled),
            _ => Err(UnknownVariant::new("event status", value)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateEventRequest {
    pub title: String,
    pub description: Option<String>,
    pub summary: Option<String>,
    pub start_date: NaiveDate,
    #[serde(with = "clock_time")]
    pub start_time: NaiveTime,
    pub end_date: NaiveDate,
    #[serde(with = "clock_time")]
    pub end_time: NaiveTime,
    pub location: Option<String>,
    #[serde(rename = "type")]
    pub event_type: Option<String>,
    pub image_url: Option<String>,
    pub max_attendees: i32,
    #[serde(default = "default_publicity")]
    pub publicity: bool,
}

fn default_publicity() -> bool {
    true
}

impl CreateEventRequest {
    pub fn schedule(&self) -> Schedule {
        Schedule {
            start: Slot::new(self.start_date, self.start_time),
            end: Slot::new(self.end_date, self.end_time),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateEventRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub summary: Option<String>,
    pub start_date: Option<NaiveDate>,
    #[serde(default, with = "clock_time::option")]
    pub start_time: Option<NaiveTime>,
    pub end_date: Option<NaiveDate>,
    #[serde(default, with = "clock_time::option")]
    pub end_time: Option<NaiveTime>,
    pub location: Option<String>,
    #[serde(rename = "type")]
    pub event_type: Option<String>,
    pub image_url: Option<String>,
    pub max_attendees: Option<i32>,
    pub publicity: Option<bool>,
    pub status: Option<EventStatus>,
}

impl UpdateEventRequest {
    /// Schedule after applying this update on top of `event`
    pub fn merged_schedule(&self, event: &Event) -> Schedule {
        Schedule {
            start: Slot::new(
                self.start_date.unwrap_or(event.start_date),
                self.start_time.unwrap_or(event.start_time),
            ),
            end: Slot::new(
                self.end_date.unwrap_or(event.end_date),
                self.end_time.unwrap_or(event.end_time),
            ),
        }
    }
}

/// Filters for listing events
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventFilter {
    pub status: Option<EventStatus>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

/// Compact event view embedded in participation listings
#[derive(Debug, Clone, Serialize)]
pub struct EventSummary {
    pub id: i64,
    pub title: String,
    pub start_date: NaiveDate,
    #[serde(with = "clock_time")]
    pub start_time: NaiveTime,
    pub end_date: NaiveDate,
    #[serde(with = "clock_time")]
    pub end_time: NaiveTime,
    pub location: Option<String>,
    pub status: EventStatus,
}

impl From<&Event> for EventSummary {
    fn from(event: &Event) -> Self {
        Self {
            id: event.id,
            title: event.title.clone(),
            start_date: event.start_date,
            start_time: event.start_time,
            end_date: event.end_date,
            end_time: event.end_time,
            location: event.location.clone(),
            status: event.status,
        }
    }
}
