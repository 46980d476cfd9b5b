//! Integration tests module
//!
//! This module contains all integration tests for EventHub, organized by
//! HTTP surface and workflow scenarios.

pub mod handlers;

use crate::helpers::TestContext;
use crate::fixtures::{FixtureSlot, DAY};
use EventHub::models::{Event, User};

/// Common setup function for integration tests
pub async fn setup_integration_test() -> Option<TestContext> {
    TestContext::new().await
}

/// Create a fixture event on the fixture day
pub async fn fixture_event(ctx: &TestContext, organizer: &User, slot: FixtureSlot, max_attendees: i32) -> Event {
    ctx.create_event(organizer, DAY, slot.start, slot.end, max_attendees).await
}
