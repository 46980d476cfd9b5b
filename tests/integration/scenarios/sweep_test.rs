//! Event status sweep scenarios

use serial_test::serial;
use EventHub::models::{EventStatus, Slot, UpdateEventRequest};
use EventHub::services::sweep::local_now;
use EventHub::services::SweepReport;

use crate::fixtures::{DAY, EVENING_SOCIAL, FUTURE_DAY, MORNING_JAM, PAST_DAY};
use crate::helpers::{date, time, TestContext};
use crate::integration::{fixture_event, setup_integration_test};

fn at(day: &str, clock: &str) -> Slot {
    Slot::new(date(day), time(clock))
}

async fn status_of(ctx: &TestContext, event_id: i64) -> EventStatus {
    ctx.services().db.require_event(event_id).await.unwrap().status
}

#[tokio::test]
#[serial]
async fn test_sweep_follows_the_clock() {
    let Some(ctx) = setup_integration_test().await else { return };
    let (organizer, _) = ctx.create_user().await;
    let jam = fixture_event(&ctx, &organizer, MORNING_JAM, 10).await;
    let social = fixture_event(&ctx, &organizer, EVENING_SOCIAL, 10).await;
    let sweep = &ctx.services().sweep_service;

    let report = sweep.run_once(at(DAY, "09:59")).await.unwrap();
    assert_eq!(report, SweepReport::default());
    assert_eq!(status_of(&ctx, jam.id).await, EventStatus::Scheduled);

    let report = sweep.run_once(at(DAY, "10:00")).await.unwrap();
    assert_eq!(report, SweepReport { started: 1, ended: 0, failed: 0 });
    assert_eq!(status_of(&ctx, jam.id).await, EventStatus::Ongoing);

    let report = sweep.run_once(at(DAY, "12:00")).await.unwrap();
    assert_eq!(report, SweepReport { started: 0, ended: 1, failed: 0 });
    assert_eq!(status_of(&ctx, jam.id).await, EventStatus::Ended);
    assert_eq!(status_of(&ctx, social.id).await, EventStatus::Scheduled);
}

#[tokio::test]
#[serial]
async fn test_sweep_is_idempotent() {
    let Some(ctx) = setup_integration_test().await else { return };
    let (organizer, _) = ctx.create_user().await;
    let past = ctx.create_event(&organizer, PAST_DAY, "10:00", "12:00", 10).await;
    let future = ctx.create_event(&organizer, FUTURE_DAY, "10:00", "12:00", 10).await;
    let sweep = &ctx.services().sweep_service;

    // a long-past event goes straight through to ended
    let first = sweep.run_once(local_now()).await.unwrap();
    assert_eq!(first, SweepReport { started: 1, ended: 1, failed: 0 });

    let second = sweep.run_once(local_now()).await.unwrap();
    assert_eq!(second, SweepReport::default());

    assert_eq!(status_of(&ctx, past.id).await, EventStatus::Ended);
    assert_eq!(status_of(&ctx, future.id).await, EventStatus::Scheduled);
}

#[tokio::test]
#[serial]
async fn test_sweep_leaves_cancelled_events_alone() {
    let Some(ctx) = setup_integration_test().await else { return };
    let (organizer, _) = ctx.create_user().await;
    let past = ctx.create_event(&organizer, PAST_DAY, "10:00", "12:00", 10).await;

    ctx.services()
        .event_service
        .update(&organizer, past.id, UpdateEventRequest { status: Some(EventStatus::Cancelled), ..Default::default() })
        .await
        .unwrap();

    let report = ctx.services().sweep_service.run_once(local_now()).await.unwrap();
    assert_eq!(report, SweepReport::default());
    assert_eq!(status_of(&ctx, past.id).await, EventStatus::Cancelled);
}
