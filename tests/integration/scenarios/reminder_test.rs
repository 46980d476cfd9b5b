//! Reminder scenarios

use assert_matches::assert_matches;
use serial_test::serial;
use EventHub::database::DatabaseService;
use EventHub::models::{
    EventStatus, NewNotification, NotificationType, ReminderTarget, RequestAction, UpdateEventRequest,
};
use EventHub::EventHubError;

use crate::fixtures::EVENING_SOCIAL;
use crate::integration::{fixture_event, setup_integration_test};

#[tokio::test]
#[serial]
async fn test_reminders_reach_each_matching_participant_once() {
    let Some(ctx) = setup_integration_test().await else { return };
    let (organizer, _) = ctx.create_user().await;
    let (alice, _) = ctx.create_user().await;
    let (bob, _) = ctx.create_user().await;
    let (carol, _) = ctx.create_user().await;
    let event = fixture_event(&ctx, &organizer, EVENING_SOCIAL, 10).await;
    let participation = &ctx.services().participation_service;

    participation.invite(&organizer, event.id, alice.id, None).await.unwrap();
    participation.invite(&organizer, event.id, bob.id, None).await.unwrap();
    let request = participation.submit_join_request(&carol, event.id, None).await.unwrap();
    participation
        .resolve_join_request(&organizer, event.id, request.participation.id, RequestAction::Approve)
        .await
        .unwrap();

    let invited = participation.send_reminders(&organizer, event.id, ReminderTarget::PendingInvitees).await.unwrap();
    assert_eq!(invited, 2);
    assert_eq!(ctx.database.count_notifications(alice.id, "invitationReminder").await.unwrap(), 1);
    assert_eq!(ctx.database.count_notifications(bob.id, "invitationReminder").await.unwrap(), 1);
    assert_eq!(ctx.database.count_notifications(carol.id, "invitationReminder").await.unwrap(), 0);

    let attendees = participation.send_reminders(&organizer, event.id, ReminderTarget::ApprovedAttendees).await.unwrap();
    assert_eq!(attendees, 1);
    assert_eq!(ctx.database.count_notifications(carol.id, "eventReminder").await.unwrap(), 1);
}

#[tokio::test]
#[serial]
async fn test_reminders_with_no_recipients_send_nothing() {
    let Some(ctx) = setup_integration_test().await else { return };
    let (organizer, _) = ctx.create_user().await;
    let event = fixture_event(&ctx, &organizer, EVENING_SOCIAL, 10).await;

    let sent = ctx.services()
        .participation_service
        .send_reminders(&organizer, event.id, ReminderTarget::ApprovedAttendees)
        .await
        .unwrap();
    assert_eq!(sent, 0);
    assert_eq!(ctx.database.count_records("notifications").await.unwrap(), 0);
}

#[tokio::test]
#[serial]
async fn test_reminders_are_all_or_nothing() {
    let Some(ctx) = setup_integration_test().await else { return };
    let (organizer, _) = ctx.create_user().await;
    let (alice, _) = ctx.create_user().await;
    let (bob, _) = ctx.create_user().await;
    let event = fixture_event(&ctx, &organizer, EVENING_SOCIAL, 10).await;
    let participation = &ctx.services().participation_service;

    participation.invite(&organizer, event.id, alice.id, None).await.unwrap();
    participation.invite(&organizer, event.id, bob.id, None).await.unwrap();
    assert_eq!(ctx.database.count_records("notifications").await.unwrap(), 2);

    ctx.database.fail_notifications_for(bob.id).await.unwrap();
    let result = participation.send_reminders(&organizer, event.id, ReminderTarget::PendingInvitees).await;
    ctx.database.clear_notification_failures().await.unwrap();

    assert_matches!(result, Err(EventHubError::Database(_)));
    assert_eq!(ctx.database.count_records("notifications").await.unwrap(), 2);
    assert_eq!(ctx.database.count_notifications(alice.id, "invitationReminder").await.unwrap(), 0);

    let sent = participation.send_reminders(&organizer, event.id, ReminderTarget::PendingInvitees).await.unwrap();
    assert_eq!(sent, 2);
    assert_eq!(ctx.database.count_records("notifications").await.unwrap(), 4);
}

fn reminder_batch(user_id: i64, size: usize) -> Vec<NewNotification> {
    (0..size)
        .map(|i| NewNotification {
            user_id,
            kind: NotificationType::EventReminder,
            message: format!("Reminder #{}", i),
            related_id: None,
            data: serde_json::json!({}),
        })
        .collect()
}

#[tokio::test]
#[serial]
async fn test_large_reminder_batch_spans_several_statements() {
    let Some(ctx) = setup_integration_test().await else { return };
    let (alice, _) = ctx.create_user().await;
    let (bob, _) = ctx.create_user().await;
    let db = DatabaseService::new(ctx.database.pool.clone());

    let batch = reminder_batch(alice.id, 25_000);
    let mut tx = ctx.database.pool.begin().await.unwrap();
    let inserted = db.notifications.insert_many(&mut tx, &batch).await.unwrap();
    tx.commit().await.unwrap();
    assert_eq!(inserted, 25_000);
    assert_eq!(ctx.database.count_notifications(alice.id, "eventReminder").await.unwrap(), 25_000);

    // a failure in the last statement takes the earlier ones with it
    let mut batch = reminder_batch(alice.id, 25_000);
    batch.extend(reminder_batch(bob.id, 1));
    ctx.database.fail_notifications_for(bob.id).await.unwrap();
    let mut tx = ctx.database.pool.begin().await.unwrap();
    let result = db.notifications.insert_many(&mut tx, &batch).await;
    tx.rollback().await.unwrap();
    ctx.database.clear_notification_failures().await.unwrap();

    assert!(result.is_err());
    assert_eq!(ctx.database.count_records("notifications").await.unwrap(), 25_000);
}

#[tokio::test]
#[serial]
async fn test_reminders_require_organizer_and_open_event() {
    let Some(ctx) = setup_integration_test().await else { return };
    let (organizer, _) = ctx.create_user().await;
    let (alice, _) = ctx.create_user().await;
    let event = fixture_event(&ctx, &organizer, EVENING_SOCIAL, 10).await;
    let participation = &ctx.services().participation_service;

    assert_matches!(
        participation.send_reminders(&alice, event.id, ReminderTarget::PendingInvitees).await,
        Err(EventHubError::Forbidden(_))
    );

    ctx.services()
        .event_service
        .update(&organizer, event.id, UpdateEventRequest { status: Some(EventStatus::Cancelled), ..Default::default() })
        .await
        .unwrap();
    assert_matches!(
        participation.send_reminders(&organizer, event.id, ReminderTarget::PendingInvitees).await,
        Err(EventHubError::InvalidState(_))
    );
}
