//! End-to-end tests of the booking sequence against faked collaborators.
//!
//! These exercise the ordering guarantees of the flow: no external call
//! before validation, one refresh-and-retry on a rejected credential,
//! no event creation for a busy slot, and notification failures never
//! failing the booking.


use bookline_common::BookingError;
use chrono::Duration;
use fixtures::{
    booking_request, next_valid_start, orchestrator, window_for, FakeCalendar, FakeNotifier,
    FakeTokens,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

#[tokio::test]
async fn test_missing_start_rejects_before_any_external_call() {
    let calendar = Arc::new(FakeCalendar::default());
    let tokens = Arc::new(FakeTokens::default());
    let notifier = Arc::new(FakeNotifier::default());
    let orch = orchestrator(calendar.clone(), tokens.clone(), Some(notifier.clone()));

    let mut request = booking_request(&next_valid_start());
    request.start = None;

    let err = orch.book(request).await.unwrap_err();
    assert_eq!(err, BookingError::MissingField("start time"));
    assert_eq!(tokens.acquire_calls.load(Ordering::SeqCst), 0);
    assert_eq!(calendar.busy_calls.load(Ordering::SeqCst), 0);
    assert_eq!(calendar.create_calls.load(Ordering::SeqCst), 0);
    assert_eq!(notifier.sms_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_missing_phone_rejects_before_any_external_call() {
    let calendar = Arc::new(FakeCalendar::default());
    let tokens = Arc::new(FakeTokens::default());
    let orch = orchestrator(calendar.clone(), tokens.clone(), None);

    let mut request = booking_request(&next_valid_start());
    request.phone = None;

    let err = orch.book(request).await.unwrap_err();
    assert_eq!(err, BookingError::MissingField("client phone number"));
    assert_eq!(tokens.acquire_calls.load(Ordering::SeqCst), 0);
    assert_eq!(calendar.busy_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_successful_booking_flow() {
    let calendar = Arc::new(FakeCalendar::default());
    let tokens = Arc::new(FakeTokens::default());
    let notifier = Arc::new(FakeNotifier::default());
    let orch = orchestrator(calendar.clone(), tokens.clone(), Some(notifier.clone()));

    let start = next_valid_start();
    let confirmation = orch.book(booking_request(&start)).await.unwrap();

    assert!(confirmation.success);
    assert_eq!(confirmation.client_phone, "+15141234567");
    assert_eq!(confirmation.client_name, "Jean Dupont");
    assert!(!confirmation.message.is_empty());
    assert_eq!(confirmation.event_id.as_deref(), Some("evt-123"));
    assert_eq!(confirmation.meet_link, "https://meet.google.com/abc-defg-hij");
    assert!(confirmation.sms_sent);

    // The confirmed window is exactly 30 minutes.
    let start_dt = chrono::DateTime::parse_from_rfc3339(&confirmation.start).unwrap();
    let end_dt = chrono::DateTime::parse_from_rfc3339(&confirmation.end).unwrap();
    assert_eq!(end_dt - start_dt, Duration::minutes(30));

    assert_eq!(calendar.busy_calls.load(Ordering::SeqCst), 1);
    assert_eq!(calendar.create_calls.load(Ordering::SeqCst), 1);

    // The event embeds the client identity and invites both parties.
    let created = calendar.created_events.lock().unwrap();
    assert_eq!(created.len(), 1);
    assert_eq!(created[0].summary, "Consultation avec Jean Dupont");
    assert!(created[0]
        .description
        .as_deref()
        .unwrap()
        .contains("+15141234567"));
    assert_eq!(
        created[0].attendees,
        vec!["owner@example.com", "jean.dupont@email.com"]
    );
    assert_eq!(created[0].time_zone, "America/Toronto");

    // Client SMS first, operator copy second.
    let sent = notifier.sent.lock().unwrap();
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[0].0, "+15141234567");
    assert!(sent[0].1.contains("https://meet.google.com/abc-defg-hij"));
    assert_eq!(sent[1].0, "+15550001111");
    assert!(sent[1].1.starts_with("[COPIE]"));
}

#[tokio::test]
async fn test_busy_slot_is_rejected_without_event_creation() {
    let calendar = Arc::new(FakeCalendar::default());
    let start = next_valid_start();
    let (window_start, window_end) = window_for(&start);
    calendar
        .busy
        .lock()
        .unwrap()
        .push((window_start, window_end));

    let tokens = Arc::new(FakeTokens::default());
    let orch = orchestrator(calendar.clone(), tokens.clone(), None);

    let err = orch.book(booking_request(&start)).await.unwrap_err();
    assert_eq!(err, BookingError::SlotTaken);
    assert_eq!(calendar.create_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_partially_overlapping_busy_interval_is_a_conflict() {
    let calendar = Arc::new(FakeCalendar::default());
    let start = next_valid_start();
    let (window_start, _) = window_for(&start);
    calendar
        .busy
        .lock()
        .unwrap()
        .push((window_start - Duration::minutes(15), window_start + Duration::minutes(5)));

    let orch = orchestrator(calendar.clone(), Arc::new(FakeTokens::default()), None);
    let err = orch.book(booking_request(&start)).await.unwrap_err();
    assert_eq!(err, BookingError::SlotTaken);
}

#[tokio::test]
async fn test_unauthorized_availability_check_refreshes_once_and_retries() {
    let calendar = Arc::new(FakeCalendar {
        unauthorized_responses: AtomicUsize::new(1),
        ..Default::default()
    });
    let tokens = Arc::new(FakeTokens::default());
    let orch = orchestrator(calendar.clone(), tokens.clone(), None);

    let confirmation = orch.book(booking_request(&next_valid_start())).await.unwrap();
    assert!(confirmation.success);

    // One lookup answered 401, exactly one retry after one refresh.
    assert_eq!(calendar.busy_calls.load(Ordering::SeqCst), 2);
    assert_eq!(tokens.invalidate_calls.load(Ordering::SeqCst), 1);
    assert_eq!(tokens.acquire_calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_persistent_unauthorized_gives_up_after_one_retry() {
    let calendar = Arc::new(FakeCalendar {
        unauthorized_responses: AtomicUsize::new(2),
        ..Default::default()
    });
    let tokens = Arc::new(FakeTokens::default());
    let orch = orchestrator(calendar.clone(), tokens.clone(), None);

    let err = orch
        .book(booking_request(&next_valid_start()))
        .await
        .unwrap_err();
    assert_eq!(err, BookingError::AvailabilityCheckFailed);
    assert_eq!(calendar.busy_calls.load(Ordering::SeqCst), 2);
    assert_eq!(calendar.create_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_credential_failure_stops_before_availability_check() {
    let calendar = Arc::new(FakeCalendar::default());
    let tokens = Arc::new(FakeTokens {
        fail: true,
        ..Default::default()
    });
    let orch = orchestrator(calendar.clone(), tokens.clone(), None);

    let err = orch
        .book(booking_request(&next_valid_start()))
        .await
        .unwrap_err();
    assert_eq!(err, BookingError::OAuthUnavailable);
    assert_eq!(calendar.busy_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_event_creation_failure_is_surfaced_and_skips_sms() {
    let calendar = Arc::new(FakeCalendar {
        fail_create: true,
        ..Default::default()
    });
    let notifier = Arc::new(FakeNotifier::default());
    let orch = orchestrator(
        calendar.clone(),
        Arc::new(FakeTokens::default()),
        Some(notifier.clone()),
    );

    let err = orch
        .book(booking_request(&next_valid_start()))
        .await
        .unwrap_err();
    assert_eq!(err, BookingError::EventCreationFailed);
    assert_eq!(notifier.sms_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_sms_failure_never_fails_the_booking() {
    let calendar = Arc::new(FakeCalendar::default());
    let notifier = Arc::new(FakeNotifier {
        fail: true,
        ..Default::default()
    });
    let orch = orchestrator(
        calendar.clone(),
        Arc::new(FakeTokens::default()),
        Some(notifier.clone()),
    );

    let confirmation = orch.book(booking_request(&next_valid_start())).await.unwrap();
    assert!(confirmation.success);
    assert!(!confirmation.sms_sent);
    assert_eq!(calendar.create_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_missing_notifier_reports_sms_not_sent() {
    let calendar = Arc::new(FakeCalendar::default());
    let orch = orchestrator(calendar, Arc::new(FakeTokens::default()), None);

    let confirmation = orch.book(booking_request(&next_valid_start())).await.unwrap();
    assert!(confirmation.success);
    assert!(!confirmation.sms_sent);
}

#[tokio::test]
async fn test_missing_meet_link_falls_back_to_sentinel() {
    let calendar = Arc::new(FakeCalendar {
        no_meet_link: true,
        ..Default::default()
    });
    let orch = orchestrator(calendar, Arc::new(FakeTokens::default()), None);

    let confirmation = orch.book(booking_request(&next_valid_start())).await.unwrap();
    assert_eq!(confirmation.meet_link, "Non disponible");
}
