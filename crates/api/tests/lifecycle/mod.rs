use std::sync::Arc;

use chrono::{Duration, Utc};
use eyre::eyre;
use medsync_api::lifecycle::{AppointmentLifecycle, CANCEL_NOT_FOUND, DOB_REQUIRED};
use medsync_core::{
    errors::ClinicError,
    models::appointment::{appointment_instant, AppointmentStatus},
};
use medsync_db::mock::repositories::MockDirectoryStore;
use medsync_notify::{mock::RecordingGateway, EmailMessage};
use pretty_assertions::assert_eq;
use uuid::Uuid;

use crate::test_utils::{
    appointment_row, booking_request, build_state, days_from_today, TestContext,
};

fn mock_lifecycle(store: MockDirectoryStore, gateway: Arc<RecordingGateway>) -> AppointmentLifecycle {
    build_state(Arc::new(store), gateway).lifecycle.clone()
}

#[tokio::test]
async fn booking_new_patient_creates_account_appointment_and_reminder() {
    let ctx = TestContext::new();
    let (_, doctor) = ctx.seed_doctor().await;
    let date = days_from_today(3);

    let response = ctx
        .lifecycle()
        .book(booking_request(doctor.id, date, "02:00 PM"))
        .await
        .unwrap();

    assert!(response.success);
    assert!(response.new_user);
    assert_eq!(
        response.message,
        "Appointment booked successfully! A confirmation email has been sent."
    );

    assert_eq!(ctx.store.patient_count(), 1);
    let row = ctx.store.appointment(response.appointment_id).unwrap();
    assert_eq!(row.status, "Booked");
    assert_eq!(row.patient_name, "Asha Rao");
    assert_eq!(row.doctor_id, doctor.id);

    let profiles = ctx.store.profiles_for(row.patient_id);
    assert_eq!(profiles.len(), 1);
    assert_eq!(profiles[0].profile_name, "Asha Rao's Profile");

    let expected_fire = appointment_instant(date, "02:00 PM", chrono_tz::UTC).unwrap()
        - Duration::hours(24);
    let scheduler = ctx.lifecycle().scheduler();
    assert_eq!(scheduler.pending(), 1);
    assert_eq!(scheduler.fire_time(response.appointment_id), Some(expected_fire));

    ctx.gateway.wait_for(1).await;
    let sent = ctx.gateway.sent();
    assert_eq!(sent[0].to, "a@b.com");
    assert_eq!(sent[0].subject, "Appointment Confirmed at City General");
}

#[tokio::test]
async fn existing_contact_reuses_the_patient() {
    let ctx = TestContext::new();
    let (_, doctor) = ctx.seed_doctor().await;

    let first = ctx
        .lifecycle()
        .book(booking_request(doctor.id, days_from_today(3), "10:00 AM"))
        .await
        .unwrap();

    // Same phone, different email, and no date of birth this time.
    let mut again = booking_request(doctor.id, days_from_today(4), "11:00 AM");
    again.email = "other@b.com".to_string();
    again.dob = None;
    let second = ctx.lifecycle().book(again).await.unwrap();

    assert!(!second.new_user);
    assert_eq!(ctx.store.patient_count(), 1);
    assert_eq!(
        ctx.store.appointment(first.appointment_id).unwrap().patient_id,
        ctx.store.appointment(second.appointment_id).unwrap().patient_id
    );
}

#[tokio::test]
async fn returning_patient_date_of_birth_is_not_checked() {
    let ctx = TestContext::new();
    let (_, doctor) = ctx.seed_doctor().await;

    ctx.lifecycle()
        .book(booking_request(doctor.id, days_from_today(3), "10:00 AM"))
        .await
        .unwrap();

    let mut again = booking_request(doctor.id, days_from_today(5), "11:00 AM");
    again.dob = Some("01/01/1990".to_string());
    let second = ctx.lifecycle().book(again).await.unwrap();

    assert!(second.success);
    assert!(!second.new_user);
    assert_eq!(ctx.store.patient_count(), 1);
    assert_eq!(ctx.store.appointments().len(), 2);
}

#[tokio::test]
async fn new_contact_with_malformed_dob_writes_nothing() {
    let ctx = TestContext::new();
    let (_, doctor) = ctx.seed_doctor().await;

    let mut request = booking_request(doctor.id, days_from_today(3), "02:00 PM");
    request.dob = Some("01/01/1990".to_string());

    assert!(matches!(
        ctx.lifecycle().book(request).await,
        Err(ClinicError::Validation(_))
    ));
    assert_eq!(ctx.store.patient_count(), 0);
    assert!(ctx.store.appointments().is_empty());
    assert_eq!(ctx.lifecycle().scheduler().pending(), 0);
}

#[tokio::test]
async fn new_contact_without_dob_writes_nothing() {
    let ctx = TestContext::new();
    let (_, doctor) = ctx.seed_doctor().await;

    let mut request = booking_request(doctor.id, days_from_today(3), "02:00 PM");
    request.dob = None;

    match ctx.lifecycle().book(request).await {
        Err(ClinicError::Validation(msg)) => assert_eq!(msg, DOB_REQUIRED),
        other => panic!("expected validation error, got {:?}", other),
    }

    assert_eq!(ctx.store.patient_count(), 0);
    assert!(ctx.store.appointments().is_empty());
    assert_eq!(ctx.lifecycle().scheduler().pending(), 0);
    assert!(ctx.gateway.sent().is_empty());
}

#[tokio::test]
async fn appointment_less_than_a_day_away_gets_no_reminder() {
    let ctx = TestContext::new();
    let (_, doctor) = ctx.seed_doctor().await;

    let soon = Utc::now() + Duration::hours(23);
    let request = booking_request(
        doctor.id,
        soon.date_naive(),
        &soon.format("%I:%M %p").to_string(),
    );

    let response = ctx.lifecycle().book(request).await.unwrap();

    assert!(response.success);
    assert!(!ctx.lifecycle().scheduler().exists(response.appointment_id));
    assert_eq!(ctx.lifecycle().scheduler().pending(), 0);

    // The confirmation still goes out.
    ctx.gateway.wait_for(1).await;
}

#[tokio::test]
async fn failing_mail_does_not_fail_the_booking() {
    let store = Arc::new(medsync_db::mock::memory::MemoryDirectoryStore::new());
    let gateway = Arc::new(RecordingGateway::failing());
    let ctx = TestContext {
        state: build_state(store.clone(), gateway.clone()),
        store,
        gateway,
    };
    let (_, doctor) = ctx.seed_doctor().await;

    let response = ctx
        .lifecycle()
        .book(booking_request(doctor.id, days_from_today(3), "02:00 PM"))
        .await
        .unwrap();

    ctx.gateway.wait_for(1).await;
    assert!(response.success);
    assert_eq!(ctx.store.appointments().len(), 1);
    assert!(ctx.lifecycle().scheduler().exists(response.appointment_id));
}

#[tokio::test]
async fn cancel_by_owner_removes_the_reminder() {
    let ctx = TestContext::new();
    let (_, doctor) = ctx.seed_doctor().await;
    let booked = ctx
        .lifecycle()
        .book(booking_request(doctor.id, days_from_today(3), "02:00 PM"))
        .await
        .unwrap();
    let patient_id = ctx.store.appointment(booked.appointment_id).unwrap().patient_id;

    let response = ctx
        .lifecycle()
        .cancel(booked.appointment_id, patient_id)
        .await
        .unwrap();

    assert!(response.success);
    assert_eq!(response.status, AppointmentStatus::Cancelled);
    assert_eq!(
        ctx.store.appointment(booked.appointment_id).unwrap().status,
        "Cancelled"
    );
    assert!(!ctx.lifecycle().scheduler().exists(booked.appointment_id));
}

#[tokio::test]
async fn cancelling_twice_is_harmless() {
    let ctx = TestContext::new();
    let (_, doctor) = ctx.seed_doctor().await;
    let booked = ctx
        .lifecycle()
        .book(booking_request(doctor.id, days_from_today(3), "02:00 PM"))
        .await
        .unwrap();
    let patient_id = ctx.store.appointment(booked.appointment_id).unwrap().patient_id;

    ctx.lifecycle()
        .cancel(booked.appointment_id, patient_id)
        .await
        .unwrap();
    let second = ctx
        .lifecycle()
        .cancel(booked.appointment_id, patient_id)
        .await
        .unwrap();

    assert!(second.success);
    assert_eq!(second.status, AppointmentStatus::Cancelled);
    assert_eq!(ctx.lifecycle().scheduler().pending(), 0);
}

#[tokio::test]
async fn cancel_by_another_patient_is_not_found() {
    let ctx = TestContext::new();
    let (_, doctor) = ctx.seed_doctor().await;
    let booked = ctx
        .lifecycle()
        .book(booking_request(doctor.id, days_from_today(3), "02:00 PM"))
        .await
        .unwrap();

    match ctx.lifecycle().cancel(booked.appointment_id, Uuid::new_v4()).await {
        Err(ClinicError::NotFound(msg)) => assert_eq!(msg, CANCEL_NOT_FOUND),
        other => panic!("expected not found, got {:?}", other),
    }

    assert_eq!(
        ctx.store.appointment(booked.appointment_id).unwrap().status,
        "Booked"
    );
    assert!(ctx.lifecycle().scheduler().exists(booked.appointment_id));
}

#[tokio::test]
async fn persistence_failure_reports_and_skips_side_effects() {
    let mut store = MockDirectoryStore::new();
    store
        .expect_find_patient_by_contact()
        .returning(|_, _| Ok(None));
    store
        .expect_book_appointment()
        .times(1)
        .returning(|_| Err(eyre!("connection reset by peer")));

    let gateway = Arc::new(RecordingGateway::new());
    let lifecycle = mock_lifecycle(store, gateway.clone());

    let result = lifecycle
        .book(booking_request(Uuid::new_v4(), days_from_today(3), "02:00 PM"))
        .await;

    assert!(matches!(result, Err(ClinicError::Database(_))));
    assert_eq!(lifecycle.scheduler().pending(), 0);
    tokio::task::yield_now().await;
    assert!(gateway.sent().is_empty());
}

#[tokio::test]
async fn confirmation_falls_back_when_hospital_lookup_fails() {
    let doctor_id = Uuid::new_v4();
    let patient_id = Uuid::new_v4();

    let mut store = MockDirectoryStore::new();
    store
        .expect_find_patient_by_contact()
        .returning(|_, _| Ok(None));
    store
        .expect_book_appointment()
        .returning(move |_| Ok(appointment_row(doctor_id, patient_id)));
    store
        .expect_find_hospital_for_doctor()
        .returning(|_| Err(eyre!("statement timeout")));

    let gateway = Arc::new(RecordingGateway::new());
    let lifecycle = mock_lifecycle(store, gateway.clone());

    lifecycle
        .book(booking_request(doctor_id, days_from_today(3), "02:00 PM"))
        .await
        .unwrap();

    gateway.wait_for(1).await;
    let sent: Vec<EmailMessage> = gateway.sent();
    assert_eq!(sent[0].subject, "Appointment Confirmed");
}

#[tokio::test]
async fn failed_status_write_keeps_the_reminder() {
    let doctor_id = Uuid::new_v4();
    let patient_id = Uuid::new_v4();
    let row = appointment_row(doctor_id, patient_id);
    let appointment_id = row.id;

    let mut store = MockDirectoryStore::new();
    store
        .expect_find_patient_appointment()
        .returning(move |_, _| Ok(Some(row.clone())));
    store
        .expect_set_appointment_status()
        .returning(|_, _| Err(eyre!("deadlock detected")));

    let lifecycle = mock_lifecycle(store, Arc::new(RecordingGateway::new()));
    lifecycle
        .scheduler()
        .schedule(
            appointment_id,
            Utc::now() + Duration::hours(48),
            EmailMessage {
                to: "a@b.com".to_string(),
                subject: "Appointment Reminder".to_string(),
                html_body: String::new(),
            },
        )
        .unwrap();

    let result = lifecycle.cancel(appointment_id, patient_id).await;

    assert!(matches!(result, Err(ClinicError::Database(_))));
    assert!(lifecycle.scheduler().exists(appointment_id));
}
