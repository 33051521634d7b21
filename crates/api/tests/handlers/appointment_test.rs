use std::sync::Arc;

use axum::http::{header::AUTHORIZATION, StatusCode};
use axum_test::TestServer;
use eyre::eyre;
use medsync_api::build_router;
use medsync_core::models::{
    appointment::{AppointmentStatus, BookingResponse, CancelAppointmentResponse},
    auth::UserRole,
};
use medsync_db::mock::repositories::MockDirectoryStore;
use medsync_notify::mock::RecordingGateway;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::test_utils::{build_state, days_from_today, TestContext};

fn booking_body(doctor_id: Uuid, dob: Option<&str>) -> Value {
    json!({
        "firstName": "Asha",
        "lastName": "Rao",
        "phone": "5551234567",
        "email": "a@b.com",
        "dob": dob,
        "doctorId": doctor_id,
        "date": days_from_today(3),
        "time": "02:00 PM",
        "reason": "Follow-up"
    })
}

#[tokio::test]
async fn booking_returns_created_with_new_user_flag() {
    let ctx = TestContext::new();
    let (_, doctor) = ctx.seed_doctor().await;

    let response = ctx
        .server()
        .post("/api/appointments")
        .json(&booking_body(doctor.id, Some("1990-01-01")))
        .await;

    response.assert_status(StatusCode::CREATED);
    let booking: BookingResponse = response.json();
    assert!(booking.success);
    assert!(booking.new_user);
    assert!(ctx.lifecycle().scheduler().exists(booking.appointment_id));
}

#[tokio::test]
async fn missing_dob_for_new_patient_is_bad_request() {
    let ctx = TestContext::new();
    let (_, doctor) = ctx.seed_doctor().await;

    let response = ctx
        .server()
        .post("/api/appointments")
        .json(&booking_body(doctor.id, None))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["code"], "validation");
    assert_eq!(body["error"], "Date of Birth is required for new patients.");
    assert_eq!(ctx.store.patient_count(), 0);
}

#[tokio::test]
async fn persistence_failure_shows_generic_booking_message() {
    let mut store = MockDirectoryStore::new();
    store
        .expect_find_patient_by_contact()
        .returning(|_, _| Ok(None));
    store
        .expect_book_appointment()
        .returning(|_| Err(eyre!("insert or update violates foreign key constraint")));

    let state = build_state(Arc::new(store), Arc::new(RecordingGateway::new()));
    let server = TestServer::new(build_router(state)).unwrap();

    let response = server
        .post("/api/appointments")
        .json(&booking_body(Uuid::new_v4(), Some("1990-01-01")))
        .await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json();
    assert_eq!(body["code"], "persistence");
    assert_eq!(
        body["error"],
        "An error occurred while booking. Please check your details and try again."
    );
}

#[tokio::test]
async fn owner_cancels_over_http() {
    let ctx = TestContext::new();
    let (_, doctor) = ctx.seed_doctor().await;
    let server = ctx.server();

    let booking: BookingResponse = server
        .post("/api/appointments")
        .json(&booking_body(doctor.id, Some("1990-01-01")))
        .await
        .json();
    let patient_id = ctx.store.appointment(booking.appointment_id).unwrap().patient_id;

    let response = server
        .post(&format!("/api/appointments/{}/cancel", booking.appointment_id))
        .add_header(AUTHORIZATION, ctx.bearer(patient_id, UserRole::Patient))
        .await;

    response.assert_status_ok();
    let cancelled: CancelAppointmentResponse = response.json();
    assert_eq!(cancelled.status, AppointmentStatus::Cancelled);
    assert!(!ctx.lifecycle().scheduler().exists(booking.appointment_id));
}

#[tokio::test]
async fn cancelling_someone_elses_appointment_is_not_found() {
    let ctx = TestContext::new();
    let (_, doctor) = ctx.seed_doctor().await;
    let server = ctx.server();

    let booking: BookingResponse = server
        .post("/api/appointments")
        .json(&booking_body(doctor.id, Some("1990-01-01")))
        .await
        .json();

    let response = server
        .post(&format!("/api/appointments/{}/cancel", booking.appointment_id))
        .add_header(AUTHORIZATION, ctx.bearer(Uuid::new_v4(), UserRole::Patient))
        .await;

    response.assert_status(StatusCode::NOT_FOUND);
    assert_eq!(
        ctx.store.appointment(booking.appointment_id).unwrap().status,
        "Booked"
    );
}

#[tokio::test]
async fn doctors_cannot_cancel_for_patients() {
    let ctx = TestContext::new();
    let (_, doctor) = ctx.seed_doctor().await;

    ctx.server()
        .post(&format!("/api/appointments/{}/cancel", Uuid::new_v4()))
        .add_header(AUTHORIZATION, ctx.bearer(doctor.id, UserRole::Doctor))
        .await
        .assert_status(StatusCode::FORBIDDEN);
}
