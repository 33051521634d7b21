use std::sync::Arc;

use axum::http::{header::AUTHORIZATION, HeaderValue, StatusCode};
use axum_test::TestServer;
use medsync_api::build_router;
use medsync_db::{mock::repositories::MockDirectoryStore, UniqueViolation};
use medsync_notify::mock::RecordingGateway;
use medsync_core::models::{
    auth::UserRole,
    medical_record::{MedicalRecord, PatientRecordsResponse},
};
use pretty_assertions::assert_eq;
use serde_json::json;
use uuid::Uuid;

use crate::test_utils::{
    appointment_row, booking_request, build_state, days_from_today, TestContext,
};

#[tokio::test]
async fn doctor_records_one_entry_per_appointment() {
    let ctx = TestContext::new();
    let (_, doctor) = ctx.seed_doctor().await;
    let booked = ctx
        .lifecycle()
        .book(booking_request(doctor.id, days_from_today(1), "09:30 AM"))
        .await
        .unwrap();
    let server = ctx.server();
    let auth = ctx.bearer(doctor.id, UserRole::Doctor);

    let body = json!({
        "appointment_id": booked.appointment_id,
        "notes": "BP 150/95. Review in two weeks.",
        "prescription": "Amlodipine 5mg"
    });

    let response = server
        .post("/api/medical-records")
        .add_header(AUTHORIZATION, auth.clone())
        .json(&body)
        .await;
    response.assert_status(StatusCode::CREATED);
    let record: MedicalRecord = response.json();
    assert_eq!(record.appointment_id, booked.appointment_id);
    assert_eq!(record.doctor_id, doctor.id);

    server
        .post("/api/medical-records")
        .add_header(AUTHORIZATION, auth.clone())
        .json(&body)
        .await
        .assert_status(StatusCode::CONFLICT);

    let history: PatientRecordsResponse = server
        .get(&format!(
            "/api/appointments/{}/patient-records",
            booked.appointment_id
        ))
        .add_header(AUTHORIZATION, auth)
        .await
        .json();
    assert_eq!(history.patient_id, record.patient_id);
    assert_eq!(history.records.len(), 1);
}

#[tokio::test]
async fn other_doctors_appointment_is_not_found() {
    let ctx = TestContext::new();
    let (_, doctor) = ctx.seed_doctor().await;
    let booked = ctx
        .lifecycle()
        .book(booking_request(doctor.id, days_from_today(1), "09:30 AM"))
        .await
        .unwrap();
    let server = ctx.server();
    let stranger = ctx.bearer(Uuid::new_v4(), UserRole::Doctor);

    server
        .post("/api/medical-records")
        .add_header(AUTHORIZATION, stranger.clone())
        .json(&json!({
            "appointment_id": booked.appointment_id,
            "notes": "Not my patient"
        }))
        .await
        .assert_status(StatusCode::NOT_FOUND);

    server
        .get(&format!(
            "/api/appointments/{}/patient-records",
            booked.appointment_id
        ))
        .add_header(AUTHORIZATION, stranger)
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn empty_notes_are_rejected() {
    let ctx = TestContext::new();
    let (_, doctor) = ctx.seed_doctor().await;

    ctx.server()
        .post("/api/medical-records")
        .add_header(AUTHORIZATION, ctx.bearer(doctor.id, UserRole::Doctor))
        .json(&json!({ "appointment_id": Uuid::new_v4(), "notes": "  " }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn losing_a_concurrent_create_is_a_conflict() {
    let doctor_id = Uuid::new_v4();
    let row = appointment_row(doctor_id, Uuid::new_v4());
    let appointment_id = row.id;

    let mut store = MockDirectoryStore::new();
    store
        .expect_find_doctor_appointment()
        .returning(move |_, _| Ok(Some(row.clone())));
    // The other request has not committed yet when this one checks.
    store
        .expect_find_medical_record_for_appointment()
        .returning(|_| Ok(None));
    store
        .expect_create_medical_record()
        .times(1)
        .returning(|_| Err(UniqueViolation::new("medical_records_appointment_id_key").into()));

    let state = build_state(Arc::new(store), Arc::new(RecordingGateway::new()));
    let token = state.tokens.issue(doctor_id, UserRole::Doctor).unwrap();
    let server = TestServer::new(build_router(state)).unwrap();

    server
        .post("/api/medical-records")
        .add_header(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", token)).unwrap(),
        )
        .json(&json!({ "appointment_id": appointment_id, "notes": "Follow-up" }))
        .await
        .assert_status(StatusCode::CONFLICT);
}
