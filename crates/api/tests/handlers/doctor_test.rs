use axum::http::{header::AUTHORIZATION, StatusCode};
use medsync_core::models::{
    appointment::AppointmentListResponse,
    auth::{LoginResponse, UserRole},
    directory::Doctor,
};
use pretty_assertions::assert_eq;
use serde_json::json;
use uuid::Uuid;

use crate::test_utils::{booking_request, days_from_today, TestContext};

#[tokio::test]
async fn hospital_registers_doctor_who_can_log_in_by_phone() {
    let ctx = TestContext::new();
    let (hospital, _) = ctx.seed_doctor().await;
    let server = ctx.server();

    let response = server
        .post("/api/doctors")
        .add_header(AUTHORIZATION, ctx.bearer(hospital.id, UserRole::Hospital))
        .json(&json!({
            "name": "Dr. Iyer",
            "email": "iyer@citygeneral.test",
            "phone": "5558880000",
            "password": "stethoscope",
            "specialization": "Dermatology"
        }))
        .await;
    response.assert_status(StatusCode::CREATED);
    let doctor: Doctor = response.json();
    assert_eq!(doctor.hospital_id, hospital.id);

    let login: LoginResponse = server
        .post("/api/doctors/login")
        .json(&json!({ "identifier": "5558880000", "secret": "stethoscope" }))
        .await
        .json();
    assert_eq!(login.user_id, doctor.id);
    assert_eq!(login.role, UserRole::Doctor);
}

#[tokio::test]
async fn registering_doctor_requires_hospital_role() {
    let ctx = TestContext::new();
    let server = ctx.server();
    let body = json!({
        "name": "Dr. Iyer",
        "email": "iyer@citygeneral.test",
        "phone": "5558880000",
        "password": "stethoscope"
    });

    server
        .post("/api/doctors")
        .json(&body)
        .await
        .assert_status(StatusCode::UNAUTHORIZED);

    server
        .post("/api/doctors")
        .add_header(AUTHORIZATION, ctx.bearer(Uuid::new_v4(), UserRole::Patient))
        .json(&body)
        .await
        .assert_status(StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn taken_doctor_contact_conflicts() {
    let ctx = TestContext::new();
    let (hospital, _) = ctx.seed_doctor().await;

    ctx.server()
        .post("/api/doctors")
        .add_header(AUTHORIZATION, ctx.bearer(hospital.id, UserRole::Hospital))
        .json(&json!({
            "name": "Dr. Copy",
            "email": "new@citygeneral.test",
            "phone": "5559990000",
            "password": "pw"
        }))
        .await
        .assert_status(StatusCode::CONFLICT);
}

#[tokio::test]
async fn dashboard_lists_upcoming_appointments_including_cancelled() {
    let ctx = TestContext::new();
    let (_, doctor) = ctx.seed_doctor().await;

    let first = ctx
        .lifecycle()
        .book(booking_request(doctor.id, days_from_today(5), "09:00 AM"))
        .await
        .unwrap();
    let second = ctx
        .lifecycle()
        .book(booking_request(doctor.id, days_from_today(2), "09:00 AM"))
        .await
        .unwrap();
    ctx.lifecycle()
        .book(booking_request(doctor.id, days_from_today(-3), "09:00 AM"))
        .await
        .unwrap();

    let patient_id = ctx.store.appointment(first.appointment_id).unwrap().patient_id;
    ctx.lifecycle()
        .cancel(first.appointment_id, patient_id)
        .await
        .unwrap();

    let list: AppointmentListResponse = ctx
        .server()
        .get("/api/doctors/me/appointments")
        .add_header(AUTHORIZATION, ctx.bearer(doctor.id, UserRole::Doctor))
        .await
        .json();

    let ids: Vec<_> = list.appointments.iter().map(|a| a.id).collect();
    assert_eq!(ids, vec![second.appointment_id, first.appointment_id]);
}
