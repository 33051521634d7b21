use axum::http::{header::AUTHORIZATION, StatusCode};
use medsync_core::models::{
    appointment::AppointmentStatus,
    auth::{LoginResponse, UserRole},
    directory::{PatientDashboardResponse, PatientProfile, RegisterResponse},
};
use pretty_assertions::assert_eq;
use serde_json::json;
use uuid::Uuid;

use crate::test_utils::{booking_request, days_from_today, TestContext};

#[tokio::test]
async fn register_then_login_by_email() {
    let ctx = TestContext::new();
    let server = ctx.server();

    let response = server
        .post("/api/patients")
        .json(&json!({
            "name": "Kiran Das",
            "phone": "5557776666",
            "email": "kiran@b.com",
            "password": "hunter2",
            "age": 34,
            "gender": "F"
        }))
        .await;
    response.assert_status(StatusCode::CREATED);
    let registered: RegisterResponse = response.json();

    let profiles = ctx.store.profiles_for(registered.id);
    assert_eq!(profiles[0].profile_name, "Kiran Das's Profile");
    assert_eq!(profiles[0].age, Some(34));

    let login: LoginResponse = server
        .post("/api/patients/login")
        .json(&json!({ "identifier": "kiran@b.com", "secret": "hunter2" }))
        .await
        .json();
    assert_eq!(login.user_id, registered.id);
    assert_eq!(login.role, UserRole::Patient);
}

#[tokio::test]
async fn registering_a_known_contact_conflicts() {
    let ctx = TestContext::new();
    let server = ctx.server();
    let body = json!({
        "name": "Kiran Das",
        "phone": "5557776666",
        "email": "kiran@b.com",
        "password": "hunter2"
    });

    server.post("/api/patients").json(&body).await.assert_status(StatusCode::CREATED);
    server
        .post("/api/patients")
        .json(&body)
        .await
        .assert_status(StatusCode::CONFLICT);
    assert_eq!(ctx.store.patient_count(), 1);
}

#[tokio::test]
async fn booked_patient_logs_in_with_date_of_birth() {
    let ctx = TestContext::new();
    let (_, doctor) = ctx.seed_doctor().await;
    ctx.lifecycle()
        .book(booking_request(doctor.id, days_from_today(3), "02:00 PM"))
        .await
        .unwrap();

    let server = ctx.server();
    server
        .post("/api/patients/login")
        .json(&json!({ "identifier": "5551234567", "secret": "1990-01-01" }))
        .await
        .assert_status_ok();
    server
        .post("/api/patients/login")
        .json(&json!({ "identifier": "5551234567", "secret": "1990-01-02" }))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn dashboard_hides_cancelled_appointments() {
    let ctx = TestContext::new();
    let (_, doctor) = ctx.seed_doctor().await;

    let kept = ctx
        .lifecycle()
        .book(booking_request(doctor.id, days_from_today(3), "02:00 PM"))
        .await
        .unwrap();
    let dropped = ctx
        .lifecycle()
        .book(booking_request(doctor.id, days_from_today(4), "02:00 PM"))
        .await
        .unwrap();
    let patient_id = ctx.store.appointment(kept.appointment_id).unwrap().patient_id;
    ctx.lifecycle()
        .cancel(dropped.appointment_id, patient_id)
        .await
        .unwrap();

    let list: PatientDashboardResponse = ctx
        .server()
        .get("/api/patients/me/appointments")
        .add_header(AUTHORIZATION, ctx.bearer(patient_id, UserRole::Patient))
        .await
        .json();

    assert_eq!(list.appointments.len(), 1);
    assert_eq!(list.appointments[0].id, kept.appointment_id);
    assert_eq!(list.appointments[0].status, AppointmentStatus::Booked);
}

#[tokio::test]
async fn medical_history_is_saved_and_shown_on_the_dashboard() {
    let ctx = TestContext::new();
    let (_, doctor) = ctx.seed_doctor().await;
    let booked = ctx
        .lifecycle()
        .book(booking_request(doctor.id, days_from_today(3), "02:00 PM"))
        .await
        .unwrap();
    let patient_id = ctx.store.appointment(booked.appointment_id).unwrap().patient_id;
    let server = ctx.server();
    let auth = ctx.bearer(patient_id, UserRole::Patient);

    let before: PatientDashboardResponse = server
        .get("/api/patients/me/appointments")
        .add_header(AUTHORIZATION, auth.clone())
        .await
        .json();
    let profile = before.profile.unwrap();
    assert_eq!(profile.profile_name, "Asha Rao's Profile");
    assert_eq!(profile.medical_history, None);

    let updated: PatientProfile = server
        .post("/api/patients/me/medical-history")
        .add_header(AUTHORIZATION, auth.clone())
        .json(&json!({ "medical_history": "  Asthma since 2010. Penicillin allergy. " }))
        .await
        .json();
    assert_eq!(updated.id, profile.id);
    assert_eq!(
        updated.medical_history.as_deref(),
        Some("Asthma since 2010. Penicillin allergy.")
    );

    let after: PatientDashboardResponse = server
        .get("/api/patients/me/appointments")
        .add_header(AUTHORIZATION, auth.clone())
        .await
        .json();
    assert_eq!(after.profile, Some(updated));
    assert_eq!(after.appointments.len(), 1);

    let cleared: PatientProfile = server
        .post("/api/patients/me/medical-history")
        .add_header(AUTHORIZATION, auth)
        .json(&json!({ "medical_history": "" }))
        .await
        .json();
    assert_eq!(cleared.medical_history, None);
}

#[tokio::test]
async fn medical_history_is_patient_only() {
    let ctx = TestContext::new();
    let (_, doctor) = ctx.seed_doctor().await;
    let server = ctx.server();
    let body = json!({ "medical_history": "Diabetic" });

    server
        .post("/api/patients/me/medical-history")
        .add_header(AUTHORIZATION, ctx.bearer(doctor.id, UserRole::Doctor))
        .json(&body)
        .await
        .assert_status(StatusCode::FORBIDDEN);

    server
        .post("/api/patients/me/medical-history")
        .add_header(AUTHORIZATION, ctx.bearer(Uuid::new_v4(), UserRole::Patient))
        .json(&body)
        .await
        .assert_status(StatusCode::NOT_FOUND);
}
