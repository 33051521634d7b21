use axum::http::{header::AUTHORIZATION, HeaderValue, StatusCode};
use medsync_api::middleware::{auth::TokenKeys, error_handling::map_error};
use medsync_core::{errors::ClinicError, models::auth::UserRole};
use rstest::rstest;
use serde_json::Value;
use uuid::Uuid;

use crate::test_utils::TestContext;

#[rstest]
#[case(ClinicError::NotFound("missing".into()), StatusCode::NOT_FOUND)]
#[case(ClinicError::Validation("bad".into()), StatusCode::BAD_REQUEST)]
#[case(ClinicError::Authentication("who".into()), StatusCode::UNAUTHORIZED)]
#[case(ClinicError::Authorization("no".into()), StatusCode::FORBIDDEN)]
#[case(ClinicError::Conflict("dup".into()), StatusCode::CONFLICT)]
#[case(ClinicError::Database(eyre::eyre!("db down")), StatusCode::INTERNAL_SERVER_ERROR)]
fn errors_map_to_status_codes(#[case] error: ClinicError, #[case] expected: StatusCode) {
    assert_eq!(map_error(error).status(), expected);
}

#[test_log::test(tokio::test)]
async fn health_reports_ok() {
    let ctx = TestContext::new();
    let body: Value = ctx.server().get("/health").await.json();

    assert_eq!(body["status"], "ok");
    assert_eq!(body["pending_reminders"], 0);
}

#[tokio::test]
async fn protected_route_rejects_missing_and_foreign_tokens() {
    let ctx = TestContext::new();
    let server = ctx.server();

    server
        .get("/api/patients/me/appointments")
        .await
        .assert_status(StatusCode::UNAUTHORIZED);

    let foreign = TokenKeys::new(b"someone-else", 1)
        .issue(Uuid::new_v4(), UserRole::Patient)
        .unwrap();
    server
        .get("/api/patients/me/appointments")
        .add_header(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", foreign)).unwrap(),
        )
        .await
        .assert_status(StatusCode::UNAUTHORIZED);

    server
        .get("/api/patients/me/appointments")
        .add_header(AUTHORIZATION, HeaderValue::from_static("Basic dXNlcjpwYXNz"))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}
