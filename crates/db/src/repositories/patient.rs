use crate::models::{DbPatient, DbPatientProfile, NewPatient};
use chrono::Utc;
use eyre::Result;
use sqlx::PgExecutor;
use uuid::Uuid;

const PROFILE_COLUMNS: &str = "id, patient_id, profile_name, date_of_birth, aadhar_no, age, \
     gender, medical_history, created_at";

/// Finds a patient whose phone OR email matches. When the two fields belong
/// to different patients, the oldest account wins.
pub async fn find_patient_by_contact<'e, E: PgExecutor<'e>>(
    executor: E,
    phone: &str,
    email: &str,
) -> Result<Option<DbPatient>> {
    let patient = sqlx::query_as::<_, DbPatient>(
        r#"
        SELECT id, name, phone, email, password_hash, created_at
        FROM patients
        WHERE phone = $1 OR email = $2
        ORDER BY created_at ASC
        LIMIT 1
        "#,
    )
    .bind(phone)
    .bind(email)
    .fetch_optional(executor)
    .await?;

    Ok(patient)
}

pub async fn insert_patient<'e, E: PgExecutor<'e>>(
    executor: E,
    patient: &NewPatient,
) -> Result<DbPatient> {
    let id = Uuid::new_v4();
    let now = Utc::now();

    let row = sqlx::query_as::<_, DbPatient>(
        r#"
        INSERT INTO patients (id, name, phone, email, password_hash, created_at)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING id, name, phone, email, password_hash, created_at
        "#,
    )
    .bind(id)
    .bind(&patient.name)
    .bind(&patient.phone)
    .bind(&patient.email)
    .bind(&patient.password_hash)
    .bind(now)
    .fetch_one(executor)
    .await?;

    Ok(row)
}

pub async fn insert_profile<'e, E: PgExecutor<'e>>(
    executor: E,
    patient_id: Uuid,
    patient: &NewPatient,
) -> Result<DbPatientProfile> {
    let id = Uuid::new_v4();
    let now = Utc::now();
    let profile = &patient.profile;

    let row = sqlx::query_as::<_, DbPatientProfile>(&format!(
        r#"
        INSERT INTO patient_profiles
            (id, patient_id, profile_name, date_of_birth, aadhar_no, age, gender, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING {PROFILE_COLUMNS}
        "#
    ))
    .bind(id)
    .bind(patient_id)
    .bind(&profile.profile_name)
    .bind(profile.date_of_birth)
    .bind(&profile.aadhar_no)
    .bind(profile.age)
    .bind(&profile.gender)
    .bind(now)
    .fetch_one(executor)
    .await?;

    Ok(row)
}

/// The patient's first profile, which is the one created with the account.
pub async fn find_primary_profile<'e, E: PgExecutor<'e>>(
    executor: E,
    patient_id: Uuid,
) -> Result<Option<DbPatientProfile>> {
    let row = sqlx::query_as::<_, DbPatientProfile>(&format!(
        r#"
        SELECT {PROFILE_COLUMNS}
        FROM patient_profiles
        WHERE patient_id = $1
        ORDER BY created_at ASC
        LIMIT 1
        "#
    ))
    .bind(patient_id)
    .fetch_optional(executor)
    .await?;

    Ok(row)
}

pub async fn update_medical_history<'e, E: PgExecutor<'e>>(
    executor: E,
    patient_id: Uuid,
    medical_history: Option<&str>,
) -> Result<Option<DbPatientProfile>> {
    let row = sqlx::query_as::<_, DbPatientProfile>(&format!(
        r#"
        UPDATE patient_profiles
        SET medical_history = $2
        WHERE id = (
            SELECT id FROM patient_profiles
            WHERE patient_id = $1
            ORDER BY created_at ASC
            LIMIT 1
        )
        RETURNING {PROFILE_COLUMNS}
        "#
    ))
    .bind(patient_id)
    .bind(medical_history)
    .fetch_optional(executor)
    .await?;

    Ok(row)
}
