use crate::models::{DbDoctor, NewDoctor};
use chrono::Utc;
use eyre::Result;
use sqlx::PgExecutor;
use uuid::Uuid;

pub async fn create_doctor<'e, E: PgExecutor<'e>>(
    executor: E,
    doctor: &NewDoctor,
) -> Result<DbDoctor> {
    let id = Uuid::new_v4();
    let now = Utc::now();

    tracing::debug!(
        "Creating doctor: id={}, hospital_id={}",
        id, doctor.hospital_id
    );

    let doctor = sqlx::query_as::<_, DbDoctor>(
        r#"
        INSERT INTO doctors (id, name, email, phone, password_hash, specialization, hospital_id, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING id, name, email, phone, password_hash, specialization, hospital_id, created_at
        "#,
    )
    .bind(id)
    .bind(&doctor.name)
    .bind(&doctor.email)
    .bind(&doctor.phone)
    .bind(&doctor.password_hash)
    .bind(&doctor.specialization)
    .bind(doctor.hospital_id)
    .bind(now)
    .fetch_one(executor)
    .await?;

    Ok(doctor)
}

/// Doctors sign in with either their email or their phone number.
pub async fn find_doctor_by_identifier<'e, E: PgExecutor<'e>>(
    executor: E,
    identifier: &str,
) -> Result<Option<DbDoctor>> {
    let doctor = sqlx::query_as::<_, DbDoctor>(
        r#"
        SELECT id, name, email, phone, password_hash, specialization, hospital_id, created_at
        FROM doctors
        WHERE email = $1 OR phone = $1
        ORDER BY created_at ASC
        LIMIT 1
        "#,
    )
    .bind(identifier)
    .fetch_optional(executor)
    .await?;

    Ok(doctor)
}

pub async fn doctor_contact_taken<'e, E: PgExecutor<'e>>(
    executor: E,
    email: &str,
    phone: &str,
) -> Result<bool> {
    let taken = sqlx::query_scalar::<_, bool>(
        r#"
        SELECT EXISTS (
            SELECT 1 FROM doctors WHERE email = $1 OR phone = $2
        );
        "#,
    )
    .bind(email)
    .bind(phone)
    .fetch_one(executor)
    .await?;

    Ok(taken)
}

pub async fn list_doctors_for_hospital<'e, E: PgExecutor<'e>>(
    executor: E,
    hospital_id: Uuid,
) -> Result<Vec<DbDoctor>> {
    let doctors = sqlx::query_as::<_, DbDoctor>(
        r#"
        SELECT id, name, email, phone, password_hash, specialization, hospital_id, created_at
        FROM doctors
        WHERE hospital_id = $1
        ORDER BY name ASC
        "#,
    )
    .bind(hospital_id)
    .fetch_all(executor)
    .await?;

    Ok(doctors)
}
