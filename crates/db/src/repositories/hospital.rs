use crate::models::{DbHospital, NewHospital};
use chrono::Utc;
use eyre::Result;
use sqlx::PgExecutor;
use uuid::Uuid;

pub async fn create_hospital<'e, E: PgExecutor<'e>>(
    executor: E,
    hospital: &NewHospital,
) -> Result<DbHospital> {
    let id = Uuid::new_v4();
    let now = Utc::now();

    let hospital = sqlx::query_as::<_, DbHospital>(
        r#"
        INSERT INTO hospitals (id, name, address, email, password_hash, created_at)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING id, name, address, email, password_hash, created_at
        "#,
    )
    .bind(id)
    .bind(&hospital.name)
    .bind(&hospital.address)
    .bind(&hospital.email)
    .bind(&hospital.password_hash)
    .bind(now)
    .fetch_one(executor)
    .await?;

    Ok(hospital)
}

pub async fn find_hospital_by_email<'e, E: PgExecutor<'e>>(
    executor: E,
    email: &str,
) -> Result<Option<DbHospital>> {
    let hospital = sqlx::query_as::<_, DbHospital>(
        r#"
        SELECT id, name, address, email, password_hash, created_at
        FROM hospitals
        WHERE email = $1
        "#,
    )
    .bind(email)
    .fetch_optional(executor)
    .await?;

    Ok(hospital)
}

pub async fn list_hospitals<'e, E: PgExecutor<'e>>(executor: E) -> Result<Vec<DbHospital>> {
    let hospitals = sqlx::query_as::<_, DbHospital>(
        r#"
        SELECT id, name, address, email, password_hash, created_at
        FROM hospitals
        ORDER BY name ASC
        "#,
    )
    .fetch_all(executor)
    .await?;

    Ok(hospitals)
}

pub async fn find_hospital_for_doctor<'e, E: PgExecutor<'e>>(
    executor: E,
    doctor_id: Uuid,
) -> Result<Option<DbHospital>> {
    let hospital = sqlx::query_as::<_, DbHospital>(
        r#"
        SELECT h.id, h.name, h.address, h.email, h.password_hash, h.created_at
        FROM hospitals h
        JOIN doctors d ON d.hospital_id = h.id
        WHERE d.id = $1
        "#,
    )
    .bind(doctor_id)
    .fetch_optional(executor)
    .await?;

    Ok(hospital)
}
