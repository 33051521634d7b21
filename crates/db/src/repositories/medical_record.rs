use crate::errors::classify;
use crate::models::{DbMedicalRecord, NewMedicalRecord};
use chrono::Utc;
use eyre::Result;
use sqlx::PgExecutor;
use uuid::Uuid;

pub async fn create_medical_record<'e, E: PgExecutor<'e>>(
    executor: E,
    record: &NewMedicalRecord,
) -> Result<DbMedicalRecord> {
    let id = Uuid::new_v4();
    let now = Utc::now();

    let row = sqlx::query_as::<_, DbMedicalRecord>(
        r#"
        INSERT INTO medical_records
            (id, record_date, notes, prescription, doctor_id, patient_id, appointment_id)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING id, record_date, notes, prescription, doctor_id, patient_id, appointment_id
        "#,
    )
    .bind(id)
    .bind(now)
    .bind(&record.notes)
    .bind(&record.prescription)
    .bind(record.doctor_id)
    .bind(record.patient_id)
    .bind(record.appointment_id)
    .fetch_one(executor)
    .await
    .map_err(classify)?;

    Ok(row)
}

pub async fn find_for_appointment<'e, E: PgExecutor<'e>>(
    executor: E,
    appointment_id: Uuid,
) -> Result<Option<DbMedicalRecord>> {
    let row = sqlx::query_as::<_, DbMedicalRecord>(
        r#"
        SELECT id, record_date, notes, prescription, doctor_id, patient_id, appointment_id
        FROM medical_records
        WHERE appointment_id = $1
        "#,
    )
    .bind(appointment_id)
    .fetch_optional(executor)
    .await?;

    Ok(row)
}

pub async fn list_for_patient<'e, E: PgExecutor<'e>>(
    executor: E,
    patient_id: Uuid,
) -> Result<Vec<DbMedicalRecord>> {
    let rows = sqlx::query_as::<_, DbMedicalRecord>(
        r#"
        SELECT id, record_date, notes, prescription, doctor_id, patient_id, appointment_id
        FROM medical_records
        WHERE patient_id = $1
        ORDER BY record_date DESC
        "#,
    )
    .bind(patient_id)
    .fetch_all(executor)
    .await?;

    Ok(rows)
}
