use crate::models::{DbAppointment, NewAppointment};
use chrono::{NaiveDate, Utc};
use eyre::Result;
use medsync_core::models::appointment::AppointmentStatus;
use sqlx::PgExecutor;
use uuid::Uuid;

const APPOINTMENT_COLUMNS: &str = "id, patient_id, doctor_id, patient_name, patient_email, \
     patient_phone, appointment_date, appointment_time, reason_for_visit, status, created_at";

pub async fn insert_appointment<'e, E: PgExecutor<'e>>(
    executor: E,
    patient_id: Uuid,
    appointment: &NewAppointment,
) -> Result<DbAppointment> {
    let id = Uuid::new_v4();
    let now = Utc::now();

    let row = sqlx::query_as::<_, DbAppointment>(&format!(
        r#"
        INSERT INTO appointments
            (id, patient_id, doctor_id, patient_name, patient_email, patient_phone,
             appointment_date, appointment_time, reason_for_visit, status, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
        RETURNING {APPOINTMENT_COLUMNS}
        "#
    ))
    .bind(id)
    .bind(patient_id)
    .bind(appointment.doctor_id)
    .bind(&appointment.patient_name)
    .bind(&appointment.patient_email)
    .bind(&appointment.patient_phone)
    .bind(appointment.appointment_date)
    .bind(&appointment.appointment_time)
    .bind(&appointment.reason_for_visit)
    .bind(AppointmentStatus::Booked.as_str())
    .bind(now)
    .fetch_one(executor)
    .await?;

    Ok(row)
}

pub async fn find_patient_appointment<'e, E: PgExecutor<'e>>(
    executor: E,
    appointment_id: Uuid,
    patient_id: Uuid,
) -> Result<Option<DbAppointment>> {
    let row = sqlx::query_as::<_, DbAppointment>(&format!(
        "SELECT {APPOINTMENT_COLUMNS} FROM appointments WHERE id = $1 AND patient_id = $2"
    ))
    .bind(appointment_id)
    .bind(patient_id)
    .fetch_optional(executor)
    .await?;

    Ok(row)
}

pub async fn find_doctor_appointment<'e, E: PgExecutor<'e>>(
    executor: E,
    appointment_id: Uuid,
    doctor_id: Uuid,
) -> Result<Option<DbAppointment>> {
    let row = sqlx::query_as::<_, DbAppointment>(&format!(
        "SELECT {APPOINTMENT_COLUMNS} FROM appointments WHERE id = $1 AND doctor_id = $2"
    ))
    .bind(appointment_id)
    .bind(doctor_id)
    .fetch_optional(executor)
    .await?;

    Ok(row)
}

pub async fn set_status<'e, E: PgExecutor<'e>>(
    executor: E,
    appointment_id: Uuid,
    status: AppointmentStatus,
) -> Result<DbAppointment> {
    let row = sqlx::query_as::<_, DbAppointment>(&format!(
        r#"
        UPDATE appointments
        SET status = $2
        WHERE id = $1
        RETURNING {APPOINTMENT_COLUMNS}
        "#
    ))
    .bind(appointment_id)
    .bind(status.as_str())
    .fetch_one(executor)
    .await?;

    Ok(row)
}

pub async fn upcoming_for_patient<'e, E: PgExecutor<'e>>(
    executor: E,
    patient_id: Uuid,
    from: NaiveDate,
) -> Result<Vec<DbAppointment>> {
    let rows = sqlx::query_as::<_, DbAppointment>(&format!(
        r#"
        SELECT {APPOINTMENT_COLUMNS}
        FROM appointments
        WHERE patient_id = $1 AND appointment_date >= $2 AND status = $3
        "#
    ))
    .bind(patient_id)
    .bind(from)
    .bind(AppointmentStatus::Booked.as_str())
    .fetch_all(executor)
    .await?;

    Ok(rows)
}

pub async fn upcoming_for_doctor<'e, E: PgExecutor<'e>>(
    executor: E,
    doctor_id: Uuid,
    from: NaiveDate,
) -> Result<Vec<DbAppointment>> {
    let rows = sqlx::query_as::<_, DbAppointment>(&format!(
        r#"
        SELECT {APPOINTMENT_COLUMNS}
        FROM appointments
        WHERE doctor_id = $1 AND appointment_date >= $2
        "#
    ))
    .bind(doctor_id)
    .bind(from)
    .fetch_all(executor)
    .await?;

    Ok(rows)
}
