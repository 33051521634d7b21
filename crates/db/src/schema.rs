use eyre::Result;
use sqlx::{Executor, Pool, Postgres};
use tracing::info;

pub async fn initialize_database(pool: &Pool<Postgres>) -> Result<()> {
    info!("Initializing database schema...");

    // Create hospitals table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS hospitals (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            name VARCHAR(150) NOT NULL UNIQUE,
            address VARCHAR(200) NULL,
            email VARCHAR(120) NOT NULL UNIQUE,
            password_hash VARCHAR(255) NOT NULL,
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW()
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create doctors table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS doctors (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            name VARCHAR(100) NOT NULL,
            email VARCHAR(100) NULL UNIQUE,
            phone VARCHAR(15) NULL UNIQUE,
            password_hash VARCHAR(255) NOT NULL,
            specialization VARCHAR(100) NULL,
            hospital_id UUID NOT NULL REFERENCES hospitals(id),
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW()
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create patients table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS patients (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            name VARCHAR(100) NOT NULL,
            phone VARCHAR(20) NOT NULL UNIQUE,
            email VARCHAR(120) NULL UNIQUE,
            password_hash VARCHAR(255) NOT NULL,
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW()
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create patient_profiles table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS patient_profiles (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            patient_id UUID NOT NULL REFERENCES patients(id),
            profile_name VARCHAR(100) NOT NULL,
            date_of_birth DATE NULL,
            aadhar_no VARCHAR(12) NULL UNIQUE,
            age INTEGER NULL,
            gender VARCHAR(10) NULL,
            medical_history TEXT NULL,
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW()
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create appointments table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS appointments (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            patient_id UUID NOT NULL REFERENCES patients(id),
            doctor_id UUID NOT NULL REFERENCES doctors(id),
            patient_name VARCHAR(100) NOT NULL,
            patient_email VARCHAR(120) NOT NULL,
            patient_phone VARCHAR(20) NOT NULL,
            appointment_date DATE NOT NULL,
            appointment_time VARCHAR(10) NOT NULL,
            reason_for_visit TEXT NULL,
            status VARCHAR(20) NOT NULL DEFAULT 'Booked',
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
            CONSTRAINT valid_status CHECK (status IN ('Booked', 'Cancelled'))
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create medical_records table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS medical_records (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            record_date TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
            notes TEXT NOT NULL,
            prescription TEXT NULL,
            doctor_id UUID NOT NULL REFERENCES doctors(id),
            patient_id UUID NOT NULL REFERENCES patients(id),
            appointment_id UUID NOT NULL UNIQUE REFERENCES appointments(id)
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create indexes (several statements, so this goes over the simple query protocol)
    pool.execute(
        r#"
        CREATE INDEX IF NOT EXISTS idx_doctors_hospital_id ON doctors(hospital_id);
        CREATE INDEX IF NOT EXISTS idx_patient_profiles_patient_id ON patient_profiles(patient_id);
        CREATE INDEX IF NOT EXISTS idx_appointments_patient_id ON appointments(patient_id);
        CREATE INDEX IF NOT EXISTS idx_appointments_doctor_id ON appointments(doctor_id);
        CREATE INDEX IF NOT EXISTS idx_appointments_date ON appointments(appointment_date);
        CREATE INDEX IF NOT EXISTS idx_medical_records_patient_id ON medical_records(patient_id);
        "#,
    )
    .await?;

    info!("Database schema initialized successfully.");
    Ok(())
}
