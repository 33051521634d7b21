use chrono::{DateTime, NaiveDate, Utc};
use eyre::{eyre, Result};
use medsync_core::models::{
    appointment::{parse_time_of_day, Appointment, AppointmentStatus},
    directory::{Doctor, DoctorSummary, Hospital, Patient, PatientProfile},
    medical_record::MedicalRecord,
};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbHospital {
    pub id: Uuid,
    pub name: String,
    pub address: Option<String>,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbDoctor {
    pub id: Uuid,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub password_hash: String,
    pub specialization: Option<String>,
    pub hospital_id: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbPatient {
    pub id: Uuid,
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbPatientProfile {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub profile_name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub aadhar_no: Option<String>,
    pub age: Option<i32>,
    pub gender: Option<String>,
    pub medical_history: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbAppointment {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub doctor_id: Uuid,
    pub patient_name: String,
    pub patient_email: String,
    pub patient_phone: String,
    pub appointment_date: NaiveDate,
    pub appointment_time: String,
    pub reason_for_visit: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbMedicalRecord {
    pub id: Uuid,
    pub record_date: DateTime<Utc>,
    pub notes: String,
    pub prescription: Option<String>,
    pub doctor_id: Uuid,
    pub patient_id: Uuid,
    pub appointment_id: Uuid,
}

// Write-side inputs

#[derive(Debug, Clone)]
pub struct NewHospital {
    pub name: String,
    pub address: Option<String>,
    pub email: String,
    pub password_hash: String,
}

#[derive(Debug, Clone)]
pub struct NewDoctor {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub password_hash: String,
    pub specialization: Option<String>,
    pub hospital_id: Uuid,
}

#[derive(Debug, Clone)]
pub struct NewProfile {
    pub profile_name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub aadhar_no: Option<String>,
    pub age: Option<i32>,
    pub gender: Option<String>,
}

/// A patient account together with its companion profile.
#[derive(Debug, Clone)]
pub struct NewPatient {
    pub name: String,
    pub phone: String,
    pub email: String,
    pub password_hash: String,
    pub profile: NewProfile,
}

#[derive(Debug, Clone)]
pub struct NewAppointment {
    pub doctor_id: Uuid,
    pub patient_name: String,
    pub patient_email: String,
    pub patient_phone: String,
    pub appointment_date: NaiveDate,
    pub appointment_time: String,
    pub reason_for_visit: Option<String>,
}

#[derive(Debug, Clone)]
pub enum PatientSelection {
    Existing(Uuid),
    New(NewPatient),
}

/// Everything one booking writes. Persisted atomically.
#[derive(Debug, Clone)]
pub struct NewBooking {
    pub patient: PatientSelection,
    pub appointment: NewAppointment,
}

#[derive(Debug, Clone)]
pub struct NewMedicalRecord {
    pub notes: String,
    pub prescription: Option<String>,
    pub doctor_id: Uuid,
    pub patient_id: Uuid,
    pub appointment_id: Uuid,
}

impl DbAppointment {
    pub fn into_appointment(self) -> Result<Appointment> {
        let status = self
            .status
            .parse::<AppointmentStatus>()
            .map_err(|e| eyre!("Corrupt appointment {}: {}", self.id, e))?;

        Ok(Appointment {
            id: self.id,
            patient_id: self.patient_id,
            doctor_id: self.doctor_id,
            patient_name: self.patient_name,
            patient_email: self.patient_email,
            patient_phone: self.patient_phone,
            appointment_date: self.appointment_date,
            appointment_time: self.appointment_time,
            reason_for_visit: self.reason_for_visit,
            status,
            created_at: self.created_at,
        })
    }
}

/// Orders appointments by date, then by parsed time of day. The time column
/// holds `HH:MM AM/PM` text, so ordering it lexically in SQL puts 01:00 PM
/// before 09:00 AM.
pub fn sort_by_schedule(appointments: &mut [DbAppointment]) {
    appointments.sort_by_key(|a| {
        (
            a.appointment_date,
            parse_time_of_day(&a.appointment_time),
        )
    });
}

impl From<DbHospital> for Hospital {
    fn from(row: DbHospital) -> Self {
        Hospital {
            id: row.id,
            name: row.name,
            address: row.address,
            email: row.email,
            created_at: row.created_at,
        }
    }
}

impl From<DbDoctor> for Doctor {
    fn from(row: DbDoctor) -> Self {
        Doctor {
            id: row.id,
            name: row.name,
            email: row.email,
            phone: row.phone,
            specialization: row.specialization,
            hospital_id: row.hospital_id,
            created_at: row.created_at,
        }
    }
}

impl From<DbDoctor> for DoctorSummary {
    fn from(row: DbDoctor) -> Self {
        DoctorSummary {
            id: row.id,
            name: row.name,
            specialization: row.specialization,
        }
    }
}

impl From<DbPatient> for Patient {
    fn from(row: DbPatient) -> Self {
        Patient {
            id: row.id,
            name: row.name,
            phone: row.phone,
            email: row.email,
            created_at: row.created_at,
        }
    }
}

impl From<DbPatientProfile> for PatientProfile {
    fn from(row: DbPatientProfile) -> Self {
        PatientProfile {
            id: row.id,
            patient_id: row.patient_id,
            profile_name: row.profile_name,
            date_of_birth: row.date_of_birth,
            aadhar_no: row.aadhar_no,
            age: row.age,
            gender: row.gender,
            medical_history: row.medical_history,
        }
    }
}

impl From<DbMedicalRecord> for MedicalRecord {
    fn from(row: DbMedicalRecord) -> Self {
        MedicalRecord {
            id: row.id,
            record_date: row.record_date,
            notes: row.notes,
            prescription: row.prescription,
            doctor_id: row.doctor_id,
            patient_id: row.patient_id,
            appointment_id: row.appointment_id,
        }
    }
}
