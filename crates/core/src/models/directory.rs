use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::appointment::Appointment;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hospital {
    pub id: Uuid,
    pub name: String,
    pub address: Option<String>,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterHospitalRequest {
    pub name: String,
    pub address: Option<String>,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HospitalListResponse {
    pub hospitals: Vec<Hospital>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Doctor {
    pub id: Uuid,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub specialization: Option<String>,
    pub hospital_id: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterDoctorRequest {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub password: String,
    pub specialization: Option<String>,
}

/// What the booking form shows when a hospital is picked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DoctorSummary {
    pub id: Uuid,
    pub name: String,
    pub specialization: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DoctorListResponse {
    pub doctors: Vec<DoctorSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Patient {
    pub id: Uuid,
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A patient's profile. Every account gets one when it is created; it is the
/// profile shown on the dashboard and the one medical history is written to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientProfile {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub profile_name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub aadhar_no: Option<String>,
    pub age: Option<i32>,
    pub gender: Option<String>,
    pub medical_history: Option<String>,
}

/// Replaces the profile's free-text medical history. Blank text clears it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateMedicalHistoryRequest {
    #[serde(default)]
    pub medical_history: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatientDashboardResponse {
    pub profile: Option<PatientProfile>,
    pub appointments: Vec<Appointment>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterPatientRequest {
    pub name: String,
    pub phone: String,
    pub email: String,
    pub password: String,
    pub age: Option<i32>,
    pub gender: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterResponse {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
}
