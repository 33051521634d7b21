use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A doctor's notes for one appointment. At most one exists per appointment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MedicalRecord {
    pub id: Uuid,
    pub record_date: DateTime<Utc>,
    pub notes: String,
    pub prescription: Option<String>,
    pub doctor_id: Uuid,
    pub patient_id: Uuid,
    pub appointment_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateMedicalRecordRequest {
    pub appointment_id: Uuid,
    pub notes: String,
    pub prescription: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatientRecordsResponse {
    pub patient_id: Uuid,
    pub records: Vec<MedicalRecord>,
}
