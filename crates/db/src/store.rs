//! The Directory Store seam.
//!
//! Everything above the database talks to [`DirectoryStore`]. The PostgreSQL
//! implementation delegates to the repository functions; tests use the
//! in-memory store or the mockall mock from [`crate::mock`].

use async_trait::async_trait;
use chrono::NaiveDate;
use eyre::Result;
use medsync_core::models::appointment::AppointmentStatus;
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

use crate::models::{
    sort_by_schedule, DbAppointment, DbDoctor, DbHospital, DbMedicalRecord, DbPatient,
    DbPatientProfile, NewBooking, NewDoctor, NewHospital, NewMedicalRecord, NewPatient,
    PatientSelection,
};
use crate::repositories::{appointment, doctor, hospital, medical_record, patient};

#[async_trait]
pub trait DirectoryStore: Send + Sync {
    // Hospitals
    async fn create_hospital(&self, hospital: &NewHospital) -> Result<DbHospital>;
    async fn find_hospital_by_email(&self, email: &str) -> Result<Option<DbHospital>>;
    async fn list_hospitals(&self) -> Result<Vec<DbHospital>>;
    async fn find_hospital_for_doctor(&self, doctor_id: Uuid) -> Result<Option<DbHospital>>;

    // Doctors
    async fn create_doctor(&self, doctor: &NewDoctor) -> Result<DbDoctor>;
    async fn find_doctor_by_identifier(&self, identifier: &str) -> Result<Option<DbDoctor>>;
    async fn doctor_contact_taken(&self, email: &str, phone: &str) -> Result<bool>;
    async fn list_doctors_for_hospital(&self, hospital_id: Uuid) -> Result<Vec<DbDoctor>>;

    // Patients
    async fn find_patient_by_contact(&self, phone: &str, email: &str)
        -> Result<Option<DbPatient>>;
    async fn find_patient_by_identifier(&self, identifier: &str) -> Result<Option<DbPatient>>;
    /// Creates the patient and its companion profile together.
    async fn create_patient(&self, patient: &NewPatient) -> Result<DbPatient>;
    /// The profile created with the account, if any.
    async fn find_patient_profile(&self, patient_id: Uuid) -> Result<Option<DbPatientProfile>>;
    /// Overwrites the medical history on the patient's profile. `None` when
    /// the patient has no profile.
    async fn update_patient_medical_history(
        &self,
        patient_id: Uuid,
        medical_history: Option<String>,
    ) -> Result<Option<DbPatientProfile>>;

    // Appointments
    /// Writes the booking (and the new patient, if any) atomically.
    async fn book_appointment(&self, booking: &NewBooking) -> Result<DbAppointment>;
    async fn find_patient_appointment(
        &self,
        appointment_id: Uuid,
        patient_id: Uuid,
    ) -> Result<Option<DbAppointment>>;
    async fn find_doctor_appointment(
        &self,
        appointment_id: Uuid,
        doctor_id: Uuid,
    ) -> Result<Option<DbAppointment>>;
    async fn set_appointment_status(
        &self,
        appointment_id: Uuid,
        status: AppointmentStatus,
    ) -> Result<DbAppointment>;
    /// Booked appointments on or after `from`, in schedule order.
    async fn upcoming_appointments_for_patient(
        &self,
        patient_id: Uuid,
        from: NaiveDate,
    ) -> Result<Vec<DbAppointment>>;
    /// All appointments on or after `from`, in schedule order.
    async fn upcoming_appointments_for_doctor(
        &self,
        doctor_id: Uuid,
        from: NaiveDate,
    ) -> Result<Vec<DbAppointment>>;

    // Medical records
    async fn create_medical_record(&self, record: &NewMedicalRecord) -> Result<DbMedicalRecord>;
    async fn find_medical_record_for_appointment(
        &self,
        appointment_id: Uuid,
    ) -> Result<Option<DbMedicalRecord>>;
    /// Newest first.
    async fn list_medical_records_for_patient(&self, patient_id: Uuid)
        -> Result<Vec<DbMedicalRecord>>;
}

/// PostgreSQL-backed Directory Store.
#[derive(Clone)]
pub struct PgDirectoryStore {
    pool: PgPool,
}

impl PgDirectoryStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl DirectoryStore for PgDirectoryStore {
    async fn create_hospital(&self, new_hospital: &NewHospital) -> Result<DbHospital> {
        hospital::create_hospital(&self.pool, new_hospital).await
    }

    async fn find_hospital_by_email(&self, email: &str) -> Result<Option<DbHospital>> {
        hospital::find_hospital_by_email(&self.pool, email).await
    }

    async fn list_hospitals(&self) -> Result<Vec<DbHospital>> {
        hospital::list_hospitals(&self.pool).await
    }

    async fn find_hospital_for_doctor(&self, doctor_id: Uuid) -> Result<Option<DbHospital>> {
        hospital::find_hospital_for_doctor(&self.pool, doctor_id).await
    }

    async fn create_doctor(&self, new_doctor: &NewDoctor) -> Result<DbDoctor> {
        doctor::create_doctor(&self.pool, new_doctor).await
    }

    async fn find_doctor_by_identifier(&self, identifier: &str) -> Result<Option<DbDoctor>> {
        doctor::find_doctor_by_identifier(&self.pool, identifier).await
    }

    async fn doctor_contact_taken(&self, email: &str, phone: &str) -> Result<bool> {
        doctor::doctor_contact_taken(&self.pool, email, phone).await
    }

    async fn list_doctors_for_hospital(&self, hospital_id: Uuid) -> Result<Vec<DbDoctor>> {
        doctor::list_doctors_for_hospital(&self.pool, hospital_id).await
    }

    async fn find_patient_by_contact(
        &self,
        phone: &str,
        email: &str,
    ) -> Result<Option<DbPatient>> {
        patient::find_patient_by_contact(&self.pool, phone, email).await
    }

    async fn find_patient_by_identifier(&self, identifier: &str) -> Result<Option<DbPatient>> {
        patient::find_patient_by_contact(&self.pool, identifier, identifier).await
    }

    async fn create_patient(&self, new_patient: &NewPatient) -> Result<DbPatient> {
        let mut tx = self.pool.begin().await?;

        let row = patient::insert_patient(&mut *tx, new_patient).await?;
        patient::insert_profile(&mut *tx, row.id, new_patient).await?;

        tx.commit().await?;
        Ok(row)
    }

    async fn find_patient_profile(&self, patient_id: Uuid) -> Result<Option<DbPatientProfile>> {
        patient::find_primary_profile(&self.pool, patient_id).await
    }

    async fn update_patient_medical_history(
        &self,
        patient_id: Uuid,
        medical_history: Option<String>,
    ) -> Result<Option<DbPatientProfile>> {
        patient::update_medical_history(&self.pool, patient_id, medical_history.as_deref()).await
    }

    async fn book_appointment(&self, booking: &NewBooking) -> Result<DbAppointment> {
        // Dropping the transaction on any early return rolls it back.
        let mut tx = self.pool.begin().await?;

        let patient_id = match &booking.patient {
            PatientSelection::Existing(id) => *id,
            PatientSelection::New(new_patient) => {
                let row = patient::insert_patient(&mut *tx, new_patient).await?;
                patient::insert_profile(&mut *tx, row.id, new_patient).await?;
                debug!("Created patient {} during booking", row.id);
                row.id
            }
        };

        let row = appointment::insert_appointment(&mut *tx, patient_id, &booking.appointment)
            .await?;

        tx.commit().await?;
        Ok(row)
    }

    async fn find_patient_appointment(
        &self,
        appointment_id: Uuid,
        patient_id: Uuid,
    ) -> Result<Option<DbAppointment>> {
        appointment::find_patient_appointment(&self.pool, appointment_id, patient_id).await
    }

    async fn find_doctor_appointment(
        &self,
        appointment_id: Uuid,
        doctor_id: Uuid,
    ) -> Result<Option<DbAppointment>> {
        appointment::find_doctor_appointment(&self.pool, appointment_id, doctor_id).await
    }

    async fn set_appointment_status(
        &self,
        appointment_id: Uuid,
        status: AppointmentStatus,
    ) -> Result<DbAppointment> {
        appointment::set_status(&self.pool, appointment_id, status).await
    }

    async fn upcoming_appointments_for_patient(
        &self,
        patient_id: Uuid,
        from: NaiveDate,
    ) -> Result<Vec<DbAppointment>> {
        let mut rows = appointment::upcoming_for_patient(&self.pool, patient_id, from).await?;
        sort_by_schedule(&mut rows);
        Ok(rows)
    }

    async fn upcoming_appointments_for_doctor(
        &self,
        doctor_id: Uuid,
        from: NaiveDate,
    ) -> Result<Vec<DbAppointment>> {
        let mut rows = appointment::upcoming_for_doctor(&self.pool, doctor_id, from).await?;
        sort_by_schedule(&mut rows);
        Ok(rows)
    }

    async fn create_medical_record(&self, record: &NewMedicalRecord) -> Result<DbMedicalRecord> {
        medical_record::create_medical_record(&self.pool, record).await
    }

    async fn find_medical_record_for_appointment(
        &self,
        appointment_id: Uuid,
    ) -> Result<Option<DbMedicalRecord>> {
        medical_record::find_for_appointment(&self.pool, appointment_id).await
    }

    async fn list_medical_records_for_patient(
        &self,
        patient_id: Uuid,
    ) -> Result<Vec<DbMedicalRecord>> {
        medical_record::list_for_patient(&self.pool, patient_id).await
    }
}
