use async_trait::async_trait;
use chrono::NaiveDate;
use medsync_core::models::appointment::AppointmentStatus;
use mockall::mock;
use uuid::Uuid;

use crate::models::{
    DbAppointment, DbDoctor, DbHospital, DbMedicalRecord, DbPatient, DbPatientProfile,
    NewBooking, NewDoctor, NewHospital, NewMedicalRecord, NewPatient,
};
use crate::store::DirectoryStore;

// Mock directory store for testing
mock! {
    pub DirectoryStore {}

    #[async_trait]
    impl DirectoryStore for DirectoryStore {
        async fn create_hospital(&self, hospital: &NewHospital) -> eyre::Result<DbHospital>;
        async fn find_hospital_by_email(&self, email: &str) -> eyre::Result<Option<DbHospital>>;
        async fn list_hospitals(&self) -> eyre::Result<Vec<DbHospital>>;
        async fn find_hospital_for_doctor(&self, doctor_id: Uuid) -> eyre::Result<Option<DbHospital>>;

        async fn create_doctor(&self, doctor: &NewDoctor) -> eyre::Result<DbDoctor>;
        async fn find_doctor_by_identifier(&self, identifier: &str) -> eyre::Result<Option<DbDoctor>>;
        async fn doctor_contact_taken(&self, email: &str, phone: &str) -> eyre::Result<bool>;
        async fn list_doctors_for_hospital(&self, hospital_id: Uuid) -> eyre::Result<Vec<DbDoctor>>;

        async fn find_patient_by_contact(&self, phone: &str, email: &str) -> eyre::Result<Option<DbPatient>>;
        async fn find_patient_by_identifier(&self, identifier: &str) -> eyre::Result<Option<DbPatient>>;
        async fn create_patient(&self, patient: &NewPatient) -> eyre::Result<DbPatient>;
        async fn find_patient_profile(&self, patient_id: Uuid) -> eyre::Result<Option<DbPatientProfile>>;
        async fn update_patient_medical_history(
            &self,
            patient_id: Uuid,
            medical_history: Option<String>,
        ) -> eyre::Result<Option<DbPatientProfile>>;

        async fn book_appointment(&self, booking: &NewBooking) -> eyre::Result<DbAppointment>;
        async fn find_patient_appointment(
            &self,
            appointment_id: Uuid,
            patient_id: Uuid,
        ) -> eyre::Result<Option<DbAppointment>>;
        async fn find_doctor_appointment(
            &self,
            appointment_id: Uuid,
            doctor_id: Uuid,
        ) -> eyre::Result<Option<DbAppointment>>;
        async fn set_appointment_status(
            &self,
            appointment_id: Uuid,
            status: AppointmentStatus,
        ) -> eyre::Result<DbAppointment>;
        async fn upcoming_appointments_for_patient(
            &self,
            patient_id: Uuid,
            from: NaiveDate,
        ) -> eyre::Result<Vec<DbAppointment>>;
        async fn upcoming_appointments_for_doctor(
            &self,
            doctor_id: Uuid,
            from: NaiveDate,
        ) -> eyre::Result<Vec<DbAppointment>>;

        async fn create_medical_record(&self, record: &NewMedicalRecord) -> eyre::Result<DbMedicalRecord>;
        async fn find_medical_record_for_appointment(
            &self,
            appointment_id: Uuid,
        ) -> eyre::Result<Option<DbMedicalRecord>>;
        async fn list_medical_records_for_patient(
            &self,
            patient_id: Uuid,
        ) -> eyre::Result<Vec<DbMedicalRecord>>;
    }
}
