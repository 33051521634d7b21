use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use eyre::{bail, eyre, Result};
use medsync_core::models::appointment::AppointmentStatus;
use uuid::Uuid;

use crate::models::{
    sort_by_schedule, DbAppointment, DbDoctor, DbHospital, DbMedicalRecord, DbPatient,
    DbPatientProfile, NewBooking, NewDoctor, NewHospital, NewMedicalRecord, NewPatient,
    PatientSelection,
};
use crate::errors::UniqueViolation;
use crate::store::DirectoryStore;

#[derive(Default)]
struct Tables {
    hospitals: Vec<DbHospital>,
    doctors: Vec<DbDoctor>,
    patients: Vec<DbPatient>,
    profiles: Vec<DbPatientProfile>,
    appointments: Vec<DbAppointment>,
    medical_records: Vec<DbMedicalRecord>,
}

impl Tables {
    /// Mirrors the UNIQUE constraints on `patients` and `patient_profiles`.
    fn check_new_patient(&self, patient: &NewPatient) -> Result<()> {
        if self.patients.iter().any(|p| p.phone == patient.phone) {
            bail!("duplicate key value violates unique constraint \"patients_phone_key\"");
        }
        if self
            .patients
            .iter()
            .any(|p| p.email.as_deref() == Some(patient.email.as_str()))
        {
            bail!("duplicate key value violates unique constraint \"patients_email_key\"");
        }
        if let Some(aadhar) = &patient.profile.aadhar_no {
            if self.profiles.iter().any(|p| p.aadhar_no.as_ref() == Some(aadhar)) {
                bail!("duplicate key value violates unique constraint \"patient_profiles_aadhar_no_key\"");
            }
        }
        Ok(())
    }

    fn insert_patient(&mut self, patient: &NewPatient) -> DbPatient {
        let now = Utc::now();
        let row = DbPatient {
            id: Uuid::new_v4(),
            name: patient.name.clone(),
            phone: patient.phone.clone(),
            email: Some(patient.email.clone()),
            password_hash: patient.password_hash.clone(),
            created_at: now,
        };
        self.profiles.push(DbPatientProfile {
            id: Uuid::new_v4(),
            patient_id: row.id,
            profile_name: patient.profile.profile_name.clone(),
            date_of_birth: patient.profile.date_of_birth,
            aadhar_no: patient.profile.aadhar_no.clone(),
            age: patient.profile.age,
            gender: patient.profile.gender.clone(),
            medical_history: None,
            created_at: now,
        });
        self.patients.push(row.clone());
        row
    }
}

/// In-memory Directory Store used by tests and local experiments.
///
/// Every write validates first and mutates second, so a failed booking
/// leaves no partial rows behind, matching the transactional PostgreSQL
/// store.
#[derive(Default)]
pub struct MemoryDirectoryStore {
    tables: Mutex<Tables>,
}

impl MemoryDirectoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn tables(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn patient_count(&self) -> usize {
        self.tables().patients.len()
    }

    pub fn profiles_for(&self, patient_id: Uuid) -> Vec<DbPatientProfile> {
        self.tables()
            .profiles
            .iter()
            .filter(|p| p.patient_id == patient_id)
            .cloned()
            .collect()
    }

    pub fn appointments(&self) -> Vec<DbAppointment> {
        self.tables().appointments.clone()
    }

    pub fn appointment(&self, id: Uuid) -> Option<DbAppointment> {
        self.tables().appointments.iter().find(|a| a.id == id).cloned()
    }
}

#[async_trait]
impl DirectoryStore for MemoryDirectoryStore {
    async fn create_hospital(&self, hospital: &NewHospital) -> Result<DbHospital> {
        let mut tables = self.tables();
        if tables
            .hospitals
            .iter()
            .any(|h| h.email == hospital.email || h.name == hospital.name)
        {
            bail!("duplicate key value violates unique constraint on hospitals");
        }
        let row = DbHospital {
            id: Uuid::new_v4(),
            name: hospital.name.clone(),
            address: hospital.address.clone(),
            email: hospital.email.clone(),
            password_hash: hospital.password_hash.clone(),
            created_at: Utc::now(),
        };
        tables.hospitals.push(row.clone());
        Ok(row)
    }

    async fn find_hospital_by_email(&self, email: &str) -> Result<Option<DbHospital>> {
        Ok(self.tables().hospitals.iter().find(|h| h.email == email).cloned())
    }

    async fn list_hospitals(&self) -> Result<Vec<DbHospital>> {
        let mut hospitals = self.tables().hospitals.clone();
        hospitals.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(hospitals)
    }

    async fn find_hospital_for_doctor(&self, doctor_id: Uuid) -> Result<Option<DbHospital>> {
        let tables = self.tables();
        let hospital = tables
            .doctors
            .iter()
            .find(|d| d.id == doctor_id)
            .and_then(|d| tables.hospitals.iter().find(|h| h.id == d.hospital_id))
            .cloned();
        Ok(hospital)
    }

    async fn create_doctor(&self, doctor: &NewDoctor) -> Result<DbDoctor> {
        let mut tables = self.tables();
        if !tables.hospitals.iter().any(|h| h.id == doctor.hospital_id) {
            bail!("insert on doctors violates foreign key constraint \"doctors_hospital_id_fkey\"");
        }
        if tables.doctors.iter().any(|d| {
            d.email.as_deref() == Some(doctor.email.as_str())
                || d.phone.as_deref() == Some(doctor.phone.as_str())
        }) {
            bail!("duplicate key value violates unique constraint on doctors");
        }
        let row = DbDoctor {
            id: Uuid::new_v4(),
            name: doctor.name.clone(),
            email: Some(doctor.email.clone()),
            phone: Some(doctor.phone.clone()),
            password_hash: doctor.password_hash.clone(),
            specialization: doctor.specialization.clone(),
            hospital_id: doctor.hospital_id,
            created_at: Utc::now(),
        };
        tables.doctors.push(row.clone());
        Ok(row)
    }

    async fn find_doctor_by_identifier(&self, identifier: &str) -> Result<Option<DbDoctor>> {
        Ok(self
            .tables()
            .doctors
            .iter()
            .find(|d| {
                d.email.as_deref() == Some(identifier) || d.phone.as_deref() == Some(identifier)
            })
            .cloned())
    }

    async fn doctor_contact_taken(&self, email: &str, phone: &str) -> Result<bool> {
        Ok(self.tables().doctors.iter().any(|d| {
            d.email.as_deref() == Some(email) || d.phone.as_deref() == Some(phone)
        }))
    }

    async fn list_doctors_for_hospital(&self, hospital_id: Uuid) -> Result<Vec<DbDoctor>> {
        let mut doctors: Vec<_> = self
            .tables()
            .doctors
            .iter()
            .filter(|d| d.hospital_id == hospital_id)
            .cloned()
            .collect();
        doctors.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(doctors)
    }

    async fn find_patient_by_contact(
        &self,
        phone: &str,
        email: &str,
    ) -> Result<Option<DbPatient>> {
        // Rows are kept in insertion order, so the first hit is the oldest.
        Ok(self
            .tables()
            .patients
            .iter()
            .find(|p| p.phone == phone || p.email.as_deref() == Some(email))
            .cloned())
    }

    async fn find_patient_by_identifier(&self, identifier: &str) -> Result<Option<DbPatient>> {
        self.find_patient_by_contact(identifier, identifier).await
    }

    async fn create_patient(&self, patient: &NewPatient) -> Result<DbPatient> {
        let mut tables = self.tables();
        tables.check_new_patient(patient)?;
        Ok(tables.insert_patient(patient))
    }

    async fn find_patient_profile(&self, patient_id: Uuid) -> Result<Option<DbPatientProfile>> {
        // Profiles are kept in insertion order, so the first is the primary.
        Ok(self
            .tables()
            .profiles
            .iter()
            .find(|p| p.patient_id == patient_id)
            .cloned())
    }

    async fn update_patient_medical_history(
        &self,
        patient_id: Uuid,
        medical_history: Option<String>,
    ) -> Result<Option<DbPatientProfile>> {
        let mut tables = self.tables();
        let Some(profile) = tables.profiles.iter_mut().find(|p| p.patient_id == patient_id) else {
            return Ok(None);
        };
        profile.medical_history = medical_history;
        Ok(Some(profile.clone()))
    }

    async fn book_appointment(&self, booking: &NewBooking) -> Result<DbAppointment> {
        let mut tables = self.tables();
        let appointment = &booking.appointment;

        if !tables.doctors.iter().any(|d| d.id == appointment.doctor_id) {
            bail!("insert on appointments violates foreign key constraint \"appointments_doctor_id_fkey\"");
        }
        match &booking.patient {
            PatientSelection::Existing(id) => {
                if !tables.patients.iter().any(|p| p.id == *id) {
                    bail!("insert on appointments violates foreign key constraint \"appointments_patient_id_fkey\"");
                }
            }
            PatientSelection::New(patient) => tables.check_new_patient(patient)?,
        }

        let patient_id = match &booking.patient {
            PatientSelection::Existing(id) => *id,
            PatientSelection::New(patient) => tables.insert_patient(patient).id,
        };

        let row = DbAppointment {
            id: Uuid::new_v4(),
            patient_id,
            doctor_id: appointment.doctor_id,
            patient_name: appointment.patient_name.clone(),
            patient_email: appointment.patient_email.clone(),
            patient_phone: appointment.patient_phone.clone(),
            appointment_date: appointment.appointment_date,
            appointment_time: appointment.appointment_time.clone(),
            reason_for_visit: appointment.reason_for_visit.clone(),
            status: AppointmentStatus::Booked.to_string(),
            created_at: Utc::now(),
        };
        tables.appointments.push(row.clone());
        Ok(row)
    }

    async fn find_patient_appointment(
        &self,
        appointment_id: Uuid,
        patient_id: Uuid,
    ) -> Result<Option<DbAppointment>> {
        Ok(self
            .tables()
            .appointments
            .iter()
            .find(|a| a.id == appointment_id && a.patient_id == patient_id)
            .cloned())
    }

    async fn find_doctor_appointment(
        &self,
        appointment_id: Uuid,
        doctor_id: Uuid,
    ) -> Result<Option<DbAppointment>> {
        Ok(self
            .tables()
            .appointments
            .iter()
            .find(|a| a.id == appointment_id && a.doctor_id == doctor_id)
            .cloned())
    }

    async fn set_appointment_status(
        &self,
        appointment_id: Uuid,
        status: AppointmentStatus,
    ) -> Result<DbAppointment> {
        let mut tables = self.tables();
        let row = tables
            .appointments
            .iter_mut()
            .find(|a| a.id == appointment_id)
            .ok_or_else(|| eyre!("no rows returned by a query that expected to return at least one row"))?;
        row.status = status.to_string();
        Ok(row.clone())
    }

    async fn upcoming_appointments_for_patient(
        &self,
        patient_id: Uuid,
        from: NaiveDate,
    ) -> Result<Vec<DbAppointment>> {
        let booked = AppointmentStatus::Booked.to_string();
        let mut rows: Vec<_> = self
            .tables()
            .appointments
            .iter()
            .filter(|a| a.patient_id == patient_id && a.appointment_date >= from && a.status == booked)
            .cloned()
            .collect();
        sort_by_schedule(&mut rows);
        Ok(rows)
    }

    async fn upcoming_appointments_for_doctor(
        &self,
        doctor_id: Uuid,
        from: NaiveDate,
    ) -> Result<Vec<DbAppointment>> {
        let mut rows: Vec<_> = self
            .tables()
            .appointments
            .iter()
            .filter(|a| a.doctor_id == doctor_id && a.appointment_date >= from)
            .cloned()
            .collect();
        sort_by_schedule(&mut rows);
        Ok(rows)
    }

    async fn create_medical_record(&self, record: &NewMedicalRecord) -> Result<DbMedicalRecord> {
        let mut tables = self.tables();
        if tables
            .medical_records
            .iter()
            .any(|r| r.appointment_id == record.appointment_id)
        {
            return Err(UniqueViolation::new("medical_records_appointment_id_key").into());
        }
        let row = DbMedicalRecord {
            id: Uuid::new_v4(),
            record_date: Utc::now(),
            notes: record.notes.clone(),
            prescription: record.prescription.clone(),
            doctor_id: record.doctor_id,
            patient_id: record.patient_id,
            appointment_id: record.appointment_id,
        };
        tables.medical_records.push(row.clone());
        Ok(row)
    }

    async fn find_medical_record_for_appointment(
        &self,
        appointment_id: Uuid,
    ) -> Result<Option<DbMedicalRecord>> {
        Ok(self
            .tables()
            .medical_records
            .iter()
            .find(|r| r.appointment_id == appointment_id)
            .cloned())
    }

    async fn list_medical_records_for_patient(
        &self,
        patient_id: Uuid,
    ) -> Result<Vec<DbMedicalRecord>> {
        let mut rows: Vec<_> = self
            .tables()
            .medical_records
            .iter()
            .filter(|r| r.patient_id == patient_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.record_date.cmp(&a.record_date));
        Ok(rows)
    }
}
