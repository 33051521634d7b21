pub mod appointment;
pub mod doctor;
pub mod health;
pub mod hospital;
pub mod medical_record;
pub mod patient;
