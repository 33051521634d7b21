pub mod appointment;
pub mod doctor;
pub mod hospital;
pub mod medical_record;
pub mod patient;
