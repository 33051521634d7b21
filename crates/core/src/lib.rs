//! # MedSync Core
//!
//! Domain types shared by every MedSync crate: request and response models,
//! the appointment status machine, and the error taxonomy. Nothing in this
//! crate performs I/O.

pub mod errors;
pub mod models;
