//! Test doubles for the Directory Store.
//!
//! [`repositories::MockDirectoryStore`] is a mockall mock for scripting
//! exact calls and failures; [`memory::MemoryDirectoryStore`] is a working
//! store that keeps rows in memory and enforces the same uniqueness and
//! reference rules as the schema.

pub mod memory;
pub mod repositories;
