//! # File Storage Module
//!
//! Durable file-based storage for the adherence store. Each elder owns one
//! directory holding a YAML profile plus two CSV tables:
//!
//! ```text
//! <base>/elder__<id>/elder.yaml
//! <base>/elder__<id>/medications.csv
//! <base>/elder__<id>/intake_log.csv
//! ```
//!
//! Every write lands in a temp file first and is renamed into place, so a
//! crash never leaves a half-written record or a truncated table. Compound
//! read-modify-write sequences run under the connection write lock.
//! Deleting an elder's directory cascades over everything the elder owns.

pub mod connection;
pub mod elder_repository;
pub mod intake_log_repository;
pub mod medication_repository;

pub use connection::CsvConnection;
pub use elder_repository::ElderRepository;
pub use intake_log_repository::IntakeLogRepository;
pub use medication_repository::MedicationRepository;
