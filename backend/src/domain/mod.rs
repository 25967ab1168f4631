//! Domain layer: entities, typed errors, and the services that enforce the
//! adherence-store invariants. Services never read a clock; callers pass
//! "now" and "today" explicitly.

pub mod commands;
pub mod elder_service;
pub mod errors;
pub mod intake_service;
pub mod medication_service;
pub mod models;

pub use elder_service::ElderService;
pub use errors::{StoreError, StoreResult};
pub use intake_service::IntakeService;
pub use medication_service::MedicationService;
