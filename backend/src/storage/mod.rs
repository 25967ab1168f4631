//! Persistence layer: storage traits plus the shipped backends.

pub mod csv;
pub mod memory;
pub mod traits;

pub use traits::{
    DuplicateAccessCode, ElderStorage, IntakeLogStorage, MedicationStorage,
};
