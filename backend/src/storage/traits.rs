//! # Storage Traits
//!
//! Storage abstraction for the adherence store. Any backend satisfying these
//! traits works under the domain services without modification; the crate
//! ships a durable per-elder file backend and an in-memory backend.

use anyhow::Result;
use thiserror::Error;

use crate::domain::models::elder::Elder;
use crate::domain::models::intake_log::IntakeLogEntry;
use crate::domain::models::medication::Medication;

/// Returned (wrapped in `anyhow::Error`) by [`ElderStorage::store_elder`]
/// when the new elder's access code is already held by a stored elder.
/// The registration flow downcasts to this to drive regenerate-on-collision.
#[derive(Debug, Error)]
#[error("access code {0} is already in use")]
pub struct DuplicateAccessCode(pub String);

/// Trait defining the interface for elder storage operations.
pub trait ElderStorage: Send + Sync {
    /// Persist a new elder. The access-code uniqueness check and the insert
    /// are atomic per connection; a collision fails with
    /// [`DuplicateAccessCode`] and stores nothing.
    fn store_elder(&self, elder: &Elder) -> Result<()>;

    /// Retrieve a specific elder by ID.
    fn get_elder(&self, elder_id: &str) -> Result<Option<Elder>>;

    /// Find an elder by exact, case-sensitive access-code match.
    fn find_elder_by_code(&self, access_code: &str) -> Result<Option<Elder>>;

    /// List all elders in insertion order.
    fn list_elders(&self) -> Result<Vec<Elder>>;

    /// Update an existing elder.
    fn update_elder(&self, elder: &Elder) -> Result<()>;

    /// Delete an elder together with everything it owns: medications and
    /// the intake log.
    fn delete_elder(&self, elder_id: &str) -> Result<()>;
}

/// Trait defining the interface for medication storage operations.
pub trait MedicationStorage: Send + Sync {
    /// Persist a new medication.
    fn store_medication(&self, medication: &Medication) -> Result<()>;

    /// Retrieve a specific medication belonging to an elder.
    fn get_medication(&self, elder_id: &str, medication_id: &str) -> Result<Option<Medication>>;

    /// List an elder's medications in insertion order.
    fn list_medications(&self, elder_id: &str) -> Result<Vec<Medication>>;

    /// Delete a medication. Returns true if it existed. Historical log
    /// entries referencing it are retained.
    fn delete_medication(&self, elder_id: &str, medication_id: &str) -> Result<bool>;
}

/// Trait defining the interface for intake-log storage operations.
///
/// The log is append-only and most-recent-first; entries are never mutated.
pub trait IntakeLogStorage: Send + Sync {
    /// Prepend an entry to the elder's log and truncate it to `cap`
    /// entries. The read-modify-write sequence is serialized per
    /// connection.
    fn append_entry(&self, entry: &IntakeLogEntry, cap: usize) -> Result<()>;

    /// List an elder's log, most recent first.
    fn list_entries(&self, elder_id: &str) -> Result<Vec<IntakeLogEntry>>;
}
