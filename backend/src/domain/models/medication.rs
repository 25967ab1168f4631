use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Domain model for a medication assigned to a single elder.
///
/// Ownership is exclusive: the medication lives and dies with its elder.
/// Dosage and frequency are free text, not a structured schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Medication {
    pub id: String,
    pub elder_id: String,
    pub name: String,
    pub dosage: String,
    pub frequency: String,
    pub created_at: DateTime<Utc>,
}

impl Medication {
    /// Generate a unique ID for a medication.
    pub fn generate_id() -> String {
        format!("med::{}", Uuid::new_v4())
    }
}
