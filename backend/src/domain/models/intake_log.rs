use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Maximum number of log entries retained per elder. The log is a bounded
/// ring: appending the 31st entry evicts the oldest.
pub const INTAKE_LOG_CAP: usize = 30;

/// Outcome recorded for a dose. Only `Taken` is produced today; the enum
/// leaves room for skipped or late doses later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IntakeStatus {
    Taken,
}

impl IntakeStatus {
    /// Stable string form used in persisted files and on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            IntakeStatus::Taken => "taken",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "taken" => Some(IntakeStatus::Taken),
            _ => None,
        }
    }
}

/// A durable record that a dose was marked taken.
///
/// Entries are append-only and never mutated. The medication name is
/// snapshotted at write time so history stays readable after the medication
/// itself is deleted; the id remains for queries like taken-today.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntakeLogEntry {
    pub id: String,
    pub elder_id: String,
    pub medication_id: String,
    pub medication_name: String,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub status: IntakeStatus,
}

impl IntakeLogEntry {
    /// Generate a unique ID for a log entry.
    pub fn generate_id() -> String {
        format!("log::{}", Uuid::new_v4())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trips_through_string_form() {
        assert_eq!(IntakeStatus::Taken.as_str(), "taken");
        assert_eq!(IntakeStatus::parse("taken"), Some(IntakeStatus::Taken));
        assert_eq!(IntakeStatus::parse("skipped"), None);
    }
}
