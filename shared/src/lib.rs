//! Wire types shared between the Zelo backend and its clients.
//!
//! Field names follow the cross-implementation interchange schema
//! (camelCase: `accessCode`, `helpRequested`, `elderId`,
//! `medicationNameSnapshot`, ...), so any frontend speaking that schema can
//! talk to this backend unchanged.

use serde::{Deserialize, Serialize};

/// Gender of an elder, serialized as the single-letter codes used across
/// implementations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    #[serde(rename = "M")]
    Male,
    #[serde(rename = "F")]
    Female,
}

impl Gender {
    /// Display icon shown next to an elder's name.
    pub fn icon(&self) -> &'static str {
        match self {
            Gender::Male => "👴",
            Gender::Female => "👵",
        }
    }
}

/// A care recipient profile tracked by a caregiver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Elder {
    pub id: String,
    pub name: String,
    pub age: u32,
    pub gender: Gender,
    /// Derived from gender; carried on the wire so clients don't duplicate
    /// the mapping.
    pub icon: String,
    /// Six characters, uppercase letters and digits.
    pub access_code: String,
    pub help_requested: bool,
    /// RFC 3339.
    pub created_at: String,
    pub updated_at: String,
}

/// A medication assigned to an elder by a caregiver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Medication {
    pub id: String,
    pub elder_id: String,
    pub name: String,
    /// Free text, e.g. "50mg".
    pub dosage: String,
    /// Free text schedule descriptor, e.g. "08:00" or "twice daily".
    pub frequency: String,
    pub created_at: String,
}

/// Status of an intake log entry. Only `Taken` is produced today; the enum
/// exists so skipped/late doses can be added without a schema break.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntakeStatus {
    Taken,
}

/// A durable record that a medication dose was marked taken.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntakeLogEntry {
    pub id: String,
    pub elder_id: String,
    pub medication_id: String,
    /// Medication name captured at write time; survives medication deletion.
    pub medication_name_snapshot: String,
    /// ISO date, YYYY-MM-DD.
    pub date: String,
    /// HH:MM.
    pub time: String,
    pub status: IntakeStatus,
}

/// Request to register a new elder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterElderRequest {
    pub name: String,
    pub age: u32,
    pub gender: Gender,
}

/// Request to assign a medication to an elder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddMedicationRequest {
    pub name: String,
    pub dosage: String,
    pub frequency: String,
}

/// Elder self-service login by access code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub access_code: String,
}

/// Request to record a medication as taken.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordIntakeRequest {
    /// Optional RFC 3339 timestamp override; the server clock is used when
    /// absent.
    pub timestamp: Option<String>,
}

/// Response for the taken-today query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TakenTodayResponse {
    pub taken: bool,
}

/// Request to synthesize a spoken reminder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeakRequest {
    pub text: String,
}

/// Synthesized audio, base64-encoded as delivered by the speech service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeakResponse {
    pub audio_base64: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gender_serializes_as_single_letter() {
        assert_eq!(serde_json::to_string(&Gender::Male).unwrap(), "\"M\"");
        assert_eq!(serde_json::to_string(&Gender::Female).unwrap(), "\"F\"");
        let g: Gender = serde_json::from_str("\"F\"").unwrap();
        assert_eq!(g, Gender::Female);
    }

    #[test]
    fn gender_icon_mapping() {
        assert_eq!(Gender::Male.icon(), "👴");
        assert_eq!(Gender::Female.icon(), "👵");
    }

    #[test]
    fn elder_uses_interchange_field_names() {
        let elder = Elder {
            id: "abc".to_string(),
            name: "Maria".to_string(),
            age: 78,
            gender: Gender::Female,
            icon: "👵".to_string(),
            access_code: "A1B2C3".to_string(),
            help_requested: false,
            created_at: "2024-01-01T08:00:00Z".to_string(),
            updated_at: "2024-01-01T08:00:00Z".to_string(),
        };
        let json = serde_json::to_string(&elder).unwrap();
        assert!(json.contains("\"accessCode\":\"A1B2C3\""));
        assert!(json.contains("\"helpRequested\":false"));
    }

    #[test]
    fn log_entry_uses_interchange_field_names() {
        let entry = IntakeLogEntry {
            id: "log1".to_string(),
            elder_id: "e1".to_string(),
            medication_id: "m1".to_string(),
            medication_name_snapshot: "Losartan".to_string(),
            date: "2024-01-01".to_string(),
            time: "08:05".to_string(),
            status: IntakeStatus::Taken,
        };
        let json = serde_json::to_string(&entry).unwrap();
        assert!(json.contains("\"elderId\":\"e1\""));
        assert!(json.contains("\"medicationNameSnapshot\":\"Losartan\""));
        assert!(json.contains("\"status\":\"taken\""));
    }
}
