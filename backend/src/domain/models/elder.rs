use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared::Gender;
use uuid::Uuid;

/// Length of an elder's access code.
pub const ACCESS_CODE_LEN: usize = 6;

/// Characters an access code may contain.
const ACCESS_CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Domain model for a care recipient tracked by a caregiver.
///
/// The access code is the elder's only credential: a short human-enterable
/// token that must stay unique across all stored elders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Elder {
    pub id: String,
    pub name: String,
    pub age: u32,
    pub gender: Gender,
    pub access_code: String,
    pub help_requested: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Elder {
    /// Generate a unique ID for an elder.
    pub fn generate_id() -> String {
        format!("elder::{}", Uuid::new_v4())
    }

    /// Display icon derived from gender.
    pub fn icon(&self) -> &'static str {
        self.gender.icon()
    }
}

/// Generate a candidate access code: six characters drawn from A–Z and 0–9.
///
/// Uniqueness is not checked here; the registration flow verifies the code
/// against stored elders and regenerates on collision. Entropy comes from a
/// v4 UUID, using only its leading random bytes (bytes 6 and 8 carry fixed
/// version/variant bits and are skipped).
pub fn generate_access_code() -> String {
    let bytes = Uuid::new_v4().into_bytes();
    bytes
        .iter()
        .take(ACCESS_CODE_LEN)
        .map(|b| ACCESS_CODE_ALPHABET[*b as usize % ACCESS_CODE_ALPHABET.len()] as char)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_id_is_unique() {
        let a = Elder::generate_id();
        let b = Elder::generate_id();
        assert!(a.starts_with("elder::"));
        assert_ne!(a, b);
    }

    #[test]
    fn test_access_code_charset_and_length() {
        for _ in 0..100 {
            let code = generate_access_code();
            assert_eq!(code.len(), ACCESS_CODE_LEN);
            assert!(code
                .chars()
                .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
        }
    }

    #[test]
    fn test_icon_follows_gender() {
        let now = Utc::now();
        let elder = Elder {
            id: Elder::generate_id(),
            name: "Maria".to_string(),
            age: 78,
            gender: Gender::Female,
            access_code: generate_access_code(),
            help_requested: false,
            created_at: now,
            updated_at: now,
        };
        assert_eq!(elder.icon(), "👵");
    }
}
