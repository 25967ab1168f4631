use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{info, warn};

use crate::domain::commands::elder::RegisterElderCommand;
use crate::domain::errors::{StoreError, StoreResult};
use crate::domain::models::elder::{generate_access_code, Elder};
use crate::storage::csv::{CsvConnection, ElderRepository};
use crate::storage::traits::{DuplicateAccessCode, ElderStorage};

/// Upper bound on access-code regeneration after collisions. With a 36^6
/// code space this is effectively unreachable, but the loop must terminate.
pub const MAX_ACCESS_CODE_ATTEMPTS: usize = 10;

/// Service for managing elders: registration, access-code login, and the
/// help-request flag.
#[derive(Clone)]
pub struct ElderService {
    elders: Arc<dyn ElderStorage>,
}

impl ElderService {
    /// Create an ElderService over the file backend.
    pub fn new(conn: Arc<CsvConnection>) -> Self {
        Self {
            elders: Arc::new(ElderRepository::new(conn)),
        }
    }

    /// Create an ElderService over any storage backend.
    pub fn with_storage(elders: Arc<dyn ElderStorage>) -> Self {
        Self { elders }
    }

    /// Register a new elder. Generates a unique six-character access code,
    /// regenerating on collision up to [`MAX_ACCESS_CODE_ATTEMPTS`] times.
    pub fn register_elder(
        &self,
        command: RegisterElderCommand,
        now: DateTime<Utc>,
    ) -> StoreResult<Elder> {
        info!("Registering elder: name={}, age={}", command.name, command.age);

        let name = command.name.trim();
        if name.is_empty() {
            return Err(StoreError::Validation("Elder name cannot be empty".to_string()));
        }
        if name.len() > 100 {
            return Err(StoreError::Validation(
                "Elder name cannot exceed 100 characters".to_string(),
            ));
        }
        if command.age > 120 {
            return Err(StoreError::Validation(
                "Age must be between 0 and 120".to_string(),
            ));
        }

        for attempt in 1..=MAX_ACCESS_CODE_ATTEMPTS {
            let elder = Elder {
                id: Elder::generate_id(),
                name: name.to_string(),
                age: command.age,
                gender: command.gender,
                access_code: generate_access_code(),
                help_requested: false,
                created_at: now,
                updated_at: now,
            };

            match self.elders.store_elder(&elder) {
                Ok(()) => {
                    info!("Registered elder {} with ID {}", elder.name, elder.id);
                    return Ok(elder);
                }
                Err(e) if e.downcast_ref::<DuplicateAccessCode>().is_some() => {
                    warn!(
                        "Access code collision on attempt {}/{}, regenerating",
                        attempt, MAX_ACCESS_CODE_ATTEMPTS
                    );
                }
                Err(e) => return Err(StoreError::Backend(e)),
            }
        }

        Err(StoreError::Conflict(format!(
            "Could not generate a unique access code after {} attempts",
            MAX_ACCESS_CODE_ATTEMPTS
        )))
    }

    /// Get an elder by ID.
    pub fn get_elder(&self, elder_id: &str) -> StoreResult<Option<Elder>> {
        Ok(self.elders.get_elder(elder_id)?)
    }

    /// List all elders in registration order.
    pub fn list_elders(&self) -> StoreResult<Vec<Elder>> {
        let elders = self.elders.list_elders()?;
        info!("Found {} elders", elders.len());
        Ok(elders)
    }

    /// Find an elder by exact access code. A miss is the expected login
    /// failure path and returns `None`, not an error.
    pub fn find_elder_by_code(&self, access_code: &str) -> StoreResult<Option<Elder>> {
        Ok(self.elders.find_elder_by_code(access_code)?)
    }

    /// Raise the elder's help flag. Idempotent: raising an already-raised
    /// flag changes nothing.
    pub fn request_help(&self, elder_id: &str, now: DateTime<Utc>) -> StoreResult<Elder> {
        let mut elder = self.require_elder(elder_id)?;

        if elder.help_requested {
            return Ok(elder);
        }

        elder.help_requested = true;
        elder.updated_at = now;
        self.elders.update_elder(&elder)?;

        info!("Help requested by elder {} ({})", elder.name, elder.id);
        Ok(elder)
    }

    /// Clear the elder's help flag (caregiver acknowledgment). Idempotent.
    pub fn clear_help(&self, elder_id: &str, now: DateTime<Utc>) -> StoreResult<Elder> {
        let mut elder = self.require_elder(elder_id)?;

        if !elder.help_requested {
            return Ok(elder);
        }

        elder.help_requested = false;
        elder.updated_at = now;
        self.elders.update_elder(&elder)?;

        info!("Help request cleared for elder {} ({})", elder.name, elder.id);
        Ok(elder)
    }

    /// Delete an elder and everything it owns (medications, intake log).
    pub fn delete_elder(&self, elder_id: &str) -> StoreResult<()> {
        let elder = self.require_elder(elder_id)?;
        self.elders.delete_elder(elder_id)?;
        info!("Deleted elder {} ({})", elder.name, elder.id);
        Ok(())
    }

    fn require_elder(&self, elder_id: &str) -> StoreResult<Elder> {
        self.elders
            .get_elder(elder_id)?
            .ok_or_else(|| StoreError::NotFound(format!("Elder not found: {elder_id}")))
    }
}
