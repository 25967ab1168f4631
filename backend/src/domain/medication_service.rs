use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::info;

use crate::domain::commands::medication::AddMedicationCommand;
use crate::domain::errors::{StoreError, StoreResult};
use crate::domain::models::medication::Medication;
use crate::storage::csv::{CsvConnection, ElderRepository, MedicationRepository};
use crate::storage::traits::{ElderStorage, MedicationStorage};

/// Service for managing the medications a caregiver assigns to an elder.
#[derive(Clone)]
pub struct MedicationService {
    elders: Arc<dyn ElderStorage>,
    medications: Arc<dyn MedicationStorage>,
}

impl MedicationService {
    /// Create a MedicationService over the file backend.
    pub fn new(conn: Arc<CsvConnection>) -> Self {
        Self {
            elders: Arc::new(ElderRepository::new(conn.clone())),
            medications: Arc::new(MedicationRepository::new(conn)),
        }
    }

    /// Create a MedicationService over any storage backend.
    pub fn with_storage(
        elders: Arc<dyn ElderStorage>,
        medications: Arc<dyn MedicationStorage>,
    ) -> Self {
        Self { elders, medications }
    }

    /// Assign a medication to an elder.
    pub fn add_medication(
        &self,
        command: AddMedicationCommand,
        now: DateTime<Utc>,
    ) -> StoreResult<Medication> {
        info!(
            "Adding medication '{}' for elder {}",
            command.name, command.elder_id
        );

        self.require_elder(&command.elder_id)?;

        let name = command.name.trim();
        if name.is_empty() {
            return Err(StoreError::Validation(
                "Medication name cannot be empty".to_string(),
            ));
        }

        let medication = Medication {
            id: Medication::generate_id(),
            elder_id: command.elder_id.clone(),
            name: name.to_string(),
            dosage: command.dosage.trim().to_string(),
            frequency: command.frequency.trim().to_string(),
            created_at: now,
        };

        self.medications.store_medication(&medication)?;

        info!("Added medication {} ({})", medication.name, medication.id);
        Ok(medication)
    }

    /// List an elder's medications in the order they were assigned.
    pub fn list_medications(&self, elder_id: &str) -> StoreResult<Vec<Medication>> {
        self.require_elder(elder_id)?;
        Ok(self.medications.list_medications(elder_id)?)
    }

    /// Get a single medication belonging to an elder.
    pub fn get_medication(
        &self,
        elder_id: &str,
        medication_id: &str,
    ) -> StoreResult<Option<Medication>> {
        Ok(self.medications.get_medication(elder_id, medication_id)?)
    }

    /// Remove a medication from an elder. Historical intake-log entries
    /// keep their name snapshot and are untouched.
    pub fn delete_medication(&self, elder_id: &str, medication_id: &str) -> StoreResult<()> {
        self.require_elder(elder_id)?;

        let deleted = self.medications.delete_medication(elder_id, medication_id)?;
        if !deleted {
            return Err(StoreError::NotFound(format!(
                "Medication not found: {medication_id}"
            )));
        }

        info!("Deleted medication {} for elder {}", medication_id, elder_id);
        Ok(())
    }

    fn require_elder(&self, elder_id: &str) -> StoreResult<()> {
        if self.elders.get_elder(elder_id)?.is_none() {
            return Err(StoreError::NotFound(format!("Elder not found: {elder_id}")));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::commands::elder::RegisterElderCommand;
    use crate::domain::elder_service::ElderService;
    use shared::Gender;
    use tempfile::tempdir;

    fn setup_test() -> (ElderService, MedicationService, tempfile::TempDir) {
        let temp_dir = tempdir().unwrap();
        let conn = Arc::new(CsvConnection::new(temp_dir.path()).unwrap());
        (
            ElderService::new(conn.clone()),
            MedicationService::new(conn),
            temp_dir,
        )
    }

    fn register_elder(elders: &ElderService) -> String {
        elders
            .register_elder(
                RegisterElderCommand {
                    name: "Maria".to_string(),
                    age: 78,
                    gender: Gender::Female,
                },
                Utc::now(),
            )
            .unwrap()
            .id
    }

    fn add_command(elder_id: &str, name: &str) -> AddMedicationCommand {
        AddMedicationCommand {
            elder_id: elder_id.to_string(),
            name: name.to_string(),
            dosage: "50mg".to_string(),
            frequency: "08:00".to_string(),
        }
    }

    #[test]
    fn test_add_and_list_medications() {
        let (elders, meds, _temp_dir) = setup_test();
        let elder_id = register_elder(&elders);

        meds.add_medication(add_command(&elder_id, "Losartan"), Utc::now())
            .unwrap();
        meds.add_medication(add_command(&elder_id, "Aspirin"), Utc::now())
            .unwrap();

        let listed = meds.list_medications(&elder_id).unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].name, "Losartan");
        assert_eq!(listed[1].name, "Aspirin");
        assert_eq!(listed[0].elder_id, elder_id);
    }

    #[test]
    fn test_add_medication_for_unknown_elder_is_not_found() {
        let (_elders, meds, _temp_dir) = setup_test();
        let result = meds.add_medication(add_command("elder::ghost", "Losartan"), Utc::now());
        assert!(matches!(result, Err(StoreError::NotFound(_))));
    }

    #[test]
    fn test_add_medication_with_empty_name_is_rejected() {
        let (elders, meds, _temp_dir) = setup_test();
        let elder_id = register_elder(&elders);

        let result = meds.add_medication(add_command(&elder_id, "   "), Utc::now());
        assert!(matches!(result, Err(StoreError::Validation(_))));
    }

    #[test]
    fn test_delete_medication() {
        let (elders, meds, _temp_dir) = setup_test();
        let elder_id = register_elder(&elders);

        let med = meds
            .add_medication(add_command(&elder_id, "Losartan"), Utc::now())
            .unwrap();

        meds.delete_medication(&elder_id, &med.id).unwrap();
        assert!(meds.list_medications(&elder_id).unwrap().is_empty());

        assert!(matches!(
            meds.delete_medication(&elder_id, &med.id),
            Err(StoreError::NotFound(_))
        ));
    }
}
