use anyhow::Result;
use csv::{Reader, Writer};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::sync::Arc;
use tracing::info;

use super::connection::CsvConnection;
use crate::domain::models::medication::Medication;
use crate::storage::traits::MedicationStorage;

/// CSV-based medication repository. One `medications.csv` per elder, rows in
/// insertion order.
#[derive(Clone)]
pub struct MedicationRepository {
    connection: Arc<CsvConnection>,
}

impl MedicationRepository {
    pub fn new(connection: Arc<CsvConnection>) -> Self {
        Self { connection }
    }

    /// Read all medications for an elder from their CSV file.
    fn read_medications(&self, elder_id: &str) -> Result<Vec<Medication>> {
        self.connection.ensure_medications_file_exists(elder_id)?;

        let file_path = self.connection.medications_file_path(elder_id);
        let file = File::open(&file_path)?;
        let reader = BufReader::new(file);
        let mut csv_reader = Reader::from_reader(reader);

        let mut medications = Vec::new();

        for result in csv_reader.records() {
            let record = result?;

            let created_at_str = record.get(5).unwrap_or("");
            let created_at = chrono::DateTime::parse_from_rfc3339(created_at_str)
                .map_err(|e| {
                    anyhow::anyhow!("Failed to parse created_at '{}': {}", created_at_str, e)
                })?
                .with_timezone(&chrono::Utc);

            medications.push(Medication {
                id: record.get(0).unwrap_or("").to_string(),
                elder_id: record.get(1).unwrap_or("").to_string(),
                name: record.get(2).unwrap_or("").to_string(),
                dosage: record.get(3).unwrap_or("").to_string(),
                frequency: record.get(4).unwrap_or("").to_string(),
                created_at,
            });
        }

        Ok(medications)
    }

    /// Write all medications for an elder to their CSV file. The rewrite
    /// goes through a temp file and rename so a crash mid-write can't leave
    /// a truncated table.
    fn write_medications(&self, elder_id: &str, medications: &[Medication]) -> Result<()> {
        let file_path = self.connection.medications_file_path(elder_id);
        let temp_path = file_path.with_extension("tmp");

        let file = File::create(&temp_path)?;
        let writer = BufWriter::new(file);
        let mut csv_writer = Writer::from_writer(writer);

        csv_writer.write_record(["id", "elder_id", "name", "dosage", "frequency", "created_at"])?;

        for medication in medications {
            csv_writer.write_record([
                &medication.id,
                &medication.elder_id,
                &medication.name,
                &medication.dosage,
                &medication.frequency,
                &medication.created_at.to_rfc3339(),
            ])?;
        }

        csv_writer.flush()?;
        drop(csv_writer);
        fs::rename(&temp_path, &file_path)?;
        Ok(())
    }
}

impl MedicationStorage for MedicationRepository {
    fn store_medication(&self, medication: &Medication) -> Result<()> {
        let _guard = self.connection.exclusive();

        let mut medications = self.read_medications(&medication.elder_id)?;
        medications.push(medication.clone());
        self.write_medications(&medication.elder_id, &medications)?;

        info!(
            "Stored medication {} ({}) for elder {}",
            medication.name, medication.id, medication.elder_id
        );
        Ok(())
    }

    fn get_medication(&self, elder_id: &str, medication_id: &str) -> Result<Option<Medication>> {
        let medications = self.read_medications(elder_id)?;
        Ok(medications.into_iter().find(|m| m.id == medication_id))
    }

    fn list_medications(&self, elder_id: &str) -> Result<Vec<Medication>> {
        self.read_medications(elder_id)
    }

    fn delete_medication(&self, elder_id: &str, medication_id: &str) -> Result<bool> {
        let _guard = self.connection.exclusive();

        let medications = self.read_medications(elder_id)?;
        let before = medications.len();
        let remaining: Vec<Medication> = medications
            .into_iter()
            .filter(|m| m.id != medication_id)
            .collect();

        if remaining.len() == before {
            return Ok(false);
        }

        self.write_medications(elder_id, &remaining)?;
        info!("Deleted medication {} for elder {}", medication_id, elder_id);
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use tempfile::TempDir;

    fn setup_test_repo() -> (MedicationRepository, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let connection = CsvConnection::new(temp_dir.path()).unwrap();
        let repo = MedicationRepository::new(Arc::new(connection));
        (repo, temp_dir)
    }

    fn sample_medication(id: &str, elder_id: &str, name: &str) -> Medication {
        Medication {
            id: id.to_string(),
            elder_id: elder_id.to_string(),
            name: name.to_string(),
            dosage: "50mg".to_string(),
            frequency: "08:00".to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_store_and_list_preserves_insertion_order() {
        let (repo, _temp_dir) = setup_test_repo();

        repo.store_medication(&sample_medication("med::1", "elder::1", "Losartan"))
            .unwrap();
        repo.store_medication(&sample_medication("med::2", "elder::1", "Aspirin"))
            .unwrap();

        let meds = repo.list_medications("elder::1").unwrap();
        assert_eq!(meds.len(), 2);
        assert_eq!(meds[0].name, "Losartan");
        assert_eq!(meds[1].name, "Aspirin");
    }

    #[test]
    fn test_medications_are_scoped_per_elder() {
        let (repo, _temp_dir) = setup_test_repo();

        repo.store_medication(&sample_medication("med::1", "elder::1", "Losartan"))
            .unwrap();
        repo.store_medication(&sample_medication("med::2", "elder::2", "Aspirin"))
            .unwrap();

        assert_eq!(repo.list_medications("elder::1").unwrap().len(), 1);
        assert_eq!(repo.list_medications("elder::2").unwrap().len(), 1);
        assert!(repo.get_medication("elder::1", "med::2").unwrap().is_none());
    }

    #[test]
    fn test_delete_medication() {
        let (repo, _temp_dir) = setup_test_repo();

        repo.store_medication(&sample_medication("med::1", "elder::1", "Losartan"))
            .unwrap();

        assert!(repo.delete_medication("elder::1", "med::1").unwrap());
        assert!(repo.list_medications("elder::1").unwrap().is_empty());

        // Second delete reports that nothing was found.
        assert!(!repo.delete_medication("elder::1", "med::1").unwrap());
    }

    #[test]
    fn test_rewrite_replaces_file_and_leaves_no_temp() {
        let (repo, _temp_dir) = setup_test_repo();

        repo.store_medication(&sample_medication("med::1", "elder::1", "Losartan"))
            .unwrap();
        repo.delete_medication("elder::1", "med::1").unwrap();

        let file_path = repo.connection.medications_file_path("elder::1");
        assert!(file_path.exists());
        assert!(!file_path.with_extension("tmp").exists());
        assert!(repo.list_medications("elder::1").unwrap().is_empty());
    }

    #[test]
    fn test_round_trip_preserves_free_text_fields() {
        let (repo, _temp_dir) = setup_test_repo();

        let mut med = sample_medication("med::1", "elder::1", "Vitamin D, extra");
        med.dosage = "2 drops, \"morning\"".to_string();
        med.frequency = "after breakfast".to_string();
        repo.store_medication(&med).unwrap();

        let loaded = repo.get_medication("elder::1", "med::1").unwrap().unwrap();
        assert_eq!(loaded.name, "Vitamin D, extra");
        assert_eq!(loaded.dosage, "2 drops, \"morning\"");
        assert_eq!(loaded.frequency, "after breakfast");
    }
}
