use chrono::{DateTime, NaiveDate, Timelike, Utc};
use std::sync::Arc;
use tracing::info;

use crate::domain::errors::{StoreError, StoreResult};
use crate::domain::models::intake_log::{IntakeLogEntry, IntakeStatus, INTAKE_LOG_CAP};
use crate::storage::csv::{
    CsvConnection, ElderRepository, IntakeLogRepository, MedicationRepository,
};
use crate::storage::traits::{ElderStorage, IntakeLogStorage, MedicationStorage};

/// Service for the intake log: recording doses as taken and answering the
/// taken-today question.
#[derive(Clone)]
pub struct IntakeService {
    elders: Arc<dyn ElderStorage>,
    medications: Arc<dyn MedicationStorage>,
    intake_log: Arc<dyn IntakeLogStorage>,
}

impl IntakeService {
    /// Create an IntakeService over the file backend.
    pub fn new(conn: Arc<CsvConnection>) -> Self {
        Self {
            elders: Arc::new(ElderRepository::new(conn.clone())),
            medications: Arc::new(MedicationRepository::new(conn.clone())),
            intake_log: Arc::new(IntakeLogRepository::new(conn)),
        }
    }

    /// Create an IntakeService over any storage backend.
    pub fn with_storage(
        elders: Arc<dyn ElderStorage>,
        medications: Arc<dyn MedicationStorage>,
        intake_log: Arc<dyn IntakeLogStorage>,
    ) -> Self {
        Self {
            elders,
            medications,
            intake_log,
        }
    }

    /// Record that a medication was taken at `now`. Snapshots the
    /// medication name, prepends to the elder's log, and truncates the log
    /// to its 30-entry cap.
    pub fn record_intake(
        &self,
        elder_id: &str,
        medication_id: &str,
        now: DateTime<Utc>,
    ) -> StoreResult<IntakeLogEntry> {
        if self.elders.get_elder(elder_id)?.is_none() {
            return Err(StoreError::NotFound(format!("Elder not found: {elder_id}")));
        }

        let medication = self
            .medications
            .get_medication(elder_id, medication_id)?
            .ok_or_else(|| {
                StoreError::NotFound(format!("Medication not found: {medication_id}"))
            })?;

        // The log keeps minute precision, matching the display format.
        let time = now
            .time()
            .with_second(0)
            .and_then(|t| t.with_nanosecond(0))
            .unwrap_or_else(|| now.time());

        let entry = IntakeLogEntry {
            id: IntakeLogEntry::generate_id(),
            elder_id: elder_id.to_string(),
            medication_id: medication_id.to_string(),
            medication_name: medication.name.clone(),
            date: now.date_naive(),
            time,
            status: IntakeStatus::Taken,
        };

        self.intake_log.append_entry(&entry, INTAKE_LOG_CAP)?;

        info!(
            "Recorded intake of {} for elder {} at {} {}",
            medication.name, elder_id, entry.date, entry.time
        );
        Ok(entry)
    }

    /// True iff at least one log entry matches this medication and `today`.
    /// Pure query: no side effects, unknown ids simply match nothing.
    pub fn is_taken_today(
        &self,
        elder_id: &str,
        medication_id: &str,
        today: NaiveDate,
    ) -> StoreResult<bool> {
        let entries = self.intake_log.list_entries(elder_id)?;
        Ok(entries
            .iter()
            .any(|e| e.medication_id == medication_id && e.date == today))
    }

    /// An elder's intake history, most recent first, at most 30 entries.
    pub fn list_log(&self, elder_id: &str) -> StoreResult<Vec<IntakeLogEntry>> {
        if self.elders.get_elder(elder_id)?.is_none() {
            return Err(StoreError::NotFound(format!("Elder not found: {elder_id}")));
        }
        Ok(self.intake_log.list_entries(elder_id)?)
    }
}
