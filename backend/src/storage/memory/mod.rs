//! # In-Memory Storage Module
//!
//! A non-durable backend holding everything in a single mutex-guarded
//! structure. It satisfies the same storage traits as the file backend,
//! which keeps the domain layer honest about backend polymorphism, and it
//! doubles as the fast backend for tests.

use anyhow::Result;
use std::sync::{Arc, Mutex};

use crate::domain::models::elder::Elder;
use crate::domain::models::intake_log::IntakeLogEntry;
use crate::domain::models::medication::Medication;
use crate::storage::traits::{
    DuplicateAccessCode, ElderStorage, IntakeLogStorage, MedicationStorage,
};

#[derive(Default)]
struct MemoryInner {
    elders: Vec<Elder>,
    medications: Vec<Medication>,
    logs: Vec<IntakeLogEntry>,
}

/// In-memory store implementing all three storage traits. Clones share
/// state, mirroring how file repositories share a connection.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<MemoryInner>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MemoryInner> {
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl ElderStorage for MemoryStore {
    fn store_elder(&self, elder: &Elder) -> Result<()> {
        let mut inner = self.lock();
        if inner
            .elders
            .iter()
            .any(|e| e.access_code == elder.access_code)
        {
            return Err(anyhow::Error::new(DuplicateAccessCode(
                elder.access_code.clone(),
            )));
        }
        inner.elders.push(elder.clone());
        Ok(())
    }

    fn get_elder(&self, elder_id: &str) -> Result<Option<Elder>> {
        Ok(self.lock().elders.iter().find(|e| e.id == elder_id).cloned())
    }

    fn find_elder_by_code(&self, access_code: &str) -> Result<Option<Elder>> {
        Ok(self
            .lock()
            .elders
            .iter()
            .find(|e| e.access_code == access_code)
            .cloned())
    }

    fn list_elders(&self) -> Result<Vec<Elder>> {
        Ok(self.lock().elders.clone())
    }

    fn update_elder(&self, elder: &Elder) -> Result<()> {
        let mut inner = self.lock();
        match inner.elders.iter_mut().find(|e| e.id == elder.id) {
            Some(slot) => {
                *slot = elder.clone();
                Ok(())
            }
            None => Err(anyhow::anyhow!("Elder not found for update")),
        }
    }

    fn delete_elder(&self, elder_id: &str) -> Result<()> {
        let mut inner = self.lock();
        inner.elders.retain(|e| e.id != elder_id);
        // Cascade: exclusive ownership means medications and log entries go
        // with the elder.
        inner.medications.retain(|m| m.elder_id != elder_id);
        inner.logs.retain(|l| l.elder_id != elder_id);
        Ok(())
    }
}

impl MedicationStorage for MemoryStore {
    fn store_medication(&self, medication: &Medication) -> Result<()> {
        self.lock().medications.push(medication.clone());
        Ok(())
    }

    fn get_medication(&self, elder_id: &str, medication_id: &str) -> Result<Option<Medication>> {
        Ok(self
            .lock()
            .medications
            .iter()
            .find(|m| m.elder_id == elder_id && m.id == medication_id)
            .cloned())
    }

    fn list_medications(&self, elder_id: &str) -> Result<Vec<Medication>> {
        Ok(self
            .lock()
            .medications
            .iter()
            .filter(|m| m.elder_id == elder_id)
            .cloned()
            .collect())
    }

    fn delete_medication(&self, elder_id: &str, medication_id: &str) -> Result<bool> {
        let mut inner = self.lock();
        let before = inner.medications.len();
        inner
            .medications
            .retain(|m| !(m.elder_id == elder_id && m.id == medication_id));
        Ok(inner.medications.len() < before)
    }
}

impl IntakeLogStorage for MemoryStore {
    fn append_entry(&self, entry: &IntakeLogEntry, cap: usize) -> Result<()> {
        let mut inner = self.lock();

        let mut elder_log: Vec<IntakeLogEntry> = Vec::with_capacity(cap + 1);
        elder_log.push(entry.clone());
        elder_log.extend(
            inner
                .logs
                .iter()
                .filter(|l| l.elder_id == entry.elder_id)
                .cloned(),
        );
        elder_log.truncate(cap);

        inner.logs.retain(|l| l.elder_id != entry.elder_id);
        inner.logs.extend(elder_log);
        Ok(())
    }

    fn list_entries(&self, elder_id: &str) -> Result<Vec<IntakeLogEntry>> {
        Ok(self
            .lock()
            .logs
            .iter()
            .filter(|l| l.elder_id == elder_id)
            .cloned()
            .collect())
    }
}
