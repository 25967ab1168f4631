use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::info;

/// Header of the per-elder medications CSV file.
pub const MEDICATIONS_HEADER: &str = "id,elder_id,name,dosage,frequency,created_at\n";

/// Header of the per-elder intake-log CSV file.
pub const INTAKE_LOG_HEADER: &str = "id,elder_id,medication_id,medication_name,date,time,status\n";

/// CsvConnection manages file paths and ensures data files exist for each
/// elder. Every elder owns one directory under the base directory:
///
/// ```text
/// <base>/<elder_dir>/elder.yaml
/// <base>/<elder_dir>/medications.csv
/// <base>/<elder_dir>/intake_log.csv
/// ```
///
/// Deleting the directory therefore cascades over everything the elder owns.
#[derive(Clone)]
pub struct CsvConnection {
    base_directory: PathBuf,
    /// Serializes read-modify-write sequences (register, intake append)
    /// within this process. Repositories sharing a connection share the
    /// lock.
    write_lock: Arc<Mutex<()>>,
}

impl CsvConnection {
    /// Create a new connection with a base directory, creating it if needed.
    pub fn new<P: AsRef<Path>>(base_directory: P) -> Result<Self> {
        let base_path = base_directory.as_ref().to_path_buf();

        if !base_path.exists() {
            fs::create_dir_all(&base_path)?;
        }

        Ok(Self {
            base_directory: base_path,
            write_lock: Arc::new(Mutex::new(())),
        })
    }

    /// Create a connection in the default data directory: `ZELO_DATA_DIR`
    /// when set, otherwise `~/Documents/Zelo`.
    pub fn new_default() -> Result<Self> {
        if let Ok(dir) = std::env::var("ZELO_DATA_DIR") {
            info!("Using data directory from ZELO_DATA_DIR: {}", dir);
            return Self::new(dir);
        }

        let home_dir = std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .map_err(|_| anyhow::anyhow!("Could not determine home directory"))?;

        let data_dir = PathBuf::from(home_dir).join("Documents").join("Zelo");
        info!("Using default data directory: {}", data_dir.display());
        Self::new(data_dir)
    }

    /// Acquire the per-process write lock. Held for the duration of a
    /// compound read-modify-write sequence.
    pub fn exclusive(&self) -> MutexGuard<'_, ()> {
        // Lock poisoning only happens if a holder panicked; the data files
        // themselves are still consistent because writes are atomic renames.
        self.write_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Filesystem-safe directory name derived from an elder ID.
    pub fn elder_directory_name(elder_id: &str) -> String {
        elder_id
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
            .collect()
    }

    /// Directory holding all of one elder's data.
    pub fn elder_directory(&self, elder_id: &str) -> PathBuf {
        self.base_directory
            .join(Self::elder_directory_name(elder_id))
    }

    /// Path to an elder's YAML record.
    pub fn elder_yaml_path(&self, elder_id: &str) -> PathBuf {
        self.elder_directory(elder_id).join("elder.yaml")
    }

    /// Path to an elder's medications file.
    pub fn medications_file_path(&self, elder_id: &str) -> PathBuf {
        self.elder_directory(elder_id).join("medications.csv")
    }

    /// Path to an elder's intake-log file.
    pub fn intake_log_file_path(&self, elder_id: &str) -> PathBuf {
        self.elder_directory(elder_id).join("intake_log.csv")
    }

    /// Ensure the medications CSV exists with its header.
    pub fn ensure_medications_file_exists(&self, elder_id: &str) -> Result<()> {
        self.ensure_file_exists(self.medications_file_path(elder_id), MEDICATIONS_HEADER)
    }

    /// Ensure the intake-log CSV exists with its header.
    pub fn ensure_intake_log_file_exists(&self, elder_id: &str) -> Result<()> {
        self.ensure_file_exists(self.intake_log_file_path(elder_id), INTAKE_LOG_HEADER)
    }

    fn ensure_file_exists(&self, file_path: PathBuf, header: &str) -> Result<()> {
        if let Some(dir) = file_path.parent() {
            if !dir.exists() {
                fs::create_dir_all(dir)?;
            }
        }

        if !file_path.exists() {
            fs::write(&file_path, header)?;
        }

        Ok(())
    }

    /// Get the base directory path.
    pub fn base_directory(&self) -> &Path {
        &self.base_directory
    }
}
