use anyhow::Result;
use chrono::{NaiveDate, NaiveTime};
use csv::{Reader, Writer};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::sync::Arc;
use tracing::info;

use super::connection::CsvConnection;
use crate::domain::models::intake_log::{IntakeLogEntry, IntakeStatus};
use crate::storage::traits::IntakeLogStorage;

/// CSV-based intake-log repository. One `intake_log.csv` per elder, rows
/// stored most-recent-first so the file mirrors the display order.
#[derive(Clone)]
pub struct IntakeLogRepository {
    connection: Arc<CsvConnection>,
}

impl IntakeLogRepository {
    pub fn new(connection: Arc<CsvConnection>) -> Self {
        Self { connection }
    }

    /// Read an elder's full log from their CSV file, most recent first.
    fn read_entries(&self, elder_id: &str) -> Result<Vec<IntakeLogEntry>> {
        self.connection.ensure_intake_log_file_exists(elder_id)?;

        let file_path = self.connection.intake_log_file_path(elder_id);
        let file = File::open(&file_path)?;
        let reader = BufReader::new(file);
        let mut csv_reader = Reader::from_reader(reader);

        let mut entries = Vec::new();

        for result in csv_reader.records() {
            let record = result?;

            let date_str = record.get(4).unwrap_or("");
            let date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d")
                .map_err(|e| anyhow::anyhow!("Failed to parse date '{}': {}", date_str, e))?;

            let time_str = record.get(5).unwrap_or("");
            let time = NaiveTime::parse_from_str(time_str, "%H:%M")
                .map_err(|e| anyhow::anyhow!("Failed to parse time '{}': {}", time_str, e))?;

            let status_str = record.get(6).unwrap_or("");
            let status = IntakeStatus::parse(status_str)
                .ok_or_else(|| anyhow::anyhow!("Unknown intake status: {}", status_str))?;

            entries.push(IntakeLogEntry {
                id: record.get(0).unwrap_or("").to_string(),
                elder_id: record.get(1).unwrap_or("").to_string(),
                medication_id: record.get(2).unwrap_or("").to_string(),
                medication_name: record.get(3).unwrap_or("").to_string(),
                date,
                time,
                status,
            });
        }

        Ok(entries)
    }

    /// Write an elder's full log to their CSV file. The rewrite goes
    /// through a temp file and rename so a crash mid-write can't leave a
    /// truncated table.
    fn write_entries(&self, elder_id: &str, entries: &[IntakeLogEntry]) -> Result<()> {
        let file_path = self.connection.intake_log_file_path(elder_id);
        let temp_path = file_path.with_extension("tmp");

        let file = File::create(&temp_path)?;
        let writer = BufWriter::new(file);
        let mut csv_writer = Writer::from_writer(writer);

        csv_writer.write_record([
            "id",
            "elder_id",
            "medication_id",
            "medication_name",
            "date",
            "time",
            "status",
        ])?;

        for entry in entries {
            csv_writer.write_record([
                &entry.id,
                &entry.elder_id,
                &entry.medication_id,
                &entry.medication_name,
                &entry.date.format("%Y-%m-%d").to_string(),
                &entry.time.format("%H:%M").to_string(),
                &entry.status.as_str().to_string(),
            ])?;
        }

        csv_writer.flush()?;
        drop(csv_writer);
        fs::rename(&temp_path, &file_path)?;
        Ok(())
    }
}

impl IntakeLogStorage for IntakeLogRepository {
    fn append_entry(&self, entry: &IntakeLogEntry, cap: usize) -> Result<()> {
        // Prepend-and-truncate is a read-modify-write of the whole file;
        // the connection lock keeps concurrent appends from losing entries
        // or overshooting the cap.
        let _guard = self.connection.exclusive();

        let mut entries = self.read_entries(&entry.elder_id)?;
        entries.insert(0, entry.clone());
        entries.truncate(cap);
        self.write_entries(&entry.elder_id, &entries)?;

        info!(
            "Appended intake log entry {} for elder {} ({} entries retained)",
            entry.id,
            entry.elder_id,
            entries.len()
        );
        Ok(())
    }

    fn list_entries(&self, elder_id: &str) -> Result<Vec<IntakeLogEntry>> {
        self.read_entries(elder_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn setup_test_repo() -> (IntakeLogRepository, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let connection = CsvConnection::new(temp_dir.path()).unwrap();
        let repo = IntakeLogRepository::new(Arc::new(connection));
        (repo, temp_dir)
    }

    fn sample_entry(id: &str, med_id: &str, date: NaiveDate, hour: u32, minute: u32) -> IntakeLogEntry {
        IntakeLogEntry {
            id: id.to_string(),
            elder_id: "elder::1".to_string(),
            medication_id: med_id.to_string(),
            medication_name: "Losartan".to_string(),
            date,
            time: NaiveTime::from_hms_opt(hour, minute, 0).unwrap(),
            status: IntakeStatus::Taken,
        }
    }

    #[test]
    fn test_append_is_most_recent_first() {
        let (repo, _temp_dir) = setup_test_repo();
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();

        repo.append_entry(&sample_entry("log::1", "med::1", date, 8, 0), 30)
            .unwrap();
        repo.append_entry(&sample_entry("log::2", "med::1", date, 12, 0), 30)
            .unwrap();

        let entries = repo.list_entries("elder::1").unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].id, "log::2");
        assert_eq!(entries[1].id, "log::1");
    }

    #[test]
    fn test_append_truncates_to_cap() {
        let (repo, _temp_dir) = setup_test_repo();
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();

        for i in 0..5 {
            let entry = sample_entry(&format!("log::{i}"), "med::1", date, 8, i);
            repo.append_entry(&entry, 3).unwrap();
        }

        let entries = repo.list_entries("elder::1").unwrap();
        assert_eq!(entries.len(), 3);
        // Most recent three, newest first.
        assert_eq!(entries[0].id, "log::4");
        assert_eq!(entries[1].id, "log::3");
        assert_eq!(entries[2].id, "log::2");
    }

    #[test]
    fn test_round_trip_preserves_date_and_time() {
        let (repo, _temp_dir) = setup_test_repo();
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();

        repo.append_entry(&sample_entry("log::1", "med::1", date, 8, 5), 30)
            .unwrap();

        let entries = repo.list_entries("elder::1").unwrap();
        assert_eq!(entries[0].date, date);
        assert_eq!(entries[0].time, NaiveTime::from_hms_opt(8, 5, 0).unwrap());
        assert_eq!(entries[0].status, IntakeStatus::Taken);
    }

    #[test]
    fn test_rewrite_replaces_file_and_leaves_no_temp() {
        let (repo, _temp_dir) = setup_test_repo();
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();

        repo.append_entry(&sample_entry("log::1", "med::1", date, 8, 0), 30)
            .unwrap();
        repo.append_entry(&sample_entry("log::2", "med::1", date, 12, 0), 30)
            .unwrap();

        let file_path = repo.connection.intake_log_file_path("elder::1");
        assert!(file_path.exists());
        assert!(!file_path.with_extension("tmp").exists());
        assert_eq!(repo.list_entries("elder::1").unwrap().len(), 2);
    }

    #[test]
    fn test_empty_log_for_unknown_elder() {
        let (repo, _temp_dir) = setup_test_repo();
        let entries = repo.list_entries("elder::nobody").unwrap();
        assert!(entries.is_empty());
    }
}
