use anyhow::Result;
use serde::{Deserialize, Serialize};
use shared::Gender;
use std::fs;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::connection::CsvConnection;
use crate::domain::models::elder::Elder;
use crate::storage::traits::{DuplicateAccessCode, ElderStorage};

/// Intermediate struct for YAML serialization with string-typed fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct YamlElder {
    id: String,
    name: String,
    age: u32,
    gender: String,
    access_code: String,
    help_requested: bool,
    created_at: String,
    updated_at: String,
}

/// File-backed elder repository using per-elder directory discovery.
#[derive(Clone)]
pub struct ElderRepository {
    connection: Arc<CsvConnection>,
}

impl ElderRepository {
    pub fn new(connection: Arc<CsvConnection>) -> Self {
        Self { connection }
    }

    /// Discover all elders by scanning directories under the base directory.
    fn discover_elders(&self) -> Result<Vec<Elder>> {
        let base_dir = self.connection.base_directory();

        if !base_dir.exists() {
            debug!("Base directory doesn't exist, returning empty elder list");
            return Ok(Vec::new());
        }

        let mut elders = Vec::new();

        for entry in fs::read_dir(base_dir)? {
            let entry = entry?;
            let path = entry.path();

            if !path.is_dir() {
                continue;
            }

            let yaml_path = path.join("elder.yaml");
            if !yaml_path.exists() {
                debug!("Directory {:?} doesn't contain an elder record", path);
                continue;
            }

            match self.load_elder_from_yaml(&yaml_path) {
                Ok(elder) => elders.push(elder),
                Err(e) => warn!("Error loading elder from {:?}: {}", yaml_path, e),
            }
        }

        // Directory scan order is arbitrary; registration time restores
        // insertion order.
        elders.sort_by(|a, b| (a.created_at, &a.id).cmp(&(b.created_at, &b.id)));

        debug!("Discovered {} elders", elders.len());
        Ok(elders)
    }

    fn load_elder_from_yaml(&self, yaml_path: &std::path::Path) -> Result<Elder> {
        let yaml_content = fs::read_to_string(yaml_path)?;
        let yaml_elder: YamlElder = serde_yaml::from_str(&yaml_content)?;

        let gender = match yaml_elder.gender.as_str() {
            "M" => Gender::Male,
            "F" => Gender::Female,
            other => return Err(anyhow::anyhow!("Unknown gender code: {}", other)),
        };

        Ok(Elder {
            id: yaml_elder.id,
            name: yaml_elder.name,
            age: yaml_elder.age,
            gender,
            access_code: yaml_elder.access_code,
            help_requested: yaml_elder.help_requested,
            created_at: chrono::DateTime::parse_from_rfc3339(&yaml_elder.created_at)
                .map_err(|e| anyhow::anyhow!("Failed to parse created_at: {}", e))?
                .with_timezone(&chrono::Utc),
            updated_at: chrono::DateTime::parse_from_rfc3339(&yaml_elder.updated_at)
                .map_err(|e| anyhow::anyhow!("Failed to parse updated_at: {}", e))?
                .with_timezone(&chrono::Utc),
        })
    }

    /// Save an elder's YAML record, creating the directory if needed. The
    /// write goes through a temp file and rename so readers never see a
    /// half-written record.
    fn save_elder(&self, elder: &Elder) -> Result<()> {
        let elder_dir = self.connection.elder_directory(&elder.id);
        if !elder_dir.exists() {
            fs::create_dir_all(&elder_dir)?;
            info!("Created elder directory: {:?}", elder_dir);
        }

        let yaml_elder = YamlElder {
            id: elder.id.clone(),
            name: elder.name.clone(),
            age: elder.age,
            gender: match elder.gender {
                Gender::Male => "M".to_string(),
                Gender::Female => "F".to_string(),
            },
            access_code: elder.access_code.clone(),
            help_requested: elder.help_requested,
            created_at: elder.created_at.to_rfc3339(),
            updated_at: elder.updated_at.to_rfc3339(),
        };

        let yaml_path = self.connection.elder_yaml_path(&elder.id);
        let yaml_content = serde_yaml::to_string(&yaml_elder)?;

        let temp_path = yaml_path.with_extension("tmp");
        fs::write(&temp_path, yaml_content)?;
        fs::rename(&temp_path, &yaml_path)?;

        Ok(())
    }
}

impl ElderStorage for ElderRepository {
    fn store_elder(&self, elder: &Elder) -> Result<()> {
        // Uniqueness check and insert under one lock so two registrations
        // can't both claim the same code.
        let _guard = self.connection.exclusive();

        let elders = self.discover_elders()?;
        if elders.iter().any(|e| e.access_code == elder.access_code) {
            return Err(anyhow::Error::new(DuplicateAccessCode(
                elder.access_code.clone(),
            )));
        }

        self.save_elder(elder)?;
        info!("Stored elder {} ({})", elder.name, elder.id);
        Ok(())
    }

    fn get_elder(&self, elder_id: &str) -> Result<Option<Elder>> {
        let yaml_path = self.connection.elder_yaml_path(elder_id);
        if !yaml_path.exists() {
            return Ok(None);
        }
        Ok(Some(self.load_elder_from_yaml(&yaml_path)?))
    }

    fn find_elder_by_code(&self, access_code: &str) -> Result<Option<Elder>> {
        let elders = self.discover_elders()?;
        Ok(elders.into_iter().find(|e| e.access_code == access_code))
    }

    fn list_elders(&self) -> Result<Vec<Elder>> {
        self.discover_elders()
    }

    fn update_elder(&self, elder: &Elder) -> Result<()> {
        let _guard = self.connection.exclusive();

        let yaml_path = self.connection.elder_yaml_path(&elder.id);
        if !yaml_path.exists() {
            warn!("Attempted to update a non-existent elder: {}", elder.id);
            return Err(anyhow::anyhow!("Elder not found for update"));
        }

        self.save_elder(elder)
    }

    fn delete_elder(&self, elder_id: &str) -> Result<()> {
        let _guard = self.connection.exclusive();

        let elder_dir = self.connection.elder_directory(elder_id);
        if elder_dir.exists() {
            // The directory holds the elder record, medications, and log:
            // removing it is the cascade.
            fs::remove_dir_all(&elder_dir)?;
            info!("Deleted elder directory: {:?}", elder_dir);
        } else {
            warn!("Attempted to delete a non-existent elder: {}", elder_id);
        }
        Ok(())
    }
}
