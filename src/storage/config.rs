//! JSON Configuration Management
//!
//! Reads and writes the orchestrator configuration file
//! (`~/.agent-orchestrator/config.json` unless a path is given).

use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::models::settings::{ConfigUpdate, OrchestratorConfig};
use crate::utils::error::{AppError, AppResult};
use crate::utils::paths::{config_path, ensure_dir};

/// Configuration service backed by a JSON file
#[derive(Debug)]
pub struct ConfigService {
    config_path: PathBuf,
    config: OrchestratorConfig,
}

impl ConfigService {
    /// Open the per-user config file, creating it with defaults if missing
    pub fn new() -> AppResult<Self> {
        Self::open(config_path()?)
    }

    /// Open a config file at an explicit path, creating it with defaults if missing
    pub fn open(path: impl Into<PathBuf>) -> AppResult<Self> {
        let config_path = path.into();
        if let Some(parent) = config_path.parent() {
            ensure_dir(parent)?;
        }

        let config = if config_path.exists() {
            Self::load_from_file(&config_path)?
        } else {
            let default_config = OrchestratorConfig::default();
            Self::save_to_file(&config_path, &default_config)?;
            info!("[Config] Created {}", config_path.display());
            default_config
        };

        Ok(Self {
            config_path,
            config,
        })
    }

    fn load_from_file(path: &Path) -> AppResult<OrchestratorConfig> {
        let content = fs::read_to_string(path)?;
        let config: OrchestratorConfig = serde_json::from_str(&content)?;
        config.validate().map_err(AppError::validation)?;
        Ok(config)
    }

    fn save_to_file(path: &Path, config: &OrchestratorConfig) -> AppResult<()> {
        config.validate().map_err(AppError::validation)?;
        let content = serde_json::to_string_pretty(config)?;
        fs::write(path, content)?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.config_path
    }

    pub fn get_config(&self) -> &OrchestratorConfig {
        &self.config
    }

    /// Apply a partial update and persist it.
    ///
    /// An update that fails validation leaves the stored config untouched.
    pub fn update_config(&mut self, update: ConfigUpdate) -> AppResult<OrchestratorConfig> {
        let mut updated = self.config.clone();
        updated.apply_update(update);
        Self::save_to_file(&self.config_path, &updated)?;
        self.config = updated;
        Ok(self.config.clone())
    }

    pub fn save(&self) -> AppResult<()> {
        Self::save_to_file(&self.config_path, &self.config)
    }

    /// Reload configuration from disk
    pub fn reload(&mut self) -> AppResult<()> {
        self.config = Self::load_from_file(&self.config_path)?;
        Ok(())
    }

    /// Reset configuration to defaults
    pub fn reset(&mut self) -> AppResult<()> {
        self.config = OrchestratorConfig::default();
        self.save()
    }
}
