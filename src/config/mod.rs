use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

use crate::{
    domain::DEFAULT_OWNER,
    errors::{LedgerError, Result},
    storage::json_backend::{save_json_to_path, DEFAULT_RETENTION},
    utils::{
        paths::{self, ensure_dir},
        DEFAULT_LOG_FILTER,
    },
};

/// Tenant id used until the user picks one. Distinct from the owner of the
/// built-in categories.
pub const DEFAULT_OWNER_ID: &str = "local";

/// Storage key of the ledger blob.
pub const DEFAULT_STATE_KEY: &str = "ledger_state";
/// Storage key of the pending sync queue.
pub const DEFAULT_PENDING_SYNC_KEY: &str = "pending_sync";
/// Storage key of the user's custom categories.
pub const DEFAULT_CATEGORIES_KEY: &str = "user_categories";

/// User-editable runtime settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub owner_id: String,
    pub state_key: String,
    pub pending_sync_key: String,
    pub categories_key: String,
    pub backup_retention: usize,
    pub log_filter: String,
    pub start_online: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            owner_id: DEFAULT_OWNER_ID.into(),
            state_key: DEFAULT_STATE_KEY.into(),
            pending_sync_key: DEFAULT_PENDING_SYNC_KEY.into(),
            categories_key: DEFAULT_CATEGORIES_KEY.into(),
            backup_retention: DEFAULT_RETENTION,
            log_filter: DEFAULT_LOG_FILTER.into(),
            start_online: false,
        }
    }
}

impl Config {
    /// Rejects settings that would make storage keys collide or vanish.
    pub fn validate(&self) -> Result<()> {
        if self.owner_id.trim().is_empty() {
            return Err(LedgerError::Config("owner_id must not be empty".into()));
        }
        if self.owner_id == DEFAULT_OWNER {
            return Err(LedgerError::Config(format!(
                "owner_id `{DEFAULT_OWNER}` is reserved for built-in categories"
            )));
        }
        let keys = [&self.state_key, &self.pending_sync_key, &self.categories_key];
        if keys.iter().any(|key| key.trim().is_empty()) {
            return Err(LedgerError::Config("storage keys must not be empty".into()));
        }
        let mut files: Vec<String> = keys.iter().map(|key| paths::canonical_name(key)).collect();
        files.sort();
        files.dedup();
        if files.len() != keys.len() {
            return Err(LedgerError::Config(
                "storage keys must map to distinct files".into(),
            ));
        }
        if self.backup_retention == 0 {
            return Err(LedgerError::Config("backup_retention must be at least 1".into()));
        }
        Ok(())
    }
}

/// Loads and saves [`Config`] at `<base>/config/config.json`.
pub struct ConfigManager {
    base: PathBuf,
    path: PathBuf,
}

impl ConfigManager {
    pub fn new() -> Result<Self> {
        Self::with_base_dir(paths::app_data_dir())
    }

    pub fn with_base_dir(base: PathBuf) -> Result<Self> {
        ensure_dir(&base)?;
        ensure_dir(&paths::config_dir_in(&base))?;
        Ok(Self {
            path: paths::config_file_in(&base),
            base,
        })
    }

    /// Returns defaults when no file exists yet.
    pub fn load(&self) -> Result<Config> {
        if !self.path.exists() {
            return Ok(Config::default());
        }
        let data = fs::read_to_string(&self.path)?;
        let config: Config = serde_json::from_str(&data)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self, config: &Config) -> Result<()> {
        config.validate()?;
        save_json_to_path(config, &self.path)?;
        tracing::debug!(path = %self.path.display(), "configuration saved");
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn base_dir(&self) -> &Path {
        &self.base
    }
}
