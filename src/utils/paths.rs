use std::{
    env, fs,
    path::{Path, PathBuf},
};

use dirs::home_dir;

use crate::errors::Result;

const DEFAULT_DIR_NAME: &str = ".ledger_core";
const DATA_DIR: &str = "data";
const BACKUP_DIR: &str = "backups";
const CONFIG_DIR: &str = "config";
const CONFIG_FILE: &str = "config.json";

/// Environment variable that relocates the application directory.
pub const HOME_ENV: &str = "LEDGER_CORE_HOME";

/// Returns the application-specific data directory, defaulting to `~/.ledger_core`.
pub fn app_data_dir() -> PathBuf {
    if let Some(custom) = env::var_os(HOME_ENV) {
        return PathBuf::from(custom);
    }
    home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DEFAULT_DIR_NAME)
}

/// Directory holding one JSON file per stored key.
pub fn data_dir_in(base: &Path) -> PathBuf {
    base.join(DATA_DIR)
}

pub fn backups_dir_in(base: &Path) -> PathBuf {
    base.join(BACKUP_DIR)
}

pub fn config_dir_in(base: &Path) -> PathBuf {
    base.join(CONFIG_DIR)
}

pub fn config_file_in(base: &Path) -> PathBuf {
    config_dir_in(base).join(CONFIG_FILE)
}

pub fn ensure_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)?;
    }
    Ok(())
}

/// Lower-cased file-system safe form of a storage key.
pub fn canonical_name(name: &str) -> String {
    let sanitized: String = name
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| match c {
            'a'..='z' | '0'..='9' | '-' => c,
            _ => '_',
        })
        .collect();
    if sanitized.trim_matches('_').is_empty() {
        "state".into()
    } else {
        sanitized
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_name_replaces_separators() {
        assert_eq!(canonical_name("@ledger/state"), "_ledger_state");
        assert_eq!(canonical_name("  Pending Sync "), "pending_sync");
        assert_eq!(canonical_name("///"), "state");
    }

    #[test]
    fn layout_hangs_off_base() {
        let base = Path::new("/tmp/ledger");
        assert_eq!(config_file_in(base), base.join("config").join("config.json"));
        assert_eq!(data_dir_in(base), base.join("data"));
    }
}
