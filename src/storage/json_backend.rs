use std::{
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};

use chrono::Utc;
use serde::Serialize;

use super::KeyValueStore;
use crate::{
    errors::{LedgerError, Result},
    utils::paths::{self, canonical_name, ensure_dir},
};

const FILE_EXTENSION: &str = "json";
const BACKUP_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S%3f";
const TMP_SUFFIX: &str = "tmp";

/// Number of backups kept per key when the caller does not say otherwise.
pub const DEFAULT_RETENTION: usize = 5;

/// Stores every key as `<root>/data/<canonical key>.json`.
///
/// Writes go to a sibling temporary file that is renamed over the target, so
/// a crash leaves either the previous or the new value on disk. Backups live
/// under `<root>/backups/<canonical key>/`.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    root: PathBuf,
    data_dir: PathBuf,
    backups_dir: PathBuf,
    retention: usize,
}

impl JsonFileStore {
    pub fn new(root: impl Into<PathBuf>, retention: Option<usize>) -> Result<Self> {
        let root = root.into();
        ensure_dir(&root)?;
        let data_dir = paths::data_dir_in(&root);
        let backups_dir = paths::backups_dir_in(&root);
        ensure_dir(&data_dir)?;
        ensure_dir(&backups_dir)?;
        Ok(Self {
            root,
            data_dir,
            backups_dir,
            retention: retention.unwrap_or(DEFAULT_RETENTION).max(1),
        })
    }

    /// Opens the store under the application data directory.
    pub fn open_default(retention: Option<usize>) -> Result<Self> {
        Self::new(paths::app_data_dir(), retention)
    }

    pub fn base_dir(&self) -> &Path {
        &self.root
    }

    pub fn key_path(&self, key: &str) -> PathBuf {
        self.data_dir
            .join(format!("{}.{}", canonical_name(key), FILE_EXTENSION))
    }

    fn backup_dir(&self, key: &str) -> PathBuf {
        self.backups_dir.join(canonical_name(key))
    }

    pub fn backup_path(&self, key: &str, backup_name: &str) -> PathBuf {
        self.backup_dir(key).join(backup_name)
    }

    /// Copies the current value of `key` into a timestamped backup file and
    /// prunes old backups beyond the retention limit. Returns the file name.
    pub fn backup(&self, key: &str, note: Option<&str>) -> Result<String> {
        let source = self.key_path(key);
        if !source.exists() {
            return Err(LedgerError::Storage(format!(
                "nothing stored under `{}` to back up",
                key
            )));
        }
        let dir = self.backup_dir(key);
        ensure_dir(&dir)?;

        let timestamp = Utc::now().format(BACKUP_TIMESTAMP_FORMAT).to_string();
        let mut stem = format!("{}_{}", canonical_name(key), timestamp);
        if let Some(label) = sanitize_backup_note(note) {
            stem.push('_');
            stem.push_str(&label);
        }
        let mut file_name = format!("{}.{}", stem, FILE_EXTENSION);
        let mut attempt = 1;
        while dir.join(&file_name).exists() {
            file_name = format!("{}.{}.{}", stem, attempt, FILE_EXTENSION);
            attempt += 1;
        }

        fs::copy(&source, dir.join(&file_name))?;
        self.prune_backups(key)?;
        tracing::info!(key, backup = %file_name, "backup written");
        Ok(file_name)
    }

    /// Backup file names for `key`, newest first.
    pub fn list_backups(&self, key: &str) -> Result<Vec<String>> {
        let dir = self.backup_dir(key);
        if !dir.exists() {
            return Ok(Vec::new());
        }
        let prefix = format!("{}_", canonical_name(key));
        let mut entries = Vec::new();
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(FILE_EXTENSION) {
                continue;
            }
            let Some(name) = path.file_name().and_then(|name| name.to_str()) else {
                continue;
            };
            entries.push(name.to_string());
        }
        entries.sort_by(|a, b| {
            backup_stamp(b, &prefix)
                .cmp(&backup_stamp(a, &prefix))
                .then_with(|| backup_counter(b).cmp(&backup_counter(a)))
                .then_with(|| b.cmp(a))
        });
        Ok(entries)
    }

    /// Overwrites the live value of `key` with a backup and returns it.
    pub fn restore_backup(&self, key: &str, backup_name: &str) -> Result<String> {
        let backup = self.backup_path(key, backup_name);
        if !backup.exists() {
            return Err(LedgerError::Storage(format!(
                "backup `{}` not found",
                backup_name
            )));
        }
        let data = fs::read_to_string(&backup)?;
        self.set(key, &data)?;
        tracing::info!(key, backup = backup_name, "backup restored");
        Ok(data)
    }

    fn prune_backups(&self, key: &str) -> Result<()> {
        let backups = self.list_backups(key)?;
        for entry in backups.iter().skip(self.retention) {
            let path = self.backup_path(key, entry);
            if let Err(err) = fs::remove_file(&path) {
                tracing::warn!(path = %path.display(), error = %err, "failed to prune backup");
            }
        }
        Ok(())
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.key_path(key);
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(fs::read_to_string(path)?))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        write_atomic(&self.key_path(key), value)
    }

    fn remove(&self, key: &str) -> Result<()> {
        let path = self.key_path(key);
        if path.exists() {
            fs::remove_file(path)?;
        }
        Ok(())
    }
}

/// Serializes `value` to a standalone JSON file (exports, the config file).
pub fn save_json_to_path<T: Serialize>(value: &T, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    write_atomic(path, &json)
}

fn write_atomic(path: &Path, data: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    let tmp = tmp_path(path);
    let mut file = File::create(&tmp)?;
    file.write_all(data.as_bytes())?;
    file.sync_all()?;
    fs::rename(&tmp, path)?;
    Ok(())
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.{}", existing, TMP_SUFFIX),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

/// `YYYYMMDD_HHMMSSmmm` portion of a backup name, if it has one.
fn backup_stamp<'a>(name: &'a str, prefix: &str) -> Option<&'a str> {
    let rest = name.strip_prefix(prefix)?;
    let stamp = rest.get(..18)?;
    let (date, time) = stamp.split_once('_')?;
    (is_digits(date, 8) && is_digits(time, 9)).then_some(stamp)
}

/// Collision counter of a backup name: `stem.N.json` is `N`, `stem.json` is 0.
/// Notes are sanitized to `[a-z0-9-]`, so a second `.` only ever comes from
/// the counter.
fn backup_counter(name: &str) -> u32 {
    name.strip_suffix(FILE_EXTENSION)
        .and_then(|rest| rest.strip_suffix('.'))
        .and_then(|stem| stem.rsplit_once('.'))
        .and_then(|(_, counter)| counter.parse().ok())
        .unwrap_or(0)
}

fn is_digits(value: &str, len: usize) -> bool {
    value.len() == len && value.chars().all(|c| c.is_ascii_digit())
}

pub(crate) fn sanitize_backup_note(note: Option<&str>) -> Option<String> {
    let raw = note?.trim();
    if raw.is_empty() {
        return None;
    }
    let mut sanitized = String::new();
    let mut last_dash = false;
    for ch in raw.chars() {
        if ch.is_ascii_alphanumeric() {
            sanitized.push(ch.to_ascii_lowercase());
            last_dash = false;
        } else if (ch.is_whitespace() || matches!(ch, '-' | '.' | '_'))
            && !sanitized.is_empty()
            && !last_dash
        {
            sanitized.push('-');
            last_dash = true;
        }
    }
    let trimmed = sanitized.trim_matches('-').to_string();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed)
    }
}
