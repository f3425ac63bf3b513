//! User configuration, resolved once at start-up and passed explicitly into
//! the services that need it.

use std::{
    cmp::Reverse,
    fs,
    path::{Path, PathBuf},
};

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::errors::SubtrackError;
use crate::domain::ReportPolicy;
use crate::utils::paths::{ensure_dir, write_atomic, PathResolver};

const BACKUP_EXTENSION: &str = "json";
const BACKUP_PREFIX: &str = "config";
const BACKUP_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M";
const DEFAULT_BACKUP_RETENTION: usize = 5;

fn default_backup_retention() -> usize {
    DEFAULT_BACKUP_RETENTION
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    pub currency: String,
    /// Project paused subscriptions into reports alongside active ones.
    #[serde(default)]
    pub include_paused: bool,
    /// Year used by the monthly report when none is given; the current year otherwise.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report_year: Option<i32>,
    /// How many configuration backups are kept; older ones are pruned.
    #[serde(default = "default_backup_retention")]
    pub backup_retention: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            currency: "USD".into(),
            include_paused: false,
            report_year: None,
            backup_retention: DEFAULT_BACKUP_RETENTION,
        }
    }
}

impl Config {
    pub fn report_policy(&self) -> ReportPolicy {
        ReportPolicy {
            include_paused: self.include_paused,
        }
    }

    /// Applies a `key value` pair coming from the shell.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), SubtrackError> {
        match key {
            "currency" => {
                let code = value.trim().to_ascii_uppercase();
                if code.len() != 3 || !code.chars().all(|ch| ch.is_ascii_alphabetic()) {
                    return Err(SubtrackError::ConfigError(format!(
                        "currency `{value}` must be a three-letter code"
                    )));
                }
                self.currency = code;
            }
            "include_paused" => {
                self.include_paused = value.trim().parse().map_err(|_| {
                    SubtrackError::ConfigError(format!("include_paused expects true/false, got `{value}`"))
                })?;
            }
            "report_year" => {
                self.report_year = match value.trim() {
                    "" | "none" => None,
                    raw => Some(raw.parse().map_err(|_| {
                        SubtrackError::ConfigError(format!("report_year expects a year, got `{raw}`"))
                    })?),
                };
            }
            "backup_retention" => {
                self.backup_retention = match value.trim().parse() {
                    Ok(count) if count > 0 => count,
                    _ => {
                        return Err(SubtrackError::ConfigError(format!(
                            "backup_retention expects a positive number, got `{value}`"
                        )))
                    }
                };
            }
            other => {
                return Err(SubtrackError::ConfigError(format!(
                    "unknown configuration key `{other}`"
                )))
            }
        }
        Ok(())
    }
}

/// Handles persistence and backup management for [`Config`].
#[derive(Debug, Clone)]
pub struct ConfigManager {
    path: PathBuf,
    backups_dir: PathBuf,
}

impl ConfigManager {
    pub fn new() -> Result<Self, SubtrackError> {
        Self::with_base_dir(PathResolver::base_dir())
    }

    pub fn with_base_dir(base: PathBuf) -> Result<Self, SubtrackError> {
        ensure_dir(&PathResolver::config_dir_in(&base))?;
        let backups_dir = PathResolver::config_backup_dir_in(&base);
        ensure_dir(&backups_dir)?;
        Ok(Self {
            path: PathResolver::config_file_in(&base),
            backups_dir,
        })
    }

    pub fn load(&self) -> Result<Config, SubtrackError> {
        if self.path.exists() {
            let data = fs::read_to_string(&self.path)?;
            serde_json::from_str(&data).map_err(|err| SubtrackError::ConfigError(err.to_string()))
        } else {
            Ok(Config::default())
        }
    }

    pub fn save(&self, config: &Config) -> Result<(), SubtrackError> {
        let json = serde_json::to_string_pretty(config)?;
        write_atomic(&self.path, &json)
    }

    pub fn backup(&self, config: &Config, note: Option<&str>) -> Result<String, SubtrackError> {
        let timestamp = Utc::now().format(BACKUP_TIMESTAMP_FORMAT).to_string();
        let mut name = format!("{BACKUP_PREFIX}_{timestamp}");
        if let Some(label) = sanitize_note(note) {
            name.push('_');
            name.push_str(&label);
        }
        name.push_str(&format!(".{BACKUP_EXTENSION}"));
        let json = serde_json::to_string_pretty(config)?;
        write_atomic(&self.backups_dir.join(&name), &json)?;
        tracing::info!(backup = %name, "configuration backed up");
        self.prune_backups(config.backup_retention)?;
        Ok(name)
    }

    pub fn restore(&self, backup_name: &str) -> Result<Config, SubtrackError> {
        let path = self.backups_dir.join(backup_name);
        if !path.exists() {
            return Err(SubtrackError::ConfigError(format!(
                "configuration backup `{backup_name}` not found"
            )));
        }
        let data = fs::read_to_string(&path)?;
        let config: Config =
            serde_json::from_str(&data).map_err(|err| SubtrackError::ConfigError(err.to_string()))?;
        self.save(&config)?;
        Ok(config)
    }

    /// Backup file names, newest first.
    pub fn list_backups(&self) -> Result<Vec<String>, SubtrackError> {
        if !self.backups_dir.exists() {
            return Ok(Vec::new());
        }
        let mut entries = Vec::new();
        for entry in fs::read_dir(&self.backups_dir)? {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(BACKUP_EXTENSION) {
                continue;
            }
            if let Some(name) = path.file_name().and_then(|name| name.to_str()) {
                entries.push(name.to_string());
            }
        }
        entries.sort_by_key(|name| Reverse(parse_timestamp(name)));
        Ok(entries)
    }

    fn prune_backups(&self, keep: usize) -> Result<(), SubtrackError> {
        for stale in self.list_backups()?.into_iter().skip(keep.max(1)) {
            fs::remove_file(self.backups_dir.join(&stale))?;
            tracing::debug!(backup = %stale, "pruned configuration backup");
        }
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn sanitize_note(note: Option<&str>) -> Option<String> {
    let raw = note?.trim();
    let mut sanitized = String::new();
    for ch in raw.chars() {
        if ch.is_ascii_alphanumeric() {
            sanitized.push(ch.to_ascii_lowercase());
        } else if !sanitized.is_empty() && !sanitized.ends_with('-') {
            sanitized.push('-');
        }
    }
    let trimmed = sanitized.trim_matches('-');
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Extracts the `YYYYMMDD_HHMM` stamp that follows the backup prefix.
fn parse_timestamp(name: &str) -> Option<DateTime<Utc>> {
    let stem = name.strip_suffix(&format!(".{BACKUP_EXTENSION}"))?;
    let rest = stem.strip_prefix(&format!("{BACKUP_PREFIX}_"))?;
    let stamp = rest.get(..13)?;
    NaiveDateTime::parse_from_str(stamp, BACKUP_TIMESTAMP_FORMAT)
        .ok()
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn defaults_when_file_is_missing() {
        let dir = tempdir().unwrap();
        let manager = ConfigManager::with_base_dir(dir.path().to_path_buf()).unwrap();
        assert_eq!(manager.load().unwrap(), Config::default());
    }

    #[test]
    fn set_validates_values() {
        let mut config = Config::default();
        config.set("include_paused", "true").unwrap();
        config.set("currency", "eur").unwrap();
        config.set("report_year", "2024").unwrap();
        assert!(config.report_policy().include_paused);
        assert_eq!(config.currency, "EUR");
        assert_eq!(config.report_year, Some(2024));

        assert!(config.set("include_paused", "maybe").is_err());
        assert!(config.set("currency", "euro").is_err());
        assert!(config.set("backup_retention", "0").is_err());
        assert!(config.set("colour", "blue").is_err());
    }

    #[test]
    fn backup_and_restore_round_trip_through_disk() {
        let dir = tempdir().unwrap();
        let manager = ConfigManager::with_base_dir(dir.path().to_path_buf()).unwrap();
        let mut config = Config::default();
        config.set("currency", "GBP").unwrap();
        let name = manager.backup(&config, Some("pre change")).unwrap();
        assert!(name.ends_with("_pre-change.json"), "{name}");

        manager.save(&Config::default()).unwrap();
        let restored = manager.restore(&name).unwrap();
        assert_eq!(restored.currency, "GBP");
        assert_eq!(manager.load().unwrap().currency, "GBP");
        assert!(manager.restore("config_missing.json").is_err());
    }

    #[test]
    fn backup_names_sort_newest_first() {
        assert!(parse_timestamp("config_20250101_0930_before-upgrade.json").is_some());
        assert!(parse_timestamp("notes.json").is_none());
        assert_eq!(
            sanitize_note(Some("  Before Upgrade! ")),
            Some("before-upgrade".to_string())
        );
    }
}
