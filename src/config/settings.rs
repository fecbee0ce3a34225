use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{BackupError, ErrorContext, Result};

/// File name of the persisted snapshot, placed in the home directory by
/// default so it never lives inside the source or destination tree.
pub const DEFAULT_SNAPSHOT_FILE: &str = ".backup_metadata.json";

/// Main configuration, stored at `~/.backup/config.toml`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BackupConfig {
    #[serde(default)]
    pub snapshot: SnapshotConfig,
    #[serde(default)]
    pub scan: ScanConfig,
    #[serde(default)]
    pub ui: UiConfig,
}

/// Where the previous-run snapshot is persisted
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SnapshotConfig {
    /// Snapshot file path (defaults to ~/.backup_metadata.json)
    pub path: Option<PathBuf>,
}

/// Fingerprinting options
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Follow symbolic links while walking the source tree
    pub follow_symlinks: bool,
    /// File-name substrings to exclude from the scan
    pub exclude: Vec<String>,
}

/// Display configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    /// Whether to show colored output
    pub colored: bool,
    /// Whether to show progress spinners
    pub progress_bars: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            follow_symlinks: false,
            exclude: Vec::new(),
        }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            colored: std::env::var("NO_COLOR").is_err(),
            progress_bars: true,
        }
    }
}

impl BackupConfig {
    /// Load configuration from file or fall back to defaults
    pub fn load<P: AsRef<Path>>(config_path: P) -> Result<Self> {
        let config_path = config_path.as_ref();

        if config_path.exists() {
            let content = fs::read_to_string(config_path)
                .with_io_context(|| format!("reading config file {}", config_path.display()))?;

            toml::from_str(&content).map_err(|e| BackupError::Config {
                message: format!("Invalid TOML: {}", e),
                path: Some(config_path.to_path_buf()),
            })
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to file
    pub fn save<P: AsRef<Path>>(&self, config_path: P) -> Result<()> {
        let config_path = config_path.as_ref();

        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)
                .with_io_context(|| format!("creating config directory {}", parent.display()))?;
        }

        let content = toml::to_string_pretty(self).map_err(|e| BackupError::Config {
            message: format!("Failed to serialize config: {}", e),
            path: Some(config_path.to_path_buf()),
        })?;

        fs::write(config_path, content)
            .with_io_context(|| format!("writing config file {}", config_path.display()))?;

        Ok(())
    }

    /// Load the global configuration (~/.backup/config.toml)
    pub fn load_global() -> Result<Self> {
        Self::load(Self::global_config_path()?)
    }

    /// Get global configuration file path
    pub fn global_config_path() -> Result<PathBuf> {
        Ok(home_dir()?.join(".backup").join("config.toml"))
    }

    /// Resolve the snapshot file location: configured path, or the default
    /// file in the home directory
    pub fn snapshot_path(&self) -> Result<PathBuf> {
        if let Some(path) = &self.snapshot.path {
            Ok(path.clone())
        } else {
            Ok(home_dir()?.join(DEFAULT_SNAPSHOT_FILE))
        }
    }
}

fn home_dir() -> Result<PathBuf> {
    let home = std::env::var("HOME").map_err(|_| BackupError::Config {
        message: "HOME environment variable not set".to_string(),
        path: None,
    })?;
    Ok(PathBuf::from(home))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_config_file_yields_defaults() {
        let tmp = tempdir().unwrap();
        let config = BackupConfig::load(tmp.path().join("config.toml")).unwrap();
        assert!(config.snapshot.path.is_none());
        assert!(!config.scan.follow_symlinks);
        assert!(config.scan.exclude.is_empty());
    }

    #[test]
    fn config_round_trip() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("sub").join("config.toml");

        let mut config = BackupConfig::default();
        config.snapshot.path = Some(PathBuf::from("/var/backups/state.json"));
        config.scan.exclude = vec![".git".to_string(), "node_modules".to_string()];
        config.save(&path).unwrap();

        let reloaded = BackupConfig::load(&path).unwrap();
        assert_eq!(
            reloaded.snapshot.path,
            Some(PathBuf::from("/var/backups/state.json"))
        );
        assert_eq!(reloaded.scan.exclude.len(), 2);
    }

    #[test]
    fn invalid_toml_is_a_config_error() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("config.toml");
        std::fs::write(&path, "snapshot = [not toml").unwrap();

        let err = BackupConfig::load(&path).unwrap_err();
        assert!(matches!(err, BackupError::Config { .. }));
    }

    #[test]
    fn explicit_snapshot_path_wins_over_default() {
        let mut config = BackupConfig::default();
        config.snapshot.path = Some(PathBuf::from("/tmp/snap.json"));
        assert_eq!(
            config.snapshot_path().unwrap(),
            PathBuf::from("/tmp/snap.json")
        );
    }
}
