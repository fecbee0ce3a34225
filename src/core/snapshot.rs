use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::Local;
use serde::{Deserialize, Serialize};

use crate::core::fingerprint::FileFingerprint;
use crate::error::{BackupError, ErrorContext, Result};

/// Whether a run consults the previous snapshot or copies everything
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackupMode {
    Incremental,
    Full,
}

impl fmt::Display for BackupMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackupMode::Incremental => write!(f, "incremental"),
            BackupMode::Full => write!(f, "full"),
        }
    }
}

/// The complete persisted state of the most recent run: one fingerprint
/// per relative path, plus audit fields. Immutable once written; every
/// run replaces it wholesale.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub last_backup: String,
    pub source: String,
    pub destination: String,
    pub backup_type: BackupMode,
    pub files: BTreeMap<String, FileFingerprint>,
}

impl Snapshot {
    /// Build the replacement snapshot for a completed run
    pub fn new(
        source: &Path,
        destination: &Path,
        mode: BackupMode,
        files: BTreeMap<String, FileFingerprint>,
    ) -> Self {
        Self {
            last_backup: Local::now().to_rfc3339(),
            source: source.display().to_string(),
            destination: destination.display().to_string(),
            backup_type: mode,
            files,
        }
    }

    /// The "no prior backup" state
    pub fn empty() -> Self {
        Self {
            last_backup: String::new(),
            source: String::new(),
            destination: String::new(),
            backup_type: BackupMode::Incremental,
            files: BTreeMap::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// Loads and saves the snapshot at an explicit, injected location.
pub struct SnapshotStore {
    path: PathBuf,
}

impl SnapshotStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the previous snapshot. Absent, unreadable, or corrupt state
    /// yields the empty snapshot: corruption must never block a fresh
    /// backup, it only forces full-copy behavior.
    pub fn load(&self) -> Snapshot {
        if !self.path.exists() {
            return Snapshot::empty();
        }

        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(_) => return Snapshot::empty(),
        };

        serde_json::from_str(&content).unwrap_or_else(|_| Snapshot::empty())
    }

    /// Persist a snapshot with write-then-rename so a crash mid-save
    /// leaves the previous valid snapshot intact.
    pub fn save(&self, snapshot: &Snapshot) -> Result<()> {
        let content =
            serde_json::to_string_pretty(snapshot).map_err(|e| BackupError::Snapshot {
                operation: "serialize".to_string(),
                reason: e.to_string(),
            })?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).with_io_context(|| {
                    format!("creating snapshot directory {}", parent.display())
                })?;
            }
        }

        let tmp_path = self.path.with_extension("json.tmp");
        fs::write(&tmp_path, content)
            .with_io_context(|| format!("writing snapshot to {}", tmp_path.display()))?;
        fs::rename(&tmp_path, &self.path)
            .with_io_context(|| format!("renaming snapshot into {}", self.path.display()))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn fingerprint(hash: &str) -> FileFingerprint {
        FileFingerprint {
            hash: hash.to_string(),
            size: 10,
            mtime: 1_700_000_000.0,
            mtime_readable: "2023-11-14T22:13:20+00:00".to_string(),
        }
    }

    #[test]
    fn missing_file_loads_as_empty() {
        let tmp = tempdir().unwrap();
        let store = SnapshotStore::new(tmp.path().join("state.json"));
        let snapshot = store.load();
        assert!(snapshot.is_empty());
    }

    #[test]
    fn corrupt_file_loads_as_empty() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("state.json");
        fs::write(&path, "{ not json at all").unwrap();

        let snapshot = SnapshotStore::new(&path).load();
        assert!(snapshot.is_empty());
    }

    #[test]
    fn save_then_load_round_trips() {
        let tmp = tempdir().unwrap();
        let store = SnapshotStore::new(tmp.path().join("state.json"));

        let mut files = BTreeMap::new();
        files.insert("a.txt".to_string(), fingerprint("aa"));
        files.insert("dir/b.txt".to_string(), fingerprint("bb"));
        let snapshot = Snapshot::new(
            Path::new("/src"),
            Path::new("/dst"),
            BackupMode::Incremental,
            files,
        );
        store.save(&snapshot).unwrap();

        let reloaded = store.load();
        assert_eq!(reloaded.backup_type, BackupMode::Incremental);
        assert_eq!(reloaded.source, "/src");
        assert_eq!(reloaded.files, snapshot.files);
    }

    #[test]
    fn save_leaves_no_temp_file_behind() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("state.json");
        let store = SnapshotStore::new(&path);
        store
            .save(&Snapshot::new(
                Path::new("/s"),
                Path::new("/d"),
                BackupMode::Full,
                BTreeMap::new(),
            ))
            .unwrap();

        assert!(path.exists());
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn persisted_shape_matches_wire_format() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("state.json");
        let mut files = BTreeMap::new();
        files.insert("a.txt".to_string(), fingerprint("deadbeef"));
        SnapshotStore::new(&path)
            .save(&Snapshot::new(
                Path::new("/s"),
                Path::new("/d"),
                BackupMode::Full,
                files,
            ))
            .unwrap();

        let raw: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw["backup_type"], "full");
        assert!(raw["last_backup"].is_string());
        assert_eq!(raw["files"]["a.txt"]["hash"], "deadbeef");
        assert_eq!(raw["files"]["a.txt"]["size"], 10);
        assert!(raw["files"]["a.txt"]["mtime"].is_f64());
        assert!(raw["files"]["a.txt"]["mtime_readable"].is_string());
    }
}
