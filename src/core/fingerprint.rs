use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use walkdir::{DirEntry, WalkDir};

/// Sentinel hash recorded for files whose content could not be read.
/// It never equals a real digest, so the file is retried on the next run.
pub const UNREADABLE_HASH: &str = "";

const HASH_CHUNK_SIZE: usize = 8192;

/// Content hash plus stat metadata for one file. `hash` is authoritative
/// for change detection; `size` and `mtime` are informational only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileFingerprint {
    pub hash: String,
    pub size: u64,
    pub mtime: f64,
    pub mtime_readable: String,
}

/// Options for walking the source tree
#[derive(Debug, Clone, Default)]
pub struct ScanOptions {
    /// Follow symbolic links (default: symlinks are skipped entirely)
    pub follow_symlinks: bool,
    /// File-name substrings to exclude; matching directories are pruned
    pub exclude: Vec<String>,
}

/// A non-fatal failure recorded while scanning
#[derive(Debug, Clone)]
pub struct ScanError {
    pub path: PathBuf,
    pub message: String,
}

impl fmt::Display for ScanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path.display(), self.message)
    }
}

/// Result of fingerprinting a tree: the path map plus every per-file
/// failure encountered along the way
#[derive(Debug, Default)]
pub struct ScanOutcome {
    pub files: BTreeMap<String, FileFingerprint>,
    pub errors: Vec<ScanError>,
}

/// Walk `root` and fingerprint every regular file under it.
///
/// Per-file failures never abort the scan: a file whose content cannot be
/// read keeps its entry with [`UNREADABLE_HASH`], a file whose metadata
/// cannot be read is skipped, and both are recorded in `errors`. A missing
/// root yields an empty map with one error entry; the caller decides
/// whether that is fatal.
pub fn scan(root: &Path, options: &ScanOptions) -> ScanOutcome {
    let mut outcome = ScanOutcome::default();

    if !root.exists() {
        outcome.errors.push(ScanError {
            path: root.to_path_buf(),
            message: "directory does not exist".to_string(),
        });
        return outcome;
    }

    let walker = WalkDir::new(root)
        .follow_links(options.follow_symlinks)
        .into_iter()
        .filter_entry(|e| !should_exclude(e, &options.exclude));

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                outcome.errors.push(ScanError {
                    path: e.path().unwrap_or(root).to_path_buf(),
                    message: e.to_string(),
                });
                continue;
            }
        };

        if entry.file_type().is_dir() {
            continue;
        }
        // Symlink policy: skip unless explicitly following
        if entry.file_type().is_symlink() {
            continue;
        }

        let metadata = match entry.metadata() {
            Ok(metadata) => metadata,
            Err(e) => {
                outcome.errors.push(ScanError {
                    path: entry.path().to_path_buf(),
                    message: e.to_string(),
                });
                continue;
            }
        };

        let hash = match hash_file(entry.path()) {
            Ok(hash) => hash,
            Err(e) => {
                outcome.errors.push(ScanError {
                    path: entry.path().to_path_buf(),
                    message: e.to_string(),
                });
                UNREADABLE_HASH.to_string()
            }
        };

        let modified = metadata.modified().unwrap_or(UNIX_EPOCH);
        outcome.files.insert(
            relative_key(entry.path(), root),
            FileFingerprint {
                hash,
                size: metadata.len(),
                mtime: epoch_seconds(modified),
                mtime_readable: DateTime::<Local>::from(modified).to_rfc3339(),
            },
        );
    }

    outcome
}

/// Stream a file through SHA-256 in fixed-size chunks
pub fn hash_file(path: &Path) -> std::io::Result<String> {
    let mut file = fs::File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buf = [0u8; HASH_CHUNK_SIZE];

    loop {
        let n = file.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }

    Ok(format!("{:x}", hasher.finalize()))
}

/// Normalize a path relative to `root` into a forward-slash key so
/// snapshots compare identically across platforms
fn relative_key(path: &Path, root: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

fn epoch_seconds(time: SystemTime) -> f64 {
    match time.duration_since(UNIX_EPOCH) {
        Ok(d) => d.as_secs_f64(),
        Err(e) => -e.duration().as_secs_f64(),
    }
}

fn should_exclude(entry: &DirEntry, patterns: &[String]) -> bool {
    let file_name = entry.file_name().to_string_lossy();
    patterns.iter().any(|p| file_name.contains(p.as_str()))
}
