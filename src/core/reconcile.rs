use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::core::copy::copy_file;
use crate::core::fingerprint::{scan, FileFingerprint, ScanError, ScanOptions};
use crate::core::snapshot::{BackupMode, Snapshot, SnapshotStore};
use crate::error::{BackupError, ErrorContext, Result};

/// Every current and previous path sorted into exactly one bucket.
/// `deleted` and `unchanged` are informational: deleted files are never
/// removed from the destination, unchanged files are never re-copied.
#[derive(Debug, Default)]
pub struct Classification {
    pub new: Vec<String>,
    pub modified: Vec<String>,
    pub deleted: Vec<String>,
    pub unchanged: Vec<String>,
}

impl Classification {
    /// Compare the current fingerprint map against the previous snapshot.
    /// Membership decides new/deleted; the content hash alone decides
    /// modified vs unchanged on the intersection.
    pub fn classify(
        current: &BTreeMap<String, FileFingerprint>,
        previous: &BTreeMap<String, FileFingerprint>,
    ) -> Self {
        let mut result = Self::default();

        for (path, fingerprint) in current {
            match previous.get(path) {
                None => result.new.push(path.clone()),
                Some(prev) if prev.hash != fingerprint.hash => result.modified.push(path.clone()),
                Some(_) => result.unchanged.push(path.clone()),
            }
        }

        for path in previous.keys() {
            if !current.contains_key(path) {
                result.deleted.push(path.clone());
            }
        }

        result
    }

    /// Full-copy plan: every current file is treated as new
    pub fn full(current: &BTreeMap<String, FileFingerprint>) -> Self {
        Self {
            new: current.keys().cloned().collect(),
            ..Default::default()
        }
    }

    /// Paths selected for copying, in lexicographic order
    pub fn copy_set(&self) -> Vec<String> {
        let mut set: Vec<String> = self
            .new
            .iter()
            .chain(self.modified.iter())
            .cloned()
            .collect();
        set.sort();
        set
    }
}

/// One failed copy attempt
#[derive(Debug, Clone)]
pub struct CopyFailure {
    pub path: String,
    pub reason: String,
}

/// Progress callbacks emitted while a run executes
pub enum Progress<'a> {
    ScanStarted { source: &'a Path },
    ScanFinished { files: usize },
    Classified {
        classification: &'a Classification,
        previous_files: usize,
    },
    CopyStarted { total: usize },
    Copied { path: &'a str },
    CopyFailed { path: &'a str, reason: &'a str },
}

/// Everything the UI needs to render the outcome of one run
#[derive(Debug)]
pub struct BackupReport {
    pub mode: BackupMode,
    pub source: PathBuf,
    pub destination: PathBuf,
    pub scanned: usize,
    pub previous_files: usize,
    pub classification: Classification,
    pub copied: usize,
    pub failures: Vec<CopyFailure>,
    pub scan_errors: Vec<ScanError>,
    pub snapshot_written: bool,
    pub snapshot_error: Option<String>,
    pub elapsed: Duration,
}

impl BackupReport {
    /// True when the scan found no files at all (snapshot write skipped)
    pub fn nothing_scanned(&self) -> bool {
        self.scanned == 0
    }
}

/// Orchestrates one backup run: scan, classify, copy, persist.
pub struct Reconciler {
    store: SnapshotStore,
    options: ScanOptions,
}

impl Reconciler {
    pub fn new(store: SnapshotStore, options: ScanOptions) -> Self {
        Self { store, options }
    }

    pub fn run(&self, source: &Path, destination: &Path, mode: BackupMode) -> Result<BackupReport> {
        self.run_with(source, destination, mode, |_| {})
    }

    /// Run one backup, reporting progress through `observer`.
    ///
    /// Only a missing source aborts. Per-file scan and copy failures are
    /// accumulated into the report, and a failed snapshot save is carried
    /// as a warning because the copies it describes already happened.
    pub fn run_with<F>(
        &self,
        source: &Path,
        destination: &Path,
        mode: BackupMode,
        mut observer: F,
    ) -> Result<BackupReport>
    where
        F: FnMut(Progress),
    {
        let started = Instant::now();

        if !source.is_dir() {
            return Err(BackupError::SourceMissing {
                path: source.to_path_buf(),
            });
        }
        let source = source
            .canonicalize()
            .with_io_context(|| format!("resolving source path {}", source.display()))?;

        fs::create_dir_all(destination)
            .with_io_context(|| format!("creating destination {}", destination.display()))?;
        let destination = destination
            .canonicalize()
            .with_io_context(|| format!("resolving destination path {}", destination.display()))?;

        observer(Progress::ScanStarted { source: &source });
        let outcome = scan(&source, &self.options);
        observer(Progress::ScanFinished {
            files: outcome.files.len(),
        });

        // An empty scan writes nothing: a prior good snapshot survives.
        if outcome.files.is_empty() {
            return Ok(BackupReport {
                mode,
                source,
                destination,
                scanned: 0,
                previous_files: 0,
                classification: Classification::default(),
                copied: 0,
                failures: Vec::new(),
                scan_errors: outcome.errors,
                snapshot_written: false,
                snapshot_error: None,
                elapsed: started.elapsed(),
            });
        }

        let previous = self.store.load();
        let classification = if mode == BackupMode::Incremental && !previous.is_empty() {
            Classification::classify(&outcome.files, &previous.files)
        } else {
            Classification::full(&outcome.files)
        };

        observer(Progress::Classified {
            classification: &classification,
            previous_files: previous.files.len(),
        });

        let copy_set = classification.copy_set();
        observer(Progress::CopyStarted {
            total: copy_set.len(),
        });

        let mut copied = 0;
        let mut failures = Vec::new();
        for path in &copy_set {
            let src_file = source.join(path);
            let dst_file = destination.join(path);
            match copy_file(&src_file, &dst_file) {
                Ok(()) => {
                    copied += 1;
                    observer(Progress::Copied { path: path.as_str() });
                }
                Err(e) => {
                    let reason = e.to_string();
                    observer(Progress::CopyFailed {
                        path: path.as_str(),
                        reason: &reason,
                    });
                    failures.push(CopyFailure {
                        path: path.clone(),
                        reason,
                    });
                }
            }
        }

        // The new baseline covers the full current tree, not just the
        // copied subset, regardless of individual copy failures.
        let snapshot = Snapshot::new(&source, &destination, mode, outcome.files);
        let (snapshot_written, snapshot_error) = match self.store.save(&snapshot) {
            Ok(()) => (true, None),
            Err(e) => (false, Some(e.to_string())),
        };

        Ok(BackupReport {
            mode,
            source,
            destination,
            scanned: snapshot.files.len(),
            previous_files: previous.files.len(),
            classification,
            copied,
            failures,
            scan_errors: outcome.errors,
            snapshot_written,
            snapshot_error,
            elapsed: started.elapsed(),
        })
    }
}
