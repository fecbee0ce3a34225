pub mod cli;
pub mod config;
pub mod core;
pub mod error;

// Re-exports for convenience
pub use crate::config::BackupConfig;
pub use crate::core::{BackupMode, BackupReport, Reconciler, Snapshot, SnapshotStore};
pub use crate::error::{BackupError, Result};
