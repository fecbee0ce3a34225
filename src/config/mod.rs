pub mod settings;

pub use settings::{BackupConfig, ScanConfig, SnapshotConfig, UiConfig};
