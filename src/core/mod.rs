pub mod copy;
pub mod fingerprint;
pub mod reconcile;
pub mod snapshot;

pub use copy::copy_file;
pub use fingerprint::{scan, FileFingerprint, ScanOptions, UNREADABLE_HASH};
pub use reconcile::{BackupReport, Classification, Progress, Reconciler};
pub use snapshot::{BackupMode, Snapshot, SnapshotStore};
