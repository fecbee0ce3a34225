use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "backup",
    version,
    about = "Incremental directory backup (content-hash change detection)"
)]
pub struct Cli {
    /// Directory to back up
    pub source: PathBuf,

    /// Directory to copy changed files into
    pub destination: PathBuf,

    /// Copy every file regardless of the previous snapshot
    #[arg(long)]
    pub full: bool,

    /// Snapshot file location (defaults to ~/.backup_metadata.json)
    #[arg(long, value_name = "PATH")]
    pub snapshot_file: Option<PathBuf>,

    /// Follow symbolic links while scanning (skipped by default)
    #[arg(long)]
    pub follow_symlinks: bool,

    /// Exclude files and directories whose name contains PATTERN (repeatable)
    #[arg(long, value_name = "PATTERN")]
    pub exclude: Vec<String>,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Print scan and copy error details
    #[arg(short, long)]
    pub verbose: bool,
}
