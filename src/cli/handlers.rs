use crate::cli::commands::Cli;
use crate::cli::ui;
use crate::config::BackupConfig;
use crate::core::fingerprint::ScanOptions;
use crate::core::reconcile::{BackupReport, Progress, Reconciler};
use crate::core::snapshot::{BackupMode, SnapshotStore};
use crate::error::Result;

/// Wire CLI arguments and configuration into one reconciler run and
/// render its progress and final report.
pub fn run_backup(cli: &Cli) -> Result<BackupReport> {
    let config = match BackupConfig::load_global() {
        Ok(config) => config,
        Err(e) => {
            ui::print_warning(&format!("{}; using defaults", e));
            BackupConfig::default()
        }
    };

    let snapshot_path = match &cli.snapshot_file {
        Some(path) => path.clone(),
        None => config.snapshot_path()?,
    };

    let mut exclude = config.scan.exclude.clone();
    exclude.extend(cli.exclude.iter().cloned());
    let options = ScanOptions {
        follow_symlinks: cli.follow_symlinks || config.scan.follow_symlinks,
        exclude,
    };

    let mode = if cli.full {
        BackupMode::Full
    } else {
        BackupMode::Incremental
    };

    ui::print_header(&cli.source, &cli.destination, mode);

    let show_spinner = config.ui.progress_bars && !cli.verbose;
    let mut spinner = None;

    let reconciler = Reconciler::new(SnapshotStore::new(&snapshot_path), options);
    let report = reconciler.run_with(&cli.source, &cli.destination, mode, |progress| {
        match progress {
            Progress::ScanStarted { source } => {
                if show_spinner {
                    spinner = Some(ui::scan_spinner(format!("Scanning {}...", source.display())));
                } else {
                    println!("\nScanning {}...", source.display());
                }
            }
            Progress::ScanFinished { files } => {
                let message = format!("{} file(s) scanned", files);
                match spinner.take() {
                    Some(pb) => pb.finish_with_message(message),
                    None => println!("{}", message),
                }
            }
            Progress::Classified {
                classification,
                previous_files,
            } => {
                if mode == BackupMode::Incremental && previous_files > 0 {
                    ui::print_analysis(
                        classification,
                        classification.new.len()
                            + classification.modified.len()
                            + classification.unchanged.len(),
                        previous_files,
                    );
                } else {
                    ui::print_full_plan(classification.new.len());
                }
            }
            Progress::CopyStarted { total } => {
                if total > 0 {
                    ui::print_copy_start(total);
                } else {
                    ui::print_no_changes();
                }
            }
            Progress::Copied { path } => ui::print_copied(path),
            Progress::CopyFailed { path, reason } => ui::print_copy_failed(path, reason),
        }
    });

    // Drop the spinner if the run aborted mid-scan
    if let Some(pb) = spinner.take() {
        pb.finish_and_clear();
    }

    let report = report?;
    ui::print_summary(&report, &snapshot_path, cli.verbose);
    Ok(report)
}
