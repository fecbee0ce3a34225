use std::path::Path;
use std::time::Duration;

use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use crate::core::reconcile::{BackupReport, Classification};
use crate::core::snapshot::BackupMode;
use crate::error::BackupError;

const DIVIDER_WIDTH: usize = 70;

fn divider() -> String {
    "=".repeat(DIVIDER_WIDTH)
}

/// Print the run header: what is backed up where, and how
pub fn print_header(source: &Path, destination: &Path, mode: BackupMode) {
    println!("{}", divider().magenta());
    println!("{}", "INCREMENTAL BACKUP".bold());
    println!("{}", divider().magenta());
    println!("Source:       {}", source.display());
    println!("Destination:  {}", destination.display());
    println!("Mode:         {}", mode.to_string().cyan());
    println!("{}", divider().magenta());
}

/// Print the incremental analysis: counts first, then the classified
/// path lists in sorted order
pub fn print_analysis(classification: &Classification, scanned: usize, previous_files: usize) {
    let to_copy = classification.new.len() + classification.modified.len();

    println!();
    println!("{}", "INCREMENTAL ANALYSIS".bold());
    println!("Files in source:        {}", scanned);
    println!("Files in last snapshot: {}", previous_files);
    println!("New:                    {}", classification.new.len());
    println!("Modified:               {}", classification.modified.len());
    println!("Deleted:                {}", classification.deleted.len());
    println!("Unchanged:              {}", classification.unchanged.len());
    println!("To copy:                {}", to_copy);

    if !classification.new.is_empty() {
        println!("\n{}", "New files:".bold());
        for path in &classification.new {
            println!("  {} {}", "+".green(), path);
        }
    }

    if !classification.modified.is_empty() {
        println!("\n{}", "Modified files:".bold());
        for path in &classification.modified {
            println!("  {} {}", "M".yellow(), path);
        }
    }

    if !classification.deleted.is_empty() {
        println!(
            "\n{}",
            "Deleted from source (kept in destination):".bold()
        );
        for path in &classification.deleted {
            println!("  {} {}", "-".red(), path);
        }
    }
}

pub fn print_full_plan(total: usize) {
    println!("\nFull backup: {} file(s) to copy", total);
}

pub fn print_copy_start(total: usize) {
    println!("\nCopying {} file(s)...", total);
}

pub fn print_copied(path: &str) {
    println!("  {} {}", "copied".green(), path);
}

pub fn print_copy_failed(path: &str, reason: &str) {
    println!("  {} {}: {}", "FAILED".red(), path, reason);
}

pub fn print_no_changes() {
    println!("\n{}", "No changes detected, nothing to copy".green());
}

/// Final summary: counts, snapshot status, accumulated warnings
pub fn print_summary(report: &BackupReport, snapshot_path: &Path, verbose: bool) {
    println!();

    if report.nothing_scanned() {
        println!(
            "{}",
            "No files found in source; snapshot left untouched".yellow()
        );
    } else {
        println!(
            "{} file(s) copied, {} failed",
            report.copied.to_string().green(),
            report.failures.len()
        );

        if report.snapshot_written {
            println!("Snapshot saved to {}", snapshot_path.display());
        } else if let Some(reason) = &report.snapshot_error {
            print_warning(&format!(
                "Snapshot not saved ({}); next run will re-examine every file",
                reason
            ));
        }
    }

    if !report.scan_errors.is_empty() {
        print_warning(&format!(
            "{} file(s) could not be scanned",
            report.scan_errors.len()
        ));
        if verbose {
            for error in &report.scan_errors {
                println!("    {}", error);
            }
        }
    }

    if verbose {
        for failure in &report.failures {
            println!("    {}: {}", failure.path, failure.reason);
        }
    }

    println!(
        "Backup completed in {}",
        format_elapsed(report.elapsed).cyan()
    );
}

pub fn print_warning(message: &str) {
    println!("{} {}", "warning:".yellow().bold(), message);
}

pub fn print_error(error: &BackupError) {
    eprintln!("{} {}", "error:".red().bold(), error);
}

/// Spinner shown while the source tree is being fingerprinted
pub fn scan_spinner(message: String) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.enable_steady_tick(Duration::from_millis(80));
    pb.set_style(
        ProgressStyle::with_template("{spinner:.green} {wide_msg}")
            .expect("valid spinner template"),
    );
    pb.set_message(message);
    pb
}

fn format_elapsed(elapsed: Duration) -> String {
    format!("{:.2}s", elapsed.as_secs_f64())
}
