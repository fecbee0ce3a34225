use clap::Parser;
use colored::control as colored_control;

use backup_cli::cli::{handlers, ui, Cli};

fn main() {
    let cli = Cli::parse();

    if cli.no_color {
        colored_control::set_override(false);
    }

    match handlers::run_backup(&cli) {
        Ok(_) => {}
        Err(e) => {
            ui::print_error(&e);
            std::process::exit(1);
        }
    }
}
