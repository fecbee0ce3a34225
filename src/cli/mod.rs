pub mod commands;
pub mod handlers;
pub mod ui;

pub use commands::Cli;
pub use ui::{print_error, print_warning};
