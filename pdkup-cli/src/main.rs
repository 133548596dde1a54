//! pdkup CLI - Command-line interface
//!
//! This binary provides a command-line interface to the pdkup library:
//! installing, activating, listing, and removing prebuilt PDK versions.

use clap::Parser;

mod commands;
mod error;

use commands::versions::Commands;
use error::CliError;

#[derive(Parser)]
#[command(name = "pdkup")]
#[command(version = pdkup::VERSION)]
#[command(about = "Version manager for prebuilt PDK archives", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

fn main() {
    let cli = Cli::parse();

    // Keep the guard alive for the whole run so buffered log lines are
    // flushed on exit.
    let _logging = match pdkup::logging::init_logging(&pdkup::logging::default_log_dir()) {
        Ok(guard) => Some(guard),
        Err(e) => {
            // Log files are a convenience; a read-only home must not stop
            // the command itself.
            eprintln!("Warning: failed to initialize logging: {}", e);
            None
        }
    };

    if let Err(e) = commands::versions::handle(cli.command) {
        e.exit();
    }
}
