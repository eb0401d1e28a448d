use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use midimap_tools::names::{names, NamesArgs};
use midimap_tools::shifts::{shifts, ShiftsArgs};

#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
enum Cli {
    Names(NamesArgs),
    Shifts(ShiftsArgs),
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let result = match Cli::parse_from(wild::args()) {
        Cli::Names(args) => names(args),
        Cli::Shifts(args) => shifts(args),
    };

    // Diagnostics go to stdout as a single line, next to the progress output
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            println!("{error:#}");
            ExitCode::FAILURE
        }
    }
}
