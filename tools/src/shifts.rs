//! The `shifts` subcommand

use crate::utils::{load_layout, require_file};
use anyhow::{Context, Result};
use clap::Args;
use midimap::{
    document::Document,
    overlay::{apply, RuleSet},
};
use std::path::PathBuf;
use tracing::debug;

/// Arguments for the `shifts` subcommand
#[derive(Args)]
#[clap(author, version, about = "Fill in known shift behaviors in the sheet", long_about = None)]
pub struct ShiftsArgs {
    /// The mapping sheet to update
    #[clap(long, default_value = "Denon-MC2000-MIDI-mapping.csv")]
    csv: PathBuf,

    /// A TOML file overriding column labels, positions and markers
    #[clap(short, long)]
    config: Option<PathBuf>,
}

/// Fill in known shift behaviors in the sheet
pub fn shifts(args: ShiftsArgs) -> Result<()> {
    require_file(&args.csv, "CSV")?;

    let layout = load_layout(args.config.as_deref())?;

    let mut sheet = Document::from_path(&args.csv)
        .with_context(|| format!("Could not read {}", args.csv.display()))?;
    let data_rows = sheet.rows.iter().filter(|row| !row.is_empty()).count();
    println!("Read {data_rows} data rows from CSV");

    let summary = apply(&mut sheet, &layout, &RuleSet::mc2000())
        .with_context(|| format!("Could not annotate {}", args.csv.display()))?;
    debug!(rows = ?summary.rows, "annotated rows");

    println!("Updated {} shift-related fields", summary.updated);
    if summary.overwritten > 0 {
        println!("Overwrote {} hotcue shift fields", summary.overwritten);
    }

    let backup = layout.backup_path(&args.csv);
    sheet
        .save(&args.csv, &backup)
        .with_context(|| format!("Could not write {}", args.csv.display()))?;

    println!("Backup created: {}", backup.display());
    println!("Updated CSV written to: {}", args.csv.display());
    println!("Complete!");

    Ok(())
}
