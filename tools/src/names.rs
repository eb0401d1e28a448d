//! The `names` subcommand

use crate::utils::{file_name, load_layout, require_file};
use anyhow::{Context, Result};
use clap::Args;
use midimap::{canonical::CanonicalIndex, document::Document, reconcile::reconcile};
use std::path::PathBuf;
use tracing::debug;

/// Arguments for the `names` subcommand
#[derive(Args)]
#[clap(
    author,
    version,
    about = "Update the sheet's command names from the XML mapping",
    long_about = "Names looks up every row's MIDI identifier in the XML mapping and overwrites the row's command name with the XML <key> (minus its prefix).\n\nThe header, row order and every other column are kept. The original sheet is always backed up first."
)]
pub struct NamesArgs {
    /// The mapping sheet to update
    #[clap(long, default_value = "Denon-MC2000-MIDI-mapping.csv")]
    csv: PathBuf,

    /// The XML mapping to take command names from
    #[clap(long, default_value = "Denon-MC2000.midi.xml")]
    xml: PathBuf,

    /// A TOML file overriding column labels, positions and markers
    #[clap(short, long)]
    config: Option<PathBuf>,
}

/// Update the sheet's command names from the XML mapping
pub fn names(args: NamesArgs) -> Result<()> {
    require_file(&args.csv, "CSV")?;
    require_file(&args.xml, "XML")?;

    let layout = load_layout(args.config.as_deref())?;

    let index = CanonicalIndex::from_path(&args.xml, &layout.key_prefix)
        .with_context(|| format!("Could not read {}", args.xml.display()))?;
    println!(
        "Parsed {} xml mappings from {}",
        index.len(),
        file_name(&args.xml)
    );

    let mut sheet = Document::from_path(&args.csv)
        .with_context(|| format!("Could not read {}", args.csv.display()))?;
    if sheet.is_fenced() {
        println!("Found fenced CSV block in {}", file_name(&args.csv));
    }

    let summary = reconcile(&index, &mut sheet, &layout);
    debug!(rows = ?summary.changed_rows, "changed rows");

    let backup = layout.backup_path(&args.csv);
    sheet
        .save(&args.csv, &backup)
        .with_context(|| format!("Could not write {}", args.csv.display()))?;

    println!("Backup written to {}", file_name(&backup));
    println!(
        "Updated CSV written to {} ({} rows changed)",
        file_name(&args.csv),
        summary.updated
    );
    println!("Done.");

    Ok(())
}
