//! # MIDI mapping tools
//!
//! The [Denon MC2000](https://www.denondj.com) mapping for [Mixxx](https://mixxx.org) comes with
//! a CSV sheet documenting every button and knob: its MIDI identifier, the command it triggers
//! and what it does with shift held. The XML mapping is the source of truth though, and the
//! sheet tends to drift. This crate provides a command-line utility to pull it back in line.
//!
//! Every command backs up the sheet to `<sheet>.bak` before overwriting it, even when nothing
//! changed. Set `RUST_LOG=debug` to see which rows were touched.
//!
//! ## Names
//!
//! ```console
//! midimap-tools-names 0.1.0
//! Update the sheet's command names from the XML mapping
//!
//! USAGE:
//!     midimap-tools names [OPTIONS]
//!
//! OPTIONS:
//!     -c, --config <CONFIG>    A TOML file overriding column labels, positions and markers
//!         --csv <CSV>          The mapping sheet to update [default: Denon-MC2000-MIDI-mapping.csv]
//!     -h, --help               Print help information
//!     -V, --version            Print version information
//!         --xml <XML>          The XML mapping to take command names from [default: Denon-MC2000.midi.xml]
//! ```
//!
//! ### Example
//!
//! ```console
//! $ midimap-tools names
//! Parsed 212 xml mappings from Denon-MC2000.midi.xml
//! Backup written to Denon-MC2000-MIDI-mapping.csv.bak
//! Updated CSV written to Denon-MC2000-MIDI-mapping.csv (14 rows changed)
//! Done.
//! ```
//!
//! ## Shifts
//!
//! ```console
//! midimap-tools-shifts 0.1.0
//! Fill in known shift behaviors in the sheet
//!
//! USAGE:
//!     midimap-tools shifts [OPTIONS]
//!
//! OPTIONS:
//!     -c, --config <CONFIG>    A TOML file overriding column labels, positions and markers
//!         --csv <CSV>          The mapping sheet to update [default: Denon-MC2000-MIDI-mapping.csv]
//!     -h, --help               Print help information
//!     -V, --version            Print version information
//! ```
//!
//! ### Example
//!
//! ```console
//! $ midimap-tools shifts
//! Read 118 data rows from CSV
//! Updated 6 shift-related fields
//! Overwrote 8 hotcue shift fields
//! Backup created: Denon-MC2000-MIDI-mapping.csv.bak
//! Updated CSV written to: Denon-MC2000-MIDI-mapping.csv
//! Complete!
//! ```
//!
//! ## Config
//!
//! Any field of [`Layout`](midimap::layout::Layout) can be overridden from a TOML file:
//!
//! ```toml
//! command_label = "Command"
//! shift_notes_label = "Notes (shift)"
//! backup_suffix = ".orig"
//! ```

pub mod names;
pub mod shifts;
pub(crate) mod utils;
