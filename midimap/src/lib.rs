//! Keeping a MIDI controller's mapping sheet in sync with its Mixxx XML mapping.
//!
//! The XML mapping is what Mixxx actually loads: every `<control>` binds a MIDI message to
//! a command. The mapping sheet is a CSV file meant for humans, documenting every button
//! and knob, its MIDI identifier, the command it triggers and what happens with shift held.
//! This crate reads both, renames the sheet's commands after the XML
//! ([`reconcile`](reconcile::reconcile)) and fills in known shift behaviors
//! ([`overlay`](overlay::apply)).
//!
//! ```no_run
//! # use midimap::{canonical::CanonicalIndex, document::Document, layout::Layout, reconcile::reconcile};
//! let layout = Layout::default();
//! let index = CanonicalIndex::from_path("Denon-MC2000.midi.xml", &layout.key_prefix)?;
//!
//! let mut sheet = Document::from_path("Denon-MC2000-MIDI-mapping.csv")?;
//! let summary = reconcile(&index, &mut sheet, &layout);
//! println!("{} rows changed", summary.updated);
//!
//! sheet.save(
//!     "Denon-MC2000-MIDI-mapping.csv",
//!     layout.backup_path("Denon-MC2000-MIDI-mapping.csv".as_ref()),
//! )?;
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod canonical;
pub mod column;
pub mod document;
pub mod id;
pub mod layout;
pub mod overlay;
pub mod reconcile;
