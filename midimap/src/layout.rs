//! Where things live in the mapping sheet

use crate::column::{Column, resolve_column};
use serde::Deserialize;
use std::{
    ffi::OsString,
    path::{Path, PathBuf},
};
use tracing::warn;

/// Column labels, positions and marker values of a mapping sheet
///
/// [`Layout::default()`] describes the Denon MC2000 sheet. Every field can be overridden
/// individually when deserializing, missing fields keep their default.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Layout {
    /// Header of the column holding the logical (command) name
    pub command_label: String,

    /// Position of the command column if no header matches [`Self::command_label`]
    pub command_fallback: usize,

    /// Position of the column holding the `XX-YY` identifier
    pub id_column: usize,

    /// Header of the column holding the shifted command
    pub shift_command_label: String,

    /// Header of the column holding the free-text shift notes
    pub shift_notes_label: String,

    /// Header of the column holding the Mixxx control (e.g. `[ChannelN]hotcue_1_activate`)
    pub control_label: String,

    /// Prefix stripped from the XML `<key>` names
    pub key_prefix: String,

    /// Sentinel meaning "no value set"
    pub placeholder: String,

    /// Shift notes text meaning the control has no shift behavior yet
    pub no_shift_layer: String,

    /// Appended to the sheet's path to form the backup path
    pub backup_suffix: String,
}

impl Layout {
    /// The index of the command column in `header`
    ///
    /// Falls back to [`Self::command_fallback`] (with a warning) if no header cell matches
    /// [`Self::command_label`].
    pub fn command_column<S>(&self, header: &[S]) -> usize
    where
        S: AsRef<str>,
    {
        let column = resolve_column(header, &self.command_label, self.command_fallback);
        if let Column::Positional(position) = column {
            warn!(
                label = %self.command_label,
                position,
                "command column not found in header, using its default position"
            );
        }

        column.index()
    }

    /// The sibling path the original sheet is backed up to
    pub fn backup_path(&self, path: &Path) -> PathBuf {
        let mut backup = OsString::from(path.as_os_str());
        backup.push(&self.backup_suffix);
        PathBuf::from(backup)
    }

    /// Does a cell hold no value (empty or the placeholder)?
    pub fn is_unset(&self, cell: &str) -> bool {
        let cell = cell.trim();
        cell.is_empty() || cell == self.placeholder
    }

    /// Does a shift notes cell say there is no shift layer (the placeholder or the explicit note)?
    pub fn has_no_shift_layer(&self, notes: &str) -> bool {
        let notes = notes.trim();
        notes == self.placeholder || notes == self.no_shift_layer
    }
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            command_label: "Command Name (XML/JS)".to_owned(),
            command_fallback: 3,
            id_column: 2,
            shift_command_label: "Shift Command".to_owned(),
            shift_notes_label: "Shift Notes".to_owned(),
            control_label: "Mixxx Control".to_owned(),
            key_prefix: "MC2000.".to_owned(),
            placeholder: "–".to_owned(),
            no_shift_layer: "No shift layer".to_owned(),
            backup_suffix: ".bak".to_owned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backup_path() {
        let layout = Layout::default();
        assert_eq!(
            layout.backup_path(Path::new("sheets/Denon-MC2000-MIDI-mapping.csv")),
            PathBuf::from("sheets/Denon-MC2000-MIDI-mapping.csv.bak")
        );
    }

    #[test]
    fn command_column() {
        let layout = Layout::default();

        assert_eq!(layout.command_column(&["MIDI No", "Command Name (XML/JS)"]), 1);
        assert_eq!(layout.command_column(&["Control", "MIDI No"]), 3);
        assert_eq!(layout.command_column::<&str>(&[]), 3);
    }

    #[test]
    fn markers() {
        let layout = Layout::default();

        assert!(layout.is_unset(""));
        assert!(layout.is_unset("  "));
        assert!(layout.is_unset(" – "));
        assert!(!layout.is_unset("No shift layer"));

        assert!(layout.has_no_shift_layer("–"));
        assert!(layout.has_no_shift_layer("No shift layer "));
        assert!(!layout.has_no_shift_layer(""));
        assert!(!layout.has_no_shift_layer("Shift: toggle sync lock"));
    }
}
