//! Bringing the sheet's command names in line with the XML mapping

use crate::{
    canonical::{CanonicalIndex, ParseError},
    document::{Document, DocumentError, WriteError, cell, is_blank, pad},
    id::ControlId,
    layout::Layout,
};
use thiserror::Error;
use tracing::debug;

/// The outcome of a [`reconcile()`] pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Summary {
    /// The number of rows whose command name actually changed
    pub updated: usize,

    /// The (zero-based, header excluded) indices of those rows
    pub changed_rows: Vec<usize>,
}

/// Overwrite every row's command name with the one the XML mapping has for its identifier
///
/// Blank rows are left alone. Rows whose identifier isn't in the index, or whose name
/// already matches, are left alone as well (apart from being padded to reach the command
/// column) and don't count as updated.
pub fn reconcile(index: &CanonicalIndex, document: &mut Document, layout: &Layout) -> Summary {
    let command = layout.command_column(&document.header);
    let mut summary = Summary::default();

    for (row_index, row) in document.rows.iter_mut().enumerate() {
        if is_blank(row) {
            debug!(row = row_index, "skipping blank row");
            continue;
        }

        pad(row, command + 1);

        let id = ControlId::from_cell(cell(row, layout.id_column));
        if let Some(name) = index.get(&id) {
            if row[command] != name {
                debug!(row = row_index, %id, old = %row[command], new = name, "renaming");
                row[command] = name.to_owned();
                summary.updated += 1;
                summary.changed_rows.push(row_index);
            }
        }
    }

    summary
}

/// Reconcile sheet text against XML mapping text, without touching the filesystem
///
/// Returns the updated sheet text along with the [`Summary`].
pub fn reconcile_text(
    xml: &str,
    sheet: &str,
    layout: &Layout,
) -> Result<(String, Summary), ReconcileError> {
    let index = CanonicalIndex::from_xml_str(xml, &layout.key_prefix)?;
    let mut document = Document::parse(sheet)?;
    let summary = reconcile(&index, &mut document, layout);

    Ok((document.to_text()?, summary))
}

/// Errors that might be returned from [`reconcile_text()`]
#[derive(Debug, Error)]
pub enum ReconcileError {
    /// The XML mapping could not be parsed
    #[error("Failed to parse XML")]
    Xml(#[from] ParseError),

    /// The sheet could not be parsed
    #[error("Failed to parse the CSV")]
    Sheet(#[from] DocumentError),

    /// The updated sheet could not be serialized
    #[error("Failed to write the CSV")]
    Write(#[from] WriteError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const XML: &str = include_str!("../test/Denon-MC2000.midi.xml");
    const SHEET: &str = include_str!("../test/Denon-MC2000-MIDI-mapping.csv");
    const EXPECTED: &str = include_str!("../test/Denon-MC2000-MIDI-mapping.expected.csv");

    #[test]
    fn fixture() {
        let (text, summary) = reconcile_text(XML, SHEET, &Layout::default()).unwrap();

        assert_eq!(text, EXPECTED);
        assert_eq!(summary.updated, 4);
        assert_eq!(summary.changed_rows, vec![0, 2, 5, 7]);
    }

    #[test]
    fn idempotent() {
        let layout = Layout::default();
        let (first, _) = reconcile_text(XML, SHEET, &layout).unwrap();
        let (second, summary) = reconcile_text(XML, &first, &layout).unwrap();

        assert_eq!(second, first);
        assert_eq!(summary, Summary::default());
    }

    #[test]
    fn end_to_end() {
        let xml = "<preset><controls><control>\
            <key>MC2000.playButton</key><status>0xB0</status><midino>0x56</midino>\
            </control></controls></preset>";
        let sheet = "Control,Deck,MIDI No,Command Name (XML/JS)\nPlay,1,B0-56,oldName\n";

        let (text, summary) = reconcile_text(xml, sheet, &Layout::default()).unwrap();
        assert_eq!(
            text,
            "Control,Deck,MIDI No,Command Name (XML/JS)\nPlay,1,B0-56,playButton\n"
        );
        assert_eq!(summary.updated, 1);
        assert_eq!(summary.changed_rows, vec![0]);
    }

    #[test]
    fn rows_are_preserved() {
        let layout = Layout::default();
        let before = Document::parse(SHEET).unwrap();
        let (text, _) = reconcile_text(XML, SHEET, &layout).unwrap();
        let after = Document::parse(&text).unwrap();

        assert_eq!(after.header, before.header);
        assert_eq!(after.rows.len(), before.rows.len());

        for (old, new) in before.rows.iter().zip(&after.rows) {
            for (column, old_cell) in old.iter().enumerate() {
                if column != 3 {
                    assert_eq!(&new[column], old_cell);
                }
            }
        }
    }

    #[test]
    fn blank_rows_pass_through() {
        let index = CanonicalIndex::from_xml_str(XML, "MC2000.").unwrap();
        let mut document = Document::parse("A,B,MIDI No,Command Name (XML/JS)\n , ,\n").unwrap();

        let summary = reconcile(&index, &mut document, &Layout::default());
        assert_eq!(summary.updated, 0);
        assert_eq!(document.rows, vec![vec![" ", " ", ""]]);
    }

    #[test]
    fn empty_lines_are_kept() {
        let sheet = "Control,Deck,MIDI No,Command Name (XML/JS)\n\
                     Play,1,B0-56,oldName\n\
                     \n\
                     Cue,1,B0-55,cue\n";

        let (text, summary) = reconcile_text(XML, sheet, &Layout::default()).unwrap();

        assert_eq!(text.lines().count(), sheet.lines().count());
        assert_eq!(
            text,
            "Control,Deck,MIDI No,Command Name (XML/JS)\n\
             Play,1,B0-56,playButton\n\
             \n\
             Cue,1,B0-55,cueButton\n"
        );
        assert_eq!(summary.changed_rows, vec![0, 2]);
    }

    #[test]
    fn positional_fallback() {
        let index = CanonicalIndex::from_xml_str(XML, "MC2000.").unwrap();
        let mut document = Document::parse("Control,Deck,Id,Command\nCue,1,B0-55,cue\n").unwrap();

        let summary = reconcile(&index, &mut document, &Layout::default());
        assert_eq!(summary.updated, 1);
        assert_eq!(document.rows[0][3], "cueButton");
    }

    #[test]
    fn labeled_column_elsewhere() {
        let index = CanonicalIndex::from_xml_str(XML, "MC2000.").unwrap();
        let mut document = Document::parse(
            "Control,Deck,MIDI No,Notes, Command Name (XML/JS) \nSync,1,b0-6b,keep,\n",
        )
        .unwrap();

        reconcile(&index, &mut document, &Layout::default());
        assert_eq!(document.rows[0], vec!["Sync", "1", "b0-6b", "keep", "syncButton"]);
    }

    #[test]
    fn unknown_identifiers_are_not_updates() {
        let index = CanonicalIndex::default();
        let mut document = Document::parse("A,B,MIDI No,Command Name (XML/JS)\nx,y\n").unwrap();

        let summary = reconcile(&index, &mut document, &Layout::default());
        assert_eq!(summary.updated, 0);

        // Padded to reach the command column, but otherwise untouched
        assert_eq!(document.rows[0], vec!["x", "y", "", ""]);
    }

    #[test]
    fn errors() {
        let layout = Layout::default();

        assert!(matches!(
            reconcile_text("<preset>", SHEET, &layout),
            Err(ReconcileError::Xml(_))
        ));
        assert!(matches!(
            reconcile_text(XML, "", &layout),
            Err(ReconcileError::Sheet(DocumentError::Empty))
        ));
    }
}
