//! The XML mapping, as the canonical source of command names
//!
//! Mixxx controller mappings are XML documents in which every `<control>` element binds a
//! MIDI message (`<status>` + `<midino>`) to a `<key>`. This module only reads what's
//! needed to know which command name belongs to which [`ControlId`].

use crate::id::ControlId;
use quick_xml::{Reader, events::Event};
use std::{
    collections::{HashMap, hash_map},
    fs, io,
    path::Path,
};
use thiserror::Error;
use tracing::debug;

/// A single `<control>` record from the XML mapping
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalEntry {
    /// The identifier built from `<status>` and `<midino>`
    pub id: ControlId,

    /// The `<key>` text, trimmed but otherwise untouched
    pub name: String,
}

impl CanonicalEntry {
    /// The name with `prefix` removed, if it starts with it
    pub fn short_name(&self, prefix: &str) -> &str {
        self.name.strip_prefix(prefix).unwrap_or(&self.name)
    }
}

/// A lookup from [`ControlId`] to the (short) command name
///
/// When several controls share an identifier, the first one in document order wins and
/// later ones are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CanonicalIndex {
    names: HashMap<ControlId, String>,
}

impl CanonicalIndex {
    /// Build an index from entries, stripping `prefix` from every name
    pub fn from_entries<I>(entries: I, prefix: &str) -> Self
    where
        I: IntoIterator<Item = CanonicalEntry>,
    {
        let mut names = HashMap::new();

        for entry in entries {
            let name = entry.short_name(prefix).to_owned();
            match names.entry(entry.id) {
                hash_map::Entry::Vacant(slot) => {
                    slot.insert(name);
                }
                hash_map::Entry::Occupied(slot) => {
                    debug!(id = %slot.key(), ignored = %name, "duplicate identifier");
                }
            }
        }

        Self { names }
    }

    /// Parse the XML mapping text and index its controls
    pub fn from_xml_str(xml: &str, prefix: &str) -> Result<Self, ParseError> {
        Ok(Self::from_entries(parse_entries(xml)?, prefix))
    }

    /// Read and index the XML mapping at a path on disk
    pub fn from_path<P>(path: P, prefix: &str) -> Result<Self, FromPathError>
    where
        P: AsRef<Path>,
    {
        let xml = fs::read_to_string(path)?;
        Ok(Self::from_xml_str(&xml, prefix)?)
    }

    /// Look up the command name for an identifier
    pub fn get(&self, id: &ControlId) -> Option<&str> {
        self.names.get(id).map(String::as_str)
    }

    /// The number of distinct identifiers
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Is the index empty?
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Collect every complete `<control>` record, in document order
///
/// A control counts when it sits anywhere below the root element and has `<key>`,
/// `<status>` and `<midino>` as direct children (the first of each is used). Controls
/// missing one of them are skipped.
pub fn parse_entries(xml: &str) -> Result<Vec<CanonicalEntry>, ParseError> {
    let mut reader = Reader::from_str(xml);
    let mut stack = Vec::new();
    let mut controls = Vec::new();
    let mut next_seq = 0;
    let mut seen_root = false;

    loop {
        let event = reader.read_event().map_err(|error| ParseError::Malformed {
            position: reader.buffer_position() as u64,
            message: error.to_string(),
        })?;

        match event {
            Event::Start(start) => {
                check_single_root(&stack, &mut seen_root, &reader)?;
                let frame = open(&mut stack, start.name().as_ref(), &mut next_seq);
                stack.push(frame);
            }
            Event::Empty(start) => {
                check_single_root(&stack, &mut seen_root, &reader)?;
                let frame = open(&mut stack, start.name().as_ref(), &mut next_seq);
                close(frame, &mut stack, &mut controls);
            }
            Event::End(_) => {
                let frame = stack.pop().ok_or_else(|| ParseError::Malformed {
                    position: reader.buffer_position() as u64,
                    message: "closing tag without an opening tag".to_owned(),
                })?;
                close(frame, &mut stack, &mut controls);
            }
            Event::Text(text) => {
                if let Some(Frame::Field { text: buffer, nested: false, .. }) = stack.last_mut() {
                    let unescaped = text.unescape().map_err(|error| ParseError::Malformed {
                        position: reader.buffer_position() as u64,
                        message: error.to_string(),
                    })?;
                    buffer.push_str(&unescaped);
                }
            }
            Event::CData(cdata) => {
                if let Some(Frame::Field { text: buffer, nested: false, .. }) = stack.last_mut() {
                    buffer.push_str(&String::from_utf8_lossy(&cdata));
                }
            }
            Event::Eof => break,
            _ => (),
        }
    }

    if !stack.is_empty() {
        return Err(ParseError::Unclosed { depth: stack.len() });
    }
    if !seen_root {
        return Err(ParseError::NoRoot);
    }

    controls.sort_by_key(|(seq, _)| *seq);

    Ok(controls
        .into_iter()
        .filter_map(|(seq, fields)| {
            let entry = fields.into_entry();
            if entry.is_none() {
                debug!(control = seq, "skipping control without key, status or midino");
            }
            entry
        })
        .collect())
}

/// An element currently being read
enum Frame {
    /// A `<control>`, numbered by the order in which it was opened
    Control { seq: usize, fields: Fields },

    /// A `<key>`, `<status>` or `<midino>` directly inside a control
    Field {
        kind: FieldKind,
        text: String,

        /// Once a child element opens, later text no longer belongs to the field
        nested: bool,
    },

    Other,
}

#[derive(Clone, Copy)]
enum FieldKind {
    Key,
    Status,
    Midino,
}

impl FieldKind {
    fn from_name(name: &[u8]) -> Option<Self> {
        match name {
            b"key" => Some(Self::Key),
            b"status" => Some(Self::Status),
            b"midino" => Some(Self::Midino),
            _ => None,
        }
    }
}

#[derive(Default)]
struct Fields {
    key: Option<String>,
    status: Option<String>,
    midino: Option<String>,
}

impl Fields {
    fn slot(&mut self, kind: FieldKind) -> &mut Option<String> {
        match kind {
            FieldKind::Key => &mut self.key,
            FieldKind::Status => &mut self.status,
            FieldKind::Midino => &mut self.midino,
        }
    }

    fn into_entry(self) -> Option<CanonicalEntry> {
        Some(CanonicalEntry {
            id: ControlId::from_parts(&self.status?, &self.midino?),
            name: self.key?,
        })
    }
}

fn open(stack: &mut [Frame], name: &[u8], next_seq: &mut usize) -> Frame {
    if let Some(Frame::Field { nested, .. }) = stack.last_mut() {
        *nested = true;
    }

    if let (Some(Frame::Control { .. }), Some(kind)) = (stack.last(), FieldKind::from_name(name)) {
        return Frame::Field {
            kind,
            text: String::new(),
            nested: false,
        };
    }

    // The root element itself is never a control
    if name == b"control" && !stack.is_empty() {
        let seq = *next_seq;
        *next_seq += 1;
        return Frame::Control {
            seq,
            fields: Fields::default(),
        };
    }

    Frame::Other
}

fn close(frame: Frame, stack: &mut [Frame], controls: &mut Vec<(usize, Fields)>) {
    match frame {
        Frame::Field { kind, text, .. } => {
            if let Some(Frame::Control { fields, .. }) = stack.last_mut() {
                let slot = fields.slot(kind);
                if slot.is_none() {
                    *slot = Some(text.trim().to_owned());
                }
            }
        }
        Frame::Control { seq, fields } => controls.push((seq, fields)),
        Frame::Other => (),
    }
}

fn check_single_root(
    stack: &[Frame],
    seen_root: &mut bool,
    reader: &Reader<&[u8]>,
) -> Result<(), ParseError> {
    if stack.is_empty() {
        if *seen_root {
            return Err(ParseError::Malformed {
                position: reader.buffer_position() as u64,
                message: "junk after the document element".to_owned(),
            });
        }
        *seen_root = true;
    }

    Ok(())
}

/// Errors that might be returned from [`parse_entries()`] and [`CanonicalIndex::from_xml_str()`]
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    /// The XML is not well-formed
    #[error("Malformed XML near byte {position}: {message}")]
    Malformed { position: u64, message: String },

    /// The document ended while elements were still open
    #[error("The document ended with {depth} unclosed element(s)")]
    Unclosed { depth: usize },

    /// There is no element in the document at all
    #[error("No root element found")]
    NoRoot,
}

/// Errors that might be returned from [`CanonicalIndex::from_path()`]
#[derive(Debug, Error)]
pub enum FromPathError {
    /// Opening or reading the file failed
    #[error("Reading the file failed")]
    FileRead(#[from] io::Error),

    /// The file is not a well-formed XML document
    #[error("Failed to parse XML")]
    Parse(#[from] ParseError),
}

#[cfg(test)]
mod tests {
    use super::*;

    const PREFIX: &str = "MC2000.";

    #[test]
    fn mc2000_fixture() {
        let index =
            CanonicalIndex::from_xml_str(include_str!("../test/Denon-MC2000.midi.xml"), PREFIX)
                .expect("fixture rejected");

        assert_eq!(index.len(), 6);
        assert_eq!(
            index.get(&ControlId::from_cell("B0-56")),
            Some("playButton")
        );
        assert_eq!(index.get(&ControlId::from_cell("B0-55")), Some("cueButton"));
        assert_eq!(index.get(&ControlId::from_cell("90-05")), Some("hotcuePad"));
        assert_eq!(
            index.get(&ControlId::from_cell("B0-07")),
            Some("ScrollVertical")
        );

        // The <output> elements aren't controls
        assert_eq!(index.get(&ControlId::from_cell("B0-4A")), None);
    }

    #[test]
    fn first_occurrence_wins() {
        let xml = r#"<preset><controls>
            <control><key>MC2000.playButton</key><status>0xB0</status><midino>0x56</midino></control>
            <control><key>MC2000.cueButton</key><status>0xb0</status><midino>56</midino></control>
        </controls></preset>"#;

        let index = CanonicalIndex::from_xml_str(xml, PREFIX).unwrap();
        assert_eq!(index.len(), 1);
        assert_eq!(
            index.get(&ControlId::from_cell("B0-56")),
            Some("playButton")
        );
    }

    #[test]
    fn incomplete_controls_are_skipped() {
        let xml = r#"<preset>
            <control><key>MC2000.noStatus</key><midino>0x01</midino></control>
            <control><key>MC2000.noMidino</key><status>0x90</status></control>
            <control><status>0x90</status><midino>0x02</midino></control>
            <control/>
            <control><key/><status>0x90</status><midino>0x03</midino></control>
        </preset>"#;

        let entries = parse_entries(xml).unwrap();
        assert_eq!(
            entries,
            vec![CanonicalEntry {
                id: ControlId::from_cell("90-03"),
                name: String::new(),
            }]
        );
    }

    #[test]
    fn field_text() {
        let xml = r#"<preset>
            <control>
                <key>
                    MC2000.a&amp;b
                </key>
                <status><![CDATA[0x90]]></status>
                <midino>0x4<!-- comment -->5<extra/>ignored</midino>
                <key>MC2000.second</key>
            </control>
        </preset>"#;

        let entries = parse_entries(xml).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].name, "MC2000.a&b");
        assert_eq!(entries[0].short_name(PREFIX), "a&b");
        assert_eq!(entries[0].id.as_str(), "90-45");
    }

    #[test]
    fn nested_controls_keep_document_order() {
        let xml = r#"<preset>
            <control>
                <control><key>inner</key><status>1</status><midino>1</midino></control>
                <key>outer</key><status>0x01</status><midino>0x01</midino>
            </control>
        </preset>"#;

        let names: Vec<_> = parse_entries(xml)
            .unwrap()
            .into_iter()
            .map(|entry| entry.name)
            .collect();
        assert_eq!(names, vec!["outer", "inner"]);

        let index = CanonicalIndex::from_xml_str(xml, PREFIX).unwrap();
        assert_eq!(index.get(&ControlId::from_cell("01-01")), Some("outer"));
    }

    #[test]
    fn root_is_not_a_control() {
        let xml = "<control><key>k</key><status>1</status><midino>2</midino></control>";
        assert!(parse_entries(xml).unwrap().is_empty());
    }

    #[test]
    fn malformed() {
        assert!(matches!(
            parse_entries("<preset><control></preset>"),
            Err(ParseError::Malformed { .. })
        ));
        assert_eq!(
            parse_entries("<preset><controls>"),
            Err(ParseError::Unclosed { depth: 2 })
        );
        assert_eq!(parse_entries(""), Err(ParseError::NoRoot));
        assert_eq!(
            parse_entries("<?xml version=\"1.0\"?>\n"),
            Err(ParseError::NoRoot)
        );
        assert!(matches!(
            parse_entries("<a/><b/>"),
            Err(ParseError::Malformed { .. })
        ));
    }

    #[test]
    fn from_path() {
        let dir = tempfile::tempdir().unwrap();

        let missing = CanonicalIndex::from_path(dir.path().join("missing.xml"), PREFIX);
        assert!(matches!(missing, Err(FromPathError::FileRead(_))));

        let path = dir.path().join("broken.xml");
        fs::write(&path, "<preset>").unwrap();
        let broken = CanonicalIndex::from_path(&path, PREFIX);
        assert!(matches!(broken, Err(FromPathError::Parse(_))));
    }
}
