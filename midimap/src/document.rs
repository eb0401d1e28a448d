//! The CSV mapping sheet
//!
//! The sheet is a plain CSV file with a header row, though some editors save it wrapped
//! in a fenced block (a ```` ```csv ```` line before the records and a ```` ``` ```` line
//! after). A [`Document`] remembers the wrapper and the original text, so it can be written
//! back in the same shape and the original can always be backed up first.

use csv::{ReaderBuilder, StringRecord, Terminator, WriterBuilder};
use std::{
    fs, io,
    path::Path,
    string::FromUtf8Error,
};
use thiserror::Error;

/// The marker opening and closing a fenced block
pub const FENCE: &str = "```";

/// A single sheet row
pub type Row = Vec<String>;

/// A parsed mapping sheet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// The first record, kept as-is
    pub header: Row,

    /// Every record after the header, in file order
    ///
    /// Empty lines between or after the records are kept as rows without any cells.
    pub rows: Vec<Row>,

    leading_lines: usize,
    fence: Option<Fence>,
    final_newline: bool,
    source: String,
}

/// The fenced block surrounding the records
#[derive(Debug, Clone, PartialEq, Eq)]
struct Fence {
    /// The opening line, e.g. ```` ```csv ````
    opening: String,

    /// Lines following the closing fence
    after: Vec<String>,
}

impl Document {
    /// Parse a sheet from its text
    pub fn parse(text: &str) -> Result<Self, DocumentError> {
        let lines: Vec<&str> = text.lines().collect();

        let (fence, body) = match lines.first() {
            Some(first) if first.trim().starts_with(FENCE) => {
                let close = lines
                    .iter()
                    .skip(1)
                    .position(|line| *line == FENCE)
                    .ok_or(DocumentError::UnclosedFence)?
                    + 1;

                let fence = Fence {
                    opening: first.to_string(),
                    after: lines[close + 1..].iter().map(ToString::to_string).collect(),
                };

                (Some(fence), &lines[1..close])
            }
            _ => (None, &lines[..]),
        };

        let mut joined = body.join("\n");
        joined.push('\n');

        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(joined.as_bytes());

        // The reader skips empty lines, so they're put back as empty rows. After each read
        // the reader sits on the line following the record, which tells where it started.
        let mut record = StringRecord::new();
        if !reader.read_record(&mut record)? {
            return Err(DocumentError::Empty);
        }

        let header: Row = record.iter().map(str::to_owned).collect();
        let mut next_line = reader.position().line();
        let leading_lines = next_line - line_span(&record) - 1;

        let mut rows = Vec::new();
        while reader.read_record(&mut record)? {
            let end = reader.position().line();
            let start = end - line_span(&record);

            rows.extend((next_line..start).map(|_| Row::new()));
            rows.push(record.iter().map(str::to_owned).collect::<Row>());
            next_line = end;
        }
        rows.extend((next_line..=body.len() as u64).map(|_| Row::new()));

        Ok(Self {
            header,
            rows,
            leading_lines: leading_lines as usize,
            fence,
            final_newline: text.ends_with('\n'),
            source: text.to_owned(),
        })
    }

    /// Read and parse a sheet from a path on disk
    pub fn from_path<P>(path: P) -> Result<Self, FromPathError>
    where
        P: AsRef<Path>,
    {
        let text = fs::read_to_string(path)?;
        Ok(Self::parse(&text)?)
    }

    /// Is the sheet wrapped in a fenced block?
    pub fn is_fenced(&self) -> bool {
        self.fence.is_some()
    }

    /// Serialize the sheet back to text
    ///
    /// Records are written with minimal quoting and `\n` line endings, and rows without any
    /// cells as empty lines. The fence (if any) is restored and the original's final newline
    /// (or lack thereof) is kept.
    pub fn to_text(&self) -> Result<String, WriteError> {
        let mut records = "\n".repeat(self.leading_lines);
        records.push_str(&write_record(&self.header)?);
        for row in &self.rows {
            if row.is_empty() {
                records.push('\n');
            } else {
                records.push_str(&write_record(row)?);
            }
        }
        let records = records.strip_suffix('\n').unwrap_or(&records);

        let mut text = String::new();
        match &self.fence {
            Some(fence) => {
                text.push_str(&fence.opening);
                text.push('\n');
                text.push_str(records);
                text.push('\n');
                text.push_str(FENCE);
                for line in &fence.after {
                    text.push('\n');
                    text.push_str(line);
                }
            }
            None => text.push_str(records),
        }

        if self.final_newline {
            text.push('\n');
        }

        Ok(text)
    }

    /// Back up the original text, then overwrite `path` with the updated sheet
    ///
    /// The backup is written on every call, even if nothing changed, so the state before
    /// any run can always be restored.
    pub fn save<P, B>(&self, path: P, backup: B) -> Result<(), WriteError>
    where
        P: AsRef<Path>,
        B: AsRef<Path>,
    {
        let text = self.to_text()?;

        fs::write(backup, self.source.as_bytes()).map_err(WriteError::Backup)?;
        fs::write(path, text)?;

        Ok(())
    }
}

/// The number of lines a record spans, including those inside quoted cells
fn line_span(record: &StringRecord) -> u64 {
    1 + record
        .iter()
        .map(|cell| cell.matches('\n').count() as u64)
        .sum::<u64>()
}

/// A single record with minimal quoting, terminated by `\n`
fn write_record(row: &[String]) -> Result<String, WriteError> {
    let mut writer = WriterBuilder::new()
        .flexible(true)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());
    writer.write_record(row)?;

    let bytes = writer.into_inner().map_err(|error| error.into_error())?;
    Ok(String::from_utf8(bytes)?)
}

/// Is every cell in the row empty (or whitespace)?
pub fn is_blank(row: &[String]) -> bool {
    row.iter().all(|cell| cell.trim().is_empty())
}

/// Append empty cells until the row has at least `len` cells
pub fn pad(row: &mut Row, len: usize) {
    if row.len() < len {
        row.resize(len, String::new());
    }
}

/// The cell at `index`, or an empty string for short rows
pub fn cell(row: &[String], index: usize) -> &str {
    row.get(index).map(String::as_str).unwrap_or_default()
}

/// Errors that might be returned from [`Document::parse()`]
#[derive(Debug, Error)]
pub enum DocumentError {
    /// The first line opens a fenced block, but no line closes it
    #[error("Malformed fenced file; cannot find closing ```")]
    UnclosedFence,

    /// There isn't a single record, not even a header
    #[error("CSV appears empty")]
    Empty,

    /// The records could not be read as CSV
    #[error("Reading the CSV records failed")]
    Csv(#[from] csv::Error),
}

/// Errors that might be returned from [`Document::from_path()`]
#[derive(Debug, Error)]
pub enum FromPathError {
    /// Opening or reading the file failed
    #[error("Reading the file failed")]
    FileRead(#[from] io::Error),

    /// The file content isn't a valid sheet
    #[error("Parsing the sheet failed")]
    Parse(#[from] DocumentError),
}

/// Errors that might be returned from [`Document::to_text()`] and [`Document::save()`]
#[derive(Debug, Error)]
pub enum WriteError {
    /// Serializing a record failed
    #[error("Writing the CSV records failed")]
    Csv(#[from] csv::Error),

    /// The serialized records are not valid UTF-8
    #[error("The serialized records are not valid UTF-8")]
    Utf8(#[from] FromUtf8Error),

    /// Writing the backup copy failed, the sheet was left untouched
    #[error("Writing the backup failed")]
    Backup(#[source] io::Error),

    /// Writing the sheet itself failed
    #[error("Writing the sheet failed")]
    Io(#[from] io::Error),
}
