//! Finding columns in the header row

/// A resolved column position
///
/// Columns are looked up by their header label first. When a sheet doesn't carry the
/// expected label the column falls back to a fixed position instead of failing, so older
/// or hand-edited sheets keep working.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    /// The header had a cell matching the label
    Labeled(usize),

    /// No header cell matched, so the fallback position is used
    Positional(usize),
}

impl Column {
    /// The zero-based column index, however it was found
    pub fn index(self) -> usize {
        match self {
            Self::Labeled(index) | Self::Positional(index) => index,
        }
    }
}

/// Find the first header cell whose trimmed text equals `label`
///
/// The comparison is case-sensitive.
pub fn find_column<S>(header: &[S], label: &str) -> Option<usize>
where
    S: AsRef<str>,
{
    header.iter().position(|cell| cell.as_ref().trim() == label)
}

/// Find a column by label, or fall back to a fixed position
pub fn resolve_column<S>(header: &[S], label: &str, fallback: usize) -> Column
where
    S: AsRef<str>,
{
    match find_column(header, label) {
        Some(index) => Column::Labeled(index),
        None => Column::Positional(fallback),
    }
}
