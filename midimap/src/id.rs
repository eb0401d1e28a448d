//! Composite `status-midino` identifiers
use std::{convert::Infallible, fmt, str::FromStr};

/// A composite `status-midino` identifier addressing a single control
///
/// A MIDI message for a controller button or knob is identified by its status byte and
/// its note/CC number. The XML mapping stores both separately (e.g. `0xB0` and `0x56`),
/// while the mapping sheet stores them as a single `B0-56` cell. [`ControlId`] is the
/// key both sides are joined on.
///
/// No validation happens beyond normalization. A malformed half is kept as-is and simply
/// never matches anything during a lookup.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ControlId {
    key: String,
}

impl ControlId {
    /// The character separating the status and midino halves
    pub const SEPARATOR: char = '-';

    /// Build an identifier from the raw `<status>` and `<midino>` texts
    ///
    /// Each half is normalized independently with [`normalize_hex`].
    pub fn from_parts(status: &str, midino: &str) -> Self {
        Self {
            key: format!(
                "{}{}{}",
                normalize_hex(status),
                Self::SEPARATOR,
                normalize_hex(midino)
            ),
        }
    }

    /// Build an identifier from a sheet cell that already reads `XX-YY`
    ///
    /// The cell is trimmed and uppercased, but its halves are not re-padded.
    pub fn from_cell(cell: &str) -> Self {
        Self {
            key: cell.trim().to_uppercase(),
        }
    }

    /// The identifier as a `XX-YY` string
    pub fn as_str(&self) -> &str {
        &self.key
    }
}

impl fmt::Display for ControlId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.key)
    }
}

impl FromStr for ControlId {
    type Err = Infallible;

    #[inline]
    fn from_str(str: &str) -> Result<Self, Self::Err> {
        Ok(Self::from_cell(str))
    }
}

/// Normalize one half of an identifier to uppercase, zero-padded hex
///
/// An optional `0x`/`0X` radix prefix is stripped and the rest is uppercased. A single
/// remaining character gets a leading `0`, anything longer or shorter is left alone.
pub fn normalize_hex(raw: &str) -> String {
    let mut digits = raw.trim();
    if digits
        .get(..2)
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case("0x"))
    {
        digits = &digits[2..];
    }

    let digits = digits.to_uppercase();
    if digits.chars().count() == 1 {
        format!("0{digits}")
    } else {
        digits
    }
}
