//! Filling in shift-layer annotations
//!
//! Besides the command name, the sheet documents what every control does while shift is
//! held. Those notes aren't in the XML mapping, so they're kept here as a fixed set of
//! [`Rule`]s that get layered onto the sheet.

use crate::{
    column::find_column,
    document::{Document, cell, pad},
    layout::Layout,
};
use thiserror::Error;
use tracing::debug;

/// When a [`Rule`] is allowed to overwrite a row's shift cells
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Guard {
    /// Only if the shift command is empty or the placeholder
    ShiftCommandUnset,

    /// Only if the shift notes are the placeholder or say there's no shift layer
    NoShiftLayer,

    /// Always, whatever the row holds
    Always,
}

impl Guard {
    /// Does this guard let a rule through, given the row's current shift cells?
    pub fn allows(self, layout: &Layout, shift_command: &str, shift_notes: &str) -> bool {
        match self {
            Self::ShiftCommandUnset => layout.is_unset(shift_command),
            Self::NoShiftLayer => layout.has_no_shift_layer(shift_notes),
            Self::Always => true,
        }
    }
}

/// A single annotation: which rows it applies to, and what it writes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    /// The command name a row must have
    pub name: String,

    /// Text the row's Mixxx control must contain, for names shared by several controls
    pub discriminator: Option<String>,

    /// Whether the rule may overwrite the shift cells the row already has
    pub guard: Guard,

    /// Written to the shift command cell
    pub shift_command: String,

    /// Written to the shift notes cell
    pub shift_notes: String,

    /// Does applying this rule count toward [`OverlaySummary::updated`]?
    pub counted: bool,
}

impl Rule {
    /// A counted rule guarded by [`Guard::NoShiftLayer`]
    pub fn new(name: &str, shift_command: &str, shift_notes: &str) -> Self {
        Self {
            name: name.to_owned(),
            discriminator: None,
            guard: Guard::NoShiftLayer,
            shift_command: shift_command.to_owned(),
            shift_notes: shift_notes.to_owned(),
            counted: true,
        }
    }

    /// Does the rule target a row with this command name and Mixxx control?
    pub fn matches(&self, name: &str, control: &str) -> bool {
        self.name == name
            && self
                .discriminator
                .as_deref()
                .is_none_or(|discriminator| control.contains(discriminator))
    }
}

/// How one of the transport buttons behaves, with and without shift
struct ShiftBehavior {
    name: &'static str,
    normal: &'static str,
    shifted: Option<&'static str>,
}

const SHIFT_BEHAVIORS: &[ShiftBehavior] = &[
    ShiftBehavior {
        name: "play",
        normal: "Toggle play/pause",
        shifted: Some("Shift: momentary goto & play (cue_gotoandplay)"),
    },
    ShiftBehavior {
        name: "cue",
        normal: "CDJ mode cue button",
        shifted: Some("Shift: goto cue point (playposition=0.0)"),
    },
    ShiftBehavior {
        name: "sync",
        normal: "Short press: one-shot beatsync, Long press: enable sync lock, Tap again to disable",
        shifted: Some("Shift: toggle sync lock immediately"),
    },
    ShiftBehavior {
        name: "keylock",
        normal: "Toggle key lock (master tempo)",
        shifted: Some("Shift: cycle pitch range (6% -> 8% -> 12% -> 50%)"),
    },
    ShiftBehavior {
        name: "pfl",
        normal: "Headphone cue (PFL)",
        shifted: Some("Shift+PFL: toggle shift lock/unlock"),
    },
];

/// The number of hotcue pads per deck
const HOTCUE_SLOTS: usize = 4;

/// Ordered layers of [`Rule`]s
///
/// Layers are applied one after the other. Within a layer, only the first rule that
/// matches a row (and whose guard allows it) is applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleSet {
    layers: Vec<Vec<Rule>>,
}

impl RuleSet {
    /// Construct a rule set from its layers
    pub fn new(layers: Vec<Vec<Rule>>) -> Self {
        Self { layers }
    }

    /// The rules for the Denon MC2000 sheet
    ///
    /// The first layer is the shift-behavior table, applied wherever the shift command
    /// hasn't been filled in yet. The second layer holds the per-button overrides.
    ///
    /// The hotcue pad rules are the odd ones out: they overwrite unconditionally and aren't
    /// counted as updates, while every other rule is guarded and counted.
    pub fn mc2000() -> Self {
        let table = SHIFT_BEHAVIORS
            .iter()
            .map(|behavior| {
                let text = behavior.shifted.unwrap_or(behavior.normal);
                Rule {
                    guard: Guard::ShiftCommandUnset,
                    ..Rule::new(behavior.name, text, text)
                }
            })
            .collect();

        let mut overrides = vec![
            Rule::new(
                "playButton",
                "[ChannelN]cue_gotoandplay",
                "Shift: momentary goto & play cue",
            ),
            Rule::new(
                "cueButton",
                "[ChannelN]cue_gotoandplay",
                "Shift: momentary goto & play cue",
            ),
        ];

        overrides.extend((1..=HOTCUE_SLOTS).map(|slot| Rule {
            discriminator: Some(format!("hotcue_{slot}")),
            guard: Guard::Always,
            counted: false,
            ..Rule::new(
                "hotcuePad",
                &format!("[ChannelN]hotcue_{slot}_clear"),
                &format!("Shift: delete hotcue {slot}"),
            )
        }));

        overrides.extend([
            Rule::new(
                "syncButton",
                "[ChannelN]sync_enabled",
                "Shift: toggle sync lock",
            ),
            Rule::new(
                "keylockButton",
                "[ChannelN]rateRange",
                "Shift: cycle pitch range (6% -> 8% -> 12% -> 50%)",
            ),
        ]);

        Self::new(vec![table, overrides])
    }

    /// The layers, in the order they're applied
    pub fn layers(&self) -> &[Vec<Rule>] {
        &self.layers
    }
}

impl Default for RuleSet {
    fn default() -> Self {
        Self::mc2000()
    }
}

/// The outcome of an [`apply()`] pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OverlaySummary {
    /// The number of counted rule applications
    pub updated: usize,

    /// The number of applications of uncounted (unconditional) rules
    pub overwritten: usize,

    /// The (zero-based, header excluded) indices of rows any rule was applied to
    pub rows: Vec<usize>,
}

/// Apply a [`RuleSet`] to every row of the sheet
///
/// Every row except empty lines is padded to the width of the header first, so the shift
/// columns always exist. The command name is the trimmed text of the command column.
pub fn apply(
    document: &mut Document,
    layout: &Layout,
    rules: &RuleSet,
) -> Result<OverlaySummary, OverlayError> {
    let header = &document.header;
    let command = layout.command_column(header);
    let shift_command = require_column(header, &layout.shift_command_label)?;
    let shift_notes = require_column(header, &layout.shift_notes_label)?;
    let control_column = find_column(header, &layout.control_label);
    let width = header.len();

    let mut summary = OverlaySummary::default();

    for (row_index, row) in document.rows.iter_mut().enumerate() {
        // Empty lines stay empty
        if row.is_empty() {
            continue;
        }

        pad(row, width);

        let name = cell(row, command).trim().to_owned();
        let control = control_column
            .map(|column| cell(row, column).to_owned())
            .unwrap_or_default();
        let mut applied = false;

        for layer in rules.layers() {
            let rule = layer.iter().find(|rule| {
                rule.matches(&name, &control)
                    && rule
                        .guard
                        .allows(layout, &row[shift_command], &row[shift_notes])
            });

            if let Some(rule) = rule {
                debug!(row = row_index, name = %rule.name, "applying shift annotation");

                row[shift_command] = rule.shift_command.clone();
                row[shift_notes] = rule.shift_notes.clone();
                applied = true;

                if rule.counted {
                    summary.updated += 1;
                } else {
                    summary.overwritten += 1;
                }
            }
        }

        if applied {
            summary.rows.push(row_index);
        }
    }

    Ok(summary)
}

fn require_column(header: &[String], label: &str) -> Result<usize, OverlayError> {
    find_column(header, label).ok_or_else(|| OverlayError::MissingColumn(label.to_owned()))
}

/// Errors that might be returned from [`apply()`]
#[derive(Debug, Error, PartialEq, Eq)]
pub enum OverlayError {
    /// A column the annotations are written to is not in the header
    #[error("Column {0:?} not found in the header")]
    MissingColumn(String),
}
