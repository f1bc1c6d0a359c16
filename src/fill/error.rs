/// Per-field failures.
///
/// None of these abort a fill run: the filler records them in the
/// [`FillReport`](crate::fill::FillReport) and moves on to the next field.
use crate::ooxml::pptx::shapes::ShapePath;
use serde::Serialize;
use thiserror::Error;

/// Recoverable failure of one field on one slide.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FieldError {
    /// No element matched the field
    #[error("no element matches '{label}'")]
    ResolutionMiss { label: String },

    /// Elements matched, but not at the requested ordinal
    #[error("found {found} element(s) matching '{label}' but ordinal {expected} was requested")]
    OrdinalMismatch {
        label: String,
        expected: usize,
        found: usize,
    },

    /// The resolved element has no text body to write into
    #[error("element at {path} has no text body")]
    NoTextBody { path: String },

    /// The replacement text cannot be stored in XML 1.0
    #[error("replacement text contains a character XML cannot carry (U+{codepoint:04X})")]
    InvalidText { codepoint: u32 },
}

impl FieldError {
    pub(crate) fn no_text_body(path: &ShapePath) -> Self {
        Self::NoTextBody {
            path: format!("{:?}", path.nodes.as_slice())
                + &path
                    .cell
                    .map(|(r, c)| format!(" cell ({}, {})", r + 1, c + 1))
                    .unwrap_or_default(),
        }
    }

    /// Whether the failure happened while looking for the element.
    pub fn is_resolution_failure(&self) -> bool {
        matches!(self, Self::ResolutionMiss { .. } | Self::OrdinalMismatch { .. })
    }
}
