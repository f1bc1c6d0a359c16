/// Outcome of a fill run.
use crate::fill::error::FieldError;
use crate::fill::mutate::StyleDegradation;
use indexmap::IndexMap;
use serde::Serialize;
use std::fmt;

/// Lifecycle of one field on one slide.
///
/// `Pending → Resolving → {Resolved → Mutating → {Mutated | MutationFailed}} | Unresolved`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldState {
    Pending,
    Resolving,
    Resolved,
    Mutating,
    Mutated,
    MutationFailed,
    Unresolved,
}

impl FieldState {
    /// Whether `next` may follow `self`.
    pub fn can_advance_to(self, next: FieldState) -> bool {
        use FieldState::*;
        matches!(
            (self, next),
            (Pending, Resolving)
                | (Resolving, Resolved)
                | (Resolving, Unresolved)
                | (Resolved, Mutating)
                | (Mutating, Mutated)
                | (Mutating, MutationFailed)
        )
    }

    /// Whether no further transition is possible.
    #[inline]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Mutated | Self::MutationFailed | Self::Unresolved)
    }
}

/// What happened to one field on one slide.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldOutcome {
    /// Schema key
    pub field: String,
    /// 1-based slide number
    pub slide: usize,
    /// Final state
    pub state: FieldState,
    /// Tier that resolved the element
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tier: Option<&'static str>,
    /// Matching elements seen while resolving
    pub occurrences_seen: usize,
    /// Failure, for unresolved or failed fields
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<FieldError>,
    /// Color that could not be reproduced
    #[serde(skip_serializing_if = "Option::is_none")]
    pub degradation: Option<StyleDegradation>,
}

/// Per-field verdict across all slides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldStatus {
    /// Replaced on at least one slide, style intact
    Matched,
    /// Replaced, but a color had to fall back to the default
    Degraded,
    /// Resolved but never successfully replaced
    Failed,
    /// Never resolved
    Unmatched,
}

/// Counts of [`FieldStatus`] over a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FillSummary {
    pub matched: usize,
    pub degraded: usize,
    pub failed: usize,
    pub unmatched: usize,
}

impl FillSummary {
    #[inline]
    pub fn total(&self) -> usize {
        self.matched + self.degraded + self.failed + self.unmatched
    }

    /// Whether every field was replaced somewhere.
    #[inline]
    pub fn is_complete(&self) -> bool {
        self.failed == 0 && self.unmatched == 0
    }
}

impl fmt::Display for FillSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} fields: {} matched, {} degraded, {} failed, {} unmatched",
            self.total(),
            self.matched,
            self.degraded,
            self.failed,
            self.unmatched
        )
    }
}

/// Everything a fill run did, in processing order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FillReport {
    /// Number of slides processed
    pub slides: usize,
    /// One entry per field per slide the field applied to
    pub outcomes: Vec<FieldOutcome>,
}

impl FillReport {
    /// Verdict for every field, in first-seen order.
    pub fn statuses(&self) -> IndexMap<&str, FieldStatus> {
        let mut statuses: IndexMap<&str, FieldStatus> = IndexMap::new();
        for outcome in &self.outcomes {
            let status = match (outcome.state, &outcome.degradation) {
                (FieldState::Mutated, None) => FieldStatus::Matched,
                (FieldState::Mutated, Some(_)) => FieldStatus::Degraded,
                (FieldState::MutationFailed, _) => FieldStatus::Failed,
                _ => FieldStatus::Unmatched,
            };
            statuses
                .entry(outcome.field.as_str())
                .and_modify(|current| *current = merge(*current, status))
                .or_insert(status);
        }
        statuses
    }

    /// Count fields per verdict.
    pub fn summary(&self) -> FillSummary {
        let mut summary = FillSummary::default();
        for status in self.statuses().values() {
            match status {
                FieldStatus::Matched => summary.matched += 1,
                FieldStatus::Degraded => summary.degraded += 1,
                FieldStatus::Failed => summary.failed += 1,
                FieldStatus::Unmatched => summary.unmatched += 1,
            }
        }
        summary
    }

    /// Outcomes of a single field.
    pub fn outcomes_for<'a>(&'a self, field: &'a str) -> impl Iterator<Item = &'a FieldOutcome> + 'a {
        self.outcomes.iter().filter(move |o| o.field == field)
    }

    /// Number of elements whose text was replaced.
    pub fn mutated_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| o.state == FieldState::Mutated)
            .count()
    }
}

/// Combine verdicts of one field from two slides.
fn merge(a: FieldStatus, b: FieldStatus) -> FieldStatus {
    use FieldStatus::*;
    match (a, b) {
        (Degraded, _) | (_, Degraded) => Degraded,
        (Matched, _) | (_, Matched) => Matched,
        (Failed, _) | (_, Failed) => Failed,
        _ => Unmatched,
    }
}
