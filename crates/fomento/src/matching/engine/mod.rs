//! The canonical scoring engine. Every consumer (service layer, HTTP
//! routes, CLI) goes through `score_match` and `compose_rating`; there is
//! deliberately no second implementation of either formula anywhere in the
//! workspace.

mod cnae;
mod rating;
mod rules;

pub use cnae::{classify_cnae, CnaeAssessment, CnaeTier};
pub use rating::{compose_rating, ease_score, value_score, Rating};
pub use rules::score_match;

use serde::{Deserialize, Serialize};

/// Severity of a single reason entry.
///
/// A blocker forces `eligible = false` regardless of the numeric score; a
/// warning reduces credit but never disqualifies on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReasonTag {
    Positive,
    Warning,
    Blocker,
}

/// One classified, human-readable contribution to a match evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchReason {
    pub tag: ReasonTag,
    pub text: String,
}

impl MatchReason {
    pub(crate) fn positive(text: impl Into<String>) -> Self {
        Self {
            tag: ReasonTag::Positive,
            text: text.into(),
        }
    }

    pub(crate) fn warning(text: impl Into<String>) -> Self {
        Self {
            tag: ReasonTag::Warning,
            text: text.into(),
        }
    }

    pub(crate) fn blocker(text: impl Into<String>) -> Self {
        Self {
            tag: ReasonTag::Blocker,
            text: text.into(),
        }
    }
}

/// Outcome of scoring one (company, grant) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    /// Bounded fit score, always within `[0, 100]`.
    pub score: u8,
    /// Derived, not accumulated: false iff at least one blocker fired. A low
    /// score without a blocker still means the company technically qualifies.
    pub eligible: bool,
    /// Reasons in factor-evaluation order.
    pub reasons: Vec<MatchReason>,
}

impl MatchResult {
    pub(crate) fn from_parts(total: f64, reasons: Vec<MatchReason>) -> Self {
        let score = total.round().clamp(0.0, 100.0) as u8;
        let eligible = !reasons
            .iter()
            .any(|reason| reason.tag == ReasonTag::Blocker);
        Self {
            score,
            eligible,
            reasons,
        }
    }

    pub fn blockers(&self) -> impl Iterator<Item = &MatchReason> {
        self.reasons
            .iter()
            .filter(|reason| reason.tag == ReasonTag::Blocker)
    }
}

/// Case-insensitive substring containment, used by the sector and theme
/// factors which match in either direction.
pub(crate) fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Preview the first `limit` entries of a list, appending an ellipsis when
/// entries were dropped.
pub(crate) fn preview_list(values: &[String], limit: usize) -> String {
    let mut preview = values
        .iter()
        .take(limit)
        .cloned()
        .collect::<Vec<_>>()
        .join(", ");
    if values.len() > limit {
        preview.push_str(", ...");
    }
    preview
}
