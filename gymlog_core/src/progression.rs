//! Double-progression rules for suggesting the next working weight.
//!
//! Rules are applied in priority order:
//! 1. No usable history (absent or zero top weight): no suggestion
//! 2. Two sessions in a row below the rep floor: deload by 5%
//! 3. Every set of the last session at the rep ceiling: add the increment
//! 4. Otherwise: hold the current weight

use crate::config::ProgressionConfig;
use crate::history::UNDER_FLOOR_STREAK_CAP;
use crate::{Classification, PerformanceSummary, RepRange};
use serde::Serialize;

/// Why a weight was suggested
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SuggestionReason {
    /// Repeated sessions under the rep floor
    Deload,
    /// All sets reached the rep ceiling last time
    Increase { increment: f64 },
    /// Still reps to earn before adding load
    Hold,
}

/// A suggested working weight for the next session
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Suggestion {
    pub weight: f64,
    pub reason: SuggestionReason,
}

/// Round to the nearest multiple of `step`
///
/// The final pass through six decimals strips float noise such as
/// `95.00000000000001` so suggestions compare and print cleanly.
pub fn round_to_step(weight: f64, step: f64) -> f64 {
    let stepped = (weight / step).round() * step;
    (stepped * 1e6).round() / 1e6
}

/// Suggest the next working weight, or `None` when the lifter must pick one
///
/// `range` must be the range the summary was computed against. Only its
/// shape is checked here: debug builds assert it is not inverted.
pub fn suggest(
    classification: Option<Classification>,
    range: RepRange,
    summary: &PerformanceSummary,
    params: &ProgressionConfig,
) -> Option<Suggestion> {
    debug_assert!(range.floor <= range.ceiling);

    let last = match summary.last_top_weight {
        Some(w) if w > 0.0 => w,
        _ => {
            tracing::debug!("No working weight on record, starting weight needed");
            return None;
        }
    };

    let suggestion = if summary.under_floor_streak >= UNDER_FLOOR_STREAK_CAP {
        Suggestion {
            weight: round_to_step(last * params.deload_factor, params.rounding_step),
            reason: SuggestionReason::Deload,
        }
    } else if summary.met_ceiling {
        let increment = params.increment_for(classification);
        Suggestion {
            weight: round_to_step(last + increment, params.rounding_step),
            reason: SuggestionReason::Increase { increment },
        }
    } else {
        Suggestion {
            weight: round_to_step(last, params.rounding_step),
            reason: SuggestionReason::Hold,
        }
    };

    tracing::debug!(
        "Suggested {} from {} ({:?}, range {})",
        suggestion.weight,
        last,
        suggestion.reason,
        range
    );

    Some(suggestion)
}
