//! Personal record detection.
//!
//! A set is a PR when it is the first ever logged for the exercise, beats the
//! heaviest weight on record, or matches that weight with more reps than were
//! ever done at it.

use crate::HistorySet;

/// Decide whether `(weight, reps)` is a personal record against `prior` sets
///
/// `prior` must not contain the set being evaluated; see
/// [`crate::session::Tracker::check_pr`] for how re-saved sets are excluded.
pub fn is_pr(weight: f64, reps: u32, prior: &[HistorySet]) -> bool {
    if prior.is_empty() {
        return true;
    }

    let max_prior_weight = prior
        .iter()
        .filter_map(|s| s.weight)
        .fold(0.0_f64, f64::max);

    if weight > max_prior_weight {
        return true;
    }
    if weight < max_prior_weight {
        return false;
    }

    let best_reps_at_weight = prior
        .iter()
        .filter(|s| s.weight == Some(weight))
        .filter_map(|s| s.reps)
        .max()
        .unwrap_or(0);

    reps > best_reps_at_weight
}
