//! History summarizer for one exercise.
//!
//! Reduces raw set rows (in whatever order the store returns them) into a
//! [`PerformanceSummary`]: the top weight of the most recent session, whether
//! that session hit the rep ceiling on every set, and how many of the latest
//! sessions fell entirely below the rep floor.

use crate::{HistorySet, PerformanceSummary, RepRange};
use chrono::NaiveDate;
use std::collections::HashMap;
use uuid::Uuid;

/// The streak is only ever used as a "two sessions in a row" trigger
pub const UNDER_FLOOR_STREAK_CAP: u8 = 2;

/// All sets of one exercise within one workout
#[derive(Debug)]
struct SessionSets<'a> {
    id: Uuid,
    date: NaiveDate,
    sets: Vec<&'a HistorySet>,
}

impl SessionSets<'_> {
    fn top_weight(&self) -> Option<f64> {
        self.sets
            .iter()
            .filter_map(|s| s.weight)
            .fold(None, |max, w| Some(max.map_or(w, |m: f64| m.max(w))))
    }

    /// At least one recorded rep count and every one of them passes `pred`
    fn all_reps(&self, pred: impl Fn(u32) -> bool) -> bool {
        let mut reps = self.sets.iter().filter_map(|s| s.reps).peekable();
        reps.peek().is_some() && reps.all(pred)
    }
}

/// Group rows by session and order sessions newest first
///
/// Rows without a session date are dropped. Sessions on the same date are
/// ordered by id, newest id first.
fn sessions_newest_first(history: &[HistorySet]) -> Vec<SessionSets<'_>> {
    let mut by_session: HashMap<Uuid, SessionSets<'_>> = HashMap::new();

    for row in history {
        let Some(date) = row.session_date else {
            tracing::debug!(
                "Skipping set {} of session {} without a date",
                row.set_number,
                row.session_id
            );
            continue;
        };

        by_session
            .entry(row.session_id)
            .or_insert_with(|| SessionSets {
                id: row.session_id,
                date,
                sets: Vec::new(),
            })
            .sets
            .push(row);
    }

    let mut sessions: Vec<_> = by_session.into_values().collect();
    sessions.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| b.id.cmp(&a.id)));
    for session in &mut sessions {
        session.sets.sort_by_key(|s| s.set_number);
    }
    sessions
}

/// Summarize an exercise's history against its rep range
pub fn summarize(history: &[HistorySet], range: RepRange) -> PerformanceSummary {
    let sessions = sessions_newest_first(history);

    let Some(latest) = sessions.first() else {
        return PerformanceSummary::absent();
    };

    let last_top_weight = latest.top_weight();
    let met_ceiling = latest.all_reps(|reps| reps >= range.ceiling);

    let under_floor_streak = sessions
        .iter()
        .take(UNDER_FLOOR_STREAK_CAP as usize)
        .take_while(|session| session.all_reps(|reps| reps < range.floor))
        .count() as u8;

    tracing::debug!(
        "Summarized {} sessions: top weight {:?}, met ceiling {}, under-floor streak {}",
        sessions.len(),
        last_top_weight,
        met_ceiling,
        under_floor_streak
    );

    PerformanceSummary {
        last_top_weight,
        met_ceiling,
        under_floor_streak,
    }
}
