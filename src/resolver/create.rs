use std::collections::HashMap;

use tracing::{debug, warn};

use super::Rejection;
use crate::document::{Occurrence, Paper};
use crate::spans::{EventSpan, Interval, ServerId, SpanStore};

/// Refuse a new event that would fully contain an existing one.
///
/// # Errors
///
/// Returns [`Rejection::SubsumesEvent`] when any event in `line_events` lies
/// within `interval`.
pub fn check_new_event(interval: Interval, line_events: &[&EventSpan]) -> Result<(), Rejection> {
    if line_events.iter().any(|e| interval.contains(e.interval)) {
        return Err(Rejection::SubsumesEvent);
    }
    Ok(())
}

/// A context occurrence that may be created, with the event moves it needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextCandidate {
    pub line: usize,
    pub interval: Interval,
    /// Events whose edges must move out of the way, with their new intervals
    pub adjustments: Vec<(ServerId, Interval)>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CandidateOutcome {
    Accepted(ContextCandidate),
    Rejected {
        occurrence: Occurrence,
        reason: Rejection,
    },
}

/// Plan the creation of a context for every occurrence of `text`.
///
/// Occurrences are planned in document order. Each one sees the contexts
/// and event moves of the occurrences accepted before it, so accepted
/// siblings never overlap each other. A rejected occurrence does not affect
/// the others.
pub fn plan_contexts(paper: &Paper, store: &SpanStore, text: &str) -> Vec<CandidateOutcome> {
    let mut accepted: Vec<(usize, Interval)> = Vec::new();
    let mut moved: HashMap<ServerId, Interval> = HashMap::new();
    let mut outcomes = Vec::new();

    for occurrence in paper.find_phrase(text) {
        let Occurrence { line, interval } = occurrence;

        let blocked = store
            .contexts_on_line(line)
            .iter()
            .map(|c| c.interval)
            .chain(accepted.iter().filter(|(l, _)| *l == line).map(|(_, i)| *i))
            .any(|existing| existing.overlaps(interval));
        if blocked {
            debug!(line, %interval, "context candidate overlaps an existing context");
            outcomes.push(CandidateOutcome::Rejected {
                occurrence,
                reason: Rejection::OverlapsContext { line, interval },
            });
            continue;
        }

        match make_room(interval, line, &store.events_on_line(line), &moved) {
            Ok(adjustments) => {
                for (id, new) in &adjustments {
                    moved.insert(*id, *new);
                }
                accepted.push((line, interval));
                outcomes.push(CandidateOutcome::Accepted(ContextCandidate {
                    line,
                    interval,
                    adjustments,
                }));
            }
            Err(reason) => {
                warn!(line, %interval, %reason, "context candidate aborted");
                outcomes.push(CandidateOutcome::Rejected { occurrence, reason });
            }
        }
    }
    outcomes
}

/// Push every event edge that falls inside `candidate` to the nearer
/// candidate edge. Ties extend the event over the candidate, except on a
/// one-word candidate, where the edge moves out of it.
#[allow(clippy::cast_possible_wrap, clippy::cast_sign_loss)]
fn make_room(
    candidate: Interval,
    line: usize,
    events: &[&EventSpan],
    moved: &HashMap<ServerId, Interval>,
) -> Result<Vec<(ServerId, Interval)>, Rejection> {
    let cstart = candidate.start as isize;
    let cend = candidate.end as isize;
    let extend_on_tie = candidate.len() > 1;
    let mut adjustments = Vec::new();

    for event in events {
        let current = moved.get(&event.server_id).copied().unwrap_or(event.interval);
        let mut left = current.start as isize;
        let mut right = current.end as isize;

        if candidate.contains_index(current.start) {
            let (to_start, to_end) = (left - cstart, cend - left);
            left = if to_start < to_end || (to_start == to_end && extend_on_tie) {
                cstart
            } else {
                cend + 1
            };
        }
        if candidate.contains_index(current.end) {
            let (to_start, to_end) = (right - cstart, cend - right);
            right = if to_end < to_start || (to_start == to_end && extend_on_tie) {
                cend
            } else {
                cstart - 1
            };
        }

        if right < left {
            return Err(Rejection::EventCollapse {
                line,
                event: event.server_id,
            });
        }
        let fixed = Interval::new(left as usize, right as usize);
        if fixed != current {
            debug!(event = %event.server_id, from = %current, to = %fixed, "event moved for context");
            adjustments.push((event.server_id, fixed));
        }
    }
    Ok(adjustments)
}
