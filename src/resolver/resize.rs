use tracing::debug;

use super::Edge;
use crate::spans::{ContextSpan, EventSpan, Interval};

/// Compute the new interval of `active` when its `edge` handle is dropped at
/// word index `handle`.
///
/// `handle` is a value from [`crate::document::resolve_offset_to_word_index`]:
/// for the right edge it names the word after the span, so the candidate end
/// is `handle - 1`. A left edge may not cross an event that ends before the
/// fixed end (a right edge, one that starts after the fixed start). The edge
/// is then snapped out of multi-word contexts, towards the far side when the
/// nearer side lies inside a neighbour, and finally never crosses the fixed
/// edge. Only the fixed edge
/// and the handle feed the result, so repeating a resize changes nothing.
///
/// `events` and `contexts` are the spans on the active line; `active` itself
/// may be among them.
pub fn resize_event(
    active: &EventSpan,
    edge: Edge,
    handle: usize,
    events: &[&EventSpan],
    contexts: &[&ContextSpan],
) -> Interval {
    let start = to_signed(active.interval.start);
    let end = to_signed(active.interval.end);
    let mut index = match edge {
        Edge::Left => to_signed(handle),
        Edge::Right => to_signed(handle) - 1,
    };

    // Innermost index the moving edge may take without entering a neighbour.
    let bound = events
        .iter()
        .filter(|e| e.server_id != active.server_id)
        .filter_map(|other| {
            let other_start = to_signed(other.interval.start);
            let other_end = to_signed(other.interval.end);
            match edge {
                Edge::Left if other_end < end => Some(other_end + 1),
                Edge::Right if other_start > start => Some(other_start - 1),
                _ => None,
            }
        })
        .reduce(|a, b| match edge {
            Edge::Left => a.max(b),
            Edge::Right => a.min(b),
        });
    let within = |index: isize| {
        bound.is_none_or(|bound| match edge {
            Edge::Left => index >= bound,
            Edge::Right => index <= bound,
        })
    };
    if let Some(bound) = bound
        && !within(index)
    {
        index = bound;
    }

    for context in contexts.iter().filter(|c| c.interval.len() > 1) {
        let cstart = to_signed(context.interval.start);
        let cend = to_signed(context.interval.end);
        let to_start = index - cstart;
        let to_end = cend - index;
        match edge {
            Edge::Left if cstart < index && index <= cend => {
                index = if to_start <= to_end && within(cstart) { cstart } else { cend + 1 };
            }
            Edge::Right if cstart <= index && index < cend => {
                index = if to_end <= to_start && within(cend) { cend } else { cstart - 1 };
            }
            _ => {}
        }
    }

    let interval = match edge {
        Edge::Left => Interval::new(to_index(index.min(end)), active.interval.end),
        Edge::Right => Interval::new(active.interval.start, to_index(index.max(start))),
    };
    debug!(event = %active.server_id, ?edge, handle, %interval, "resize resolved");
    interval
}

#[allow(clippy::cast_possible_wrap)]
const fn to_signed(index: usize) -> isize {
    index as isize
}

#[allow(clippy::cast_sign_loss)]
const fn to_index(index: isize) -> usize {
    if index < 0 { 0 } else { index as usize }
}
