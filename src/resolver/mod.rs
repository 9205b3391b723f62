//! Overlap resolution between spans.
//!
//! Every function here is pure: it reads a snapshot of the spans on one line
//! (or the whole paper for context creation) and returns corrected geometry,
//! a plan of side-effect changes, or a [`Rejection`]. Nothing here touches
//! the store or talks to the collaborator; the edit controller applies the
//! results.

mod create;
mod reconcile;
mod references;
mod resize;

pub use create::{CandidateOutcome, ContextCandidate, check_new_event, plan_contexts};
pub use reconcile::{LinePlan, ViewOptions, plan_line};
pub use references::{TogglePlan, plan_toggle};
pub use resize::resize_event;

use crate::spans::{Interval, ServerId};

/// Which end of an event a resize handle moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Edge {
    Left,
    Right,
}

/// Why an edit was refused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Rejection {
    #[error("Selections must stay within a single sentence")]
    CrossesSentences,
    #[error("Selection is empty")]
    EmptySelection,
    #[error("Line {0} does not exist")]
    UnknownLine(usize),
    #[error("Selection starts or ends inside an existing event")]
    InsideEvent,
    #[error("Selection starts or ends in the middle of a context")]
    InsideContext,
    #[error("Selection would swallow an existing event; resize that event instead")]
    SubsumesEvent,
    #[error("No occurrence of \"{0}\" in the paper")]
    NoOccurrence(String),
    #[error("Line {line} {interval} overlaps an existing context")]
    OverlapsContext { line: usize, interval: Interval },
    #[error("Making room for a context on line {line} would collapse event {event}")]
    EventCollapse { line: usize, event: ServerId },
    #[error("{0} is disabled")]
    Disabled(&'static str),
    #[error("No event is active")]
    NoActiveEvent,
    #[error("Only manual spans can be deleted")]
    NotManual,
    #[error("Only automatic events can be marked as false positives")]
    NotAutomatic,
    #[error("Span {0} no longer exists")]
    UnknownSpan(ServerId),
}

#[cfg(test)]
mod tests;
