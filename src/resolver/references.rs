use tracing::debug;

use crate::spans::{EventSpan, GroundingId, ReferenceOp, ServerId};

/// The effect of toggling one grounding on one event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TogglePlan {
    pub op: ReferenceOp,
    /// Other events on the line that follow the toggle
    pub propagate: Vec<(ServerId, ReferenceOp)>,
}

/// Plan toggling `grounding` on `target`.
///
/// An addition also goes to every event that contains the target and lacks
/// the reference. A removal also comes off every event the target contains
/// that holds the reference. Each pair follows one direction at most.
pub fn plan_toggle(target: &EventSpan, grounding: &GroundingId, line_events: &[&EventSpan]) -> TogglePlan {
    let op = if target.references(grounding) {
        ReferenceOp::Removed
    } else {
        ReferenceOp::Added
    };

    let mut propagate = Vec::new();
    for other in line_events.iter().filter(|e| e.server_id != target.server_id) {
        if other.interval.contains(target.interval) {
            if op == ReferenceOp::Added && !other.references(grounding) {
                propagate.push((other.server_id, ReferenceOp::Added));
            }
        } else if target.interval.contains(other.interval)
            && op == ReferenceOp::Removed
            && other.references(grounding)
        {
            propagate.push((other.server_id, ReferenceOp::Removed));
        }
    }
    debug!(event = %target.server_id, %grounding, ?op, followers = propagate.len(), "reference toggle planned");
    TogglePlan { op, propagate }
}
