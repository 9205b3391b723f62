//! Span data model and the line-indexed span store.
//!
//! - [`Interval`], [`ContextSpan`], [`EventSpan`]: the two span families
//! - [`SpanStore`]: per-paper collections with lazily rebuilt line indexes
//! - [`Snapshot`]: the load/save form exchanged with the collaborator

mod snapshot;
mod store;
mod types;

pub use snapshot::{ContextRecord, EventRecord, PaperRecord, Snapshot, SnapshotError};
pub use store::SpanStore;
pub use types::{
    ContextSpan, EventId, EventSpan, GroundingId, Interval, Origin, ReferenceOp, ServerId, Span,
    SpanKey, SpanKind,
};
