// Only allow lints that are either transitive-dependency noise or
// genuinely opinionated style choices that don't indicate real issues.
#![allow(
    // Transitive dependency version mismatches we can't control
    clippy::multiple_crate_versions,
    // module_name_repetitions is pure style preference (e.g. spans::SpanStore)
    clippy::module_name_repetitions
)]

//! # spanmend
//!
//! Keeps annotation spans on the sentences of a paper consistent while an
//! annotator edits them.
//!
//! Sentences are tokenized on single spaces. Contexts (grounded concept
//! mentions) and events are inclusive word intervals on one sentence.
//! Automatic spans come from a reader; manual spans from the annotator.
//! spanmend resolves selections and drag offsets to word intervals, keeps
//! spans from overlapping in ways the display cannot show, and hands every
//! authoritative change to a persistence collaborator without waiting on it.
//!
//! ## Architecture
//!
//! The edit controller uses The Elm Architecture (TEA):
//! - **Model**: Session state
//! - **Message**: User actions and collaborator replies
//! - **Update**: Pure state transitions
//! - **App**: Throttling, request coalescing and delivery
//!
//! ## Modules
//!
//! - [`app`]: Edit controller
//! - [`config`]: Option flags and rc files
//! - [`document`]: Sentences, pretty text and offset resolution
//! - [`remote`]: Persistence collaborator boundary
//! - [`resolver`]: Overlap resolution
//! - [`spans`]: Span types, the span store and snapshots

pub mod app;
pub mod config;
pub mod document;
pub mod remote;
pub mod resolver;
pub mod spans;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::app::{App, Message, Model};
    pub use crate::document::Paper;
    pub use crate::spans::{Interval, SpanStore};
}
