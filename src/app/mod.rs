//! The edit controller.
//!
//! This module follows The Elm Architecture (TEA):
//! - [`Model`]: The complete state of an editing session
//! - [`Message`]: Every user action and collaborator reply
//! - [`update`]: Pure function for state transitions
//! - [`App::dispatch`]: Timing, routing of requests and collaborator replies

mod effects;
mod event_loop;
mod model;
mod update;

pub use model::{AnnotatorOptions, Model, Notice, Severity};
pub use update::{Message, Selection, update};

use crate::remote::Remote;

use event_loop::{DragThrottle, RequestCoalescer};

/// Drag offsets closer together than this are throttled.
pub const DEFAULT_THROTTLE_MS: u64 = 15;
/// Full-state requests wait this long for a newer version.
pub const DEFAULT_COALESCE_MS: u64 = 250;

/// Owns the collaborator connection and the timers around [`update`].
pub struct App<R: Remote> {
    remote: R,
    throttle: DragThrottle,
    coalescer: RequestCoalescer,
}

impl<R: Remote> App<R> {
    /// Create a controller talking to `remote`.
    pub const fn new(remote: R) -> Self {
        Self {
            remote,
            throttle: DragThrottle::new(DEFAULT_THROTTLE_MS),
            coalescer: RequestCoalescer::new(DEFAULT_COALESCE_MS),
        }
    }

    /// Set the drag throttle interval.
    #[must_use]
    pub const fn with_throttle_ms(mut self, ms: u64) -> Self {
        self.throttle = DragThrottle::new(ms);
        self
    }

    /// Set how long full-state requests are held back.
    #[must_use]
    pub fn with_coalesce_ms(mut self, ms: u64) -> Self {
        self.coalescer = RequestCoalescer::new(ms);
        self
    }

    pub const fn remote(&self) -> &R {
        &self.remote
    }

    pub const fn remote_mut(&mut self) -> &mut R {
        &mut self.remote
    }
}
