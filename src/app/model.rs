use std::collections::{HashMap, VecDeque};

use tracing::debug;

use crate::document::{Paper, prettify};
use crate::remote::{Request, Ticket};
use crate::resolver::{Edge, ViewOptions};
use crate::spans::{EventId, EventSpan, GroundingId, Interval, Origin, ServerId, Span, SpanStore};

/// Which edits the annotator may make.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnnotatorOptions {
    pub new_events: bool,
    pub delete_manual_events: bool,
    /// Master switch for resizing; the per-origin switches apply on top
    pub resize_events: bool,
    pub resize_manual_events: bool,
    pub resize_automatic_events: bool,
    pub new_contexts: bool,
    pub delete_manual_contexts: bool,
}

impl Default for AnnotatorOptions {
    fn default() -> Self {
        Self {
            new_events: true,
            delete_manual_events: true,
            resize_events: true,
            resize_manual_events: true,
            resize_automatic_events: true,
            new_contexts: true,
            delete_manual_contexts: true,
        }
    }
}

impl AnnotatorOptions {
    pub const fn may_resize(&self, origin: Origin) -> bool {
        self.resize_events
            && match origin {
                Origin::Manual => self.resize_manual_events,
                Origin::Automatic => self.resize_automatic_events,
            }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Success,
    Warning,
    Error,
}

/// A message for the user, drained by the rendering layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub severity: Severity,
    pub message: String,
}

/// A resize handle being dragged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) struct Drag {
    pub edge: Edge,
    pub event: ServerId,
    /// Interval the event would get if the handle were dropped now
    pub preview: Interval,
}

/// What an in-flight request changed locally, so a failure can undo it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) enum Pending {
    Interval {
        event: ServerId,
        applied: Interval,
        previous: Interval,
    },
    Groundings {
        event: ServerId,
        applied: Vec<GroundingId>,
        previous: Vec<GroundingId>,
    },
    FalsePositive {
        event: ServerId,
        applied: bool,
    },
    Deleted(Span),
    CreateEvent,
    CreateContext,
}

/// The complete state of one editing session.
///
/// All state lives here: the paper, its spans, the active event, queued
/// requests and the notices waiting to be shown.
#[derive(Debug, Clone)]
pub struct Model {
    /// The loaded paper
    pub paper: Paper,
    /// Context and event spans
    pub store: SpanStore,
    pub annotator: AnnotatorOptions,
    pub view: ViewOptions,
    active: Option<ServerId>,
    pub(super) drag: Option<Drag>,
    notices: VecDeque<Notice>,
    outbox: Vec<(Ticket, Request)>,
    pub(super) pending: HashMap<Ticket, Pending>,
    next_ticket: u64,
}

impl Model {
    /// Create a session. The first event, if any, starts active.
    pub fn new(paper: Paper, store: SpanStore) -> Self {
        let active = store.events().first().map(|e| e.server_id);
        Self {
            paper,
            store,
            annotator: AnnotatorOptions::default(),
            view: ViewOptions::default(),
            active,
            drag: None,
            notices: VecDeque::new(),
            outbox: Vec::new(),
            pending: HashMap::new(),
            next_ticket: 1,
        }
    }

    #[must_use]
    pub const fn with_annotator(mut self, options: AnnotatorOptions) -> Self {
        self.annotator = options;
        self
    }

    #[must_use]
    pub fn with_view(mut self, options: ViewOptions) -> Self {
        self.view = options;
        self
    }

    pub fn active_event(&self) -> Option<&EventSpan> {
        self.active.and_then(|id| self.store.event_by_server(id))
    }

    pub fn active_event_id(&self) -> Option<EventId> {
        self.active_event().map(|e| e.event_id)
    }

    pub(super) fn activate(&mut self, id: Option<ServerId>) {
        self.active = id;
        debug!(active = ?id, "active event changed");
    }

    /// Activate the event now sitting at `index`, or the last one.
    pub(super) fn activate_near(&mut self, index: usize) {
        let count = self.store.event_count();
        let id = (count > 0).then(|| EventId(index.min(count - 1)));
        self.activate(id.and_then(|id| self.store.event(id)).map(|e| e.server_id));
    }

    /// Whether a resize handle is being dragged.
    pub const fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// Where the dragged event would end up if dropped now.
    pub fn drag_preview(&self) -> Option<Interval> {
        self.drag.map(|d| d.preview)
    }

    /// Display text of a line.
    pub fn pretty_line(&self, line: usize) -> Option<String> {
        self.paper
            .sentence(line)
            .map(|s| prettify(&s.canonical(), &self.view.punctuation))
    }

    pub fn notify(&mut self, severity: Severity, message: impl Into<String>) {
        self.notices.push_back(Notice {
            severity,
            message: message.into(),
        });
    }

    /// Drain queued notices, oldest first.
    pub fn take_notices(&mut self) -> Vec<Notice> {
        self.notices.drain(..).collect()
    }

    /// Queue a request for the collaborator and remember how to undo it.
    pub(super) fn issue(&mut self, request: Request, pending: Pending) -> Ticket {
        let ticket = Ticket(self.next_ticket);
        self.next_ticket += 1;
        debug!(ticket = ticket.0, ?request, "request queued");
        self.pending.insert(ticket, pending);
        self.outbox.push((ticket, request));
        ticket
    }

    /// Drain requests queued since the last call.
    pub fn take_outbox(&mut self) -> Vec<(Ticket, Request)> {
        std::mem::take(&mut self.outbox)
    }

    /// Requests sent or queued that have not completed yet.
    pub fn pending_requests(&self) -> usize {
        self.pending.len()
    }

    /// `newer` replaced `older` before `older` was sent.
    ///
    /// The newer request inherits the older one's undo state, so a failure
    /// rolls back to what was there before either edit.
    pub(super) fn supersede(&mut self, older: Ticket, newer: Ticket) {
        let Some(old) = self.pending.remove(&older) else {
            return;
        };
        match (old, self.pending.get_mut(&newer)) {
            (
                Pending::Interval { previous, .. },
                Some(Pending::Interval {
                    previous: newer_previous,
                    ..
                }),
            ) => *newer_previous = previous,
            (
                Pending::Groundings { previous, .. },
                Some(Pending::Groundings {
                    previous: newer_previous,
                    ..
                }),
            ) => *newer_previous = previous,
            _ => {}
        }
    }
}
