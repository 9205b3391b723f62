//! Boundary to the persistence collaborator.
//!
//! The edit controller never waits on the collaborator. It hands a
//! [`Request`] to a [`Remote`] together with a [`Ticket`], keeps going, and
//! later receives a [`Completion`] carrying the same ticket.

use std::collections::VecDeque;

use tracing::{debug, warn};

use crate::spans::{ContextSpan, EventId, EventSpan, GroundingId, Interval, Origin, ServerId};

/// Correlates a request with its completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Ticket(pub u64);

/// A change the collaborator should persist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    ResizeEvent {
        event: ServerId,
        interval: Interval,
    },
    CreateEvent {
        line: usize,
        interval: Interval,
    },
    DeleteEvent(ServerId),
    CreateContext {
        line: usize,
        interval: Interval,
        text: String,
    },
    DeleteContext(ServerId),
    /// Replace the full reference list of an event
    SaveGroundings {
        event: ServerId,
        groundings: Vec<GroundingId>,
    },
    ToggleFalsePositive(ServerId),
}

/// Requests that carry the complete target state, so a newer one makes an
/// older one for the same target redundant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CoalesceKey {
    Interval(ServerId),
    Groundings(ServerId),
}

impl Request {
    pub const fn coalesce_key(&self) -> Option<CoalesceKey> {
        match self {
            Self::ResizeEvent { event, .. } => Some(CoalesceKey::Interval(*event)),
            Self::SaveGroundings { event, .. } => Some(CoalesceKey::Groundings(*event)),
            _ => None,
        }
    }
}

/// Successful outcome of a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Ack,
    CreatedEvent(EventSpan),
    CreatedContext(ContextSpan),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RemoteError {
    #[error("server rejected the request: {0}")]
    Rejected(String),
    #[error("server unreachable")]
    Unreachable,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub ticket: Ticket,
    pub result: Result<Reply, RemoteError>,
}

/// Fire-and-forget persistence.
pub trait Remote {
    /// Queue a request. Must not block.
    fn submit(&mut self, ticket: Ticket, request: Request);

    /// Completions that arrived since the last poll, in arrival order.
    fn poll(&mut self) -> Vec<Completion>;
}

/// In-process collaborator that assigns server ids and answers on the next
/// poll. Failures can be injected for the next `n` requests.
#[derive(Debug, Default)]
pub struct MemoryRemote {
    next_id: u64,
    fail_next: usize,
    completed: VecDeque<Completion>,
    submitted: Vec<(Ticket, Request)>,
}

impl MemoryRemote {
    /// Server ids handed out for created spans start at `first_id`.
    pub fn new(first_id: u64) -> Self {
        Self {
            next_id: first_id,
            ..Self::default()
        }
    }

    /// Make the next `count` requests fail.
    pub const fn fail_next(&mut self, count: usize) {
        self.fail_next = count;
    }

    /// Every request received so far.
    pub fn submitted(&self) -> &[(Ticket, Request)] {
        &self.submitted
    }

    fn allocate(&mut self) -> ServerId {
        let id = ServerId(self.next_id);
        self.next_id += 1;
        id
    }

    fn answer(&mut self, request: &Request) -> Result<Reply, RemoteError> {
        if self.fail_next > 0 {
            self.fail_next -= 1;
            return Err(RemoteError::Unreachable);
        }
        Ok(match request {
            Request::CreateEvent { line, interval } => Reply::CreatedEvent(EventSpan {
                server_id: self.allocate(),
                event_id: EventId(0),
                line: *line,
                interval: *interval,
                groundings: Vec::new(),
                origin: Origin::Manual,
                false_positive: false,
            }),
            Request::CreateContext {
                line,
                interval,
                text,
            } => Reply::CreatedContext(ContextSpan {
                server_id: self.allocate(),
                line: *line,
                interval: *interval,
                grounding: GroundingId::for_mention(text),
                text: text.clone(),
                origin: Origin::Manual,
            }),
            _ => Reply::Ack,
        })
    }
}

impl Remote for MemoryRemote {
    fn submit(&mut self, ticket: Ticket, request: Request) {
        debug!(ticket = ticket.0, ?request, "request submitted");
        let result = self.answer(&request);
        if let Err(err) = &result {
            warn!(ticket = ticket.0, %err, "request failed");
        }
        self.completed.push_back(Completion { ticket, result });
        self.submitted.push((ticket, request));
    }

    fn poll(&mut self) -> Vec<Completion> {
        self.completed.drain(..).collect()
    }
}
