use tracing::debug;

use crate::app::{App, Message, Model, update};
use crate::remote::{CoalesceKey, Remote, Request, Ticket};

/// Limits how often a dragged handle is re-resolved.
///
/// The first offset after a quiet period runs at once; offsets arriving
/// within `interval_ms` of the last run are held, and only the newest one
/// survives.
pub(super) struct DragThrottle {
    interval_ms: u64,
    last_run: Option<u64>,
    pending: Option<usize>,
}

impl DragThrottle {
    pub(super) const fn new(interval_ms: u64) -> Self {
        Self {
            interval_ms,
            last_run: None,
            pending: None,
        }
    }

    /// Offer an offset. Returns it if it may run now.
    pub(super) fn offer(&mut self, offset: usize, now_ms: u64) -> Option<usize> {
        match self.last_run {
            Some(last) if now_ms.saturating_sub(last) < self.interval_ms => {
                self.pending = Some(offset);
                None
            }
            _ => {
                self.last_run = Some(now_ms);
                self.pending = None;
                Some(offset)
            }
        }
    }

    pub(super) fn take_ready(&mut self, now_ms: u64) -> Option<usize> {
        let offset = self.pending?;
        let last = self.last_run.unwrap_or(0);
        if now_ms.saturating_sub(last) >= self.interval_ms {
            self.pending = None;
            self.last_run = Some(now_ms);
            Some(offset)
        } else {
            None
        }
    }

    /// The held offset, regardless of timing.
    pub(super) const fn take_pending(&mut self) -> Option<usize> {
        self.pending.take()
    }

    pub(super) const fn cancel(&mut self) {
        self.pending = None;
    }

    pub(super) const fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

/// Holds full-state requests back for `delay_ms`, so that a burst of edits
/// to the same target reaches the collaborator as one request.
pub(super) struct RequestCoalescer {
    delay_ms: u64,
    pending: Vec<(CoalesceKey, Ticket, Request, u64)>,
}

impl RequestCoalescer {
    pub(super) const fn new(delay_ms: u64) -> Self {
        Self {
            delay_ms,
            pending: Vec::new(),
        }
    }

    /// Queue a request. Returns the ticket of the request it replaced, if
    /// one for the same target was still waiting.
    pub(super) fn queue(&mut self, ticket: Ticket, request: Request, now_ms: u64) -> Option<Ticket> {
        let key = request.coalesce_key()?;
        if let Some(slot) = self.pending.iter_mut().find(|(k, ..)| *k == key) {
            let older = slot.1;
            *slot = (key, ticket, request, now_ms);
            debug!(older = older.0, newer = ticket.0, "request coalesced");
            return Some(older);
        }
        self.pending.push((key, ticket, request, now_ms));
        None
    }

    pub(super) fn take_ready(&mut self, now_ms: u64) -> Vec<(Ticket, Request)> {
        let delay_ms = self.delay_ms;
        let (ready, waiting): (Vec<_>, Vec<_>) = std::mem::take(&mut self.pending)
            .into_iter()
            .partition(|(.., queued_at)| now_ms.saturating_sub(*queued_at) >= delay_ms);
        self.pending = waiting;
        ready.into_iter().map(|(_, ticket, request, _)| (ticket, request)).collect()
    }

    /// Everything still waiting, in queue order.
    pub(super) fn flush(&mut self) -> Vec<(Ticket, Request)> {
        self.pending
            .drain(..)
            .map(|(_, ticket, request, _)| (ticket, request))
            .collect()
    }

    pub(super) fn is_pending(&self) -> bool {
        !self.pending.is_empty()
    }
}

impl<R: Remote> App<R> {
    /// Apply one message at time `now_ms` and hand resulting requests on.
    ///
    /// Drag offsets pass through the throttle first. Changed lines are
    /// reconciled before returning.
    pub fn dispatch(&mut self, mut model: Model, msg: Message, now_ms: u64) -> Model {
        match msg {
            Message::DragResize(offset) => {
                let Some(offset) = self.throttle.offer(offset, now_ms) else {
                    return model;
                };
                model = update(model, Message::DragResize(offset));
            }
            Message::EndResize => {
                if let Some(offset) = self.throttle.take_pending() {
                    model = update(model, Message::DragResize(offset));
                }
                model = update(model, Message::EndResize);
            }
            Message::CancelResize => {
                self.throttle.cancel();
                model = update(model, Message::CancelResize);
            }
            other => model = update(model, other),
        }
        self.settle(model, now_ms)
    }

    /// Advance timers: run a held drag offset, send coalesced requests
    /// whose delay passed, and apply collaborator completions.
    pub fn tick(&mut self, mut model: Model, now_ms: u64) -> Model {
        if let Some(offset) = self.throttle.take_ready(now_ms) {
            model = update(model, Message::DragResize(offset));
        }
        for (ticket, request) in self.coalescer.take_ready(now_ms) {
            self.remote.submit(ticket, request);
        }
        model = self.receive(model);
        self.settle(model, now_ms)
    }

    /// Send every waiting request immediately and apply the completions
    /// available afterwards.
    pub fn flush(&mut self, model: Model, now_ms: u64) -> Model {
        let mut model = self.settle(model, now_ms);
        for (ticket, request) in self.coalescer.flush() {
            self.remote.submit(ticket, request);
        }
        model = self.receive(model);
        self.settle(model, now_ms)
    }

    /// Whether no request or drag offset is being held back.
    pub fn is_idle(&self) -> bool {
        !self.throttle.is_pending() && !self.coalescer.is_pending()
    }

    fn receive(&mut self, mut model: Model) -> Model {
        for completion in self.remote.poll() {
            model = update(model, Message::RemoteCompleted(completion));
        }
        model
    }

    fn settle(&mut self, model: Model, now_ms: u64) -> Model {
        let mut model = update(model, Message::ReconcileDirty);
        self.handle_message_side_effects(&mut model, now_ms);
        model
    }
}
