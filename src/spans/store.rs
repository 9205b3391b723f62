use std::cell::OnceCell;
use std::collections::{BTreeMap, BTreeSet, HashMap};

use tracing::debug;

use super::types::{
    ContextSpan, EventId, EventSpan, GroundingId, Interval, ReferenceOp, ServerId, Span, SpanKey,
};

type LineIndex = HashMap<usize, Vec<usize>>;

/// Context and event collections for one paper, with lazy per-line indexes.
///
/// Events are kept sorted by `(line, interval.start)` and each event's
/// [`EventId`] equals its position in that order. Line indexes are dropped on
/// every write and rebuilt from the collections on the next read, so they can
/// never drift from the data.
///
/// The store does no collision checking: callers run the resolver first.
#[derive(Debug, Clone, Default)]
pub struct SpanStore {
    contexts: Vec<ContextSpan>,
    events: Vec<EventSpan>,
    context_lines: OnceCell<LineIndex>,
    event_lines: OnceCell<LineIndex>,
    /// Lines touched since the last [`SpanStore::take_dirty_lines`]
    dirty: BTreeSet<usize>,
}

impl SpanStore {
    /// Build a store from loaded spans. Events are sorted and numbered.
    pub fn new(contexts: Vec<ContextSpan>, mut events: Vec<EventSpan>) -> Self {
        events.sort_by_key(|e| (e.line, e.interval.start));
        let mut store = Self {
            contexts,
            events,
            ..Self::default()
        };
        store.renumber_events();
        store
    }

    pub fn contexts(&self) -> &[ContextSpan] {
        &self.contexts
    }

    pub fn events(&self) -> &[EventSpan] {
        &self.events
    }

    pub fn event_count(&self) -> usize {
        self.events.len()
    }

    pub fn event(&self, id: EventId) -> Option<&EventSpan> {
        self.events.get(id.0)
    }

    pub fn event_by_server(&self, id: ServerId) -> Option<&EventSpan> {
        self.events.iter().find(|e| e.server_id == id)
    }

    pub fn context_by_server(&self, id: ServerId) -> Option<&ContextSpan> {
        self.contexts.iter().find(|c| c.server_id == id)
    }

    /// Events on `line`, in collection order.
    pub fn events_on_line(&self, line: usize) -> Vec<&EventSpan> {
        let index = self
            .event_lines
            .get_or_init(|| build_index(self.events.iter().map(|e| e.line)));
        index
            .get(&line)
            .map(|positions| positions.iter().map(|&i| &self.events[i]).collect())
            .unwrap_or_default()
    }

    /// Contexts on `line`, in collection order.
    pub fn contexts_on_line(&self, line: usize) -> Vec<&ContextSpan> {
        let index = self
            .context_lines
            .get_or_init(|| build_index(self.contexts.iter().map(|c| c.line)));
        index
            .get(&line)
            .map(|positions| positions.iter().map(|&i| &self.contexts[i]).collect())
            .unwrap_or_default()
    }

    /// Insert an event at its sorted position and renumber the collection.
    ///
    /// Returns the id the event ended up with.
    pub fn insert_event(&mut self, event: EventSpan) -> EventId {
        let key = (event.line, event.interval.start);
        let at = self
            .events
            .partition_point(|e| (e.line, e.interval.start) <= key);
        self.touch(event.line);
        self.events.insert(at, event);
        self.renumber_events();
        self.event_lines.take();
        EventId(at)
    }

    pub fn insert_context(&mut self, context: ContextSpan) {
        self.touch(context.line);
        self.contexts.push(context);
        self.context_lines.take();
    }

    /// Remove a span, handing it back. Events are renumbered.
    pub fn remove(&mut self, key: SpanKey) -> Option<Span> {
        match key {
            SpanKey::Event(id) => {
                let pos = self.events.iter().position(|e| e.server_id == id)?;
                let removed = self.events.remove(pos);
                self.renumber_events();
                self.event_lines.take();
                self.touch(removed.line);
                Some(Span::Event(removed))
            }
            SpanKey::Context(id) => {
                let pos = self.contexts.iter().position(|c| c.server_id == id)?;
                let removed = self.contexts.remove(pos);
                self.context_lines.take();
                self.touch(removed.line);
                Some(Span::Context(removed))
            }
        }
    }

    /// Put back a span returned by [`SpanStore::remove`].
    pub fn restore(&mut self, span: Span) {
        match span {
            Span::Event(event) => {
                self.insert_event(event);
            }
            Span::Context(context) => self.insert_context(context),
        }
    }

    /// Replace a span's interval, returning the previous one.
    ///
    /// An event whose start moved is re-sorted and the collection renumbered,
    /// since trims can carry a start past a neighbour's.
    pub fn update_interval(&mut self, key: SpanKey, interval: Interval) -> Option<Interval> {
        let (line, previous) = match key {
            SpanKey::Event(id) => {
                let event = self.events.iter_mut().find(|e| e.server_id == id)?;
                let line = event.line;
                let previous = std::mem::replace(&mut event.interval, interval);
                if previous.start != interval.start {
                    self.events.sort_by_key(|e| (e.line, e.interval.start));
                    self.renumber_events();
                    self.event_lines.take();
                }
                (line, previous)
            }
            SpanKey::Context(id) => {
                let context = self.contexts.iter_mut().find(|c| c.server_id == id)?;
                (context.line, std::mem::replace(&mut context.interval, interval))
            }
        };
        self.touch(line);
        Some(previous)
    }

    /// Add `grounding` to the event if absent, remove it if present.
    pub fn toggle_reference(&mut self, id: EventId, grounding: &GroundingId) -> Option<ReferenceOp> {
        let event = self.events.get_mut(id.0)?;
        let op = if let Some(pos) = event.groundings.iter().position(|g| g == grounding) {
            event.groundings.remove(pos);
            ReferenceOp::Removed
        } else {
            event.groundings.push(grounding.clone());
            ReferenceOp::Added
        };
        let line = event.line;
        self.touch(line);
        Some(op)
    }

    /// Add a reference unless already present. Returns whether it was added.
    pub fn add_reference(&mut self, id: ServerId, grounding: &GroundingId) -> bool {
        let Some(event) = self.events.iter_mut().find(|e| e.server_id == id) else {
            return false;
        };
        if event.references(grounding) {
            return false;
        }
        event.groundings.push(grounding.clone());
        let line = event.line;
        self.touch(line);
        true
    }

    /// Remove a reference if present. Returns whether it was removed.
    pub fn remove_reference(&mut self, id: ServerId, grounding: &GroundingId) -> bool {
        let Some(event) = self.events.iter_mut().find(|e| e.server_id == id) else {
            return false;
        };
        let Some(pos) = event.groundings.iter().position(|g| g == grounding) else {
            return false;
        };
        event.groundings.remove(pos);
        let line = event.line;
        self.touch(line);
        true
    }

    /// Overwrite an event's references, returning the previous list.
    pub fn set_groundings(
        &mut self,
        id: ServerId,
        groundings: Vec<GroundingId>,
    ) -> Option<Vec<GroundingId>> {
        let event = self.events.iter_mut().find(|e| e.server_id == id)?;
        let previous = std::mem::replace(&mut event.groundings, groundings);
        let line = event.line;
        self.touch(line);
        Some(previous)
    }

    /// Set the false-positive mark, returning the previous value.
    pub fn set_false_positive(&mut self, id: ServerId, value: bool) -> Option<bool> {
        let event = self.events.iter_mut().find(|e| e.server_id == id)?;
        let previous = std::mem::replace(&mut event.false_positive, value);
        let line = event.line;
        self.touch(line);
        Some(previous)
    }

    /// Grounding id to its sorted, de-duplicated mention texts.
    pub fn grounding_index(&self) -> BTreeMap<GroundingId, Vec<String>> {
        let mut index: BTreeMap<GroundingId, Vec<String>> = BTreeMap::new();
        for context in &self.contexts {
            index
                .entry(context.grounding.clone())
                .or_default()
                .push(context.text.clone());
        }
        for texts in index.values_mut() {
            texts.sort();
            texts.dedup();
        }
        index
    }

    /// Drain the set of lines mutated since the last call.
    pub fn take_dirty_lines(&mut self) -> BTreeSet<usize> {
        std::mem::take(&mut self.dirty)
    }

    /// Forget that `line` was mutated, leaving other dirty lines queued.
    pub fn mark_clean(&mut self, line: usize) {
        self.dirty.remove(&line);
    }

    fn touch(&mut self, line: usize) {
        self.dirty.insert(line);
    }

    fn renumber_events(&mut self) {
        for (i, event) in self.events.iter_mut().enumerate() {
            event.event_id = EventId(i);
        }
        debug!(count = self.events.len(), "events renumbered");
    }
}

fn build_index(lines: impl Iterator<Item = usize>) -> LineIndex {
    let mut index = LineIndex::new();
    for (pos, line) in lines.enumerate() {
        index.entry(line).or_default().push(pos);
    }
    index
}
