use tracing::{debug, info, warn};

use crate::app::Model;
use crate::app::model::{Drag, Pending, Severity};
use crate::document::{Snap, prettify, resolve_offset_to_word_index};
use crate::remote::{Completion, RemoteError, Reply, Request};
use crate::resolver::{
    CandidateOutcome, Edge, Rejection, check_new_event, plan_contexts, plan_line, plan_toggle,
    resize_event,
};
use crate::spans::{EventId, EventSpan, GroundingId, Interval, ReferenceOp, ServerId, SpanKey};

/// A text selection, as character offsets into the display text of a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    pub start_line: usize,
    pub start_offset: usize,
    pub end_line: usize,
    pub end_offset: usize,
}

impl Selection {
    /// A selection within one line.
    pub const fn on_line(line: usize, start_offset: usize, end_offset: usize) -> Self {
        Self {
            start_line: line,
            start_offset,
            end_line: line,
            end_offset,
        }
    }
}

/// Every user action and collaborator reply the controller reacts to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    // Navigation
    /// Make an event active by its collection index
    ActivateEvent(EventId),
    /// Activate the following event; stays on the last one
    NextEvent,
    /// Activate the preceding event; stays on the first one
    PrevEvent,
    /// Activate the n-th event, counting from 1
    JumpToEvent(usize),

    // Resizing
    /// Grab a handle of the active event
    BeginResize(Edge),
    /// Move the grabbed handle to a display offset on the event's line
    DragResize(usize),
    /// Drop the handle and keep the previewed interval
    EndResize,
    /// Drop the handle and keep the event as it was
    CancelResize,

    // Creation and deletion
    CreateEvent(Selection),
    /// Create a context at every occurrence of the text
    CreateContexts(String),
    DeleteActiveEvent,
    DeleteContext(ServerId),

    // Annotation
    /// Add or remove a reference on the active event
    ToggleReference(GroundingId),
    /// Flip the false-positive mark of the active event
    ToggleFalsePositive,

    // Display
    ReconcileLine(usize),
    /// Reconcile the lines changed since the last reconciliation
    ReconcileDirty,
    ReconcileAll,

    // Collaborator
    RemoteCompleted(Completion),
}

/// Pure state transition: apply a message to the model.
///
/// Requests for the collaborator are queued on the model, never sent from
/// here.
pub fn update(mut model: Model, msg: Message) -> Model {
    if model.is_dragging()
        && !matches!(
            msg,
            Message::DragResize(_)
                | Message::EndResize
                | Message::CancelResize
                | Message::RemoteCompleted(_)
                | Message::ReconcileDirty
        )
    {
        debug!("resize abandoned");
        model.drag = None;
    }

    match msg {
        // Navigation
        Message::ActivateEvent(id) => {
            if let Some(event) = model.store.event(id) {
                let server_id = event.server_id;
                model.activate(Some(server_id));
            }
        }
        Message::NextEvent => step_active(&mut model, true),
        Message::PrevEvent => step_active(&mut model, false),
        Message::JumpToEvent(number) => {
            let target = number
                .checked_sub(1)
                .and_then(|index| model.store.event(EventId(index)))
                .map(|e| e.server_id);
            match target {
                Some(id) => model.activate(Some(id)),
                None => model.notify(Severity::Warning, format!("There is no event {number}")),
            }
        }

        // Resizing
        Message::BeginResize(edge) => begin_resize(&mut model, edge),
        Message::DragResize(offset) => drag_to(&mut model, offset),
        Message::EndResize => end_resize(&mut model),
        Message::CancelResize => model.drag = None,

        // Creation and deletion
        Message::CreateEvent(selection) => create_event(&mut model, &selection),
        Message::CreateContexts(text) => create_contexts(&mut model, &text),
        Message::DeleteActiveEvent => delete_active_event(&mut model),
        Message::DeleteContext(id) => delete_context(&mut model, id),

        // Annotation
        Message::ToggleReference(grounding) => toggle_reference(&mut model, &grounding),
        Message::ToggleFalsePositive => toggle_false_positive(&mut model),

        // Display
        Message::ReconcileLine(line) => {
            reconcile_line(&mut model, line);
            model.store.mark_clean(line);
        }
        Message::ReconcileDirty => {
            for line in model.store.take_dirty_lines() {
                reconcile_line(&mut model, line);
            }
            model.store.take_dirty_lines();
        }
        Message::ReconcileAll => {
            for line in 0..model.paper.line_count() {
                reconcile_line(&mut model, line);
            }
            model.store.take_dirty_lines();
        }

        // Collaborator
        Message::RemoteCompleted(completion) => complete(&mut model, completion),
    }

    model
}

fn refuse(model: &mut Model, reason: &Rejection) {
    warn!(%reason, "edit refused");
    model.notify(Severity::Warning, reason.to_string());
}

fn step_active(model: &mut Model, forward: bool) {
    let count = model.store.event_count();
    if count == 0 {
        return;
    }
    let index = match (model.active_event_id(), forward) {
        (None, _) => 0,
        (Some(EventId(i)), true) => (i + 1).min(count - 1),
        (Some(EventId(i)), false) => i.saturating_sub(1),
    };
    model.activate_near(index);
}

fn begin_resize(model: &mut Model, edge: Edge) {
    let Some(event) = model.active_event() else {
        refuse(model, &Rejection::NoActiveEvent);
        return;
    };
    if !model.annotator.may_resize(event.origin) {
        refuse(model, &Rejection::Disabled("Resizing this event"));
        return;
    }
    model.drag = Some(Drag {
        edge,
        event: event.server_id,
        preview: event.interval,
    });
}

fn drag_to(model: &mut Model, offset: usize) {
    let Some(drag) = model.drag else {
        return;
    };
    let Some(event) = model.store.event_by_server(drag.event) else {
        model.drag = None;
        return;
    };
    let Some(sentence) = model.paper.sentence(event.line) else {
        return;
    };
    let canonical = sentence.canonical();
    let pretty = prettify(&canonical, &model.view.punctuation);
    let handle = resolve_offset_to_word_index(&canonical, &pretty, offset, Snap::Nearest);
    let events = model.store.events_on_line(event.line);
    let contexts = model.store.contexts_on_line(event.line);
    let preview = resize_event(event, drag.edge, handle, &events, &contexts);
    model.drag = Some(Drag { preview, ..drag });
}

fn end_resize(model: &mut Model) {
    let Some(drag) = model.drag.take() else {
        return;
    };
    persist_interval(model, drag.event, drag.preview);
}

/// Apply an event interval locally and ask the collaborator to store it.
fn persist_interval(model: &mut Model, event: ServerId, interval: Interval) {
    let Some(previous) = model.store.update_interval(SpanKey::Event(event), interval) else {
        return;
    };
    if previous == interval {
        return;
    }
    info!(%event, from = %previous, to = %interval, "event resized");
    model.issue(
        Request::ResizeEvent { event, interval },
        Pending::Interval {
            event,
            applied: interval,
            previous,
        },
    );
}

/// Turn a raw selection into the word interval of a new event.
pub(super) fn selection_interval(model: &Model, selection: &Selection) -> Result<(usize, Interval), Rejection> {
    if selection.start_line != selection.end_line {
        return Err(Rejection::CrossesSentences);
    }
    let line = selection.start_line;
    let sentence = model.paper.sentence(line).ok_or(Rejection::UnknownLine(line))?;
    let canonical = sentence.canonical();
    let pretty = prettify(&canonical, &model.view.punctuation);

    let (from, to) = if selection.start_offset <= selection.end_offset {
        (selection.start_offset, selection.end_offset)
    } else {
        (selection.end_offset, selection.start_offset)
    };
    let selected: String = pretty.chars().skip(from).take(to.saturating_sub(from)).collect();
    if selected.trim().is_empty() {
        return Err(Rejection::EmptySelection);
    }

    let pieces: Vec<&str> = selected.split(' ').collect();
    let single_word = pieces.len() == 1 || (pieces.len() == 2 && pieces[1].is_empty());
    let interval = if single_word {
        let start = resolve_offset_to_word_index(&canonical, &pretty, from, Snap::LeftOnly);
        Interval::single(start)
    } else {
        let start = resolve_offset_to_word_index(&canonical, &pretty, from, Snap::Nearest);
        let end = resolve_offset_to_word_index(&canonical, &pretty, to, Snap::Nearest);
        Interval::new(start, if end > start { end - 1 } else { start })
    };
    if !sentence.holds(interval) {
        return Err(Rejection::EmptySelection);
    }

    let events = model.store.events_on_line(line);
    let endpoint_inside = |e: &&EventSpan| {
        e.interval.contains_index(interval.start) || e.interval.contains_index(interval.end)
    };
    if events.iter().any(endpoint_inside) {
        return Err(Rejection::InsideEvent);
    }
    let splits_context = model.store.contexts_on_line(line).iter().any(|c| {
        let ctx = c.interval;
        (ctx.start < interval.start && interval.start <= ctx.end)
            || (ctx.start <= interval.end && interval.end < ctx.end)
    });
    if splits_context {
        return Err(Rejection::InsideContext);
    }
    check_new_event(interval, &events)?;
    Ok((line, interval))
}

fn create_event(model: &mut Model, selection: &Selection) {
    if !model.annotator.new_events {
        refuse(model, &Rejection::Disabled("Creating events"));
        return;
    }
    match selection_interval(model, selection) {
        Ok((line, interval)) => {
            info!(line, %interval, "event creation requested");
            model.issue(Request::CreateEvent { line, interval }, Pending::CreateEvent);
        }
        Err(reason) => refuse(model, &reason),
    }
}

fn create_contexts(model: &mut Model, text: &str) {
    let text = text.trim();
    if text.is_empty() {
        model.notify(Severity::Warning, "Enter the text of the new context");
        return;
    }
    if !model.annotator.new_contexts {
        refuse(model, &Rejection::Disabled("Creating contexts"));
        return;
    }

    let outcomes = plan_contexts(&model.paper, &model.store, text);
    if outcomes.is_empty() {
        refuse(model, &Rejection::NoOccurrence(text.to_string()));
        return;
    }

    let mut requested = 0usize;
    for outcome in outcomes {
        match outcome {
            CandidateOutcome::Accepted(candidate) => {
                for (event, interval) in candidate.adjustments {
                    persist_interval(model, event, interval);
                }
                model.issue(
                    Request::CreateContext {
                        line: candidate.line,
                        interval: candidate.interval,
                        text: text.to_string(),
                    },
                    Pending::CreateContext,
                );
                requested += 1;
            }
            CandidateOutcome::Rejected { reason, .. } => refuse(model, &reason),
        }
    }
    if requested > 0 {
        info!(text, requested, "context creation requested");
        model.notify(
            Severity::Info,
            format!("Creating {requested} context(s) for \"{text}\""),
        );
    }
}

fn delete_active_event(model: &mut Model) {
    let Some(event) = model.active_event() else {
        refuse(model, &Rejection::NoActiveEvent);
        return;
    };
    if !event.origin.is_manual() {
        refuse(model, &Rejection::NotManual);
        return;
    }
    if !model.annotator.delete_manual_events {
        refuse(model, &Rejection::Disabled("Deleting events"));
        return;
    }
    let id = event.server_id;
    let EventId(index) = event.event_id;
    let Some(removed) = model.store.remove(SpanKey::Event(id)) else {
        return;
    };
    info!(event = %id, "event deleted");
    model.issue(Request::DeleteEvent(id), Pending::Deleted(removed));
    model.activate_near(index.saturating_sub(1));
}

fn delete_context(model: &mut Model, id: ServerId) {
    if !model.annotator.delete_manual_contexts {
        refuse(model, &Rejection::Disabled("Deleting contexts"));
        return;
    }
    let Some(context) = model.store.context_by_server(id) else {
        refuse(model, &Rejection::UnknownSpan(id));
        return;
    };
    if !context.origin.is_manual() {
        refuse(model, &Rejection::NotManual);
        return;
    }
    let Some(removed) = model.store.remove(SpanKey::Context(id)) else {
        return;
    };
    info!(context = %id, "context deleted");
    model.issue(Request::DeleteContext(id), Pending::Deleted(removed));
}

fn toggle_reference(model: &mut Model, grounding: &GroundingId) {
    let Some(target) = model.active_event() else {
        refuse(model, &Rejection::NoActiveEvent);
        return;
    };
    let target_id = target.server_id;
    let event_id = target.event_id;
    let plan = plan_toggle(target, grounding, &model.store.events_on_line(target.line));

    let touched: Vec<(ServerId, Vec<GroundingId>)> = std::iter::once(target_id)
        .chain(plan.propagate.iter().map(|(id, _)| *id))
        .filter_map(|id| {
            model
                .store
                .event_by_server(id)
                .map(|e| (id, e.groundings.clone()))
        })
        .collect();

    model.store.toggle_reference(event_id, grounding);
    for (id, op) in &plan.propagate {
        match op {
            ReferenceOp::Added => model.store.add_reference(*id, grounding),
            ReferenceOp::Removed => model.store.remove_reference(*id, grounding),
        };
    }

    for (event, previous) in touched {
        let Some(applied) = model.store.event_by_server(event).map(|e| e.groundings.clone()) else {
            continue;
        };
        model.issue(
            Request::SaveGroundings {
                event,
                groundings: applied.clone(),
            },
            Pending::Groundings {
                event,
                applied,
                previous,
            },
        );
    }
}

fn toggle_false_positive(model: &mut Model) {
    let Some(event) = model.active_event() else {
        refuse(model, &Rejection::NoActiveEvent);
        return;
    };
    if event.origin.is_manual() {
        refuse(model, &Rejection::NotAutomatic);
        return;
    }
    let id = event.server_id;
    let applied = !event.false_positive;
    model.store.set_false_positive(id, applied);
    model.issue(
        Request::ToggleFalsePositive(id),
        Pending::FalsePositive { event: id, applied },
    );
}

fn reconcile_line(model: &mut Model, line: usize) {
    let Some(sentence) = model.paper.sentence(line) else {
        return;
    };
    let plan = plan_line(&model.store.events_on_line(line), sentence.words(), &model.view);
    if plan.is_empty() {
        return;
    }
    for id in &plan.hidden {
        model.store.remove(SpanKey::Event(*id));
    }
    for (id, interval) in &plan.trimmed {
        model.store.update_interval(SpanKey::Event(*id), *interval);
    }
    for (id, interval) in plan.persisted {
        persist_interval(model, id, interval);
    }
}

fn complete(model: &mut Model, completion: Completion) {
    let Completion { ticket, result } = completion;
    let Some(pending) = model.pending.remove(&ticket) else {
        warn!(ticket = ticket.0, "completion for unknown request");
        return;
    };
    match result {
        Ok(reply) => apply_reply(model, pending, reply),
        Err(err) => roll_back(model, pending, &err),
    }
}

fn apply_reply(model: &mut Model, pending: Pending, reply: Reply) {
    match (pending, reply) {
        (Pending::CreateEvent, Reply::CreatedEvent(event)) => {
            let id = event.server_id;
            model.store.insert_event(event);
            model.activate(Some(id));
            model.notify(Severity::Success, "Event created");
        }
        (Pending::CreateContext, Reply::CreatedContext(context)) => {
            debug!(context = %context.server_id, "context created");
            model.store.insert_context(context);
        }
        (_, Reply::Ack) => {}
        (pending, reply) => warn!(?pending, ?reply, "reply does not match the request"),
    }
}

/// Undo an optimistic change, unless a later edit already replaced it.
fn roll_back(model: &mut Model, pending: Pending, err: &RemoteError) {
    warn!(%err, ?pending, "request failed");
    match pending {
        Pending::Interval {
            event,
            applied,
            previous,
        } => {
            let current = model.store.event_by_server(event).map(|e| e.interval);
            if current == Some(applied) {
                model.store.update_interval(SpanKey::Event(event), previous);
            }
        }
        Pending::Groundings {
            event,
            applied,
            previous,
        } => {
            let unchanged = model
                .store
                .event_by_server(event)
                .is_some_and(|e| e.groundings == applied);
            if unchanged {
                model.store.set_groundings(event, previous);
            }
        }
        Pending::FalsePositive { event, applied } => {
            let current = model.store.event_by_server(event).map(|e| e.false_positive);
            if current == Some(applied) {
                model.store.set_false_positive(event, !applied);
            }
        }
        Pending::Deleted(span) => {
            let present = match span.key() {
                SpanKey::Event(id) => model.store.event_by_server(id).is_some(),
                SpanKey::Context(id) => model.store.context_by_server(id).is_some(),
            };
            if !present {
                model.store.restore(span);
            }
        }
        Pending::CreateEvent | Pending::CreateContext => {}
    }
    model.notify(Severity::Error, format!("Could not save the change: {err}"));
}
