//! Session snapshot exchanged with the persistence collaborator.

use serde::{Deserialize, Serialize};

use super::store::SpanStore;
use super::types::{ContextSpan, EventId, EventSpan, GroundingId, Interval, Origin, ServerId};
use crate::document::Paper;

#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("malformed snapshot: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("span {id} refers to line {line}, but the paper has {lines} lines")]
    UnknownLine { id: ServerId, line: usize, lines: usize },
    #[error("span {id} on line {line} has interval {interval} outside the sentence")]
    BadInterval {
        id: ServerId,
        line: usize,
        interval: Interval,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaperRecord {
    pub id: String,
    #[serde(default)]
    pub title: String,
    pub sentences: Vec<String>,
    #[serde(default)]
    pub sections: Vec<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextRecord {
    pub id: ServerId,
    pub line_num: usize,
    pub interval_start: usize,
    pub interval_end: usize,
    #[serde(rename = "type")]
    pub origin: Origin,
    #[serde(default)]
    pub free_text: String,
    #[serde(default)]
    pub grounding_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    pub id: ServerId,
    pub line_num: usize,
    pub interval_start: usize,
    pub interval_end: usize,
    #[serde(rename = "type")]
    pub origin: Origin,
    #[serde(default)]
    pub groundings: Vec<String>,
    #[serde(default)]
    pub false_positive: bool,
}

/// Everything the collaborator hands over at session start.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub paper: PaperRecord,
    #[serde(default)]
    pub contexts_reach: Vec<ContextRecord>,
    #[serde(default)]
    pub contexts_manual: Vec<ContextRecord>,
    #[serde(default)]
    pub events: Vec<EventRecord>,
}

impl Snapshot {
    /// Parse a snapshot from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError::Parse`] when the text is not a valid snapshot.
    pub fn from_json(text: &str) -> Result<Self, SnapshotError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Validate every record against the paper and build the session state.
    ///
    /// Reach and manual contexts are merged into one collection. Contexts
    /// without a grounding get a synthetic one derived from their text, and
    /// contexts without text take it from the sentence.
    ///
    /// # Errors
    ///
    /// Fails on the first span whose line or interval does not exist.
    pub fn into_session(self) -> Result<(Paper, SpanStore), SnapshotError> {
        let paper = Paper::new(self.paper.id, self.paper.title, &self.paper.sentences)
            .with_sections(self.paper.sections);

        let contexts = self
            .contexts_reach
            .into_iter()
            .chain(self.contexts_manual)
            .map(|record| context_from_record(&paper, record))
            .collect::<Result<Vec<_>, _>>()?;
        let events = self
            .events
            .into_iter()
            .map(|record| event_from_record(&paper, record))
            .collect::<Result<Vec<_>, _>>()?;

        tracing::info!(
            paper = %paper.id,
            lines = paper.line_count(),
            contexts = contexts.len(),
            events = events.len(),
            "snapshot loaded"
        );
        Ok((paper, SpanStore::new(contexts, events)))
    }

    /// Capture the current session state in snapshot form.
    pub fn capture(paper: &Paper, store: &SpanStore) -> Self {
        let mut contexts_reach = Vec::new();
        let mut contexts_manual = Vec::new();
        for context in store.contexts() {
            let record = ContextRecord {
                id: context.server_id,
                line_num: context.line,
                interval_start: context.interval.start,
                interval_end: context.interval.end,
                origin: context.origin,
                free_text: context.text.clone(),
                grounding_id: Some(context.grounding.0.clone()),
            };
            match context.origin {
                Origin::Manual => contexts_manual.push(record),
                Origin::Automatic => contexts_reach.push(record),
            }
        }
        let events = store
            .events()
            .iter()
            .map(|event| EventRecord {
                id: event.server_id,
                line_num: event.line,
                interval_start: event.interval.start,
                interval_end: event.interval.end,
                origin: event.origin,
                groundings: event.groundings.iter().map(|g| g.0.clone()).collect(),
                false_positive: event.false_positive,
            })
            .collect();
        Self {
            paper: PaperRecord {
                id: paper.id.clone(),
                title: paper.title.clone(),
                sentences: paper.sentences().iter().map(|s| s.canonical()).collect(),
                sections: paper.sections.clone(),
            },
            contexts_reach,
            contexts_manual,
            events,
        }
    }
}

fn checked_interval(
    paper: &Paper,
    id: ServerId,
    line: usize,
    start: usize,
    end: usize,
) -> Result<Interval, SnapshotError> {
    let sentence = paper.sentence(line).ok_or(SnapshotError::UnknownLine {
        id,
        line,
        lines: paper.line_count(),
    })?;
    let interval = Interval::new(start, end);
    if sentence.holds(interval) {
        Ok(interval)
    } else {
        Err(SnapshotError::BadInterval { id, line, interval })
    }
}

fn context_from_record(paper: &Paper, record: ContextRecord) -> Result<ContextSpan, SnapshotError> {
    let interval = checked_interval(
        paper,
        record.id,
        record.line_num,
        record.interval_start,
        record.interval_end,
    )?;
    let text = if record.free_text.is_empty() {
        paper
            .sentence(record.line_num)
            .and_then(|s| s.slice(interval))
            .unwrap_or_default()
    } else {
        record.free_text
    };
    let grounding = match record.grounding_id {
        Some(id) if !id.is_empty() => GroundingId(id),
        _ => GroundingId::for_mention(&text),
    };
    Ok(ContextSpan {
        server_id: record.id,
        line: record.line_num,
        interval,
        grounding,
        text,
        origin: record.origin,
    })
}

fn event_from_record(paper: &Paper, record: EventRecord) -> Result<EventSpan, SnapshotError> {
    let interval = checked_interval(
        paper,
        record.id,
        record.line_num,
        record.interval_start,
        record.interval_end,
    )?;
    let mut groundings: Vec<GroundingId> = Vec::with_capacity(record.groundings.len());
    for id in record.groundings {
        let id = GroundingId(id);
        if !groundings.contains(&id) {
            groundings.push(id);
        }
    }
    Ok(EventSpan {
        server_id: record.id,
        event_id: EventId(0),
        line: record.line_num,
        interval,
        groundings,
        origin: record.origin,
        false_positive: record.false_positive,
    })
}
