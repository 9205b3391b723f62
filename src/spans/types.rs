use serde::{Deserialize, Serialize};

/// An inclusive word interval `[start, end]` on one line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Interval {
    pub start: usize,
    pub end: usize,
}

impl Interval {
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// A one-word interval.
    pub const fn single(index: usize) -> Self {
        Self {
            start: index,
            end: index,
        }
    }

    /// Number of words covered. Zero for an inverted interval.
    pub const fn len(self) -> usize {
        if self.end < self.start {
            0
        } else {
            self.end - self.start + 1
        }
    }

    pub const fn is_empty(self) -> bool {
        self.len() == 0
    }

    pub const fn contains_index(self, index: usize) -> bool {
        self.start <= index && index <= self.end
    }

    /// Whether `other` lies entirely within `self` (equal intervals included).
    pub const fn contains(self, other: Self) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// Whether the two intervals share at least one word.
    pub const fn overlaps(self, other: Self) -> bool {
        self.start <= other.end && other.start <= self.end
    }
}

impl std::fmt::Display for Interval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{},{}]", self.start, self.end)
    }
}

/// Who produced a span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Origin {
    /// Authoritative, created directly by the annotator.
    Manual,
    /// Machine-proposed ("reach"). May be trimmed or hidden locally.
    #[serde(rename = "reach", alias = "automatic")]
    Automatic,
}

impl Origin {
    pub const fn is_manual(self) -> bool {
        matches!(self, Self::Manual)
    }
}

/// Stable identity assigned by the persistence collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ServerId(pub u64);

impl std::fmt::Display for ServerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Position of an event in the sorted event collection.
///
/// Reassigned every time the collection is re-sorted; never persist it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(pub usize);

/// Identifier of a concept shared by every mention of it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroundingId(pub String);

impl GroundingId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Synthetic grounding for a mention that was never grounded.
    pub fn for_mention(text: &str) -> Self {
        Self(format!("manual:{}", text.replace(' ', "-")))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for GroundingId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A grounded concept mention.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextSpan {
    pub server_id: ServerId,
    pub line: usize,
    pub interval: Interval,
    pub grounding: GroundingId,
    /// Literal mention text
    pub text: String,
    pub origin: Origin,
}

/// A semantic predicate mention holding references to groundings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventSpan {
    pub server_id: ServerId,
    pub event_id: EventId,
    pub line: usize,
    pub interval: Interval,
    /// Unique grounding references, in insertion order
    pub groundings: Vec<GroundingId>,
    pub origin: Origin,
    pub false_positive: bool,
}

impl EventSpan {
    pub fn references(&self, grounding: &GroundingId) -> bool {
        self.groundings.contains(grounding)
    }
}

/// A span of either family, as handed back by removals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Span {
    Context(ContextSpan),
    Event(EventSpan),
}

impl Span {
    pub const fn line(&self) -> usize {
        match self {
            Self::Context(span) => span.line,
            Self::Event(span) => span.line,
        }
    }

    pub const fn key(&self) -> SpanKey {
        match self {
            Self::Context(span) => SpanKey::Context(span.server_id),
            Self::Event(span) => SpanKey::Event(span.server_id),
        }
    }
}

/// Direction of a reference toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceOp {
    Added,
    Removed,
}

/// The two span families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpanKind {
    Context,
    Event,
}

/// Addresses one span by family and stable identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpanKey {
    Context(ServerId),
    Event(ServerId),
}

impl SpanKey {
    pub const fn kind(self) -> SpanKind {
        match self {
            Self::Context(_) => SpanKind::Context,
            Self::Event(_) => SpanKind::Event,
        }
    }

    pub const fn server_id(self) -> ServerId {
        match self {
            Self::Context(id) | Self::Event(id) => id,
        }
    }
}
