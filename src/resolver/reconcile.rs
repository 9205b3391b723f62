use tracing::{debug, info, warn};

use crate::document::Punctuation;
use crate::spans::{EventSpan, Interval, Origin, ServerId};

/// Display options that drive line reconciliation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewOptions {
    /// When false, automatic events are dropped from the line outright
    pub show_automatic_events: bool,
    /// Normalize event edges around punctuation tokens
    pub include_punctuation: bool,
    /// Trim automatic events that overhang a manual one
    pub handle_manual_overlaps: bool,
    /// Hide contained and partially overlapping events
    pub hide_overlapping_events: bool,
    pub punctuation: Punctuation,
}

impl Default for ViewOptions {
    fn default() -> Self {
        Self {
            show_automatic_events: true,
            include_punctuation: false,
            handle_manual_overlaps: true,
            hide_overlapping_events: true,
            punctuation: Punctuation::default(),
        }
    }
}

/// What reconciling one line requires.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinePlan {
    /// Events removed from the local store; never sent to the collaborator
    pub hidden: Vec<ServerId>,
    /// Local-only geometry changes to automatic events
    pub trimmed: Vec<(ServerId, Interval)>,
    /// Punctuation fixes to manual events, which must also be persisted
    pub persisted: Vec<(ServerId, Interval)>,
}

impl LinePlan {
    pub fn is_empty(&self) -> bool {
        self.hidden.is_empty() && self.trimmed.is_empty() && self.persisted.is_empty()
    }
}

#[derive(Debug, Clone, Copy)]
struct Slot {
    id: ServerId,
    interval: Interval,
    origin: Origin,
}

impl Slot {
    const fn is_manual(&self) -> bool {
        self.origin.is_manual()
    }
}

/// Plan the fixes needed before `line_events` can be displayed.
///
/// Steps run in a fixed order, each seeing the result of the one before:
/// automatic events are dropped if hidden by the options, edges are moved
/// around punctuation, automatic events overhanging a manual one are trimmed,
/// and finally contained or partially overlapping events are hidden. A
/// manual event is never hidden in favour of an automatic one.
pub fn plan_line(line_events: &[&EventSpan], words: &[String], options: &ViewOptions) -> LinePlan {
    let mut plan = LinePlan::default();
    let mut slots: Vec<Slot> = line_events
        .iter()
        .map(|e| Slot {
            id: e.server_id,
            interval: e.interval,
            origin: e.origin,
        })
        .collect();

    if !options.show_automatic_events {
        slots.retain(|slot| {
            if slot.is_manual() {
                true
            } else {
                debug!(event = %slot.id, "automatic event hidden by view options");
                plan.hidden.push(slot.id);
                false
            }
        });
    }

    if options.include_punctuation {
        for slot in &mut slots {
            let fixed = fix_punctuation(slot.id, slot.interval, words, &options.punctuation);
            if fixed != slot.interval {
                slot.interval = fixed;
                if slot.is_manual() {
                    plan.persisted.push((slot.id, fixed));
                } else {
                    plan.trimmed.push((slot.id, fixed));
                }
            }
        }
    }

    if options.handle_manual_overlaps {
        trim_automatic_overhangs(&mut slots, &mut plan);
    }

    if options.hide_overlapping_events {
        hide_overlaps(&mut slots, &mut plan);
    }

    plan
}

fn fix_punctuation(id: ServerId, interval: Interval, words: &[String], marks: &Punctuation) -> Interval {
    let is_opening = |i: usize| words.get(i).is_some_and(|w| marks.is_opening(w));
    let is_closing = |i: usize| words.get(i).is_some_and(|w| marks.is_closing(w));
    let Interval { mut start, mut end } = interval;

    while is_closing(start) {
        if end > start {
            start += 1;
        } else {
            warn!(event = %id, "event consists only of punctuation");
            break;
        }
    }
    while start > 0 && is_opening(start - 1) {
        start -= 1;
    }

    while is_opening(end) {
        if start < end {
            end -= 1;
        } else {
            warn!(event = %id, "event consists only of punctuation");
            break;
        }
    }
    while is_closing(end + 1) {
        end += 1;
    }

    let fixed = Interval::new(start, end.min(words.len().saturating_sub(1)).max(start));
    if fixed != interval {
        debug!(event = %id, from = %interval, to = %fixed, "event moved around punctuation");
    }
    fixed
}

fn trim_automatic_overhangs(slots: &mut [Slot], plan: &mut LinePlan) {
    // A trim against one manual event can open an overhang on another, so
    // the scan restarts after every change.
    'scan: loop {
        for manual in slots.iter().filter(|s| s.is_manual()).copied().collect::<Vec<_>>() {
            for a in 0..slots.len() {
                let slot = slots[a];
                if slot.is_manual() {
                    continue;
                }
                let Some(trimmed) = overhang_trim(manual.interval, slot.interval) else {
                    continue;
                };
                info!(
                    event = %slot.id,
                    manual = %manual.id,
                    from = %slot.interval,
                    to = %trimmed,
                    "automatic event trimmed"
                );
                slots[a].interval = trimmed;
                plan.trimmed.retain(|(id, _)| *id != slot.id);
                plan.trimmed.push((slot.id, trimmed));
                continue 'scan;
            }
        }
        break;
    }
}

/// New interval for an automatic event sticking out of one side of a manual
/// one. Contained events are left for overlap hiding.
fn overhang_trim(manual: Interval, auto: Interval) -> Option<Interval> {
    if auto.start < manual.start && manual.contains_index(auto.end) {
        Some(Interval::new(auto.start, manual.start - 1))
    } else if manual.contains_index(auto.start) && auto.end > manual.end {
        Some(Interval::new(manual.end + 1, auto.end))
    } else {
        None
    }
}

fn hide_overlaps(slots: &mut Vec<Slot>, plan: &mut LinePlan) {
    'scan: loop {
        for i in 0..slots.len() {
            for j in (i + 1)..slots.len() {
                if let Some(loser) = overlap_loser(&slots[i], &slots[j]) {
                    let hidden = if loser { slots.remove(j) } else { slots.remove(i) };
                    info!(event = %hidden.id, "overlapping event hidden");
                    plan.hidden.push(hidden.id);
                    continue 'scan;
                }
            }
        }
        break;
    }
}

/// `Some(true)` hides `cmp`, `Some(false)` hides `cur`, `None` keeps both.
fn overlap_loser(cur: &Slot, cmp: &Slot) -> Option<bool> {
    let (a, b) = (cur.interval, cmp.interval);
    if !a.overlaps(b) {
        return None;
    }
    if a.contains(b) {
        if !cmp.is_manual() {
            return Some(true);
        }
        if !cur.is_manual() && b.contains(a) {
            return Some(false);
        }
        return None;
    }
    if b.contains(a) {
        return (!cur.is_manual()).then_some(false);
    }
    // Partial overlap: the event starting inside the other loses, unless
    // that would hide a manual event in favour of an automatic one.
    let cmp_is_later = a.contains_index(b.start);
    let (later, earlier) = if cmp_is_later { (cmp, cur) } else { (cur, cmp) };
    let hide_later = !(later.is_manual() && !earlier.is_manual());
    Some(hide_later == cmp_is_later)
}
