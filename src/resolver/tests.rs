use crate::document::{Occurrence, Paper, Sentence};
use crate::spans::{
    ContextSpan, EventId, EventSpan, GroundingId, Interval, Origin, ReferenceOp, ServerId, SpanKey,
    SpanStore,
};

use super::{
    CandidateOutcome, Edge, Rejection, ViewOptions, check_new_event, plan_contexts, plan_line,
    plan_toggle, resize_event,
};

fn event(server: u64, line: usize, start: usize, end: usize, origin: Origin) -> EventSpan {
    EventSpan {
        server_id: ServerId(server),
        event_id: EventId(0),
        line,
        interval: Interval::new(start, end),
        groundings: Vec::new(),
        origin,
        false_positive: false,
    }
}

fn context(server: u64, line: usize, start: usize, end: usize) -> ContextSpan {
    ContextSpan {
        server_id: ServerId(server),
        line,
        interval: Interval::new(start, end),
        grounding: GroundingId::new(format!("g:{server}")),
        text: String::new(),
        origin: Origin::Manual,
    }
}

fn words(text: &str) -> Vec<String> {
    Sentence::from_text(text).words().to_vec()
}

fn paper(lines: &[&str]) -> Paper {
    let sentences: Vec<String> = lines.iter().map(ToString::to_string).collect();
    Paper::new("PMC1", "Test", &sentences)
}

/// Apply a line plan the way the edit controller does.
fn apply_plan(store: &mut SpanStore, plan: &super::LinePlan) {
    for (id, interval) in plan.persisted.iter().chain(&plan.trimmed) {
        store.update_interval(SpanKey::Event(*id), *interval);
    }
    for id in &plan.hidden {
        store.remove(SpanKey::Event(*id));
    }
}

fn reconcile(store: &mut SpanStore, line: usize, words: &[String], options: &ViewOptions) -> super::LinePlan {
    let plan = plan_line(&store.events_on_line(line), words, options);
    apply_plan(store, &plan);
    plan
}

// Reconciliation

#[test]
fn test_automatic_sharing_start_with_manual_keeps_the_remainder() {
    let words = words("p53 activates BAX in the cytoplasm .");
    let mut store = SpanStore::new(
        Vec::new(),
        vec![
            event(1, 0, 0, 1, Origin::Manual),
            event(2, 0, 0, 3, Origin::Automatic),
        ],
    );
    let plan = reconcile(&mut store, 0, &words, &ViewOptions::default());

    assert!(plan.hidden.is_empty());
    assert!(plan.persisted.is_empty());
    assert_eq!(plan.trimmed, vec![(ServerId(2), Interval::new(2, 3))]);
    assert_eq!(
        store.event_by_server(ServerId(2)).map(|e| e.interval),
        Some(Interval::new(2, 3))
    );
}

#[test]
fn test_automatic_overhanging_manual_on_the_left_is_truncated() {
    let words = words("p53 activates BAX in the cytoplasm .");
    let events = [
        event(1, 0, 0, 3, Origin::Automatic),
        event(2, 0, 2, 4, Origin::Manual),
    ];
    let refs: Vec<&EventSpan> = events.iter().collect();
    let plan = plan_line(&refs, &words, &ViewOptions::default());
    assert_eq!(plan.trimmed, vec![(ServerId(1), Interval::new(0, 1))]);
    assert!(plan.hidden.is_empty());
}

#[test]
fn test_trim_against_one_manual_rechecks_the_others() {
    let words = words("a b c d e f g h i");
    let events = [
        event(1, 0, 2, 6, Origin::Automatic),
        event(2, 0, 3, 4, Origin::Manual),
        event(3, 0, 5, 8, Origin::Manual),
    ];
    let refs: Vec<&EventSpan> = events.iter().collect();
    let plan = plan_line(&refs, &words, &ViewOptions::default());
    // [2,6] first loses [5,6] to the second manual event, which leaves it
    // overhanging the first one on the left.
    assert_eq!(plan.trimmed, vec![(ServerId(1), Interval::single(2))]);
    assert!(plan.hidden.is_empty());
}

#[test]
fn test_automatic_overhanging_manual_on_the_right_is_truncated() {
    let words = words("p53 activates BAX in the cytoplasm .");
    let events = [
        event(1, 0, 1, 3, Origin::Manual),
        event(2, 0, 2, 5, Origin::Automatic),
    ];
    let refs: Vec<&EventSpan> = events.iter().collect();
    let plan = plan_line(&refs, &words, &ViewOptions::default());
    assert_eq!(plan.trimmed, vec![(ServerId(2), Interval::new(4, 5))]);
    assert!(plan.hidden.is_empty());
}

#[test]
fn test_automatic_inside_manual_is_hidden() {
    let words = words("a b c d e");
    let events = [
        event(1, 0, 3, 3, Origin::Automatic),
        event(2, 0, 1, 4, Origin::Manual),
        event(3, 0, 1, 4, Origin::Automatic),
    ];
    let refs: Vec<&EventSpan> = events.iter().collect();
    let plan = plan_line(&refs, &words, &ViewOptions::default());
    assert_eq!(plan.hidden.len(), 2);
    assert!(plan.hidden.contains(&ServerId(1)));
    assert!(plan.hidden.contains(&ServerId(3)));
}

#[test]
fn test_manual_inside_automatic_survives() {
    let words = words("a b c d e");
    let events = [
        event(1, 0, 0, 4, Origin::Automatic),
        event(2, 0, 2, 2, Origin::Manual),
    ];
    let refs: Vec<&EventSpan> = events.iter().collect();
    let plan = plan_line(&refs, &words, &ViewOptions::default());
    assert!(plan.is_empty());
}

#[test]
fn test_partial_overlap_hides_the_later_event() {
    let words = words("a b c d e");
    let events = [
        event(1, 0, 0, 2, Origin::Automatic),
        event(2, 0, 2, 4, Origin::Automatic),
    ];
    let refs: Vec<&EventSpan> = events.iter().collect();
    let plan = plan_line(&refs, &words, &ViewOptions::default());
    assert_eq!(plan.hidden, vec![ServerId(2)]);
}

#[test]
fn test_partial_overlap_never_hides_manual_for_automatic() {
    let words = words("a b c d e");
    let events = [
        event(1, 0, 0, 2, Origin::Automatic),
        event(2, 0, 2, 4, Origin::Manual),
    ];
    let refs: Vec<&EventSpan> = events.iter().collect();
    let options = ViewOptions {
        handle_manual_overlaps: false,
        ..ViewOptions::default()
    };
    let plan = plan_line(&refs, &words, &options);
    assert_eq!(plan.hidden, vec![ServerId(1)]);
}

#[test]
fn test_partial_overlap_between_manual_events_hides_later_start() {
    let words = words("a b c d e");
    let events = [
        event(1, 0, 1, 3, Origin::Manual),
        event(2, 0, 0, 1, Origin::Manual),
    ];
    let refs: Vec<&EventSpan> = events.iter().collect();
    let plan = plan_line(&refs, &words, &ViewOptions::default());
    assert_eq!(plan.hidden, vec![ServerId(1)]);
}

#[test]
fn test_hidden_automatic_events_are_dropped_first() {
    let words = words("a b c");
    let events = [
        event(1, 0, 0, 0, Origin::Automatic),
        event(2, 0, 2, 2, Origin::Manual),
    ];
    let refs: Vec<&EventSpan> = events.iter().collect();
    let options = ViewOptions {
        show_automatic_events: false,
        ..ViewOptions::default()
    };
    let plan = plan_line(&refs, &words, &options);
    assert_eq!(plan.hidden, vec![ServerId(1)]);
}

#[test]
fn test_overlap_handling_can_be_switched_off() {
    let words = words("a b c d e");
    let events = [
        event(1, 0, 0, 2, Origin::Manual),
        event(2, 0, 1, 4, Origin::Automatic),
    ];
    let refs: Vec<&EventSpan> = events.iter().collect();
    let options = ViewOptions {
        handle_manual_overlaps: false,
        hide_overlapping_events: false,
        ..ViewOptions::default()
    };
    assert!(plan_line(&refs, &words, &options).is_empty());
}

#[test]
fn test_punctuation_moves_edges() {
    let words = words("BAX ( in the cytoplasm ) .");
    let events = [
        event(1, 0, 0, 1, Origin::Manual),
        event(2, 0, 2, 4, Origin::Manual),
        event(3, 0, 6, 6, Origin::Automatic),
    ];
    let refs: Vec<&EventSpan> = events.iter().collect();
    let options = ViewOptions {
        include_punctuation: true,
        hide_overlapping_events: false,
        ..ViewOptions::default()
    };
    let plan = plan_line(&refs, &words, &options);
    // "BAX (" loses its trailing "("; "in the cytoplasm" absorbs "(", ")" and ".".
    assert_eq!(
        plan.persisted,
        vec![
            (ServerId(1), Interval::new(0, 0)),
            (ServerId(2), Interval::new(1, 6)),
        ]
    );
    // A lone "." cannot shrink; it stays as it is.
    assert!(plan.trimmed.is_empty());
}

#[test]
fn test_punctuation_fix_on_automatic_event_stays_local() {
    let words = words(", BAX binds");
    let events = [event(1, 0, 0, 1, Origin::Automatic)];
    let refs: Vec<&EventSpan> = events.iter().collect();
    let options = ViewOptions {
        include_punctuation: true,
        ..ViewOptions::default()
    };
    let plan = plan_line(&refs, &words, &options);
    assert!(plan.persisted.is_empty());
    assert_eq!(plan.trimmed, vec![(ServerId(1), Interval::single(1))]);
}

// Resize

#[test]
fn test_right_edge_dragged_past_fixed_start_clamps_to_one_word() {
    let active = event(1, 0, 4, 6, Origin::Manual);
    // Handle 3 asks for end 2, left of the fixed start 4.
    assert_eq!(resize_event(&active, Edge::Right, 3, &[&active], &[]), Interval::single(4));
    assert_eq!(resize_event(&active, Edge::Right, 2, &[&active], &[]), Interval::single(4));
}

#[test]
fn test_resize_between_neighbours_and_context() {
    let active = event(1, 0, 4, 5, Origin::Manual);
    let left = event(2, 0, 0, 1, Origin::Manual);
    let right = event(3, 0, 9, 10, Origin::Manual);
    let ctx = context(9, 0, 6, 8);
    let events = [&left, &active, &right];

    assert_eq!(resize_event(&active, Edge::Left, 0, &events, &[&ctx]), Interval::new(2, 5));
    // End 7 is the middle of [6,8]; a right-edge tie snaps right.
    assert_eq!(resize_event(&active, Edge::Right, 8, &events, &[&ctx]), Interval::new(4, 8));
    // End 12 runs into the right neighbour.
    assert_eq!(resize_event(&active, Edge::Right, 13, &events, &[&ctx]), Interval::new(4, 8));
}

#[test]
fn test_resized_manual_event_survives_reconcile() {
    let words = words("a b c d e f g h");
    let before = event(1, 0, 1, 2, Origin::Manual);
    let active = event(2, 0, 6, 7, Origin::Manual);
    let ctx = context(9, 0, 2, 4);
    let mut store = SpanStore::new(vec![ctx.clone()], vec![before.clone(), active.clone()]);

    let resized = resize_event(&active, Edge::Left, 0, &[&before, &active], &[&ctx]);
    assert_eq!(resized, Interval::new(5, 7));
    store.update_interval(SpanKey::Event(ServerId(2)), resized);

    let plan = reconcile(&mut store, 0, &words, &ViewOptions::default());
    assert!(plan.hidden.is_empty());
    assert!(store.event_by_server(ServerId(2)).is_some());
}

// Event creation

#[test]
fn test_new_event_subsuming_existing_is_rejected() {
    let existing = event(1, 0, 2, 3, Origin::Automatic);
    assert_eq!(
        check_new_event(Interval::new(1, 4), &[&existing]),
        Err(Rejection::SubsumesEvent)
    );
    assert_eq!(
        check_new_event(Interval::new(2, 3), &[&existing]),
        Err(Rejection::SubsumesEvent)
    );
    assert_eq!(check_new_event(Interval::new(3, 5), &[&existing]), Ok(()));
}

// Context creation

fn scenario_paper() -> Paper {
    paper(&[
        "Introduction .",
        "We study apoptosis .",
        "Cells were treated .",
        "p53 activates BAX .",
        "Nothing here .",
        "Or here .",
        "Still nothing .",
        "BAX binds p53 .",
    ])
}

#[test]
fn test_context_creation_trims_straddling_event() {
    let paper = scenario_paper();
    let store = SpanStore::new(Vec::new(), vec![event(1, 7, 0, 2, Origin::Manual)]);
    let outcomes = plan_contexts(&paper, &store, "BAX");

    assert_eq!(outcomes.len(), 2);
    let CandidateOutcome::Accepted(first) = &outcomes[0] else {
        panic!("line 3 candidate should be accepted");
    };
    assert_eq!((first.line, first.interval), (3, Interval::single(2)));
    assert!(first.adjustments.is_empty());

    let CandidateOutcome::Accepted(second) = &outcomes[1] else {
        panic!("line 7 candidate should be accepted");
    };
    assert_eq!((second.line, second.interval), (7, Interval::single(0)));
    assert_eq!(second.adjustments, vec![(ServerId(1), Interval::new(1, 2))]);
}

#[test]
fn test_context_candidate_overlapping_context_is_rejected() {
    let paper = scenario_paper();
    let store = SpanStore::new(vec![context(5, 3, 2, 2)], Vec::new());
    let outcomes = plan_contexts(&paper, &store, "activates BAX");
    assert_eq!(
        outcomes,
        vec![CandidateOutcome::Rejected {
            occurrence: Occurrence {
                line: 3,
                interval: Interval::new(1, 2)
            },
            reason: Rejection::OverlapsContext {
                line: 3,
                interval: Interval::new(1, 2)
            },
        }]
    );
}

#[test]
fn test_context_candidate_containing_context_is_rejected() {
    let paper = paper(&["in the cytoplasm of cells"]);
    let store = SpanStore::new(vec![context(5, 0, 2, 2)], Vec::new());
    let outcomes = plan_contexts(&paper, &store, "the cytoplasm of");
    assert!(matches!(
        outcomes.as_slice(),
        [CandidateOutcome::Rejected {
            reason: Rejection::OverlapsContext { .. },
            ..
        }]
    ));
}

#[test]
fn test_overlapping_sibling_candidates_are_not_both_accepted() {
    let paper = paper(&["a a a"]);
    let store = SpanStore::default();
    let outcomes = plan_contexts(&paper, &store, "a a");
    assert_eq!(outcomes.len(), 2);
    assert!(matches!(outcomes[0], CandidateOutcome::Accepted(_)));
    assert!(matches!(outcomes[1], CandidateOutcome::Rejected { .. }));
}

#[test]
fn test_collapsing_event_aborts_only_its_candidate() {
    let paper = paper(&["x BAX y", "BAX binds p53"]);
    let store = SpanStore::new(Vec::new(), vec![event(1, 0, 1, 1, Origin::Manual)]);
    let outcomes = plan_contexts(&paper, &store, "BAX");
    assert_eq!(outcomes.len(), 2);
    assert!(matches!(
        outcomes[0],
        CandidateOutcome::Rejected {
            reason: Rejection::EventCollapse { line: 0, event: ServerId(1) },
            ..
        }
    ));
    assert!(matches!(outcomes[1], CandidateOutcome::Accepted(_)));
}

#[test]
fn test_multi_word_context_pushes_edges_to_nearer_side() {
    let paper = paper(&["a b c d e f g h"]);
    let store = SpanStore::new(
        Vec::new(),
        vec![
            event(1, 0, 0, 3, Origin::Manual),
            event(2, 0, 6, 7, Origin::Manual),
        ],
    );
    let outcomes = plan_contexts(&paper, &store, "c d e f g");
    let [CandidateOutcome::Accepted(candidate)] = &outcomes[..] else {
        panic!("candidate should be accepted");
    };
    // End 3 sits nearer the start of [2,6]: pulled out to 1.
    // Start 6 is the candidate end: pushed out past it to 7.
    assert_eq!(
        candidate.adjustments,
        vec![
            (ServerId(1), Interval::new(0, 1)),
            (ServerId(2), Interval::single(7)),
        ]
    );
}

#[test]
fn test_multi_word_context_tie_extends_event() {
    let paper = paper(&["a b c d e f g h", "a b c d e f g h"]);
    let store = SpanStore::new(
        Vec::new(),
        vec![
            event(1, 0, 4, 7, Origin::Manual),
            event(2, 1, 0, 4, Origin::Manual),
        ],
    );
    let outcomes = plan_contexts(&paper, &store, "c d e f g");
    let [CandidateOutcome::Accepted(first), CandidateOutcome::Accepted(second)] = &outcomes[..] else {
        panic!("both candidates should be accepted");
    };
    // Start 4 and end 4 are both the middle of [2,6]: the event grows over it.
    assert_eq!(first.adjustments, vec![(ServerId(1), Interval::new(2, 7))]);
    assert_eq!(second.adjustments, vec![(ServerId(2), Interval::new(0, 6))]);
}

// References

#[test]
fn test_addition_propagates_to_containing_event() {
    let small = event(1, 0, 2, 3, Origin::Manual);
    let big = event(2, 0, 1, 4, Origin::Automatic);
    let apart = event(3, 0, 6, 7, Origin::Manual);
    let g = GroundingId::new("uniprot:Q07812");
    let plan = plan_toggle(&small, &g, &[&small, &big, &apart]);
    assert_eq!(plan.op, ReferenceOp::Added);
    assert_eq!(plan.propagate, vec![(ServerId(2), ReferenceOp::Added)]);
}

#[test]
fn test_removal_propagates_to_contained_event() {
    let g = GroundingId::new("uniprot:Q07812");
    let mut small = event(1, 0, 2, 3, Origin::Manual);
    small.groundings.push(g.clone());
    let mut big = event(2, 0, 1, 4, Origin::Manual);
    big.groundings.push(g.clone());

    let plan = plan_toggle(&big, &g, &[&small, &big]);
    assert_eq!(plan.op, ReferenceOp::Removed);
    assert_eq!(plan.propagate, vec![(ServerId(1), ReferenceOp::Removed)]);

    // Removing from the smaller event leaves the larger one alone.
    let plan = plan_toggle(&small, &g, &[&small, &big]);
    assert_eq!(plan.op, ReferenceOp::Removed);
    assert!(plan.propagate.is_empty());
}

#[test]
fn test_addition_already_present_does_not_propagate() {
    let g = GroundingId::new("go:0005737");
    let small = event(1, 0, 2, 3, Origin::Manual);
    let mut big = event(2, 0, 1, 4, Origin::Manual);
    big.groundings.push(g.clone());
    let plan = plan_toggle(&small, &g, &[&small, &big]);
    assert!(plan.propagate.is_empty());
}

mod property_tests {
    use super::*;
    use proptest::prelude::*;

    const LINE_WORDS: usize = 12;

    fn line_words() -> Vec<String> {
        (0..LINE_WORDS).map(|i| format!("w{i}")).collect()
    }

    fn interval() -> impl Strategy<Value = Interval> {
        (0..LINE_WORDS, 0..LINE_WORDS).prop_map(|(a, b)| Interval::new(a.min(b), a.max(b)))
    }

    fn events() -> impl Strategy<Value = Vec<EventSpan>> {
        prop::collection::vec((interval(), any::<bool>()), 0..8).prop_map(|specs| {
            specs
                .into_iter()
                .enumerate()
                .map(|(i, (interval, manual))| {
                    let origin = if manual { Origin::Manual } else { Origin::Automatic };
                    event(i as u64 + 1, 0, interval.start, interval.end, origin)
                })
                .collect()
        })
    }

    /// Events that do not overlap each other, as left by reconciliation.
    fn disjoint_events() -> impl Strategy<Value = Vec<EventSpan>> {
        prop::collection::btree_set(0..LINE_WORDS, 0..6).prop_map(|cuts| {
            let cuts: Vec<usize> = cuts.into_iter().collect();
            cuts.chunks(2)
                .enumerate()
                .map(|(i, pair)| {
                    let end = pair.get(1).copied().unwrap_or(pair[0]);
                    event(i as u64 + 1, 0, pair[0], end, Origin::Manual)
                })
                .collect()
        })
    }

    proptest! {
        #[test]
        fn reconcile_leaves_no_partial_overlaps(events in events()) {
            let words = line_words();
            let mut store = SpanStore::new(Vec::new(), events);
            reconcile(&mut store, 0, &words, &ViewOptions::default());

            let survivors = store.events_on_line(0);
            for a in &survivors {
                for b in &survivors {
                    if a.server_id == b.server_id {
                        continue;
                    }
                    let (x, y) = (a.interval, b.interval);
                    prop_assert!(!x.overlaps(y) || x.contains(y) || y.contains(x),
                        "{} and {} partially overlap", x, y);
                    if a.origin == Origin::Manual && b.origin == Origin::Automatic {
                        prop_assert!(!x.contains(y), "automatic {} inside manual {}", y, x);
                    }
                }
            }
        }

        #[test]
        fn reconcile_reaches_fixpoint_in_one_pass(events in events()) {
            let words = line_words();
            let mut store = SpanStore::new(Vec::new(), events);
            reconcile(&mut store, 0, &words, &ViewOptions::default());
            let again = plan_line(&store.events_on_line(0), &words, &ViewOptions::default());
            prop_assert!(again.is_empty(), "second pass changed {:?}", again);
        }

        #[test]
        fn resize_never_inverts_and_is_idempotent(
            events in disjoint_events(),
            pick in any::<prop::sample::Index>(),
            neighbour in any::<prop::sample::Index>(),
            left in any::<bool>(),
            handle in 0..=LINE_WORDS,
            ctx in interval(),
            reach in 1..4usize,
        ) {
            prop_assume!(!events.is_empty());
            let active = events[pick.index(events.len())].clone();
            let edge = if left { Edge::Left } else { Edge::Right };
            // One free context, one straddling the facing edge of another event.
            let other = &events[neighbour.index(events.len())];
            let straddle = match edge {
                Edge::Left => Interval::new(other.interval.end, other.interval.end + reach),
                Edge::Right => Interval::new(other.interval.start.saturating_sub(reach), other.interval.start),
            };
            let ctx_span = context(99, 0, ctx.start, ctx.end);
            let straddle_span = context(98, 0, straddle.start, straddle.end);
            let contexts = [&ctx_span, &straddle_span];
            let refs: Vec<&EventSpan> = events.iter().collect();

            let first = resize_event(&active, edge, handle, &refs, &contexts);
            prop_assert!(first.start <= first.end);
            match edge {
                Edge::Left => {
                    prop_assert_eq!(first.end, active.interval.end);
                }
                Edge::Right => {
                    prop_assert_eq!(first.start, active.interval.start);
                }
            }
            for other in events.iter().filter(|e| e.server_id != active.server_id) {
                prop_assert!(!first.overlaps(other.interval),
                    "{} resized to {} runs into {}", active.interval, first, other.interval);
            }

            let mut resized = active.clone();
            resized.interval = first;
            let refs: Vec<&EventSpan> = events
                .iter()
                .map(|e| if e.server_id == active.server_id { &resized } else { e })
                .collect();
            let second = resize_event(&resized, edge, handle, &refs, &contexts);
            prop_assert_eq!(first, second);
        }

        #[test]
        fn toggle_twice_restores_references(
            events in events(),
            pick in any::<prop::sample::Index>(),
            seeded in any::<bool>(),
        ) {
            prop_assume!(!events.is_empty());
            let g = GroundingId::new("g:target");
            let mut store = SpanStore::new(Vec::new(), events);
            let target = EventId(pick.index(store.event_count()));
            if seeded {
                store.toggle_reference(target, &g);
            }
            let before = store.event(target).map(|e| e.groundings.clone());

            for _ in 0..2 {
                let Some(event) = store.event(target).cloned() else { break };
                let plan = plan_toggle(&event, &g, &store.events_on_line(0));
                store.toggle_reference(target, &g);
                for (id, op) in plan.propagate {
                    match op {
                        ReferenceOp::Added => store.add_reference(id, &g),
                        ReferenceOp::Removed => store.remove_reference(id, &g),
                    };
                }
            }
            prop_assert_eq!(store.event(target).map(|e| e.groundings.clone()), before);
        }

        #[test]
        fn contexts_never_overlap(
            tokens in prop::collection::vec(prop::sample::select(vec!["a", "b", "c"]), 1..10),
            queries in prop::collection::vec(prop::collection::vec(prop::sample::select(vec!["a", "b", "c"]), 1..4), 1..5),
        ) {
            let paper = paper(&[tokens.join(" ").as_str()]);
            let mut store = SpanStore::default();
            let mut next = 1;
            for query in queries {
                for outcome in plan_contexts(&paper, &store, &query.join(" ")) {
                    if let CandidateOutcome::Accepted(candidate) = outcome {
                        store.insert_context(context(next, candidate.line, candidate.interval.start, candidate.interval.end));
                        next += 1;
                    }
                }
            }
            let contexts = store.contexts_on_line(0);
            for (i, a) in contexts.iter().enumerate() {
                for b in &contexts[i + 1..] {
                    prop_assert!(!a.interval.overlaps(b.interval));
                }
            }
        }
    }
}
