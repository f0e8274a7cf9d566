//! Property-based tests using proptest
//!
//! These tests exercise the list query state machine with randomized
//! operation sequences: page bounds, page resets on criteria changes, and
//! last-request-wins ordering of responses.

use khair::resource::{Applied, ListResult, ListState, PAGE_SIZE};
use proptest::prelude::*;
use serde_json::{json, Value};

#[derive(Debug, Clone)]
enum Op {
    Search(String),
    Filter(&'static str, String),
    Page(u32),
    Next,
    Prev,
    Clear,
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        "[a-z ]{0,6}".prop_map(Op::Search),
        (
            prop_oneof![Just("status"), Just("category")],
            prop_oneof![Just(String::new()), Just("active".to_string()), Just("rent".to_string())],
        )
            .prop_map(|(k, v)| Op::Filter(k, v)),
        (0u32..8).prop_map(Op::Page),
        Just(Op::Next),
        Just(Op::Prev),
        Just(Op::Clear),
    ]
}

fn rows(n: usize) -> Vec<Value> {
    (0..n).map(|i| json!({"_id": format!("r{}", i)})).collect()
}

/// State that has already loaded a result with `total` records
fn loaded(total: u64) -> ListState {
    let mut state = ListState::new(PAGE_SIZE);
    let ticket = state.begin();
    let body = json!({
        "data": rows(total.min(PAGE_SIZE as u64) as usize),
        "pagination": {"total": total}
    });
    let result = ListResult::from_response(&body, PAGE_SIZE).unwrap();
    state.apply(ticket.seq, Ok(result), "err");
    state
}

fn apply_op(state: &mut ListState, op: &Op) -> bool {
    match op {
        Op::Search(term) => state.set_search_term(term),
        Op::Filter(key, value) => state.set_filter(key, value),
        Op::Page(n) => state.set_page(*n),
        Op::Next => state.next_page(),
        Op::Prev => state.prev_page(),
        Op::Clear => state.clear_criteria(),
    }
}

proptest! {
    /// Pages derive from the total count
    #[test]
    fn test_total_pages_is_ceiling(total in 0u64..500) {
        let state = loaded(total);
        let expected = total.div_ceil(PAGE_SIZE as u64) as u32;
        prop_assert_eq!(state.total_pages(), expected);
        prop_assert_eq!(state.total_count(), total);
    }

    /// The page never leaves `1..=max(total_pages, 1)`
    #[test]
    fn test_page_stays_in_bounds(total in 0u64..120, ops in prop::collection::vec(arb_op(), 0..40)) {
        let mut state = loaded(total);
        let upper = state.total_pages().max(1);
        for op in &ops {
            apply_op(&mut state, op);
            let page = state.query().page;
            prop_assert!(page >= 1 && page <= upper, "page {} outside 1..={}", page, upper);
        }
    }

    /// Search and filter changes always land on page 1 and schedule a fetch
    #[test]
    fn test_criteria_change_resets_page(start in 1u32..6, term in "[a-z]{1,5}") {
        let mut state = loaded(50);
        state.set_page(start);
        let _ = state.take_scheduled();

        prop_assert!(state.set_search_term(&term));
        prop_assert_eq!(state.query().page, 1);
        prop_assert!(state.is_scheduled());

        let _ = state.take_scheduled();
        state.set_page(start);
        let _ = state.take_scheduled();
        prop_assert!(state.set_filter("status", "active"));
        prop_assert_eq!(state.query().page, 1);
        prop_assert!(state.is_scheduled());
    }

    /// Only a change schedules a fetch; repeating the same value is a no-op
    #[test]
    fn test_noop_changes_do_not_schedule(ops in prop::collection::vec(arb_op(), 1..20)) {
        let mut state = loaded(100);
        for op in &ops {
            let _ = state.take_scheduled();
            let changed = apply_op(&mut state, op);
            prop_assert_eq!(changed, state.is_scheduled());
        }
    }

    /// Whatever order responses arrive in, only the newest request is shown
    #[test]
    fn test_last_request_wins(issued in 2usize..8, order in any::<u64>()) {
        let mut state = ListState::new(PAGE_SIZE);
        let tickets: Vec<_> = (0..issued)
            .map(|i| {
                state.set_search_term(&format!("q{}", i));
                state.take_scheduled().unwrap()
            })
            .collect();

        // Deliver in a shuffled order derived from `order`
        let mut deliveries: Vec<usize> = (0..issued).collect();
        let mut seed = order;
        for i in (1..deliveries.len()).rev() {
            seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            deliveries.swap(i, (seed >> 33) as usize % (i + 1));
        }

        for idx in deliveries {
            let ticket = &tickets[idx];
            let result = ListResult {
                rows: vec![json!({"_id": ticket.query.search_term.clone()})],
                total_count: 1,
                total_pages: 1,
            };
            let applied = state.apply(ticket.seq, Ok(result), "err");
            prop_assert_eq!(applied == Applied::Applied, idx == issued - 1);
        }

        let newest = format!("q{}", issued - 1);
        prop_assert_eq!(state.rows()[0]["_id"].as_str(), Some(newest.as_str()));
        prop_assert!(!state.status.loading);
    }

    /// A failed fetch never clears rows already on screen
    #[test]
    fn test_failure_keeps_rows(total in 1u64..40) {
        let mut state = loaded(total);
        let before = state.rows().to_vec();
        let ticket = state.begin();
        state.apply(ticket.seq, Err(khair::api::ApiError::Network("boom".into())), "Could not load");
        prop_assert_eq!(state.rows(), before.as_slice());
        prop_assert_eq!(state.status.error.as_deref(), Some("Could not load"));
    }
}
