#![allow(dead_code)]

use std::sync::Once;

use quickpick_core::{update, AppState, Effect, FetchTicket, MealFilter, Msg, Suggestion};

pub fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(quickpick_logging::initialize_for_tests);
}

pub fn batch(n: usize) -> Vec<Suggestion> {
    (0..n)
        .map(|i| Suggestion::new(format!("dish-{i}"), format!("Dish {i}")))
        .collect()
}

pub fn started_ticket(effects: &[Effect]) -> FetchTicket {
    effects
        .iter()
        .find_map(|effect| match effect {
            Effect::StartFetch { ticket, .. } => Some(*ticket),
            _ => None,
        })
        .expect("start fetch effect")
}

/// Starts a session and resolves its first fetch with `n` items.
pub fn loaded_state(state: AppState, n: usize) -> AppState {
    let (state, effects) = update(state, Msg::StartClicked(MealFilter::All));
    let ticket = started_ticket(&effects);
    let (state, _) = update(
        state,
        Msg::FetchSucceeded {
            ticket,
            items: batch(n),
        },
    );
    state
}
