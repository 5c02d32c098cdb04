use chrono::{DateTime, Utc};
use quickpick_logging::{qp_debug, qp_info, qp_warn};

use crate::{Advance, AppState, Decision, Effect, Msg, Resolution, Vote};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::StartClicked(filter) => {
            state.reset_card();
            let effects = state
                .session
                .start(filter, &state.config, &mut state.queue);
            state.mark_dirty();
            effects
        }
        Msg::FilterChanged(filter) => {
            if state.session.started() {
                state.session.set_filter(filter);
                state.reset_card();
                let effects = state
                    .session
                    .load_next_batch(&state.config, &mut state.queue);
                state.mark_dirty();
                effects
            } else if state.session.filter() != filter {
                state.session.set_filter(filter);
                state.mark_dirty();
                Vec::new()
            } else {
                Vec::new()
            }
        }
        Msg::RetryClicked => {
            let filter = state.session.filter();
            state.reset_card();
            let mut effects = state.session.teardown(&mut state.queue);
            effects.extend(
                state
                    .session
                    .start(filter, &state.config, &mut state.queue),
            );
            state.mark_dirty();
            effects
        }
        Msg::Unmounted => {
            state.reset_card();
            let effects = state.session.teardown(&mut state.queue);
            state.mark_dirty();
            effects
        }
        Msg::VisibilityChanged { visible, at } => {
            let effects = if visible {
                state
                    .session
                    .reconcile(at, &state.config, &mut state.queue)
            } else {
                state
                    .session
                    .on_hidden(at, &state.config, &mut state.queue)
            };
            if !effects.is_empty() {
                state.reset_card();
                state.mark_dirty();
            }
            effects
        }
        Msg::DragStarted => {
            if !state.input_locked() {
                state.gesture.drag_started();
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::DragMoved { dx } => {
            if !state.input_locked() && state.gesture.is_dragging() {
                state.gesture.drag_moved(dx);
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::DragReleased { dx, velocity, at } => {
            if state.input_locked() || !state.gesture.is_dragging() {
                return (state, Vec::new());
            }
            let decision = state
                .gesture
                .drag_released(&state.config.gesture, dx, velocity);
            state.mark_dirty();
            apply_decision(&mut state, decision, at)
        }
        Msg::CardTapped { x, at } => {
            if state.input_locked() {
                return (state, Vec::new());
            }
            let decision = state.gesture.tapped(&state.config.gesture, x, at);
            apply_decision(&mut state, decision, at)
        }
        Msg::ApproveClicked { at } => commit_vote(&mut state, Vote::Approved, at),
        Msg::RejectClicked { at } => commit_vote(&mut state, Vote::Rejected, at),
        Msg::FavoriteToggled => toggle_favorite(&mut state),
        Msg::AdvanceDue { item_id } => {
            let is_current = state
                .queue
                .current_item()
                .is_some_and(|item| item.id == item_id);
            if state.pending_advance.as_deref() != Some(item_id.as_str()) || !is_current {
                qp_debug!("Ignoring stale advance for {}", item_id);
                return (state, Vec::new());
            }
            state.reset_card();
            state.mark_dirty();
            match state.queue.advance() {
                Advance::Next => Vec::new(),
                Advance::Exhausted => {
                    qp_info!("Batch exhausted; loading the next one");
                    state
                        .session
                        .load_next_batch(&state.config, &mut state.queue)
                }
            }
        }
        Msg::FetchProgress { ticket, percent } => {
            let before = state.session.progress();
            if state.session.apply_progress(ticket, percent) == Resolution::Applied
                && state.session.progress() != before
            {
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::FetchSucceeded { ticket, items } => {
            if state
                .session
                .resolve_success(ticket, items, &mut state.queue)
                == Resolution::Applied
            {
                state.reset_card();
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::FetchFailed { ticket, message } => {
            if state
                .session
                .resolve_failure(ticket, &message, &mut state.queue)
                == Resolution::Applied
            {
                state.reset_card();
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::FetchTimedOut { ticket } => {
            if state.session.resolve_timeout(ticket, &mut state.queue) == Resolution::Applied {
                state.reset_card();
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::FavoritePersistFailed { item_id, favorited } => {
            qp_warn!(
                "Saving favorite={} for {} failed; local flag kept={}",
                favorited,
                item_id,
                !state.config.rollback_favorite_on_failure
            );
            if state.config.rollback_favorite_on_failure
                && state.queue.revert_favorite(&item_id, favorited)
            {
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::Tick | Msg::NoOp => Vec::new(),
    };

    (state, effects)
}

fn apply_decision(state: &mut AppState, decision: Decision, at: DateTime<Utc>) -> Vec<Effect> {
    match decision {
        Decision::Approve => commit_vote(state, Vote::Approved, at),
        Decision::Reject => commit_vote(state, Vote::Rejected, at),
        Decision::Inspect => {
            state.mark_dirty();
            Vec::new()
        }
        Decision::None => Vec::new(),
    }
}

/// Votes on the current card now and schedules the advance for later.
fn commit_vote(state: &mut AppState, vote: Vote, at: DateTime<Utc>) -> Vec<Effect> {
    if state.input_locked() {
        return Vec::new();
    }
    let Some(item_id) = state.queue.apply_vote_current(vote, at) else {
        return Vec::new();
    };
    qp_debug!("Vote {:?} on {}", vote, item_id);
    state.gesture.reset();
    state.pending_advance = Some(item_id.clone());
    state.mark_dirty();
    vec![Effect::ScheduleAdvance {
        item_id,
        delay: state.config.advance_delay,
    }]
}

fn toggle_favorite(state: &mut AppState) -> Vec<Effect> {
    let Some((item_id, favorited)) = state.queue.toggle_favorite_current() else {
        return Vec::new();
    };
    state.mark_dirty();
    match state.config.user_id.clone() {
        Some(user_id) => vec![Effect::PersistFavorite {
            user_id,
            item_id,
            favorited,
        }],
        None => {
            qp_warn!("No user id configured; favorite for {} kept locally", item_id);
            Vec::new()
        }
    }
}
