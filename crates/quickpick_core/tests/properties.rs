mod common;

use std::collections::BTreeSet;

use chrono::{DateTime, Duration as ChronoDuration, TimeZone, Utc};
use common::batch;
use proptest::prelude::*;
use quickpick_core::{
    project, update, AppState, ContentState, Effect, FetchTicket, MealFilter, Msg, Phase,
    ProjectionInput, Vote,
};

#[derive(Debug, Clone)]
enum Op {
    Start(usize),
    ChangeFilter(usize),
    Retry,
    Unmount,
    Hide(i64),
    Show(i64),
    Progress(u8),
    ResolveLive(usize),
    ResolveOld(usize, usize),
    FailLive,
    TimeoutLive,
    Approve,
    Reject,
    AdvancePending,
    Swipe(f32, f32),
    Favorite,
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0usize..6).prop_map(Op::Start),
        (0usize..6).prop_map(Op::ChangeFilter),
        Just(Op::Retry),
        Just(Op::Unmount),
        (0i64..5).prop_map(Op::Hide),
        (0i64..30).prop_map(Op::Show),
        (0u8..=100).prop_map(Op::Progress),
        (0usize..4).prop_map(Op::ResolveLive),
        (0usize..8, 0usize..4).prop_map(|(i, n)| Op::ResolveOld(i, n)),
        Just(Op::FailLive),
        Just(Op::TimeoutLive),
        Just(Op::Approve),
        Just(Op::Reject),
        Just(Op::AdvancePending),
        (-200.0f32..200.0, -1000.0f32..1000.0).prop_map(|(dx, v)| Op::Swipe(dx, v)),
        Just(Op::Favorite),
    ]
}

fn clock(seconds: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(1_700_000_000, 0).unwrap() + ChronoDuration::seconds(seconds)
}

/// Tracks which tickets an engine would still consider live.
#[derive(Default)]
struct EngineModel {
    live: BTreeSet<FetchTicket>,
    issued: Vec<FetchTicket>,
}

impl EngineModel {
    fn observe(&mut self, effects: &[Effect]) {
        for effect in effects {
            match effect {
                Effect::StartFetch { ticket, .. } => {
                    self.live.insert(*ticket);
                    self.issued.push(*ticket);
                }
                Effect::CancelFetch { ticket } => {
                    self.live.remove(ticket);
                }
                _ => {}
            }
        }
    }
}

fn to_msg(op: &Op, state: &AppState, engine: &mut EngineModel, now: &mut i64) -> Option<Msg> {
    let live = state.session().live_ticket();
    let msg = match op {
        Op::Start(i) => Msg::StartClicked(MealFilter::ALL[*i]),
        Op::ChangeFilter(i) => Msg::FilterChanged(MealFilter::ALL[*i]),
        Op::Retry => Msg::RetryClicked,
        Op::Unmount => Msg::Unmounted,
        Op::Hide(dt) => {
            *now += dt;
            Msg::VisibilityChanged {
                visible: false,
                at: clock(*now),
            }
        }
        Op::Show(dt) => {
            *now += dt;
            Msg::VisibilityChanged {
                visible: true,
                at: clock(*now),
            }
        }
        Op::Progress(p) => Msg::FetchProgress {
            ticket: live?,
            percent: *p,
        },
        Op::ResolveLive(n) => {
            let ticket = live?;
            engine.live.remove(&ticket);
            Msg::FetchSucceeded {
                ticket,
                items: batch(*n),
            }
        }
        Op::ResolveOld(i, n) => {
            if engine.issued.is_empty() {
                return None;
            }
            let ticket = engine.issued[i % engine.issued.len()];
            if Some(ticket) == live {
                return None;
            }
            Msg::FetchSucceeded {
                ticket,
                items: batch(*n),
            }
        }
        Op::FailLive => {
            let ticket = live?;
            engine.live.remove(&ticket);
            Msg::FetchFailed {
                ticket,
                message: "boom".to_string(),
            }
        }
        Op::TimeoutLive => {
            let ticket = live?;
            engine.live.remove(&ticket);
            Msg::FetchTimedOut { ticket }
        }
        Op::Approve => Msg::ApproveClicked { at: clock(*now) },
        Op::Reject => Msg::RejectClicked { at: clock(*now) },
        Op::AdvancePending => Msg::AdvanceDue {
            item_id: state.pending_advance()?.to_string(),
        },
        Op::Swipe(dx, velocity) => Msg::DragReleased {
            dx: *dx,
            velocity: *velocity,
            at: clock(*now),
        },
        Op::Favorite => Msg::FavoriteToggled,
    };
    Some(msg)
}

proptest! {
    #[test]
    fn reducer_upholds_session_invariants(ops in prop::collection::vec(op(), 1..60)) {
        let mut state = AppState::new();
        let mut engine = EngineModel::default();
        let mut now = 0i64;
        let mut votes_seen: Vec<(String, Vote)> = Vec::new();

        for op in &ops {
            let Some(msg) = to_msg(op, &state, &mut engine, &mut now) else {
                continue;
            };
            if matches!(op, Op::Swipe(..)) {
                let (next, _) = update(state, Msg::DragStarted);
                state = next;
            }
            let (next, effects) = update(state, msg);
            state = next;
            engine.observe(&effects);

            // Single flight: at most one ticket may still write state.
            prop_assert!(engine.live.len() <= 1);
            prop_assert_eq!(engine.live.iter().next().copied(), state.session().live_ticket());

            // Cursor bound and its projection.
            let queue = state.queue();
            prop_assert!(queue.cursor() <= queue.len());
            let view = state.view();
            if queue.cursor() == queue.len() {
                prop_assert_ne!(view.content, ContentState::Suggestions);
            }
            prop_assert_eq!(view.card.is_some(), view.content == ContentState::Suggestions);
            if state.session().phase() == Phase::Loading {
                prop_assert!(state.session().live_ticket().is_some());
            }

            // Votes are set once while their batch lives.
            for item in queue.items() {
                if let Some(vote) = item.vote {
                    let first = votes_seen
                        .iter()
                        .find(|(id, _)| *id == item.id)
                        .map(|(_, first)| *first);
                    match first {
                        Some(first) => prop_assert_eq!(first, vote),
                        None => votes_seen.push((item.id.clone(), vote)),
                    }
                }
            }
            if queue.is_empty() {
                votes_seen.clear();
            }
        }
    }

    #[test]
    fn projection_is_deterministic(
        started in any::<bool>(),
        phase in prop_oneof![
            Just(Phase::Idle),
            Just(Phase::Loading),
            Just(Phase::Success),
            Just(Phase::Error),
        ],
        batch_len in 0usize..10,
        cursor in 0usize..10,
    ) {
        let input = ProjectionInput { started, phase, batch_len, cursor };
        let first = project(input);
        prop_assert_eq!(first, project(input));
        if first == ContentState::Suggestions {
            prop_assert!(cursor < batch_len);
        }
    }
}
