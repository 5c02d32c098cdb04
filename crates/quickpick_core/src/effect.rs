use std::time::Duration;

use crate::{FetchTicket, MealFilter, SuggestionId};

/// Parameters for one provider call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub filter: MealFilter,
    pub user_id: Option<String>,
    pub limit: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Begin a provider fetch owned by `ticket`.
    StartFetch {
        ticket: FetchTicket,
        request: FetchRequest,
    },
    /// Revoke `ticket`; its result must never be delivered.
    CancelFetch { ticket: FetchTicket },
    /// Deliver `Msg::AdvanceDue` for `item_id` after `delay`.
    ScheduleAdvance {
        item_id: SuggestionId,
        delay: Duration,
    },
    /// Fire-and-forget favorite upsert (`favorited`) or delete.
    PersistFavorite {
        user_id: String,
        item_id: SuggestionId,
        favorited: bool,
    },
}
