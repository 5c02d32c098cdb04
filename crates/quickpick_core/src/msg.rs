use chrono::{DateTime, Utc};

use crate::{FetchTicket, MealFilter, Suggestion, SuggestionId};

#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    /// User pressed Start with the chosen meal type.
    StartClicked(MealFilter),
    /// User picked another meal type.
    FilterChanged(MealFilter),
    /// User pressed Retry on the error screen.
    RetryClicked,
    /// The screen is going away.
    Unmounted,
    /// Host visibility changed (tab hidden/shown).
    VisibilityChanged { visible: bool, at: DateTime<Utc> },
    DragStarted,
    DragMoved { dx: f32 },
    /// Drag ended at horizontal offset `dx` with release `velocity` (px/s).
    DragReleased {
        dx: f32,
        velocity: f32,
        at: DateTime<Utc>,
    },
    /// Tap at horizontal position `x` (0.0 left edge .. 1.0 right edge).
    CardTapped { x: f32, at: DateTime<Utc> },
    ApproveClicked { at: DateTime<Utc> },
    RejectClicked { at: DateTime<Utc> },
    FavoriteToggled,
    /// Vote feedback delay elapsed for `item_id`.
    AdvanceDue { item_id: SuggestionId },
    /// Engine progress checkpoint for a fetch.
    FetchProgress { ticket: FetchTicket, percent: u8 },
    FetchSucceeded {
        ticket: FetchTicket,
        items: Vec<Suggestion>,
    },
    FetchFailed { ticket: FetchTicket, message: String },
    FetchTimedOut { ticket: FetchTicket },
    /// Persisting a favorite toggle failed remotely.
    FavoritePersistFailed {
        item_id: SuggestionId,
        favorited: bool,
    },
    /// UI/render tick to coalesce rendering.
    Tick,
    NoOp,
}
