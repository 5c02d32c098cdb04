//! Quickpick core: pure suggestion-session state machine and view-model helpers.
mod config;
mod effect;
pub mod gesture;
mod model;
mod msg;
mod queue;
mod session;
mod state;
mod update;
mod view_model;

pub use config::{SessionConfig, VisibilityPolicy};
pub use effect::{Effect, FetchRequest};
pub use gesture::{Decision, GestureConfig, GestureState};
pub use model::{Difficulty, MealFilter, Suggestion, SuggestionId, Vote};
pub use msg::Msg;
pub use queue::{Advance, SuggestionQueue};
pub use session::{FetchTicket, Phase, Resolution, SessionController, TIMEOUT_MESSAGE};
pub use state::AppState;
pub use update::update;
pub use view_model::{project, AppViewModel, CardView, ContentState, ProjectionInput};
