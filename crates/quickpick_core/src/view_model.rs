//! Projection of session and queue state into the single renderable state.

use crate::{GestureState, MealFilter, Phase, Suggestion, SuggestionId, Vote};

/// The one mode the view layer renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentState {
    Start,
    Loading,
    Error,
    Suggestions,
    Empty,
}

/// The only inputs the projection looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProjectionInput {
    pub started: bool,
    pub phase: Phase,
    pub batch_len: usize,
    pub cursor: usize,
}

/// Pure mapping to exactly one content state. First matching rule wins.
pub fn project(input: ProjectionInput) -> ContentState {
    if !input.started {
        ContentState::Start
    } else if input.phase == Phase::Error {
        ContentState::Error
    } else if input.phase == Phase::Loading {
        ContentState::Loading
    } else if input.batch_len > 0 && input.cursor < input.batch_len {
        ContentState::Suggestions
    } else {
        ContentState::Empty
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CardView {
    pub id: SuggestionId,
    pub name: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub prep_time: Option<String>,
    pub servings: Option<u32>,
    pub difficulty: Option<u8>,
    pub cuisine: Option<String>,
    pub meal_type: Option<String>,
    pub mood_tags: Vec<String>,
    pub dietary_tags: Vec<String>,
    pub vote: Option<Vote>,
    pub is_favorited: bool,
    pub flipped: bool,
    pub drag_offset: f32,
}

impl CardView {
    pub(crate) fn from_suggestion(item: &Suggestion, gesture: &GestureState) -> Self {
        Self {
            id: item.id.clone(),
            name: item.name.clone(),
            description: item.description.clone(),
            image_url: item.image_url.clone(),
            prep_time: item.prep_time.clone(),
            servings: item.servings,
            difficulty: item.difficulty.map(|d| d.level()),
            cuisine: item.cuisine.clone(),
            meal_type: item.meal_type.clone(),
            mood_tags: item.mood_tags.iter().cloned().collect(),
            dietary_tags: item.dietary_tags.iter().cloned().collect(),
            vote: item.vote,
            is_favorited: item.is_favorited,
            flipped: gesture.is_flipped(),
            drag_offset: gesture.drag_offset(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppViewModel {
    pub content: ContentState,
    /// Present exactly when `content` is `Suggestions`.
    pub card: Option<CardView>,
    /// One-based position of the card and the batch size.
    pub position: Option<(usize, usize)>,
    pub progress: u8,
    pub error_message: Option<String>,
    pub filter: MealFilter,
    pub dirty: bool,
}
