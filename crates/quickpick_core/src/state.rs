use crate::view_model::{project, AppViewModel, CardView, ProjectionInput};
use crate::{ContentState, GestureState, SessionConfig, SessionController, SuggestionId, SuggestionQueue};

/// Everything one suggestion screen owns. Created on mount, dropped on unmount.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppState {
    pub(crate) config: SessionConfig,
    pub(crate) session: SessionController,
    pub(crate) queue: SuggestionQueue,
    pub(crate) gesture: GestureState,
    /// Item whose vote committed and is waiting for its advance timer.
    pub(crate) pending_advance: Option<SuggestionId>,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: SessionConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn session(&self) -> &SessionController {
        &self.session
    }

    pub fn queue(&self) -> &SuggestionQueue {
        &self.queue
    }

    pub fn gesture(&self) -> &GestureState {
        &self.gesture
    }

    pub fn pending_advance(&self) -> Option<&str> {
        self.pending_advance.as_deref()
    }

    /// True while the current card must not accept another vote.
    pub fn input_locked(&self) -> bool {
        self.pending_advance.is_some()
            || self.queue.current_item().is_none_or(|item| item.is_voted())
    }

    pub fn content_state(&self) -> ContentState {
        project(ProjectionInput {
            started: self.session.started(),
            phase: self.session.phase(),
            batch_len: self.queue.len(),
            cursor: self.queue.cursor(),
        })
    }

    pub fn view(&self) -> AppViewModel {
        let content = self.content_state();
        let card = match content {
            ContentState::Suggestions => self
                .queue
                .current_item()
                .map(|item| CardView::from_suggestion(item, &self.gesture)),
            _ => None,
        };
        let position = card
            .as_ref()
            .map(|_| (self.queue.cursor() + 1, self.queue.len()));

        AppViewModel {
            content,
            card,
            position,
            progress: self.session.progress(),
            error_message: self.session.error_message().map(ToOwned::to_owned),
            filter: self.session.filter(),
            dirty: self.dirty,
        }
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Returns whether anything changed since the last call, and clears the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    /// Drops per-card state after the displayed card changed.
    pub(crate) fn reset_card(&mut self) {
        self.gesture.reset();
        self.pending_advance = None;
    }
}
