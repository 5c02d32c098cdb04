use chrono::{DateTime, Utc};

use crate::{Suggestion, SuggestionId, Vote};

/// What happened after moving the cursor forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    /// Another item is now current.
    Next,
    /// The cursor reached the end of the batch; a new batch is needed.
    Exhausted,
}

/// The fetched batch and the cursor into it.
///
/// Invariant: `cursor <= batch.len()`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SuggestionQueue {
    batch: Vec<Suggestion>,
    cursor: usize,
}

impl SuggestionQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[Suggestion] {
        &self.batch
    }

    pub fn len(&self) -> usize {
        self.batch.len()
    }

    pub fn is_empty(&self) -> bool {
        self.batch.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn current_item(&self) -> Option<&Suggestion> {
        self.batch.get(self.cursor)
    }

    /// Replaces the batch wholesale and rewinds the cursor.
    pub(crate) fn replace_batch(&mut self, batch: Vec<Suggestion>) {
        self.batch = batch;
        self.cursor = 0;
    }

    pub(crate) fn clear(&mut self) {
        self.batch.clear();
        self.cursor = 0;
    }

    /// Moves past the current item. Never moves beyond the end of the batch.
    pub(crate) fn advance(&mut self) -> Advance {
        if self.cursor < self.batch.len() {
            self.cursor += 1;
        }
        if self.cursor >= self.batch.len() {
            Advance::Exhausted
        } else {
            Advance::Next
        }
    }

    /// Sets the vote on the current item once. Returns its id, or `None` when
    /// the queue is exhausted or the item already carries a vote.
    pub(crate) fn apply_vote_current(
        &mut self,
        vote: Vote,
        at: DateTime<Utc>,
    ) -> Option<SuggestionId> {
        let item = self.batch.get_mut(self.cursor)?;
        if item.vote.is_some() {
            return None;
        }
        item.vote = Some(vote);
        item.voted_at = Some(at);
        Some(item.id.clone())
    }

    /// Flips the favorite flag of the current item and returns its id and new value.
    pub(crate) fn toggle_favorite_current(&mut self) -> Option<(SuggestionId, bool)> {
        let item = self.batch.get_mut(self.cursor)?;
        item.is_favorited = !item.is_favorited;
        Some((item.id.clone(), item.is_favorited))
    }

    /// Restores the flag of an item still showing the failed `favorited` value.
    /// Returns false when no such item remains.
    pub(crate) fn revert_favorite(&mut self, item_id: &str, favorited: bool) -> bool {
        match self
            .batch
            .iter_mut()
            .find(|item| item.id == item_id && item.is_favorited == favorited)
        {
            Some(item) => {
                item.is_favorited = !favorited;
                true
            }
            None => false,
        }
    }
}
