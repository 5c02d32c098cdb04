//! Fetch lifecycle for one suggestion screen.
//!
//! The controller never performs IO. It decides when a fetch starts or is
//! cancelled (returned as [`Effect`]s) and which resolutions may write state.
//! At most one [`FetchTicket`] is live at any time, and only the live ticket's
//! resolution is applied.

use chrono::{DateTime, Utc};
use quickpick_logging::{qp_debug, qp_info, qp_warn};

use crate::queue::SuggestionQueue;
use crate::{Effect, FetchRequest, MealFilter, SessionConfig, Suggestion, VisibilityPolicy};

pub const TIMEOUT_MESSAGE: &str = "timed out";

/// Identity of one fetch attempt and its right to write session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FetchTicket(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Loading,
    Success,
    Error,
}

/// Whether a resolution was written or dropped as stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Applied,
    Stale,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct HiddenMark {
    at: DateTime<Utc>,
    progress: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SessionController {
    started: bool,
    phase: Phase,
    progress: u8,
    error_message: Option<String>,
    filter: MealFilter,
    live: Option<FetchTicket>,
    issued: u64,
    hidden: Option<HiddenMark>,
}

impl SessionController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn started(&self) -> bool {
        self.started
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn progress(&self) -> u8 {
        self.progress
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    pub fn filter(&self) -> MealFilter {
        self.filter
    }

    /// The ticket of the attempt that may currently write state, if any.
    pub fn live_ticket(&self) -> Option<FetchTicket> {
        self.live
    }

    pub fn is_loading(&self) -> bool {
        self.live.is_some()
    }

    pub(crate) fn set_filter(&mut self, filter: MealFilter) {
        self.filter = filter;
    }

    pub(crate) fn start(
        &mut self,
        filter: MealFilter,
        config: &SessionConfig,
        queue: &mut SuggestionQueue,
    ) -> Vec<Effect> {
        qp_info!("Starting suggestion session filter={}", filter);
        self.started = true;
        self.filter = filter;
        self.load_next_batch(config, queue)
    }

    /// Starts a new attempt, tearing down any live one first.
    pub(crate) fn load_next_batch(
        &mut self,
        config: &SessionConfig,
        queue: &mut SuggestionQueue,
    ) -> Vec<Effect> {
        let mut effects = Vec::with_capacity(2);
        if let Some(stale) = self.live.take() {
            qp_debug!("Superseding fetch {:?}", stale);
            effects.push(Effect::CancelFetch { ticket: stale });
        }

        self.issued += 1;
        let ticket = FetchTicket(self.issued);
        self.live = Some(ticket);
        self.phase = Phase::Loading;
        self.progress = 0;
        self.error_message = None;
        queue.clear();

        effects.push(Effect::StartFetch {
            ticket,
            request: FetchRequest {
                filter: self.filter,
                user_id: config.user_id.clone(),
                limit: config.batch_size,
            },
        });
        effects
    }

    /// Cancels any live attempt and returns every field to its initial value,
    /// except the chosen filter so a restart asks for the same meal type.
    /// Ticket numbering keeps counting so old tickets can never match again.
    pub(crate) fn teardown(&mut self, queue: &mut SuggestionQueue) -> Vec<Effect> {
        let effects = match self.live.take() {
            Some(ticket) => vec![Effect::CancelFetch { ticket }],
            None => Vec::new(),
        };
        *self = Self {
            issued: self.issued,
            filter: self.filter,
            ..Self::default()
        };
        queue.clear();
        effects
    }

    pub(crate) fn on_hidden(
        &mut self,
        at: DateTime<Utc>,
        config: &SessionConfig,
        queue: &mut SuggestionQueue,
    ) -> Vec<Effect> {
        match config.visibility_policy {
            VisibilityPolicy::CancelOnHide if self.live.is_some() => {
                qp_info!("Host hidden; cancelling in-flight fetch");
                self.teardown(queue)
            }
            VisibilityPolicy::CancelOnHide => Vec::new(),
            VisibilityPolicy::ReconcileOnShow => {
                self.hidden = Some(HiddenMark {
                    at,
                    progress: self.progress,
                });
                Vec::new()
            }
        }
    }

    /// Called when the host becomes visible again. Tears down an attempt that
    /// made no progress for the whole time the host was hidden.
    pub(crate) fn reconcile(
        &mut self,
        at: DateTime<Utc>,
        config: &SessionConfig,
        queue: &mut SuggestionQueue,
    ) -> Vec<Effect> {
        let Some(mark) = self.hidden.take() else {
            return Vec::new();
        };
        if self.live.is_none() || self.progress != mark.progress {
            return Vec::new();
        }
        let hidden_for = (at - mark.at).to_std().unwrap_or_default();
        if hidden_for < config.stuck_after {
            return Vec::new();
        }
        qp_warn!(
            "Fetch {:?} made no progress while hidden for {:?}; resetting",
            self.live,
            hidden_for
        );
        self.teardown(queue)
    }

    /// Applies a progress checkpoint. Progress never decreases within an attempt.
    pub(crate) fn apply_progress(&mut self, ticket: FetchTicket, percent: u8) -> Resolution {
        if !self.is_live(ticket) {
            return Resolution::Stale;
        }
        self.progress = self.progress.max(percent.min(100));
        Resolution::Applied
    }

    pub(crate) fn resolve_success(
        &mut self,
        ticket: FetchTicket,
        items: Vec<Suggestion>,
        queue: &mut SuggestionQueue,
    ) -> Resolution {
        if !self.is_live(ticket) {
            qp_debug!("Discarding stale batch for {:?}", ticket);
            return Resolution::Stale;
        }
        self.live = None;
        self.progress = 100;

        if items.is_empty() {
            qp_info!("No suggestions for filter {}", self.filter);
            self.phase = Phase::Error;
            self.error_message = Some(format!(
                "No suggestions match the {} filter",
                self.filter
            ));
            queue.clear();
        } else {
            qp_info!("Received batch of {} suggestions", items.len());
            self.phase = Phase::Success;
            self.error_message = None;
            queue.replace_batch(items);
        }
        Resolution::Applied
    }

    pub(crate) fn resolve_failure(
        &mut self,
        ticket: FetchTicket,
        message: &str,
        queue: &mut SuggestionQueue,
    ) -> Resolution {
        if !self.is_live(ticket) {
            qp_debug!("Discarding stale failure for {:?}: {}", ticket, message);
            return Resolution::Stale;
        }
        qp_warn!("Fetch {:?} failed: {}", ticket, message);
        self.fail(format!("Request failed: {message}"), queue);
        Resolution::Applied
    }

    pub(crate) fn resolve_timeout(
        &mut self,
        ticket: FetchTicket,
        queue: &mut SuggestionQueue,
    ) -> Resolution {
        if !self.is_live(ticket) {
            return Resolution::Stale;
        }
        qp_warn!("Fetch {:?} timed out", ticket);
        self.fail(TIMEOUT_MESSAGE.to_string(), queue);
        Resolution::Applied
    }

    fn fail(&mut self, message: String, queue: &mut SuggestionQueue) {
        self.live = None;
        self.phase = Phase::Error;
        self.error_message = Some(message);
        queue.clear();
    }

    fn is_live(&self, ticket: FetchTicket) -> bool {
        self.live == Some(ticket)
    }
}
