use std::time::Duration;

use crate::gesture::GestureConfig;

/// How the session reacts to the host being hidden and shown again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VisibilityPolicy {
    /// Keep fetching while hidden; tear down a stuck attempt once visible again.
    #[default]
    ReconcileOnShow,
    /// Cancel any live fetch the moment the host is hidden.
    CancelOnHide,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    pub user_id: Option<String>,
    pub batch_size: usize,
    /// Delay between a vote committing and the next card showing.
    pub advance_delay: Duration,
    /// Minimum hidden time before a progress-less fetch counts as stuck.
    pub stuck_after: Duration,
    pub visibility_policy: VisibilityPolicy,
    /// Restore the local favorite flag when persisting it fails.
    pub rollback_favorite_on_failure: bool,
    pub gesture: GestureConfig,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            user_id: None,
            batch_size: 20,
            advance_delay: Duration::from_millis(1000),
            stuck_after: Duration::from_secs(10),
            visibility_policy: VisibilityPolicy::default(),
            rollback_favorite_on_failure: false,
            gesture: GestureConfig::default(),
        }
    }
}
