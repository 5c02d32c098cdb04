//! Single-flight supervision of provider fetches.
//!
//! Every attempt owns a [`CancellationToken`]. Beginning an attempt cancels all
//! others, so at most one token is ever live. A watchdog races each attempt and
//! cancels its token when it fires.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use quickpick_logging::{qp_debug, qp_warn};
use tokio_util::sync::CancellationToken;

use crate::{
    BatchRequest, Checkpoint, FetchId, FetchResolution, ProgressSink, ProviderError,
    RecommendationProvider,
};

#[derive(Debug)]
pub struct FetchSupervisor {
    timeout: Duration,
    tokens: Mutex<HashMap<FetchId, CancellationToken>>,
}

impl FetchSupervisor {
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            tokens: Mutex::new(HashMap::new()),
        }
    }

    /// Registers `fetch_id` as the only live attempt and returns its token.
    pub fn begin(&self, fetch_id: FetchId) -> CancellationToken {
        let mut tokens = self.lock();
        for (superseded, token) in tokens.drain() {
            qp_debug!("Fetch {} superseded by {}", superseded, fetch_id);
            token.cancel();
        }
        let token = CancellationToken::new();
        tokens.insert(fetch_id, token.clone());
        token
    }

    /// Revokes `fetch_id`. Returns false if it was not live.
    pub fn cancel(&self, fetch_id: FetchId) -> bool {
        match self.lock().remove(&fetch_id) {
            Some(token) => {
                token.cancel();
                true
            }
            None => false,
        }
    }

    pub fn cancel_all(&self) {
        for (_, token) in self.lock().drain() {
            token.cancel();
        }
    }

    /// Number of attempts whose token has not been cancelled.
    pub fn live_count(&self) -> usize {
        self.lock()
            .values()
            .filter(|token| !token.is_cancelled())
            .count()
    }

    /// Drives one attempt to its resolution. Results that race a cancellation
    /// are reported as `Cancelled`.
    pub async fn run(
        &self,
        fetch_id: FetchId,
        token: &CancellationToken,
        provider: &dyn RecommendationProvider,
        request: &BatchRequest,
        progress: &dyn ProgressSink,
    ) -> FetchResolution {
        progress.checkpoint(Checkpoint::Preparing);

        let resolution = tokio::select! {
            biased;
            _ = token.cancelled() => FetchResolution::Cancelled,
            _ = tokio::time::sleep(self.timeout) => {
                qp_warn!("Fetch {} exceeded {:?}", fetch_id, self.timeout);
                token.cancel();
                FetchResolution::TimedOut
            }
            result = provider.fetch_batch(request, token, progress) => match result {
                Ok(records) => FetchResolution::Ready(records),
                Err(ProviderError::Cancelled) => FetchResolution::Cancelled,
                Err(err) => FetchResolution::Failed(err),
            },
        };

        let resolution = match resolution {
            FetchResolution::Ready(_) | FetchResolution::Failed(_) if token.is_cancelled() => {
                FetchResolution::Cancelled
            }
            other => other,
        };
        if matches!(resolution, FetchResolution::Ready(_)) {
            progress.checkpoint(Checkpoint::Processed);
        }

        self.finish(fetch_id);
        resolution
    }

    fn finish(&self, fetch_id: FetchId) {
        self.lock().remove(&fetch_id);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<FetchId, CancellationToken>> {
        self.tokens.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
