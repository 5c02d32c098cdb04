use std::sync::{mpsc, Arc};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use quickpick_logging::{qp_debug, qp_info, qp_warn};

use crate::provider::ChannelProgressSink;
use crate::{
    BatchRequest, EngineConfig, EngineError, EngineEvent, FavoriteStore, FetchId,
    FetchResolution, FetchSupervisor, RecommendationProvider,
};

enum EngineCommand {
    StartFetch {
        fetch_id: FetchId,
        request: BatchRequest,
    },
    CancelFetch {
        fetch_id: FetchId,
    },
    ScheduleAdvance {
        item_id: String,
        delay: Duration,
    },
    SetFavorite {
        user_id: String,
        item_id: String,
        favorited: bool,
    },
    Shutdown,
}

/// Owns the async runtime thread that performs all IO for one session.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: mpsc::Receiver<EngineEvent>,
    supervisor: Arc<FetchSupervisor>,
    thread: Option<JoinHandle<()>>,
}

impl EngineHandle {
    pub fn new(
        config: EngineConfig,
        provider: Arc<dyn RecommendationProvider>,
        store: Arc<dyn FavoriteStore>,
    ) -> Result<Self, EngineError> {
        let runtime = tokio::runtime::Runtime::new()?;
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();
        let supervisor = Arc::new(FetchSupervisor::new(config.fetch_timeout));

        let worker = Worker {
            provider,
            store,
            supervisor: supervisor.clone(),
            event_tx,
        };
        let thread = thread::Builder::new()
            .name("quickpick-engine".to_string())
            .spawn(move || {
                while let Ok(command) = cmd_rx.recv() {
                    if matches!(command, EngineCommand::Shutdown) {
                        worker.supervisor.cancel_all();
                        break;
                    }
                    worker.handle(&runtime, command);
                }
                runtime.shutdown_background();
                qp_debug!("Engine thread stopped");
            })?;

        Ok(Self {
            cmd_tx,
            event_rx,
            supervisor,
            thread: Some(thread),
        })
    }

    /// Starts `fetch_id`, superseding whatever attempt was live.
    pub fn start_fetch(&self, fetch_id: FetchId, request: BatchRequest) -> Result<(), EngineError> {
        self.send(EngineCommand::StartFetch { fetch_id, request })
    }

    pub fn cancel_fetch(&self, fetch_id: FetchId) -> Result<(), EngineError> {
        self.send(EngineCommand::CancelFetch { fetch_id })
    }

    /// Emits `EngineEvent::AdvanceDue` for `item_id` once `delay` has passed.
    pub fn schedule_advance(
        &self,
        item_id: impl Into<String>,
        delay: Duration,
    ) -> Result<(), EngineError> {
        self.send(EngineCommand::ScheduleAdvance {
            item_id: item_id.into(),
            delay,
        })
    }

    pub fn set_favorite(
        &self,
        user_id: impl Into<String>,
        item_id: impl Into<String>,
        favorited: bool,
    ) -> Result<(), EngineError> {
        self.send(EngineCommand::SetFavorite {
            user_id: user_id.into(),
            item_id: item_id.into(),
            favorited,
        })
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<EngineEvent> {
        self.event_rx.recv_timeout(timeout).ok()
    }

    /// Number of fetches whose token is still live.
    pub fn live_fetches(&self) -> usize {
        self.supervisor.live_count()
    }

    /// Cancels every live fetch and stops the engine thread.
    pub fn shutdown(&mut self) {
        let _ = self.cmd_tx.send(EngineCommand::Shutdown);
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }

    fn send(&self, command: EngineCommand) -> Result<(), EngineError> {
        self.cmd_tx
            .send(command)
            .map_err(|_| EngineError::Disconnected)
    }
}

impl Drop for EngineHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}

struct Worker {
    provider: Arc<dyn RecommendationProvider>,
    store: Arc<dyn FavoriteStore>,
    supervisor: Arc<FetchSupervisor>,
    event_tx: mpsc::Sender<EngineEvent>,
}

impl Worker {
    fn handle(&self, runtime: &tokio::runtime::Runtime, command: EngineCommand) {
        match command {
            EngineCommand::StartFetch { fetch_id, request } => {
                // Registered on this thread so commands apply in send order.
                let token = self.supervisor.begin(fetch_id);
                let supervisor = self.supervisor.clone();
                let provider = self.provider.clone();
                let event_tx = self.event_tx.clone();
                qp_info!(
                    "Fetch {} meal_type={} limit={}",
                    fetch_id,
                    request.meal_type,
                    request.limit
                );
                runtime.spawn(async move {
                    let sink = ChannelProgressSink::new(fetch_id, token.clone(), event_tx.clone());
                    let resolution = supervisor
                        .run(fetch_id, &token, provider.as_ref(), &request, &sink)
                        .await;
                    let event = match resolution {
                        FetchResolution::Ready(records) => {
                            EngineEvent::BatchReady { fetch_id, records }
                        }
                        FetchResolution::Failed(error) => {
                            qp_warn!("Fetch {} failed: {}", fetch_id, error);
                            EngineEvent::FetchFailed { fetch_id, error }
                        }
                        FetchResolution::TimedOut => EngineEvent::FetchTimedOut { fetch_id },
                        FetchResolution::Cancelled => {
                            qp_debug!("Fetch {} cancelled", fetch_id);
                            return;
                        }
                    };
                    let _ = event_tx.send(event);
                });
            }
            EngineCommand::CancelFetch { fetch_id } => {
                if self.supervisor.cancel(fetch_id) {
                    qp_debug!("Fetch {} cancelled on request", fetch_id);
                }
            }
            EngineCommand::ScheduleAdvance { item_id, delay } => {
                let event_tx = self.event_tx.clone();
                runtime.spawn(async move {
                    tokio::time::sleep(delay).await;
                    let _ = event_tx.send(EngineEvent::AdvanceDue { item_id });
                });
            }
            EngineCommand::SetFavorite {
                user_id,
                item_id,
                favorited,
            } => {
                let store = self.store.clone();
                let event_tx = self.event_tx.clone();
                runtime.spawn(async move {
                    let event = match store.set_favorite(&user_id, &item_id, favorited).await {
                        Ok(()) => EngineEvent::FavoriteSaved { item_id, favorited },
                        Err(error) => {
                            qp_warn!("Saving favorite {} failed: {}", item_id, error);
                            EngineEvent::FavoriteFailed {
                                item_id,
                                favorited,
                                error,
                            }
                        }
                    };
                    let _ = event_tx.send(event);
                });
            }
            EngineCommand::Shutdown => {}
        }
    }
}
