use crate::models::DashboardSnapshot;
use crate::service::DashboardService;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// A snapshot tagged with the refresh generation that produced it.
/// Generation 0 means nothing has been published yet.
#[derive(Debug, Clone, Default)]
pub struct PublishedSnapshot {
    pub generation: u64,
    pub snapshot: Arc<DashboardSnapshot>,
}

#[derive(Debug, Clone)]
pub struct RefreshOutcome {
    pub generation: u64,
    pub published: bool,
    pub snapshot: Arc<DashboardSnapshot>,
}

/// Rebuilds snapshots on demand or on an interval. A result is published
/// only if no newer refresh has published first.
pub struct SnapshotRefresher {
    service: DashboardService,
    next_generation: AtomicU64,
    sender: watch::Sender<PublishedSnapshot>,
}

impl SnapshotRefresher {
    pub fn new(service: DashboardService) -> Arc<Self> {
        let (sender, _) = watch::channel(PublishedSnapshot::default());
        Arc::new(Self {
            service,
            next_generation: AtomicU64::new(0),
            sender,
        })
    }

    pub fn subscribe(&self) -> watch::Receiver<PublishedSnapshot> {
        self.sender.subscribe()
    }

    pub fn latest(&self) -> Option<Arc<DashboardSnapshot>> {
        let current = self.sender.borrow();
        (current.generation > 0).then(|| current.snapshot.clone())
    }

    pub async fn refresh_now(&self) -> RefreshOutcome {
        let generation = self.begin();
        let snapshot = Arc::new(self.service.snapshot().await);
        let published = self.publish(generation, snapshot.clone());
        if !published {
            tracing::debug!(generation, "discarding superseded snapshot");
        }
        RefreshOutcome {
            generation,
            published,
            snapshot,
        }
    }

    pub fn spawn_interval(self: &Arc<Self>, period: Duration) -> JoinHandle<()> {
        let refresher = Arc::clone(self);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                let outcome = refresher.refresh_now().await;
                if !outcome.snapshot.unavailable_sources.is_empty() {
                    tracing::warn!(
                        generation = outcome.generation,
                        unavailable = ?outcome.snapshot.unavailable_sources,
                        "snapshot refreshed with unavailable sources"
                    );
                }
            }
        })
    }

    fn begin(&self) -> u64 {
        self.next_generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn publish(&self, generation: u64, snapshot: Arc<DashboardSnapshot>) -> bool {
        self.sender.send_if_modified(|current| {
            if generation <= current.generation {
                return false;
            }
            *current = PublishedSnapshot { generation, snapshot };
            true
        })
    }
}
