use crate::services::drop_service::DropService;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::{MissedTickBehavior, interval};

/// Periodic reaping on top of the per-request sweep, so expired payloads are
/// freed even when nobody calls in.
pub struct ReaperWorker {
    service: Arc<DropService>,
    period: Duration,
    shutdown: watch::Receiver<bool>,
}

impl ReaperWorker {
    pub fn new(
        service: Arc<DropService>,
        period: Duration,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        Self {
            service,
            period,
            shutdown,
        }
    }

    pub async fn run(mut self) {
        tracing::info!("🚀 Reaper worker started (every {:?})", self.period);

        let mut ticker = interval(self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately
        ticker.tick().await;

        loop {
            tokio::select! {
                changed = self.shutdown.changed() => {
                    if changed.is_err() || *self.shutdown.borrow() {
                        tracing::info!("🛑 Reaper worker shutting down");
                        break;
                    }
                }
                _ = ticker.tick() => {
                    self.perform_cleanup().await;
                }
            }
        }
    }

    async fn perform_cleanup(&self) {
        tracing::debug!("🧹 Running background reap...");

        match self.service.reap().await {
            Ok(removed) => tracing::debug!("Background reap removed {} file(s)", removed),
            Err(e) => tracing::error!("Background reap failed: {}", e),
        }

        let pruned = self.service.prune_locks();
        if pruned > 0 {
            tracing::debug!("Pruned {} idle owner lock(s)", pruned);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DropConfig;
    use crate::services::clock::ManualClock;
    use crate::services::identity::{Credential, OpenIdentity};
    use crate::services::record_store::InMemoryRecordStore;
    use bytes::Bytes;

    #[tokio::test]
    async fn test_worker_reaps_and_stops() {
        let store = Arc::new(InMemoryRecordStore::new());
        let clock = Arc::new(ManualClock::default());
        let service = Arc::new(DropService::new(
            store.clone(),
            Arc::new(OpenIdentity),
            clock.clone(),
            &DropConfig::default(),
        ));

        service
            .put(&Credential::Anonymous, "a.txt", Bytes::from_static(b"a"))
            .await
            .unwrap();
        clock.advance(chrono::Duration::hours(2));

        let (tx, rx) = watch::channel(false);
        let handle = tokio::spawn(
            ReaperWorker::new(service.clone(), Duration::from_millis(10), rx).run(),
        );

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(store.is_empty().await);

        tx.send(true).unwrap();
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("worker stops on shutdown")
            .unwrap();
    }
}
