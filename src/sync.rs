use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};

use crate::api::AlertSource;
use crate::models::alert::Alert;

#[derive(Debug, Default)]
struct StoreInner {
    alerts: Vec<Alert>,
    last_synced_at: Option<DateTime<Utc>>,
    loading: bool,
    applied_seq: u64,
}

/// Canonical alert collection, replaced wholesale on every successful sync.
/// Readers never observe a partial replacement.
#[derive(Default)]
pub struct AlertStore {
    inner: Mutex<StoreInner>,
    next_seq: AtomicU64,
}

impl AlertStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the current collection, most recent first.
    pub fn alerts(&self) -> Vec<Alert> {
        self.inner.lock().unwrap().alerts.clone()
    }

    pub fn last_synced_at(&self) -> Option<DateTime<Utc>> {
        self.inner.lock().unwrap().last_synced_at
    }

    /// True while a visible load is in flight. Silent refreshes never set it.
    pub fn is_loading(&self) -> bool {
        self.inner.lock().unwrap().loading
    }

    /// Hands out the token for a new fetch. Tokens order requests, not
    /// completions: an older request finishing late gets discarded.
    fn begin_request(&self) -> u64 {
        self.next_seq.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Replaces the collection with a fetch result, sorted most recent
    /// first (stable, so equal timestamps keep source order; undated rows
    /// sort last). Returns false when a newer request already applied.
    fn apply(&self, seq: u64, mut alerts: Vec<Alert>) -> bool {
        alerts.sort_by(|a, b| b.reported_at.cmp(&a.reported_at));

        let mut inner = self.inner.lock().unwrap();
        if seq <= inner.applied_seq {
            return false;
        }
        inner.applied_seq = seq;
        inner.alerts = alerts;
        inner.last_synced_at = Some(Utc::now());
        true
    }

    fn try_begin_visible(&self) -> bool {
        let mut inner = self.inner.lock().unwrap();
        if inner.loading {
            false
        } else {
            inner.loading = true;
            true
        }
    }

    fn end_visible(&self) {
        self.inner.lock().unwrap().loading = false;
    }
}

/// Drives the fetcher: one visible load at startup, then a silent refresh on
/// a fixed interval until `stop()`.
pub struct SyncService {
    store: Arc<AlertStore>,
    source: Arc<dyn AlertSource>,
    poll_interval: Duration,
    shutdown: watch::Sender<bool>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl SyncService {
    pub fn new(source: Arc<dyn AlertSource>, poll_interval: Duration) -> Self {
        let (shutdown, _) = watch::channel(false);
        Self {
            store: Arc::new(AlertStore::new()),
            source,
            poll_interval,
            shutdown,
            task: Mutex::new(None),
        }
    }

    pub fn store(&self) -> Arc<AlertStore> {
        Arc::clone(&self.store)
    }

    /// Visible load: toggles the loading flag around the fetch. A second
    /// visible load while one is in flight is a no-op, so a refresh button
    /// cannot stack requests.
    pub async fn load_visible(&self) {
        if !self.store.try_begin_visible() {
            info!("Refresh ignored, a visible load is already in flight");
            return;
        }
        self.run_fetch().await;
        self.store.end_visible();
    }

    /// Background refresh: same merge, no loading flag, no spinner.
    pub async fn load_silent(&self) {
        self.run_fetch().await;
    }

    async fn run_fetch(&self) {
        let seq = self.store.begin_request();
        match self.source.fetch().await {
            Ok(alerts) => {
                let count = alerts.len();
                if self.store.apply(seq, alerts) {
                    info!("Synced {} alerts (request {})", count, seq);
                } else {
                    warn!("Discarded stale fetch result (request {})", seq);
                }
            }
            // Previous collection stays; the interval is the retry.
            Err(e) => warn!("Alert fetch failed, keeping previous collection: {}", e),
        }
    }

    /// Spawns the poll loop. Calling it twice is a logged no-op.
    pub fn start(self: &Arc<Self>) {
        let mut task = self.task.lock().unwrap();
        if task.is_some() {
            warn!("Sync loop already running");
            return;
        }

        // The task holds a weak handle only, so dropping the last external
        // handle tears the poller down even without an explicit stop().
        let service = Arc::downgrade(self);
        let poll_interval = self.poll_interval;
        let mut shutdown = self.shutdown.subscribe();
        *task = Some(tokio::spawn(async move {
            if *shutdown.borrow() {
                return;
            }
            match service.upgrade() {
                Some(service) => service.load_visible().await,
                None => return,
            }

            let mut ticker = tokio::time::interval(poll_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            // The first tick of a fresh interval completes immediately.
            ticker.tick().await;

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let Some(service) = service.upgrade() else { break };
                        service.load_silent().await;
                    }
                    _ = shutdown.changed() => {
                        info!("Sync loop stopped");
                        break;
                    }
                }
            }
        }));
    }

    /// Cancels the poll loop. Idempotent; no tick fires after this returns
    /// and the task has observed the signal.
    pub fn stop(&self) {
        let _ = self.shutdown.send(true);
        if let Some(task) = self.task.lock().unwrap().take() {
            drop(task);
        }
    }
}

impl Drop for SyncService {
    fn drop(&mut self) {
        let _ = self.shutdown.send(true);
    }
}
