//! Periodic sweeping of an [`ExpiringCache`] and the shutdown drain.

use super::expiring::{ExpireHandler, ExpiringCache};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::fmt::Debug;
use std::hash::Hash;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval};
use tokio_util::sync::CancellationToken;

/// Fallback period when the cache delay cannot be expressed as a std duration.
const FALLBACK_PERIOD: Duration = Duration::from_secs(60);

/// Type-erased sweep/drain over one cache and its expire handler.
#[async_trait]
pub trait Maintenance: Send + Sync {
    async fn sweep_now(&self) -> usize;
    async fn drain_all(&self) -> usize;
}

struct CacheMaintenance<K, V> {
    cache: Arc<ExpiringCache<K, V>>,
    handler: Arc<dyn ExpireHandler<K, V>>,
}

#[async_trait]
impl<K, V> Maintenance for CacheMaintenance<K, V>
where
    K: Eq + Hash + Clone + Debug + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    async fn sweep_now(&self) -> usize {
        let now = self.cache.now();
        self.cache.sweep(now, self.handler.as_ref()).await
    }

    async fn drain_all(&self) -> usize {
        self.cache.drain(self.handler.as_ref()).await
    }
}

pub struct MaintenanceScheduler;

impl MaintenanceScheduler {
    /// Starts sweeping `cache` every `period`. The first sweep happens one
    /// period after spawning.
    pub fn spawn<K, V>(
        cache: Arc<ExpiringCache<K, V>>,
        handler: Arc<dyn ExpireHandler<K, V>>,
        period: Duration,
    ) -> MaintenanceHandle
    where
        K: Eq + Hash + Clone + Debug + Send + Sync + 'static,
        V: Clone + Send + Sync + 'static,
    {
        let target: Arc<dyn Maintenance> = Arc::new(CacheMaintenance { cache, handler });
        let cancel = CancellationToken::new();
        let last_sweep = Arc::new(Mutex::new(None));

        let task = tokio::spawn(run_loop(
            target.clone(),
            period,
            cancel.clone(),
            last_sweep.clone(),
        ));
        tracing::debug!(period_ms = period.as_millis() as u64, "maintenance scheduler started");

        MaintenanceHandle {
            target,
            cancel,
            task: Mutex::new(Some(task)),
            last_sweep,
            drained: AtomicBool::new(false),
        }
    }

    /// Same as [`MaintenanceScheduler::spawn`] with the cache's own delay as period.
    pub fn spawn_default<K, V>(
        cache: Arc<ExpiringCache<K, V>>,
        handler: Arc<dyn ExpireHandler<K, V>>,
    ) -> MaintenanceHandle
    where
        K: Eq + Hash + Clone + Debug + Send + Sync + 'static,
        V: Clone + Send + Sync + 'static,
    {
        let period = match cache.delay().to_std() {
            Ok(period) if !period.is_zero() => period,
            _ => {
                tracing::warn!(
                    delay_secs = cache.delay().num_seconds(),
                    "cache delay unusable as sweep period, using fallback"
                );
                FALLBACK_PERIOD
            }
        };
        Self::spawn(cache, handler, period)
    }
}

async fn run_loop(
    target: Arc<dyn Maintenance>,
    period: Duration,
    cancel: CancellationToken,
    last_sweep: Arc<Mutex<Option<DateTime<Utc>>>>,
) {
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // interval completes its first tick immediately
    ticker.tick().await;

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::debug!("maintenance loop cancelled");
                break;
            }
            _ = ticker.tick() => {
                let evicted = target.sweep_now().await;
                *lock(&last_sweep) = Some(Utc::now());
                if evicted > 0 {
                    tracing::info!(evicted, "expired sessions swept");
                }
            }
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Controls a running maintenance loop.
pub struct MaintenanceHandle {
    target: Arc<dyn Maintenance>,
    cancel: CancellationToken,
    task: Mutex<Option<JoinHandle<()>>>,
    last_sweep: Arc<Mutex<Option<DateTime<Utc>>>>,
    drained: AtomicBool,
}

impl MaintenanceHandle {
    /// Stops future ticks. Does not wait for a sweep in progress.
    pub fn stop(&self) {
        self.cancel.cancel();
    }

    pub fn is_running(&self) -> bool {
        !self.cancel.is_cancelled()
    }

    /// Wall-clock time the last periodic sweep finished.
    pub fn last_sweep(&self) -> Option<DateTime<Utc>> {
        *lock(&self.last_sweep)
    }

    /// Runs one sweep immediately, outside the periodic schedule.
    pub async fn sweep_now(&self) -> usize {
        self.target.sweep_now().await
    }

    /// Stops the loop, waits for it to finish and drains the cache.
    ///
    /// The drain happens once; later calls return 0.
    pub async fn shutdown(&self) -> usize {
        if self.drained.swap(true, Ordering::SeqCst) {
            return 0;
        }
        self.stop();

        let task = lock(&self.task).take();
        if let Some(task) = task {
            if let Err(err) = task.await {
                tracing::warn!(error = %err, "maintenance loop ended abnormally");
            }
        }

        let drained = self.target.drain_all().await;
        tracing::info!(drained, "session cache drained");
        drained
    }
}

impl Drop for MaintenanceHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
