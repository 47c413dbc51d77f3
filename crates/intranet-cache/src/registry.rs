//! Process-wide registry that sweeps every cache on a schedule.
//!
//! Caches register once at startup through the uniform [`CleanupTarget`]
//! contract. A sweep visits them sequentially in registration order; an error
//! or panic from one cache is logged and the sweep moves on to the next.

use std::any::Any;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::{Arc, Weak};

use indexmap::IndexMap;
use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

use crate::config::CleanupSchedule;
use crate::error::CacheError;
use crate::stats::CacheStats;

/// The contract every registered cache fulfils.
pub trait CleanupTarget: Send + Sync {
    /// Unique name used in logs and stats.
    fn name(&self) -> &str;

    /// Removes expired and excess entries, returning how many were removed.
    fn cleanup(&self) -> Result<usize, CacheError>;

    fn stats(&self) -> CacheStats;

    fn clear(&self);
}

/// Outcome of one cache during a sweep.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CleanupOutcome {
    pub name: String,
    pub deleted: usize,
    /// Stats read after the cleanup, absent if the cache failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<CacheStats>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Result of [`CleanupRegistry::run_cleanup`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CleanupReport {
    pub total_deleted: usize,
    pub caches: Vec<CleanupOutcome>,
}

impl CleanupReport {
    pub fn failed(&self) -> impl Iterator<Item = &CleanupOutcome> {
        self.caches.iter().filter(|outcome| outcome.error.is_some())
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}

/// Runs `f` against `target`, turning a panic into [`CacheError::Panicked`].
fn isolated<T>(
    target: &dyn CleanupTarget,
    f: impl FnOnce(&dyn CleanupTarget) -> Result<T, CacheError>,
) -> Result<T, CacheError> {
    catch_unwind(AssertUnwindSafe(|| f(target)))
        .unwrap_or_else(|panic| Err(CacheError::panicked(target.name(), panic_message(&*panic))))
}

/// Registry of caches swept by a periodic background task.
///
/// The registry is `NotRunning` after construction. [`start`](Self::start)
/// moves it to `Running`; [`stop`](Self::stop) back to `NotRunning`. Both are
/// idempotent.
pub struct CleanupRegistry {
    targets: RwLock<Vec<Arc<dyn CleanupTarget>>>,
    schedule: CleanupSchedule,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl std::fmt::Debug for CleanupRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CleanupRegistry")
            .field("targets", &self.names())
            .field("schedule", &self.schedule)
            .field("running", &self.is_running())
            .finish()
    }
}

impl CleanupRegistry {
    pub fn new(schedule: CleanupSchedule) -> Self {
        Self {
            targets: RwLock::new(Vec::new()),
            schedule,
            task: Mutex::new(None),
        }
    }

    pub fn schedule(&self) -> &CleanupSchedule {
        &self.schedule
    }

    /// Registers a cache. A second registration under an existing name is
    /// ignored with a warning and returns `false`; the first one wins.
    pub fn register(&self, target: Arc<dyn CleanupTarget>) -> bool {
        let mut targets = self.targets.write();
        if targets.iter().any(|t| t.name() == target.name()) {
            warn!(cache = %target.name(), "Cache already registered, ignoring duplicate");
            return false;
        }
        debug!(cache = %target.name(), "Registered cache for cleanup");
        targets.push(target);
        true
    }

    /// Names of all registered caches, in registration order.
    pub fn names(&self) -> Vec<String> {
        self.targets
            .read()
            .iter()
            .map(|t| t.name().to_string())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.targets.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.read().is_empty()
    }

    fn snapshot(&self) -> Vec<Arc<dyn CleanupTarget>> {
        self.targets.read().clone()
    }

    /// Starts the periodic sweep: first after the initial delay, then every
    /// interval.
    ///
    /// Returns `false` if the sweep is already running or no Tokio runtime is
    /// available. The task holds only a weak reference and ends once the
    /// registry is dropped.
    pub fn start(self: &Arc<Self>) -> bool {
        let mut task = self.task.lock();
        if task.as_ref().is_some_and(|handle| !handle.is_finished()) {
            debug!("Cache cleanup already running");
            return false;
        }
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            warn!("No Tokio runtime available, cache cleanup not started");
            return false;
        };

        let registry = Arc::downgrade(self);
        let initial_delay = self.schedule.initial_delay();
        let period = self.schedule.interval();
        *task = Some(runtime.spawn(Self::sweep_loop(registry, initial_delay, period)));

        info!(
            initial_delay_secs = self.schedule.initial_delay_secs,
            interval_secs = self.schedule.interval_secs,
            caches = self.len(),
            "Cache cleanup started"
        );
        true
    }

    async fn sweep_loop(
        registry: Weak<Self>,
        initial_delay: std::time::Duration,
        period: std::time::Duration,
    ) {
        tokio::time::sleep(initial_delay).await;

        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            let Some(registry) = registry.upgrade() else {
                break;
            };
            registry.run_cleanup();
        }
    }

    /// Cancels the periodic sweep. Safe to call when not running.
    pub fn stop(&self) {
        if let Some(handle) = self.task.lock().take() {
            handle.abort();
            info!("Cache cleanup stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.task
            .lock()
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Sweeps every registered cache once, in registration order.
    ///
    /// Per-cache failures are logged and recorded in the report; they never
    /// abort the sweep. A summary is logged only if something was deleted.
    pub fn run_cleanup(&self) -> CleanupReport {
        let mut report = CleanupReport::default();

        for target in self.snapshot() {
            let name = target.name().to_string();
            let outcome = isolated(target.as_ref(), |t| {
                let deleted = t.cleanup()?;
                Ok((deleted, t.stats()))
            });

            match outcome {
                Ok((deleted, stats)) => {
                    if deleted > 0 {
                        info!(
                            cache = %name,
                            deleted,
                            size = stats.size,
                            valid_entries = stats.valid_entries,
                            "Cache cleanup removed entries"
                        );
                    }
                    report.total_deleted += deleted;
                    report.caches.push(CleanupOutcome {
                        name,
                        deleted,
                        stats: Some(stats),
                        error: None,
                    });
                }
                Err(e) => {
                    error!(cache = %name, error = %e, "Cache cleanup failed");
                    report.caches.push(CleanupOutcome {
                        name,
                        deleted: 0,
                        stats: None,
                        error: Some(e.to_string()),
                    });
                }
            }
        }

        if report.total_deleted > 0 {
            info!(
                total_deleted = report.total_deleted,
                caches = report.caches.len(),
                "Cache cleanup sweep completed"
            );
        }
        report
    }

    /// Stats of every registered cache keyed by name, in registration order.
    /// Caches whose stats cannot be read are left out.
    pub fn all_stats(&self) -> IndexMap<String, CacheStats> {
        let mut all = IndexMap::new();
        for target in self.snapshot() {
            match isolated(target.as_ref(), |t| Ok(t.stats())) {
                Ok(stats) => {
                    all.insert(target.name().to_string(), stats);
                }
                Err(e) => warn!(cache = %target.name(), error = %e, "Failed to read cache stats"),
            }
        }
        all
    }

    /// Clears every registered cache. Returns how many were cleared.
    pub fn clear_all(&self) -> usize {
        let mut cleared = 0;
        for target in self.snapshot() {
            match isolated(target.as_ref(), |t| {
                t.clear();
                Ok(())
            }) {
                Ok(()) => cleared += 1,
                Err(e) => warn!(cache = %target.name(), error = %e, "Failed to clear cache"),
            }
        }
        info!(cleared, "All caches cleared");
        cleared
    }
}

impl Drop for CleanupRegistry {
    fn drop(&mut self) {
        if let Some(handle) = self.task.get_mut().take() {
            handle.abort();
        }
    }
}
