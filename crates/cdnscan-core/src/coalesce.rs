//! Keyed in-flight work sharing.
//!
//! The first caller for a key spawns the work; callers arriving while it runs
//! subscribe to the same outcome instead of starting their own. The
//! registration is dropped as soon as the work ends, whether it produced a
//! value or panicked.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::watch;

type Registry<T> = Arc<Mutex<HashMap<String, watch::Receiver<Option<T>>>>>;

/// The shared run ended without an outcome (the work panicked or was aborted).
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum CoalesceError {
    #[error("in-flight run ended without an outcome")]
    Abandoned,
}

/// Whether a call started the work or attached to an existing run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Leader,
    Joiner,
}

/// Registry of pending runs, at most one per key.
pub struct Coalescer<T> {
    pending: Registry<T>,
}

impl<T> Default for Coalescer<T> {
    fn default() -> Self {
        Self {
            pending: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

impl<T> std::fmt::Debug for Coalescer<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Coalescer")
            .field("pending", &lock(&self.pending).len())
            .finish()
    }
}

/// Removes the registration when the run finishes or unwinds.
struct PendingGuard<T> {
    registry: Registry<T>,
    key: String,
}

impl<T> Drop for PendingGuard<T> {
    fn drop(&mut self) {
        lock(&self.registry).remove(&self.key);
    }
}

fn lock<T>(registry: &Registry<T>) -> MutexGuard<'_, HashMap<String, watch::Receiver<Option<T>>>> {
    registry.lock().unwrap_or_else(PoisonError::into_inner)
}

impl<T> Coalescer<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `work` for `key` unless a run is already pending, in which case the
    /// caller waits for that run. Every caller gets the same outcome.
    ///
    /// The work runs on its own task, so dropping the leading caller does not
    /// cancel it for joiners.
    pub async fn run_exclusive<F, Fut>(&self, key: &str, work: F) -> Result<T, CoalesceError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T> + Send + 'static,
    {
        self.run_exclusive_with_role(key, work).await.0
    }

    /// Like [`run_exclusive`](Self::run_exclusive) but also reports whether
    /// this call led the run or joined one.
    pub async fn run_exclusive_with_role<F, Fut>(
        &self,
        key: &str,
        work: F,
    ) -> (Result<T, CoalesceError>, Role)
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T> + Send + 'static,
    {
        let (mut rx, role) = {
            let mut pending = lock(&self.pending);
            match pending.get(key) {
                Some(rx) => (rx.clone(), Role::Joiner),
                None => {
                    let (tx, rx) = watch::channel(None);
                    pending.insert(key.to_string(), rx.clone());
                    let guard = PendingGuard {
                        registry: Arc::clone(&self.pending),
                        key: key.to_string(),
                    };
                    let fut = work();
                    tokio::spawn(async move {
                        let outcome = fut.await;
                        drop(guard);
                        let _ = tx.send(Some(outcome));
                    });
                    (rx, Role::Leader)
                }
            }
        };

        let outcome = match rx.wait_for(Option::is_some).await {
            Ok(value) => (*value).clone().ok_or(CoalesceError::Abandoned),
            Err(_) => Err(CoalesceError::Abandoned),
        };
        (outcome, role)
    }

    /// True while a run for `key` is in flight.
    pub fn is_pending(&self, key: &str) -> bool {
        lock(&self.pending).contains_key(key)
    }

    pub fn pending_count(&self) -> usize {
        lock(&self.pending).len()
    }
}
