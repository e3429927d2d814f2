//! Probe with per-URL scripted behavior, for driving scans without a network.
//!
//! Unscripted URLs fail immediately with HTTP 404. Clones share the script and counters.

use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use cdnscan_core::probe::{Probe, ProbeFailure};

#[derive(Debug, Clone, Copy)]
pub enum Step {
    /// Answer 2xx after the delay.
    Ok(Duration),
    /// Answer with a non-2xx status after the delay.
    Fail(Duration, u32),
    /// Never answer.
    Hang,
    /// Panic inside the probe future.
    Panic,
}

#[derive(Debug, Default)]
struct Inner {
    script: Mutex<HashMap<String, Step>>,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
}

#[derive(Debug, Clone, Default)]
pub struct ScriptedProbe {
    inner: Arc<Inner>,
}

impl ScriptedProbe {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, url: &str, step: Step) -> &Self {
        self.inner
            .script
            .lock()
            .unwrap()
            .insert(url.to_string(), step);
        self
    }

    /// Total probes started so far.
    pub fn calls(&self) -> usize {
        self.inner.calls.load(Ordering::SeqCst)
    }

    /// Probes whose futures are still alive (not finished, not dropped).
    pub fn in_flight(&self) -> usize {
        self.inner.in_flight.load(Ordering::SeqCst)
    }

    fn step_for(&self, url: &str) -> Step {
        self.inner
            .script
            .lock()
            .unwrap()
            .get(url)
            .copied()
            .unwrap_or(Step::Fail(Duration::ZERO, 404))
    }
}

struct InFlight(Arc<Inner>);

impl InFlight {
    fn enter(inner: &Arc<Inner>) -> Self {
        inner.in_flight.fetch_add(1, Ordering::SeqCst);
        Self(Arc::clone(inner))
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        self.0.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

impl Probe for ScriptedProbe {
    fn probe(
        &self,
        url: &str,
        timeout: Duration,
    ) -> impl Future<Output = Result<(), ProbeFailure>> + Send {
        let step = self.step_for(url);
        self.inner.calls.fetch_add(1, Ordering::SeqCst);
        let guard = InFlight::enter(&self.inner);
        async move {
            let _guard = guard;
            match step {
                Step::Ok(delay) => {
                    tokio::time::sleep(delay).await;
                    Ok(())
                }
                Step::Fail(delay, code) => {
                    tokio::time::sleep(delay).await;
                    Err(ProbeFailure::Status(code))
                }
                Step::Hang => {
                    tokio::time::sleep(Duration::from_secs(3600)).await;
                    Err(ProbeFailure::TimedOut(timeout))
                }
                Step::Panic => panic!("scripted panic"),
            }
        }
    }
}
