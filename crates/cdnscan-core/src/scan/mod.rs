//! Fan-out prober: race every candidate node in a range, keep the first success.
//!
//! All candidates are probed at once (no throttle beyond the range size). The
//! first 2xx wins; the remaining probe tasks are aborted when the set is
//! dropped, without waiting for them. If every probe fails or times out the
//! scan yields `None`.

mod candidate;

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::task::JoinSet;

use crate::probe::{Probe, ProbeFailure};
use crate::request::ResolutionRequest;

pub use candidate::HostTemplate;

/// Concurrent scanner over a candidate range.
#[derive(Debug)]
pub struct FanOutProber<P> {
    probe: Arc<P>,
    template: HostTemplate,
    timeout: Duration,
}

impl<P: Probe> FanOutProber<P> {
    pub fn new(probe: P, template: HostTemplate, timeout: Duration) -> Self {
        Self {
            probe: Arc::new(probe),
            template,
            timeout,
        }
    }

    /// Returns the URL of the first candidate to answer 2xx, or `None` if all fail.
    pub async fn scan(&self, request: &ResolutionRequest) -> Option<String> {
        let started = Instant::now();
        let mut set = JoinSet::new();
        for (index, url) in self.template.candidates(request) {
            let probe = Arc::clone(&self.probe);
            let budget = self.timeout;
            set.spawn(async move {
                let outcome = match tokio::time::timeout(budget, probe.probe(&url, budget)).await {
                    Ok(result) => result,
                    Err(_) => Err(ProbeFailure::TimedOut(budget)),
                };
                (index, url, outcome)
            });
        }

        while let Some(joined) = set.join_next().await {
            match joined {
                Ok((index, url, Ok(()))) => {
                    tracing::info!(
                        index,
                        elapsed_ms = started.elapsed().as_millis() as u64,
                        "candidate {} responded: {}",
                        index,
                        url
                    );
                    // Dropping the set aborts the losers.
                    return Some(url);
                }
                Ok((index, url, Err(failure))) => {
                    tracing::trace!(index, %url, "candidate not viable: {}", failure);
                }
                Err(e) => {
                    tracing::debug!("probe task ended abnormally: {}", e);
                }
            }
        }
        None
    }
}
