//! Resolution engine: cache lookup, coalesced scan, cache write-back.

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{bail, Result};

use crate::cache::{MemoryCache, OutcomeStore};
use crate::coalesce::{Coalescer, Role};
use crate::config::ScanConfig;
use crate::probe::Probe;
use crate::request::ResolutionRequest;
use crate::scan::{FanOutProber, HostTemplate};

/// Outcome of a lookup; identical whether served fresh or from cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Found(String),
    NotFound,
}

impl Resolution {
    pub fn url(&self) -> Option<&str> {
        match self {
            Resolution::Found(url) => Some(url),
            Resolution::NotFound => None,
        }
    }
}

impl From<Option<String>> for Resolution {
    fn from(found: Option<String>) -> Self {
        found.map_or(Resolution::NotFound, Resolution::Found)
    }
}

/// Tunables for one engine instance.
#[derive(Debug, Clone)]
pub struct EngineSettings {
    pub host_template: HostTemplate,
    pub probe_timeout: Duration,
    pub positive_ttl: Duration,
    pub negative_ttl: Duration,
}

impl EngineSettings {
    /// Rejects a zero probe timeout: libcurl reads 0 as "no limit".
    pub fn from_config(cfg: &ScanConfig) -> Result<Self> {
        if cfg.probe_timeout_ms == 0 {
            bail!("probe_timeout_ms must be greater than 0");
        }
        Ok(Self {
            host_template: HostTemplate::parse(&cfg.host_template)?,
            probe_timeout: cfg.probe_timeout(),
            positive_ttl: cfg.positive_ttl(),
            negative_ttl: cfg.negative_ttl(),
        })
    }
}

/// Entry point for lookups. Cheap to share behind an `Arc`.
pub struct ResolutionEngine<P> {
    prober: Arc<FanOutProber<P>>,
    store: Arc<dyn OutcomeStore>,
    coalescer: Coalescer<Option<String>>,
    positive_ttl: Duration,
    negative_ttl: Duration,
}

impl<P> std::fmt::Debug for ResolutionEngine<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolutionEngine")
            .field("cache", &self.store.counts())
            .field("coalescer", &self.coalescer)
            .field("positive_ttl", &self.positive_ttl)
            .field("negative_ttl", &self.negative_ttl)
            .finish()
    }
}

impl<P: Probe> ResolutionEngine<P> {
    pub fn new(probe: P, store: Arc<dyn OutcomeStore>, settings: EngineSettings) -> Self {
        Self {
            prober: Arc::new(FanOutProber::new(
                probe,
                settings.host_template,
                settings.probe_timeout,
            )),
            store,
            coalescer: Coalescer::new(),
            positive_ttl: settings.positive_ttl,
            negative_ttl: settings.negative_ttl,
        }
    }

    /// Engine with an in-process cache on the system clock.
    pub fn from_config(cfg: &ScanConfig, probe: P) -> Result<Self> {
        let settings = EngineSettings::from_config(cfg)?;
        Ok(Self::new(probe, Arc::new(MemoryCache::new()), settings))
    }

    /// Resolves a request to a live candidate URL, or `NotFound` if none answered.
    pub async fn resolve(&self, request: &ResolutionRequest) -> Resolution {
        let key = request.key();

        if let Some(cached) = cached_outcome(self.store.as_ref(), &key) {
            return cached;
        }

        let prober = Arc::clone(&self.prober);
        let store = Arc::clone(&self.store);
        let request = request.clone();
        let run_key = key.clone();
        let (positive_ttl, negative_ttl) = (self.positive_ttl, self.negative_ttl);

        let (outcome, role) = self
            .coalescer
            .run_exclusive_with_role(&key, move || async move {
                // A run for this key may have finished between our miss and taking the slot.
                if let Some(cached) = cached_outcome(store.as_ref(), &run_key) {
                    return cached.url().map(str::to_string);
                }
                tracing::info!(
                    key = %run_key,
                    "scan start: checking {} nodes ({}..={})",
                    request.candidate_count(),
                    request.range_min(),
                    request.range_max()
                );
                let started = Instant::now();
                let found = prober.scan(&request).await;
                record_outcome(
                    store.as_ref(),
                    &run_key,
                    found.as_deref(),
                    started,
                    positive_ttl,
                    negative_ttl,
                );
                found
            })
            .await;

        if role == Role::Joiner {
            tracing::debug!(key = %key, "joined in-flight scan");
        }

        match outcome {
            Ok(found) => Resolution::from(found),
            Err(e) => {
                tracing::warn!(key = %key, "scan produced no outcome: {}", e);
                Resolution::NotFound
            }
        }
    }
}

fn cached_outcome(store: &dyn OutcomeStore, key: &str) -> Option<Resolution> {
    if let Some(hit) = store.get_positive(key) {
        tracing::debug!(
            key,
            remaining_secs = hit.remaining.as_secs(),
            "cache hit: {}",
            hit.url
        );
        return Some(Resolution::Found(hit.url));
    }
    if let Some(remaining) = store.get_negative(key) {
        tracing::debug!(key, remaining_secs = remaining.as_secs(), "negative cache hit");
        return Some(Resolution::NotFound);
    }
    None
}

fn record_outcome(
    store: &dyn OutcomeStore,
    key: &str,
    found: Option<&str>,
    started: Instant,
    positive_ttl: Duration,
    negative_ttl: Duration,
) {
    let elapsed_ms = started.elapsed().as_millis() as u64;
    match found {
        Some(url) => {
            tracing::info!(key, elapsed_ms, "scan found {}", url);
            if store.set_positive(key, url, positive_ttl) {
                tracing::debug!(key, "cleared negative entry");
            }
        }
        None => {
            tracing::info!(
                key,
                elapsed_ms,
                "scan found no live node, caching absence for {}s",
                negative_ttl.as_secs()
            );
            store.set_negative(key, negative_ttl);
        }
    }

    let swept = store.sweep_expired();
    if swept.total() > 0 {
        tracing::debug!(
            positive = swept.positive,
            negative = swept.negative,
            "removed expired cache entries"
        );
    }
    let counts = store.counts();
    tracing::debug!(
        positive = counts.positive,
        negative = counts.negative,
        "cache size"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_from_default_config() {
        let settings = EngineSettings::from_config(&ScanConfig::default()).unwrap();
        assert_eq!(settings.probe_timeout, Duration::from_millis(2_500));
        assert_eq!(settings.positive_ttl, Duration::from_secs(600));
        assert_eq!(settings.negative_ttl, Duration::from_secs(120));
    }

    #[test]
    fn zero_probe_timeout_is_rejected() {
        let cfg = ScanConfig {
            probe_timeout_ms: 0,
            ..ScanConfig::default()
        };
        let err = EngineSettings::from_config(&cfg).unwrap_err();
        assert!(err.to_string().contains("probe_timeout_ms"));
    }

    #[test]
    fn bad_host_template_is_rejected() {
        let cfg = ScanConfig {
            host_template: "static.moveonjoy.com".to_string(),
            ..ScanConfig::default()
        };
        assert!(EngineSettings::from_config(&cfg).is_err());
    }
}
