//! Probe failure type.

use std::time::Duration;

/// Why a candidate was not viable. Never surfaced past the fan-out prober.
#[derive(Debug, thiserror::Error)]
pub enum ProbeFailure {
    /// Response arrived but the status was outside 2xx.
    #[error("HTTP {0}")]
    Status(u32),
    /// No response within the probe budget.
    #[error("timed out after {0:?}")]
    TimedOut(Duration),
    /// Curl reported a transport error (DNS, connect, TLS, reset...).
    #[error(transparent)]
    Transport(#[from] curl::Error),
    /// The probe task ended without producing a result.
    #[error("probe aborted: {0}")]
    Aborted(String),
}
