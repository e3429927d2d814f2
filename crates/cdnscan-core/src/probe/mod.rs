//! Single-candidate existence checks.
//!
//! A probe answers one question: does this candidate URL answer with a 2xx
//! status within the budget? Reasons for failure are kept in [`ProbeFailure`]
//! for logging only; the fan-out layer folds them into "not viable".

mod curl_get;
mod error;

use std::future::Future;
use std::time::Duration;

pub use curl_get::{check_status, CurlProbe};
pub use error::ProbeFailure;

/// Bounded-time existence check against one candidate URL.
///
/// Implementations must stop their underlying work once `timeout` elapses.
pub trait Probe: Send + Sync + 'static {
    fn probe(
        &self,
        url: &str,
        timeout: Duration,
    ) -> impl Future<Output = Result<(), ProbeFailure>> + Send;
}
