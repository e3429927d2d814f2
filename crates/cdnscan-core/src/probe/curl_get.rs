//! libcurl-backed GET probe.

use std::future::Future;
use std::time::Duration;

use super::{Probe, ProbeFailure};

/// Production probe: one libcurl GET per candidate on the blocking pool.
#[derive(Debug, Clone, Copy, Default)]
pub struct CurlProbe;

impl CurlProbe {
    pub fn new() -> Self {
        Self
    }
}

impl Probe for CurlProbe {
    fn probe(
        &self,
        url: &str,
        timeout: Duration,
    ) -> impl Future<Output = Result<(), ProbeFailure>> + Send {
        let url = url.to_string();
        async move {
            tokio::task::spawn_blocking(move || check_status(&url, timeout).map(|_| ()))
                .await
                .map_err(|e| ProbeFailure::Aborted(e.to_string()))?
        }
    }
}

/// Performs a GET and returns the final status code if it is 2xx.
///
/// Follows redirects. The transfer is cut as soon as the first body bytes
/// arrive, so live streams or large objects do not hold the probe open.
/// libcurl enforces `timeout` on both connect and the whole transfer.
/// Runs in the current thread; call from `spawn_blocking` if used from async code.
pub fn check_status(url: &str, timeout: Duration) -> Result<u32, ProbeFailure> {
    let mut easy = curl::easy::Easy::new();
    easy.url(url)?;
    easy.get(true)?;
    easy.follow_location(true)?;
    easy.connect_timeout(timeout)?;
    easy.timeout(timeout)?;
    easy.signal(false)?;

    let mut body_started = false;
    let outcome = {
        let mut transfer = easy.transfer();
        transfer.write_function(|_data| {
            body_started = true;
            // Short write makes libcurl abort with CURLE_WRITE_ERROR.
            Ok(0)
        })?;
        transfer.perform()
    };

    match outcome {
        Ok(()) => {}
        Err(e) if body_started && e.is_write_error() => {}
        Err(e) if e.is_operation_timedout() => return Err(ProbeFailure::TimedOut(timeout)),
        Err(e) => return Err(ProbeFailure::Transport(e)),
    }

    let code = easy.response_code()?;
    if !(200..300).contains(&code) {
        return Err(ProbeFailure::Status(code));
    }
    Ok(code)
}
