//! Resolution requests and the admission rules applied before they reach the engine.

use url::Url;

use crate::config::ScanConfig;

/// Reasons a raw lookup is refused before any probing happens.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RequestError {
    #[error("Missing ?url parameter")]
    MissingUrl,
    #[error("Invalid URL format")]
    InvalidUrl,
    #[error("Invalid range parameter")]
    InvalidRangeParam,
    #[error("Invalid range: min cannot be greater than max")]
    InvertedRange,
    #[error("Invalid range: min must be at least 1")]
    ZeroMin,
    #[error("Only {0} domains allowed")]
    DomainNotAllowed(String),
}

/// One lookup: a base URL plus the inclusive range of candidate nodes to try.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolutionRequest {
    raw_url: String,
    base_url: Url,
    range_min: u32,
    range_max: u32,
}

impl ResolutionRequest {
    /// Parses `base_url` and checks `1 <= range_min <= range_max`.
    pub fn new(base_url: &str, range_min: u32, range_max: u32) -> Result<Self, RequestError> {
        if range_min > range_max {
            return Err(RequestError::InvertedRange);
        }
        if range_min == 0 {
            return Err(RequestError::ZeroMin);
        }
        let parsed = Url::parse(base_url).map_err(|_| RequestError::InvalidUrl)?;
        if parsed.host_str().map_or(true, str::is_empty) {
            return Err(RequestError::InvalidUrl);
        }
        Ok(Self {
            raw_url: base_url.to_string(),
            base_url: parsed,
            range_min,
            range_max,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// The URL exactly as the caller supplied it.
    pub fn raw_url(&self) -> &str {
        &self.raw_url
    }

    pub fn range_min(&self) -> u32 {
        self.range_min
    }

    pub fn range_max(&self) -> u32 {
        self.range_max
    }

    /// Number of candidate nodes in the range.
    pub fn candidate_count(&self) -> u32 {
        self.range_max - self.range_min + 1
    }

    /// Identity used for caching and coalescing: "url:min:max" with the raw URL.
    pub fn key(&self) -> String {
        format!("{}:{}:{}", self.raw_url, self.range_min, self.range_max)
    }
}

/// Admission rules for raw lookup parameters (domain allow-list, range defaults and clamps).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestPolicy {
    pub allowed_domain: String,
    pub default_min: u32,
    pub default_max: u32,
    pub max_cap: u32,
}

impl RequestPolicy {
    pub fn from_config(cfg: &ScanConfig) -> Self {
        let range = cfg.range();
        Self {
            allowed_domain: cfg.allowed_domain.clone(),
            default_min: range.default_min,
            default_max: range.default_max,
            max_cap: range.max_cap,
        }
    }

    /// Turns raw query values into a request.
    ///
    /// Order of checks: range (after defaults and clamping), URL presence,
    /// URL syntax, domain. `min` is raised to at least 1 and `max` lowered to
    /// at most `max_cap`.
    pub fn admit(
        &self,
        url: Option<&str>,
        min: Option<&str>,
        max: Option<&str>,
    ) -> Result<ResolutionRequest, RequestError> {
        let min = parse_bound(min, self.default_min)?.max(1);
        let max = parse_bound(max, self.default_max)?.min(i64::from(self.max_cap));
        if min > max {
            return Err(RequestError::InvertedRange);
        }

        let url = url
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .ok_or(RequestError::MissingUrl)?;
        let request = ResolutionRequest::new(url, min as u32, max as u32)?;

        let host = request.base_url().host_str().unwrap_or_default();
        if !host.ends_with(self.allowed_domain.as_str()) {
            return Err(RequestError::DomainNotAllowed(self.allowed_domain.clone()));
        }
        Ok(request)
    }
}

/// Parses an optional integer bound; wide type so clamping happens before narrowing.
fn parse_bound(raw: Option<&str>, default: u32) -> Result<i64, RequestError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(i64::from(default)),
        Some(s) => s.parse::<i64>().map_err(|_| RequestError::InvalidRangeParam),
    }
}
