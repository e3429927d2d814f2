//! Candidate URL construction from a host template.

use anyhow::{bail, Context, Result};
use url::Url;

use crate::request::ResolutionRequest;

const INDEX: &str = "{n}";
const HOST: &str = "{host}";

/// Host naming pattern for numbered CDN nodes, e.g. `fl{n}.moveonjoy.com`.
///
/// `{n}` is replaced with the node index and `{host}` with the host of the
/// requested URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostTemplate {
    pattern: String,
}

impl HostTemplate {
    pub fn parse(pattern: &str) -> Result<Self> {
        let pattern = pattern.trim();
        if !pattern.contains(INDEX) {
            bail!("host template {pattern:?} must contain {INDEX}");
        }
        let template = Self {
            pattern: pattern.to_string(),
        };
        // Render once against a fixed host so a broken template fails at startup.
        let sample = template.host_for(1, "example.com");
        Url::parse(&format!("http://{sample}/"))
            .with_context(|| format!("host template {pattern:?} does not produce a valid host"))?;
        Ok(template)
    }

    fn host_for(&self, index: u32, requested_host: &str) -> String {
        self.pattern
            .replace(INDEX, &index.to_string())
            .replace(HOST, requested_host)
    }

    /// Candidate URL for node `index`: the requested scheme and path on the templated host.
    ///
    /// Query, fragment, credentials and port of the requested URL are not carried over.
    pub fn candidate_url(&self, base: &Url, index: u32) -> String {
        let host = self.host_for(index, base.host_str().unwrap_or_default());
        format!("{}://{}{}", base.scheme(), host, base.path())
    }

    /// All candidates for a request, in index order.
    pub fn candidates(&self, request: &ResolutionRequest) -> Vec<(u32, String)> {
        (request.range_min()..=request.range_max())
            .map(|i| (i, self.candidate_url(request.base_url(), i)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_domain_template_replaces_requested_host() {
        let t = HostTemplate::parse("fl{n}.moveonjoy.com").unwrap();
        let base = Url::parse("https://moveonjoy.com/ESPN/index.m3u8?token=abc").unwrap();
        assert_eq!(
            t.candidate_url(&base, 42),
            "https://fl42.moveonjoy.com/ESPN/index.m3u8"
        );
    }

    #[test]
    fn host_placeholder_prefixes_requested_host() {
        let t = HostTemplate::parse("fl{n}.{host}").unwrap();
        let req = ResolutionRequest::new("http://x.example.com/stream", 1, 3).unwrap();
        let urls: Vec<String> = t.candidates(&req).into_iter().map(|(_, u)| u).collect();
        assert_eq!(
            urls,
            vec![
                "http://fl1.x.example.com/stream",
                "http://fl2.x.example.com/stream",
                "http://fl3.x.example.com/stream",
            ]
        );
    }

    #[test]
    fn candidates_carry_their_index() {
        let t = HostTemplate::parse("n{n}.cdn.test").unwrap();
        let req = ResolutionRequest::new("http://cdn.test/a", 7, 8).unwrap();
        let indexes: Vec<u32> = t.candidates(&req).into_iter().map(|(i, _)| i).collect();
        assert_eq!(indexes, vec![7, 8]);
    }

    #[test]
    fn template_without_index_is_rejected() {
        let err = HostTemplate::parse("static.moveonjoy.com").unwrap_err();
        assert!(err.to_string().contains("{n}"));
    }

    #[test]
    fn template_with_invalid_host_is_rejected() {
        assert!(HostTemplate::parse("fl{n} bad host").is_err());
    }
}
