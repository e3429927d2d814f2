use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Range defaults and bounds applied to incoming lookups (optional section in config.toml).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RangeConfig {
    /// Lowest candidate index used when a lookup omits `min`.
    pub default_min: u32,
    /// Highest candidate index used when a lookup omits `max`.
    pub default_max: u32,
    /// Upper clamp for `max`; keeps a single lookup from fanning out unbounded.
    pub max_cap: u32,
}

impl Default for RangeConfig {
    fn default() -> Self {
        Self {
            default_min: 1,
            default_max: 100,
            max_cap: 500,
        }
    }
}

/// Global configuration loaded from `~/.config/cdnscan/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Address the HTTP lookup endpoint binds to.
    pub listen_addr: String,
    /// Per-candidate probe budget in milliseconds.
    pub probe_timeout_ms: u64,
    /// How long a resolved URL is served from cache.
    pub positive_ttl_ms: u64,
    /// How long an exhausted range is remembered as absent.
    pub negative_ttl_ms: u64,
    /// Candidate host pattern; `{n}` is the node index, `{host}` the requested host.
    pub host_template: String,
    /// Requested URLs must have a host ending with this domain.
    pub allowed_domain: String,
    /// Optional range section; if missing, built-in defaults are used.
    #[serde(default)]
    pub range: Option<RangeConfig>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            listen_addr: "127.0.0.1:3000".to_string(),
            probe_timeout_ms: 2_500,
            positive_ttl_ms: 600_000,
            negative_ttl_ms: 120_000,
            host_template: "fl{n}.moveonjoy.com".to_string(),
            allowed_domain: "moveonjoy.com".to_string(),
            range: None,
        }
    }
}

impl ScanConfig {
    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }

    pub fn positive_ttl(&self) -> Duration {
        Duration::from_millis(self.positive_ttl_ms)
    }

    pub fn negative_ttl(&self) -> Duration {
        Duration::from_millis(self.negative_ttl_ms)
    }

    /// Effective range settings (configured section or defaults).
    pub fn range(&self) -> RangeConfig {
        self.range.clone().unwrap_or_default()
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("cdnscan")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<ScanConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = ScanConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    load_from_path(&path)
}

/// Load configuration from an explicit path. The file must exist.
pub fn load_from_path(path: &Path) -> Result<ScanConfig> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    let cfg: ScanConfig =
        toml::from_str(&data).with_context(|| format!("parsing config {}", path.display()))?;
    Ok(cfg)
}
