use chrono::Duration;
use preview_cache::{
    EvictionPolicy, DEFAULT_MAX_TOTAL_BYTES, DEFAULT_PRESSURE_RETENTION_SECS,
    DEFAULT_RETENTION_SECS,
};
use std::path::PathBuf;

/// Server configuration parsed from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    /// Route serving both submit (PUT) and fetch (GET)
    pub path: String,
    pub static_dir: PathBuf,
    /// Size-sweep ceiling in bytes
    pub max_cache_size: u64,
    pub retention_secs: u32,
    pub pressure_retention_secs: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8000,
            path: "/reportbro/report/run".to_string(),
            static_dir: PathBuf::from("./static"),
            max_cache_size: DEFAULT_MAX_TOTAL_BYTES,
            retention_secs: DEFAULT_RETENTION_SECS as u32,
            pressure_retention_secs: DEFAULT_PRESSURE_RETENTION_SECS as u32,
        }
    }
}

impl Config {
    /// Parse configuration from environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Parse configuration from any key/value source, falling back to defaults.
    ///
    /// The `REPORTBRO_*` names of existing deployments are read when the
    /// `PREVIEW_*` name is unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let var = |name: &str, legacy: &str| lookup(name).or_else(|| lookup(legacy));

        let port = var("PREVIEW_SERVER_PORT", "REPORTBRO_SERVER_PORT")
            .or_else(|| lookup("PORT"))
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.port);

        let path = var("PREVIEW_SERVER_PATH", "REPORTBRO_SERVER_PATH")
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty())
            .map(|p| if p.starts_with('/') { p } else { format!("/{}", p) })
            .unwrap_or(defaults.path);

        let static_dir = lookup("PREVIEW_STATIC_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.static_dir);

        let max_cache_size = var("PREVIEW_MAX_CACHE_SIZE", "REPORTBRO_MAX_CACHE_SIZE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.max_cache_size);

        let retention_secs = lookup("PREVIEW_RETENTION_SECS")
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.retention_secs);

        let pressure_retention_secs = lookup("PREVIEW_PRESSURE_RETENTION_SECS")
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.pressure_retention_secs);

        Self {
            port,
            path,
            static_dir,
            max_cache_size,
            retention_secs,
            pressure_retention_secs,
        }
    }

    pub fn eviction_policy(&self) -> EvictionPolicy {
        EvictionPolicy::new(
            Duration::seconds(i64::from(self.retention_secs)),
            self.max_cache_size,
            Duration::seconds(i64::from(self.pressure_retention_secs)),
        )
    }
}
