use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tokio::fs;
use tracing::warn;

const MIN_POLL_INTERVAL_MS: u64 = 100;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct ConsoleConfig {
    /// Computers status endpoint of the admin backend
    pub status_url: String,
    pub poll_interval_ms: u64,
    pub request_timeout_secs: u64,
    /// Drop results of polls older than the last applied one
    pub discard_out_of_order: bool,
    pub listen: String,
    /// Rename flow of the admin app, the row link is `{prefix}/{id}`
    pub edit_path_prefix: String,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            status_url: "http://127.0.0.1:5000/api/get_computers_status".into(),
            poll_interval_ms: 5000,
            request_timeout_secs: 10,
            discard_out_of_order: true,
            listen: "0.0.0.0:8080".into(),
            edit_path_prefix: "/edit_pc".into(),
        }
    }
}

impl ConsoleConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(MIN_POLL_INTERVAL_MS))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }
}

/// Config file from `CAFEDESK_CONFIG` (default `cafedesk.yaml`); falls back to defaults.
pub async fn load_config() -> ConsoleConfig {
    let path = std::env::var("CAFEDESK_CONFIG").unwrap_or_else(|_| "cafedesk.yaml".into());
    load_config_from(&path).await
}

pub async fn load_config_from(path: impl AsRef<Path>) -> ConsoleConfig {
    let path = path.as_ref();
    if !path.exists() {
        warn!(path = %path.display(), "no config file, using defaults");
        return ConsoleConfig::default();
    }

    let txt = fs::read_to_string(path).await.unwrap_or_default();
    if txt.trim().is_empty() {
        return ConsoleConfig::default();
    }
    serde_yaml::from_str(&txt).unwrap_or_else(|e| {
        warn!(path = %path.display(), error = %e, "invalid config, using defaults");
        ConsoleConfig::default()
    })
}
