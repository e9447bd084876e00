// Copyright 2025 Sushanth (https://github.com/sushanthpy)
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

use anyhow::Result;
use sampledash_client::{Credential, DEFAULT_API_URL, DEFAULT_STATS_URL};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Dashboard configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct DashboardConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub stats: StatsConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiConfig {
    /// Base URL of the sample API
    #[serde(default = "default_api_url")]
    pub url: String,

    /// Bearer token; prompted for when absent everywhere
    #[serde(default)]
    pub token: Option<String>,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StatsConfig {
    /// Base URL of the aggregation service
    #[serde(default = "default_stats_url")]
    pub url: String,
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_stats_url() -> String {
    DEFAULT_STATS_URL.to_string()
}

fn default_timeout() -> u64 {
    30
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            url: default_api_url(),
            token: None,
            timeout_secs: default_timeout(),
        }
    }
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            url: default_stats_url(),
        }
    }
}

impl DashboardConfig {
    /// Load configuration from TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load configuration with priority: env > file > defaults
    ///
    /// Supported environment variables:
    /// - SAMPLEDASH_API_URL: sample API base URL (default: http://mwdb:8080/api)
    /// - SAMPLEDASH_API_TOKEN: bearer token
    /// - SAMPLEDASH_TIMEOUT: request timeout in seconds (default: 30)
    /// - SAMPLEDASH_STATS_URL: aggregation service base URL
    pub fn load(config_file: Option<PathBuf>) -> Result<Self> {
        let mut config = match config_file {
            Some(path) if path.exists() => {
                tracing::debug!("Loading configuration from file: {:?}", path);
                Self::from_file(&path)?
            }
            Some(path) => {
                tracing::warn!("Config file not found: {:?}, using defaults", path);
                Self::default()
            }
            None => Self::default(),
        };

        config.apply_env();
        Ok(config)
    }

    fn apply_env(&mut self) {
        if let Ok(url) = std::env::var("SAMPLEDASH_API_URL") {
            self.api.url = url;
        }
        if let Ok(token) = std::env::var("SAMPLEDASH_API_TOKEN") {
            self.api.token = Some(token);
        }
        if let Ok(timeout) = std::env::var("SAMPLEDASH_TIMEOUT") {
            if let Ok(val) = timeout.parse() {
                self.api.timeout_secs = val;
            }
        }
        if let Ok(url) = std::env::var("SAMPLEDASH_STATS_URL") {
            self.stats.url = url;
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.api.timeout_secs.max(1))
    }
}

/// Pick the first non-empty token: flag, then configuration, then `prompt`.
pub fn resolve_token<F>(flag: Option<String>, config: &DashboardConfig, prompt: F) -> Result<Credential>
where
    F: FnOnce() -> Result<String>,
{
    let configured = flag
        .into_iter()
        .chain(config.api.token.clone())
        .map(Credential::new)
        .find(|c| !c.is_empty());

    let credential = match configured {
        Some(credential) => credential,
        None => Credential::new(prompt()?),
    };

    if credential.is_empty() {
        anyhow::bail!("Token is missing. Pass --token or set SAMPLEDASH_API_TOKEN.");
    }
    tracing::debug!("Using token {}", credential.fingerprint());
    Ok(credential)
}
