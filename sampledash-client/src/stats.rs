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

//! Reader for the aggregation endpoints of `sampledash-server`

use crate::error::{FetchError, Result};
use sampledash_core::{AggregationRow, Dimension};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

/// Default base URL of the aggregation service
pub const DEFAULT_STATS_URL: &str = "http://127.0.0.1:8090/api";

#[derive(Debug, Clone)]
pub struct StatsClient {
    base_url: String,
    http: reqwest::Client,
}

impl StatsClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(FetchError::Client)?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `GET {base}/stats/{endpoint}` for one dimension.
    ///
    /// The body may be a bare array or an object wrapping it in `data`.
    /// Rows without the dimension key or a valid count are skipped.
    pub async fn fetch(&self, dimension: Dimension) -> Result<Vec<AggregationRow>> {
        let url = format!("{}/stats/{}", self.base_url, dimension.endpoint());
        debug!("GET {}", url);

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|source| FetchError::Transport {
                url: url.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url,
                status: status.as_u16(),
            });
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| FetchError::malformed(url.clone(), e))?;

        let items = match body {
            Value::Array(items) => items,
            Value::Object(mut map) => match map.remove("data") {
                Some(Value::Array(items)) => items,
                _ => return Err(FetchError::malformed(url, "expected an array or {\"data\": [...]}")),
            },
            _ => return Err(FetchError::malformed(url, "expected an array or {\"data\": [...]}")),
        };

        let total = items.len();
        let rows: Vec<AggregationRow> = items
            .iter()
            .filter_map(|item| AggregationRow::from_json(dimension, item))
            .collect();

        if rows.len() < total {
            warn!(
                "Skipped {} malformed {} rows from {}",
                total - rows.len(),
                dimension,
                url
            );
        }
        Ok(rows)
    }
}
