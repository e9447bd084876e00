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

//! Loading and selection steps shared by the dashboard commands

use sampledash_client::{enrich, Credential, EnrichedSet, ProgressSink, SampleClient};
use sampledash_core::SampleRecord;

/// Shown instead of the dashboard when the sample list cannot be loaded
pub const NO_DATA: &str = "No data available.";

/// Why `show` has nothing to display
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetailMiss {
    /// The filters left no samples at all
    NoMatches,
    /// The id is not among the filtered samples
    NotSelected,
}

/// Enrich every sample, or explain why the dashboard has no data.
///
/// A failed list fetch is not fatal: the caller prints the message and exits
/// cleanly.
pub async fn load_samples(
    client: &SampleClient,
    credential: &Credential,
    progress: &mut dyn ProgressSink,
) -> Result<EnrichedSet, String> {
    enrich(client, credential, progress).await.map_err(|e| {
        tracing::warn!("Fetching samples failed: {}", e);
        format!("{} {}", NO_DATA, e)
    })
}

/// Find `id` among the filtered samples only.
pub fn select_detail<'a>(
    selected: Vec<&'a SampleRecord>,
    id: &str,
) -> Result<&'a SampleRecord, DetailMiss> {
    if selected.is_empty() {
        return Err(DetailMiss::NoMatches);
    }
    selected
        .into_iter()
        .find(|r| r.id == id)
        .ok_or(DetailMiss::NotSelected)
}
