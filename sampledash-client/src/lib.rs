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

//! SampleDash client
//!
//! Talks to the sample database API: lists samples, fetches their details
//! through an explicit memoizing [`FetchCache`], and merges both into the
//! [`SampleRecord`](sampledash_core::SampleRecord) set the dashboard renders.
//! Also reads the aggregation endpoints served by `sampledash-server`.

pub mod api;
pub mod cache;
pub mod client;
pub mod credential;
pub mod enrich;
pub mod error;
pub mod stats;
pub mod wire;

pub use api::{HttpSampleApi, SampleApi};
pub use cache::{FetchCache, FetchCacheConfig, FetchCacheStats, FetchKey, FetchOperation};
pub use client::SampleClient;
pub use credential::Credential;
pub use enrich::{enrich, merge_record, EnrichedSet, NoProgress, ProgressSink};
pub use error::{FetchError, Result};
pub use stats::{StatsClient, DEFAULT_STATS_URL};
pub use wire::{ObjectDetail, ObjectList, ObjectSummary, TagEntry};

/// Default base URL of the sample API
pub const DEFAULT_API_URL: &str = "http://mwdb:8080/api";
