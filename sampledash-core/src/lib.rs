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

//! SampleDash Core
//!
//! Sample records, relationship graphs and the filter/render projections the
//! dashboard builds on top of them. Nothing in this crate performs I/O.

pub mod aggregation;
pub mod filter;
pub mod graph;
pub mod record;
pub mod summary;

pub use aggregation::{AggregationRow, Dimension, UNKNOWN_LABEL};
pub use filter::RecordFilter;
pub use graph::{GraphNode, NodeKind, RelationshipEdge, RelationshipGraph};
pub use record::{ObjectRef, SampleRecord};
pub use summary::{all_tags, files_table, top_tags, unique_tags, FileRow, Summary, TagCount};

/// Number of tags shown in the top-tag ranking
pub const TOP_TAG_LIMIT: usize = 20;
