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

//! Grouped-count rows served by the statistics endpoints
//!
//! A row is a `(dimension value, count)` pair. On the wire the value sits
//! under a dimension-specific key: `{"type": "exe", "count": 3}`.

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;
use std::fmt;

/// Label reported in place of a NULL type or login
pub const UNKNOWN_LABEL: &str = "unknown";

/// Grouping dimension of an aggregation query
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    FileType,
    Tag,
    Date,
    User,
}

impl Dimension {
    pub const ALL: [Dimension; 4] = [
        Dimension::FileType,
        Dimension::Tag,
        Dimension::Date,
        Dimension::User,
    ];

    /// JSON key carrying the dimension value
    pub fn key(&self) -> &'static str {
        match self {
            Dimension::FileType => "type",
            Dimension::Tag => "tag",
            Dimension::Date => "date",
            Dimension::User => "user",
        }
    }

    /// Endpoint name under `/api/stats`
    pub fn endpoint(&self) -> &'static str {
        match self {
            Dimension::FileType => "count_by_type",
            Dimension::Tag => "count_by_tag",
            Dimension::Date => "upload_timeline",
            Dimension::User => "count_by_user",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Dimension::FileType => "Malware Type Distribution",
            Dimension::Tag => "Tag Distribution",
            Dimension::Date => "Upload Timeline",
            Dimension::User => "Uploads per User",
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.endpoint())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregationRow {
    pub dimension: Dimension,
    pub value: String,
    pub count: u64,
}

impl AggregationRow {
    pub fn new(dimension: Dimension, value: impl Into<String>, count: u64) -> Self {
        Self {
            dimension,
            value: value.into(),
            count,
        }
    }

    /// Read one row of a statistics response.
    ///
    /// Returns `None` when the object lacks the dimension key or a
    /// non-negative integer `count`.
    pub fn from_json(dimension: Dimension, value: &Value) -> Option<Self> {
        let label = match value.get(dimension.key())? {
            Value::String(s) => s.clone(),
            Value::Null => UNKNOWN_LABEL.to_string(),
            other => other.to_string(),
        };
        let count = value.get("count")?.as_u64()?;
        Some(Self::new(dimension, label, count))
    }
}

impl Serialize for AggregationRow {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry(self.dimension.key(), &self.value)?;
        map.serialize_entry("count", &self.count)?;
        map.end()
    }
}
