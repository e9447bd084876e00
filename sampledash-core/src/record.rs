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

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Reference to another sample by identifier.
///
/// The sample API sends references either as a bare id string or as an
/// object carrying an `id` field. Both shapes collapse into this type while
/// deserializing, so nothing past the parser ever sees the wire shape.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ObjectRef(String);

impl ObjectRef {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn id(&self) -> &str {
        &self.0
    }

    pub fn into_id(self) -> String {
        self.0
    }
}

impl fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ObjectRef {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for ObjectRef {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl<'de> Deserialize<'de> for ObjectRef {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum WireRef {
            Bare(String),
            Object { id: String },
        }

        match WireRef::deserialize(deserializer)? {
            WireRef::Bare(id) | WireRef::Object { id } => Ok(Self(id)),
        }
    }
}

/// One enriched sample: list summary merged with its detail payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleRecord {
    /// Unique within one fetch cycle
    pub id: String,
    /// Display name (file name when known)
    pub name: String,
    pub upload_time: Option<DateTime<Utc>>,
    /// Tag strings in source order, duplicates kept
    #[serde(default)]
    pub tags: Vec<String>,
    /// Empty when unknown
    #[serde(default)]
    pub md5: String,
    /// Empty when unknown
    #[serde(default)]
    pub sha256: String,
    /// Owning user login
    pub user: String,
    #[serde(default)]
    pub parents: Vec<ObjectRef>,
    #[serde(default)]
    pub children: Vec<ObjectRef>,
}

impl SampleRecord {
    /// Record with only an id; every other field holds its "unknown" value.
    pub fn bare(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            upload_time: None,
            tags: Vec::new(),
            md5: String::new(),
            sha256: String::new(),
            user: crate::UNKNOWN_LABEL.to_string(),
            parents: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_ref_from_bare_string() {
        let r: ObjectRef = serde_json::from_str("\"abc\"").unwrap();
        assert_eq!(r.id(), "abc");
    }

    #[test]
    fn test_object_ref_from_object() {
        let r: ObjectRef =
            serde_json::from_str(r#"{"id": "def", "type": "file", "tags": []}"#).unwrap();
        assert_eq!(r, ObjectRef::new("def"));
    }

    #[test]
    fn test_mixed_reference_list() {
        let refs: Vec<ObjectRef> = serde_json::from_str(r#"["a", {"id": "b"}, "c"]"#).unwrap();
        let ids: Vec<&str> = refs.iter().map(ObjectRef::id).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_object_ref_rejects_numbers() {
        assert!(serde_json::from_str::<ObjectRef>("42").is_err());
    }

    #[test]
    fn test_bare_record_defaults() {
        let record = SampleRecord::bare("x");
        assert_eq!(record.name, "x");
        assert_eq!(record.user, "unknown");
        assert!(record.md5.is_empty());
        assert!(record.sha256.is_empty());
        assert!(record.tags.is_empty());
    }
}
