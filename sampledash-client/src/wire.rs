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

//! Payloads of the sample API as they arrive on the wire
//!
//! Everything optional is defaulted here so the merge step never has to
//! care about missing keys or `null`s.

use chrono::{DateTime, NaiveDateTime, Utc};
use sampledash_core::ObjectRef;
use serde::{Deserialize, Deserializer};

const NAIVE_UPLOAD_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];

/// `GET /object`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ObjectList {
    #[serde(default)]
    pub objects: Vec<ObjectSummary>,
}

/// One entry of the sample list
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ObjectSummary {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    /// Uploader login. Accepts a bare string or an object with `login`.
    #[serde(default, deserialize_with = "login")]
    pub user: Option<String>,
}

/// `GET /object/{id}`
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ObjectDetail {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tags: Vec<TagEntry>,
    #[serde(default)]
    pub upload_time: Option<String>,
    #[serde(default)]
    pub md5: Option<String>,
    #[serde(default)]
    pub sha256: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub parents: Vec<ObjectRef>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub children: Vec<ObjectRef>,
}

impl ObjectDetail {
    /// Tag strings of the entries that carry one, in source order.
    pub fn tag_names(&self) -> Vec<String> {
        self.tags
            .iter()
            .filter_map(TagEntry::name)
            .map(str::to_string)
            .collect()
    }

    /// Upload time as RFC 3339, or a zone-less timestamp taken as UTC.
    ///
    /// `None` when absent or unparseable.
    pub fn uploaded_at(&self) -> Option<DateTime<Utc>> {
        let raw = self.upload_time.as_deref()?;
        if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
            return Some(ts.with_timezone(&Utc));
        }

        let naive = NAIVE_UPLOAD_FORMATS
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok());
        if naive.is_none() {
            tracing::debug!("Ignoring unparseable upload_time {:?}", raw);
        }
        naive.map(|ts| ts.and_utc())
    }
}

/// Entry of a detail `tags` array. Only objects with a string `tag` count.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum TagEntry {
    Tagged { tag: String },
    Other(serde_json::Value),
}

impl TagEntry {
    pub fn name(&self) -> Option<&str> {
        match self {
            TagEntry::Tagged { tag } => Some(tag),
            TagEntry::Other(_) => None,
        }
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn login<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum WireUser {
        Login(String),
        Object { login: String },
        Other(serde_json::Value),
    }

    Ok(match Option::<WireUser>::deserialize(deserializer)? {
        Some(WireUser::Login(login)) | Some(WireUser::Object { login }) => Some(login),
        Some(WireUser::Other(_)) | None => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_list_payload() {
        let list: ObjectList = serde_json::from_value(json!({
            "objects": [
                {"id": "a", "name": "f1", "user": "alice"},
                {"id": "b", "user": {"login": "bob", "id": 3}},
                {"id": "c", "user": null}
            ]
        }))
        .unwrap();

        assert_eq!(list.objects.len(), 3);
        assert_eq!(list.objects[0].user.as_deref(), Some("alice"));
        assert_eq!(list.objects[1].user.as_deref(), Some("bob"));
        assert_eq!(list.objects[1].name, None);
        assert_eq!(list.objects[2].user, None);
    }

    #[test]
    fn test_missing_objects_key_is_empty() {
        let list: ObjectList = serde_json::from_value(json!({})).unwrap();
        assert!(list.objects.is_empty());
    }

    #[test]
    fn test_detail_defaults() {
        let detail: ObjectDetail = serde_json::from_value(json!({"id": "a"})).unwrap();
        assert!(detail.tags.is_empty());
        assert!(detail.parents.is_empty());
        assert_eq!(detail.md5, None);
        assert_eq!(detail.uploaded_at(), None);
    }

    #[test]
    fn test_detail_nulls() {
        let detail: ObjectDetail = serde_json::from_value(json!({
            "tags": null, "md5": null, "parents": null, "children": null
        }))
        .unwrap();
        assert!(detail.tags.is_empty());
        assert!(detail.children.is_empty());
    }

    #[test]
    fn test_tag_entries_without_tag_are_skipped() {
        let detail: ObjectDetail = serde_json::from_value(json!({
            "tags": [{"tag": "x"}, {"label": "y"}, "z", {"tag": "w"}]
        }))
        .unwrap();
        assert_eq!(detail.tag_names(), vec!["x".to_string(), "w".to_string()]);
    }

    #[test]
    fn test_references_normalized() {
        let detail: ObjectDetail = serde_json::from_value(json!({
            "parents": [{"id": "p", "type": "file"}],
            "children": ["b", {"id": "c"}]
        }))
        .unwrap();
        assert_eq!(detail.parents, vec![ObjectRef::new("p")]);
        assert_eq!(detail.children, vec![ObjectRef::new("b"), ObjectRef::new("c")]);
    }

    #[test]
    fn test_upload_time_parsing() {
        let detail = ObjectDetail {
            upload_time: Some("2024-05-01T12:30:00+02:00".into()),
            ..Default::default()
        };
        let ts = detail.uploaded_at().unwrap();
        assert_eq!(ts.to_rfc3339(), "2024-05-01T10:30:00+00:00");

        let broken = ObjectDetail {
            upload_time: Some("yesterday".into()),
            ..Default::default()
        };
        assert_eq!(broken.uploaded_at(), None);
    }

    #[test]
    fn test_upload_time_without_zone_is_utc() {
        let spaced = ObjectDetail {
            upload_time: Some("2024-01-01 12:00:00".into()),
            ..Default::default()
        };
        assert_eq!(
            spaced.uploaded_at().unwrap().to_rfc3339(),
            "2024-01-01T12:00:00+00:00"
        );

        let fractional = ObjectDetail {
            upload_time: Some("2024-01-01T12:00:00.250".into()),
            ..Default::default()
        };
        assert_eq!(
            fractional.uploaded_at().unwrap().to_rfc3339(),
            "2024-01-01T12:00:00.250+00:00"
        );

        let date_only = ObjectDetail {
            upload_time: Some("2024-01-01".into()),
            ..Default::default()
        };
        assert_eq!(date_only.uploaded_at(), None);
    }
}
