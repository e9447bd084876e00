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

//! Enrichment: sample list + per-sample detail -> record set
//!
//! Details are fetched one at a time, in list order. A failing detail fetch
//! degrades to an empty detail for that sample and the batch goes on; only
//! the list fetch can fail the whole run.

use crate::client::SampleClient;
use crate::credential::Credential;
use crate::error::Result;
use crate::wire::{ObjectDetail, ObjectSummary};
use sampledash_core::{SampleRecord, UNKNOWN_LABEL};
use tracing::{debug, info};

/// Receives the completed fraction after every processed sample.
pub trait ProgressSink {
    /// `fraction` grows from `1/N` to exactly `1.0`.
    fn advance(&mut self, fraction: f64);

    fn finish(&mut self) {}
}

/// Discards progress updates
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn advance(&mut self, _fraction: f64) {}
}

impl ProgressSink for Vec<f64> {
    fn advance(&mut self, fraction: f64) {
        self.push(fraction);
    }
}

/// Output of one enrichment run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnrichedSet {
    /// One record per listed sample, in list order
    pub records: Vec<SampleRecord>,
    /// Every tag occurrence across `records`, in insertion order
    pub all_tags: Vec<String>,
}

impl EnrichedSet {
    pub fn from_records(records: Vec<SampleRecord>) -> Self {
        let all_tags = sampledash_core::all_tags(&records);
        Self { records, all_tags }
    }

    pub fn get(&self, id: &str) -> Option<&SampleRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Merge a list entry with its detail payload.
pub fn merge_record(summary: &ObjectSummary, detail: &ObjectDetail) -> SampleRecord {
    let name = summary
        .name
        .clone()
        .or_else(|| detail.id.clone())
        .unwrap_or_else(|| summary.id.clone());

    SampleRecord {
        id: summary.id.clone(),
        name,
        upload_time: detail.uploaded_at(),
        tags: detail.tag_names(),
        md5: detail.md5.clone().unwrap_or_default(),
        sha256: detail.sha256.clone().unwrap_or_default(),
        user: summary
            .user
            .clone()
            .unwrap_or_else(|| UNKNOWN_LABEL.to_string()),
        parents: detail.parents.clone(),
        children: detail.children.clone(),
    }
}

/// Build the record set for `credential`.
///
/// Fails only when the sample list cannot be fetched or is empty.
pub async fn enrich(
    client: &SampleClient,
    credential: &Credential,
    progress: &mut dyn ProgressSink,
) -> Result<EnrichedSet> {
    let objects = client.list_objects(credential).await?;
    let total = objects.len();
    info!("Enriching {} samples", total);

    let mut records = Vec::with_capacity(total);
    let mut missing = 0usize;

    for (i, object) in objects.iter().enumerate() {
        let detail = match client.object_detail(credential, &object.id).await {
            Ok(detail) => detail,
            Err(e) => {
                debug!("No detail for {}: {}", object.id, e);
                missing += 1;
                ObjectDetail::default()
            }
        };

        records.push(merge_record(object, &detail));
        progress.advance((i + 1) as f64 / total as f64);
    }
    progress.finish();

    if missing > 0 {
        info!("{} of {} samples enriched without detail", missing, total);
    }

    Ok(EnrichedSet::from_records(records))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::SampleApi;
    use crate::cache::FetchCache;
    use crate::error::FetchError;
    use async_trait::async_trait;
    use sampledash_core::ObjectRef;
    use serde_json::{json, Value};
    use std::collections::HashMap;
    use std::sync::Arc;

    /// Serves a fixed list; ids without a detail entry fail with HTTP 500.
    struct FixtureApi {
        list: Value,
        details: HashMap<String, Value>,
    }

    #[async_trait]
    impl SampleApi for FixtureApi {
        async fn list_objects(&self, _credential: &Credential) -> Result<Value> {
            Ok(self.list.clone())
        }

        async fn object_detail(&self, _credential: &Credential, id: &str) -> Result<Value> {
            self.details.get(id).cloned().ok_or(FetchError::Status {
                url: format!("/object/{}", id),
                status: 500,
            })
        }
    }

    fn client(list: Value, details: &[(&str, Value)]) -> SampleClient {
        let api = FixtureApi {
            list,
            details: details
                .iter()
                .map(|(id, v)| (id.to_string(), v.clone()))
                .collect(),
        };
        SampleClient::new(Arc::new(api), Arc::new(FetchCache::default_cache()))
    }

    #[tokio::test]
    async fn test_single_sample_example() {
        let client = client(
            json!({"objects": [{"id": "a", "name": "f1"}]}),
            &[(
                "a",
                json!({"tags": [{"tag": "x"}], "md5": "", "sha256": "abc", "parents": [], "children": ["b"]}),
            )],
        );

        let mut progress: Vec<f64> = Vec::new();
        let set = enrich(&client, &Credential::new("t"), &mut progress)
            .await
            .unwrap();

        assert_eq!(set.len(), 1);
        let record = &set.records[0];
        assert_eq!(record.id, "a");
        assert_eq!(record.name, "f1");
        assert_eq!(record.tags, vec!["x".to_string()]);
        assert_eq!(record.md5, "");
        assert_eq!(record.sha256, "abc");
        assert_eq!(record.children, vec![ObjectRef::new("b")]);
        assert_eq!(record.user, "unknown");
        assert_eq!(set.all_tags, vec!["x".to_string()]);
        assert_eq!(progress, vec![1.0]);
    }

    #[tokio::test]
    async fn test_failed_detail_does_not_abort_batch() {
        let client = client(
            json!({"objects": [
                {"id": "a", "name": "f1", "user": "alice"},
                {"id": "b", "name": "f2"},
                {"id": "c"}
            ]}),
            &[
                ("a", json!({"tags": [{"tag": "x"}, {"tag": "y"}]})),
                ("c", json!({"id": "c", "tags": [{"tag": "x"}]})),
            ],
        );

        let mut progress: Vec<f64> = Vec::new();
        let set = enrich(&client, &Credential::new("t"), &mut progress)
            .await
            .unwrap();

        assert_eq!(set.len(), 3);
        let b = set.get("b").unwrap();
        assert!(b.tags.is_empty());
        assert_eq!(b.sha256, "");
        assert_eq!(b.name, "f2");
        assert_eq!(set.get("c").unwrap().name, "c");
        assert_eq!(set.all_tags, vec!["x", "y", "x"]);

        assert_eq!(progress.len(), 3);
        assert_eq!(*progress.last().unwrap(), 1.0);
        assert!(progress.windows(2).all(|w| w[0] < w[1]));
    }

    #[tokio::test]
    async fn test_empty_list_fails() {
        let client = client(json!({"objects": []}), &[]);
        let mut progress: Vec<f64> = Vec::new();
        let err = enrich(&client, &Credential::new("t"), &mut progress)
            .await
            .unwrap_err();

        assert!(matches!(err, FetchError::EmptyList));
        assert!(progress.is_empty());
    }

    #[tokio::test]
    async fn test_record_count_matches_list() {
        let objects: Vec<Value> = (0..7).map(|i| json!({"id": format!("s{}", i)})).collect();
        let client = client(json!({ "objects": objects }), &[]);

        let set = enrich(&client, &Credential::new("t"), &mut NoProgress)
            .await
            .unwrap();
        assert_eq!(set.len(), 7);
    }

    #[test]
    fn test_merge_prefers_list_name() {
        let summary = ObjectSummary {
            id: "a".into(),
            name: None,
            user: Some("bob".into()),
        };
        let detail = ObjectDetail {
            id: Some("a-detail".into()),
            md5: Some("m".into()),
            ..Default::default()
        };

        let record = merge_record(&summary, &detail);
        assert_eq!(record.name, "a-detail");
        assert_eq!(record.user, "bob");
        assert_eq!(record.md5, "m");
        assert_eq!(record.sha256, "");
    }
}
