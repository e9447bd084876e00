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

// End-to-end enrichment over HTTP against a mocked sample API

use sampledash_client::{enrich, Credential, FetchCache, HttpSampleApi, SampleClient};
use sampledash_core::{ObjectRef, RelationshipGraph};
use std::sync::Arc;
use std::time::Duration;

fn client_for(server: &mockito::ServerGuard) -> SampleClient {
    let api = HttpSampleApi::new(format!("{}/api", server.url()), Duration::from_secs(5)).unwrap();
    SampleClient::new(Arc::new(api), Arc::new(FetchCache::default_cache()))
}

#[tokio::test]
async fn test_enrich_builds_records_and_detail_graph() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/api/object")
        .match_header("authorization", "Bearer secret")
        .with_status(200)
        .with_body(r#"{"objects": [{"id": "a", "name": "f1", "user": {"login": "admin"}}]}"#)
        .create_async()
        .await;
    server
        .mock("GET", "/api/object/a")
        .with_status(200)
        .with_body(
            r#"{"id": "a", "tags": [{"tag": "x"}], "md5": "", "sha256": "abc",
                "upload_time": "2024-03-01T08:00:00Z", "parents": [], "children": ["b"]}"#,
        )
        .create_async()
        .await;

    let client = client_for(&server);
    let mut progress: Vec<f64> = Vec::new();
    let set = enrich(&client, &Credential::new("secret"), &mut progress)
        .await
        .unwrap();

    assert_eq!(progress, vec![1.0]);
    let record = set.get("a").unwrap();
    assert_eq!(record.tags, vec!["x".to_string()]);
    assert_eq!(record.sha256, "abc");
    assert_eq!(record.user, "admin");
    assert_eq!(record.children, vec![ObjectRef::new("b")]);
    assert!(record.upload_time.is_some());

    let graph = RelationshipGraph::around(record);
    assert_eq!(graph.node("a").unwrap().label, "f1");
    assert_eq!(graph.node("b").unwrap().label, "b");
    assert_eq!(graph.edges().len(), 1);
    assert_eq!(graph.edges()[0].parent, "a");
    assert_eq!(graph.edges()[0].child, "b");
}

#[tokio::test]
async fn test_detail_failure_still_yields_record() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/api/object")
        .with_status(200)
        .with_body(r#"{"objects": [{"id": "a"}, {"id": "b", "name": "dropper.exe"}]}"#)
        .create_async()
        .await;
    server
        .mock("GET", "/api/object/a")
        .with_status(200)
        .with_body(r#"{"id": "a", "tags": [{"tag": "emotet"}], "sha256": "aa"}"#)
        .create_async()
        .await;
    server
        .mock("GET", "/api/object/b")
        .with_status(500)
        .create_async()
        .await;

    let client = client_for(&server);
    let mut progress: Vec<f64> = Vec::new();
    let set = enrich(&client, &Credential::new("t"), &mut progress)
        .await
        .unwrap();

    assert_eq!(set.len(), 2);
    assert_eq!(progress, vec![0.5, 1.0]);

    let b = set.get("b").unwrap();
    assert_eq!(b.name, "dropper.exe");
    assert!(b.tags.is_empty());
    assert_eq!(b.md5, "");
    assert_eq!(set.all_tags, vec!["emotet".to_string()]);
}

#[tokio::test]
async fn test_second_run_is_served_from_cache() {
    let mut server = mockito::Server::new_async().await;
    let list = server
        .mock("GET", "/api/object")
        .with_status(200)
        .with_body(r#"{"objects": [{"id": "a", "name": "f1"}]}"#)
        .expect(1)
        .create_async()
        .await;
    let detail = server
        .mock("GET", "/api/object/a")
        .with_status(200)
        .with_body(r#"{"id": "a"}"#)
        .expect(1)
        .create_async()
        .await;

    let client = client_for(&server);
    let credential = Credential::new("t");
    let first = enrich(&client, &credential, &mut sampledash_client::NoProgress)
        .await
        .unwrap();
    let second = enrich(&client, &credential, &mut sampledash_client::NoProgress)
        .await
        .unwrap();

    assert_eq!(first, second);
    list.assert_async().await;
    detail.assert_async().await;

    let stats = client.cache().stats().await;
    assert_eq!(stats.hits, 2);
    assert_eq!(stats.entry_count, 2);
}

#[tokio::test]
async fn test_unauthorized_list_fails() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/api/object")
        .with_status(401)
        .create_async()
        .await;

    let client = client_for(&server);
    let err = enrich(&client, &Credential::new("bad"), &mut sampledash_client::NoProgress)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        sampledash_client::FetchError::Status { status: 401, .. }
    ));
}
