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

use crate::credential::Credential;
use crate::error::{FetchError, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

/// Raw access to the sample API.
///
/// Implementations return the decoded JSON body; shaping it into typed
/// payloads happens in [`SampleClient`](crate::SampleClient).
#[async_trait]
pub trait SampleApi: Send + Sync {
    /// `GET /object`
    async fn list_objects(&self, credential: &Credential) -> Result<Value>;

    /// `GET /object/{id}`
    async fn object_detail(&self, credential: &Credential, id: &str) -> Result<Value>;
}

/// [`SampleApi`] over HTTP with bearer authentication
#[derive(Debug, Clone)]
pub struct HttpSampleApi {
    base_url: String,
    http: reqwest::Client,
}

impl HttpSampleApi {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(FetchError::Client)?;

        Ok(Self::with_client(base_url, http))
    }

    pub fn with_client(base_url: impl Into<String>, http: reqwest::Client) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Base URL extended by `segments`, each percent-encoded as one path segment.
    fn endpoint(&self, segments: &[&str]) -> Result<reqwest::Url> {
        let invalid = |reason: &str| FetchError::InvalidUrl {
            url: self.base_url.clone(),
            reason: reason.to_string(),
        };

        let mut url = reqwest::Url::parse(&self.base_url).map_err(|e| invalid(&e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| invalid("cannot be a base"))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get_json(&self, credential: &Credential, segments: &[&str]) -> Result<Value> {
        let endpoint = self.endpoint(segments)?;
        let url = endpoint.to_string();
        debug!("GET {}", url);

        let response = self
            .http
            .get(endpoint)
            .bearer_auth(credential.token())
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

        let body = response
            .text()
            .await
            .map_err(|source| FetchError::Transport {
                url: url.clone(),
                source,
            })?;

        serde_json::from_str(&body).map_err(|e| FetchError::malformed(url, e))
    }
}

#[async_trait]
impl SampleApi for HttpSampleApi {
    async fn list_objects(&self, credential: &Credential) -> Result<Value> {
        self.get_json(credential, &["object"]).await
    }

    async fn object_detail(&self, credential: &Credential, id: &str) -> Result<Value> {
        self.get_json(credential, &["object", id]).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let api = HttpSampleApi::with_client("http://mwdb:8080/api/", reqwest::Client::new());
        assert_eq!(api.base_url(), "http://mwdb:8080/api");
    }

    #[test]
    fn test_id_is_one_encoded_segment() {
        let api = HttpSampleApi::with_client("http://mwdb:8080/api", reqwest::Client::new());
        let url = api.endpoint(&["object", "a/b?c#d"]).unwrap();
        assert_eq!(url.as_str(), "http://mwdb:8080/api/object/a%2Fb%3Fc%23d");

        let bare = HttpSampleApi::with_client("http://mwdb:8080", reqwest::Client::new());
        assert_eq!(
            bare.endpoint(&["object"]).unwrap().as_str(),
            "http://mwdb:8080/object"
        );
    }

    #[test]
    fn test_unparseable_base_url() {
        let api = HttpSampleApi::with_client("not a url", reqwest::Client::new());
        assert!(matches!(
            api.endpoint(&["object"]),
            Err(FetchError::InvalidUrl { .. })
        ));
    }

    #[tokio::test]
    async fn test_sends_bearer_token() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/object")
            .match_header("authorization", "Bearer t0k3n")
            .with_status(200)
            .with_body(r#"{"objects": []}"#)
            .create_async()
            .await;

        let api = HttpSampleApi::new(server.url(), Duration::from_secs(5)).unwrap();
        let body = api.list_objects(&Credential::new("t0k3n")).await.unwrap();

        assert_eq!(body["objects"], serde_json::json!([]));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_error_status_is_reported() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/object/abc")
            .with_status(403)
            .create_async()
            .await;

        let api = HttpSampleApi::new(server.url(), Duration::from_secs(5)).unwrap();
        let err = api
            .object_detail(&Credential::new("t"), "abc")
            .await
            .unwrap_err();

        assert!(matches!(err, FetchError::Status { status: 403, .. }));
    }

    #[tokio::test]
    async fn test_detail_id_with_slash_stays_in_one_segment() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/object/x%2Fy")
            .with_status(200)
            .with_body(r#"{"id": "x/y"}"#)
            .create_async()
            .await;

        let api = HttpSampleApi::new(server.url(), Duration::from_secs(5)).unwrap();
        let body = api.object_detail(&Credential::new("t"), "x/y").await.unwrap();

        assert_eq!(body["id"], "x/y");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_malformed_body() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/object")
            .with_status(200)
            .with_body("<html>login</html>")
            .create_async()
            .await;

        let api = HttpSampleApi::new(server.url(), Duration::from_secs(5)).unwrap();
        let err = api.list_objects(&Credential::new("t")).await.unwrap_err();

        assert!(matches!(err, FetchError::Malformed { .. }));
    }
}
