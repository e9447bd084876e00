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

use crate::api::SampleApi;
use crate::cache::{FetchCache, FetchKey};
use crate::credential::Credential;
use crate::error::{FetchError, Result};
use crate::wire::{ObjectDetail, ObjectList, ObjectSummary};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;

/// Memoizing front of a [`SampleApi`].
///
/// The cache is injected so callers decide its lifetime and when to
/// invalidate it; clones share both the API and the cache.
#[derive(Clone)]
pub struct SampleClient {
    api: Arc<dyn SampleApi>,
    cache: Arc<FetchCache>,
}

impl SampleClient {
    pub fn new(api: Arc<dyn SampleApi>, cache: Arc<FetchCache>) -> Self {
        Self { api, cache }
    }

    pub fn cache(&self) -> &FetchCache {
        &self.cache
    }

    /// Sample list for `credential`.
    ///
    /// Fails with [`FetchError::EmptyList`] when the API returns no samples.
    pub async fn list_objects(&self, credential: &Credential) -> Result<Vec<ObjectSummary>> {
        let raw = self
            .cache
            .get_or_fetch(FetchKey::list_objects(credential), || {
                self.api.list_objects(credential)
            })
            .await?;

        let list = ObjectList::deserialize(raw.as_ref())
            .map_err(|e| FetchError::malformed("/object", e))?;

        if list.objects.is_empty() {
            return Err(FetchError::EmptyList);
        }
        Ok(list.objects)
    }

    /// Detail body exactly as the API returned it.
    pub async fn object_detail_raw(&self, credential: &Credential, id: &str) -> Result<Arc<Value>> {
        self.cache
            .get_or_fetch(FetchKey::object_detail(credential, id), || {
                self.api.object_detail(credential, id)
            })
            .await
    }

    pub async fn object_detail(&self, credential: &Credential, id: &str) -> Result<ObjectDetail> {
        let raw = self.object_detail_raw(credential, id).await?;
        ObjectDetail::deserialize(raw.as_ref())
            .map_err(|e| FetchError::malformed(format!("/object/{}", id), e))
    }

    /// Forget every memoized response.
    pub fn invalidate(&self) {
        self.cache.invalidate_all();
    }
}
