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

use crate::record::SampleRecord;

/// Tag and free-text predicates selected in the dashboard sidebar.
///
/// Tags use any-match semantics: a record passes when it carries at least one
/// selected tag. The query is a case-sensitive substring tested against the
/// sha256 and the display name. Empty predicates pass everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordFilter {
    pub tags: Vec<String>,
    pub query: Option<String>,
}

impl RecordFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        let query = query.into();
        self.query = if query.is_empty() { None } else { Some(query) };
        self
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty() && self.query.as_deref().map_or(true, str::is_empty)
    }

    pub fn matches(&self, record: &SampleRecord) -> bool {
        self.matches_tags(record) && self.matches_query(record)
    }

    fn matches_tags(&self, record: &SampleRecord) -> bool {
        self.tags.is_empty() || self.tags.iter().any(|tag| record.has_tag(tag))
    }

    fn matches_query(&self, record: &SampleRecord) -> bool {
        match self.query.as_deref() {
            None | Some("") => true,
            Some(q) => record.sha256.contains(q) || record.name.contains(q),
        }
    }

    /// Select the passing records, preserving their order.
    pub fn apply<'a, I>(&self, records: I) -> Vec<&'a SampleRecord>
    where
        I: IntoIterator<Item = &'a SampleRecord>,
    {
        records.into_iter().filter(|r| self.matches(r)).collect()
    }
}
