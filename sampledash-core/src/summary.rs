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

//! Overview metrics, tag rankings and the files table projection

use crate::record::SampleRecord;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

/// Headline metrics of the overview tab, computed over the unfiltered set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub total_samples: usize,
    pub unique_tags: usize,
    pub users: usize,
}

impl Summary {
    pub fn of(records: &[SampleRecord]) -> Self {
        let tags: HashSet<&str> = records
            .iter()
            .flat_map(|r| r.tags.iter().map(String::as_str))
            .collect();
        let users: HashSet<&str> = records.iter().map(|r| r.user.as_str()).collect();

        Self {
            total_samples: records.len(),
            unique_tags: tags.len(),
            users: users.len(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagCount {
    pub tag: String,
    pub count: usize,
}

/// Every tag occurrence across `records`, in record order.
pub fn all_tags(records: &[SampleRecord]) -> Vec<String> {
    records.iter().flat_map(|r| r.tags.iter().cloned()).collect()
}

/// Distinct tags, sorted. These are the choices offered by the tag filter.
pub fn unique_tags(all_tags: &[String]) -> Vec<String> {
    let mut tags: Vec<String> = all_tags
        .iter()
        .cloned()
        .collect::<HashSet<_>>()
        .into_iter()
        .collect();
    tags.sort();
    tags
}

/// Rank tags by raw occurrence count, descending.
///
/// Ties keep first-seen order. A tag repeated on a single sample counts once
/// per occurrence.
pub fn top_tags(all_tags: &[String], limit: usize) -> Vec<TagCount> {
    let mut position: HashMap<&str, usize> = HashMap::new();
    let mut counts: Vec<TagCount> = Vec::new();

    for tag in all_tags {
        match position.get(tag.as_str()) {
            Some(&idx) => counts[idx].count += 1,
            None => {
                position.insert(tag.as_str(), counts.len());
                counts.push(TagCount {
                    tag: tag.clone(),
                    count: 1,
                });
            }
        }
    }

    // stable sort keeps first-seen order among equal counts
    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts.truncate(limit);
    counts
}

/// Row of the "Filtered Files" table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileRow {
    pub id: String,
    pub name: String,
    pub upload_time: Option<DateTime<Utc>>,
    pub md5: String,
    pub sha256: String,
}

impl From<&SampleRecord> for FileRow {
    fn from(record: &SampleRecord) -> Self {
        Self {
            id: record.id.clone(),
            name: record.name.clone(),
            upload_time: record.upload_time,
            md5: record.md5.clone(),
            sha256: record.sha256.clone(),
        }
    }
}

/// Project records to table rows, newest upload first. Rows without an
/// upload time go last, in their original order.
pub fn files_table(records: &[&SampleRecord]) -> Vec<FileRow> {
    let mut rows: Vec<FileRow> = records.iter().map(|r| FileRow::from(*r)).collect();
    rows.sort_by(|a, b| match (&a.upload_time, &b.upload_time) {
        (Some(x), Some(y)) => y.cmp(x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
    rows
}
