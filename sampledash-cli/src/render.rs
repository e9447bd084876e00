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

//! Text rendering of the dashboard views

use colored::Colorize;
use sampledash_core::{AggregationRow, Dimension, FileRow, RelationshipGraph, Summary, TagCount};
use serde_json::Value;
use std::fmt::Write;
use tabled::{settings::Style, Table, Tabled};

const BAR_WIDTH: usize = 40;

/// Horizontal bar chart; bars scale to the largest count.
pub fn bar_chart(rows: &[(String, u64)]) -> String {
    let max = rows.iter().map(|(_, n)| *n).max().unwrap_or(0);
    let label_width = rows.iter().map(|(l, _)| l.chars().count()).max().unwrap_or(0);

    let mut out = String::new();
    for (label, count) in rows {
        let len = if max == 0 {
            0
        } else {
            ((*count as f64 / max as f64) * BAR_WIDTH as f64).round() as usize
        };
        let _ = writeln!(
            out,
            "{:<width$}  {} {}",
            label,
            "█".repeat(len.max(usize::from(*count > 0))),
            count,
            width = label_width
        );
    }
    out
}

pub fn overview(summary: &Summary, top: &[TagCount]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", "Statistics Overview".bold());
    let _ = writeln!(out, "  Total Samples  {}", summary.total_samples.to_string().yellow());
    let _ = writeln!(out, "  Unique Tags    {}", summary.unique_tags.to_string().yellow());
    let _ = writeln!(out, "  Users          {}", summary.users.to_string().yellow());
    let _ = writeln!(out);
    let _ = writeln!(out, "{}", "Top Tags".bold());

    if top.is_empty() {
        let _ = writeln!(out, "No tags available.");
    } else {
        let rows: Vec<(String, u64)> = top
            .iter()
            .map(|t| (t.tag.clone(), t.count as u64))
            .collect();
        out.push_str(&bar_chart(&rows));
    }
    out
}

#[derive(Tabled)]
struct FileLine {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Uploaded")]
    upload_time: String,
    #[tabled(rename = "MD5")]
    md5: String,
    #[tabled(rename = "SHA256")]
    sha256: String,
}

impl From<&FileRow> for FileLine {
    fn from(row: &FileRow) -> Self {
        Self {
            id: row.id.clone(),
            name: row.name.clone(),
            upload_time: row
                .upload_time
                .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
                .unwrap_or_default(),
            md5: row.md5.clone(),
            sha256: row.sha256.clone(),
        }
    }
}

pub fn files_table(rows: &[FileRow]) -> String {
    if rows.is_empty() {
        return "No files matched your filters.\n".to_string();
    }

    let lines: Vec<FileLine> = rows.iter().map(FileLine::from).collect();
    let mut table = Table::new(lines);
    table.with(Style::rounded());
    format!("{}\n{} file(s)\n", table, rows.len())
}

/// Raw detail payload followed by the relationship graph as DOT.
pub fn detail(raw: &Value, graph: &RelationshipGraph) -> String {
    let body = serde_json::to_string_pretty(raw).unwrap_or_else(|_| raw.to_string());

    let mut out = String::new();
    let _ = writeln!(out, "{}", "Raw JSON Response".bold());
    let _ = writeln!(out, "{}", body);
    let _ = writeln!(out);
    let _ = writeln!(out, "{}", "Relationships".bold());
    out.push_str(&graph.to_dot());
    out
}

pub fn stats_section(dimension: Dimension, rows: &[AggregationRow]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", dimension.title().bold());

    if rows.is_empty() {
        let _ = writeln!(out, "No data available.");
    } else {
        let pairs: Vec<(String, u64)> = rows.iter().map(|r| (r.value.clone(), r.count)).collect();
        out.push_str(&bar_chart(&pairs));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use sampledash_core::{ObjectRef, SampleRecord};

    #[test]
    fn test_bar_chart_scales_to_max() {
        let chart = bar_chart(&[("exe".into(), 4), ("dll".into(), 2), ("none".into(), 0)]);
        let lines: Vec<&str> = chart.lines().collect();

        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0].matches('█').count(), BAR_WIDTH);
        assert_eq!(lines[1].matches('█').count(), BAR_WIDTH / 2);
        assert_eq!(lines[2].matches('█').count(), 0);
        assert!(lines[0].starts_with("exe "));
        assert!(lines[2].ends_with(" 0"));
    }

    #[test]
    fn test_small_counts_stay_visible() {
        let chart = bar_chart(&[("big".into(), 1000), ("tiny".into(), 1)]);
        assert_eq!(chart.lines().nth(1).unwrap().matches('█').count(), 1);
    }

    #[test]
    fn test_overview_without_tags() {
        let summary = Summary {
            total_samples: 2,
            unique_tags: 0,
            users: 1,
        };
        let text = overview(&summary, &[]);
        assert!(text.contains("Total Samples"));
        assert!(text.contains("No tags available."));
    }

    #[test]
    fn test_overview_lists_top_tags() {
        let summary = Summary {
            total_samples: 3,
            unique_tags: 2,
            users: 1,
        };
        let top = vec![
            TagCount {
                tag: "emotet".into(),
                count: 3,
            },
            TagCount {
                tag: "dropper".into(),
                count: 1,
            },
        ];
        let text = overview(&summary, &top);
        let emotet = text.find("emotet").unwrap();
        let dropper = text.find("dropper").unwrap();
        assert!(emotet < dropper);
    }

    #[test]
    fn test_empty_files_table() {
        assert_eq!(files_table(&[]), "No files matched your filters.\n");
    }

    #[test]
    fn test_files_table_has_headers_and_rows() {
        let mut record = SampleRecord::bare("a");
        record.name = "invoice.exe".into();
        record.sha256 = "abc".into();
        let rows = sampledash_core::files_table(&[&record]);

        let text = files_table(&rows);
        assert!(text.contains("SHA256"));
        assert!(text.contains("invoice.exe"));
        assert!(text.contains("1 file(s)"));
    }

    #[test]
    fn test_detail_contains_json_and_dot() {
        let mut record = SampleRecord::bare("a");
        record.name = "f1".into();
        record.children = vec![ObjectRef::new("b")];
        let graph = RelationshipGraph::around(&record);

        let text = detail(&serde_json::json!({"id": "a"}), &graph);
        assert!(text.contains("\"id\": \"a\""));
        assert!(text.contains("digraph {"));
        assert!(text.contains("\"a\" -> \"b\";"));
    }

    #[test]
    fn test_stats_section_empty() {
        let text = stats_section(Dimension::User, &[]);
        assert!(text.contains("Uploads per User"));
        assert!(text.contains("No data available."));
    }
}
