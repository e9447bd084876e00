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

//! Parent/child relationship graphs between samples
//!
//! Graphs are derived on every render from the reference lists carried by
//! each [`SampleRecord`]; nothing here is stored. Nodes are deduplicated by
//! id, edges are kept as declared, so a link listed on both the parent and
//! the child shows up twice.

use crate::record::{ObjectRef, SampleRecord};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt::Write;

/// Ordered (parent, child) pair
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct RelationshipEdge {
    pub parent: String,
    pub child: String,
}

impl RelationshipEdge {
    pub fn new(parent: impl Into<String>, child: impl Into<String>) -> Self {
        Self {
            parent: parent.into(),
            child: child.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    /// A sample present in the current record set (or the focused sample)
    Sample,
    /// An id only known through a reference
    Reference,
}

impl NodeKind {
    fn color(&self) -> &'static str {
        match self {
            NodeKind::Sample => "lightblue",
            NodeKind::Reference => "gray",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphNode {
    pub id: String,
    pub label: String,
    pub kind: NodeKind,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct RelationshipGraph {
    nodes: Vec<GraphNode>,
    #[serde(skip)]
    index: HashMap<String, usize>,
    edges: Vec<RelationshipEdge>,
}

impl RelationshipGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Two-level graph around one sample: parents -> sample -> children.
    ///
    /// The focused sample is labelled with its display name; neighbours keep
    /// their raw ids.
    pub fn around(record: &SampleRecord) -> Self {
        let mut graph = Self::new();
        graph.add_node(&record.id, &record.name, NodeKind::Sample);

        for parent in &record.parents {
            graph.add_node(parent.id(), parent.id(), NodeKind::Reference);
            graph.add_edge(parent.id(), &record.id);
        }
        for child in &record.children {
            graph.add_node(child.id(), child.id(), NodeKind::Reference);
            graph.add_edge(&record.id, child.id());
        }

        graph
    }

    /// Graph over every record of the set.
    ///
    /// A referenced id that belongs to the set is labelled with that
    /// record's name; anything else stays a bare id.
    pub fn full(records: &[SampleRecord]) -> Self {
        let mut names: HashMap<&str, &str> = HashMap::with_capacity(records.len());
        for record in records {
            names.entry(record.id.as_str()).or_insert(record.name.as_str());
        }

        let mut graph = Self::new();
        let add_ref = |graph: &mut Self, r: &ObjectRef| match names.get(r.id()) {
            Some(name) => graph.add_node(r.id(), name, NodeKind::Sample),
            None => graph.add_node(r.id(), r.id(), NodeKind::Reference),
        };

        for record in records {
            graph.add_node(&record.id, &record.name, NodeKind::Sample);
            for parent in &record.parents {
                add_ref(&mut graph, parent);
                graph.add_edge(parent.id(), &record.id);
            }
            for child in &record.children {
                add_ref(&mut graph, child);
                graph.add_edge(&record.id, child.id());
            }
        }

        tracing::debug!(
            "Relationship graph: {} nodes, {} edges",
            graph.nodes.len(),
            graph.edges.len()
        );
        graph
    }

    /// Insert a node unless one with the same id exists.
    ///
    /// A reference node is promoted when the same id is later declared as a
    /// sample, so the final label never depends on declaration order.
    pub fn add_node(&mut self, id: &str, label: &str, kind: NodeKind) {
        if let Some(&idx) = self.index.get(id) {
            let node = &mut self.nodes[idx];
            if node.kind == NodeKind::Reference && kind == NodeKind::Sample {
                node.label = label.to_string();
                node.kind = kind;
            }
            return;
        }

        self.index.insert(id.to_string(), self.nodes.len());
        self.nodes.push(GraphNode {
            id: id.to_string(),
            label: label.to_string(),
            kind,
        });
    }

    pub fn add_edge(&mut self, parent: &str, child: &str) {
        self.edges.push(RelationshipEdge::new(parent, child));
    }

    pub fn nodes(&self) -> &[GraphNode] {
        &self.nodes
    }

    pub fn edges(&self) -> &[RelationshipEdge] {
        &self.edges
    }

    pub fn node(&self, id: &str) -> Option<&GraphNode> {
        self.index.get(id).map(|&idx| &self.nodes[idx])
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Render as a Graphviz `digraph`.
    pub fn to_dot(&self) -> String {
        let mut dot = String::from("digraph {\n");
        for node in &self.nodes {
            let _ = writeln!(
                dot,
                "    {} [label={}, color={}];",
                quote(&node.id),
                quote(&node.label),
                node.kind.color()
            );
        }
        for edge in &self.edges {
            let _ = writeln!(dot, "    {} -> {};", quote(&edge.parent), quote(&edge.child));
        }
        dot.push_str("}\n");
        dot
    }
}

fn quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            _ => out.push(c),
        }
    }
    out.push('"');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn linked(id: &str, name: &str, parents: &[&str], children: &[&str]) -> SampleRecord {
        SampleRecord {
            name: name.to_string(),
            parents: parents.iter().map(|p| ObjectRef::new(*p)).collect(),
            children: children.iter().map(|c| ObjectRef::new(*c)).collect(),
            ..SampleRecord::bare(id)
        }
    }

    #[test]
    fn test_around_links_parents_and_children() {
        let record = linked("a", "f1", &["p"], &["b", "c"]);
        let graph = RelationshipGraph::around(&record);

        assert_eq!(graph.nodes().len(), 4);
        assert_eq!(graph.node("a").unwrap().label, "f1");
        assert_eq!(graph.node("b").unwrap().label, "b");
        assert_eq!(graph.node("b").unwrap().kind, NodeKind::Reference);
        assert_eq!(
            graph.edges(),
            &[
                RelationshipEdge::new("p", "a"),
                RelationshipEdge::new("a", "b"),
                RelationshipEdge::new("a", "c"),
            ]
        );
    }

    #[test]
    fn test_full_graph_resolves_known_names() {
        let records = vec![
            linked("a", "dropper.exe", &[], &["b", "zz"]),
            linked("b", "payload.dll", &[], &[]),
        ];
        let graph = RelationshipGraph::full(&records);

        assert_eq!(graph.node("b").unwrap().label, "payload.dll");
        assert_eq!(graph.node("b").unwrap().kind, NodeKind::Sample);
        assert_eq!(graph.node("zz").unwrap().label, "zz");
        assert_eq!(graph.node("zz").unwrap().kind, NodeKind::Reference);
    }

    #[test]
    fn test_full_graph_dedups_nodes_not_edges() {
        let records = vec![
            linked("a", "parent", &[], &["b"]),
            linked("b", "child", &["a"], &[]),
        ];
        let graph = RelationshipGraph::full(&records);

        assert_eq!(graph.nodes().len(), 2);
        assert_eq!(graph.edges().len(), 2);
        assert!(graph.edges().iter().all(|e| e == &RelationshipEdge::new("a", "b")));
    }

    #[test]
    fn test_reference_promoted_to_sample() {
        let mut graph = RelationshipGraph::new();
        graph.add_node("x", "x", NodeKind::Reference);
        graph.add_node("x", "sample.bin", NodeKind::Sample);
        graph.add_node("x", "x", NodeKind::Reference);

        assert_eq!(graph.nodes().len(), 1);
        assert_eq!(graph.node("x").unwrap().label, "sample.bin");
    }

    #[test]
    fn test_empty_set_gives_empty_graph() {
        let graph = RelationshipGraph::full(&[]);
        assert!(graph.is_empty());
        assert_eq!(graph.to_dot(), "digraph {\n}\n");
    }

    #[test]
    fn test_dot_output() {
        let record = linked("a", "say \"hi\"", &[], &["b"]);
        let dot = RelationshipGraph::around(&record).to_dot();

        assert!(dot.starts_with("digraph {\n"));
        assert!(dot.contains(r#""a" [label="say \"hi\"", color=lightblue];"#));
        assert!(dot.contains(r#""b" [label="b", color=gray];"#));
        assert!(dot.contains(r#""a" -> "b";"#));
    }
}
