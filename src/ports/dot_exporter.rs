//! DOT Exporter
//!
//! Dumps the currently visible part of a call trace as Graphviz DOT.
//! Only structure and labels are written; styling is left to the renderer.

use crate::domain::callgraph::GraphModel;
use crate::ports::GraphExporter;
use std::io::Result;

pub struct DotExporter;

impl GraphExporter for DotExporter {
    fn export(&self, graph: &GraphModel, path: &str) -> Result<()> {
        std::fs::write(path, Self::to_dot(graph))
    }
}

impl DotExporter {
    /// Convert the visible subgraph to a DOT string.
    pub fn to_dot(graph: &GraphModel) -> String {
        let mut lines = Vec::new();

        lines.push("digraph CallTrace {".to_string());
        lines.push("    rankdir=TB;".to_string());
        lines.push("".to_string());

        for node in graph.visible_nodes() {
            let mut label = Self::escape_label(&node.signature());
            if node.is_collapsed() && !node.children.is_empty() {
                label.push_str("\\n[collapsed]");
            }
            lines.push(format!(
                "    \"{}\" [label=\"{}\"];",
                Self::escape_label(&node.id),
                label
            ));
        }

        lines.push("".to_string());

        for edge in graph.visible_edges() {
            lines.push(format!(
                "    \"{}\" -> \"{}\";",
                Self::escape_label(&edge.source),
                Self::escape_label(&edge.target)
            ));
        }

        lines.push("}".to_string());

        lines.join("\n")
    }

    fn escape_label(label: &str) -> String {
        label
            .replace('\\', "\\\\")
            .replace('"', "\\\"")
            .replace('\n', "\\n")
    }
}
