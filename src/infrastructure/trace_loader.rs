use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::info;

use crate::domain::callgraph::{GraphModel, NodeSpec};

/// One call in a nested trace. Children are listed in call order.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TraceCall {
    #[serde(default)]
    pub class_name: Option<String>,
    #[serde(default)]
    pub method_name: Option<String>,
    #[serde(default)]
    pub children: Vec<TraceCall>,
}

/// Accepted trace shapes: a flat node list (may hold back-edges) or a
/// nested call tree.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TraceDocument {
    Flat { nodes: Vec<NodeSpec> },
    Nested(TraceCall),
}

pub struct TraceLoader;

impl TraceLoader {
    /// Load a JSON trace file into a graph model.
    pub fn load_file(path: &Path) -> Result<GraphModel> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read trace file {}", path.display()))?;
        let graph = Self::from_json_str(&content)
            .with_context(|| format!("Failed to load trace {}", path.display()))?;

        info!(
            "Loaded trace {}: {} nodes, {} edges",
            path.display(),
            graph.len(),
            graph.edges().len()
        );
        Ok(graph)
    }

    pub fn from_json_str(json: &str) -> Result<GraphModel> {
        let specs = Self::specs_from_json_str(json)?;
        Ok(GraphModel::from_specs(specs)?)
    }

    pub fn specs_from_json_str(json: &str) -> Result<Vec<NodeSpec>> {
        let document: TraceDocument =
            serde_json::from_str(json).context("Trace is neither a node list nor a call tree")?;

        Ok(match document {
            TraceDocument::Flat { nodes } => nodes,
            TraceDocument::Nested(root) => Self::flatten(root),
        })
    }

    /// Assign ids `n0, n1, ...` in pre-order. The top call is the root.
    pub fn flatten(root: TraceCall) -> Vec<NodeSpec> {
        let mut specs: Vec<NodeSpec> = Vec::new();
        let mut stack: Vec<(TraceCall, Option<usize>)> = vec![(root, None)];

        while let Some((call, parent)) = stack.pop() {
            let ix = specs.len();
            let id = format!("n{}", ix);
            if let Some(p) = parent {
                specs[p].children.push(id.clone());
            }

            specs.push(NodeSpec {
                id,
                class_name: call.class_name,
                method_name: call.method_name,
                is_root: parent.is_none(),
                children: Vec::new(),
            });

            for child in call.children.into_iter().rev() {
                stack.push((child, Some(ix)));
            }
        }

        specs
    }
}
