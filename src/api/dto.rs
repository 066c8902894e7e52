use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::domain::callgraph::{GraphModel, NodeStatus};
use crate::domain::metrics::TreeMetrics;

/// What the renderer receives: every node and edge with its flags. The
/// renderer maps these onto styling; nothing visual is decided here.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphDto {
    pub nodes: Vec<NodeDto>,
    pub edges: Vec<EdgeDto>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeDto {
    pub id: String,
    pub class_name: String,
    pub method_name: String,
    pub signature: String,
    pub is_root: bool,
    pub status: NodeStatus,
    pub collapsed: bool,
    pub visible: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metrics: Option<TreeMetrics>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeDto {
    pub id: String,
    pub source: String,
    pub target: String,
    pub visible: bool,
}

impl GraphDto {
    pub fn from_graph(graph: &GraphModel, metrics: &HashMap<String, TreeMetrics>) -> Self {
        let nodes = graph
            .nodes()
            .iter()
            .map(|n| NodeDto {
                id: n.id.clone(),
                class_name: n.class_name().to_string(),
                method_name: n.method_name().to_string(),
                signature: n.signature(),
                is_root: n.is_root,
                status: n.status,
                collapsed: n.is_collapsed(),
                visible: n.is_visible(),
                metrics: metrics.get(&n.id).copied(),
            })
            .collect();

        let edges = graph
            .edges()
            .iter()
            .map(|e| EdgeDto {
                id: e.id.clone(),
                source: e.source.clone(),
                target: e.target.clone(),
                visible: e.is_visible(),
            })
            .collect();

        GraphDto { nodes, edges }
    }

    /// Only the nodes and edges currently shown.
    pub fn visible_only(&self) -> Self {
        GraphDto {
            nodes: self.nodes.iter().filter(|n| n.visible).cloned().collect(),
            edges: self.edges.iter().filter(|e| e.visible).cloned().collect(),
        }
    }
}

impl From<&GraphModel> for GraphDto {
    fn from(graph: &GraphModel) -> Self {
        GraphDto::from_graph(graph, &HashMap::new())
    }
}
