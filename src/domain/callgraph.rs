// Call-trace graph model.
// Method invocations are nodes, calls are directed edges in call order.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TraceViewError};

/// Builds the `className.methodName` signature used for recursion analysis.
pub fn signature(class_name: &str, method_name: &str) -> String {
    format!("{}.{}", class_name, method_name)
}

/// Derived semantic flags carried by every node.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeStatus {
    pub fan_out: bool,
    pub implementation_entry_point: bool,
    pub chain_start_point: bool,
    pub is_summarised: bool,
    pub recursive_entry_point: bool,
}

/// A node as handed over by trace ingestion.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeSpec {
    pub id: String,
    #[serde(default)]
    pub class_name: Option<String>,
    #[serde(default)]
    pub method_name: Option<String>,
    #[serde(default)]
    pub is_root: bool,
    #[serde(default)]
    pub children: Vec<String>,
}

impl NodeSpec {
    pub fn new(id: &str, class_name: &str, method_name: &str) -> Self {
        Self {
            id: id.to_string(),
            class_name: Some(class_name.to_string()),
            method_name: Some(method_name.to_string()),
            is_root: false,
            children: Vec::new(),
        }
    }

    pub fn root(mut self) -> Self {
        self.is_root = true;
        self
    }

    pub fn calls(mut self, children: &[&str]) -> Self {
        self.children = children.iter().map(|c| c.to_string()).collect();
        self
    }
}

/// A method invocation in the trace.
#[derive(Debug, Clone)]
pub struct TraceNode {
    pub id: String,
    class_name: Option<String>,
    method_name: Option<String>,
    pub is_root: bool,
    /// Child ids in call order.
    pub children: Vec<String>,
    pub status: NodeStatus,
    collapsed: bool,
    visible: bool,
}

impl TraceNode {
    fn from_spec(spec: NodeSpec) -> Self {
        Self {
            id: spec.id,
            class_name: spec.class_name,
            method_name: spec.method_name,
            is_root: spec.is_root,
            children: spec.children,
            status: NodeStatus::default(),
            collapsed: false,
            visible: true,
        }
    }

    pub fn class_name(&self) -> &str {
        self.class_name.as_deref().unwrap_or("")
    }

    pub fn method_name(&self) -> &str {
        self.method_name.as_deref().unwrap_or("")
    }

    pub fn signature(&self) -> String {
        signature(self.class_name(), self.method_name())
    }

    /// True when ingestion did not supply a class or method name.
    pub fn is_malformed(&self) -> bool {
        self.class_name.is_none() || self.method_name.is_none()
    }

    pub fn is_collapsed(&self) -> bool {
        self.collapsed
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }
}

/// A call from `source` to `target`.
#[derive(Debug, Clone)]
pub struct TraceEdge {
    pub id: String,
    pub source: String,
    pub target: String,
    source_ix: usize,
    target_ix: usize,
    visible: bool,
}

impl TraceEdge {
    pub fn is_visible(&self) -> bool {
        self.visible
    }
}

/// Owns every node and edge of one loaded trace.
///
/// Nodes live in an arena; traversals work on arena indices so cyclic
/// traces can be walked with plain index sets.
#[derive(Debug, Clone, Default)]
pub struct GraphModel {
    nodes: Vec<TraceNode>,
    edges: Vec<TraceEdge>,
    index: HashMap<String, usize>,
    outgoing: Vec<Vec<usize>>,
    incoming: Vec<Vec<usize>>,
}

impl GraphModel {
    /// Build the model from ingestion specs, creating one edge per
    /// (parent, child) pair in call order.
    pub fn from_specs(specs: Vec<NodeSpec>) -> Result<Self> {
        let mut index = HashMap::with_capacity(specs.len());
        for (ix, spec) in specs.iter().enumerate() {
            if index.insert(spec.id.clone(), ix).is_some() {
                return Err(TraceViewError::DuplicateNode(spec.id.clone()));
            }
        }

        let nodes: Vec<TraceNode> = specs.into_iter().map(TraceNode::from_spec).collect();
        let mut edges = Vec::new();
        let mut outgoing = vec![Vec::new(); nodes.len()];
        let mut incoming = vec![Vec::new(); nodes.len()];
        let mut pair_count: HashMap<(usize, usize), usize> = HashMap::new();

        for (source_ix, node) in nodes.iter().enumerate() {
            for child in &node.children {
                let target_ix = *index
                    .get(child)
                    .ok_or_else(|| TraceViewError::NodeNotFound(child.clone()))?;

                let seen = pair_count.entry((source_ix, target_ix)).or_insert(0);
                let id = if *seen == 0 {
                    format!("{}->{}", node.id, child)
                } else {
                    format!("{}->{}#{}", node.id, child, seen)
                };
                *seen += 1;

                let edge_ix = edges.len();
                edges.push(TraceEdge {
                    id,
                    source: node.id.clone(),
                    target: child.clone(),
                    source_ix,
                    target_ix,
                    visible: true,
                });
                outgoing[source_ix].push(edge_ix);
                incoming[target_ix].push(edge_ix);
            }
        }

        Ok(Self {
            nodes,
            edges,
            index,
            outgoing,
            incoming,
        })
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn nodes(&self) -> &[TraceNode] {
        &self.nodes
    }

    pub fn edges(&self) -> &[TraceEdge] {
        &self.edges
    }

    pub fn node(&self, id: &str) -> Option<&TraceNode> {
        self.index.get(id).map(|&ix| &self.nodes[ix])
    }

    pub fn edge(&self, id: &str) -> Option<&TraceEdge> {
        self.edges.iter().find(|e| e.id == id)
    }

    /// Like [`GraphModel::node`] but reports an unknown id.
    pub fn require(&self, id: &str) -> Result<&TraceNode> {
        self.node(id)
            .ok_or_else(|| TraceViewError::NodeNotFound(id.to_string()))
    }

    /// Outgoing edges of `id` in call order.
    pub fn outgoing(&self, id: &str) -> Result<Vec<&TraceEdge>> {
        let ix = self.require_index(id)?;
        Ok(self.outgoing[ix].iter().map(|&e| &self.edges[e]).collect())
    }

    /// Direct children of `id` in call order.
    pub fn children_of(&self, id: &str) -> Result<Vec<&TraceNode>> {
        let ix = self.require_index(id)?;
        Ok(self.children_at(ix))
    }

    /// Traversal starting points: nodes flagged as root, otherwise nodes
    /// nobody calls, otherwise (a pure cycle) the first ingested node.
    pub fn roots(&self) -> Vec<&TraceNode> {
        self.root_indices().into_iter().map(|ix| &self.nodes[ix]).collect()
    }

    /// Apply a classification result. Ids missing from the model are
    /// reported before anything is written.
    pub fn apply_statuses(&mut self, statuses: &HashMap<String, NodeStatus>) -> Result<()> {
        let mut resolved = Vec::with_capacity(statuses.len());
        for (id, status) in statuses {
            resolved.push((self.require_index(id)?, *status));
        }
        for (ix, status) in resolved {
            self.nodes[ix].status = status;
        }
        Ok(())
    }

    pub fn visible_nodes(&self) -> impl Iterator<Item = &TraceNode> {
        self.nodes.iter().filter(|n| n.visible)
    }

    pub fn visible_edges(&self) -> impl Iterator<Item = &TraceEdge> {
        self.edges.iter().filter(|e| e.visible)
    }

    // ------------------------------------------------------------------
    // Arena access for the traversals in this crate.
    // ------------------------------------------------------------------

    pub(crate) fn index_of(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    pub(crate) fn require_index(&self, id: &str) -> Result<usize> {
        self.index_of(id)
            .ok_or_else(|| TraceViewError::NodeNotFound(id.to_string()))
    }

    pub(crate) fn node_at(&self, ix: usize) -> &TraceNode {
        &self.nodes[ix]
    }

    pub(crate) fn children_at(&self, ix: usize) -> Vec<&TraceNode> {
        self.outgoing[ix]
            .iter()
            .map(|&e| &self.nodes[self.edges[e].target_ix])
            .collect()
    }

    pub(crate) fn child_indices(&self, ix: usize) -> impl Iterator<Item = usize> + '_ {
        self.outgoing[ix].iter().map(move |&e| self.edges[e].target_ix)
    }

    pub(crate) fn outgoing_at(&self, ix: usize) -> &[usize] {
        &self.outgoing[ix]
    }

    pub(crate) fn incoming_at(&self, ix: usize) -> &[usize] {
        &self.incoming[ix]
    }

    pub(crate) fn edge_endpoints(&self, edge_ix: usize) -> (usize, usize) {
        let edge = &self.edges[edge_ix];
        (edge.source_ix, edge.target_ix)
    }

    pub(crate) fn set_collapsed_at(&mut self, ix: usize, collapsed: bool) {
        self.nodes[ix].collapsed = collapsed;
    }

    pub(crate) fn set_node_visible_at(&mut self, ix: usize, visible: bool) {
        self.nodes[ix].visible = visible;
    }

    pub(crate) fn set_edge_visible_at(&mut self, edge_ix: usize, visible: bool) {
        self.edges[edge_ix].visible = visible;
    }

    pub(crate) fn root_indices(&self) -> Vec<usize> {
        let flagged: Vec<usize> = (0..self.nodes.len())
            .filter(|&ix| self.nodes[ix].is_root)
            .collect();
        if !flagged.is_empty() {
            return flagged;
        }

        let uncalled: Vec<usize> = (0..self.nodes.len())
            .filter(|&ix| self.incoming[ix].is_empty())
            .collect();
        if !uncalled.is_empty() {
            return uncalled;
        }

        if self.nodes.is_empty() {
            Vec::new()
        } else {
            vec![0]
        }
    }

    /// Indices reachable from `ix` (excluding it).
    #[cfg(test)]
    pub(crate) fn reachable_from(&self, ix: usize) -> std::collections::HashSet<usize> {
        let mut seen = std::collections::HashSet::from([ix]);
        let mut stack = vec![ix];
        while let Some(current) = stack.pop() {
            for child in self.child_indices(current) {
                if seen.insert(child) {
                    stack.push(child);
                }
            }
        }
        seen.remove(&ix);
        seen
    }
}
