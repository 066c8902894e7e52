//! Node Status Classification
//!
//! Computes the `NodeStatus` flags of every node. Recursion detection is
//! path-sensitive: each branch of the traversal carries its own
//! [`VisitedPaths`] copy, so the same method on two unrelated branches is
//! never reported as recursive.

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::domain::callgraph::{signature, GraphModel, NodeStatus, TraceNode};
use crate::domain::entry_point::{
    has_fanout, is_implementation_entry_point, ChainStartPredicate, NoChainStart,
    DEFAULT_FANOUT_THRESHOLD,
};
use crate::error::TraceViewError;

/// Signatures already introduced on the current path, each mapped to the id
/// of the ancestor that introduced it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VisitedPaths {
    entries: HashMap<String, String>,
}

impl VisitedPaths {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, signature: &str) -> bool {
        self.entries.contains_key(signature)
    }

    /// Id of the ancestor that first carried `signature` on this path.
    pub fn introduced_by(&self, signature: &str) -> Option<&str> {
        self.entries.get(signature).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Copy of this context with `signature -> node_id` added. An existing
    /// entry is kept, so the first ancestor always wins.
    pub fn with_entry(&self, signature: &str, node_id: &str) -> Self {
        let mut next = self.clone();
        next.entries
            .entry(signature.to_string())
            .or_insert_with(|| node_id.to_string());
        next
    }
}

/// Recursion check for one node.
///
/// Returns whether the node is the recursion entry for its signature plus a
/// copy of `visited`; the caller's map is never touched.
pub fn check_recursive_entry_point(
    class_name: &str,
    method_name: &str,
    children: &[&TraceNode],
    visited: &VisitedPaths,
) -> (bool, VisitedPaths) {
    let path = signature(class_name, method_name);
    let copy = visited.clone();

    if copy.contains(&path) {
        // An ancestor already claimed this signature.
        return (false, copy);
    }

    let recurses = children
        .iter()
        .any(|c| c.class_name() == class_name && c.method_name() == method_name);
    (recurses, copy)
}

/// Status of one node and the context to hand to its children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub status: NodeStatus,
    pub visited_paths: VisitedPaths,
}

/// Classifies nodes given their children and ancestor-path context.
pub struct StatusClassifier {
    fanout_threshold: usize,
    chain_start: Box<dyn ChainStartPredicate>,
}

impl Default for StatusClassifier {
    fn default() -> Self {
        Self::new(DEFAULT_FANOUT_THRESHOLD)
    }
}

impl StatusClassifier {
    pub fn new(fanout_threshold: usize) -> Self {
        Self {
            fanout_threshold,
            chain_start: Box::new(NoChainStart),
        }
    }

    /// Replace the chain-start rule.
    pub fn with_chain_start(mut self, predicate: impl ChainStartPredicate + 'static) -> Self {
        self.chain_start = Box::new(predicate);
        self
    }

    pub fn fanout_threshold(&self) -> usize {
        self.fanout_threshold
    }

    /// Compute the status of `node`.
    ///
    /// `children` are the node's direct children in call order and
    /// `parent_is_fanout` is the `fan_out` flag of the caller. The returned
    /// context has the node's signature added (if absent) and is meant for
    /// the node's children only.
    pub fn compute_node_status(
        &self,
        node: &TraceNode,
        children: &[&TraceNode],
        visited: &VisitedPaths,
        parent_is_fanout: bool,
    ) -> Classification {
        if node.is_malformed() {
            warn!(
                "{}; classifying with signature {:?}",
                TraceViewError::MalformedNode(node.id.clone()),
                node.signature()
            );
        }

        let class_name = node.class_name();
        let method_name = node.method_name();

        let fan_out = has_fanout(children.len(), self.fanout_threshold);
        let implementation_entry_point = is_implementation_entry_point(
            node.is_root,
            children.len(),
            method_name,
            parent_is_fanout,
        );
        let (recursive_entry_point, copy) =
            check_recursive_entry_point(class_name, method_name, children, visited);
        let chain_start_point = self.chain_start.is_chain_start_point(node, children);

        let visited_paths = copy.with_entry(&signature(class_name, method_name), &node.id);

        Classification {
            status: NodeStatus {
                fan_out,
                implementation_entry_point,
                chain_start_point,
                is_summarised: false,
                recursive_entry_point,
            },
            visited_paths,
        }
    }

    /// Classify every node of `graph`.
    ///
    /// Depth-first pre-order from each root with an explicit stack. A node is
    /// classified once, on its first visit; later visits through another
    /// caller or a back-edge are skipped. Nodes not reachable from any root
    /// are classified afterwards as detached roots.
    pub fn classify_graph(&self, graph: &GraphModel) -> HashMap<String, NodeStatus> {
        let mut statuses: HashMap<String, NodeStatus> = HashMap::with_capacity(graph.len());
        let mut classified = vec![false; graph.len()];

        let starts = graph
            .root_indices()
            .into_iter()
            .chain(0..graph.len())
            .collect::<Vec<_>>();

        for start in starts {
            if classified[start] {
                continue;
            }

            let mut stack: Vec<(usize, VisitedPaths, bool)> =
                vec![(start, VisitedPaths::new(), false)];

            while let Some((ix, visited, parent_is_fanout)) = stack.pop() {
                if classified[ix] {
                    continue;
                }
                classified[ix] = true;

                let node = graph.node_at(ix);
                let children = graph.children_at(ix);
                let result = self.compute_node_status(node, &children, &visited, parent_is_fanout);

                // Reverse push keeps call order on pop.
                let child_ixs: Vec<usize> = graph.child_indices(ix).collect();
                for &child in child_ixs.iter().rev() {
                    if !classified[child] {
                        stack.push((child, result.visited_paths.clone(), result.status.fan_out));
                    }
                }

                statuses.insert(node.id.clone(), result.status);
            }
        }

        debug!(
            "Classified {} nodes ({} recursion entries, {} fan-outs)",
            statuses.len(),
            statuses.values().filter(|s| s.recursive_entry_point).count(),
            statuses.values().filter(|s| s.fan_out).count()
        );
        statuses
    }
}
