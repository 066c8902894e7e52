//! Subtree Metrics
//!
//! Size and depth of the subtree under a node, with a path-scoped cycle
//! guard: a signature already seen on the current path stops the descent.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::domain::callgraph::GraphModel;
use crate::error::Result;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeMetrics {
    pub direct_children_count: usize,
    pub total_descendants: usize,
    pub subtree_depth: usize,
    pub is_recursive: bool,
}

/// Open node on the explicit traversal stack.
struct Frame {
    children: Vec<usize>,
    next: usize,
    /// Signatures on the path down to and including this node.
    visited: HashSet<String>,
    total: usize,
    max_child_depth: usize,
}

impl Frame {
    fn finish(self) -> TreeMetrics {
        TreeMetrics {
            direct_children_count: self.children.len(),
            total_descendants: self.total,
            subtree_depth: if self.children.is_empty() {
                1
            } else {
                self.max_child_depth + 1
            },
            is_recursive: false,
        }
    }
}

enum Entered {
    Done(TreeMetrics),
    Descend(Frame),
}

enum Step {
    Enter(Entered),
    Finish,
}

pub struct TreeMetricsCalculator;

impl TreeMetricsCalculator {
    /// Metrics for `node_id`, whose signature is `signature`, given the
    /// signatures already on the path above it.
    pub fn calculate_tree_metrics(
        graph: &GraphModel,
        node_id: &str,
        signature: &str,
        visited_signatures: &HashSet<String>,
    ) -> Result<TreeMetrics> {
        let ix = graph.require_index(node_id)?;
        Ok(Self::calculate_at(graph, ix, signature, visited_signatures))
    }

    /// Metrics for `node_id` treated as the top of its own path.
    pub fn for_node(graph: &GraphModel, node_id: &str) -> Result<TreeMetrics> {
        let ix = graph.require_index(node_id)?;
        let signature = graph.node_at(ix).signature();
        Ok(Self::calculate_at(graph, ix, &signature, &HashSet::new()))
    }

    /// Metrics for every node, keyed by id.
    pub fn all_metrics(graph: &GraphModel) -> HashMap<String, TreeMetrics> {
        let empty = HashSet::new();
        graph
            .nodes()
            .iter()
            .enumerate()
            .map(|(ix, node)| {
                let metrics = Self::calculate_at(graph, ix, &node.signature(), &empty);
                (node.id.clone(), metrics)
            })
            .collect()
    }

    fn calculate_at(
        graph: &GraphModel,
        ix: usize,
        signature: &str,
        visited: &HashSet<String>,
    ) -> TreeMetrics {
        let mut stack = match Self::enter(graph, ix, signature, visited) {
            Entered::Done(metrics) => return metrics,
            Entered::Descend(frame) => vec![frame],
        };
        let mut finished: Option<TreeMetrics> = None;

        while let Some(frame) = stack.last_mut() {
            if let Some(child) = finished.take() {
                frame.total += 1 + child.total_descendants;
                frame.max_child_depth = frame.max_child_depth.max(child.subtree_depth);
            }

            let step = if frame.next < frame.children.len() {
                let child_ix = frame.children[frame.next];
                frame.next += 1;
                let child_signature = graph.node_at(child_ix).signature();
                Step::Enter(Self::enter(graph, child_ix, &child_signature, &frame.visited))
            } else {
                Step::Finish
            };

            match step {
                Step::Enter(Entered::Done(metrics)) => finished = Some(metrics),
                Step::Enter(Entered::Descend(child)) => stack.push(child),
                Step::Finish => finished = stack.pop().map(Frame::finish),
            }
        }

        finished.unwrap_or_default()
    }

    fn enter(graph: &GraphModel, ix: usize, signature: &str, visited: &HashSet<String>) -> Entered {
        let child_count = graph.outgoing_at(ix).len();

        if visited.contains(signature) {
            // Count immediate children only; descending would loop.
            return Entered::Done(TreeMetrics {
                direct_children_count: child_count,
                total_descendants: child_count,
                subtree_depth: 1,
                is_recursive: true,
            });
        }

        if child_count == 0 {
            return Entered::Done(TreeMetrics {
                direct_children_count: 0,
                total_descendants: 0,
                subtree_depth: 1,
                is_recursive: false,
            });
        }

        let mut path = visited.clone();
        path.insert(signature.to_string());
        Entered::Descend(Frame {
            children: graph.child_indices(ix).collect(),
            next: 0,
            visited: path,
            total: 0,
            max_child_depth: 0,
        })
    }
}
