//! Collapse / Expand Visibility
//!
//! Mutates `collapsed` and the derived visible bits of nodes and edges in
//! response to user actions, then asks the layout collaborator to re-render.
//!
//! Two expand verbs exist on purpose:
//! - [`VisibilityController::toggle_children`] reveals only the direct
//!   children; deeper nodes stay as their own `collapsed` flags left them.
//! - [`VisibilityController::expand_all_descendants`] clears every flag in
//!   the subtree and reveals all of it.

use std::collections::{HashSet, VecDeque};

use tracing::debug;

use crate::config::LayoutConfig;
use crate::domain::callgraph::GraphModel;
use crate::error::Result;
use crate::ports::LayoutTrigger;

pub struct VisibilityController<'a> {
    layout: &'a dyn LayoutTrigger,
    layout_name: String,
    fit: bool,
}

impl<'a> VisibilityController<'a> {
    pub fn new(layout: &'a dyn LayoutTrigger, layout_name: &str, fit: bool) -> Self {
        Self {
            layout,
            layout_name: layout_name.to_string(),
            fit,
        }
    }

    pub fn from_config(layout: &'a dyn LayoutTrigger, config: &LayoutConfig) -> Self {
        Self::new(layout, &config.name, config.fit)
    }

    /// Every node reachable from `node_id` over outgoing edges, in BFS
    /// order, without duplicates and without `node_id` itself.
    pub fn get_all_descendants(graph: &GraphModel, node_id: &str) -> Result<Vec<String>> {
        let ix = graph.require_index(node_id)?;
        Ok(Self::descendant_indices(graph, ix)
            .into_iter()
            .map(|d| graph.node_at(d).id.clone())
            .collect())
    }

    /// Flip `collapsed` on `node_id` and apply it. Returns the new state.
    pub fn toggle_children(&self, graph: &mut GraphModel, node_id: &str) -> Result<bool> {
        let ix = graph.require_index(node_id)?;
        let collapsed = !graph.node_at(ix).is_collapsed();
        graph.set_collapsed_at(ix, collapsed);

        if collapsed {
            let hidden = Self::hide_descendants(graph, ix);
            debug!("Collapsed {}: {} nodes hidden", node_id, hidden);
        } else {
            let revealed = Self::reveal_from(graph, &[ix]);
            debug!("Expanded {}: {} nodes revealed", node_id, revealed);
        }

        self.relayout(graph);
        Ok(collapsed)
    }

    /// Clear `collapsed` on `node_id` and all its descendants and reveal
    /// the whole subtree.
    pub fn expand_all_descendants(&self, graph: &mut GraphModel, node_id: &str) -> Result<()> {
        let ix = graph.require_index(node_id)?;
        let descendants = Self::descendant_indices(graph, ix);

        graph.set_collapsed_at(ix, false);
        for &d in &descendants {
            graph.set_collapsed_at(d, false);
        }
        let mut seeds = Vec::with_capacity(descendants.len() + 1);
        seeds.push(ix);
        seeds.extend_from_slice(&descendants);
        let revealed = Self::reveal_from(graph, &seeds);
        debug!(
            "Expanded all under {}: {} descendants, {} revealed",
            node_id,
            descendants.len(),
            revealed
        );

        self.relayout(graph);
        Ok(())
    }

    /// True when every edge is visible exactly when both endpoints are
    /// visible and its source is not collapsed.
    pub fn edges_consistent(graph: &GraphModel) -> bool {
        graph.edges().iter().all(|edge| {
            match (graph.node(&edge.source), graph.node(&edge.target)) {
                (Some(source), Some(target)) => {
                    let expected =
                        source.is_visible() && target.is_visible() && !source.is_collapsed();
                    edge.is_visible() == expected
                }
                _ => false,
            }
        })
    }

    fn relayout(&self, graph: &GraphModel) {
        self.layout.run_layout(graph, &self.layout_name, self.fit);
    }

    /// Level-order walk seeded with `ix` so cycles terminate.
    fn descendant_indices(graph: &GraphModel, ix: usize) -> Vec<usize> {
        let mut visited = HashSet::from([ix]);
        let mut queue = VecDeque::from([ix]);
        let mut order = Vec::new();

        while let Some(current) = queue.pop_front() {
            for child in graph.child_indices(current) {
                if visited.insert(child) {
                    order.push(child);
                    queue.push_back(child);
                }
            }
        }
        order
    }

    /// Hide every descendant of `ix` and every edge touching one. Hidden
    /// nodes are marked collapsed so a later shallow expand of an ancestor
    /// does not reopen them.
    fn hide_descendants(graph: &mut GraphModel, ix: usize) -> usize {
        let hidden = Self::descendant_indices(graph, ix);

        let mut edges = graph.outgoing_at(ix).to_vec();
        for &d in &hidden {
            edges.extend_from_slice(graph.outgoing_at(d));
            edges.extend_from_slice(graph.incoming_at(d));
        }

        for &d in &hidden {
            graph.set_node_visible_at(d, false);
            graph.set_collapsed_at(d, true);
        }
        for e in edges {
            graph.set_edge_visible_at(e, false);
        }
        hidden.len()
    }

    /// Reveal the children of every visible, non-collapsed seed and the
    /// edges to them, continuing below any revealed child that is not
    /// collapsed itself. A newly revealed node also gets back its incoming
    /// edges from visible, non-collapsed callers. Nothing is revealed under
    /// a node that is hidden.
    fn reveal_from(graph: &mut GraphModel, seeds: &[usize]) -> usize {
        let mut seen = HashSet::new();
        let mut queue = VecDeque::new();
        for &seed in seeds {
            let node = graph.node_at(seed);
            if node.is_visible() && !node.is_collapsed() && seen.insert(seed) {
                queue.push_back(seed);
            }
        }

        let mut revealed = 0;
        while let Some(current) = queue.pop_front() {
            let edges = graph.outgoing_at(current).to_vec();
            for e in edges {
                let (_, target) = graph.edge_endpoints(e);
                if !graph.node_at(target).is_visible() {
                    graph.set_node_visible_at(target, true);
                    revealed += 1;
                    Self::restore_incoming(graph, target);
                }
                graph.set_edge_visible_at(e, true);

                if !graph.node_at(target).is_collapsed() && seen.insert(target) {
                    queue.push_back(target);
                }
            }
        }
        revealed
    }

    fn restore_incoming(graph: &mut GraphModel, ix: usize) {
        let incoming = graph.incoming_at(ix).to_vec();
        for e in incoming {
            let (source, _) = graph.edge_endpoints(e);
            let caller = graph.node_at(source);
            if caller.is_visible() && !caller.is_collapsed() {
                graph.set_edge_visible_at(e, true);
            }
        }
    }
}
