/// Layout trigger adapters.
/// None of these lay anything out themselves; they hand the request to
/// whatever renders the graph without waiting for it.

use crossbeam_channel::{unbounded, Receiver, Sender};
use tracing::{info, warn};

use crate::domain::callgraph::GraphModel;
use crate::ports::LayoutTrigger;

/// Ignores layout requests.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopLayoutTrigger;

impl LayoutTrigger for NoopLayoutTrigger {
    fn run_layout(&self, _graph: &GraphModel, _layout_name: &str, _fit: bool) {}
}

/// Logs each request; used when no renderer is attached.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingLayoutTrigger;

impl LayoutTrigger for LoggingLayoutTrigger {
    fn run_layout(&self, graph: &GraphModel, layout_name: &str, fit: bool) {
        info!(
            "Layout '{}' requested (fit={}): {} nodes, {} edges visible",
            layout_name,
            fit,
            graph.visible_nodes().count(),
            graph.visible_edges().count()
        );
    }
}

/// Snapshot of what a layout run has to place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutRequest {
    pub layout_name: String,
    pub fit: bool,
    pub visible_nodes: Vec<String>,
    pub visible_edges: Vec<String>,
}

impl LayoutRequest {
    pub fn from_graph(graph: &GraphModel, layout_name: &str, fit: bool) -> Self {
        Self {
            layout_name: layout_name.to_string(),
            fit,
            visible_nodes: graph.visible_nodes().map(|n| n.id.clone()).collect(),
            visible_edges: graph.visible_edges().map(|e| e.id.clone()).collect(),
        }
    }
}

/// Queues requests on an unbounded channel for a renderer to drain.
#[derive(Debug, Clone)]
pub struct QueuedLayoutTrigger {
    sender: Sender<LayoutRequest>,
}

impl QueuedLayoutTrigger {
    pub fn new() -> (Self, Receiver<LayoutRequest>) {
        let (sender, receiver) = unbounded();
        (Self { sender }, receiver)
    }
}

impl LayoutTrigger for QueuedLayoutTrigger {
    fn run_layout(&self, graph: &GraphModel, layout_name: &str, fit: bool) {
        let request = LayoutRequest::from_graph(graph, layout_name, fit);
        if self.sender.send(request).is_err() {
            warn!("Layout request dropped: renderer is gone");
        }
    }
}
