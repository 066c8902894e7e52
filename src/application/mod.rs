use crate::api::dto::GraphDto;
use crate::config::ViewerConfig;
use crate::domain::callgraph::GraphModel;
use crate::domain::metrics::{TreeMetrics, TreeMetricsCalculator};
use crate::domain::status::StatusClassifier;
use crate::domain::visibility::VisibilityController;
use crate::error::Result;
use crate::ports::LayoutTrigger;

/// One interactive viewing session over a loaded trace.
///
/// The classifier and metrics calculator only read the graph; this is the
/// place where their results get written back.
pub struct TraceViewSession<'a> {
    graph: GraphModel,
    config: ViewerConfig,
    classifier: StatusClassifier,
    layout: &'a dyn LayoutTrigger,
}

impl<'a> TraceViewSession<'a> {
    pub fn new(graph: GraphModel, config: ViewerConfig, layout: &'a dyn LayoutTrigger) -> Result<Self> {
        let classifier = StatusClassifier::new(config.fanout_threshold);
        Self::with_classifier(graph, config, classifier, layout)
    }

    pub fn with_classifier(
        graph: GraphModel,
        config: ViewerConfig,
        classifier: StatusClassifier,
        layout: &'a dyn LayoutTrigger,
    ) -> Result<Self> {
        config.validate()?;
        let mut session = Self {
            graph,
            config,
            classifier,
            layout,
        };
        session.classify()?;
        Ok(session)
    }

    pub fn graph(&self) -> &GraphModel {
        &self.graph
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    /// Recompute and store the status of every node.
    pub fn classify(&mut self) -> Result<()> {
        let statuses = self.classifier.classify_graph(&self.graph);
        self.graph.apply_statuses(&statuses)
    }

    /// Replace the whole graph, e.g. after the trace was reloaded.
    pub fn reload(&mut self, graph: GraphModel) -> Result<()> {
        self.graph = graph;
        self.classify()
    }

    pub fn metrics(&self, node_id: &str) -> Result<TreeMetrics> {
        TreeMetricsCalculator::for_node(&self.graph, node_id)
    }

    pub fn descendants(&self, node_id: &str) -> Result<Vec<String>> {
        VisibilityController::get_all_descendants(&self.graph, node_id)
    }

    /// Returns the node's new `collapsed` state.
    pub fn toggle_children(&mut self, node_id: &str) -> Result<bool> {
        let controller = VisibilityController::from_config(self.layout, &self.config.layout);
        controller.toggle_children(&mut self.graph, node_id)
    }

    pub fn expand_all_descendants(&mut self, node_id: &str) -> Result<()> {
        let controller = VisibilityController::from_config(self.layout, &self.config.layout);
        controller.expand_all_descendants(&mut self.graph, node_id)
    }

    /// Renderer-facing snapshot of the current state.
    pub fn snapshot(&self) -> GraphDto {
        GraphDto::from_graph(&self.graph, &TreeMetricsCalculator::all_metrics(&self.graph))
    }
}
