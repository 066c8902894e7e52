use crate::domain::callgraph::GraphModel;

pub mod dot_exporter;

/// Re-lays-out the rendered graph after a visibility change.
///
/// Fire-and-forget: implementations must return without waiting for the
/// layout to finish.
pub trait LayoutTrigger {
    fn run_layout(&self, graph: &GraphModel, layout_name: &str, fit: bool);
}

pub trait GraphExporter {
    fn export(&self, graph: &GraphModel, path: &str) -> std::io::Result<()>;
}
