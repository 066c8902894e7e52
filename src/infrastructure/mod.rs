// Infrastructure adapters: trace ingestion from disk and layout triggers.

pub mod layout;
pub mod trace_loader;

pub use layout::{LayoutRequest, LoggingLayoutTrigger, NoopLayoutTrigger, QueuedLayoutTrigger};
pub use trace_loader::TraceLoader;
