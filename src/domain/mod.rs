// Call-trace domain: graph model, classification, metrics and visibility.

pub mod callgraph;
pub mod entry_point;
pub mod metrics;
pub mod status;
pub mod visibility;
