//! Entry Point Detection Module
//!
//! Decides whether a traced method looks like the start of a unit of work,
//! either by its name or because its caller fanned out.

use crate::domain::callgraph::TraceNode;

/// Accessor prefixes that never mark an entry point.
const ACCESSOR_PREFIXES: [&str; 2] = ["get", "set"];

/// Name prefixes that mark an entry point, in match priority order.
pub const ENTRY_POINT_PREFIXES: [&str; 6] = ["start", "init", "execute", "run", "process", "perform"];

/// Default minimum child count for a node to count as a fan-out.
pub const DEFAULT_FANOUT_THRESHOLD: usize = 4;

/// True when a node with `child_count` direct children fans out.
pub fn has_fanout(child_count: usize, threshold: usize) -> bool {
    child_count >= threshold
}

/// Case-sensitive prefix check. Accessors are excluded before any entry
/// prefix is considered.
pub fn is_method_name_entry_point(name: &str) -> bool {
    if ACCESSOR_PREFIXES.iter().any(|p| name.starts_with(p)) {
        return false;
    }
    ENTRY_POINT_PREFIXES.iter().any(|p| name.starts_with(p))
}

/// Roots and leaves are never implementation entry points.
pub fn is_implementation_entry_point(
    is_root: bool,
    child_count: usize,
    method_name: &str,
    parent_is_fanout: bool,
) -> bool {
    if is_root || child_count == 0 {
        return false;
    }
    is_method_name_entry_point(method_name) || parent_is_fanout
}

/// Decides the `chainStartPoint` flag.
///
/// Implement this to plug in chain detection without touching the
/// classifier.
pub trait ChainStartPredicate {
    fn is_chain_start_point(&self, node: &TraceNode, children: &[&TraceNode]) -> bool;
}

/// Current rule set: nothing starts a chain.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoChainStart;

impl ChainStartPredicate for NoChainStart {
    fn is_chain_start_point(&self, _node: &TraceNode, _children: &[&TraceNode]) -> bool {
        false
    }
}

impl<F> ChainStartPredicate for F
where
    F: Fn(&TraceNode, &[&TraceNode]) -> bool,
{
    fn is_chain_start_point(&self, node: &TraceNode, children: &[&TraceNode]) -> bool {
        self(node, children)
    }
}
