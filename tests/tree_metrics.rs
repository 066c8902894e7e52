/// Subtree metrics tests.
/// Covers depth/size accounting and the path-scoped cycle guard.

use calltrace_view::domain::callgraph::{GraphModel, NodeSpec};
use calltrace_view::domain::metrics::TreeMetricsCalculator;
use std::collections::HashSet;

/// Build a chain n0 -> n1 -> ... with distinct signatures.
fn linear_chain(len: usize) -> GraphModel {
    let specs = (0..len)
        .map(|i| {
            let spec = NodeSpec::new(&format!("n{}", i), "Chain", &format!("step{}", i));
            let next = format!("n{}", i + 1);
            let spec = if i + 1 < len {
                spec.calls(&[next.as_str()])
            } else {
                spec
            };
            if i == 0 {
                spec.root()
            } else {
                spec
            }
        })
        .collect();
    GraphModel::from_specs(specs).unwrap()
}

#[test]
fn test_linear_chain_of_five() {
    let graph = linear_chain(5);
    let m = TreeMetricsCalculator::for_node(&graph, "n0").unwrap();

    assert_eq!(m.subtree_depth, 5);
    assert_eq!(m.total_descendants, 4);
    assert_eq!(m.direct_children_count, 1);
    assert!(!m.is_recursive);
}

#[test]
fn test_deep_chain_does_not_overflow() {
    let graph = linear_chain(3_000);
    let m = TreeMetricsCalculator::for_node(&graph, "n0").unwrap();
    assert_eq!(m.subtree_depth, 3_000);
    assert_eq!(m.total_descendants, 2_999);
}

#[test]
fn test_signature_seen_on_path_stops_descent() {
    let graph = GraphModel::from_specs(vec![
        NodeSpec::new("a", "Tree", "walk").root().calls(&["x", "y"]),
        NodeSpec::new("x", "Tree", "leafA").calls(&["z"]),
        NodeSpec::new("y", "Tree", "leafB"),
        NodeSpec::new("z", "Tree", "leafC"),
    ])
    .unwrap();

    let mut visited = HashSet::new();
    visited.insert("Tree.walk".to_string());
    let m = TreeMetricsCalculator::calculate_tree_metrics(&graph, "a", "Tree.walk", &visited).unwrap();

    assert!(m.is_recursive);
    assert_eq!(m.direct_children_count, 2);
    assert_eq!(m.total_descendants, 2, "only immediate children are counted");
    assert_eq!(m.subtree_depth, 1);
}

#[test]
fn test_recursive_child_counts_its_children_only() {
    // walk -> walk -> (leaf, leaf): the inner walk is cut off at its own
    // two children.
    let graph = GraphModel::from_specs(vec![
        NodeSpec::new("w1", "Tree", "walk").root().calls(&["w2"]),
        NodeSpec::new("w2", "Tree", "walk").calls(&["l1", "l2"]),
        NodeSpec::new("l1", "Tree", "visit").calls(&["deep"]),
        NodeSpec::new("l2", "Tree", "visit"),
        NodeSpec::new("deep", "Tree", "deep"),
    ])
    .unwrap();

    let m = TreeMetricsCalculator::for_node(&graph, "w1").unwrap();
    assert!(!m.is_recursive);
    assert_eq!(m.direct_children_count, 1);
    // w2 contributes 1 + its 2 immediate children.
    assert_eq!(m.total_descendants, 3);
    assert_eq!(m.subtree_depth, 2);
}

#[test]
fn test_cycle_terminates() {
    let graph = GraphModel::from_specs(vec![
        NodeSpec::new("a", "A", "ping").root().calls(&["b"]),
        NodeSpec::new("b", "B", "pong").calls(&["a"]),
    ])
    .unwrap();

    let m = TreeMetricsCalculator::for_node(&graph, "a").unwrap();
    // a -> b -> a(cut, 1 child)
    assert_eq!(m.total_descendants, 3);
    assert_eq!(m.subtree_depth, 3);
}

#[test]
fn test_same_method_on_sibling_branches_counts_normally() {
    let graph = GraphModel::from_specs(vec![
        NodeSpec::new("root", "App", "main").root().calls(&["l", "r"]),
        NodeSpec::new("l", "Repo", "load").calls(&["l1"]),
        NodeSpec::new("l1", "Db", "query"),
        NodeSpec::new("r", "Repo", "load").calls(&["r1"]),
        NodeSpec::new("r1", "Db", "query"),
    ])
    .unwrap();

    let m = TreeMetricsCalculator::for_node(&graph, "root").unwrap();
    assert_eq!(m.total_descendants, 4);
    assert_eq!(m.subtree_depth, 3);
    assert!(!m.is_recursive);
}

#[test]
fn test_unknown_node_reported() {
    let graph = linear_chain(2);
    let err = TreeMetricsCalculator::calculate_tree_metrics(&graph, "missing", "X.y", &HashSet::new())
        .unwrap_err();
    assert!(err.to_string().contains("missing"));
}
