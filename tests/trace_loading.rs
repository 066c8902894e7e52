/// Trace loading tests.
/// Reads both accepted JSON shapes from disk and runs a full session on
/// the result.

use calltrace_view::application::TraceViewSession;
use calltrace_view::config::ViewerConfig;
use calltrace_view::infrastructure::{NoopLayoutTrigger, TraceLoader};
use std::fs::File;
use std::io::Write;
use tempfile::tempdir;

const NESTED_TRACE: &str = r#"{
    "className": "App", "methodName": "main",
    "children": [
        {"className": "Scheduler", "methodName": "dispatch", "children": [
            {"className": "Job", "methodName": "a", "children": [{"className": "Log", "methodName": "write"}]},
            {"className": "Job", "methodName": "b"},
            {"className": "Job", "methodName": "c"},
            {"className": "Job", "methodName": "d"}
        ]},
        {"className": "Tree", "methodName": "walk", "children": [
            {"className": "Tree", "methodName": "walk"}
        ]}
    ]
}"#;

#[test]
fn test_load_nested_trace_from_disk() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("trace.json");
    let mut file = File::create(&path).unwrap();
    file.write_all(NESTED_TRACE.as_bytes()).unwrap();

    let graph = TraceLoader::load_file(&path).unwrap();
    assert_eq!(graph.len(), 9);
    assert_eq!(graph.edges().len(), 8);

    let layout = NoopLayoutTrigger;
    let session = TraceViewSession::new(graph, ViewerConfig::default(), &layout).unwrap();
    let g = session.graph();

    // n1 = Scheduler.dispatch, n2 = Job.a, n7 = Tree.walk
    assert_eq!(g.node("n1").unwrap().signature(), "Scheduler.dispatch");
    assert!(g.node("n1").unwrap().status.fan_out);
    assert!(g.node("n2").unwrap().status.implementation_entry_point);
    assert!(g.node("n7").unwrap().status.recursive_entry_point);
    assert!(!g.node("n8").unwrap().status.recursive_entry_point);

    let m = session.metrics("n0").unwrap();
    assert_eq!(m.total_descendants, 8);
    assert_eq!(m.subtree_depth, 4);
}

#[test]
fn test_load_flat_trace_from_disk() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("flat.json");
    std::fs::write(
        &path,
        r#"{"nodes": [
            {"id": "main", "className": "App", "methodName": "main", "isRoot": true, "children": ["p"]},
            {"id": "p", "className": "Parser", "methodName": "parseExpr", "children": ["q"]},
            {"id": "q", "className": "Parser", "methodName": "parseTerm", "children": ["p"]}
        ]}"#,
    )
    .unwrap();

    let graph = TraceLoader::load_file(&path).unwrap();
    let layout = NoopLayoutTrigger;
    let mut session = TraceViewSession::new(graph, ViewerConfig::default(), &layout).unwrap();

    assert_eq!(session.descendants("main").unwrap(), vec!["p", "q"]);
    session.toggle_children("p").unwrap();
    let visible: Vec<&str> = session.graph().visible_nodes().map(|n| n.id.as_str()).collect();
    assert_eq!(visible, vec!["main", "p"]);
}

#[test]
fn test_missing_file_reports_path() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("absent.json");
    let err = TraceLoader::load_file(&path).unwrap_err();
    assert!(format!("{:#}", err).contains("absent.json"));
}

#[test]
fn test_config_threshold_changes_classification() {
    let graph = TraceLoader::from_json_str(NESTED_TRACE).unwrap();
    let layout = NoopLayoutTrigger;
    let config = ViewerConfig::from_toml_str("fanout_threshold = 5").unwrap();
    let session = TraceViewSession::new(graph, config, &layout).unwrap();

    assert!(!session.graph().node("n1").unwrap().status.fan_out);
    assert!(!session.graph().node("n2").unwrap().status.implementation_entry_point);
}
