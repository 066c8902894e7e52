use calltrace_view::api::commands::run_command_loop;
use calltrace_view::application::TraceViewSession;
use calltrace_view::config::ViewerConfig;
use calltrace_view::domain::callgraph::{GraphModel, NodeSpec};
use calltrace_view::infrastructure::QueuedLayoutTrigger;
use serde_json::Value;

fn graph() -> GraphModel {
    GraphModel::from_specs(vec![
        NodeSpec::new("root", "App", "main").root().calls(&["a", "b"]),
        NodeSpec::new("a", "Svc", "runTask").calls(&["c"]),
        NodeSpec::new("b", "Svc", "getName"),
        NodeSpec::new("c", "Repo", "load"),
    ])
    .unwrap()
}

fn run(session: &mut TraceViewSession<'_>, commands: &[&str]) -> Vec<Value> {
    let input = commands.join("\n") + "\n";
    let mut output = Vec::new();
    run_command_loop(session, input.as_bytes(), &mut output).unwrap();

    String::from_utf8(output)
        .unwrap()
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect()
}

#[test]
fn test_command_session_lifecycle() {
    let (layout, rx) = QueuedLayoutTrigger::new();
    let mut session = TraceViewSession::new(graph(), ViewerConfig::default(), &layout).unwrap();

    let responses = run(
        &mut session,
        &[
            r#"{"command": "PING"}"#,
            r#"{"command": "TOGGLE", "params": {"id": "a"}}"#,
            r#"{"command": "GRAPH", "params": {"visibleOnly": true}}"#,
            r#"{"command": "TOGGLE", "params": {"id": "nope"}}"#,
            r#"{"command": "EXPAND_ALL", "params": {"id": "root"}}"#,
            r#"{"command": "DESCENDANTS", "params": {"id": "root"}}"#,
            r#"{"command": "METRICS", "params": {"id": "root"}}"#,
            r#"{"command": "STATUS", "params": {"id": "a"}}"#,
        ],
    );
    assert_eq!(responses.len(), 8);

    assert_eq!(responses[0]["status"], "success");
    assert_eq!(responses[0]["data"], "PONG");

    assert_eq!(responses[1]["data"]["collapsed"], true);

    let nodes = responses[2]["data"]["nodes"].as_array().unwrap();
    let ids: Vec<&str> = nodes.iter().map(|n| n["id"].as_str().unwrap()).collect();
    assert_eq!(ids, vec!["root", "a", "b"]);
    assert_eq!(nodes[1]["collapsed"], true);

    assert_eq!(responses[3]["status"], "error");
    assert!(responses[3]["message"].as_str().unwrap().contains("Node not found: nope"));

    assert_eq!(responses[4]["status"], "success");
    assert_eq!(responses[5]["data"], serde_json::json!(["a", "b", "c"]));
    assert_eq!(responses[6]["data"]["totalDescendants"], 3);
    assert_eq!(responses[6]["data"]["subtreeDepth"], 3);
    assert_eq!(responses[7]["data"]["implementationEntryPoint"], true);

    // One layout per successful visibility change.
    assert_eq!(rx.try_iter().count(), 2);
}

#[test]
fn test_invalid_json_is_an_error_response() {
    let (layout, _rx) = QueuedLayoutTrigger::new();
    let mut session = TraceViewSession::new(graph(), ViewerConfig::default(), &layout).unwrap();

    let responses = run(&mut session, &["not json", "", r#"{"command": "PING"}"#]);
    assert_eq!(responses.len(), 2, "blank lines are skipped");
    assert_eq!(responses[0]["status"], "error");
    assert!(responses[0]["message"].as_str().unwrap().contains("Invalid JSON"));
    assert_eq!(responses[1]["data"], "PONG");
}
