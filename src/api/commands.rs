//! Line-delimited JSON command loop.
//!
//! Each request is one line: `{"command": "TOGGLE", "params": {"id": "n3"}}`.
//! Each response is one line: `{"status": "success", "data": ...}` or
//! `{"status": "error", "message": ...}`. Errors never end the loop.

use std::io::{BufRead, Write};

use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, info};

use crate::application::TraceViewSession;

#[derive(Debug, Deserialize)]
struct CommandReq {
    command: String,
    params: Option<Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Serve commands from `reader` until EOF or `QUIT`.
pub fn run_command_loop<R: BufRead, W: Write>(
    session: &mut TraceViewSession<'_>,
    mut reader: R,
    mut writer: W,
) -> Result<()> {
    let mut line = String::new();

    loop {
        line.clear();
        let bytes_read = reader.read_line(&mut line)?;
        if bytes_read == 0 {
            break;
        }

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let (response, flow) = match process_command(session, trimmed) {
            Ok((data, flow)) => (
                json!({
                    "status": "success",
                    "data": data
                }),
                flow,
            ),
            Err(e) => (
                json!({
                    "status": "error",
                    "message": e.to_string()
                }),
                Flow::Continue,
            ),
        };

        let response_str = serde_json::to_string(&response)?;
        writer.write_all(response_str.as_bytes())?;
        writer.write_all(b"\n")?;
        writer.flush()?;

        if flow == Flow::Quit {
            info!("Quit requested");
            break;
        }
    }
    Ok(())
}

pub fn process_command(session: &mut TraceViewSession<'_>, json_str: &str) -> Result<(Value, Flow)> {
    let req: CommandReq = serde_json::from_str(json_str).context("Invalid JSON format")?;
    debug!("Command {}", req.command);

    let data = match req.command.as_str() {
        "PING" => json!("PONG"),
        "TOGGLE" => {
            let id = node_id_param(&req.params)?;
            let collapsed = session.toggle_children(id)?;
            json!({ "id": id, "collapsed": collapsed })
        }
        "EXPAND_ALL" => {
            let id = node_id_param(&req.params)?;
            session.expand_all_descendants(id)?;
            json!({ "id": id, "collapsed": false })
        }
        "DESCENDANTS" => {
            let id = node_id_param(&req.params)?;
            json!(session.descendants(id)?)
        }
        "METRICS" => {
            let id = node_id_param(&req.params)?;
            serde_json::to_value(session.metrics(id)?)?
        }
        "STATUS" => {
            let id = node_id_param(&req.params)?;
            serde_json::to_value(session.graph().require(id)?.status)?
        }
        "GRAPH" => {
            let visible_only = req
                .params
                .as_ref()
                .and_then(|p| p.get("visibleOnly"))
                .and_then(Value::as_bool)
                .unwrap_or(false);
            let snapshot = session.snapshot();
            if visible_only {
                serde_json::to_value(snapshot.visible_only())?
            } else {
                serde_json::to_value(snapshot)?
            }
        }
        "QUIT" => return Ok((json!("Bye"), Flow::Quit)),
        _ => anyhow::bail!("Unknown command: {}", req.command),
    };

    Ok((data, Flow::Continue))
}

fn node_id_param(params: &Option<Value>) -> Result<&str> {
    params
        .as_ref()
        .and_then(|p| p.get("id"))
        .and_then(Value::as_str)
        .ok_or_else(|| anyhow::anyhow!("Missing 'id' param"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ViewerConfig;
    use crate::domain::callgraph::{GraphModel, NodeSpec};
    use crate::infrastructure::layout::NoopLayoutTrigger;

    fn session(layout: &NoopLayoutTrigger) -> TraceViewSession<'_> {
        let graph = GraphModel::from_specs(vec![
            NodeSpec::new("r", "App", "main").root().calls(&["a"]),
            NodeSpec::new("a", "S", "run").calls(&["b"]),
            NodeSpec::new("b", "S", "b"),
        ])
        .unwrap();
        TraceViewSession::new(graph, ViewerConfig::default(), layout).unwrap()
    }

    #[test]
    fn test_process_ping_and_unknown() {
        let layout = NoopLayoutTrigger;
        let mut s = session(&layout);
        let (data, flow) = process_command(&mut s, r#"{"command": "PING"}"#).unwrap();
        assert_eq!(data, json!("PONG"));
        assert_eq!(flow, Flow::Continue);

        let err = process_command(&mut s, r#"{"command": "FLY"}"#).unwrap_err();
        assert!(err.to_string().contains("Unknown command"));
    }

    #[test]
    fn test_toggle_requires_id() {
        let layout = NoopLayoutTrigger;
        let mut s = session(&layout);
        let err = process_command(&mut s, r#"{"command": "TOGGLE"}"#).unwrap_err();
        assert!(err.to_string().contains("Missing 'id'"));
    }

    #[test]
    fn test_quit_stops_loop() {
        let layout = NoopLayoutTrigger;
        let mut s = session(&layout);
        let input = "{\"command\": \"QUIT\"}\n{\"command\": \"PING\"}\n";
        let mut output = Vec::new();
        run_command_loop(&mut s, input.as_bytes(), &mut output).unwrap();

        let text = String::from_utf8(output).unwrap();
        assert_eq!(text.lines().count(), 1);
        assert!(text.contains("Bye"));
    }
}
