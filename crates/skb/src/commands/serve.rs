//! `skb serve` -- the MCP stdio transport.
//!
//! Line-delimited JSON-RPC 2.0 over stdin/stdout. The tool registry and
//! all parameter validation live in `shirokuma-tools`; this loop only
//! frames requests and responses.

use std::io::{BufRead, Write};

use anyhow::Result;
use serde_json::{Value, json};
use tracing::debug;

use shirokuma_repo::Repository;
use shirokuma_tools::{dispatch, tool_definitions};

use crate::context::RuntimeContext;

pub fn run(ctx: &RuntimeContext) -> Result<()> {
    let repo = ctx.open_repo()?;
    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    for line in stdin.lock().lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let Ok(request) = serde_json::from_str::<Value>(&line) else {
            write_message(
                &mut out,
                &json!({
                    "jsonrpc": "2.0",
                    "id": Value::Null,
                    "error": {"code": -32700, "message": "parse error"}
                }),
            )?;
            continue;
        };

        let id = request.get("id").cloned();
        let method = request
            .get("method")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_owned();
        debug!(method, "rpc request");

        // Notifications carry no id and get no response.
        let Some(id) = id else {
            continue;
        };

        let response = match handle(&repo, &method, request.get("params")) {
            Ok(result) => json!({"jsonrpc": "2.0", "id": id, "result": result}),
            Err((code, message)) => json!({
                "jsonrpc": "2.0",
                "id": id,
                "error": {"code": code, "message": message}
            }),
        };
        write_message(&mut out, &response)?;
    }
    Ok(())
}

fn handle(
    repo: &Repository,
    method: &str,
    params: Option<&Value>,
) -> std::result::Result<Value, (i64, String)> {
    match method {
        "initialize" => Ok(json!({
            "protocolVersion": "2024-11-05",
            "serverInfo": {
                "name": "shirokuma-knowledge-base",
                "version": env!("CARGO_PKG_VERSION"),
            },
            "capabilities": {"tools": {}}
        })),
        "ping" => Ok(json!({})),
        "tools/list" => {
            let tools: Vec<Value> = tool_definitions()
                .into_iter()
                .map(|d| {
                    json!({
                        "name": d.name,
                        "description": d.description,
                        "inputSchema": d.input_schema,
                    })
                })
                .collect();
            Ok(json!({"tools": tools}))
        }
        "tools/call" => {
            let params = params.ok_or((-32602_i64, "missing params".to_owned()))?;
            let name = params
                .get("name")
                .and_then(Value::as_str)
                .ok_or((-32602_i64, "missing tool name".to_owned()))?;
            let arguments = params.get("arguments").cloned().unwrap_or(Value::Null);

            // Tool failures are results, not protocol errors: the caller
            // gets the stable error code in the text payload.
            match dispatch(repo, name, arguments) {
                Ok(value) => Ok(json!({
                    "content": [{"type": "text", "text": value.to_string()}],
                    "isError": false
                })),
                Err(e) => Ok(json!({
                    "content": [{"type": "text", "text": format!("{}: {e}", e.code())}],
                    "isError": true
                })),
            }
        }
        other => Err((-32601, format!("method not found: {other}"))),
    }
}

fn write_message(out: &mut impl Write, message: &Value) -> Result<()> {
    serde_json::to_writer(&mut *out, message)?;
    out.write_all(b"\n")?;
    out.flush()?;
    Ok(())
}
