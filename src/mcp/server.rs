use anyhow::Result;
use serde_json::{json, Value};
use std::io::{self, BufRead, Write};
use tracing::{debug, info, warn};

use super::dispatcher::ToolDispatcher;
use super::tools::tool_definitions;
use crate::config::Config;

const PROTOCOL_VERSION: &str = "2024-11-05";

const PARSE_ERROR: i64 = -32700;
const METHOD_NOT_FOUND: i64 = -32601;
const INVALID_PARAMS: i64 = -32602;

/// Line-delimited JSON-RPC server on stdin/stdout. Requests are handled one
/// at a time in arrival order.
pub struct McpServer {
    dispatcher: ToolDispatcher,
}

impl McpServer {
    pub fn new(config: &Config) -> Self {
        Self::with_dispatcher(ToolDispatcher::new(config))
    }

    pub fn with_dispatcher(dispatcher: ToolDispatcher) -> Self {
        McpServer { dispatcher }
    }

    pub async fn run(&self) -> Result<()> {
        let stdin = io::stdin();
        let mut stdout = io::stdout();

        info!("ember MCP server listening on stdio");

        for line_result in stdin.lock().lines() {
            let line = match line_result {
                Ok(line) => line,
                Err(e) => {
                    warn!(error = %e, "stdin closed");
                    break;
                }
            };

            if let Some(response) = self.handle_line(&line).await {
                let response_str = serde_json::to_string(&response)?;
                stdout.write_all(response_str.as_bytes())?;
                stdout.write_all(b"\n")?;
                stdout.flush()?;
            }
        }

        info!("ember MCP server shutting down");
        Ok(())
    }

    pub async fn handle_line(&self, line: &str) -> Option<Value> {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return None;
        }

        match serde_json::from_str::<Value>(trimmed) {
            Ok(request) => self.handle_request(request).await,
            Err(e) => {
                warn!(error = %e, "unparsable request");
                Some(error_response(Value::Null, PARSE_ERROR, &format!("Parse error: {}", e)))
            }
        }
    }

    /// `None` for notifications, which get no reply.
    pub async fn handle_request(&self, request: Value) -> Option<Value> {
        let method = request["method"].as_str().unwrap_or("");
        let id = request["id"].clone();
        debug!(method, "request");

        if method.starts_with("notifications/") {
            return None;
        }

        let response = match method {
            "initialize" => self.handle_initialize(id),
            "tools/list" => self.handle_tools_list(id),
            "tools/call" => self.handle_tools_call(&request, id).await,
            "ping" => json!({"jsonrpc": "2.0", "id": id, "result": {}}),
            _ => error_response(id, METHOD_NOT_FOUND, &format!("Method not found: {}", method)),
        };
        Some(response)
    }

    fn handle_initialize(&self, id: Value) -> Value {
        json!({
            "jsonrpc": "2.0",
            "id": id,
            "result": {
                "protocolVersion": PROTOCOL_VERSION,
                "capabilities": {
                    "tools": {}
                },
                "serverInfo": {
                    "name": "ember",
                    "version": env!("CARGO_PKG_VERSION")
                }
            }
        })
    }

    fn handle_tools_list(&self, id: Value) -> Value {
        json!({
            "jsonrpc": "2.0",
            "id": id,
            "result": {
                "tools": tool_definitions()
            }
        })
    }

    async fn handle_tools_call(&self, request: &Value, id: Value) -> Value {
        let tool_name = match request["params"]["name"].as_str() {
            Some(name) => name,
            None => return error_response(id, INVALID_PARAMS, "Missing tool name"),
        };
        let arguments = match &request["params"]["arguments"] {
            Value::Null => json!({}),
            arguments => arguments.clone(),
        };

        let result = self.dispatcher.execute_tool(tool_name, &arguments).await;
        let is_error = result["success"] == false;

        json!({
            "jsonrpc": "2.0",
            "id": id,
            "result": {
                "content": [
                    {
                        "type": "text",
                        "text": result.to_string()
                    }
                ],
                "isError": is_error
            }
        })
    }
}

fn error_response(id: Value, code: i64, message: &str) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "error": {
            "code": code,
            "message": message
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai_provider::CannedGenerator;
    use crate::core::StateStore;
    use crate::persona::Persona;

    fn server(dir: &tempfile::TempDir) -> McpServer {
        McpServer::with_dispatcher(ToolDispatcher::with_parts(
            StateStore::new(dir.path().to_path_buf()),
            Persona::new(Box::new(CannedGenerator::failing())),
            "Ember",
            false,
        ))
    }

    fn tool_payload(response: &Value) -> Value {
        let text = response["result"]["content"][0]["text"].as_str().unwrap();
        serde_json::from_str(text).unwrap()
    }

    #[tokio::test]
    async fn test_initialize() {
        let dir = tempfile::tempdir().unwrap();
        let response = server(&dir)
            .handle_line(r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{}}"#)
            .await
            .unwrap();
        assert_eq!(response["id"], 1);
        assert_eq!(response["result"]["protocolVersion"], PROTOCOL_VERSION);
        assert_eq!(response["result"]["serverInfo"]["name"], "ember");
    }

    #[tokio::test]
    async fn test_notifications_get_no_reply() {
        let dir = tempfile::tempdir().unwrap();
        let response = server(&dir)
            .handle_line(r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#)
            .await;
        assert!(response.is_none());
    }

    #[tokio::test]
    async fn test_tools_list() {
        let dir = tempfile::tempdir().unwrap();
        let response = server(&dir)
            .handle_line(r#"{"jsonrpc":"2.0","id":2,"method":"tools/list"}"#)
            .await
            .unwrap();
        let tools = response["result"]["tools"].as_array().unwrap();
        assert!(tools.iter().any(|t| t["name"] == "check_violation"));
        assert!(tools.iter().any(|t| t["name"] == "get_learning_stats"));
    }

    #[tokio::test]
    async fn test_tools_call_wraps_result() {
        let dir = tempfile::tempdir().unwrap();
        let request = json!({
            "jsonrpc": "2.0",
            "id": 3,
            "method": "tools/call",
            "params": {
                "name": "check_violation",
                "arguments": {
                    "action": "write_file",
                    "parameters": {"content": "const password = \"hunter22\";"}
                }
            }
        });
        let response = server(&dir).handle_request(request).await.unwrap();
        assert_eq!(response["result"]["isError"], false);

        let payload = tool_payload(&response);
        assert_eq!(payload["violations"][0]["category"], "hardcoded_credentials");
        assert_eq!(payload["tier"], "warning");
    }

    #[tokio::test]
    async fn test_failed_tool_sets_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let request = json!({
            "jsonrpc": "2.0",
            "id": 4,
            "method": "tools/call",
            "params": {"name": "chat", "arguments": {}}
        });
        let response = server(&dir).handle_request(request).await.unwrap();
        assert_eq!(response["result"]["isError"], true);
        assert_eq!(tool_payload(&response)["success"], false);
    }

    #[tokio::test]
    async fn test_unknown_method_and_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let server = server(&dir);

        let response = server
            .handle_line(r#"{"jsonrpc":"2.0","id":5,"method":"resources/list"}"#)
            .await
            .unwrap();
        assert_eq!(response["error"]["code"], METHOD_NOT_FOUND);

        let response = server.handle_line("{not json").await.unwrap();
        assert_eq!(response["error"]["code"], PARSE_ERROR);
        assert!(response["id"].is_null());

        assert!(server.handle_line("   ").await.is_none());
    }
}
