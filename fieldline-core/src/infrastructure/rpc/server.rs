use super::types::{RpcRequest, RpcResponse};
use crate::application::endpoint::{ToolEndpoint, call_tool, list_tools};
use crate::constants::PROTOCOL_VERSION;
use serde_json::{Value, json};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

/// Answers JSON-RPC requests on behalf of one tool endpoint.
#[derive(Clone)]
pub struct RpcDispatcher {
    endpoint: Arc<dyn ToolEndpoint>,
}

impl RpcDispatcher {
    pub fn new(endpoint: Arc<dyn ToolEndpoint>) -> Self {
        Self { endpoint }
    }

    pub fn endpoint(&self) -> &Arc<dyn ToolEndpoint> {
        &self.endpoint
    }

    /// `None` for notifications.
    pub async fn handle(&self, request: RpcRequest) -> Option<RpcResponse> {
        debug!(peer = %self.endpoint.peer(), method = %request.method, "Received JSON-RPC request");

        if request.jsonrpc != "2.0" {
            return Some(RpcResponse::invalid_request(
                request.id,
                "Unsupported jsonrpc version (expected 2.0)",
            ));
        }
        if request.is_notification() {
            debug!(peer = %self.endpoint.peer(), method = %request.method, "Notification received");
            return None;
        }

        let id = request.id.clone();
        let response = match request.method.as_str() {
            "initialize" => RpcResponse::success(id, self.initialize_result(request.params.as_ref())),
            "ping" => RpcResponse::success(id, json!({ "status": "ok" })),
            "tools/list" => RpcResponse::success(id, json!({ "tools": list_tools(self.endpoint.as_ref()) })),
            "tools/call" => self.handle_tool_call(id, request.params).await,
            other => {
                warn!(peer = %self.endpoint.peer(), method = other, "Unknown JSON-RPC method");
                RpcResponse::method_not_found(id, other)
            }
        };
        Some(response)
    }

    /// Decodes one line and encodes the reply, if any.
    pub async fn handle_line(&self, line: &str) -> Option<String> {
        let response = match serde_json::from_str::<RpcRequest>(line) {
            Ok(request) => self.handle(request).await?,
            Err(err) => {
                warn!(peer = %self.endpoint.peer(), %err, "Discarding malformed JSON-RPC line");
                RpcResponse::parse_error(format!("invalid JSON-RPC message: {err}"))
            }
        };
        match serde_json::to_string(&response) {
            Ok(encoded) => Some(encoded),
            Err(err) => {
                error!(peer = %self.endpoint.peer(), %err, "Failed to encode JSON-RPC response");
                None
            }
        }
    }

    fn initialize_result(&self, params: Option<&Value>) -> Value {
        let protocol = params
            .and_then(|p| p.get("protocolVersion"))
            .and_then(Value::as_str)
            .unwrap_or(PROTOCOL_VERSION);
        json!({
            "protocolVersion": protocol,
            "serverInfo": self.endpoint.server_info(),
            "capabilities": { "tools": { "listChanged": false } },
        })
    }

    async fn handle_tool_call(&self, id: Option<Value>, params: Option<Value>) -> RpcResponse {
        let Some(Value::Object(mut params)) = params else {
            return RpcResponse::invalid_params(id, "params must be an object with name");
        };
        let name = match params.remove("name") {
            Some(Value::String(name)) if !name.trim().is_empty() => name,
            _ => return RpcResponse::invalid_params(id, "params.name must be a non-empty string"),
        };
        let arguments = params.remove("arguments").unwrap_or(Value::Null);

        let result = call_tool(self.endpoint.as_ref(), &name, arguments).await;
        match serde_json::to_value(&result) {
            Ok(value) => RpcResponse::success(id, value),
            Err(err) => RpcResponse::error(id, -32603, format!("failed to encode tool result: {err}")),
        }
    }

    /// Serves newline-delimited JSON-RPC until `reader` reaches end of input.
    /// Requests are handled concurrently; replies may arrive out of order.
    pub async fn serve<R, W>(&self, reader: R, mut writer: W) -> std::io::Result<()>
    where
        R: AsyncRead + Unpin + Send,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let (tx, mut rx) = mpsc::unbounded_channel::<String>();
        let writer_task = tokio::spawn(async move {
            while let Some(line) = rx.recv().await {
                writer.write_all(line.as_bytes()).await?;
                writer.write_all(b"\n").await?;
                writer.flush().await?;
            }
            Ok::<(), std::io::Error>(())
        });

        let mut lines = BufReader::new(reader).lines();
        while let Some(raw) = lines.next_line().await? {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                continue;
            }
            let line = trimmed.to_string();
            let dispatcher = self.clone();
            let tx = tx.clone();
            tokio::spawn(async move {
                if let Some(reply) = dispatcher.handle_line(&line).await {
                    let _ = tx.send(reply);
                }
            });
        }
        drop(tx);

        match writer_task.await {
            Ok(result) => result,
            Err(err) => Err(std::io::Error::other(err)),
        }
    }

    /// Serves on the process's own stdin/stdout.
    pub async fn serve_stdio(&self) -> std::io::Result<()> {
        info!(peer = %self.endpoint.peer(), "Endpoint running on stdio");
        self.serve(tokio::io::stdin(), tokio::io::stdout()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::endpoints::SchedulingEndpoint;
    use crate::infrastructure::upstream::testing::ScriptedUpstream;

    fn dispatcher() -> RpcDispatcher {
        RpcDispatcher::new(Arc::new(SchedulingEndpoint::new(Arc::new(ScriptedUpstream::offline()))))
    }

    #[tokio::test]
    async fn initialize_reports_server_info() {
        let reply = dispatcher()
            .handle(RpcRequest::new("req-1", "initialize", json!({ "protocolVersion": "2025-06-18" })))
            .await
            .unwrap();
        let result = reply.result.unwrap();
        assert_eq!(result["serverInfo"]["name"], "scheduling-server");
        assert_eq!(result["protocolVersion"], "2025-06-18");
    }

    #[tokio::test]
    async fn notifications_get_no_reply() {
        let reply = dispatcher()
            .handle(RpcRequest::notification("notifications/initialized", json!({})))
            .await;
        assert!(reply.is_none());
    }

    #[tokio::test]
    async fn ping_and_unknown_methods() {
        let d = dispatcher();
        let ping = d.handle(RpcRequest::new(1, "ping", json!({}))).await.unwrap();
        assert_eq!(ping.result, Some(json!({ "status": "ok" })));

        let unknown = d.handle(RpcRequest::new(2, "resources/list", json!({}))).await.unwrap();
        assert_eq!(unknown.error.unwrap().code, -32601);
    }

    #[tokio::test]
    async fn tools_call_without_name_is_invalid_params() {
        let reply = dispatcher()
            .handle(RpcRequest::new(3, "tools/call", json!({ "arguments": {} })))
            .await
            .unwrap();
        assert_eq!(reply.error.unwrap().code, -32602);
    }

    #[tokio::test]
    async fn malformed_line_yields_parse_error() {
        let reply = dispatcher().handle_line("{not json").await.unwrap();
        let decoded: RpcResponse = serde_json::from_str(&reply).unwrap();
        assert_eq!(decoded.error.unwrap().code, -32700);
    }

    #[tokio::test]
    async fn serve_answers_every_request_line() {
        let (client, server) = tokio::io::duplex(64 * 1024);
        let (server_read, server_write) = tokio::io::split(server);
        let d = dispatcher();
        let serving = tokio::spawn(async move { d.serve(server_read, server_write).await });

        let (client_read, mut client_write) = tokio::io::split(client);
        let mut input = String::new();
        input.push_str(&serde_json::to_string(&RpcRequest::new("a", "ping", json!({}))).unwrap());
        input.push('\n');
        input.push_str(
            &serde_json::to_string(&RpcRequest::new(
                "b",
                "tools/call",
                json!({ "name": "get_jobs", "arguments": { "date": "2024-01-15" } }),
            ))
            .unwrap(),
        );
        input.push('\n');
        client_write.write_all(input.as_bytes()).await.unwrap();
        client_write.shutdown().await.unwrap();

        let mut lines = BufReader::new(client_read).lines();
        let mut ids = Vec::new();
        while let Some(line) = lines.next_line().await.unwrap() {
            let reply: RpcResponse = serde_json::from_str(&line).unwrap();
            ids.push(reply.id.unwrap().as_str().unwrap().to_string());
        }
        ids.sort();
        assert_eq!(ids, ["a", "b"]);
        serving.await.unwrap().unwrap();
    }
}
