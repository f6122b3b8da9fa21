//! MCP server implementation for the Podhome API.
//!
//! This module implements the MCP server lifecycle:
//!
//! 1. **Initialisation**: Capability negotiation and version agreement
//! 2. **Operation**: Handling tool calls and other requests
//! 3. **Shutdown**: Graceful connection termination
//!
//! # Concurrency
//!
//! Each `tools/call` runs on its own Tokio task so a slow API call does not
//! block other requests. The calls live in a [`JoinSet`] polled by the main
//! loop, which is the only writer to stdout. Replies may therefore arrive in
//! a different order than the requests.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::task::{self, JoinError, JoinSet};

use crate::mcp::protocol::{
    IncomingMessage, JsonRpcError, JsonRpcNotification, JsonRpcRequest, JsonRpcResponse,
    OutgoingMessage, RequestId, ToolCallParams, ToolCallResult, MCP_PROTOCOL_VERSION,
    SERVER_NAME,
};
use crate::mcp::transport::StdioTransport;
use crate::tools::ToolRegistry;

/// Server state in the MCP lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerState {
    /// Waiting for initialize request.
    AwaitingInit,
    /// Initialize received, waiting for initialized notification.
    Initialising,
    /// Ready for normal operation.
    Running,
    /// Shutdown in progress.
    ShuttingDown,
}

/// Server capabilities advertised during initialisation.
#[derive(Debug, Clone, Serialize)]
pub struct ServerCapabilities {
    /// Tool-related capabilities.
    pub tools: ToolCapabilities,
}

/// Tool-specific capabilities.
///
/// The tool table is fixed at startup, so `listChanged` is always `false`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ToolCapabilities {
    /// Whether the tool list can change during the session.
    #[serde(rename = "listChanged")]
    pub list_changed: bool,
}

/// Server information for initialisation response.
#[derive(Debug, Clone, Serialize)]
pub struct ServerInfo {
    /// Server name.
    pub name: String,
    /// Server version.
    pub version: String,
}

impl Default for ServerInfo {
    fn default() -> Self {
        Self {
            name: SERVER_NAME.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Client information received during initialisation.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientInfo {
    /// Client name.
    pub name: String,
    /// Client version.
    #[serde(default)]
    pub version: Option<String>,
}

/// Parameters for the initialize request.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeParams {
    /// Protocol version requested by client.
    pub protocol_version: String,
    /// Client capabilities.
    #[serde(default)]
    pub capabilities: Value,
    /// Client information.
    #[serde(default)]
    pub client_info: Option<ClientInfo>,
}

/// The MCP server for the Podhome API.
pub struct McpServer {
    /// Current server state.
    state: ServerState,
    /// The transport layer.
    transport: StdioTransport,
    /// Negotiated protocol version (set after initialisation).
    protocol_version: Option<String>,
    /// Tools and the configuration they run against.
    registry: Arc<ToolRegistry>,
    /// Running tool calls, each yielding its reply.
    tool_calls: JoinSet<OutgoingMessage>,
    /// Request ID of each running tool call, so a panicked call still gets
    /// an answer.
    call_ids: HashMap<task::Id, RequestId>,
}

impl McpServer {
    /// Creates a new MCP server serving the given tool registry.
    #[must_use]
    pub fn new(registry: ToolRegistry) -> Self {
        Self {
            state: ServerState::AwaitingInit,
            transport: StdioTransport::new(),
            protocol_version: None,
            registry: Arc::new(registry),
            tool_calls: JoinSet::new(),
            call_ids: HashMap::new(),
        }
    }

    /// Returns the current server state.
    #[must_use]
    pub const fn state(&self) -> ServerState {
        self.state
    }

    /// Returns the negotiated protocol version, once initialised.
    #[must_use]
    pub fn protocol_version(&self) -> Option<&str> {
        self.protocol_version.as_deref()
    }

    /// Runs the MCP server main loop with graceful shutdown handling.
    ///
    /// # Errors
    ///
    /// Returns an error if transport I/O fails.
    pub async fn run(&mut self) -> std::io::Result<()> {
        self.run_with_shutdown().await
    }

    /// Runs the main loop and handles shutdown.
    #[cfg(unix)]
    async fn run_with_shutdown(&mut self) -> std::io::Result<()> {
        use tokio::signal::unix::{signal, SignalKind};

        let mut sigint = signal(SignalKind::interrupt()).map_err(std::io::Error::other)?;
        let mut sigterm = signal(SignalKind::terminate()).map_err(std::io::Error::other)?;

        loop {
            tokio::select! {
                _ = sigint.recv() => {
                    tracing::info!("Received SIGINT, initiating graceful shutdown");
                    self.state = ServerState::ShuttingDown;
                    return Ok(());
                }

                _ = sigterm.recv() => {
                    tracing::info!("Received SIGTERM, initiating graceful shutdown");
                    self.state = ServerState::ShuttingDown;
                    return Ok(());
                }

                Some(joined) = self.tool_calls.join_next_with_id(), if !self.tool_calls.is_empty() => {
                    let reply = self.finish_tool_call(joined);
                    self.transport.write_message(&reply).await?;
                }

                // read_line keeps partial input, so losing this race drops nothing
                line_result = self.transport.read_line() => {
                    if self.handle_transport_result(line_result).await? {
                        return self.drain_in_flight().await;
                    }
                }
            }
        }
    }

    /// Runs the main loop and handles shutdown.
    #[cfg(windows)]
    async fn run_with_shutdown(&mut self) -> std::io::Result<()> {
        let ctrl_c = tokio::signal::ctrl_c();
        tokio::pin!(ctrl_c);

        loop {
            tokio::select! {
                _ = &mut ctrl_c => {
                    tracing::info!("Received Ctrl+C, initiating graceful shutdown");
                    self.state = ServerState::ShuttingDown;
                    return Ok(());
                }

                Some(joined) = self.tool_calls.join_next_with_id(), if !self.tool_calls.is_empty() => {
                    let reply = self.finish_tool_call(joined);
                    self.transport.write_message(&reply).await?;
                }

                // read_line keeps partial input, so losing this race drops nothing
                line_result = self.transport.read_line() => {
                    if self.handle_transport_result(line_result).await? {
                        return self.drain_in_flight().await;
                    }
                }
            }
        }
    }

    /// Writes the replies of tool calls still running when stdin closed.
    async fn drain_in_flight(&mut self) -> std::io::Result<()> {
        if !self.tool_calls.is_empty() {
            tracing::debug!(
                running = self.tool_calls.len(),
                "Waiting for running tool calls"
            );
        }
        while let Some(joined) = self.tool_calls.join_next_with_id().await {
            let reply = self.finish_tool_call(joined);
            self.transport.write_message(&reply).await?;
        }
        Ok(())
    }

    /// Turns a finished tool call task into its reply.
    ///
    /// A task that panicked is answered with an internal error.
    fn finish_tool_call(
        &mut self,
        joined: Result<(task::Id, OutgoingMessage), JoinError>,
    ) -> OutgoingMessage {
        match joined {
            Ok((task_id, reply)) => {
                self.call_ids.remove(&task_id);
                reply
            }
            Err(e) => {
                let id = self.call_ids.remove(&e.id());
                tracing::error!(error = %e, request_id = ?id, "Tool call task failed");
                OutgoingMessage::Error(JsonRpcError::internal_error(id, "tool call failed"))
            }
        }
    }

    /// Handles the result from transport read.
    ///
    /// Returns `true` if the server should shut down.
    async fn handle_transport_result(
        &mut self,
        line_result: std::io::Result<Option<String>>,
    ) -> std::io::Result<bool> {
        let line_result = match line_result {
            Err(e) if e.kind() == std::io::ErrorKind::InvalidData => {
                tracing::warn!(error = %e, "Discarding non-UTF-8 input line");
                let reply = OutgoingMessage::Error(JsonRpcError::parse_error());
                self.transport.write_message(&reply).await?;
                return Ok(false);
            }
            other => other,
        };

        let Some(line) = line_result? else {
            tracing::info!("stdin closed");
            self.state = ServerState::ShuttingDown;
            return Ok(true);
        };

        if line.trim().is_empty() {
            return Ok(false);
        }

        if let Some(reply) = self.handle_line(&line) {
            self.transport.write_message(&reply).await?;
        }

        Ok(self.state == ServerState::ShuttingDown)
    }

    /// Handles a single line of input, returning an immediate reply if any.
    fn handle_line(&mut self, line: &str) -> Option<OutgoingMessage> {
        use crate::mcp::protocol::parse_message;

        match parse_message(line) {
            Ok(msg) => self.handle_message(msg),
            Err(error) => Some(OutgoingMessage::Error(error)),
        }
    }

    /// Handles a parsed incoming message.
    ///
    /// Returns the reply to write now. Tool calls are spawned and answered
    /// once they finish, so they return `None`.
    pub fn handle_message(&mut self, msg: IncomingMessage) -> Option<OutgoingMessage> {
        match msg {
            IncomingMessage::Request(req) => self.handle_request(req),
            IncomingMessage::Notification(ref notif) => {
                self.handle_notification(notif);
                None
            }
        }
    }

    /// Waits for the next spawned tool call to finish and returns its reply.
    ///
    /// Returns `None` if no tool call is running.
    pub async fn next_tool_reply(&mut self) -> Option<OutgoingMessage> {
        let joined = self.tool_calls.join_next_with_id().await?;
        Some(self.finish_tool_call(joined))
    }

    /// Handles an incoming request.
    fn handle_request(&mut self, req: JsonRpcRequest) -> Option<OutgoingMessage> {
        tracing::debug!(id = %req.id, method = %req.method, "Handling request");

        let response = match req.method.as_str() {
            "initialize" => self.handle_initialize(&req),
            "tools/list" => self.handle_tools_list(&req),
            "tools/call" => match self.spawn_tools_call(&req) {
                Ok(()) => return None,
                Err(error) => Err(error),
            },
            "ping" => Ok(Self::handle_ping(&req)),
            _ => Err(JsonRpcError::method_not_found(req.id.clone(), &req.method)),
        };

        Some(response.into())
    }

    /// Handles an incoming notification.
    fn handle_notification(&mut self, notif: &JsonRpcNotification) {
        if notif.method == "notifications/initialized" && self.state == ServerState::Initialising {
            self.state = ServerState::Running;
            tracing::info!("Client initialised, server running");
        }
    }

    /// Handles the initialize request.
    fn handle_initialize(&mut self, req: &JsonRpcRequest) -> Result<JsonRpcResponse, JsonRpcError> {
        if self.state != ServerState::AwaitingInit {
            return Err(JsonRpcError::invalid_request(
                Some(req.id.clone()),
                "Server already initialised",
            ));
        }

        let params: InitializeParams = req
            .params
            .as_ref()
            .map(|p| serde_json::from_value(p.clone()))
            .transpose()
            .map_err(|e| {
                JsonRpcError::invalid_params(
                    req.id.clone(),
                    format!("Invalid initialize params: {e}"),
                )
            })?
            .ok_or_else(|| {
                JsonRpcError::invalid_params(req.id.clone(), "Missing initialize params")
            })?;

        if let Some(client) = &params.client_info {
            tracing::info!(
                client = %client.name,
                client_version = client.version.as_deref().unwrap_or("unknown"),
                requested_version = %params.protocol_version,
                "Client connected"
            );
        }

        let negotiated_version = MCP_PROTOCOL_VERSION.to_string();

        self.protocol_version = Some(negotiated_version.clone());
        self.state = ServerState::Initialising;

        let result = json!({
            "protocolVersion": negotiated_version,
            "capabilities": ServerCapabilities {
                tools: ToolCapabilities::default(),
            },
            "serverInfo": ServerInfo::default(),
        });

        Ok(JsonRpcResponse::success(req.id.clone(), result))
    }

    /// Handles the tools/list request.
    fn handle_tools_list(&self, req: &JsonRpcRequest) -> Result<JsonRpcResponse, JsonRpcError> {
        self.require_running(&req.id)?;

        let result = json!({
            "tools": ToolRegistry::definitions(),
        });

        Ok(JsonRpcResponse::success(req.id.clone(), result))
    }

    /// Validates a tools/call request and spawns the call.
    ///
    /// The reply is written by the main loop when the call finishes.
    fn spawn_tools_call(&mut self, req: &JsonRpcRequest) -> Result<(), JsonRpcError> {
        self.require_running(&req.id)?;

        let params: ToolCallParams = req
            .params
            .as_ref()
            .map(|p| serde_json::from_value(p.clone()))
            .transpose()
            .map_err(|e| {
                JsonRpcError::invalid_params(
                    req.id.clone(),
                    format!("Invalid tool call params: {e}"),
                )
            })?
            .ok_or_else(|| {
                JsonRpcError::invalid_params(req.id.clone(), "Missing tool call params")
            })?;

        let registry = Arc::clone(&self.registry);
        let id = req.id.clone();

        let handle = self.tool_calls.spawn(async move {
            let result = registry.call(&params.name, params.arguments).await;
            Self::tool_call_reply(id, &result)
        });
        self.call_ids.insert(handle.id(), req.id.clone());

        Ok(())
    }

    /// Wraps a tool result in a JSON-RPC reply.
    fn tool_call_reply(id: RequestId, result: &ToolCallResult) -> OutgoingMessage {
        match serde_json::to_value(result) {
            Ok(value) => OutgoingMessage::Response(JsonRpcResponse::success(id, value)),
            Err(e) => {
                tracing::error!(error = %e, "Failed to serialise tool call result");
                OutgoingMessage::Error(JsonRpcError::internal_error(
                    Some(id),
                    "failed to serialise tool call result",
                ))
            }
        }
    }

    /// Handles the ping request.
    fn handle_ping(req: &JsonRpcRequest) -> JsonRpcResponse {
        JsonRpcResponse::success(req.id.clone(), json!({}))
    }

    /// Ensures the server is in the Running state.
    fn require_running(&self, id: &RequestId) -> Result<(), JsonRpcError> {
        if self.state != ServerState::Running {
            return Err(JsonRpcError::invalid_request(
                Some(id.clone()),
                "Server not initialised",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::mcp::protocol::{parse_message, ErrorCode};

    fn server() -> McpServer {
        let config = Config::new(None, &json!({"demo": "abc123", "other": "k2"})).unwrap();
        McpServer::new(ToolRegistry::new(config))
    }

    fn send(server: &mut McpServer, line: &str) -> Option<Value> {
        server
            .handle_message(parse_message(line).unwrap())
            .map(|reply| serde_json::to_value(reply).unwrap())
    }

    fn initialise(server: &mut McpServer) {
        send(
            server,
            r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{"protocolVersion":"2024-11-05","capabilities":{},"clientInfo":{"name":"test","version":"1"}}}"#,
        )
        .unwrap();
        assert!(send(
            server,
            r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#
        )
        .is_none());
    }

    #[test]
    fn server_initial_state() {
        let server = server();
        assert_eq!(server.state(), ServerState::AwaitingInit);
        assert!(server.protocol_version().is_none());
    }

    #[test]
    fn initialize_negotiates_and_runs() {
        let mut server = server();
        let reply = send(
            &mut server,
            r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{"protocolVersion":"2024-11-05"}}"#,
        )
        .unwrap();

        assert_eq!(reply["result"]["protocolVersion"], MCP_PROTOCOL_VERSION);
        assert_eq!(reply["result"]["serverInfo"]["name"], SERVER_NAME);
        assert_eq!(server.state(), ServerState::Initialising);

        send(
            &mut server,
            r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#,
        );
        assert_eq!(server.state(), ServerState::Running);
    }

    #[test]
    fn second_initialize_is_rejected() {
        let mut server = server();
        initialise(&mut server);
        let reply = send(
            &mut server,
            r#"{"jsonrpc":"2.0","id":2,"method":"initialize","params":{"protocolVersion":"2024-11-05"}}"#,
        )
        .unwrap();
        assert_eq!(reply["error"]["code"], ErrorCode::InvalidRequest.code());
    }

    #[test]
    fn tools_list_requires_initialisation() {
        let mut server = server();
        let reply = send(&mut server, r#"{"jsonrpc":"2.0","id":3,"method":"tools/list"}"#).unwrap();
        assert_eq!(reply["error"]["message"], "Server not initialised");
    }

    #[test]
    fn tools_list_advertises_every_tool() {
        let mut server = server();
        initialise(&mut server);
        let reply = send(&mut server, r#"{"jsonrpc":"2.0","id":3,"method":"tools/list"}"#).unwrap();

        let names: Vec<_> = reply["result"]["tools"]
            .as_array()
            .unwrap()
            .iter()
            .map(|tool| tool["name"].as_str().unwrap().to_string())
            .collect();
        for expected in [
            "list_shows",
            "create_episode",
            "list_episodes",
            "schedule_episode",
            "modify_episode",
            "create_clip",
            "list_webhooks",
            "register_webhook",
            "delete_webhook",
            "test_webhook",
        ] {
            assert!(names.iter().any(|name| name == expected), "{expected}");
        }
        assert!(reply["result"]["tools"][0]["inputSchema"].is_object());
    }

    #[test]
    fn unknown_method_is_a_protocol_error() {
        let mut server = server();
        let reply = send(&mut server, r#"{"jsonrpc":"2.0","id":4,"method":"resources/list"}"#).unwrap();
        assert_eq!(reply["error"]["code"], ErrorCode::MethodNotFound.code());
    }

    #[test]
    fn ping_answers_before_initialisation() {
        let mut server = server();
        let reply = send(&mut server, r#"{"jsonrpc":"2.0","id":"p","method":"ping"}"#).unwrap();
        assert_eq!(reply["id"], "p");
        assert_eq!(reply["result"], json!({}));
    }

    #[tokio::test]
    async fn tools_call_reply_arrives_when_task_finishes() {
        let mut server = server();
        initialise(&mut server);

        let immediate = send(
            &mut server,
            r#"{"jsonrpc":"2.0","id":5,"method":"tools/call","params":{"name":"list_shows","arguments":{}}}"#,
        );
        assert!(immediate.is_none());

        let reply = serde_json::to_value(server.next_tool_reply().await.unwrap()).unwrap();
        assert_eq!(reply["id"], 5);
        assert_eq!(reply["result"]["content"][0]["text"], "demo\nother");
    }

    #[tokio::test]
    async fn unknown_show_is_text_not_protocol_error() {
        let mut server = server();
        initialise(&mut server);

        send(
            &mut server,
            r#"{"jsonrpc":"2.0","id":6,"method":"tools/call","params":{"name":"list_webhooks","arguments":{"show":"nope"}}}"#,
        );

        let reply = serde_json::to_value(server.next_tool_reply().await.unwrap()).unwrap();
        assert!(reply.get("error").is_none());
        let text = reply["result"]["content"][0]["text"].as_str().unwrap();
        assert!(text.starts_with("Error: Unknown show 'nope'"));
        assert!(!text.contains("abc123"));
    }

    #[test]
    fn tools_call_without_params_is_invalid() {
        let mut server = server();
        initialise(&mut server);
        let reply = send(&mut server, r#"{"jsonrpc":"2.0","id":7,"method":"tools/call"}"#).unwrap();
        assert_eq!(reply["error"]["code"], ErrorCode::InvalidParams.code());
    }

    async fn panicking_call() -> OutgoingMessage {
        panic!("handler bug")
    }

    #[tokio::test]
    async fn panicked_tool_call_still_gets_an_answer() {
        let mut server = server();
        let handle = server.tool_calls.spawn(panicking_call());
        server.call_ids.insert(handle.id(), RequestId::Number(9));

        let reply = serde_json::to_value(server.next_tool_reply().await.unwrap()).unwrap();
        assert_eq!(reply["id"], 9);
        assert_eq!(reply["error"]["code"], ErrorCode::InternalError.code());
        assert!(server.call_ids.is_empty());
        assert!(server.next_tool_reply().await.is_none());
    }

    #[tokio::test]
    async fn no_running_calls_means_no_reply() {
        let mut server = server();
        assert!(server.next_tool_reply().await.is_none());
    }
}
