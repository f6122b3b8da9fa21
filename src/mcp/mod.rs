//! Model Context Protocol (MCP) server implementation.
//!
//! Exposes the Podhome API as tools to AI assistants. The server
//! communicates over stdio transport using JSON-RPC 2.0 messages.
//!
//! # Architecture
//!
//! ```text
//!  stdin ──▶ Transport ──▶ Server ──spawn──▶ ToolRegistry::call
//!                            ▲                      │
//!                            └──── reply channel ◀──┘
//!  stdout ◀── Transport ◀────┘
//! ```
//!
//! # Protocol Version
//!
//! This implementation targets MCP protocol version 2024-11-05.

pub mod protocol;
pub mod server;
pub mod transport;

pub use protocol::{
    JsonRpcError, JsonRpcRequest, JsonRpcResponse, OutgoingMessage, ToolCallResult,
    MCP_PROTOCOL_VERSION,
};
pub use server::McpServer;
pub use transport::StdioTransport;
