//! podhome-mcp: MCP server for the Podhome podcast-hosting API
//!
//! Exposes Podhome's episode, clip and webhook operations as MCP tools over
//! stdio. One server manages several shows, each authenticated with its own
//! API key.
//!
//! # Architecture
//!
//! - **Configuration**: show-to-key mapping and API base URL, validated once
//!   at startup
//! - **Podhome client**: one authenticated HTTP client per tool invocation
//! - **Tools**: typed arguments, sparse request payloads, JSON text results
//!
//! # Modules
//!
//! - [`config`]: Configuration loading and validation
//! - [`error`]: Error types
//! - [`mcp`]: MCP protocol implementation
//! - [`podhome`]: Podhome REST API client
//! - [`tools`]: Tool table and dispatch

pub mod config;
pub mod error;
pub mod mcp;
pub mod podhome;
pub mod tools;
