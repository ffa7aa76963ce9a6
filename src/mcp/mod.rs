//! Tool server speaking JSON-RPC over stdio.
//!
//! [`McpServer`] publishes the presentation and archive operations as tools
//! (see [`tools::tool_definitions`]) and answers `initialize`, `ping`,
//! `tools/list` and `tools/call`.

pub mod protocol;
pub mod server;
pub mod tools;

pub use protocol::{Content, JsonRpcRequest, JsonRpcResponse, ToolResult, PROTOCOL_VERSION};
pub use server::McpServer;
pub use tools::{call_tool, tool_definitions, ToolDefinition};
