//! Tool surface for the chat assistant
//!
//! JSON-schema tool definitions plus a name-based dispatcher. The agent
//! runtime hands tool calls to [`dispatch_tool`] together with the caller's
//! identity.

mod context;
mod definitions;
mod dispatch;

use serde_json::Value;

pub use context::{scope_guidance, ToolScope};
pub use dispatch::dispatch_tool;

/// Every tool definition, read tools first
pub fn tool_definitions() -> Vec<Value> {
    let mut tools = definitions::read_definitions();
    tools.extend(definitions::write_definitions());
    tools
}
