//! Show listing. Answered from configuration without calling the API.

use serde_json::{json, Value};

use super::{Tool, ToolFuture, ToolRegistry};
use crate::mcp::protocol::ToolCallResult;

pub const LIST_SHOWS: Tool = Tool {
    name: "list_shows",
    description: "List all configured Podhome show slugs, one per line. Use one of these as \
                  the `show` argument of the other tools.",
    input_schema: list_shows_schema,
    handler: list_shows,
};

fn list_shows_schema() -> Value {
    json!({
        "type": "object",
        "properties": {}
    })
}

fn list_shows(registry: &ToolRegistry, _arguments: Value) -> ToolFuture<'_> {
    let names = registry.config().shows.names().collect::<Vec<_>>().join("\n");
    Box::pin(async move { ToolCallResult::text(names) })
}
