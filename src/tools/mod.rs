//! Tool registry: the Podhome operations exposed to MCP clients.
//!
//! Every tool follows the same contract:
//!
//! 1. Decode the arguments into the tool's typed argument struct
//! 2. Resolve the show's API key
//! 3. Build a payload holding only the fields the caller supplied
//! 4. Make exactly one API call with a client built for this invocation
//! 5. Return the response as pretty-printed JSON text
//!
//! Any failure along the way is logged and returned as `Error: <message>`
//! text. Tool calls never fail at the protocol level.

pub mod clips;
pub mod episodes;
pub mod shows;
pub mod webhooks;

use std::error::Error as _;
use std::future::Future;
use std::pin::Pin;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::config::Config;
use crate::error::ToolError;
use crate::mcp::protocol::{ToolCallResult, ToolDefinition};
use crate::podhome::PodhomeClient;

/// Boxed future returned by a tool handler.
pub type ToolFuture<'a> = Pin<Box<dyn Future<Output = ToolCallResult> + Send + 'a>>;

/// Signature shared by all tool handlers.
pub type ToolHandler = for<'a> fn(&'a ToolRegistry, Value) -> ToolFuture<'a>;

/// A registered tool.
#[derive(Clone, Copy)]
pub struct Tool {
    /// Unique tool name.
    pub name: &'static str,
    /// Description shown to the calling agent.
    pub description: &'static str,
    /// Builds the JSON Schema of the tool's arguments.
    pub input_schema: fn() -> Value,
    /// Executes the tool.
    pub handler: ToolHandler,
}

impl Tool {
    /// Returns the MCP definition advertised in `tools/list`.
    #[must_use]
    pub fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name.to_string(),
            description: Some(self.description.to_string()),
            input_schema: (self.input_schema)(),
        }
    }
}

/// Every tool the server exposes, in advertised order.
pub static TOOLS: &[Tool] = &[
    shows::LIST_SHOWS,
    episodes::CREATE_EPISODE,
    episodes::LIST_EPISODES,
    episodes::GET_EPISODE,
    episodes::SCHEDULE_EPISODE,
    episodes::MODIFY_EPISODE,
    episodes::DELETE_EPISODE,
    clips::CREATE_CLIP,
    webhooks::LIST_WEBHOOKS,
    webhooks::REGISTER_WEBHOOK,
    webhooks::DELETE_WEBHOOK,
    webhooks::TEST_WEBHOOK,
];

/// Arguments of a tool that acts on behalf of one show.
pub trait ShowArgs: DeserializeOwned {
    /// The show identifier the call is scoped to.
    fn show(&self) -> &str;
}

/// Dispatches tool calls against the loaded configuration.
#[derive(Debug)]
pub struct ToolRegistry {
    config: Config,
}

impl ToolRegistry {
    /// Creates a registry over a validated configuration.
    #[must_use]
    pub const fn new(config: Config) -> Self {
        Self { config }
    }

    /// Returns the configuration the registry was built with.
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Returns the MCP definitions of every tool.
    #[must_use]
    pub fn definitions() -> Vec<ToolDefinition> {
        TOOLS.iter().map(Tool::definition).collect()
    }

    /// Looks up a tool by name.
    #[must_use]
    pub fn find(name: &str) -> Option<&'static Tool> {
        TOOLS.iter().find(|tool| tool.name == name)
    }

    /// Calls the named tool.
    ///
    /// Unknown tool names produce an error result.
    pub async fn call(&self, name: &str, arguments: Value) -> ToolCallResult {
        match Self::find(name) {
            Some(tool) => (tool.handler)(self, arguments).await,
            None => failure(name, None, &ToolError::UnknownTool(name.to_string())),
        }
    }

    /// Runs one show-scoped API call and renders its outcome as text.
    ///
    /// `call` receives the decoded arguments and a client authenticated
    /// for the show. The client is dropped when `call` completes.
    pub(crate) async fn invoke<A, F, Fut>(
        &self,
        tool: &'static str,
        arguments: Value,
        call: F,
    ) -> ToolCallResult
    where
        A: ShowArgs + Send,
        F: FnOnce(A, PodhomeClient) -> Fut + Send,
        Fut: Future<Output = Result<Value, ToolError>> + Send,
    {
        let args: A = match decode_arguments(arguments) {
            Ok(args) => args,
            Err(e) => return failure(tool, None, &e),
        };
        let show = args.show().to_string();

        tracing::info!(tool, show = %show, "Calling tool");

        match self.dispatch(&show, args, call).await {
            Ok(value) => {
                tracing::debug!(tool, show = %show, "Tool call succeeded");
                ToolCallResult::text(render(&value))
            }
            Err(e) => failure(tool, Some(&show), &e),
        }
    }

    /// Resolves the show's key, builds its client and makes the call.
    async fn dispatch<A, F, Fut>(&self, show: &str, args: A, call: F) -> Result<Value, ToolError>
    where
        F: FnOnce(A, PodhomeClient) -> Fut,
        Fut: Future<Output = Result<Value, ToolError>>,
    {
        let api_key = self.config.shows.resolve(show)?;
        let client = PodhomeClient::new(api_key, &self.config.base_url)?;
        call(args, client).await
    }
}

/// Decodes tool arguments. Missing arguments decode as an empty object.
fn decode_arguments<A: DeserializeOwned>(arguments: Value) -> Result<A, ToolError> {
    let arguments = if arguments.is_null() {
        Value::Object(serde_json::Map::new())
    } else {
        arguments
    };
    serde_json::from_value(arguments).map_err(ToolError::InvalidArguments)
}

/// Renders a decoded API response for the calling agent.
fn render(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

/// Logs a failed tool call with its full error chain and converts it to
/// the text returned to the caller.
fn failure(tool: &str, show: Option<&str>, error: &ToolError) -> ToolCallResult {
    let mut causes = Vec::new();
    let mut source = error.source();
    while let Some(cause) = source {
        causes.push(cause.to_string());
        source = cause.source();
    }

    tracing::error!(
        tool,
        show = show.unwrap_or("<none>"),
        error = %error,
        causes = ?causes,
        details = ?error,
        "Tool call failed"
    );

    ToolCallResult::error(format!("Error: {error}"))
}
