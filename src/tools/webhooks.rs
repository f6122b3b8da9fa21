//! Webhook (integration) tools.

use serde::Deserialize;
use serde_json::{json, Value};

use super::{ShowArgs, Tool, ToolFuture, ToolRegistry};
use crate::podhome::Payload;

const SHOW_DESCRIPTION: &str = "One of the configured show slugs (see list_shows)";

/// Event types a webhook can subscribe to.
pub const ACTION_TYPES: [&str; 2] = ["episode_published", "episode_live"];

/// Arguments of `list_webhooks`.
#[derive(Debug, Deserialize)]
pub struct ListWebhooksArgs {
    pub show: String,
}

impl ShowArgs for ListWebhooksArgs {
    fn show(&self) -> &str {
        &self.show
    }
}

/// Arguments of `register_webhook`.
#[derive(Debug, Deserialize)]
pub struct RegisterWebhookArgs {
    pub show: String,
    pub url: String,
    pub action_type: String,
}

impl ShowArgs for RegisterWebhookArgs {
    fn show(&self) -> &str {
        &self.show
    }
}

/// Arguments of `delete_webhook`.
#[derive(Debug, Deserialize)]
pub struct DeleteWebhookArgs {
    pub show: String,
    pub integration_id: String,
}

impl ShowArgs for DeleteWebhookArgs {
    fn show(&self) -> &str {
        &self.show
    }
}

/// Arguments of `test_webhook`.
#[derive(Debug, Deserialize)]
pub struct TestWebhookArgs {
    pub show: String,
    pub integration_id: Option<String>,
}

impl ShowArgs for TestWebhookArgs {
    fn show(&self) -> &str {
        &self.show
    }
}

impl TestWebhookArgs {
    /// An absent or empty integration ID tests every webhook.
    #[must_use]
    pub fn into_payload(self) -> Payload {
        Payload::new().optional(
            "integration_id",
            self.integration_id.filter(|id| !id.is_empty()),
        )
    }
}

pub const LIST_WEBHOOKS: Tool = Tool {
    name: "list_webhooks",
    description: "List all registered webhooks for a specific show.",
    input_schema: list_webhooks_schema,
    handler: list_webhooks,
};

pub const REGISTER_WEBHOOK: Tool = Tool {
    name: "register_webhook",
    description: "Register a webhook that Podhome calls when an episode is published or \
                  goes live.",
    input_schema: register_webhook_schema,
    handler: register_webhook,
};

pub const DELETE_WEBHOOK: Tool = Tool {
    name: "delete_webhook",
    description: "Delete a registered webhook.",
    input_schema: delete_webhook_schema,
    handler: delete_webhook,
};

pub const TEST_WEBHOOK: Tool = Tool {
    name: "test_webhook",
    description: "Test webhooks. The webhook is called with data from the latest published \
                  or live episode. Omit integration_id to test all webhooks.",
    input_schema: test_webhook_schema,
    handler: test_webhook,
};

fn list_webhooks_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "show": { "type": "string", "description": SHOW_DESCRIPTION }
        },
        "required": ["show"]
    })
}

fn register_webhook_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "show": { "type": "string", "description": SHOW_DESCRIPTION },
            "url": { "type": "string", "description": "Webhook endpoint URL" },
            "action_type": {
                "type": "string",
                "enum": ACTION_TYPES,
                "description": "Event that triggers the webhook"
            }
        },
        "required": ["show", "url", "action_type"]
    })
}

fn delete_webhook_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "show": { "type": "string", "description": SHOW_DESCRIPTION },
            "integration_id": {
                "type": "string",
                "description": "The ID of the webhook to delete"
            }
        },
        "required": ["show", "integration_id"]
    })
}

fn test_webhook_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "show": { "type": "string", "description": SHOW_DESCRIPTION },
            "integration_id": {
                "type": "string",
                "description": "Optional specific webhook ID to test"
            }
        },
        "required": ["show"]
    })
}

fn list_webhooks(registry: &ToolRegistry, arguments: Value) -> ToolFuture<'_> {
    Box::pin(registry.invoke(
        "list_webhooks",
        arguments,
        |_: ListWebhooksArgs, client| async move { client.list_webhooks().await },
    ))
}

fn register_webhook(registry: &ToolRegistry, arguments: Value) -> ToolFuture<'_> {
    Box::pin(registry.invoke(
        "register_webhook",
        arguments,
        |args: RegisterWebhookArgs, client| async move {
            let payload = Payload::new()
                .required("url", args.url)
                .required("action_type", args.action_type);
            client.register_webhook(&payload).await
        },
    ))
}

fn delete_webhook(registry: &ToolRegistry, arguments: Value) -> ToolFuture<'_> {
    Box::pin(registry.invoke(
        "delete_webhook",
        arguments,
        |args: DeleteWebhookArgs, client| async move {
            let payload = Payload::new().required("integration_id", args.integration_id);
            client.delete_webhook(&payload).await
        },
    ))
}

fn test_webhook(registry: &ToolRegistry, arguments: Value) -> ToolFuture<'_> {
    Box::pin(registry.invoke(
        "test_webhook",
        arguments,
        |args: TestWebhookArgs, client| async move {
            client.test_webhook(&args.into_payload()).await
        },
    ))
}
