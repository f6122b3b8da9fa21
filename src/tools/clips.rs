//! Clip (soundbite) tools.

use serde::Deserialize;
use serde_json::{json, Value};

use super::{ShowArgs, Tool, ToolFuture, ToolRegistry};
use crate::podhome::Payload;

/// Arguments of `create_clip`.
#[derive(Debug, Deserialize)]
pub struct CreateClipArgs {
    pub show: String,
    pub episode_id: String,
    pub title: String,
    /// Start offset in seconds, may be fractional.
    pub start_time: f64,
    /// Length in seconds, may be fractional.
    pub duration: f64,
}

impl ShowArgs for CreateClipArgs {
    fn show(&self) -> &str {
        &self.show
    }
}

pub const CREATE_CLIP: Tool = Tool {
    name: "create_clip",
    description: "Create a clip (soundbite) from an episode, given a start time and a \
                  duration in seconds.",
    input_schema: create_clip_schema,
    handler: create_clip,
};

fn create_clip_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "show": {
                "type": "string",
                "description": "One of the configured show slugs (see list_shows)"
            },
            "episode_id": { "type": "string", "description": "ID of the episode to clip" },
            "title": { "type": "string", "description": "Title of the clip" },
            "start_time": {
                "type": "number",
                "description": "Start time in seconds (can be fractional)"
            },
            "duration": {
                "type": "number",
                "description": "Duration in seconds (can be fractional)"
            }
        },
        "required": ["show", "episode_id", "title", "start_time", "duration"]
    })
}

fn create_clip(registry: &ToolRegistry, arguments: Value) -> ToolFuture<'_> {
    Box::pin(registry.invoke(
        "create_clip",
        arguments,
        |args: CreateClipArgs, client| async move {
            let payload = Payload::new()
                .required("episode_id", args.episode_id)
                .required("title", args.title)
                .required("start_time", args.start_time)
                .required("duration", args.duration);
            client.create_clip(&payload).await
        },
    ))
}
