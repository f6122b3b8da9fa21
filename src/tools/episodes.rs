//! Episode tools: create, list, get, schedule, modify and delete.

use serde::Deserialize;
use serde_json::{json, Value};

use super::{ShowArgs, Tool, ToolFuture, ToolRegistry};
use crate::podhome::{EpisodeQuery, Payload};

const SHOW_DESCRIPTION: &str = "One of the configured show slugs (see list_shows)";

const STATUS_DESCRIPTION: &str =
    "Status filter: 0=Draft, 1=Scheduled, 2=Published, 3=LivePending, 4=Live, 5=LiveEnded";

// ========== create_episode ==========

/// Arguments of `create_episode`.
#[derive(Debug, Deserialize)]
pub struct CreateEpisodeArgs {
    pub show: String,
    pub file_url: String,
    pub title: String,
    pub description: Option<String>,
    pub link: Option<String>,
    pub publish_date: Option<String>,
    pub use_podhome_ai: Option<bool>,
    pub suggest_chapters: Option<bool>,
    pub suggest_details: Option<bool>,
    pub suggest_clips: Option<bool>,
    pub enhance_audio: Option<bool>,
}

impl ShowArgs for CreateEpisodeArgs {
    fn show(&self) -> &str {
        &self.show
    }
}

impl CreateEpisodeArgs {
    /// Builds the request body; `show` is never sent.
    #[must_use]
    pub fn into_payload(self) -> Payload {
        Payload::new()
            .required("file_url", self.file_url)
            .required("title", self.title)
            .optional("description", self.description)
            .optional("link", self.link)
            .optional("publish_date", self.publish_date)
            .optional("use_podhome_ai", self.use_podhome_ai)
            .optional("suggest_chapters", self.suggest_chapters)
            .optional("suggest_details", self.suggest_details)
            .optional("suggest_clips", self.suggest_clips)
            .optional("enhance_audio", self.enhance_audio)
    }
}

pub const CREATE_EPISODE: Tool = Tool {
    name: "create_episode",
    description: "Create a new episode for a specific show from a publicly accessible media \
                  file URL. Optionally schedule publishing and run Podhome AI to generate a \
                  transcript, chapters, clips and title/description suggestions.",
    input_schema: create_episode_schema,
    handler: create_episode,
};

fn create_episode_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "show": { "type": "string", "description": SHOW_DESCRIPTION },
            "file_url": {
                "type": "string",
                "description": "Publicly accessible URL to the media file"
            },
            "title": { "type": "string", "description": "Episode title" },
            "description": {
                "type": "string",
                "description": "Optional episode description (can contain HTML)"
            },
            "link": {
                "type": "string",
                "description": "Optional canonical link for the episode"
            },
            "publish_date": {
                "type": "string",
                "description": "UTC ISO-8601 future date to schedule publishing"
            },
            "use_podhome_ai": {
                "type": "boolean",
                "description": "Run Podhome AI to generate transcript and artifacts"
            },
            "suggest_chapters": {
                "type": "boolean",
                "description": "Generate chapters (requires use_podhome_ai=true)"
            },
            "suggest_details": {
                "type": "boolean",
                "description": "Generate description and title suggestions (requires use_podhome_ai=true)"
            },
            "suggest_clips": {
                "type": "boolean",
                "description": "Generate clips (requires use_podhome_ai=true)"
            },
            "enhance_audio": {
                "type": "boolean",
                "description": "Run audio enhancement (paid feature)"
            }
        },
        "required": ["show", "file_url", "title"]
    })
}

fn create_episode(registry: &ToolRegistry, arguments: Value) -> ToolFuture<'_> {
    Box::pin(registry.invoke(
        "create_episode",
        arguments,
        |args: CreateEpisodeArgs, client| async move {
            client.create_episode(&args.into_payload()).await
        },
    ))
}

// ========== list_episodes / get_episode ==========

/// Arguments of `list_episodes`.
#[derive(Debug, Deserialize)]
pub struct ListEpisodesArgs {
    pub show: String,
    pub status: Option<i64>,
    pub include_transcript: Option<bool>,
    pub include_chapters: Option<bool>,
    pub include_downloads: Option<bool>,
    pub include_people: Option<bool>,
}

impl ShowArgs for ListEpisodesArgs {
    fn show(&self) -> &str {
        &self.show
    }
}

impl ListEpisodesArgs {
    /// Collects the supplied filters.
    #[must_use]
    pub const fn query(&self) -> EpisodeQuery {
        EpisodeQuery {
            status: self.status,
            include_transcript: self.include_transcript,
            include_chapters: self.include_chapters,
            include_downloads: self.include_downloads,
            include_people: self.include_people,
        }
    }
}

pub const LIST_EPISODES: Tool = Tool {
    name: "list_episodes",
    description: "List episodes for a specific show, optionally filtered by status and \
                  enriched with transcripts, chapters, download counts or people.",
    input_schema: list_episodes_schema,
    handler: list_episodes,
};

fn include_properties() -> serde_json::Map<String, Value> {
    let mut properties = serde_json::Map::new();
    for (name, what) in [
        ("include_transcript", "transcript"),
        ("include_chapters", "chapters"),
        ("include_downloads", "download counts"),
        ("include_people", "people"),
    ] {
        properties.insert(
            name.to_string(),
            json!({ "type": "boolean", "description": format!("Include {what} in response") }),
        );
    }
    properties
}

fn list_episodes_schema() -> Value {
    let mut properties = include_properties();
    properties.insert(
        "show".to_string(),
        json!({ "type": "string", "description": SHOW_DESCRIPTION }),
    );
    properties.insert(
        "status".to_string(),
        json!({
            "type": "integer",
            "minimum": 0,
            "maximum": 5,
            "description": STATUS_DESCRIPTION
        }),
    );

    json!({
        "type": "object",
        "properties": properties,
        "required": ["show"]
    })
}

fn list_episodes(registry: &ToolRegistry, arguments: Value) -> ToolFuture<'_> {
    Box::pin(registry.invoke(
        "list_episodes",
        arguments,
        |args: ListEpisodesArgs, client| async move { client.list_episodes(&args.query()).await },
    ))
}

/// Arguments of `get_episode`.
#[derive(Debug, Deserialize)]
pub struct GetEpisodeArgs {
    pub show: String,
    pub episode_id: String,
    pub include_transcript: Option<bool>,
    pub include_chapters: Option<bool>,
    pub include_downloads: Option<bool>,
    pub include_people: Option<bool>,
}

impl ShowArgs for GetEpisodeArgs {
    fn show(&self) -> &str {
        &self.show
    }
}

pub const GET_EPISODE: Tool = Tool {
    name: "get_episode",
    description: "Get detailed information about a single episode of a show.",
    input_schema: get_episode_schema,
    handler: get_episode,
};

fn get_episode_schema() -> Value {
    let mut properties = include_properties();
    properties.insert(
        "show".to_string(),
        json!({ "type": "string", "description": SHOW_DESCRIPTION }),
    );
    properties.insert(
        "episode_id".to_string(),
        json!({ "type": "string", "description": "ID of the episode" }),
    );

    json!({
        "type": "object",
        "properties": properties,
        "required": ["show", "episode_id"]
    })
}

fn get_episode(registry: &ToolRegistry, arguments: Value) -> ToolFuture<'_> {
    Box::pin(registry.invoke(
        "get_episode",
        arguments,
        |args: GetEpisodeArgs, client| async move {
            let query = EpisodeQuery {
                status: None,
                include_transcript: args.include_transcript,
                include_chapters: args.include_chapters,
                include_downloads: args.include_downloads,
                include_people: args.include_people,
            };
            client.get_episode(&args.episode_id, &query).await
        },
    ))
}

// ========== schedule_episode ==========

/// Arguments of `schedule_episode`.
#[derive(Debug, Deserialize)]
pub struct ScheduleEpisodeArgs {
    pub show: String,
    pub episode_id: String,
    pub publish_now: Option<bool>,
    pub publish_date: Option<String>,
}

impl ShowArgs for ScheduleEpisodeArgs {
    fn show(&self) -> &str {
        &self.show
    }
}

pub const SCHEDULE_EPISODE: Tool = Tool {
    name: "schedule_episode",
    description: "Schedule an episode for a future publish date, or publish it immediately.",
    input_schema: schedule_episode_schema,
    handler: schedule_episode,
};

fn schedule_episode_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "show": { "type": "string", "description": SHOW_DESCRIPTION },
            "episode_id": {
                "type": "string",
                "description": "The ID of the episode to schedule"
            },
            "publish_now": {
                "type": "boolean",
                "description": "Publish immediately (overrides publish_date)"
            },
            "publish_date": {
                "type": "string",
                "description": "Future UTC ISO-8601 publish date"
            }
        },
        "required": ["show", "episode_id"]
    })
}

fn schedule_episode(registry: &ToolRegistry, arguments: Value) -> ToolFuture<'_> {
    Box::pin(registry.invoke(
        "schedule_episode",
        arguments,
        |args: ScheduleEpisodeArgs, client| async move {
            let payload = Payload::new()
                .required("episode_id", args.episode_id)
                .optional("publish_now", args.publish_now)
                .optional("publish_date", args.publish_date);
            client.schedule_episode(&payload).await
        },
    ))
}

// ========== modify_episode ==========

/// Arguments of `modify_episode`.
#[derive(Debug, Deserialize)]
pub struct ModifyEpisodeArgs {
    pub show: String,
    pub episode_id: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub episode_nr: Option<i64>,
    pub season_nr: Option<i64>,
    pub image_url: Option<String>,
    pub image_data: Option<String>,
}

impl ShowArgs for ModifyEpisodeArgs {
    fn show(&self) -> &str {
        &self.show
    }
}

pub const MODIFY_EPISODE: Tool = Tool {
    name: "modify_episode",
    description: "Modify an episode's metadata. Only the fields supplied are changed.",
    input_schema: modify_episode_schema,
    handler: modify_episode,
};

fn modify_episode_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "show": { "type": "string", "description": SHOW_DESCRIPTION },
            "episode_id": {
                "type": "string",
                "description": "ID of the episode to modify"
            },
            "title": {
                "type": "string",
                "description": "New episode title (max 2048 chars)"
            },
            "description": {
                "type": "string",
                "description": "New description (can contain HTML)"
            },
            "episode_nr": {
                "type": "integer",
                "description": "Episode number (must be > 0)"
            },
            "season_nr": {
                "type": "integer",
                "description": "Season number (must be > 0)"
            },
            "image_url": {
                "type": "string",
                "description": "Image URL (public HTTP/HTTPS)"
            },
            "image_data": {
                "type": "string",
                "description": "Base64 encoded image data"
            }
        },
        "required": ["show", "episode_id"]
    })
}

fn modify_episode(registry: &ToolRegistry, arguments: Value) -> ToolFuture<'_> {
    Box::pin(registry.invoke(
        "modify_episode",
        arguments,
        |args: ModifyEpisodeArgs, client| async move {
            let payload = Payload::new()
                .required("episode_id", args.episode_id)
                .optional("title", args.title)
                .optional("description", args.description)
                .optional("episode_nr", args.episode_nr)
                .optional("season_nr", args.season_nr)
                .optional("image_url", args.image_url)
                .optional("image_data", args.image_data);
            client.modify_episode(&payload).await
        },
    ))
}

// ========== delete_episode ==========

/// Arguments of `delete_episode`.
#[derive(Debug, Deserialize)]
pub struct DeleteEpisodeArgs {
    pub show: String,
    pub episode_id: String,
}

impl ShowArgs for DeleteEpisodeArgs {
    fn show(&self) -> &str {
        &self.show
    }
}

pub const DELETE_EPISODE: Tool = Tool {
    name: "delete_episode",
    description: "Delete an episode from a show. This cannot be undone.",
    input_schema: delete_episode_schema,
    handler: delete_episode,
};

fn delete_episode_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "show": { "type": "string", "description": SHOW_DESCRIPTION },
            "episode_id": {
                "type": "string",
                "description": "ID of the episode to delete"
            }
        },
        "required": ["show", "episode_id"]
    })
}

fn delete_episode(registry: &ToolRegistry, arguments: Value) -> ToolFuture<'_> {
    Box::pin(registry.invoke(
        "delete_episode",
        arguments,
        |args: DeleteEpisodeArgs, client| async move {
            // The endpoint answers with an empty body on success
            client
                .delete_episode(&args.episode_id)
                .await
                .map(|response| {
                    if response.is_null() {
                        json!({ "status": "deleted", "episode_id": args.episode_id })
                    } else {
                        response
                    }
                })
        },
    ))
}
