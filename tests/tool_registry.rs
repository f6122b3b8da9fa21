//! End-to-end tool tests against a stubbed Podhome API.

use podhome_mcp::config::Config;
use podhome_mcp::mcp::protocol::ToolCallResult;
use podhome_mcp::tools::ToolRegistry;
use serde_json::{json, Value};
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn registry(base_url: &str, shows: Value) -> ToolRegistry {
    ToolRegistry::new(Config::new(Some(base_url), &shows).unwrap())
}

fn text(result: &ToolCallResult) -> String {
    result.as_text()
}

fn is_error(result: &ToolCallResult) -> bool {
    serde_json::to_value(result).unwrap()["isError"] == true
}

// =============================================================================
// Episodes
// =============================================================================

#[tokio::test]
async fn list_episodes_filters_by_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/episodes"))
        .and(query_param("status", "2"))
        .and(header("X-API-KEY", "abc123"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([{"episode_id": "e1", "title": "Hi"}])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let registry = registry(&server.uri(), json!({"demo": "abc123"}));
    let result = registry
        .call("list_episodes", json!({"show": "demo", "status": 2}))
        .await;

    assert!(!is_error(&result), "{}", text(&result));
    let rendered: Value = serde_json::from_str(&text(&result)).unwrap();
    assert_eq!(rendered[0]["episode_id"], "e1");
}

#[tokio::test]
async fn list_episodes_without_filters_sends_no_query() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/episodes"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let registry = registry(&server.uri(), json!({"demo": "abc123"}));
    let result = registry.call("list_episodes", json!({"show": "demo"})).await;
    assert_eq!(text(&result), "[]");

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests[0].url.query(), None);
}

#[tokio::test]
async fn create_episode_sends_only_supplied_fields() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/createepisode"))
        .and(header("X-API-KEY", "key1"))
        .and(body_json(json!({
            "file_url": "https://cdn.example/ep.mp3",
            "title": "Pilot"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"episode_id": "new"})))
        .expect(1)
        .mount(&server)
        .await;

    let registry = registry(&server.uri(), json!({"show1": "key1", "show2": "key2"}));
    let result = registry
        .call(
            "create_episode",
            json!({
                "show": "show1",
                "file_url": "https://cdn.example/ep.mp3",
                "title": "Pilot"
            }),
        )
        .await;

    assert!(text(&result).contains("\"episode_id\": \"new\""));
}

#[tokio::test]
async fn create_episode_keeps_explicit_false() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/createepisode"))
        .and(body_json(json!({
            "file_url": "https://cdn.example/ep.mp3",
            "title": "Pilot",
            "use_podhome_ai": false
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let registry = registry(&server.uri(), json!({"demo": "abc123"}));
    let result = registry
        .call(
            "create_episode",
            json!({
                "show": "demo",
                "file_url": "https://cdn.example/ep.mp3",
                "title": "Pilot",
                "use_podhome_ai": false
            }),
        )
        .await;
    assert!(!is_error(&result), "{}", text(&result));
}

#[tokio::test]
async fn modify_episode_keeps_zero_numbers() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/modify_episode"))
        .and(body_json(json!({"episode_id": "e1", "season_nr": 0})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .expect(1)
        .mount(&server)
        .await;

    let registry = registry(&server.uri(), json!({"demo": "abc123"}));
    let result = registry
        .call(
            "modify_episode",
            json!({"show": "demo", "episode_id": "e1", "season_nr": 0}),
        )
        .await;
    assert!(!is_error(&result), "{}", text(&result));
}

#[tokio::test]
async fn get_episode_uses_path_and_include_flags() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/episode/e42"))
        .and(query_param("includeChapters", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"episode_id": "e42"})))
        .expect(1)
        .mount(&server)
        .await;

    let registry = registry(&server.uri(), json!({"demo": "abc123"}));
    let result = registry
        .call(
            "get_episode",
            json!({"show": "demo", "episode_id": "e42", "include_chapters": true}),
        )
        .await;
    assert!(text(&result).contains("e42"));
}

#[tokio::test]
async fn delete_episode_with_empty_body_reports_deletion() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/deleteepisode/e7"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let registry = registry(&server.uri(), json!({"demo": "abc123"}));
    let result = registry
        .call("delete_episode", json!({"show": "demo", "episode_id": "e7"}))
        .await;

    let rendered: Value = serde_json::from_str(&text(&result)).unwrap();
    assert_eq!(rendered, json!({"status": "deleted", "episode_id": "e7"}));
}

#[tokio::test]
async fn schedule_episode_publishes_now() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/schedule_episode"))
        .and(header("X-API-KEY", "key2"))
        .and(body_json(json!({"episode_id": "e3", "publish_now": true})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": 2})))
        .expect(1)
        .mount(&server)
        .await;

    let registry = registry(&server.uri(), json!({"show1": "key1", "show2": "key2"}));
    let result = registry
        .call(
            "schedule_episode",
            json!({"show": "show2", "episode_id": "e3", "publish_now": true}),
        )
        .await;
    assert!(!is_error(&result), "{}", text(&result));
}

// =============================================================================
// Clips and webhooks
// =============================================================================

#[tokio::test]
async fn create_clip_sends_every_field() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/createclip"))
        .and(body_json(json!({
            "episode_id": "e1",
            "title": "Best bit",
            "start_time": 12.5,
            "duration": 30.0
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"clip_id": "c1"})))
        .expect(1)
        .mount(&server)
        .await;

    let registry = registry(&server.uri(), json!({"demo": "abc123"}));
    let result = registry
        .call(
            "create_clip",
            json!({
                "show": "demo",
                "episode_id": "e1",
                "title": "Best bit",
                "start_time": 12.5,
                "duration": 30.0
            }),
        )
        .await;
    assert!(text(&result).contains("c1"));
}

#[tokio::test]
async fn register_webhook_posts_url_and_action() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/hook"))
        .and(body_json(json!({
            "url": "https://hooks.example/podhome",
            "action_type": "episode_published"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"integration_id": "int-1"})))
        .expect(1)
        .mount(&server)
        .await;

    let registry = registry(&server.uri(), json!({"demo": "abc123"}));
    let result = registry
        .call(
            "register_webhook",
            json!({
                "show": "demo",
                "url": "https://hooks.example/podhome",
                "action_type": "episode_published"
            }),
        )
        .await;
    assert!(text(&result).contains("int-1"));
}

#[tokio::test]
async fn delete_webhook_sends_id_in_body() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/hook"))
        .and(body_json(json!({"integration_id": "int-9"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"deleted": true})))
        .expect(1)
        .mount(&server)
        .await;

    let registry = registry(&server.uri(), json!({"demo": "abc123"}));
    let result = registry
        .call(
            "delete_webhook",
            json!({"show": "demo", "integration_id": "int-9"}),
        )
        .await;
    assert!(!is_error(&result), "{}", text(&result));
}

#[tokio::test]
async fn test_webhook_without_id_posts_empty_object() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/hooktest"))
        .and(body_json(json!({})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"sent": 2})))
        .expect(1)
        .mount(&server)
        .await;

    let registry = registry(&server.uri(), json!({"demo": "abc123"}));
    let result = registry.call("test_webhook", json!({"show": "demo"})).await;
    assert!(text(&result).contains("\"sent\": 2"));
}

// =============================================================================
// Failures
// =============================================================================

#[tokio::test]
async fn unknown_show_makes_no_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let registry = registry(&server.uri(), json!({"a": "k1"}));
    let result = registry.call("list_webhooks", json!({"show": "b"})).await;

    assert!(is_error(&result));
    assert_eq!(
        text(&result),
        r#"Error: Unknown show 'b'. Configured shows: ["a"]"#
    );
    assert!(!text(&result).contains("k1"));
}

#[tokio::test]
async fn http_error_status_is_reported_with_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/hook"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let registry = registry(&server.uri(), json!({"demo": "abc123"}));
    let result = registry.call("list_webhooks", json!({"show": "demo"})).await;

    assert!(is_error(&result));
    let message = text(&result);
    assert!(message.starts_with("Error: HTTP 500"), "{message}");
    assert!(message.contains("boom"));
    assert!(!message.contains("abc123"));
}

#[tokio::test]
async fn invalid_json_response_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/hook"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
        .mount(&server)
        .await;

    let registry = registry(&server.uri(), json!({"demo": "abc123"}));
    let result = registry.call("list_webhooks", json!({"show": "demo"})).await;

    assert!(text(&result).starts_with("Error: invalid JSON in response"));
}

#[tokio::test]
async fn unreachable_service_is_an_error() {
    let registry = registry("http://127.0.0.1:1", json!({"demo": "abc123"}));
    let result = registry.call("list_webhooks", json!({"show": "demo"})).await;

    assert!(is_error(&result));
    assert!(text(&result).starts_with("Error: request to"), "{}", text(&result));
}

// =============================================================================
// Registry-only tools
// =============================================================================

#[test]
fn list_shows_needs_no_service() {
    let registry = registry("http://127.0.0.1:1", json!({"demo": "abc123"}));
    let result = tokio_test::block_on(registry.call("list_shows", json!({})));
    assert_eq!(text(&result), "demo");
    assert!(!is_error(&result));
}

#[test]
fn unknown_tool_is_an_error_result() {
    let registry = registry("http://127.0.0.1:1", json!({"demo": "abc123"}));
    let result = tokio_test::block_on(registry.call("rename_show", json!({})));
    assert!(is_error(&result));
    assert_eq!(text(&result), "Error: Unknown tool: rename_show");
}
