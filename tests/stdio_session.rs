//! Drives the built server binary over stdio.

use std::io::{BufRead, BufReader, Write};
use std::process::{Child, ChildStdin, Command, Stdio};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use serde_json::{json, Value};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const REPLY_TIMEOUT: Duration = Duration::from_secs(10);

struct Session {
    child: Child,
    stdin: Option<ChildStdin>,
    replies: mpsc::Receiver<Value>,
}

impl Session {
    fn start(base_url: &str) -> Self {
        let mut child = Command::new(env!("CARGO_BIN_EXE_podhome-mcp"))
            .env("PODHOME_SHOWS", r#"{"demo":"abc123"}"#)
            .env("PODHOME_BASE_URL", base_url)
            .env_remove("RUST_LOG")
            .arg("--quiet")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .unwrap();

        let stdin = child.stdin.take().unwrap();
        let stdout = child.stdout.take().unwrap();
        let (tx, replies) = mpsc::channel();
        thread::spawn(move || {
            for line in BufReader::new(stdout).lines() {
                let Ok(line) = line else { break };
                let Ok(value) = serde_json::from_str(&line) else { break };
                if tx.send(value).is_err() {
                    break;
                }
            }
        });

        Self {
            child,
            stdin: Some(stdin),
            replies,
        }
    }

    fn send_raw(&mut self, bytes: &str) {
        let stdin = self.stdin.as_mut().unwrap();
        stdin.write_all(bytes.as_bytes()).unwrap();
        stdin.flush().unwrap();
    }

    fn send(&mut self, message: &Value) {
        self.send_raw(&format!("{message}\n"));
    }

    fn close_stdin(&mut self) {
        drop(self.stdin.take());
    }

    fn reply(&self) -> Value {
        self.replies.recv_timeout(REPLY_TIMEOUT).unwrap()
    }

    fn initialise(&mut self) {
        self.send(&json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "initialize",
            "params": {"protocolVersion": "2024-11-05", "capabilities": {}}
        }));
        assert_eq!(self.reply()["id"], 1);
        self.send(&json!({"jsonrpc": "2.0", "method": "notifications/initialized"}));
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

#[tokio::test]
async fn request_split_around_a_tool_reply_is_answered() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/hook"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([]))
                .set_delay(Duration::from_millis(300)),
        )
        .mount(&server)
        .await;

    let mut session = Session::start(&server.uri());
    session.initialise();

    session.send(&json!({
        "jsonrpc": "2.0",
        "id": 2,
        "method": "tools/call",
        "params": {"name": "list_webhooks", "arguments": {"show": "demo"}}
    }));
    // The tool reply lands while this request is half written
    session.send_raw(r#"{"jsonrpc":"2.0","id":3,"#);
    thread::sleep(Duration::from_millis(600));
    session.send_raw("\"method\":\"ping\"}\n");

    let mut replies = [session.reply(), session.reply()];
    replies.sort_by_key(|reply| reply["id"].as_i64());

    assert_eq!(replies[0]["id"], 2);
    assert_eq!(replies[0]["result"]["content"][0]["text"], "[]");
    assert_eq!(replies[1]["id"], 3);
    assert_eq!(replies[1]["result"], json!({}));
}

#[tokio::test]
async fn running_tool_call_is_answered_after_stdin_closes() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/hook"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([{"integration_id": "int-1"}]))
                .set_delay(Duration::from_millis(200)),
        )
        .mount(&server)
        .await;

    let mut session = Session::start(&server.uri());
    session.initialise();
    session.send(&json!({
        "jsonrpc": "2.0",
        "id": 7,
        "method": "tools/call",
        "params": {"name": "list_webhooks", "arguments": {"show": "demo"}}
    }));

    session.close_stdin();

    let reply = session.reply();
    assert_eq!(reply["id"], 7);
    assert!(reply["result"]["content"][0]["text"]
        .as_str()
        .unwrap()
        .contains("int-1"));
}
