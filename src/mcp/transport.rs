//! stdio transport for MCP server.
//!
//! - Messages are UTF-8 encoded JSON-RPC, one per line
//! - Messages must not contain embedded newlines
//! - stdin: receives messages from client
//! - stdout: sends messages to client
//! - stderr: logging only (never MCP messages)
//!
//! Only the server loop owns the transport. Tool calls running on other
//! tasks hand their replies back as [`OutgoingMessage`] values.

use std::io;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWriteExt, BufReader};

use crate::mcp::protocol::OutgoingMessage;

/// Splits a byte stream into lines.
///
/// Bytes of an unfinished line are kept between calls, so a pending
/// [`next_line`](Self::next_line) can be dropped (for example when it loses
/// a `select!` race) without losing input.
pub struct LineReader<R> {
    inner: R,
    pending: Vec<u8>,
}

impl<R: AsyncBufRead + Unpin> LineReader<R> {
    /// Wraps a buffered reader.
    pub const fn new(inner: R) -> Self {
        Self {
            inner,
            pending: Vec::new(),
        }
    }

    /// Reads the next line, without its line ending.
    ///
    /// Returns `None` at EOF. A final line without a trailing newline is
    /// still returned.
    ///
    /// # Errors
    ///
    /// Returns an error if reading fails or the line is not valid UTF-8.
    pub async fn next_line(&mut self) -> io::Result<Option<String>> {
        // read_until appends to `pending`, so partial reads survive cancellation
        let read = self.inner.read_until(b'\n', &mut self.pending).await?;
        if read == 0 && self.pending.is_empty() {
            return Ok(None);
        }

        let mut line = String::from_utf8(std::mem::take(&mut self.pending))
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        let trimmed = line.trim_end_matches(['\n', '\r']).len();
        line.truncate(trimmed);

        Ok(Some(line))
    }
}

/// A stdio-based MCP transport.
pub struct StdioTransport {
    /// Line reader over stdin.
    lines: LineReader<BufReader<tokio::io::Stdin>>,
    /// Handle for stdout.
    writer: tokio::io::Stdout,
}

impl StdioTransport {
    /// Creates a new stdio transport.
    #[must_use]
    pub fn new() -> Self {
        Self {
            lines: LineReader::new(BufReader::new(tokio::io::stdin())),
            writer: tokio::io::stdout(),
        }
    }

    /// Reads the next message line from stdin.
    ///
    /// Returns `None` if stdin is closed (EOF). Safe to cancel.
    ///
    /// # Errors
    ///
    /// Returns an error if reading from stdin fails.
    pub async fn read_line(&mut self) -> io::Result<Option<String>> {
        self.lines.next_line().await
    }

    /// Serialises a message and writes it to stdout as one line.
    ///
    /// # Errors
    ///
    /// Returns an error if serialisation or writing fails.
    pub async fn write_message(&mut self, message: &OutgoingMessage) -> io::Result<()> {
        let json = encode_line(message)?;

        self.writer.write_all(json.as_bytes()).await?;
        self.writer.write_all(b"\n").await?;
        self.writer.flush().await
    }
}

impl Default for StdioTransport {
    fn default() -> Self {
        Self::new()
    }
}

/// Encodes a message as single-line JSON.
fn encode_line(message: &OutgoingMessage) -> io::Result<String> {
    let json = serde_json::to_string(message)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

    // stdio framing forbids embedded newlines
    debug_assert!(
        !json.contains('\n'),
        "JSON message must not contain embedded newlines"
    );

    Ok(json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mcp::protocol::{JsonRpcError, JsonRpcResponse, RequestId};
    use tokio::io::AsyncWriteExt;

    #[test]
    fn transport_default() {
        let _transport = StdioTransport::default();
    }

    #[tokio::test]
    async fn line_split_across_writes_survives_cancelled_read() {
        let (mut client, server) = tokio::io::duplex(64);
        let mut lines = LineReader::new(BufReader::new(server));

        client.write_all(br#"{"jsonrpc":"2.0","id":3,"#).await.unwrap();

        // A competing branch wins while the line is half read
        tokio::select! {
            biased;
            line = lines.next_line() => panic!("line completed early: {line:?}"),
            () = tokio::task::yield_now() => {}
        }

        client.write_all(b"\"method\":\"ping\"}\n").await.unwrap();

        let line = lines.next_line().await.unwrap().unwrap();
        assert_eq!(line, r#"{"jsonrpc":"2.0","id":3,"method":"ping"}"#);
    }

    #[tokio::test]
    async fn lines_are_split_and_trimmed() {
        let input: &[u8] = b"first\r\nsecond\nlast";
        let mut lines = LineReader::new(input);

        assert_eq!(lines.next_line().await.unwrap().as_deref(), Some("first"));
        assert_eq!(lines.next_line().await.unwrap().as_deref(), Some("second"));
        assert_eq!(lines.next_line().await.unwrap().as_deref(), Some("last"));
        assert_eq!(lines.next_line().await.unwrap(), None);
    }

    #[tokio::test]
    async fn invalid_utf8_is_an_error() {
        let input: &[u8] = b"\xff\xfe\n";
        let mut lines = LineReader::new(input);
        let err = lines.next_line().await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[test]
    fn multiline_tool_text_stays_on_one_line() {
        let text = serde_json::to_string_pretty(&serde_json::json!([
            {"episode_id": "e1", "title": "Hi"}
        ]))
        .unwrap();
        assert!(text.contains('\n'));

        let message = OutgoingMessage::Response(JsonRpcResponse::success(
            RequestId::Number(1),
            serde_json::json!({"content": [{"type": "text", "text": text}]}),
        ));

        let json = encode_line(&message).unwrap();
        assert!(!json.contains('\n'));
        assert!(json.contains(r"\n"));
    }

    #[test]
    fn error_encodes_without_newlines() {
        let message = OutgoingMessage::Error(JsonRpcError::method_not_found(
            RequestId::Number(1),
            "test/method",
        ));

        let json = encode_line(&message).unwrap();
        assert!(!json.contains('\n'));
        assert!(json.contains("-32601"));
    }
}
