//! Line-delimited JSON transport.
//!
//! # Protocol
//!
//! - Each request is a single line of JSON followed by a newline
//! - Each response is a single line of JSON followed by a newline
//! - Blank lines are ignored
//! - EOF on the input signals that the transport should close
//!
//! # Examples
//!
//! ```rust
//! use mcp_server::transport::{LineTransport, Transport};
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() {
//!     let input = b"{\"tool\":\"ping\"}\n";
//!     let mut transport = LineTransport::new(&input[..], Vec::new());
//!
//!     let request = transport.recv().await.unwrap().unwrap();
//!     assert_eq!(request.tool, "ping");
//!
//!     transport.send(json!({"result": "pong"})).await.unwrap();
//!     assert!(transport.recv().await.is_none());
//!
//!     let (_, output) = transport.into_inner();
//!     assert_eq!(output, b"{\"result\":\"pong\"}\n");
//! }
//! ```

use async_trait::async_trait;
use serde_json::Value;
use tokio::io::{
    stdin, stdout, AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader, Stdin, Stdout,
};
use tracing::{error, warn};

use crate::error::TransportError;
use crate::protocol::ToolRequest;

use super::traits::Transport;

/// JSON-lines transport over an arbitrary reader/writer pair.
pub struct LineTransport<R, W> {
    reader: R,
    writer: W,
    closed: bool,
}

/// Line transport reading stdin and writing stdout.
pub type StdioTransport = LineTransport<BufReader<Stdin>, Stdout>;

impl LineTransport<BufReader<Stdin>, Stdout> {
    /// Create a transport bound to the process's stdin and stdout.
    pub fn stdio() -> Self {
        Self::new(BufReader::new(stdin()), stdout())
    }
}

impl<R, W> LineTransport<R, W>
where
    R: AsyncBufRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    pub fn new(reader: R, writer: W) -> Self {
        Self {
            reader,
            writer,
            closed: false,
        }
    }

    /// Take back the underlying reader and writer.
    pub fn into_inner(self) -> (R, W) {
        (self.reader, self.writer)
    }
}

#[async_trait]
impl<R, W> Transport for LineTransport<R, W>
where
    R: AsyncBufRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    async fn recv(&mut self) -> Option<Result<ToolRequest, TransportError>> {
        let mut line = Vec::new();

        loop {
            if self.closed {
                return None;
            }

            line.clear();
            match self.reader.read_until(b'\n', &mut line).await {
                Ok(0) => {
                    // EOF reached
                    self.closed = true;
                    return None;
                }
                Ok(_) => {
                    if line.iter().all(u8::is_ascii_whitespace) {
                        continue;
                    }

                    return Some(serde_json::from_slice::<ToolRequest>(&line).map_err(|e| {
                        warn!(error = %e, line = %String::from_utf8_lossy(&line).trim(), "Failed to parse request");
                        TransportError::InvalidMessage(e.to_string())
                    }));
                }
                Err(e) => {
                    error!(error = %e, "I/O error reading input");
                    self.closed = true;
                    return Some(Err(TransportError::Io(e)));
                }
            }
        }
    }

    async fn send(&mut self, message: Value) -> Result<(), TransportError> {
        if self.closed {
            return Err(TransportError::Closed);
        }

        let mut json =
            serde_json::to_vec(&message).map_err(|e| TransportError::InvalidMessage(e.to_string()))?;
        json.push(b'\n');

        self.writer.write_all(&json).await?;
        self.writer.flush().await?;

        Ok(())
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        self.closed = true;
        self.writer.flush().await?;
        Ok(())
    }

    fn is_closed(&self) -> bool {
        self.closed
    }
}
