//! Transport trait definitions

use async_trait::async_trait;
use serde_json::Value;

use crate::error::TransportError;
use crate::protocol::ToolRequest;

/// Bidirectional message channel used by the server loop.
///
/// # Implementation Notes
///
/// - `recv()` returns `None` once the peer is gone (EOF) or after `close()`
/// - a message that cannot be decoded is reported as
///   `Some(Err(TransportError::InvalidMessage(_)))` and the transport stays
///   usable
/// - `close()` is idempotent; `send()` after it fails with `Closed`
#[async_trait]
pub trait Transport: Send {
    /// Receive the next request.
    async fn recv(&mut self) -> Option<Result<ToolRequest, TransportError>>;

    /// Send one message.
    async fn send(&mut self, message: Value) -> Result<(), TransportError>;

    /// Flush and stop accepting traffic.
    async fn close(&mut self) -> Result<(), TransportError>;

    fn is_closed(&self) -> bool;
}
