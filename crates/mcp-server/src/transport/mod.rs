//! Transport layer.
//!
//! A [`Transport`] yields decoded [`ToolRequest`](crate::protocol::ToolRequest)s
//! and writes JSON messages back. [`LineTransport`] frames both directions as
//! one JSON document per line over any async byte stream; [`StdioTransport`]
//! is that framing bound to the process's stdin and stdout.

mod stdio;
mod traits;

pub use stdio::{LineTransport, StdioTransport};
pub use traits::Transport;
