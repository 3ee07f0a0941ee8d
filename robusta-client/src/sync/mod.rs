//! Realtime sync channel
//!
//! Publish/subscribe over a persistent bidirectional connection. Not a
//! source of truth: every consumed event triggers a full re-list from the
//! stores, because partial and out-of-order delivery is expected and an
//! idempotent refresh is simpler and safer than incremental patching.

pub mod channel;
pub mod dispatcher;
pub mod transport;

pub use channel::{ChannelNotice, SyncChannel};
pub use dispatcher::Dispatcher;
pub use transport::{MemoryHub, MemoryTransport, TcpTransport, Transport};

use thiserror::Error;

/// Sync channel error type
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("invalid frame: {0}")]
    InvalidFrame(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("channel closed")]
    Closed,
}
