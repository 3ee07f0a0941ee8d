//! Robusta Client - coffee-shop backoffice core
//!
//! Order/table stores over the REST backend, the status transition engine,
//! and the realtime sync channel keeping every dashboard session consistent
//! without polling. Rendering, styling, and the backend itself live
//! elsewhere; this crate is the call surface between them.

pub mod api;
pub mod config;
pub mod engine;
pub mod error;
pub mod http;
pub mod notify;
pub mod session;
pub mod store;
pub mod sync;

pub use api::{BackofficeApi, RestApi};
pub use config::{ChannelConfig, ClientConfig};
pub use engine::{TableEffect, Transition, TransitionError, allowed_targets, attempt_transition};
pub use error::{ClientError, ClientResult};
pub use http::NetworkHttpClient;
pub use notify::{LogNotifier, Notifier};
pub use session::{BackofficeSession, StatusUpdate};
pub use store::{OrderStore, TableStore};
pub use sync::{ChannelNotice, Dispatcher, MemoryHub, SyncChannel, SyncError};

// Re-export shared types for convenience
pub use shared::message::{Frame, SyncEvent};
pub use shared::models::{Order, OrderStatus, Table, TableStatus};
