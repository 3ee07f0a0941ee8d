//! Shared types for the Robusta backoffice
//!
//! Domain models and the realtime sync wire protocol, used by every
//! dashboard session.

pub mod message;
pub mod models;
pub mod money;

// Re-exports
pub use serde::{Deserialize, Serialize};

// Sync protocol re-exports (for convenient access)
pub use message::{Frame, SyncEvent};
