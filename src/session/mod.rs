//! Connection-scoped session orchestration
//!
//! Serialises outbound writes, caches the last status report and fans out
//! update notifications to subscribers.

pub mod controller;
pub mod state;
pub mod subscribers;

pub use controller::Session;
pub use state::ConnectionState;
pub use subscribers::{SubscriptionId, UpdateCallback};
