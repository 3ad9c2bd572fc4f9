pub mod traits;

pub use traits::{NotificationHandler, Transport, TransportError};
