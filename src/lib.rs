#![cfg_attr(not(any(test, feature = "std")), no_std)]

pub mod commands;
pub mod config;
pub mod error;
pub mod protocol;

// Transport, session and BLE need threads, Arc and an async mutex
#[cfg(feature = "std")]
pub mod session;
#[cfg(feature = "std")]
pub mod transport;

#[cfg(feature = "ble")]
pub mod ble;

pub use commands::{Command, CommandBuilder};
pub use error::{CommandError, ProtocolError};
pub use protocol::{Packet, PacketKind, Parcel, StatusSnapshot};

#[cfg(feature = "std")]
pub use error::SessionError;
#[cfg(feature = "std")]
pub use session::{ConnectionState, Session};
#[cfg(feature = "std")]
pub use transport::{Transport, TransportError};
