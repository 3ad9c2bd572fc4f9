//! Wire protocol codec
//!
//! Pure and stateless. Nothing in here logs; every failure is returned as a
//! [`ProtocolError`](crate::error::ProtocolError).

pub mod obfuscation;
pub mod packet;
pub mod parcel;
pub mod status;
pub mod types;

pub use packet::{ByteReader, Packet, PacketKind, Payload};
pub use parcel::{Frame, Packets, Parcel};
pub use status::StatusSnapshot;
pub use types::{Component, FanSpeed, Mode, Operation, OutdoorTemperature, Temperature};
