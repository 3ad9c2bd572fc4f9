//! Codec error types.
//!
//! Every variant is recoverable by discarding the offending frame or command.
//! The codec never logs; callers decide what to do with these.

use thiserror::Error;

/// Errors raised while encoding or decoding parcels and packets.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProtocolError {
    /// Recomputed checksum does not match the trailing byte.
    #[error("bad checksum: frame carries 0x{received:02X}, computed 0x{computed:02X}")]
    Checksum {
        /// Checksum byte found in the frame.
        received: u8,
        /// Checksum computed over the interior bytes.
        computed: u8,
    },

    /// First plaintext byte is not the sync marker.
    #[error("invalid sync byte: 0x{0:02X}")]
    InvalidSyncByte(u8),

    /// Address byte outside the component enumeration.
    #[error("unknown component: {0}")]
    UnknownComponent(u8),

    /// Operation byte outside the operation enumeration.
    #[error("unknown operation: {0}")]
    UnknownOperation(u8),

    /// Input ended before a declared field was complete.
    #[error("truncated input: needed {needed} bytes, {available} available")]
    Truncated {
        /// Bytes required to finish the current field.
        needed: usize,
        /// Bytes left in the input.
        available: usize,
    },

    /// Payload longer than a length byte can describe.
    #[error("payload too large: {0} bytes (maximum 255)")]
    PayloadTooLarge(usize),

    /// Buffer too short to hold sync, body and checksum.
    #[error("frame too short: {0} bytes (minimum 3)")]
    FrameTooShort(usize),

    /// Frame exceeds the transport buffer capacity.
    #[error("frame too large: {0} bytes")]
    FrameTooLarge(usize),

    /// Status payload shorter than the fixed fields.
    #[error("malformed status payload: {0} bytes (minimum 6)")]
    MalformedStatusPayload(usize),

    /// Outdoor temperature payload shorter than the fixed fields.
    #[error("malformed outdoor temperature payload: {0} bytes (minimum 2)")]
    MalformedOutdoorPayload(usize),

    /// Mode bitfield does not map to a known mode.
    #[error("unknown mode code: {0}")]
    UnknownMode(u8),

    /// Fan speed bitfield does not map to a known fan speed.
    #[error("unknown fan speed code: {0}")]
    UnknownFanSpeed(u8),
}

/// Errors raised while building a command parcel.
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum CommandError {
    /// Requested setpoint lies outside the configured limits.
    #[error("temperature {value} outside allowed range {min}..={max}")]
    TemperatureOutOfRange {
        /// Requested setpoint in degrees.
        value: f32,
        /// Lowest accepted setpoint.
        min: f32,
        /// Highest accepted setpoint.
        max: f32,
    },
}

/// Errors surfaced to callers of the session.
///
/// Transport failures are attached as the source, never retried.
#[cfg(feature = "std")]
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SessionError {
    /// Command issued while the session is not connected.
    #[error("not connected")]
    NotConnected,

    /// Connect called while connecting or connected.
    #[error("already connected")]
    AlreadyConnected,

    /// Opening the link or subscribing to notifications failed.
    #[error("connect failed")]
    Connect(#[source] crate::transport::TransportError),

    /// Closing the link failed. The session is disconnected regardless.
    #[error("disconnect failed")]
    Disconnect(#[source] crate::transport::TransportError),

    /// Writing a frame failed.
    #[error("write failed")]
    Write(#[source] crate::transport::TransportError),

    /// Command rejected before encoding.
    #[error(transparent)]
    Command(#[from] CommandError),

    /// Parcel could not be encoded.
    #[error(transparent)]
    Encode(#[from] ProtocolError),
}
