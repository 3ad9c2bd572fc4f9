//! Packet codec
//!
//! A packet is a typed, length-prefixed record inside a parcel body:
//!
//! ```text
//! [type: u8][length: u8][payload: [u8; length]]
//! ```
//!
//! Decoding is lossless: every packet type is kept as its raw record, and
//! unknown types pass through untouched. Typed interpretation happens on
//! demand through [`Packet::kind`], which looks the type byte up in a fixed
//! dispatch table.

use core::fmt;

use heapless::Vec;

use crate::config::packet_type;
use crate::config::protocol::MAX_PAYLOAD_LEN;
use crate::error::ProtocolError;
use crate::protocol::status::StatusSnapshot;
use crate::protocol::types::OutdoorTemperature;

/// Packet payload storage
pub type Payload = Vec<u8, MAX_PAYLOAD_LEN>;

/// Largest encoded packet: type + length + payload
pub const MAX_PACKET_LEN: usize = MAX_PAYLOAD_LEN + 2;

/// Cursor over a borrowed byte slice
///
/// Every read is bounds-checked and reports how many bytes were missing.
#[derive(Debug, Clone)]
pub struct ByteReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Bytes not yet consumed
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    /// Read a single byte
    pub fn read_u8(&mut self) -> Result<u8, ProtocolError> {
        let bytes = self.take(1)?;
        Ok(bytes[0])
    }

    /// Read exactly `len` bytes
    pub fn take(&mut self, len: usize) -> Result<&'a [u8], ProtocolError> {
        let available = self.remaining();
        if available < len {
            return Err(ProtocolError::Truncated {
                needed: len,
                available,
            });
        }
        let bytes = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Ok(bytes)
    }
}

/// A typed sub-record of a parcel
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Packet {
    packet_type: u8,
    payload: Payload,
}

impl Packet {
    /// Create a packet from a payload slice
    ///
    /// Fails if the payload does not fit in a single length byte.
    pub fn new(packet_type: u8, payload: &[u8]) -> Result<Self, ProtocolError> {
        let payload =
            Payload::from_slice(payload).map_err(|_| ProtocolError::PayloadTooLarge(payload.len()))?;
        Ok(Self {
            packet_type,
            payload,
        })
    }

    /// Create a packet from a fixed-size payload known to fit
    pub fn fixed<const N: usize>(packet_type: u8, payload: [u8; N]) -> Self {
        const { assert!(N <= MAX_PAYLOAD_LEN) };

        let mut data = Payload::new();
        let _ = data.extend_from_slice(&payload);
        Self {
            packet_type,
            payload: data,
        }
    }

    pub fn packet_type(&self) -> u8 {
        self.packet_type
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Size of this packet on the wire
    pub fn encoded_len(&self) -> usize {
        2 + self.payload.len()
    }

    /// Read one packet from the reader
    ///
    /// Needs `2 + L` bytes, where `L` is the declared payload length.
    pub fn decode_one(reader: &mut ByteReader<'_>) -> Result<Self, ProtocolError> {
        let available = reader.remaining();
        if available < 2 {
            return Err(ProtocolError::Truncated {
                needed: 2,
                available,
            });
        }

        let packet_type = reader.read_u8()?;
        let length = reader.read_u8()? as usize;
        let payload = reader.take(length).map_err(|_| ProtocolError::Truncated {
            needed: 2 + length,
            available,
        })?;

        Self::new(packet_type, payload)
    }

    /// Append the wire form of this packet to `out`
    pub fn encode_into<const N: usize>(&self, out: &mut Vec<u8, N>) -> Result<(), ProtocolError> {
        let needed = out.len() + self.encoded_len();
        let overflow = |_| ProtocolError::FrameTooLarge(needed);

        out.push(self.packet_type).map_err(overflow)?;
        out.push(self.payload.len() as u8).map_err(overflow)?;
        out.extend_from_slice(&self.payload)
            .map_err(|_| ProtocolError::FrameTooLarge(needed))?;
        Ok(())
    }

    /// Encode this packet on its own
    pub fn encode(&self) -> Vec<u8, MAX_PACKET_LEN> {
        let mut out = Vec::new();
        // A payload is at most MAX_PAYLOAD_LEN, so this always fits
        let _ = self.encode_into(&mut out);
        out
    }

    /// Interpret the payload according to the packet type
    pub fn kind(&self) -> Result<PacketKind, ProtocolError> {
        match DISPATCH
            .iter()
            .find(|(packet_type, _)| *packet_type == self.packet_type)
        {
            Some((_, interpret)) => interpret(&self.payload),
            None => Ok(PacketKind::Other),
        }
    }
}

impl fmt::Display for Packet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {:?}", self.packet_type, self.payload.as_slice())
    }
}

/// Typed view of a packet, selected by its type byte
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PacketKind {
    /// Status report (type 129)
    Status(StatusSnapshot),
    /// Outdoor temperature report (type 33)
    OutdoorTemperature(OutdoorTemperature),
    /// Any other type, carried verbatim
    Other,
}

type Interpreter = fn(&[u8]) -> Result<PacketKind, ProtocolError>;

/// Type byte to interpreter
const DISPATCH: [(u8, Interpreter); 2] = [
    (packet_type::STATUS, interpret_status),
    (packet_type::OUTDOOR_TEMPERATURE, interpret_outdoor_temperature),
];

fn interpret_status(payload: &[u8]) -> Result<PacketKind, ProtocolError> {
    StatusSnapshot::decode(payload).map(PacketKind::Status)
}

fn interpret_outdoor_temperature(payload: &[u8]) -> Result<PacketKind, ProtocolError> {
    match payload.get(1) {
        Some(&tenths) => Ok(PacketKind::OutdoorTemperature(
            OutdoorTemperature::from_tenths(tenths),
        )),
        None => Err(ProtocolError::MalformedOutdoorPayload(payload.len())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::types::{FanSpeed, Mode};

    #[test]
    fn test_decode_one() {
        let data = [0x41, 0x01, 0x03, 0xAA];
        let mut reader = ByteReader::new(&data);

        let packet = Packet::decode_one(&mut reader).expect("Should decode");
        assert_eq!(packet.packet_type(), 0x41);
        assert_eq!(packet.payload(), &[0x03]);

        // Trailing byte left for the caller
        assert_eq!(reader.remaining(), 1);
    }

    #[test]
    fn test_decode_one_empty_payload() {
        let data = [0x10, 0x00];
        let mut reader = ByteReader::new(&data);

        let packet = Packet::decode_one(&mut reader).unwrap();
        assert!(packet.payload().is_empty());
        assert_eq!(reader.remaining(), 0);
    }

    #[test]
    fn test_decode_one_truncated_header() {
        let mut reader = ByteReader::new(&[0x41]);
        assert_eq!(
            Packet::decode_one(&mut reader),
            Err(ProtocolError::Truncated {
                needed: 2,
                available: 1
            })
        );
    }

    #[test]
    fn test_decode_one_truncated_payload() {
        // Declares 4 payload bytes, only 2 present
        let mut reader = ByteReader::new(&[0x4C, 0x04, 0x09, 0x00]);
        assert_eq!(
            Packet::decode_one(&mut reader),
            Err(ProtocolError::Truncated {
                needed: 6,
                available: 4
            })
        );
    }

    #[test]
    fn test_encode() {
        let packet = Packet::fixed(76, [9, 0, 113, 0]);
        assert_eq!(packet.encode().as_slice(), &[76, 4, 9, 0, 113, 0]);
        assert_eq!(packet.encoded_len(), 6);
    }

    #[test]
    fn test_payload_too_large() {
        let big = [0u8; 256];
        assert_eq!(Packet::new(0x01, &big), Err(ProtocolError::PayloadTooLarge(256)));

        let max = [0u8; 255];
        let packet = Packet::new(0x01, &max).unwrap();
        let encoded = packet.encode();
        assert_eq!(encoded.len(), 257);
        assert_eq!(encoded[1], 255);
    }

    #[test]
    fn test_encode_into_overflow() {
        let packet = Packet::fixed(0x01, [1, 2, 3]);
        let mut out: Vec<u8, 4> = Vec::new();
        assert_eq!(
            packet.encode_into(&mut out),
            Err(ProtocolError::FrameTooLarge(5))
        );
    }

    #[test]
    fn test_kind_status() {
        let packet = Packet::fixed(129, [0x21, 0x60, 0, 0, 99, 101, 0, 0, 0, 0, 0, 1, 0]);
        match packet.kind().unwrap() {
            PacketKind::Status(status) => {
                assert!(status.power);
                assert_eq!(status.mode, Mode::Heat);
                assert_eq!(status.fan_speed, FanSpeed::High);
            }
            other => panic!("Expected status, got {:?}", other),
        }
    }

    #[test]
    fn test_kind_status_request_is_malformed_report() {
        // The app-side status request reuses type 129 with a short payload
        let packet = Packet::fixed(129, [4, 0, 14]);
        assert_eq!(packet.kind(), Err(ProtocolError::MalformedStatusPayload(3)));
    }

    // Outdoor temperature layout is a best guess, not verified against real firmware
    #[test]
    fn test_kind_outdoor_temperature_unverified() {
        let packet = Packet::fixed(33, [0, 235]);
        assert_eq!(
            packet.kind(),
            Ok(PacketKind::OutdoorTemperature(OutdoorTemperature::from_tenths(235)))
        );

        let short = Packet::fixed(33, [0]);
        assert_eq!(short.kind(), Err(ProtocolError::MalformedOutdoorPayload(1)));
    }

    #[test]
    fn test_kind_unknown_passthrough() {
        let packet = Packet::fixed(200, [1, 2, 3]);
        assert_eq!(packet.kind(), Ok(PacketKind::Other));
        assert_eq!(packet.payload(), &[1, 2, 3]);
    }

    #[test]
    fn test_display() {
        let packet = Packet::fixed(65, [3]);
        assert_eq!(format!("{}", packet), "65, [3]");
    }
}
