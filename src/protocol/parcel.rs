//! Parcel codec
//!
//! A parcel is one complete protocol message. Plaintext layout before
//! obfuscation:
//!
//! ```text
//! [0x11][source][destination][operation][count][packet]*count[checksum]
//! ```
//!
//! The whole buffer then goes through the obfuscation transform. Bytes after
//! the declared packets and before the checksum are ignored on decode.

use core::fmt;

use heapless::Vec;

use crate::config::protocol::{CHECKSUM_LEN, HEADER_LEN, MAX_BODY_LEN, MAX_FRAME_SIZE, SYNC_BYTE};
use crate::error::ProtocolError;
use crate::protocol::obfuscation::{deobfuscate, obfuscate};
use crate::protocol::packet::{ByteReader, Packet, PacketKind};
use crate::protocol::status::StatusSnapshot;
use crate::protocol::types::{Component, Operation};

/// Encoded frame buffer
pub type Frame = Vec<u8, MAX_FRAME_SIZE>;

/// A complete protocol message
///
/// Packets are kept back to back in their wire form, so the only bound on
/// how many a parcel carries is the frame size.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Parcel {
    pub source: Component,
    pub destination: Component,
    pub operation: Operation,
    count: u8,
    body: Vec<u8, MAX_BODY_LEN>,
}

impl Parcel {
    /// Create a parcel with no packets
    pub fn new(source: Component, destination: Component, operation: Operation) -> Self {
        Self {
            source,
            destination,
            operation,
            count: 0,
            body: Vec::new(),
        }
    }

    /// Create a parcel carrying exactly one packet
    pub fn single(
        source: Component,
        destination: Component,
        operation: Operation,
        packet: Packet,
    ) -> Self {
        let mut parcel = Self::new(source, destination, operation);
        // A lone packet is at most MAX_PACKET_LEN, well under MAX_BODY_LEN
        let _ = parcel.push(packet);
        parcel
    }

    /// Append a packet, preserving wire order
    ///
    /// Fails if the encoded frame would no longer fit in [`MAX_FRAME_SIZE`].
    pub fn push(&mut self, packet: Packet) -> Result<(), ProtocolError> {
        let len = self.encoded_len() + packet.encoded_len();
        if len > MAX_FRAME_SIZE {
            return Err(ProtocolError::FrameTooLarge(len));
        }

        packet.encode_into(&mut self.body)?;
        self.count += 1;
        Ok(())
    }

    /// Number of packets
    pub fn len(&self) -> usize {
        self.count as usize
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Packets in wire order
    pub fn packets(&self) -> Packets<'_> {
        Packets {
            reader: ByteReader::new(&self.body),
            remaining: self.count,
        }
    }

    /// Every status report carried by this parcel, in wire order
    ///
    /// A packet that fails to interpret yields an error in its place.
    pub fn status_reports(&self) -> impl Iterator<Item = Result<StatusSnapshot, ProtocolError>> + '_ {
        self.packets().filter_map(|packet| match packet.kind() {
            Ok(PacketKind::Status(status)) => Some(Ok(status)),
            Ok(_) => None,
            Err(e) => Some(Err(e)),
        })
    }

    /// Size of the encoded frame
    pub fn encoded_len(&self) -> usize {
        HEADER_LEN + self.body.len() + CHECKSUM_LEN
    }

    /// Encode and obfuscate this parcel
    pub fn encode(&self) -> Result<Frame, ProtocolError> {
        let len = self.encoded_len();
        let overflow = |_| ProtocolError::FrameTooLarge(len);

        let mut frame = Frame::new();
        let header = [
            SYNC_BYTE,
            self.source as u8,
            self.destination as u8,
            self.operation as u8,
            self.count,
        ];
        frame.extend_from_slice(&header).map_err(overflow)?;
        frame.extend_from_slice(&self.body).map_err(overflow)?;

        // Checksum placeholder
        frame.push(0x00).map_err(|_| ProtocolError::FrameTooLarge(len))?;

        obfuscate(&mut frame)?;
        Ok(frame)
    }

    /// Deobfuscate, verify and decode a received frame
    pub fn decode(data: &[u8]) -> Result<Self, ProtocolError> {
        let mut frame =
            Frame::from_slice(data).map_err(|_| ProtocolError::FrameTooLarge(data.len()))?;
        deobfuscate(&mut frame)?;

        // The checksum byte is not part of the body
        let body = &frame[..frame.len() - CHECKSUM_LEN];
        let mut reader = ByteReader::new(body);

        let available = reader.remaining();
        if available < HEADER_LEN {
            return Err(ProtocolError::Truncated {
                needed: HEADER_LEN,
                available,
            });
        }

        let sync = reader.read_u8()?;
        if sync != SYNC_BYTE {
            return Err(ProtocolError::InvalidSyncByte(sync));
        }

        let source = Component::try_from(reader.read_u8()?)?;
        let destination = Component::try_from(reader.read_u8()?)?;
        let operation = Operation::try_from(reader.read_u8()?)?;
        let count = reader.read_u8()?;

        // Declared packets come out of a frame that already fits, so pushing
        // them back cannot overflow
        let mut parcel = Self::new(source, destination, operation);
        for _ in 0..count {
            parcel.push(Packet::decode_one(&mut reader)?)?;
        }

        Ok(parcel)
    }
}

/// Iterator over the packets of a [`Parcel`], in wire order
#[derive(Debug, Clone)]
pub struct Packets<'a> {
    reader: ByteReader<'a>,
    remaining: u8,
}

impl Iterator for Packets<'_> {
    type Item = Packet;

    fn next(&mut self) -> Option<Packet> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        // The body only ever holds packets written by `Parcel::push`
        Packet::decode_one(&mut self.reader).ok()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.remaining as usize;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Packets<'_> {}

impl<'a> IntoIterator for &'a Parcel {
    type Item = Packet;
    type IntoIter = Packets<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.packets()
    }
}

impl fmt::Display for Parcel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} => {} {}", self.source, self.destination, self.operation)?;
        for packet in self {
            write!(f, "\n\t{}", packet)?;
        }
        Ok(())
    }
}
