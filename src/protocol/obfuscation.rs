//! Reversible byte obfuscation with an embedded checksum
//!
//! Operates in place on a complete frame:
//!
//! ```text
//! [sync][interior bytes ...][checksum]
//! ```
//!
//! Encoding stores the 8-bit sum of the interior bytes in the last byte, XORs
//! the first byte with 0xCA, chains every following byte with the previous
//! output byte, then whitens every byte with 0x69. Decoding undoes the same
//! steps in reverse order and verifies the checksum.

use crate::config::protocol::{MIN_OBFUSCATED_LEN, SYNC_MASK, WHITENING_MASK};
use crate::error::ProtocolError;

/// 8-bit wrapping sum of a byte slice
pub fn checksum(data: &[u8]) -> u8 {
    data.iter().fold(0u8, |acc, b| acc.wrapping_add(*b))
}

/// Obfuscate a plaintext frame in place
///
/// The last byte is a placeholder and is overwritten with the checksum.
pub fn obfuscate(frame: &mut [u8]) -> Result<(), ProtocolError> {
    let n = frame.len();
    if n < MIN_OBFUSCATED_LEN {
        return Err(ProtocolError::FrameTooShort(n));
    }

    frame[n - 1] = checksum(&frame[1..n - 1]);

    frame[0] ^= SYNC_MASK;
    for i in 1..n {
        frame[i] ^= frame[i - 1];
    }

    for byte in frame.iter_mut() {
        *byte ^= WHITENING_MASK;
    }

    Ok(())
}

/// Recover a plaintext frame in place and verify its checksum
///
/// On error the buffer contents are unspecified and must be discarded.
pub fn deobfuscate(frame: &mut [u8]) -> Result<(), ProtocolError> {
    let n = frame.len();
    if n < MIN_OBFUSCATED_LEN {
        return Err(ProtocolError::FrameTooShort(n));
    }

    for byte in frame.iter_mut() {
        *byte ^= WHITENING_MASK;
    }

    // Walk backwards so frame[i - 1] is still ciphertext when it is used
    for i in (1..n).rev() {
        frame[i] ^= frame[i - 1];
    }
    frame[0] ^= SYNC_MASK;

    let computed = checksum(&frame[1..n - 1]);
    let received = frame[n - 1];
    if computed != received {
        return Err(ProtocolError::Checksum { received, computed });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Set-power-on parcel, plaintext with checksum placeholder
    const POWER_ON_PLAIN: [u8; 9] = [0x11, 0xf9, 0x01, 0x00, 0x01, 0x41, 0x01, 0x03, 0x00];
    const POWER_ON_WIRE: [u8; 9] = [0xb2, 0x4b, 0x4a, 0x4a, 0x4b, 0x0a, 0x0b, 0x08, 0x48];

    #[test]
    fn test_checksum_wraps() {
        assert_eq!(checksum(&[0xff, 0x02]), 0x01);
        assert_eq!(checksum(&[]), 0x00);
    }

    #[test]
    fn test_obfuscate_known_vector() {
        let mut frame = POWER_ON_PLAIN;
        obfuscate(&mut frame).unwrap();
        assert_eq!(frame, POWER_ON_WIRE);
    }

    #[test]
    fn test_deobfuscate_known_vector() {
        let mut frame = POWER_ON_WIRE;
        deobfuscate(&mut frame).unwrap();

        // Checksum placeholder replaced with the real sum
        let mut expected = POWER_ON_PLAIN;
        expected[8] = checksum(&POWER_ON_PLAIN[1..8]);
        assert_eq!(frame, expected);
        assert_eq!(frame[8], 0x40);
    }

    #[test]
    fn test_tampered_checksum_byte() {
        for mask in [0x01, 0x10, 0x80] {
            let mut frame = POWER_ON_WIRE;
            frame[8] ^= mask;
            assert!(matches!(
                deobfuscate(&mut frame),
                Err(ProtocolError::Checksum { .. })
            ));
        }
    }

    #[test]
    fn test_too_short_rejected() {
        let mut empty: [u8; 0] = [];
        assert_eq!(obfuscate(&mut empty), Err(ProtocolError::FrameTooShort(0)));

        let mut two = [0x11, 0x00];
        assert_eq!(obfuscate(&mut two), Err(ProtocolError::FrameTooShort(2)));
        assert_eq!(deobfuscate(&mut two), Err(ProtocolError::FrameTooShort(2)));
    }

    #[test]
    fn test_minimal_frame() {
        let mut frame = [0x11, 0x42, 0x00];
        obfuscate(&mut frame).unwrap();
        deobfuscate(&mut frame).unwrap();
        assert_eq!(frame, [0x11, 0x42, 0x42]);
    }
}
