//! Status report decoder
//!
//! Payload layout of a type-129 report (offsets into the payload `D`):
//!
//! ```text
//! D[0]      bit 0: power, bits 5-7: mode
//! D[1]      bits 5-7: fan speed
//! D[4]      setpoint, half degrees + 70
//! D[5]      room temperature, half degrees + 70 (only when len > 12)
//! D[len-6]  power save flag (non-zero = on)
//! ```
//!
//! Unrecognised trailing bytes are ignored. Out-of-range mode and fan codes
//! are errors, never defaulted.

use core::fmt;

use crate::error::ProtocolError;
use crate::protocol::types::{FanSpeed, Mode, Temperature};

/// Shortest payload carrying every fixed field
pub const MIN_STATUS_LEN: usize = 6;

/// Payloads longer than this also carry the room temperature
pub const EXTENDED_STATUS_THRESHOLD: usize = 12;

/// Decoded unit telemetry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StatusSnapshot {
    pub power: bool,
    pub mode: Mode,
    pub fan_speed: FanSpeed,
    pub set_temperature: Temperature,
    /// Only reported in the extended payload form
    pub room_temperature: Option<Temperature>,
    pub power_save: bool,
}

impl StatusSnapshot {
    /// Decode the payload of a status report packet
    pub fn decode(payload: &[u8]) -> Result<Self, ProtocolError> {
        let len = payload.len();
        if len < MIN_STATUS_LEN {
            return Err(ProtocolError::MalformedStatusPayload(len));
        }

        let mode = Mode::try_from((payload[0] >> 5) & 0x07)?;
        let fan_speed = FanSpeed::try_from((payload[1] >> 5) & 0x07)?;

        let room_temperature = if len > EXTENDED_STATUS_THRESHOLD {
            Some(Temperature::from_wire(payload[5]))
        } else {
            None
        };

        Ok(Self {
            power: payload[0] & 0x01 != 0,
            mode,
            fan_speed,
            set_temperature: Temperature::from_wire(payload[4]),
            room_temperature,
            power_save: payload[len - 6] != 0,
        })
    }
}

impl fmt::Display for StatusSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Temp: {}", self.set_temperature)?;
        if let Some(room) = self.room_temperature {
            write!(f, " ({})", room)?;
        }
        writeln!(f)?;
        writeln!(f, "Power: {}", if self.power { "on" } else { "off" })?;
        writeln!(f, "Mode: {}", self.mode)?;
        writeln!(f, "Fan: {}", self.fan_speed)?;
        write!(f, "Powersave: {}", if self.power_save { "on" } else { "off" })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EXTENDED: [u8; 13] = [0x21, 0x60, 0, 0, 99, 101, 0, 0, 0, 0, 0, 1, 0];

    #[test]
    fn test_decode_extended_report() {
        let status = StatusSnapshot::decode(&EXTENDED).expect("Should decode");

        assert!(status.power);
        assert_eq!(status.mode, Mode::Heat);
        assert_eq!(status.fan_speed, FanSpeed::High);
        assert_eq!(status.set_temperature.celsius(), 14.5);
        assert_eq!(status.room_temperature.map(|t| t.celsius()), Some(15.5));
        // D[13 - 6] = D[7] = 0
        assert!(!status.power_save);
    }

    #[test]
    fn test_decode_short_report_has_no_room_temperature() {
        // Mode cool (2 << 5), power off, fan low (5 << 5), setpoint 22.0
        let payload = [0x40, 0xA0, 0, 0, 114, 0, 1, 0, 0, 0, 0, 0];
        let status = StatusSnapshot::decode(&payload).unwrap();

        assert!(!status.power);
        assert_eq!(status.mode, Mode::Cool);
        assert_eq!(status.fan_speed, FanSpeed::Low);
        assert_eq!(status.set_temperature.celsius(), 22.0);
        assert_eq!(status.room_temperature, None);
        // D[12 - 6] = D[6] = 1
        assert!(status.power_save);
    }

    #[test]
    fn test_decode_minimum_length() {
        // With 6 bytes the power save flag is D[0]
        let payload = [0xA1, 0x40, 0, 0, 80, 0];
        let status = StatusSnapshot::decode(&payload).unwrap();

        assert_eq!(status.mode, Mode::Auto);
        assert_eq!(status.fan_speed, FanSpeed::Auto);
        assert!(status.power_save);
    }

    #[test]
    fn test_too_short() {
        assert_eq!(
            StatusSnapshot::decode(&[0x21, 0x60, 0, 0, 99]),
            Err(ProtocolError::MalformedStatusPayload(5))
        );
    }

    #[test]
    fn test_unknown_mode() {
        // Mode bits = 0
        let payload = [0x01, 0x60, 0, 0, 99, 0];
        assert_eq!(
            StatusSnapshot::decode(&payload),
            Err(ProtocolError::UnknownMode(0))
        );

        // Mode bits = 7
        let payload = [0xE1, 0x60, 0, 0, 99, 0];
        assert_eq!(
            StatusSnapshot::decode(&payload),
            Err(ProtocolError::UnknownMode(7))
        );
    }

    #[test]
    fn test_unknown_fan_speed() {
        // Fan bits = 1
        let payload = [0x21, 0x20, 0, 0, 99, 0];
        assert_eq!(
            StatusSnapshot::decode(&payload),
            Err(ProtocolError::UnknownFanSpeed(1))
        );
    }

    #[test]
    fn test_display() {
        let status = StatusSnapshot::decode(&EXTENDED).unwrap();
        assert_eq!(
            format!("{}", status),
            "Temp: 14.5 (15.5)\nPower: on\nMode: heat\nFan: high\nPowersave: off"
        );
    }
}
