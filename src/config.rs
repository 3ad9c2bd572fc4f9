//! Protocol and device configuration constants for Panasonic H&C units

/// Framing constants
pub mod protocol {
    /// First plaintext byte of every parcel
    pub const SYNC_BYTE: u8 = 0x11;

    /// XOR mask applied to the first byte before chaining
    pub const SYNC_MASK: u8 = 0xCA;

    /// Outer whitening mask applied to every byte
    pub const WHITENING_MASK: u8 = 0x69;

    /// Sync, source, destination, operation, packet count
    pub const HEADER_LEN: usize = 5;

    /// Trailing checksum byte
    pub const CHECKSUM_LEN: usize = 1;

    /// Smallest buffer the obfuscation transform accepts
    pub const MIN_OBFUSCATED_LEN: usize = 3;

    /// Maximum packet payload (length is a single byte on the wire)
    pub const MAX_PAYLOAD_LEN: usize = 255;

    /// Maximum encoded frame size (BLE ATT attribute limit)
    pub const MAX_FRAME_SIZE: usize = 512;

    /// Room left for packets once header and checksum are accounted for
    pub const MAX_BODY_LEN: usize = MAX_FRAME_SIZE - HEADER_LEN - CHECKSUM_LEN;
}

/// Packet type codes
pub mod packet_type {
    /// Status report (from the unit) or status request (from the app)
    pub const STATUS: u8 = 129;
    /// Outdoor temperature report
    pub const OUTDOOR_TEMPERATURE: u8 = 33;
    pub const SET_POWER: u8 = 65;
    pub const SET_MODE: u8 = 66;
    /// Not confirmed against real firmware, see `CommandSettings`
    pub const SET_FAN_SPEED: u8 = 67;
    pub const SET_TEMPERATURE: u8 = 76;
    pub const SET_ENERGY_SAVING: u8 = 84;
    pub const OUTING: u8 = 105;
}

/// Temperature encoding and defaults
pub mod temperature {
    /// Wire value of 0.0 degrees (in half-degree units)
    pub const WIRE_OFFSET: i16 = 70;

    /// Default lower setpoint limit in degrees (provisional)
    pub const DEFAULT_MIN_C: f32 = 16.0;

    /// Default upper setpoint limit in degrees (provisional)
    pub const DEFAULT_MAX_C: f32 = 32.0;
}

/// BLE GATT characteristics exposed by the unit's link module
pub mod ble {
    /// Characteristic the app writes parcels to
    pub const WRITE_CHARACTERISTIC: u128 = 0x4d200002_eff3_4362_b090_a04cab3f1da0;

    /// Characteristic the unit notifies parcels on
    pub const NOTIFY_CHARACTERISTIC: u128 = 0x4d200003_eff3_4362_b090_a04cab3f1da0;

    /// Default scan timeout in seconds
    pub const SCAN_TIMEOUT_SECS: u64 = 10;
}

/// Allowed setpoint range for the set-temperature command
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TemperatureLimits {
    /// Lowest accepted setpoint in degrees
    pub min_c: f32,
    /// Highest accepted setpoint in degrees
    pub max_c: f32,
}

impl TemperatureLimits {
    /// Check whether a setpoint lies within the limits (inclusive)
    pub fn contains(&self, celsius: f32) -> bool {
        celsius >= self.min_c && celsius <= self.max_c
    }
}

impl Default for TemperatureLimits {
    fn default() -> Self {
        Self {
            min_c: temperature::DEFAULT_MIN_C,
            max_c: temperature::DEFAULT_MAX_C,
        }
    }
}

/// Settings used when building command parcels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CommandSettings {
    /// Setpoint range enforced by the set-temperature command
    pub temperature_limits: TemperatureLimits,
    /// Packet type used for the set-fan-speed command
    ///
    /// The code has not been confirmed against device firmware, so it can be
    /// overridden here without rebuilding.
    pub fan_speed_packet_type: u8,
}

impl Default for CommandSettings {
    fn default() -> Self {
        Self {
            temperature_limits: TemperatureLimits::default(),
            fan_speed_packet_type: packet_type::SET_FAN_SPEED,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_limits_inclusive() {
        let limits = TemperatureLimits::default();
        assert!(limits.contains(16.0));
        assert!(limits.contains(32.0));
        assert!(!limits.contains(15.5));
        assert!(!limits.contains(32.5));
        assert!(!limits.contains(f32::NAN));
    }

    #[test]
    fn test_default_command_settings() {
        let settings = CommandSettings::default();
        assert_eq!(settings.fan_speed_packet_type, packet_type::SET_FAN_SPEED);
        assert_eq!(settings.temperature_limits, TemperatureLimits::default());
    }
}
