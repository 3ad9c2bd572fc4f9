//! Command parcel builder
//!
//! Turns [`Command`] values into ready-to-encode parcels. Pure: no I/O, no
//! shared state.

use crate::commands::types::Command;
use crate::config::packet_type;
use crate::config::temperature::WIRE_OFFSET;
use crate::config::CommandSettings;
use crate::error::CommandError;
use crate::protocol::packet::Packet;
use crate::protocol::parcel::Parcel;
use crate::protocol::types::{Component, FanSpeed, Mode, Operation};

/// Status request payload
const STATUS_REQUEST: [u8; 3] = [4, 0, 14];

/// Builder for command parcels
#[derive(Debug, Clone, Default)]
pub struct CommandBuilder {
    settings: CommandSettings,
}

impl CommandBuilder {
    /// Create a builder with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a builder with custom settings
    pub fn with_settings(settings: CommandSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &CommandSettings {
        &self.settings
    }

    /// Build the parcel for any command
    pub fn build(&self, command: &Command) -> Result<Parcel, CommandError> {
        let parcel = match *command {
            Command::SetPower(state) => self.set_power(state),
            Command::SetMode(mode) => self.set_mode(mode),
            Command::SetFanSpeed(speed) => self.set_fan_speed(speed),
            Command::SetTemperature(celsius) => self.set_temperature(celsius)?,
            Command::SetEnergySaving(state) => self.set_energy_saving(state),
            Command::RequestStatus => self.request_status(),
            Command::SetOuting(state) => self.set_outing(state),
        };
        Ok(parcel)
    }

    pub fn set_power(&self, on: bool) -> Parcel {
        Self::set(Packet::fixed(packet_type::SET_POWER, [on as u8 + 2]))
    }

    pub fn set_mode(&self, mode: Mode) -> Parcel {
        Self::set(Packet::fixed(packet_type::SET_MODE, [mode as u8]))
    }

    pub fn set_fan_speed(&self, speed: FanSpeed) -> Parcel {
        Self::set(Packet::fixed(
            self.settings.fan_speed_packet_type,
            [speed as u8],
        ))
    }

    /// Set the target temperature
    ///
    /// The wire byte is `round(celsius * 2 + 70)`, halves away from zero. Fails
    /// if the value is NaN or outside the configured limits, or if the wire
    /// byte would not fit in a `u8`.
    pub fn set_temperature(&self, celsius: f32) -> Result<Parcel, CommandError> {
        let limits = self.settings.temperature_limits;
        let out_of_range = CommandError::TemperatureOutOfRange {
            value: celsius,
            min: limits.min_c,
            max: limits.max_c,
        };

        if !limits.contains(celsius) {
            return Err(out_of_range);
        }

        let wire = round_half_away_from_zero(celsius * 2.0 + WIRE_OFFSET as f32);
        let wire = u8::try_from(wire).map_err(|_| out_of_range)?;

        Ok(Self::set(Packet::fixed(
            packet_type::SET_TEMPERATURE,
            [9, 0, wire, 0],
        )))
    }

    pub fn set_energy_saving(&self, on: bool) -> Parcel {
        Self::set(Packet::fixed(packet_type::SET_ENERGY_SAVING, [on as u8]))
    }

    pub fn request_status(&self) -> Parcel {
        Parcel::single(
            Component::App,
            Component::IndoorUnit1,
            Operation::Request,
            Packet::fixed(packet_type::STATUS, STATUS_REQUEST),
        )
    }

    /// Toggle away mode, addressed to the link module rather than the unit
    pub fn set_outing(&self, on: bool) -> Parcel {
        Parcel::single(
            Component::App,
            Component::BleModuleUart,
            Operation::Set,
            Packet::fixed(packet_type::OUTING, [0, 0, 17, 2, on as u8]),
        )
    }

    fn set(packet: Packet) -> Parcel {
        Parcel::single(Component::App, Component::IndoorUnit1, Operation::Set, packet)
    }
}

/// `f32::round` without std
fn round_half_away_from_zero(value: f32) -> i32 {
    if value >= 0.0 {
        (value + 0.5) as i32
    } else {
        (value - 0.5) as i32
    }
}
