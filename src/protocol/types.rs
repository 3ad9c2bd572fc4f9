//! Protocol enumerations and value types
//!
//! # Wire values
//!
//! | Component       | Byte |   | Operation       | Byte |
//! |-----------------|------|---|-----------------|------|
//! | IndoorUnit1     | 1    |   | Set             | 0    |
//! | OutdoorUnit1    | 9    |   | SetResponse     | 1    |
//! | AllUnits        | 247  |   | Request         | 2    |
//! | App             | 249  |   | RequestResponse | 3    |
//! | BleModuleUart   | 254  |   | Notify          | 4    |

use core::fmt;
use core::str::FromStr;

use thiserror::Error;

use crate::config::temperature::WIRE_OFFSET;
use crate::error::ProtocolError;

/// Logical endpoints used as parcel source and destination
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Component {
    /// Indoor unit controller
    IndoorUnit1 = 1,
    /// Outdoor unit
    OutdoorUnit1 = 9,
    /// Broadcast to every unit
    AllUnits = 247,
    /// Controller application (this side)
    App = 249,
    /// The BLE link module itself
    BleModuleUart = 254,
}

impl TryFrom<u8> for Component {
    type Error = ProtocolError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::IndoorUnit1),
            9 => Ok(Self::OutdoorUnit1),
            247 => Ok(Self::AllUnits),
            249 => Ok(Self::App),
            254 => Ok(Self::BleModuleUart),
            _ => Err(ProtocolError::UnknownComponent(value)),
        }
    }
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::IndoorUnit1 => "I_UNIT1",
            Self::OutdoorUnit1 => "O_UNIT1",
            Self::AllUnits => "ALL_UNITS",
            Self::App => "APP",
            Self::BleModuleUart => "BLE_MODULE_UART",
        };
        f.write_str(name)
    }
}

/// Parcel operation
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Set = 0,
    SetResponse = 1,
    Request = 2,
    RequestResponse = 3,
    Notify = 4,
}

impl TryFrom<u8> for Operation {
    type Error = ProtocolError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Set),
            1 => Ok(Self::SetResponse),
            2 => Ok(Self::Request),
            3 => Ok(Self::RequestResponse),
            4 => Ok(Self::Notify),
            _ => Err(ProtocolError::UnknownOperation(value)),
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Set => "SET",
            Self::SetResponse => "SET_RES",
            Self::Request => "REQ",
            Self::RequestResponse => "REQ_RES",
            Self::Notify => "NOTIFY",
        };
        f.write_str(name)
    }
}

/// Error returned when parsing a mode or fan speed name
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("unknown name")]
pub struct UnknownName;

/// Operating mode
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    Heat = 1,
    Cool = 2,
    FanOnly = 3,
    Dry = 4,
    Auto = 5,
}

impl Mode {
    /// All modes in wire order
    pub const ALL: [Mode; 5] = [Self::Heat, Self::Cool, Self::FanOnly, Self::Dry, Self::Auto];

    /// Lowercase name used by controllers
    pub fn name(&self) -> &'static str {
        match self {
            Self::Heat => "heat",
            Self::Cool => "cool",
            Self::FanOnly => "fan_only",
            Self::Dry => "dry",
            Self::Auto => "auto",
        }
    }
}

impl TryFrom<u8> for Mode {
    type Error = ProtocolError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::Heat),
            2 => Ok(Self::Cool),
            3 => Ok(Self::FanOnly),
            4 => Ok(Self::Dry),
            5 => Ok(Self::Auto),
            _ => Err(ProtocolError::UnknownMode(value)),
        }
    }
}

impl FromStr for Mode {
    type Err = UnknownName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|mode| mode.name() == s)
            .ok_or(UnknownName)
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Fan speed
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FanSpeed {
    Auto = 2,
    High = 3,
    Medium = 4,
    Low = 5,
}

impl FanSpeed {
    /// All fan speeds in wire order
    pub const ALL: [FanSpeed; 4] = [Self::Auto, Self::High, Self::Medium, Self::Low];

    /// Lowercase name used by controllers
    pub fn name(&self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}

impl TryFrom<u8> for FanSpeed {
    type Error = ProtocolError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            2 => Ok(Self::Auto),
            3 => Ok(Self::High),
            4 => Ok(Self::Medium),
            5 => Ok(Self::Low),
            _ => Err(ProtocolError::UnknownFanSpeed(value)),
        }
    }
}

impl FromStr for FanSpeed {
    type Err = UnknownName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|speed| speed.name() == s)
            .ok_or(UnknownName)
    }
}

impl fmt::Display for FanSpeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Signed temperature in half-degree steps
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Temperature(i16);

impl Temperature {
    /// Create from a count of half degrees
    pub const fn from_half_degrees(half_degrees: i16) -> Self {
        Self(half_degrees)
    }

    /// Decode a wire byte (half degrees plus 70)
    pub const fn from_wire(byte: u8) -> Self {
        Self(byte as i16 - WIRE_OFFSET)
    }

    pub const fn half_degrees(&self) -> i16 {
        self.0
    }

    pub fn celsius(&self) -> f32 {
        self.0 as f32 / 2.0
    }
}

impl fmt::Display for Temperature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let fraction = if abs % 2 == 0 { 0 } else { 5 };
        write!(f, "{}{}.{}", sign, abs / 2, fraction)
    }
}

/// Outdoor temperature in tenths of a degree
///
/// Taken from byte 1 of a type-33 payload. Not verified against real firmware.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OutdoorTemperature(u8);

impl OutdoorTemperature {
    pub const fn from_tenths(tenths: u8) -> Self {
        Self(tenths)
    }

    pub const fn tenths(&self) -> u8 {
        self.0
    }

    pub fn celsius(&self) -> f32 {
        self.0 as f32 / 10.0
    }
}

impl fmt::Display for OutdoorTemperature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.0 / 10, self.0 % 10)
    }
}
