//! Controller commands
//!
//! Every command becomes a single-packet parcel sent from `APP`:
//!
//! | Command           | Type | Payload                      | Destination     | Operation |
//! |-------------------|------|------------------------------|-----------------|-----------|
//! | `SetPower`        | 65   | `[state + 2]`                | I_UNIT1         | SET       |
//! | `SetMode`         | 66   | `[mode]`                     | I_UNIT1         | SET       |
//! | `SetFanSpeed`     | 67*  | `[fan speed]`                | I_UNIT1         | SET       |
//! | `SetTemperature`  | 76   | `[9, 0, round(t * 2 + 70), 0]` | I_UNIT1       | SET       |
//! | `SetEnergySaving` | 84   | `[state]`                    | I_UNIT1         | SET       |
//! | `RequestStatus`   | 129  | `[4, 0, 14]`                 | I_UNIT1         | REQ       |
//! | `SetOuting`       | 105  | `[0, 0, 17, 2, state]`       | BLE_MODULE_UART | SET       |
//!
//! \* configurable, see [`CommandSettings`](crate::config::CommandSettings).

use core::fmt;

use crate::protocol::types::{FanSpeed, Mode};

/// A controller action
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    /// Turn the unit on or off
    SetPower(bool),

    /// Change the operating mode
    SetMode(Mode),

    /// Change the fan speed
    SetFanSpeed(FanSpeed),

    /// Change the setpoint, in degrees
    SetTemperature(f32),

    /// Toggle energy saving
    SetEnergySaving(bool),

    /// Ask the unit for a status report
    RequestStatus,

    /// Toggle away mode on the link module
    SetOuting(bool),
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let on_off = |state: bool| if state { "on" } else { "off" };
        match self {
            Self::SetPower(state) => write!(f, "power {}", on_off(*state)),
            Self::SetMode(mode) => write!(f, "mode {}", mode),
            Self::SetFanSpeed(speed) => write!(f, "fan {}", speed),
            Self::SetTemperature(celsius) => write!(f, "temperature {}", celsius),
            Self::SetEnergySaving(state) => write!(f, "energy saving {}", on_off(*state)),
            Self::RequestStatus => f.write_str("status request"),
            Self::SetOuting(state) => write!(f, "outing {}", on_off(*state)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Command::SetPower(true)), "power on");
        assert_eq!(format!("{}", Command::SetMode(Mode::FanOnly)), "mode fan_only");
        assert_eq!(format!("{}", Command::SetTemperature(21.5)), "temperature 21.5");
        assert_eq!(format!("{}", Command::RequestStatus), "status request");
    }
}
