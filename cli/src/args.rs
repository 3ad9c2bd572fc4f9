//! Command-line arguments

use clap::{Parser, Subcommand, ValueEnum};

use panasonic_hc::config::ble::SCAN_TIMEOUT_SECS;
use panasonic_hc::protocol::{FanSpeed, Mode};
use panasonic_hc::Command;

#[derive(Parser)]
#[command(name = "panasonic-hc")]
#[command(about = "Control Panasonic H&C climate units over BLE")]
pub struct Args {
    /// Log level (overridden by RUST_LOG)
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: String,

    /// Bluetooth address or advertised name of the unit
    #[arg(short, long, global = true)]
    pub device: Option<String>,

    /// Seconds to scan for the unit
    #[arg(long, global = true, default_value_t = SCAN_TIMEOUT_SECS)]
    pub scan_timeout: u64,

    #[command(subcommand)]
    pub command: Cli,
}

#[derive(Subcommand)]
pub enum Cli {
    /// Decode an obfuscated frame given as hex
    Decode {
        /// Frame bytes, e.g. "b2 4b 4a 4a 4b 0a 0b 08 48"
        hex: String,
    },

    /// Print the obfuscated frame for a command without connecting
    Encode {
        #[command(subcommand)]
        action: Action,
    },

    /// Connect and print the first status report
    Status {
        /// Seconds to wait for the report
        #[arg(long, default_value_t = 10)]
        wait: u64,
    },

    #[command(flatten)]
    Control(Action),
}

#[derive(Subcommand, Clone, Copy)]
pub enum Action {
    /// Turn the unit on or off
    Power { state: Switch },

    /// Set the operating mode (heat, cool, fan_only, dry, auto)
    Mode {
        #[arg(value_parser = parse_mode)]
        mode: Mode,
    },

    /// Set the fan speed (auto, high, medium, low)
    Fan {
        #[arg(value_parser = parse_fan_speed)]
        speed: FanSpeed,
    },

    /// Set the target temperature in degrees
    Temp { celsius: f32 },

    /// Toggle energy saving
    Eco { state: Switch },

    /// Toggle away mode
    Outing { state: Switch },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Switch {
    On,
    Off,
}

impl From<Switch> for bool {
    fn from(switch: Switch) -> Self {
        switch == Switch::On
    }
}

impl From<Action> for Command {
    fn from(action: Action) -> Self {
        match action {
            Action::Power { state } => Command::SetPower(state.into()),
            Action::Mode { mode } => Command::SetMode(mode),
            Action::Fan { speed } => Command::SetFanSpeed(speed),
            Action::Temp { celsius } => Command::SetTemperature(celsius),
            Action::Eco { state } => Command::SetEnergySaving(state.into()),
            Action::Outing { state } => Command::SetOuting(state.into()),
        }
    }
}

fn parse_mode(s: &str) -> Result<Mode, String> {
    s.parse().map_err(|_| {
        let names: Vec<_> = Mode::ALL.iter().map(Mode::name).collect();
        format!("expected one of: {}", names.join(", "))
    })
}

fn parse_fan_speed(s: &str) -> Result<FanSpeed, String> {
    s.parse().map_err(|_| {
        let names: Vec<_> = FanSpeed::ALL.iter().map(FanSpeed::name).collect();
        format!("expected one of: {}", names.join(", "))
    })
}
