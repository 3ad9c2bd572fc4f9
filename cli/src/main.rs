//! Command-line tool for Panasonic H&C climate units.
//!
//! `decode` and `encode` work offline; everything else connects over BLE.

mod args;
mod output;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use clap::Parser;
use colored::Colorize;
use tokio::sync::Notify;
use tracing_subscriber::EnvFilter;

use panasonic_hc::ble::{BleTransport, DeviceSelector};
use panasonic_hc::session::UpdateCallback;
use panasonic_hc::{Command, CommandBuilder, Parcel, Session};

use args::{Args, Cli};
use output::{hex_frame, parse_hex, print_parcel, print_status};

#[tokio::main]
async fn main() -> Result<()> {
    let Args {
        log_level,
        device,
        scan_timeout,
        command,
    } = Args::parse();

    init_logging(&log_level);

    let scan_timeout = Duration::from_secs(scan_timeout);
    match command {
        Cli::Decode { hex } => decode(&hex),
        Cli::Encode { action } => encode(&action.into()),
        Cli::Status { wait } => {
            status(device.as_deref(), scan_timeout, Duration::from_secs(wait)).await
        }
        Cli::Control(action) => control(device.as_deref(), scan_timeout, &action.into()).await,
    }
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

fn decode(input: &str) -> Result<()> {
    let frame = parse_hex(input).context("Invalid hex frame")?;
    let parcel = Parcel::decode(&frame).context("Failed to decode frame")?;
    print_parcel(&parcel);
    Ok(())
}

fn encode(command: &Command) -> Result<()> {
    let parcel = CommandBuilder::new().build(command)?;
    let frame = parcel.encode()?;
    println!("{}", hex_frame(&frame));
    Ok(())
}

async fn open_session(
    device: Option<&str>,
    scan_timeout: Duration,
) -> Result<Session<BleTransport>> {
    let Some(device) = device else {
        bail!("--device is required for this command");
    };
    let selector: DeviceSelector = device.parse()?;

    println!("Scanning for {}...", selector);
    let transport = BleTransport::find(&selector, scan_timeout)
        .await
        .with_context(|| format!("Could not find {}", selector))?;

    let session = Session::new(transport);
    session.connect().await.context("Failed to connect")?;
    println!("{}", "Connected".green());
    Ok(session)
}

async fn status(device: Option<&str>, scan_timeout: Duration, wait: Duration) -> Result<()> {
    let session = open_session(device, scan_timeout).await?;

    let updated = Arc::new(Notify::new());
    let notify = updated.clone();
    let callback: Arc<UpdateCallback> = Arc::new(move || notify.notify_one());
    session.register_update_callback(&callback);

    // The report may have landed before the callback was registered
    if session.status().is_none() {
        let _ = tokio::time::timeout(wait, updated.notified()).await;
    }
    let snapshot = session.status();
    session.disconnect().await.context("Failed to disconnect")?;

    let snapshot = snapshot.ok_or_else(|| anyhow!("No status report within {:?}", wait))?;
    print_status(&snapshot);
    Ok(())
}

async fn control(device: Option<&str>, scan_timeout: Duration, command: &Command) -> Result<()> {
    // Validate before scanning
    CommandBuilder::new().build(command)?;

    let session = open_session(device, scan_timeout).await?;
    let sent = session
        .send(command)
        .await
        .with_context(|| format!("Failed to send {}", command));
    session.disconnect().await.context("Failed to disconnect")?;
    sent?;

    println!("{} {}", "Sent".green(), command);
    Ok(())
}
