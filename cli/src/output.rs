//! Terminal output

use colored::Colorize;

use panasonic_hc::protocol::{Packet, PacketKind, Parcel, StatusSnapshot};

/// Print a decoded parcel with every packet interpreted
pub fn print_parcel(parcel: &Parcel) {
    println!(
        "{} => {} {}",
        parcel.source.to_string().bold(),
        parcel.destination.to_string().bold(),
        parcel.operation.to_string().cyan()
    );

    if parcel.is_empty() {
        println!("  {}", "(no packets)".dimmed());
    }
    for packet in parcel {
        print_packet(&packet);
    }
}

fn print_packet(packet: &Packet) {
    println!("  {}", packet);
    match packet.kind() {
        Ok(PacketKind::Status(status)) => {
            for line in status.to_string().lines() {
                println!("    {}", line);
            }
        }
        Ok(PacketKind::OutdoorTemperature(temperature)) => {
            println!(
                "    Outdoor: {} {}",
                temperature,
                "(unverified)".dimmed()
            );
        }
        Ok(PacketKind::Other) => {}
        Err(e) => println!("    {}", e.to_string().red()),
    }
}

/// Print a status report
pub fn print_status(status: &StatusSnapshot) {
    println!("{}", status);
}

/// Lowercase hex with byte separators
pub fn hex_frame(frame: &[u8]) -> String {
    frame
        .iter()
        .map(|b| hex::encode([*b]))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Parse hex, tolerating whitespace and `:` separators
pub fn parse_hex(input: &str) -> Result<Vec<u8>, hex::FromHexError> {
    let cleaned: String = input
        .chars()
        .filter(|c| !c.is_whitespace() && *c != ':')
        .collect();
    hex::decode(cleaned)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_round_trip() {
        let bytes = parse_hex("b2 4b:4a\n4a").unwrap();
        assert_eq!(bytes, vec![0xb2, 0x4b, 0x4a, 0x4a]);
        assert_eq!(hex_frame(&bytes), "b2 4b 4a 4a");
    }

    #[test]
    fn test_parse_hex_invalid() {
        assert!(parse_hex("b2 4").is_err());
        assert!(parse_hex("zz").is_err());
    }
}
