//! CLI argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

/// Parse a string as a hex or decimal u32
fn parse_hex_u32(s: &str) -> Result<u32, String> {
    if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        u32::from_str_radix(hex, 16).map_err(|e| format!("Invalid hex value: {}", e))
    } else {
        s.parse::<u32>().map_err(|e| format!("Invalid number: {}", e))
    }
}

/// Parse a string as a hex or decimal u16
fn parse_hex_u16(s: &str) -> Result<u16, String> {
    if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        u16::from_str_radix(hex, 16).map_err(|e| format!("Invalid hex value: {}", e))
    } else {
        s.parse::<u16>().map_err(|e| format!("Invalid number: {}", e))
    }
}

#[derive(Parser)]
#[command(name = "spiflasher")]
#[command(author, version, about = "USB SPI NOR flash programmer", long_about = None)]
pub struct Cli {
    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// Device selection options shared across commands
#[derive(clap::Args, Debug, Clone)]
pub struct DeviceArgs {
    /// USB vendor id (hex, e.g. 0xdead)
    #[arg(long, value_parser = parse_hex_u16, default_value = "0xdead")]
    pub vid: u16,

    /// USB product id (hex, e.g. 0xbeef)
    #[arg(long, value_parser = parse_hex_u16, default_value = "0xbeef")]
    pub pid: u16,

    /// Device index when multiple boards are connected
    #[arg(long, default_value = "0")]
    pub device: usize,

    /// USB transfer timeout in milliseconds
    #[arg(long, default_value = "1000")]
    pub timeout_ms: u64,
}

impl DeviceArgs {
    /// Build the transport configuration from the parsed arguments
    pub fn to_config(&self) -> spiflasher_usb::UsbFlasherConfig {
        spiflasher_usb::UsbFlasherConfig {
            vendor_id: self.vid,
            product_id: self.pid,
            device_index: self.device,
            timeout: Duration::from_millis(self.timeout_ms),
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Read flash contents to file
    Read {
        #[command(flatten)]
        device: DeviceArgs,

        /// Output file path
        #[arg(short, long)]
        output: PathBuf,

        /// Start address in flash (hex or decimal)
        #[arg(short, long, value_parser = parse_hex_u32, default_value = "0")]
        address: u32,

        /// Number of bytes to read
        #[arg(short, long, value_parser = parse_hex_u32)]
        size: u32,
    },

    /// Program file contents into flash
    Write {
        #[command(flatten)]
        device: DeviceArgs,

        /// Input file path
        #[arg(short, long)]
        input: PathBuf,

        /// Start address in flash (hex or decimal)
        #[arg(short, long, value_parser = parse_hex_u32, default_value = "0")]
        address: u32,

        /// Number of bytes to program (defaults to the file size)
        #[arg(short, long, value_parser = parse_hex_u32)]
        size: Option<u32>,

        /// Don't verify flash contents after writing
        #[arg(long)]
        no_verify: bool,
    },

    /// Verify flash contents against file
    Verify {
        #[command(flatten)]
        device: DeviceArgs,

        /// Input file path to verify against
        #[arg(short, long)]
        input: PathBuf,

        /// Start address in flash (hex or decimal)
        #[arg(short, long, value_parser = parse_hex_u32, default_value = "0")]
        address: u32,
    },

    /// List connected flasher boards
    ListDevices {
        #[command(flatten)]
        device: DeviceArgs,
    },
}
