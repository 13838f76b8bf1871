//! spiflasher - SPI NOR flash programmer for the FPGA USB device controller
//!
//! Programs, reads, and verifies a discrete SPI NOR flash chip sitting
//! behind the USB device controller demo board. The board exposes a small
//! fixed command set: vendor control transfers carry flash commands, a bulk
//! endpoint pair carries 256-byte page data.

mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};
use spiflasher_usb::UsbFlasher;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.verbose {
        0 => {} // default (info)
        1 => log::set_max_level(log::LevelFilter::Debug),
        _ => log::set_max_level(log::LevelFilter::Trace),
    }

    match cli.command {
        Commands::Read {
            device,
            output,
            address,
            size,
        } => {
            let mut flasher = UsbFlasher::open_with_config(device.to_config())?;
            commands::read::run_read(&mut flasher, &output, address, size as usize)
        }
        Commands::Write {
            device,
            input,
            address,
            size,
            no_verify,
        } => {
            let mut flasher = UsbFlasher::open_with_config(device.to_config())?;
            commands::write::run_write(
                &mut flasher,
                &input,
                address,
                size.map(|s| s as usize),
                !no_verify,
            )
        }
        Commands::Verify {
            device,
            input,
            address,
        } => {
            let mut flasher = UsbFlasher::open_with_config(device.to_config())?;
            commands::verify::run_verify(&mut flasher, &input, address)
        }
        Commands::ListDevices { device } => commands::list_devices(&device.to_config()),
    }
}
