//! CLI command implementations

pub mod read;
pub mod verify;
pub mod write;

mod progress;

use std::fs::File;
use std::io::Read;
use std::path::Path;

use spiflasher_usb::{UsbFlasher, UsbFlasherConfig};

/// Read file contents into a Vec
fn read_file(path: &Path) -> Result<Vec<u8>, Box<dyn std::error::Error>> {
    let mut file = File::open(path)?;
    let mut data = Vec::new();
    file.read_to_end(&mut data)?;
    println!("Read {} bytes from {:?}", data.len(), path);
    Ok(data)
}

/// List connected flasher boards
pub fn list_devices(config: &UsbFlasherConfig) -> Result<(), Box<dyn std::error::Error>> {
    let devices = UsbFlasher::list_devices(config)?;

    if devices.is_empty() {
        println!(
            "No flasher boards found (VID:{:04X} PID:{:04X})",
            config.vendor_id, config.product_id
        );
    } else {
        for (i, device) in devices.iter().enumerate() {
            println!("{}: {}", i, device);
        }
    }

    Ok(())
}
