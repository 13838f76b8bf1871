//! spiflasher-usb - USB transport for the FPGA device controller board
//!
//! Implements [`spiflasher_core::transport::FlashTransport`] on top of nusb
//! for the USB full/hi-speed device controller demo board: vendor control
//! transfers carry flash commands, bulk endpoints 0x01/0x81 carry page data.

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

mod device;
mod error;
mod protocol;

pub use device::{UsbFlasher, UsbFlasherConfig, UsbFlasherInfo};
pub use error::{Result, UsbFlasherError};
pub use protocol::{DEFAULT_TIMEOUT_MS, USB_PRODUCT_ID, USB_VENDOR_ID};
