//! Error types for the USB transport

use thiserror::Error;

/// Result type for USB transport operations.
pub type Result<T> = std::result::Result<T, UsbFlasherError>;

/// Errors that can occur while talking to the flasher board.
#[derive(Debug, Error)]
pub enum UsbFlasherError {
    /// No device with the configured vendor/product id was found.
    #[error("flasher device not found (VID:{vid:04X} PID:{pid:04X})")]
    DeviceNotFound {
        /// Vendor id searched for.
        vid: u16,
        /// Product id searched for.
        pid: u16,
    },

    /// Device enumeration or open failed.
    #[error("failed to open usb device: {0}")]
    OpenFailed(String),

    /// Claiming the device interface failed.
    #[error("failed to claim interface: {0}")]
    ClaimFailed(String),

    /// A control or bulk transfer failed.
    #[error("usb transfer failed: {0}")]
    TransferFailed(String),
}

impl From<nusb::Error> for UsbFlasherError {
    fn from(e: nusb::Error) -> Self {
        UsbFlasherError::TransferFailed(e.to_string())
    }
}
