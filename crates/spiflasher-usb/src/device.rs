//! USB device implementation
//!
//! Provides the `UsbFlasher` struct wrapping a claimed nusb interface. All
//! transfers are blocking with a configurable timeout; the handle is a
//! single shared resource with no internal locking, so callers must keep
//! exclusive access for the duration of a whole program or read operation.

use std::time::Duration;

use nusb::transfer::{Buffer, Bulk, ControlIn, ControlOut, ControlType, In, Out, Recipient};
use nusb::{Endpoint, Interface, MaybeFuture};
use spiflasher_core::error::TransportError;
use spiflasher_core::transport::FlashTransport;

use crate::error::{Result, UsbFlasherError};
use crate::protocol::*;

/// Configuration options for opening a flasher board.
#[derive(Debug, Clone)]
pub struct UsbFlasherConfig {
    /// USB vendor id to search for.
    pub vendor_id: u16,
    /// USB product id to search for.
    pub product_id: u16,
    /// Device index when multiple boards are connected.
    pub device_index: usize,
    /// Transfer timeout.
    pub timeout: Duration,
}

impl Default for UsbFlasherConfig {
    fn default() -> Self {
        Self {
            vendor_id: USB_VENDOR_ID,
            product_id: USB_PRODUCT_ID,
            device_index: 0,
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
        }
    }
}

/// A claimed flasher board.
pub struct UsbFlasher {
    interface: Interface,
    timeout: Duration,
}

impl UsbFlasher {
    /// Open the first available board with the default vendor/product id.
    pub fn open() -> Result<Self> {
        Self::open_with_config(UsbFlasherConfig::default())
    }

    /// Open a board with the specified configuration.
    pub fn open_with_config(config: UsbFlasherConfig) -> Result<Self> {
        let devices: Vec<_> = nusb::list_devices()
            .wait()
            .map_err(|e| UsbFlasherError::OpenFailed(e.to_string()))?
            .filter(|d| {
                d.vendor_id() == config.vendor_id && d.product_id() == config.product_id
            })
            .collect();

        if devices.is_empty() {
            return Err(UsbFlasherError::DeviceNotFound {
                vid: config.vendor_id,
                pid: config.product_id,
            });
        }

        let device_info = devices
            .get(config.device_index)
            .ok_or(UsbFlasherError::DeviceNotFound {
                vid: config.vendor_id,
                pid: config.product_id,
            })?;

        log::info!(
            "opening flasher at bus {} address {}",
            device_info.busnum(),
            device_info.device_address()
        );

        let device = device_info
            .open()
            .wait()
            .map_err(|e| UsbFlasherError::OpenFailed(e.to_string()))?;

        let interface = device
            .claim_interface(0)
            .wait()
            .map_err(|e| UsbFlasherError::ClaimFailed(e.to_string()))?;

        Ok(Self {
            interface,
            timeout: config.timeout,
        })
    }

    /// List all connected boards matching the configured vendor/product id.
    pub fn list_devices(config: &UsbFlasherConfig) -> Result<Vec<UsbFlasherInfo>> {
        let devices = nusb::list_devices()
            .wait()
            .map_err(|e| UsbFlasherError::OpenFailed(e.to_string()))?
            .filter(|d| {
                d.vendor_id() == config.vendor_id && d.product_id() == config.product_id
            })
            .map(|d| UsbFlasherInfo {
                bus: d.busnum(),
                address: d.device_address(),
            })
            .collect();

        Ok(devices)
    }

    /// Vendor control transfer, host to device (bmRequestType 0x40).
    fn control_write_raw(&mut self, request: u8, value: u16, data: &[u8]) -> Result<usize> {
        self.interface
            .control_out(
                ControlOut {
                    control_type: ControlType::Vendor,
                    recipient: Recipient::Device,
                    request,
                    value,
                    index: 0,
                    data,
                },
                self.timeout,
            )
            .wait()
            .map_err(|e| UsbFlasherError::TransferFailed(e.to_string()))?;

        Ok(data.len())
    }

    /// Vendor control transfer, device to host (bmRequestType 0xC0).
    fn control_read_raw(&mut self, request: u8, value: u16, buf: &mut [u8]) -> Result<usize> {
        let data = self
            .interface
            .control_in(
                ControlIn {
                    control_type: ControlType::Vendor,
                    recipient: Recipient::Device,
                    request,
                    value,
                    index: 0,
                    length: buf.len() as u16,
                },
                self.timeout,
            )
            .wait()
            .map_err(|e| UsbFlasherError::TransferFailed(e.to_string()))?;

        let len = data.len().min(buf.len());
        buf[..len].copy_from_slice(&data[..len]);
        Ok(len)
    }

    /// Blocking bulk write on the OUT endpoint.
    fn bulk_write_raw(&mut self, data: &[u8]) -> Result<usize> {
        let mut out_ep: Endpoint<Bulk, Out> = self
            .interface
            .endpoint(BULK_OUT_EP)
            .map_err(|e| UsbFlasherError::TransferFailed(e.to_string()))?;

        let mut out_buf = Buffer::new(data.len());
        out_buf.extend_from_slice(data);

        let completion = out_ep.transfer_blocking(out_buf, self.timeout);
        match completion.status {
            Ok(()) => Ok(completion.actual_len),
            Err(e) => Err(UsbFlasherError::TransferFailed(e.to_string())),
        }
    }

    /// Blocking bulk read on the IN endpoint.
    fn bulk_read_raw(&mut self, buf: &mut [u8]) -> Result<usize> {
        let mut in_ep: Endpoint<Bulk, In> = self
            .interface
            .endpoint(BULK_IN_EP)
            .map_err(|e| UsbFlasherError::TransferFailed(e.to_string()))?;

        // Request length must be a multiple of the endpoint's packet size.
        let max_packet_size = in_ep.max_packet_size();
        let request_len = buf.len().div_ceil(max_packet_size) * max_packet_size;
        let mut in_buf = Buffer::new(request_len);
        in_buf.set_requested_len(request_len);

        let completion = in_ep.transfer_blocking(in_buf, self.timeout);
        match completion.status {
            Ok(()) => {
                let len = completion.actual_len.min(buf.len());
                buf[..len].copy_from_slice(&completion.buffer[..len]);
                Ok(len)
            }
            Err(e) => Err(UsbFlasherError::TransferFailed(e.to_string())),
        }
    }
}

impl FlashTransport for UsbFlasher {
    fn control_out(
        &mut self,
        request: u8,
        value: u16,
        data: &[u8],
    ) -> std::result::Result<usize, TransportError> {
        self.control_write_raw(request, value, data)
            .map_err(|e| TransportError::Usb(e.to_string()))
    }

    fn control_in(
        &mut self,
        request: u8,
        value: u16,
        buf: &mut [u8],
    ) -> std::result::Result<usize, TransportError> {
        self.control_read_raw(request, value, buf)
            .map_err(|e| TransportError::Usb(e.to_string()))
    }

    fn bulk_out(&mut self, data: &[u8]) -> std::result::Result<usize, TransportError> {
        self.bulk_write_raw(data)
            .map_err(|e| TransportError::Usb(e.to_string()))
    }

    fn bulk_in(&mut self, buf: &mut [u8]) -> std::result::Result<usize, TransportError> {
        self.bulk_read_raw(buf)
            .map_err(|e| TransportError::Usb(e.to_string()))
    }

    fn delay_us(&mut self, us: u32) {
        std::thread::sleep(Duration::from_micros(us as u64));
    }
}

/// Information about a connected flasher board.
#[derive(Debug, Clone)]
pub struct UsbFlasherInfo {
    /// USB bus number.
    pub bus: u8,
    /// USB device address.
    pub address: u8,
}

impl std::fmt::Display for UsbFlasherInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "flasher at bus {} address {}", self.bus, self.address)
    }
}
