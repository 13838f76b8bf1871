//! Transport trait definitions
//!
//! The transport is the seam between the protocol engine and a concrete USB
//! backend. It exposes the device's two primitives - a vendor control
//! exchange for short commands and a bulk exchange for page data - as
//! blocking calls that report the number of bytes actually moved.

use crate::error::TransportError;

/// A blocking request/response channel to the flasher device.
///
/// All methods block the calling thread until the exchange completes or
/// errors. Implementations report the underlying failure verbatim; length
/// checking is the codec's job, so a short transfer is returned as a
/// success with a smaller count.
///
/// The device handle behind an implementation is a single shared resource
/// with no internal locking: callers must guarantee exclusive access for
/// the duration of a whole program or read operation.
pub trait FlashTransport {
    /// Vendor control transfer, host to device.
    ///
    /// `request` selects the device command (see [`crate::codec`]); `value`
    /// carries the flash opcode; `data` is the optional short payload.
    /// Returns the number of payload bytes transferred.
    fn control_out(&mut self, request: u8, value: u16, data: &[u8])
        -> Result<usize, TransportError>;

    /// Vendor control transfer, device to host.
    ///
    /// Fills `buf` with the device's response and returns the number of
    /// bytes received.
    fn control_in(
        &mut self,
        request: u8,
        value: u16,
        buf: &mut [u8],
    ) -> Result<usize, TransportError>;

    /// Bulk transfer, host to device. Returns the number of bytes sent.
    fn bulk_out(&mut self, data: &[u8]) -> Result<usize, TransportError>;

    /// Bulk transfer, device to host. Fills `buf` and returns the number of
    /// bytes received.
    fn bulk_in(&mut self, buf: &mut [u8]) -> Result<usize, TransportError>;

    /// Sleep for the given number of microseconds between status polls.
    ///
    /// This is a host-CPU courtesy only - it is not observable by the chip
    /// and implementations may make it a no-op.
    fn delay_us(&mut self, us: u32);
}
