//! Command codec
//!
//! Encodes the four wire exchange shapes of the flasher device onto the
//! transport's control/bulk primitives. Each exchange performs exactly one
//! transport call; there is no buffering, batching, or retrying here. Any
//! transfer that moves fewer bytes than requested is an error.
//!
//! The device understands three vendor requests: `REQ_COMMAND` runs a plain
//! flash command (with the opcode in the control transfer's value field and
//! an optional short payload), while `REQ_PROGRAM` and `REQ_READ` prime the
//! chip with a 3-byte address ahead of a bulk data phase.

use crate::error::TransportError;
use crate::transport::FlashTransport;

/// Vendor request: execute a flash command, payload inline
pub const REQ_COMMAND: u8 = 0x04;
/// Vendor request: prime a page program, data follows on the bulk endpoint
pub const REQ_PROGRAM: u8 = 0x05;
/// Vendor request: prime a page read, data returned on the bulk endpoint
pub const REQ_READ: u8 = 0x06;

/// One wire exchange with the flasher device.
///
/// One variant per exchange shape, each carrying only the fields that shape
/// needs.
#[derive(Debug)]
pub enum Exchange<'a> {
    /// Host-to-device command with an optional short payload
    /// (write-enable has none, sector erase carries its 3-byte address).
    WriteNoData {
        /// Flash command opcode.
        opcode: u8,
        /// Inline payload, at most a few bytes.
        payload: &'a [u8],
    },
    /// Device-to-host command response (status register polls).
    ReadNoData {
        /// Flash command opcode.
        opcode: u8,
        /// Buffer for the response bytes.
        response: &'a mut [u8],
    },
    /// Prime the chip with a page-program address before a bulk write.
    PageWriteAddress {
        /// Flash command opcode.
        opcode: u8,
        /// Flash address; only the low 24 bits go on the wire.
        address: u32,
    },
    /// Prime the chip with a page-read address before a bulk read.
    PageReadAddress {
        /// Flash command opcode.
        opcode: u8,
        /// Flash address; only the low 24 bits go on the wire.
        address: u32,
    },
}

/// Encode an address as the wire's 3-byte big-endian field.
///
/// Bits 24..32 are discarded, so addresses wrap modulo 16 MiB.
pub fn encode_address(address: u32) -> [u8; 3] {
    [(address >> 16) as u8, (address >> 8) as u8, address as u8]
}

/// Perform one exchange with the device.
///
/// The transport's error is surfaced verbatim; a transferred length that
/// does not match the requested length becomes
/// [`TransportError::ShortTransfer`].
pub fn exchange<T: FlashTransport + ?Sized>(
    transport: &mut T,
    request: Exchange<'_>,
) -> Result<(), TransportError> {
    match request {
        Exchange::WriteNoData { opcode, payload } => {
            let transferred = transport.control_out(REQ_COMMAND, opcode as u16, payload)?;
            expect_full(payload.len(), transferred)
        }
        Exchange::ReadNoData { opcode, response } => {
            let requested = response.len();
            let transferred = transport.control_in(REQ_COMMAND, opcode as u16, response)?;
            expect_full(requested, transferred)
        }
        Exchange::PageWriteAddress { opcode, address } => {
            let field = encode_address(address);
            let transferred = transport.control_out(REQ_PROGRAM, opcode as u16, &field)?;
            expect_full(field.len(), transferred)
        }
        Exchange::PageReadAddress { opcode, address } => {
            let field = encode_address(address);
            let transferred = transport.control_out(REQ_READ, opcode as u16, &field)?;
            expect_full(field.len(), transferred)
        }
    }
}

/// Send page data on the bulk endpoint.
pub fn bulk_write<T: FlashTransport + ?Sized>(
    transport: &mut T,
    data: &[u8],
) -> Result<(), TransportError> {
    let transferred = transport.bulk_out(data)?;
    expect_full(data.len(), transferred)
}

/// Receive page data from the bulk endpoint.
pub fn bulk_read<T: FlashTransport + ?Sized>(
    transport: &mut T,
    buf: &mut [u8],
) -> Result<(), TransportError> {
    let requested = buf.len();
    let transferred = transport.bulk_in(buf)?;
    expect_full(requested, transferred)
}

fn expect_full(requested: usize, transferred: usize) -> Result<(), TransportError> {
    if transferred == requested {
        Ok(())
    } else {
        Err(TransportError::ShortTransfer {
            requested,
            transferred,
        })
    }
}
