//! Chip-level flash primitives
//!
//! Each primitive issues the full command sequence the chip requires,
//! including the write-enable that must immediately precede every erase and
//! page program (the enable latch auto-clears after any completed
//! operation, so enabling once per multi-step job is not enough) and the
//! busy-wait that must follow every write.
//!
//! While the write-in-progress bit is set, no command other than a status
//! read is issued to the chip.

use crate::codec::{self, Exchange};
use crate::error::{Error, Result, TransportError};
use crate::flash::PAGE_SIZE;
use crate::opcodes;
use crate::transport::FlashTransport;

/// Poll cadence for a page program (typical program time is 0.7-5ms).
pub const PROGRAM_POLL_DELAY_US: u32 = 10;
/// Poll budget for a page program.
pub const PROGRAM_TIMEOUT_US: u32 = 10_000;
/// Poll cadence for a 64 KiB sector erase (typical erase time is 150-2000ms).
pub const ERASE_POLL_DELAY_US: u32 = 100_000;
/// Poll budget for a 64 KiB sector erase.
pub const ERASE_TIMEOUT_US: u32 = 4_000_000;

/// Send the Write Enable command.
pub fn write_enable<T: FlashTransport + ?Sized>(
    transport: &mut T,
) -> core::result::Result<(), TransportError> {
    codec::exchange(
        transport,
        Exchange::WriteNoData {
            opcode: opcodes::WREN,
            payload: &[],
        },
    )
}

/// Read the status register.
pub fn read_status<T: FlashTransport + ?Sized>(
    transport: &mut T,
) -> core::result::Result<u8, TransportError> {
    let mut status = [0u8; 1];
    codec::exchange(
        transport,
        Exchange::ReadNoData {
            opcode: opcodes::RDSR,
            response: &mut status,
        },
    )?;
    Ok(status[0])
}

/// Poll the status register until the write-in-progress bit clears.
///
/// The poll count is bounded by `timeout_us / poll_delay_us`; when the
/// budget is exhausted [`Error::BusyTimeout`] is returned so a
/// malfunctioning chip cannot hang the caller. `poll_delay_us` is slept
/// between polls as a host-CPU courtesy.
pub fn wait_ready<T: FlashTransport + ?Sized>(
    transport: &mut T,
    poll_delay_us: u32,
    timeout_us: u32,
) -> Result<()> {
    let max_polls = if poll_delay_us > 0 {
        timeout_us / poll_delay_us
    } else {
        timeout_us
    };

    for _ in 0..max_polls {
        let status = read_status(transport).map_err(Error::Status)?;
        if status & opcodes::SR1_WIP == 0 {
            return Ok(());
        }
        if poll_delay_us > 0 {
            transport.delay_us(poll_delay_us);
        }
    }

    Err(Error::BusyTimeout { polls: max_polls })
}

/// Erase the 64 KiB sector selected by `sector`.
///
/// The whole sector is erased regardless of how much of it the caller's
/// range actually covers. The wire address field is `[sector, 0x00, 0x00]`.
pub fn erase_sector<T: FlashTransport + ?Sized>(transport: &mut T, sector: u8) -> Result<()> {
    log::debug!("erasing sector 0x{:02X}", sector);

    write_enable(transport).map_err(|source| Error::Erase { sector, source })?;

    let field = [sector, 0x00, 0x00];
    codec::exchange(
        transport,
        Exchange::WriteNoData {
            opcode: opcodes::BE_D8,
            payload: &field,
        },
    )
    .map_err(|source| Error::Erase { sector, source })?;

    wait_ready(transport, ERASE_POLL_DELAY_US, ERASE_TIMEOUT_US)
}

/// Program up to one page at `address`.
///
/// The chunk must not cross a 256-byte page boundary: callers are required
/// to pass `data` such that `(address % 256) + data.len() <= 256`. Violating
/// this is a contract breach, not a recoverable condition.
pub fn program_page<T: FlashTransport + ?Sized>(
    transport: &mut T,
    address: u32,
    data: &[u8],
) -> Result<()> {
    debug_assert!(!data.is_empty() && data.len() <= PAGE_SIZE);
    debug_assert!((address as usize & (PAGE_SIZE - 1)) + data.len() <= PAGE_SIZE);

    log::trace!("programming {} bytes at 0x{:06X}", data.len(), address);

    write_enable(transport).map_err(|source| Error::Program { address, source })?;

    codec::exchange(
        transport,
        Exchange::PageWriteAddress {
            opcode: opcodes::PP,
            address,
        },
    )
    .map_err(|source| Error::Program { address, source })?;

    codec::bulk_write(transport, data).map_err(|source| Error::Program { address, source })?;

    wait_ready(transport, PROGRAM_POLL_DELAY_US, PROGRAM_TIMEOUT_US)
}

/// Read one full page starting at `address`.
///
/// The low address byte need not be page-aligned; whatever the chip streams
/// back for the 256-byte bulk phase is handed to the caller unmodified.
pub fn read_page<T: FlashTransport + ?Sized>(
    transport: &mut T,
    address: u32,
    page: &mut [u8; PAGE_SIZE],
) -> Result<()> {
    codec::exchange(
        transport,
        Exchange::PageReadAddress {
            opcode: opcodes::READ,
            address,
        },
    )
    .map_err(|source| Error::Read { address, source })?;

    codec::bulk_read(transport, page).map_err(|source| Error::Read { address, source })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{REQ_COMMAND, REQ_PROGRAM, REQ_READ};

    /// Event log entry for the scripted transport.
    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Event {
        ControlOut { request: u8, value: u16, payload: Vec<u8> },
        StatusRead,
        BulkOut(usize),
        BulkIn(usize),
    }

    /// Replays a scripted sequence of status bytes and records all traffic.
    struct ScriptedDevice {
        events: Vec<Event>,
        statuses: Vec<u8>,
        status_cursor: usize,
    }

    impl ScriptedDevice {
        fn new(statuses: &[u8]) -> Self {
            Self {
                events: Vec::new(),
                statuses: statuses.to_vec(),
                status_cursor: 0,
            }
        }
    }

    impl FlashTransport for ScriptedDevice {
        fn control_out(
            &mut self,
            request: u8,
            value: u16,
            data: &[u8],
        ) -> core::result::Result<usize, TransportError> {
            self.events.push(Event::ControlOut {
                request,
                value,
                payload: data.to_vec(),
            });
            Ok(data.len())
        }

        fn control_in(
            &mut self,
            request: u8,
            value: u16,
            buf: &mut [u8],
        ) -> core::result::Result<usize, TransportError> {
            assert_eq!(request, REQ_COMMAND);
            assert_eq!(value, opcodes::RDSR as u16);
            self.events.push(Event::StatusRead);
            buf[0] = if self.status_cursor < self.statuses.len() {
                let status = self.statuses[self.status_cursor];
                self.status_cursor += 1;
                status
            } else {
                // Script exhausted: stay busy
                opcodes::SR1_WIP
            };
            Ok(buf.len())
        }

        fn bulk_out(&mut self, data: &[u8]) -> core::result::Result<usize, TransportError> {
            self.events.push(Event::BulkOut(data.len()));
            Ok(data.len())
        }

        fn bulk_in(&mut self, buf: &mut [u8]) -> core::result::Result<usize, TransportError> {
            self.events.push(Event::BulkIn(buf.len()));
            buf.fill(0xFF);
            Ok(buf.len())
        }

        fn delay_us(&mut self, _us: u32) {}
    }

    #[test]
    fn wait_ready_polls_until_clear() {
        let mut device = ScriptedDevice::new(&[0x01, 0x03, 0x00]);
        wait_ready(&mut device, 10, 10_000).unwrap();
        assert_eq!(device.events.len(), 3);
        assert!(device.events.iter().all(|e| *e == Event::StatusRead));
    }

    #[test]
    fn wait_ready_gives_up_after_poll_budget() {
        let mut device = ScriptedDevice::new(&[]);
        let err = wait_ready(&mut device, 10, 100).unwrap_err();
        assert_eq!(err, Error::BusyTimeout { polls: 10 });
        assert_eq!(device.events.len(), 10);
    }

    #[test]
    fn erase_sector_sequence() {
        let mut device = ScriptedDevice::new(&[0x01, 0x00]);
        erase_sector(&mut device, 0x2A).unwrap();
        assert_eq!(
            device.events,
            vec![
                Event::ControlOut {
                    request: REQ_COMMAND,
                    value: opcodes::WREN as u16,
                    payload: vec![],
                },
                Event::ControlOut {
                    request: REQ_COMMAND,
                    value: opcodes::BE_D8 as u16,
                    payload: vec![0x2A, 0x00, 0x00],
                },
                Event::StatusRead,
                Event::StatusRead,
            ]
        );
    }

    #[test]
    fn program_page_sequence() {
        let mut device = ScriptedDevice::new(&[0x00]);
        let data = [0x55u8; 64];
        program_page(&mut device, 0x0123C0, &data).unwrap();
        assert_eq!(
            device.events,
            vec![
                Event::ControlOut {
                    request: REQ_COMMAND,
                    value: opcodes::WREN as u16,
                    payload: vec![],
                },
                Event::ControlOut {
                    request: REQ_PROGRAM,
                    value: opcodes::PP as u16,
                    payload: vec![0x01, 0x23, 0xC0],
                },
                Event::BulkOut(64),
                Event::StatusRead,
            ]
        );
    }

    #[test]
    fn read_page_sequence() {
        let mut device = ScriptedDevice::new(&[]);
        let mut page = [0u8; PAGE_SIZE];
        read_page(&mut device, 0x00FF10, &mut page).unwrap();
        assert_eq!(
            device.events,
            vec![
                Event::ControlOut {
                    request: REQ_READ,
                    value: opcodes::READ as u16,
                    payload: vec![0x00, 0xFF, 0x10],
                },
                Event::BulkIn(PAGE_SIZE),
            ]
        );
        assert_eq!(page, [0xFF; PAGE_SIZE]);
    }

    #[test]
    fn status_poll_failure_keeps_transport_error() {
        struct FailingStatus;

        impl FlashTransport for FailingStatus {
            fn control_out(
                &mut self,
                _request: u8,
                _value: u16,
                data: &[u8],
            ) -> core::result::Result<usize, TransportError> {
                Ok(data.len())
            }
            fn control_in(
                &mut self,
                _request: u8,
                _value: u16,
                _buf: &mut [u8],
            ) -> core::result::Result<usize, TransportError> {
                Err(TransportError::Usb("pipe stalled".into()))
            }
            fn bulk_out(&mut self, data: &[u8]) -> core::result::Result<usize, TransportError> {
                Ok(data.len())
            }
            fn bulk_in(&mut self, buf: &mut [u8]) -> core::result::Result<usize, TransportError> {
                Ok(buf.len())
            }
            fn delay_us(&mut self, _us: u32) {}
        }

        let err = wait_ready(&mut FailingStatus, 10, 10_000).unwrap_err();
        assert_eq!(err, Error::Status(TransportError::Usb("pipe stalled".into())));
    }
}
