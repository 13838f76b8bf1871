//! Error types for spiflasher-core

use thiserror::Error;

/// Failure of a single transport exchange.
///
/// Short transfers are folded in here because the caller treats them exactly
/// like any other failed exchange: the operation is aborted and the error is
/// surfaced without retry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The underlying USB exchange failed; the backend's message is carried
    /// verbatim.
    #[error("usb transfer failed: {0}")]
    Usb(String),

    /// The exchange completed but moved fewer bytes than requested.
    #[error("short transfer: requested {requested} bytes, transferred {transferred}")]
    ShortTransfer {
        /// Bytes the caller asked to move.
        requested: usize,
        /// Bytes the transport reported as moved.
        transferred: usize,
    },
}

/// Errors produced by flash operations.
///
/// Each transport-level failure is wrapped with the phase it occurred in and
/// the sector or address it targeted, so a failed multi-sector program can be
/// pinned to a specific wire operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Erasing a 64 KiB sector failed.
    #[error("erase of sector 0x{sector:02X} failed: {source}")]
    Erase {
        /// Wire sector selector (address bits 16..24).
        sector: u8,
        /// The failed exchange.
        source: TransportError,
    },

    /// Programming a page chunk failed.
    #[error("page program at 0x{address:06X} failed: {source}")]
    Program {
        /// Flash address of the chunk.
        address: u32,
        /// The failed exchange.
        source: TransportError,
    },

    /// Reading a page failed.
    #[error("page read at 0x{address:06X} failed: {source}")]
    Read {
        /// Flash address primed for the read.
        address: u32,
        /// The failed exchange.
        source: TransportError,
    },

    /// A status register poll failed.
    #[error("status poll failed: {0}")]
    Status(TransportError),

    /// The chip's write-in-progress bit never cleared within the poll budget.
    #[error("flash stayed busy after {polls} status polls")]
    BusyTimeout {
        /// Number of polls issued before giving up.
        polls: u32,
    },

    /// Post-write verification found a differing byte.
    #[error(
        "verify mismatch at offset 0x{offset:06X}: expected 0x{expected:02X}, found 0x{actual:02X}"
    )]
    VerifyMismatch {
        /// Byte offset from the start of the verified range.
        offset: u32,
        /// Byte that was programmed.
        expected: u8,
        /// Byte read back from the chip.
        actual: u8,
    },
}

/// Result type alias using the core [`Error`] type.
pub type Result<T> = core::result::Result<T, Error>;
