//! High-level flash operations
//!
//! The engine turns an arbitrary (address, buffer) request into
//! geometry-correct sequences of primitive calls: sector-by-sector erase
//! interleaved with page-split programming, page-loop reads, and fail-fast
//! verification.
//!
//! Everything here is request-scoped; no state survives a call, so a failed
//! operation never poisons the next one. Partial completion after a
//! mid-operation failure is left on the chip as-is - sectors already erased
//! or written stay that way.

use crate::error::{Error, Result};
use crate::protocol;
use crate::transport::FlashTransport;

/// Program/read transfer granularity in bytes.
pub const PAGE_SIZE: usize = 256;
/// Erase granularity in bytes.
pub const SECTOR_SIZE: usize = 65536;

/// Callback for progress reporting during flash operations.
pub trait ProgressSink {
    /// Called after each sector erase.
    fn erasing(&mut self, sectors_done: usize, sectors_total: usize);

    /// Called after each programmed chunk.
    fn writing(&mut self, bytes_done: usize, bytes_total: usize);

    /// Called after each page read during read or verify.
    fn reading(&mut self, bytes_done: usize, bytes_total: usize);
}

/// A no-op progress reporter.
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn erasing(&mut self, _sectors_done: usize, _sectors_total: usize) {}
    fn writing(&mut self, _bytes_done: usize, _bytes_total: usize) {}
    fn reading(&mut self, _bytes_done: usize, _bytes_total: usize) {}
}

/// Program `data` at `address`, erasing every touched sector.
///
/// See [`program_with_progress`].
pub fn program<T: FlashTransport + ?Sized>(
    transport: &mut T,
    address: u32,
    data: &[u8],
) -> Result<()> {
    program_with_progress(transport, address, data, &mut NoProgress)
}

/// Program `data` at `address`, erasing every touched sector.
///
/// Sectors are processed strictly in ascending order and each sector is
/// erased immediately before the writes into it - there is no batched
/// erase-everything-then-write pass. The number of erased sectors is
/// `ceil(data.len() / 65536)` with wire selectors
/// `((address >> 16) + i) mod 256`; a range that merely straddles a sector
/// boundary does not pull in an extra erase.
///
/// The first failure aborts the whole operation; no rollback is attempted.
pub fn program_with_progress<T: FlashTransport + ?Sized, P: ProgressSink>(
    transport: &mut T,
    address: u32,
    data: &[u8],
    progress: &mut P,
) -> Result<()> {
    if data.is_empty() {
        return Ok(());
    }

    let sector_count = data.len().div_ceil(SECTOR_SIZE);
    log::info!(
        "programming {} bytes at 0x{:06X} ({} sectors, {} pages)",
        data.len(),
        address & 0x00FF_FFFF,
        sector_count,
        data.len().div_ceil(PAGE_SIZE)
    );

    for i in 0..sector_count {
        let sector = (((address >> 16) as usize + i) & 0xFF) as u8;
        protocol::erase_sector(transport, sector)?;
        progress.erasing(i + 1, sector_count);

        let start = i * SECTOR_SIZE;
        let end = usize::min(start + SECTOR_SIZE, data.len());
        program_span(
            transport,
            address.wrapping_add(start as u32),
            &data[start..end],
            start,
            data.len(),
            progress,
        )?;
    }

    Ok(())
}

/// Page-split a sub-range into chunks that never straddle a page boundary.
fn program_span<T: FlashTransport + ?Sized, P: ProgressSink>(
    transport: &mut T,
    address: u32,
    data: &[u8],
    done_before: usize,
    total: usize,
    progress: &mut P,
) -> Result<()> {
    let mut sent = 0usize;
    while sent < data.len() {
        let current = address.wrapping_add(sent as u32);
        let page_offset = current as usize & (PAGE_SIZE - 1);
        let chunk = usize::min(data.len() - sent, PAGE_SIZE - page_offset);

        protocol::program_page(transport, current, &data[sent..sent + chunk])?;
        sent += chunk;
        progress.writing(done_before + sent, total);
    }
    Ok(())
}

/// Read `length` bytes starting at `address`.
///
/// See [`read_with_progress`].
pub fn read<T: FlashTransport + ?Sized>(
    transport: &mut T,
    address: u32,
    length: usize,
) -> Result<Vec<u8>> {
    read_with_progress(transport, address, length, &mut NoProgress)
}

/// Read `length` bytes starting at `address`.
///
/// Issues exactly `ceil(length / 256)` page reads regardless of alignment;
/// the first and last pages may be only partially used.
pub fn read_with_progress<T: FlashTransport + ?Sized, P: ProgressSink>(
    transport: &mut T,
    address: u32,
    length: usize,
    progress: &mut P,
) -> Result<Vec<u8>> {
    let mut out = vec![0u8; length];
    let mut page = [0u8; PAGE_SIZE];

    let mut done = 0usize;
    while done < length {
        protocol::read_page(transport, address.wrapping_add(done as u32), &mut page)?;
        let count = usize::min(PAGE_SIZE, length - done);
        out[done..done + count].copy_from_slice(&page[..count]);
        done += count;
        progress.reading(done, length);
    }

    Ok(out)
}

/// Verify that the flash contents at `address` match `expected`.
///
/// See [`verify_with_progress`].
pub fn verify<T: FlashTransport + ?Sized>(
    transport: &mut T,
    address: u32,
    expected: &[u8],
) -> Result<()> {
    verify_with_progress(transport, address, expected, &mut NoProgress)
}

/// Verify that the flash contents at `address` match `expected`.
///
/// Re-reads the range page by page and compares byte-wise, failing fast at
/// the first mismatch with its offset and both byte values. Offsets are
/// relative to the start of the verified range.
pub fn verify_with_progress<T: FlashTransport + ?Sized, P: ProgressSink>(
    transport: &mut T,
    address: u32,
    expected: &[u8],
    progress: &mut P,
) -> Result<()> {
    let mut page = [0u8; PAGE_SIZE];

    let mut done = 0usize;
    while done < expected.len() {
        protocol::read_page(transport, address.wrapping_add(done as u32), &mut page)?;
        let count = usize::min(PAGE_SIZE, expected.len() - done);

        for (i, (want, got)) in expected[done..done + count]
            .iter()
            .zip(page[..count].iter())
            .enumerate()
        {
            if want != got {
                return Err(Error::VerifyMismatch {
                    offset: (done + i) as u32,
                    expected: *want,
                    actual: *got,
                });
            }
        }

        done += count;
        progress.reading(done, expected.len());
    }

    Ok(())
}
