//! Write command implementation

use std::path::Path;

use spiflasher_core::flash;
use spiflasher_core::transport::FlashTransport;

use super::progress::IndicatifProgress;

/// Run the write command
pub fn run_write<T: FlashTransport + ?Sized>(
    transport: &mut T,
    input: &Path,
    address: u32,
    size: Option<usize>,
    do_verify: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut data = super::read_file(input)?;

    if let Some(size) = size {
        if size > data.len() {
            return Err(format!(
                "Requested size ({} bytes) exceeds file size ({} bytes)",
                size,
                data.len()
            )
            .into());
        }
        data.truncate(size);
    }

    if data.is_empty() {
        return Err("Input file is empty".into());
    }

    println!(
        "Programming flash ({} sectors, {} pages)...",
        data.len().div_ceil(flash::SECTOR_SIZE),
        data.len().div_ceil(flash::PAGE_SIZE)
    );

    let progress = run_program(transport, address, &data)?;
    progress.finish("Write complete");

    if do_verify {
        println!("Verifying flash contents...");
        let mut progress = IndicatifProgress::new(data.len() as u64, "Verifying");
        match flash::verify_with_progress(transport, address, &data, &mut progress) {
            Ok(()) => progress.finish("Verification passed"),
            Err(e) => {
                progress.abandon("Verification failed");
                return Err(e.into());
            }
        }
    }

    println!("Done!");
    Ok(())
}

fn run_program<T: FlashTransport + ?Sized>(
    transport: &mut T,
    address: u32,
    data: &[u8],
) -> Result<IndicatifProgress, Box<dyn std::error::Error>> {
    let mut progress = IndicatifProgress::new(data.len() as u64, "Writing");
    match flash::program_with_progress(transport, address, data, &mut progress) {
        Ok(()) => Ok(progress),
        Err(e) => {
            progress.abandon("Write failed");
            Err(e.into())
        }
    }
}
