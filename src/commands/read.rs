//! Read command implementation

use std::fs::File;
use std::io::Write;
use std::path::Path;

use spiflasher_core::flash;
use spiflasher_core::transport::FlashTransport;

use super::progress::IndicatifProgress;

/// Run the read command
pub fn run_read<T: FlashTransport + ?Sized>(
    transport: &mut T,
    output: &Path,
    address: u32,
    size: usize,
) -> Result<(), Box<dyn std::error::Error>> {
    if size == 0 {
        return Err("Please specify a non-zero size for reading".into());
    }

    println!(
        "Reading {} bytes from flash at 0x{:06X} ({} pages)...",
        size,
        address,
        size.div_ceil(flash::PAGE_SIZE)
    );

    let mut progress = IndicatifProgress::new(size as u64, "Reading");
    let data = match flash::read_with_progress(transport, address, size, &mut progress) {
        Ok(data) => {
            progress.finish("Read complete");
            data
        }
        Err(e) => {
            progress.abandon("Read failed");
            return Err(e.into());
        }
    };

    let mut file = File::create(output)?;
    file.write_all(&data)?;
    println!("Wrote {} bytes to {:?}", data.len(), output);

    Ok(())
}
