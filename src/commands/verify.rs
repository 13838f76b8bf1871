//! Verify command implementation

use std::path::Path;

use spiflasher_core::flash;
use spiflasher_core::transport::FlashTransport;

use super::progress::IndicatifProgress;

/// Run the verify command
pub fn run_verify<T: FlashTransport + ?Sized>(
    transport: &mut T,
    input: &Path,
    address: u32,
) -> Result<(), Box<dyn std::error::Error>> {
    let expected = super::read_file(input)?;

    if expected.is_empty() {
        return Err("Input file is empty".into());
    }

    let mut progress = IndicatifProgress::new(expected.len() as u64, "Verifying");
    match flash::verify_with_progress(transport, address, &expected, &mut progress) {
        Ok(()) => {
            progress.finish("Verification passed");
            println!("Verification passed!");
            Ok(())
        }
        Err(e) => {
            progress.abandon("Verification failed");
            Err(e.into())
        }
    }
}
