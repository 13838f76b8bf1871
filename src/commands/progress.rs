//! Progress reporting for flash operations

use indicatif::{ProgressBar, ProgressStyle};
use spiflasher_core::flash::ProgressSink;

/// Progress reporter using an indicatif progress bar
///
/// One bar per operation phase; sector erases show up as a message suffix
/// because erase and write interleave per sector.
pub struct IndicatifProgress {
    bar: ProgressBar,
}

impl IndicatifProgress {
    pub fn new(total_bytes: u64, phase: &str) -> Self {
        let bar = ProgressBar::new(total_bytes);
        bar.set_style(
            ProgressStyle::default_bar()
                .template(&format!(
                    "{{spinner:.green}} [{{elapsed_precise}}] [{{bar:40.cyan/blue}}] {{bytes}}/{{total_bytes}} ({{bytes_per_sec}}, {{eta}}) {} {{msg}}",
                    phase
                ))
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );
        Self { bar }
    }

    pub fn finish(self, message: &str) {
        self.bar.finish_with_message(message.to_string());
    }

    pub fn abandon(self, message: &str) {
        self.bar.abandon_with_message(message.to_string());
    }
}

impl ProgressSink for IndicatifProgress {
    fn erasing(&mut self, sectors_done: usize, sectors_total: usize) {
        self.bar
            .set_message(format!("(sector {}/{})", sectors_done, sectors_total));
    }

    fn writing(&mut self, bytes_done: usize, _bytes_total: usize) {
        self.bar.set_position(bytes_done as u64);
    }

    fn reading(&mut self, bytes_done: usize, _bytes_total: usize) {
        self.bar.set_position(bytes_done as u64);
    }
}
