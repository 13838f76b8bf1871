//! spiflasher-core - Protocol engine for the USB SPI NOR flash programmer
//!
//! This crate implements the programming/reading protocol for an SPI NOR
//! flash chip sitting behind a USB device with a small fixed command set:
//! vendor control transfers carry short flash commands, bulk transfers carry
//! page-sized data.
//!
//! The layering, from the bottom up:
//!
//! - [`transport`] - the `FlashTransport` trait, the seam between this crate
//!   and a concrete USB backend
//! - [`codec`] - encodes the four wire exchange shapes onto the transport's
//!   control/bulk primitives
//! - [`protocol`] - chip-level primitives (write-enable, status poll,
//!   sector erase, page program, page read)
//! - [`flash`] - the engine turning arbitrary (address, buffer) requests
//!   into geometry-correct primitive sequences, plus verification
//!
//! # Example
//!
//! ```ignore
//! use spiflasher_core::{flash, transport::FlashTransport};
//!
//! fn dump<T: FlashTransport>(transport: &mut T) -> spiflasher_core::Result<Vec<u8>> {
//!     flash::read(transport, 0x0, 4096)
//! }
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod codec;
pub mod error;
pub mod flash;
pub mod opcodes;
pub mod protocol;
pub mod transport;

pub use error::{Error, Result, TransportError};
