//! SPI flash opcodes consumed by the device's fixed command set
//!
//! These are the conventional JEDEC command values and must not be altered;
//! the device forwards them to the chip unmodified.

/// Write Enable - required immediately before every erase and page program
pub const WREN: u8 = 0x06;
/// Read Status Register 1
pub const RDSR: u8 = 0x05;
/// Read Data (3-byte address)
pub const READ: u8 = 0x03;
/// Page Program (3-byte address)
pub const PP: u8 = 0x02;
/// Block Erase 64KB (3-byte address)
pub const BE_D8: u8 = 0xD8;

/// Status Register 1: Write In Progress / Busy
pub const SR1_WIP: u8 = 0x01;
/// Status Register 1: Write Enable Latch
pub const SR1_WEL: u8 = 0x02;
