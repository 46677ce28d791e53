//! This module contains constants that are needed throughout the codebase.

/// The size of a byte in bits.
///
/// Integer type widths in the host language are always a whole number of
/// bytes.
pub const BYTE_SIZE_BITS: u16 = 8;

/// The maximum width of an integer type in bits.
pub const MAX_INT_BITS: u16 = 256;

/// The width in bits given to `int` and `uint` when the host language elides
/// the explicit width.
pub const DEFAULT_INT_BITS: u16 = 256;

/// The maximum width of a fixed-size byte array in bytes.
pub const MAX_FIXED_BYTES_WIDTH: u8 = 32;

/// The width of a function selector in bytes.
pub const SELECTOR_WIDTH_BYTES: u8 = 4;
