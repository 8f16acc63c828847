//! Primitive byte decoders
//!
//! Big-endian integers, 1:1 Latin-1 strings, and lowercase hex. The
//! infallible readers return 0 when the slice is too short; callers that
//! need to tell "zero" from "missing" use the `try_` variants.

use byteorder::{BigEndian, ByteOrder};
use std::fmt::Write;

/// Read a big-endian u32 at `offset`, or `None` if fewer than 4 bytes remain
pub fn try_read_be_u32(bytes: &[u8], offset: usize) -> Option<u32> {
    let end = offset.checked_add(4)?;
    bytes.get(offset..end).map(BigEndian::read_u32)
}

/// Read a big-endian u16 at `offset`, or `None` if fewer than 2 bytes remain
pub fn try_read_be_u16(bytes: &[u8], offset: usize) -> Option<u16> {
    let end = offset.checked_add(2)?;
    bytes.get(offset..end).map(BigEndian::read_u16)
}

/// Read a big-endian u32 at `offset`; 0 if fewer than 4 bytes remain
pub fn read_be_u32(bytes: &[u8], offset: usize) -> u32 {
    try_read_be_u32(bytes, offset).unwrap_or(0)
}

/// Read a big-endian u16 at `offset`; 0 if fewer than 2 bytes remain
pub fn read_be_u16(bytes: &[u8], offset: usize) -> u16 {
    try_read_be_u16(bytes, offset).unwrap_or(0)
}

/// Map each byte in `bytes[start..end]` to the char with the same code point
///
/// No multi-byte decoding. Bounds are clamped to the slice.
pub fn to_ascii_string(bytes: &[u8], start: usize, end: usize) -> String {
    let end = end.min(bytes.len());
    let start = start.min(end);
    latin1(&bytes[start..end])
}

/// Latin-1 decode of a whole slice
pub(crate) fn latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| char::from(b)).collect()
}

/// Lowercase hex, two digits per byte, no separators
pub fn to_hex(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        // Writing to a String cannot fail
        let _ = write!(out, "{b:02x}");
    }
    out
}
