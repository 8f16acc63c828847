//! Error types for png-chunk-meta

use std::io;

/// Result type for decode operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that abort a decode call
///
/// Only these cross the decode boundary. Per-chunk problems (unreadable text
/// chunks, ill-sized timestamps, a truncated trailing chunk) are absorbed
/// into the returned [`Metadata`](crate::Metadata) instead.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The first 8 bytes are not the PNG signature
    #[error("Invalid PNG signature")]
    InvalidSignature,

    /// IHDR payload shorter than the 13 bytes it must carry
    #[error("Malformed IHDR chunk: {length} bytes (need 13)")]
    MalformedIhdr { length: u32 },

    /// A byte range was requested outside the bounds of the source
    #[error("Range unsatisfiable: {size} bytes at offset {offset} (source length {total})")]
    RangeUnsatisfiable { offset: u64, size: u64, total: u64 },
}
