//! Streaming PNG chunk decoder for metadata inspection.
//!
//! This crate walks the chunk sequence of a PNG file and extracts the image
//! header, text metadata, and modification time, together with a record of
//! every chunk it passed over. Pixel data is never decompressed.
//!
//! # Design Principles
//!
//! - **Streaming**: Only the signature, chunk headers and payloads are read, one range at a time
//! - **Best effort**: Only a bad signature or a short IHDR aborts; other defects leave fields empty
//! - **No shared state**: Each decode call owns its cursor and result
//!
//! # Quick Start
//!
//! ```no_run
//! use png_chunk_meta::ChunkDecoder;
//!
//! # fn main() -> png_chunk_meta::Result<()> {
//! let metadata = ChunkDecoder::new().decode_path("image.png")?;
//!
//! if let Some(info) = &metadata.image_info {
//!     println!("{}x{} {}", info.width, info.height, info.color_type);
//! }
//! for (keyword, value) in &metadata.text_metadata {
//!     println!("{keyword}: {}", value.text());
//! }
//! for chunk in &metadata.chunks {
//!     println!("{} {} bytes crc {}", chunk.chunk_type, chunk.length, chunk.crc);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Chunk-Level API
//!
//! For more control, iterate the chunks directly. The walk can be abandoned
//! at any point by dropping the iterator:
//!
//! ```no_run
//! use png_chunk_meta::{ChunkType, ChunkWalker, StreamSource};
//! use std::fs::File;
//!
//! # fn main() -> png_chunk_meta::Result<()> {
//! let source = StreamSource::new(File::open("image.png")?)?;
//! let size = png_chunk_meta::ByteSource::total_length(&source);
//! for chunk in ChunkWalker::new(source, size)? {
//!     let chunk = chunk?;
//!     if chunk.chunk_type() == ChunkType(*b"IDAT") {
//!         break;
//!     }
//!     println!("{} at {}", chunk.chunk_type(), chunk.offset);
//! }
//! # Ok(())
//! # }
//! ```

pub mod chunks;
mod decoder;
mod error;
mod metadata;
pub mod primitives;
mod source;

pub use chunks::{is_png, Chunk, ChunkHeader, ChunkType, ChunkWalker, PNG_SIGNATURE};
pub use decoder::{ChunkDecoder, DecoderOptions, DEFAULT_PREVIEW_LEN};
pub use error::{Error, Result};
pub use metadata::{
    ChunkRecord, ColorType, ImageInfo, InternationalText, Metadata, RawChunkRecord, TextMetadata,
    TextValue, Timestamp, RAW_DATA_KEY,
};
#[cfg(feature = "memory-mapped")]
pub use source::MmapSource;
pub use source::{ByteRange, ByteSource, SliceSource, StreamSource};

// Test utilities - only compiled for tests or when explicitly enabled
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
