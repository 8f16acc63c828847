//! Top-level decode: walk the chunks and assemble [`Metadata`]

use crate::{
    chunks::{ihdr::parse_ihdr, text::text_entries, time::parse_time, ChunkType, ChunkWalker},
    error::Result,
    metadata::Metadata,
    source::{ByteSource, SliceSource, StreamSource},
};
use log::{debug, info};
use std::fs::File;
use std::io::{Read, Seek};
use std::path::Path;

/// Default number of payload bytes shown in a chunk preview
pub const DEFAULT_PREVIEW_LEN: usize = 32;

/// Decoder settings
///
/// # Example
///
/// ```
/// use png_chunk_meta::{ChunkDecoder, DecoderOptions};
///
/// let decoder = ChunkDecoder::with_options(DecoderOptions::new().preview_len(16));
/// assert_eq!(decoder.options().preview_len, 16);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecoderOptions {
    /// Payload bytes rendered in each [`ChunkRecord`](crate::ChunkRecord) preview
    pub preview_len: usize,
}

impl Default for DecoderOptions {
    fn default() -> Self {
        Self {
            preview_len: DEFAULT_PREVIEW_LEN,
        }
    }
}

impl DecoderOptions {
    /// Options with all defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the preview length
    pub fn preview_len(mut self, len: usize) -> Self {
        self.preview_len = len;
        self
    }
}

/// PNG metadata decoder
///
/// Holds only configuration. Every decode call owns its own cursor and
/// result, so one decoder can serve any number of concurrent calls.
#[derive(Debug, Clone, Default)]
pub struct ChunkDecoder {
    options: DecoderOptions,
}

impl ChunkDecoder {
    /// Create a decoder with default options
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a decoder with the given options
    pub fn with_options(options: DecoderOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &DecoderOptions {
        &self.options
    }

    /// Decode metadata from a byte source
    ///
    /// `file_name` and `file_size` are supplied by the caller and copied into
    /// the result; `file_size` also bounds the chunk walk.
    ///
    /// Fails on a bad signature, an IHDR shorter than 13 bytes, or a read
    /// error. Every other defect leaves a field empty or absent.
    pub fn decode<S: ByteSource>(
        &self,
        source: S,
        file_name: &str,
        file_size: u64,
    ) -> Result<Metadata> {
        let mut metadata = Metadata::new(file_name, file_size);

        for chunk in ChunkWalker::new(source, file_size)? {
            let chunk = chunk?;
            metadata.push_chunk(chunk.record(self.options.preview_len), chunk.raw_record());

            match chunk.chunk_type() {
                ChunkType::IHDR => {
                    // Duplicates overwrite
                    metadata.image_info = Some(parse_ihdr(&chunk.data)?);
                }
                ChunkType::TIME => {
                    if let Some(timestamp) = parse_time(&chunk.data) {
                        metadata.timestamp = Some(timestamp);
                    }
                }
                tag if tag.is_text() => {
                    metadata
                        .text_metadata
                        .extend(text_entries(tag, &chunk.data));
                }
                tag => debug!("Recorded {tag} chunk without interpretation"),
            }
        }

        info!(
            "Decoded {}: {} chunks, {} text entries",
            metadata.file_name,
            metadata.chunk_count(),
            metadata.text_metadata.len()
        );

        Ok(metadata)
    }

    /// Decode an in-memory buffer
    ///
    /// # Example
    ///
    /// ```
    /// use png_chunk_meta::{ChunkDecoder, Error};
    ///
    /// let result = ChunkDecoder::new().decode_bytes("not.png", b"GIF89a");
    /// assert!(matches!(result, Err(Error::InvalidSignature)));
    /// ```
    pub fn decode_bytes(&self, file_name: &str, data: &[u8]) -> Result<Metadata> {
        self.decode(SliceSource::new(data), file_name, data.len() as u64)
    }

    /// Decode from a seekable stream, measuring its length first
    pub fn decode_reader<R: Read + Seek>(&self, file_name: &str, reader: R) -> Result<Metadata> {
        let source = StreamSource::new(reader)?;
        let size = source.total_length();
        self.decode(source, file_name, size)
    }

    /// Open and decode a file, naming the result after the file
    pub fn decode_path<P: AsRef<Path>>(&self, path: P) -> Result<Metadata> {
        let path = path.as_ref();
        self.decode_reader(&display_name(path), File::open(path)?)
    }

    /// Memory-map and decode a file
    #[cfg(feature = "memory-mapped")]
    pub fn decode_path_mmap<P: AsRef<Path>>(&self, path: P) -> Result<Metadata> {
        let path = path.as_ref();
        let source = crate::source::MmapSource::open(path)?;
        let size = source.total_length();
        self.decode(source, &display_name(path), size)
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
