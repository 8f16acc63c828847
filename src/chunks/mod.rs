//! PNG chunk stream
//!
//! A PNG file is the 8-byte signature followed by chunks of the form
//! `length (4) | type (4) | payload (length) | crc (4)`. [`ChunkWalker`]
//! reads them one at a time from a [`ByteSource`]; the per-type parsers
//! live in the submodules.

pub mod ihdr;
pub mod text;
pub mod time;

use crate::{
    error::{Error, Result},
    metadata::{ChunkRecord, RawChunkRecord},
    primitives::{read_be_u32, to_ascii_string, to_hex},
    source::{ByteRange, ByteSource},
};
use log::{debug, warn};
use std::fmt;
use std::io;
use std::iter::FusedIterator;

/// PNG signature: 89 50 4E 47 0D 0A 1A 0A
pub const PNG_SIGNATURE: [u8; 8] = *b"\x89PNG\r\n\x1a\n";

/// Length + type fields preceding each payload
pub const CHUNK_HEADER_SIZE: u64 = 8;

/// Trailing CRC field
pub const CHUNK_CRC_SIZE: u64 = 4;

/// Detect a PNG from its leading bytes
pub fn is_png(header: &[u8]) -> bool {
    header.len() >= PNG_SIGNATURE.len() && header[..PNG_SIGNATURE.len()] == PNG_SIGNATURE
}

/// Four-byte chunk tag
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChunkType(pub [u8; 4]);

impl ChunkType {
    pub const IHDR: Self = Self(*b"IHDR");
    pub const IEND: Self = Self(*b"IEND");
    pub const TEXT: Self = Self(*b"tEXt");
    pub const ZTXT: Self = Self(*b"zTXt");
    pub const ITXT: Self = Self(*b"iTXt");
    pub const TIME: Self = Self(*b"tIME");

    /// Raw tag bytes
    pub fn bytes(&self) -> [u8; 4] {
        self.0
    }

    /// Tag as a string, one char per byte
    pub fn as_string(&self) -> String {
        to_ascii_string(&self.0, 0, 4)
    }

    /// Ancillary bit (lowercase first letter); clear means critical
    pub fn is_ancillary(&self) -> bool {
        self.0[0] & 0x20 != 0
    }

    pub fn is_critical(&self) -> bool {
        !self.is_ancillary()
    }

    /// Private bit (lowercase second letter)
    pub fn is_private(&self) -> bool {
        self.0[1] & 0x20 != 0
    }

    /// Reserved bit (lowercase third letter); must be clear in conforming files
    pub fn is_reserved_set(&self) -> bool {
        self.0[2] & 0x20 != 0
    }

    /// Safe-to-copy bit (lowercase fourth letter)
    pub fn is_safe_to_copy(&self) -> bool {
        self.0[3] & 0x20 != 0
    }

    /// Whether the text-chunk parser handles this tag
    pub fn is_text(&self) -> bool {
        matches!(*self, Self::TEXT | Self::ZTXT | Self::ITXT)
    }
}

impl fmt::Display for ChunkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &b in &self.0 {
            let c = if b.is_ascii_graphic() { b as char } else { '.' };
            write!(f, "{c}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for ChunkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ChunkType({self})")
    }
}

/// Length and tag read from the first 8 bytes of a chunk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkHeader {
    pub length: u32,
    pub chunk_type: ChunkType,
}

impl ChunkHeader {
    /// Decode from the 8 header bytes
    pub fn from_bytes(bytes: &[u8; 8]) -> Self {
        Self {
            length: read_be_u32(bytes, 0),
            chunk_type: ChunkType([bytes[4], bytes[5], bytes[6], bytes[7]]),
        }
    }

    /// Header + payload + CRC
    pub fn total_size(&self) -> u64 {
        CHUNK_HEADER_SIZE + self.length as u64 + CHUNK_CRC_SIZE
    }
}

/// One fully read chunk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// File offset of the length field
    pub offset: u64,
    pub header: ChunkHeader,
    pub data: Vec<u8>,
    /// CRC as stored in the file
    pub crc: u32,
}

impl Chunk {
    pub fn chunk_type(&self) -> ChunkType {
        self.header.chunk_type
    }

    /// Hex of the first `max` payload bytes, `...` appended if there are more
    pub fn preview(&self, max: usize) -> String {
        let shown = &self.data[..self.data.len().min(max)];
        let mut preview = to_hex(shown);
        if self.header.length as usize > max {
            preview.push_str("...");
        }
        preview
    }

    /// Summary record for the chunk listing
    pub fn record(&self, preview_len: usize) -> ChunkRecord {
        ChunkRecord {
            chunk_type: self.chunk_type().as_string(),
            length: self.header.length,
            crc: format!("0x{:08x}", self.crc),
            preview: self.preview(preview_len),
        }
    }

    /// Full-payload record
    pub fn raw_record(&self) -> RawChunkRecord {
        RawChunkRecord {
            chunk_type: self.chunk_type().as_string(),
            length: self.header.length,
            data: to_hex(&self.data),
            crc: self.crc,
        }
    }
}

/// Check the 8-byte signature at offset 0
///
/// Inputs shorter than the signature cannot match and fail the same way.
pub fn check_signature<S: ByteSource>(source: &mut S, file_size: u64) -> Result<()> {
    let sig_len = PNG_SIGNATURE.len() as u64;
    if file_size < sig_len {
        return Err(Error::InvalidSignature);
    }
    let sig = source.read_range(ByteRange::new(0, sig_len))?;
    if sig != PNG_SIGNATURE {
        return Err(Error::InvalidSignature);
    }
    Ok(())
}

/// Sequential reader over the chunks of a PNG
///
/// Construction validates the signature. Iteration yields chunks in file
/// order and ends after `IEND`, at the end of the file, or silently at a
/// truncated trailing chunk. Read failures are yielded once, after which
/// the walker is exhausted.
///
/// Dropping the walker between chunks abandons the walk; it owns its
/// cursor and shares nothing.
#[derive(Debug)]
pub struct ChunkWalker<S> {
    source: S,
    file_size: u64,
    offset: u64,
    done: bool,
}

impl<S: ByteSource> ChunkWalker<S> {
    /// Validate the signature and position the cursor at the first chunk
    ///
    /// `file_size` bounds the walk; it is normally the source length.
    pub fn new(mut source: S, file_size: u64) -> Result<Self> {
        check_signature(&mut source, file_size)?;
        Ok(Self {
            source,
            file_size,
            offset: PNG_SIGNATURE.len() as u64,
            done: false,
        })
    }

    /// Offset of the next chunk to be read
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Recover the byte source
    pub fn into_inner(self) -> S {
        self.source
    }

    fn next_chunk(&mut self) -> Result<Option<Chunk>> {
        if self.done || self.offset >= self.file_size {
            return Ok(None);
        }

        let remaining = self.file_size - self.offset;
        if remaining < CHUNK_HEADER_SIZE {
            warn!(
                "Stopping at offset {}: {} trailing bytes cannot hold a chunk header",
                self.offset, remaining
            );
            self.done = true;
            return Ok(None);
        }

        let header_bytes = self
            .source
            .read_range(ByteRange::new(self.offset, CHUNK_HEADER_SIZE))?;
        let raw_header: [u8; 8] = header_bytes
            .as_slice()
            .try_into()
            .map_err(|_| short_read(self.offset, CHUNK_HEADER_SIZE, header_bytes.len()))?;
        let header = ChunkHeader::from_bytes(&raw_header);

        if header.total_size() > remaining {
            warn!(
                "Stopping at offset {}: {} chunk declares {} bytes but only {} remain",
                self.offset,
                header.chunk_type,
                header.length,
                remaining - CHUNK_HEADER_SIZE
            );
            self.done = true;
            return Ok(None);
        }

        // Payload and CRC in one read, then split
        let body_offset = self.offset + CHUNK_HEADER_SIZE;
        let body_size = header.length as u64 + CHUNK_CRC_SIZE;
        let mut data = self
            .source
            .read_range(ByteRange::new(body_offset, body_size))?;
        if data.len() as u64 != body_size {
            return Err(short_read(body_offset, body_size, data.len()));
        }
        let crc_bytes = data.split_off(header.length as usize);
        let crc = read_be_u32(&crc_bytes, 0);

        debug!(
            "Chunk {} at offset {}: {} bytes, crc 0x{:08x}",
            header.chunk_type, self.offset, header.length, crc
        );

        let chunk = Chunk {
            offset: self.offset,
            header,
            data,
            crc,
        };

        self.offset += header.total_size();
        if header.chunk_type == ChunkType::IEND {
            self.done = true;
        }

        Ok(Some(chunk))
    }
}

/// A source handed back fewer bytes than the range it was asked for
fn short_read(offset: u64, expected: u64, got: usize) -> Error {
    Error::Io(io::Error::new(
        io::ErrorKind::UnexpectedEof,
        format!("read at offset {offset} returned {got} of {expected} bytes"),
    ))
}

impl<S: ByteSource> Iterator for ChunkWalker<S> {
    type Item = Result<Chunk>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.next_chunk() {
            Ok(chunk) => chunk.map(Ok),
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

impl<S: ByteSource> FusedIterator for ChunkWalker<S> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::SliceSource;
    use crate::test_utils::PngBuilder;

    fn walk(data: &[u8]) -> Result<Vec<Chunk>> {
        ChunkWalker::new(SliceSource::new(data), data.len() as u64)?.collect()
    }

    #[test]
    fn test_is_png() {
        assert!(is_png(&PNG_SIGNATURE));
        assert!(is_png(b"\x89PNG\r\n\x1a\nmore"));
        assert!(!is_png(b"\x89PNG\r\n\x1a"));
        assert!(!is_png(b"GIF89a.."));
    }

    #[test]
    fn test_chunk_type_properties() {
        assert!(ChunkType::IHDR.is_critical());
        assert!(!ChunkType::IHDR.is_private());
        assert!(ChunkType::TEXT.is_ancillary());
        assert!(ChunkType::TEXT.is_safe_to_copy());
        assert!(!ChunkType::TIME.is_safe_to_copy());
        assert!(ChunkType(*b"prIv").is_private());
        assert!(!ChunkType::IEND.is_reserved_set());
        assert!(ChunkType::ZTXT.is_text());
        assert!(!ChunkType::TIME.is_text());
    }

    #[test]
    fn test_chunk_type_display() {
        assert_eq!(ChunkType::ITXT.to_string(), "iTXt");
        assert_eq!(ChunkType([b'a', 0, 0xFF, b'Z']).to_string(), "a..Z");
        assert_eq!(ChunkType([b'a', 0xE9, b'b', b'c']).as_string(), "a\u{e9}bc");
    }

    #[test]
    fn test_header_decode() {
        let header = ChunkHeader::from_bytes(b"\x00\x00\x00\x0dIHDR");
        assert_eq!(header.length, 13);
        assert_eq!(header.chunk_type, ChunkType::IHDR);
        assert_eq!(header.total_size(), 25);
    }

    #[test]
    fn test_walk_stops_at_iend() {
        let png = PngBuilder::new()
            .ihdr(1, 1, 8, 2)
            .iend()
            .chunk(*b"tEXt", b"After\0End")
            .build();
        let chunks = walk(&png).unwrap();
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[1].chunk_type(), ChunkType::IEND);
    }

    #[test]
    fn test_walk_stops_on_short_tail() {
        let mut png = PngBuilder::new().ihdr(1, 1, 8, 2).build();
        png.extend_from_slice(&[0, 0, 0, 1, b'a']);
        let chunks = walk(&png).unwrap();
        assert_eq!(chunks.len(), 1);
    }

    #[test]
    fn test_walk_stops_on_truncated_body() {
        let mut png = PngBuilder::new()
            .ihdr(1, 1, 8, 2)
            .chunk(*b"abCD", &[1, 2, 3])
            .build();
        // Drop the last byte of the CRC
        png.pop();
        let chunks = walk(&png).unwrap();
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].chunk_type(), ChunkType::IHDR);
    }

    #[test]
    fn test_walk_records_stored_crc() {
        let png = PngBuilder::new()
            .raw_chunk(*b"abCD", &[0xAA], 0xDEAD_BEEF)
            .build();
        let chunks = walk(&png).unwrap();
        assert_eq!(chunks[0].crc, 0xDEAD_BEEF);
        assert_eq!(chunks[0].offset, 8);
        assert_eq!(chunks[0].record(32).crc, "0xdeadbeef");
    }

    #[test]
    fn test_bad_signature() {
        let mut png = PngBuilder::new().iend().build();
        png[3] ^= 0xFF;
        assert!(matches!(walk(&png), Err(Error::InvalidSignature)));
        assert!(matches!(walk(&png[..4]), Err(Error::InvalidSignature)));
    }

    #[test]
    fn test_preview_truncation() {
        let chunk = Chunk {
            offset: 8,
            header: ChunkHeader {
                length: 40,
                chunk_type: ChunkType(*b"IDAT"),
            },
            data: (0u8..40).collect(),
            crc: 0,
        };
        let preview = chunk.preview(32);
        assert!(preview.ends_with("..."));
        assert_eq!(preview.len(), 64 + 3);
        assert_eq!(chunk.preview(40).len(), 80);
        assert_eq!(chunk.raw_record().data.len(), 80);
    }

    #[test]
    fn test_walker_fuses_after_error() {
        let png = PngBuilder::new().ihdr(1, 1, 8, 2).iend().build();
        // Claim a larger file than the source holds
        let mut walker =
            ChunkWalker::new(SliceSource::new(&png[..20]), png.len() as u64).unwrap();
        assert!(matches!(
            walker.next(),
            Some(Err(Error::RangeUnsatisfiable { .. }))
        ));
        assert!(walker.next().is_none());
    }

    /// Hands back one byte less than requested for every read past the signature
    struct ShortReads<'a>(SliceSource<'a>);

    impl ByteSource for ShortReads<'_> {
        fn total_length(&self) -> u64 {
            self.0.total_length()
        }

        fn read_range(&mut self, range: ByteRange) -> Result<Vec<u8>> {
            let mut bytes = self.0.read_range(range)?;
            if range.offset > 0 {
                bytes.pop();
            }
            Ok(bytes)
        }
    }

    #[test]
    fn test_short_header_read_is_io_error() {
        let png = PngBuilder::new().ihdr(1, 1, 8, 2).iend().build();
        let mut walker =
            ChunkWalker::new(ShortReads(SliceSource::new(&png)), png.len() as u64).unwrap();
        match walker.next() {
            Some(Err(Error::Io(e))) => assert_eq!(e.kind(), io::ErrorKind::UnexpectedEof),
            other => panic!("expected an I/O error, got {other:?}"),
        }
        assert!(walker.next().is_none());
    }

    /// Full headers, but payload reads come back one byte short
    struct ShortBodies<'a>(SliceSource<'a>);

    impl ByteSource for ShortBodies<'_> {
        fn total_length(&self) -> u64 {
            self.0.total_length()
        }

        fn read_range(&mut self, range: ByteRange) -> Result<Vec<u8>> {
            let mut bytes = self.0.read_range(range)?;
            if range.size != CHUNK_HEADER_SIZE && range.offset > 0 {
                bytes.pop();
            }
            Ok(bytes)
        }
    }

    #[test]
    fn test_short_body_read_is_io_error() {
        let png = PngBuilder::new().ihdr(1, 1, 8, 2).iend().build();
        let result: Result<Vec<Chunk>> =
            ChunkWalker::new(ShortBodies(SliceSource::new(&png)), png.len() as u64)
                .unwrap()
                .collect();
        assert!(matches!(
            result,
            Err(Error::Io(e)) if e.kind() == io::ErrorKind::UnexpectedEof
        ));
    }
}
