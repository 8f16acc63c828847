//! Decoded metadata types
//!
//! A [`Metadata`] value is built up chunk by chunk during one decode call
//! and handed back whole. Nothing in here is shared between calls.

use std::collections::BTreeMap;
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Serialize, Serializer};

/// Key used in [`TextMetadata`] when a text chunk could not be interpreted
pub const RAW_DATA_KEY: &str = "_raw_data";

/// Keyword-to-value mapping gathered from text chunks
///
/// Later chunks with the same keyword overwrite earlier ones.
pub type TextMetadata = BTreeMap<String, TextValue>;

/// One entry in the chunk listing
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct ChunkRecord {
    /// Four-character chunk tag
    #[cfg_attr(feature = "serde", serde(rename = "type"))]
    pub chunk_type: String,
    /// Declared payload length
    pub length: u32,
    /// Stored CRC as `0x` followed by 8 lowercase hex digits
    pub crc: String,
    /// Hex of the leading payload bytes, `...` appended when cut short
    pub preview: String,
}

/// Full-fidelity chunk record, index-aligned with [`ChunkRecord`]
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct RawChunkRecord {
    /// Four-character chunk tag
    #[cfg_attr(feature = "serde", serde(rename = "type"))]
    pub chunk_type: String,
    /// Declared payload length
    pub length: u32,
    /// Hex of the entire payload
    pub data: String,
    /// Stored CRC value (not verified)
    pub crc: u32,
}

/// PNG color type from the IHDR chunk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorType {
    Grayscale,
    Truecolor,
    Indexed,
    GrayscaleAlpha,
    TruecolorAlpha,
    /// A code outside the five the format defines
    Unknown(u8),
}

impl ColorType {
    /// Map a raw IHDR color-type code
    pub fn from_code(code: u8) -> Self {
        match code {
            0 => Self::Grayscale,
            2 => Self::Truecolor,
            3 => Self::Indexed,
            4 => Self::GrayscaleAlpha,
            6 => Self::TruecolorAlpha,
            other => Self::Unknown(other),
        }
    }

    /// The raw IHDR code
    pub fn code(&self) -> u8 {
        match self {
            Self::Grayscale => 0,
            Self::Truecolor => 2,
            Self::Indexed => 3,
            Self::GrayscaleAlpha => 4,
            Self::TruecolorAlpha => 6,
            Self::Unknown(code) => *code,
        }
    }

    /// Human-readable label, e.g. `truecolor` or `unknown (99)`
    pub fn label(&self) -> String {
        match self {
            Self::Grayscale => "grayscale".to_string(),
            Self::Truecolor => "truecolor".to_string(),
            Self::Indexed => "indexed".to_string(),
            Self::GrayscaleAlpha => "grayscale+alpha".to_string(),
            Self::TruecolorAlpha => "truecolor+alpha".to_string(),
            Self::Unknown(code) => format!("unknown ({code})"),
        }
    }
}

impl fmt::Display for ColorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

// Serialized as its label so consumers see the same string the UI shows
#[cfg(feature = "serde")]
impl Serialize for ColorType {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.label())
    }
}

/// Image header fields
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct ImageInfo {
    pub width: u32,
    pub height: u32,
    pub bit_depth: u8,
    pub color_type: ColorType,
    pub compression_method: u8,
    pub filter_method: u8,
    pub interlace_method: u8,
}

/// Value of an internationalized (iTXt) text entry
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct InternationalText {
    pub text: String,
    pub language: String,
    pub translated_keyword: String,
    /// Set when the compression flag byte is 1; the text is not inflated
    pub compressed: bool,
}

/// Value stored under a text keyword
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum TextValue {
    /// From a tEXt chunk, or the hex payload under [`RAW_DATA_KEY`]
    Plain(String),
    /// From an iTXt chunk
    International(InternationalText),
}

impl TextValue {
    /// The main text regardless of variant
    pub fn text(&self) -> &str {
        match self {
            Self::Plain(text) => text,
            Self::International(itxt) => &itxt.text,
        }
    }

    pub fn as_international(&self) -> Option<&InternationalText> {
        match self {
            Self::International(itxt) => Some(itxt),
            Self::Plain(_) => None,
        }
    }
}

/// Last-modification time from a tIME chunk
///
/// Fields are passed through without calendar validation.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Timestamp {
    pub year: u16,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
    /// `YYYY-MM-DD HH:MM:SS`, zero-padded
    pub datetime: String,
}

impl Timestamp {
    /// Build a timestamp and its formatted `datetime`
    pub fn new(year: u16, month: u8, day: u8, hour: u8, minute: u8, second: u8) -> Self {
        let datetime = format!(
            "{year:04}-{month:02}-{day:02} {hour:02}:{minute:02}:{second:02}"
        );
        Self {
            year,
            month,
            day,
            hour,
            minute,
            second,
            datetime,
        }
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.datetime)
    }
}

/// Everything one decode call extracts from a PNG
///
/// `chunks` and `raw_chunks` always have the same length and describe the
/// same chunks in file order.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct Metadata {
    pub file_name: String,
    pub file_size: u64,
    pub chunks: Vec<ChunkRecord>,
    pub image_info: Option<ImageInfo>,
    pub text_metadata: TextMetadata,
    pub timestamp: Option<Timestamp>,
    pub raw_chunks: Vec<RawChunkRecord>,
}

impl Metadata {
    /// Create an empty result for the named file
    pub fn new(file_name: impl Into<String>, file_size: u64) -> Self {
        Self {
            file_name: file_name.into(),
            file_size,
            chunks: Vec::new(),
            image_info: None,
            text_metadata: TextMetadata::new(),
            timestamp: None,
            raw_chunks: Vec::new(),
        }
    }

    /// Append a chunk to both listings, keeping them aligned
    pub(crate) fn push_chunk(&mut self, record: ChunkRecord, raw: RawChunkRecord) {
        debug_assert_eq!(record.chunk_type, raw.chunk_type);
        self.chunks.push(record);
        self.raw_chunks.push(raw);
    }

    /// Number of chunks recorded
    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// Chunk tags in file order
    pub fn chunk_types(&self) -> Vec<&str> {
        self.chunks.iter().map(|c| c.chunk_type.as_str()).collect()
    }

    /// All records with the given tag, with their raw counterparts
    pub fn find_chunks<'a>(
        &'a self,
        chunk_type: &'a str,
    ) -> impl Iterator<Item = (&'a ChunkRecord, &'a RawChunkRecord)> + 'a {
        self.chunks
            .iter()
            .zip(&self.raw_chunks)
            .filter(move |(record, _)| record.chunk_type == chunk_type)
    }

    /// Look up a text entry by keyword
    pub fn text(&self, keyword: &str) -> Option<&TextValue> {
        self.text_metadata.get(keyword)
    }
}
