//! Test utilities for building PNG streams.
//!
//! This module provides:
//! - [`PngBuilder`], which assembles a PNG chunk by chunk with correct CRCs
//! - Named synthetic fixtures, built on demand
//! - Extended fixtures from a directory of real files (via `PNG_TEST_FIXTURES` env var)
//!
//! # Usage
//!
//! ```
//! use png_chunk_meta::test_utils::*;
//!
//! let png = PngBuilder::new()
//!     .ihdr(100, 50, 8, 2)
//!     .text("Author", "Jane")
//!     .iend()
//!     .build();
//! assert!(png_chunk_meta::is_png(&png));
//!
//! let named = fixture_bytes(MINIMAL).unwrap();
//! assert!(!named.is_empty());
//! ```

use std::{fs, path::PathBuf};

use crate::{chunks::PNG_SIGNATURE, Error, Result};

/// Calculate the CRC32 a PNG chunk stores (over type + data)
pub fn chunk_crc(chunk_type: &[u8], data: &[u8]) -> u32 {
    let mut crc = 0xFFFFFFFF_u32;

    for &byte in chunk_type.iter().chain(data) {
        crc ^= byte as u32;
        for _ in 0..8 {
            if crc & 1 != 0 {
                crc = (crc >> 1) ^ 0xEDB88320;
            } else {
                crc >>= 1;
            }
        }
    }

    crc ^ 0xFFFFFFFF
}

/// Assemble a PNG byte stream
#[derive(Debug, Clone)]
pub struct PngBuilder {
    bytes: Vec<u8>,
}

impl Default for PngBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl PngBuilder {
    /// Start with just the signature
    pub fn new() -> Self {
        Self {
            bytes: PNG_SIGNATURE.to_vec(),
        }
    }

    /// Append a chunk with a correct CRC
    pub fn chunk(self, chunk_type: [u8; 4], data: &[u8]) -> Self {
        let crc = chunk_crc(&chunk_type, data);
        self.raw_chunk(chunk_type, data, crc)
    }

    /// Append a chunk with an arbitrary stored CRC
    pub fn raw_chunk(mut self, chunk_type: [u8; 4], data: &[u8], crc: u32) -> Self {
        self.bytes.extend_from_slice(&(data.len() as u32).to_be_bytes());
        self.bytes.extend_from_slice(&chunk_type);
        self.bytes.extend_from_slice(data);
        self.bytes.extend_from_slice(&crc.to_be_bytes());
        self
    }

    /// Append an IHDR with compression, filter and interlace all 0
    pub fn ihdr(self, width: u32, height: u32, bit_depth: u8, color_type: u8) -> Self {
        let mut data = Vec::with_capacity(13);
        data.extend_from_slice(&width.to_be_bytes());
        data.extend_from_slice(&height.to_be_bytes());
        data.extend_from_slice(&[bit_depth, color_type, 0, 0, 0]);
        self.chunk(*b"IHDR", &data)
    }

    /// Append a tEXt chunk
    pub fn text(self, keyword: &str, text: &str) -> Self {
        let mut data = keyword.as_bytes().to_vec();
        data.push(0);
        data.extend_from_slice(text.as_bytes());
        self.chunk(*b"tEXt", &data)
    }

    /// Append an iTXt chunk from its raw fields
    ///
    /// Fields are joined as `keyword \0 flag method language \0 translated \0 text`.
    pub fn itxt(
        self,
        keyword: &str,
        compression_flag: u8,
        language: &str,
        translated_keyword: &str,
        text: &str,
    ) -> Self {
        let mut data = keyword.as_bytes().to_vec();
        data.extend_from_slice(&[0, compression_flag, 0]);
        data.extend_from_slice(language.as_bytes());
        data.push(0);
        data.extend_from_slice(translated_keyword.as_bytes());
        data.push(0);
        data.extend_from_slice(text.as_bytes());
        self.chunk(*b"iTXt", &data)
    }

    /// Append a tIME chunk
    pub fn time(self, year: u16, month: u8, day: u8, hour: u8, minute: u8, second: u8) -> Self {
        let mut data = year.to_be_bytes().to_vec();
        data.extend_from_slice(&[month, day, hour, minute, second]);
        self.chunk(*b"tIME", &data)
    }

    /// Append an IDAT chunk (contents are not interpreted)
    pub fn idat(self, data: &[u8]) -> Self {
        self.chunk(*b"IDAT", data)
    }

    /// Append IEND
    pub fn iend(self) -> Self {
        self.chunk(*b"IEND", &[])
    }

    /// Append raw bytes with no chunk framing
    pub fn bytes(mut self, bytes: &[u8]) -> Self {
        self.bytes.extend_from_slice(bytes);
        self
    }

    pub fn build(self) -> Vec<u8> {
        self.bytes
    }
}

/// Macro to define named fixtures built by functions
macro_rules! define_fixtures {
    ($($name:ident => ($file:literal, $build:path)),* $(,)?) => {
        // Define constants for fixture names
        $(
            #[allow(dead_code)]
            pub const $name: &str = $file;
        )*

        /// Build a named fixture, or `None` for an unknown name
        pub fn build_fixture(file_name: &str) -> Option<Vec<u8>> {
            match file_name {
                $($file => Some($build()),)*
                _ => None,
            }
        }

        /// List all defined fixtures
        pub fn list_all_fixtures() -> Vec<&'static str> {
            vec![$($file),*]
        }
    };
}

fn minimal() -> Vec<u8> {
    PngBuilder::new()
        .ihdr(100, 50, 8, 2)
        .time(2024, 1, 15, 10, 30, 45)
        .iend()
        .build()
}

fn with_text() -> Vec<u8> {
    PngBuilder::new()
        .ihdr(640, 480, 8, 6)
        .text("Author", "Jane")
        .chunk(*b"iTXt", b"Title\0\0\0\0Hello")
        .itxt("Caption", 1, "de", "Beschriftung", "zipped")
        .text("Software", "png-chunk-meta")
        .idat(&[0x78, 0x9c, 0x63, 0x60, 0x00, 0x00, 0x00, 0x02, 0x00, 0x01])
        .iend()
        .build()
}

fn trailing_after_iend() -> Vec<u8> {
    PngBuilder::new()
        .ihdr(1, 1, 1, 0)
        .iend()
        .text("Hidden", "after end")
        .build()
}

fn truncated() -> Vec<u8> {
    let mut png = PngBuilder::new()
        .ihdr(16, 16, 8, 3)
        .idat(&[0u8; 64])
        .build();
    png.truncate(png.len() - 10);
    png
}

define_fixtures!(
    MINIMAL => ("minimal.png", minimal),
    WITH_TEXT => ("with_text.png", with_text),
    TRAILING_AFTER_IEND => ("trailing_after_iend.png", trailing_after_iend),
    TRUNCATED => ("truncated.png", truncated),
);

/// Get fixture bytes: a named synthetic fixture, else a file from the extended set
pub fn fixture_bytes(name: &str) -> Result<Vec<u8>> {
    if let Some(bytes) = build_fixture(name) {
        return Ok(bytes);
    }
    fs::read(fixture_path(name)).map_err(Error::Io)
}

/// Path of a file in the extended fixture directory
///
/// Search order:
/// 1. PNG_TEST_FIXTURES env var
/// 2. Default tests/fixtures directory
pub fn fixture_path(file_name: &str) -> PathBuf {
    if let Ok(custom_dir) = std::env::var("PNG_TEST_FIXTURES") {
        let path = PathBuf::from(custom_dir).join(file_name);
        if path.exists() {
            return path;
        }
    }

    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests/fixtures");
    path.push(file_name);
    path
}

/// List `.png` files in the directory named by PNG_TEST_FIXTURES
///
/// Empty when the variable is unset or the directory is missing.
pub fn extended_fixtures() -> Result<Vec<PathBuf>> {
    let mut fixtures = Vec::new();

    if let Ok(custom_dir) = std::env::var("PNG_TEST_FIXTURES") {
        let dir = PathBuf::from(custom_dir);
        if dir.is_dir() {
            for entry in fs::read_dir(dir).map_err(Error::Io)? {
                let path = entry.map_err(Error::Io)?.path();
                let is_png = path
                    .extension()
                    .is_some_and(|ext| ext.eq_ignore_ascii_case("png"));
                if path.is_file() && is_png {
                    fixtures.push(path);
                }
            }
        }
    }

    fixtures.sort();
    Ok(fixtures)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_crc_known_value() {
        // CRC of an empty IEND chunk is fixed by the format
        assert_eq!(chunk_crc(b"IEND", &[]), 0xAE42_6082);
    }

    #[test]
    fn test_builder_layout() {
        let png = PngBuilder::new().iend().build();
        assert_eq!(&png[..8], &PNG_SIGNATURE);
        assert_eq!(&png[8..], b"\x00\x00\x00\x00IEND\xae\x42\x60\x82");
    }

    #[test]
    fn test_itxt_layout() {
        let png = PngBuilder::new().itxt("K", 1, "en", "T", "x").build();
        assert_eq!(&png[16..png.len() - 4], b"K\0\x01\0en\0T\0x");
    }

    #[test]
    fn test_list_all_fixtures() {
        let fixtures = list_all_fixtures();
        assert_eq!(fixtures.len(), 4);
        assert!(fixtures.contains(&MINIMAL));
        for name in fixtures {
            assert!(build_fixture(name).is_some());
        }
        assert!(build_fixture("missing.png").is_none());
    }

    #[test]
    fn test_fixture_path() {
        let path = fixture_path("sample.png");
        assert!(path.to_string_lossy().ends_with("sample.png"));
    }
}
