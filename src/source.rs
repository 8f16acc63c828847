//! Byte sources and range reads
//!
//! The decoder never assumes the whole file is in memory. It asks a
//! [`ByteSource`] for exactly the ranges it needs (signature, chunk header,
//! payload, CRC) and owns each returned buffer outright.

use crate::error::{Error, Result};
use std::io::{Read, Seek, SeekFrom};

/// A byte range in a source (offset and size)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    /// Offset from start of source
    pub offset: u64,
    /// Size in bytes
    pub size: u64,
}

impl ByteRange {
    /// Create a new byte range
    pub fn new(offset: u64, size: u64) -> Self {
        Self { offset, size }
    }

    /// Get the end offset of this range, or `None` on overflow
    pub fn end_offset(&self) -> Option<u64> {
        self.offset.checked_add(self.size)
    }

    /// Check whether this range lies entirely within `total` bytes
    pub fn fits_within(&self, total: u64) -> bool {
        self.end_offset().is_some_and(|end| end <= total)
    }
}

/// Random-access byte input
///
/// Implementations return an owned copy of the requested range; the
/// decoder never holds two ranges aliasing the same storage.
pub trait ByteSource {
    /// Total length of the source in bytes
    fn total_length(&self) -> u64;

    /// Read exactly `range.size` bytes starting at `range.offset`
    ///
    /// Fails with [`Error::RangeUnsatisfiable`] if the range extends past
    /// [`total_length`](Self::total_length).
    fn read_range(&mut self, range: ByteRange) -> Result<Vec<u8>>;

    /// Fail unless `range` can be served by this source
    fn check_range(&self, range: ByteRange) -> Result<()> {
        let total = self.total_length();
        if range.fits_within(total) {
            Ok(())
        } else {
            Err(Error::RangeUnsatisfiable {
                offset: range.offset,
                size: range.size,
                total,
            })
        }
    }
}

impl<S: ByteSource + ?Sized> ByteSource for &mut S {
    fn total_length(&self) -> u64 {
        (**self).total_length()
    }

    fn read_range(&mut self, range: ByteRange) -> Result<Vec<u8>> {
        (**self).read_range(range)
    }
}

/// In-memory source over a borrowed slice
#[derive(Debug, Clone, Copy)]
pub struct SliceSource<'a> {
    data: &'a [u8],
}

impl<'a> SliceSource<'a> {
    /// Wrap a byte slice
    pub fn new(data: &'a [u8]) -> Self {
        Self { data }
    }
}

impl<'a> From<&'a [u8]> for SliceSource<'a> {
    fn from(data: &'a [u8]) -> Self {
        Self::new(data)
    }
}

impl ByteSource for SliceSource<'_> {
    fn total_length(&self) -> u64 {
        self.data.len() as u64
    }

    fn read_range(&mut self, range: ByteRange) -> Result<Vec<u8>> {
        self.check_range(range)?;
        let start = range.offset as usize;
        let end = start + range.size as usize;
        Ok(self.data[start..end].to_vec())
    }
}

/// Source over any `Read + Seek` stream (files, cursors)
///
/// The length is measured once at construction by seeking to the end.
#[derive(Debug)]
pub struct StreamSource<R> {
    reader: R,
    len: u64,
}

impl<R: Read + Seek> StreamSource<R> {
    /// Wrap a stream, measuring its length
    pub fn new(mut reader: R) -> Result<Self> {
        let len = reader.seek(SeekFrom::End(0))?;
        reader.seek(SeekFrom::Start(0))?;
        Ok(Self { reader, len })
    }

    /// Recover the wrapped stream
    pub fn into_inner(self) -> R {
        self.reader
    }
}

impl<R: Read + Seek> ByteSource for StreamSource<R> {
    fn total_length(&self) -> u64 {
        self.len
    }

    fn read_range(&mut self, range: ByteRange) -> Result<Vec<u8>> {
        self.check_range(range)?;
        self.reader.seek(SeekFrom::Start(range.offset))?;
        let mut buf = vec![0u8; range.size as usize];
        self.reader.read_exact(&mut buf)?;
        Ok(buf)
    }
}

/// Source over a memory-mapped file
#[cfg(feature = "memory-mapped")]
#[derive(Debug)]
pub struct MmapSource {
    mmap: memmap2::Mmap,
}

#[cfg(feature = "memory-mapped")]
impl MmapSource {
    /// Map a file read-only
    ///
    /// The file must not be truncated by another process while mapped.
    pub fn open<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let mmap = unsafe { memmap2::Mmap::map(&file)? };
        Ok(Self { mmap })
    }

    /// Wrap an existing map
    pub fn from_mmap(mmap: memmap2::Mmap) -> Self {
        Self { mmap }
    }
}

#[cfg(feature = "memory-mapped")]
impl ByteSource for MmapSource {
    fn total_length(&self) -> u64 {
        self.mmap.len() as u64
    }

    fn read_range(&mut self, range: ByteRange) -> Result<Vec<u8>> {
        self.check_range(range)?;
        let start = range.offset as usize;
        let end = start + range.size as usize;
        Ok(self.mmap[start..end].to_vec())
    }
}
