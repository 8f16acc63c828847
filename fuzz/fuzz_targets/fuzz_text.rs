#![no_main]

use libfuzzer_sys::fuzz_target;
use png_chunk_meta::chunks::{text::text_entries, ChunkType};

fuzz_target!(|data: &[u8]| {
    // Text parsing should never panic on arbitrary payloads
    let _ = text_entries(ChunkType::TEXT, data);
    let entries = text_entries(ChunkType::ITXT, data);
    assert!(entries.len() <= 1);
});
