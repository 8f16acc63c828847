#![no_main]

use libfuzzer_sys::fuzz_target;
use png_chunk_meta::{ChunkDecoder, Error, PNG_SIGNATURE};
use std::io::Cursor;

fuzz_target!(|data: &[u8]| {
    // Most inputs would fail the signature check, so prepend it half the time
    let input = if data.first().is_some_and(|b| b & 1 == 0) {
        let mut with_sig = PNG_SIGNATURE.to_vec();
        with_sig.extend_from_slice(&data[1..]);
        with_sig
    } else {
        data.to_vec()
    };

    // This should NEVER panic, only return errors
    let decoder = ChunkDecoder::new();
    match decoder.decode_bytes("fuzz.png", &input) {
        Ok(meta) => {
            assert_eq!(meta.chunks.len(), meta.raw_chunks.len());
            let _ = meta.chunk_types();

            // The streaming path must agree with the in-memory one
            let streamed = decoder
                .decode_reader("fuzz.png", Cursor::new(&input))
                .expect("stream decode diverged");
            assert_eq!(meta, streamed);
        }
        Err(Error::InvalidSignature) | Err(Error::MalformedIhdr { .. }) => {}
        Err(e) => panic!("unexpected error: {e}"),
    }
});
