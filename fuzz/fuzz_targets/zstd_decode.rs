#![no_main]

// Decoding arbitrary bytes behind a valid frame magic must fail cleanly, never panic.

use lazycodecs_api_common::CodecOptions;
use lazycodecs_zstd::{zstd_decode, FRAME_MAGIC};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let framed = [FRAME_MAGIC.as_slice(), data].concat();
    let _ = zstd_decode(&framed, &CodecOptions::new());
});
