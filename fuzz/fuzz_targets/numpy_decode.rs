#![no_main]

// Any NPY stream that decodes must encode back to an equivalent array.

use lazycodecs::builtin::numpy::{numpy_decode, numpy_encode};
use lazycodecs_api_common::CodecOptions;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let options = CodecOptions::new();
    let Ok(array) = numpy_decode(data, &options) else {
        return;
    };

    let encoded = numpy_encode(&array, &options).expect("decoded arrays re-encode");
    let decoded = numpy_decode(&encoded, &options).expect("encoded arrays decode");
    assert_eq!(decoded, array);
});
