#![no_main]

// Generic read must never panic, whatever the bytes and codec hint.

use lazycodecs::{Namespace, ReadOptions};
use libfuzzer_sys::{arbitrary, fuzz_target};

#[derive(Clone, Debug, arbitrary::Arbitrary)]
pub struct ReadInput {
    pub hint: Option<String>,
    pub bitspersample: Option<u8>,
    pub data: Vec<u8>,
}

fuzz_target!(|input: ReadInput| {
    let mut options = ReadOptions::new();
    if let Some(hint) = input.hint {
        options = options.codec(hint);
    }
    if let Some(bits) = input.bitspersample {
        options = options.option("bitspersample", i64::from(bits));
    }

    if let Ok(array) = Namespace::global().read(input.data.as_slice(), &options) {
        assert!(array.element_type().is_determined());
    }
});
