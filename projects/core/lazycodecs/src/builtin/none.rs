//! The identity codec.

use lazycodecs_api_common::{ArrayBuffer, CodecBundle};

pub(crate) fn bundle() -> CodecBundle {
    CodecBundle::new("none")
        .encode(|data, _| Ok(data.as_bytes().to_vec()))
        .decode(|data, _| Ok(ArrayBuffer::from_bytes(data)))
        .check(|_| false)
        .version(String::new)
}
