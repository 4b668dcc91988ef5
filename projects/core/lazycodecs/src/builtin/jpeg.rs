//! The generic `jpeg` codec, which delegates to the 8-bit, 12-bit and lossless variants.
//!
//! Decoding tries the 8-bit decoder first and follows the [`DecodeFailure`] it reports:
//! a wrong sample precision moves on to the 12-bit decoder, a lossless frame marker moves on
//! to the SOF3 decoder and then the LJPEG decoder.

use crate::namespace::{Namespace, WeakNamespace};
use lazycodecs_api_common::{
    ArrayBuffer, CodecBundle, CodecError, CodecOptions, CodecResult, DecodeFailure, ElementType,
};
use tracing::debug;

const JPEG8: &str = "jpeg8";
const JPEG12: &str = "jpeg12";
const JPEGSOF3: &str = "jpegsof3";
const LJPEG: &str = "ljpeg";

/// End-of-image marker appended after an abbreviated stream and its `header`.
const EOI: [u8; 2] = [0xFF, 0xD9];

/// Backends that only report failures as text. Maps a message fragment to the reason it implies.
const MESSAGE_REASONS: &[(&str, DecodeFailure)] = &[
    ("Unsupported JPEG data precision", DecodeFailure::WrongBitDepth),
    ("SOF type", DecodeFailure::WrongMarker),
];

pub(crate) fn bundle(namespace: WeakNamespace) -> CodecBundle {
    let encoder = namespace.clone();
    CodecBundle::new("jpeg")
        .decode(move |data, options| jpeg_decode(&namespace.upgrade()?, data, options))
        .encode(move |data, options| jpeg_encode(&encoder.upgrade()?, data, options))
}

/// Reason behind a variant's failure, falling back to its message for untyped errors.
pub(crate) fn failure_reason(error: &CodecError) -> DecodeFailure {
    if error.reason() != DecodeFailure::Other {
        return error.reason();
    }
    MESSAGE_REASONS
        .iter()
        .find(|(fragment, _)| error.message().contains(fragment))
        .map_or(DecodeFailure::Other, |(_, reason)| *reason)
}

fn jpeg_decode(
    namespace: &Namespace,
    data: &[u8],
    options: &CodecOptions,
) -> CodecResult<ArrayBuffer> {
    let framed;
    let data = match options.get_bytes("header") {
        Some(header) => {
            framed = [header, data, &EOI].concat();
            framed.as_slice()
        }
        None => data,
    };
    let forwarded = options.without(&["bitspersample", "header"]);
    let decode = |codec: &str| -> CodecResult<ArrayBuffer> {
        Ok(namespace.decode(codec, data, &forwarded)?)
    };

    let first = match options.get_int("bitspersample") {
        None | Some(8) => JPEG8,
        Some(12) => JPEG12,
        Some(_) => return decode_lossless(decode),
    };

    let error = match decode(first) {
        Ok(array) => return Ok(array),
        Err(error) => error,
    };
    match failure_reason(&error) {
        DecodeFailure::WrongBitDepth if !options.contains("bitspersample") => {
            debug!(%error, "retrying as 12-bit JPEG");
            decode(JPEG12)
        }
        DecodeFailure::WrongMarker => {
            debug!(%error, "retrying as lossless JPEG");
            decode_lossless(decode)
        }
        _ => Err(error),
    }
}

fn decode_lossless(decode: impl Fn(&str) -> CodecResult<ArrayBuffer>) -> CodecResult<ArrayBuffer> {
    decode(JPEGSOF3).or_else(|error| {
        debug!(%error, "SOF3 decoder failed, trying LJPEG");
        decode(LJPEG)
    })
}

fn jpeg_encode(
    namespace: &Namespace,
    data: &ArrayBuffer,
    options: &CodecOptions,
) -> CodecResult<Vec<u8>> {
    let codec = if options.get_bool("lossless").unwrap_or(false) {
        LJPEG
    } else {
        match data.element_type() {
            ElementType::U8 => JPEG8,
            ElementType::U16 => JPEG12,
            other => {
                return Err(CodecError::invalid_input(format!(
                    "invalid data type {other}"
                )))
            }
        }
    };

    let forwarded = if codec == LJPEG {
        options.without(&["lossless"])
    } else {
        options.without(&["lossless", "bitspersample"])
    };
    Ok(namespace.encode(codec, data, &forwarded)?)
}
