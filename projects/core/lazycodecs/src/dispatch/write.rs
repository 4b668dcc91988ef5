//! Generic write: encodes with a named or given encoder and stores the result.

use super::extensions::normalize_codec;
use super::source::{write_output, Destination};
use crate::error::{DispatchError, DispatchResult, NamespaceError};
use crate::namespace::Namespace;
use lazycodecs_api_common::naming::ENCODE_SUFFIX;
use lazycodecs_api_common::{ArrayBuffer, CodecOptions, CodecResult, EncodeFn};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// The encoder [`Namespace::write`] should use.
#[derive(Clone)]
pub enum WriteCodec {
    /// A codec name or file extension, resolved as `<codec>_encode`.
    Name(String),
    Encoder(EncodeFn),
}

impl WriteCodec {
    pub fn encoder<F>(func: F) -> Self
    where
        F: Fn(&ArrayBuffer, &CodecOptions) -> CodecResult<Vec<u8>> + Send + Sync + 'static,
    {
        Self::Encoder(Arc::new(func))
    }
}

impl fmt::Debug for WriteCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name(name) => f.debug_tuple("Name").field(name).finish(),
            Self::Encoder(_) => f.write_str("Encoder(..)"),
        }
    }
}

impl From<&str> for WriteCodec {
    fn from(name: &str) -> Self {
        Self::Name(name.to_owned())
    }
}

impl From<String> for WriteCodec {
    fn from(name: String) -> Self {
        Self::Name(name)
    }
}

impl Namespace {
    /// Encodes `data` and writes the result to `destination`.
    ///
    /// Without a codec, the destination's file extension picks one. A path without an
    /// extension names the empty codec.
    ///
    /// # Errors
    ///
    /// - [`DispatchError::NoCodecSpecified`] for streams without a codec.
    /// - [`DispatchError::InvalidCodec`] when the codec has no encoder in the namespace.
    /// - [`DispatchError::Namespace`] when the encoder's backend is unavailable.
    /// - [`DispatchError::Codec`] when the encoder fails.
    pub fn write<'a>(
        &self,
        destination: impl Into<Destination<'a>>,
        data: &ArrayBuffer,
        codec: Option<WriteCodec>,
        options: &CodecOptions,
    ) -> DispatchResult<()> {
        let destination = destination.into();
        let codec = match (codec, &destination) {
            (Some(codec), _) => codec,
            (None, Destination::Path(_)) => {
                WriteCodec::Name(destination.extension().unwrap_or_default())
            }
            (None, Destination::Stream(_)) => return Err(DispatchError::NoCodecSpecified),
        };

        let encoder = match codec {
            WriteCodec::Encoder(encoder) => encoder,
            WriteCodec::Name(name) => self.resolve_encoder(&name)?,
        };

        let encoded = encoder(data, options)?;
        debug!(bytes = encoded.len(), "encoded");
        write_output(destination, &encoded)
    }

    fn resolve_encoder(&self, name: &str) -> DispatchResult<EncodeFn> {
        let codec = normalize_codec(name);
        if codec.is_empty() {
            return Err(DispatchError::InvalidCodec(codec));
        }
        let capability = match self.get(&format!("{codec}{ENCODE_SUFFIX}")) {
            Ok(capability) => capability,
            Err(NamespaceError::UnknownAttribute(_)) => {
                return Err(DispatchError::InvalidCodec(codec))
            }
            Err(other) => return Err(other.into()),
        };
        Ok(capability.encoder()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_prelude::*;

    fn namespace() -> Namespace {
        namespace_with([magic_codec("png", b"\x89PNG")])
    }

    #[test]
    fn stream_without_codec_is_rejected() {
        let mut out = Vec::new();
        let error = namespace()
            .write(
                Destination::Stream(&mut out),
                &ArrayBuffer::from_bytes(b"x"),
                None,
                &CodecOptions::new(),
            )
            .unwrap_err();
        assert!(matches!(error, DispatchError::NoCodecSpecified));
    }

    #[test]
    fn named_codec_is_mapped_through_extensions() {
        let mut out = Vec::new();
        namespace()
            .write(
                Destination::Stream(&mut out),
                &ArrayBuffer::from_bytes(b"px"),
                Some("PNG".into()),
                &CodecOptions::new(),
            )
            .unwrap();
        assert_eq!(out, b"\x89PNGpx");
    }

    #[test]
    fn unknown_codec_is_invalid() {
        let mut out = Vec::new();
        let error = namespace()
            .write(
                Destination::Stream(&mut out),
                &ArrayBuffer::from_bytes(b"x"),
                Some("nosuch".into()),
                &CodecOptions::new(),
            )
            .unwrap_err();
        assert_eq!(error.to_string(), "invalid codec 'nosuch'");
        assert!(out.is_empty());
    }

    #[test]
    fn unavailable_encoder_fails_when_used() {
        let mut out = Vec::new();
        let error = namespace()
            .write(
                Destination::Stream(&mut out),
                &ArrayBuffer::from_bytes(b"x"),
                Some("webp".into()),
                &CodecOptions::new(),
            )
            .unwrap_err();
        assert!(matches!(
            error,
            DispatchError::Namespace(NamespaceError::Unavailable { ref name, .. }) if name == "webp_encode"
        ));
    }

    #[test]
    fn explicit_encoder_is_used_as_is() {
        let mut out = Vec::new();
        let reverse = WriteCodec::encoder(|array, _| {
            Ok(array.as_bytes().iter().rev().copied().collect())
        });
        namespace()
            .write(
                Destination::Stream(&mut out),
                &ArrayBuffer::from_bytes(b"abc"),
                Some(reverse),
                &CodecOptions::new(),
            )
            .unwrap();
        assert_eq!(out, b"cba");
    }

    #[test]
    fn encoder_errors_propagate() {
        let mut out = Vec::new();
        let failing = WriteCodec::encoder(|_, _| Err(CodecError::invalid_input("bad data")));
        let error = namespace()
            .write(
                Destination::Stream(&mut out),
                &ArrayBuffer::from_bytes(b"abc"),
                Some(failing),
                &CodecOptions::new(),
            )
            .unwrap_err();
        assert!(matches!(error, DispatchError::Codec(_)));
    }
}
