//! Callable attributes exported by codec backends.

use crate::error::{CodecError, CodecResult, DecodeFailure};
use crate::{ArrayBuffer, CodecOptions, OptionValue};
use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::fmt;

/// Encodes an array into a byte string.
pub type EncodeFn = Arc<dyn Fn(&ArrayBuffer, &CodecOptions) -> CodecResult<Vec<u8>> + Send + Sync>;

/// Decodes a byte string into an array.
pub type DecodeFn = Arc<dyn Fn(&[u8], &CodecOptions) -> CodecResult<ArrayBuffer> + Send + Sync>;

/// Reports whether a byte string looks like this codec's format.
pub type CheckFn = Arc<dyn Fn(&[u8]) -> bool + Send + Sync>;

/// Reports the backend's version string, e.g. `zstd 1.5.7`.
pub type VersionFn = Arc<dyn Fn() -> String + Send + Sync>;

/// Any other module-level function, such as a checksum.
pub type UtilityFn = Arc<dyn Fn(&[u8], &CodecOptions) -> CodecResult<OptionValue> + Send + Sync>;

/// An error kind exported by a backend, e.g. `ZstdError`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ErrorKind {
    name: String,
}

impl ErrorKind {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Constructs an error of this kind.
    pub fn raise(&self, reason: DecodeFailure, message: impl Into<String>) -> CodecError {
        CodecError::new(reason, message).with_kind(self.name.clone())
    }

    /// Whether `error` was raised through this kind.
    pub fn matches(&self, error: &CodecError) -> bool {
        error.kind() == Some(self.name.as_str())
    }
}

/// A single named value a backend module provides.
#[derive(Clone)]
pub enum Attribute {
    Encode(EncodeFn),
    Decode(DecodeFn),
    Check(CheckFn),
    Version(VersionFn),
    Utility(UtilityFn),
    ErrorKind(ErrorKind),
    /// A constant such as the per-codec `ZSTD` availability flag.
    Flag(bool),
}

impl Attribute {
    pub fn encode<F>(f: F) -> Self
    where
        F: Fn(&ArrayBuffer, &CodecOptions) -> CodecResult<Vec<u8>> + Send + Sync + 'static,
    {
        Self::Encode(Arc::new(f))
    }

    pub fn decode<F>(f: F) -> Self
    where
        F: Fn(&[u8], &CodecOptions) -> CodecResult<ArrayBuffer> + Send + Sync + 'static,
    {
        Self::Decode(Arc::new(f))
    }

    pub fn check<F>(f: F) -> Self
    where
        F: Fn(&[u8]) -> bool + Send + Sync + 'static,
    {
        Self::Check(Arc::new(f))
    }

    pub fn version<F>(f: F) -> Self
    where
        F: Fn() -> String + Send + Sync + 'static,
    {
        Self::Version(Arc::new(f))
    }

    pub fn utility<F>(f: F) -> Self
    where
        F: Fn(&[u8], &CodecOptions) -> CodecResult<OptionValue> + Send + Sync + 'static,
    {
        Self::Utility(Arc::new(f))
    }

    /// Short name of the variant, used in diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Encode(_) => "encode",
            Self::Decode(_) => "decode",
            Self::Check(_) => "check",
            Self::Version(_) => "version",
            Self::Utility(_) => "function",
            Self::ErrorKind(_) => "error kind",
            Self::Flag(_) => "flag",
        }
    }
}

impl fmt::Debug for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ErrorKind(kind) => f.debug_tuple("ErrorKind").field(kind).finish(),
            Self::Flag(value) => f.debug_tuple("Flag").field(value).finish(),
            other => write!(f, "Attribute({})", other.kind_name()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raised_errors_carry_their_kind() {
        let kind = ErrorKind::new("ZstdError");
        let error = kind.raise(DecodeFailure::Corrupt, "bad frame");

        assert!(kind.matches(&error));
        assert!(!ErrorKind::new("PngError").matches(&error));
        assert!(!kind.matches(&CodecError::other("bad frame")));
    }

    #[test]
    fn debug_names_the_variant() {
        let decode = Attribute::decode(|data, _| Ok(ArrayBuffer::from_bytes(data)));
        assert_eq!(alloc::format!("{decode:?}"), "Attribute(decode)");
        assert_eq!(alloc::format!("{:?}", Attribute::Flag(true)), "Flag(true)");
    }
}
