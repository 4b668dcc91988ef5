//! Error types shared by codec callables and backends.

use alloc::string::{String, ToString};
use core::fmt;
use thiserror::Error;

/// Result type for codec callables.
pub type CodecResult<T> = Result<T, CodecError>;

/// Machine-readable reason attached to every [`CodecError`].
///
/// Meta-codecs (such as the generic `jpeg` decoder) pick their next attempt based on this
/// reason rather than on the text of the message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DecodeFailure {
    /// The input is not in this codec's format at all.
    NotThisFormat,
    /// The input is in this format but uses a sample precision this codec cannot decode.
    WrongBitDepth,
    /// The input is in this format but uses a frame marker (e.g. a lossless SOF) this codec cannot decode.
    WrongMarker,
    /// The input is in this format but is truncated or damaged.
    Corrupt,
    /// The input uses a feature this codec does not implement.
    Unsupported,
    /// The arguments passed to the codec are invalid.
    InvalidInput,
    /// A codec this callable delegates to has no backend in this build.
    BackendUnavailable,
    /// Anything else.
    Other,
}

impl fmt::Display for DecodeFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::NotThisFormat => "not this format",
            Self::WrongBitDepth => "wrong bit depth",
            Self::WrongMarker => "wrong marker",
            Self::Corrupt => "corrupt",
            Self::Unsupported => "unsupported",
            Self::InvalidInput => "invalid input",
            Self::BackendUnavailable => "backend unavailable",
            Self::Other => "other",
        };
        f.write_str(text)
    }
}

/// Error raised by an encode, decode or utility callable.
///
/// Displays as its message only, so that diagnostics read the same regardless of the reason.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct CodecError {
    reason: DecodeFailure,
    message: String,
    kind: Option<String>,
}

impl CodecError {
    /// Creates an error with the given reason and message.
    pub fn new(reason: DecodeFailure, message: impl Into<String>) -> Self {
        Self {
            reason,
            message: message.into(),
            kind: None,
        }
    }

    pub fn not_this_format(message: impl Into<String>) -> Self {
        Self::new(DecodeFailure::NotThisFormat, message)
    }

    pub fn corrupt(message: impl Into<String>) -> Self {
        Self::new(DecodeFailure::Corrupt, message)
    }

    pub fn unsupported(message: impl Into<String>) -> Self {
        Self::new(DecodeFailure::Unsupported, message)
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(DecodeFailure::InvalidInput, message)
    }

    pub fn backend_unavailable(message: impl Into<String>) -> Self {
        Self::new(DecodeFailure::BackendUnavailable, message)
    }

    pub fn other(message: impl Into<String>) -> Self {
        Self::new(DecodeFailure::Other, message)
    }

    /// Tags the error with the name of the error kind that raised it (e.g. `ZstdError`).
    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = Some(kind.into());
        self
    }

    pub fn reason(&self) -> DecodeFailure {
        self.reason
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Name of the error kind that raised this error, if any.
    pub fn kind(&self) -> Option<&str> {
        self.kind.as_deref()
    }
}

impl From<crate::ArrayError> for CodecError {
    fn from(e: crate::ArrayError) -> Self {
        Self::invalid_input(e.to_string())
    }
}

/// Reasons a backend module can fail to bind.
///
/// A bind failure is never fatal to the namespace. It turns every attribute the module owns
/// into an unavailable stub.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BindError {
    /// No backend for this module was compiled into the build.
    #[error("backend '{0}' is not compiled into this build")]
    NotCompiled(String),

    /// The backend's native library could not be loaded.
    #[error("library for backend '{module}' could not be loaded: {reason}")]
    LibraryMissing { module: String, reason: String },

    /// The backend's native library is present but too old or otherwise incompatible.
    #[error("backend '{module}' is incompatible: {reason}")]
    IncompatibleAbi { module: String, reason: String },

    /// Any other failure while binding.
    #[error("backend '{module}' failed to bind: {reason}")]
    Other { module: String, reason: String },
}
