//! Error types for registry construction, attribute resolution and dispatch.

use crate::registry::Owner;
use lazycodecs_api_common::CodecError;
use thiserror::Error;

/// Result type for namespace operations
pub type NamespaceResult<T> = Result<T, NamespaceError>;

/// Result type for read/write dispatch
pub type DispatchResult<T> = Result<T, DispatchError>;

/// Inconsistencies found while building a registry from its declarative table.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RegistryError {
    /// Two modules declare the same attribute.
    #[error("attribute '{name}' is declared by both {first} and {second}")]
    DuplicateAttribute {
        name: String,
        first: Owner,
        second: Owner,
    },

    /// An alias points at a name no module declares.
    #[error("alias '{alias}' points to unknown attribute '{target}'")]
    UnknownAliasTarget { alias: String, target: String },
}

/// Errors resolving or using a namespace attribute.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum NamespaceError {
    /// The name is neither a registry attribute nor a compatibility alias.
    #[error("module has no attribute '{0}'")]
    UnknownAttribute(String),

    /// The attribute resolved to a stub and was used in a way that needs the real backend.
    #[error("could not bind '{name}': {reason}")]
    Unavailable { name: String, reason: String },

    /// The attribute exists but is not of the kind the caller asked for.
    #[error("'{name}' is a {found}, not a {expected}")]
    KindMismatch {
        name: String,
        expected: &'static str,
        found: &'static str,
    },

    /// The bound callable itself failed.
    #[error(transparent)]
    Backend(#[from] CodecError),
}

impl From<NamespaceError> for CodecError {
    fn from(e: NamespaceError) -> Self {
        match e {
            NamespaceError::Backend(inner) => inner,
            NamespaceError::Unavailable { .. } => CodecError::backend_unavailable(e.to_string()),
            other => CodecError::other(other.to_string()),
        }
    }
}

/// Errors from [`Namespace::read`](crate::Namespace::read) and [`Namespace::write`](crate::Namespace::write).
#[derive(Debug, Error)]
pub enum DispatchError {
    /// Every candidate decoder failed. Holds one `NAME: reason` line per attempt.
    #[error("{}", .diagnostics.join("\n"))]
    Exhausted { diagnostics: Vec<String> },

    /// The codec named for writing has no encoder in the namespace.
    #[error("invalid codec '{0}'")]
    InvalidCodec(String),

    /// Writing to a stream without naming a codec.
    #[error("no codec specified for a stream destination")]
    NoCodecSpecified,

    /// A codec selector that cannot name anything, such as an empty string.
    #[error("invalid codec selector '{0}'")]
    InvalidSelector(String),

    /// Resolving or calling a namespace attribute failed.
    #[error(transparent)]
    Namespace(#[from] NamespaceError),

    /// The encoder failed.
    #[error("encode failed: {0}")]
    Codec(#[from] CodecError),

    /// Reading the source or writing the destination failed.
    #[error("{0}")]
    Io(#[from] IoError),
}

/// Failure while touching a file or stream.
#[derive(Debug, Error)]
pub enum IoError {
    #[error("i/o: {0}")]
    Std(#[from] std::io::Error),

    /// The file could not be opened or created for mapping.
    #[cfg(feature = "file-io")]
    #[error("cannot open file for mapping: {0}")]
    Open(#[from] lightweight_mmap::handles::HandleOpenError),

    #[cfg(feature = "file-io")]
    #[error("cannot map file: {0}")]
    Map(#[from] lightweight_mmap::mmap::MmapError),
}

impl From<std::io::Error> for DispatchError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e.into())
    }
}

#[cfg(feature = "file-io")]
impl From<lightweight_mmap::handles::HandleOpenError> for DispatchError {
    fn from(e: lightweight_mmap::handles::HandleOpenError) -> Self {
        Self::Io(e.into())
    }
}

#[cfg(feature = "file-io")]
impl From<lightweight_mmap::mmap::MmapError> for DispatchError {
    fn from(e: lightweight_mmap::mmap::MmapError) -> Self {
        Self::Io(e.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lazycodecs_api_common::DecodeFailure;

    #[test]
    fn exhausted_joins_diagnostics_by_line() {
        let error = DispatchError::Exhausted {
            diagnostics: vec![
                "TIFF_DECODE: not a TIFF file".into(),
                "PNG_DECODE: bad signature".into(),
            ],
        };
        assert_eq!(
            error.to_string(),
            "TIFF_DECODE: not a TIFF file\nPNG_DECODE: bad signature"
        );
    }

    #[test]
    fn std_io_errors_convert_through_question_mark() {
        fn open() -> DispatchResult<()> {
            Err(std::io::Error::from(std::io::ErrorKind::NotFound))?
        }
        let error = open().unwrap_err();
        assert!(matches!(error, DispatchError::Io(IoError::Std(_))));
        assert!(error.to_string().starts_with("i/o: "));
    }

    #[test]
    fn unavailable_converts_to_backend_unavailable() {
        let error = NamespaceError::Unavailable {
            name: "jpeg12_decode".into(),
            reason: "backend 'jpeg12' is not compiled into this build".into(),
        };
        let codec_error = CodecError::from(error);
        assert_eq!(codec_error.reason(), DecodeFailure::BackendUnavailable);
        assert!(codec_error.message().contains("jpeg12_decode"));
    }

    #[test]
    fn backend_errors_pass_through_unchanged() {
        let inner = CodecError::corrupt("truncated");
        let converted = CodecError::from(NamespaceError::Backend(inner.clone()));
        assert_eq!(converted, inner);
    }
}
