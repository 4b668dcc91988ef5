use core::ffi::CStr;
use lazycodecs_api_common::{CodecError, DecodeFailure};
use thiserror::Error;
use zstd_sys::*;

/// Name of the error kind this module exports.
pub const ERROR_KIND: &str = "ZstdError";

/// Errors that can occur while compressing or decompressing.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ZstdError {
    /// Input does not start with a ZStandard frame
    #[error("not a zstd frame")]
    NotAFrame,

    /// Compression level outside what the linked library supports
    #[error("invalid compression level {level} (expected {min} to {max})")]
    InvalidLevel { level: i64, min: i32, max: i32 },

    /// An option had an unusable value
    #[error("invalid value for option '{0}'")]
    InvalidOption(&'static str),

    /// The frame header is malformed
    #[error("invalid frame header")]
    InvalidHeader,

    /// Input ended in the middle of a frame
    #[error("truncated input, frame is incomplete")]
    Truncated,

    /// Memory allocation for a context failed
    #[error("failed to allocate a ZStandard context")]
    AllocationFailed,

    /// ZStandard internal error
    #[error("ZStandard error: {name}")]
    Internal { code: ZSTD_ErrorCode, name: String },
}

impl ZstdError {
    /// Converts a ZStandard return code into a `Result`.
    pub(crate) fn check(code: usize) -> Result<usize, Self> {
        if unsafe { ZSTD_isError(code) } == 0 {
            return Ok(code);
        }

        // SAFETY: ZSTD_getErrorName returns a static, nul-terminated string.
        let name = unsafe { CStr::from_ptr(ZSTD_getErrorName(code)) }
            .to_string_lossy()
            .into_owned();
        Err(Self::Internal {
            code: unsafe { ZSTD_getErrorCode(code) },
            name,
        })
    }

    fn reason(&self) -> DecodeFailure {
        match self {
            Self::NotAFrame => DecodeFailure::NotThisFormat,
            Self::InvalidLevel { .. } | Self::InvalidOption(_) => DecodeFailure::InvalidInput,
            Self::InvalidHeader | Self::Truncated => DecodeFailure::Corrupt,
            Self::Internal { code, .. } => match code {
                ZSTD_ErrorCode::ZSTD_error_prefix_unknown => DecodeFailure::NotThisFormat,
                ZSTD_ErrorCode::ZSTD_error_corruption_detected
                | ZSTD_ErrorCode::ZSTD_error_checksum_wrong
                | ZSTD_ErrorCode::ZSTD_error_srcSize_wrong => DecodeFailure::Corrupt,
                _ => DecodeFailure::Other,
            },
            Self::AllocationFailed => DecodeFailure::Other,
        }
    }
}

impl From<ZstdError> for CodecError {
    fn from(e: ZstdError) -> Self {
        CodecError::new(e.reason(), e.to_string()).with_kind(ERROR_KIND)
    }
}
