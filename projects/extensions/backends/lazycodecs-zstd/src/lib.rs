#![doc = include_str!(concat!("../", core::env!("CARGO_PKG_README")))]

mod context;
mod error;

pub use error::{ZstdError, ERROR_KIND};

use context::{CompressionContext, DecompressionStream};
use core::ffi::{c_ulonglong, c_void};
use lazycodecs_api_common::{
    ArrayBuffer, BackendModule, BindError, BoundModule, CodecBundle, CodecOptions, CodecResult,
    ModuleExports,
};
use tracing::debug;
use zstd_sys::ZSTD_cParameter::*;
use zstd_sys::*;

/// Name of the module in the codec registry.
pub const MODULE_NAME: &str = "zstd";

/// Oldest library version the backend binds against (1.4.0).
pub const MIN_LIBRARY_VERSION: u32 = 10400;

/// Magic number opening every ZStandard frame.
pub const FRAME_MAGIC: [u8; 4] = [0x28, 0xB5, 0x2F, 0xFD];

/// Declared content sizes are trusted for a single allocation up to this multiple of the
/// input length (or [`ONE_SHOT_FLOOR`], whichever is larger). Bigger frames are streamed.
const ONE_SHOT_RATIO: usize = 1024;
const ONE_SHOT_FLOOR: usize = 16 * 1024 * 1024;

/// Level used without a `level` option. `ZSTD_defaultCLevel` needs 1.5.0.
const DEFAULT_LEVEL: i32 = ZSTD_CLEVEL_DEFAULT as i32;

/// The `zstd` backend module.
#[derive(Debug, Clone, Copy, Default)]
pub struct ZstdBackend;

impl BackendModule for ZstdBackend {
    fn name(&self) -> &str {
        MODULE_NAME
    }

    fn bind(&self) -> Result<Box<dyn BoundModule>, BindError> {
        let linked = library_version();
        if linked < MIN_LIBRARY_VERSION {
            return Err(BindError::IncompatibleAbi {
                module: MODULE_NAME.into(),
                reason: format!(
                    "linked ZStandard {} is older than {}",
                    format_version(linked),
                    format_version(MIN_LIBRARY_VERSION)
                ),
            });
        }

        let bundle = CodecBundle::new(MODULE_NAME)
            .encode(zstd_encode)
            .decode(zstd_decode)
            .check(zstd_check)
            .version(zstd_version);
        Ok(Box::new(ModuleExports::from(bundle)))
    }
}

/// Compresses the array's bytes into a single frame.
///
/// # Options
///
/// - `level`: compression level, defaults to the library's default (3).
/// - `numthreads`: worker threads. Ignored when the library was built without multithreading.
pub fn zstd_encode(data: &ArrayBuffer, options: &CodecOptions) -> CodecResult<Vec<u8>> {
    let level = compression_level(options)?;
    let workers = match options.get_int("numthreads") {
        None => 0,
        Some(n) => i32::try_from(n)
            .ok()
            .filter(|n| *n >= 0)
            .ok_or(ZstdError::InvalidOption("numthreads"))?,
    };

    Ok(compress(data.as_bytes(), level, workers, true)?)
}

/// Decompresses one or more concatenated frames into a one-dimensional `uint8` array.
pub fn zstd_decode(data: &[u8], _options: &CodecOptions) -> CodecResult<ArrayBuffer> {
    Ok(ArrayBuffer::from_vec(decompress(data)?))
}

/// Whether `data` starts with a ZStandard frame.
pub fn zstd_check(data: &[u8]) -> bool {
    data.starts_with(&FRAME_MAGIC)
}

/// `zstd X.Y.Z` for the linked library.
pub fn zstd_version() -> String {
    format!("zstd {}", format_version(library_version()))
}

fn library_version() -> u32 {
    unsafe { ZSTD_versionNumber() }
}

fn format_version(version: u32) -> String {
    format!(
        "{}.{}.{}",
        version / 10000,
        (version / 100) % 100,
        version % 100
    )
}

fn compression_level(options: &CodecOptions) -> Result<i32, ZstdError> {
    let Some(level) = options.get_int("level") else {
        return Ok(DEFAULT_LEVEL);
    };

    let (min, max) = unsafe { (ZSTD_minCLevel(), ZSTD_maxCLevel()) };
    i32::try_from(level)
        .ok()
        .filter(|level| (min..=max).contains(level))
        .ok_or(ZstdError::InvalidLevel { level, min, max })
}

fn compress(
    source: &[u8],
    level: i32,
    workers: i32,
    content_size: bool,
) -> Result<Vec<u8>, ZstdError> {
    let mut context = CompressionContext::new()?;
    context.set(ZSTD_c_compressionLevel, level)?;
    context.set(ZSTD_c_contentSizeFlag, i32::from(content_size))?;
    if workers > 0 {
        if let Err(e) = context.set(ZSTD_c_nbWorkers, workers) {
            debug!(workers, error = %e, "multithreading unavailable, compressing on one thread");
        }
    }

    let mut destination = vec![0u8; unsafe { ZSTD_compressBound(source.len()) }];
    let written = context.compress(source, &mut destination)?;
    destination.truncate(written);
    Ok(destination)
}

fn decompress(source: &[u8]) -> Result<Vec<u8>, ZstdError> {
    if !zstd_check(source) {
        return Err(ZstdError::NotAFrame);
    }

    let declared =
        unsafe { ZSTD_getFrameContentSize(source.as_ptr() as *const c_void, source.len()) };
    if declared == ZSTD_CONTENTSIZE_ERROR as c_ulonglong {
        return Err(ZstdError::InvalidHeader);
    }

    let trusted = source.len().saturating_mul(ONE_SHOT_RATIO).max(ONE_SHOT_FLOOR);
    match usize::try_from(declared) {
        Ok(size) if declared != ZSTD_CONTENTSIZE_UNKNOWN as c_ulonglong && size <= trusted => {
            match decompress_exact(source, size) {
                // further frames follow the first one
                Err(ZstdError::Internal {
                    code: ZSTD_ErrorCode::ZSTD_error_dstSize_tooSmall,
                    ..
                }) => DecompressionStream::new()?.decompress_all(source),
                result => result,
            }
        }
        _ => DecompressionStream::new()?.decompress_all(source),
    }
}

fn decompress_exact(source: &[u8], size: usize) -> Result<Vec<u8>, ZstdError> {
    let mut destination = vec![0u8; size];
    let written = ZstdError::check(unsafe {
        ZSTD_decompress(
            destination.as_mut_ptr() as *mut c_void,
            destination.len(),
            source.as_ptr() as *const c_void,
            source.len(),
        )
    })?;
    destination.truncate(written);
    Ok(destination)
}
