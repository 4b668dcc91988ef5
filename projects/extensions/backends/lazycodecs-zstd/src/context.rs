//! Owning wrappers around ZStandard contexts.

use crate::error::ZstdError;
use core::ffi::c_void;
use core::ptr::NonNull;
use zstd_sys::*;

/// A compression context, freed on drop.
pub(crate) struct CompressionContext(NonNull<ZSTD_CCtx>);

impl CompressionContext {
    pub(crate) fn new() -> Result<Self, ZstdError> {
        NonNull::new(unsafe { ZSTD_createCCtx() })
            .map(Self)
            .ok_or(ZstdError::AllocationFailed)
    }

    pub(crate) fn set(&mut self, parameter: ZSTD_cParameter, value: i32) -> Result<(), ZstdError> {
        ZstdError::check(unsafe { ZSTD_CCtx_setParameter(self.0.as_ptr(), parameter, value) })
            .map(|_| ())
    }

    /// Compresses `source` as a single frame into `destination`, returning the frame length.
    pub(crate) fn compress(
        &mut self,
        source: &[u8],
        destination: &mut [u8],
    ) -> Result<usize, ZstdError> {
        ZstdError::check(unsafe {
            ZSTD_compress2(
                self.0.as_ptr(),
                destination.as_mut_ptr() as *mut c_void,
                destination.len(),
                source.as_ptr() as *const c_void,
                source.len(),
            )
        })
    }
}

impl Drop for CompressionContext {
    fn drop(&mut self) {
        unsafe {
            ZSTD_freeCCtx(self.0.as_ptr());
        }
    }
}

/// A streaming decompression context, freed on drop.
pub(crate) struct DecompressionStream(NonNull<ZSTD_DStream>);

impl DecompressionStream {
    pub(crate) fn new() -> Result<Self, ZstdError> {
        NonNull::new(unsafe { ZSTD_createDStream() })
            .map(Self)
            .ok_or(ZstdError::AllocationFailed)
    }

    /// Decompresses every frame in `source`, which may hold several concatenated frames.
    pub(crate) fn decompress_all(&mut self, source: &[u8]) -> Result<Vec<u8>, ZstdError> {
        let mut chunk = vec![0u8; unsafe { ZSTD_DStreamOutSize() }];
        let mut output = Vec::with_capacity(source.len());
        let mut input = ZSTD_inBuffer {
            src: source.as_ptr() as *const c_void,
            size: source.len(),
            pos: 0,
        };

        loop {
            let mut out = ZSTD_outBuffer {
                dst: chunk.as_mut_ptr() as *mut c_void,
                size: chunk.len(),
                pos: 0,
            };
            let remaining = ZstdError::check(unsafe {
                ZSTD_decompressStream(self.0.as_ptr(), &mut out, &mut input)
            })?;
            output.extend_from_slice(&chunk[..out.pos]);

            let input_consumed = input.pos == input.size;
            if remaining == 0 && input_consumed {
                return Ok(output);
            }
            // a frame is still open but there is nothing left to feed it
            if input_consumed && out.pos < out.size {
                return Err(ZstdError::Truncated);
            }
        }
    }
}

impl Drop for DecompressionStream {
    fn drop(&mut self) {
        unsafe {
            ZSTD_freeDStream(self.0.as_ptr());
        }
    }
}
