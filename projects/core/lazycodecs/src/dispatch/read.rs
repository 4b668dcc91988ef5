//! Generic read: tries candidate decoders until one produces a typed array.

use super::candidates::{build_candidates, Candidate, CodecSelector, ResolvedDecoder};
use super::source::{with_input, Source};
use crate::error::{DispatchError, DispatchResult, NamespaceError};
use crate::namespace::Namespace;
use lazycodecs_api_common::naming::DECODE_SUFFIX;
use lazycodecs_api_common::{ArrayBuffer, CodecOptions, DecodeFailure, OptionValue};
use tracing::{debug, trace};

/// Options for [`Namespace::read`].
///
/// By default every plausible codec is tried, path input is memory-mapped and no options are
/// forwarded to the decoders.
#[derive(Debug, Clone)]
pub struct ReadOptions {
    codec: Option<CodecSelector>,
    memory_map: bool,
    options: CodecOptions,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            codec: None,
            memory_map: true,
            options: CodecOptions::new(),
        }
    }
}

impl ReadOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restricts the trial to the given codec(s) or decoder(s).
    pub fn codec(mut self, codec: impl Into<CodecSelector>) -> Self {
        self.codec = Some(codec.into());
        self
    }

    /// Whether path input is memory-mapped rather than read into memory.
    pub fn memory_map(mut self, enabled: bool) -> Self {
        self.memory_map = enabled;
        self
    }

    /// Forwards `key = value` to every decoder tried.
    pub fn option(mut self, key: impl Into<String>, value: impl Into<OptionValue>) -> Self {
        self.options.set(key, value);
        self
    }

    pub fn options(mut self, options: CodecOptions) -> Self {
        self.options = options;
        self
    }

    pub fn selector(&self) -> Option<&CodecSelector> {
        self.codec.as_ref()
    }

    pub fn uses_memory_map(&self) -> bool {
        self.memory_map
    }

    pub fn codec_options(&self) -> &CodecOptions {
        &self.options
    }
}

/// What a single candidate did with the input.
enum Trial {
    Decoded(ArrayBuffer, ResolvedDecoder),
    Skipped,
    Failed(String),
}

impl Namespace {
    /// Decodes `source` with the first candidate codec that succeeds.
    ///
    /// # Errors
    ///
    /// [`DispatchError::Exhausted`] when no candidate succeeds, with one diagnostic line per
    /// failed candidate. Candidates whose backend is unavailable are skipped without a line.
    pub fn read<'a>(
        &self,
        source: impl Into<Source<'a>>,
        options: &ReadOptions,
    ) -> DispatchResult<ArrayBuffer> {
        self.read_with_codec(source, options)
            .map(|(array, _)| array)
    }

    /// Like [`Namespace::read`], also returning the decoder that succeeded.
    pub fn read_with_codec<'a>(
        &self,
        source: impl Into<Source<'a>>,
        options: &ReadOptions,
    ) -> DispatchResult<(ArrayBuffer, ResolvedDecoder)> {
        let source = source.into();
        let extension = source.extension();
        let candidates = build_candidates(options.selector(), extension.as_deref())?;

        with_input(source, options.uses_memory_map(), |data| {
            self.try_candidates(&candidates, data, options.codec_options())
        })?
    }

    fn try_candidates(
        &self,
        candidates: &[Candidate],
        data: &[u8],
        options: &CodecOptions,
    ) -> DispatchResult<(ArrayBuffer, ResolvedDecoder)> {
        let mut diagnostics = Vec::new();
        for candidate in candidates {
            match self.try_candidate(candidate, data, options) {
                Trial::Decoded(array, decoder) => {
                    debug!(codec = %decoder.label, "decoded");
                    return Ok((array, decoder));
                }
                Trial::Skipped => {}
                Trial::Failed(diagnostic) => {
                    debug!(%diagnostic, "candidate failed");
                    diagnostics.push(diagnostic);
                }
            }
        }
        Err(DispatchError::Exhausted { diagnostics })
    }

    fn try_candidate(&self, candidate: &Candidate, data: &[u8], options: &CodecOptions) -> Trial {
        let decoder = match candidate {
            Candidate::Decoder(decoder) => decoder.clone(),
            Candidate::Named(codec) => match self.resolve_decoder(codec) {
                Ok(decoder) => decoder,
                Err(NamespaceError::Unavailable { name, .. }) => {
                    trace!(%name, "backend unavailable, skipping");
                    return Trial::Skipped;
                }
                Err(error) => {
                    return Trial::Failed(format!("'{}': {error}", codec.to_uppercase()));
                }
            },
        };

        let label = decoder.label.to_uppercase();
        match decoder.decode(data, options) {
            Ok(array) if array.element_type().is_determined() => Trial::Decoded(array, decoder),
            Ok(_) => Trial::Failed(format!("{label}: failed")),
            Err(error) if error.reason() == DecodeFailure::BackendUnavailable => {
                trace!(codec = %decoder.label, %error, "backend unavailable, skipping");
                Trial::Skipped
            }
            Err(error) => Trial::Failed(format!("{label}: {error}")),
        }
    }

    fn resolve_decoder(&self, codec: &str) -> Result<ResolvedDecoder, NamespaceError> {
        let label = format!("{codec}{DECODE_SUFFIX}");
        let func = self.get(&label)?.decoder()?;
        Ok(ResolvedDecoder { label, func })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_prelude::*;
    use std::io::Cursor;

    fn image_namespace() -> Namespace {
        namespace_with([magic_codec("png", b"\x89PNG"), magic_codec("tiff", b"II*\0")])
    }

    #[test]
    fn picks_first_candidate_that_decodes() {
        let namespace = image_namespace();
        let (array, decoder) = namespace
            .read_with_codec(b"\x89PNGpixels", &ReadOptions::new())
            .unwrap();

        assert_eq!(array.as_bytes(), b"pixels");
        assert_eq!(decoder.label, "png_decode");
    }

    #[test]
    fn unavailable_backends_are_skipped_silently() {
        let namespace = image_namespace();
        let error = namespace
            .read(b"garbage", &ReadOptions::new())
            .unwrap_err();

        let DispatchError::Exhausted { diagnostics } = error else {
            panic!("expected exhaustion, got {error:?}");
        };
        assert_eq!(
            diagnostics,
            [
                "TIFF_DECODE: not a tiff stream",
                "PNG_DECODE: not a png stream",
                "NUMPY_DECODE: not a numpy array",
            ]
        );
    }

    #[test]
    fn exhaustion_message_lists_each_candidate_on_its_own_line() {
        let namespace = image_namespace();
        let message = namespace
            .read(b"garbage", &ReadOptions::new().codec(["tiff", "png"]))
            .unwrap_err()
            .to_string();

        assert_eq!(
            message,
            "TIFF_DECODE: not a tiff stream\nPNG_DECODE: not a png stream"
        );
    }

    #[test]
    fn unknown_codec_names_become_diagnostics() {
        let namespace = image_namespace();
        let array = namespace
            .read(b"\x89PNG", &ReadOptions::new().codec(["bogus", "png"]))
            .unwrap();
        assert!(array.is_empty());

        let message = namespace
            .read(b"nothing", &ReadOptions::new().codec("bogus"))
            .unwrap_err()
            .to_string();
        assert_eq!(message, "'BOGUS': module has no attribute 'bogus_decode'");
    }

    #[test]
    fn codec_hint_accepts_file_extensions() {
        let namespace = image_namespace();
        let array = namespace
            .read(b"II*\0data", &ReadOptions::new().codec("TIF"))
            .unwrap();
        assert_eq!(array.as_bytes(), b"data");
    }

    #[test]
    fn undetermined_results_count_as_failure() {
        let namespace = image_namespace();
        let opaque = ResolvedDecoder::new("opaque", |data, _| {
            Ok(ArrayBuffer::undetermined(data.to_vec()))
        });

        let message = namespace
            .read(b"anything", &ReadOptions::new().codec(opaque))
            .unwrap_err()
            .to_string();
        assert_eq!(message, "OPAQUE: failed");
    }

    #[test]
    fn decoders_receive_caller_options() {
        let namespace = image_namespace();
        let echo_level = ResolvedDecoder::new("echo_level", |_, options| {
            let level = options.get_int("level").unwrap_or_default();
            Ok(ArrayBuffer::from_vec(vec![level as u8]))
        });

        let array = namespace
            .read(b"", &ReadOptions::new().codec(echo_level).option("level", 7))
            .unwrap();
        assert_eq!(array.as_bytes(), [7]);
    }

    #[test]
    fn seekable_input_is_restored_after_failure() {
        let namespace = image_namespace();
        let mut cursor = Cursor::new(b"headerjunk".to_vec());
        cursor.set_position(6);

        let result = namespace.read(Source::Seekable(&mut cursor), &ReadOptions::new());
        assert!(result.is_err());
        assert_eq!(cursor.position(), 6);
    }

    #[test]
    fn empty_selector_is_rejected() {
        let namespace = image_namespace();
        let empty: [&str; 0] = [];
        let error = namespace
            .read(b"", &ReadOptions::new().codec(empty))
            .unwrap_err();
        assert!(matches!(error, DispatchError::InvalidSelector(_)));
    }
}
