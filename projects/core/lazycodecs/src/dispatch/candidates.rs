//! Candidate decoders tried by [`Namespace::read`](crate::Namespace::read), in order.

use super::extensions::{codec_for_extension, normalize_codec};
use crate::error::{DispatchError, DispatchResult};
use lazycodecs_api_common::{ArrayBuffer, CodecOptions, CodecResult, DecodeFn};
use std::fmt;
use std::sync::Arc;

/// The generic `jpeg` codec stands for these variants, tried in this order.
const JPEG_VARIANTS: [&str; 4] = ["jpeg8", "jpeg12", "jpegsof3", "ljpeg"];

/// Codecs tried after the extension's codec when no codec is named.
pub const FALLBACK_ORDER: [&str; 19] = [
    "tiff", "apng", "png", "gif", "webp", "jpeg8", "jpeg12", "jpegsof3", "jpeg2k", "jpegls",
    "jpegxr", "jpegxl", "avif", "heif", "ljpeg", "zfp", "lerc", "rgbe", "numpy",
];

/// A decode callable together with the name it is reported under.
#[derive(Clone)]
pub struct ResolvedDecoder {
    pub label: String,
    pub func: DecodeFn,
}

impl ResolvedDecoder {
    pub fn new<F>(label: impl Into<String>, func: F) -> Self
    where
        F: Fn(&[u8], &CodecOptions) -> CodecResult<ArrayBuffer> + Send + Sync + 'static,
    {
        Self {
            label: label.into(),
            func: Arc::new(func),
        }
    }

    pub fn decode(&self, data: &[u8], options: &CodecOptions) -> CodecResult<ArrayBuffer> {
        (self.func)(data, options)
    }
}

impl fmt::Debug for ResolvedDecoder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ResolvedDecoder").field(&self.label).finish()
    }
}

/// Which codecs [`Namespace::read`](crate::Namespace::read) should try.
#[derive(Debug, Clone)]
pub enum CodecSelector {
    /// A codec name or file extension, e.g. `png` or `jpg`.
    Name(String),
    /// Several names, tried in order.
    Names(Vec<String>),
    Decoder(ResolvedDecoder),
    Decoders(Vec<ResolvedDecoder>),
}

impl From<&str> for CodecSelector {
    fn from(name: &str) -> Self {
        Self::Name(name.to_owned())
    }
}

impl From<String> for CodecSelector {
    fn from(name: String) -> Self {
        Self::Name(name)
    }
}

impl From<&[&str]> for CodecSelector {
    fn from(names: &[&str]) -> Self {
        Self::Names(names.iter().map(|name| (*name).to_owned()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for CodecSelector {
    fn from(names: [&str; N]) -> Self {
        Self::from(names.as_slice())
    }
}

impl From<ResolvedDecoder> for CodecSelector {
    fn from(decoder: ResolvedDecoder) -> Self {
        Self::Decoder(decoder)
    }
}

/// One entry of the trial order.
#[derive(Debug, Clone)]
pub(crate) enum Candidate {
    /// Resolved through the namespace as `<name>_decode`.
    Named(String),
    Decoder(ResolvedDecoder),
}

impl Candidate {
    fn is_named(&self, codec: &str) -> bool {
        matches!(self, Self::Named(name) if name == codec)
    }
}

/// Builds the trial order from the caller's selector, or from `extension` and the fallback
/// order when no codec is selected.
pub(crate) fn build_candidates(
    selector: Option<&CodecSelector>,
    extension: Option<&str>,
) -> DispatchResult<Vec<Candidate>> {
    let Some(selector) = selector else {
        return Ok(default_candidates(extension));
    };

    let mut candidates = Vec::new();
    match selector {
        CodecSelector::Name(name) => push_named(&mut candidates, name),
        CodecSelector::Names(names) => {
            for name in names {
                push_named(&mut candidates, name);
            }
        }
        CodecSelector::Decoder(decoder) => candidates.push(Candidate::Decoder(decoder.clone())),
        CodecSelector::Decoders(decoders) => {
            candidates.extend(decoders.iter().cloned().map(Candidate::Decoder));
        }
    }

    if candidates.is_empty() {
        return Err(DispatchError::InvalidSelector("empty codec list".into()));
    }
    Ok(candidates)
}

fn push_named(candidates: &mut Vec<Candidate>, name: &str) {
    let codec = normalize_codec(name);
    if codec == "jpeg" {
        candidates.extend(JPEG_VARIANTS.map(|variant| Candidate::Named(variant.to_owned())));
    } else {
        candidates.push(Candidate::Named(codec));
    }
}

fn default_candidates(extension: Option<&str>) -> Vec<Candidate> {
    let mut candidates = Vec::with_capacity(FALLBACK_ORDER.len() + JPEG_VARIANTS.len());
    if let Some(codec) = extension.and_then(codec_for_extension) {
        push_named(&mut candidates, codec);
    }
    for codec in FALLBACK_ORDER {
        if !candidates.iter().any(|candidate| candidate.is_named(codec)) {
            candidates.push(Candidate::Named(codec.to_owned()));
        }
    }
    candidates
}
