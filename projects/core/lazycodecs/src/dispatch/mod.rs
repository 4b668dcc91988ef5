//! Format dispatch: generic read over candidate decoders and generic write.
//!
//! Both directions work on a [`Namespace`](crate::Namespace), resolving codecs by name through
//! it, so unavailable backends are skipped (read) or reported (write) without binding anything
//! up front.

mod candidates;
mod extensions;
mod read;
mod source;
mod write;

pub use candidates::{CodecSelector, ResolvedDecoder, FALLBACK_ORDER};
pub use extensions::{codec_for_extension, list_extensions};
pub use read::ReadOptions;
pub use source::{Destination, ReadSeek, Source};
pub use write::WriteCodec;
