#![doc = include_str!(concat!("../", core::env!("CARGO_PKG_README")))]

/// Compatibility aliases for renamed attributes.
pub mod alias;

/// Codecs implemented inside this crate.
pub mod builtin;

/// Backend modules compiled into the crate.
pub mod catalog;

/// Generic read and write over the namespace's codecs.
pub mod dispatch;

pub mod error;

/// The lazily bound attribute namespace.
pub mod namespace;

/// Declarative table of modules and the attributes they own.
pub mod registry;

/// Placeholders for attributes whose backend is unavailable.
pub mod stub;

pub mod version;

pub use alias::AliasTable;
pub use catalog::BackendCatalog;
pub use dispatch::{
    codec_for_extension, list_extensions, CodecSelector, Destination, ReadOptions, ReadSeek,
    ResolvedDecoder, Source, WriteCodec,
};
pub use error::{
    DispatchError, DispatchResult, IoError, NamespaceError, NamespaceResult, RegistryError,
};
pub use namespace::{BindState, Namespace, NamespaceBuilder};
pub use registry::{DeclarativeTable, Entry, ModuleDecl, Owner, Registry};
pub use stub::{Capability, CapabilityKind, CapabilityState, Stub};
pub use version::{VersionFormat, VersionReport};

pub use lazycodecs_api_common::{
    ArrayBuffer, CodecError, CodecOptions, CodecResult, DecodeFailure, ElementType, OptionValue,
};

/// Decodes `source` through the [global namespace](Namespace::global).
///
/// See [`Namespace::read`].
pub fn read<'a>(source: impl Into<Source<'a>>, options: &ReadOptions) -> DispatchResult<ArrayBuffer> {
    Namespace::global().read(source, options)
}

/// Like [`read`], also returning the decoder that succeeded.
pub fn read_with_codec<'a>(
    source: impl Into<Source<'a>>,
    options: &ReadOptions,
) -> DispatchResult<(ArrayBuffer, ResolvedDecoder)> {
    Namespace::global().read_with_codec(source, options)
}

/// Encodes `data` and writes it to `destination` through the [global namespace](Namespace::global).
///
/// See [`Namespace::write`].
pub fn write<'a>(
    destination: impl Into<Destination<'a>>,
    data: &ArrayBuffer,
    codec: Option<WriteCodec>,
    options: &CodecOptions,
) -> DispatchResult<()> {
    Namespace::global().write(destination, data, codec, options)
}

/// Version summary of the [global namespace](Namespace::global).
pub fn version(format: VersionFormat) -> VersionReport {
    Namespace::global().version(format)
}

/// Common test prelude for avoiding duplicate imports in test modules
#[cfg(test)]
pub(crate) mod test_prelude;
