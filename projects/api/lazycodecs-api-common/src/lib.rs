#![doc = include_str!(concat!("../", core::env!("CARGO_PKG_README")))]
#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

/// Decoded array buffers and their element types.
pub mod array;

/// Callable attributes exported by codec backends.
pub mod attribute;

/// Backend module traits and export builders.
pub mod backend;

/// Error types shared by codec callables and backends.
pub mod error;

/// Naming conventions for per-codec attributes.
pub mod naming;

/// Keyword-style options forwarded to codec callables.
pub mod options;

/// Version of this crate, reported by the core's version summary.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use array::{ArrayBuffer, ArrayError, ElementType};
pub use attribute::{
    Attribute, CheckFn, DecodeFn, EncodeFn, ErrorKind, UtilityFn, VersionFn,
};
pub use backend::{BackendModule, BoundModule, CodecBundle, ModuleExports};
pub use error::{BindError, CodecError, CodecResult, DecodeFailure};
pub use naming::{capitalize, standard_attribute_names};
pub use options::{CodecOptions, OptionValue};
