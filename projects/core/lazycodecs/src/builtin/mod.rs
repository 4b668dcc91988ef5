//! Codecs implemented by this crate: `none`, `numpy` and the generic `jpeg` codec.
//!
//! They are owned by [`Owner::Builtin`](crate::registry::Owner::Builtin) and can never fail to
//! bind.

mod jpeg;
mod none;
pub mod numpy;

use crate::namespace::WeakNamespace;
use lazycodecs_api_common::ModuleExports;

/// The built-in module's exports. `jpeg` resolves its variants through `namespace`.
pub(crate) fn exports(namespace: WeakNamespace) -> ModuleExports {
    ModuleExports::new()
        .codec(none::bundle())
        .codec(numpy::bundle())
        .codec(jpeg::bundle(namespace))
}
