//! Backend module traits and export builders.

use crate::attribute::{Attribute, CheckFn, DecodeFn, EncodeFn, ErrorKind, VersionFn};
use crate::error::{BindError, CodecResult};
use crate::naming::standard_attribute_names;
use crate::{ArrayBuffer, CodecOptions, OptionValue};
use alloc::boxed::Box;
use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;

/// A loadable unit providing the attributes of one or more codecs.
///
/// Binding is expensive and may fail. The core binds each module at most once, on first
/// access to any attribute it owns, and remembers failures.
pub trait BackendModule: Send + Sync {
    /// Module name as declared in the registry table, e.g. `zstd` or `imcd`.
    fn name(&self) -> &str;

    /// Loads the backend and returns its exported attributes.
    fn bind(&self) -> Result<Box<dyn BoundModule>, BindError>;
}

/// A successfully bound backend module.
pub trait BoundModule: Send + Sync {
    /// Looks up an attribute by name. Names the module does not export return [`None`].
    fn attribute(&self, name: &str) -> Option<Attribute>;
}

/// Blanket implementation of [`BackendModule`] for any boxed variant of it.
impl<T: BackendModule + ?Sized> BackendModule for Box<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn bind(&self) -> Result<Box<dyn BoundModule>, BindError> {
        (**self).bind()
    }
}

/// Blanket implementation of [`BackendModule`] for any shared variant of it.
impl<T: BackendModule + ?Sized> BackendModule for Arc<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn bind(&self) -> Result<Box<dyn BoundModule>, BindError> {
        (**self).bind()
    }
}

/// The standard attributes of one codec.
///
/// The `<C>Error` kind and the `<C>` flag are always exported. The four callables are exported
/// only when set, so a backend that can only decode leaves `<c>_encode` to resolve as a stub.
#[derive(Clone)]
pub struct CodecBundle {
    codec: String,
    encode: Option<EncodeFn>,
    decode: Option<DecodeFn>,
    check: Option<CheckFn>,
    version: Option<VersionFn>,
}

impl CodecBundle {
    pub fn new(codec: impl Into<String>) -> Self {
        Self {
            codec: codec.into(),
            encode: None,
            decode: None,
            check: None,
            version: None,
        }
    }

    pub fn encode<F>(mut self, f: F) -> Self
    where
        F: Fn(&ArrayBuffer, &CodecOptions) -> CodecResult<Vec<u8>> + Send + Sync + 'static,
    {
        self.encode = Some(Arc::new(f));
        self
    }

    pub fn decode<F>(mut self, f: F) -> Self
    where
        F: Fn(&[u8], &CodecOptions) -> CodecResult<ArrayBuffer> + Send + Sync + 'static,
    {
        self.decode = Some(Arc::new(f));
        self
    }

    pub fn check<F>(mut self, f: F) -> Self
    where
        F: Fn(&[u8]) -> bool + Send + Sync + 'static,
    {
        self.check = Some(Arc::new(f));
        self
    }

    pub fn version<F>(mut self, f: F) -> Self
    where
        F: Fn() -> String + Send + Sync + 'static,
    {
        self.version = Some(Arc::new(f));
        self
    }

    pub fn codec(&self) -> &str {
        &self.codec
    }

    /// Expands the bundle into `(name, attribute)` pairs using the standard naming rule.
    pub fn into_attributes(self) -> Vec<(String, Attribute)> {
        let [encode, decode, check, version, error, flag] = standard_attribute_names(&self.codec);
        let mut attributes = Vec::with_capacity(6);
        if let Some(f) = self.encode {
            attributes.push((encode, Attribute::Encode(f)));
        }
        if let Some(f) = self.decode {
            attributes.push((decode, Attribute::Decode(f)));
        }
        if let Some(f) = self.check {
            attributes.push((check, Attribute::Check(f)));
        }
        if let Some(f) = self.version {
            attributes.push((version, Attribute::Version(f)));
        }
        let kind = ErrorKind::new(error.clone());
        attributes.push((error, Attribute::ErrorKind(kind)));
        attributes.push((flag, Attribute::Flag(true)));
        attributes
    }
}

/// The attributes of a bound module, keyed by name.
///
/// This is the [`BoundModule`] most backends return.
#[derive(Clone, Default)]
pub struct ModuleExports {
    attributes: BTreeMap<String, Attribute>,
}

impl ModuleExports {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds every standard attribute the bundle provides.
    pub fn codec(mut self, bundle: CodecBundle) -> Self {
        self.attributes.extend(bundle.into_attributes());
        self
    }

    /// Adds a module-level function such as `deflate_crc32`.
    pub fn utility<F>(self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&[u8], &CodecOptions) -> CodecResult<OptionValue> + Send + Sync + 'static,
    {
        self.export(name, Attribute::utility(f))
    }

    /// Adds an arbitrary attribute, replacing any previous value of the same name.
    pub fn export(mut self, name: impl Into<String>, attribute: Attribute) -> Self {
        self.attributes.insert(name.into(), attribute);
        self
    }

    /// Names of all exported attributes, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.attributes.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }
}

impl From<CodecBundle> for ModuleExports {
    fn from(bundle: CodecBundle) -> Self {
        Self::new().codec(bundle)
    }
}

impl BoundModule for ModuleExports {
    fn attribute(&self, name: &str) -> Option<Attribute> {
        self.attributes.get(name).cloned()
    }
}
