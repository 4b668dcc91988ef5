//! Backend modules compiled into this build.

use lazycodecs_api_common::BackendModule;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Backends available for binding, keyed by module name.
///
/// A registry module with no entry here fails to bind with
/// [`BindError::NotCompiled`](lazycodecs_api_common::BindError::NotCompiled).
#[derive(Clone, Default)]
pub struct BackendCatalog {
    backends: BTreeMap<String, Arc<dyn BackendModule>>,
}

impl BackendCatalog {
    /// A catalog with no backends.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The backends enabled through Cargo features.
    pub fn with_defaults() -> Self {
        #[allow(unused_mut)]
        let mut catalog = Self::empty();
        #[cfg(feature = "zstd")]
        catalog.register(lazycodecs_zstd::ZstdBackend);
        catalog
    }

    /// Adds a backend, replacing any backend of the same name.
    pub fn register(&mut self, backend: impl BackendModule + 'static) {
        self.insert(Arc::new(backend));
    }

    pub fn insert(&mut self, backend: Arc<dyn BackendModule>) {
        self.backends.insert(backend.name().to_owned(), backend);
    }

    pub fn with(mut self, backend: impl BackendModule + 'static) -> Self {
        self.register(backend);
        self
    }

    pub fn get(&self, module: &str) -> Option<&Arc<dyn BackendModule>> {
        self.backends.get(module)
    }

    /// Names of the compiled-in backends, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.backends.keys().map(String::as_str)
    }
}

impl std::fmt::Debug for BackendCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lazycodecs_api_common::{BindError, BoundModule};

    struct Named(&'static str);

    impl BackendModule for Named {
        fn name(&self) -> &str {
            self.0
        }

        fn bind(&self) -> Result<Box<dyn BoundModule>, BindError> {
            Err(BindError::NotCompiled(self.0.into()))
        }
    }

    #[test]
    fn registers_by_module_name() {
        let catalog = BackendCatalog::empty().with(Named("lzf")).with(Named("aec"));
        assert_eq!(catalog.names().collect::<Vec<_>>(), vec!["aec", "lzf"]);
        assert!(catalog.get("lzf").is_some());
        assert!(catalog.get("zstd").is_none());
    }

    #[cfg(feature = "zstd")]
    #[test]
    fn defaults_include_enabled_backends() {
        assert!(BackendCatalog::with_defaults().get("zstd").is_some());
    }
}
