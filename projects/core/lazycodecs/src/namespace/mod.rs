//! The lazily bound codec namespace.
//!
//! A [`Namespace`] answers attribute lookups such as `zstd_decode` or `JPEG`. The first lookup
//! of any attribute binds the owning backend module exactly once. Every attribute of that
//! module (and every alias pointing at one) is then published to a shared cache, so later
//! lookups never bind again and always return the same [`Capability`].
//!
//! Binding failures are remembered. The attributes of a module that failed to bind resolve to
//! stubs (see [`crate::stub`]).

mod builder;
mod cache;

pub use builder::NamespaceBuilder;

use crate::alias::AliasTable;
use crate::catalog::BackendCatalog;
use crate::error::{NamespaceError, NamespaceResult};
use crate::registry::{Owner, Registry};
use crate::stub::{Capability, Stub};
use cache::NamespaceCache;
use lazycodecs_api_common::{
    ArrayBuffer, BindError, BoundModule, CodecError, CodecOptions, CodecResult, DecodeFn,
    EncodeFn, ModuleExports,
};
use std::collections::HashMap;
use std::sync::{Arc, OnceLock, Weak};
use tracing::{debug, trace, warn};

/// Binding state of a module, as reported by [`Namespace::bind_state`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindState {
    /// No attribute of the module has been accessed yet.
    Unbound,
    /// The module bound and exported `exported` of its registry attributes.
    Bound { exported: usize },
    /// The module failed to bind. Its attributes resolve to stubs.
    Failed(BindError),
}

/// Memoized outcome of binding one module.
#[derive(Debug)]
enum Binding {
    Bound { exported: usize },
    Failed(BindError),
}

pub(crate) struct NamespaceInner {
    pub(crate) registry: Registry,
    pub(crate) aliases: AliasTable,
    catalog: BackendCatalog,
    builtins: ModuleExports,
    bindings: HashMap<Owner, OnceLock<Binding>>,
    cache: NamespaceCache,
    pub(crate) versions: OnceLock<Vec<String>>,
}

/// A lazily bound codec namespace. Cloning is cheap and clones share all state.
#[derive(Clone)]
pub struct Namespace {
    inner: Arc<NamespaceInner>,
}

/// Non-owning handle to a [`Namespace`], held by built-in codecs that call back into it.
#[derive(Clone)]
pub(crate) struct WeakNamespace(Weak<NamespaceInner>);

impl WeakNamespace {
    pub(crate) fn upgrade(&self) -> CodecResult<Namespace> {
        self.0
            .upgrade()
            .map(|inner| Namespace { inner })
            .ok_or_else(|| CodecError::other("the namespace has been dropped"))
    }
}

impl Namespace {
    pub(crate) fn from_parts(
        registry: Registry,
        aliases: AliasTable,
        catalog: BackendCatalog,
    ) -> Self {
        let inner = Arc::new_cyclic(|weak| {
            let bindings = registry
                .modules()
                .map(|owner| (owner.clone(), OnceLock::new()))
                .collect();
            NamespaceInner {
                builtins: crate::builtin::exports(WeakNamespace(weak.clone())),
                registry,
                aliases,
                catalog,
                bindings,
                cache: NamespaceCache::default(),
                versions: OnceLock::new(),
            }
        });
        Self { inner }
    }

    /// The process-wide namespace, built from the standard table and the compiled-in backends.
    pub fn global() -> &'static Namespace {
        static GLOBAL: OnceLock<Namespace> = OnceLock::new();
        GLOBAL.get_or_init(|| NamespaceBuilder::new().build())
    }

    pub fn builder() -> NamespaceBuilder {
        NamespaceBuilder::new()
    }

    pub(crate) fn inner(&self) -> &NamespaceInner {
        &self.inner
    }

    /// Resolves an attribute, binding its module on first access.
    ///
    /// Fails only with [`NamespaceError::UnknownAttribute`]. Attributes of unavailable
    /// backends resolve to stubs.
    pub fn get(&self, name: &str) -> NamespaceResult<Arc<Capability>> {
        if let Some(capability) = self.inner.cache.get(name) {
            trace!(name, "namespace cache hit");
            return Ok(capability);
        }

        let unknown = || NamespaceError::UnknownAttribute(name.to_owned());
        let canonical = self.inner.aliases.canonical(name);
        let owner = self
            .inner
            .registry
            .resolve_owner(canonical)
            .ok_or_else(unknown)?;
        self.ensure_bound(owner).ok_or_else(unknown)?;
        self.inner.cache.get(name).ok_or_else(unknown)
    }

    /// Binds `owner` if it is not bound yet and returns the memoized outcome.
    fn ensure_bound(&self, owner: &Owner) -> Option<&Binding> {
        let slot = self.inner.bindings.get(owner)?;
        Some(slot.get_or_init(|| self.bind(owner)))
    }

    fn bind(&self, owner: &Owner) -> Binding {
        let module = match owner {
            Owner::Builtin => {
                let exported = self.publish(owner, Ok(&self.inner.builtins));
                return Binding::Bound { exported };
            }
            Owner::Module(module) => module,
        };

        let bound = match self.inner.catalog.get(module) {
            Some(backend) => backend.bind(),
            None => Err(BindError::NotCompiled(module.clone())),
        };

        match bound {
            Ok(bound) => {
                let exported = self.publish(owner, Ok(bound.as_ref()));
                debug!(module, exported, "bound backend module");
                Binding::Bound { exported }
            }
            Err(error) => {
                match &error {
                    BindError::NotCompiled(_) => debug!(module, %error, "backend unavailable"),
                    _ => warn!(module, %error, "backend failed to bind"),
                }
                self.publish(owner, Err(&error));
                Binding::Failed(error)
            }
        }
    }

    /// Publishes a capability for every attribute of `owner`, plus its aliases.
    ///
    /// Returns how many attributes the bound module actually exported.
    fn publish(&self, owner: &Owner, module: Result<&dyn BoundModule, &BindError>) -> usize {
        let attributes = self.inner.registry.module_attributes(owner);
        let mut entries = Vec::with_capacity(attributes.len());
        let mut exported = 0;

        for name in attributes {
            let capability = match module {
                Ok(bound) => match bound.attribute(name) {
                    Some(attribute) => {
                        exported += 1;
                        Capability::bound(name.clone(), attribute)
                    }
                    None => Capability::unavailable(Stub::new(
                        name.clone(),
                        true,
                        format!("{owner} does not provide it"),
                    )),
                },
                Err(error) => {
                    Capability::unavailable(Stub::new(name.clone(), false, error.to_string()))
                }
            };

            let capability = Arc::new(capability);
            for alias in self.inner.aliases.aliases_of(name) {
                entries.push((alias.to_owned(), capability.clone()));
            }
            entries.push((name.clone(), capability));
        }

        self.inner.cache.publish(entries);
        exported
    }

    /// Binding state of a backend module, without binding it.
    pub fn bind_state(&self, module: &str) -> Option<BindState> {
        let owner = Owner::Module(module.to_owned());
        let slot = self.inner.bindings.get(&owner)?;
        Some(match slot.get() {
            None => BindState::Unbound,
            Some(Binding::Bound { exported }) => BindState::Bound {
                exported: *exported,
            },
            Some(Binding::Failed(error)) => BindState::Failed(error.clone()),
        })
    }

    /// Binds every declared module.
    pub fn load_all(&self) {
        for owner in self.inner.registry.modules() {
            self.ensure_bound(owner);
        }
    }

    /// Every backend module with its binding state, sorted by name.
    pub fn modules(&self) -> Vec<(String, BindState)> {
        self.inner
            .registry
            .modules()
            .filter_map(Owner::module_name)
            .filter_map(|module| Some((module.to_owned(), self.bind_state(module)?)))
            .collect()
    }

    /// Every resolvable name, aliases included, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names = self.inner.registry.primary_names();
        names.extend(self.inner.aliases.names());
        names.sort_unstable();
        names
    }

    /// Names resolved so far, sorted.
    pub fn cached_names(&self) -> Vec<String> {
        self.inner.cache.names()
    }

    pub fn registry(&self) -> &Registry {
        &self.inner.registry
    }

    pub fn aliases(&self) -> &AliasTable {
        &self.inner.aliases
    }

    /// `<codec>_encode` as a callable.
    pub fn encoder(&self, codec: &str) -> NamespaceResult<EncodeFn> {
        self.get(&format!("{codec}_encode"))?.encoder()
    }

    /// `<codec>_decode` as a callable.
    pub fn decoder(&self, codec: &str) -> NamespaceResult<DecodeFn> {
        self.get(&format!("{codec}_decode"))?.decoder()
    }

    pub fn encode(
        &self,
        codec: &str,
        data: &ArrayBuffer,
        options: &CodecOptions,
    ) -> NamespaceResult<Vec<u8>> {
        self.get(&format!("{codec}_encode"))?.encode(data, options)
    }

    pub fn decode(
        &self,
        codec: &str,
        data: &[u8],
        options: &CodecOptions,
    ) -> NamespaceResult<ArrayBuffer> {
        self.get(&format!("{codec}_decode"))?.decode(data, options)
    }

    pub fn check(&self, codec: &str, data: &[u8]) -> NamespaceResult<bool> {
        self.get(&format!("{codec}_check"))?.check(data)
    }

    /// Version string of one codec, e.g. `zstd 1.5.7`, or `zstd n/a` when unavailable.
    pub fn codec_version(&self, codec: &str) -> NamespaceResult<String> {
        self.get(&format!("{codec}_version"))?.version()
    }

    /// Whether the `<CODEC>` availability flag is set.
    pub fn is_available(&self, codec: &str) -> bool {
        self.get(&codec.to_uppercase())
            .is_ok_and(|flag| flag.is_truthy())
    }
}

impl std::fmt::Debug for Namespace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Namespace")
            .field("attributes", &self.inner.registry.len())
            .field("cached", &self.inner.cache.len())
            .field("backends", &self.inner.catalog)
            .finish()
    }
}
