//! Configuration of a [`Namespace`].

use super::Namespace;
use crate::alias::AliasTable;
use crate::catalog::BackendCatalog;
use crate::error::RegistryError;
use crate::registry::{DeclarativeTable, ModuleDecl, Registry};
use lazycodecs_api_common::BackendModule;
use tracing::warn;

/// Builds a [`Namespace`] from a module table, an alias table and a backend catalog.
///
/// [`NamespaceBuilder::new`] starts from the standard table, the standard aliases and the
/// backends enabled through Cargo features. Further modules, aliases and backends can be
/// added on top.
///
/// ```
/// use lazycodecs::NamespaceBuilder;
///
/// let namespace = NamespaceBuilder::new().build();
/// assert!(namespace.is_available("numpy"));
/// assert_eq!(namespace.codec_version("avif").unwrap(), "avif n/a");
/// ```
#[derive(Debug, Clone)]
pub struct NamespaceBuilder {
    table: DeclarativeTable,
    aliases: AliasTable,
    catalog: BackendCatalog,
}

impl Default for NamespaceBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl NamespaceBuilder {
    pub fn new() -> Self {
        Self {
            table: DeclarativeTable::standard(),
            aliases: AliasTable::standard(),
            catalog: BackendCatalog::with_defaults(),
        }
    }

    /// No modules, aliases or backends at all.
    pub fn empty() -> Self {
        Self {
            table: DeclarativeTable::new(),
            aliases: AliasTable::new(),
            catalog: BackendCatalog::empty(),
        }
    }

    /// Declares an additional module.
    pub fn module(mut self, decl: ModuleDecl) -> Self {
        self.table.push(decl);
        self
    }

    /// Replaces the module table.
    pub fn table(mut self, table: DeclarativeTable) -> Self {
        self.table = table;
        self
    }

    /// Adds a compatibility alias.
    pub fn alias(mut self, alias: impl Into<String>, target: impl Into<String>) -> Self {
        self.aliases.insert(alias, target);
        self
    }

    /// Makes a backend available for binding, replacing any backend of the same name.
    pub fn backend(mut self, backend: impl BackendModule + 'static) -> Self {
        self.catalog.register(backend);
        self
    }

    /// Replaces the backend catalog.
    pub fn catalog(mut self, catalog: BackendCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    /// Builds the namespace, logging and skipping any inconsistency in the tables.
    ///
    /// For duplicate attributes the first declaration wins. Aliases to unknown names are
    /// dropped.
    pub fn build(self) -> Namespace {
        let (namespace, issues) = self.assemble();
        for issue in issues {
            warn!(%issue, "inconsistent codec table");
        }
        namespace
    }

    /// Builds the namespace, failing on the first inconsistency in the tables.
    pub fn try_build(self) -> Result<Namespace, RegistryError> {
        let (namespace, mut issues) = self.assemble();
        match issues.is_empty() {
            true => Ok(namespace),
            false => Err(issues.swap_remove(0)),
        }
    }

    fn assemble(self) -> (Namespace, Vec<RegistryError>) {
        let Self {
            table,
            mut aliases,
            catalog,
        } = self;

        // validate aliases against every declared name first, so that a dropped alias
        // does not take a real attribute with it
        let (declared, _) = Registry::build(&table, &AliasTable::new());
        let mut issues = aliases.retain_known(&declared);
        let (registry, registry_issues) = Registry::build(&table, &aliases);
        issues.extend(registry_issues);
        (Namespace::from_parts(registry, aliases, catalog), issues)
    }
}
