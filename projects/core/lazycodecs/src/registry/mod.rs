//! Maps every public attribute name to the module that provides it.
//!
//! The registry is built once from a [`DeclarativeTable`] and is read-only afterwards. Names
//! that are compatibility aliases are kept out of it entirely; they are resolved through the
//! [`AliasTable`](crate::alias::AliasTable) before the registry is consulted.

mod table;

pub use table::{DeclarativeTable, Entry, ModuleDecl};

use crate::alias::AliasTable;
use crate::error::RegistryError;
use lazycodecs_api_common::standard_attribute_names;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use tracing::debug;

/// The module that provides an attribute.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Owner {
    /// Provided by this crate and always available.
    Builtin,
    /// Provided by the named backend module, bound on demand.
    Module(String),
}

impl Owner {
    /// Name of the backend module, or [`None`] for built-ins.
    pub fn module_name(&self) -> Option<&str> {
        match self {
            Self::Builtin => None,
            Self::Module(name) => Some(name),
        }
    }
}

impl fmt::Display for Owner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Builtin => f.write_str("builtins"),
            Self::Module(name) => write!(f, "module '{name}'"),
        }
    }
}

/// Attribute-to-module ownership table.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    owners: HashMap<String, Owner>,
    modules: BTreeMap<Owner, Vec<String>>,
    codecs: BTreeMap<String, Owner>,
}

impl Registry {
    /// Builds the registry, returning it together with every inconsistency found.
    ///
    /// When two modules declare the same attribute, the first declaration wins.
    pub fn build(table: &DeclarativeTable, aliases: &AliasTable) -> (Self, Vec<RegistryError>) {
        let mut registry = Self::default();
        let mut issues = Vec::new();

        for decl in table.modules() {
            let owner = decl.owner().clone();
            let (attributes, codecs) = decl.expand();
            registry.modules.entry(owner.clone()).or_default();

            let names = attributes.into_iter().map(str::to_owned).chain(
                codecs
                    .iter()
                    .flat_map(|codec| standard_attribute_names(codec)),
            );
            for name in names {
                if aliases.is_alias(&name) {
                    debug!(%name, %owner, "skipping attribute shadowed by a compatibility alias");
                    continue;
                }
                if let Err(issue) = registry.insert(name, &owner) {
                    issues.push(issue);
                }
            }

            for codec in codecs {
                registry
                    .codecs
                    .entry(codec.to_owned())
                    .or_insert_with(|| owner.clone());
            }
        }

        (registry, issues)
    }

    fn insert(&mut self, name: String, owner: &Owner) -> Result<(), RegistryError> {
        if let Some(first) = self.owners.get(&name) {
            return Err(RegistryError::DuplicateAttribute {
                name,
                first: first.clone(),
                second: owner.clone(),
            });
        }

        self.owners.insert(name.clone(), owner.clone());
        self.modules.entry(owner.clone()).or_default().push(name);
        Ok(())
    }

    /// Module that owns `name`. Aliases are not resolved here.
    pub fn resolve_owner(&self, name: &str) -> Option<&Owner> {
        self.owners.get(name)
    }

    /// Module that provides `codec`, e.g. `imcd` for `delta`.
    pub fn codec_owner(&self, codec: &str) -> Option<&Owner> {
        self.codecs.get(codec)
    }

    /// Attributes owned by `owner`, in declaration order.
    pub fn module_attributes(&self, owner: &Owner) -> &[String] {
        self.modules.get(owner).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.owners.contains_key(name)
    }

    /// All attribute names, sorted.
    pub fn primary_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.owners.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// All declared modules, built-ins first.
    pub fn modules(&self) -> impl Iterator<Item = &Owner> {
        self.modules.keys()
    }

    /// All codecs with their owning module, sorted by codec name.
    pub fn codecs(&self) -> impl Iterator<Item = (&str, &Owner)> {
        self.codecs.iter().map(|(codec, owner)| (codec.as_str(), owner))
    }

    pub fn len(&self) -> usize {
        self.owners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.owners.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn standard() -> Registry {
        let (registry, issues) = Registry::build(&DeclarativeTable::standard(), &AliasTable::standard());
        assert!(issues.is_empty(), "{issues:?}");
        registry
    }

    #[rstest]
    #[case("zstd_decode", Owner::Module("zstd".into()))]
    #[case("ZstdError", Owner::Module("zstd".into()))]
    #[case("ZSTD", Owner::Module("zstd".into()))]
    #[case("delta_encode", Owner::Module("imcd".into()))]
    #[case("imcd_version", Owner::Module("imcd".into()))]
    #[case("gzip_decode", Owner::Module("deflate".into()))]
    #[case("deflate_crc32", Owner::Module("deflate".into()))]
    #[case("numpy_decode", Owner::Builtin)]
    #[case("jpeg_decode", Owner::Builtin)]
    #[case("JpegError", Owner::Builtin)]
    fn resolves_owners(#[case] name: &str, #[case] owner: Owner) {
        assert_eq!(standard().resolve_owner(name), Some(&owner));
    }

    #[rstest]
    #[case("JPEG")]
    #[case("jpeg_check")]
    #[case("jpeg_version")]
    #[case("j2k_decode")]
    #[case("not_a_thing")]
    fn aliases_and_unknown_names_have_no_owner(#[case] name: &str) {
        assert_eq!(standard().resolve_owner(name), None);
    }

    #[test]
    fn imcd_module_itself_is_not_a_codec() {
        let registry = standard();
        assert_eq!(registry.codec_owner("imcd"), None);
        assert!(!registry.contains("imcd_decode"));
        assert_eq!(registry.codec_owner("xor"), Some(&Owner::Module("imcd".into())));
    }

    #[test]
    fn module_attributes_keep_declaration_order() {
        let registry = standard();
        assert_eq!(
            registry.module_attributes(&Owner::Module("zlib".into())),
            [
                "zlib_crc32",
                "zlib_adler32",
                "zlib_encode",
                "zlib_decode",
                "zlib_check",
                "zlib_version",
                "ZlibError",
                "ZLIB",
            ]
        );
        assert!(registry
            .module_attributes(&Owner::Module("missing".into()))
            .is_empty());
    }

    #[test]
    fn duplicate_attributes_are_reported_and_first_wins() {
        let table = DeclarativeTable::new()
            .with(ModuleDecl::module("first").attribute("shared_crc32"))
            .with(ModuleDecl::module("second").attribute("shared_crc32"));

        let (registry, issues) = Registry::build(&table, &AliasTable::new());
        assert_eq!(
            issues,
            vec![RegistryError::DuplicateAttribute {
                name: "shared_crc32".into(),
                first: Owner::Module("first".into()),
                second: Owner::Module("second".into()),
            }]
        );
        assert_eq!(
            registry.resolve_owner("shared_crc32"),
            Some(&Owner::Module("first".into()))
        );
    }

    #[test]
    fn builtins_sort_first() {
        assert_eq!(standard().modules().next(), Some(&Owner::Builtin));
    }
}
