//! Compatibility aliases: old public names that now refer to another attribute.

use crate::error::RegistryError;
use crate::registry::Registry;
use std::collections::BTreeMap;
use tracing::warn;

/// Old names kept working for callers of earlier releases.
const STANDARD_ALIASES: &[(&str, &str)] = &[
    ("JPEG", "JPEG8"),
    ("jpeg_check", "jpeg8_check"),
    ("jpeg_version", "jpeg8_version"),
    ("zopfli_check", "zlib_check"),
    ("zopfli_decode", "zlib_decode"),
    ("j2k_encode", "jpeg2k_encode"),
    ("j2k_decode", "jpeg2k_decode"),
    ("jxr_encode", "jpegxr_encode"),
    ("jxr_decode", "jpegxr_decode"),
];

/// Maps alias names to the attribute they stand for.
///
/// Aliases are one level deep: a target is always a primary registry name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AliasTable {
    targets: BTreeMap<String, String>,
}

impl AliasTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// The aliases this crate has always shipped.
    pub fn standard() -> Self {
        let mut table = Self::new();
        for (alias, target) in STANDARD_ALIASES {
            table.insert(*alias, *target);
        }
        table
    }

    pub fn insert(&mut self, alias: impl Into<String>, target: impl Into<String>) {
        self.targets.insert(alias.into(), target.into());
    }

    pub fn with(mut self, alias: impl Into<String>, target: impl Into<String>) -> Self {
        self.insert(alias, target);
        self
    }

    /// Resolves `name` to its target, or returns it unchanged when it is not an alias.
    pub fn canonical<'a>(&'a self, name: &'a str) -> &'a str {
        self.targets.get(name).map_or(name, String::as_str)
    }

    pub fn is_alias(&self, name: &str) -> bool {
        self.targets.contains_key(name)
    }

    /// All aliases that resolve to `target`.
    pub fn aliases_of<'a>(&'a self, target: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.targets
            .iter()
            .filter(move |(_, to)| to.as_str() == target)
            .map(|(alias, _)| alias.as_str())
    }

    /// All alias names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.targets.keys().map(String::as_str)
    }

    /// Drops aliases whose target the registry does not know or that point at another alias,
    /// returning one error per drop.
    pub(crate) fn retain_known(&mut self, registry: &Registry) -> Vec<RegistryError> {
        let alias_names: Vec<String> = self.targets.keys().cloned().collect();
        let mut issues = Vec::new();
        self.targets.retain(|alias, target| {
            let known = registry.contains(target) && !alias_names.contains(target);
            if !known {
                warn!(%alias, %target, "dropping alias to unknown attribute");
                issues.push(RegistryError::UnknownAliasTarget {
                    alias: alias.clone(),
                    target: target.clone(),
                });
            }
            known
        });
        issues
    }
}
