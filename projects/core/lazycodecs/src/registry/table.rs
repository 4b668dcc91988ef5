//! The declarative module table.
//!
//! Each [`ModuleDecl`] lists the attributes one backend module owns. Plain entries are taken
//! verbatim. The first [`Entry::Group`] of a module is expanded into the standard attribute set
//! of every codec it names, and those codecs are recorded as owned by the module. A module
//! without a group owns a single codec named after itself.

use super::Owner;
use std::borrow::Cow;

/// One entry in a module declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    /// A single attribute owned verbatim, e.g. `deflate_crc32`.
    Attribute(Cow<'static, str>),
    /// A group of codec names, each expanded into the standard attribute set.
    Group(Vec<Cow<'static, str>>),
}

/// Declaration of one module and the attributes it owns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleDecl {
    pub(crate) owner: Owner,
    pub(crate) entries: Vec<Entry>,
}

impl ModuleDecl {
    /// Declares a backend module.
    pub fn module(name: impl Into<String>) -> Self {
        Self {
            owner: Owner::Module(name.into()),
            entries: Vec::new(),
        }
    }

    /// Declares the built-in pseudo-module.
    pub fn builtin() -> Self {
        Self {
            owner: Owner::Builtin,
            entries: Vec::new(),
        }
    }

    /// Adds an attribute owned verbatim.
    pub fn attribute(mut self, name: impl Into<Cow<'static, str>>) -> Self {
        self.entries.push(Entry::Attribute(name.into()));
        self
    }

    /// Adds a codec group.
    pub fn group<I, S>(mut self, codecs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Cow<'static, str>>,
    {
        self.entries
            .push(Entry::Group(codecs.into_iter().map(Into::into).collect()));
        self
    }

    pub fn owner(&self) -> &Owner {
        &self.owner
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// Splits the declaration into plain attributes and the codecs of its first group.
    ///
    /// Groups after the first are ignored.
    pub(crate) fn expand(&self) -> (Vec<&str>, Vec<&str>) {
        let mut attributes = Vec::new();
        let mut group = None;
        for entry in &self.entries {
            match entry {
                Entry::Attribute(name) => attributes.push(&**name),
                Entry::Group(codecs) if group.is_none() => {
                    group = Some(codecs.iter().map(|codec| &**codec).collect::<Vec<&str>>());
                }
                Entry::Group(_) => {}
            }
        }

        let codecs = match (group, &self.owner) {
            (Some(codecs), _) => codecs,
            (None, Owner::Module(name)) => vec![name.as_str()],
            (None, Owner::Builtin) => Vec::new(),
        };
        (attributes, codecs)
    }
}

/// Ordered list of module declarations the registry is built from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeclarativeTable {
    modules: Vec<ModuleDecl>,
}

impl DeclarativeTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, decl: ModuleDecl) {
        self.modules.push(decl);
    }

    pub fn with(mut self, decl: ModuleDecl) -> Self {
        self.push(decl);
        self
    }

    pub fn modules(&self) -> &[ModuleDecl] {
        &self.modules
    }

    /// The table of every module this crate knows about.
    pub fn standard() -> Self {
        let mut table = Self::new();
        for (module, attributes, group) in STANDARD_MODULES {
            let mut decl = match module {
                Some(name) => ModuleDecl::module(*name),
                None => ModuleDecl::builtin(),
            };
            for attribute in *attributes {
                decl = decl.attribute(*attribute);
            }
            if let Some(codecs) = group {
                decl = decl.group(codecs.iter().copied());
            }
            table.push(decl);
        }
        table
    }
}

type StaticDecl = (
    Option<&'static str>,
    &'static [&'static str],
    Option<&'static [&'static str]>,
);

/// Module name, extra attributes, codec group. `None` is the built-in pseudo-module.
const STANDARD_MODULES: &[StaticDecl] = &[
    (None, &[], Some(&["none", "numpy", "jpeg"])),
    (
        Some("imcd"),
        &["imcd_version", "numpy_abi_version", "cython_version"],
        Some(&[
            "bitorder",
            "byteshuffle",
            "delta",
            "float24",
            "floatpred",
            "lzw",
            "packbits",
            "packints",
            "xor",
        ]),
    ),
    (Some("aec"), &[], None),
    (Some("apng"), &[], None),
    (Some("avif"), &[], None),
    (Some("bitshuffle"), &[], None),
    (Some("blosc"), &[], None),
    (Some("blosc2"), &[], None),
    (Some("brotli"), &[], None),
    (Some("brunsli"), &[], None),
    (Some("bz2"), &[], None),
    (Some("cms"), &["cms_transform", "cms_profile"], None),
    (
        Some("deflate"),
        &["deflate_crc32", "deflate_adler32"],
        Some(&["deflate", "gzip"]),
    ),
    (Some("gif"), &[], None),
    (Some("heif"), &[], None),
    (Some("jetraw"), &["jetraw_init"], None),
    (Some("jpeg2k"), &[], None),
    (Some("jpeg8"), &[], None),
    (Some("jpeg12"), &[], None),
    (Some("jpegls"), &[], None),
    (Some("jpegsof3"), &[], None),
    (Some("jpegxl"), &[], None),
    (Some("jpegxr"), &[], None),
    (Some("lerc"), &[], None),
    (Some("ljpeg"), &[], None),
    (Some("lz4"), &[], None),
    (Some("lz4f"), &[], None),
    (Some("lzf"), &[], None),
    (Some("lzma"), &[], None),
    (Some("mozjpeg"), &[], None),
    (Some("pglz"), &[], None),
    (Some("qoi"), &[], None),
    (Some("png"), &[], None),
    (Some("rgbe"), &[], None),
    (Some("rcomp"), &[], None),
    (Some("snappy"), &[], None),
    (Some("spng"), &[], None),
    (Some("tiff"), &[], None),
    (Some("webp"), &[], None),
    (Some("zfp"), &[], None),
    (Some("zlib"), &["zlib_crc32", "zlib_adler32"], None),
    (Some("zlibng"), &["zlibng_crc32", "zlibng_adler32"], None),
    (Some("zopfli"), &[], None),
    (Some("zstd"), &[], None),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_the_first_group_is_expanded() {
        let decl = ModuleDecl::module("multi")
            .group(["alpha", "beta"])
            .attribute("multi_extra")
            .group(["gamma"]);

        let (attributes, codecs) = decl.expand();
        assert_eq!(attributes, vec!["multi_extra"]);
        assert_eq!(codecs, vec!["alpha", "beta"]);
    }

    #[test]
    fn module_without_group_is_its_own_codec() {
        let decl = ModuleDecl::module("zlib").attribute("zlib_crc32");
        let (attributes, codecs) = decl.expand();
        assert_eq!(attributes, vec!["zlib_crc32"]);
        assert_eq!(codecs, vec!["zlib"]);
    }

    #[test]
    fn builtin_without_group_owns_no_codec() {
        let decl = ModuleDecl::builtin().attribute("helper");
        let (_, codecs) = decl.expand();
        assert!(codecs.is_empty());
    }

    #[test]
    fn standard_table_starts_with_builtins() {
        let table = DeclarativeTable::standard();
        assert_eq!(table.modules()[0].owner(), &Owner::Builtin);
        assert!(table
            .modules()
            .iter()
            .any(|decl| decl.owner() == &Owner::Module("zstd".into())));
    }
}
