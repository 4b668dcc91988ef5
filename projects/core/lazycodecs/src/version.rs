//! Version summary of the crate and every codec in a namespace.

use crate::namespace::Namespace;
use lazycodecs_api_common::naming::VERSION_SUFFIX;
use std::collections::{BTreeMap, BTreeSet};

/// Version accessors listed first, in this order, ahead of the per-codec ones.
const LEADING: [&str; 4] = [
    "cython_version",
    "numpy_version",
    "numpy_abi_version",
    "imcd_version",
];

/// Accessors left out of the summary entirely.
const EXCLUDED: [&str; 1] = ["none_version"];

/// Shape of [`Namespace::version`]'s result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VersionFormat {
    /// One line, `name-version` entries joined by `", "`.
    #[default]
    Text,
    /// Name to version.
    Map,
    /// `name version` entries in report order.
    List,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionReport {
    Text(String),
    Map(BTreeMap<String, String>),
    List(Vec<String>),
}

impl VersionReport {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&BTreeMap<String, String>> {
        match self {
            Self::Map(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            Self::List(list) => Some(list),
            _ => None,
        }
    }
}

impl Namespace {
    /// Reports the crate version followed by the version of every codec.
    ///
    /// Collecting the report binds every module that declares a version accessor. The entries
    /// are computed once per namespace.
    pub fn version(&self, format: VersionFormat) -> VersionReport {
        let entries = self.inner().versions.get_or_init(|| self.collect_versions());
        match format {
            VersionFormat::Text => VersionReport::Text(
                entries
                    .iter()
                    .map(|entry| entry.replace(' ', "-"))
                    .collect::<Vec<_>>()
                    .join(", "),
            ),
            VersionFormat::Map => VersionReport::Map(
                entries
                    .iter()
                    .map(|entry| match entry.split_once(' ') {
                        Some((name, version)) => (name.to_owned(), version.to_owned()),
                        None => (entry.clone(), String::new()),
                    })
                    .collect(),
            ),
            VersionFormat::List => VersionReport::List(entries.clone()),
        }
    }

    fn collect_versions(&self) -> Vec<String> {
        let mut entries = vec![
            format!("lazycodecs {}", env!("CARGO_PKG_VERSION")),
            format!("lazycodecs-api-common {}", lazycodecs_api_common::VERSION),
        ];
        entries.extend(LEADING.iter().map(|name| self.version_of(name)));

        let codecs: BTreeSet<String> = self
            .registry()
            .primary_names()
            .into_iter()
            .filter(|name| name.ends_with(VERSION_SUFFIX))
            .filter(|name| !LEADING.contains(name) && !EXCLUDED.contains(name))
            .map(|name| self.version_of(name))
            .collect();
        entries.extend(codecs);
        entries
    }

    /// Result of the accessor `name`, or `<codec> n/a` when it cannot be called.
    fn version_of(&self, name: &str) -> String {
        self.get(name)
            .and_then(|capability| capability.version())
            .unwrap_or_else(|_| {
                let codec = name.strip_suffix(VERSION_SUFFIX).unwrap_or(name);
                format!("{codec} n/a")
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_prelude::*;

    fn namespace() -> Namespace {
        namespace_with([magic_codec("png", b"\x89PNG"), magic_codec("tiff", b"II*\0")])
    }

    fn entries(namespace: &Namespace) -> Vec<String> {
        match namespace.version(VersionFormat::List) {
            VersionReport::List(list) => list,
            other => panic!("expected a list, got {other:?}"),
        }
    }

    #[test]
    fn list_starts_with_crate_and_leading_entries() {
        let entries = entries(&namespace());
        assert_eq!(entries[0], format!("lazycodecs {}", env!("CARGO_PKG_VERSION")));
        assert!(entries[1].starts_with("lazycodecs-api-common "));
        assert_eq!(
            &entries[2..6],
            ["cython n/a", "numpy npy-1.0", "numpy_abi n/a", "imcd n/a"]
        );
    }

    #[test]
    fn codec_entries_are_sorted_and_unique() {
        let entries = entries(&namespace());
        let codecs = &entries[6..];

        let mut sorted = codecs.to_vec();
        sorted.sort();
        sorted.dedup();
        assert_eq!(codecs, sorted.as_slice());

        assert!(codecs.contains(&"png 1.0".to_owned()));
        assert!(codecs.contains(&"tiff 1.0".to_owned()));
        assert!(codecs.contains(&"webp n/a".to_owned()));
        assert!(!codecs.iter().any(|entry| entry.starts_with("none ")));
        assert!(!codecs.iter().any(|entry| entry.starts_with("numpy ")));
    }

    #[test]
    fn text_joins_hyphenated_entries() {
        let report = namespace().version(VersionFormat::Text);
        let text = report.as_text().unwrap();

        assert!(text.starts_with("lazycodecs-"));
        assert!(text.contains(", png-1.0, "));
        assert!(text.split(", ").all(|entry| !entry.contains(' ')));
    }

    #[test]
    fn map_splits_on_first_space() {
        let report = namespace().version(VersionFormat::Map);
        let map = report.as_map().unwrap();

        assert_eq!(map["png"], "1.0");
        assert_eq!(map["avif"], "n/a");
        assert_eq!(map["numpy"], "npy-1.0");
    }

    #[test]
    fn entries_are_computed_once() {
        let namespace = namespace();
        let first = entries(&namespace);
        assert!(namespace.inner().versions.get().is_some());
        assert_eq!(entries(&namespace), first);
    }
}
