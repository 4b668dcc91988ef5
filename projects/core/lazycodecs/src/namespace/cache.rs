//! The resolved-attribute cache.

use crate::stub::Capability;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// Resolved capabilities keyed by public name, aliases included.
///
/// Entries are only ever added. Once a name is published, every later lookup returns the
/// same `Arc`.
#[derive(Debug, Default)]
pub(crate) struct NamespaceCache {
    entries: RwLock<HashMap<String, Arc<Capability>>>,
}

impl NamespaceCache {
    pub(crate) fn get(&self, name: &str) -> Option<Arc<Capability>> {
        self.entries.read().get(name).cloned()
    }

    /// Publishes a batch of entries. Names already present keep their existing value.
    pub(crate) fn publish(&self, entries: impl IntoIterator<Item = (String, Arc<Capability>)>) {
        let mut map = self.entries.write();
        for (name, capability) in entries {
            map.entry(name).or_insert(capability);
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Cached names, sorted.
    pub(crate) fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.entries.read().keys().cloned().collect();
        names.sort_unstable();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lazycodecs_api_common::Attribute;

    #[test]
    fn first_publication_wins() {
        let cache = NamespaceCache::default();
        let first = Arc::new(Capability::bound("FLAG", Attribute::Flag(true)));
        let second = Arc::new(Capability::bound("FLAG", Attribute::Flag(false)));

        cache.publish([("FLAG".to_owned(), first.clone())]);
        cache.publish([("FLAG".to_owned(), second)]);

        assert!(Arc::ptr_eq(&cache.get("FLAG").unwrap(), &first));
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.names(), vec!["FLAG".to_owned()]);
    }
}
