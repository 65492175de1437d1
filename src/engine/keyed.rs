//! Keyed record list.
//!
//! [`KeyedRecords`] pairs a [`LinkedList`] with a key index. Every mutation
//! goes through this type, so the list and the index always agree: a key is
//! indexed exactly when its record is linked.

use std::collections::HashMap;
use std::hash::Hash;

use super::linked_list::{LinkId, LinkedList};

/// A key was inserted twice.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("duplicate key")]
pub struct DuplicateKey;

/// Ordered records addressed by key.
pub struct KeyedRecords<K, V> {
    list: LinkedList<(K, V)>,
    index: HashMap<K, LinkId>,
}

impl<K: Eq + Hash + Clone, V> Default for KeyedRecords<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Eq + Hash + Clone, V> KeyedRecords<K, V> {
    pub fn new() -> Self {
        Self {
            list: LinkedList::new(),
            index: HashMap::new(),
        }
    }

    pub fn id(&self, key: &K) -> Option<LinkId> {
        self.index.get(key).copied()
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        let id = self.id(key)?;
        self.list.get(id).map(|(_, value)| value)
    }

    pub fn head(&self) -> Option<LinkId> {
        self.list.head()
    }

    pub fn next(&self, id: LinkId) -> Option<LinkId> {
        self.list.next(id)
    }

    pub fn key(&self, id: LinkId) -> Option<&K> {
        self.list.get(id).map(|(key, _)| key)
    }

    pub fn value(&self, id: LinkId) -> Option<&V> {
        self.list.get(id).map(|(_, value)| value)
    }

    /// Insert a new record before `before` (or at the tail).
    pub fn insert_before(
        &mut self,
        key: K,
        value: V,
        before: Option<LinkId>,
    ) -> Result<LinkId, DuplicateKey> {
        if self.index.contains_key(&key) {
            return Err(DuplicateKey);
        }
        let id = self.list.alloc((key.clone(), value));
        self.list.insert_before(id, before);
        self.index.insert(key, id);
        self.check();
        Ok(id)
    }

    /// Move the record for `key` before `before` (or to the tail).
    pub fn move_before(&mut self, key: &K, before: Option<LinkId>) -> bool {
        let Some(id) = self.id(key) else {
            return false;
        };
        self.list.insert_before(id, before);
        true
    }

    /// Remove the record for `key`, returning its value.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        let id = self.index.remove(key)?;
        let removed = self.list.remove(id).map(|(_, value)| value);
        self.check();
        removed
    }

    pub fn len(&self) -> usize {
        self.list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    /// Records in list order.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.list.iter().map(|(_, (key, value))| (key, value))
    }

    fn check(&self) {
        debug_assert_eq!(
            self.index.len(),
            self.list.len(),
            "key index and record list out of step"
        );
    }
}
