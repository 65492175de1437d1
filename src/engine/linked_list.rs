//! Arena-backed doubly linked list.
//!
//! Records are allocated into a [`SlotMap`] and addressed by generational
//! [`LinkId`] handles, so a stale handle never aliases a newer record.
//! Callers keep the handles (usually in a side index) and every operation
//! is O(1):
//!
//! ```text
//!   head                                tail
//!    │                                   │
//!    ▼                                   ▼
//!  [ a ] ⇄ [ b ] ⇄ [ c ] ⇄ ... ⇄ [ z ]
//! ```
//!
//! The list offers no search. Allocation and linking are separate steps: a
//! record can exist unlinked (just allocated, or taken out with
//! [`LinkedList::unlink`]) and be linked again later.

use slotmap::{SlotMap, new_key_type};

new_key_type! {
    /// Handle to a record in a [`LinkedList`].
    pub struct LinkId;
}

struct Link<V> {
    value: V,
    prev: Option<LinkId>,
    next: Option<LinkId>,
    linked: bool,
}

/// Doubly linked list over an arena of records.
pub struct LinkedList<V> {
    links: SlotMap<LinkId, Link<V>>,
    head: Option<LinkId>,
    tail: Option<LinkId>,
    len: usize,
}

impl<V> Default for LinkedList<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> LinkedList<V> {
    pub fn new() -> Self {
        Self {
            links: SlotMap::with_key(),
            head: None,
            tail: None,
            len: 0,
        }
    }

    /// Allocate an unlinked record.
    pub fn alloc(&mut self, value: V) -> LinkId {
        self.links.insert(Link {
            value,
            prev: None,
            next: None,
            linked: false,
        })
    }

    /// Allocate a record and append it at the tail.
    pub fn push_back(&mut self, value: V) -> LinkId {
        let id = self.alloc(value);
        self.insert_before(id, None);
        id
    }

    /// Link `id` immediately before `before`, or at the tail when `before`
    /// is `None`. A record that is already linked is moved.
    pub fn insert_before(&mut self, id: LinkId, before: Option<LinkId>) {
        if before == Some(id) || !self.links.contains_key(id) {
            return;
        }
        if let Some(anchor) = before {
            if !self.is_linked(anchor) {
                debug_assert!(false, "insert_before anchor is not linked");
                return;
            }
        }
        self.unlink(id);

        let prev = match before {
            Some(anchor) => self.links[anchor].prev,
            None => self.tail,
        };

        {
            let link = &mut self.links[id];
            link.prev = prev;
            link.next = before;
            link.linked = true;
        }
        match prev {
            Some(p) => self.links[p].next = Some(id),
            None => self.head = Some(id),
        }
        match before {
            Some(n) => self.links[n].prev = Some(id),
            None => self.tail = Some(id),
        }
        self.len += 1;
    }

    /// Take `id` out of the list, keeping its record allocated.
    pub fn unlink(&mut self, id: LinkId) {
        let Some(link) = self.links.get_mut(id) else {
            return;
        };
        if !link.linked {
            return;
        }
        let (prev, next) = (link.prev.take(), link.next.take());
        link.linked = false;

        match prev {
            Some(p) => self.links[p].next = next,
            None => self.head = next,
        }
        match next {
            Some(n) => self.links[n].prev = prev,
            None => self.tail = prev,
        }
        self.len -= 1;
    }

    /// Unlink and free `id`, returning its value.
    pub fn remove(&mut self, id: LinkId) -> Option<V> {
        self.unlink(id);
        self.links.remove(id).map(|link| link.value)
    }

    pub fn head(&self) -> Option<LinkId> {
        self.head
    }

    pub fn tail(&self) -> Option<LinkId> {
        self.tail
    }

    pub fn next(&self, id: LinkId) -> Option<LinkId> {
        self.links.get(id).and_then(|link| link.next)
    }

    pub fn prev(&self, id: LinkId) -> Option<LinkId> {
        self.links.get(id).and_then(|link| link.prev)
    }

    pub fn get(&self, id: LinkId) -> Option<&V> {
        self.links.get(id).map(|link| &link.value)
    }

    pub fn is_linked(&self, id: LinkId) -> bool {
        self.links.get(id).is_some_and(|link| link.linked)
    }

    /// Number of linked records.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Linked records, head to tail.
    pub fn iter(&self) -> Iter<'_, V> {
        Iter {
            list: self,
            cursor: self.head,
        }
    }
}

/// Head-to-tail iterator over `(LinkId, &V)`.
pub struct Iter<'a, V> {
    list: &'a LinkedList<V>,
    cursor: Option<LinkId>,
}

impl<'a, V> Iterator for Iter<'a, V> {
    type Item = (LinkId, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.cursor?;
        let link = self.list.links.get(id)?;
        self.cursor = link.next;
        Some((id, &link.value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(list: &LinkedList<&'static str>) -> Vec<&'static str> {
        list.iter().map(|(_, v)| *v).collect()
    }

    #[test]
    fn test_insert_before_none_appends() {
        let mut list = LinkedList::new();
        let a = list.push_back("a");
        let b = list.push_back("b");

        assert_eq!(values(&list), vec!["a", "b"]);
        assert_eq!(list.head(), Some(a));
        assert_eq!(list.tail(), Some(b));
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn test_insert_before_head_updates_head() {
        let mut list = LinkedList::new();
        let b = list.push_back("b");
        let a = list.alloc("a");
        list.insert_before(a, Some(b));

        assert_eq!(values(&list), vec!["a", "b"]);
        assert_eq!(list.head(), Some(a));
        assert_eq!(list.prev(b), Some(a));
    }

    #[test]
    fn test_reinsert_moves_record() {
        let mut list = LinkedList::new();
        let a = list.push_back("a");
        let _b = list.push_back("b");
        let c = list.push_back("c");

        list.insert_before(c, Some(a));
        assert_eq!(values(&list), vec!["c", "a", "b"]);

        list.insert_before(c, None);
        assert_eq!(values(&list), vec!["a", "b", "c"]);
        assert_eq!(list.len(), 3, "moving must not change length");
    }

    #[test]
    fn test_remove_head_and_tail() {
        let mut list = LinkedList::new();
        let a = list.push_back("a");
        let b = list.push_back("b");
        let c = list.push_back("c");

        assert_eq!(list.remove(a), Some("a"));
        assert_eq!(list.head(), Some(b));
        assert_eq!(list.remove(c), Some("c"));
        assert_eq!(list.tail(), Some(b));
        assert_eq!(list.remove(b), Some("b"));
        assert!(list.is_empty());
        assert_eq!(list.head(), None);
        assert_eq!(list.tail(), None);
    }

    #[test]
    fn test_stale_handle_is_inert() {
        let mut list = LinkedList::new();
        let a = list.push_back("a");
        list.remove(a);
        let b = list.push_back("b");

        assert_eq!(list.get(a), None);
        assert_eq!(list.remove(a), None);
        assert_eq!(values(&list), vec!["b"]);
        assert!(list.is_linked(b));
    }

    #[test]
    fn test_unlink_keeps_record() {
        let mut list = LinkedList::new();
        let a = list.push_back("a");
        list.unlink(a);

        assert!(list.is_empty());
        assert_eq!(list.get(a), Some(&"a"));
        list.insert_before(a, None);
        assert_eq!(values(&list), vec!["a"]);
    }
}
