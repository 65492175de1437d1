//! ordered_list() - Keyed list region.
//!
//! Each emission is diffed against the rendered records with a two-pointer
//! walk. `current` is the first record not yet known to be in place:
//!
//! ```text
//! records:  [a] [b] [c] [d]        items: c a
//!            ^current
//!
//! c: known, not current   → MOVE before a      [c] [a] [b] [d]
//! a: is current           → UPDATE, current = b
//! end of items            → REMOVE b, d        [c] [a]
//! ```
//!
//! New keys are CREATEd before `current` (or the end marker). A key kept
//! across emissions keeps its descriptor; it only sees the new value through
//! its item stream.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::rc::Rc;

use tracing::{debug, error, trace, warn};

use super::Region;
use crate::dom::DomNode;
use crate::engine::{KeyedRecords, LinkId};
use crate::error::Result;
use crate::node::{NodeDeclaration, NodeDescriptor, Scope};
use crate::signals::{Event, Stream, Subject, Trigger};
use crate::types::{NodeKind, PatchSummary};

// =============================================================================
// Records
// =============================================================================

struct Record {
    descriptor: NodeDescriptor,
    destroy: Trigger,
}

/// Type-erased view of a list's records.
trait ListRecords {
    fn item_descriptors(&self) -> Vec<NodeDescriptor>;
    fn len(&self) -> usize;
}

struct ListState<T, K> {
    region: Region,
    scope: Scope,
    identify: Rc<dyn Fn(&T) -> K>,
    render_item: Rc<dyn Fn(Stream<T>) -> NodeDeclaration>,
    records: RefCell<KeyedRecords<K, Record>>,
    item_maps: Subject<Rc<HashMap<K, T>>>,
    patches: Subject<PatchSummary>,
    patching: Cell<bool>,
    pending: RefCell<Option<Vec<T>>>,
}

impl<T, K> ListRecords for ListState<T, K>
where
    T: Clone + 'static,
    K: Clone + Eq + Hash + fmt::Debug + 'static,
{
    fn item_descriptors(&self) -> Vec<NodeDescriptor> {
        self.records
            .borrow()
            .iter()
            .map(|(_, record)| record.descriptor.clone())
            .collect()
    }

    fn len(&self) -> usize {
        self.records.borrow().len()
    }
}

impl<T, K> ListState<T, K>
where
    T: Clone + 'static,
    K: Clone + Eq + Hash + fmt::Debug + 'static,
{
    /// Apply an emission. Emissions arriving while a patch runs are applied
    /// right after it, latest first.
    fn emit(&self, items: Vec<T>) {
        if self.patching.get() {
            trace!("ordered list emission deferred until the running patch ends");
            self.pending.replace(Some(items));
            return;
        }
        self.patching.set(true);
        let mut next = Some(items);
        while let Some(items) = next {
            let summary = self.patch(items);
            debug!(
                created = summary.created,
                updated = summary.updated,
                moved = summary.moved,
                removed = summary.removed,
                duplicates = summary.duplicates,
                failed = summary.failed,
                "ordered list patched"
            );
            self.patches.next(summary);
            next = self.pending.borrow_mut().take();
        }
        self.patching.set(false);
    }

    fn patch(&self, items: Vec<T>) -> PatchSummary {
        let mut summary = PatchSummary::default();
        let Some(parent) = self.region.parent() else {
            warn!("ordered list region has no parent; emission ignored");
            return summary;
        };

        // 1. KEY ITEMS - first occurrence wins
        let mut item_map = HashMap::with_capacity(items.len());
        let mut order = Vec::with_capacity(items.len());
        for item in items {
            let key = (self.identify)(&item);
            if item_map.contains_key(&key) {
                warn!(?key, "duplicate key in ordered list; keeping the first item");
                summary.duplicates += 1;
                continue;
            }
            order.push(key.clone());
            item_map.insert(key, item);
        }
        let item_map = Rc::new(item_map);

        // 2. PUBLISH - kept items receive their new values
        self.item_maps.next(Rc::clone(&item_map));

        // 3. WALK
        let mut current = self.records.borrow().head();
        let mut index = 0;
        while index < order.len() {
            if let Some(id) = current {
                let stale = {
                    let records = self.records.borrow();
                    records
                        .key(id)
                        .filter(|key| !item_map.contains_key(*key))
                        .cloned()
                };
                if let Some(key) = stale {
                    current = self.records.borrow().next(id);
                    self.remove_record(&key);
                    summary.removed += 1;
                    continue;
                }
            }

            let key = &order[index];
            let existing = self.records.borrow().id(key);
            match existing {
                Some(id) if Some(id) == current => {
                    current = self.records.borrow().next(id);
                    summary.updated += 1;
                }
                Some(_) => {
                    self.move_record(&parent, key, current);
                    summary.moved += 1;
                }
                None => match self.create_record(key) {
                    Ok(record) => {
                        self.insert_record(&parent, key.clone(), record, current);
                        summary.created += 1;
                    }
                    Err(err) => {
                        error!(?key, error = %err, "ordered list item failed to render; skipping");
                        summary.failed += 1;
                    }
                },
            }
            index += 1;
        }

        // 4. TRAILING RECORDS - everything past the walk is gone
        while let Some(id) = current {
            let (next, key) = {
                let records = self.records.borrow();
                (records.next(id), records.key(id).cloned())
            };
            current = next;
            if let Some(key) = key {
                self.remove_record(&key);
                summary.removed += 1;
            }
        }

        summary
    }

    /// Document node that content placed before `current` goes in front of.
    fn anchor(&self, current: Option<LinkId>) -> DomNode {
        current
            .and_then(|id| {
                self.records
                    .borrow()
                    .value(id)
                    .map(|record| record.descriptor.before_node())
            })
            .unwrap_or_else(|| self.region.end().clone())
    }

    fn create_record(&self, key: &K) -> Result<Record> {
        let destroy = Trigger::new();
        let item_scope = self.scope.child(&destroy);
        let lookup = key.clone();
        let item = self
            .item_maps
            .stream()
            .filter_map(move |items| items.get(&lookup).cloned());

        match (self.render_item)(item).create(&item_scope) {
            Ok(descriptor) => Ok(Record {
                descriptor,
                destroy,
            }),
            Err(err) => {
                destroy.fire();
                Err(err)
            }
        }
    }

    fn insert_record(&self, parent: &DomNode, key: K, record: Record, current: Option<LinkId>) {
        let anchor = self.anchor(current);
        record.descriptor.insert(parent, Some(&anchor));
        let inserted = self.records.borrow_mut().insert_before(key, record, current);
        debug_assert!(inserted.is_ok(), "created a record for an indexed key");
    }

    fn move_record(&self, parent: &DomNode, key: &K, current: Option<LinkId>) {
        let anchor = self.anchor(current);
        let descriptor = self
            .records
            .borrow()
            .get(key)
            .map(|record| record.descriptor.clone());
        if let Some(descriptor) = descriptor {
            descriptor.insert(parent, Some(&anchor));
            self.records.borrow_mut().move_before(key, current);
        }
    }

    fn remove_record(&self, key: &K) {
        let record = self.records.borrow_mut().remove(key);
        if let Some(record) = record {
            record.destroy.fire();
            record.descriptor.remove();
        }
    }
}

// =============================================================================
// Ordered List Node
// =============================================================================

/// Descriptor for a keyed list region.
pub struct OrderedListNode {
    region: Region,
    records: Rc<dyn ListRecords>,
    patches: Subject<PatchSummary>,
}

impl OrderedListNode {
    pub fn name(&self) -> Option<&str> {
        None
    }

    pub fn region(&self) -> &Region {
        &self.region
    }

    /// Number of rendered items.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Item descriptors in rendered order.
    pub fn item_descriptors(&self) -> Vec<NodeDescriptor> {
        self.records.item_descriptors()
    }

    /// One summary per applied emission; replays the latest.
    pub fn patches(&self) -> Stream<PatchSummary> {
        self.patches.stream()
    }

    pub fn last_patch(&self) -> Option<PatchSummary> {
        self.patches.latest()
    }
}

struct ListArgs<T, K> {
    list: Stream<Vec<T>>,
    identify: Rc<dyn Fn(&T) -> K>,
    render_item: Rc<dyn Fn(Stream<T>) -> NodeDeclaration>,
}

/// Declare a keyed list.
///
/// `identify` gives each item its key. `render_item` is called once per new
/// key with a stream of that key's values, and must return the item's
/// declaration.
///
/// # Example
///
/// ```ignore
/// use stream_dom::primitives::{element, ordered_list, stream, text, ElementProps};
///
/// let rows = ordered_list(
///     todos.stream(),
///     |todo: &Todo| todo.id,
///     |todo| element("li", ElementProps::default()
///         .child(stream(todo.map(|t| vec![text(t.title)])))),
/// );
///
/// // Rename a todo - its <li> is kept, only the text region updates
/// todos.next(vec![Todo { id: 1, title: "Updated".into() }]);
/// ```
///
/// # Duplicate Key Handling
///
/// The first item with a key is rendered. Later items with the same key are
/// skipped with a warning and counted in the patch summary.
pub fn ordered_list<T, K>(
    list: Stream<Vec<T>>,
    identify: impl Fn(&T) -> K + 'static,
    render_item: impl Fn(Stream<T>) -> NodeDeclaration + 'static,
) -> NodeDeclaration
where
    T: Clone + 'static,
    K: Clone + Eq + Hash + fmt::Debug + 'static,
{
    NodeDeclaration::new(
        NodeKind::OrderedList,
        create_ordered_list_node::<T, K>,
        ListArgs {
            list,
            identify: Rc::new(identify),
            render_item: Rc::new(render_item),
        },
    )
}

fn create_ordered_list_node<T, K>(scope: &Scope, args: &ListArgs<T, K>) -> Result<NodeDescriptor>
where
    T: Clone + 'static,
    K: Clone + Eq + Hash + fmt::Debug + 'static,
{
    let patches = Subject::replaying();
    let state = Rc::new(ListState {
        region: Region::new(scope.document()),
        scope: scope.clone(),
        identify: Rc::clone(&args.identify),
        render_item: Rc::clone(&args.render_item),
        records: RefCell::new(KeyedRecords::new()),
        item_maps: Subject::replaying(),
        patches: patches.clone(),
        patching: Cell::new(false),
        pending: RefCell::new(None),
    });

    let observer = Rc::clone(&state);
    args.list
        .until(scope.destroy())
        .observe_events(move |event| match event {
            Event::Next(items) => observer.emit(items),
            Event::Error(err) => warn!(error = %err, "ordered list source error"),
            Event::End => trace!("ordered list source ended"),
        });

    Ok(NodeDescriptor::OrderedList(Rc::new(OrderedListNode {
        region: state.region.clone(),
        records: state,
        patches,
    })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, Context};
    use crate::primitives::{ElementProps, element, text};
    use crate::types::{Bound, Value};

    fn setup() -> (Scope, Trigger) {
        let ctx = Context::new(Config::default()).unwrap();
        let destroy = Trigger::new();
        (Scope::new(&ctx, Stream::never(), destroy.signal()), destroy)
    }

    /// `(id, label)` items rendered as `<li data-label=..>id</li>`.
    fn list_of(items: &Subject<Vec<(u32, &'static str)>>) -> NodeDeclaration {
        ordered_list(
            items.stream(),
            |item: &(u32, &'static str)| item.0,
            |item: Stream<(u32, &'static str)>| {
                let label = Bound::Reactive(item.map(|(_, label)| Value::from(label)));
                let id = item.map(|(id, _)| vec![text(id.to_string())]);
                element(
                    "li",
                    ElementProps::default()
                        .attr("data-label", label)
                        .child(id),
                )
            },
        )
    }

    fn ids(node: &OrderedListNode) -> String {
        node.region()
            .content_nodes()
            .iter()
            .map(|node| node.text_content())
            .collect::<Vec<_>>()
            .join(",")
    }

    #[test]
    fn test_renders_in_order() {
        let (scope, _destroy) = setup();
        let items = Subject::new();
        let descriptor = list_of(&items).create(&scope).unwrap();
        let list = descriptor.as_ordered_list().unwrap().clone();

        items.next(vec![(1, "a"), (2, "b"), (3, "c")]);

        assert_eq!(ids(&list), "1,2,3");
        assert_eq!(list.len(), 3);
        assert_eq!(
            list.last_patch(),
            Some(PatchSummary {
                created: 3,
                ..Default::default()
            })
        );
    }

    #[test]
    fn test_update_keeps_descriptor_and_applies_value() {
        let (scope, _destroy) = setup();
        let items = Subject::new();
        let descriptor = list_of(&items).create(&scope).unwrap();
        let list = descriptor.as_ordered_list().unwrap().clone();

        items.next(vec![(1, "a")]);
        let before = list.item_descriptors();
        items.next(vec![(1, "z")]);
        let after = list.item_descriptors();

        assert!(before[0].ptr_eq(&after[0]));
        assert_eq!(
            after[0].before_node().attribute(None, "data-label").as_deref(),
            Some("z")
        );
        assert_eq!(list.last_patch().unwrap().structural_edits(), 0);
    }

    #[test]
    fn test_duplicate_keys_first_wins() {
        let (scope, _destroy) = setup();
        let items = Subject::new();
        let descriptor = list_of(&items).create(&scope).unwrap();
        let list = descriptor.as_ordered_list().unwrap().clone();

        items.next(vec![(1, "first"), (2, "b"), (1, "second")]);

        assert_eq!(ids(&list), "1,2");
        let first = &list.item_descriptors()[0];
        assert_eq!(
            first.before_node().attribute(None, "data-label").as_deref(),
            Some("first")
        );
        assert_eq!(list.last_patch().unwrap().duplicates, 1);
    }

    #[test]
    fn test_failed_item_is_skipped_and_retried() {
        let (scope, _destroy) = setup();
        let items: Subject<Vec<u32>> = Subject::new();
        let descriptor = ordered_list(
            items.stream(),
            |n: &u32| *n % 100,
            |item: Stream<u32>| {
                // Odd values below 100 fail to render.
                let first = Rc::new(Cell::new(0));
                let seen = Rc::clone(&first);
                item.take(1).observe(move |n| seen.set(n));
                let tag = if first.get() % 2 == 1 && first.get() < 100 { "" } else { "li" };
                element(tag, ElementProps::default().child(first.get().to_string()))
            },
        )
        .create(&scope)
        .unwrap();
        let list = descriptor.as_ordered_list().unwrap().clone();

        items.next(vec![2, 3, 4]);
        assert_eq!(ids(&list), "2,4");
        assert_eq!(list.last_patch().unwrap().failed, 1);

        items.next(vec![2, 103, 4]);
        assert_eq!(ids(&list), "2,103,4");
        assert_eq!(list.last_patch().unwrap().created, 1);
    }

    #[test]
    fn test_destroy_stops_patching() {
        let (scope, destroy) = setup();
        let items = Subject::new();
        let descriptor = list_of(&items).create(&scope).unwrap();
        let list = descriptor.as_ordered_list().unwrap().clone();

        items.next(vec![(1, "a")]);
        destroy.fire();
        items.next(vec![(2, "b")]);

        assert_eq!(ids(&list), "1");
        assert_eq!(items.observer_count(), 0);
    }

    /// Renders `<li>n</li>` and runs `during_first_render` on the first call.
    fn feeding_list(
        items: &Subject<Vec<u32>>,
        renders: Rc<Cell<u32>>,
        during_first_render: impl Fn() + 'static,
    ) -> NodeDeclaration {
        ordered_list(items.stream(), |n: &u32| *n, move |item: Stream<u32>| {
            renders.set(renders.get() + 1);
            if renders.get() == 1 {
                during_first_render();
            }
            let id = item.map(|n| vec![text(n.to_string())]);
            element("li", ElementProps::default().child(id))
        })
    }

    fn record_patches(list: &OrderedListNode) -> Rc<RefCell<Vec<PatchSummary>>> {
        let summaries = Rc::new(RefCell::new(Vec::new()));
        let log = Rc::clone(&summaries);
        list.patches().observe(move |summary| log.borrow_mut().push(summary));
        summaries
    }

    #[test]
    fn test_emission_during_patch_is_applied_after_it() {
        let (scope, _destroy) = setup();
        let items: Subject<Vec<u32>> = Subject::new();
        let feed = items.clone();
        let renders = Rc::new(Cell::new(0));
        let descriptor = feeding_list(&items, Rc::clone(&renders), move || feed.next(vec![9, 1]))
            .create(&scope)
            .unwrap();
        let list = descriptor.as_ordered_list().unwrap().clone();
        let summaries = record_patches(&list);

        items.next(vec![1, 2]);

        assert_eq!(ids(&list), "9,1");
        assert_eq!(summaries.borrow().len(), 2, "one summary per applied emission");
        assert_eq!(
            summaries.borrow()[0],
            PatchSummary {
                created: 2,
                ..Default::default()
            },
            "first patch finishes before the nested emission"
        );
        assert_eq!(
            list.last_patch(),
            Some(PatchSummary {
                created: 1,
                updated: 1,
                removed: 1,
                ..Default::default()
            })
        );
        assert_eq!(renders.get(), 3, "1 and 2, then 9");
    }

    #[test]
    fn test_only_latest_pending_emission_is_applied() {
        let (scope, _destroy) = setup();
        let items: Subject<Vec<u32>> = Subject::new();
        let feed = items.clone();
        let renders = Rc::new(Cell::new(0));
        let descriptor = feeding_list(&items, Rc::clone(&renders), move || {
            feed.next(vec![5]);
            feed.next(vec![6, 1]);
        })
        .create(&scope)
        .unwrap();
        let list = descriptor.as_ordered_list().unwrap().clone();
        let summaries = record_patches(&list);

        items.next(vec![1, 2]);

        assert_eq!(ids(&list), "6,1");
        assert_eq!(summaries.borrow().len(), 2, "[5] was superseded");
        assert_eq!(renders.get(), 3, "5 never rendered");
    }
}
