//! Property-based invariant tests for ordered list reconciliation.
//!
//! For **any** sequence of emissions:
//!
//! 1. Order: rendered keys follow the emission, first occurrence per key.
//! 2. Cardinality: one rendered item per distinct key.
//! 3. Identity: a key present in consecutive emissions keeps its node.
//! 4. Accounting: every key is created, updated or moved exactly once, and
//!    every vanished key is removed exactly once.
//! 5. Values: each item shows the value of its key's first occurrence.

use std::collections::HashMap;

use proptest::prelude::*;
use stream_dom::{
    Bound, Config, Context, DomNode, ElementProps, HTML_NAMESPACE_URI, MountHandle, Subject, Value,
    element, mount, ordered_list, stream, text,
};

// ── Helpers ─────────────────────────────────────────────────────────────

type Item = (u8, u8);

fn emission_strategy() -> impl Strategy<Value = Vec<Item>> {
    proptest::collection::vec((0u8..12, 0u8..4), 0..=10)
}

fn emissions_strategy() -> impl Strategy<Value = Vec<Vec<Item>>> {
    proptest::collection::vec(emission_strategy(), 1..=6)
}

/// Distinct keys of an emission in first-occurrence order, with their values.
fn first_wins(items: &[Item]) -> Vec<Item> {
    let mut seen = HashMap::new();
    items
        .iter()
        .filter(|(key, value)| seen.insert(*key, *value).is_none())
        .copied()
        .collect()
}

struct Harness {
    _ctx: Context,
    _host: DomNode,
    items: Subject<Vec<Item>>,
    handle: MountHandle,
}

impl Harness {
    fn new() -> Self {
        let ctx = Context::new(Config::default()).unwrap();
        let host = ctx.document().create_element_ns(HTML_NAMESPACE_URI, "ol");
        let items = Subject::new();
        let list = ordered_list(
            items.stream(),
            |item: &Item| item.0,
            |item| {
                let key = Bound::Reactive(item.map(|(key, _)| Value::from(key)));
                let value = item.map(|(_, value)| vec![text(value.to_string())]);
                element(
                    "li",
                    ElementProps::default().attr("data-key", key).child(stream(value)),
                )
            },
        );
        let handle = mount(&ctx, &host, None, list).unwrap();
        Self {
            _ctx: ctx,
            _host: host,
            items,
            handle,
        }
    }

    fn rendered(&self) -> Vec<(u8, u8, DomNode)> {
        let root = self.handle.root().child_descriptors();
        let list = root[0].as_ordered_list().unwrap();
        list.region()
            .content_nodes()
            .into_iter()
            .map(|node| {
                let key = node.attribute(None, "data-key").unwrap().parse().unwrap();
                let value = node.text_content().parse().unwrap();
                (key, value, node)
            })
            .collect()
    }

    fn last_patch(&self) -> stream_dom::PatchSummary {
        let root = self.handle.root().child_descriptors();
        root[0].as_ordered_list().unwrap().last_patch().unwrap()
    }
}

// ═════════════════════════════════════════════════════════════════════════
// Invariants across emission sequences
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn list_tracks_every_emission(emissions in emissions_strategy()) {
        let harness = Harness::new();
        let mut previous: HashMap<u8, DomNode> = HashMap::new();

        for items in emissions {
            harness.items.next(items.clone());
            let expected = first_wins(&items);
            let rendered = harness.rendered();

            // 1 + 5. Order and values
            let shown: Vec<Item> = rendered.iter().map(|(k, v, _)| (*k, *v)).collect();
            prop_assert_eq!(&shown, &expected);

            // 2. Cardinality
            prop_assert_eq!(rendered.len(), expected.len());

            // 3. Identity
            for (key, _, node) in &rendered {
                if let Some(kept) = previous.get(key) {
                    prop_assert_eq!(kept, node, "key {} was re-rendered", key);
                }
            }

            // 4. Accounting
            let summary = harness.last_patch();
            let kept = expected.iter().filter(|(key, _)| previous.contains_key(key)).count();
            prop_assert_eq!(summary.updated + summary.moved, kept);
            prop_assert_eq!(summary.created, expected.len() - kept);
            prop_assert_eq!(summary.removed, previous.len() - kept);
            prop_assert_eq!(summary.duplicates, items.len() - expected.len());
            prop_assert_eq!(summary.failed, 0);

            previous = rendered.into_iter().map(|(key, _, node)| (key, node)).collect();
        }
    }

    #[test]
    fn same_emission_twice_is_all_updates(items in emission_strategy()) {
        let harness = Harness::new();
        harness.items.next(items.clone());
        harness.items.next(items.clone());

        let summary = harness.last_patch();
        prop_assert_eq!(summary.structural_edits(), 0);
        prop_assert_eq!(summary.updated, first_wins(&items).len());
    }
}
