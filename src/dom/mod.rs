//! In-memory document tree.
//!
//! The reconciliation core only needs a handful of document operations:
//! create nodes in a namespace, insert before a reference node, remove,
//! set attributes and properties, listen for events, and move a sibling
//! range into a fragment. [`Document`] provides exactly those over a
//! slotmap arena, and is what every node created by this crate lives in.
//!
//! Nodes are counted by handle. A node with no parent and no live
//! [`DomNode`] is freed together with whatever part of its subtree is
//! equally unreachable.
//!
//! # Example
//!
//! ```ignore
//! let doc = Document::new();
//! let div = doc.create_element_ns(HTML_NAMESPACE_URI, "div");
//! div.append_child(&doc.create_text_node("hi"));
//! assert_eq!(div.to_markup(), "<div>hi</div>");
//! ```

mod node;
mod tree;

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;
use slotmap::SecondaryMap;
use tracing::{trace, warn};

pub use node::{DomEvent, DomNode};
pub use tree::{ListenerId, NodeId, NodeType};

use tree::{ElementData, NodeData, Tree};

/// Live [`DomNode`] handles per node.
#[derive(Default)]
struct Handles {
    counts: SecondaryMap<NodeId, u32>,
    /// Released while the tree was borrowed; retried on the next reclaim.
    pending: Vec<NodeId>,
}

/// Owner of a node arena. Clones share the same tree.
#[derive(Clone, Default)]
pub struct Document {
    tree: Rc<RefCell<Tree>>,
    handles: Rc<RefCell<Handles>>,
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("nodes", &self.node_count())
            .finish()
    }
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    fn alloc(&self, data: NodeData) -> DomNode {
        let id = self.tree.borrow_mut().alloc(data);
        DomNode::new(self.clone(), id)
    }

    pub fn create_element_ns(&self, namespace_uri: &str, tag: &str) -> DomNode {
        self.alloc(NodeData::Element(ElementData {
            namespace_uri: namespace_uri.to_string(),
            tag: tag.to_string(),
            attributes: IndexMap::new(),
            properties: IndexMap::new(),
        }))
    }

    pub fn create_text_node(&self, text: &str) -> DomNode {
        self.alloc(NodeData::Text(text.to_string()))
    }

    pub fn create_comment(&self, data: &str) -> DomNode {
        self.alloc(NodeData::Comment(data.to_string()))
    }

    pub fn create_document_fragment(&self) -> DomNode {
        self.alloc(NodeData::Fragment)
    }

    /// Move the sibling run `start..=end` into a new fragment.
    pub fn extract_range(&self, start: &DomNode, end: &DomNode) -> DomNode {
        let fragment = self.create_document_fragment();
        self.move_range(start, end, &fragment);
        fragment
    }

    /// Append the sibling run `start..=end` to `target`.
    pub fn move_range(&self, start: &DomNode, end: &DomNode, target: &DomNode) {
        let mut tree = self.tree.borrow_mut();
        let run = tree.sibling_run(start.id(), end.id());
        if run.iter().any(|&id| tree.is_inclusive_ancestor(id, target.id())) {
            warn!(target = ?target.id(), "refusing to move a range into itself");
            return;
        }
        for id in run {
            tree.detach(id);
            tree.attach(target.id(), id, None);
        }
    }

    /// Detach the sibling run `start..=end`.
    pub fn delete_range(&self, start: &DomNode, end: &DomNode) {
        let run = {
            let mut tree = self.tree.borrow_mut();
            let run = tree.sibling_run(start.id(), end.id());
            for &id in &run {
                tree.detach(id);
            }
            run
        };
        self.reclaim(run);
    }

    /// Detach every sibling strictly between `start` and `end`.
    pub fn delete_between(&self, start: &DomNode, end: &DomNode) {
        let inner = {
            let mut tree = self.tree.borrow_mut();
            let run = tree.sibling_run(start.id(), end.id());
            if run.len() < 2 || run.last() != Some(&end.id()) {
                return;
            }
            let inner = run[1..run.len() - 1].to_vec();
            for &id in &inner {
                tree.detach(id);
            }
            inner
        };
        self.reclaim(inner);
    }

    /// Number of live nodes in this document.
    pub fn node_count(&self) -> usize {
        self.tree.borrow().nodes.len()
    }

    // =========================================================================
    // Reclamation
    // =========================================================================

    pub(crate) fn retain(&self, id: NodeId) {
        let mut handles = self.handles.borrow_mut();
        match handles.counts.get_mut(id) {
            Some(count) => *count += 1,
            None => {
                handles.counts.insert(id, 1);
            }
        }
    }

    pub(crate) fn release(&self, id: NodeId) {
        let unreferenced = {
            let mut handles = self.handles.borrow_mut();
            match handles.counts.get_mut(id) {
                Some(count) if *count > 1 => {
                    *count -= 1;
                    false
                }
                Some(_) => {
                    handles.counts.remove(id);
                    true
                }
                None => false,
            }
        };
        if unreferenced {
            self.reclaim(vec![id]);
        }
    }

    /// Free the candidates that are detached and unreferenced.
    pub(crate) fn reclaim(&self, mut candidates: Vec<NodeId>) {
        let freed = {
            let Ok(mut tree) = self.tree.try_borrow_mut() else {
                self.handles.borrow_mut().pending.extend(candidates);
                return;
            };
            candidates.append(&mut self.handles.borrow_mut().pending);
            let handles = self.handles.borrow();
            tree.reclaim(candidates, |id| handles.counts.contains_key(id))
        };
        if !freed.is_empty() {
            trace!(freed = freed.len(), "reclaimed detached nodes");
        }
        // Listeners may own handles whose release reclaims further nodes.
        drop(freed);
    }

    pub fn same_document(&self, other: &Document) -> bool {
        Rc::ptr_eq(&self.tree, &other.tree)
    }
}
