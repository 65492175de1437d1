//! Node storage for [`Document`](super::Document).
//!
//! Nodes live in a [`SlotMap`] and link to their parent and siblings by
//! [`NodeId`]. Child lists are intrusive: each node knows its previous and
//! next sibling, so insert and detach are O(1).

use std::rc::Rc;

use indexmap::IndexMap;
use serde_json::Value;
use slotmap::{SlotMap, new_key_type};

use super::node::DomEvent;

new_key_type! {
    /// Handle to a node in a document.
    pub struct NodeId;
}

/// What kind of node a [`DomNode`](super::DomNode) is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeType {
    Element,
    Text,
    Comment,
    Fragment,
}

/// Registration handle for an event listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

pub(crate) type Listener = Rc<dyn Fn(&DomEvent)>;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct AttributeName {
    pub namespace: Option<String>,
    pub name: String,
}

pub(crate) struct ElementData {
    pub namespace_uri: String,
    pub tag: String,
    pub attributes: IndexMap<AttributeName, String>,
    pub properties: IndexMap<String, Value>,
}

pub(crate) enum NodeData {
    Element(ElementData),
    Text(String),
    Comment(String),
    Fragment,
}

impl NodeData {
    pub fn node_type(&self) -> NodeType {
        match self {
            NodeData::Element(_) => NodeType::Element,
            NodeData::Text(_) => NodeType::Text,
            NodeData::Comment(_) => NodeType::Comment,
            NodeData::Fragment => NodeType::Fragment,
        }
    }
}

pub(crate) struct NodeEntry {
    pub data: NodeData,
    pub parent: Option<NodeId>,
    pub first_child: Option<NodeId>,
    pub last_child: Option<NodeId>,
    pub prev: Option<NodeId>,
    pub next: Option<NodeId>,
    pub listeners: Vec<(ListenerId, String, Listener)>,
}

/// Arena of nodes.
///
/// An entry is freed once it has no parent and no
/// [`DomNode`](super::DomNode) refers to it, so every live handle indexes a
/// live entry.
#[derive(Default)]
pub(crate) struct Tree {
    pub nodes: SlotMap<NodeId, NodeEntry>,
    next_listener: u64,
}

impl Tree {
    pub fn alloc(&mut self, data: NodeData) -> NodeId {
        self.nodes.insert(NodeEntry {
            data,
            parent: None,
            first_child: None,
            last_child: None,
            prev: None,
            next: None,
            listeners: Vec::new(),
        })
    }

    pub fn next_listener_id(&mut self) -> ListenerId {
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;
        id
    }

    /// Take `id` out of its parent's child list.
    pub fn detach(&mut self, id: NodeId) {
        let entry = &mut self.nodes[id];
        let Some(parent) = entry.parent.take() else {
            return;
        };
        let (prev, next) = (entry.prev.take(), entry.next.take());

        match prev {
            Some(p) => self.nodes[p].next = next,
            None => self.nodes[parent].first_child = next,
        }
        match next {
            Some(n) => self.nodes[n].prev = prev,
            None => self.nodes[parent].last_child = prev,
        }
    }

    /// Link a detached `child` into `parent` before `before` (a child of
    /// `parent`), or at the end.
    pub fn attach(&mut self, parent: NodeId, child: NodeId, before: Option<NodeId>) {
        debug_assert!(self.nodes[child].parent.is_none(), "attach of attached node");
        let prev = match before {
            Some(b) => self.nodes[b].prev,
            None => self.nodes[parent].last_child,
        };

        {
            let entry = &mut self.nodes[child];
            entry.parent = Some(parent);
            entry.prev = prev;
            entry.next = before;
        }
        match prev {
            Some(p) => self.nodes[p].next = Some(child),
            None => self.nodes[parent].first_child = Some(child),
        }
        match before {
            Some(b) => self.nodes[b].prev = Some(child),
            None => self.nodes[parent].last_child = Some(child),
        }
    }

    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        let mut children = Vec::new();
        let mut cursor = self.nodes[id].first_child;
        while let Some(child) = cursor {
            children.push(child);
            cursor = self.nodes[child].next;
        }
        children
    }

    /// Sibling run from `start` through `end`, inclusive.
    ///
    /// Stops early at the last sibling if `end` does not follow `start`.
    pub fn sibling_run(&self, start: NodeId, end: NodeId) -> Vec<NodeId> {
        let mut run = Vec::new();
        let mut cursor = Some(start);
        while let Some(id) = cursor {
            run.push(id);
            if id == end {
                return run;
            }
            cursor = self.nodes[id].next;
        }
        debug_assert!(false, "range end does not follow range start");
        run
    }

    /// Free every candidate that has no parent and is not held, then its
    /// children in turn.
    ///
    /// Returns the freed entries; the caller drops them once the tree is no
    /// longer borrowed, since listeners may own node handles.
    pub fn reclaim(
        &mut self,
        mut candidates: Vec<NodeId>,
        is_held: impl Fn(NodeId) -> bool,
    ) -> Vec<NodeEntry> {
        let mut freed = Vec::new();
        while let Some(id) = candidates.pop() {
            match self.nodes.get(id) {
                Some(entry) if entry.parent.is_none() && !is_held(id) => {}
                _ => continue,
            }
            for child in self.children(id) {
                self.detach(child);
                candidates.push(child);
            }
            freed.extend(self.nodes.remove(id));
        }
        freed
    }

    /// Whether `ancestor` is `node` or one of its ancestors.
    pub fn is_inclusive_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut cursor = Some(node);
        while let Some(id) = cursor {
            if id == ancestor {
                return true;
            }
            cursor = self.nodes[id].parent;
        }
        false
    }
}
