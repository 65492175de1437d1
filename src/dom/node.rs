//! Node handles.

use std::fmt;
use std::rc::Rc;

use serde_json::Value;
use tracing::warn;

use super::Document;
use super::tree::{AttributeName, ListenerId, NodeData, NodeEntry, NodeId, NodeType};
use crate::signals::{Observer, Stream, Subscription};

/// An event dispatched on a node.
#[derive(Debug, Clone)]
pub struct DomEvent {
    pub name: String,
    pub target: DomNode,
    pub detail: Value,
}

/// Cheap, clonable handle to a node in a [`Document`].
///
/// A node stays allocated while any handle to it lives or while it has a
/// parent.
pub struct DomNode {
    doc: Document,
    id: NodeId,
}

impl Clone for DomNode {
    fn clone(&self) -> Self {
        DomNode::new(self.doc.clone(), self.id)
    }
}

impl Drop for DomNode {
    fn drop(&mut self) {
        self.doc.release(self.id);
    }
}

impl PartialEq for DomNode {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.doc.same_document(&other.doc)
    }
}

impl Eq for DomNode {}

impl fmt::Debug for DomNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.tag_name() {
            Some(tag) => write!(f, "DomNode({:?} <{}>)", self.id, tag),
            None => write!(f, "DomNode({:?} {:?})", self.id, self.node_type()),
        }
    }
}

impl DomNode {
    pub(crate) fn new(doc: Document, id: NodeId) -> Self {
        doc.retain(id);
        Self { doc, id }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn document(&self) -> &Document {
        &self.doc
    }

    fn with<R>(&self, f: impl FnOnce(&NodeEntry) -> R) -> R {
        let tree = self.doc.tree.borrow();
        f(&tree.nodes[self.id])
    }

    fn handle(&self, id: Option<NodeId>) -> Option<DomNode> {
        id.map(|id| DomNode::new(self.doc.clone(), id))
    }

    // =========================================================================
    // Inspection
    // =========================================================================

    pub fn node_type(&self) -> NodeType {
        self.with(|entry| entry.data.node_type())
    }

    pub fn tag_name(&self) -> Option<String> {
        self.with(|entry| match &entry.data {
            NodeData::Element(element) => Some(element.tag.clone()),
            _ => None,
        })
    }

    pub fn namespace_uri(&self) -> Option<String> {
        self.with(|entry| match &entry.data {
            NodeData::Element(element) => Some(element.namespace_uri.clone()),
            _ => None,
        })
    }

    /// Character data of a text or comment node.
    pub fn text(&self) -> Option<String> {
        self.with(|entry| match &entry.data {
            NodeData::Text(text) | NodeData::Comment(text) => Some(text.clone()),
            _ => None,
        })
    }

    /// Replace the character data of a text or comment node.
    pub fn set_text(&self, value: &str) {
        let mut tree = self.doc.tree.borrow_mut();
        match &mut tree.nodes[self.id].data {
            NodeData::Text(text) | NodeData::Comment(text) => {
                text.clear();
                text.push_str(value);
            }
            _ => warn!(node = ?self.id, "set_text on a node without character data"),
        }
    }

    /// Concatenated text of all descendant text nodes.
    pub fn text_content(&self) -> String {
        let tree = self.doc.tree.borrow();
        let mut out = String::new();
        collect_text(&tree.nodes, self.id, &mut out);
        out
    }

    // =========================================================================
    // Navigation
    // =========================================================================

    pub fn parent(&self) -> Option<DomNode> {
        self.handle(self.with(|entry| entry.parent))
    }

    pub fn first_child(&self) -> Option<DomNode> {
        self.handle(self.with(|entry| entry.first_child))
    }

    pub fn last_child(&self) -> Option<DomNode> {
        self.handle(self.with(|entry| entry.last_child))
    }

    pub fn next_sibling(&self) -> Option<DomNode> {
        self.handle(self.with(|entry| entry.next))
    }

    pub fn previous_sibling(&self) -> Option<DomNode> {
        self.handle(self.with(|entry| entry.prev))
    }

    pub fn children(&self) -> Vec<DomNode> {
        let ids = self.doc.tree.borrow().children(self.id);
        ids.into_iter()
            .map(|id| DomNode::new(self.doc.clone(), id))
            .collect()
    }

    pub fn child_count(&self) -> usize {
        self.doc.tree.borrow().children(self.id).len()
    }

    // =========================================================================
    // Mutation
    // =========================================================================

    /// Insert `child` before `before`, or append when `before` is `None`.
    ///
    /// A fragment child contributes its children and is left empty. A
    /// `before` that is not a child of this node is treated as `None`.
    pub fn insert_before(&self, child: &DomNode, before: Option<&DomNode>) {
        if before == Some(child) {
            return;
        }
        let mut tree = self.doc.tree.borrow_mut();

        let before = match before {
            Some(node) if tree.nodes[node.id].parent == Some(self.id) => Some(node.id),
            Some(node) => {
                warn!(parent = ?self.id, before = ?node.id, "reference node is not a child; appending");
                None
            }
            None => None,
        };
        if tree.is_inclusive_ancestor(child.id, self.id) {
            warn!(parent = ?self.id, child = ?child.id, "refusing to insert a node into itself");
            return;
        }

        let moving = match tree.nodes[child.id].data {
            NodeData::Fragment => tree.children(child.id),
            _ => vec![child.id],
        };
        for id in moving {
            tree.detach(id);
            tree.attach(self.id, id, before);
        }
    }

    pub fn append_child(&self, child: &DomNode) {
        self.insert_before(child, None);
    }

    /// Remove `child` if it is a child of this node.
    pub fn remove_child(&self, child: &DomNode) -> bool {
        {
            let mut tree = self.doc.tree.borrow_mut();
            if tree.nodes[child.id].parent != Some(self.id) {
                return false;
            }
            tree.detach(child.id);
        }
        self.doc.reclaim(vec![child.id]);
        true
    }

    /// Detach this node from its parent.
    pub fn detach(&self) {
        self.doc.tree.borrow_mut().detach(self.id);
        self.doc.reclaim(vec![self.id]);
    }

    // =========================================================================
    // Attributes and properties
    // =========================================================================

    pub fn set_attribute(&self, namespace: Option<&str>, name: &str, value: &str) {
        let key = attribute_name(namespace, name);
        self.with_element_mut("set_attribute", |element| {
            element.attributes.insert(key, value.to_string());
        });
    }

    pub fn remove_attribute(&self, namespace: Option<&str>, name: &str) {
        let key = attribute_name(namespace, name);
        self.with_element_mut("remove_attribute", |element| {
            element.attributes.shift_remove(&key);
        });
    }

    pub fn attribute(&self, namespace: Option<&str>, name: &str) -> Option<String> {
        let key = attribute_name(namespace, name);
        self.with(|entry| match &entry.data {
            NodeData::Element(element) => element.attributes.get(&key).cloned(),
            _ => None,
        })
    }

    pub fn has_attribute(&self, namespace: Option<&str>, name: &str) -> bool {
        self.attribute(namespace, name).is_some()
    }

    pub fn set_property(&self, name: &str, value: Value) {
        self.with_element_mut("set_property", |element| {
            element.properties.insert(name.to_string(), value);
        });
    }

    pub fn property(&self, name: &str) -> Option<Value> {
        self.with(|entry| match &entry.data {
            NodeData::Element(element) => element.properties.get(name).cloned(),
            _ => None,
        })
    }

    fn with_element_mut(&self, op: &str, f: impl FnOnce(&mut super::tree::ElementData)) {
        let mut tree = self.doc.tree.borrow_mut();
        match &mut tree.nodes[self.id].data {
            NodeData::Element(element) => f(element),
            _ => warn!(node = ?self.id, op, "element operation on a non-element node"),
        }
    }

    // =========================================================================
    // Events
    // =========================================================================

    pub fn add_event_listener(
        &self,
        event: &str,
        listener: impl Fn(&DomEvent) + 'static,
    ) -> ListenerId {
        let mut tree = self.doc.tree.borrow_mut();
        let id = tree.next_listener_id();
        tree.nodes[self.id]
            .listeners
            .push((id, event.to_string(), Rc::new(listener)));
        id
    }

    pub fn remove_event_listener(&self, listener: ListenerId) {
        self.doc.tree.borrow_mut().nodes[self.id]
            .listeners
            .retain(|(id, _, _)| *id != listener);
    }

    /// Deliver an event to this node's listeners. Returns how many ran.
    pub fn dispatch_event(&self, name: &str, detail: Value) -> usize {
        let listeners: Vec<_> = self.with(|entry| {
            entry
                .listeners
                .iter()
                .filter(|(_, event, _)| event == name)
                .map(|(_, _, listener)| Rc::clone(listener))
                .collect()
        });
        let event = DomEvent {
            name: name.to_string(),
            target: self.clone(),
            detail,
        };
        for listener in &listeners {
            listener(&event);
        }
        listeners.len()
    }

    /// Stream of `name` events on this node. Each subscription registers its
    /// own listener and removes it on unsubscribe.
    pub fn events(&self, name: &str) -> Stream<DomEvent> {
        let node = self.clone();
        let name = name.to_string();
        Stream::new(move |observer: Observer<DomEvent>| {
            let id = node.add_event_listener(&name, move |event| observer.next(event.clone()));
            let tree = Rc::downgrade(&node.doc.tree);
            let target = node.id;
            Subscription::new(move || {
                let Some(tree) = tree.upgrade() else { return };
                // The node may already be freed, taking its listeners along.
                if let Some(entry) = tree.borrow_mut().nodes.get_mut(target) {
                    entry.listeners.retain(|(other, _, _)| *other != id);
                }
            })
        })
    }

    // =========================================================================
    // Serialization
    // =========================================================================

    /// Serialize this node and its descendants. Properties and listeners
    /// are not part of markup.
    pub fn to_markup(&self) -> String {
        let tree = self.doc.tree.borrow();
        let mut out = String::new();
        write_markup(&tree.nodes, self.id, &mut out);
        out
    }
}

fn attribute_name(namespace: Option<&str>, name: &str) -> AttributeName {
    AttributeName {
        namespace: namespace.map(str::to_string),
        name: name.to_string(),
    }
}

type Nodes = slotmap::SlotMap<NodeId, NodeEntry>;

fn collect_text(nodes: &Nodes, id: NodeId, out: &mut String) {
    let entry = &nodes[id];
    if let NodeData::Text(text) = &entry.data {
        out.push_str(text);
    }
    let mut cursor = entry.first_child;
    while let Some(child) = cursor {
        collect_text(nodes, child, out);
        cursor = nodes[child].next;
    }
}

fn write_markup(nodes: &Nodes, id: NodeId, out: &mut String) {
    let entry = &nodes[id];
    match &entry.data {
        NodeData::Text(text) => escape_into(text, false, out),
        NodeData::Comment(text) => {
            out.push_str("<!--");
            out.push_str(text);
            out.push_str("-->");
        }
        NodeData::Fragment => write_children(nodes, entry, out),
        NodeData::Element(element) => {
            out.push('<');
            out.push_str(&element.tag);
            for (key, value) in &element.attributes {
                out.push(' ');
                out.push_str(&key.name);
                out.push_str("=\"");
                escape_into(value, true, out);
                out.push('"');
            }
            out.push('>');
            write_children(nodes, entry, out);
            out.push_str("</");
            out.push_str(&element.tag);
            out.push('>');
        }
    }
}

fn write_children(nodes: &Nodes, entry: &NodeEntry, out: &mut String) {
    let mut cursor = entry.first_child;
    while let Some(child) = cursor {
        write_markup(nodes, child, out);
        cursor = nodes[child].next;
    }
}

fn escape_into(text: &str, attribute: bool, out: &mut String) {
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if attribute => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
}
