//! Node descriptors.
//!
//! A descriptor is the live counterpart of a declaration: it owns the
//! document nodes it created and knows how to move, remove and locate
//! them. The set of descriptor kinds is closed.

use std::fmt;
use std::rc::Rc;

use crate::dom::{DomEvent, DomNode};
use crate::primitives::{ComponentNode, ElementNode, OrderedListNode, Outputs, StreamNode, TextNode};
use crate::signals::Stream;
use crate::types::NodeKind;

// =============================================================================
// Exposed interfaces
// =============================================================================

/// A named element as seen from its component.
#[derive(Debug, Clone, PartialEq)]
pub struct ExposedElement {
    node: DomNode,
}

impl ExposedElement {
    pub(crate) fn new(node: DomNode) -> Self {
        Self { node }
    }

    pub fn node(&self) -> &DomNode {
        &self.node
    }

    /// Events named `event` dispatched on the element.
    pub fn on(&self, event: &str) -> Stream<DomEvent> {
        self.node.events(event)
    }
}

/// What a descriptor exposes to an enclosing component.
#[derive(Clone)]
pub enum Exposed {
    Element(ExposedElement),
    Outputs(Outputs),
}

impl Exposed {
    pub fn as_element(&self) -> Option<&ExposedElement> {
        match self {
            Exposed::Element(element) => Some(element),
            Exposed::Outputs(_) => None,
        }
    }

    pub fn as_outputs(&self) -> Option<&Outputs> {
        match self {
            Exposed::Outputs(outputs) => Some(outputs),
            Exposed::Element(_) => None,
        }
    }
}

impl fmt::Debug for Exposed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Exposed::Element(element) => f.debug_tuple("Element").field(element).finish(),
            Exposed::Outputs(outputs) => f
                .debug_tuple("Outputs")
                .field(&outputs.keys().collect::<Vec<_>>())
                .finish(),
        }
    }
}

// =============================================================================
// NodeDescriptor
// =============================================================================

/// A created node.
#[derive(Clone)]
pub enum NodeDescriptor {
    Element(Rc<ElementNode>),
    Text(Rc<TextNode>),
    Stream(Rc<StreamNode>),
    OrderedList(Rc<OrderedListNode>),
    Component(Rc<ComponentNode>),
}

impl fmt::Debug for NodeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeDescriptor")
            .field("kind", &self.kind())
            .field("name", &self.name())
            .finish()
    }
}

impl NodeDescriptor {
    pub fn kind(&self) -> NodeKind {
        match self {
            NodeDescriptor::Element(_) => NodeKind::Element,
            NodeDescriptor::Text(_) => NodeKind::Text,
            NodeDescriptor::Stream(_) => NodeKind::Stream,
            NodeDescriptor::OrderedList(_) => NodeKind::OrderedList,
            NodeDescriptor::Component(_) => NodeKind::Component,
        }
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            NodeDescriptor::Element(node) => node.name(),
            NodeDescriptor::Text(_) => None,
            NodeDescriptor::Stream(node) => node.name(),
            NodeDescriptor::OrderedList(node) => node.name(),
            NodeDescriptor::Component(node) => node.name(),
        }
    }

    /// Elements expose their node, components their outputs.
    pub fn expose(&self) -> Option<Exposed> {
        match self {
            NodeDescriptor::Element(node) => {
                Some(Exposed::Element(ExposedElement::new(node.node().clone())))
            }
            NodeDescriptor::Component(node) => Some(Exposed::Outputs(node.outputs().clone())),
            _ => None,
        }
    }

    /// Insert this descriptor's content into `parent` before `before`, or
    /// at the end.
    pub fn insert(&self, parent: &DomNode, before: Option<&DomNode>) {
        parent.insert_before(&self.extract_contents(), before);
    }

    /// Take this descriptor's content out of the document.
    pub fn remove(&self) {
        match self {
            NodeDescriptor::Element(node) => node.node().detach(),
            NodeDescriptor::Text(node) => node.node().detach(),
            NodeDescriptor::Stream(node) => node.region().delete_contents(),
            NodeDescriptor::OrderedList(node) => node.region().delete_contents(),
            NodeDescriptor::Component(node) => node.root().remove(),
        }
    }

    /// First document node of this descriptor, usable as an insert anchor.
    pub fn before_node(&self) -> DomNode {
        match self {
            NodeDescriptor::Element(node) => node.node().clone(),
            NodeDescriptor::Text(node) => node.node().clone(),
            NodeDescriptor::Stream(node) => node.region().before_node(),
            NodeDescriptor::OrderedList(node) => node.region().before_node(),
            NodeDescriptor::Component(node) => node.root().before_node(),
        }
    }

    /// Document node just after this descriptor's span.
    pub fn next_sibling_node(&self) -> Option<DomNode> {
        match self {
            NodeDescriptor::Element(node) => node.node().next_sibling(),
            NodeDescriptor::Text(node) => node.node().next_sibling(),
            NodeDescriptor::Stream(node) => node.region().next_sibling_node(),
            NodeDescriptor::OrderedList(node) => node.region().next_sibling_node(),
            NodeDescriptor::Component(node) => node.root().next_sibling_node(),
        }
    }

    /// A node or fragment holding this descriptor's whole content, ready to
    /// be inserted elsewhere.
    pub fn extract_contents(&self) -> DomNode {
        match self {
            NodeDescriptor::Element(node) => node.node().clone(),
            NodeDescriptor::Text(node) => node.node().clone(),
            NodeDescriptor::Stream(node) => node.region().extract_contents(),
            NodeDescriptor::OrderedList(node) => node.region().extract_contents(),
            NodeDescriptor::Component(node) => node.root().extract_contents(),
        }
    }

    /// Direct children: element children, a region's current content, list
    /// items in order, or a component's root.
    pub fn child_descriptors(&self) -> Vec<NodeDescriptor> {
        match self {
            NodeDescriptor::Element(node) => node.children().to_vec(),
            NodeDescriptor::Text(_) => Vec::new(),
            NodeDescriptor::Stream(node) => node.child_descriptors(),
            NodeDescriptor::OrderedList(node) => node.item_descriptors(),
            NodeDescriptor::Component(node) => vec![node.root().clone()],
        }
    }

    /// Whether both handles refer to the same descriptor instance.
    pub fn ptr_eq(&self, other: &NodeDescriptor) -> bool {
        match (self, other) {
            (NodeDescriptor::Element(a), NodeDescriptor::Element(b)) => Rc::ptr_eq(a, b),
            (NodeDescriptor::Text(a), NodeDescriptor::Text(b)) => Rc::ptr_eq(a, b),
            (NodeDescriptor::Stream(a), NodeDescriptor::Stream(b)) => Rc::ptr_eq(a, b),
            (NodeDescriptor::OrderedList(a), NodeDescriptor::OrderedList(b)) => Rc::ptr_eq(a, b),
            (NodeDescriptor::Component(a), NodeDescriptor::Component(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }

    pub fn as_element(&self) -> Option<&Rc<ElementNode>> {
        match self {
            NodeDescriptor::Element(node) => Some(node),
            _ => None,
        }
    }

    pub fn as_ordered_list(&self) -> Option<&Rc<OrderedListNode>> {
        match self {
            NodeDescriptor::OrderedList(node) => Some(node),
            _ => None,
        }
    }

    pub fn as_component(&self) -> Option<&Rc<ComponentNode>> {
        match self {
            NodeDescriptor::Component(node) => Some(node),
            _ => None,
        }
    }
}
