//! Text Primitive - A single immutable text node.
//!
//! Text content is fixed at creation. Content that changes over time is a
//! stream region whose emissions are text declarations:
//!
//! ```ignore
//! use stream_dom::primitives::{stream, text};
//!
//! // Static text
//! let hello = text("Hello, World!");
//!
//! // Changing text: each emission replaces the previous node
//! let count = counter.map(|n| vec![text(format!("Count: {n}"))]);
//! let label = stream(count);
//! ```

use std::rc::Rc;

use crate::dom::DomNode;
use crate::error::Result;
use crate::node::{NodeDeclaration, NodeDescriptor, Scope};
use crate::types::NodeKind;

// =============================================================================
// Text Node
// =============================================================================

/// Descriptor for a text node.
#[derive(Debug)]
pub struct TextNode {
    node: DomNode,
}

impl TextNode {
    pub fn node(&self) -> &DomNode {
        &self.node
    }
}

/// Declare a text node.
pub fn text(content: impl Into<String>) -> NodeDeclaration {
    NodeDeclaration::new(NodeKind::Text, create_text_node, content.into())
}

fn create_text_node(scope: &Scope, content: &String) -> Result<NodeDescriptor> {
    let node = scope.document().create_text_node(content);
    Ok(NodeDescriptor::Text(Rc::new(TextNode { node })))
}

impl From<&str> for NodeDeclaration {
    fn from(content: &str) -> Self {
        text(content)
    }
}

impl From<String> for NodeDeclaration {
    fn from(content: String) -> Self {
        text(content)
    }
}
