//! Control Flow Primitives - Regions whose content follows a stream.
//!
//! This module provides the dynamic primitives:
//! - [`stream`] - Replacement region: each emission replaces the content
//! - [`ordered_list`] - Keyed list: each emission patches the content
//!
//! # Pattern: Marker-delimited Regions
//!
//! Both primitives own a span of the document between two empty comment
//! markers. The markers are created inside a private fragment, so a region
//! can be filled before it is inserted anywhere. The region keeps that
//! fragment and moves its span back into it whenever it is extracted:
//!
//! ```text
//! <!----> ...content... <!---->
//!  start                  end
//! ```
//!
//! Content is always inserted before `end` (or before another piece of
//! content), and cleared by removing everything strictly between the
//! markers.
//!
//! # Pattern: Destroy-scoped Content
//!
//! Every rendering gets its own [`Trigger`](crate::signals::Trigger) and a
//! child [`Scope`](crate::node::Scope) whose destroy fires on that trigger
//! or the region's own destroy, whichever comes first. Replacing or removing
//! content fires its trigger, which ends every subscription made while
//! creating it.
//!
//! # Component Lifecycle
//!
//! ## stream()
//! - Emission: new content created under a fresh scope, then swapped in
//! - Old content: its trigger fires after the new content is ready
//! - Creation failure: logged, new scope torn down, old content stays
//!
//! ## ordered_list()
//! - Items tracked by key (from `identify`)
//! - New keys: render + insert at position
//! - Existing keys: same descriptor, new value through its item stream
//! - Removed keys: item destroy fires once, content removed

mod each;
mod replace;

pub use each::{OrderedListNode, ordered_list};
pub use replace::{StreamNode, named_stream, stream};

use crate::dom::{Document, DomNode};

// =============================================================================
// Region
// =============================================================================

/// A span of the document between two marker nodes.
#[derive(Debug, Clone)]
pub struct Region {
    start: DomNode,
    end: DomNode,
    home: DomNode,
}

impl Region {
    /// Create markers inside a fresh fragment.
    pub(crate) fn new(document: &Document) -> Self {
        let home = document.create_document_fragment();
        let start = document.create_comment("");
        let end = document.create_comment("");
        home.append_child(&start);
        home.append_child(&end);
        Self { start, end, home }
    }

    pub fn start(&self) -> &DomNode {
        &self.start
    }

    pub fn end(&self) -> &DomNode {
        &self.end
    }

    /// The node content is inserted into.
    pub fn parent(&self) -> Option<DomNode> {
        self.end.parent()
    }

    fn document(&self) -> &Document {
        self.start.document()
    }

    /// The region's own fragment, holding the markers and everything
    /// between them. Extracting never allocates.
    pub fn extract_contents(&self) -> DomNode {
        match self.start.parent() {
            Some(parent) if parent == self.home => {}
            Some(_) => self.document().move_range(&self.start, &self.end, &self.home),
            None => {
                self.home.append_child(&self.start);
                self.home.append_child(&self.end);
            }
        }
        self.home.clone()
    }

    /// Take the markers and content out of the document.
    pub fn delete_contents(&self) {
        if self.start.parent().is_some() {
            self.extract_contents();
        }
    }

    /// Remove everything strictly between the markers.
    pub fn clear(&self) {
        if self.start.next_sibling().as_ref() != Some(&self.end) {
            self.document().delete_between(&self.start, &self.end);
        }
    }

    /// Insert `content` just before the end marker.
    pub fn insert_content(&self, content: &DomNode) {
        if let Some(parent) = self.parent() {
            parent.insert_before(content, Some(&self.end));
        }
    }

    pub fn before_node(&self) -> DomNode {
        self.start.clone()
    }

    pub fn next_sibling_node(&self) -> Option<DomNode> {
        self.end.next_sibling()
    }

    /// Nodes strictly between the markers.
    pub fn content_nodes(&self) -> Vec<DomNode> {
        let mut nodes = Vec::new();
        let mut cursor = self.start.next_sibling();
        while let Some(node) = cursor {
            if node == self.end {
                break;
            }
            cursor = node.next_sibling();
            nodes.push(node);
        }
        nodes
    }
}
