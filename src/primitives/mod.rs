//! Node Primitives - Declaration building blocks.
//!
//! This module provides the declaration constructors:
//! - [`element`] - Namespaced element with attributes, properties and children
//! - [`text`] - Text node
//! - [`stream`] - Region replaced by every emission of a stream
//! - [`ordered_list`] - Keyed list region patched by every emission
//! - [`component`] - Instance of a reusable [`ComponentFactory`]
//!
//! # Architecture
//!
//! Every constructor returns a [`NodeDeclaration`](crate::node::NodeDeclaration):
//! an inert description that can be created any number of times. Creating
//! one under a [`Scope`](crate::node::Scope):
//! 1. Builds document nodes in the scope's document
//! 2. Binds reactive values until the scope's destroy fires
//! 3. Returns a [`NodeDescriptor`](crate::node::NodeDescriptor) for the result
//!
//! # Reactivity
//!
//! Values can be:
//! - Constants: `.attr("class", "active")`
//! - Streams: `.attr("class", Bound::Reactive(class_stream))`
//!
//! Streams stay bound; pass the stream itself rather than a value read
//! from it:
//!
//! ```ignore
//! // CORRECT - follows every emission
//! element("p", ElementProps::default().attr("class", Bound::Reactive(class)));
//!
//! // WRONG - applies one snapshot
//! element("p", ElementProps::default().attr("class", class_subject.latest().unwrap()));
//! ```

mod component;
mod control_flow;
mod element;
mod text;

pub use component::{
    ComponentFactory, ComponentNode, ComponentProps, FieldKind, Input, InputValue, NamedNodes,
    Outputs, component,
};
pub use control_flow::{OrderedListNode, Region, StreamNode, named_stream, ordered_list, stream};
pub use element::{Attribute, ElementNode, ElementProps, Property, element};
pub use text::{TextNode, text};
