//! Declarations, descriptors and scope.
//!
//! # Lifecycle
//!
//! ```text
//! NodeDeclaration ──create(scope)──▶ NodeDescriptor ──insert──▶ document
//!                                        │
//!                                        └── subscriptions end on scope.destroy()
//! ```
//!
//! Creation runs top-down: a parent creates its children under a scope
//! derived from its own. After that, each reactive binding updates its own
//! part of the document independently; nothing re-renders globally.

mod declaration;
mod descriptor;
mod scope;

pub use declaration::{NodeDeclaration, create_node_descriptors};
pub use descriptor::{Exposed, ExposedElement, NodeDescriptor};
pub use scope::Scope;
