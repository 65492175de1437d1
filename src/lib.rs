//! # stream-dom
//!
//! Reactive document rendering for Rust.
//!
//! Built on a small push-based stream layer ([`signals`]): every dynamic
//! value is a [`Stream`](signals::Stream), and every subscription is scoped
//! to a `destroy` signal.
//!
//! ## Architecture
//!
//! stream-dom separates *declarations* from *descriptors*. A declaration is
//! an inert description of a node; creating it under a [`Scope`](node::Scope)
//! builds document nodes and returns a descriptor that owns them.
//!
//! ```text
//! NodeDeclaration → create(scope) → NodeDescriptor → insert/remove in Document
//! ```
//!
//! Dynamic content lives in regions between two marker comments:
//! - `stream` regions replace their content on every emission
//! - `ordered_list` regions reconcile keyed items in one pass per emission
//!
//! ## Modules
//!
//! - [`signals`] - Streams, subjects, triggers, proxies, scheduler
//! - [`dom`] - Arena-backed in-memory document
//! - [`engine`] - Linked record list and keyed index used by list regions
//! - [`node`] - Declarations, descriptors, creation scope
//! - [`primitives`] - `element`, `text`, `stream`, `ordered_list`, `component`
//! - [`pipeline`] - `mount` and the root lifecycle
//! - [`config`] - Namespace table and the per-document [`Context`]
//! - [`types`] - Shared types ([`Bound`], [`NodeKind`], [`PatchSummary`])

pub mod config;
pub mod dom;
pub mod engine;
pub mod error;
pub mod node;
pub mod pipeline;
pub mod primitives;
pub mod signals;
pub mod types;

// Re-export commonly used items
pub use types::*;

pub use config::{
    Config, Context, HTML_NAMESPACE_URI, MATHML_NAMESPACE_URI, SVG_NAMESPACE_URI,
    XLINK_NAMESPACE_URI,
};

pub use error::{Error, Result};

pub use dom::{Document, DomEvent, DomNode, NodeType};

pub use node::{Exposed, ExposedElement, NodeDeclaration, NodeDescriptor, Scope};

pub use pipeline::{MountHandle, MountSource, mount};

pub use primitives::{
    ComponentFactory, ComponentProps, ElementProps, FieldKind, Input, InputValue, NamedNodes,
    Outputs, component, element, named_stream, ordered_list, stream, text,
};

pub use signals::{Event, Proxy, Scheduler, Stream, StreamError, Subject, Subscription, Trigger};
