//! Reactive primitives.
//!
//! The renderer needs very little from a reactive runtime: something to
//! subscribe to, a way to stop, and a handful of combinators. This module
//! provides exactly that:
//!
//! - [`Stream`] - a subscribe function with `map`/`filter`/`until`/`merge`/
//!   `take`/`skip_repeats`/`multicast`/`hold`/`defer` combinators
//! - [`Subscription`] - RAII handle that unsubscribes on drop
//! - [`Subject`] - hot multicast source, optionally replaying its latest value
//! - [`Trigger`] - one-shot replaying signal (used for `mounted` and `destroy`)
//! - [`Proxy`] - stream whose source is attached later (component feedback)
//! - [`Scheduler`] - cooperative queue for work deferred past the current pass
//!
//! # Scoping Rule
//!
//! Every observation made while building a node must end no later than the
//! node's destroy signal:
//!
//! ```ignore
//! value.until(scope.destroy()).observe(move |v| apply(v));
//! ```

mod proxy;
mod scheduler;
mod stream;
mod subject;
mod subscription;

pub use proxy::Proxy;
pub use scheduler::Scheduler;
pub use stream::{Event, Observer, Stream, StreamError};
pub use subject::{Subject, Trigger};
pub use subscription::Subscription;
