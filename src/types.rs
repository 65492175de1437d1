//! Core types for stream-dom.
//!
//! These types flow between declarations, descriptors and the reactive
//! layer: which kind of node something is, how a bound value is supplied,
//! and what a list patch did.

use std::fmt;

use crate::signals::Stream;

pub use serde_json::Value;

// =============================================================================
// Node Kind
// =============================================================================

/// The kind of renderable unit behind a declaration or descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Element,
    Text,
    Stream,
    OrderedList,
    Component,
}

impl NodeKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Element => "element",
            NodeKind::Text => "text",
            NodeKind::Stream => "stream",
            NodeKind::OrderedList => "orderedList",
            NodeKind::Component => "component",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Bound - constant or reactive value
// =============================================================================

/// A value supplied either once or as a stream.
///
/// Pass streams straight through; reading a value out of a stream and
/// binding it as a constant loses every later update.
///
/// ```ignore
/// // stays connected
/// ElementProps::default().attr("class", Bound::Reactive(class_stream));
///
/// // applied once
/// ElementProps::default().attr("class", "card");
/// ```
#[derive(Debug, Clone)]
pub enum Bound<T> {
    /// Applied once at creation.
    Constant(T),
    /// Re-applied on every distinct emission until the owner is destroyed.
    Reactive(Stream<T>),
}

impl<T: Clone + PartialEq + 'static> Bound<T> {
    pub fn is_reactive(&self) -> bool {
        matches!(self, Bound::Reactive(_))
    }

    /// Apply a constant now, or every distinct value until `destroy`.
    pub fn bind(&self, destroy: &Stream<()>, apply: impl Fn(T) + 'static) {
        match self {
            Bound::Constant(value) => apply(value.clone()),
            Bound::Reactive(stream) => stream.skip_repeats().until(destroy).observe(apply),
        }
    }
}

impl<T> From<Stream<T>> for Bound<T> {
    fn from(stream: Stream<T>) -> Self {
        Bound::Reactive(stream)
    }
}

impl From<Value> for Bound<Value> {
    fn from(value: Value) -> Self {
        Bound::Constant(value)
    }
}

impl From<&str> for Bound<Value> {
    fn from(value: &str) -> Self {
        Bound::Constant(Value::from(value))
    }
}

impl From<String> for Bound<Value> {
    fn from(value: String) -> Self {
        Bound::Constant(Value::from(value))
    }
}

impl From<bool> for Bound<Value> {
    fn from(value: bool) -> Self {
        Bound::Constant(Value::from(value))
    }
}

impl From<i64> for Bound<Value> {
    fn from(value: i64) -> Self {
        Bound::Constant(Value::from(value))
    }
}

impl From<f64> for Bound<Value> {
    fn from(value: f64) -> Self {
        Bound::Constant(Value::from(value))
    }
}

// =============================================================================
// Patch Summary
// =============================================================================

/// Edit counts for one ordered-list emission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PatchSummary {
    /// Keys rendered for the first time.
    pub created: usize,
    /// Keys already in place that received a new value.
    pub updated: usize,
    /// Keys relinked to a new position.
    pub moved: usize,
    /// Keys that disappeared.
    pub removed: usize,
    /// Items skipped because an earlier item had the same key.
    pub duplicates: usize,
    /// Items whose descriptor could not be created.
    pub failed: usize,
}

impl PatchSummary {
    /// Number of edits that touched the document.
    pub fn structural_edits(&self) -> usize {
        self.created + self.moved + self.removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signals::Subject;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_constant_applies_once() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let seen_clone = seen.clone();
        Bound::from("a").bind(&Stream::never(), move |v| seen_clone.borrow_mut().push(v));

        assert_eq!(*seen.borrow(), vec![Value::from("a")]);
    }

    #[test]
    fn test_reactive_skips_repeats_and_stops_on_destroy() {
        let values = Subject::new();
        let destroy = Subject::<()>::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let seen_clone = seen.clone();

        let bound = Bound::from(values.stream());
        assert!(bound.is_reactive());
        bound.bind(&destroy.stream(), move |v: i32| seen_clone.borrow_mut().push(v));

        values.next(1);
        values.next(1);
        values.next(2);
        destroy.next(());
        values.next(3);

        assert_eq!(*seen.borrow(), vec![1, 2]);
        assert_eq!(values.observer_count(), 0);
    }

    #[test]
    fn test_node_kind_names() {
        assert_eq!(NodeKind::OrderedList.to_string(), "orderedList");
        assert_eq!(NodeKind::Element.as_str(), "element");
    }
}
