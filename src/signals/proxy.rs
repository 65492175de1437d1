//! Proxy streams: create a stream now, attach its source later.
//!
//! Components use proxies for *feedback* inputs: the component reads the
//! proxy as an input while its own output, created afterwards, becomes the
//! proxy's source.

use std::cell::Cell;
use std::rc::Rc;

use tracing::warn;

use super::stream::{Event, Stream};
use super::subject::Subject;

/// A stream whose source is attached after creation.
pub struct Proxy<T> {
    subject: Subject<T>,
    attached: Rc<Cell<bool>>,
}

impl<T> Clone for Proxy<T> {
    fn clone(&self) -> Self {
        Self {
            subject: self.subject.clone(),
            attached: Rc::clone(&self.attached),
        }
    }
}

impl<T: Clone + 'static> Default for Proxy<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + 'static> Proxy<T> {
    pub fn new() -> Self {
        Self {
            subject: Subject::replaying(),
            attached: Rc::new(Cell::new(false)),
        }
    }

    /// The proxied stream. Late subscribers receive the latest value.
    pub fn stream(&self) -> Stream<T> {
        self.subject.stream()
    }

    pub fn is_attached(&self) -> bool {
        self.attached.get()
    }

    /// Feed `source` into the proxy until `until` emits.
    ///
    /// A proxy accepts one source; attaching again is ignored with a warning
    /// and returns `false`.
    pub fn attach<S: Clone + 'static>(&self, source: &Stream<T>, until: &Stream<S>) -> bool {
        if self.attached.replace(true) {
            warn!("proxy already has a source; ignoring second attach");
            return false;
        }
        let subject = self.subject.clone();
        source.until(until).observe_events(move |event| match event {
            Event::End => {}
            other => subject.emit(other),
        });
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signals::Trigger;
    use std::cell::RefCell;

    #[test]
    fn test_values_flow_after_attach() {
        let proxy = Proxy::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let seen_clone = seen.clone();
        proxy.stream().observe(move |v| seen_clone.borrow_mut().push(v));

        let source = Subject::new();
        let destroy = Trigger::new();
        assert!(proxy.attach(&source.stream(), &destroy.signal()));

        source.next(1);
        destroy.fire();
        source.next(2);

        assert_eq!(*seen.borrow(), vec![1]);
    }

    #[test]
    fn test_second_attach_is_rejected() {
        let proxy = Proxy::<i32>::new();
        let never = Stream::<()>::never();
        assert!(proxy.attach(&Stream::never(), &never));
        assert!(!proxy.attach(&Stream::never(), &never));
    }
}
