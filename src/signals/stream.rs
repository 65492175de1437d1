//! Push streams with explicit subscription.
//!
//! A [`Stream<T>`] is a subscribe function: handing it an [`Observer`]
//! starts delivery and returns a [`Subscription`] that stops it. Streams are
//! cold unless shared through [`Stream::multicast`] or [`Stream::hold`], or
//! produced by a [`Subject`](super::Subject).
//!
//! # Events
//!
//! - `Next(value)` delivers a value.
//! - `Error(err)` reports a failure. It is **not** terminal: a binding that
//!   sees an error logs it and keeps its last good value.
//! - `End` completes the stream. Nothing is delivered after `End`.
//!
//! # Scoping
//!
//! [`Stream::observe`] keeps its subscription alive until the stream ends.
//! Pair it with [`Stream::until`] and a destroy signal so that every
//! observation ends no later than the node that made it:
//!
//! ```ignore
//! value.skip_repeats().until(scope.destroy()).observe(move |v| apply(v));
//! ```

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use tracing::warn;

use super::scheduler::Scheduler;
use super::subject::Subject;
use super::subscription::{Subscription, SubscriptionSlot};

// =============================================================================
// Events and Observers
// =============================================================================

/// A failure travelling through a stream.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct StreamError {
    message: String,
}

impl StreamError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// One delivery from a stream.
#[derive(Debug, Clone, PartialEq)]
pub enum Event<T> {
    Next(T),
    Error(StreamError),
    End,
}

/// Receiver side of a subscription.
pub struct Observer<T> {
    callback: Rc<dyn Fn(Event<T>)>,
}

impl<T> Clone for Observer<T> {
    fn clone(&self) -> Self {
        Self {
            callback: Rc::clone(&self.callback),
        }
    }
}

impl<T> Observer<T> {
    pub fn new(callback: impl Fn(Event<T>) + 'static) -> Self {
        Self {
            callback: Rc::new(callback),
        }
    }

    pub fn emit(&self, event: Event<T>) {
        (self.callback)(event);
    }

    pub fn next(&self, value: T) {
        self.emit(Event::Next(value));
    }

    pub fn error(&self, error: StreamError) {
        self.emit(Event::Error(error));
    }

    pub fn end(&self) {
        self.emit(Event::End);
    }
}

// =============================================================================
// Stream
// =============================================================================

/// A subscribable source of values.
pub struct Stream<T> {
    subscribe_fn: Rc<dyn Fn(Observer<T>) -> Subscription>,
}

impl<T> Clone for Stream<T> {
    fn clone(&self) -> Self {
        Self {
            subscribe_fn: Rc::clone(&self.subscribe_fn),
        }
    }
}

impl<T> fmt::Debug for Stream<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Stream").finish_non_exhaustive()
    }
}

impl<T: Clone + 'static> Stream<T> {
    /// Build a stream from its subscribe function.
    pub fn new(subscribe: impl Fn(Observer<T>) -> Subscription + 'static) -> Self {
        Self {
            subscribe_fn: Rc::new(subscribe),
        }
    }

    // -------------------------------------------------------------------------
    // Sources
    // -------------------------------------------------------------------------

    /// Emit `value` then end.
    pub fn of(value: T) -> Self {
        Self::new(move |observer| {
            observer.next(value.clone());
            observer.end();
            Subscription::empty()
        })
    }

    /// Emit `value` and never end.
    pub fn constant(value: T) -> Self {
        Self::new(move |observer| {
            observer.next(value.clone());
            Subscription::empty()
        })
    }

    /// Emit every item in order, then end.
    pub fn from_iter(items: impl IntoIterator<Item = T>) -> Self {
        let items: Rc<[T]> = items.into_iter().collect();
        Self::new(move |observer| {
            for item in items.iter() {
                observer.next(item.clone());
            }
            observer.end();
            Subscription::empty()
        })
    }

    /// Never emit, never end.
    pub fn never() -> Self {
        Self::new(|_| Subscription::empty())
    }

    /// End immediately.
    pub fn empty() -> Self {
        Self::new(|observer| {
            observer.end();
            Subscription::empty()
        })
    }

    // -------------------------------------------------------------------------
    // Consuming
    // -------------------------------------------------------------------------

    pub fn subscribe_observer(&self, observer: Observer<T>) -> Subscription {
        (self.subscribe_fn)(observer)
    }

    /// Subscribe with a callback receiving every event.
    pub fn subscribe(&self, on_event: impl Fn(Event<T>) + 'static) -> Subscription {
        self.subscribe_observer(Observer::new(on_event))
    }

    /// Observe every event until the stream ends.
    ///
    /// The subscription keeps itself alive and is released on `End`.
    pub fn observe_events(&self, on_event: impl Fn(Event<T>) + 'static) {
        let slot = SubscriptionSlot::new();
        let slot_for_end = slot.clone();
        let subscription = self.subscribe(move |event| {
            if slot_for_end.is_closed() {
                return;
            }
            let ended = matches!(event, Event::End);
            on_event(event);
            if ended {
                slot_for_end.close();
            }
        });
        slot.fill(subscription);
    }

    /// Observe values until the stream ends. Errors are logged and skipped.
    pub fn observe(&self, on_next: impl Fn(T) + 'static) {
        self.observe_events(move |event| match event {
            Event::Next(value) => on_next(value),
            Event::Error(error) => warn!(%error, "stream error ignored by observer"),
            Event::End => {}
        });
    }

    /// Subscribe and discard all values until the stream ends.
    pub fn drain(&self) {
        self.observe_events(|_| {});
    }

    // -------------------------------------------------------------------------
    // Stateless operators
    // -------------------------------------------------------------------------

    pub fn map<U: Clone + 'static>(&self, f: impl Fn(T) -> U + 'static) -> Stream<U> {
        let f = Rc::new(f);
        self.filter_map(move |value| Some(f(value)))
    }

    pub fn filter(&self, predicate: impl Fn(&T) -> bool + 'static) -> Stream<T> {
        self.filter_map(move |value| predicate(&value).then_some(value))
    }

    pub fn filter_map<U: Clone + 'static>(
        &self,
        f: impl Fn(T) -> Option<U> + 'static,
    ) -> Stream<U> {
        let source = self.clone();
        let f = Rc::new(f);
        Stream::new(move |observer: Observer<U>| {
            let f = Rc::clone(&f);
            source.subscribe(move |event| match event {
                Event::Next(value) => {
                    if let Some(mapped) = f(value) {
                        observer.next(mapped);
                    }
                }
                Event::Error(error) => observer.error(error),
                Event::End => observer.end(),
            })
        })
    }

    /// Run `f` for each value before passing it on.
    pub fn tap(&self, f: impl Fn(&T) + 'static) -> Stream<T> {
        self.filter_map(move |value| {
            f(&value);
            Some(value)
        })
    }

    /// Run `f` when the source ends, before downstream sees `End`.
    pub fn on_end(&self, f: impl Fn() + 'static) -> Stream<T> {
        let source = self.clone();
        let f = Rc::new(f);
        Stream::new(move |observer: Observer<T>| {
            let f = Rc::clone(&f);
            source.subscribe(move |event| {
                if matches!(event, Event::End) {
                    f();
                }
                observer.emit(event);
            })
        })
    }

    // -------------------------------------------------------------------------
    // Stateful operators (state is per subscription)
    // -------------------------------------------------------------------------

    pub fn skip(&self, count: usize) -> Stream<T> {
        let source = self.clone();
        Stream::new(move |observer: Observer<T>| {
            let skipped = Cell::new(0);
            source.subscribe(move |event| match event {
                Event::Next(value) => {
                    if skipped.get() < count {
                        skipped.set(skipped.get() + 1);
                    } else {
                        observer.next(value);
                    }
                }
                other => observer.emit(other),
            })
        })
    }

    /// Deliver at most `count` values, then end and release the source.
    pub fn take(&self, count: usize) -> Stream<T> {
        let source = self.clone();
        Stream::new(move |observer: Observer<T>| {
            if count == 0 {
                observer.end();
                return Subscription::empty();
            }
            let remaining = Cell::new(count);
            let upstream = SubscriptionSlot::new();
            let slot = upstream.clone();
            let subscription = source.subscribe(move |event| {
                if slot.is_closed() {
                    return;
                }
                match event {
                    Event::Next(value) => {
                        let left = remaining.get() - 1;
                        remaining.set(left);
                        observer.next(value);
                        if left == 0 {
                            slot.close();
                            observer.end();
                        }
                    }
                    Event::Error(error) => observer.error(error),
                    Event::End => {
                        slot.close();
                        observer.end();
                    }
                }
            });
            upstream.fill(subscription);
            Subscription::new(move || upstream.close())
        })
    }

    /// Deliver values until `signal` emits, then end.
    ///
    /// The signal is subscribed first: a signal that has already fired (a
    /// replaying trigger) ends the result without subscribing the source.
    pub fn until<S: Clone + 'static>(&self, signal: &Stream<S>) -> Stream<T> {
        let source = self.clone();
        let signal = signal.clone();
        Stream::new(move |observer: Observer<T>| {
            let state = Rc::new(Until {
                observer,
                source: SubscriptionSlot::new(),
                signal: SubscriptionSlot::new(),
                done: Cell::new(false),
            });

            let on_signal = Rc::clone(&state);
            let signal_subscription = signal.subscribe(move |event| {
                if let Event::Next(_) = event {
                    on_signal.finish();
                }
            });
            state.signal.fill(signal_subscription);
            if state.done.get() {
                return Subscription::empty();
            }

            let on_source = Rc::clone(&state);
            let source_subscription = source.subscribe(move |event| {
                if on_source.done.get() {
                    return;
                }
                match event {
                    Event::End => on_source.finish(),
                    other => on_source.observer.emit(other),
                }
            });
            state.source.fill(source_subscription);

            Subscription::new(move || {
                state.done.set(true);
                state.source.close();
                state.signal.close();
            })
        })
    }

    /// Interleave two streams. Ends when both have ended.
    pub fn merge(&self, other: &Stream<T>) -> Stream<T> {
        let sources = [self.clone(), other.clone()];
        Stream::new(move |observer: Observer<T>| {
            let open = Rc::new(Cell::new(sources.len()));
            let mut subscription = Subscription::empty();
            for source in &sources {
                let observer = observer.clone();
                let open = Rc::clone(&open);
                let next = source.subscribe(move |event| match event {
                    Event::End => {
                        open.set(open.get() - 1);
                        if open.get() == 0 {
                            observer.end();
                        }
                    }
                    other => observer.emit(other),
                });
                subscription = subscription.and(next);
            }
            subscription
        })
    }

    /// Re-deliver every event through `scheduler` instead of synchronously.
    pub fn defer(&self, scheduler: &Scheduler) -> Stream<T> {
        let source = self.clone();
        let scheduler = scheduler.clone();
        Stream::new(move |observer: Observer<T>| {
            let active = Rc::new(Cell::new(true));
            let flag = Rc::clone(&active);
            let scheduler = scheduler.clone();
            let upstream = source.subscribe(move |event| {
                let observer = observer.clone();
                let flag = Rc::clone(&flag);
                scheduler.schedule(move || {
                    if flag.get() {
                        observer.emit(event);
                    }
                });
            });
            Subscription::new(move || {
                active.set(false);
                drop(upstream);
            })
        })
    }

    // -------------------------------------------------------------------------
    // Sharing
    // -------------------------------------------------------------------------

    /// Share one upstream subscription among all subscribers.
    pub fn multicast(&self) -> Stream<T> {
        self.share(Subject::new())
    }

    /// Like [`multicast`](Self::multicast), replaying the latest value to
    /// late subscribers.
    pub fn hold(&self) -> Stream<T> {
        self.share(Subject::replaying())
    }

    fn share(&self, subject: Subject<T>) -> Stream<T> {
        let shared = Rc::new(Shared {
            source: self.clone(),
            subject,
            upstream: RefCell::new(None),
            subscribers: Cell::new(0),
        });
        Stream::new(move |observer| {
            let downstream = shared.subject.stream().subscribe_observer(observer);
            shared.subscribers.set(shared.subscribers.get() + 1);
            let connect = shared.subscribers.get() == 1 && shared.upstream.borrow().is_none();
            if connect && !shared.subject.is_ended() {
                let subject = shared.subject.clone();
                let upstream = shared.source.subscribe(move |event| subject.emit(event));
                if shared.subscribers.get() > 0 {
                    shared.upstream.replace(Some(upstream));
                }
            }
            let shared = Rc::clone(&shared);
            Subscription::new(move || {
                drop(downstream);
                let remaining = shared.subscribers.get().saturating_sub(1);
                shared.subscribers.set(remaining);
                if remaining == 0 {
                    let upstream = shared.upstream.borrow_mut().take();
                    drop(upstream);
                }
            })
        })
    }
}

impl<T: Clone + PartialEq + 'static> Stream<T> {
    /// Drop values equal to the one delivered just before.
    pub fn skip_repeats(&self) -> Stream<T> {
        let source = self.clone();
        Stream::new(move |observer: Observer<T>| {
            let last: RefCell<Option<T>> = RefCell::new(None);
            source.subscribe(move |event| match event {
                Event::Next(value) => {
                    let repeat = last.borrow().as_ref() == Some(&value);
                    if !repeat {
                        last.replace(Some(value.clone()));
                        observer.next(value);
                    }
                }
                other => observer.emit(other),
            })
        })
    }
}

// =============================================================================
// Operator state
// =============================================================================

struct Until<T> {
    observer: Observer<T>,
    source: SubscriptionSlot,
    signal: SubscriptionSlot,
    done: Cell<bool>,
}

impl<T> Until<T> {
    fn finish(&self) {
        if self.done.replace(true) {
            return;
        }
        self.source.close();
        self.signal.close();
        self.observer.end();
    }
}

struct Shared<T> {
    source: Stream<T>,
    subject: Subject<T>,
    upstream: RefCell<Option<Subscription>>,
    subscribers: Cell<usize>,
}

// =============================================================================
// Tests
// =============================================================================
