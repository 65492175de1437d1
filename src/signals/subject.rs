//! Hot sources: [`Subject`] and the one-shot [`Trigger`].

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use super::stream::{Event, Observer, Stream, StreamError};
use super::subscription::Subscription;

// =============================================================================
// Subject
// =============================================================================

struct Entry<T> {
    observer: Observer<T>,
    active: Cell<bool>,
}

struct SubjectState<T> {
    observers: Vec<(u64, Rc<Entry<T>>)>,
    next_id: u64,
    ended: bool,
    replay: bool,
    latest: Option<T>,
}

/// A multicast source that values are pushed into.
///
/// Emission works on a snapshot of the current observers, so observers may
/// subscribe or unsubscribe from inside a callback. An observer that is
/// unsubscribed mid-emission receives nothing further.
pub struct Subject<T> {
    state: Rc<RefCell<SubjectState<T>>>,
}

impl<T> Clone for Subject<T> {
    fn clone(&self) -> Self {
        Self {
            state: Rc::clone(&self.state),
        }
    }
}

impl<T: Clone + 'static> Default for Subject<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + 'static> Subject<T> {
    /// A subject that only delivers values emitted after subscription.
    pub fn new() -> Self {
        Self::with_replay(false)
    }

    /// A subject that replays its latest value to new subscribers.
    pub fn replaying() -> Self {
        Self::with_replay(true)
    }

    fn with_replay(replay: bool) -> Self {
        Self {
            state: Rc::new(RefCell::new(SubjectState {
                observers: Vec::new(),
                next_id: 0,
                ended: false,
                replay,
                latest: None,
            })),
        }
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

    pub fn emit(&self, event: Event<T>) {
        let (observers, ended) = {
            let mut state = self.state.borrow_mut();
            if state.ended {
                return;
            }
            match &event {
                Event::Next(value) if state.replay => state.latest = Some(value.clone()),
                Event::End => state.ended = true,
                _ => {}
            }
            let observers: Vec<Rc<Entry<T>>> =
                state.observers.iter().map(|(_, entry)| Rc::clone(entry)).collect();
            (observers, state.ended)
        };

        for entry in observers {
            if entry.active.get() {
                entry.observer.emit(event.clone());
            }
        }

        if ended {
            let released = std::mem::take(&mut self.state.borrow_mut().observers);
            drop(released);
        }
    }

    pub fn is_ended(&self) -> bool {
        self.state.borrow().ended
    }

    /// Latest value, for replaying subjects.
    pub fn latest(&self) -> Option<T> {
        self.state.borrow().latest.clone()
    }

    pub fn observer_count(&self) -> usize {
        self.state.borrow().observers.len()
    }

    pub fn stream(&self) -> Stream<T> {
        let state = Rc::clone(&self.state);
        Stream::new(move |observer: Observer<T>| {
            let (entry, id, replayed) = {
                let mut inner = state.borrow_mut();
                if inner.ended {
                    let latest = inner.latest.clone();
                    drop(inner);
                    if let Some(value) = latest {
                        observer.next(value);
                    }
                    observer.end();
                    return Subscription::empty();
                }
                let id = inner.next_id;
                inner.next_id += 1;
                let entry = Rc::new(Entry {
                    observer: observer.clone(),
                    active: Cell::new(true),
                });
                inner.observers.push((id, Rc::clone(&entry)));
                let replayed = if inner.replay { inner.latest.clone() } else { None };
                (entry, id, replayed)
            };

            if let Some(value) = replayed {
                if entry.active.get() {
                    observer.next(value);
                }
            }

            let weak = Rc::downgrade(&state);
            Subscription::new(move || {
                entry.active.set(false);
                if let Some(state) = weak.upgrade() {
                    state.borrow_mut().observers.retain(|(other, _)| *other != id);
                }
            })
        })
    }
}

// =============================================================================
// Trigger
// =============================================================================

/// A one-shot, replaying signal.
///
/// [`fire`](Trigger::fire) emits once and ends; later calls are no-ops.
/// Subscribers arriving after the trigger fired still see the emission, so a
/// trigger can stand in for both the `mounted` signal (replayable) and the
/// `destroy` signal (terminal).
#[derive(Clone)]
pub struct Trigger {
    subject: Subject<()>,
    fired: Rc<Cell<bool>>,
}

impl Trigger {
    pub fn new() -> Self {
        Self {
            subject: Subject::replaying(),
            fired: Rc::new(Cell::new(false)),
        }
    }

    pub fn fire(&self) {
        if self.fired.replace(true) {
            return;
        }
        self.subject.next(());
        self.subject.end();
    }

    pub fn is_fired(&self) -> bool {
        self.fired.get()
    }

    pub fn signal(&self) -> Stream<()> {
        self.subject.stream()
    }
}

impl Default for Trigger {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Trigger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Trigger").field("fired", &self.is_fired()).finish()
    }
}
