//! # Action Streams
//!
//! An [`ActionStream`] is how local user actions (a selection change, an
//! inserted item) join the stream graph without a round trip.
//!
//! The owner keeps the `ActionStream` private and hands out only
//! [`stream()`](ActionStream::stream), a plain [`Stream`] with no way to write.
//! Only the holder of the `ActionStream` can call [`emit`](ActionStream::emit).

use crate::stream::{Stream, Subscriber};
use std::cell::RefCell;
use std::rc::Rc;
use tracing::trace;

struct ActionState<T> {
    current: Option<T>,
    subscribers: Vec<(u64, Subscriber<T>)>,
    next_id: u64,
}

/// A stream fed by explicit `emit` calls that replays its latest value.
///
/// New subscribers receive the current value (if any) first, then every later
/// emission. Only the single latest value is replayed, never older history.
pub struct ActionStream<T> {
    state: Rc<RefCell<ActionState<T>>>,
}

impl<T> Clone for ActionStream<T> {
    fn clone(&self) -> Self {
        Self {
            state: self.state.clone(),
        }
    }
}

impl<T: Clone + 'static> Default for ActionStream<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + 'static> ActionStream<T> {
    /// Creates an action stream with no value yet.
    pub fn new() -> Self {
        Self::from_current(None)
    }

    /// Creates an action stream whose subscribers first see `initial`.
    pub fn with_initial(initial: T) -> Self {
        Self::from_current(Some(initial))
    }

    fn from_current(current: Option<T>) -> Self {
        Self {
            state: Rc::new(RefCell::new(ActionState {
                current,
                subscribers: Vec::new(),
                next_id: 0,
            })),
        }
    }

    /// Stores `value` and delivers it to every current subscriber before returning.
    pub fn emit(&self, value: T) {
        let targets: Vec<Subscriber<T>> = {
            let mut state = self.state.borrow_mut();
            state.current = Some(value.clone());
            state.subscribers.iter().map(|(_, s)| s.clone()).collect()
        };
        trace!(subscribers = targets.len(), "emit");
        for target in targets {
            target.next(value.clone());
        }
    }

    /// The value a new subscriber would receive first.
    pub fn value(&self) -> Option<T> {
        self.state.borrow().current.clone()
    }

    /// Number of live subscribers.
    pub fn observers(&self) -> usize {
        self.state.borrow().subscribers.len()
    }

    /// The read-only view handed to consumers.
    pub fn stream(&self) -> Stream<T> {
        let state = Rc::downgrade(&self.state);
        Stream::new(move |subscriber: Subscriber<T>| {
            let Some(state) = state.upgrade() else {
                subscriber.complete();
                return;
            };
            let (id, current) = {
                let mut state = state.borrow_mut();
                let id = state.next_id;
                state.next_id += 1;
                state.subscribers.push((id, subscriber.clone()));
                (id, state.current.clone())
            };
            let registry = Rc::downgrade(&state);
            subscriber.add_teardown(move || {
                if let Some(state) = registry.upgrade() {
                    state.borrow_mut().subscribers.retain(|(other, _)| *other != id);
                }
            });
            if let Some(value) = current {
                subscriber.next(value);
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(stream: &Stream<i32>) -> (Rc<RefCell<Vec<i32>>>, crate::Subscription) {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        let subscription = stream.for_each(move |v| sink.borrow_mut().push(v));
        (seen, subscription)
    }

    #[test]
    fn test_initial_value_then_latest_for_late_joiner() {
        let selection = ActionStream::with_initial(0);
        let (a, _sub_a) = record(&selection.stream());
        assert_eq!(*a.borrow(), vec![0]);

        selection.emit(3);
        let (b, _sub_b) = record(&selection.stream());
        assert_eq!(*a.borrow(), vec![0, 3]);
        assert_eq!(*b.borrow(), vec![3]);
    }

    #[test]
    fn test_no_initial_value_means_no_replay() {
        let inserted = ActionStream::new();
        let (seen, _subscription) = record(&inserted.stream());
        assert!(seen.borrow().is_empty());
        inserted.emit(5);
        assert_eq!(*seen.borrow(), vec![5]);
    }

    #[test]
    fn test_value_tracks_latest_emission() {
        let inserted = ActionStream::new();
        assert_eq!(inserted.value(), None);
        inserted.emit(vec![1]);
        inserted.emit(vec![1, 2]);
        assert_eq!(inserted.value(), Some(vec![1, 2]));
    }

    #[test]
    fn test_dispose_unregisters_subscriber() {
        let action = ActionStream::new();
        let (seen, subscription) = record(&action.stream());
        assert_eq!(action.observers(), 1);
        subscription.dispose();
        assert_eq!(action.observers(), 0);
        action.emit(1);
        assert!(seen.borrow().is_empty());
    }

    #[test]
    fn test_stream_view_completes_once_owner_is_gone() {
        let view = {
            let action = ActionStream::with_initial(1);
            action.stream()
        };
        let done = Rc::new(RefCell::new(false));
        let flag = done.clone();
        let _subscription = view.subscribe(move |event| {
            if event.is_terminal() {
                *flag.borrow_mut() = true;
            }
        });
        assert!(*done.borrow());
    }
}
