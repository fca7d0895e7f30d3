//! # Streams
//!
//! This module defines [`Stream`], the push-based base abstraction every other
//! module builds on, together with the subscriber side of the contract.
//!
//! ## Key Types
//!
//! - [`Stream`]: a cold producer of values. Nothing runs until someone subscribes.
//! - [`Event`]: what a subscriber observes (`Next`, `Error`, `Complete`).
//! - [`Subscriber`]: the producer-facing half of a subscription. Producers push events into it.
//! - [`Subscription`]: the consumer-facing disposable handle.
//!
//! ## Delivery Model
//!
//! Everything runs on one logical thread. A value pushed into a [`Subscriber`] is
//! delivered synchronously, inside the call that produced it. If an event arrives
//! while the same subscriber is still handling a previous one (a handler that
//! indirectly feeds its own source), the event is queued and delivered right after
//! the current handler returns. Order is never changed.
//!
//! Handlers must not call `emit` on an [`ActionStream`](crate::ActionStream) they are
//! currently observing; the queued delivery keeps it safe, but the resulting order
//! across *different* subscribers is unspecified.
//!
//! After `Error` or `Complete` the subscriber is closed: later events are ignored
//! and its teardown logic (usually disposing upstream subscriptions) runs.

use crate::error::StreamError;
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::future::Future;
use std::rc::Rc;
use tracing::trace;

/// A notification delivered to a subscriber.
#[derive(Debug, Clone, PartialEq)]
pub enum Event<T> {
    Next(T),
    Error(StreamError),
    Complete,
}

impl<T> Event<T> {
    /// `Error` and `Complete` end a subscription.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Event::Next(_))
    }
}

type Sink<T> = Box<dyn FnMut(Event<T>)>;
type Teardown = Box<dyn FnOnce()>;

struct SubscriberInner<T> {
    sink: RefCell<Option<Sink<T>>>,
    queue: RefCell<VecDeque<Event<T>>>,
    draining: Cell<bool>,
    stopped: Cell<bool>,
    disposed: Cell<bool>,
    teardowns: RefCell<Vec<Teardown>>,
}

trait Disposable {
    fn dispose(&self);
    fn is_disposed(&self) -> bool;
}

impl<T> Disposable for SubscriberInner<T> {
    fn dispose(&self) {
        if self.disposed.replace(true) {
            return;
        }
        self.stopped.set(true);
        self.queue.borrow_mut().clear();
        // While a handler runs its sink is checked out by the drain loop, so this
        // only drops an idle sink. The drain loop drops a busy one on return.
        let idle = self.sink.borrow_mut().take();
        drop(idle);
        let teardowns = std::mem::take(&mut *self.teardowns.borrow_mut());
        for teardown in teardowns {
            teardown();
        }
    }

    fn is_disposed(&self) -> bool {
        self.disposed.get()
    }
}

/// The producer-facing half of a subscription.
///
/// Producers (stream constructors and operators) receive a `Subscriber` and push
/// events into it. Cloning is cheap; all clones refer to the same subscription.
pub struct Subscriber<T> {
    inner: Rc<SubscriberInner<T>>,
}

impl<T> Clone for Subscriber<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T: 'static> Subscriber<T> {
    /// Creates a subscriber that hands every event to `sink`.
    pub fn new(sink: impl FnMut(Event<T>) + 'static) -> Self {
        Self {
            inner: Rc::new(SubscriberInner {
                sink: RefCell::new(Some(Box::new(sink))),
                queue: RefCell::new(VecDeque::new()),
                draining: Cell::new(false),
                stopped: Cell::new(false),
                disposed: Cell::new(false),
                teardowns: RefCell::new(Vec::new()),
            }),
        }
    }

    pub fn next(&self, value: T) {
        self.push(Event::Next(value));
    }

    pub fn error(&self, error: StreamError) {
        self.push(Event::Error(error));
    }

    pub fn complete(&self) {
        self.push(Event::Complete);
    }

    /// Pushes an already-built event.
    pub fn emit(&self, event: Event<T>) {
        self.push(event);
    }

    /// True once a terminal event was pushed or the subscription was disposed.
    pub fn is_closed(&self) -> bool {
        self.inner.stopped.get()
    }

    /// Registers cleanup to run when this subscription ends.
    ///
    /// Runs immediately if the subscription already ended.
    pub fn add_teardown(&self, teardown: impl FnOnce() + 'static) {
        if self.inner.disposed.get() {
            teardown();
            return;
        }
        self.inner.teardowns.borrow_mut().push(Box::new(teardown));
    }

    /// Ties `subscription` to this subscriber: ending this one disposes it.
    pub fn add(&self, subscription: Subscription) {
        self.add_teardown(move || subscription.dispose());
    }

    #[cfg(test)]
    pub(crate) fn teardown_count(&self) -> usize {
        self.inner.teardowns.borrow().len()
    }

    /// The consumer-facing handle for this subscriber.
    pub fn subscription(&self) -> Subscription {
        Subscription {
            inner: self.inner.clone(),
        }
    }

    fn push(&self, event: Event<T>) {
        let inner = &self.inner;
        if inner.stopped.get() {
            return;
        }
        if event.is_terminal() {
            inner.stopped.set(true);
        }
        inner.queue.borrow_mut().push_back(event);
        if inner.draining.replace(true) {
            trace!("re-entrant event queued");
            return;
        }
        loop {
            let next = inner.queue.borrow_mut().pop_front();
            let Some(event) = next else { break };
            let checked_out = inner.sink.borrow_mut().take();
            let Some(mut sink) = checked_out else { break };
            let terminal = event.is_terminal();
            sink(event);
            if terminal || inner.disposed.get() {
                drop(sink);
                inner.dispose();
                break;
            }
            *inner.sink.borrow_mut() = Some(sink);
        }
        inner.draining.set(false);
    }
}

/// A disposable handle returned by [`Stream::subscribe`].
///
/// Disposing stops all future delivery to that one subscriber and releases
/// whatever the subscription holds upstream. Dropping the handle does **not**
/// dispose it.
#[derive(Clone)]
pub struct Subscription {
    inner: Rc<dyn Disposable>,
}

impl Subscription {
    /// A handle that is already closed.
    pub fn closed() -> Self {
        let subscriber = Subscriber::<()>::new(|_| {});
        subscriber.inner.dispose();
        subscriber.subscription()
    }

    pub fn dispose(&self) {
        self.inner.dispose();
    }

    /// True once the subscription ended, by disposal or by a terminal event.
    pub fn is_closed(&self) -> bool {
        self.inner.is_disposed()
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("closed", &self.is_closed())
            .finish()
    }
}

/// A cold, push-based sequence of values.
///
/// A `Stream` is identity-less: it is only its subscribe contract. Cloning a
/// stream clones the recipe, not any running state; each subscription runs the
/// producer again unless the stream is wrapped by
/// [`share_replay`](Stream::share_replay).
pub struct Stream<T> {
    producer: Rc<dyn Fn(Subscriber<T>)>,
}

impl<T> Clone for Stream<T> {
    fn clone(&self) -> Self {
        Self {
            producer: self.producer.clone(),
        }
    }
}

impl<T: 'static> Stream<T> {
    /// Builds a stream from a producer that runs once per subscription.
    pub fn new(producer: impl Fn(Subscriber<T>) + 'static) -> Self {
        Self {
            producer: Rc::new(producer),
        }
    }

    /// Subscribes `sink` to every event.
    pub fn subscribe(&self, sink: impl FnMut(Event<T>) + 'static) -> Subscription {
        let subscriber = Subscriber::new(sink);
        self.subscribe_with(subscriber.clone());
        subscriber.subscription()
    }

    /// Runs the producer against an existing subscriber. Used by operators.
    pub fn subscribe_with(&self, subscriber: Subscriber<T>) {
        (self.producer)(subscriber);
    }

    /// Subscribes to values only; errors and completion are ignored.
    pub fn for_each(&self, mut on_next: impl FnMut(T) + 'static) -> Subscription {
        self.subscribe(move |event| {
            if let Event::Next(value) = event {
                on_next(value);
            }
        })
    }

    /// Completes immediately without a value.
    pub fn empty() -> Self {
        Self::new(|subscriber| subscriber.complete())
    }

    /// Never emits and never ends.
    pub fn never() -> Self {
        Self::new(|_| {})
    }

    /// Errors immediately.
    pub fn fail(error: StreamError) -> Self {
        Self::new(move |subscriber| subscriber.error(error.clone()))
    }

    /// Runs the future produced by `make` once per subscription and emits its
    /// result, then completes (or errors).
    ///
    /// The future runs as a `tokio::task::spawn_local` task, so subscribing
    /// requires a running [`tokio::task::LocalSet`]. Disposing the subscription
    /// aborts the task; a late result is never delivered.
    pub fn from_future<F, Fut>(make: F) -> Self
    where
        F: Fn() -> Fut + 'static,
        Fut: Future<Output = Result<T, StreamError>> + 'static,
    {
        Self::new(move |subscriber| {
            let future = make();
            let out = subscriber.clone();
            let task = tokio::task::spawn_local(async move {
                match future.await {
                    Ok(value) => {
                        out.next(value);
                        out.complete();
                    }
                    Err(error) => out.error(error),
                }
            });
            subscriber.add_teardown(move || {
                if !task.is_finished() {
                    trace!("aborting in-flight task");
                    task.abort();
                }
            });
        })
    }
}

impl<T: Clone + 'static> Stream<T> {
    /// Emits `value` once, then completes.
    pub fn of(value: T) -> Self {
        Self::new(move |subscriber| {
            subscriber.next(value.clone());
            subscriber.complete();
        })
    }

    /// Emits every item in order, then completes.
    pub fn from_iter(values: impl IntoIterator<Item = T>) -> Self {
        let values: Rc<[T]> = values.into_iter().collect();
        Self::new(move |subscriber| {
            for value in values.iter() {
                if subscriber.is_closed() {
                    return;
                }
                subscriber.next(value.clone());
            }
            subscriber.complete();
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FetchError;

    fn record<T: Clone + 'static>(stream: &Stream<T>) -> (Rc<RefCell<Vec<Event<T>>>>, Subscription) {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        let subscription = stream.subscribe(move |event| sink.borrow_mut().push(event));
        (seen, subscription)
    }

    #[test]
    fn test_from_iter_delivers_in_order_then_completes() {
        let (seen, subscription) = record(&Stream::from_iter(vec![1, 2, 3]));
        assert_eq!(
            *seen.borrow(),
            vec![Event::Next(1), Event::Next(2), Event::Next(3), Event::Complete]
        );
        assert!(subscription.is_closed());
    }

    #[test]
    fn test_nothing_after_terminal_event() {
        let stream = Stream::new(|subscriber: Subscriber<i32>| {
            subscriber.next(1);
            subscriber.error(FetchError::Network("offline".into()).into());
            subscriber.next(2);
            subscriber.complete();
        });
        let (seen, _subscription) = record(&stream);
        assert_eq!(seen.borrow().len(), 2);
        assert!(matches!(seen.borrow()[1], Event::Error(_)));
    }

    #[test]
    fn test_dispose_stops_delivery_and_runs_teardown() {
        let slot: Rc<RefCell<Option<Subscriber<i32>>>> = Rc::new(RefCell::new(None));
        let torn_down = Rc::new(Cell::new(false));
        let stream = {
            let slot = slot.clone();
            let torn_down = torn_down.clone();
            Stream::new(move |subscriber: Subscriber<i32>| {
                let torn_down = torn_down.clone();
                subscriber.add_teardown(move || torn_down.set(true));
                *slot.borrow_mut() = Some(subscriber);
            })
        };
        let (seen, subscription) = record(&stream);
        let producer = slot.borrow().clone().unwrap();

        producer.next(1);
        subscription.dispose();
        producer.next(2);

        assert_eq!(*seen.borrow(), vec![Event::Next(1)]);
        assert!(torn_down.get());
    }

    #[test]
    fn test_reentrant_event_is_queued_not_reordered() {
        let slot: Rc<RefCell<Option<Subscriber<i32>>>> = Rc::new(RefCell::new(None));
        let stream = {
            let slot = slot.clone();
            Stream::new(move |subscriber: Subscriber<i32>| {
                *slot.borrow_mut() = Some(subscriber);
            })
        };
        let seen = Rc::new(RefCell::new(Vec::new()));
        let _subscription = {
            let seen = seen.clone();
            let slot = slot.clone();
            stream.for_each(move |value| {
                seen.borrow_mut().push(value);
                if value == 1 {
                    // Feeding our own source from inside the handler.
                    let producer = slot.borrow().clone().unwrap();
                    producer.next(2);
                    seen.borrow_mut().push(100);
                }
            })
        };
        let producer = slot.borrow().clone().unwrap();
        producer.next(1);
        assert_eq!(*seen.borrow(), vec![1, 100, 2]);
    }

    #[test]
    fn test_dispose_from_inside_handler() {
        let slot: Rc<RefCell<Option<Subscriber<i32>>>> = Rc::new(RefCell::new(None));
        let stream = {
            let slot = slot.clone();
            Stream::new(move |subscriber: Subscriber<i32>| *slot.borrow_mut() = Some(subscriber))
        };
        let seen = Rc::new(RefCell::new(Vec::new()));
        let holder: Rc<RefCell<Option<Subscription>>> = Rc::new(RefCell::new(None));
        let subscription = {
            let seen = seen.clone();
            let holder = holder.clone();
            stream.for_each(move |value| {
                seen.borrow_mut().push(value);
                if let Some(subscription) = holder.borrow().as_ref() {
                    subscription.dispose();
                }
            })
        };
        *holder.borrow_mut() = Some(subscription.clone());
        let producer = slot.borrow().clone().unwrap();
        producer.next(1);
        producer.next(2);
        assert_eq!(*seen.borrow(), vec![1]);
        assert!(subscription.is_closed());
    }

    #[test]
    fn test_closed_subscription_runs_teardown_immediately() {
        let subscriber = Subscriber::<i32>::new(|_| {});
        subscriber.complete();
        let ran = Rc::new(Cell::new(false));
        let flag = ran.clone();
        subscriber.add_teardown(move || flag.set(true));
        assert!(ran.get());
        assert!(Subscription::closed().is_closed());
    }

    #[tokio::test]
    async fn test_from_future_emits_then_completes() {
        let local = tokio::task::LocalSet::new();
        local
            .run_until(async {
                let stream = Stream::from_future(|| async { Ok::<_, StreamError>(7) });
                let (seen, _subscription) = record(&stream);
                assert!(seen.borrow().is_empty());
                tokio::task::yield_now().await;
                tokio::task::yield_now().await;
                assert_eq!(*seen.borrow(), vec![Event::Next(7), Event::Complete]);
            })
            .await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_from_future_dispose_aborts_task() {
        let local = tokio::task::LocalSet::new();
        local
            .run_until(async {
                let stream = Stream::from_future(|| async {
                    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
                    Ok::<_, StreamError>("late")
                });
                let (seen, subscription) = record(&stream);
                subscription.dispose();
                tokio::time::sleep(std::time::Duration::from_millis(100)).await;
                assert!(seen.borrow().is_empty());
            })
            .await;
    }
}
