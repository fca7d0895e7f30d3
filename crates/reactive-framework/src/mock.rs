//! # Mock Fetcher & Testing Guide
//!
//! [`MockFetcher<T>`] implements [`RemoteFetcher<T>`] entirely in memory. Each
//! subscription to one of its streams consumes the next scripted expectation,
//! so a test decides exactly what every request returns and can count how many
//! requests the graph made.
//!
//! ## When to use Mocks vs a Real Store
//!
//! | Feature | MockFetcher | ResourceStore |
//! |---------|-------------|---------------|
//! | **Speed** | Instant, synchronous | Needs a runtime and a `LocalSet` |
//! | **Determinism** | Fully deterministic | Subject to the scheduler and latency |
//! | **Ordering control** | `return_pending` resolves whenever the test says | Latency per item |
//! | **Use Case** | Service and component logic | Full system runs |
//!
//! ## Example
//!
//! ```rust
//! use reactive_framework::mock::MockFetcher;
//! use reactive_framework::{FetchError, RemoteFetcher, Resource};
//!
//! #[derive(Clone, Debug, PartialEq)]
//! struct Supplier { id: u32 }
//!
//! impl Resource for Supplier {
//!     type Id = u32;
//!     const COLLECTION: &'static str = "suppliers";
//!     fn id(&self) -> u32 { self.id }
//! }
//!
//! let mock = MockFetcher::<Supplier>::new();
//! mock.expect_get(1).return_ok(Supplier { id: 1 });
//! mock.expect_list().return_err(FetchError::status(500, "Internal Server Error"));
//!
//! let _one = mock.fetch_one(1).for_each(|s| assert_eq!(s.id, 1));
//! let _all = mock.fetch_all().subscribe(|_| {});
//!
//! assert_eq!(mock.get_calls(), 1);
//! mock.verify();
//! ```
//!
//! The lower-level [`create_mock_client`] hands out a real [`ResourceClient`]
//! whose requests land on a receiver the test controls.

use crate::error::{FetchError, StreamError};
use crate::fetch::{RemoteFetcher, Resource, ResourceClient};
use crate::store::ResourceRequest;
use crate::stream::{Stream, Subscriber};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use tokio::sync::mpsc;

enum Reply<V> {
    Ready(Result<V, FetchError>),
    Pending(Rc<RefCell<Option<Subscriber<V>>>>),
}

impl<V: Clone + 'static> Reply<V> {
    fn deliver(self, subscriber: Subscriber<V>) {
        match self {
            Reply::Ready(Ok(value)) => {
                subscriber.next(value);
                subscriber.complete();
            }
            Reply::Ready(Err(error)) => subscriber.error(error.into()),
            Reply::Pending(slot) => *slot.borrow_mut() = Some(subscriber),
        }
    }
}

enum Expectation<T: Resource> {
    List(Reply<Vec<T>>),
    Get { id: T::Id, reply: Reply<T> },
}

struct MockState<T: Resource> {
    expectations: VecDeque<Expectation<T>>,
    list_calls: usize,
    requested_ids: Vec<T::Id>,
}

/// A scripted [`RemoteFetcher`]. Clones share the same script and counters.
pub struct MockFetcher<T: Resource> {
    state: Rc<RefCell<MockState<T>>>,
}

impl<T: Resource> Clone for MockFetcher<T> {
    fn clone(&self) -> Self {
        Self {
            state: self.state.clone(),
        }
    }
}

impl<T: Resource> Default for MockFetcher<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Resource> MockFetcher<T> {
    /// Creates a mock with no expectations.
    pub fn new() -> Self {
        Self {
            state: Rc::new(RefCell::new(MockState {
                expectations: VecDeque::new(),
                list_calls: 0,
                requested_ids: Vec::new(),
            })),
        }
    }

    /// Expects a `fetch_all` subscription.
    pub fn expect_list(&self) -> ListExpectationBuilder<T> {
        ListExpectationBuilder {
            state: self.state.clone(),
        }
    }

    /// Expects a `fetch_one(id)` subscription.
    pub fn expect_get(&self, id: T::Id) -> GetExpectationBuilder<T> {
        GetExpectationBuilder {
            id,
            state: self.state.clone(),
        }
    }

    /// Number of `fetch_all` subscriptions so far.
    pub fn list_calls(&self) -> usize {
        self.state.borrow().list_calls
    }

    /// Number of `fetch_one` subscriptions so far.
    pub fn get_calls(&self) -> usize {
        self.state.borrow().requested_ids.len()
    }

    /// Ids requested through `fetch_one`, in request order.
    pub fn requested_ids(&self) -> Vec<T::Id> {
        self.state.borrow().requested_ids.clone()
    }

    /// Panics unless every expectation was consumed.
    pub fn verify(&self) {
        let remaining = self.state.borrow().expectations.len();
        if remaining > 0 {
            panic!("Not all expectations were met. {remaining} remaining");
        }
    }
}

impl<T: Resource> RemoteFetcher<T> for MockFetcher<T> {
    fn fetch_all(&self) -> Stream<Vec<T>> {
        let state = self.state.clone();
        Stream::new(move |subscriber: Subscriber<Vec<T>>| {
            let next = {
                let mut state = state.borrow_mut();
                state.list_calls += 1;
                state.expectations.pop_front()
            };
            match next {
                Some(Expectation::List(reply)) => reply.deliver(subscriber),
                _ => panic!("Unexpected fetch_all or expectation mismatch"),
            }
        })
    }

    fn fetch_one(&self, id: T::Id) -> Stream<T> {
        let state = self.state.clone();
        Stream::new(move |subscriber: Subscriber<T>| {
            let next = {
                let mut state = state.borrow_mut();
                state.requested_ids.push(id.clone());
                state.expectations.pop_front()
            };
            match next {
                Some(Expectation::Get { id: expected, reply }) if expected == id => {
                    reply.deliver(subscriber)
                }
                _ => panic!("Unexpected fetch_one({id}) or expectation mismatch"),
            }
        })
    }
}

/// A response the test completes later by hand.
pub struct PendingResponse<V> {
    slot: Rc<RefCell<Option<Subscriber<V>>>>,
}

impl<V: 'static> PendingResponse<V> {
    /// True once the request was made.
    pub fn is_requested(&self) -> bool {
        self.slot.borrow().is_some()
    }

    /// True if the requester gave up (disposed) before a reply.
    pub fn is_cancelled(&self) -> bool {
        self.slot
            .borrow()
            .as_ref()
            .is_some_and(|subscriber| subscriber.is_closed())
    }

    /// Delivers `value` and completes. Ignored if the request was cancelled.
    pub fn resolve(&self, value: V) {
        let subscriber = self.slot.borrow().clone();
        match subscriber {
            Some(subscriber) => {
                subscriber.next(value);
                subscriber.complete();
            }
            None => panic!("Pending response resolved before it was requested"),
        }
    }

    /// Fails the request with `error`.
    pub fn fail(&self, error: FetchError) {
        let subscriber = self.slot.borrow().clone();
        match subscriber {
            Some(subscriber) => subscriber.error(StreamError::from(error)),
            None => panic!("Pending response failed before it was requested"),
        }
    }
}

/// Builder for `fetch_all` expectations.
pub struct ListExpectationBuilder<T: Resource> {
    state: Rc<RefCell<MockState<T>>>,
}

impl<T: Resource> ListExpectationBuilder<T> {
    pub fn return_ok(self, items: Vec<T>) {
        self.push(Reply::Ready(Ok(items)));
    }

    pub fn return_err(self, error: FetchError) {
        self.push(Reply::Ready(Err(error)));
    }

    /// Leaves the request open; the returned handle answers it.
    pub fn return_pending(self) -> PendingResponse<Vec<T>> {
        let slot = Rc::new(RefCell::new(None));
        self.push(Reply::Pending(slot.clone()));
        PendingResponse { slot }
    }

    fn push(self, reply: Reply<Vec<T>>) {
        self.state
            .borrow_mut()
            .expectations
            .push_back(Expectation::List(reply));
    }
}

/// Builder for `fetch_one` expectations.
pub struct GetExpectationBuilder<T: Resource> {
    id: T::Id,
    state: Rc<RefCell<MockState<T>>>,
}

impl<T: Resource> GetExpectationBuilder<T> {
    pub fn return_ok(self, item: T) {
        self.push(Reply::Ready(Ok(item)));
    }

    pub fn return_err(self, error: FetchError) {
        self.push(Reply::Ready(Err(error)));
    }

    /// Leaves the request open; the returned handle answers it.
    pub fn return_pending(self) -> PendingResponse<T> {
        let slot = Rc::new(RefCell::new(None));
        self.push(Reply::Pending(slot.clone()));
        PendingResponse { slot }
    }

    fn push(self, reply: Reply<T>) {
        let id = self.id;
        self.state
            .borrow_mut()
            .expectations
            .push_back(Expectation::Get { id, reply });
    }
}

/// Creates a real client whose requests arrive on the returned receiver.
///
/// Useful for testing [`ResourceClient`] itself: the test plays the store and
/// answers (or drops) each request.
pub fn create_mock_client<T: Resource>(
    buffer_size: usize,
) -> (ResourceClient<T>, mpsc::Receiver<ResourceRequest<T>>) {
    let (sender, receiver) = mpsc::channel(buffer_size);
    (ResourceClient::new(sender), receiver)
}
