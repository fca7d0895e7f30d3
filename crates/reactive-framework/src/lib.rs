//! # Reactive Framework
//!
//! Building blocks for a client-side reactive data layer: remote data arrives as
//! push-based [`Stream`]s, gets cached, combined with local user actions, and
//! composed into view models that stay consistent as inputs change.
//!
//! ## Architecture Overview
//!
//! The crate separates concerns into three layers:
//!
//! 1. **Stream Layer** ([`Stream`], [`operators`], [`join`]) - cold producers and pure combinators
//! 2. **State Layer** ([`MulticastCache`], [`ActionStream`]) - the only places values are retained
//! 3. **Boundary Layer** ([`RemoteFetcher`], [`ResourceStore`], [`MessageChannel`]) - remote data in, user messages out
//!
//! ## Core Abstractions
//!
//! ### [`Stream`] - the base abstraction
//!
//! A stream is a recipe. Subscribing runs it and returns a [`Subscription`];
//! disposing the subscription stops delivery and releases upstream work.
//!
//! ```rust
//! use reactive_framework::{combine_latest2, ActionStream, Stream};
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! let prices = Stream::of(vec![10.0, 20.0]).map(|p| p.iter().map(|v| v * 1.5).collect::<Vec<f64>>());
//! let selection = ActionStream::with_initial(0usize);
//!
//! let shown = Rc::new(RefCell::new(Vec::new()));
//! let sink = shown.clone();
//! let _subscription = combine_latest2(&prices, &selection.stream())
//!     .map(|(prices, index)| prices[index])
//!     .for_each(move |price| sink.borrow_mut().push(price));
//!
//! selection.emit(1);
//! assert_eq!(*shown.borrow(), vec![15.0, 30.0]);
//! ```
//!
//! ### [`MulticastCache`] - fetch once, share with everyone
//!
//! [`Stream::share_replay`] runs the upstream once for all subscribers and replays
//! the latest value to late joiners.
//!
//! ### [`ActionStream`] - local actions as streams
//!
//! Holds a current value that only its owner can change with
//! [`emit`](ActionStream::emit); consumers get a read-only [`Stream`].
//!
//! ### Join strategies
//!
//! [`Stream::concat_in_order`], [`Stream::merge_concurrently`] and
//! [`Stream::switch_to_latest`] flatten per-item dependent fetches. See [`join`].
//!
//! ## Concurrency Model
//!
//! - The stream graph lives on one logical thread (`Rc`, `RefCell`); it is `!Send`
//! - Remote fetches are `tokio::task::spawn_local` tasks, so they need a [`tokio::task::LocalSet`]
//! - Each [`ResourceStore`] is an actor in its own Tokio task, reached over `mpsc` + `oneshot`
//! - Re-entrant events are queued per subscriber, never reordered
//!
//! ## Testing
//!
//! [`MockFetcher`] implements [`RemoteFetcher`] with scripted, synchronous
//! responses, so service graphs can be tested without a runtime. See the [`mock`]
//! module.

pub mod action;
pub mod cache;
pub mod compose;
pub mod error;
pub mod fetch;
pub mod join;
pub mod message;
pub mod mock;
pub mod operators;
pub mod store;
pub mod stream;
pub mod tracing;

// Re-export core types for convenience
pub use action::ActionStream;
pub use cache::MulticastCache;
pub use compose::{compose_view2, compose_view3, Ready};
pub use error::{FetchError, StreamError};
pub use fetch::{RemoteFetcher, Resource, ResourceClient};
pub use join::JoinStrategy;
pub use message::MessageChannel;
pub use mock::MockFetcher;
pub use operators::{combine_latest2, combine_latest3, combine_latest_all, merge};
pub use store::{ResourceRequest, ResourceStore, Response};
pub use stream::{Event, Stream, Subscriber, Subscription};
