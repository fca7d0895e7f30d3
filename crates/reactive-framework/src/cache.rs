//! # Multicast Cache
//!
//! [`MulticastCache`] (exposed as [`Stream::share_replay`]) turns a cold stream
//! into a shared one: one upstream subscription no matter how many subscribers,
//! plus the latest value replayed to anyone joining late.
//!
//! ## Lifecycle
//!
//! | Upstream state | New subscriber receives |
//! |----------------|-------------------------|
//! | not connected | triggers the upstream subscription |
//! | active | the buffered value (if any), then live values |
//! | completed | the buffered value (if any), then `Complete` |
//! | failed | the buffered value (if any), then the same error |
//!
//! A failed cache never retries. When the last subscriber leaves before the
//! upstream finished, the upstream subscription is disposed and the buffered
//! value is kept; the next subscriber reconnects and sees that value first.

use crate::error::StreamError;
use crate::stream::{Event, Stream, Subscriber, Subscription};
use std::cell::RefCell;
use std::rc::Rc;
use tracing::{debug, warn};

#[derive(Clone)]
enum Terminal {
    Completed,
    Failed(StreamError),
}

struct CacheState<T> {
    latest: Option<T>,
    terminal: Option<Terminal>,
    subscribers: Vec<(u64, Subscriber<T>)>,
    next_id: u64,
    upstream: Option<Subscription>,
    connecting: bool,
}

/// A share-replay wrapper around one upstream stream.
pub struct MulticastCache<T> {
    source: Stream<T>,
    state: Rc<RefCell<CacheState<T>>>,
}

impl<T: Clone + 'static> MulticastCache<T> {
    pub fn wrap(source: Stream<T>) -> Self {
        Self {
            source,
            state: Rc::new(RefCell::new(CacheState {
                latest: None,
                terminal: None,
                subscribers: Vec::new(),
                next_id: 0,
                upstream: None,
                connecting: false,
            })),
        }
    }

    /// The shared stream. Every subscription goes through this cache.
    pub fn stream(&self) -> Stream<T> {
        let source = self.source.clone();
        let state = self.state.clone();
        Stream::new(move |subscriber: Subscriber<T>| {
            Self::attach(&state, &source, subscriber);
        })
    }

    fn attach(state: &Rc<RefCell<CacheState<T>>>, source: &Stream<T>, subscriber: Subscriber<T>) {
        let (replay, terminal, id, should_connect) = {
            let mut cache = state.borrow_mut();
            let replay = cache.latest.clone();
            match cache.terminal.clone() {
                Some(terminal) => (replay, Some(terminal), None, false),
                None => {
                    let id = cache.next_id;
                    cache.next_id += 1;
                    cache.subscribers.push((id, subscriber.clone()));
                    let should_connect = cache.upstream.is_none() && !cache.connecting;
                    (replay, None, Some(id), should_connect)
                }
            }
        };

        if let Some(value) = replay {
            subscriber.next(value);
        }
        match terminal {
            Some(Terminal::Completed) => return subscriber.complete(),
            Some(Terminal::Failed(error)) => return subscriber.error(error),
            None => {}
        }

        if let Some(id) = id {
            let state = state.clone();
            subscriber.add_teardown(move || Self::detach(&state, id));
        }
        if should_connect && !subscriber.is_closed() {
            Self::connect(state, source);
        }
    }

    fn detach(state: &Rc<RefCell<CacheState<T>>>, id: u64) {
        let upstream = {
            let mut cache = state.borrow_mut();
            cache.subscribers.retain(|(other, _)| *other != id);
            if cache.subscribers.is_empty() && cache.terminal.is_none() {
                cache.upstream.take()
            } else {
                None
            }
        };
        if let Some(upstream) = upstream {
            debug!("last subscriber left; disconnecting upstream");
            upstream.dispose();
        }
    }

    fn connect(state: &Rc<RefCell<CacheState<T>>>, source: &Stream<T>) {
        debug!("connecting upstream");
        state.borrow_mut().connecting = true;
        let sink_state = state.clone();
        let subscription = source.subscribe(move |event| Self::on_upstream(&sink_state, event));

        let mut cache = state.borrow_mut();
        cache.connecting = false;
        if cache.terminal.is_none() && !cache.subscribers.is_empty() {
            cache.upstream = Some(subscription);
        } else {
            drop(cache);
            subscription.dispose();
        }
    }

    fn on_upstream(state: &Rc<RefCell<CacheState<T>>>, event: Event<T>) {
        match event {
            Event::Next(value) => {
                let targets: Vec<Subscriber<T>> = {
                    let mut cache = state.borrow_mut();
                    cache.latest = Some(value.clone());
                    cache.subscribers.iter().map(|(_, s)| s.clone()).collect()
                };
                for target in targets {
                    target.next(value.clone());
                }
            }
            Event::Error(error) => {
                warn!(%error, "cached upstream failed");
                let targets = Self::finish(state, Terminal::Failed(error.clone()));
                for target in targets {
                    target.error(error.clone());
                }
            }
            Event::Complete => {
                let targets = Self::finish(state, Terminal::Completed);
                for target in targets {
                    target.complete();
                }
            }
        }
    }

    fn finish(state: &Rc<RefCell<CacheState<T>>>, terminal: Terminal) -> Vec<Subscriber<T>> {
        let mut cache = state.borrow_mut();
        cache.terminal = Some(terminal);
        cache.upstream = None;
        std::mem::take(&mut cache.subscribers)
            .into_iter()
            .map(|(_, s)| s)
            .collect()
    }
}

impl<T: Clone + 'static> Stream<T> {
    /// Shares one upstream subscription among all subscribers and replays the
    /// latest value. See [`MulticastCache`].
    pub fn share_replay(&self) -> Stream<T> {
        MulticastCache::wrap(self.clone()).stream()
    }
}
