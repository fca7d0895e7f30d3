//! # Join Strategies
//!
//! Three ways to turn each value of an outer stream into an inner stream (a
//! dependent fetch) and flatten the results into one output.
//!
//! | Strategy | Inner streams | Output order | On a new outer value |
//! |----------|---------------|--------------|----------------------|
//! | [`concat_in_order`](Stream::concat_in_order) | one at a time | outer order | queued until the active inner completes |
//! | [`merge_concurrently`](Stream::merge_concurrently) | all at once | completion order | started immediately |
//! | [`switch_to_latest`](Stream::switch_to_latest) | only the newest | newest only | previous inner is disposed |
//!
//! An inner error ends the output with [`StreamError::Join`] wrapping the
//! cause. An outer error passes through unchanged. The output completes when
//! the outer stream completed and no inner stream is still active.

use crate::error::StreamError;
use crate::stream::{Event, Stream, Subscriber, Subscription};
use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;
use tracing::{debug, trace};

/// Selects one of the join strategies at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinStrategy {
    ConcatInOrder,
    MergeConcurrently,
    SwitchToLatest,
}

type Fetch<T, U> = Rc<dyn Fn(T) -> Stream<U>>;

impl<T: 'static> Stream<T> {
    /// Flattens with the given strategy.
    pub fn flat_map_with<U: 'static>(
        &self,
        strategy: JoinStrategy,
        fetch: impl Fn(T) -> Stream<U> + 'static,
    ) -> Stream<U> {
        match strategy {
            JoinStrategy::ConcatInOrder => self.concat_in_order(fetch),
            JoinStrategy::MergeConcurrently => self.merge_concurrently(fetch),
            JoinStrategy::SwitchToLatest => self.switch_to_latest(fetch),
        }
    }

    /// Runs one inner stream at a time, in outer order.
    pub fn concat_in_order<U: 'static>(&self, fetch: impl Fn(T) -> Stream<U> + 'static) -> Stream<U> {
        let source = self.clone();
        let fetch: Fetch<T, U> = Rc::new(fetch);
        Stream::new(move |out: Subscriber<U>| {
            let state = Rc::new(RefCell::new(ConcatState {
                pending: VecDeque::new(),
                active: false,
                current: None,
                draining: false,
                outer_done: false,
            }));
            {
                let state = state.clone();
                out.add_teardown(move || {
                    let current = state.borrow_mut().current.take();
                    if let Some(current) = current {
                        current.dispose();
                    }
                });
            }
            let (fetch, downstream, outer_state) = (fetch.clone(), out.clone(), state.clone());
            let outer = source.subscribe(move |event| match event {
                Event::Next(item) => {
                    outer_state.borrow_mut().pending.push_back(item);
                    drain_concat(&outer_state, &fetch, &downstream);
                }
                Event::Error(e) => downstream.error(e),
                Event::Complete => {
                    outer_state.borrow_mut().outer_done = true;
                    drain_concat(&outer_state, &fetch, &downstream);
                }
            });
            out.add(outer);
        })
    }

    /// Runs every inner stream as soon as its outer value arrives.
    pub fn merge_concurrently<U: 'static>(&self, fetch: impl Fn(T) -> Stream<U> + 'static) -> Stream<U> {
        let source = self.clone();
        let fetch: Fetch<T, U> = Rc::new(fetch);
        Stream::new(move |out: Subscriber<U>| {
            let state = Rc::new(RefCell::new(MergeState {
                inners: HashMap::new(),
                next_id: 0,
                active: 0,
                outer_done: false,
            }));
            {
                let state = state.clone();
                out.add_teardown(move || {
                    let inners: Vec<Subscription> = state.borrow_mut().inners.drain().map(|(_, s)| s).collect();
                    for inner in inners {
                        inner.dispose();
                    }
                });
            }
            let (fetch, downstream, outer_state) = (fetch.clone(), out.clone(), state.clone());
            let outer = source.subscribe(move |event| match event {
                Event::Next(_) if downstream.is_closed() => {}
                Event::Next(item) => {
                    let id = {
                        let mut state = outer_state.borrow_mut();
                        state.active += 1;
                        state.next_id += 1;
                        state.next_id
                    };
                    let (inner_state, inner_out) = (outer_state.clone(), downstream.clone());
                    let inner = fetch(item).subscribe(move |event| match event {
                        Event::Next(value) => inner_out.next(value),
                        Event::Error(e) => inner_out.error(StreamError::join(e)),
                        Event::Complete => {
                            let (finished, done) = {
                                let mut state = inner_state.borrow_mut();
                                state.active -= 1;
                                (state.active == 0 && state.outer_done, state.inners.remove(&id))
                            };
                            drop(done);
                            if finished {
                                inner_out.complete();
                            }
                        }
                    });
                    if !inner.is_closed() {
                        outer_state.borrow_mut().inners.insert(id, inner);
                    }
                }
                Event::Error(e) => downstream.error(e),
                Event::Complete => {
                    let finished = {
                        let mut state = outer_state.borrow_mut();
                        state.outer_done = true;
                        state.active == 0
                    };
                    if finished {
                        downstream.complete();
                    }
                }
            });
            out.add(outer);
        })
    }

    /// Keeps only the inner stream of the newest outer value.
    ///
    /// A new outer value disposes the previous inner subscription, and any result
    /// the previous inner still produces is dropped.
    pub fn switch_to_latest<U: 'static>(&self, fetch: impl Fn(T) -> Stream<U> + 'static) -> Stream<U> {
        let source = self.clone();
        let fetch: Fetch<T, U> = Rc::new(fetch);
        Stream::new(move |out: Subscriber<U>| {
            let state = Rc::new(RefCell::new(SwitchState {
                generation: 0,
                current: None,
                inner_active: false,
                outer_done: false,
            }));
            {
                let state = state.clone();
                out.add_teardown(move || {
                    let current = state.borrow_mut().current.take();
                    if let Some(current) = current {
                        current.dispose();
                    }
                });
            }
            let (fetch, downstream, outer_state) = (fetch.clone(), out.clone(), state.clone());
            let outer = source.subscribe(move |event| match event {
                Event::Next(_) if downstream.is_closed() => {}
                Event::Next(item) => {
                    let (generation, previous) = {
                        let mut state = outer_state.borrow_mut();
                        state.generation += 1;
                        state.inner_active = true;
                        (state.generation, state.current.take())
                    };
                    if let Some(previous) = previous {
                        debug!(generation, "switching; abandoning previous inner stream");
                        previous.dispose();
                    }
                    let (inner_state, inner_out) = (outer_state.clone(), downstream.clone());
                    let inner = fetch(item).subscribe(move |event| {
                        let latest = inner_state.borrow().generation;
                        if latest != generation {
                            trace!(generation, latest, "dropping stale inner event");
                            return;
                        }
                        match event {
                            Event::Next(value) => inner_out.next(value),
                            Event::Error(e) => inner_out.error(StreamError::join(e)),
                            Event::Complete => {
                                let finished = {
                                    let mut state = inner_state.borrow_mut();
                                    state.inner_active = false;
                                    state.outer_done
                                };
                                if finished {
                                    inner_out.complete();
                                }
                            }
                        }
                    });
                    let mut state = outer_state.borrow_mut();
                    if state.generation == generation && !inner.is_closed() {
                        state.current = Some(inner);
                    }
                }
                Event::Error(e) => downstream.error(e),
                Event::Complete => {
                    let finished = {
                        let mut state = outer_state.borrow_mut();
                        state.outer_done = true;
                        !state.inner_active
                    };
                    if finished {
                        downstream.complete();
                    }
                }
            });
            out.add(outer);
        })
    }
}

struct ConcatState<T> {
    pending: VecDeque<T>,
    active: bool,
    current: Option<Subscription>,
    draining: bool,
    outer_done: bool,
}

struct MergeState {
    inners: HashMap<u64, Subscription>,
    next_id: u64,
    active: usize,
    outer_done: bool,
}

struct SwitchState {
    generation: u64,
    current: Option<Subscription>,
    inner_active: bool,
    outer_done: bool,
}

/// Starts queued inner streams one after another, or completes the output
/// once everything is done.
///
/// Inner streams that complete during `subscribe` are followed in the same
/// loop, so a long synchronous source does not nest calls.
fn drain_concat<T: 'static, U: 'static>(
    state: &Rc<RefCell<ConcatState<T>>>,
    fetch: &Fetch<T, U>,
    out: &Subscriber<U>,
) {
    {
        let mut concat = state.borrow_mut();
        if concat.draining {
            return;
        }
        concat.draining = true;
    }
    while !out.is_closed() {
        let item = {
            let mut concat = state.borrow_mut();
            if concat.active {
                break;
            }
            let item = concat.pending.pop_front();
            if item.is_some() {
                concat.active = true;
            }
            item
        };
        let Some(item) = item else {
            if state.borrow().outer_done {
                out.complete();
            }
            break;
        };

        let (inner_state, inner_fetch, inner_out) = (state.clone(), fetch.clone(), out.clone());
        let inner = fetch(item).subscribe(move |event| match event {
            Event::Next(value) => inner_out.next(value),
            Event::Error(e) => inner_out.error(StreamError::join(e)),
            Event::Complete => {
                let (draining, done) = {
                    let mut concat = inner_state.borrow_mut();
                    concat.active = false;
                    (concat.draining, concat.current.take())
                };
                drop(done);
                if !draining {
                    drain_concat(&inner_state, &inner_fetch, &inner_out);
                }
            }
        });
        if !inner.is_closed() {
            state.borrow_mut().current = Some(inner);
        }
    }
    state.borrow_mut().draining = false;
}
