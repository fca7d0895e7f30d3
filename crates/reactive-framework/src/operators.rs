//! # Combinators
//!
//! Pure operations over [`Stream`]s. None of them mutate their inputs; each
//! returns a new cold stream whose subscriptions subscribe to the inputs.
//!
//! | Operator | Emits |
//! |----------|-------|
//! | [`map`](Stream::map) | `f(v)` for every `v` |
//! | [`filter`](Stream::filter) | only values passing the predicate |
//! | [`tap`](Stream::tap) | every value unchanged, after a side effect |
//! | [`catch_error`](Stream::catch_error) | source values, then the handler's stream on error |
//! | [`scan`](Stream::scan) | every intermediate accumulator |
//! | [`start_with`](Stream::start_with) | a leading value, then the source |
//! | [`collect`](Stream::collect) | one `Vec` of everything, on completion |
//! | [`take`](Stream::take) | the first `n` values, then completes |
//! | [`merge`] | every value of every input, in arrival order |
//! | [`combine_latest2`], [`combine_latest3`], [`combine_latest_all`] | the latest tuple, once all inputs emitted |
//!
//! Terminal events pass through unchanged unless the operator says otherwise.

use crate::error::StreamError;
use crate::stream::{Event, Stream, Subscriber};
use std::cell::RefCell;
use std::rc::Rc;

impl<T: 'static> Stream<T> {
    /// Applies `f` to every value, preserving order and timing.
    pub fn map<U: 'static>(&self, f: impl Fn(T) -> U + 'static) -> Stream<U> {
        let source = self.clone();
        let f = Rc::new(f);
        Stream::new(move |out: Subscriber<U>| {
            let f = f.clone();
            let downstream = out.clone();
            let upstream = source.subscribe(move |event| match event {
                Event::Next(value) => downstream.next(f(value)),
                Event::Error(e) => downstream.error(e),
                Event::Complete => downstream.complete(),
            });
            out.add(upstream);
        })
    }

    /// Re-emits only the values for which `predicate` holds.
    pub fn filter(&self, predicate: impl Fn(&T) -> bool + 'static) -> Stream<T> {
        let source = self.clone();
        let predicate = Rc::new(predicate);
        Stream::new(move |out: Subscriber<T>| {
            let predicate = predicate.clone();
            let downstream = out.clone();
            let upstream = source.subscribe(move |event| match event {
                Event::Next(value) => {
                    if predicate(&value) {
                        downstream.next(value);
                    }
                }
                other => downstream.emit(other),
            });
            out.add(upstream);
        })
    }

    /// Runs `effect` on each value before passing it on. Used for logging.
    pub fn tap(&self, effect: impl Fn(&T) + 'static) -> Stream<T> {
        let source = self.clone();
        let effect = Rc::new(effect);
        Stream::new(move |out: Subscriber<T>| {
            let effect = effect.clone();
            let downstream = out.clone();
            let upstream = source.subscribe(move |event| {
                if let Event::Next(value) = &event {
                    effect(value);
                }
                downstream.emit(event);
            });
            out.add(upstream);
        })
    }

    /// On upstream error, stops consuming the source and continues with the
    /// stream returned by `handler`.
    ///
    /// Returning [`Stream::empty`] turns a failure into a quiet completion.
    pub fn catch_error(&self, handler: impl Fn(StreamError) -> Stream<T> + 'static) -> Stream<T> {
        let source = self.clone();
        let handler = Rc::new(handler);
        Stream::new(move |out: Subscriber<T>| {
            let handler = handler.clone();
            let downstream = out.clone();
            let upstream = source.subscribe(move |event| match event {
                Event::Error(e) => handler(e).subscribe_with(downstream.clone()),
                other => downstream.emit(other),
            });
            out.add(upstream);
        })
    }

    /// Folds values into an accumulator seeded with `seed`, emitting each new
    /// accumulator.
    ///
    /// The accumulator belongs to one subscription; nothing outside the reducer
    /// can read or change it.
    pub fn scan<A: Clone + 'static>(
        &self,
        seed: A,
        reducer: impl Fn(&A, T) -> A + 'static,
    ) -> Stream<A> {
        let source = self.clone();
        let reducer = Rc::new(reducer);
        Stream::new(move |out: Subscriber<A>| {
            let reducer = reducer.clone();
            let mut accumulator = seed.clone();
            let downstream = out.clone();
            let upstream = source.subscribe(move |event| match event {
                Event::Next(value) => {
                    accumulator = reducer(&accumulator, value);
                    downstream.next(accumulator.clone());
                }
                Event::Error(e) => downstream.error(e),
                Event::Complete => downstream.complete(),
            });
            out.add(upstream);
        })
    }

    /// Buffers every value and emits them as one `Vec` when the source completes.
    pub fn collect(&self) -> Stream<Vec<T>> {
        let source = self.clone();
        Stream::new(move |out: Subscriber<Vec<T>>| {
            let mut buffer = Vec::new();
            let downstream = out.clone();
            let upstream = source.subscribe(move |event| match event {
                Event::Next(value) => buffer.push(value),
                Event::Error(e) => downstream.error(e),
                Event::Complete => {
                    downstream.next(std::mem::take(&mut buffer));
                    downstream.complete();
                }
            });
            out.add(upstream);
        })
    }

    /// Emits the first `count` values, then completes and releases the source.
    pub fn take(&self, count: usize) -> Stream<T> {
        let source = self.clone();
        Stream::new(move |out: Subscriber<T>| {
            if count == 0 {
                out.complete();
                return;
            }
            let mut left = count;
            let downstream = out.clone();
            let upstream = source.subscribe(move |event| match event {
                // A synchronous source may keep pushing before it is released.
                Event::Next(_) if left == 0 => {}
                Event::Next(value) => {
                    left -= 1;
                    downstream.next(value);
                    if left == 0 {
                        downstream.complete();
                    }
                }
                other => downstream.emit(other),
            });
            out.add(upstream);
        })
    }

    /// Merges this stream with `other`.
    pub fn merge_with(&self, other: &Stream<T>) -> Stream<T> {
        merge(vec![self.clone(), other.clone()])
    }
}

impl<T: Clone + 'static> Stream<T> {
    /// Emits `value` first, then everything from the source.
    pub fn start_with(&self, value: T) -> Stream<T> {
        let source = self.clone();
        Stream::new(move |out: Subscriber<T>| {
            out.next(value.clone());
            if out.is_closed() {
                return;
            }
            source.subscribe_with(out);
        })
    }
}

/// Emits every value from every input as it arrives.
///
/// Completes once all inputs complete; the first error ends the merged stream.
pub fn merge<T: 'static>(streams: Vec<Stream<T>>) -> Stream<T> {
    Stream::new(move |out: Subscriber<T>| {
        if streams.is_empty() {
            out.complete();
            return;
        }
        let remaining = Rc::new(RefCell::new(streams.len()));
        for stream in &streams {
            let remaining = remaining.clone();
            let downstream = out.clone();
            let subscription = stream.subscribe(move |event| match event {
                Event::Next(value) => downstream.next(value),
                Event::Error(e) => downstream.error(e),
                Event::Complete => {
                    let left = {
                        let mut remaining = remaining.borrow_mut();
                        *remaining -= 1;
                        *remaining
                    };
                    if left == 0 {
                        downstream.complete();
                    }
                }
            });
            out.add(subscription);
            if out.is_closed() {
                return;
            }
        }
    })
}

struct Combiner<S> {
    slots: S,
    has_value: Vec<bool>,
    completed: Vec<bool>,
}

impl<S> Combiner<S> {
    fn new(slots: S, inputs: usize) -> Rc<RefCell<Self>> {
        Rc::new(RefCell::new(Self {
            slots,
            has_value: vec![false; inputs],
            completed: vec![false; inputs],
        }))
    }
}

/// Subscribes one input of a latest-value combination.
///
/// `store` writes the new value into its slot, `read` yields the full
/// combination once every slot is filled. An input that completes without ever
/// emitting completes the output, since no combination can follow.
fn attach<V: 'static, S: 'static, O: 'static>(
    out: &Subscriber<O>,
    source: &Stream<V>,
    index: usize,
    state: &Rc<RefCell<Combiner<S>>>,
    store: fn(&mut S, usize, V),
    read: fn(&S) -> Option<O>,
) {
    if out.is_closed() {
        return;
    }
    let state = state.clone();
    let downstream = out.clone();
    let subscription = source.subscribe(move |event| match event {
        Event::Next(value) => {
            let combined = {
                let mut combiner = state.borrow_mut();
                store(&mut combiner.slots, index, value);
                combiner.has_value[index] = true;
                read(&combiner.slots)
            };
            if let Some(combined) = combined {
                downstream.next(combined);
            }
        }
        Event::Error(e) => downstream.error(e),
        Event::Complete => {
            let finished = {
                let mut combiner = state.borrow_mut();
                combiner.completed[index] = true;
                !combiner.has_value[index] || combiner.completed.iter().all(|done| *done)
            };
            if finished {
                downstream.complete();
            }
        }
    });
    out.add(subscription);
}

/// Emits `(a, b)` once both inputs produced a value, then again on every
/// emission of either input.
///
/// Inputs are subscribed in argument order, so values emitted synchronously on
/// subscription are combined in that order on every run.
pub fn combine_latest2<A, B>(a: &Stream<A>, b: &Stream<B>) -> Stream<(A, B)>
where
    A: Clone + 'static,
    B: Clone + 'static,
{
    let (a, b) = (a.clone(), b.clone());
    Stream::new(move |out: Subscriber<(A, B)>| {
        let state = Combiner::new((None::<A>, None::<B>), 2);
        let read: fn(&(Option<A>, Option<B>)) -> Option<(A, B)> =
            |slots| Some((slots.0.clone()?, slots.1.clone()?));
        attach(&out, &a, 0, &state, |slots, _, v| slots.0 = Some(v), read);
        attach(&out, &b, 1, &state, |slots, _, v| slots.1 = Some(v), read);
    })
}

/// Three-input form of [`combine_latest2`].
pub fn combine_latest3<A, B, C>(a: &Stream<A>, b: &Stream<B>, c: &Stream<C>) -> Stream<(A, B, C)>
where
    A: Clone + 'static,
    B: Clone + 'static,
    C: Clone + 'static,
{
    let (a, b, c) = (a.clone(), b.clone(), c.clone());
    Stream::new(move |out: Subscriber<(A, B, C)>| {
        let state = Combiner::new((None::<A>, None::<B>, None::<C>), 3);
        let read: fn(&(Option<A>, Option<B>, Option<C>)) -> Option<(A, B, C)> =
            |slots| Some((slots.0.clone()?, slots.1.clone()?, slots.2.clone()?));
        attach(&out, &a, 0, &state, |slots, _, v| slots.0 = Some(v), read);
        attach(&out, &b, 1, &state, |slots, _, v| slots.1 = Some(v), read);
        attach(&out, &c, 2, &state, |slots, _, v| slots.2 = Some(v), read);
    })
}

/// N-input form for homogeneous streams; emits the latest values in input order.
pub fn combine_latest_all<T: Clone + 'static>(streams: Vec<Stream<T>>) -> Stream<Vec<T>> {
    Stream::new(move |out: Subscriber<Vec<T>>| {
        if streams.is_empty() {
            out.complete();
            return;
        }
        let state = Combiner::new(vec![None::<T>; streams.len()], streams.len());
        for (index, stream) in streams.iter().enumerate() {
            attach(
                &out,
                stream,
                index,
                &state,
                |slots, index, v| slots[index] = Some(v),
                |slots| slots.iter().cloned().collect(),
            );
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FetchError;
    use crate::ActionStream;

    fn values<T: Clone + 'static>(stream: &Stream<T>) -> Rc<RefCell<Vec<T>>> {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        let _ = stream.for_each(move |v| sink.borrow_mut().push(v));
        seen
    }

    #[test]
    fn test_map_and_filter_keep_order() {
        let seen = values(&Stream::from_iter(1..=6).filter(|v| v % 2 == 0).map(|v| v * 10));
        assert_eq!(*seen.borrow(), vec![20, 40, 60]);
    }

    #[test]
    fn test_scan_emits_left_fold_prefixes() {
        let seen = values(&Stream::from_iter(vec![1, 2, 3, 4]).scan(10, |acc, v| acc + v));
        assert_eq!(*seen.borrow(), vec![11, 13, 16, 20]);
    }

    #[test]
    fn test_scan_accumulator_is_per_subscription() {
        let summed = Stream::from_iter(vec![1, 2]).scan(0, |acc, v| acc + v);
        let first = values(&summed);
        let second = values(&summed);
        assert_eq!(*first.borrow(), vec![1, 3]);
        assert_eq!(*second.borrow(), vec![1, 3]);
    }

    #[test]
    fn test_catch_error_switches_to_fallback() {
        let failing = Stream::from_iter(vec![1])
            .merge_with(&Stream::fail(FetchError::status(500, "down").into()));
        let caught = Rc::new(RefCell::new(None));
        let seen = {
            let caught = caught.clone();
            values(&failing.catch_error(move |e| {
                *caught.borrow_mut() = Some(e);
                Stream::of(99)
            }))
        };
        assert_eq!(*seen.borrow(), vec![1, 99]);
        assert!(caught.borrow().as_ref().is_some_and(|e| e.to_string().contains("500")));
    }

    #[test]
    fn test_merge_interleaves_in_arrival_order() {
        let left = ActionStream::new();
        let right = ActionStream::new();
        let seen = values(&merge(vec![left.stream(), right.stream()]));
        left.emit("l1");
        right.emit("r1");
        left.emit("l2");
        assert_eq!(*seen.borrow(), vec!["l1", "r1", "l2"]);
    }

    #[test]
    fn test_combine_latest_waits_for_every_input() {
        let numbers = ActionStream::new();
        let letters = ActionStream::new();
        let seen = values(&combine_latest2(&numbers.stream(), &letters.stream()));

        numbers.emit(1);
        numbers.emit(2);
        assert!(seen.borrow().is_empty());

        letters.emit('a');
        numbers.emit(3);
        letters.emit('b');
        assert_eq!(*seen.borrow(), vec![(2, 'a'), (3, 'a'), (3, 'b')]);
    }

    #[test]
    fn test_combine_latest_never_emits_if_an_input_is_silent() {
        let silent = Stream::<i32>::never();
        let seen = values(&combine_latest3(&Stream::of(1), &Stream::of("x"), &silent));
        assert!(seen.borrow().is_empty());
    }

    #[test]
    fn test_combine_latest_completes_when_input_completes_empty() {
        let done = Rc::new(RefCell::new(false));
        let flag = done.clone();
        let _subscription = combine_latest2(&Stream::<i32>::empty(), &Stream::<i32>::never())
            .subscribe(move |event| {
                if event == Event::Complete {
                    *flag.borrow_mut() = true;
                }
            });
        assert!(*done.borrow());
    }

    #[test]
    fn test_take_completes_and_releases_source() {
        let action = ActionStream::new();
        let seen = values(&action.stream().take(2));
        action.emit(1);
        action.emit(2);
        action.emit(3);
        assert_eq!(*seen.borrow(), vec![1, 2]);
        assert_eq!(action.observers(), 0);

        let seen = values(&Stream::from_iter(1..=5).take(2));
        assert_eq!(*seen.borrow(), vec![1, 2]);
    }

    #[test]
    fn test_start_with_and_collect() {
        let seen = values(&Stream::from_iter(vec![2, 3]).start_with(1).collect());
        assert_eq!(*seen.borrow(), vec![vec![1, 2, 3]]);
    }

    #[test]
    fn test_combine_latest_all_gates_then_emits_per_change() {
        let inputs: Vec<ActionStream<i32>> = (0..4).map(|_| ActionStream::new()).collect();
        let seen = values(&combine_latest_all(inputs.iter().map(|a| a.stream()).collect()));

        inputs[2].emit(30);
        inputs[0].emit(10);
        inputs[3].emit(40);
        assert!(seen.borrow().is_empty());

        inputs[1].emit(20);
        inputs[0].emit(11);
        inputs[3].emit(41);
        assert_eq!(
            *seen.borrow(),
            vec![vec![10, 20, 30, 40], vec![11, 20, 30, 40], vec![11, 20, 30, 41]]
        );
    }

    #[test]
    fn test_combine_latest_all_single_input_wraps_each_value() {
        let seen = values(&combine_latest_all(vec![Stream::from_iter(vec![1, 2])]));
        assert_eq!(*seen.borrow(), vec![vec![1], vec![2]]);
    }

    #[test]
    fn test_combine_latest_all_without_inputs_completes() {
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = events.clone();
        let _subscription = combine_latest_all(Vec::<Stream<i32>>::new())
            .subscribe(move |event| sink.borrow_mut().push(event));
        assert_eq!(*events.borrow(), vec![Event::Complete]);
    }
}
