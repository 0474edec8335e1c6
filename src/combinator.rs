//! Combinators deriving new futures from existing ones.
//!
//! Each combinator creates a fresh promise, registers a bridging listener on
//! its source(s) and returns the new promise's future. Nothing here blocks. A
//! user closure that panics fails the derived future with `Error::Panicked`
//! instead of unwinding into the completing thread.
use crate::error::{catch, Error, Try};
use crate::future::Future;
use crate::promise::Promise;
use parking_lot::Mutex;
use std::{fmt::Debug, sync::Arc};
use tracing::warn;

impl<T: Clone + Send + Sync + 'static> Future<T> {
    /// Runs `f` with the source result and the promise of the derived future
    /// once the source completes.
    fn bridge<U, F>(&self, f: F) -> Future<U>
    where
        U: Send + Sync + 'static,
        F: FnOnce(&Try<T>, &Promise<U>) + Send + 'static,
    {
        let promise = Promise::new();
        let future = promise.future();
        self.on_complete(move |result| {
            if let Err(err) = catch(|| f(result, &promise)) {
                promise.try_failure(err);
            }
        });
        future
    }

    pub fn map<U, F>(&self, f: F) -> Future<U>
    where
        U: Send + Sync + 'static,
        F: FnOnce(T) -> U + Send + 'static,
    {
        self.bridge(move |result, out| {
            out.try_complete(result.clone().map(f));
        })
    }

    /// Like `map`, for a function that can fail.
    pub fn try_map<U, F>(&self, f: F) -> Future<U>
    where
        U: Send + Sync + 'static,
        F: FnOnce(T) -> Try<U> + Send + 'static,
    {
        self.bridge(move |result, out| {
            out.try_complete(result.clone().and_then(f));
        })
    }

    pub fn flat_map<U, F>(&self, f: F) -> Future<U>
    where
        U: Clone + Send + Sync + 'static,
        F: FnOnce(T) -> Future<U> + Send + 'static,
    {
        self.bridge(move |result, out| match result {
            Ok(value) => {
                out.try_complete_with(&f(value.clone()));
            }
            Err(err) => {
                out.try_failure(err.clone());
            }
        })
    }

    /// Keeps the value if `predicate` holds; otherwise fails with
    /// `Error::NoSuchElement` naming the rejected value.
    pub fn filter<F>(&self, predicate: F) -> Future<T>
    where
        T: Debug,
        F: FnOnce(&T) -> bool + Send + 'static,
    {
        self.bridge(move |result, out| {
            let filtered = match result {
                Ok(value) if predicate(value) => Ok(value.clone()),
                Ok(value) => Err(Error::rejected_value(value)),
                Err(err) => Err(err.clone()),
            };
            out.try_complete(filtered);
        })
    }

    pub fn transform<U, S, F>(&self, on_success: S, on_failure: F) -> Future<U>
    where
        U: Send + Sync + 'static,
        S: FnOnce(T) -> U + Send + 'static,
        F: FnOnce(Error) -> Error + Send + 'static,
    {
        self.bridge(move |result, out| {
            out.try_complete(result.clone().map(on_success).map_err(on_failure));
        })
    }

    pub fn transform_with<U, F>(&self, f: F) -> Future<U>
    where
        U: Send + Sync + 'static,
        F: FnOnce(Try<T>) -> Try<U> + Send + 'static,
    {
        self.bridge(move |result, out| {
            out.try_complete(f(result.clone()));
        })
    }

    /// Turns a failure into a value. A future that already succeeded is
    /// returned as is and `f` is never called.
    pub fn recover<F>(&self, f: F) -> Future<T>
    where
        F: FnOnce(Error) -> T + Send + 'static,
    {
        if let Some(Ok(_)) = self.value() {
            return self.clone();
        }
        self.bridge(move |result, out| {
            out.try_complete(result.clone().or_else(|err| Ok(f(err))));
        })
    }

    pub fn recover_with<F>(&self, f: F) -> Future<T>
    where
        F: FnOnce(Error) -> Future<T> + Send + 'static,
    {
        if let Some(Ok(_)) = self.value() {
            return self.clone();
        }
        self.bridge(move |result, out| match result {
            Ok(value) => {
                out.try_success(value.clone());
            }
            Err(err) => {
                out.try_complete_with(&f(err.clone()));
            }
        })
    }

    /// Falls back to `that` if this future fails. If both fail, the derived
    /// future carries this future's error.
    pub fn fallback_to(&self, that: &Future<T>) -> Future<T> {
        let that = that.clone();
        self.bridge(move |result, out| match result {
            Ok(value) => {
                out.try_success(value.clone());
            }
            Err(err) => {
                let (err, out) = (err.clone(), out.clone());
                that.on_complete(move |fallback| {
                    out.try_complete(fallback.clone().map_err(|_| err));
                });
            }
        })
    }

    pub fn zip<U>(&self, that: &Future<U>) -> Future<(T, U)>
    where
        U: Clone + Send + Sync + 'static,
    {
        let that = that.clone();
        self.flat_map(move |a| that.map(move |b| (a, b)))
    }

    /// Runs `f` for its side effect, then completes the derived future with
    /// the unchanged result. A panic in `f` is logged and otherwise ignored.
    pub fn and_then<F>(&self, f: F) -> Future<T>
    where
        F: FnOnce(&Try<T>) + Send + 'static,
    {
        self.bridge(move |result, out| {
            if let Err(err) = catch(|| f(result)) {
                warn!(error = %err, "and_then side effect panicked");
            }
            out.try_complete(result.clone());
        })
    }
}

struct Gather<T> {
    slots: Vec<Option<T>>,
    remaining: usize,
}

/// Collects the values of `futures` in input order.
///
/// Completes as soon as any input fails, with that failure. When several
/// inputs fail, the output carries whichever failure arrives first, not the
/// earliest in input order. An empty input gives an already-completed future
/// of an empty `Vec`.
pub fn sequence<T, I>(futures: I) -> Future<Vec<T>>
where
    T: Clone + Send + Sync + 'static,
    I: IntoIterator<Item = Future<T>>,
{
    let futures: Vec<_> = futures.into_iter().collect();
    if futures.is_empty() {
        return Future::successful(Vec::new());
    }
    let promise = Promise::new();
    let gather = Arc::new(Mutex::new(Gather {
        slots: vec![None; futures.len()],
        remaining: futures.len(),
    }));
    for (index, future) in futures.iter().enumerate() {
        let (promise, gather) = (promise.clone(), gather.clone());
        future.on_complete(move |result| {
            let value = match result {
                Ok(value) => catch(|| value.clone()),
                Err(err) => Err(err.clone()),
            };
            let value = match value {
                Ok(value) => value,
                Err(err) => {
                    promise.try_failure(err);
                    return;
                }
            };
            let mut gather = gather.lock();
            gather.slots[index] = Some(value);
            gather.remaining -= 1;
            if gather.remaining == 0 {
                let slots = std::mem::take(&mut gather.slots);
                drop(gather);
                let values: Vec<T> = slots.into_iter().flatten().collect();
                promise.try_success(values);
            }
        });
    }
    promise.future()
}

/// Maps every item to a future with `f` and sequences the results.
///
/// A panic in `f` becomes a failed future for that item.
pub fn traverse<A, B, I, F>(items: I, mut f: F) -> Future<Vec<B>>
where
    B: Clone + Send + Sync + 'static,
    I: IntoIterator<Item = A>,
    F: FnMut(A) -> Future<B>,
{
    let futures: Vec<_> = items
        .into_iter()
        .map(|item| catch(|| f(item)).unwrap_or_else(Future::failed))
        .collect();
    sequence(futures)
}

/// Completes with the result of whichever input completes first. Never
/// completes for an empty input.
pub fn first_completed_of<T, I>(futures: I) -> Future<T>
where
    T: Clone + Send + Sync + 'static,
    I: IntoIterator<Item = Future<T>>,
{
    let promise = Promise::new();
    for future in futures {
        promise.try_complete_with(&future);
    }
    promise.future()
}
