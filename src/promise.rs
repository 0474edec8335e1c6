use crate::cell::CompletionCell;
use crate::error::{Error, Try};
use crate::future::Future;
use std::{fmt, sync::Arc};
use tracing::debug;

/// The write side of a [`Future`].
///
/// A promise is completed at most once. The strict methods (`success`,
/// `failure`, `complete`) return `Err(Error::AlreadyCompleted)` when they
/// lose; the `try_` variants return `false` instead, for callers that expect
/// to race.
///
/// Cloning a promise hands out another write handle onto the same cell, so
/// several threads may race to complete it; the first completion wins.
///
/// # Examples
///
/// ```
/// use promise_out::Promise;
/// use std::time::Duration;
///
/// let promise = Promise::new();
/// let future = promise.future();
/// assert!(promise.try_success("first"));
/// assert!(!promise.try_success("second"));
/// assert!(promise.success("third").is_err());
/// assert_eq!(future.result(Duration::ZERO).unwrap(), "first");
/// ```
pub struct Promise<T> {
    cell: Arc<CompletionCell<T>>,
    future: Future<T>,
}

impl<T> Clone for Promise<T> {
    fn clone(&self) -> Self {
        Self {
            cell: self.cell.clone(),
            future: self.future.clone(),
        }
    }
}

impl<T: Send + Sync + 'static> Default for Promise<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// A fresh promise together with its future.
pub fn pair<T: Send + Sync + 'static>() -> (Promise<T>, Future<T>) {
    let promise = Promise::new();
    let future = promise.future();
    (promise, future)
}

impl<T: Send + Sync + 'static> Promise<T> {
    pub fn new() -> Self {
        let cell = Arc::new(CompletionCell::new());
        Self {
            future: Future::from_cell(cell.clone()),
            cell,
        }
    }

    /// The future observing this promise. Every call returns a handle onto
    /// the same cell.
    pub fn future(&self) -> Future<T> {
        self.future.clone()
    }

    pub fn is_completed(&self) -> bool {
        self.cell.is_completed()
    }

    pub fn complete(&self, result: Try<T>) -> Result<(), Error> {
        self.cell.complete(result).map_err(|err| {
            debug!("attempt to complete an already completed promise");
            err
        })
    }

    pub fn success(&self, value: T) -> Result<(), Error> {
        self.complete(Ok(value))
    }

    pub fn failure(&self, err: Error) -> Result<(), Error> {
        self.complete(Err(err))
    }

    pub fn try_complete(&self, result: Try<T>) -> bool {
        self.cell.try_complete(result)
    }

    pub fn try_success(&self, value: T) -> bool {
        self.try_complete(Ok(value))
    }

    pub fn try_failure(&self, err: Error) -> bool {
        self.try_complete(Err(err))
    }
}

impl<T: Clone + Send + Sync + 'static> Promise<T> {
    /// Completes this promise with whatever `other` completes with.
    ///
    /// Fails only if this promise is already completed at the time of the
    /// call; a direct completion racing with the forwarded one is settled by
    /// whichever lands first.
    pub fn complete_with(&self, other: &Future<T>) -> Result<(), Error> {
        if self.is_completed() {
            return Err(Error::AlreadyCompleted);
        }
        self.try_complete_with(other);
        Ok(())
    }

    pub fn try_complete_with(&self, other: &Future<T>) -> &Self {
        if !other.ptr_eq(&self.future) {
            let cell = self.cell.clone();
            other.on_complete(move |result| {
                cell.try_complete(result.clone());
            });
        }
        self
    }
}

impl<T: fmt::Debug> fmt::Debug for Promise<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Promise").field(&self.cell).finish()
    }
}
