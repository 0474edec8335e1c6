//! The write-once slot shared by a [`Promise`](crate::Promise) and its
//! [`Future`](crate::Future)s.
//!
//! The result is published through a `OnceCell`, which is the single-writer
//! gate: exactly one `complete` wins. Listeners are boxed `FnOnce`s; a
//! listener is either fired in place (the cell was already completed) or
//! pushed onto the pending list, and the winning `complete` takes the whole
//! list out in one move. A listener therefore runs at most once because it is
//! consumed when it runs, and at least once because registration checks the
//! result under the same lock the completer drains under.
//!
//! The lock only guards pushing onto and taking the list. Callbacks always
//! run with no lock held.
use crate::error::{catch, Error, Try};
use crate::latch::CountDownLatch;
use once_cell::sync::OnceCell;
use parking_lot::Mutex;
use std::{fmt, sync::Arc};
use tracing::{trace, warn};

pub(crate) type Callback<T> = Box<dyn FnOnce(&Try<T>) + Send + 'static>;

pub(crate) struct CompletionCell<T> {
    result: OnceCell<Try<T>>,
    listeners: Mutex<Vec<Callback<T>>>,
    latch: OnceCell<Arc<CountDownLatch>>,
}

impl<T: Send + Sync + 'static> CompletionCell<T> {
    pub fn new() -> Self {
        Self {
            result: OnceCell::new(),
            listeners: Mutex::new(Vec::new()),
            latch: OnceCell::new(),
        }
    }

    pub fn completed(result: Try<T>) -> Self {
        Self {
            result: OnceCell::with_value(result),
            listeners: Mutex::new(Vec::new()),
            latch: OnceCell::new(),
        }
    }

    pub fn value(&self) -> Option<&Try<T>> {
        self.result.get()
    }

    pub fn is_completed(&self) -> bool {
        self.result.get().is_some()
    }

    /// Stores `result` if the cell is empty and notifies every pending
    /// listener from the calling thread.
    pub fn complete(&self, result: Try<T>) -> Result<(), Error> {
        if self.result.set(result).is_err() {
            return Err(Error::AlreadyCompleted);
        }
        let pending = std::mem::take(&mut *self.listeners.lock());
        trace!(listeners = pending.len(), "cell completed");
        if let Some(result) = self.result.get() {
            for listener in pending {
                fire(listener, result);
            }
        }
        Ok(())
    }

    pub fn try_complete(&self, result: Try<T>) -> bool {
        self.complete(result).is_ok()
    }

    /// Runs `callback` now if the cell is completed, otherwise once the cell
    /// completes.
    pub fn add_listener(&self, callback: Callback<T>) {
        if let Some(result) = self.result.get() {
            fire(callback, result);
            return;
        }
        let mut listeners = self.listeners.lock();
        match self.result.get() {
            Some(result) => {
                drop(listeners);
                fire(callback, result);
            }
            None => listeners.push(callback),
        }
    }

    /// A latch that opens when the cell completes, shared by every blocking
    /// waiter on this cell.
    pub fn latch(&self) -> Arc<CountDownLatch> {
        self.latch
            .get_or_init(|| {
                let latch = Arc::new(CountDownLatch::new(1));
                let release = latch.clone();
                self.add_listener(Box::new(move |_| release.count_down()));
                latch
            })
            .clone()
    }

    #[cfg(test)]
    fn pending(&self) -> usize {
        self.listeners.lock().len()
    }
}

fn fire<T>(callback: Callback<T>, result: &Try<T>) {
    if let Err(err) = catch(|| callback(result)) {
        warn!(error = %err, "listener panicked; ignoring");
    }
}

impl<T: fmt::Debug> fmt::Debug for CompletionCell<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompletionCell")
            .field("result", &self.result.get())
            .field("listeners", &self.listeners.lock().len())
            .finish()
    }
}
