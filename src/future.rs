use crate::cell::CompletionCell;
use crate::error::{Error, Try};
use crate::executor::{default_executor, ExecutorExt};
use futures::task::AtomicWaker;
use std::{
    fmt,
    pin::Pin,
    sync::Arc,
    task::{Context, Poll},
    time::Duration,
};

/// The read side of a [`Promise`](crate::Promise).
///
/// A `Future` is a cheap handle onto a completion cell; clones observe the
/// same cell. Callbacks registered on a pending future run on whichever
/// thread completes it; on a completed future they run immediately on the
/// registering thread.
///
/// `Future` also implements [`std::future::Future`], so it can be awaited.
///
/// # Examples
///
/// ```
/// use promise_out::Promise;
/// use std::{thread, time::Duration};
///
/// let promise = Promise::<i32>::new();
/// let doubled = promise.future().map(|x| x * 2);
/// thread::spawn(move || promise.success(9));
/// assert_eq!(doubled.result(Duration::from_secs(5)).unwrap(), 18);
/// ```
pub struct Future<T> {
    cell: Arc<CompletionCell<T>>,
    waker: Option<Arc<AtomicWaker>>,
}

impl<T> Clone for Future<T> {
    fn clone(&self) -> Self {
        Self {
            cell: self.cell.clone(),
            waker: None,
        }
    }
}

impl<T: Send + Sync + 'static> Future<T> {
    pub(crate) fn from_cell(cell: Arc<CompletionCell<T>>) -> Self {
        Self { cell, waker: None }
    }

    pub fn successful(value: T) -> Self {
        Self::from_try(Ok(value))
    }

    pub fn failed(err: Error) -> Self {
        Self::from_try(Err(err))
    }

    pub fn from_try(result: Try<T>) -> Self {
        Self::from_cell(Arc::new(CompletionCell::completed(result)))
    }

    /// Runs `f` on the default executor.
    pub fn spawn<F>(f: F) -> Self
    where
        F: FnOnce() -> Try<T> + Send + 'static,
    {
        default_executor().execute(move |promise| {
            promise.try_complete(f());
        })
    }

    pub fn is_completed(&self) -> bool {
        self.cell.is_completed()
    }

    /// True when both handles observe the same cell.
    pub fn ptr_eq(&self, other: &Future<T>) -> bool {
        Arc::ptr_eq(&self.cell, &other.cell)
    }

    pub fn on_complete<F>(&self, f: F)
    where
        F: FnOnce(&Try<T>) + Send + 'static,
    {
        self.cell.add_listener(Box::new(f));
    }

    pub fn on_success<F>(&self, f: F)
    where
        F: FnOnce(&T) + Send + 'static,
    {
        self.on_complete(move |result| {
            if let Ok(value) = result {
                f(value)
            }
        });
    }

    pub fn on_failure<F>(&self, f: F)
    where
        F: FnOnce(&Error) + Send + 'static,
    {
        self.on_complete(move |result| {
            if let Err(err) = result {
                f(err)
            }
        });
    }

    /// Blocks until the future completes.
    ///
    /// Returns `Error::Timeout` if `timeout` elapses first. Timing out does
    /// not stop whatever is computing the value.
    pub fn ready(&self, timeout: Duration) -> Result<&Self, Error> {
        if self.is_completed() || self.cell.latch().wait_timeout(timeout) {
            Ok(self)
        } else {
            Err(Error::Timeout(timeout))
        }
    }
}

impl<T: Clone + Send + Sync + 'static> Future<T> {
    /// The result, if the future has completed. Never blocks.
    pub fn value(&self) -> Option<Try<T>> {
        self.cell.value().cloned()
    }

    /// Blocks for at most `timeout`, then returns the value or the failure
    /// the future completed with.
    pub fn result(&self, timeout: Duration) -> Try<T> {
        self.ready(timeout)?;
        self.value().unwrap_or(Err(Error::Timeout(timeout)))
    }

    /// Blocks with no bound.
    pub fn wait(&self) -> Try<T> {
        loop {
            if let Some(result) = self.value() {
                return result;
            }
            self.cell.latch().wait();
        }
    }
}

impl<T: Clone + Send + Sync + 'static> std::future::Future for Future<T> {
    type Output = Try<T>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        if let Some(result) = self.value() {
            return Poll::Ready(result);
        }
        let this = &mut *self;
        let waker = match this.waker.clone() {
            Some(waker) => waker,
            None => {
                let waker = Arc::new(AtomicWaker::new());
                let wake = waker.clone();
                this.cell.add_listener(Box::new(move |_| wake.wake()));
                this.waker = Some(waker.clone());
                waker
            }
        };
        waker.register(cx.waker());
        match this.value() {
            Some(result) => Poll::Ready(result),
            None => Poll::Pending,
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Future<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Future").field(&self.cell).finish()
    }
}
