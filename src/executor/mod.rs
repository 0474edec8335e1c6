//! Running work that reports to a promise.
//!
//! An [`Executor`] only knows how to run boxed jobs. [`ExecutorExt`] builds
//! the promise harness on top: every task gets a fresh promise, and a task
//! that returns (or panics) without completing it fails the future instead
//! of leaving it pending.
use crate::error::{catch, Error};
use crate::future::Future;
use crate::promise::Promise;
use std::{
    sync::atomic::{AtomicBool, Ordering},
    time::Duration,
};
use tracing::warn;

mod default;
mod thread_pool;

pub use default::{
    default_executor, register_provider, set_default_provider, ExecutorProvider, EXECUTOR_ENV,
};
pub use thread_pool::{ThreadPoolConfig, ThreadPoolExecutor};

pub type Job = Box<dyn FnOnce() + Send + 'static>;

pub trait Executor: Send + Sync {
    /// Queues `job`. Fails with `Error::Rejected` after shutdown.
    fn submit(&self, job: Job) -> Result<(), Error>;

    /// Stops accepting work. Already queued jobs still run.
    fn shutdown(&self);

    fn is_shutdown(&self) -> bool;

    /// Blocks until every queued job has run after a shutdown, or `timeout`
    /// elapses. Returns whether the executor terminated.
    fn await_termination(&self, timeout: Duration) -> bool;
}

pub trait ExecutorExt: Executor {
    /// Runs `task` with a fresh promise and returns that promise's future.
    ///
    /// # Examples
    ///
    /// ```
    /// use promise_out::executor::{ExecutorExt, ThreadPoolExecutor, ThreadPoolConfig};
    /// use std::time::Duration;
    ///
    /// let pool = ThreadPoolExecutor::new(ThreadPoolConfig::default().threads(2)).unwrap();
    /// let answer = pool.execute(|promise| {
    ///     promise.try_success(42);
    /// });
    /// assert_eq!(answer.result(Duration::from_secs(5)).unwrap(), 42);
    /// ```
    fn execute<T, F>(&self, task: F) -> Future<T>
    where
        T: Send + Sync + 'static,
        F: FnOnce(&Promise<T>) + Send + 'static,
    {
        let promise = Promise::new();
        let future = promise.future();
        let reporter = promise.clone();
        if let Err(err) = self.submit(Box::new(move || run_task(task, &reporter))) {
            promise.try_failure(err);
        }
        future
    }

    fn execute_all<T, F, I>(&self, tasks: I) -> Vec<Future<T>>
    where
        T: Send + Sync + 'static,
        F: FnOnce(&Promise<T>) + Send + 'static,
        I: IntoIterator<Item = F>,
    {
        tasks.into_iter().map(|task| self.execute(task)).collect()
    }
}

impl<E: Executor + ?Sized> ExecutorExt for E {}

fn run_task<T, F>(task: F, promise: &Promise<T>)
where
    T: Send + Sync + 'static,
    F: FnOnce(&Promise<T>),
{
    match catch(|| task(promise)) {
        Ok(()) => {
            if promise.try_failure(Error::MissingResponse) {
                warn!("task returned without completing its promise");
            }
        }
        Err(err) => {
            promise.try_failure(err);
        }
    }
}

/// Runs every job on the submitting thread.
#[derive(Debug, Default)]
pub struct InlineExecutor {
    shutdown: AtomicBool,
}

impl InlineExecutor {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Executor for InlineExecutor {
    fn submit(&self, job: Job) -> Result<(), Error> {
        if self.is_shutdown() {
            return Err(Error::Rejected);
        }
        if let Err(err) = catch(job) {
            warn!(error = %err, "job panicked");
        }
        Ok(())
    }

    fn shutdown(&self) {
        self.shutdown.store(true, Ordering::Release);
    }

    fn is_shutdown(&self) -> bool {
        self.shutdown.load(Ordering::Acquire)
    }

    fn await_termination(&self, _timeout: Duration) -> bool {
        self.is_shutdown()
    }
}
