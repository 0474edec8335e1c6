use super::{Executor, Job};
use crate::error::{catch, Error};
use crate::latch::CountDownLatch;
use parking_lot::{Condvar, Mutex};
use std::{collections::VecDeque, sync::Arc, thread, time::Duration};
use tracing::{debug, warn};

#[derive(Debug, Clone)]
pub struct ThreadPoolConfig {
    threads: usize,
    thread_name: String,
}

impl Default for ThreadPoolConfig {
    fn default() -> Self {
        Self {
            threads: thread::available_parallelism().map_or(1, |n| n.get()),
            thread_name: String::from("promise-out-worker"),
        }
    }
}

impl ThreadPoolConfig {
    /// Number of worker threads; at least one.
    pub fn threads(mut self, threads: usize) -> Self {
        self.threads = threads.max(1);
        self
    }

    /// Prefix for worker thread names; workers are suffixed with their index.
    pub fn thread_name(mut self, name: impl Into<String>) -> Self {
        self.thread_name = name.into();
        self
    }
}

/// A fixed set of worker threads draining one shared job queue.
#[derive(Debug)]
pub struct ThreadPoolExecutor {
    shared: Arc<Shared>,
}

#[derive(Debug)]
struct Shared {
    state: Mutex<State>,
    available: Condvar,
    terminated: CountDownLatch,
}

struct State {
    jobs: VecDeque<Job>,
    shutdown: bool,
}

impl std::fmt::Debug for State {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("State")
            .field("jobs", &self.jobs.len())
            .field("shutdown", &self.shutdown)
            .finish()
    }
}

impl ThreadPoolExecutor {
    pub fn new(config: ThreadPoolConfig) -> Result<Self, Error> {
        let shared = Arc::new(Shared {
            state: Mutex::new(State {
                jobs: VecDeque::new(),
                shutdown: false,
            }),
            available: Condvar::new(),
            terminated: CountDownLatch::new(config.threads),
        });
        let pool = Self { shared };
        for index in 0..config.threads {
            let shared = pool.shared.clone();
            let spawned = thread::Builder::new()
                .name(format!("{}-{index}", config.thread_name))
                .spawn(move || work(shared));
            if let Err(err) = spawned {
                pool.shutdown();
                for _ in index..config.threads {
                    pool.shared.terminated.count_down();
                }
                return Err(Error::failed(err));
            }
        }
        debug!(threads = config.threads, name = %config.thread_name, "thread pool started");
        Ok(pool)
    }

    pub fn with_threads(threads: usize) -> Result<Self, Error> {
        Self::new(ThreadPoolConfig::default().threads(threads))
    }

    /// Jobs waiting for a worker.
    pub fn queued(&self) -> usize {
        self.shared.state.lock().jobs.len()
    }
}

fn work(shared: Arc<Shared>) {
    loop {
        let job = {
            let mut state = shared.state.lock();
            loop {
                if let Some(job) = state.jobs.pop_front() {
                    break Some(job);
                }
                if state.shutdown {
                    break None;
                }
                shared.available.wait(&mut state);
            }
        };
        match job {
            Some(job) => {
                if let Err(err) = catch(job) {
                    warn!(error = %err, "job panicked");
                }
            }
            None => break,
        }
    }
    shared.terminated.count_down();
}

impl Executor for ThreadPoolExecutor {
    fn submit(&self, job: Job) -> Result<(), Error> {
        let mut state = self.shared.state.lock();
        if state.shutdown {
            return Err(Error::Rejected);
        }
        state.jobs.push_back(job);
        drop(state);
        self.shared.available.notify_one();
        Ok(())
    }

    fn shutdown(&self) {
        let mut state = self.shared.state.lock();
        if !state.shutdown {
            state.shutdown = true;
            debug!(queued = state.jobs.len(), "thread pool shutting down");
        }
        drop(state);
        self.shared.available.notify_all();
    }

    fn is_shutdown(&self) -> bool {
        self.shared.state.lock().shutdown
    }

    fn await_termination(&self, timeout: Duration) -> bool {
        self.shared.terminated.wait_timeout(timeout)
    }
}

impl Drop for ThreadPoolExecutor {
    /// Workers finish the queue and exit once the pool is gone.
    fn drop(&mut self) {
        self.shutdown();
    }
}
