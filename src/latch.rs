//! A count-down latch: threads block until the count reaches zero.
//!
//! Once open, a latch stays open; later `count_down` calls are no-ops and
//! every waiter, present or future, passes straight through.
use parking_lot::{Condvar, Mutex};
use std::time::{Duration, Instant};

#[derive(Debug)]
pub struct CountDownLatch {
    count: Mutex<usize>,
    open: Condvar,
}

impl CountDownLatch {
    pub fn new(count: usize) -> Self {
        Self {
            count: Mutex::new(count),
            open: Condvar::new(),
        }
    }

    pub fn count_down(&self) {
        let mut count = self.count.lock();
        if *count == 0 {
            return;
        }
        *count -= 1;
        if *count == 0 {
            self.open.notify_all();
        }
    }

    pub fn count(&self) -> usize {
        *self.count.lock()
    }

    pub fn wait(&self) {
        let mut count = self.count.lock();
        while *count > 0 {
            self.open.wait(&mut count);
        }
    }

    /// Returns `false` if `timeout` elapsed before the latch opened.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let Some(deadline) = Instant::now().checked_add(timeout) else {
            self.wait();
            return true;
        };
        let mut count = self.count.lock();
        while *count > 0 {
            if self.open.wait_until(&mut count, deadline).timed_out() {
                return *count == 0;
            }
        }
        true
    }
}
