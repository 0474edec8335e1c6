//! Write-once promises and futures.
//!
//! A [`Promise`] is completed at most once, with a value or an [`Error`].
//! Its [`Future`]s observe the result: callbacks registered before
//! completion run exactly once on the completing thread, callbacks
//! registered afterwards run immediately on the registering thread.
//! Combinators (`map`, `flat_map`, `filter`, `recover`, [`sequence`], ...)
//! derive new futures without blocking, and `ready`/`result` bridge to
//! synchronous callers with a timeout.
//!
//! # Examples
//!
//! ```
//! use promise_out::{sequence, Future, Promise};
//! use std::{thread, time::Duration};
//!
//! let promise = Promise::<u32>::new();
//! let total = sequence(vec![promise.future(), Future::successful(2)])
//!     .map(|values| values.iter().sum::<u32>());
//!
//! let task = thread::spawn(move || promise.success(1));
//! task.join().expect("The task thread has panicked").unwrap();
//! assert_eq!(total.result(Duration::from_secs(5)).unwrap(), 3);
//! ```
mod cell;
mod combinator;
mod error;
pub mod executor;
mod future;
pub mod latch;
mod promise;

pub use combinator::{first_completed_of, sequence, traverse};
pub use error::{Error, Try};
pub use executor::{Executor, ExecutorExt};
pub use future::Future;
pub use promise::{pair, Promise};
