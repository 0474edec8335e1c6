use std::{any::Any, fmt::Debug, sync::Arc, time::Duration};
use thiserror::Error;

/// The outcome of a computation: the value, or the error it failed with.
pub type Try<T> = Result<T, Error>;

/// Everything that can go wrong while completing or observing a promise.
///
/// `Error` is `Clone` because one stored outcome is handed to every reader of
/// a future.
#[derive(Debug, Clone, Error)]
pub enum Error {
    /// A promise was completed a second time.
    #[error("promise already completed")]
    AlreadyCompleted,
    /// `filter` rejected the value.
    #[error("predicate does not hold for {0}")]
    NoSuchElement(String),
    #[error("timed out after {0:?}")]
    Timeout(Duration),
    /// The task returned without completing its promise.
    #[error("no response provided by task")]
    MissingResponse,
    /// The executor no longer accepts work.
    #[error("executor has been shut down")]
    Rejected,
    #[error("panicked: {0}")]
    Panicked(String),
    #[error(transparent)]
    Failed(Arc<dyn std::error::Error + Send + Sync>),
    #[error("{0}")]
    Message(String),
}

impl Error {
    pub fn msg(message: impl Into<String>) -> Self {
        Error::Message(message.into())
    }

    /// Wraps a user error so it can travel through futures.
    pub fn failed<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Error::Failed(Arc::new(err))
    }

    pub(crate) fn rejected_value<T: Debug>(value: &T) -> Self {
        Error::NoSuchElement(format!("{value:?}"))
    }

    /// Turns a payload caught by `catch_unwind` into a failure.
    pub fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&'static str>() {
            (*s).to_owned()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "unknown panic payload".to_owned()
        };
        Error::Panicked(message)
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Error::Timeout(_))
    }

    pub fn is_already_completed(&self) -> bool {
        matches!(self, Error::AlreadyCompleted)
    }

    pub fn is_no_such_element(&self) -> bool {
        matches!(self, Error::NoSuchElement(_))
    }
}

/// Runs a user closure, turning a panic into `Error::Panicked`.
pub(crate) fn catch<R>(f: impl FnOnce() -> R) -> Try<R> {
    std::panic::catch_unwind(std::panic::AssertUnwindSafe(f)).map_err(Error::from_panic)
}
