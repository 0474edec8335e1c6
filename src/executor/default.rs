//! The process-wide default executor.
//!
//! The default is built once, on first use. An embedding application can
//! supply its own by registering a named [`ExecutorProvider`] and selecting
//! it, either with [`set_default_provider`] or through the
//! `PROMISE_OUT_EXECUTOR` environment variable. If nothing is selected, the
//! selected name is unknown, or the provider fails, the built-in thread pool
//! is used.
use super::{Executor, InlineExecutor, ThreadPoolConfig, ThreadPoolExecutor};
use crate::error::{catch, Error};
use once_cell::sync::{Lazy, OnceCell};
use parking_lot::Mutex;
use std::{collections::HashMap, sync::Arc};
use tracing::{debug, warn};

/// Environment variable naming the provider of the default executor.
pub const EXECUTOR_ENV: &str = "PROMISE_OUT_EXECUTOR";

pub trait ExecutorProvider: Send + Sync {
    /// Builds the executor. Must not call [`default_executor`].
    fn create(&self) -> Result<Arc<dyn Executor>, Error>;
}

impl<F> ExecutorProvider for F
where
    F: Fn() -> Result<Arc<dyn Executor>, Error> + Send + Sync,
{
    fn create(&self) -> Result<Arc<dyn Executor>, Error> {
        self()
    }
}

static PROVIDERS: Lazy<Mutex<HashMap<String, Arc<dyn ExecutorProvider>>>> =
    Lazy::new(|| Mutex::new(HashMap::new()));
static SELECTED: Lazy<Mutex<Option<String>>> = Lazy::new(|| Mutex::new(None));
static DEFAULT: OnceCell<Arc<dyn Executor>> = OnceCell::new();

pub fn register_provider(name: impl Into<String>, provider: impl ExecutorProvider + 'static) {
    PROVIDERS.lock().insert(name.into(), Arc::new(provider));
}

/// Selects the provider to build the default executor with. Takes precedence
/// over the environment variable. Fails once the default has been built.
pub fn set_default_provider(name: impl Into<String>) -> Result<(), Error> {
    if DEFAULT.get().is_some() {
        return Err(Error::msg("default executor already initialized"));
    }
    *SELECTED.lock() = Some(name.into());
    Ok(())
}

pub fn default_executor() -> Arc<dyn Executor> {
    DEFAULT.get_or_init(build_default).clone()
}

fn build_default() -> Arc<dyn Executor> {
    let selected = SELECTED.lock().clone();
    if let Some(name) = selected.or_else(|| std::env::var(EXECUTOR_ENV).ok()) {
        let provider = PROVIDERS.lock().get(&name).cloned();
        match provider.map(|provider| catch(|| provider.create()).and_then(|created| created)) {
            Some(Ok(executor)) => {
                debug!(provider = %name, "default executor built by provider");
                return executor;
            }
            Some(Err(err)) => warn!(
                provider = %name,
                error = %err,
                "executor provider failed; using the built-in thread pool"
            ),
            None => warn!(
                provider = %name,
                "no executor provider with this name; using the built-in thread pool"
            ),
        }
    }
    match ThreadPoolExecutor::new(ThreadPoolConfig::default()) {
        Ok(pool) => Arc::new(pool),
        Err(err) => {
            warn!(error = %err, "could not start the built-in thread pool; running tasks inline");
            Arc::new(InlineExecutor::new())
        }
    }
}
