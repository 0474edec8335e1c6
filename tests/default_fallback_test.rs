use promise_out::executor::{register_provider, set_default_provider};
use promise_out::{Error, Executor, Future};
use std::{sync::Arc, thread, time::Duration};

#[test]
fn test_failing_provider_falls_back_to_thread_pool() {
    register_provider("broken", || -> Result<Arc<dyn Executor>, Error> {
        Err(Error::msg("cannot build"))
    });
    set_default_provider("broken").unwrap();

    let caller = thread::current().id();
    let future = Future::spawn(move || Ok(thread::current().id() != caller));
    assert!(future.result(Duration::from_secs(5)).unwrap());

    let failed = Future::<i32>::spawn(|| Err(Error::msg("computation failed")));
    assert_eq!(
        failed.result(Duration::from_secs(5)).unwrap_err().to_string(),
        "computation failed"
    );
}
