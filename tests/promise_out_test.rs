#[cfg(test)]
mod tests {
    use promise_out::executor::{ThreadPoolConfig, ThreadPoolExecutor};
    use promise_out::{sequence, traverse, Error, Executor, ExecutorExt, Future, Promise};
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Barrier, Once,
    };
    use std::{thread, time::Duration};

    const WAIT: Duration = Duration::from_secs(5);

    static INIT_LOGGING: Once = Once::new();

    fn init_test_logging() {
        INIT_LOGGING.call_once(|| {
            let _ = tracing_subscriber::fmt()
                .with_max_level(tracing::Level::TRACE)
                .with_test_writer()
                .with_thread_ids(true)
                .try_init();
        });
    }

    #[test]
    fn test_promise_out() {
        init_test_logging();
        let promise = Promise::<i32>::new();
        let promise_clone = promise.clone();

        thread::spawn(move || {
            thread::sleep(Duration::from_millis(50));
            promise_clone.success(42).unwrap();
        });

        let result = promise.future().result(WAIT).unwrap();
        assert_eq!(result, 42);
    }

    #[test]
    fn test_every_listener_fires_exactly_once() {
        init_test_logging();
        for _ in 0..20 {
            let promise = Promise::<usize>::new();
            let hits = Arc::new(AtomicUsize::new(0));
            let sum = Arc::new(AtomicUsize::new(0));
            let barrier = Arc::new(Barrier::new(9));
            let registrars: Vec<_> = (0..4)
                .map(|_| {
                    let future = promise.future();
                    let (hits, sum, barrier) = (hits.clone(), sum.clone(), barrier.clone());
                    thread::spawn(move || {
                        barrier.wait();
                        for _ in 0..50 {
                            let (hits, sum) = (hits.clone(), sum.clone());
                            future.on_complete(move |result| {
                                hits.fetch_add(1, Ordering::SeqCst);
                                sum.fetch_add(*result.as_ref().unwrap(), Ordering::SeqCst);
                            });
                        }
                    })
                })
                .collect();
            let completers: Vec<_> = (1..=4)
                .map(|value| {
                    let (promise, barrier) = (promise.clone(), barrier.clone());
                    thread::spawn(move || {
                        barrier.wait();
                        promise.try_success(value)
                    })
                })
                .collect();
            barrier.wait();
            for registrar in registrars {
                registrar.join().expect("The registrar thread has panicked");
            }
            let wins = completers
                .into_iter()
                .map(|c| c.join().expect("The completer thread has panicked"))
                .filter(|won| *won)
                .count();
            assert_eq!(wins, 1);

            let winner = promise.future().result(WAIT).unwrap();
            assert_eq!(hits.load(Ordering::SeqCst), 200);
            assert_eq!(sum.load(Ordering::SeqCst), 200 * winner);
        }
    }

    #[test]
    fn test_pipeline_on_thread_pool() {
        init_test_logging();
        let pool = ThreadPoolExecutor::new(ThreadPoolConfig::default().threads(4)).unwrap();
        let squares: Vec<Future<u64>> = (0..10u64)
            .map(|n| {
                pool.execute(move |promise| {
                    thread::sleep(Duration::from_millis(10 - n));
                    promise.try_success(n * n);
                })
            })
            .collect();
        let total = sequence(squares)
            .filter(|values| values.len() == 10)
            .map(|values| values.into_iter().sum::<u64>());
        assert_eq!(total.result(WAIT).unwrap(), 285);

        pool.shutdown();
        assert!(pool.await_termination(WAIT));
    }

    #[test]
    fn test_traverse_reverse_completion_order() {
        init_test_logging();
        let promises: Vec<_> = (0..3).map(|_| Promise::<&'static str>::new()).collect();
        let futures: Vec<_> = promises.iter().map(Promise::future).collect();
        let all = traverse(0..3, move |i| futures[i].map(|s| s.to_uppercase()));
        promises[2].success("c").unwrap();
        promises[1].success("b").unwrap();
        promises[0].success("a").unwrap();
        assert_eq!(all.result(WAIT).unwrap(), vec!["A", "B", "C"]);
    }

    #[test]
    fn test_recover_after_remote_failure() {
        init_test_logging();
        let pool = ThreadPoolExecutor::with_threads(1).unwrap();
        let answer = pool
            .execute(|promise: &Promise<i32>| {
                promise.try_failure(Error::msg("service down"));
            })
            .recover(|err| if err.to_string() == "service down" { -1 } else { 0 });
        assert_eq!(answer.result(WAIT).unwrap(), -1);
    }

    #[test]
    fn test_filter_on_successful() {
        init_test_logging();
        let err = Future::successful(5).filter(|x| *x > 10).result(WAIT).unwrap_err();
        assert!(matches!(err, Error::NoSuchElement(_)));
    }
}
