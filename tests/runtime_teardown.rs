//! Runtime teardown after a shutdown that timed out on a blocking procedure.

use std::time::{Duration, Instant};

use graceful_closer::{Closer, ShutdownOutcome};

const GRACE_PERIOD: Duration = Duration::from_millis(200);
const STUCK_FOR: Duration = Duration::from_secs(4);

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .unwrap()
}

#[test]
fn shutdown_timeout_bounds_teardown_after_stuck_procedure() {
    let runtime = runtime();
    let start = Instant::now();

    let outcome = runtime.block_on(async {
        let closer = Closer::builder().grace_period(GRACE_PERIOD).build();
        closer.add_action(|| std::thread::sleep(STUCK_FOR));
        closer.close().await;
        closer.completion().outcome()
    });
    let waited = start.elapsed();

    runtime.shutdown_timeout(Duration::from_millis(100));
    let total = start.elapsed();

    assert_eq!(outcome, Some(ShutdownOutcome::TimedOut));
    assert!(waited >= GRACE_PERIOD, "wait returned early: {:?}", waited);
    assert!(total < STUCK_FOR / 2, "teardown waited for the procedure: {:?}", total);
}

#[test]
fn shutdown_background_returns_immediately() {
    let runtime = runtime();
    let start = Instant::now();

    runtime.block_on(async {
        let closer = Closer::builder().grace_period(GRACE_PERIOD).build();
        closer.add_action(|| std::thread::sleep(STUCK_FOR));
        closer.close().await;
    });

    runtime.shutdown_background();
    assert!(start.elapsed() < STUCK_FOR / 2, "teardown blocked: {:?}", start.elapsed());
}
