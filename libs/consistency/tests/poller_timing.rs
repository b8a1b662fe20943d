//! Poller timing under a paused tokio clock

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;
use swapgate_config::PollerConfig;
use swapgate_consistency::{cancellation_pair, ConsistencyError, ConsistencyPoller};
use tokio::time::Instant;

/// Fetch that reports how many times it ran and turns good on attempt `good_from`
fn counting_fetch(
    calls: Arc<AtomicU32>,
    good_from: u32,
) -> impl FnMut() -> std::future::Ready<Option<u32>> {
    move || {
        let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
        std::future::ready(Some(n).filter(|n| *n >= good_from))
    }
}

#[tokio::test(start_paused = true)]
async fn test_good_first_fetch_returns_without_sleeping() {
    let poller = ConsistencyPoller::default();
    let calls = Arc::new(AtomicU32::new(0));
    let start = Instant::now();

    let value = poller
        .poll_until(
            counting_fetch(calls.clone(), 1),
            |_| true,
            Duration::from_secs(30),
            "pool snapshot",
        )
        .await
        .unwrap();

    assert_eq!(value, 1);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(start.elapsed(), Duration::ZERO);
}

#[tokio::test(start_paused = true)]
async fn test_backs_off_until_value_is_good() {
    let poller = ConsistencyPoller::default();
    let calls = Arc::new(AtomicU32::new(0));
    let start = Instant::now();

    let value = poller
        .poll_until(
            counting_fetch(calls.clone(), 3),
            |n| *n >= 3,
            Duration::from_secs(30),
            "lp position",
        )
        .await
        .unwrap();

    assert_eq!(value, 3);
    // 250ms then 500ms, each plus up to 250ms jitter
    let elapsed = start.elapsed();
    assert!(elapsed >= Duration::from_millis(750), "elapsed {:?}", elapsed);
    assert!(elapsed < Duration::from_millis(1_250), "elapsed {:?}", elapsed);
}

#[tokio::test(start_paused = true)]
async fn test_rejected_values_are_retried_like_missing_ones() {
    let poller = ConsistencyPoller::new(PollerConfig {
        max_jitter_ms: 0,
        ..PollerConfig::default()
    });
    let calls = Arc::new(AtomicU32::new(0));

    let value = poller
        .poll_until(
            counting_fetch(calls.clone(), 1),
            |n| *n == 4,
            Duration::from_secs(30),
            "reserves",
        )
        .await
        .unwrap();

    assert_eq!(value, 4);
}

#[tokio::test(start_paused = true)]
async fn test_times_out_at_deadline_without_overshooting() {
    let poller = ConsistencyPoller::new(PollerConfig {
        max_jitter_ms: 0,
        ..PollerConfig::default()
    });
    let calls = Arc::new(AtomicU32::new(0));
    let start = Instant::now();

    let err = poller
        .poll_until(
            counting_fetch(calls.clone(), u32::MAX),
            |_| true,
            Duration::from_millis(1_000),
            "pool snapshot",
        )
        .await
        .unwrap_err();

    // Fetches at 0, 250 and 750ms; the third wait is cut to the deadline
    match err {
        ConsistencyError::Timeout {
            description,
            attempts,
            elapsed_ms,
        } => {
            assert_eq!(description, "pool snapshot");
            assert_eq!(attempts, 3);
            assert!((1_000..=1_001).contains(&elapsed_ms), "elapsed {}", elapsed_ms);
        }
        other => panic!("expected timeout, got {:?}", other),
    }
    assert_eq!(calls.load(Ordering::SeqCst), 3);
    assert!(start.elapsed() <= Duration::from_millis(1_001));
}

#[tokio::test(start_paused = true)]
async fn test_default_wait_comes_from_config() {
    let poller = ConsistencyPoller::new(PollerConfig {
        default_max_wait_ms: 2_000,
        ..PollerConfig::default()
    });
    let start = Instant::now();

    let err = poller
        .poll_until_default(|| async { None::<u32> }, |_| true, "never visible")
        .await
        .unwrap_err();

    assert!(err.is_retryable());
    assert!(err.is_indeterminate());
    assert!(start.elapsed() <= Duration::from_millis(2_001));
}

#[tokio::test(start_paused = true)]
async fn test_cancellation_interrupts_the_wait() {
    let poller = ConsistencyPoller::default();
    let (canceller, signal) = cancellation_pair();
    let start = Instant::now();

    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        canceller.cancel();
    });

    let err = poller
        .poll_until_cancellable(
            || async { None::<u32> },
            |_| true,
            Duration::from_secs(30),
            "pool snapshot",
            signal,
        )
        .await
        .unwrap_err();

    assert_eq!(
        err,
        ConsistencyError::Cancelled {
            description: "pool snapshot".to_string(),
            attempts: 1,
        }
    );
    assert!(!err.is_retryable());
    // Cancelled mid-sleep, well before the first backoff would end
    assert!(start.elapsed() < Duration::from_millis(250));
}

#[tokio::test(start_paused = true)]
async fn test_already_cancelled_signal_fetches_nothing() {
    let poller = ConsistencyPoller::default();
    let (canceller, signal) = cancellation_pair();
    canceller.cancel();
    let calls = Arc::new(AtomicU32::new(0));

    let err = poller
        .poll_until_cancellable(
            counting_fetch(calls.clone(), 1),
            |_| true,
            Duration::from_secs(30),
            "pool snapshot",
            signal,
        )
        .await
        .unwrap_err();

    assert_eq!(err.attempts(), 0);
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn test_dropped_poll_future_abandons_the_poll() {
    let poller = ConsistencyPoller::default();
    let calls = Arc::new(AtomicU32::new(0));

    let outcome = tokio::time::timeout(
        Duration::from_millis(600),
        poller.poll_until(
            counting_fetch(calls.clone(), u32::MAX),
            |_| true,
            Duration::from_secs(30),
            "pool snapshot",
        ),
    )
    .await;
    assert!(outcome.is_err());

    let after_drop = calls.load(Ordering::SeqCst);
    tokio::time::sleep(Duration::from_secs(10)).await;
    assert_eq!(calls.load(Ordering::SeqCst), after_drop);
}

#[tokio::test(start_paused = true)]
async fn test_unbounded_wait_returns_good_first_fetch() {
    let poller = ConsistencyPoller::default();

    let value = poller
        .poll_until(|| async { Some(1u32) }, |_| true, Duration::MAX, "forever")
        .await
        .unwrap();

    assert_eq!(value, 1);
}

#[tokio::test(start_paused = true)]
async fn test_unbounded_wait_keeps_polling_past_default_deadline() {
    let poller = ConsistencyPoller::new(PollerConfig {
        max_jitter_ms: 0,
        ..PollerConfig::default()
    });
    let calls = Arc::new(AtomicU32::new(0));
    let start = Instant::now();

    // Backoff caps at 2s, so the 40th attempt lands well past a minute
    let value = poller
        .poll_until(
            counting_fetch(calls.clone(), 40),
            |n| *n >= 40,
            Duration::MAX,
            "slow indexer",
        )
        .await
        .unwrap();

    assert_eq!(value, 40);
    assert!(start.elapsed() > Duration::from_secs(60));
}

#[tokio::test(start_paused = true)]
async fn test_unbounded_wait_still_honours_cancellation() {
    let poller = ConsistencyPoller::default();
    let (canceller, signal) = cancellation_pair();

    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(120)).await;
        canceller.cancel();
    });

    let err = poller
        .poll_until_cancellable(
            || async { None::<u32> },
            |_| true,
            Duration::MAX,
            "forever",
            signal,
        )
        .await
        .unwrap_err();

    assert!(matches!(err, ConsistencyError::Cancelled { .. }));
}
