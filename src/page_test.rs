// Unit tests for the bounded wait helpers

use super::*;
use std::sync::atomic::{AtomicUsize, Ordering};

#[tokio::test(start_paused = true)]
async fn test_within_ready() {
    let result = within(Duration::from_secs(1), async { Ok(7) }).await.unwrap();
    assert_eq!(result, Wait::Ready(7));
}

#[tokio::test(start_paused = true)]
async fn test_within_times_out() {
    let result: Wait<()> = within(Duration::from_secs(5), std::future::pending())
        .await
        .unwrap();
    assert!(result.timed_out());
}

#[tokio::test(start_paused = true)]
async fn test_within_propagates_error() {
    let result: Result<Wait<()>> =
        within(Duration::from_secs(1), async { anyhow::bail!("driver gone") }).await;
    assert!(result.is_err());
}

#[tokio::test(start_paused = true)]
async fn test_poll_until_eventually_ready() {
    let counter = AtomicUsize::new(0);
    let calls = &counter;
    let result = poll_until(Duration::from_secs(2), Duration::from_millis(100), move || async move {
        let n = calls.fetch_add(1, Ordering::SeqCst);
        Ok((n >= 3).then_some(n))
    })
    .await
    .unwrap();

    assert_eq!(result, Wait::Ready(3));
    assert_eq!(counter.load(Ordering::SeqCst), 4);
}

#[tokio::test(start_paused = true)]
async fn test_poll_until_times_out() {
    let result: Wait<()> =
        poll_until(Duration::from_secs(1), Duration::from_millis(100), || async { Ok(None) })
            .await
            .unwrap();
    assert_eq!(result, Wait::TimedOut);
}

#[tokio::test(start_paused = true)]
async fn test_poll_until_stops_on_error() {
    let counter = AtomicUsize::new(0);
    let calls = &counter;
    let result: Result<Wait<()>> =
        poll_until(Duration::from_secs(1), Duration::from_millis(100), move || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            anyhow::bail!("stale session")
        })
        .await;

    assert!(result.is_err());
    assert_eq!(counter.load(Ordering::SeqCst), 1);
}
