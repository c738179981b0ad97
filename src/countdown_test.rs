use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use super::*;

fn flag() -> (Arc<AtomicBool>, impl FnOnce() + Send + 'static) {
    let fired = Arc::new(AtomicBool::new(false));
    let hook = fired.clone();
    (fired, move || hook.store(true, Ordering::SeqCst))
}

#[tokio::test]
async fn expires_and_runs_hook() {
    let (fired, on_expire) = flag();
    let countdown = LogoutCountdown::start(3, Duration::from_millis(10), on_expire);
    assert_eq!(countdown.remaining(), 3);

    let rx = countdown.subscribe();
    assert_eq!(countdown.wait().await, CountdownOutcome::Expired);
    assert!(fired.load(Ordering::SeqCst));
    assert_eq!(*rx.borrow(), 0);
}

#[tokio::test]
async fn cancel_skips_hook() {
    let (fired, on_expire) = flag();
    let mut countdown = LogoutCountdown::start(3, Duration::from_secs(5), on_expire);
    countdown.cancel();

    assert_eq!(countdown.wait().await, CountdownOutcome::Cancelled);
    assert!(!fired.load(Ordering::SeqCst));
}

#[tokio::test]
async fn counts_down_one_per_tick() {
    let (_, on_expire) = flag();
    let countdown = LogoutCountdown::start(2, Duration::from_millis(50), on_expire);
    let mut rx = countdown.subscribe();

    rx.changed().await.unwrap();
    assert_eq!(*rx.borrow_and_update(), 1);
    assert_eq!(countdown.wait().await, CountdownOutcome::Expired);
}

#[tokio::test]
async fn zero_seconds_expires_immediately() {
    let (fired, on_expire) = flag();
    let countdown = LogoutCountdown::start(0, Duration::from_secs(5), on_expire);
    assert_eq!(countdown.wait().await, CountdownOutcome::Expired);
    assert!(fired.load(Ordering::SeqCst));
}
