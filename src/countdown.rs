//! Timed logout prompt.
//!
//! DESIGN
//! ======
//! A background task counts down once per tick and publishes the remaining
//! count on a `watch` channel so a prompt can render it. At zero it runs
//! `on_expire` (normally [`AuthGateway::logout`](crate::AuthGateway::logout)).
//! Cancelling, or dropping the countdown, stops the task before that point.

use std::time::Duration;

use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;

/// Seconds the logout prompt waits before signing out.
pub const DEFAULT_COUNTDOWN_SECS: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownOutcome {
    Expired,
    Cancelled,
}

#[derive(Debug)]
pub struct LogoutCountdown {
    remaining: watch::Receiver<u32>,
    cancel: Option<oneshot::Sender<()>>,
    handle: JoinHandle<CountdownOutcome>,
}

impl LogoutCountdown {
    /// Spawn the countdown. Must be called inside a tokio runtime.
    pub fn start<F>(seconds: u32, tick: Duration, on_expire: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        let (tx, remaining) = watch::channel(seconds);
        let (cancel, mut cancelled) = oneshot::channel::<()>();

        let handle = tokio::spawn(async move {
            let mut left = seconds;
            while left > 0 {
                tokio::select! {
                    _ = &mut cancelled => {
                        tracing::debug!(left, "logout countdown cancelled");
                        return CountdownOutcome::Cancelled;
                    }
                    () = tokio::time::sleep(tick) => {}
                }
                left -= 1;
                tx.send_replace(left);
            }
            on_expire();
            tracing::info!("logout countdown expired");
            CountdownOutcome::Expired
        });

        Self { remaining, cancel: Some(cancel), handle }
    }

    #[must_use]
    pub fn remaining(&self) -> u32 {
        *self.remaining.borrow()
    }

    /// Receiver that sees every published count.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<u32> {
        self.remaining.clone()
    }

    /// Stop the countdown. `on_expire` will not run unless it already has.
    pub fn cancel(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            let _ = cancel.send(());
        }
    }

    /// Wait for the countdown to finish either way.
    pub async fn wait(self) -> CountdownOutcome {
        let Self { cancel, handle, .. } = self;
        let outcome = handle.await.unwrap_or(CountdownOutcome::Cancelled);
        drop(cancel);
        outcome
    }
}

#[cfg(test)]
#[path = "countdown_test.rs"]
mod tests;
