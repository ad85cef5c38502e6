//! Cancellable notification-count poll.
//!
//! The one background loop this core runs: a periodic `GET
//! /notifications/count` that publishes counts on a `watch` channel. The
//! loop awaits each poll before the next tick and skips missed ticks, so it
//! can never overlap with itself; the handle aborts the task on `cancel()`
//! or drop, so the poll dies with the component that owns it.

use std::time::Duration;

use tokio::sync::watch;
use tokio::time::MissedTickBehavior;

use gatehouse_core::constants::NOTIFICATION_COUNT_PATH;
use gatehouse_core::error::CoreError;

use crate::http::ApiClient;
use crate::wire::NotificationCounts;

/// Handle to a running notification poll.
pub struct NotificationPoll {
    handle: tokio::task::JoinHandle<()>,
}

impl NotificationPoll {
    /// Spawns the poll. Returns the handle and a receiver that always holds
    /// the most recent counts (initially zero).
    ///
    /// The loop stops on its own when the session ends or every receiver is
    /// dropped; transient failures are logged and retried on the next tick.
    #[must_use]
    pub fn spawn(api: ApiClient, period: Duration) -> (Self, watch::Receiver<NotificationCounts>) {
        let (tx, rx) = watch::channel(NotificationCounts::default());

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                ticker.tick().await;

                match api.get_json::<NotificationCounts>(NOTIFICATION_COUNT_PATH).await {
                    Ok(counts) => {
                        if tx.send(counts).is_err() {
                            tracing::debug!("All receivers dropped, stopping notification poll");
                            break;
                        }
                    }
                    Err(CoreError::SessionExpired) => {
                        tracing::debug!("Session ended, stopping notification poll");
                        break;
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "Notification poll failed, retrying next tick");
                    }
                }
            }
        });

        (Self { handle }, rx)
    }

    /// Stops the poll. Idempotent; also happens on drop.
    pub fn cancel(&self) {
        self.handle.abort();
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for NotificationPoll {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
