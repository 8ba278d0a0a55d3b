//! Per-subscriber recurring poll timers.

use crate::Poller;
use dashmap::DashMap;
use giftwatch_core::SubscriberId;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

/// Default delay between two polls of the same subscriber.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(20);

/// Result of starting a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    /// No session was running.
    Started,
    /// A running session was cancelled and replaced.
    Restarted,
}

/// Result of stopping a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopOutcome {
    Stopped,
    NotRunning,
}

/// A running monitoring session. Dropping it cancels the timer.
struct Session {
    handle: JoinHandle<()>,
}

impl Drop for Session {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Owns one recurring timer task per running subscriber.
///
/// Each tick runs in its own task, so cancelling a session stops future
/// ticks while a tick already in flight runs to completion.
pub struct MonitorScheduler {
    poller: Arc<Poller>,
    interval: Duration,
    sessions: DashMap<SubscriberId, Session>,
}

impl MonitorScheduler {
    pub fn new(poller: Arc<Poller>, interval: Duration) -> Self {
        let interval = if interval.is_zero() {
            warn!(
                default_secs = DEFAULT_POLL_INTERVAL.as_secs(),
                "Zero poll interval, using default"
            );
            DEFAULT_POLL_INTERVAL
        } else {
            interval
        };

        Self {
            poller,
            interval,
            sessions: DashMap::new(),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Start polling for `subscriber`, replacing any running session.
    ///
    /// The first tick fires one interval after the call.
    pub fn start(&self, subscriber: SubscriberId) -> StartOutcome {
        let session = Session {
            handle: self.spawn_timer(subscriber),
        };

        match self.sessions.insert(subscriber, session) {
            Some(previous) => {
                drop(previous);
                info!(subscriber = %subscriber, "Monitoring restarted");
                StartOutcome::Restarted
            }
            None => {
                info!(
                    subscriber = %subscriber,
                    interval_secs = self.interval.as_secs(),
                    "Monitoring started"
                );
                StartOutcome::Started
            }
        }
    }

    /// Cancel the session for `subscriber`.
    pub fn stop(&self, subscriber: SubscriberId) -> StopOutcome {
        match self.sessions.remove(&subscriber) {
            Some(_) => {
                info!(subscriber = %subscriber, "Monitoring stopped");
                StopOutcome::Stopped
            }
            None => StopOutcome::NotRunning,
        }
    }

    /// Recreate the timer if `subscriber` is running. Returns whether a
    /// session was replaced.
    pub fn restart(&self, subscriber: SubscriberId) -> bool {
        // Replace in place so a concurrent `stop` cannot be undone.
        let Some(mut session) = self.sessions.get_mut(&subscriber) else {
            return false;
        };
        *session = Session {
            handle: self.spawn_timer(subscriber),
        };
        info!(subscriber = %subscriber, "Monitoring restarted");
        true
    }

    pub fn is_running(&self, subscriber: SubscriberId) -> bool {
        self.sessions.contains_key(&subscriber)
    }

    pub fn active_sessions(&self) -> usize {
        self.sessions.len()
    }

    pub fn running_subscribers(&self) -> Vec<SubscriberId> {
        self.sessions.iter().map(|entry| *entry.key()).collect()
    }

    /// Cancel every session. Returns how many were running.
    pub fn stop_all(&self) -> usize {
        let ids = self.running_subscribers();
        let stopped = ids
            .into_iter()
            .filter(|id| self.sessions.remove(id).is_some())
            .count();
        if stopped > 0 {
            info!(count = stopped, "All monitoring sessions stopped");
        }
        stopped
    }

    fn spawn_timer(&self, subscriber: SubscriberId) -> JoinHandle<()> {
        let poller = self.poller.clone();
        let period = self.interval;

        tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;
                let poller = poller.clone();
                tokio::spawn(async move {
                    run_tick(&poller, subscriber).await;
                });
            }
        })
    }
}

async fn run_tick(poller: &Poller, subscriber: SubscriberId) {
    match poller.poll(subscriber).await {
        Ok(report) if report.notified > 0 => {
            info!(
                subscriber = %subscriber,
                notified = report.notified,
                cache_size = report.cache_size,
                "Tick delivered alerts"
            );
        }
        Ok(_) => {}
        Err(e) => {
            // Already logged by the poller; the timer keeps running.
            debug!(subscriber = %subscriber, error = %e, "Tick ended early");
        }
    }
}
