//! Activity tracker.
//!
//! The thin adapter between a host (browser extension, desktop watcher) and
//! the store. It remembers which page is in the foreground and when time was
//! last credited, and turns host notifications into `tick` calls:
//!
//! - foreground change: credit the previous page, then switch
//! - page load finished: credit, switch if it is the foreground tab, then
//!   answer whether the loaded page is blocked
//! - heartbeat (about once a second): credit the foreground page
//!
//! [`run`] drives a tracker from a channel of [`HostEvent`]s plus a tokio
//! interval, one event at a time.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::{mpsc, oneshot};
use tokio::task::{JoinError, JoinSet};
use tokio::time::MissedTickBehavior;

use crate::domain;
use crate::engine::Outcome;
use crate::error::Result;
use crate::gate::{self, Verdict};
use crate::storage::{Config, TrackerConfig};
use crate::store::SiteStore;

/// Notifications a host sends to the driver loop.
#[derive(Debug)]
pub enum HostEvent {
    /// A different tab or window came to the foreground.
    Activated { url: String },
    /// A page finished loading. `reply` receives whether it is blocked.
    Navigated {
        url: String,
        active: bool,
        reply: Option<oneshot::Sender<bool>>,
    },
    /// Nothing tracked is in the foreground any more.
    Deactivated,
    /// The blocked page submitted a reason.
    Justify {
        site: String,
        reason: String,
        reply: Option<oneshot::Sender<Verdict>>,
    },
}

/// Foreground state owned by the driver.
#[derive(Debug, Clone, Default)]
pub struct ActivityTracker {
    active_url: Option<String>,
    last_credit: Option<DateTime<Utc>>,
    idle_gap_ms: u64,
}

impl ActivityTracker {
    pub fn new(config: &TrackerConfig) -> Self {
        Self {
            active_url: None,
            last_credit: None,
            idle_gap_ms: config.idle_gap_ms,
        }
    }

    /// Domain key of the foreground page, if any.
    pub fn active_domain(&self) -> Option<String> {
        self.active_url.as_deref().map(domain::normalize)
    }

    /// Credit the previous foreground page and switch to `url`.
    ///
    /// The switch happens even when crediting fails, so later heartbeats
    /// never land on the page that was left.
    pub fn activate(&mut self, store: &SiteStore, url: &str, now: DateTime<Utc>) -> Result<Option<Outcome>> {
        let outcome = self.flush(store, now);
        self.active_url = Some(url.to_string());
        self.last_credit = Some(now);
        outcome
    }

    /// Handle a finished page load and report whether it must be covered.
    ///
    /// The loaded domain gets a zero-length tick first so a cool-down that
    /// ran out while the site was in the background is settled before the
    /// check.
    pub fn navigated(
        &mut self,
        store: &SiteStore,
        url: &str,
        active: bool,
        now: DateTime<Utc>,
    ) -> Result<bool> {
        let flushed = self.flush(store, now);
        if active {
            self.active_url = Some(url.to_string());
            self.last_credit = Some(now);
        }
        flushed?;
        store.tick(url, 0, now)?;
        store.is_blocked(url)
    }

    /// Credit the foreground page and stop tracking until the next
    /// activation.
    pub fn deactivate(&mut self, store: &SiteStore, now: DateTime<Utc>) -> Result<Option<Outcome>> {
        let outcome = self.flush(store, now)?;
        self.active_url = None;
        self.last_credit = None;
        Ok(outcome)
    }

    /// Periodic credit of the foreground page.
    pub fn heartbeat(&mut self, store: &SiteStore, now: DateTime<Utc>) -> Result<Option<Outcome>> {
        self.flush(store, now)
    }

    fn flush(&mut self, store: &SiteStore, now: DateTime<Utc>) -> Result<Option<Outcome>> {
        let (Some(url), Some(last)) = (self.active_url.as_deref(), self.last_credit) else {
            return Ok(None);
        };
        let mut elapsed_ms = (now - last).num_milliseconds().max(0) as u64;
        if self.idle_gap_ms > 0 && elapsed_ms > self.idle_gap_ms {
            tracing::debug!(elapsed_ms, cap = self.idle_gap_ms, "capping idle gap");
            elapsed_ms = self.idle_gap_ms;
        }
        // Advance first so a failed write is not credited twice.
        self.last_credit = Some(now);
        store.tick(url, elapsed_ms, now).map(Some)
    }
}

/// Evaluate a reason and, when accepted, release `site` after `delay`.
pub async fn request_unblock(
    store: &SiteStore,
    site: &str,
    reason: &str,
    delay: Duration,
) -> Result<Verdict> {
    if gate::evaluate(reason).is_accepted() && !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
    store.justify(site, reason, Utc::now())
}

/// Drive a tracker until the host side of `events` is dropped.
///
/// Handler errors are logged and the loop keeps going. On shutdown, pending
/// unblock requests are awaited and the foreground page is credited one last
/// time.
pub async fn run(
    store: Arc<SiteStore>,
    config: &Config,
    mut events: mpsc::Receiver<HostEvent>,
) -> Result<()> {
    let mut tracker = ActivityTracker::new(&config.tracker);
    let period = Duration::from_millis(config.tracker.tick_interval_ms.max(1));
    let unblock_delay = Duration::from_millis(config.gate.unblock_delay_ms);
    let mut pending = JoinSet::new();
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    tracing::info!(tick_interval_ms = period.as_millis() as u64, "activity tracker started");

    loop {
        tokio::select! {
            _ = interval.tick() => {
                if let Err(e) = tracker.heartbeat(&store, Utc::now()) {
                    tracing::error!(error = %e, "heartbeat failed");
                }
            }
            event = events.recv() => {
                let Some(event) = event else { break };
                handle(&mut tracker, &store, &mut pending, event, unblock_delay);
            }
            Some(joined) = pending.join_next(), if !pending.is_empty() => {
                log_join(joined);
            }
        }
    }

    while let Some(joined) = pending.join_next().await {
        log_join(joined);
    }

    tracker.deactivate(&store, Utc::now())?;
    tracing::info!("activity tracker stopped");
    Ok(())
}

fn handle(
    tracker: &mut ActivityTracker,
    store: &Arc<SiteStore>,
    pending: &mut JoinSet<()>,
    event: HostEvent,
    unblock_delay: Duration,
) {
    let now = Utc::now();
    match event {
        HostEvent::Activated { url } => {
            if let Err(e) = tracker.activate(store, &url, now) {
                tracing::error!(error = %e, url = %url, "activation failed");
            }
        }
        HostEvent::Navigated { url, active, reply } => {
            let blocked = tracker.navigated(store, &url, active, now).unwrap_or_else(|e| {
                tracing::error!(error = %e, url = %url, "navigation check failed");
                false
            });
            if let Some(reply) = reply {
                let _ = reply.send(blocked);
            }
        }
        HostEvent::Deactivated => {
            if let Err(e) = tracker.deactivate(store, now) {
                tracing::error!(error = %e, "deactivation failed");
            }
        }
        HostEvent::Justify { site, reason, reply } => {
            // The delayed release must not hold up the event loop.
            let store = Arc::clone(store);
            pending.spawn(async move {
                match request_unblock(&store, &site, &reason, unblock_delay).await {
                    Ok(verdict) => {
                        if let Some(reply) = reply {
                            let _ = reply.send(verdict);
                        }
                    }
                    Err(e) => tracing::error!(error = %e, site = %site, "unblock request failed"),
                }
            });
        }
    }
}

fn log_join(joined: std::result::Result<(), JoinError>) {
    if let Err(e) = joined {
        tracing::error!(error = %e, "unblock request task failed");
    }
}
