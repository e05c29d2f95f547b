//! Time accrual engine.
//!
//! Stateless: every function takes the current record list and returns the
//! next one. Timeouts are threshold comparisons made while ticking, so a
//! record that is removed mid-cycle leaves nothing scheduled behind.
//!
//! ## Per-record cycle
//!
//! ```text
//! Active --(time_spent >= block_time)--> Blocked --(cool-down over)--> Active
//!                                           |
//!                                           +--(force_unblock)--> Active
//! ```

use chrono::{DateTime, Utc};

use crate::domain;
use crate::events::Event;
use crate::record::SiteRecord;

/// Result of running the engine over a record list.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    /// The full record list after the update, in the original order.
    pub records: Vec<SiteRecord>,
    pub events: Vec<Event>,
    /// Number of records the call applied to: those answering to the domain,
    /// or those released by [`settle`].
    pub matched: usize,
}

impl Outcome {
    /// True when at least one record flipped between active and blocked.
    pub fn changed(&self) -> bool {
        self.events.iter().any(Event::is_transition)
    }
}

/// Credit `elapsed_ms` of foreground time to the records matching
/// `active_domain` and evaluate their transitions at `now`.
///
/// Accrual and the block check run first; the release check always runs
/// afterwards on the same record, so a record carrying a stale `blocked_at`
/// can block and release within one call. Records that do not match are
/// returned unchanged, even when their cool-down is over; [`settle`] sweeps
/// those.
pub fn tick(
    records: &[SiteRecord],
    active_domain: &str,
    elapsed_ms: u64,
    now: DateTime<Utc>,
) -> Outcome {
    let key = domain::normalize(active_domain);
    let mut events = Vec::new();
    let mut matched = 0;

    let next: Vec<SiteRecord> = records
        .iter()
        .map(|record| {
            if !record.matches(&key) {
                return record.clone();
            }
            matched += 1;

            let mut next = record.clone();
            if !next.blocked {
                next = next.accrued(elapsed_ms);
                if next.time_spent_ms >= next.block_limit_ms() {
                    next = next.block_at(now);
                    tracing::info!(
                        site = %next.site,
                        time_spent_ms = next.time_spent_ms,
                        "site blocked"
                    );
                    events.push(Event::SiteBlocked {
                        site: next.site.clone(),
                        time_spent_ms: next.time_spent_ms,
                        at: now,
                    });
                }
            }
            if next.cooldown_elapsed(now) {
                next = next.released();
                tracing::info!(site = %next.site, "cool-down over, site released");
                events.push(Event::SiteReleased {
                    site: next.site.clone(),
                    at: now,
                });
            }
            next
        })
        .collect();

    if matched > 1 {
        tracing::warn!(
            domain = %key,
            matches = matched,
            "several records share one domain key"
        );
        events.push(Event::ConsistencyWarning {
            domain: key,
            matches: matched,
            at: now,
        });
    }

    Outcome {
        records: next,
        events,
        matched,
    }
}

/// Release every blocked record whose cool-down is over, whatever its domain.
pub fn settle(records: &[SiteRecord], now: DateTime<Utc>) -> Outcome {
    let mut events = Vec::new();
    let next: Vec<SiteRecord> = records
        .iter()
        .map(|record| {
            if !record.cooldown_elapsed(now) {
                return record.clone();
            }
            tracing::info!(site = %record.site, "cool-down over, site released");
            events.push(Event::SiteReleased {
                site: record.site.clone(),
                at: now,
            });
            record.released()
        })
        .collect();

    Outcome {
        matched: events.len(),
        records: next,
        events,
    }
}

/// Release the records answering to `domain` regardless of timers.
///
/// `domain` may be a live URL, a bare host or the stored `site` spelling.
pub fn force_unblock(records: &[SiteRecord], domain: &str, now: DateTime<Utc>) -> Outcome {
    let key = domain::normalize(domain);
    let spelled = domain.trim();
    let mut events = Vec::new();
    let mut matched = 0;

    let next: Vec<SiteRecord> = records
        .iter()
        .map(|record| {
            if !(record.matches(&key) || record.site == spelled) {
                return record.clone();
            }
            matched += 1;
            if record.blocked {
                tracing::info!(site = %record.site, "site unblocked on request");
                events.push(Event::SiteUnblocked {
                    site: record.site.clone(),
                    at: now,
                });
            }
            record.released()
        })
        .collect();

    Outcome {
        records: next,
        events,
        matched,
    }
}

/// True when any record answering to `domain` is blocked.
pub fn is_blocked(records: &[SiteRecord], domain: &str) -> bool {
    let key = domain::normalize(domain);
    records
        .iter()
        .any(|record| record.blocked && record.matches(&key))
}

/// Open URLs that belong to a tracked site, for a host-side reload sweep.
pub fn affected_urls<'a>(records: &[SiteRecord], open_urls: &[&'a str]) -> Vec<&'a str> {
    open_urls
        .iter()
        .copied()
        .filter(|url| {
            let key = domain::normalize(url);
            records.iter().any(|record| record.matches(&key))
        })
        .collect()
}
