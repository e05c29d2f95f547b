//! Site records.
//!
//! A `SiteRecord` is one entry of the block list. Records are values: every
//! transition (`accrued`, `block_at`, `released`) returns a new record and
//! leaves the original untouched. The store persists whole lists of them.
//!
//! The serialized layout is the one the block list has always been stored
//! in: camelCase keys, thresholds in seconds, counters and timestamps in
//! milliseconds since the epoch.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain;
use crate::error::StoreError;

/// Gate state of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SiteState {
    Active,
    Blocked,
}

/// Unit a threshold was entered in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeUnit {
    #[default]
    Seconds,
    Minutes,
}

impl TimeUnit {
    /// Convert an amount in this unit to whole seconds.
    pub fn to_secs(self, amount: u64) -> u64 {
        match self {
            TimeUnit::Seconds => amount,
            TimeUnit::Minutes => amount.saturating_mul(60),
        }
    }
}

/// One tracked site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteRecord {
    /// Domain as entered by the user; may carry a `www.` prefix.
    pub site: String,
    /// Active time allowed before the site is blocked.
    #[serde(rename = "blockTime")]
    pub block_time_secs: u64,
    /// Cool-down after blocking before the site is released.
    #[serde(rename = "unblockTime")]
    pub unblock_time_secs: u64,
    /// Active time in the current cycle.
    #[serde(rename = "timeSpent", default)]
    pub time_spent_ms: u64,
    #[serde(default)]
    pub blocked: bool,
    #[serde(
        default,
        with = "chrono::serde::ts_milliseconds_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub blocked_at: Option<DateTime<Utc>>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub added: DateTime<Utc>,
}

impl SiteRecord {
    /// Create an unblocked record with an empty counter.
    pub fn new(
        site: impl Into<String>,
        block_time_secs: u64,
        unblock_time_secs: u64,
        added: DateTime<Utc>,
    ) -> Self {
        Self {
            site: site.into().trim().to_string(),
            block_time_secs,
            unblock_time_secs,
            time_spent_ms: 0,
            blocked: false,
            blocked_at: None,
            added,
        }
    }

    /// Create a record from thresholds entered in arbitrary units.
    pub fn with_units(
        site: impl Into<String>,
        block_time: (u64, TimeUnit),
        unblock_time: (u64, TimeUnit),
        added: DateTime<Utc>,
    ) -> Self {
        Self::new(
            site,
            block_time.1.to_secs(block_time.0),
            unblock_time.1.to_secs(unblock_time.0),
            added,
        )
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> SiteState {
        if self.blocked {
            SiteState::Blocked
        } else {
            SiteState::Active
        }
    }

    /// Comparison key for this record's site.
    pub fn key(&self) -> String {
        domain::site_key(&self.site)
    }

    /// True when `live_key` (a normalized domain) refers to this record.
    pub fn matches(&self, live_key: &str) -> bool {
        domain::matches(live_key, &self.site)
    }

    pub fn block_limit_ms(&self) -> u64 {
        self.block_time_secs.saturating_mul(1000)
    }

    pub fn cooldown_ms(&self) -> u64 {
        self.unblock_time_secs.saturating_mul(1000)
    }

    /// True when the record is blocked and its cool-down has run out at `now`.
    pub fn cooldown_elapsed(&self, now: DateTime<Utc>) -> bool {
        match (self.blocked, self.blocked_at) {
            (true, Some(at)) => {
                let waited = (now - at).num_milliseconds();
                waited >= 0 && waited as u64 >= self.cooldown_ms()
            }
            _ => false,
        }
    }

    /// Check the add-time rules: non-empty domain, positive thresholds.
    pub fn validate(&self) -> Result<(), StoreError> {
        if self.key().is_empty() {
            return Err(StoreError::invalid("site", "must not be empty"));
        }
        if self.block_time_secs == 0 {
            return Err(StoreError::invalid("blockTime", "must be greater than zero"));
        }
        if self.unblock_time_secs == 0 {
            return Err(StoreError::invalid("unblockTime", "must be greater than zero"));
        }
        Ok(())
    }

    // ── Transitions ──────────────────────────────────────────────────

    /// Credit `elapsed_ms` of active time. Blocked records do not accrue.
    pub fn accrued(&self, elapsed_ms: u64) -> Self {
        if self.blocked {
            return self.clone();
        }
        Self {
            time_spent_ms: self.time_spent_ms.saturating_add(elapsed_ms),
            ..self.clone()
        }
    }

    /// Enter the blocked state at `now`.
    pub fn block_at(&self, now: DateTime<Utc>) -> Self {
        Self {
            blocked: true,
            blocked_at: Some(now),
            ..self.clone()
        }
    }

    /// Leave the blocked state and start a fresh cycle.
    pub fn released(&self) -> Self {
        Self {
            blocked: false,
            blocked_at: None,
            time_spent_ms: 0,
            ..self.clone()
        }
    }
}
