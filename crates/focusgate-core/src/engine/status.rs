//! Per-record status for presentation layers.
//!
//! An active record shows how much of its budget is used; a blocked record
//! shows how much of its cool-down is left.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::record::{SiteRecord, SiteState};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteStatus {
    pub site: String,
    pub state: SiteState,
    /// Time used (active) or time left in the cool-down (blocked).
    pub shown_ms: u64,
    /// Budget (active) or cool-down length (blocked).
    pub total_ms: u64,
    pub block_time_secs: u64,
    pub unblock_time_secs: u64,
}

impl SiteStatus {
    pub fn of(record: &SiteRecord, now: DateTime<Utc>) -> Self {
        let (shown_ms, total_ms) = match (record.state(), record.blocked_at) {
            (SiteState::Blocked, Some(at)) => {
                let waited = (now - at).num_milliseconds().max(0) as u64;
                (record.cooldown_ms().saturating_sub(waited), record.cooldown_ms())
            }
            _ => (record.time_spent_ms, record.block_limit_ms()),
        };
        Self {
            site: record.site.clone(),
            state: record.state(),
            shown_ms,
            total_ms,
            block_time_secs: record.block_time_secs,
            unblock_time_secs: record.unblock_time_secs,
        }
    }

    /// 0.0 ..= 1.0 share of the ring to fill.
    pub fn progress(&self) -> f64 {
        if self.total_ms == 0 {
            return 0.0;
        }
        (self.shown_ms as f64 / self.total_ms as f64).clamp(0.0, 1.0)
    }

    pub fn label(&self) -> String {
        format_duration(self.shown_ms)
    }
}

/// Render milliseconds as `"{m}m {s}s"`, or `"{s}s"` under a minute.
pub fn format_duration(ms: u64) -> String {
    let total_secs = ms / 1000;
    let min = total_secs / 60;
    let sec = total_secs % 60;
    if min > 0 {
        format!("{min}m {sec}s")
    } else {
        format!("{sec}s")
    }
}
