use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Every state change of the block list produces an Event.
/// Hosts use them to decide what to re-render or reload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    SiteAdded {
        site: String,
        block_time_secs: u64,
        unblock_time_secs: u64,
        at: DateTime<Utc>,
    },
    SiteRemoved {
        site: String,
        at: DateTime<Utc>,
    },
    /// Accrued time reached the block threshold.
    SiteBlocked {
        site: String,
        time_spent_ms: u64,
        at: DateTime<Utc>,
    },
    /// Cool-down ran out and the site was released automatically.
    SiteReleased {
        site: String,
        at: DateTime<Utc>,
    },
    /// Released early through an accepted justification.
    SiteUnblocked {
        site: String,
        at: DateTime<Utc>,
    },
    /// More than one record answered to the same domain key.
    ConsistencyWarning {
        domain: String,
        matches: usize,
        at: DateTime<Utc>,
    },
}

impl Event {
    /// True for events that flip a record between active and blocked.
    pub fn is_transition(&self) -> bool {
        matches!(
            self,
            Event::SiteBlocked { .. } | Event::SiteReleased { .. } | Event::SiteUnblocked { .. }
        )
    }
}
