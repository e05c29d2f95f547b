mod accrual;
mod status;

pub use accrual::{affected_urls, force_unblock, is_blocked, settle, tick, Outcome};
pub use status::{format_duration, SiteStatus};
