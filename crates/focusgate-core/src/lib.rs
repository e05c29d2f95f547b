//! # Focusgate Core Library
//!
//! Time-boxed access to distracting sites. Each listed domain accumulates
//! foreground time; past its budget it is blocked, and after a cool-down it
//! is released again unless a justification releases it earlier.
//!
//! Browser and desktop hosts are thin adapters over this crate: they report
//! which page is in the foreground, render the list, and show the block page.
//!
//! ## Architecture
//!
//! - **Domain keys**: URL/host canonicalization shared by every comparison
//! - **Engine**: a stateless wall-clock state machine; the caller invokes
//!   `tick()` about once a second
//! - **Store**: the single owner of the record list, with one serialized
//!   mutation path and change notifications
//! - **Gate**: keyword classifier for unblock requests
//! - **Tracker**: foreground bookkeeping and the async driver loop
//!
//! ## Key Components
//!
//! - [`SiteStore`]: record persistence and mutation
//! - [`SiteRecord`]: one tracked site
//! - [`ActivityTracker`]: host-facing tick driver
//! - [`Config`]: application configuration management

pub mod domain;
pub mod engine;
pub mod error;
pub mod events;
pub mod gate;
pub mod logging;
pub mod record;
pub mod storage;
pub mod store;
pub mod tracker;

pub use domain::normalize;
pub use engine::{format_duration, Outcome, SiteStatus};
pub use error::{ConfigError, CoreError, StorageError, StoreError};
pub use events::Event;
pub use gate::{evaluate, Rejection, Verdict};
pub use record::{SiteRecord, SiteState, TimeUnit};
pub use storage::{Config, MemoryBackend, RecordBackend, SqliteBackend};
pub use store::{channel_observer, Commit, SiteStore, StoreObserver};
pub use tracker::{ActivityTracker, HostEvent};
