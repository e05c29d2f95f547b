//! Site record store.
//!
//! The store owns the block list. Every edit, whether it comes from the
//! user, the tracker or the justification prompt, runs through
//! [`SiteStore::update`]: read the current list, compute the next one,
//! persist it, notify observers. The whole sequence holds one lock, so two
//! handlers racing on the same list never drop each other's update.
//!
//! Observers are called with the lock held and receive the persisted list.
//! They must not call back into the store.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use tokio::sync::mpsc::UnboundedSender;

use crate::engine::{self, Outcome, SiteStatus};
use crate::error::{Result, StoreError};
use crate::events::Event;
use crate::gate::{self, Verdict};
use crate::record::SiteRecord;
use crate::storage::RecordBackend;

/// Receives the full record list after every successful mutation.
pub trait StoreObserver: Send + Sync {
    fn on_change(&self, records: &[SiteRecord]);
}

impl<F> StoreObserver for F
where
    F: Fn(&[SiteRecord]) + Send + Sync,
{
    fn on_change(&self, records: &[SiteRecord]) {
        self(records)
    }
}

/// Forwards every change to an async consumer. A closed receiver is ignored.
pub fn channel_observer(tx: UnboundedSender<Vec<SiteRecord>>) -> Arc<dyn StoreObserver> {
    Arc::new(move |records: &[SiteRecord]| {
        let _ = tx.send(records.to_vec());
    })
}

/// What an update closure wants done with its result.
pub enum Commit<T> {
    /// Persist this list, notify, and return the value.
    Write(Vec<SiteRecord>, T),
    /// Leave storage alone and return the value.
    Skip(T),
}

/// The single owner of the record list.
pub struct SiteStore {
    backend: Mutex<Box<dyn RecordBackend>>,
    observers: Mutex<Vec<Arc<dyn StoreObserver>>>,
}

impl SiteStore {
    pub fn new(backend: Box<dyn RecordBackend>) -> Self {
        Self {
            backend: Mutex::new(backend),
            observers: Mutex::new(Vec::new()),
        }
    }

    /// Register an observer for change notifications.
    pub fn subscribe(&self, observer: Arc<dyn StoreObserver>) {
        lock(&self.observers).push(observer);
    }

    /// The serialized read-compute-persist path every mutation goes through.
    pub fn update<T>(
        &self,
        f: impl FnOnce(&[SiteRecord]) -> Result<Commit<T>>,
    ) -> Result<T> {
        let mut backend = lock(&self.backend);
        let current = backend.load()?;
        match f(&current)? {
            Commit::Skip(value) => Ok(value),
            Commit::Write(next, value) => {
                backend.save(&next)?;
                for observer in lock(&self.observers).iter() {
                    observer.on_change(&next);
                }
                Ok(value)
            }
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    /// All records in insertion order.
    pub fn get_all(&self) -> Result<Vec<SiteRecord>> {
        Ok(lock(&self.backend).load()?)
    }

    /// True when the page at `domain` should be covered by the block page.
    pub fn is_blocked(&self, domain: &str) -> Result<bool> {
        Ok(engine::is_blocked(&self.get_all()?, domain))
    }


    // ── Mutations ────────────────────────────────────────────────────

    /// Persist `records` wholesale and notify once.
    pub fn replace_all(&self, records: Vec<SiteRecord>) -> Result<()> {
        self.update(|_| Ok(Commit::Write(records, ())))
    }

    /// Append a new record.
    ///
    /// # Errors
    /// `DuplicateDomain` when a record already answers to the same domain
    /// key, `InvalidInput` for an empty site or a zero threshold.
    pub fn add(&self, record: SiteRecord) -> Result<Event> {
        self.update(|current| {
            let key = record.key();
            if !key.is_empty() && current.iter().any(|r| r.key() == key) {
                return Err(StoreError::DuplicateDomain {
                    site: record.site.clone(),
                }
                .into());
            }
            record.validate()?;

            tracing::info!(
                site = %record.site,
                block_time_secs = record.block_time_secs,
                unblock_time_secs = record.unblock_time_secs,
                "site added"
            );
            let event = Event::SiteAdded {
                site: record.site.clone(),
                block_time_secs: record.block_time_secs,
                unblock_time_secs: record.unblock_time_secs,
                at: record.added,
            };
            let mut next = current.to_vec();
            next.push(record);
            Ok(Commit::Write(next, event))
        })
    }

    /// Remove the record at `index`.
    pub fn remove(&self, index: usize, now: DateTime<Utc>) -> Result<Event> {
        self.update(|current| {
            if index >= current.len() {
                return Err(StoreError::IndexOutOfRange {
                    index,
                    len: current.len(),
                }
                .into());
            }
            let mut next = current.to_vec();
            let removed = next.remove(index);
            tracing::info!(site = %removed.site, "site removed");
            Ok(Commit::Write(
                next,
                Event::SiteRemoved {
                    site: removed.site,
                    at: now,
                },
            ))
        })
    }

    /// Run one accrual tick against the stored list.
    ///
    /// Nothing is written when no record matches `active_domain`.
    pub fn tick(&self, active_domain: &str, elapsed_ms: u64, now: DateTime<Utc>) -> Result<Outcome> {
        self.update(|current| {
            let outcome = engine::tick(current, active_domain, elapsed_ms, now);
            tracing::debug!(
                domain = active_domain,
                elapsed_ms,
                matched = outcome.matched,
                "tick"
            );
            if outcome.matched == 0 {
                return Ok(Commit::Skip(outcome));
            }
            Ok(Commit::Write(outcome.records.clone(), outcome))
        })
    }

    /// Status of every record at `now`, for list views.
    ///
    /// Blocks whose cool-down ran out while their site was out of sight are
    /// released and persisted first, so the view never shows an expired
    /// block.
    pub fn statuses(&self, now: DateTime<Utc>) -> Result<Vec<SiteStatus>> {
        self.update(|current| {
            let outcome = engine::settle(current, now);
            let statuses: Vec<SiteStatus> = outcome
                .records
                .iter()
                .map(|record| SiteStatus::of(record, now))
                .collect();
            if outcome.matched == 0 {
                return Ok(Commit::Skip(statuses));
            }
            Ok(Commit::Write(outcome.records, statuses))
        })
    }

    /// Release the record answering to `domain` regardless of timers.
    pub fn force_unblock(&self, domain: &str, now: DateTime<Utc>) -> Result<Outcome> {
        self.update(|current| {
            let outcome = engine::force_unblock(current, domain, now);
            if outcome.matched == 0 {
                return Ok(Commit::Skip(outcome));
            }
            Ok(Commit::Write(outcome.records.clone(), outcome))
        })
    }

    /// Evaluate a justification for `site` and release it when accepted.
    ///
    /// Releases at once; [`crate::tracker::request_unblock`] adds the pause
    /// between the reply and the release.
    pub fn justify(&self, site: &str, free_text: &str, now: DateTime<Utc>) -> Result<Verdict> {
        let verdict = gate::evaluate(free_text);
        tracing::info!(site, ?verdict, "justification evaluated");
        if verdict.is_accepted() {
            self.force_unblock(site, now)?;
        }
        Ok(verdict)
    }
}

fn lock<T: ?Sized>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
