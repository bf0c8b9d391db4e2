//! The seven tabs of the CRM behind one handle.

use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use std::path::PathBuf;
use std::sync::Arc;

use crate::clock::Clock;
use crate::db::SqliteSheets;
use crate::feed::Snapshot;
use crate::models::{Company, Contact, Deal, FollowUp, Interaction, SchedulerLogEntry, User};
use crate::store::{Record, Sheet, SheetBackend, StoreError, TtlCache, DEFAULT_TTL_SECS};

#[derive(Clone)]
pub struct Crm {
    pub contacts: Sheet<Contact>,
    pub companies: Sheet<Company>,
    pub deals: Sheet<Deal>,
    pub interactions: Sheet<Interaction>,
    pub follow_ups: Sheet<FollowUp>,
    pub users: Sheet<User>,
    pub scheduler_log: Sheet<SchedulerLogEntry>,
    clock: Arc<dyn Clock>,
}

impl Crm {
    pub fn new(backend: Arc<dyn SheetBackend>, clock: Arc<dyn Clock>, ttl: Duration) -> Self {
        let cache = Arc::new(TtlCache::new(ttl, Arc::clone(&clock)));

        fn sheet<R: Record>(
            backend: &Arc<dyn SheetBackend>,
            cache: &Arc<TtlCache>,
            clock: &Arc<dyn Clock>,
        ) -> Sheet<R> {
            Sheet::new(Arc::clone(backend), Arc::clone(cache), Arc::clone(clock))
        }

        Self {
            contacts: sheet(&backend, &cache, &clock),
            companies: sheet(&backend, &cache, &clock),
            deals: sheet(&backend, &cache, &clock),
            interactions: sheet(&backend, &cache, &clock),
            follow_ups: sheet(&backend, &cache, &clock),
            users: sheet(&backend, &cache, &clock),
            scheduler_log: sheet(&backend, &cache, &clock),
            clock,
        }
    }

    /// File-backed store at `path`.
    pub fn open(path: PathBuf, clock: Arc<dyn Clock>, ttl: Duration) -> Result<Self> {
        let backend = SqliteSheets::open_at(path)?;
        Ok(Self::new(Arc::new(backend), clock, ttl))
    }

    /// In-memory store for tests and dry runs.
    pub fn open_memory(clock: Arc<dyn Clock>) -> Result<Self> {
        let backend = SqliteSheets::open_memory()?;
        Ok(Self::new(
            Arc::new(backend),
            clock,
            Duration::seconds(DEFAULT_TTL_SECS),
        ))
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Load every collection the feed engine reads. One failing tab fails
    /// the whole snapshot.
    pub fn snapshot(&self) -> Result<Snapshot, StoreError> {
        Ok(Snapshot {
            contacts: self.contacts.all()?,
            companies: self.companies.all()?,
            deals: self.deals.all()?,
            follow_ups: self.follow_ups.all()?,
            interactions: self.interactions.all()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::store::Row;
    use chrono::TimeZone;

    struct DownBackend;

    impl SheetBackend for DownBackend {
        fn read_rows(&self, tab: &str, _columns: &[&str]) -> Result<Vec<Row>, StoreError> {
            Err(StoreError::Unavailable(format!("{} offline", tab)))
        }

        fn append_rows(&self, _tab: &str, _columns: &[&str], _rows: &[Row]) -> Result<(), StoreError> {
            Err(StoreError::Unavailable("offline".to_string()))
        }

        fn update_row(&self, _tab: &str, _columns: &[&str], _id: &str, _row: &Row) -> Result<bool, StoreError> {
            Err(StoreError::Unavailable("offline".to_string()))
        }

        fn delete_row(&self, _tab: &str, _id: &str) -> Result<bool, StoreError> {
            Err(StoreError::Unavailable("offline".to_string()))
        }
    }

    fn clock() -> Arc<FixedClock> {
        Arc::new(FixedClock::new(Utc.with_ymd_and_hms(2026, 10, 18, 9, 0, 0).unwrap()))
    }

    #[test]
    fn test_snapshot_loads_all_tabs() {
        let crm = Crm::open_memory(clock()).unwrap();
        let mut fields = Row::new();
        fields.insert("first_name".to_string(), "Ada".to_string());
        crm.contacts.create(fields).unwrap();

        let snap = crm.snapshot().unwrap();
        assert_eq!(snap.contacts.len(), 1);
        assert!(snap.deals.is_empty());
    }

    #[test]
    fn test_snapshot_fails_when_store_is_down() {
        let crm = Crm::new(Arc::new(DownBackend), clock(), Duration::seconds(30));
        assert!(matches!(crm.snapshot(), Err(StoreError::Unavailable(_))));
    }
}
