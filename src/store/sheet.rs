use std::marker::PhantomData;
use std::sync::Arc;

use tracing::debug;
use uuid::Uuid;

use super::{Record, Row, SheetBackend, StoreError, TtlCache};
use crate::clock::{iso_timestamp, Clock};

/// Typed CRUD over one tab.
///
/// Bulk reads are served from the shared [`TtlCache`]; every write clears
/// this tab's cache entry. Updates and deletes locate their row on a fresh
/// read so they never act on a stale copy.
pub struct Sheet<R: Record> {
    backend: Arc<dyn SheetBackend>,
    cache: Arc<TtlCache>,
    clock: Arc<dyn Clock>,
    _record: PhantomData<fn() -> R>,
}

impl<R: Record> Clone for Sheet<R> {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
            cache: Arc::clone(&self.cache),
            clock: Arc::clone(&self.clock),
            _record: PhantomData,
        }
    }
}

impl<R: Record> Sheet<R> {
    pub fn new(backend: Arc<dyn SheetBackend>, cache: Arc<TtlCache>, clock: Arc<dyn Clock>) -> Self {
        Self {
            backend,
            cache,
            clock,
            _record: PhantomData,
        }
    }

    fn cache_key() -> String {
        format!("{}_all", R::TAB)
    }

    fn rows(&self, force_refresh: bool) -> Result<Arc<Vec<Row>>, StoreError> {
        let key = Self::cache_key();
        if !force_refresh {
            if let Some(rows) = self.cache.get(&key) {
                return Ok(rows);
            }
        }

        let rows = Arc::new(self.backend.read_rows(R::TAB, R::COLUMNS)?);
        debug!(tab = R::TAB, rows = rows.len(), "loaded sheet");
        self.cache.set(&key, Arc::clone(&rows));
        Ok(rows)
    }

    fn invalidate(&self) {
        self.cache.clear(&Self::cache_key());
    }

    fn decode<'a>(rows: impl IntoIterator<Item = &'a Row>) -> Result<Vec<R>, StoreError> {
        rows.into_iter().map(R::from_row).collect()
    }

    /// Every record, in sheet order.
    pub fn all(&self) -> Result<Vec<R>, StoreError> {
        self.get_all(&[])
    }

    /// Records matching every `(column, value)` pair exactly. Pairs with an
    /// empty value are ignored.
    pub fn get_all(&self, filters: &[(&str, &str)]) -> Result<Vec<R>, StoreError> {
        let rows = self.rows(false)?;
        let active: Vec<&(&str, &str)> = filters.iter().filter(|(_, v)| !v.is_empty()).collect();

        Self::decode(rows.iter().filter(|row| {
            active
                .iter()
                .all(|(col, want)| row.get(*col).map(String::as_str).unwrap_or("") == *want)
        }))
    }

    /// Case-insensitive substring match across `fields`.
    pub fn search(&self, query: &str, fields: &[&str]) -> Result<Vec<R>, StoreError> {
        let rows = self.rows(false)?;
        let needle = query.to_lowercase();

        Self::decode(rows.iter().filter(|row| {
            fields.iter().any(|f| {
                row.get(*f)
                    .is_some_and(|v| v.to_lowercase().contains(&needle))
            })
        }))
    }

    pub fn get_by_id(&self, id: &str) -> Result<Option<R>, StoreError> {
        self.find_by_field("id", id)
    }

    /// First record whose `field` equals `value`.
    pub fn find_by_field(&self, field: &str, value: &str) -> Result<Option<R>, StoreError> {
        let rows = self.rows(false)?;
        rows.iter()
            .find(|row| row.get(field).map(String::as_str) == Some(value))
            .map(R::from_row)
            .transpose()
    }

    fn new_row(&self, fields: &Row, now: &str) -> Row {
        let mut row: Row = R::COLUMNS
            .iter()
            .map(|col| (col.to_string(), String::new()))
            .collect();

        for (key, value) in fields {
            if key != "id" && key != "created_at" && row.contains_key(key) {
                row.insert(key.clone(), value.clone());
            }
        }

        row.insert("id".to_string(), new_id());
        row.insert("created_at".to_string(), now.to_string());
        if R::has_column("updated_at") {
            row.insert("updated_at".to_string(), now.to_string());
        }
        row
    }

    /// Insert one record. Unknown keys are dropped; `id` and `created_at` are
    /// always assigned here.
    pub fn create(&self, fields: Row) -> Result<R, StoreError> {
        let mut created = self.bulk_create(vec![fields])?;
        created
            .pop()
            .ok_or_else(|| StoreError::Unavailable(format!("{} append returned nothing", R::TAB)))
    }

    /// Insert many records in one backend call.
    pub fn bulk_create(&self, items: Vec<Row>) -> Result<Vec<R>, StoreError> {
        if items.is_empty() {
            return Ok(Vec::new());
        }

        let now = iso_timestamp(self.clock.now());
        let rows: Vec<Row> = items.iter().map(|fields| self.new_row(fields, &now)).collect();

        self.backend.append_rows(R::TAB, R::COLUMNS, &rows)?;
        self.invalidate();
        debug!(tab = R::TAB, count = rows.len(), "appended rows");

        Self::decode(rows.iter())
    }

    /// Merge `fields` into the record with `id`. Returns `None` when no such
    /// record exists.
    pub fn update(&self, id: &str, fields: Row) -> Result<Option<R>, StoreError> {
        let rows = self.rows(true)?;
        let Some(existing) = rows.iter().find(|row| row.get("id").map(String::as_str) == Some(id))
        else {
            return Ok(None);
        };

        let mut row = existing.clone();
        for (key, value) in fields {
            if key != "id" && key != "created_at" && R::has_column(&key) {
                row.insert(key, value);
            }
        }
        if R::has_column("updated_at") {
            row.insert("updated_at".to_string(), iso_timestamp(self.clock.now()));
        }

        let written = self.backend.update_row(R::TAB, R::COLUMNS, id, &row)?;
        self.invalidate();
        if !written {
            return Ok(None);
        }
        R::from_row(&row).map(Some)
    }

    /// Soft delete (status becomes `archived`) when the tab has a status
    /// column, physical removal otherwise.
    pub fn delete(&self, id: &str) -> Result<bool, StoreError> {
        if R::has_column("status") {
            let mut fields = Row::new();
            fields.insert("status".to_string(), "archived".to_string());
            return Ok(self.update(id, fields)?.is_some());
        }

        let removed = self.backend.delete_row(R::TAB, id)?;
        self.invalidate();
        Ok(removed)
    }
}

/// Short record id: the first eight hex digits of a v4 UUID.
fn new_id() -> String {
    let mut id = Uuid::new_v4().simple().to_string();
    id.truncate(8);
    id
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::db::SqliteSheets;
    use crate::models::{Company, Contact, FollowUp};
    use chrono::{Duration, TimeZone, Utc};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Counts backend reads so tests can observe cache hits.
    struct CountingBackend {
        inner: SqliteSheets,
        reads: AtomicUsize,
    }

    impl SheetBackend for CountingBackend {
        fn read_rows(&self, tab: &str, columns: &[&str]) -> Result<Vec<Row>, StoreError> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            self.inner.read_rows(tab, columns)
        }

        fn append_rows(&self, tab: &str, columns: &[&str], rows: &[Row]) -> Result<(), StoreError> {
            self.inner.append_rows(tab, columns, rows)
        }

        fn update_row(&self, tab: &str, columns: &[&str], id: &str, row: &Row) -> Result<bool, StoreError> {
            self.inner.update_row(tab, columns, id, row)
        }

        fn delete_row(&self, tab: &str, id: &str) -> Result<bool, StoreError> {
            self.inner.delete_row(tab, id)
        }
    }

    struct Fixture {
        clock: Arc<FixedClock>,
        backend: Arc<CountingBackend>,
        cache: Arc<TtlCache>,
    }

    impl Fixture {
        fn new() -> Self {
            let clock = Arc::new(FixedClock::new(Utc.with_ymd_and_hms(2026, 10, 18, 9, 0, 0).unwrap()));
            let backend = Arc::new(CountingBackend {
                inner: SqliteSheets::open_memory().unwrap(),
                reads: AtomicUsize::new(0),
            });
            let cache = Arc::new(TtlCache::new(Duration::seconds(30), clock.clone()));
            Self { clock, backend, cache }
        }

        fn sheet<R: Record>(&self) -> Sheet<R> {
            Sheet::new(self.backend.clone(), self.cache.clone(), self.clock.clone())
        }

        fn reads(&self) -> usize {
            self.backend.reads.load(Ordering::SeqCst)
        }
    }

    fn fields(pairs: &[(&str, &str)]) -> Row {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn test_create_assigns_id_and_timestamps() {
        let fx = Fixture::new();
        let contacts: Sheet<Contact> = fx.sheet();

        let c = contacts
            .create(fields(&[
                ("first_name", "Ada"),
                ("id", "forged"),
                ("created_at", "1999-01-01"),
                ("bogus", "x"),
            ]))
            .unwrap();

        assert_eq!(c.id.len(), 8);
        assert_ne!(c.id, "forged");
        assert_eq!(c.created_at, "2026-10-18T09:00:00.000000+00:00");
        assert_eq!(c.updated_at, c.created_at);
        assert_eq!(c.first_name, "Ada");

        let fetched = contacts.get_by_id(&c.id).unwrap().unwrap();
        assert_eq!(fetched, c);
    }

    #[test]
    fn test_reads_are_cached_until_write() {
        let fx = Fixture::new();
        let companies: Sheet<Company> = fx.sheet();

        companies.create(fields(&[("name", "Acme")])).unwrap();
        companies.all().unwrap();
        companies.all().unwrap();
        assert_eq!(fx.reads(), 1);

        companies.create(fields(&[("name", "Globex")])).unwrap();
        assert_eq!(companies.all().unwrap().len(), 2);
        assert_eq!(fx.reads(), 2);
    }

    #[test]
    fn test_cache_expires_with_clock() {
        let fx = Fixture::new();
        let companies: Sheet<Company> = fx.sheet();

        companies.all().unwrap();
        fx.clock.advance(Duration::seconds(10));
        companies.all().unwrap();
        assert_eq!(fx.reads(), 1);

        fx.clock.advance(Duration::seconds(25));
        companies.all().unwrap();
        assert_eq!(fx.reads(), 2);
    }

    #[test]
    fn test_get_all_filters_ignore_empty_values() {
        let fx = Fixture::new();
        let follow_ups: Sheet<FollowUp> = fx.sheet();

        follow_ups.create(fields(&[("contact_id", "c1"), ("status", "pending")])).unwrap();
        follow_ups.create(fields(&[("contact_id", "c1"), ("status", "completed")])).unwrap();
        follow_ups.create(fields(&[("contact_id", "c2"), ("status", "pending")])).unwrap();

        assert_eq!(follow_ups.get_all(&[("status", "pending")]).unwrap().len(), 2);
        assert_eq!(
            follow_ups.get_all(&[("status", "pending"), ("contact_id", "c1")]).unwrap().len(),
            1
        );
        assert_eq!(follow_ups.get_all(&[("status", "")]).unwrap().len(), 3);
        assert!(follow_ups.get_all(&[("status", "PENDING")]).unwrap().is_empty());
    }

    #[test]
    fn test_update_merges_and_refreshes_updated_at() {
        let fx = Fixture::new();
        let contacts: Sheet<Contact> = fx.sheet();
        let c = contacts
            .create(fields(&[("first_name", "Ada"), ("role", "CTO")]))
            .unwrap();

        fx.clock.advance(Duration::minutes(5));
        let updated = contacts
            .update(&c.id, fields(&[("role", "CEO"), ("created_at", "tampered")]))
            .unwrap()
            .unwrap();

        assert_eq!(updated.first_name, "Ada");
        assert_eq!(updated.role, "CEO");
        assert_eq!(updated.created_at, c.created_at);
        assert_eq!(updated.updated_at, "2026-10-18T09:05:00.000000+00:00");

        assert!(contacts.update("missing", fields(&[("role", "x")])).unwrap().is_none());
    }

    #[test]
    fn test_delete_soft_vs_hard() {
        let fx = Fixture::new();
        let contacts: Sheet<Contact> = fx.sheet();
        let companies: Sheet<Company> = fx.sheet();

        let c = contacts.create(fields(&[("first_name", "Ada"), ("status", "active")])).unwrap();
        assert!(contacts.delete(&c.id).unwrap());
        let archived = contacts.get_by_id(&c.id).unwrap().unwrap();
        assert_eq!(archived.status, "archived");

        let co = companies.create(fields(&[("name", "Acme")])).unwrap();
        assert!(companies.delete(&co.id).unwrap());
        assert!(companies.get_by_id(&co.id).unwrap().is_none());
        assert!(!companies.delete(&co.id).unwrap());
    }

    #[test]
    fn test_search_is_case_insensitive() {
        let fx = Fixture::new();
        let contacts: Sheet<Contact> = fx.sheet();
        contacts.create(fields(&[("first_name", "Ada"), ("email", "ada@example.com")])).unwrap();
        contacts.create(fields(&[("first_name", "Grace")])).unwrap();

        let hits = contacts.search("EXAMPLE", &["first_name", "email"]).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].first_name, "Ada");
    }

    #[test]
    fn test_bulk_create_preserves_order() {
        let fx = Fixture::new();
        let companies: Sheet<Company> = fx.sheet();
        let created = companies
            .bulk_create(vec![fields(&[("name", "A")]), fields(&[("name", "B")])])
            .unwrap();
        assert_eq!(created.len(), 2);

        let names: Vec<String> = companies.all().unwrap().into_iter().map(|c| c.name).collect();
        assert_eq!(names, vec!["A", "B"]);
    }
}
