//! Spreadsheet-shaped record store.
//!
//! Each entity lives in its own tab with a fixed column list. A
//! [`SheetBackend`] moves raw rows in and out; [`Sheet`] layers typed
//! records, the TTL cache and create/update/delete semantics on top.

mod cache;
mod error;
mod row;
mod sheet;

pub use cache::{TtlCache, DEFAULT_MAX_ENTRIES, DEFAULT_TTL_SECS};
pub use error::StoreError;
pub use row::{to_fields, Record, Row};
pub use sheet::Sheet;

/// Raw row storage for named tabs. Rows come back in insertion order.
pub trait SheetBackend: Send + Sync {
    fn read_rows(&self, tab: &str, columns: &[&str]) -> Result<Vec<Row>, StoreError>;

    fn append_rows(&self, tab: &str, columns: &[&str], rows: &[Row]) -> Result<(), StoreError>;

    /// Overwrite the row whose `id` matches. Returns false when none does.
    fn update_row(&self, tab: &str, columns: &[&str], id: &str, row: &Row) -> Result<bool, StoreError>;

    /// Physically remove the row whose `id` matches.
    fn delete_row(&self, tab: &str, id: &str) -> Result<bool, StoreError>;
}
