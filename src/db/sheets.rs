//! SQLite implementation of the sheet backend.

use anyhow::Result;
use rusqlite::params_from_iter;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};

use super::{columns_for, Database};
use crate::store::{Row, SheetBackend, StoreError};

/// Tabs stored as SQLite tables, one connection behind a mutex.
pub struct SqliteSheets {
    db: Mutex<Database>,
}

impl SqliteSheets {
    pub fn new(db: Database) -> Self {
        Self { db: Mutex::new(db) }
    }

    pub fn open_at(path: PathBuf) -> Result<Self> {
        Ok(Self::new(Database::open_at(path)?))
    }

    pub fn open_memory() -> Result<Self> {
        Ok(Self::new(Database::open_memory()?))
    }

    fn lock(&self) -> Result<MutexGuard<'_, Database>, StoreError> {
        self.db
            .lock()
            .map_err(|_| StoreError::Unavailable("database lock poisoned".to_string()))
    }
}

/// Table and column names are spliced into SQL, so only names from the
/// known schema are accepted.
fn check_columns(tab: &str, columns: &[&str]) -> Result<(), StoreError> {
    let known = columns_for(tab).ok_or_else(|| StoreError::UnknownSheet(tab.to_string()))?;
    match columns.iter().find(|c| !known.contains(c)) {
        Some(bad) => Err(StoreError::UnknownSheet(format!("{}.{}", tab, bad))),
        None => Ok(()),
    }
}

fn quoted(columns: &[&str]) -> String {
    columns
        .iter()
        .map(|c| format!("\"{}\"", c))
        .collect::<Vec<_>>()
        .join(", ")
}

fn cells<'a>(row: &'a Row, columns: &'a [&str]) -> impl Iterator<Item = &'a str> {
    columns
        .iter()
        .map(move |c| row.get(*c).map(String::as_str).unwrap_or(""))
}

impl SheetBackend for SqliteSheets {
    fn read_rows(&self, tab: &str, columns: &[&str]) -> Result<Vec<Row>, StoreError> {
        check_columns(tab, columns)?;
        let db = self.lock()?;

        let sql = format!(
            "SELECT {} FROM \"{}\" ORDER BY row_num ASC",
            quoted(columns),
            tab
        );
        let mut stmt = db.conn().prepare(&sql)?;

        let rows = stmt
            .query_map([], |r| {
                let mut row = Row::new();
                for (i, col) in columns.iter().enumerate() {
                    let value: Option<String> = r.get(i)?;
                    row.insert(col.to_string(), value.unwrap_or_default());
                }
                Ok(row)
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(rows)
    }

    fn append_rows(&self, tab: &str, columns: &[&str], rows: &[Row]) -> Result<(), StoreError> {
        check_columns(tab, columns)?;
        let db = self.lock()?;

        let placeholders = vec!["?"; columns.len()].join(", ");
        let sql = format!(
            "INSERT INTO \"{}\" ({}) VALUES ({})",
            tab,
            quoted(columns),
            placeholders
        );

        let tx = db.conn().unchecked_transaction()?;
        {
            let mut stmt = tx.prepare(&sql)?;
            for row in rows {
                stmt.execute(params_from_iter(cells(row, columns)))?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn update_row(&self, tab: &str, columns: &[&str], id: &str, row: &Row) -> Result<bool, StoreError> {
        check_columns(tab, columns)?;
        let db = self.lock()?;

        let assignments = columns
            .iter()
            .map(|c| format!("\"{}\" = ?", c))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!("UPDATE \"{}\" SET {} WHERE \"id\" = ?", tab, assignments);

        let changed = db
            .conn()
            .execute(&sql, params_from_iter(cells(row, columns).chain(std::iter::once(id))))?;
        Ok(changed > 0)
    }

    fn delete_row(&self, tab: &str, id: &str) -> Result<bool, StoreError> {
        check_columns(tab, &[])?;
        let db = self.lock()?;

        let changed = db
            .conn()
            .execute(&format!("DELETE FROM \"{}\" WHERE \"id\" = ?", tab), [id])?;
        Ok(changed > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(pairs: &[(&str, &str)]) -> Row {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn test_append_and_read_in_order() {
        let sheets = SqliteSheets::open_memory().unwrap();
        let cols = ["id", "name"];

        sheets
            .append_rows("Companies", &cols, &[row(&[("id", "b"), ("name", "Beta")]), row(&[("id", "a")])])
            .unwrap();

        let rows = sheets.read_rows("Companies", &cols).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["id"], "b");
        assert_eq!(rows[1]["name"], "");
    }

    #[test]
    fn test_update_and_delete_by_id() {
        let sheets = SqliteSheets::open_memory().unwrap();
        let cols = ["id", "name"];
        sheets.append_rows("Companies", &cols, &[row(&[("id", "x"), ("name", "Old")])]).unwrap();

        assert!(sheets.update_row("Companies", &cols, "x", &row(&[("id", "x"), ("name", "New")])).unwrap());
        assert!(!sheets.update_row("Companies", &cols, "nope", &row(&[("id", "nope")])).unwrap());
        assert_eq!(sheets.read_rows("Companies", &cols).unwrap()[0]["name"], "New");

        assert!(sheets.delete_row("Companies", "x").unwrap());
        assert!(sheets.read_rows("Companies", &cols).unwrap().is_empty());
    }

    #[test]
    fn test_rejects_unknown_names() {
        let sheets = SqliteSheets::open_memory().unwrap();
        assert!(matches!(
            sheets.read_rows("Robert'); DROP TABLE", &["id"]),
            Err(StoreError::UnknownSheet(_))
        ));
        assert!(matches!(
            sheets.read_rows("Companies", &["id", "secret"]),
            Err(StoreError::UnknownSheet(_))
        ));
    }
}
