//! Adapter between typed records and the flat, string-keyed rows the
//! spreadsheet-shaped backend stores.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

use super::StoreError;

/// One spreadsheet row: column name to cell text.
pub type Row = BTreeMap<String, String>;

/// A typed entity living in one tab of the store.
///
/// Every field is a string and every field defaults to empty, so decoding a
/// row never fails on missing or extra columns.
pub trait Record: Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Tab (table) name.
    const TAB: &'static str;
    /// Fixed column layout, in sheet order.
    const COLUMNS: &'static [&'static str];

    fn id(&self) -> &str;

    fn has_column(name: &str) -> bool {
        Self::COLUMNS.contains(&name)
    }

    fn from_row(row: &Row) -> Result<Self, StoreError> {
        let object: serde_json::Map<String, Value> = row
            .iter()
            .map(|(k, v)| (k.clone(), Value::String(v.clone())))
            .collect();
        serde_json::from_value(Value::Object(object))
            .map_err(|source| StoreError::Decode { tab: Self::TAB, source })
    }

    /// Full row with every column present.
    fn to_row(&self) -> Result<Row, StoreError> {
        let fields = to_fields(self)?;
        Ok(Self::COLUMNS
            .iter()
            .map(|col| (col.to_string(), fields.get(*col).cloned().unwrap_or_default()))
            .collect())
    }
}

/// Flatten a serializable value into the fields it actually provides.
///
/// `None`/null fields are dropped, so a patch struct of `Option`s yields only
/// the columns the caller set. Booleans become the sheet literals `TRUE` /
/// `FALSE`; numbers keep their JSON text.
pub fn to_fields<T: Serialize + ?Sized>(value: &T) -> Result<Row, StoreError> {
    let json = serde_json::to_value(value).map_err(|e| StoreError::Encode(e.to_string()))?;
    let Value::Object(object) = json else {
        return Err(StoreError::Encode("expected a JSON object".to_string()));
    };

    let mut row = Row::new();
    for (key, value) in object {
        let text = match value {
            Value::Null => continue,
            Value::String(s) => s,
            Value::Bool(true) => "TRUE".to_string(),
            Value::Bool(false) => "FALSE".to_string(),
            Value::Number(n) => n.to_string(),
            other => other.to_string(),
        };
        row.insert(key, text);
    }
    Ok(row)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Contact, Interaction};
    use serde::Serialize;

    #[test]
    fn test_from_row_fills_missing_columns() {
        let mut row = Row::new();
        row.insert("id".to_string(), "c1".to_string());
        row.insert("first_name".to_string(), "Grace".to_string());
        row.insert("not_a_column".to_string(), "ignored".to_string());

        let contact = Contact::from_row(&row).unwrap();
        assert_eq!(contact.id, "c1");
        assert_eq!(contact.first_name, "Grace");
        assert_eq!(contact.engagement_stage, "");
    }

    #[test]
    fn test_to_row_uses_column_names() {
        let ix = Interaction {
            id: "i1".to_string(),
            kind: "meeting".to_string(),
            ..Default::default()
        };
        let row = ix.to_row().unwrap();
        assert_eq!(row.len(), Interaction::COLUMNS.len());
        assert_eq!(row["type"], "meeting");
        assert_eq!(row["body"], "");
    }

    #[test]
    fn test_to_fields_skips_none() {
        #[derive(Serialize)]
        struct Patch {
            title: Option<String>,
            stage: Option<String>,
            hot: Option<bool>,
        }

        let fields = to_fields(&Patch {
            title: Some("Renewal".to_string()),
            stage: None,
            hot: Some(true),
        })
        .unwrap();

        assert_eq!(fields.len(), 2);
        assert_eq!(fields["title"], "Renewal");
        assert_eq!(fields["hot"], "TRUE");
    }
}
