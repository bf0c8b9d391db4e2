use thiserror::Error;

/// Failures of the record store. Any of these aborts the request that hit
/// it: callers never aggregate over a partially loaded snapshot.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("record store unavailable: {0}")]
    Unavailable(String),

    #[error("unknown sheet: {0}")]
    UnknownSheet(String),

    #[error("malformed row in {tab}: {source}")]
    Decode {
        tab: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("could not encode record fields: {0}")]
    Encode(String),
}
