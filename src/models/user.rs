use serde::{Deserialize, Serialize};

use crate::store::Record;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct User {
    pub id: String,
    pub username: String,
    pub password_hash: String,
    pub telegram_chat_id: String,
    pub created_at: String,
}

impl Record for User {
    const TAB: &'static str = "Users";
    const COLUMNS: &'static [&'static str] =
        &["id", "username", "password_hash", "telegram_chat_id", "created_at"];

    fn id(&self) -> &str {
        &self.id
    }
}

/// Idempotency marker for daily jobs: one row per job name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerLogEntry {
    pub id: String,
    pub job_name: String,
    /// YYYY-MM-DD of the last run
    pub last_run_date: String,
    pub created_at: String,
}

impl Record for SchedulerLogEntry {
    const TAB: &'static str = "SchedulerLog";
    const COLUMNS: &'static [&'static str] = &["id", "job_name", "last_run_date", "created_at"];

    fn id(&self) -> &str {
        &self.id
    }
}
