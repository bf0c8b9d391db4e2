use serde::{Deserialize, Serialize};

use crate::store::Record;

/// Lifecycle of a follow-up reminder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FollowUpStatus {
    #[default]
    Pending,
    Completed,
    Snoozed,
}

impl FollowUpStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Snoozed => "snoozed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "completed" => Some(Self::Completed),
            "snoozed" => Some(Self::Snoozed),
            _ => None,
        }
    }
}

/// Spreadsheet booleans are stored as the literal strings `TRUE` / `FALSE`.
pub const SHEET_TRUE: &str = "TRUE";
pub const SHEET_FALSE: &str = "FALSE";

/// A scheduled reminder tied to a contact and optionally a deal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FollowUp {
    pub id: String,
    pub contact_id: String,
    pub deal_id: String,
    pub title: String,
    /// YYYY-MM-DD
    pub due_date: String,
    /// HH:MM, optional
    pub due_time: String,
    pub status: String,
    pub reminder_sent: String,
    pub notes: String,
    pub created_at: String,
    pub completed_at: String,
}

impl FollowUp {
    pub fn status_kind(&self) -> Option<FollowUpStatus> {
        FollowUpStatus::parse(&self.status)
    }

    pub fn is_pending(&self) -> bool {
        self.status_kind() == Some(FollowUpStatus::Pending)
    }

    pub fn reminder_was_sent(&self) -> bool {
        self.reminder_sent == SHEET_TRUE
    }
}

impl Record for FollowUp {
    const TAB: &'static str = "FollowUps";
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "contact_id",
        "deal_id",
        "title",
        "due_date",
        "due_time",
        "status",
        "reminder_sent",
        "notes",
        "created_at",
        "completed_at",
    ];

    fn id(&self) -> &str {
        &self.id
    }
}
