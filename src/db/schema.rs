use crate::models::{
    Company, Contact, Deal, FollowUp, Interaction, SchedulerLogEntry, User,
};
use crate::store::Record;

pub const SCHEMA_VERSION: i32 = 1;

/// Every tab the store knows about, with its column layout.
pub const TABS: &[(&str, &[&str])] = &[
    (Contact::TAB, Contact::COLUMNS),
    (Company::TAB, Company::COLUMNS),
    (Deal::TAB, Deal::COLUMNS),
    (Interaction::TAB, Interaction::COLUMNS),
    (FollowUp::TAB, FollowUp::COLUMNS),
    (User::TAB, User::COLUMNS),
    (SchedulerLogEntry::TAB, SchedulerLogEntry::COLUMNS),
];

pub fn columns_for(tab: &str) -> Option<&'static [&'static str]> {
    TABS.iter().find(|(name, _)| *name == tab).map(|(_, cols)| *cols)
}

/// Each tab is a table of TEXT cells. `row_num` keeps rows in the order
/// they were appended, like lines in a sheet.
pub const SCHEMA_V1: &str = r#"
-- Schema version tracking
CREATE TABLE IF NOT EXISTS schema_version (
    id INTEGER PRIMARY KEY,
    version INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS "Contacts" (
    row_num INTEGER PRIMARY KEY AUTOINCREMENT,
    "id" TEXT NOT NULL DEFAULT '',
    "company_id" TEXT NOT NULL DEFAULT '',
    "first_name" TEXT NOT NULL DEFAULT '',
    "last_name" TEXT NOT NULL DEFAULT '',
    "email" TEXT NOT NULL DEFAULT '',
    "phone" TEXT NOT NULL DEFAULT '',
    "role" TEXT NOT NULL DEFAULT '',
    "linkedin_url" TEXT NOT NULL DEFAULT '',
    "urls" TEXT NOT NULL DEFAULT '',
    "source" TEXT NOT NULL DEFAULT '',
    "referral_contact_id" TEXT NOT NULL DEFAULT '',
    "tags" TEXT NOT NULL DEFAULT '',
    "notes" TEXT NOT NULL DEFAULT '',
    "status" TEXT NOT NULL DEFAULT '',
    "segment" TEXT NOT NULL DEFAULT '',
    "engagement_stage" TEXT NOT NULL DEFAULT '',
    "inbound_channel" TEXT NOT NULL DEFAULT '',
    "do_not_contact" TEXT NOT NULL DEFAULT '',
    "campaign_id" TEXT NOT NULL DEFAULT '',
    "created_at" TEXT NOT NULL DEFAULT '',
    "updated_at" TEXT NOT NULL DEFAULT ''
);
CREATE INDEX IF NOT EXISTS idx_contacts_id ON "Contacts"("id");

CREATE TABLE IF NOT EXISTS "Companies" (
    row_num INTEGER PRIMARY KEY AUTOINCREMENT,
    "id" TEXT NOT NULL DEFAULT '',
    "name" TEXT NOT NULL DEFAULT '',
    "industry" TEXT NOT NULL DEFAULT '',
    "website" TEXT NOT NULL DEFAULT '',
    "size" TEXT NOT NULL DEFAULT '',
    "notes" TEXT NOT NULL DEFAULT '',
    "created_at" TEXT NOT NULL DEFAULT '',
    "updated_at" TEXT NOT NULL DEFAULT ''
);
CREATE INDEX IF NOT EXISTS idx_companies_id ON "Companies"("id");

CREATE TABLE IF NOT EXISTS "Deals" (
    row_num INTEGER PRIMARY KEY AUTOINCREMENT,
    "id" TEXT NOT NULL DEFAULT '',
    "contact_id" TEXT NOT NULL DEFAULT '',
    "company_id" TEXT NOT NULL DEFAULT '',
    "title" TEXT NOT NULL DEFAULT '',
    "stage" TEXT NOT NULL DEFAULT '',
    "value" TEXT NOT NULL DEFAULT '',
    "currency" TEXT NOT NULL DEFAULT '',
    "priority" TEXT NOT NULL DEFAULT '',
    "expected_close" TEXT NOT NULL DEFAULT '',
    "notes" TEXT NOT NULL DEFAULT '',
    "created_at" TEXT NOT NULL DEFAULT '',
    "updated_at" TEXT NOT NULL DEFAULT ''
);
CREATE INDEX IF NOT EXISTS idx_deals_id ON "Deals"("id");

CREATE TABLE IF NOT EXISTS "Interactions" (
    row_num INTEGER PRIMARY KEY AUTOINCREMENT,
    "id" TEXT NOT NULL DEFAULT '',
    "contact_id" TEXT NOT NULL DEFAULT '',
    "deal_id" TEXT NOT NULL DEFAULT '',
    "type" TEXT NOT NULL DEFAULT '',
    "subject" TEXT NOT NULL DEFAULT '',
    "body" TEXT NOT NULL DEFAULT '',
    "url" TEXT NOT NULL DEFAULT '',
    "direction" TEXT NOT NULL DEFAULT '',
    "occurred_at" TEXT NOT NULL DEFAULT '',
    "created_at" TEXT NOT NULL DEFAULT ''
);
CREATE INDEX IF NOT EXISTS idx_interactions_id ON "Interactions"("id");

CREATE TABLE IF NOT EXISTS "FollowUps" (
    row_num INTEGER PRIMARY KEY AUTOINCREMENT,
    "id" TEXT NOT NULL DEFAULT '',
    "contact_id" TEXT NOT NULL DEFAULT '',
    "deal_id" TEXT NOT NULL DEFAULT '',
    "title" TEXT NOT NULL DEFAULT '',
    "due_date" TEXT NOT NULL DEFAULT '',
    "due_time" TEXT NOT NULL DEFAULT '',
    "status" TEXT NOT NULL DEFAULT '',
    "reminder_sent" TEXT NOT NULL DEFAULT '',
    "notes" TEXT NOT NULL DEFAULT '',
    "created_at" TEXT NOT NULL DEFAULT '',
    "completed_at" TEXT NOT NULL DEFAULT ''
);
CREATE INDEX IF NOT EXISTS idx_follow_ups_id ON "FollowUps"("id");

CREATE TABLE IF NOT EXISTS "Users" (
    row_num INTEGER PRIMARY KEY AUTOINCREMENT,
    "id" TEXT NOT NULL DEFAULT '',
    "username" TEXT NOT NULL DEFAULT '',
    "password_hash" TEXT NOT NULL DEFAULT '',
    "telegram_chat_id" TEXT NOT NULL DEFAULT '',
    "created_at" TEXT NOT NULL DEFAULT ''
);

CREATE TABLE IF NOT EXISTS "SchedulerLog" (
    row_num INTEGER PRIMARY KEY AUTOINCREMENT,
    "id" TEXT NOT NULL DEFAULT '',
    "job_name" TEXT NOT NULL DEFAULT '',
    "last_run_date" TEXT NOT NULL DEFAULT '',
    "created_at" TEXT NOT NULL DEFAULT ''
);
"#;
