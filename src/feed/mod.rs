//! Derived dashboard views: the action feed, the dashboard summary and the
//! stale-deal report.
//!
//! Everything here is a pure function of a [`Snapshot`] and a reference
//! instant. Nothing in this module touches the store, so a feed is either
//! computed over a complete snapshot or not at all.

mod action;
mod bucket;
mod labels;
mod lookup;
mod summary;

pub use action::{
    build_action_feed, ActionFeed, ActionRequired, AtRisk, ContactItem, FollowUpItem, Momentum,
    ReadyToReachOut, StaleDealItem, Stats,
};
pub use bucket::{group_follow_ups, FollowUpBuckets};
pub use labels::{days_ago_label, days_stale, parse_timestamp, ReferenceTimes};
pub use lookup::Lookup;
pub use summary::{build_summary, stale_deals, DashboardSummary, StageTotals, StaleDealsReport};

use crate::models::{Company, Contact, Deal, FollowUp, Interaction};

/// Display caps per feed section. Totals are always reported uncapped.
pub const FOLLOW_UP_CAP: usize = 15;
pub const CONTACT_LIST_CAP: usize = 10;
pub const STALE_DEAL_CAP: usize = 10;
pub const NEW_CONTACT_CAP: usize = 20;
pub const SUMMARY_LIST_CAP: usize = 10;

/// Sorts after any real `HH:MM`, so untimed follow-ups go last.
pub const NO_TIME_SENTINEL: &str = "99:99";

/// Fallback shown for contacts that are missing or have no name.
pub const UNKNOWN_CONTACT: &str = "Unknown";

/// All records the feed reads, loaded once per call.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub contacts: Vec<Contact>,
    pub companies: Vec<Company>,
    pub deals: Vec<Deal>,
    pub follow_ups: Vec<FollowUp>,
    pub interactions: Vec<Interaction>,
}
