//! The action feed: who needs attention right now, and why.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use super::labels::{days_ago_label, days_stale, parse_timestamp, ReferenceTimes};
use super::lookup::Lookup;
use super::{
    Snapshot, CONTACT_LIST_CAP, FOLLOW_UP_CAP, NEW_CONTACT_CAP, NO_TIME_SENTINEL, STALE_DEAL_CAP,
    UNKNOWN_CONTACT,
};
use crate::models::{contact_display_name, Contact, Deal, EngagementStage, FollowUp, Interaction};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    pub total_active_contacts: usize,
    pub in_conversation: usize,
    pub follow_ups_this_week: usize,
    pub deals_in_pipeline: usize,
    pub pipeline_value: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FollowUpItem {
    pub id: String,
    pub contact_id: String,
    pub contact_name: String,
    pub company_name: String,
    pub title: String,
    pub due_date: String,
    pub due_time: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactItem {
    pub id: String,
    pub name: String,
    pub company_name: String,
    pub role: String,
    pub engagement_stage: String,
    /// Date part of the contact's latest interaction, or "".
    pub last_interaction_date: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaleDealItem {
    pub id: String,
    pub title: String,
    pub contact_name: String,
    pub company_name: String,
    pub stage: String,
    pub value: f64,
    pub days_stale: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionRequired {
    pub overdue_follow_ups: Vec<FollowUpItem>,
    pub due_today: Vec<FollowUpItem>,
    pub overdue_total: usize,
    pub due_today_total: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Momentum {
    pub inbound_recent: Vec<ContactItem>,
    pub no_follow_up_scheduled: Vec<ContactItem>,
    pub inbound_recent_total: usize,
    pub no_follow_up_scheduled_total: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AtRisk {
    pub going_cold: Vec<ContactItem>,
    pub stale_deals: Vec<StaleDealItem>,
    pub going_cold_total: usize,
    pub stale_deals_total: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadyToReachOut {
    pub new_contacts: Vec<ContactItem>,
    pub new_contacts_total: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionFeed {
    pub stats: Stats,
    pub action_required: ActionRequired,
    pub momentum: Momentum,
    pub at_risk: AtRisk,
    pub ready_to_reach_out: ReadyToReachOut,
}

/// Timestamps that do not parse are treated as absent by every
/// time-windowed section.
fn resolvable(ts: &str) -> bool {
    parse_timestamp(ts).is_some()
}

/// Latest interaction per contact, in the order contacts were first seen.
/// Interactions without a parseable timestamp are skipped.
struct LastInteractions<'a> {
    order: Vec<&'a str>,
    latest: HashMap<&'a str, &'a Interaction>,
}

impl<'a> LastInteractions<'a> {
    fn build(interactions: &'a [Interaction]) -> Self {
        let mut order = Vec::new();
        let mut latest: HashMap<&str, &Interaction> = HashMap::new();

        for ix in interactions {
            let cid = ix.contact_id.as_str();
            let ts = ix.timestamp();
            if cid.is_empty() || !resolvable(ts) {
                continue;
            }
            let newer = match latest.get(cid) {
                None => {
                    order.push(cid);
                    true
                }
                Some(existing) => ts > existing.timestamp(),
            };
            if newer {
                latest.insert(cid, ix);
            }
        }

        Self { order, latest }
    }

    fn get(&self, contact_id: &str) -> Option<&'a Interaction> {
        self.latest.get(contact_id).copied()
    }

    fn contains(&self, contact_id: &str) -> bool {
        self.latest.contains_key(contact_id)
    }

    fn iter(&self) -> impl Iterator<Item = (&'a str, &'a Interaction)> + '_ {
        self.order.iter().map(move |cid| (*cid, self.latest[cid]))
    }
}

/// Shared per-call context for building items.
struct FeedContext<'a> {
    refs: ReferenceTimes,
    lookup: Lookup<'a>,
    last: LastInteractions<'a>,
}

impl<'a> FeedContext<'a> {
    fn follow_up_item(&self, f: &FollowUp) -> FollowUpItem {
        let contact = self.lookup.contact(&f.contact_id);
        FollowUpItem {
            id: f.id.clone(),
            contact_id: f.contact_id.clone(),
            contact_name: contact_display_name(contact, UNKNOWN_CONTACT),
            company_name: self.lookup.company_name_for(contact),
            title: f.title.clone(),
            due_date: f.due_date.clone(),
            due_time: f.due_time.clone(),
        }
    }

    fn contact_item(&self, c: &Contact, reason: String) -> ContactItem {
        let last_interaction_date: String = self
            .last
            .get(&c.id)
            .map(|ix| ix.timestamp().chars().take(10).collect())
            .unwrap_or_default();

        ContactItem {
            id: c.id.clone(),
            name: contact_display_name(Some(c), UNKNOWN_CONTACT),
            company_name: self.lookup.company_name_for(Some(c)),
            role: c.role.clone(),
            engagement_stage: c.engagement_stage.clone(),
            last_interaction_date,
            reason,
        }
    }

    fn stale_deal_item(&self, d: &Deal) -> StaleDealItem {
        let contact = self.lookup.contact(&d.contact_id);
        StaleDealItem {
            id: d.id.clone(),
            title: d.title.clone(),
            contact_name: contact_display_name(contact, UNKNOWN_CONTACT),
            company_name: self.lookup.company_name_for(contact),
            stage: d.stage.clone(),
            value: d.amount(),
            days_stale: days_stale(&d.updated_at, self.refs.now),
        }
    }

    fn label(&self, timestamp: &str) -> String {
        days_ago_label(timestamp, self.refs.now)
    }
}

/// Build the full action feed from one snapshot.
///
/// Total over arbitrary records: malformed values fall back to defaults and
/// dangling references to fallback labels. Never writes.
pub fn build_action_feed(snapshot: &Snapshot, now: DateTime<Utc>) -> ActionFeed {
    let ctx = FeedContext {
        refs: ReferenceTimes::at(now),
        lookup: Lookup::new(&snapshot.contacts, &snapshot.companies),
        last: LastInteractions::build(&snapshot.interactions),
    };

    let pending: Vec<&FollowUp> = snapshot.follow_ups.iter().filter(|f| f.is_pending()).collect();
    let open_deals: Vec<&Deal> = snapshot.deals.iter().filter(|d| d.is_open()).collect();

    ActionFeed {
        stats: stats(snapshot, &ctx.refs, &pending, &open_deals),
        action_required: action_required(&ctx, &pending),
        momentum: momentum(&ctx, snapshot, &pending),
        at_risk: at_risk(&ctx, snapshot, &open_deals),
        ready_to_reach_out: ready_to_reach_out(&ctx, snapshot),
    }
}

fn stats(snapshot: &Snapshot, refs: &ReferenceTimes, pending: &[&FollowUp], open_deals: &[&Deal]) -> Stats {
    Stats {
        total_active_contacts: snapshot.contacts.iter().filter(|c| !c.is_archived()).count(),
        in_conversation: snapshot
            .contacts
            .iter()
            .filter(|c| c.engagement().is_some_and(|e| e.is_in_conversation()))
            .count(),
        follow_ups_this_week: pending
            .iter()
            .filter(|f| f.due_date.as_str() <= refs.end_of_week.as_str())
            .count(),
        deals_in_pipeline: open_deals.len(),
        pipeline_value: open_deals.iter().map(|d| d.amount()).sum(),
    }
}

fn action_required(ctx: &FeedContext<'_>, pending: &[&FollowUp]) -> ActionRequired {
    let today = ctx.refs.today.as_str();

    let mut overdue: Vec<&FollowUp> = pending
        .iter()
        .copied()
        .filter(|f| !f.due_date.is_empty() && f.due_date.as_str() < today)
        .collect();
    overdue.sort_by(|a, b| a.due_date.cmp(&b.due_date));

    let mut due_today: Vec<&FollowUp> = pending
        .iter()
        .copied()
        .filter(|f| f.due_date == today)
        .collect();
    due_today.sort_by(|a, b| time_key(a).cmp(time_key(b)));

    ActionRequired {
        overdue_follow_ups: overdue.iter().take(FOLLOW_UP_CAP).map(|f| ctx.follow_up_item(f)).collect(),
        due_today: due_today.iter().take(FOLLOW_UP_CAP).map(|f| ctx.follow_up_item(f)).collect(),
        overdue_total: overdue.len(),
        due_today_total: due_today.len(),
    }
}

fn time_key(f: &FollowUp) -> &str {
    if f.due_time.is_empty() {
        NO_TIME_SENTINEL
    } else {
        &f.due_time
    }
}

fn momentum(ctx: &FeedContext<'_>, snapshot: &Snapshot, pending: &[&FollowUp]) -> Momentum {
    let week_ago = ctx.refs.week_ago.as_str();

    let mut inbound: Vec<&Interaction> = snapshot
        .interactions
        .iter()
        .filter(|ix| {
            !ix.contact_id.is_empty()
                && resolvable(ix.timestamp())
                && ix.is_inbound()
                && ix.timestamp() >= week_ago
        })
        .collect();
    inbound.sort_by(|a, b| b.timestamp().cmp(a.timestamp()));

    let mut seen: HashSet<String> = HashSet::new();
    inbound.retain(|ix| seen.insert(ix.contact_id.clone()));

    // Interactions whose contact has since been removed are dropped from the
    // shown list but still count toward the total.
    let inbound_recent = inbound
        .iter()
        .take(CONTACT_LIST_CAP)
        .filter_map(|ix| {
            let contact = ctx.lookup.contact(&ix.contact_id)?;
            let kind = if ix.kind.is_empty() { "message" } else { ix.kind.as_str() };
            let reason = format!("Replied via {} {}", kind, ctx.label(ix.timestamp()));
            Some(ctx.contact_item(contact, reason.trim().to_string()))
        })
        .collect();

    let has_pending: HashSet<&str> = pending.iter().map(|f| f.contact_id.as_str()).collect();

    let mut no_follow_up: Vec<ContactItem> = ctx
        .last
        .iter()
        .filter(|(cid, ix)| ix.timestamp() >= week_ago && !has_pending.contains(cid))
        .filter_map(|(cid, ix)| {
            let contact = ctx.lookup.contact(cid)?;
            if contact.engagement_stage.is_empty() || contact.engagement_stage == "new" {
                return None;
            }
            let reason = format!("Active {}, no follow-up scheduled", ctx.label(ix.timestamp()));
            Some(ctx.contact_item(contact, reason))
        })
        .collect();
    no_follow_up.sort_by(|a, b| b.last_interaction_date.cmp(&a.last_interaction_date));

    Momentum {
        inbound_recent,
        no_follow_up_scheduled_total: no_follow_up.len(),
        no_follow_up_scheduled: capped(no_follow_up, CONTACT_LIST_CAP),
        inbound_recent_total: inbound.len(),
    }
}

fn at_risk(ctx: &FeedContext<'_>, snapshot: &Snapshot, open_deals: &[&Deal]) -> AtRisk {
    let two_weeks_ago = ctx.refs.two_weeks_ago.as_str();

    let mut going_cold: Vec<ContactItem> = snapshot
        .contacts
        .iter()
        .filter(|c| c.engagement().is_some_and(|e| e.is_warm()))
        .filter_map(|c| match ctx.last.get(&c.id) {
            Some(ix) => {
                let ts = ix.timestamp();
                (ts < two_weeks_ago)
                    .then(|| ctx.contact_item(c, format!("No interaction for {}", ctx.label(ts))))
            }
            None => (resolvable(&c.created_at) && c.created_at.as_str() < two_weeks_ago)
                .then(|| ctx.contact_item(c, "No interactions recorded".to_string())),
        })
        .collect();
    going_cold.sort_by(|a, b| a.last_interaction_date.cmp(&b.last_interaction_date));

    let mut stale: Vec<StaleDealItem> = open_deals
        .iter()
        .filter(|d| resolvable(&d.updated_at) && d.updated_at.as_str() < two_weeks_ago)
        .map(|d| ctx.stale_deal_item(d))
        .collect();
    stale.sort_by(|a, b| b.days_stale.cmp(&a.days_stale));

    AtRisk {
        going_cold_total: going_cold.len(),
        going_cold: capped(going_cold, CONTACT_LIST_CAP),
        stale_deals_total: stale.len(),
        stale_deals: capped(stale, STALE_DEAL_CAP),
    }
}

fn ready_to_reach_out(ctx: &FeedContext<'_>, snapshot: &Snapshot) -> ReadyToReachOut {
    let mut new_contacts: Vec<ContactItem> = snapshot
        .contacts
        .iter()
        .filter(|c| {
            let is_new = c.engagement_stage.is_empty() || c.engagement() == Some(EngagementStage::New);
            is_new && !c.is_archived() && !ctx.last.contains(&c.id)
        })
        .map(|c| ctx.contact_item(c, "No outreach yet".to_string()))
        .collect();
    new_contacts.sort_by(|a, b| a.name.cmp(&b.name));

    ReadyToReachOut {
        new_contacts_total: new_contacts.len(),
        new_contacts: capped(new_contacts, NEW_CONTACT_CAP),
    }
}

fn capped<T>(mut items: Vec<T>, cap: usize) -> Vec<T> {
    items.truncate(cap);
    items
}
