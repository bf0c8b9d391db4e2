use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::bucket::group_follow_ups;
use super::labels::{parse_timestamp, ReferenceTimes};
use super::{Snapshot, SUMMARY_LIST_CAP};
use crate::models::{Deal, FollowUp, Stage};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StageTotals {
    pub count: usize,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardSummary {
    /// Every pipeline stage, including empty ones.
    pub pipeline: BTreeMap<Stage, StageTotals>,
    pub overdue_count: usize,
    pub overdue_follow_ups: Vec<FollowUp>,
    pub todays_count: usize,
    pub todays_follow_ups: Vec<FollowUp>,
    pub recent_activity_count: usize,
    pub total_deals: usize,
    /// Value of deals that are neither won nor lost.
    pub total_deal_value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaleDealsReport {
    pub stale_deals: Vec<Deal>,
    pub count: usize,
}

pub fn build_summary(snapshot: &Snapshot, now: DateTime<Utc>) -> DashboardSummary {
    let refs = ReferenceTimes::at(now);

    let mut pipeline: BTreeMap<Stage, StageTotals> =
        Stage::ALL.iter().map(|s| (*s, StageTotals::default())).collect();
    for deal in &snapshot.deals {
        if let Some(totals) = deal.stage_kind().and_then(|s| pipeline.get_mut(&s)) {
            totals.count += 1;
            totals.value += deal.amount();
        }
    }

    let buckets = group_follow_ups(&snapshot.follow_ups, &refs.today);
    let first = |list: &[&FollowUp]| -> Vec<FollowUp> {
        list.iter().take(SUMMARY_LIST_CAP).map(|f| (*f).clone()).collect()
    };

    DashboardSummary {
        pipeline,
        overdue_count: buckets.overdue.len(),
        overdue_follow_ups: first(&buckets.overdue),
        todays_count: buckets.today.len(),
        todays_follow_ups: first(&buckets.today),
        recent_activity_count: snapshot
            .interactions
            .iter()
            .filter(|ix| {
                parse_timestamp(&ix.created_at).is_some() && ix.created_at >= refs.week_ago
            })
            .count(),
        total_deals: snapshot.deals.len(),
        total_deal_value: snapshot
            .deals
            .iter()
            .filter(|d| d.is_open())
            .map(|d| d.amount())
            .sum(),
    }
}

/// Open deals untouched for two weeks. Deals whose `updated_at` is missing
/// or unparseable are left out.
pub fn stale_deals(deals: &[Deal], now: DateTime<Utc>) -> StaleDealsReport {
    let cutoff = ReferenceTimes::at(now).two_weeks_ago;
    let stale: Vec<Deal> = deals
        .iter()
        .filter(|d| {
            d.is_open() && parse_timestamp(&d.updated_at).is_some() && d.updated_at < cutoff
        })
        .cloned()
        .collect();

    StaleDealsReport {
        count: stale.len(),
        stale_deals: stale,
    }
}
