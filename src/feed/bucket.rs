use serde::Serialize;

use crate::models::{FollowUp, FollowUpStatus};

/// Follow-ups split by where their due date falls relative to today.
#[derive(Debug, Default, Serialize)]
pub struct FollowUpBuckets<'a> {
    pub overdue: Vec<&'a FollowUp>,
    pub today: Vec<&'a FollowUp>,
    pub upcoming: Vec<&'a FollowUp>,
    pub completed: Vec<&'a FollowUp>,
}

/// Bucket follow-ups against `today` (`YYYY-MM-DD`), keeping input order.
///
/// Completed items go to `completed`; pending items are placed by plain
/// string comparison of `due_date`. Any other status is dropped.
///
/// A pending item with an empty `due_date` compares below every date and
/// therefore lands in `overdue`.
pub fn group_follow_ups<'a>(
    follow_ups: impl IntoIterator<Item = &'a FollowUp>,
    today: &str,
) -> FollowUpBuckets<'a> {
    let mut buckets = FollowUpBuckets::default();

    for f in follow_ups {
        match f.status_kind() {
            Some(FollowUpStatus::Completed) => buckets.completed.push(f),
            Some(FollowUpStatus::Pending) => {
                let due = f.due_date.as_str();
                if due < today {
                    buckets.overdue.push(f);
                } else if due == today {
                    buckets.today.push(f);
                } else {
                    buckets.upcoming.push(f);
                }
            }
            _ => {}
        }
    }

    buckets
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fu(id: &str, status: &str, due: &str) -> FollowUp {
        FollowUp {
            id: id.to_string(),
            status: status.to_string(),
            due_date: due.to_string(),
            ..Default::default()
        }
    }

    fn ids(list: &[&FollowUp]) -> Vec<String> {
        list.iter().map(|f| f.id.clone()).collect()
    }

    #[test]
    fn test_buckets_partition_pending_and_completed() {
        let items = vec![
            fu("a", "pending", "2026-10-17"),
            fu("b", "pending", "2026-10-18"),
            fu("c", "pending", "2026-10-19"),
            fu("d", "completed", "2026-10-01"),
            fu("e", "completed", "2026-12-01"),
            fu("f", "snoozed", "2026-10-17"),
            fu("g", "PENDING", "2026-10-17"),
        ];

        let b = group_follow_ups(&items, "2026-10-18");
        assert_eq!(ids(&b.overdue), vec!["a"]);
        assert_eq!(ids(&b.today), vec!["b"]);
        assert_eq!(ids(&b.upcoming), vec!["c"]);
        assert_eq!(ids(&b.completed), vec!["d", "e"]);

        let placed = b.overdue.len() + b.today.len() + b.upcoming.len() + b.completed.len();
        let eligible = items
            .iter()
            .filter(|f| f.status == "pending" || f.status == "completed")
            .count();
        assert_eq!(placed, eligible);
    }

    #[test]
    fn test_pending_without_due_date_counts_as_overdue() {
        // Known quirk: an empty due date sorts before every real date.
        let items = vec![fu("x", "pending", "")];
        let b = group_follow_ups(&items, "2026-10-18");
        assert_eq!(ids(&b.overdue), vec!["x"]);
        assert!(b.today.is_empty());
    }

    #[test]
    fn test_keeps_input_order() {
        let items = vec![
            fu("late", "pending", "2026-10-10"),
            fu("early", "pending", "2026-01-01"),
        ];
        let b = group_follow_ups(&items, "2026-10-18");
        assert_eq!(ids(&b.overdue), vec!["late", "early"]);
    }
}
