use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};

use crate::clock::{date_string, iso_timestamp};

/// Reference points for one feed computation, all derived from a single
/// `now` so every section sees the same window.
#[derive(Debug, Clone)]
pub struct ReferenceTimes {
    pub now: DateTime<Utc>,
    /// `YYYY-MM-DD`
    pub today: String,
    /// Full timestamp, comparable with stored timestamps as strings.
    pub week_ago: String,
    pub two_weeks_ago: String,
    /// `YYYY-MM-DD`, `now + (6 - weekday)` days with Monday as 0.
    pub end_of_week: String,
}

impl ReferenceTimes {
    pub fn at(now: DateTime<Utc>) -> Self {
        let weekday = i64::from(now.weekday().num_days_from_monday());
        Self {
            now,
            today: date_string(now),
            week_ago: iso_timestamp(now - Duration::days(7)),
            two_weeks_ago: iso_timestamp(now - Duration::days(14)),
            end_of_week: date_string(now + Duration::days(6 - weekday)),
        }
    }
}

/// Parse a stored timestamp: RFC 3339 first (`Z` accepted), then the
/// leading `YYYY-MM-DD` as midnight UTC.
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    let date = NaiveDate::parse_from_str(s.get(..10)?, "%Y-%m-%d").ok()?;
    Some(date.and_hms_opt(0, 0, 0)?.and_utc())
}

/// "today", "1d ago" or "{N}d ago"; empty when `s` does not parse.
pub fn days_ago_label(s: &str, now: DateTime<Utc>) -> String {
    let Some(dt) = parse_timestamp(s) else {
        return String::new();
    };
    match (now - dt).num_days() {
        d if d <= 0 => "today".to_string(),
        1 => "1d ago".to_string(),
        d => format!("{}d ago", d),
    }
}

/// Whole days since `updated_at`. Only full RFC 3339 timestamps count;
/// anything else is 0.
pub fn days_stale(updated_at: &str, now: DateTime<Utc>) -> i64 {
    DateTime::parse_from_rfc3339(updated_at)
        .map(|dt| (now - dt.with_timezone(&Utc)).num_days())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        // A Sunday
        Utc.with_ymd_and_hms(2026, 10, 18, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_labels() {
        let now = now();
        assert_eq!(days_ago_label("2026-10-18T08:00:00+00:00", now), "today");
        assert_eq!(days_ago_label("2026-10-19T08:00:00Z", now), "today");
        assert_eq!(days_ago_label("2026-10-17T11:00:00.000000+00:00", now), "1d ago");
        assert_eq!(days_ago_label("2026-09-28T12:00:00Z", now), "20d ago");
        assert_eq!(days_ago_label("2026-10-16", now), "2d ago");
        assert_eq!(days_ago_label("2026-10-16T10:00:00", now), "2d ago");
        assert_eq!(days_ago_label("", now), "");
        assert_eq!(days_ago_label("last tuesday", now), "");
        assert_eq!(days_ago_label("2026", now), "");
    }

    #[test]
    fn test_days_stale() {
        let now = now();
        assert_eq!(days_stale("2026-10-03T12:00:00.000000+00:00", now), 15);
        assert_eq!(days_stale("2026-10-03T13:00:00Z", now), 14);
        assert_eq!(days_stale("2026-10-03", now), 0);
        assert_eq!(days_stale("garbage", now), 0);
    }

    #[test]
    fn test_reference_times() {
        let refs = ReferenceTimes::at(now());
        assert_eq!(refs.today, "2026-10-18");
        assert_eq!(refs.week_ago, "2026-10-11T12:00:00.000000+00:00");
        assert_eq!(refs.two_weeks_ago, "2026-10-04T12:00:00.000000+00:00");
        // Sunday is weekday 6, so the week ends today.
        assert_eq!(refs.end_of_week, "2026-10-18");

        let monday = ReferenceTimes::at(Utc.with_ymd_and_hms(2026, 10, 12, 0, 0, 0).unwrap());
        assert_eq!(monday.end_of_week, "2026-10-18");
    }
}
