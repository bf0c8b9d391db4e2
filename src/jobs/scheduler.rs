//! Daily digests, reminders and stale-deal alerts.
//!
//! Daily jobs record their last run date in the `SchedulerLog` tab, so a
//! restart (or a second ticking process) never sends the same digest twice
//! on one calendar day.

use anyhow::Result;
use chrono::{NaiveTime, Timelike};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

use super::notifier::Notifier;
use crate::clock::date_string;
use crate::crm::Crm;
use crate::feed::{group_follow_ups, stale_deals, Lookup};
use crate::models::{FollowUp, SHEET_TRUE};
use crate::store::Row;

pub const MORNING_DIGEST: &str = "morning_digest";
pub const STALE_DEAL_ALERTS: &str = "stale_deal_alerts";

const DIGEST_LIST_LIMIT: usize = 5;
const ALERT_LIST_LIMIT: usize = 10;

/// How often the runner wakes up.
pub const TICK_INTERVAL: Duration = Duration::from_secs(60);

/// Daily job times as minutes after midnight UTC.
const MORNING_DIGEST_AT: u32 = 9 * 60 + 30;
const STALE_ALERTS_AT: u32 = 18 * 60;

fn minute_of_day(time: NaiveTime) -> u32 {
    time.hour() * 60 + time.minute()
}

/// `HH:MM` (hour may be unpadded) or `HH:MM:SS`.
fn parse_due_time(s: &str) -> Option<NaiveTime> {
    let s = s.trim();
    NaiveTime::parse_from_str(s, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M:%S"))
        .ok()
}

pub struct Jobs {
    crm: Crm,
    notifier: Arc<dyn Notifier>,
}

impl Jobs {
    pub fn new(crm: Crm, notifier: Arc<dyn Notifier>) -> Self {
        Self { crm, notifier }
    }

    fn today(&self) -> String {
        date_string(self.crm.now())
    }

    pub fn already_ran_today(&self, job_name: &str) -> Result<bool> {
        let today = self.today();
        Ok(self
            .crm
            .scheduler_log
            .find_by_field("job_name", job_name)?
            .is_some_and(|entry| entry.last_run_date == today))
    }

    /// Upsert the job's log row with today's date.
    pub fn mark_ran(&self, job_name: &str) -> Result<()> {
        let mut fields = Row::new();
        fields.insert("last_run_date".to_string(), self.today());

        match self.crm.scheduler_log.find_by_field("job_name", job_name)? {
            Some(entry) => {
                self.crm.scheduler_log.update(&entry.id, fields)?;
            }
            None => {
                fields.insert("job_name".to_string(), job_name.to_string());
                self.crm.scheduler_log.create(fields)?;
            }
        }
        Ok(())
    }

    fn recipients(&self) -> Result<Vec<String>> {
        Ok(self
            .crm
            .users
            .all()?
            .into_iter()
            .map(|u| u.telegram_chat_id.trim().to_string())
            .filter(|id| !id.is_empty())
            .collect())
    }

    /// Send `text` to every recipient. Returns how many deliveries succeeded.
    fn broadcast(&self, text: &str) -> Result<usize> {
        let recipients = self.recipients()?;
        if recipients.is_empty() {
            debug!("no notification recipients configured");
        }

        let mut delivered = 0;
        for chat_id in &recipients {
            match self.notifier.send(chat_id, text) {
                Ok(()) => delivered += 1,
                Err(e) => error!(chat_id = %chat_id, error = %e, "failed to send notification"),
            }
        }
        Ok(delivered)
    }

    fn follow_up_line(&self, lookup: &Lookup<'_>, f: &FollowUp) -> String {
        format!("  • {} — {}", f.title, lookup.contact_name(&f.contact_id, "?"))
    }

    /// Plain-text morning digest for the current day.
    pub fn digest_text(&self) -> Result<String> {
        let now = self.crm.now();
        let today = date_string(now);
        let contacts = self.crm.contacts.all()?;
        let lookup = Lookup::new(&contacts, &[]);

        let pending = self.crm.follow_ups.get_all(&[("status", "pending")])?;
        let buckets = group_follow_ups(&pending, &today);
        let stale = stale_deals(&self.crm.deals.all()?, now);

        let mut lines = vec!["Morning Digest".to_string(), String::new()];

        if !buckets.overdue.is_empty() {
            lines.push(format!("{} overdue follow-ups", buckets.overdue.len()));
            for f in buckets.overdue.iter().take(DIGEST_LIST_LIMIT) {
                lines.push(self.follow_up_line(&lookup, f));
            }
        }

        if !buckets.today.is_empty() {
            lines.push(String::new());
            lines.push(format!("{} follow-ups due today", buckets.today.len()));
            for f in buckets.today.iter().take(DIGEST_LIST_LIMIT) {
                lines.push(self.follow_up_line(&lookup, f));
            }
        }

        if stale.count > 0 {
            lines.push(String::new());
            lines.push(format!("{} stale deals (no update in 14+ days)", stale.count));
            for d in stale.stale_deals.iter().take(DIGEST_LIST_LIMIT) {
                lines.push(format!("  • {} ({})", d.title, d.stage));
            }
        }

        if buckets.overdue.is_empty() && buckets.today.is_empty() && stale.count == 0 {
            lines.push("All clear! No overdue items.".to_string());
        }

        Ok(lines.join("\n"))
    }

    /// Send the morning digest unless it already went out today. `force`
    /// skips the once-a-day check. Returns the text when something was sent.
    pub fn morning_digest(&self, force: bool) -> Result<Option<String>> {
        if !force && self.already_ran_today(MORNING_DIGEST)? {
            debug!("morning digest already sent today, skipping");
            return Ok(None);
        }
        self.mark_ran(MORNING_DIGEST)?;

        let text = self.digest_text()?;
        let delivered = self.broadcast(&text)?;
        info!(delivered, "morning digest sent");
        Ok(Some(text))
    }

    /// Alert on deals with no update in two weeks, once a day, and only when
    /// there are any.
    pub fn stale_deal_alerts(&self) -> Result<Option<String>> {
        if self.already_ran_today(STALE_DEAL_ALERTS)? {
            debug!("stale deal alerts already sent today, skipping");
            return Ok(None);
        }
        self.mark_ran(STALE_DEAL_ALERTS)?;

        let report = stale_deals(&self.crm.deals.all()?, self.crm.now());
        if report.count == 0 {
            return Ok(None);
        }

        let mut lines = vec![format!("{} stale deals need attention:", report.count), String::new()];
        for d in report.stale_deals.iter().take(ALERT_LIST_LIMIT) {
            let last_update: String = d.updated_at.chars().take(10).collect();
            lines.push(format!("  • {} ({}) — last update: {}", d.title, d.stage, last_update));
        }
        let text = lines.join("\n");

        let delivered = self.broadcast(&text)?;
        info!(count = report.count, delivered, "stale deal alert sent");
        Ok(Some(text))
    }

    /// Remind about pending follow-ups due today whose time has come. Each
    /// follow-up is reminded about once. Returns how many were sent.
    pub fn follow_up_reminders(&self) -> Result<usize> {
        let now = self.crm.now();
        let today = date_string(now);
        let current_time = now.time();

        let due: Vec<FollowUp> = self
            .crm
            .follow_ups
            .get_all(&[("status", "pending"), ("due_date", today.as_str())])?
            .into_iter()
            .filter(|f| {
                !f.reminder_was_sent()
                    && parse_due_time(&f.due_time).is_some_and(|due| due <= current_time)
            })
            .collect();
        if due.is_empty() {
            return Ok(0);
        }

        let contacts = self.crm.contacts.all()?;
        let lookup = Lookup::new(&contacts, &[]);

        for f in &due {
            let text = format!(
                "Reminder: {} — {}",
                f.title,
                lookup.contact_name(&f.contact_id, "?")
            );
            self.broadcast(&text)?;

            let mut fields = Row::new();
            fields.insert("reminder_sent".to_string(), SHEET_TRUE.to_string());
            self.crm.follow_ups.update(&f.id, fields)?;
        }

        info!(count = due.len(), "follow-up reminders sent");
        Ok(due.len())
    }

    /// One scheduler pass: reminders every time, daily jobs once their time
    /// of day has passed. A failing job is logged and does not stop the
    /// others.
    pub fn tick(&self) {
        let minute = minute_of_day(self.crm.now().time());

        if let Err(e) = self.follow_up_reminders() {
            error!(error = %e, "follow-up reminders failed");
        }
        if minute >= MORNING_DIGEST_AT {
            if let Err(e) = self.morning_digest(false) {
                error!(error = %e, "morning digest failed");
            }
        }
        if minute >= STALE_ALERTS_AT {
            if let Err(e) = self.stale_deal_alerts() {
                error!(error = %e, "stale deal alerts failed");
            }
        }
    }
}

/// Run [`Jobs::tick`] on a background thread until `shutdown` is set.
pub fn spawn_scheduler(jobs: Jobs, shutdown: Arc<AtomicBool>) -> Result<JoinHandle<()>> {
    let handle = std::thread::Builder::new()
        .name("vosscrm-scheduler".to_string())
        .spawn(move || {
            info!("scheduler started: digest 09:30, stale alerts 18:00, reminders every minute");
            while !shutdown.load(Ordering::SeqCst) {
                jobs.tick();

                let started = Instant::now();
                while started.elapsed() < TICK_INTERVAL {
                    if shutdown.load(Ordering::SeqCst) {
                        break;
                    }
                    std::thread::sleep(Duration::from_millis(250));
                }
            }
            warn!("scheduler stopped");
        })?;
    Ok(handle)
}
