use anyhow::Result;
use std::sync::Arc;

use crate::crm::Crm;
use crate::feed::{build_action_feed, build_summary};
use crate::jobs::{Jobs, Notifier};

pub fn run_feed(crm: &Crm) -> Result<()> {
    let feed = build_action_feed(&crm.snapshot()?, crm.now());
    println!("{}", serde_json::to_string_pretty(&feed)?);
    Ok(())
}

pub fn run_summary(crm: &Crm) -> Result<()> {
    let summary = build_summary(&crm.snapshot()?, crm.now());
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

/// Send the morning digest now. Without `force` this is a no-op once the
/// digest has gone out today.
pub fn run_digest(crm: &Crm, notifier: Arc<dyn Notifier>, force: bool) -> Result<()> {
    let jobs = Jobs::new(crm.clone(), notifier);
    match jobs.morning_digest(force)? {
        Some(text) => println!("{}", text),
        None => println!("Digest already sent today (use --force to resend)"),
    }
    Ok(())
}
