use std::collections::HashSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::sync::OnceLock;

use anyhow::{bail, Context, Result};
use regex::Regex;
use serde::Deserialize;
use tracing::info;

use crate::crm::Crm;
use crate::models::{ContactStatus, EngagementStage};
use crate::store::Row;

const PROSPECT_TAG: &str = "uk_it_consulting_prospects";

/// One company from a Sales Navigator prospect export.
///
/// Only `name` is required; every other column may be missing or empty.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProspectRow {
    pub name: String,
    pub industry: String,
    pub website: String,
    pub employees_linkedin: String,
    pub location: String,
    pub revenue: String,
    pub description: String,
    pub services: String,
    pub sales_nav_signal: String,
    pub sales_nav_activity: String,
    /// `"Name (Role)"`
    pub ceo: String,
    /// `"Name (Role), Name (Role)"`
    pub other_leaders: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Leader {
    pub first_name: String,
    pub last_name: String,
    pub role: String,
}

/// Import results summary.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ImportStats {
    pub companies: usize,
    pub contacts: usize,
    pub duplicates: usize,
    pub errors: usize,
}

fn leader_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^(.+?)\s*\(([^)]+)\)\s*$").expect("leader pattern is valid"))
}

/// Parse `"Jane Doe (CEO)"` into name parts and role. A bare name has an
/// empty role.
pub fn parse_leader(raw: &str) -> Option<Leader> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    let (name, role) = match leader_pattern().captures(raw) {
        Some(caps) => (
            caps.get(1).map_or("", |m| m.as_str()).trim(),
            caps.get(2).map_or("", |m| m.as_str()).trim(),
        ),
        None => (raw, ""),
    };

    let mut parts = name.split_whitespace();
    let first_name = parts.next()?.to_string();
    let last_name = parts.collect::<Vec<_>>().join(" ");

    Some(Leader {
        first_name,
        last_name,
        role: role.to_string(),
    })
}

/// The CEO plus each entry of `other_leaders`.
pub fn leaders_of(row: &ProspectRow) -> Vec<Leader> {
    let mut leaders: Vec<Leader> = parse_leader(&row.ceo).into_iter().collect();

    for chunk in row.other_leaders.split("),") {
        let mut chunk = chunk.trim().to_string();
        if chunk.is_empty() {
            continue;
        }
        if !chunk.ends_with(')') {
            chunk.push(')');
        }
        leaders.extend(parse_leader(&chunk));
    }
    leaders
}

/// `Label: value` lines for the descriptive columns that are set.
pub fn company_notes(row: &ProspectRow) -> String {
    [
        ("Location", &row.location),
        ("Revenue", &row.revenue),
        ("Description", &row.description),
        ("Services", &row.services),
        ("Sales Nav Signal", &row.sales_nav_signal),
        ("Sales Nav Activity", &row.sales_nav_activity),
    ]
    .iter()
    .filter(|(_, value)| !value.trim().is_empty())
    .map(|(label, value)| format!("{}: {}", label, value.trim()))
    .collect::<Vec<_>>()
    .join("\n")
}

fn company_fields(row: &ProspectRow) -> Row {
    let mut fields = Row::new();
    fields.insert("name".to_string(), row.name.trim().to_string());
    fields.insert("industry".to_string(), row.industry.trim().to_string());
    fields.insert("website".to_string(), row.website.trim().to_string());
    fields.insert("size".to_string(), row.employees_linkedin.trim().to_string());
    fields.insert("notes".to_string(), company_notes(row));
    fields
}

fn contact_fields(company_id: &str, leader: &Leader) -> Row {
    [
        ("company_id", company_id),
        ("first_name", leader.first_name.as_str()),
        ("last_name", leader.last_name.as_str()),
        ("role", leader.role.as_str()),
        ("source", "linkedin"),
        ("segment", "consulting"),
        ("engagement_stage", EngagementStage::New.as_str()),
        ("inbound_channel", "cold_outbound"),
        ("tags", PROSPECT_TAG),
        ("status", ContactStatus::Active.as_str()),
    ]
    .iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

/// Companies to create, with the leaders that belong to each.
#[derive(Debug, Default)]
struct ImportPlan {
    companies: Vec<Row>,
    leaders: Vec<(usize, Leader)>,
    duplicates: usize,
}

/// Skip companies whose name (case-insensitive) is already on file or
/// appeared earlier in the same file.
fn plan_import(rows: &[ProspectRow], mut known: HashSet<String>) -> ImportPlan {
    let mut plan = ImportPlan::default();

    for row in rows {
        if !known.insert(row.name.trim().to_lowercase()) {
            plan.duplicates += 1;
            continue;
        }
        plan.companies.push(company_fields(row));
        let index = plan.companies.len() - 1;
        plan.leaders
            .extend(leaders_of(row).into_iter().map(|leader| (index, leader)));
    }
    plan
}

fn read_rows<R: Read>(reader: R, stats: &mut ImportStats) -> Vec<ProspectRow> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut rows = Vec::new();

    for (idx, result) in csv_reader.deserialize::<ProspectRow>().enumerate() {
        let line = idx + 2; // header is line 1
        match result {
            Ok(row) if row.name.trim().is_empty() => {
                eprintln!("Line {}: name is required", line);
                stats.errors += 1;
            }
            Ok(row) => rows.push(row),
            Err(e) => {
                eprintln!("Line {}: parse error: {}", line, e);
                stats.errors += 1;
            }
        }
    }
    rows
}

/// Import a prospect CSV: one company per row, one contact per leader.
pub fn run_import(crm: &Crm, file: &str, dry_run: bool) -> Result<ImportStats> {
    let path = Path::new(file);
    if !path.exists() {
        bail!("File not found: {}", file);
    }
    let reader = File::open(path).context("Failed to open CSV file")?;

    let mut stats = ImportStats::default();
    let rows = read_rows(reader, &mut stats);
    eprintln!("Read {} rows from {}", rows.len(), file);

    let known: HashSet<String> = crm
        .companies
        .all()?
        .iter()
        .map(|c| c.name.trim().to_lowercase())
        .collect();

    let plan = plan_import(&rows, known);
    stats.duplicates = plan.duplicates;

    if dry_run {
        stats.companies = plan.companies.len();
        stats.contacts = plan.leaders.len();
        print_summary(&stats, true);
        return Ok(stats);
    }

    let created = crm.companies.bulk_create(plan.companies)?;
    let contacts: Vec<Row> = plan
        .leaders
        .iter()
        .filter_map(|(index, leader)| {
            created
                .get(*index)
                .map(|company| contact_fields(&company.id, leader))
        })
        .collect();
    let created_contacts = crm.contacts.bulk_create(contacts)?;

    stats.companies = created.len();
    stats.contacts = created_contacts.len();
    info!(
        companies = stats.companies,
        contacts = stats.contacts,
        skipped = stats.duplicates,
        "prospect import finished"
    );
    print_summary(&stats, false);
    Ok(stats)
}

fn print_summary(stats: &ImportStats, dry_run: bool) {
    let verb = if dry_run { "Would create" } else { "Created" };

    println!("\n{} {} companies, {} contacts", verb, stats.companies, stats.contacts);

    if stats.duplicates > 0 {
        println!("Skipped {} duplicate companies", stats.duplicates);
    }

    if stats.errors > 0 {
        println!("Errors: {}", stats.errors);
    }
}
