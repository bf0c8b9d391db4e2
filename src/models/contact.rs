use serde::{Deserialize, Serialize};

use crate::store::Record;

/// Whether a contact is live or soft-deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ContactStatus {
    #[default]
    Active,
    Archived,
}

impl ContactStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Archived => "archived",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "active" => Some(Self::Active),
            "archived" => Some(Self::Archived),
            _ => None,
        }
    }
}

/// Relationship temperature of a contact, independent of any deal stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngagementStage {
    New,
    Nurturing,
    Active,
    Engaged,
    Client,
    Churned,
}

impl EngagementStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Nurturing => "nurturing",
            Self::Active => "active",
            Self::Engaged => "engaged",
            Self::Client => "client",
            Self::Churned => "churned",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "new" => Some(Self::New),
            "nurturing" => Some(Self::Nurturing),
            "active" => Some(Self::Active),
            "engaged" => Some(Self::Engaged),
            "client" => Some(Self::Client),
            "churned" => Some(Self::Churned),
            _ => None,
        }
    }

    /// Stages that count as "in conversation" on the dashboard.
    pub fn is_in_conversation(&self) -> bool {
        matches!(self, Self::Active | Self::Engaged)
    }

    /// Stages where silence is a risk signal.
    pub fn is_warm(&self) -> bool {
        matches!(self, Self::Active | Self::Engaged | Self::Nurturing)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Contact {
    pub id: String,
    pub company_id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub role: String,
    pub linkedin_url: String,
    pub urls: String,
    pub source: String,
    pub referral_contact_id: String,
    /// Comma-joined tag list
    pub tags: String,
    pub notes: String,
    pub status: String,
    pub segment: String,
    pub engagement_stage: String,
    pub inbound_channel: String,
    pub do_not_contact: String,
    pub campaign_id: String,
    pub created_at: String,
    pub updated_at: String,
}

impl Contact {
    pub fn is_archived(&self) -> bool {
        ContactStatus::parse(&self.status) == Some(ContactStatus::Archived)
    }

    pub fn engagement(&self) -> Option<EngagementStage> {
        EngagementStage::parse(&self.engagement_stage)
    }

    /// "First Last", or an empty string when both parts are blank.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name.trim(), self.last_name.trim())
            .trim()
            .to_string()
    }

    /// True when the tag list contains `tag` as a case-insensitive substring.
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.to_lowercase().contains(&tag.to_lowercase())
    }
}

impl Record for Contact {
    const TAB: &'static str = "Contacts";
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "company_id",
        "first_name",
        "last_name",
        "email",
        "phone",
        "role",
        "linkedin_url",
        "urls",
        "source",
        "referral_contact_id",
        "tags",
        "notes",
        "status",
        "segment",
        "engagement_stage",
        "inbound_channel",
        "do_not_contact",
        "campaign_id",
        "created_at",
        "updated_at",
    ];

    fn id(&self) -> &str {
        &self.id
    }
}

/// Display name for an optional contact, with a caller-chosen fallback for
/// missing contacts and blank names.
pub fn contact_display_name(contact: Option<&Contact>, fallback: &str) -> String {
    match contact {
        Some(c) => {
            let name = c.full_name();
            if name.is_empty() {
                fallback.to_string()
            } else {
                name
            }
        }
        None => fallback.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn named(first: &str, last: &str) -> Contact {
        Contact {
            first_name: first.to_string(),
            last_name: last.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_display_name() {
        assert_eq!(contact_display_name(Some(&named("Ada", "Lovelace")), "Unknown"), "Ada Lovelace");
        assert_eq!(contact_display_name(Some(&named("Ada", "")), "Unknown"), "Ada");
        assert_eq!(contact_display_name(Some(&named("", "Lovelace")), "Unknown"), "Lovelace");
        assert_eq!(contact_display_name(Some(&named("", "")), "Unknown"), "Unknown");
        assert_eq!(contact_display_name(None, "?"), "?");
    }

    #[test]
    fn test_engagement_parse() {
        assert_eq!(EngagementStage::parse("engaged"), Some(EngagementStage::Engaged));
        assert_eq!(EngagementStage::parse("Engaged"), None);
        assert_eq!(EngagementStage::parse(""), None);
        assert!(EngagementStage::Nurturing.is_warm());
        assert!(!EngagementStage::Nurturing.is_in_conversation());
    }

    #[test]
    fn test_archived_status() {
        let mut c = named("A", "B");
        assert!(!c.is_archived());
        c.status = "archived".to_string();
        assert!(c.is_archived());
        c.status = "ARCHIVED".to_string();
        assert!(!c.is_archived());
    }

    #[test]
    fn test_has_tag() {
        let c = Contact {
            tags: "uk_it_consulting,Warm".to_string(),
            ..Default::default()
        };
        assert!(c.has_tag("warm"));
        assert!(!c.has_tag("cold"));
    }
}
