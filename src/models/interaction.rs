use serde::{Deserialize, Serialize};

use crate::store::Record;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum InteractionType {
    #[default]
    Note,
    Call,
    Email,
    Meeting,
}

impl InteractionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Note => "note",
            Self::Call => "call",
            Self::Email => "email",
            Self::Meeting => "meeting",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "note" => Some(Self::Note),
            "call" => Some(Self::Call),
            "email" => Some(Self::Email),
            "meeting" => Some(Self::Meeting),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Inbound,
    Outbound,
    Internal,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Inbound => "inbound",
            Self::Outbound => "outbound",
            Self::Internal => "internal",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "inbound" => Some(Self::Inbound),
            "outbound" => Some(Self::Outbound),
            "internal" => Some(Self::Internal),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Interaction {
    pub id: String,
    pub contact_id: String,
    pub deal_id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub subject: String,
    pub body: String,
    pub url: String,
    pub direction: String,
    pub occurred_at: String,
    pub created_at: String,
}

impl Interaction {
    /// When the interaction happened: `occurred_at`, else `created_at`.
    /// Empty when neither is recorded.
    pub fn timestamp(&self) -> &str {
        if self.occurred_at.is_empty() {
            &self.created_at
        } else {
            &self.occurred_at
        }
    }

    pub fn is_inbound(&self) -> bool {
        Direction::parse(&self.direction) == Some(Direction::Inbound)
    }
}

impl Record for Interaction {
    const TAB: &'static str = "Interactions";
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "contact_id",
        "deal_id",
        "type",
        "subject",
        "body",
        "url",
        "direction",
        "occurred_at",
        "created_at",
    ];

    fn id(&self) -> &str {
        &self.id
    }
}
