use serde::{Deserialize, Serialize};

use crate::store::Record;

/// Position of a deal in the sales pipeline. `Won` and `Lost` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Lead,
    Prospect,
    Qualified,
    Proposal,
    Negotiation,
    Won,
    Lost,
}

impl Stage {
    /// Pipeline order.
    pub const ALL: [Stage; 7] = [
        Stage::Lead,
        Stage::Prospect,
        Stage::Qualified,
        Stage::Proposal,
        Stage::Negotiation,
        Stage::Won,
        Stage::Lost,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Lead => "lead",
            Self::Prospect => "prospect",
            Self::Qualified => "qualified",
            Self::Proposal => "proposal",
            Self::Negotiation => "negotiation",
            Self::Won => "won",
            Self::Lost => "lost",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|stage| stage.as_str() == s)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Won | Self::Lost)
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Deal {
    pub id: String,
    pub contact_id: String,
    pub company_id: String,
    pub title: String,
    pub stage: String,
    /// Decimal amount as typed by the user; see [`parse_amount`].
    pub value: String,
    pub currency: String,
    pub priority: String,
    pub expected_close: String,
    pub notes: String,
    pub created_at: String,
    pub updated_at: String,
}

impl Deal {
    pub fn stage_kind(&self) -> Option<Stage> {
        Stage::parse(&self.stage)
    }

    /// Still in the pipeline: anything that is not won or lost, including
    /// unrecognized stage strings.
    pub fn is_open(&self) -> bool {
        !self.stage_kind().is_some_and(|s| s.is_terminal())
    }

    pub fn amount(&self) -> f64 {
        parse_amount(&self.value)
    }
}

impl Record for Deal {
    const TAB: &'static str = "Deals";
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "contact_id",
        "company_id",
        "title",
        "stage",
        "value",
        "currency",
        "priority",
        "expected_close",
        "notes",
        "created_at",
        "updated_at",
    ];

    fn id(&self) -> &str {
        &self.id
    }
}

/// Parse a money string. Blank, malformed and non-finite values count as 0.
pub fn parse_amount(s: &str) -> f64 {
    match s.trim().parse::<f64>() {
        Ok(v) if v.is_finite() => v,
        _ => 0.0,
    }
}
