use serde::{Deserialize, Serialize};

use crate::store::Record;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Company {
    pub id: String,
    pub name: String,
    pub industry: String,
    pub website: String,
    pub size: String,
    pub notes: String,
    pub created_at: String,
    pub updated_at: String,
}

impl Record for Company {
    const TAB: &'static str = "Companies";
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "name",
        "industry",
        "website",
        "size",
        "notes",
        "created_at",
        "updated_at",
    ];

    fn id(&self) -> &str {
        &self.id
    }
}
