use serde::Deserialize;
use strataroll_core::{Category, Direction, Warbond};

/// `stratagems.json` as written by the curation script.
#[derive(Debug, Clone, Deserialize)]
pub struct StratagemFile {
    pub stratagems: Vec<StratagemEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StratagemEntry {
    pub id: String,
    pub name: String,
    pub code: Vec<Direction>,
    pub category: Category,
    /// Warbond display name, not id.
    #[serde(default)]
    pub warbond: Option<String>,
    #[serde(default)]
    pub unlock_level: Option<u8>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WarbondFile {
    pub warbonds: Vec<Warbond>,
}
