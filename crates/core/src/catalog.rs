use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Orbital,
    Eagle,
    Sentry,
    Vehicle,
    Emplacement,
    SupportWeapon,
    Backpack,
}

impl Category {
    pub const ALL: [Category; 7] = [
        Category::Orbital,
        Category::Eagle,
        Category::Sentry,
        Category::Vehicle,
        Category::Emplacement,
        Category::SupportWeapon,
        Category::Backpack,
    ];

    /// Categories a user may pin, in default allocation priority.
    pub const CONFIGURABLE: [Category; 6] = [
        Category::Orbital,
        Category::Eagle,
        Category::Sentry,
        Category::Vehicle,
        Category::Emplacement,
        Category::SupportWeapon,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Orbital => "orbital",
            Category::Eagle => "eagle",
            Category::Sentry => "sentry",
            Category::Vehicle => "vehicle",
            Category::Emplacement => "emplacement",
            Category::SupportWeapon => "support_weapon",
            Category::Backpack => "backpack",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        let key = key.trim().to_ascii_lowercase().replace('-', "_");
        Self::ALL.into_iter().find(|category| category.as_str() == key)
    }

    pub fn label(self) -> &'static str {
        match self {
            Category::Orbital => "Orbitals",
            Category::Eagle => "Eagles",
            Category::Sentry => "Sentries",
            Category::Vehicle => "Vehicles",
            Category::Emplacement => "Mines & Emplacements",
            Category::SupportWeapon => "Support Weapons",
            Category::Backpack => "Backpacks",
        }
    }

    pub fn is_configurable(self) -> bool {
        Self::CONFIGURABLE.contains(&self)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub fn arrow(self) -> char {
        match self {
            Direction::Up => '↑',
            Direction::Down => '↓',
            Direction::Left => '←',
            Direction::Right => '→',
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stratagem {
    pub id: String,
    pub name: String,
    pub code: Vec<Direction>,
    pub category: Category,
    /// Warbond id; `None` for base-game stratagems.
    #[serde(default)]
    pub warbond: Option<String>,
    #[serde(default)]
    pub unlock_level: Option<u8>,
}

impl Stratagem {
    pub fn is_base_game(&self) -> bool {
        self.warbond.is_none()
    }

    pub fn unlocked_at(&self, level: u8) -> bool {
        self.unlock_level.map_or(true, |required| required <= level)
    }

    pub fn code_arrows(&self) -> String {
        self.code.iter().map(|dir| dir.arrow()).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Warbond {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub pages: u8,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error("duplicate stratagem id {0}")]
    DuplicateStratagem(String),
    #[error("duplicate warbond id {0}")]
    DuplicateWarbond(String),
}

/// Immutable reference data: every stratagem and every warbond.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    stratagems: Vec<Stratagem>,
    warbonds: Vec<Warbond>,
}

impl Catalog {
    pub fn new(stratagems: Vec<Stratagem>, warbonds: Vec<Warbond>) -> Result<Self, CatalogError> {
        let mut seen = HashSet::new();
        for stratagem in &stratagems {
            if !seen.insert(stratagem.id.as_str()) {
                return Err(CatalogError::DuplicateStratagem(stratagem.id.clone()));
            }
        }
        let mut seen = HashSet::new();
        for warbond in &warbonds {
            if !seen.insert(warbond.id.as_str()) {
                return Err(CatalogError::DuplicateWarbond(warbond.id.clone()));
            }
        }
        Ok(Self {
            stratagems,
            warbonds,
        })
    }

    pub fn stratagems(&self) -> &[Stratagem] {
        &self.stratagems
    }

    pub fn warbonds(&self) -> &[Warbond] {
        &self.warbonds
    }

    pub fn len(&self) -> usize {
        self.stratagems.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stratagems.is_empty()
    }

    pub fn by_id(&self, id: &str) -> Option<&Stratagem> {
        self.stratagems.iter().find(|stratagem| stratagem.id == id)
    }

    pub fn warbond_by_id(&self, id: &str) -> Option<&Warbond> {
        self.warbonds.iter().find(|warbond| warbond.id == id)
    }

    pub fn warbond_by_name(&self, name: &str) -> Option<&Warbond> {
        self.warbonds.iter().find(|warbond| warbond.name == name)
    }

    pub fn category_counts(&self) -> BTreeMap<Category, usize> {
        let mut counts = BTreeMap::new();
        for stratagem in &self.stratagems {
            *counts.entry(stratagem.category).or_insert(0) += 1;
        }
        counts
    }
}
