use crate::Category;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleKey {
    NoDoubleBackpack,
}

/// An exclusivity rule: at most `max` stratagems of `category` per loadout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuleDef {
    pub key: RuleKey,
    pub label: &'static str,
    pub description: &'static str,
    pub category: Category,
    pub max: u8,
}

pub const RULES: &[RuleDef] = &[RuleDef {
    key: RuleKey::NoDoubleBackpack,
    label: "Singular backpack",
    description: "You've only got one back to carry with.",
    category: Category::Backpack,
    max: 1,
}];

pub const DEFAULT_RULES: &[RuleKey] = &[RuleKey::NoDoubleBackpack];

impl RuleKey {
    pub const ALL: [RuleKey; 1] = [RuleKey::NoDoubleBackpack];

    pub fn as_str(self) -> &'static str {
        match self {
            RuleKey::NoDoubleBackpack => "no_double_backpack",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        let key = key.trim().to_ascii_lowercase().replace('-', "_");
        Self::ALL.into_iter().find(|rule| rule.as_str() == key)
    }

    pub fn def(self) -> &'static RuleDef {
        RULES
            .iter()
            .find(|rule| rule.key == self)
            .unwrap_or(&RULES[0])
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleSet {
    active: BTreeSet<RuleKey>,
}

impl RuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn defaults() -> Self {
        DEFAULT_RULES.iter().copied().collect()
    }

    pub fn is_active(&self, key: RuleKey) -> bool {
        self.active.contains(&key)
    }

    pub fn activate(&mut self, key: RuleKey) {
        self.active.insert(key);
    }

    pub fn deactivate(&mut self, key: RuleKey) {
        self.active.remove(&key);
    }

    pub fn toggle(&mut self, key: RuleKey) {
        if !self.active.remove(&key) {
            self.active.insert(key);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = RuleKey> + '_ {
        self.active.iter().copied()
    }

    /// Tightest cap any active rule puts on `category`.
    pub fn cap_for(&self, category: Category) -> Option<u8> {
        self.iter()
            .map(RuleKey::def)
            .filter(|rule| rule.category == category)
            .map(|rule| rule.max)
            .min()
    }
}

impl FromIterator<RuleKey> for RuleSet {
    fn from_iter<I: IntoIterator<Item = RuleKey>>(iter: I) -> Self {
        Self {
            active: iter.into_iter().collect(),
        }
    }
}
