use crate::loadout::Picks;
use crate::{shuffle, Category, RandomSource, Stratagem, LOADOUT_SLOTS};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::debug;

/// Per-category constraint. Persisted as `null` (unconstrained) or a count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "Option<u8>", into = "Option<u8>")]
pub enum Quota {
    #[default]
    Unconstrained,
    Exact(u8),
}

impl Quota {
    pub fn exact(self) -> Option<u8> {
        match self {
            Quota::Unconstrained => None,
            Quota::Exact(count) => Some(count),
        }
    }
}

impl From<Option<u8>> for Quota {
    fn from(value: Option<u8>) -> Self {
        value.map_or(Quota::Unconstrained, Quota::Exact)
    }
}

impl From<Quota> for Option<u8> {
    fn from(value: Quota) -> Self {
        value.exact()
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum QuotaError {
    #[error("category {0} cannot be pinned")]
    NotConfigurable(Category),
    #[error("pinned count {count} exceeds the {max} loadout slots")]
    CountOutOfRange { count: u8, max: usize },
    #[error("pinned total {total} exceeds the {max} loadout slots")]
    OverLimit { total: usize, max: usize },
}

/// Quotas for the configurable categories, kept in allocation priority order.
/// Persisted as `{"order": [...], "counts": {...}}`; a bare count map is also
/// accepted and takes the default order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "QuotaRepr", into = "QuotaRepr")]
pub struct QuotaConfig {
    entries: Vec<(Category, Quota)>,
}

impl Default for QuotaConfig {
    fn default() -> Self {
        Self::with_order(&Category::CONFIGURABLE)
    }
}

impl QuotaConfig {
    /// All-unconstrained config whose priority follows `order`. Duplicates and
    /// non-configurable categories are dropped.
    pub fn with_order(order: &[Category]) -> Self {
        let mut entries: Vec<(Category, Quota)> = Vec::with_capacity(order.len());
        for &category in order {
            if category.is_configurable() && !entries.iter().any(|(c, _)| *c == category) {
                entries.push((category, Quota::Unconstrained));
            }
        }
        Self { entries }
    }

    pub fn get(&self, category: Category) -> Quota {
        self.entries
            .iter()
            .find(|(c, _)| *c == category)
            .map(|(_, quota)| *quota)
            .unwrap_or_default()
    }

    pub fn set(&mut self, category: Category, quota: Quota) -> Result<(), QuotaError> {
        let Some(index) = self.entries.iter().position(|(c, _)| *c == category) else {
            return Err(QuotaError::NotConfigurable(category));
        };
        if let Quota::Exact(count) = quota {
            if count as usize > LOADOUT_SLOTS {
                return Err(QuotaError::CountOutOfRange {
                    count,
                    max: LOADOUT_SLOTS,
                });
            }
        }
        let previous = self.entries[index].1.exact().unwrap_or(0) as usize;
        let next = quota.exact().unwrap_or(0) as usize;
        let total = self.total_pinned() - previous + next;
        if total > LOADOUT_SLOTS {
            return Err(QuotaError::OverLimit {
                total,
                max: LOADOUT_SLOTS,
            });
        }
        self.entries[index].1 = quota;
        Ok(())
    }

    pub fn pin(&mut self, category: Category, count: u8) -> Result<(), QuotaError> {
        self.set(category, Quota::Exact(count))
    }

    pub fn unpin(&mut self, category: Category) {
        if let Some(entry) = self.entries.iter_mut().find(|(c, _)| *c == category) {
            entry.1 = Quota::Unconstrained;
        }
    }

    /// Categories in priority order with their quota.
    pub fn iter(&self) -> impl Iterator<Item = (Category, Quota)> + '_ {
        self.entries.iter().copied()
    }

    pub fn total_pinned(&self) -> usize {
        self.entries
            .iter()
            .filter_map(|(_, quota)| quota.exact())
            .map(usize::from)
            .sum()
    }

    pub fn is_over_limit(&self) -> bool {
        self.total_pinned() > LOADOUT_SLOTS
    }

    /// Slots left for the random fill once every pin is met.
    pub fn remaining_capacity(&self) -> usize {
        LOADOUT_SLOTS.saturating_sub(self.total_pinned())
    }
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum QuotaRepr {
    Ordered {
        order: Vec<Category>,
        counts: BTreeMap<Category, Quota>,
    },
    Counts(BTreeMap<Category, Quota>),
}

impl TryFrom<QuotaRepr> for QuotaConfig {
    type Error = QuotaError;

    fn try_from(repr: QuotaRepr) -> Result<Self, Self::Error> {
        let (mut config, counts) = match repr {
            QuotaRepr::Ordered { order, counts } => (QuotaConfig::with_order(&order), counts),
            QuotaRepr::Counts(counts) => (QuotaConfig::default(), counts),
        };
        for (category, quota) in counts {
            config.set(category, quota)?;
        }
        Ok(config)
    }
}

impl From<QuotaConfig> for QuotaRepr {
    fn from(config: QuotaConfig) -> Self {
        QuotaRepr::Ordered {
            order: config.entries.iter().map(|(category, _)| *category).collect(),
            counts: config.entries.into_iter().collect(),
        }
    }
}

/// First pass: honour every `Exact(n)` quota in priority order. Each pinned
/// category draws from a full shuffle of its unused eligible stratagems.
/// Shortfall is silent; the draw never pushes the loadout past its slots.
pub(crate) fn allocate_quotas<'a>(
    pool: &[&'a Stratagem],
    quotas: &QuotaConfig,
    picks: &mut Picks<'a>,
    rng: &mut dyn RandomSource,
) {
    for (category, quota) in quotas.iter() {
        let Quota::Exact(count) = quota else {
            continue;
        };
        let mut candidates: Vec<&'a Stratagem> = pool
            .iter()
            .copied()
            .filter(|stratagem| stratagem.category == category && !picks.contains(&stratagem.id))
            .collect();
        shuffle(&mut candidates, rng);
        // Validated configs never pin past the slots; this only bites when
        // the accumulator arrives partly filled.
        let wanted = (count as usize).min(picks.remaining());
        if candidates.len() < wanted {
            debug!(
                category = %category,
                wanted,
                available = candidates.len(),
                "quota shortfall"
            );
        }
        for stratagem in candidates.into_iter().take(wanted) {
            picks.push(stratagem);
        }
    }
}
