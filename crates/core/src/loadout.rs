use crate::fill::fill_remaining;
use crate::pool::{filter_pool, passes_level_gate};
use crate::quota::allocate_quotas;
use crate::{Catalog, Category, LoadoutConfig, QuotaConfig, RandomSource, RuleSet, Stratagem};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::debug;

pub const LOADOUT_SLOTS: usize = 4;

/// Up to four distinct stratagems in pick order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Loadout {
    stratagems: Vec<Stratagem>,
}

impl Loadout {
    pub fn len(&self) -> usize {
        self.stratagems.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stratagems.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Stratagem> {
        self.stratagems.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Stratagem> {
        self.stratagems.iter()
    }

    pub fn as_slice(&self) -> &[Stratagem] {
        &self.stratagems
    }

    pub fn ids(&self) -> Vec<&str> {
        self.stratagems.iter().map(|s| s.id.as_str()).collect()
    }

    pub fn count_category(&self, category: Category) -> usize {
        self.stratagems
            .iter()
            .filter(|s| s.category == category)
            .count()
    }

    pub fn into_vec(self) -> Vec<Stratagem> {
        self.stratagems
    }
}

impl<'a> IntoIterator for &'a Loadout {
    type Item = &'a Stratagem;
    type IntoIter = std::slice::Iter<'a, Stratagem>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Keeps the first occurrence of each id and at most [`LOADOUT_SLOTS`] entries.
impl FromIterator<Stratagem> for Loadout {
    fn from_iter<I: IntoIterator<Item = Stratagem>>(iter: I) -> Self {
        let mut seen = HashSet::new();
        let stratagems = iter
            .into_iter()
            .filter(|stratagem| seen.insert(stratagem.id.clone()))
            .take(LOADOUT_SLOTS)
            .collect();
        Self { stratagems }
    }
}

/// Accumulator shared by the quota and fill passes.
#[derive(Debug, Default)]
pub(crate) struct Picks<'a> {
    items: Vec<&'a Stratagem>,
    used: HashSet<&'a str>,
    per_category: HashMap<Category, usize>,
}

impl<'a> Picks<'a> {
    pub(crate) fn push(&mut self, stratagem: &'a Stratagem) {
        if self.is_full() || !self.used.insert(stratagem.id.as_str()) {
            return;
        }
        *self.per_category.entry(stratagem.category).or_insert(0) += 1;
        self.items.push(stratagem);
    }

    pub(crate) fn contains(&self, id: &str) -> bool {
        self.used.contains(id)
    }

    pub(crate) fn count(&self, category: Category) -> usize {
        self.per_category.get(&category).copied().unwrap_or(0)
    }

    pub(crate) fn remaining(&self) -> usize {
        LOADOUT_SLOTS.saturating_sub(self.items.len())
    }

    pub(crate) fn is_full(&self) -> bool {
        self.remaining() == 0
    }

    fn into_loadout(self) -> Loadout {
        Loadout {
            stratagems: self.items.into_iter().cloned().collect(),
        }
    }
}

/// Picks up to [`LOADOUT_SLOTS`] stratagems from `pool`: pinned quotas first,
/// then a capped random fill. Never fails; a small pool gives a short loadout.
pub fn pick_loadout(
    pool: &[&Stratagem],
    quotas: &QuotaConfig,
    rules: &RuleSet,
    player_level: u8,
    rng: &mut dyn RandomSource,
) -> Loadout {
    let levelled: Vec<&Stratagem> = pool
        .iter()
        .copied()
        .filter(|stratagem| passes_level_gate(stratagem, player_level))
        .collect();

    let mut picks = Picks::default();
    allocate_quotas(&levelled, quotas, &mut picks, rng);
    let pinned = picks.items.len();
    fill_remaining(&levelled, quotas, rules, &mut picks, rng);

    debug!(
        pool = levelled.len(),
        pinned,
        filled = picks.items.len() - pinned,
        "picked loadout"
    );
    picks.into_loadout()
}

/// Filters the catalog with `config` and picks from what is left.
pub fn roll_loadout(catalog: &Catalog, config: &LoadoutConfig, rng: &mut dyn RandomSource) -> Loadout {
    let pool = filter_pool(catalog, &config.warbonds, config.player_level);
    pick_loadout(
        &pool,
        &config.quotas,
        &config.rules,
        config.player_level,
        rng,
    )
}
