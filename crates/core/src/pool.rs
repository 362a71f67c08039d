use crate::{Catalog, Stratagem};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::debug;

/// Selection key standing in for stratagems that ship with the base game.
pub const BASE_GAME_KEY: &str = "__base_game__";

pub const MIN_PLAYER_LEVEL: u8 = 1;
/// Highest unlock level in the dataset; at this level nothing is gated.
pub const MAX_PLAYER_LEVEL: u8 = 25;

/// Enabled warbonds plus the base-game sentinel. Persisted as a flat key list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct WarbondSelection {
    base_game: bool,
    warbonds: BTreeSet<String>,
}

impl WarbondSelection {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn base_game_only() -> Self {
        Self {
            base_game: true,
            warbonds: BTreeSet::new(),
        }
    }

    /// Base game plus every warbond the catalog knows.
    pub fn all(catalog: &Catalog) -> Self {
        Self {
            base_game: true,
            warbonds: catalog.warbonds().iter().map(|w| w.id.clone()).collect(),
        }
    }

    pub fn includes_base_game(&self) -> bool {
        self.base_game
    }

    pub fn contains(&self, key: &str) -> bool {
        if key == BASE_GAME_KEY {
            self.base_game
        } else {
            self.warbonds.contains(key)
        }
    }

    pub fn enable(&mut self, key: &str) {
        if key == BASE_GAME_KEY {
            self.base_game = true;
        } else {
            self.warbonds.insert(key.to_string());
        }
    }

    pub fn disable(&mut self, key: &str) {
        if key == BASE_GAME_KEY {
            self.base_game = false;
        } else {
            self.warbonds.remove(key);
        }
    }

    pub fn toggle(&mut self, key: &str) {
        if self.contains(key) {
            self.disable(key);
        } else {
            self.enable(key);
        }
    }

    /// Drops warbond ids the catalog does not know.
    pub fn retain_known(&mut self, catalog: &Catalog) {
        self.warbonds
            .retain(|id| catalog.warbond_by_id(id).is_some());
    }

    pub fn enables(&self, stratagem: &Stratagem) -> bool {
        match stratagem.warbond.as_deref() {
            None => self.base_game,
            Some(id) => self.warbonds.contains(id),
        }
    }

    pub fn keys(&self) -> Vec<String> {
        let mut keys = Vec::with_capacity(self.warbonds.len() + 1);
        if self.base_game {
            keys.push(BASE_GAME_KEY.to_string());
        }
        keys.extend(self.warbonds.iter().cloned());
        keys
    }
}

impl From<Vec<String>> for WarbondSelection {
    fn from(keys: Vec<String>) -> Self {
        let mut selection = Self::none();
        for key in &keys {
            selection.enable(key);
        }
        selection
    }
}

impl From<WarbondSelection> for Vec<String> {
    fn from(selection: WarbondSelection) -> Self {
        selection.keys()
    }
}

/// Catalog order is preserved.
pub fn filter_pool<'a>(
    catalog: &'a Catalog,
    selection: &WarbondSelection,
    player_level: u8,
) -> Vec<&'a Stratagem> {
    let pool: Vec<&Stratagem> = catalog
        .stratagems()
        .iter()
        .filter(|stratagem| selection.enables(stratagem) && passes_level_gate(stratagem, player_level))
        .collect();
    debug!(
        catalog = catalog.len(),
        eligible = pool.len(),
        player_level,
        "filtered stratagem pool"
    );
    pool
}

pub fn passes_level_gate(stratagem: &Stratagem, player_level: u8) -> bool {
    player_level >= MAX_PLAYER_LEVEL || stratagem.unlocked_at(player_level)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Category, Direction, Warbond};

    fn stratagem(id: &str, warbond: Option<&str>, unlock_level: Option<u8>) -> Stratagem {
        Stratagem {
            id: id.to_string(),
            name: id.to_string(),
            code: vec![Direction::Down],
            category: Category::Sentry,
            warbond: warbond.map(str::to_string),
            unlock_level,
        }
    }

    fn catalog() -> Catalog {
        Catalog::new(
            vec![
                stratagem("mg-sentry", None, Some(3)),
                stratagem("gatling-sentry", None, None),
                stratagem("flame-sentry", Some("urban-legends"), None),
                stratagem("laser-sentry", Some("dust-devils"), Some(30)),
            ],
            vec![
                Warbond {
                    id: "urban-legends".into(),
                    name: "Urban Legends".into(),
                    pages: 3,
                },
                Warbond {
                    id: "dust-devils".into(),
                    name: "Dust Devils".into(),
                    pages: 3,
                },
            ],
        )
        .unwrap()
    }

    fn ids(pool: &[&Stratagem]) -> Vec<String> {
        pool.iter().map(|s| s.id.clone()).collect()
    }

    #[test]
    fn base_game_sentinel_gates_unaffiliated_stratagems() {
        let catalog = catalog();
        let mut selection = WarbondSelection::none();
        selection.enable("urban-legends");
        assert_eq!(ids(&filter_pool(&catalog, &selection, 25)), vec!["flame-sentry"]);

        selection.enable(BASE_GAME_KEY);
        assert_eq!(
            ids(&filter_pool(&catalog, &selection, 25)),
            vec!["mg-sentry", "gatling-sentry", "flame-sentry"]
        );
    }

    #[test]
    fn level_gate_excludes_higher_unlocks() {
        let catalog = catalog();
        let selection = WarbondSelection::base_game_only();
        assert_eq!(ids(&filter_pool(&catalog, &selection, 2)), vec!["gatling-sentry"]);
        assert_eq!(
            ids(&filter_pool(&catalog, &selection, 3)),
            vec!["mg-sentry", "gatling-sentry"]
        );
    }

    #[test]
    fn max_level_disables_the_gate() {
        let catalog = catalog();
        let selection = WarbondSelection::all(&catalog);
        assert_eq!(filter_pool(&catalog, &selection, MAX_PLAYER_LEVEL).len(), 4);
    }

    #[test]
    fn empty_selection_yields_empty_pool() {
        let catalog = catalog();
        assert!(filter_pool(&catalog, &WarbondSelection::none(), 25).is_empty());
    }

    #[test]
    fn selection_round_trips_through_key_list() {
        let keys = vec![BASE_GAME_KEY.to_string(), "urban-legends".to_string()];
        let selection = WarbondSelection::from(keys.clone());
        assert!(selection.includes_base_game());
        assert!(selection.contains("urban-legends"));
        assert_eq!(Vec::<String>::from(selection), keys);
    }
}
