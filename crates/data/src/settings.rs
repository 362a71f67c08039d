//! Persisted user settings. Loading never fails: a missing file yields the
//! defaults and each malformed field falls back to its own default.

use anyhow::Context;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use strataroll_core::{
    Catalog, LoadoutConfig, QuotaConfig, RuleSet, WarbondSelection, MAX_PLAYER_LEVEL,
    MIN_PLAYER_LEVEL,
};
use tracing::{debug, warn};

const KEY_WARBONDS: &str = "warbonds";
const KEY_COUNTS: &str = "counts";
const KEY_RULES: &str = "rules";
const KEY_LEVEL: &str = "level";

pub fn default_settings_path() -> Option<PathBuf> {
    if let Some(path) = std::env::var_os("STRATAROLL_SETTINGS") {
        return Some(PathBuf::from(path));
    }
    std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".strataroll_settings.json"))
}

/// Every warbond enabled, nothing pinned, default rules, no level gate.
pub fn default_settings(catalog: &Catalog) -> LoadoutConfig {
    LoadoutConfig {
        warbonds: WarbondSelection::all(catalog),
        quotas: QuotaConfig::default(),
        rules: RuleSet::defaults(),
        player_level: MAX_PLAYER_LEVEL,
    }
}

pub fn load_settings(path: &Path, catalog: &Catalog) -> LoadoutConfig {
    match fs::read_to_string(path) {
        Ok(body) => parse_settings(&body, catalog),
        Err(err) => {
            debug!(path = %path.display(), %err, "no saved settings, using defaults");
            default_settings(catalog)
        }
    }
}

pub fn parse_settings(body: &str, catalog: &Catalog) -> LoadoutConfig {
    let defaults = default_settings(catalog);
    let root: Value = match serde_json::from_str(body) {
        Ok(value @ Value::Object(_)) => value,
        Ok(_) | Err(_) => {
            warn!("saved settings are not a JSON object, using defaults");
            return defaults;
        }
    };

    let mut warbonds = field(&root, KEY_WARBONDS).unwrap_or(defaults.warbonds);
    warbonds.retain_known(catalog);
    let quotas = field(&root, KEY_COUNTS).unwrap_or(defaults.quotas);
    let rules = field(&root, KEY_RULES).unwrap_or(defaults.rules);
    let player_level = field::<u8>(&root, KEY_LEVEL)
        .filter(|level| (MIN_PLAYER_LEVEL..=MAX_PLAYER_LEVEL).contains(level))
        .unwrap_or(defaults.player_level);

    LoadoutConfig {
        warbonds,
        quotas,
        rules,
        player_level,
    }
}

fn field<T: DeserializeOwned>(root: &Value, key: &str) -> Option<T> {
    let value = root.get(key)?;
    match serde_json::from_value(value.clone()) {
        Ok(parsed) => Some(parsed),
        Err(err) => {
            warn!(key, %err, "ignoring malformed saved setting");
            None
        }
    }
}

pub fn save_settings(path: &Path, settings: &LoadoutConfig) -> anyhow::Result<()> {
    let body = serde_json::to_string_pretty(settings).context("serialize settings")?;
    fs::write(path, body).with_context(|| format!("write {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{SystemTime, UNIX_EPOCH};
    use strataroll_core::{Category, Quota, RuleKey, Warbond, BASE_GAME_KEY};

    fn catalog() -> Catalog {
        Catalog::new(
            Vec::new(),
            vec![
                Warbond {
                    id: "chemical-agents".into(),
                    name: "Chemical Agents".into(),
                    pages: 3,
                },
                Warbond {
                    id: "urban-legends".into(),
                    name: "Urban Legends".into(),
                    pages: 3,
                },
            ],
        )
        .expect("catalog")
    }

    #[test]
    fn save_load_roundtrip() {
        let file = unique_temp_file("roundtrip");
        let catalog = catalog();
        let mut settings = default_settings(&catalog);
        settings.warbonds.disable("urban-legends");
        settings.quotas = QuotaConfig::with_order(&[Category::Eagle, Category::Orbital]);
        settings.quotas.pin(Category::Orbital, 2).expect("pin");
        settings.rules.deactivate(RuleKey::NoDoubleBackpack);
        settings.player_level = 12;
        save_settings(&file, &settings).expect("save");
        let loaded = load_settings(&file, &catalog);
        assert_eq!(loaded, settings);
        let _ = std::fs::remove_file(file);
    }

    #[test]
    fn missing_file_gives_defaults() {
        let catalog = catalog();
        let loaded = load_settings(&unique_temp_file("missing"), &catalog);
        assert_eq!(loaded, default_settings(&catalog));
        assert!(loaded.warbonds.contains("chemical-agents"));
        assert!(loaded.warbonds.includes_base_game());
    }

    #[test]
    fn garbage_gives_defaults() {
        let catalog = catalog();
        assert_eq!(parse_settings("{not json", &catalog), default_settings(&catalog));
        assert_eq!(parse_settings("[1, 2]", &catalog), default_settings(&catalog));
    }

    #[test]
    fn each_field_falls_back_on_its_own() {
        let catalog = catalog();
        let body = r#"{
  "warbonds": ["__base_game__", "retired-warbond"],
  "counts": {"orbital": 3, "eagle": 3},
  "rules": "no_double_backpack",
  "level": 7
}"#;
        let loaded = parse_settings(body, &catalog);
        assert_eq!(loaded.warbonds.keys(), vec![BASE_GAME_KEY.to_string()]);
        assert_eq!(loaded.quotas, QuotaConfig::default());
        assert_eq!(loaded.rules, RuleSet::defaults());
        assert_eq!(loaded.player_level, 7);
    }

    #[test]
    fn out_of_range_level_falls_back() {
        let catalog = catalog();
        let loaded = parse_settings(r#"{"level": 0, "counts": {"vehicle": 1}}"#, &catalog);
        assert_eq!(loaded.player_level, MAX_PLAYER_LEVEL);
        assert_eq!(loaded.quotas.get(Category::Vehicle), Quota::Exact(1));
        let loaded = parse_settings(r#"{"level": 99}"#, &catalog);
        assert_eq!(loaded.player_level, MAX_PLAYER_LEVEL);
    }

    #[test]
    fn unknown_rule_key_falls_back() {
        let catalog = catalog();
        let loaded = parse_settings(r#"{"rules": ["no_triple_eagle"]}"#, &catalog);
        assert_eq!(loaded.rules, RuleSet::defaults());
        let loaded = parse_settings(r#"{"rules": []}"#, &catalog);
        assert_eq!(loaded.rules, RuleSet::new());
    }

    fn unique_temp_file(tag: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("time")
            .as_nanos();
        std::env::temp_dir().join(format!(
            "strataroll_settings_test_{}_{}_{}.json",
            tag,
            std::process::id(),
            nanos
        ))
    }
}
