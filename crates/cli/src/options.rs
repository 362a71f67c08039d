use anyhow::{anyhow, bail, Context};
use std::path::PathBuf;
use strataroll_core::{
    Catalog, Category, LoadoutConfig, QuotaConfig, RuleKey, WarbondSelection, BASE_GAME_KEY,
    MAX_PLAYER_LEVEL, MIN_PLAYER_LEVEL,
};

pub const DEFAULT_ASSETS_DIR: &str = "assets";

pub const USAGE: &str = "\
usage: strataroll [options]

  --assets DIR         catalog directory (default: assets)
  --settings FILE      settings file (default: $STRATAROLL_SETTINGS or ~/.strataroll_settings.json)
  --seed N             roll with a fixed seed
  --level N            player level, 1..=25 (25 disables the unlock gate)
  --pin CAT=N          require exactly N stratagems of CAT
  --unpin CAT          leave CAT to the random fill
  --rule KEY           enable a selection rule
  --no-rule KEY        disable a selection rule
  --warbond ID         enable a warbond (__base_game__ for the base game)
  --no-warbond ID      disable a warbond
  --only-base          enable only the base game
  --all-warbonds       enable the base game and every warbond
  --no-warbonds        disable the base game and every warbond
  --reset-pins         leave every category to the random fill
  --animate            play the slot reveal (not with --json)
  --json               print the loadout as JSON
  --save               write the effective settings back
  -h, --help           show this help";

/// One settings change requested on the command line, applied in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingsEdit {
    Level(u8),
    Pin(Category, u8),
    Unpin(Category),
    Rule(RuleKey, bool),
    Warbond(String, bool),
    OnlyBase,
    AllWarbonds,
    NoWarbonds,
    ResetPins,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliOptions {
    pub assets: PathBuf,
    pub settings: Option<PathBuf>,
    pub seed: Option<u64>,
    pub edits: Vec<SettingsEdit>,
    pub animate: bool,
    pub json: bool,
    pub save: bool,
    pub help: bool,
}

impl Default for CliOptions {
    fn default() -> Self {
        Self {
            assets: PathBuf::from(DEFAULT_ASSETS_DIR),
            settings: None,
            seed: None,
            edits: Vec::new(),
            animate: false,
            json: false,
            save: false,
            help: false,
        }
    }
}

pub fn parse_cli_options(args: &[String]) -> anyhow::Result<CliOptions> {
    let mut options = CliOptions::default();
    let mut idx = 0usize;
    while idx < args.len() {
        let flag = args[idx].as_str();
        let mut value = || {
            idx += 1;
            args.get(idx)
                .map(String::as_str)
                .ok_or_else(|| anyhow!("{flag} expects a value"))
        };
        match flag {
            "--assets" => options.assets = PathBuf::from(value()?),
            "--settings" => options.settings = Some(PathBuf::from(value()?)),
            "--seed" => {
                let raw = value()?;
                options.seed = Some(raw.parse().with_context(|| format!("bad seed {raw:?}"))?);
            }
            "--level" => options.edits.push(SettingsEdit::Level(parse_level(value()?)?)),
            "--pin" => {
                let (category, count) = parse_pin(value()?)?;
                options.edits.push(SettingsEdit::Pin(category, count));
            }
            "--unpin" => options.edits.push(SettingsEdit::Unpin(parse_category(value()?)?)),
            "--rule" => options.edits.push(SettingsEdit::Rule(parse_rule(value()?)?, true)),
            "--no-rule" => options.edits.push(SettingsEdit::Rule(parse_rule(value()?)?, false)),
            "--warbond" => options
                .edits
                .push(SettingsEdit::Warbond(value()?.to_string(), true)),
            "--no-warbond" => options
                .edits
                .push(SettingsEdit::Warbond(value()?.to_string(), false)),
            "--only-base" => options.edits.push(SettingsEdit::OnlyBase),
            "--all-warbonds" => options.edits.push(SettingsEdit::AllWarbonds),
            "--no-warbonds" => options.edits.push(SettingsEdit::NoWarbonds),
            "--reset-pins" => options.edits.push(SettingsEdit::ResetPins),
            "--animate" => options.animate = true,
            "--json" => options.json = true,
            "--save" => options.save = true,
            "-h" | "--help" => options.help = true,
            other => bail!("unknown option {other:?}"),
        }
        idx += 1;
    }
    if options.json && options.animate {
        bail!("--json and --animate cannot be combined");
    }
    Ok(options)
}

fn parse_level(raw: &str) -> anyhow::Result<u8> {
    let level: u8 = raw.parse().with_context(|| format!("bad level {raw:?}"))?;
    if !(MIN_PLAYER_LEVEL..=MAX_PLAYER_LEVEL).contains(&level) {
        bail!("level must be between {MIN_PLAYER_LEVEL} and {MAX_PLAYER_LEVEL}, got {level}");
    }
    Ok(level)
}

fn parse_category(raw: &str) -> anyhow::Result<Category> {
    Category::from_key(raw).ok_or_else(|| anyhow!("unknown category {raw:?}"))
}

fn parse_pin(raw: &str) -> anyhow::Result<(Category, u8)> {
    let (category, count) = raw
        .split_once('=')
        .ok_or_else(|| anyhow!("--pin expects CATEGORY=COUNT, got {raw:?}"))?;
    let count = count
        .trim()
        .parse()
        .with_context(|| format!("bad count in {raw:?}"))?;
    Ok((parse_category(category.trim())?, count))
}

fn parse_rule(raw: &str) -> anyhow::Result<RuleKey> {
    RuleKey::from_key(raw).ok_or_else(|| anyhow!("unknown rule {raw:?}"))
}

/// Applies the edits on top of the loaded settings. Warbond ids are checked
/// against the catalog so a typo fails loudly instead of emptying the pool.
pub fn apply_edits(
    config: &mut LoadoutConfig,
    edits: &[SettingsEdit],
    catalog: &Catalog,
) -> anyhow::Result<()> {
    for edit in edits {
        match edit {
            SettingsEdit::Level(level) => config.player_level = *level,
            SettingsEdit::Pin(category, count) => config
                .quotas
                .pin(*category, *count)
                .with_context(|| format!("pin {category}={count}"))?,
            SettingsEdit::Unpin(category) => config.quotas.unpin(*category),
            SettingsEdit::Rule(key, true) => config.rules.activate(*key),
            SettingsEdit::Rule(key, false) => config.rules.deactivate(*key),
            SettingsEdit::Warbond(id, enabled) => {
                if id != BASE_GAME_KEY && catalog.warbond_by_id(id).is_none() {
                    bail!("unknown warbond {id:?}");
                }
                if *enabled {
                    config.warbonds.enable(id);
                } else {
                    config.warbonds.disable(id);
                }
            }
            SettingsEdit::OnlyBase => config.warbonds = WarbondSelection::base_game_only(),
            SettingsEdit::AllWarbonds => config.warbonds = WarbondSelection::all(catalog),
            SettingsEdit::NoWarbonds => config.warbonds = WarbondSelection::none(),
            SettingsEdit::ResetPins => config.quotas = QuotaConfig::default(),
        }
    }
    Ok(())
}
