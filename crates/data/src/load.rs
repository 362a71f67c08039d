use crate::schema::{StratagemEntry, StratagemFile, WarbondFile};
use anyhow::Context;
use serde::de::DeserializeOwned;
use std::fs;
use std::path::Path;
use strataroll_core::{Catalog, Stratagem, Warbond};
use tracing::{debug, warn};

pub const STRATAGEMS_FILE: &str = "stratagems.json";
pub const WARBONDS_FILE: &str = "warbonds.json";

pub fn load_catalog(dir: &Path) -> anyhow::Result<Catalog> {
    let warbonds: WarbondFile = load_json(dir.join(WARBONDS_FILE))?;
    let stratagems: StratagemFile = load_json(dir.join(STRATAGEMS_FILE))?;
    build_catalog(stratagems.stratagems, warbonds.warbonds)
        .with_context(|| format!("build catalog from {}", dir.display()))
}

pub fn build_catalog(
    entries: Vec<StratagemEntry>,
    warbonds: Vec<Warbond>,
) -> anyhow::Result<Catalog> {
    let stratagems: Vec<Stratagem> = entries
        .into_iter()
        .map(|entry| {
            let warbond = entry.warbond.map(|name| {
                resolve_warbond(&name, &warbonds).unwrap_or_else(|| {
                    warn!(stratagem = %entry.id, warbond = %name, "unknown warbond");
                    name
                })
            });
            Stratagem {
                id: entry.id,
                name: entry.name,
                code: entry.code,
                category: entry.category,
                warbond,
                unlock_level: entry.unlock_level,
            }
        })
        .collect();
    let catalog = Catalog::new(stratagems, warbonds)?;
    debug!(
        stratagems = catalog.len(),
        warbonds = catalog.warbonds().len(),
        "loaded catalog"
    );
    Ok(catalog)
}

/// Maps a warbond reference (display name, slug or id) to its id.
pub fn resolve_warbond(reference: &str, warbonds: &[Warbond]) -> Option<String> {
    if let Some(warbond) = warbonds.iter().find(|w| w.name == reference) {
        return Some(warbond.id.clone());
    }
    let slug = slugify(reference);
    warbonds
        .iter()
        .find(|w| w.id == reference || w.id == slug || slugify(&w.name) == slug)
        .map(|w| w.id.clone())
}

/// Lowercase, runs of anything else collapsed to `-`, no leading/trailing `-`.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_dash = false;
    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(ch.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }
    slug
}

fn load_json<T: DeserializeOwned>(path: impl AsRef<Path>) -> anyhow::Result<T> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let value = serde_json::from_str(&raw).with_context(|| format!("parse {}", path.display()))?;
    Ok(value)
}
