use serde::Serialize;
use strataroll_core::{Catalog, Loadout, RandomSource, RevealScheduler, Stratagem, LOADOUT_SLOTS};

pub const NOTHING_AVAILABLE: &str =
    "nothing available: no stratagem matches the enabled warbonds and player level";

const BASE_GAME_LABEL: &str = "Base game";

#[derive(Debug, Serialize)]
struct LoadoutReport<'a> {
    seed: u64,
    slots: usize,
    loadout: &'a Loadout,
}

pub fn render_json(loadout: &Loadout, seed: u64) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&LoadoutReport {
        seed,
        slots: LOADOUT_SLOTS,
        loadout,
    })
}

pub fn warbond_label<'a>(stratagem: &'a Stratagem, catalog: &'a Catalog) -> &'a str {
    match stratagem.warbond.as_deref() {
        None => BASE_GAME_LABEL,
        Some(id) => catalog
            .warbond_by_id(id)
            .map(|warbond| warbond.name.as_str())
            .unwrap_or(id),
    }
}

pub fn render_table(loadout: &Loadout, catalog: &Catalog, seed: u64) -> String {
    if loadout.is_empty() {
        return NOTHING_AVAILABLE.to_string();
    }
    let rows: Vec<[String; 5]> = loadout
        .iter()
        .enumerate()
        .map(|(idx, stratagem)| {
            [
                (idx + 1).to_string(),
                stratagem.name.clone(),
                stratagem.category.label().to_string(),
                warbond_label(stratagem, catalog).to_string(),
                stratagem.code_arrows(),
            ]
        })
        .collect();
    let header = ["#", "Stratagem", "Category", "Source", "Code"];
    let mut widths = header.map(|title| title.chars().count());
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    push_row(&mut out, &header, &widths);
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    push_row(&mut out, &rule, &widths);
    for row in &rows {
        push_row(&mut out, row, &widths);
    }
    if loadout.len() < LOADOUT_SLOTS {
        out.push_str(&format!(
            "only {} of {} slots could be filled\n",
            loadout.len(),
            LOADOUT_SLOTS
        ));
    }
    out.push_str(&format!("seed: {seed}"));
    out
}

fn push_row<S: AsRef<str>>(out: &mut String, cells: &[S], widths: &[usize]) {
    let line: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| format!("{:<width$}", cell.as_ref(), width = *width))
        .collect();
    out.push_str(line.join("  ").trim_end());
    out.push('\n');
}

/// One line per frame: `[name]` while spinning, `[*name*]` during a lock flash.
pub fn render_reveal_line<R: RandomSource>(reveal: &RevealScheduler<R>) -> String {
    let cells: Vec<String> = reveal
        .slots()
        .iter()
        .map(|slot| {
            let name = slot.display.as_ref().map_or("...", |s| s.name.as_str());
            if slot.just_locked {
                format!("[*{name}*]")
            } else if slot.locked {
                format!("[{name}]")
            } else {
                format!("({name})")
            }
        })
        .collect();
    cells.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use strataroll_core::{Category, Direction, Warbond};

    fn catalog() -> Catalog {
        Catalog::new(
            vec![
                Stratagem {
                    id: "orbital-laser".into(),
                    name: "Orbital Laser".into(),
                    code: vec![Direction::Right, Direction::Down, Direction::Up],
                    category: Category::Orbital,
                    warbond: None,
                    unlock_level: Some(15),
                },
                Stratagem {
                    id: "tx-41-sterilizer".into(),
                    name: "TX-41 Sterilizer".into(),
                    code: vec![Direction::Down, Direction::Left],
                    category: Category::SupportWeapon,
                    warbond: Some("chemical-agents".into()),
                    unlock_level: None,
                },
            ],
            vec![Warbond {
                id: "chemical-agents".into(),
                name: "Chemical Agents".into(),
                pages: 3,
            }],
        )
        .expect("catalog")
    }

    #[test]
    fn table_lists_every_slot_and_flags_shortfall() {
        let catalog = catalog();
        let loadout: Loadout = catalog.stratagems().iter().cloned().collect();
        let table = render_table(&loadout, &catalog, 7);
        let lines: Vec<&str> = table.lines().collect();
        assert!(lines[0].starts_with("#  Stratagem"));
        assert!(lines[2].contains("Orbital Laser"));
        assert!(lines[2].contains("Base game"));
        assert!(lines[2].contains("→↓↑"));
        assert!(lines[3].contains("Chemical Agents"));
        assert!(table.contains("only 2 of 4 slots"));
        assert!(table.ends_with("seed: 7"));
    }

    #[test]
    fn empty_loadout_says_so() {
        let catalog = catalog();
        assert_eq!(
            render_table(&Loadout::default(), &catalog, 1),
            NOTHING_AVAILABLE
        );
    }

    #[test]
    fn json_report_carries_seed_and_ids() {
        let catalog = catalog();
        let loadout: Loadout = catalog.stratagems().iter().cloned().collect();
        let body = render_json(&loadout, 99).expect("json");
        let value: serde_json::Value = serde_json::from_str(&body).expect("parse");
        assert_eq!(value["seed"], 99);
        assert_eq!(value["loadout"][1]["id"], "tx-41-sterilizer");
        assert_eq!(value["loadout"][1]["category"], "support_weapon");
    }
}
