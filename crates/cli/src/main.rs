mod options;
mod render;

use anyhow::Context;
use options::{apply_edits, parse_cli_options, CliOptions, USAGE};
use std::io::{self, Write};
use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant};
use strataroll_core::{
    roll_loadout, Catalog, EventBus, Loadout, RevealEvent, RevealScheduler, RevealTiming, RngState,
};
use strataroll_data::{default_settings, default_settings_path, load_catalog, load_settings, save_settings};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

const LOG_ENV: &str = "STRATAROLL_LOG";

fn main() {
    init_tracing();
    let args: Vec<String> = std::env::args().skip(1).collect();
    if let Err(err) = run(&args) {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn run(args: &[String]) -> anyhow::Result<()> {
    let options = parse_cli_options(args)?;
    if options.help {
        println!("{USAGE}");
        return Ok(());
    }

    let catalog = load_catalog(&options.assets)
        .with_context(|| format!("load catalog from {}", options.assets.display()))?;
    let settings_path = settings_path(&options);
    let mut config = match &settings_path {
        Some(path) => load_settings(path, &catalog),
        None => default_settings(&catalog),
    };
    apply_edits(&mut config, &options.edits, &catalog)?;
    debug!(?config, "effective settings");

    if options.save {
        let path = settings_path
            .as_deref()
            .context("no settings path: set STRATAROLL_SETTINGS or pass --settings")?;
        save_settings(path, &config)?;
        info!(path = %path.display(), "settings saved");
    }

    let mut rng = match options.seed {
        Some(seed) => RngState::from_seed(seed),
        None => RngState::from_entropy(),
    };
    let seed = rng.seed();
    let loadout = roll_loadout(&catalog, &config, &mut rng);
    info!(seed, picked = loadout.len(), "rolled loadout");

    if options.json {
        println!("{}", render::render_json(&loadout, seed)?);
        return Ok(());
    }
    if options.animate && !loadout.is_empty() {
        let reveal_rng = RngState::from_seed(rng.next_u64());
        animate(&loadout, &catalog, reveal_rng)?;
    }
    println!("{}", render::render_table(&loadout, &catalog, seed));
    Ok(())
}

fn settings_path(options: &CliOptions) -> Option<PathBuf> {
    options.settings.clone().or_else(default_settings_path)
}

/// Plays the reveal on a single terminal line against the wall clock.
fn animate(loadout: &Loadout, catalog: &Catalog, rng: RngState) -> anyhow::Result<()> {
    let mut reveal = RevealScheduler::new(RevealTiming::default(), rng);
    let mut events = EventBus::default();
    let clock = Instant::now();
    let elapsed_ms = || clock.elapsed().as_millis() as u64;

    let run = reveal.start(loadout, catalog, elapsed_ms(), &mut events);
    let mut stdout = io::stdout().lock();
    let mut last_frame = String::new();
    loop {
        reveal.advance_to(elapsed_ms(), &mut events);
        for event in events.drain() {
            if let RevealEvent::SlotLocked { slot, id, .. } = &event {
                debug!(%run, slot, id = %id, "slot locked");
            }
        }
        let frame = render::render_reveal_line(&reveal);
        if frame != last_frame {
            write!(stdout, "\r\x1b[2K{frame}").context("draw reveal")?;
            stdout.flush().context("draw reveal")?;
            last_frame = frame;
        }
        if reveal.is_settled() {
            break;
        }
        if let Some(due) = reveal.next_deadline() {
            let wait = due.saturating_sub(elapsed_ms());
            if wait > 0 {
                thread::sleep(Duration::from_millis(wait));
            }
        }
    }
    writeln!(stdout).context("draw reveal")?;
    Ok(())
}
