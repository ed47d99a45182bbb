//! Expedition scheduler control loop.
//!
//! The real recognizer backend is supplied by the embedding bot; this
//! binary wires the scheduler to a simulated screen on which every
//! expedition is unlocked and every fleet is ready, so the cycle cadence,
//! logging and fatal-error handling can be observed end to end.
//!
//! Pass a config path as the first argument, otherwise the default config
//! location is tried before falling back to the built-in rosters.

use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use flotilla::catalog::{self, ExpeditionId, Rank};
use flotilla::fleet::FleetId;
use flotilla::screen::{GameScreen, Locator, ShortTimer};
use flotilla::{ExpeditionScheduler, FlotillaConfig};
use tracing::{debug, error, info};

/// Simulated screen with every expedition unlocked, every click landing
/// and every fleet supplied.
///
/// List entries are answered from the full catalog: the `row`-th label of
/// a rank is the `row`-th catalog expedition carrying that rank, which is
/// what a fully unlocked account shows.
struct DemoScreen {
    by_rank: HashMap<Rank, Vec<ExpeditionId>>,
}

impl DemoScreen {
    fn new() -> Self {
        let mut by_rank: HashMap<Rank, Vec<ExpeditionId>> = HashMap::new();
        for id in catalog::ALL_EXPEDITIONS {
            by_rank.entry(catalog::lookup(id).rank).or_default().push(id);
        }
        Self { by_rank }
    }

    fn entry_at(&self, rank: Rank, row: usize) -> Option<ExpeditionId> {
        self.by_rank.get(&rank).and_then(|ids| ids.get(row)).copied()
    }
}

impl GameScreen for DemoScreen {
    fn exists(&mut self, locator: Locator) -> bool {
        match locator {
            Locator::ExpeditionLabel(rank, row) => self.entry_at(rank, row).is_some(),
            // No scroll stops, no occupied slots, no busy or starved ships.
            _ => false,
        }
    }

    fn click_if_present(&mut self, _locator: Locator) -> bool {
        true
    }

    fn wait_then_click(&mut self, _locator: Locator) {}

    fn read_short_timer(&mut self, _locator: Locator) -> ShortTimer {
        ShortTimer::default()
    }

    fn read_text(&mut self, locator: Locator) -> String {
        match locator {
            Locator::ExpeditionLabel(rank, row) => self
                .entry_at(rank, row)
                .map(|id| id.to_string())
                .unwrap_or_default(),
            _ => String::new(),
        }
    }

    fn fairy_resupply(&mut self, _fleet: FleetId) -> bool {
        true
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => FlotillaConfig::from_file(Path::new(&path))?,
        None => {
            let default_path = FlotillaConfig::default_config_path();
            if default_path.exists() {
                FlotillaConfig::from_file(&default_path)?
            } else {
                info!("no config file found, using the default rosters");
                FlotillaConfig::default()
            }
        }
    };
    debug!("effective config:\n{}", toml::to_string_pretty(&config)?);

    let interval = Duration::from_secs(config.schedule.poll_interval_secs);
    let mut scheduler = ExpeditionScheduler::new(&config, Box::new(DemoScreen::new()))?;
    info!(
        "flotilla started, polling every {}s",
        config.schedule.poll_interval_secs
    );

    loop {
        if scheduler.awaiting_return() || scheduler.fleets_at_base() {
            if let Err(e) = scheduler.run_cycle() {
                error!("fatal scheduler error: {e}");
                return Err(e.into());
            }
            for line in scheduler.status_report() {
                info!("{line}");
            }
            info!("expedition totals: {}", scheduler.stats());
        }
        std::thread::sleep(interval);
    }
}
