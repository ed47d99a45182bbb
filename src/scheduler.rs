//! Per-cycle expedition orchestration.
//!
//! The scheduler owns the fleet roster and is its only writer. Each cycle
//! reconciles at most one elapsed return, then walks the fleets at base
//! and runs one dispatch attempt each against the shared screen. Attempt
//! failures are recoverable: they defer the fleet with a fresh return
//! estimate instead of raising. The single fatal outcome is a roster
//! expedition the screen cannot locate.

use std::collections::BTreeMap;

use chrono::{DateTime, Local};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, error, info, warn};

use crate::catalog::Area;
use crate::config::FlotillaConfig;
use crate::error::{ExpeditionError, Result};
use crate::fleet::{ChosenExpedition, Fleet, FleetId};
use crate::screen::{GameScreen, Locator};
use crate::stats::ExpeditionStats;

/// Fleet tab the expedition confirmation panel opens on. Switching tabs
/// is only needed for the other fleets.
const PRESELECTED_FLEET: FleetId = 2;

/// Minutes to defer a fleet whose ships are engaged or under repair.
const UNAVAILABLE_RECHECK_MINUTES: i64 = 15;

/// Outcome of the screen interaction for one dispatch attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AttemptOutcome {
    /// The fleet was confirmed and sent out.
    Dispatched,
    /// The slot already runs an expedition; remaining hours/minutes as
    /// read off the screen, negative once the completion banner is up.
    AlreadyRunning { hours: i64, minutes: i64 },
    /// The fleet or one of its ships is engaged or under repair.
    Unavailable,
    /// Supplies were short and the automatic resupply failed.
    SupplyShortfall,
}

/// Orchestrates expedition dispatch across all configured fleets.
pub struct ExpeditionScheduler {
    screen: Box<dyn GameScreen>,
    fleets: BTreeMap<FleetId, Fleet>,
    stats: ExpeditionStats,
    rng: StdRng,
    enabled: bool,
    disabled_at: Option<DateTime<Local>>,
}

impl ExpeditionScheduler {
    /// Builds the scheduler from the configured rosters, with every fleet
    /// starting at base.
    ///
    /// # Errors
    ///
    /// Returns a config error when no fleet has expeditions to run.
    pub fn new(config: &FlotillaConfig, screen: Box<dyn GameScreen>) -> Result<Self> {
        Self::new_at(config, screen, Local::now())
    }

    /// Time-explicit form of [`new`](Self::new).
    pub fn new_at(
        config: &FlotillaConfig,
        screen: Box<dyn GameScreen>,
        now: DateTime<Local>,
    ) -> Result<Self> {
        config.validate()?;
        let fleets: BTreeMap<FleetId, Fleet> = config
            .expeditions
            .rosters()
            .map(|(id, roster)| (id, Fleet::new(id, roster.to_vec(), now)))
            .collect();
        Ok(Self {
            screen,
            fleets,
            stats: ExpeditionStats::default(),
            rng: StdRng::from_entropy(),
            enabled: true,
            disabled_at: None,
        })
    }

    /// Replaces the expedition-selection RNG, e.g. with a seeded one.
    #[must_use]
    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = rng;
        self
    }

    /// Whether the scheduler is currently active.
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Re-activates the scheduler.
    pub fn enable(&mut self) {
        info!("re-activating the expedition scheduler");
        self.enabled = true;
        self.disabled_at = None;
    }

    /// Deactivates the scheduler. Cycles become no-ops until re-enabled;
    /// fleet state is kept as-is.
    pub fn disable(&mut self) {
        info!("de-activating the expedition scheduler");
        self.enabled = false;
        self.disabled_at = Some(Local::now());
    }

    /// True when any fleet's predicted return time has passed.
    ///
    /// Fleets running support expeditions are not counted: their timers
    /// do not signal a return, only [`reset_support_fleets`](Self::reset_support_fleets)
    /// does.
    pub fn awaiting_return(&self) -> bool {
        self.awaiting_return_at(Local::now())
    }

    /// Time-explicit form of [`awaiting_return`](Self::awaiting_return).
    pub fn awaiting_return_at(&self, now: DateTime<Local>) -> bool {
        self.fleets
            .values()
            .any(|fleet| !fleet.runs_support_expedition() && fleet.return_due(now))
    }

    /// True when any fleet is at base waiting to be sent out.
    pub fn fleets_at_base(&self) -> bool {
        self.fleets.values().any(Fleet::at_base)
    }

    /// Counters accumulated so far.
    pub fn stats(&self) -> ExpeditionStats {
        self.stats
    }

    /// Read access to one fleet, for status display and tests.
    pub fn fleet(&self, id: FleetId) -> Option<&Fleet> {
        self.fleets.get(&id)
    }

    /// One line per fleet with its predicted return time, or a single
    /// line naming the disable time when the scheduler is off.
    pub fn status_report(&self) -> Vec<String> {
        if !self.enabled {
            let since = self
                .disabled_at
                .map_or_else(|| "unknown".to_owned(), |t| {
                    t.format("%Y-%m-%d %H:%M:%S").to_string()
                });
            return vec![format!("expedition scheduler disabled as of {since}")];
        }
        self.fleets
            .values()
            .map(|fleet| {
                format!(
                    "fleet {}: expedition returns at {}",
                    fleet.id(),
                    fleet.formatted_return_time()
                )
            })
            .collect()
    }

    /// Runs one dispatch cycle at the current wall-clock time.
    pub fn run_cycle(&mut self) -> Result<()> {
        self.run_cycle_at(Local::now())
    }

    /// Runs one dispatch cycle against an explicit `now`.
    ///
    /// Enters the expedition screen, reconciles at most one elapsed
    /// return, then attempts a dispatch for every fleet at base, so a
    /// fleet freed this cycle goes straight back out. Recoverable attempt
    /// failures defer the affected fleet and are logged; the only error
    /// is the fatal missing-expedition case.
    pub fn run_cycle_at(&mut self, now: DateTime<Local>) -> Result<()> {
        if !self.enabled {
            debug!("expedition scheduler is disabled, skipping cycle");
            return Ok(());
        }
        self.screen.wait_then_click(Locator::ExpeditionMenu);
        self.receive_returned_fleet(now);
        let at_base: Vec<FleetId> = self
            .fleets
            .values()
            .filter(|fleet| fleet.at_base())
            .map(Fleet::id)
            .collect();
        for id in at_base {
            self.sortie_expedition(id, now)?;
        }
        Ok(())
    }

    /// Marks every fleet running support expeditions as returned.
    ///
    /// Support expeditions complete when the accompanying sortie ends,
    /// not when their own timer elapses, so the embedding bot signals
    /// that moment explicitly after each sortie. Does not count towards
    /// the received total.
    pub fn reset_support_fleets(&mut self) {
        self.reset_support_fleets_at(Local::now());
    }

    /// Time-explicit form of [`reset_support_fleets`](Self::reset_support_fleets).
    pub fn reset_support_fleets_at(&mut self, now: DateTime<Local>) {
        for fleet in self.fleets.values_mut() {
            if fleet.runs_support_expedition() {
                info!("resetting fleet {}'s expedition status", fleet.id());
                fleet.reconcile_return(now);
            }
        }
    }

    /// Reconciles at most one elapsed return, mirroring the game's
    /// one-notification-at-a-time return screen. Fleets already waiting
    /// on resupply and fleets running support expeditions are skipped.
    fn receive_returned_fleet(&mut self, now: DateTime<Local>) {
        for fleet in self.fleets.values_mut() {
            if fleet.runs_support_expedition() {
                continue;
            }
            if fleet.return_due(now) && !fleet.needs_resupply() {
                info!(
                    "an expedition fleet has returned, probably fleet {}",
                    fleet.id()
                );
                self.stats.record_received();
                fleet.reconcile_return(now);
                break;
            }
        }
    }

    /// One dispatch attempt for one fleet.
    ///
    /// `Ok(true)` means the fleet went out. `Ok(false)` means the attempt
    /// was aborted for a recoverable reason: the fleet was deferred with
    /// a revised return estimate, or left at base for the supply case.
    fn sortie_expedition(&mut self, id: FleetId, now: DateTime<Local>) -> Result<bool> {
        self.stats.record_attempted();
        let chosen = match self.fleets.get_mut(&id) {
            Some(fleet) => fleet.choose_expedition(&mut self.rng),
            None => return Ok(false),
        };
        info!("sortieing fleet {id} to expedition {}", chosen.id);

        let outcome = self.attempt_dispatch(id, chosen)?;
        let Some(fleet) = self.fleets.get_mut(&id) else {
            return Ok(false);
        };
        match outcome {
            AttemptOutcome::Dispatched => {
                fleet.dispatch(now);
                self.stats.record_sent();
                info!(
                    "fleet {id} sortied, expected return time {}",
                    fleet.formatted_return_time()
                );
                Ok(true)
            }
            AttemptOutcome::AlreadyRunning { hours, minutes } => {
                fleet.revise_return_estimate(now, hours, minutes);
                warn!(
                    "fleet {id} is already running an expedition, return time {}",
                    fleet.formatted_return_time()
                );
                Ok(false)
            }
            AttemptOutcome::Unavailable => {
                fleet.revise_return_estimate(now, 0, UNAVAILABLE_RECHECK_MINUTES);
                warn!(
                    "fleet {id} or one of its ships is not available, checking back at {}",
                    fleet.formatted_return_time()
                );
                Ok(false)
            }
            AttemptOutcome::SupplyShortfall => {
                warn!("fleet {id} is low on supplies and automatic resupply failed, retrying next cycle");
                Ok(false)
            }
        }
    }

    /// Drives the screen through one dispatch attempt and classifies what
    /// happened. Touches no fleet state.
    fn attempt_dispatch(&mut self, id: FleetId, chosen: ChosenExpedition) -> Result<AttemptOutcome> {
        self.navigate_to_expedition(chosen)?;

        if !self.screen.click_if_present(Locator::SortieSelect) {
            // The slot is occupied. The completion banner means the running
            // expedition is already done; otherwise read the remaining time
            // off the slot timer, minus a minute in case it rounds up.
            if self.screen.exists(Locator::TimerComplete) {
                return Ok(AttemptOutcome::AlreadyRunning {
                    hours: 0,
                    minutes: -1,
                });
            }
            let timer = self.screen.read_short_timer(Locator::ExpeditionTimer);
            return Ok(AttemptOutcome::AlreadyRunning {
                hours: i64::from(timer.hours),
                minutes: i64::from(timer.minutes) - 1,
            });
        }

        if id != PRESELECTED_FLEET {
            self.screen.wait_then_click(Locator::FleetTab(id));
        }

        if self.screen.exists(Locator::ShipBusy) || self.screen.exists(Locator::ShipRepairing) {
            self.back_out_to_first_world();
            return Ok(AttemptOutcome::Unavailable);
        }

        if self.screen.exists(Locator::ResupplyNeeded) && !self.screen.fairy_resupply(id) {
            self.back_out_to_first_world();
            return Ok(AttemptOutcome::SupplyShortfall);
        }

        self.screen.wait_then_click(Locator::DispatchButton);
        Ok(AttemptOutcome::Dispatched)
    }

    /// Finds and selects the expedition on the list of its world.
    ///
    /// Numbered expeditions live at the top of the list and coded ones at
    /// the bottom, so the list is first scrolled to the matching end.
    /// Candidate rows are then scanned by rank badge and their labels
    /// checked against the expedition's two-character name. A roster
    /// entry that never matches is a configuration error, not a transient
    /// condition.
    fn navigate_to_expedition(&mut self, chosen: ChosenExpedition) -> Result<()> {
        self.screen.wait_then_click(Locator::WorldTab(chosen.info.area));

        if chosen.id.is_coded() {
            while self.screen.exists(Locator::ScrollNext) {
                self.screen.click_if_present(Locator::ScrollNext);
            }
        } else {
            while self.screen.exists(Locator::ScrollPrev) {
                self.screen.click_if_present(Locator::ScrollPrev);
            }
        }

        let mut row = 0;
        while self.screen.exists(Locator::ExpeditionLabel(chosen.info.rank, row)) {
            let label = self.screen.read_text(Locator::ExpeditionLabel(chosen.info.rank, row));
            if chosen.id.matches_label(&label) {
                self.screen
                    .wait_then_click(Locator::ExpeditionRow(chosen.info.rank, row));
                return Ok(());
            }
            row += 1;
        }

        error!("could not find expedition {}, make sure it is unlocked", chosen.id);
        Err(ExpeditionError::ExpeditionNotFound {
            expedition: chosen.id,
        })
    }

    /// Leaves the fleet confirmation panel by clicking back to the first
    /// world tab, so the next attempt starts from a known place.
    fn back_out_to_first_world(&mut self) {
        self.screen.wait_then_click(Locator::WorldTab(Area::World(1)));
    }
}
