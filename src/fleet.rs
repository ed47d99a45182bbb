//! Per-fleet expedition lifecycle state.
//!
//! A fleet is either at base (eligible for a dispatch attempt) or out on
//! an expedition with a predicted return time. The prediction is exactly
//! that: the game only sometimes exposes the true remaining time, so the
//! scheduler keeps correcting it from whatever partial signal the last
//! attempt produced. All mutation goes through the operations here; the
//! scheduler never pokes fields directly.

use chrono::{DateTime, Local, TimeDelta};
use rand::Rng;

use crate::catalog::{self, ExpeditionId, ExpeditionInfo};

/// In-game fleet slot number.
pub type FleetId = u8;

/// Minutes a reconciled return stays armed into the future, covering the
/// window until the follow-up resupply and dispatch complete so the same
/// return is not observed twice.
const RECONCILE_GRACE_MINUTES: i64 = 5;

/// Expedition selected for the in-flight (or imminent) dispatch.
#[derive(Debug, Clone, Copy)]
pub struct ChosenExpedition {
    /// Roster entry that was picked.
    pub id: ExpeditionId,
    /// Its catalog info, resolved at pick time.
    pub info: ExpeditionInfo,
}

/// One schedulable fleet.
#[derive(Debug, Clone)]
pub struct Fleet {
    id: FleetId,
    expeditions: Vec<ExpeditionId>,
    current: Option<ChosenExpedition>,
    at_base: bool,
    needs_resupply: bool,
    dispatched_at: DateTime<Local>,
    return_at: DateTime<Local>,
}

impl Fleet {
    /// Creates a fleet with its eligible expedition list.
    ///
    /// Both timestamps start at `now` and the fleet counts as at base, so
    /// the first cycle reconciles it and sends it straight out. A fleet
    /// that was actually mid-expedition when the process started is
    /// corrected by the already-running branch of its first attempt.
    #[must_use]
    pub fn new(id: FleetId, expeditions: Vec<ExpeditionId>, now: DateTime<Local>) -> Self {
        debug_assert!(!expeditions.is_empty(), "fleet roster must not be empty");
        Self {
            id,
            expeditions,
            current: None,
            at_base: true,
            needs_resupply: false,
            dispatched_at: now,
            return_at: now,
        }
    }

    pub fn id(&self) -> FleetId {
        self.id
    }

    /// Eligible expeditions, in roster order.
    pub fn expeditions(&self) -> &[ExpeditionId] {
        &self.expeditions
    }

    /// Expedition picked for the current (or imminent) deployment.
    /// Cleared when a return is reconciled.
    pub fn current(&self) -> Option<ChosenExpedition> {
        self.current
    }

    /// True while the fleet sits at base, eligible for a dispatch attempt.
    pub fn at_base(&self) -> bool {
        self.at_base
    }

    /// True after a reconciled return, until the next successful dispatch
    /// clears it.
    pub fn needs_resupply(&self) -> bool {
        self.needs_resupply
    }

    pub fn dispatched_at(&self) -> DateTime<Local> {
        self.dispatched_at
    }

    /// Predicted return time of the current deployment.
    pub fn return_at(&self) -> DateTime<Local> {
        self.return_at
    }

    /// True once the predicted return time has passed.
    pub fn return_due(&self, now: DateTime<Local>) -> bool {
        self.return_at < now
    }

    /// True when the eligible set contains a support expedition, whose
    /// completion tracks a sortie instead of its own timer.
    pub fn runs_support_expedition(&self) -> bool {
        self.expeditions.iter().any(|id| id.is_support())
    }

    /// Picks the next expedition uniformly from the eligible set and
    /// resolves it through the catalog.
    pub fn choose_expedition(&mut self, rng: &mut impl Rng) -> ChosenExpedition {
        let id = self.expeditions[rng.gen_range(0..self.expeditions.len())];
        let chosen = ChosenExpedition {
            id,
            info: catalog::lookup(id),
        };
        self.current = Some(chosen);
        chosen
    }

    /// Marks the fleet deployed after the screen confirmed the send.
    ///
    /// The return prediction is `now` plus the catalog duration of the
    /// expedition chosen immediately beforehand.
    pub fn dispatch(&mut self, now: DateTime<Local>) {
        self.dispatched_at = now;
        if let Some(chosen) = self.current {
            self.return_at = now + chosen.info.duration;
        }
        self.at_base = false;
        self.needs_resupply = false;
    }

    /// Re-estimates the return time as `now` plus the given offset.
    ///
    /// Used when a dispatch attempt could not proceed: either the on-screen
    /// timer revealed the true remaining duration, or a flat backoff delays
    /// the next attempt. Negative minutes are allowed; "already complete"
    /// is encoded as minus one minute so the next cycle picks the fleet up
    /// immediately.
    pub fn revise_return_estimate(&mut self, now: DateTime<Local>, hours: i64, minutes: i64) {
        self.dispatched_at = now;
        self.return_at = now + TimeDelta::hours(hours) + TimeDelta::minutes(minutes);
        self.at_base = false;
        self.needs_resupply = false;
    }

    /// Acknowledges an elapsed return: the fleet is back at base and must
    /// be resupplied before going out again. The return estimate is
    /// re-armed a few minutes ahead so the same return is not reconciled a
    /// second time while the resupply is still pending.
    pub fn reconcile_return(&mut self, now: DateTime<Local>) {
        self.revise_return_estimate(now, 0, RECONCILE_GRACE_MINUTES);
        self.current = None;
        self.at_base = true;
        self.needs_resupply = true;
    }

    /// Predicted return time formatted for status lines.
    pub fn formatted_return_time(&self) -> String {
        self.return_at.format("%Y-%m-%d %H:%M:%S").to_string()
    }
}
