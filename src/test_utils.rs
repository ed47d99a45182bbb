//! Shared test doubles used across unit and integration tests.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::catalog::Rank;
use crate::fleet::FleetId;
use crate::screen::{GameScreen, Locator, ShortTimer};

/// How long a scripted element stays visible.
#[derive(Debug, Clone, Copy)]
enum Presence {
    Always,
    Times(u32),
}

#[derive(Debug, Default)]
struct ScreenState {
    present: HashMap<Locator, Presence>,
    click_results: HashMap<Locator, bool>,
    timers: HashMap<Locator, ShortTimer>,
    texts: HashMap<Locator, String>,
    resupply_ok: bool,
    clicks: Vec<Locator>,
    resupplied: Vec<FleetId>,
}

/// Scripted [`GameScreen`] for exercising scheduler flows without a real
/// recognizer behind them.
///
/// Cloning shares the underlying script and recordings, so a test can
/// keep a handle for assertions after boxing a clone into the scheduler.
/// Unscripted `exists` queries answer "not present" and unscripted
/// conditional clicks fail; every performed click and resupply call is
/// recorded in order.
#[derive(Debug, Clone)]
pub struct ScriptedScreen {
    state: Rc<RefCell<ScreenState>>,
}

impl Default for ScriptedScreen {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedScreen {
    /// Creates a screen with nothing visible and resupply succeeding.
    #[must_use]
    pub fn new() -> Self {
        let state = ScreenState {
            resupply_ok: true,
            ..ScreenState::default()
        };
        Self {
            state: Rc::new(RefCell::new(state)),
        }
    }

    /// Scripts the element as always visible.
    pub fn set_present(&self, locator: Locator) {
        self.state
            .borrow_mut()
            .present
            .insert(locator, Presence::Always);
    }

    /// Scripts the element as visible for the next `times` queries only.
    /// Useful for scroll controls that disappear at the end of the list.
    pub fn set_present_times(&self, locator: Locator, times: u32) {
        self.state
            .borrow_mut()
            .present
            .insert(locator, Presence::Times(times));
    }

    /// Scripts the result of conditional clicks on the element.
    pub fn set_click(&self, locator: Locator, succeeds: bool) {
        self.state
            .borrow_mut()
            .click_results
            .insert(locator, succeeds);
    }

    /// Scripts the timer read off the element.
    pub fn set_timer(&self, locator: Locator, timer: ShortTimer) {
        self.state.borrow_mut().timers.insert(locator, timer);
    }

    /// Scripts the text read off the element.
    pub fn set_text(&self, locator: Locator, text: &str) {
        self.state
            .borrow_mut()
            .texts
            .insert(locator, text.to_owned());
    }

    /// Scripts one visible expedition list entry: the `row`-th entry of
    /// the given rank, carrying the given name label.
    pub fn list_expedition(&self, rank: Rank, row: usize, label: &str) {
        self.set_present(Locator::ExpeditionLabel(rank, row));
        self.set_text(Locator::ExpeditionLabel(rank, row), label);
    }

    /// Scripts whether the automatic resupply succeeds.
    pub fn set_resupply(&self, succeeds: bool) {
        self.state.borrow_mut().resupply_ok = succeeds;
    }

    /// Every click performed so far, conditional and waited alike.
    #[must_use]
    pub fn clicks(&self) -> Vec<Locator> {
        self.state.borrow().clicks.clone()
    }

    /// Fleets passed to the resupply flow, in order.
    #[must_use]
    pub fn resupplied(&self) -> Vec<FleetId> {
        self.state.borrow().resupplied.clone()
    }
}

impl GameScreen for ScriptedScreen {
    fn exists(&mut self, locator: Locator) -> bool {
        let mut state = self.state.borrow_mut();
        match state.present.get_mut(&locator) {
            Some(Presence::Always) => true,
            Some(Presence::Times(n)) => {
                if *n == 0 {
                    false
                } else {
                    *n -= 1;
                    true
                }
            }
            None => false,
        }
    }

    fn click_if_present(&mut self, locator: Locator) -> bool {
        let mut state = self.state.borrow_mut();
        let clicked = state.click_results.get(&locator).copied().unwrap_or(false);
        if clicked {
            state.clicks.push(locator);
        }
        clicked
    }

    fn wait_then_click(&mut self, locator: Locator) {
        self.state.borrow_mut().clicks.push(locator);
    }

    fn read_short_timer(&mut self, locator: Locator) -> ShortTimer {
        self.state
            .borrow()
            .timers
            .get(&locator)
            .copied()
            .unwrap_or_default()
    }

    fn read_text(&mut self, locator: Locator) -> String {
        self.state
            .borrow()
            .texts
            .get(&locator)
            .cloned()
            .unwrap_or_default()
    }

    fn fairy_resupply(&mut self, fleet: FleetId) -> bool {
        let mut state = self.state.borrow_mut();
        state.resupplied.push(fleet);
        state.resupply_ok
    }
}
