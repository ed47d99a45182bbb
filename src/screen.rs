//! Capability surface of the screen interaction layer.
//!
//! The scheduler never touches pixels itself. It addresses named on-screen
//! elements through [`GameScreen`] and interprets the coarse answers, while
//! implementations own all template matching, OCR, mouse movement and
//! settling waits. An element that is still absent after an
//! implementation's own bounded wait is reported as plain "not present";
//! there is no separate timeout signal.

use crate::catalog::{Area, Rank};
use crate::fleet::FleetId;

/// On-screen elements the scheduler addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Locator {
    /// Main menu entry leading to the expedition screen.
    ExpeditionMenu,
    /// World tab selecting an expedition area.
    WorldTab(Area),
    /// Scroll control paging the expedition list towards its top.
    ScrollPrev,
    /// Scroll control paging the expedition list towards its bottom.
    ScrollNext,
    /// Name label of the `n`-th visible list entry with the given rank.
    ExpeditionLabel(Rank, usize),
    /// Clickable body of the `n`-th visible list entry with the given rank.
    ExpeditionRow(Rank, usize),
    /// Button confirming the selected expedition for sortie.
    SortieSelect,
    /// Banner shown in place of the timer once the expedition running in
    /// the selected slot has already completed.
    TimerComplete,
    /// Remaining-time readout of the expedition running in the slot.
    ExpeditionTimer,
    /// Tab switching the active fleet on the confirmation panel.
    FleetTab(FleetId),
    /// Marker that a ship of the selected fleet is engaged elsewhere.
    ShipBusy,
    /// Marker that a ship of the selected fleet is in the repair dock.
    ShipRepairing,
    /// Marker that the selected fleet's supplies are not full.
    ResupplyNeeded,
    /// Button sending the confirmed fleet out.
    DispatchButton,
}

/// Hours/minutes pair read off the coarse on-screen timer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ShortTimer {
    pub hours: u32,
    pub minutes: u32,
}

/// Interface to the game screen.
///
/// Methods take `&mut self` because real implementations move the mouse
/// and cache recognition state between calls.
pub trait GameScreen {
    /// Returns whether the element is currently visible.
    fn exists(&mut self, locator: Locator) -> bool;

    /// Clicks the element if it is visible. Returns whether a click
    /// happened.
    fn click_if_present(&mut self, locator: Locator) -> bool;

    /// Waits for the element to appear, then clicks it.
    fn wait_then_click(&mut self, locator: Locator);

    /// Reads the hours/minutes timer associated with the element.
    fn read_short_timer(&mut self, locator: Locator) -> ShortTimer;

    /// Reads the text content of the element.
    fn read_text(&mut self, locator: Locator) -> String;

    /// Runs the game's automatic resupply flow for the fleet. Returns
    /// whether the fleet ended up fully supplied.
    fn fairy_resupply(&mut self, fleet: FleetId) -> bool;
}
