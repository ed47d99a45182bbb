//! Integration tests for the expedition dispatch cycle.
//!
//! Runs the scheduler against a scripted screen and walks the full
//! attempt flows: navigation and label matching, occupied slots, busy
//! ships, supply handling, and the fatal missing-expedition path.

use chrono::{DateTime, Local, NaiveDateTime, TimeDelta, TimeZone, Utc};
use rand::SeedableRng;
use rand::rngs::StdRng;

use flotilla::catalog::{Area, ExpeditionId, Rank};
use flotilla::config::ExpeditionConfig;
use flotilla::screen::{Locator, ShortTimer};
use flotilla::test_utils::ScriptedScreen;
use flotilla::{ExpeditionError, ExpeditionScheduler, FlotillaConfig};

fn fixed_now() -> DateTime<Local> {
    Utc.with_ymd_and_hms(2026, 1, 10, 6, 0, 0)
        .unwrap()
        .with_timezone(&Local)
}

fn config_for(
    fleet2: Option<Vec<ExpeditionId>>,
    fleet3: Option<Vec<ExpeditionId>>,
    fleet4: Option<Vec<ExpeditionId>>,
) -> FlotillaConfig {
    FlotillaConfig {
        expeditions: ExpeditionConfig {
            fleet2,
            fleet3,
            fleet4,
        },
        ..FlotillaConfig::default()
    }
}

fn scheduler_for(
    config: &FlotillaConfig,
    screen: &ScriptedScreen,
    now: DateTime<Local>,
) -> ExpeditionScheduler {
    ExpeditionScheduler::new_at(config, Box::new(screen.clone()), now)
        .unwrap()
        .with_rng(StdRng::seed_from_u64(7))
}

/// A fresh scheduler reconciles the boot-time return and sends the fleet
/// straight out with its catalog duration.
#[test]
fn first_cycle_dispatches_a_fresh_fleet() {
    let now = fixed_now();
    let config = config_for(Some(vec![ExpeditionId::Numbered(1)]), None, None);
    let screen = ScriptedScreen::new();
    screen.list_expedition(Rank::E, 0, "01");
    screen.set_click(Locator::SortieSelect, true);
    let mut scheduler = scheduler_for(&config, &screen, now);

    let cycle_at = now + TimeDelta::minutes(1);
    scheduler.run_cycle_at(cycle_at).unwrap();

    let stats = scheduler.stats();
    assert_eq!(stats.received, 1);
    assert_eq!(stats.attempted, 1);
    assert_eq!(stats.sent, 1);

    let fleet = scheduler.fleet(2).unwrap();
    assert!(!fleet.at_base());
    assert!(!fleet.needs_resupply());
    assert_eq!(
        fleet.return_at(),
        cycle_at + TimeDelta::minutes(14) + TimeDelta::seconds(30)
    );

    let clicks = screen.clicks();
    assert_eq!(clicks[0], Locator::ExpeditionMenu);
    assert!(clicks.contains(&Locator::WorldTab(Area::World(1))));
    assert!(clicks.contains(&Locator::ExpeditionRow(Rank::E, 0)));
    assert!(clicks.contains(&Locator::SortieSelect));
    assert!(clicks.contains(&Locator::DispatchButton));
    // Fleet 2 is preselected on the confirmation panel.
    assert!(!clicks.contains(&Locator::FleetTab(2)));
}

/// Nothing happens on a cycle between a dispatch and its return.
#[test]
fn idle_cycle_between_dispatch_and_return() {
    let now = fixed_now();
    let config = config_for(Some(vec![ExpeditionId::Numbered(1)]), None, None);
    let screen = ScriptedScreen::new();
    screen.list_expedition(Rank::E, 0, "01");
    screen.set_click(Locator::SortieSelect, true);
    let mut scheduler = scheduler_for(&config, &screen, now);

    scheduler.run_cycle_at(now + TimeDelta::minutes(1)).unwrap();
    assert_eq!(scheduler.stats().sent, 1);

    // The poll gate would not even run a cycle here.
    let later = now + TimeDelta::minutes(2);
    assert!(!scheduler.awaiting_return_at(later));
    assert!(!scheduler.fleets_at_base());

    scheduler.run_cycle_at(later).unwrap();
    let stats = scheduler.stats();
    assert_eq!(stats.attempted, 1);
    assert_eq!(stats.received, 1);
}

/// Fleets other than the preselected one need a tab switch before the
/// availability checks.
#[test]
fn other_fleets_switch_the_fleet_tab() {
    let now = fixed_now();
    let config = config_for(None, Some(vec![ExpeditionId::Numbered(5)]), None);
    let screen = ScriptedScreen::new();
    screen.list_expedition(Rank::C, 0, "05");
    screen.set_click(Locator::SortieSelect, true);
    let mut scheduler = scheduler_for(&config, &screen, now);

    let cycle_at = now + TimeDelta::minutes(1);
    scheduler.run_cycle_at(cycle_at).unwrap();

    assert!(screen.clicks().contains(&Locator::FleetTab(3)));
    let fleet = scheduler.fleet(3).unwrap();
    assert_eq!(
        fleet.return_at(),
        cycle_at + TimeDelta::hours(1) + TimeDelta::minutes(29) + TimeDelta::seconds(30)
    );
}

/// An occupied slot with a readable timer defers the fleet by the read
/// time, one minute early.
#[test]
fn occupied_slot_defers_by_the_read_timer() {
    let now = fixed_now();
    let config = config_for(Some(vec![ExpeditionId::Numbered(1)]), None, None);
    let screen = ScriptedScreen::new();
    screen.list_expedition(Rank::E, 0, "01");
    screen.set_timer(
        Locator::ExpeditionTimer,
        ShortTimer {
            hours: 2,
            minutes: 10,
        },
    );
    let mut scheduler = scheduler_for(&config, &screen, now);

    let cycle_at = now + TimeDelta::minutes(1);
    scheduler.run_cycle_at(cycle_at).unwrap();

    let fleet = scheduler.fleet(2).unwrap();
    assert!(!fleet.at_base());
    assert_eq!(
        fleet.return_at(),
        cycle_at + TimeDelta::hours(2) + TimeDelta::minutes(9)
    );
    let stats = scheduler.stats();
    assert_eq!(stats.attempted, 1);
    assert_eq!(stats.sent, 0);
}

/// The completion banner re-arms the fleet for the very next cycle, which
/// then reconciles it and sends it out again.
#[test]
fn completed_slot_is_picked_up_on_the_next_cycle() {
    let now = fixed_now();
    let config = config_for(Some(vec![ExpeditionId::Numbered(1)]), None, None);
    let screen = ScriptedScreen::new();
    screen.list_expedition(Rank::E, 0, "01");
    screen.set_present(Locator::TimerComplete);
    let mut scheduler = scheduler_for(&config, &screen, now);

    let first_at = now + TimeDelta::minutes(1);
    scheduler.run_cycle_at(first_at).unwrap();
    let fleet = scheduler.fleet(2).unwrap();
    assert_eq!(fleet.return_at(), first_at - TimeDelta::minutes(1));
    assert!(scheduler.awaiting_return_at(first_at));

    // The slot frees up before the next cycle.
    screen.set_click(Locator::SortieSelect, true);
    let second_at = now + TimeDelta::minutes(2);
    scheduler.run_cycle_at(second_at).unwrap();

    let stats = scheduler.stats();
    assert_eq!(stats.received, 2);
    assert_eq!(stats.sent, 1);
    assert_eq!(
        scheduler.fleet(2).unwrap().return_at(),
        second_at + TimeDelta::minutes(14) + TimeDelta::seconds(30)
    );
}

/// Busy ships defer the fleet by a flat recheck window and back out to
/// the first world tab.
#[test]
fn busy_ships_defer_with_a_flat_backoff() {
    let now = fixed_now();
    let config = config_for(Some(vec![ExpeditionId::Numbered(1)]), None, None);
    let screen = ScriptedScreen::new();
    screen.list_expedition(Rank::E, 0, "01");
    screen.set_click(Locator::SortieSelect, true);
    screen.set_present(Locator::ShipBusy);
    let mut scheduler = scheduler_for(&config, &screen, now);

    let cycle_at = now + TimeDelta::minutes(1);
    scheduler.run_cycle_at(cycle_at).unwrap();

    let fleet = scheduler.fleet(2).unwrap();
    assert!(!fleet.at_base());
    assert_eq!(fleet.return_at(), cycle_at + TimeDelta::minutes(15));
    assert_eq!(scheduler.stats().sent, 0);

    // World 1 was clicked twice: navigation, then the back-out.
    let world_clicks = screen
        .clicks()
        .iter()
        .filter(|c| **c == Locator::WorldTab(Area::World(1)))
        .count();
    assert_eq!(world_clicks, 2);
}

/// A ship in the repair dock counts as unavailable too.
#[test]
fn repairing_ships_defer_like_busy_ones() {
    let now = fixed_now();
    let config = config_for(Some(vec![ExpeditionId::Numbered(1)]), None, None);
    let screen = ScriptedScreen::new();
    screen.list_expedition(Rank::E, 0, "01");
    screen.set_click(Locator::SortieSelect, true);
    screen.set_present(Locator::ShipRepairing);
    let mut scheduler = scheduler_for(&config, &screen, now);

    let cycle_at = now + TimeDelta::minutes(1);
    scheduler.run_cycle_at(cycle_at).unwrap();

    assert_eq!(
        scheduler.fleet(2).unwrap().return_at(),
        cycle_at + TimeDelta::minutes(15)
    );
    assert_eq!(scheduler.stats().sent, 0);
}

/// A failed automatic resupply aborts the attempt without advancing any
/// fleet state, so the next cycle simply retries.
#[test]
fn failed_resupply_leaves_the_fleet_at_base() {
    let now = fixed_now();
    let config = config_for(Some(vec![ExpeditionId::Numbered(1)]), None, None);
    let screen = ScriptedScreen::new();
    screen.list_expedition(Rank::E, 0, "01");
    screen.set_click(Locator::SortieSelect, true);
    screen.set_present(Locator::ResupplyNeeded);
    screen.set_resupply(false);
    let mut scheduler = scheduler_for(&config, &screen, now);

    let cycle_at = now + TimeDelta::minutes(1);
    scheduler.run_cycle_at(cycle_at).unwrap();

    let fleet = scheduler.fleet(2).unwrap();
    assert!(fleet.at_base());
    assert!(fleet.needs_resupply());
    // The reconciliation grace window is untouched by the aborted attempt.
    assert_eq!(fleet.return_at(), cycle_at + TimeDelta::minutes(5));
    assert_eq!(screen.resupplied(), vec![2]);
    assert_eq!(scheduler.stats().sent, 0);

    // Still at base, so the next cycle retries the whole attempt.
    scheduler.run_cycle_at(now + TimeDelta::minutes(2)).unwrap();
    assert_eq!(scheduler.stats().attempted, 2);
    assert_eq!(screen.resupplied(), vec![2, 2]);
}

/// A successful automatic resupply lets the dispatch go through in the
/// same attempt.
#[test]
fn successful_resupply_dispatches_in_the_same_attempt() {
    let now = fixed_now();
    let config = config_for(Some(vec![ExpeditionId::Numbered(1)]), None, None);
    let screen = ScriptedScreen::new();
    screen.list_expedition(Rank::E, 0, "01");
    screen.set_click(Locator::SortieSelect, true);
    screen.set_present(Locator::ResupplyNeeded);
    let mut scheduler = scheduler_for(&config, &screen, now);

    scheduler.run_cycle_at(now + TimeDelta::minutes(1)).unwrap();

    assert_eq!(screen.resupplied(), vec![2]);
    assert_eq!(scheduler.stats().sent, 1);
    assert!(!scheduler.fleet(2).unwrap().needs_resupply());
}

/// A roster expedition that never shows up on the list is a fatal
/// configuration error naming the expedition.
#[test]
fn missing_expedition_is_fatal() {
    let now = fixed_now();
    let config = config_for(Some(vec![ExpeditionId::Numbered(1)]), None, None);
    let screen = ScriptedScreen::new();
    // The only visible E-rank entry is a different expedition.
    screen.list_expedition(Rank::E, 0, "03");
    let mut scheduler = scheduler_for(&config, &screen, now);

    let err = scheduler
        .run_cycle_at(now + TimeDelta::minutes(1))
        .unwrap_err();
    assert!(matches!(
        err,
        ExpeditionError::ExpeditionNotFound {
            expedition: ExpeditionId::Numbered(1)
        }
    ));
    assert!(err.to_string().contains("01"));
}

/// Label scanning skips non-matching rows and tolerates recognizer noise.
#[test]
fn label_scan_matches_a_noisy_later_row() {
    let now = fixed_now();
    let config = config_for(Some(vec![ExpeditionId::Numbered(1)]), None, None);
    let screen = ScriptedScreen::new();
    screen.list_expedition(Rank::E, 0, "03");
    // "O1" is how the recognizer tends to read "01".
    screen.list_expedition(Rank::E, 1, "O1");
    screen.set_click(Locator::SortieSelect, true);
    let mut scheduler = scheduler_for(&config, &screen, now);

    scheduler.run_cycle_at(now + TimeDelta::minutes(1)).unwrap();

    assert_eq!(scheduler.stats().sent, 1);
    assert!(screen.clicks().contains(&Locator::ExpeditionRow(Rank::E, 1)));
}

/// Numbered ids scroll the list to the top, coded ids to the bottom.
#[test]
fn scroll_direction_follows_the_id_style() {
    let now = fixed_now();

    let numbered = config_for(Some(vec![ExpeditionId::Numbered(2)]), None, None);
    let screen = ScriptedScreen::new();
    screen.list_expedition(Rank::E, 0, "02");
    screen.set_click(Locator::SortieSelect, true);
    screen.set_present_times(Locator::ScrollPrev, 3);
    screen.set_click(Locator::ScrollPrev, true);
    let mut scheduler = scheduler_for(&numbered, &screen, now);
    scheduler.run_cycle_at(now + TimeDelta::minutes(1)).unwrap();

    let prev_clicks = screen
        .clicks()
        .iter()
        .filter(|c| **c == Locator::ScrollPrev)
        .count();
    assert_eq!(prev_clicks, 3);
    assert!(!screen.clicks().contains(&Locator::ScrollNext));

    let coded = config_for(Some(vec![ExpeditionId::Coded('A', 1)]), None, None);
    let screen = ScriptedScreen::new();
    screen.list_expedition(Rank::D, 0, "A1");
    screen.set_click(Locator::SortieSelect, true);
    screen.set_present_times(Locator::ScrollNext, 2);
    screen.set_click(Locator::ScrollNext, true);
    let mut scheduler = scheduler_for(&coded, &screen, now);
    scheduler.run_cycle_at(now + TimeDelta::minutes(1)).unwrap();

    let next_clicks = screen
        .clicks()
        .iter()
        .filter(|c| **c == Locator::ScrollNext)
        .count();
    assert_eq!(next_clicks, 2);
    assert!(!screen.clicks().contains(&Locator::ScrollPrev));
}

/// Three fleets bootstrap in one cycle, each navigating its own world and
/// tab, with only the first due return reconciled.
#[test]
fn full_rotation_bootstraps_in_one_cycle() {
    let now = fixed_now();
    let config = config_for(
        Some(vec![ExpeditionId::Numbered(1)]),
        Some(vec![ExpeditionId::Numbered(2)]),
        Some(vec![ExpeditionId::Numbered(21)]),
    );
    let screen = ScriptedScreen::new();
    screen.list_expedition(Rank::E, 0, "01");
    screen.list_expedition(Rank::E, 1, "02");
    screen.list_expedition(Rank::S, 0, "21");
    screen.set_click(Locator::SortieSelect, true);
    let mut scheduler = scheduler_for(&config, &screen, now);

    let cycle_at = now + TimeDelta::minutes(1);
    scheduler.run_cycle_at(cycle_at).unwrap();

    let stats = scheduler.stats();
    assert_eq!(stats.received, 1);
    assert_eq!(stats.attempted, 3);
    assert_eq!(stats.sent, 3);

    let clicks = screen.clicks();
    assert!(clicks.contains(&Locator::WorldTab(Area::World(3))));
    assert!(clicks.contains(&Locator::FleetTab(3)));
    assert!(clicks.contains(&Locator::FleetTab(4)));
    assert!(!clicks.contains(&Locator::FleetTab(2)));

    assert_eq!(
        scheduler.fleet(2).unwrap().return_at(),
        cycle_at + TimeDelta::minutes(14) + TimeDelta::seconds(30)
    );
    assert_eq!(
        scheduler.fleet(3).unwrap().return_at(),
        cycle_at + TimeDelta::minutes(29) + TimeDelta::seconds(30)
    );
    assert_eq!(
        scheduler.fleet(4).unwrap().return_at(),
        cycle_at + TimeDelta::hours(2) + TimeDelta::minutes(19) + TimeDelta::seconds(30)
    );
}

/// Status lines carry the predicted return in the fixed timestamp format.
#[test]
fn status_report_formats_return_timestamps() {
    let now = fixed_now();
    let config = config_for(Some(vec![ExpeditionId::Numbered(1)]), None, None);
    let screen = ScriptedScreen::new();
    screen.list_expedition(Rank::E, 0, "01");
    screen.set_click(Locator::SortieSelect, true);
    let mut scheduler = scheduler_for(&config, &screen, now);

    scheduler.run_cycle_at(now + TimeDelta::minutes(1)).unwrap();

    let lines = scheduler.status_report();
    assert_eq!(lines.len(), 1);
    let prefix = "fleet 2: expedition returns at ";
    assert!(lines[0].starts_with(prefix));
    let timestamp = &lines[0][prefix.len()..];
    assert!(NaiveDateTime::parse_from_str(timestamp, "%Y-%m-%d %H:%M:%S").is_ok());
}
