//! Flotilla: expedition fleet scheduler for browser-game automation.
//!
//! The crate keeps a roster of fleets cycling through timed expeditions:
//! it tracks each fleet's lifecycle (at base, deployed, awaiting
//! resupply), predicts return times from a static catalog, corrects them
//! from the partial signals the game exposes, and throttles retries when
//! a dispatch attempt cannot proceed.
//!
//! # Architecture
//!
//! The scheduler is synchronous and single-threaded; all screen
//! interaction goes through one trait seam:
//! - [`catalog`]: static expedition table (world, rank, duration)
//! - [`fleet`]: per-fleet lifecycle state machine
//! - [`scheduler`]: per-cycle orchestration over the roster
//! - [`screen`]: capability surface of the recognizer/navigation layer
//! - [`config`]: TOML rosters and loop settings

pub mod catalog;
pub mod config;
pub mod error;
pub mod fleet;
pub mod scheduler;
pub mod screen;
pub mod stats;
pub mod test_utils;

pub use config::FlotillaConfig;
pub use error::{ExpeditionError, Result};
pub use scheduler::ExpeditionScheduler;
pub use screen::{GameScreen, Locator, ShortTimer};
pub use stats::ExpeditionStats;
