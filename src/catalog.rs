//! Static expedition catalog.
//!
//! Maps every expedition the scheduler can be asked to run to the world
//! tab it is selected from, the difficulty rank shown beside it on the
//! in-game list, and its predicted completion duration. Lookups are
//! total: an unknown id resolves to a permissive default profile with a
//! warning, so a stale roster keeps running instead of failing.

use std::fmt;
use std::str::FromStr;

use chrono::TimeDelta;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tracing::warn;

/// Safety margin added to each timed entry's base duration so a predicted
/// return is never reconciled ahead of the in-game timer.
const RETURN_MARGIN_SECS: i64 = 30;

/// Identifier of a single expedition.
///
/// Permanent expeditions are numbered; monthly and event expeditions
/// carry a short letter-digit code (`A1`, `B2`, `S1`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExpeditionId {
    /// Permanent expedition, numbered in game order.
    Numbered(u16),
    /// Lettered expedition: series letter plus slot digit.
    Coded(char, u8),
}

impl ExpeditionId {
    /// True for lettered ids, which sit at the bottom of the in-game list
    /// while the numbered ones sit at the top.
    pub fn is_coded(self) -> bool {
        matches!(self, Self::Coded(..))
    }

    /// True for expeditions whose completion is tied to a sortie rather
    /// than a timer: combat support (33, 34) and their event versions.
    pub fn is_support(self) -> bool {
        SUPPORT_EXPEDITIONS.contains(&self)
    }

    /// Returns whether a label read off the expedition list names this
    /// expedition.
    ///
    /// The recognizer confuses a few glyph pairs on the two-character
    /// labels, so the comparison normalizes `O` to `0`, a leading `5` to
    /// `S` (no numbered label starts with a 5) and a trailing `S` to `5`
    /// (no lettered label ends with one) before comparing.
    pub fn matches_label(self, raw: &str) -> bool {
        let mut chars: Vec<char> = raw
            .trim()
            .chars()
            .map(|c| if c == 'O' { '0' } else { c })
            .collect();
        if chars.len() != 2 {
            return false;
        }
        if chars[0] == '5' {
            chars[0] = 'S';
        }
        if chars[1] == 'S' {
            chars[1] = '5';
        }
        chars.into_iter().collect::<String>() == self.to_string()
    }
}

impl fmt::Display for ExpeditionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // Zero-padded to match the two-character on-screen label.
            Self::Numbered(n) => write!(f, "{n:02}"),
            Self::Coded(series, slot) => write!(f, "{series}{slot}"),
        }
    }
}

/// Error returned when a string is not a recognizable expedition id.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("not a recognized expedition id: {0:?}")]
pub struct ParseExpeditionIdError(String);

impl FromStr for ExpeditionId {
    type Err = ParseExpeditionIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(n) = s.parse::<u16>() {
            return Ok(Self::Numbered(n));
        }
        let mut chars = s.chars();
        if let (Some(series), Some(slot), None) = (chars.next(), chars.next(), chars.next()) {
            if series.is_ascii_uppercase() && slot.is_ascii_digit() {
                // The digit is ASCII, so the u32 fits in a u8.
                return Ok(Self::Coded(series, slot.to_digit(10).unwrap_or(0) as u8));
            }
        }
        Err(ParseExpeditionIdError(s.to_owned()))
    }
}

impl Serialize for ExpeditionId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Numbered(n) => serializer.serialize_u16(*n),
            Self::Coded(..) => serializer.collect_str(self),
        }
    }
}

impl<'de> Deserialize<'de> for ExpeditionId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct IdVisitor;

        impl Visitor<'_> for IdVisitor {
            type Value = ExpeditionId;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an expedition number or short code such as \"A1\"")
            }

            fn visit_u64<E: de::Error>(self, value: u64) -> Result<ExpeditionId, E> {
                u16::try_from(value)
                    .map(ExpeditionId::Numbered)
                    .map_err(|_| E::custom(format!("expedition number {value} is out of range")))
            }

            fn visit_i64<E: de::Error>(self, value: i64) -> Result<ExpeditionId, E> {
                u16::try_from(value)
                    .map(ExpeditionId::Numbered)
                    .map_err(|_| E::custom(format!("expedition number {value} is out of range")))
            }

            fn visit_str<E: de::Error>(self, value: &str) -> Result<ExpeditionId, E> {
                value.parse().map_err(E::custom)
            }
        }

        deserializer.deserialize_any(IdVisitor)
    }
}

/// World grouping an expedition is selected from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Area {
    /// Numbered world tab.
    World(u8),
    /// Event world tab, present only while an event runs.
    Event,
}

impl fmt::Display for Area {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::World(n) => write!(f, "world {n}"),
            Self::Event => f.write_str("event world"),
        }
    }
}

/// Difficulty rank displayed next to an expedition entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Rank {
    E,
    D,
    C,
    B,
    A,
    S,
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let letter = match self {
            Self::E => 'E',
            Self::D => 'D',
            Self::C => 'C',
            Self::B => 'B',
            Self::A => 'A',
            Self::S => 'S',
        };
        write!(f, "{letter}")
    }
}

/// Catalog record for one expedition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpeditionInfo {
    /// World tab the expedition is selected from.
    pub area: Area,
    /// Difficulty rank shown on the expedition list.
    pub rank: Rank,
    /// Predicted completion duration, including the safety margin.
    pub duration: TimeDelta,
}

/// Expeditions whose completion is signaled by the end of a sortie rather
/// than by their own timer.
pub const SUPPORT_EXPEDITIONS: [ExpeditionId; 4] = [
    ExpeditionId::Numbered(33),
    ExpeditionId::Numbered(34),
    ExpeditionId::Coded('S', 1),
    ExpeditionId::Coded('S', 2),
];

/// Every expedition the game currently offers, in list order.
pub const ALL_EXPEDITIONS: [ExpeditionId; 49] = [
    ExpeditionId::Numbered(1),
    ExpeditionId::Numbered(2),
    ExpeditionId::Numbered(3),
    ExpeditionId::Numbered(4),
    ExpeditionId::Numbered(5),
    ExpeditionId::Numbered(6),
    ExpeditionId::Numbered(7),
    ExpeditionId::Numbered(8),
    ExpeditionId::Numbered(9),
    ExpeditionId::Numbered(10),
    ExpeditionId::Numbered(11),
    ExpeditionId::Numbered(12),
    ExpeditionId::Numbered(13),
    ExpeditionId::Numbered(14),
    ExpeditionId::Numbered(15),
    ExpeditionId::Numbered(16),
    ExpeditionId::Numbered(17),
    ExpeditionId::Numbered(18),
    ExpeditionId::Numbered(19),
    ExpeditionId::Numbered(20),
    ExpeditionId::Numbered(21),
    ExpeditionId::Numbered(22),
    ExpeditionId::Numbered(23),
    ExpeditionId::Numbered(24),
    ExpeditionId::Numbered(25),
    ExpeditionId::Numbered(26),
    ExpeditionId::Numbered(27),
    ExpeditionId::Numbered(28),
    ExpeditionId::Numbered(29),
    ExpeditionId::Numbered(30),
    ExpeditionId::Numbered(31),
    ExpeditionId::Numbered(32),
    ExpeditionId::Numbered(33),
    ExpeditionId::Numbered(34),
    ExpeditionId::Numbered(35),
    ExpeditionId::Numbered(36),
    ExpeditionId::Numbered(37),
    ExpeditionId::Numbered(38),
    ExpeditionId::Numbered(39),
    ExpeditionId::Numbered(40),
    ExpeditionId::Numbered(41),
    ExpeditionId::Coded('A', 1),
    ExpeditionId::Coded('A', 2),
    ExpeditionId::Coded('A', 3),
    ExpeditionId::Coded('A', 4),
    ExpeditionId::Coded('B', 1),
    ExpeditionId::Coded('B', 2),
    ExpeditionId::Coded('S', 1),
    ExpeditionId::Coded('S', 2),
];

/// Resolves an expedition id to its catalog info.
///
/// Total: ids missing from the table resolve to the cheapest common
/// profile (world 1, rank E, 29m30s) with a warning naming the id.
pub fn lookup(id: ExpeditionId) -> ExpeditionInfo {
    entry(id).unwrap_or_else(|| {
        warn!("expedition {id} is not in the catalog; using the default profile");
        timed(1, Rank::E, 0, 29)
    })
}

/// Timed entry: world tab, rank and base hours/minutes plus the margin.
fn timed(world: u8, rank: Rank, hours: i64, minutes: i64) -> ExpeditionInfo {
    ExpeditionInfo {
        area: Area::World(world),
        rank,
        duration: TimeDelta::hours(hours)
            + TimeDelta::minutes(minutes)
            + TimeDelta::seconds(RETURN_MARGIN_SECS),
    }
}

/// Event support entry: fixed duration with no margin, since completion is
/// signaled by the sortie and not by the timer.
fn event(rank: Rank, minutes: i64) -> ExpeditionInfo {
    ExpeditionInfo {
        area: Area::Event,
        rank,
        duration: TimeDelta::minutes(minutes),
    }
}

fn entry(id: ExpeditionId) -> Option<ExpeditionInfo> {
    use ExpeditionId::{Coded, Numbered};
    use Rank::{A, B, C, D, E, S};

    let info = match id {
        Numbered(1) => timed(1, E, 0, 14),
        Numbered(2) => timed(1, E, 0, 29),
        Numbered(3) => timed(1, D, 0, 19),
        Numbered(4) => timed(1, D, 0, 49),
        Numbered(5) => timed(1, C, 1, 29),
        Numbered(6) => timed(1, C, 0, 39),
        Numbered(7) => timed(1, C, 0, 59),
        Numbered(8) => timed(1, B, 2, 59),
        Numbered(9) => timed(2, C, 3, 59),
        Numbered(10) => timed(2, C, 1, 29),
        Numbered(11) => timed(2, B, 4, 59),
        Numbered(12) => timed(2, B, 7, 59),
        Numbered(13) => timed(2, A, 3, 59),
        Numbered(14) => timed(2, A, 5, 59),
        Numbered(15) => timed(2, S, 11, 59),
        Numbered(16) => timed(2, S, 14, 59),
        Numbered(17) => timed(3, A, 0, 44),
        Numbered(18) => timed(3, S, 4, 59),
        Numbered(19) => timed(3, S, 5, 59),
        Numbered(20) => timed(3, S, 1, 59),
        Numbered(21) => timed(3, S, 2, 19),
        Numbered(22) => timed(3, S, 2, 59),
        Numbered(23) => timed(3, S, 3, 59),
        Numbered(24) => timed(3, S, 8, 19),
        Numbered(25) => timed(4, S, 39, 59),
        Numbered(26) => timed(4, S, 79, 59),
        Numbered(27) => timed(4, S, 19, 59),
        Numbered(28) => timed(4, S, 24, 59),
        Numbered(29) => timed(4, S, 23, 59),
        Numbered(30) => timed(4, S, 47, 59),
        Numbered(31) => timed(4, S, 1, 59),
        Numbered(32) => timed(4, D, 23, 59),
        Numbered(33) => timed(5, E, 0, 15),
        Numbered(34) => timed(5, E, 0, 29),
        Numbered(35) => timed(5, S, 6, 59),
        Numbered(36) => timed(5, S, 8, 59),
        Numbered(37) => timed(5, S, 2, 44),
        Numbered(38) => timed(5, S, 2, 54),
        Numbered(39) => timed(5, S, 29, 59),
        Numbered(40) => timed(5, S, 6, 49),
        Numbered(41) => timed(7, A, 0, 59),
        Coded('A', 1) => timed(1, D, 0, 24),
        Coded('A', 2) => timed(1, C, 0, 54),
        Coded('A', 3) => timed(1, B, 2, 14),
        Coded('A', 4) => timed(1, S, 1, 49),
        Coded('B', 1) => timed(2, B, 0, 34),
        Coded('B', 2) => timed(2, B, 8, 39),
        Coded('S', 1) => event(S, 15),
        Coded('S', 2) => event(S, 30),
        _ => return None,
    };
    Some(info)
}
