//! Slot model.
//!
//! A slot is a recurring weekly time window in which games or practices
//! can be held. Slots carry a hard capacity (`max`) and a soft minimum
//! fill (`min`). Durations depend on the day and the kind of slot.
//!
//! # Time Representation
//! Start times are minutes since midnight.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::ModelError;

/// Start of the evening band (18:00).
pub const EVENING_START_MIN: u16 = 18 * 60;

/// Tuesday 11:00 games are blocked by the league-wide admin meeting.
const ADMIN_BLOCK_MIN: u16 = 11 * 60;

/// Tuesday 18:00 is the designated special-practice slot.
const SPECIAL_PRACTICE_MIN: u16 = 18 * 60;

/// Whether an event or slot is a game or a practice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    /// League game.
    Game,
    /// Team practice.
    Practice,
}

impl EventKind {
    /// Lowercase name, as used in slot identifiers.
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Game => "game",
            EventKind::Practice => "practice",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Day of the week, written as a two-letter code in input files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Day {
    Mo,
    Tu,
    We,
    Th,
    Fr,
    Sa,
    Su,
}

impl Day {
    /// Two-letter code.
    pub fn code(&self) -> &'static str {
        match self {
            Day::Mo => "MO",
            Day::Tu => "TU",
            Day::We => "WE",
            Day::Th => "TH",
            Day::Fr => "FR",
            Day::Sa => "SA",
            Day::Su => "SU",
        }
    }
}

impl FromStr for Day {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "MO" => Ok(Day::Mo),
            "TU" => Ok(Day::Tu),
            "WE" => Ok(Day::We),
            "TH" => Ok(Day::Th),
            "FR" => Ok(Day::Fr),
            "SA" => Ok(Day::Sa),
            "SU" => Ok(Day::Su),
            _ => Err(ModelError::InvalidDay(s.to_string())),
        }
    }
}

impl fmt::Display for Day {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Parses `H:MM` or `HH:MM` into minutes since midnight.
///
/// ```
/// use league_schedule::models::parse_time;
///
/// assert_eq!(parse_time("8:00").unwrap(), 480);
/// assert_eq!(parse_time("18:30").unwrap(), 1110);
/// assert!(parse_time("25:00").is_err());
/// ```
pub fn parse_time(s: &str) -> Result<u16, ModelError> {
    let invalid = || ModelError::InvalidTime(s.to_string());
    let (hours, minutes) = s.trim().split_once(':').ok_or_else(invalid)?;
    let hours: u16 = hours.parse().map_err(|_| invalid())?;
    let minutes: u16 = minutes.parse().map_err(|_| invalid())?;
    if hours > 23 || minutes > 59 {
        return Err(invalid());
    }
    Ok(hours * 60 + minutes)
}

/// Formats minutes since midnight as `H:MM`.
pub fn format_time(minutes: u16) -> String {
    format!("{}:{:02}", minutes / 60, minutes % 60)
}

/// Index of a slot inside its [`Instance`](super::Instance).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SlotId(pub(crate) usize);

impl SlotId {
    /// Position in [`Instance::slots`](super::Instance::slots).
    #[inline]
    pub fn index(&self) -> usize {
        self.0
    }
}

/// Slot identity: day, start time and kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SlotKey {
    pub day: Day,
    pub start_min: u16,
    pub kind: EventKind,
}

impl fmt::Display for SlotKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.day, format_time(self.start_min), self.kind)
    }
}

/// A weekly time slot.
///
/// # Example
///
/// ```
/// use league_schedule::models::{Day, Slot};
///
/// let tuesday = Slot::game(Day::Tu, 9 * 60 + 30, 2, 1);
/// assert_eq!(tuesday.duration_min(), 90);
/// assert!(tuesday.overlaps(&Slot::game(Day::Tu, 10 * 60 + 30, 2, 1)));
///
/// // The admin meeting blocks Tuesday 11:00 games
/// assert_eq!(Slot::game(Day::Tu, 11 * 60, 3, 0).max, 0);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slot {
    /// Day of the week.
    pub day: Day,
    /// Start time (minutes since midnight).
    pub start_min: u16,
    /// Game or practice slot.
    pub kind: EventKind,
    /// Hard capacity.
    pub max: usize,
    /// Soft minimum fill.
    pub min: usize,
}

impl Slot {
    /// Creates a slot. The Tuesday 11:00 game slot always gets `max = 0`.
    pub fn new(kind: EventKind, day: Day, start_min: u16, max: usize, min: usize) -> Self {
        let max = if kind == EventKind::Game && day == Day::Tu && start_min == ADMIN_BLOCK_MIN {
            0
        } else {
            max
        };
        Self {
            day,
            start_min,
            kind,
            max,
            min,
        }
    }

    /// Creates a game slot.
    pub fn game(day: Day, start_min: u16, max: usize, min: usize) -> Self {
        Self::new(EventKind::Game, day, start_min, max, min)
    }

    /// Creates a practice slot.
    pub fn practice(day: Day, start_min: u16, max: usize, min: usize) -> Self {
        Self::new(EventKind::Practice, day, start_min, max, min)
    }

    /// Identity key.
    pub fn key(&self) -> SlotKey {
        SlotKey {
            day: self.day,
            start_min: self.start_min,
            kind: self.kind,
        }
    }

    /// Duration in minutes: 90 for Tuesday games, 120 for Friday practices, 60 otherwise.
    pub fn duration_min(&self) -> u16 {
        match (self.day, self.kind) {
            (Day::Tu, EventKind::Game) => 90,
            (Day::Fr, EventKind::Practice) => 120,
            _ => 60,
        }
    }

    /// Exclusive end (minutes since midnight).
    #[inline]
    pub fn end_min(&self) -> u16 {
        self.start_min + self.duration_min()
    }

    /// Starts at or after 18:00.
    pub fn is_evening(&self) -> bool {
        self.start_min >= EVENING_START_MIN
    }

    /// The Tuesday 18:00 practice slot.
    pub fn is_special_practice_slot(&self) -> bool {
        self.kind == EventKind::Practice
            && self.day == Day::Tu
            && self.start_min == SPECIAL_PRACTICE_MIN
    }

    /// Whether the two slots share a day and their half-open time ranges intersect.
    ///
    /// Monday and Friday practice slots count as the same day.
    pub fn overlaps(&self, other: &Slot) -> bool {
        let monday_friday_practice = self.kind == EventKind::Practice
            && other.kind == EventKind::Practice
            && matches!((self.day, other.day), (Day::Mo, Day::Fr) | (Day::Fr, Day::Mo));

        let same_day = self.day == other.day || monday_friday_practice;

        same_day && self.start_min < other.end_min() && other.start_min < self.end_min()
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}", self.day, format_time(self.start_min))
    }
}
