//! Event model.
//!
//! An event is a recurring game or practice of one division. Identifiers
//! follow the league's naming scheme and encode the division:
//!
//! | Kind | Identifier |
//! |------|------------|
//! | Game | `LEAGUE TIER DIV nn` |
//! | Practice | `LEAGUE TIER DIV nn PRC mm` or `... OPN mm` |
//! | Practice (whole tier) | `LEAGUE TIER PRC mm` or `LEAGUE TIER OPN mm` |
//! | Special practice | `CMSA U12T1S`, `CMSA U13T1S` |

use std::collections::{BTreeMap, BTreeSet};

use super::division::{ALL_DIVISIONS, SPECIAL_LEAGUE};
use super::{Division, EventKind, ModelError, Slot, SlotId};

/// Index of an event inside its [`Instance`](super::Instance).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EventId(pub(crate) usize);

impl EventId {
    /// Position in [`Instance::events`](super::Instance::events).
    #[inline]
    pub fn index(&self) -> usize {
        self.0
    }
}

/// A game or practice to be placed in a slot.
#[derive(Debug, Clone)]
pub struct Event {
    /// Identifier as written in the input.
    pub id: String,
    /// Division that plays this event.
    pub division: Division,
    /// Game or practice.
    pub kind: EventKind,
    /// Slots this event must never occupy.
    pub unwanted: BTreeSet<SlotId>,
    /// Preference weight per slot, paid when the event is elsewhere.
    pub preferences: BTreeMap<SlotId, i64>,
}

impl PartialEq for Event {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Event {}

impl Event {
    /// Parses an identifier into an event of the given kind.
    ///
    /// Whitespace between tokens is normalized, so the stored `id` uses
    /// single spaces.
    ///
    /// # Example
    ///
    /// ```
    /// use league_schedule::models::{Event, EventKind};
    ///
    /// let game = Event::parse("CMSA U13T3 DIV 01", EventKind::Game).unwrap();
    /// assert_eq!(game.division.div, "01");
    ///
    /// let open = Event::parse("CMSA U13T3 OPN 02", EventKind::Practice).unwrap();
    /// assert_eq!(open.division.div, "all");
    ///
    /// assert!(Event::parse("CMSA U13T3 OPN 02", EventKind::Game).is_err());
    /// ```
    pub fn parse(id: &str, kind: EventKind) -> Result<Self, ModelError> {
        let tokens: Vec<&str> = id.split_whitespace().collect();
        let invalid = || ModelError::InvalidEventId {
            id: id.trim().to_string(),
            kind,
        };

        let division = match (kind, tokens.as_slice()) {
            (EventKind::Game, [league, tier, "DIV", div]) => Division::new(*league, *tier, *div),
            (EventKind::Practice, [league, tier, "DIV", div, tag, _]) if is_practice_tag(tag) => {
                Division::new(*league, *tier, *div)
            }
            (EventKind::Practice, [league, tier, tag, _]) if is_practice_tag(tag) => {
                Division::new(*league, *tier, ALL_DIVISIONS)
            }
            (EventKind::Practice, [league, tier]) => {
                let division = Division::new(*league, *tier, ALL_DIVISIONS);
                if !division.is_special_practice_tier() {
                    return Err(invalid());
                }
                division
            }
            _ => return Err(invalid()),
        };

        Ok(Self {
            id: tokens.join(" "),
            division,
            kind,
            unwanted: BTreeSet::new(),
            preferences: BTreeMap::new(),
        })
    }

    /// Parses a game identifier.
    pub fn game(id: &str) -> Result<Self, ModelError> {
        Self::parse(id, EventKind::Game)
    }

    /// Parses a practice identifier.
    pub fn practice(id: &str) -> Result<Self, ModelError> {
        Self::parse(id, EventKind::Practice)
    }

    /// The special practice that accompanies games of this event's tier, if any.
    pub(crate) fn special_practice(&self) -> Option<Event> {
        if !self.is_game() {
            return None;
        }
        let tier = self.division.special_practice_tier()?;
        Event::practice(&format!("{SPECIAL_LEAGUE} {tier}")).ok()
    }

    pub fn is_game(&self) -> bool {
        self.kind == EventKind::Game
    }

    pub fn is_practice(&self) -> bool {
        self.kind == EventKind::Practice
    }

    /// Requires an evening slot.
    pub fn is_evening(&self) -> bool {
        self.division.is_evening()
    }

    /// `CMSA U12T1S` or `CMSA U13T1S`.
    pub fn is_special_practice(&self) -> bool {
        self.is_practice() && self.division.is_special_practice_tier()
    }

    pub fn is_u15_to_u19(&self) -> bool {
        self.division.is_u15_to_u19()
    }

    /// Division equality, see [`Division::same`].
    pub fn same_division(&self, other: &Event) -> bool {
        self.division.same(&other.division)
    }

    /// Static eligibility for a slot, independent of any schedule state.
    ///
    /// The slot must not be unwanted and must match the event's kind.
    /// Evening events need evening slots, and special practices may only
    /// use the special-practice slot.
    pub fn is_compatible(&self, slot_id: SlotId, slot: &Slot) -> bool {
        if self.unwanted.contains(&slot_id) || self.kind != slot.kind {
            return false;
        }
        if self.is_evening() && !slot.is_evening() {
            return false;
        }
        if self.is_special_practice() && !slot.is_special_practice_slot() {
            return false;
        }
        true
    }

    /// Whether the two events are incompatible regardless of input declarations.
    pub(crate) fn implicitly_incompatible(&self, other: &Event) -> bool {
        if (self.is_game() || other.is_game()) && self.same_division(other) {
            return true;
        }
        if self.is_game() && other.is_game() && self.is_u15_to_u19() && other.is_u15_to_u19() {
            return true;
        }
        self.is_practice()
            && other.is_practice()
            && (self.division.is_all_divisions() || other.division.is_all_divisions())
            && self.same_division(other)
    }
}

fn is_practice_tag(tag: &str) -> bool {
    matches!(tag, "PRC" | "OPN")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Day;

    #[test]
    fn test_parse_game() {
        let e = Event::game("CUSA  O18 DIV 91").unwrap();
        assert_eq!(e.id, "CUSA O18 DIV 91");
        assert_eq!(e.division, Division::new("CUSA", "O18", "91"));
        assert!(e.is_evening());
        assert!(Event::game("CUSA O18 91").is_err());
        assert!(Event::game("CUSA O18 DIV 01 PRC 01").is_err());
    }

    #[test]
    fn test_parse_practices() {
        let p = Event::practice("CMSA U13T3 DIV 01 PRC 01").unwrap();
        assert_eq!(p.division.div, "01");

        let all = Event::practice("CMSA U13T3 PRC 01").unwrap();
        assert!(all.division.is_all_divisions());

        let special = Event::practice("CMSA U12T1S").unwrap();
        assert!(special.is_special_practice());

        assert!(Event::practice("CMSA U13T3").is_err());
        assert!(Event::practice("CMSA U13T3 DIV 01 XYZ 01").is_err());
    }

    #[test]
    fn test_special_practice_generation() {
        let game = Event::game("CMSA U12T1 DIV 01").unwrap();
        let special = game.special_practice().unwrap();
        assert_eq!(special.id, "CMSA U12T1S");

        assert!(Event::game("CMSA U12T2 DIV 01").unwrap().special_practice().is_none());
        assert!(Event::practice("CMSA U12T1 PRC 01").unwrap().special_practice().is_none());
    }

    #[test]
    fn test_compatibility() {
        let mut e = Event::game("CMSA U13T3 DIV 91").unwrap();
        let evening = Slot::game(Day::Mo, 19 * 60, 1, 0);
        let morning = Slot::game(Day::Mo, 8 * 60, 1, 0);
        let practice = Slot::practice(Day::Mo, 19 * 60, 1, 0);

        assert!(e.is_compatible(SlotId(0), &evening));
        assert!(!e.is_compatible(SlotId(1), &morning));
        assert!(!e.is_compatible(SlotId(2), &practice));

        e.unwanted.insert(SlotId(0));
        assert!(!e.is_compatible(SlotId(0), &evening));
    }

    #[test]
    fn test_special_practice_needs_special_slot() {
        let special = Event::practice("CMSA U13T1S").unwrap();
        assert!(special.is_compatible(SlotId(0), &Slot::practice(Day::Tu, 18 * 60, 1, 0)));
        assert!(!special.is_compatible(SlotId(1), &Slot::practice(Day::Tu, 19 * 60, 1, 0)));
    }

    #[test]
    fn test_implicit_incompatibility() {
        let g1 = Event::game("CMSA U13T3 DIV 01").unwrap();
        let p1 = Event::practice("CMSA U13T3 DIV 01 PRC 01").unwrap();
        let p2 = Event::practice("CMSA U13T3 DIV 01 OPN 02").unwrap();
        let all = Event::practice("CMSA U13T3 PRC 03").unwrap();
        let g2 = Event::game("CMSA U13T3 DIV 02").unwrap();

        assert!(g1.implicitly_incompatible(&p1));
        assert!(!g1.implicitly_incompatible(&g2));
        // Practices of one division only clash through an "all" practice
        assert!(!p1.implicitly_incompatible(&p2));
        assert!(p1.implicitly_incompatible(&all));
        assert!(all.implicitly_incompatible(&p1));

        let u17a = Event::game("CMSA U17T1 DIV 01").unwrap();
        let u19b = Event::game("CUSA U19T2 DIV 05").unwrap();
        assert!(u17a.implicitly_incompatible(&u19b));
    }
}
