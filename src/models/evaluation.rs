//! Soft-constraint evaluation.
//!
//! The objective is a weighted penalty sum over four components:
//!
//! | Component | Counted per | Penalty |
//! |-----------|-------------|---------|
//! | Min fill | missing event below a slot's `min` | game/practice min penalty |
//! | Preference | preference not met | declared weight |
//! | Pairing | paired couple in non-overlapping slots | not-paired penalty |
//! | Section | overlapping events of one tier, different divisions | section penalty |
//!
//! Unassigned events occupy no slot: their preferences are unmet, their
//! pairs count as apart, and they overlap nothing.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{EventId, Schedule, Weights};

/// Violation count and unweighted penalty of one component.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Component {
    pub count: usize,
    pub penalty: i64,
}

impl Component {
    fn add(&mut self, count: usize, penalty: i64) {
        self.count += count;
        self.penalty += penalty;
    }
}

/// Unweighted penalty components of a schedule.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PenaltyBreakdown {
    pub min_filled: Component,
    pub preference: Component,
    pub pairing: Component,
    pub section: Component,
}

impl PenaltyBreakdown {
    /// Evaluates every component over the schedule's merged view.
    pub fn of(schedule: &Schedule<'_>) -> Self {
        let instance = schedule.instance();
        let penalties = instance.penalties();
        let mut out = Self::default();

        for s in instance.slot_ids() {
            let slot = instance.slot(s);
            let filled = schedule.occupancy(s);
            if filled < slot.min {
                let missing = slot.min - filled;
                out.min_filled
                    .add(missing, missing as i64 * penalties.min_fill(slot.kind));
            }
        }

        for e in instance.event_ids() {
            let assigned = schedule.slot_of(e);
            for (&slot, &weight) in &instance.event(e).preferences {
                if assigned != Some(slot) {
                    out.preference.add(1, weight);
                }
            }
        }

        for (a, b) in instance.pairs().pairs() {
            let together = match (schedule.slot_of(a), schedule.slot_of(b)) {
                (Some(sa), Some(sb)) => instance.slot(sa).overlaps(instance.slot(sb)),
                _ => false,
            };
            if !together {
                out.pairing.add(1, penalties.not_paired);
            }
        }

        let mut tiers: BTreeMap<&str, Vec<EventId>> = BTreeMap::new();
        for e in instance.event_ids() {
            if schedule.slot_of(e).is_some() {
                tiers
                    .entry(instance.event(e).division.tier.as_str())
                    .or_default()
                    .push(e);
            }
        }
        for members in tiers.values() {
            for (i, &a) in members.iter().enumerate() {
                for &b in &members[i + 1..] {
                    let (Some(sa), Some(sb)) = (schedule.slot_of(a), schedule.slot_of(b)) else {
                        continue;
                    };
                    if instance.slot(sa).overlaps(instance.slot(sb))
                        && !instance.event(a).same_division(instance.event(b))
                    {
                        out.section.add(1, penalties.section);
                    }
                }
            }
        }

        out
    }

    /// Final score: each component's penalty times its weight.
    pub fn weighted(&self, weights: &Weights) -> i64 {
        self.min_filled.penalty * weights.min_filled
            + self.preference.penalty * weights.preference
            + self.pairing.penalty * weights.pair
            + self.section.penalty * weights.section_diff
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Day, Event, Instance, Penalties, Slot, SlotId};

    fn weights() -> Weights {
        Weights::new(1, 1, 1, 1)
    }

    #[test]
    fn test_min_fill_by_kind() {
        let mut b = Instance::builder()
            .with_weights(Weights::new(2, 0, 0, 0))
            .with_penalties(Penalties::new(3, 5, 0, 0));
        b.add_slot(Slot::game(Day::Mo, 8 * 60, 3, 2)).unwrap();
        b.add_slot(Slot::practice(Day::Mo, 8 * 60, 3, 1)).unwrap();
        let inst = b.build().unwrap();

        let s = Schedule::new(&inst);
        let breakdown = s.penalty_breakdown();
        assert_eq!(breakdown.min_filled.count, 3);
        assert_eq!(breakdown.min_filled.penalty, 2 * 3 + 5);
        assert_eq!(s.eval(), 22);
    }

    #[test]
    fn test_unmet_preferences_pay_weight() {
        let mut b = Instance::builder().with_weights(weights());
        b.add_slot(Slot::game(Day::Mo, 8 * 60, 1, 0)).unwrap();
        b.add_slot(Slot::game(Day::Tu, 8 * 60, 1, 0)).unwrap();
        let g = b.add_event(Event::game("CMSA U13T3 DIV 01").unwrap()).unwrap();
        b.add_preference("CMSA U13T3 DIV 01", Day::Mo, 8 * 60, 4).unwrap();
        b.add_preference("CMSA U13T3 DIV 01", Day::Tu, 8 * 60, 6).unwrap();
        let inst = b.build().unwrap();

        let mut s = Schedule::new(&inst);
        assert_eq!(s.eval(), 10);
        s.assign(g, SlotId(0), true);
        assert_eq!(s.eval(), 6);
        s.assign(g, SlotId(1), true);
        assert_eq!(s.eval(), 4);
    }

    #[test]
    fn test_unpaired_counts_once() {
        let mut b = Instance::builder()
            .with_weights(weights())
            .with_penalties(Penalties::new(0, 0, 7, 0));
        b.add_slot(Slot::game(Day::Mo, 8 * 60, 1, 0)).unwrap();
        b.add_slot(Slot::game(Day::We, 8 * 60, 1, 0)).unwrap();
        let a = b.add_event(Event::game("CMSA U13T3 DIV 01").unwrap()).unwrap();
        let c = b.add_event(Event::game("CMSA U14T3 DIV 01").unwrap()).unwrap();
        b.add_pair("CMSA U14T3 DIV 01", "CMSA U13T3 DIV 01").unwrap();
        let inst = b.build().unwrap();

        let mut s = Schedule::new(&inst);
        s.assign(a, SlotId(0), true);
        s.assign(c, SlotId(1), true);
        assert_eq!(s.penalty_breakdown().pairing.count, 1);
        assert_eq!(s.eval(), 7);
    }

    #[test]
    fn test_section_overlap_within_tier() {
        let mut b = Instance::builder()
            .with_weights(weights())
            .with_penalties(Penalties::new(0, 0, 0, 9));
        b.add_slot(Slot::game(Day::Mo, 8 * 60, 2, 0)).unwrap();
        b.add_slot(Slot::game(Day::We, 8 * 60, 2, 0)).unwrap();
        let a = b.add_event(Event::game("CMSA U13T3 DIV 01").unwrap()).unwrap();
        let c = b.add_event(Event::game("CMSA U13T3 DIV 02").unwrap()).unwrap();
        let inst = b.build().unwrap();

        let mut s = Schedule::new(&inst);
        s.assign(a, SlotId(0), true);
        assert_eq!(s.eval(), 0);
        s.assign(c, SlotId(0), true);
        assert_eq!(s.eval(), 9);
        s.assign(c, SlotId(1), true);
        assert_eq!(s.eval(), 0);
    }
}
