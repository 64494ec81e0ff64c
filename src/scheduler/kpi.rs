//! Schedule quality metrics (KPIs).
//!
//! Summarizes a schedule's evaluation and the soft constraints behind it.
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Eval | Weighted penalty sum |
//! | Weighted components | Each component's penalty times its weight |
//! | Min-fill shortfall | Events missing below slot minimums |
//! | Unmet preferences | Declared preferences not satisfied |
//! | Unpaired | Paired couples in non-overlapping slots |
//! | Section overlaps | Overlapping events of one tier, different divisions |
//! | Avg Utilization | Mean of occupancy / max over slots with capacity |

use serde::Serialize;
use std::collections::BTreeMap;

use crate::models::{PenaltyBreakdown, Schedule};

/// Component penalties after weighting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WeightedComponents {
    pub min_filled: i64,
    pub preference: i64,
    pub pairing: i64,
    pub section: i64,
}

/// Schedule performance indicators.
#[derive(Debug, Clone, Serialize)]
pub struct ScheduleKpi {
    /// Weighted penalty sum (lower is better).
    pub eval: i64,
    /// Unweighted components with violation counts.
    pub breakdown: PenaltyBreakdown,
    /// Weighted components; they sum to `eval`.
    pub weighted: WeightedComponents,
    /// Events assigned in the merged view.
    pub assigned_events: usize,
    /// Events in the instance.
    pub total_events: usize,
    /// Events fixed by the partial assignment.
    pub fixed_events: usize,
    /// Average occupancy / max over slots with non-zero capacity (0.0..1.0).
    pub avg_utilization: f64,
    /// Per-slot utilization, keyed by `"<kind> <DAY>, <H:MM>"`.
    pub utilization_by_slot: BTreeMap<String, f64>,
}

impl ScheduleKpi {
    /// Computes KPIs from a schedule.
    pub fn calculate(schedule: &Schedule<'_>) -> Self {
        let instance = schedule.instance();
        let weights = instance.weights();
        let breakdown = schedule.penalty_breakdown();

        let weighted = WeightedComponents {
            min_filled: breakdown.min_filled.penalty * weights.min_filled,
            preference: breakdown.preference.penalty * weights.preference,
            pairing: breakdown.pairing.penalty * weights.pair,
            section: breakdown.section.penalty * weights.section_diff,
        };

        let mut utilization_by_slot = BTreeMap::new();
        for s in instance.slot_ids() {
            let slot = instance.slot(s);
            if slot.max == 0 {
                continue;
            }
            let util = schedule.occupancy(s) as f64 / slot.max as f64;
            utilization_by_slot.insert(format!("{} {}", slot.kind, slot), util);
        }
        let avg_utilization = if utilization_by_slot.is_empty() {
            0.0
        } else {
            let sum: f64 = utilization_by_slot.values().sum();
            sum / utilization_by_slot.len() as f64
        };

        let total_events = instance.events().len();
        let assigned_events = total_events - schedule.unassigned_events().count();

        Self {
            eval: schedule.eval(),
            breakdown,
            weighted,
            assigned_events,
            total_events,
            fixed_events: instance.partial().len(),
            avg_utilization,
            utilization_by_slot,
        }
    }

    /// Soft-constraint violations across all four components.
    pub fn total_violations(&self) -> usize {
        self.breakdown.min_filled.count
            + self.breakdown.preference.count
            + self.breakdown.pairing.count
            + self.breakdown.section.count
    }

    /// Whether the schedule meets the given quality thresholds.
    pub fn meets_thresholds(&self, max_eval: i64, min_utilization: f64) -> bool {
        self.eval <= max_eval && self.avg_utilization >= min_utilization
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Day, Event, EventId, Instance, Penalties, Slot, SlotId, Weights};

    fn instance() -> Instance {
        let mut b = Instance::builder()
            .with_weights(Weights::new(2, 3, 5, 7))
            .with_penalties(Penalties::new(1, 1, 1, 1));
        b.add_slot(Slot::game(Day::Mo, 8 * 60, 2, 2)).unwrap();
        b.add_slot(Slot::game(Day::We, 8 * 60, 1, 0)).unwrap();
        b.add_slot(Slot::game(Day::Tu, 11 * 60, 4, 0)).unwrap();
        b.add_event(Event::game("CMSA U13T3 DIV 01").unwrap()).unwrap();
        b.add_event(Event::game("CMSA U14T3 DIV 01").unwrap()).unwrap();
        b.add_preference("CMSA U14T3 DIV 01", Day::Mo, 8 * 60, 4).unwrap();
        b.add_pair("CMSA U13T3 DIV 01", "CMSA U14T3 DIV 01").unwrap();
        b.build().unwrap()
    }

    #[test]
    fn test_kpi_components() {
        let inst = instance();
        let mut s = Schedule::new(&inst);
        s.assign(EventId(0), SlotId(0), true);
        s.assign(EventId(1), SlotId(1), true);

        let kpi = ScheduleKpi::calculate(&s);
        // Slot MO is one short; preference unmet; pair apart
        assert_eq!(kpi.weighted.min_filled, 2);
        assert_eq!(kpi.weighted.preference, 12);
        assert_eq!(kpi.weighted.pairing, 5);
        assert_eq!(kpi.weighted.section, 0);
        assert_eq!(kpi.eval, 19);
        assert_eq!(kpi.total_violations(), 3);
        assert_eq!(kpi.assigned_events, 2);
        assert_eq!(kpi.total_events, 2);
    }

    #[test]
    fn test_kpi_utilization_skips_blocked_slots() {
        let inst = instance();
        let mut s = Schedule::new(&inst);
        s.assign(EventId(0), SlotId(0), true);
        s.assign(EventId(1), SlotId(0), true);

        let kpi = ScheduleKpi::calculate(&s);
        assert_eq!(kpi.utilization_by_slot.len(), 2);
        assert!((kpi.utilization_by_slot["game MO, 8:00"] - 1.0).abs() < 1e-10);
        assert!((kpi.avg_utilization - 0.5).abs() < 1e-10);
        assert_eq!(kpi.eval, 0);
        assert!(kpi.meets_thresholds(0, 0.5));
        assert!(!kpi.meets_thresholds(0, 0.6));
    }

    #[test]
    fn test_kpi_empty_schedule() {
        let inst = instance();
        let kpi = ScheduleKpi::calculate(&Schedule::new(&inst));
        assert_eq!(kpi.assigned_events, 0);
        assert!((kpi.avg_utilization - 0.0).abs() < 1e-10);
    }
}
