//! Printable schedule report.
//!
//! Renders the evaluation score followed by one line per event, sorted
//! by event identifier:
//!
//! ```text
//! Eval-value: 12
//! CMSA U13T3 DIV 01          : MO, 8:00
//! CMSA U13T3 DIV 01 PRC 01   : TU, 10:00
//! ```

use serde::Serialize;
use std::fmt;

use crate::models::{format_time, Day, EventKind, Schedule};

/// One event's placement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportEntry {
    pub event: String,
    pub kind: EventKind,
    /// `None` for an unassigned event.
    pub day: Option<Day>,
    /// Start time as `H:MM`.
    pub time: Option<String>,
    /// Placed by the partial assignment.
    pub fixed: bool,
}

/// A finished schedule ready for printing or serialization.
#[derive(Debug, Clone, Serialize)]
pub struct ScheduleReport {
    pub name: String,
    pub eval: i64,
    pub entries: Vec<ReportEntry>,
}

impl ScheduleReport {
    /// Builds the report over the schedule's merged view.
    pub fn from_schedule(schedule: &Schedule<'_>) -> Self {
        let instance = schedule.instance();
        let mut entries: Vec<ReportEntry> = instance
            .event_ids()
            .map(|e| {
                let event = instance.event(e);
                let slot = schedule.slot_of(e).map(|s| instance.slot(s));
                ReportEntry {
                    event: event.id.clone(),
                    kind: event.kind,
                    day: slot.map(|s| s.day),
                    time: slot.map(|s| format_time(s.start_min)),
                    fixed: instance.is_fixed(e),
                }
            })
            .collect();
        entries.sort_by(|a, b| a.event.cmp(&b.event));

        Self {
            name: instance.name().to_string(),
            eval: schedule.eval(),
            entries,
        }
    }

    /// Pretty-printed JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl fmt::Display for ScheduleReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Eval-value: {}", self.eval)?;
        let width = self.entries.iter().map(|e| e.event.len()).max().unwrap_or(0);
        for entry in &self.entries {
            match (entry.day, &entry.time) {
                (Some(day), Some(time)) => {
                    writeln!(f, "{:<width$} : {}, {}", entry.event, day, time)?
                }
                _ => writeln!(f, "{:<width$} : unassigned", entry.event)?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Event, EventId, Instance, Slot, SlotId};

    fn instance() -> Instance {
        let mut b = Instance::builder().with_name("demo");
        b.add_slot(Slot::game(Day::Mo, 8 * 60, 2, 0)).unwrap();
        b.add_slot(Slot::practice(Day::Tu, 10 * 60, 2, 0)).unwrap();
        b.add_event(Event::game("CMSA U14T3 DIV 01").unwrap()).unwrap();
        b.add_event(Event::practice("CMSA U13T3 DIV 01 PRC 01").unwrap()).unwrap();
        b.add_event(Event::game("CMSA U13T3 DIV 01").unwrap()).unwrap();
        b.build().unwrap()
    }

    #[test]
    fn test_report_sorted_by_event() {
        let inst = instance();
        let mut s = Schedule::new(&inst);
        s.assign(EventId(0), SlotId(0), true);
        s.assign(EventId(1), SlotId(1), true);
        s.assign(EventId(2), SlotId(0), true);

        let report = ScheduleReport::from_schedule(&s);
        let names: Vec<&str> = report.entries.iter().map(|e| e.event.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "CMSA U13T3 DIV 01",
                "CMSA U13T3 DIV 01 PRC 01",
                "CMSA U14T3 DIV 01"
            ]
        );

        let text = s.to_string();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Eval-value: 0");
        assert_eq!(lines[1], "CMSA U13T3 DIV 01        : MO, 8:00");
        assert_eq!(lines[2], "CMSA U13T3 DIV 01 PRC 01 : TU, 10:00");
        assert_eq!(lines.len(), 4);
    }

    #[test]
    fn test_report_unassigned_and_json() {
        let inst = instance();
        let s = Schedule::new(&inst);
        let report = ScheduleReport::from_schedule(&s);
        assert!(report.to_string().contains(": unassigned"));

        let json: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();
        assert_eq!(json["name"], "demo");
        assert_eq!(json["entries"][0]["kind"], "game");
        assert!(json["entries"][0]["day"].is_null());
    }
}
