//! Instance and schedule validation.
//!
//! Two checks, both reporting every problem found rather than the first:
//! - [`validate_instance`]: pre-flight check before search. Detects
//!   events with no usable slot and slot kinds without enough capacity.
//! - [`check_schedule`]: hard constraints over a schedule's merged view
//!   (kind match, evening eligibility, slot capacity, incompatible overlap).

use crate::models::{EventKind, Instance, Schedule};

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// An event sits in a slot of the other kind.
    KindMismatch,
    /// An evening event sits in a daytime slot.
    EveningMismatch,
    /// A slot holds more events than its `max`.
    CapacityExceeded,
    /// Two incompatible events occupy overlapping slots.
    IncompatibleOverlap,
    /// A reassignable event has no compatible slot with capacity.
    NoCandidateSlot,
    /// Total capacity of a slot kind is below its event count.
    InsufficientCapacity,
}

impl ValidationError {
    fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Checks the four hard constraints for every assigned event.
///
/// Looks at the stored state only; unassigned events are ignored.
pub fn check_schedule(schedule: &Schedule<'_>) -> ValidationResult {
    let instance = schedule.instance();
    let mut errors = Vec::new();

    for e in instance.event_ids() {
        let Some(s) = schedule.slot_of(e) else {
            continue;
        };
        let (event, slot) = (instance.event(e), instance.slot(s));
        if event.kind != slot.kind {
            errors.push(ValidationError::new(
                ValidationErrorKind::KindMismatch,
                format!("{} '{}' placed in {} slot {}", event.kind, event.id, slot.kind, slot),
            ));
        }
        if event.is_evening() && !slot.is_evening() {
            errors.push(ValidationError::new(
                ValidationErrorKind::EveningMismatch,
                format!("Evening event '{}' placed in daytime slot {}", event.id, slot),
            ));
        }
    }

    for s in instance.slot_ids() {
        let slot = instance.slot(s);
        let occupancy = schedule.occupancy(s);
        if occupancy > slot.max {
            errors.push(ValidationError::new(
                ValidationErrorKind::CapacityExceeded,
                format!(
                    "{} slot {} holds {} events (max {})",
                    slot.kind, slot, occupancy, slot.max
                ),
            ));
        }
    }

    for (a, b) in instance.incompatible().pairs() {
        if let (Some(sa), Some(sb)) = (schedule.slot_of(a), schedule.slot_of(b)) {
            if instance.slot(sa).overlaps(instance.slot(sb)) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::IncompatibleOverlap,
                    format!(
                        "Incompatible events '{}' ({}) and '{}' ({}) overlap",
                        instance.event(a).id,
                        instance.slot(sa),
                        instance.event(b).id,
                        instance.slot(sb)
                    ),
                ));
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Validates that an instance is worth searching.
///
/// Checks:
/// 1. Every reassignable event has a compatible slot with `max > 0`
/// 2. For each kind, total slot capacity covers the number of events
///
/// Passing does not prove a feasible schedule exists.
pub fn validate_instance(instance: &Instance) -> ValidationResult {
    let mut errors = Vec::new();

    for e in instance.reassignable_events() {
        let usable = instance
            .compatible_slots(e)
            .any(|s| instance.slot(s).max > 0);
        if !usable {
            errors.push(ValidationError::new(
                ValidationErrorKind::NoCandidateSlot,
                format!("Event '{}' has no compatible slot", instance.event(e).id),
            ));
        }
    }

    for kind in [EventKind::Game, EventKind::Practice] {
        let capacity: usize = instance
            .slots()
            .iter()
            .filter(|s| s.kind == kind)
            .map(|s| s.max)
            .sum();
        let demand = instance.events().iter().filter(|e| e.kind == kind).count();
        if demand > capacity {
            errors.push(ValidationError::new(
                ValidationErrorKind::InsufficientCapacity,
                format!("{demand} {kind}s but only {capacity} {kind} places"),
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Day, Event, EventId, Slot, SlotId};

    fn sample_instance() -> Instance {
        let mut b = Instance::builder();
        b.add_slot(Slot::game(Day::Mo, 8 * 60, 1, 0)).unwrap();
        b.add_slot(Slot::game(Day::Mo, 19 * 60, 2, 0)).unwrap();
        b.add_slot(Slot::practice(Day::Mo, 8 * 60, 2, 0)).unwrap();
        b.add_event(Event::game("CMSA U13T3 DIV 01").unwrap()).unwrap();
        b.add_event(Event::game("CMSA U14T3 DIV 91").unwrap()).unwrap();
        b.add_event(Event::practice("CMSA U13T3 DIV 01 PRC 01").unwrap()).unwrap();
        b.build().unwrap()
    }

    #[test]
    fn test_valid_instance() {
        let inst = sample_instance();
        assert!(validate_instance(&inst).is_ok());
    }

    #[test]
    fn test_valid_schedule() {
        let inst = sample_instance();
        let mut s = Schedule::new(&inst);
        assert!(check_schedule(&s).is_ok());
        assert!(s.assign(EventId(0), SlotId(0), true));
        assert!(s.assign(EventId(1), SlotId(1), true));
        assert!(check_schedule(&s).is_ok());
    }

    #[test]
    fn test_forced_violations_reported() {
        let inst = sample_instance();
        let mut s = Schedule::new(&inst);
        s.assign(EventId(0), SlotId(0), true);
        s.assign(EventId(1), SlotId(0), false);
        s.assign(EventId(2), SlotId(0), false);

        let errors = check_schedule(&s).unwrap_err();
        let has = |kind: ValidationErrorKind| errors.iter().any(|e| e.kind == kind);
        assert!(has(ValidationErrorKind::KindMismatch));
        assert!(has(ValidationErrorKind::EveningMismatch));
        assert!(has(ValidationErrorKind::CapacityExceeded));
        assert!(has(ValidationErrorKind::IncompatibleOverlap));
    }

    #[test]
    fn test_event_without_slot() {
        let mut b = Instance::builder();
        b.add_slot(Slot::game(Day::Mo, 8 * 60, 3, 0)).unwrap();
        b.add_event(Event::game("CMSA U13T3 DIV 91").unwrap()).unwrap();
        let inst = b.build().unwrap();

        let errors = validate_instance(&inst).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, ValidationErrorKind::NoCandidateSlot);
    }

    #[test]
    fn test_insufficient_capacity() {
        let mut b = Instance::builder();
        b.add_slot(Slot::game(Day::Mo, 8 * 60, 1, 0)).unwrap();
        // Admin block: declared capacity is ignored
        b.add_slot(Slot::game(Day::Tu, 11 * 60, 4, 0)).unwrap();
        b.add_event(Event::game("CMSA U13T3 DIV 01").unwrap()).unwrap();
        b.add_event(Event::game("CMSA U14T3 DIV 01").unwrap()).unwrap();
        let inst = b.build().unwrap();

        let errors = validate_instance(&inst).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::InsufficientCapacity));
    }
}
