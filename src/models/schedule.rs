//! Schedule (solution) model.
//!
//! A [`Schedule`] assigns events to slots on top of the instance's
//! baseline partial assignment. All queries (`slot_of`, `occupancy`,
//! evaluation) see the merged view; the schedule itself only stores the
//! events it placed, and never stores an event the baseline fixes.
//!
//! # Hard Constraints
//! 1. Event kind matches slot kind
//! 2. Evening events sit in evening slots
//! 3. Slot occupancy stays at or below `max`
//! 4. Incompatible events never occupy overlapping slots

use rand::seq::IndexedRandom;
use rand::Rng;
use std::cell::Cell;
use std::collections::BTreeSet;
use std::fmt;

use super::{EventId, Instance, PenaltyBreakdown, SlotId};

/// Event-to-slot mapping with its inverse index.
///
/// `slot_of` and `contents` are kept exact inverses of each other.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    slot_of: Vec<Option<SlotId>>,
    contents: Vec<BTreeSet<EventId>>,
    len: usize,
}

impl Assignment {
    /// Creates an empty assignment sized for the given instance dimensions.
    pub fn new(num_events: usize, num_slots: usize) -> Self {
        Self {
            slot_of: vec![None; num_events],
            contents: vec![BTreeSet::new(); num_slots],
            len: 0,
        }
    }

    #[inline]
    pub fn slot_of(&self, event: EventId) -> Option<SlotId> {
        self.slot_of[event.0]
    }

    pub fn events_in(&self, slot: SlotId) -> &BTreeSet<EventId> {
        &self.contents[slot.0]
    }

    #[inline]
    pub fn occupancy(&self, slot: SlotId) -> usize {
        self.contents[slot.0].len()
    }

    #[inline]
    pub fn contains(&self, event: EventId) -> bool {
        self.slot_of[event.0].is_some()
    }

    /// Number of assigned events.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Assigned `(event, slot)` pairs in event order.
    pub fn iter(&self) -> impl Iterator<Item = (EventId, SlotId)> + '_ {
        self.slot_of
            .iter()
            .enumerate()
            .filter_map(|(e, s)| s.map(|s| (EventId(e), s)))
    }

    /// Places the event, moving it out of its previous slot. Returns the previous slot.
    pub fn place(&mut self, event: EventId, slot: SlotId) -> Option<SlotId> {
        let previous = self.remove(event);
        self.slot_of[event.0] = Some(slot);
        self.contents[slot.0].insert(event);
        self.len += 1;
        previous
    }

    /// Unassigns the event. Returns the slot it occupied.
    pub fn remove(&mut self, event: EventId) -> Option<SlotId> {
        let previous = self.slot_of[event.0].take()?;
        self.contents[previous.0].remove(&event);
        self.len -= 1;
        Some(previous)
    }
}

/// A (possibly partial) solution over an [`Instance`].
///
/// The evaluation score is cached and dropped on every change to the
/// assignment.
///
/// # Example
///
/// ```
/// use league_schedule::models::{Day, Event, Instance, Schedule, Slot};
///
/// let mut builder = Instance::builder();
/// let slot = builder.add_slot(Slot::game(Day::Mo, 8 * 60, 1, 1)).unwrap();
/// let game = builder.add_event(Event::game("CMSA U13T3 DIV 01").unwrap()).unwrap();
/// let instance = builder.build().unwrap();
///
/// let mut schedule = Schedule::new(&instance);
/// assert!(!schedule.complete());
/// assert!(schedule.assign(game, slot, true));
/// assert!(schedule.complete() && schedule.valid());
/// assert_eq!(schedule.eval(), 0);
/// ```
#[derive(Debug, Clone)]
pub struct Schedule<'a> {
    instance: &'a Instance,
    assignment: Assignment,
    baseline: bool,
    eval_cache: Cell<Option<i64>>,
}

impl<'a> Schedule<'a> {
    /// Creates an empty schedule layered on the instance's partial assignment.
    pub fn new(instance: &'a Instance) -> Self {
        Self {
            instance,
            assignment: Assignment::new(instance.events().len(), instance.slots().len()),
            baseline: false,
            eval_cache: Cell::new(None),
        }
    }

    /// The schedule that builds the partial assignment itself. It ignores
    /// the instance's current partial assignment.
    pub(crate) fn baseline(instance: &'a Instance) -> Self {
        Self {
            baseline: true,
            ..Self::new(instance)
        }
    }

    pub(crate) fn into_assignment(self) -> Assignment {
        self.assignment
    }

    pub fn instance(&self) -> &'a Instance {
        self.instance
    }

    /// Events placed by this schedule, excluding the baseline.
    pub fn own_assignment(&self) -> &Assignment {
        &self.assignment
    }

    fn partial(&self) -> Option<&'a Assignment> {
        (!self.baseline).then(|| self.instance.partial())
    }

    /// Slot of an event in the merged view.
    pub fn slot_of(&self, event: EventId) -> Option<SlotId> {
        self.assignment
            .slot_of(event)
            .or_else(|| self.partial().and_then(|p| p.slot_of(event)))
    }

    /// Number of events in a slot in the merged view.
    pub fn occupancy(&self, slot: SlotId) -> usize {
        self.assignment.occupancy(slot) + self.partial().map_or(0, |p| p.occupancy(slot))
    }

    /// Events in a slot in the merged view.
    pub fn events_in(&self, slot: SlotId) -> impl Iterator<Item = EventId> + '_ {
        let fixed = self.partial().into_iter().flat_map(move |p| p.events_in(slot));
        self.assignment
            .events_in(slot)
            .iter()
            .chain(fixed)
            .copied()
    }

    /// Whether the event is fixed by the baseline and cannot be moved here.
    pub fn is_fixed(&self, event: EventId) -> bool {
        !self.baseline && self.instance.is_fixed(event)
    }

    /// Moves `event` into `slot`.
    ///
    /// With `require_valid`, a placement that breaks a hard constraint is
    /// rejected and the previous slot is kept. Fixed events are never
    /// moved. Reassigning an event to its current slot changes nothing.
    pub fn assign(&mut self, event: EventId, slot: SlotId, require_valid: bool) -> bool {
        if self.is_fixed(event) {
            return false;
        }
        let current = self.assignment.slot_of(event);
        if require_valid && !self.is_placement_valid(event, slot) {
            return false;
        }
        if current != Some(slot) {
            self.assignment.place(event, slot);
            self.eval_cache.set(None);
        }
        true
    }

    /// Unassigns the event. No-op if it is unassigned or fixed.
    pub fn clear_assignment(&mut self, event: EventId) {
        if self.assignment.remove(event).is_some() {
            self.eval_cache.set(None);
        }
    }

    /// Whether placing `event` in `slot` keeps every hard constraint,
    /// given the rest of the current state.
    pub fn is_placement_valid(&self, event: EventId, slot_id: SlotId) -> bool {
        let ev = self.instance.event(event);
        let slot = self.instance.slot(slot_id);

        if ev.kind != slot.kind || (ev.is_evening() && !slot.is_evening()) {
            return false;
        }

        let already_here = usize::from(self.slot_of(event) == Some(slot_id));
        if self.occupancy(slot_id) - already_here >= slot.max {
            return false;
        }

        !self
            .instance
            .incompatible()
            .neighbors(event)
            .filter_map(|other| self.slot_of(other))
            .any(|other_slot| self.instance.slot(other_slot).overlaps(slot))
    }

    /// Re-checks every hard constraint over the stored state.
    pub fn valid(&self) -> bool {
        crate::validation::check_schedule(self).is_ok()
    }

    /// Every event is assigned, here or in the baseline.
    pub fn complete(&self) -> bool {
        self.instance
            .event_ids()
            .all(|e| self.slot_of(e).is_some())
    }

    pub fn unassigned_events(&self) -> impl Iterator<Item = EventId> + '_ {
        self.instance
            .event_ids()
            .filter(|&e| self.slot_of(e).is_none())
    }

    /// Unassigned events in search order: evening games, evening
    /// practices, remaining games, remaining practices.
    pub fn scheduling_order(&self) -> Vec<EventId> {
        let mut order: Vec<EventId> = self.unassigned_events().collect();
        order.sort_by_key(|&e| {
            let ev = self.instance.event(e);
            let group = match (ev.is_evening(), ev.is_game()) {
                (true, true) => 0,
                (true, false) => 1,
                (false, true) => 2,
                (false, false) => 3,
            };
            (group, e)
        });
        order
    }

    /// Slots the event could take right now without breaking a hard constraint.
    ///
    /// Recomputed on every call.
    pub fn candidate_slots(&self, event: EventId) -> Vec<SlotId> {
        self.instance
            .compatible_slots(event)
            .filter(|&s| self.is_placement_valid(event, s))
            .collect()
    }

    pub fn random_candidate_slot<R: Rng>(&self, event: EventId, rng: &mut R) -> Option<SlotId> {
        self.candidate_slots(event).choose(rng).copied()
    }

    /// A random event that is not fixed by the baseline.
    pub fn random_mutable_event<R: Rng>(&self, rng: &mut R) -> Option<EventId> {
        let mutable: Vec<EventId> = self.instance.reassignable_events().collect();
        mutable.choose(rng).copied()
    }

    /// Penalty components over the merged view.
    pub fn penalty_breakdown(&self) -> PenaltyBreakdown {
        PenaltyBreakdown::of(self)
    }

    /// Weighted penalty sum. Lower is better.
    pub fn eval(&self) -> i64 {
        if let Some(value) = self.eval_cache.get() {
            return value;
        }
        let value = self.penalty_breakdown().weighted(self.instance.weights());
        self.eval_cache.set(Some(value));
        value
    }
}

impl fmt::Display for Schedule<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", crate::scheduler::ScheduleReport::from_schedule(self))
    }
}
