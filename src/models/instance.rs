//! Problem instance.
//!
//! An [`Instance`] holds every slot and event, the symmetric
//! incompatibility and pairing relations, the objective weights and
//! penalties, and the baseline partial assignment that every schedule
//! must honor. Instances are assembled through [`InstanceBuilder`] and
//! are read-only afterwards.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::{
    format_time, Assignment, Day, Event, EventId, EventKind, ModelError, Schedule, Slot, SlotId,
    SlotKey, SymmetricRelation,
};

/// Multipliers applied to the four penalty components.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Weights {
    /// Slot minimum fill.
    pub min_filled: i64,
    /// Unmet preferences.
    pub preference: i64,
    /// Paired events apart.
    pub pair: i64,
    /// Overlapping sections of one tier.
    pub section_diff: i64,
}

impl Weights {
    pub fn new(min_filled: i64, preference: i64, pair: i64, section_diff: i64) -> Self {
        Self {
            min_filled,
            preference,
            pair,
            section_diff,
        }
    }
}

/// Per-violation penalty constants.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Penalties {
    /// Per missing event in an under-filled game slot.
    pub game_min: i64,
    /// Per missing event in an under-filled practice slot.
    pub practice_min: i64,
    /// Per paired couple whose slots do not overlap.
    pub not_paired: i64,
    /// Per overlapping pair of different sections in one tier.
    pub section: i64,
}

impl Penalties {
    pub fn new(game_min: i64, practice_min: i64, not_paired: i64, section: i64) -> Self {
        Self {
            game_min,
            practice_min,
            not_paired,
            section,
        }
    }

    /// Minimum-fill penalty for a slot kind.
    pub fn min_fill(&self, kind: EventKind) -> i64 {
        match kind {
            EventKind::Game => self.game_min,
            EventKind::Practice => self.practice_min,
        }
    }
}

/// A fully built scheduling problem.
#[derive(Debug, Clone)]
pub struct Instance {
    name: String,
    weights: Weights,
    penalties: Penalties,
    slots: Vec<Slot>,
    slot_index: HashMap<SlotKey, SlotId>,
    events: Vec<Event>,
    event_index: HashMap<String, EventId>,
    incompatible: SymmetricRelation,
    pairs: SymmetricRelation,
    partial: Assignment,
}

impl Instance {
    /// Starts a new builder.
    pub fn builder() -> InstanceBuilder {
        InstanceBuilder::new()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn weights(&self) -> &Weights {
        &self.weights
    }

    pub fn penalties(&self) -> &Penalties {
        &self.penalties
    }

    /// All slots, indexed by [`SlotId`].
    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    /// All events, indexed by [`EventId`].
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    #[inline]
    pub fn slot(&self, id: SlotId) -> &Slot {
        &self.slots[id.0]
    }

    #[inline]
    pub fn event(&self, id: EventId) -> &Event {
        &self.events[id.0]
    }

    pub fn slot_ids(&self) -> impl Iterator<Item = SlotId> {
        (0..self.slots.len()).map(SlotId)
    }

    pub fn event_ids(&self) -> impl Iterator<Item = EventId> {
        (0..self.events.len()).map(EventId)
    }

    /// Looks up an event by identifier.
    pub fn find_event(&self, id: &str) -> Option<EventId> {
        self.event_index.get(id).copied()
    }

    /// Looks up a slot by kind, day and start time.
    pub fn find_slot(&self, kind: EventKind, day: Day, start_min: u16) -> Option<SlotId> {
        self.slot_index
            .get(&SlotKey {
                day,
                start_min,
                kind,
            })
            .copied()
    }

    /// Declared and derived incompatibilities.
    pub fn incompatible(&self) -> &SymmetricRelation {
        &self.incompatible
    }

    pub fn pairs(&self) -> &SymmetricRelation {
        &self.pairs
    }

    /// The baseline assignment shared by every schedule.
    pub fn partial(&self) -> &Assignment {
        &self.partial
    }

    /// Whether the event is fixed by the partial assignment.
    pub fn is_fixed(&self, event: EventId) -> bool {
        self.partial.contains(event)
    }

    /// Events the search may place or move.
    pub fn reassignable_events(&self) -> impl Iterator<Item = EventId> + '_ {
        self.event_ids().filter(|&e| !self.is_fixed(e))
    }

    /// Slots the event is statically eligible for.
    pub fn compatible_slots(&self, event: EventId) -> impl Iterator<Item = SlotId> + '_ {
        let ev = self.event(event);
        self.slot_ids()
            .filter(move |&s| ev.is_compatible(s, self.slot(s)))
    }
}

/// Builder for [`Instance`].
///
/// Relations are resolved by event identifier as they are added, so
/// events and slots must be registered before anything refers to them.
///
/// # Example
///
/// ```
/// use league_schedule::models::{Day, Event, Instance, Slot};
///
/// let mut builder = Instance::builder().with_name("demo");
/// builder.add_slot(Slot::game(Day::Mo, 8 * 60, 1, 1)).unwrap();
/// builder.add_event(Event::game("CMSA U13T3 DIV 01").unwrap()).unwrap();
///
/// let instance = builder.build().unwrap();
/// assert_eq!(instance.events().len(), 1);
/// assert!(instance.partial().is_empty());
/// ```
#[derive(Debug, Default)]
pub struct InstanceBuilder {
    name: String,
    weights: Weights,
    penalties: Penalties,
    slots: Vec<Slot>,
    slot_index: HashMap<SlotKey, SlotId>,
    events: Vec<Event>,
    event_index: HashMap<String, EventId>,
    incompatible: SymmetricRelation,
    pairs: SymmetricRelation,
    partials: Vec<(EventId, SlotId)>,
}

impl InstanceBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_weights(mut self, weights: Weights) -> Self {
        self.weights = weights;
        self
    }

    pub fn with_penalties(mut self, penalties: Penalties) -> Self {
        self.penalties = penalties;
        self
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Registers a slot. Slots are unique per day, start time and kind.
    pub fn add_slot(&mut self, slot: Slot) -> Result<SlotId, ModelError> {
        let key = slot.key();
        if self.slot_index.contains_key(&key) {
            return Err(ModelError::DuplicateSlot(key));
        }
        let id = SlotId(self.slots.len());
        self.slots.push(slot);
        self.slot_index.insert(key, id);
        Ok(id)
    }

    /// Registers an event.
    ///
    /// A CMSA `U12T1`/`U13T1` game also registers its special practice
    /// the first time the tier is seen.
    pub fn add_event(&mut self, event: Event) -> Result<EventId, ModelError> {
        if self.event_index.contains_key(&event.id) {
            return Err(ModelError::DuplicateEvent(event.id));
        }
        let special = event.special_practice();
        let id = self.push_event(event);

        if let Some(special) = special {
            if !self.event_index.contains_key(&special.id) {
                self.push_event(special);
            }
        }
        Ok(id)
    }

    fn push_event(&mut self, event: Event) -> EventId {
        let id = EventId(self.events.len());
        self.event_index.insert(event.id.clone(), id);
        self.events.push(event);
        id
    }

    /// Looks up an event, ignoring differences in whitespace.
    fn resolve_event(&self, id: &str) -> Result<EventId, ModelError> {
        let id = id.split_whitespace().collect::<Vec<_>>().join(" ");
        self.event_index
            .get(&id)
            .copied()
            .ok_or(ModelError::UnknownEvent(id))
    }

    /// Slot of the event's own kind at the given day and time.
    fn resolve_slot(&self, event: EventId, day: Day, start_min: u16) -> Result<SlotId, ModelError> {
        let kind = self.events[event.0].kind;
        self.slot_index
            .get(&SlotKey {
                day,
                start_min,
                kind,
            })
            .copied()
            .ok_or_else(|| ModelError::UnknownSlot {
                kind,
                day,
                time: format_time(start_min),
            })
    }

    /// Declares two events incompatible. Returns `false` if already declared.
    pub fn add_incompatible(&mut self, a: &str, b: &str) -> Result<bool, ModelError> {
        let (a, b) = (self.resolve_event(a)?, self.resolve_event(b)?);
        Ok(self.incompatible.insert(a, b))
    }

    /// Declares two events paired. Returns `false` if already declared.
    pub fn add_pair(&mut self, a: &str, b: &str) -> Result<bool, ModelError> {
        let (a, b) = (self.resolve_event(a)?, self.resolve_event(b)?);
        Ok(self.pairs.insert(a, b))
    }

    /// Forbids the event from the slot of its kind at `day`/`start_min`.
    pub fn add_unwanted(&mut self, event: &str, day: Day, start_min: u16) -> Result<(), ModelError> {
        let e = self.resolve_event(event)?;
        let s = self.resolve_slot(e, day, start_min)?;
        self.events[e.0].unwanted.insert(s);
        Ok(())
    }

    /// Records a preference weight. A repeated preference overwrites the earlier weight.
    pub fn add_preference(
        &mut self,
        event: &str,
        day: Day,
        start_min: u16,
        weight: i64,
    ) -> Result<(), ModelError> {
        let e = self.resolve_event(event)?;
        let s = self.resolve_slot(e, day, start_min)?;
        self.events[e.0].preferences.insert(s, weight);
        Ok(())
    }

    /// Fixes an event into a slot for every schedule.
    pub fn add_partial_assignment(
        &mut self,
        event: &str,
        day: Day,
        start_min: u16,
    ) -> Result<(), ModelError> {
        let e = self.resolve_event(event)?;
        let s = self.resolve_slot(e, day, start_min)?;
        if self.partials.iter().any(|&(fixed, _)| fixed == e) {
            return Err(ModelError::DuplicatePartialAssignment(
                self.events[e.0].id.clone(),
            ));
        }
        self.partials.push((e, s));
        Ok(())
    }

    /// Derives the implicit incompatibilities and places the fixed events.
    ///
    /// Special practices go into the Tuesday 18:00 practice slot first,
    /// followed by the declared partial assignments. Each placement must
    /// satisfy the hard constraints against what is already fixed.
    pub fn build(self) -> Result<Instance, ModelError> {
        let InstanceBuilder {
            name,
            weights,
            penalties,
            slots,
            slot_index,
            events,
            event_index,
            mut incompatible,
            pairs,
            partials,
        } = self;

        for i in 0..events.len() {
            for j in (i + 1)..events.len() {
                if events[i].implicitly_incompatible(&events[j]) {
                    incompatible.insert(EventId(i), EventId(j));
                }
            }
        }

        let special_slot = slots
            .iter()
            .position(Slot::is_special_practice_slot)
            .map(SlotId);

        let mut fixed: Vec<(EventId, SlotId)> = Vec::new();
        for (i, event) in events.iter().enumerate() {
            if event.is_special_practice() {
                let slot = special_slot
                    .ok_or_else(|| ModelError::MissingSpecialPracticeSlot(event.id.clone()))?;
                fixed.push((EventId(i), slot));
            }
        }
        fixed.extend(partials);

        let mut instance = Instance {
            name,
            weights,
            penalties,
            partial: Assignment::new(events.len(), slots.len()),
            slots,
            slot_index,
            events,
            event_index,
            incompatible,
            pairs,
        };

        let partial = {
            let mut baseline = Schedule::baseline(&instance);
            for (event, slot) in fixed {
                if !baseline.assign(event, slot, true) {
                    return Err(ModelError::InfeasiblePartialAssignment {
                        event: instance.event(event).id.clone(),
                        slot: instance.slot(slot).key(),
                    });
                }
            }
            baseline.into_assignment()
        };
        instance.partial = partial;

        tracing::debug!(
            name = %instance.name,
            slots = instance.slots.len(),
            events = instance.events.len(),
            incompatible = instance.incompatible.len(),
            pairs = instance.pairs.len(),
            fixed = instance.partial.len(),
            "instance built"
        );
        Ok(instance)
    }
}
