//! Fitness-ordered population.
//!
//! Schedules are ranked by evaluation score, lower first. Ties are
//! broken by insertion order: a later schedule ranks behind an earlier
//! one with the same score.
//!
//! # Complexity
//! Backed by a B-tree, so `add`, `best`, `second_best`, `worst` and
//! evicting one member are O(log n). `remove(k)` is O(k log n).

use std::collections::BTreeMap;

use crate::models::Schedule;

/// Ranked multiset of schedules with a running fitness sum.
///
/// # Example
///
/// ```
/// use league_schedule::ga::Population;
/// use league_schedule::models::{Day, Instance, Schedule, Slot};
///
/// let mut builder = Instance::builder();
/// builder.add_slot(Slot::game(Day::Mo, 8 * 60, 1, 0)).unwrap();
/// let instance = builder.build().unwrap();
///
/// let mut population = Population::new();
/// population.add(Schedule::new(&instance));
/// population.add(Schedule::new(&instance));
/// assert_eq!(population.len(), 2);
///
/// population.remove(5);
/// assert!(population.is_empty());
/// ```
#[derive(Debug, Default)]
pub struct Population<'a> {
    members: BTreeMap<(i64, u64), Schedule<'a>>,
    next_seq: u64,
    fitness_sum: i64,
}

impl<'a> Population<'a> {
    pub fn new() -> Self {
        Self {
            members: BTreeMap::new(),
            next_seq: 0,
            fitness_sum: 0,
        }
    }

    /// Inserts a schedule ranked by its evaluation score.
    pub fn add(&mut self, schedule: Schedule<'a>) {
        let fitness = schedule.eval();
        self.members.insert((fitness, self.next_seq), schedule);
        self.next_seq += 1;
        self.fitness_sum += fitness;
    }

    /// Lowest-scoring schedule.
    pub fn best(&self) -> Option<&Schedule<'a>> {
        self.members.values().next()
    }

    /// Runner-up, if at least two schedules are present.
    pub fn second_best(&self) -> Option<&Schedule<'a>> {
        self.members.values().nth(1)
    }

    /// Highest-scoring schedule.
    pub fn worst(&self) -> Option<&Schedule<'a>> {
        self.members.values().next_back()
    }

    pub fn best_fitness(&self) -> Option<i64> {
        self.members.keys().next().map(|&(f, _)| f)
    }

    pub fn worst_fitness(&self) -> Option<i64> {
        self.members.keys().next_back().map(|&(f, _)| f)
    }

    /// Evicts up to `amount` of the worst-ranked schedules.
    ///
    /// Returns the number evicted. Clears everything when `amount`
    /// reaches the population size.
    pub fn remove(&mut self, amount: usize) -> usize {
        if amount >= self.members.len() {
            let evicted = self.members.len();
            self.members.clear();
            self.fitness_sum = 0;
            return evicted;
        }
        for _ in 0..amount {
            if let Some(((fitness, _), _)) = self.members.pop_last() {
                self.fitness_sum -= fitness;
            }
        }
        amount
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Sum of all members' scores.
    pub fn fitness_sum(&self) -> i64 {
        self.fitness_sum
    }

    /// Mean score, or `None` when empty.
    pub fn average_fitness(&self) -> Option<f64> {
        (!self.is_empty()).then(|| self.fitness_sum as f64 / self.len() as f64)
    }

    /// Members from best to worst.
    pub fn iter(&self) -> impl Iterator<Item = &Schedule<'a>> {
        self.members.values()
    }

    /// Takes the best schedule out of the population.
    pub fn into_best(mut self) -> Option<Schedule<'a>> {
        self.members.pop_first().map(|(_, s)| s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Day, Event, EventId, Instance, Penalties, Slot, SlotId, Weights};

    /// One game, four slots with preference weights 0, 10, 20, 30.
    fn instance() -> Instance {
        let mut b = Instance::builder()
            .with_weights(Weights::new(0, 1, 0, 0))
            .with_penalties(Penalties::default());
        for hour in 8..12 {
            b.add_slot(Slot::game(Day::We, hour * 60, 1, 0)).unwrap();
        }
        b.add_event(Event::game("CMSA U13T3 DIV 01").unwrap()).unwrap();
        for (i, hour) in (8..12).enumerate() {
            // Weight paid when the game is elsewhere
            let weight = 10 * i as i64;
            b.add_preference("CMSA U13T3 DIV 01", Day::We, hour * 60, weight)
                .unwrap();
        }
        b.build().unwrap()
    }

    fn schedule_in(inst: &Instance, slot: usize) -> Schedule<'_> {
        let mut s = Schedule::new(inst);
        assert!(s.assign(EventId(0), SlotId(slot), true));
        s
    }

    #[test]
    fn test_ordering_and_sum() {
        let inst = instance();
        let mut pop = Population::new();
        // Total preference weight 60; slot i scores 60 - 10i
        pop.add(schedule_in(&inst, 1));
        pop.add(schedule_in(&inst, 3));
        pop.add(schedule_in(&inst, 0));

        assert_eq!(pop.len(), 3);
        assert_eq!(pop.best_fitness(), Some(30));
        assert_eq!(pop.worst_fitness(), Some(60));
        assert_eq!(pop.second_best().map(|s| s.eval()), Some(50));
        assert_eq!(pop.fitness_sum(), 140);
        assert!((pop.average_fitness().unwrap() - 140.0 / 3.0).abs() < 1e-10);
    }

    #[test]
    fn test_second_best_needs_two() {
        let inst = instance();
        let mut pop = Population::new();
        assert!(pop.best().is_none());
        pop.add(schedule_in(&inst, 2));
        assert!(pop.best().is_some());
        assert!(pop.second_best().is_none());
        assert_eq!(pop.average_fitness(), Some(40.0));
    }

    #[test]
    fn test_ties_keep_insertion_order() {
        let inst = instance();
        let mut pop = Population::new();
        pop.add(schedule_in(&inst, 2));
        pop.add(schedule_in(&inst, 2));
        pop.add(schedule_in(&inst, 3));
        assert_eq!(pop.best_fitness(), Some(30));
        assert_eq!(pop.second_best().map(|s| s.eval()), Some(40));
        assert_eq!(pop.remove(1), 1);
        assert_eq!(pop.len(), 2);
        assert_eq!(pop.worst_fitness(), Some(40));
    }

    #[test]
    fn test_remove_keeps_best() {
        let inst = instance();
        let mut pop = Population::new();
        for slot in [0, 3, 1, 2, 3, 0] {
            pop.add(schedule_in(&inst, slot));
        }
        let before: Vec<i64> = pop.iter().map(|s| s.eval()).collect();
        assert_eq!(before, vec![30, 30, 40, 50, 60, 60]);

        assert_eq!(pop.remove(4), 4);
        let after: Vec<i64> = pop.iter().map(|s| s.eval()).collect();
        assert_eq!(after, vec![30, 30]);
        assert_eq!(pop.fitness_sum(), 60);

        assert_eq!(pop.remove(2), 2);
        assert!(pop.is_empty());
        assert_eq!(pop.fitness_sum(), 0);
        assert_eq!(pop.average_fitness(), None);
    }

    #[test]
    fn test_into_best() {
        let inst = instance();
        let mut pop = Population::new();
        pop.add(schedule_in(&inst, 0));
        pop.add(schedule_in(&inst, 3));
        let best = pop.into_best().unwrap();
        assert_eq!(best.slot_of(EventId(0)), Some(SlotId(3)));
    }
}
