//! Template-producing genetic operators.
//!
//! Both operators copy the best schedule and perturb a few reassignable
//! events. The result is a template for the OR-tree solver, which either
//! accepts it as is or repairs it into a complete, valid schedule.
//!
//! # Usage
//!
//! ```
//! use league_schedule::ga::operators::{GeneticOperators, Operator};
//! use rand::rngs::SmallRng;
//! use rand::SeedableRng;
//!
//! let ops = GeneticOperators::default();
//! assert_eq!(ops.perturbations, 2);
//!
//! let mut rng = SmallRng::seed_from_u64(42);
//! let always = GeneticOperators::default().with_crossover_rate(1.0);
//! assert_eq!(always.select(&mut rng), Operator::Crossover);
//! ```

use rand::Rng;

use crate::models::Schedule;

/// Steady-state transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    /// Copy slots from the second-best schedule into the best.
    Crossover,
    /// Move events of the best schedule to other valid slots.
    Mutation,
}

/// Operator selection and strength.
#[derive(Debug, Clone)]
pub struct GeneticOperators {
    /// Probability of choosing crossover over mutation.
    pub crossover_rate: f64,
    /// Events perturbed per operator application.
    pub perturbations: usize,
}

impl Default for GeneticOperators {
    fn default() -> Self {
        Self {
            crossover_rate: 0.7,
            perturbations: 2,
        }
    }
}

impl GeneticOperators {
    pub fn with_crossover_rate(mut self, rate: f64) -> Self {
        self.crossover_rate = rate;
        self
    }

    pub fn with_perturbations(mut self, k: usize) -> Self {
        self.perturbations = k;
        self
    }

    /// Draws the next operator.
    pub fn select<R: Rng>(&self, rng: &mut R) -> Operator {
        if rng.random_bool(self.crossover_rate) {
            Operator::Crossover
        } else {
            Operator::Mutation
        }
    }

    /// Copies the best schedule and, for up to `perturbations` random
    /// reassignable events, moves each to the slot the second-best
    /// schedule gives it. Hard constraints are not checked here.
    pub fn crossover<'a, R: Rng>(
        &self,
        best: &Schedule<'a>,
        second: &Schedule<'a>,
        rng: &mut R,
    ) -> Schedule<'a> {
        let mut child = best.clone();
        for _ in 0..self.perturbations {
            let Some(event) = child.random_mutable_event(rng) else {
                break;
            };
            if let Some(slot) = second.slot_of(event) {
                child.assign(event, slot, false);
            }
        }
        child
    }

    /// Copies the best schedule and moves up to `perturbations` random
    /// reassignable events to random valid candidate slots.
    pub fn mutate<'a, R: Rng>(&self, best: &Schedule<'a>, rng: &mut R) -> Schedule<'a> {
        let mut child = best.clone();
        for _ in 0..self.perturbations {
            let Some(event) = child.random_mutable_event(rng) else {
                break;
            };
            if let Some(slot) = child.random_candidate_slot(event, rng) {
                child.assign(event, slot, true);
            }
        }
        child
    }
}
