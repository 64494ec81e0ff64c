//! Evolutionary controller.
//!
//! A three-state machine over the population size:
//!
//! | State | Condition | Action |
//! |-------|-----------|--------|
//! | Overflow | size > max | evict the worst batch, count the round, check plateau |
//! | Incomplete | size < min | add a fresh solver result |
//! | Steady | otherwise | crossover or mutation, repaired by the solver |
//!
//! The run stops once the population holds at least `min_population`
//! schedules and `plateau_rounds` evictions have happened. The best/worst
//! fitness gap is logged at each eviction but does not gate termination.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use thiserror::Error;

use crate::cp::{OrTree, SolverError};
use crate::models::{Instance, Schedule};

use super::config::GaConfig;
use super::operators::{GeneticOperators, Operator};
use super::population::Population;

/// Controller errors.
#[derive(Debug, Error)]
pub enum GaError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("no schedule found after {attempts} consecutive solver failures (last: {last})")]
    Infeasible { attempts: usize, last: SolverError },

    #[error(transparent)]
    Solver(#[from] SolverError),

    #[error("population is empty")]
    EmptyPopulation,
}

/// Population state for the next step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoolState {
    Overflow,
    Incomplete,
    Steady,
}

/// Outcome of a finished run.
#[derive(Debug, Clone)]
pub struct GaResult<'a> {
    /// Lowest-scoring schedule found.
    pub best: Schedule<'a>,
    /// Its evaluation score.
    pub best_fitness: i64,
    /// Controller steps taken.
    pub iterations: usize,
    /// Overflow evictions performed.
    pub eviction_rounds: usize,
    /// Recoverable solver failures over the whole run.
    pub solver_failures: usize,
    /// Population size at termination.
    pub population_size: usize,
}

/// Drives the population through solver runs, crossover and mutation.
///
/// # Example
///
/// ```
/// use league_schedule::ga::{GaConfig, GaRunner};
/// use league_schedule::models::{Day, Event, Instance, Slot};
///
/// let mut builder = Instance::builder();
/// builder.add_slot(Slot::game(Day::Mo, 8 * 60, 2, 0)).unwrap();
/// builder.add_slot(Slot::game(Day::We, 8 * 60, 2, 0)).unwrap();
/// builder.add_event(Event::game("CMSA U13T3 DIV 01").unwrap()).unwrap();
/// let instance = builder.build().unwrap();
///
/// let config = GaConfig::default()
///     .with_population(4, 8)
///     .with_eviction_batch(5)
///     .with_seed(42);
/// let result = GaRunner::run(&instance, &config).unwrap();
/// assert!(result.best.complete() && result.best.valid());
/// ```
pub struct GaRunner<'a> {
    instance: &'a Instance,
    config: GaConfig,
    operators: GeneticOperators,
    population: Population<'a>,
    iterations: usize,
    eviction_rounds: usize,
    solver_failures: usize,
    consecutive_failures: usize,
    terminated: bool,
}

impl<'a> GaRunner<'a> {
    /// Creates a controller with an empty population.
    pub fn new(instance: &'a Instance, config: GaConfig) -> Result<Self, GaError> {
        config.validate().map_err(GaError::InvalidConfig)?;
        Ok(Self {
            instance,
            operators: config.operators(),
            config,
            population: Population::new(),
            iterations: 0,
            eviction_rounds: 0,
            solver_failures: 0,
            consecutive_failures: 0,
            terminated: false,
        })
    }

    /// Runs to termination with an RNG seeded from `config.seed`, or
    /// from the OS when no seed is set.
    pub fn run(instance: &'a Instance, config: &GaConfig) -> Result<GaResult<'a>, GaError> {
        let mut rng = match config.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_os_rng(),
        };
        Self::new(instance, config.clone())?.run_with_rng(&mut rng)
    }

    /// Runs to termination and returns the best schedule.
    pub fn run_with_rng<R: Rng>(mut self, rng: &mut R) -> Result<GaResult<'a>, GaError> {
        tracing::info!(
            events = self.instance.events().len(),
            slots = self.instance.slots().len(),
            min_population = self.config.min_population,
            max_population = self.config.max_population,
            "evolutionary search started"
        );

        while !self.terminated {
            self.step(rng)?;
        }

        let population_size = self.population.len();
        let best = self
            .population
            .into_best()
            .ok_or(GaError::EmptyPopulation)?;
        let best_fitness = best.eval();

        tracing::info!(
            best_fitness,
            iterations = self.iterations,
            eviction_rounds = self.eviction_rounds,
            solver_failures = self.solver_failures,
            "evolutionary search finished"
        );

        Ok(GaResult {
            best,
            best_fitness,
            iterations: self.iterations,
            eviction_rounds: self.eviction_rounds,
            solver_failures: self.solver_failures,
            population_size,
        })
    }

    pub fn state(&self) -> PoolState {
        let size = self.population.len();
        if size > self.config.max_population {
            PoolState::Overflow
        } else if size < self.config.min_population {
            PoolState::Incomplete
        } else {
            PoolState::Steady
        }
    }

    pub fn population(&self) -> &Population<'a> {
        &self.population
    }

    pub fn is_terminated(&self) -> bool {
        self.terminated
    }

    pub fn eviction_rounds(&self) -> usize {
        self.eviction_rounds
    }

    /// Performs one transition of the state machine.
    pub fn step<R: Rng>(&mut self, rng: &mut R) -> Result<(), GaError> {
        if self.terminated {
            return Ok(());
        }
        self.iterations += 1;

        match self.state() {
            PoolState::Overflow => {
                let evicted = self.population.remove(self.config.eviction_batch);
                self.eviction_rounds += 1;
                self.log_plateau(evicted);
                if self.plateau_reached() {
                    self.terminated = true;
                }
            }
            PoolState::Incomplete => {
                let result = OrTree::new(self.instance)
                    .with_config(self.config.solver)
                    .solve(rng);
                self.absorb(result)?;
            }
            PoolState::Steady => {
                let template = self.offspring(rng)?;
                let result = OrTree::new(self.instance)
                    .with_template(template)
                    .with_config(self.config.solver)
                    .solve(rng);
                self.absorb(result)?;
            }
        }
        Ok(())
    }

    /// Builds a template from the best schedule. Crossover needs a
    /// second-best schedule and falls back to mutation without one.
    fn offspring<R: Rng>(&self, rng: &mut R) -> Result<Schedule<'a>, GaError> {
        let best = self.population.best().ok_or(GaError::EmptyPopulation)?;
        let template = match (self.operators.select(rng), self.population.second_best()) {
            (Operator::Crossover, Some(second)) => {
                tracing::trace!("crossover");
                self.operators.crossover(best, second, rng)
            }
            _ => {
                tracing::trace!("mutation");
                self.operators.mutate(best, rng)
            }
        };
        Ok(template)
    }

    fn absorb(&mut self, result: Result<Schedule<'a>, SolverError>) -> Result<(), GaError> {
        match result {
            Ok(schedule) => {
                self.consecutive_failures = 0;
                self.population.add(schedule);
                Ok(())
            }
            Err(err) if err.is_recoverable() => {
                self.solver_failures += 1;
                self.consecutive_failures += 1;
                tracing::debug!(
                    error = %err,
                    consecutive = self.consecutive_failures,
                    "solver failed, retrying"
                );
                if self.consecutive_failures >= self.config.max_consecutive_failures {
                    return Err(GaError::Infeasible {
                        attempts: self.consecutive_failures,
                        last: err,
                    });
                }
                Ok(())
            }
            Err(err) => Err(GaError::Solver(err)),
        }
    }

    fn plateau_reached(&self) -> bool {
        self.population.len() >= self.config.min_population
            && self.eviction_rounds >= self.config.plateau_rounds
    }

    fn log_plateau(&self, evicted: usize) {
        let (Some(best), Some(worst)) = (
            self.population.best_fitness(),
            self.population.worst_fitness(),
        ) else {
            return;
        };
        tracing::debug!(
            round = self.eviction_rounds,
            evicted,
            best,
            worst,
            gap = worst - best,
            average = self.population.average_fitness().unwrap_or_default(),
            "population evicted"
        );
    }
}
