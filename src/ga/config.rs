//! Evolutionary controller configuration.

use crate::cp::SolverConfig;

use super::operators::GeneticOperators;

/// Population thresholds, operator mix and stopping rules.
///
/// # Example
///
/// ```
/// use league_schedule::ga::GaConfig;
///
/// let config = GaConfig::default()
///     .with_population(10, 40)
///     .with_eviction_batch(30)
///     .with_seed(7);
/// assert!(config.validate().is_ok());
///
/// // Evicting 35 of 41 would drop below the minimum of 10
/// assert!(config.with_eviction_batch(35).validate().is_err());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct GaConfig {
    /// Below this size the population is refilled with fresh solver runs.
    pub min_population: usize,
    /// Above this size the worst schedules are evicted.
    pub max_population: usize,
    /// Schedules evicted per overflow.
    pub eviction_batch: usize,
    /// Probability of crossover over mutation in steady state.
    pub crossover_rate: f64,
    /// Events perturbed per crossover or mutation.
    pub perturbations: usize,
    /// Eviction rounds before the search stops.
    pub plateau_rounds: usize,
    /// Recoverable solver failures in a row before giving up.
    pub max_consecutive_failures: usize,
    /// RNG seed; `None` seeds from the OS.
    pub seed: Option<u64>,
    /// Settings for every solver invocation.
    pub solver: SolverConfig,
}

impl Default for GaConfig {
    fn default() -> Self {
        Self {
            min_population: 100,
            max_population: 1000,
            eviction_batch: 900,
            crossover_rate: 0.7,
            perturbations: 2,
            plateau_rounds: 5,
            max_consecutive_failures: 1000,
            seed: None,
            solver: SolverConfig::default(),
        }
    }
}

impl GaConfig {
    pub fn with_population(mut self, min: usize, max: usize) -> Self {
        self.min_population = min;
        self.max_population = max;
        self
    }

    pub fn with_eviction_batch(mut self, batch: usize) -> Self {
        self.eviction_batch = batch;
        self
    }

    pub fn with_crossover_rate(mut self, rate: f64) -> Self {
        self.crossover_rate = rate;
        self
    }

    pub fn with_perturbations(mut self, k: usize) -> Self {
        self.perturbations = k;
        self
    }

    pub fn with_plateau_rounds(mut self, rounds: usize) -> Self {
        self.plateau_rounds = rounds;
        self
    }

    pub fn with_max_consecutive_failures(mut self, n: usize) -> Self {
        self.max_consecutive_failures = n;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_solver(mut self, solver: SolverConfig) -> Self {
        self.solver = solver;
        self
    }

    /// Operators described by this configuration.
    pub fn operators(&self) -> GeneticOperators {
        GeneticOperators::default()
            .with_crossover_rate(self.crossover_rate)
            .with_perturbations(self.perturbations)
    }

    /// Checks that the thresholds are consistent.
    ///
    /// Overflow is declared at `max_population + 1` members, so the
    /// eviction batch may be at most `max_population + 1 - min_population`.
    pub fn validate(&self) -> Result<(), String> {
        if self.min_population == 0 {
            return Err("min_population must be at least 1".into());
        }
        if self.min_population > self.max_population {
            return Err(format!(
                "min_population ({}) exceeds max_population ({})",
                self.min_population, self.max_population
            ));
        }
        if self.eviction_batch == 0 {
            return Err("eviction_batch must be at least 1".into());
        }
        let limit = self.max_population + 1 - self.min_population;
        if self.eviction_batch > limit {
            return Err(format!(
                "eviction_batch ({}) would leave fewer than {} schedules; at most {limit} allowed",
                self.eviction_batch, self.min_population
            ));
        }
        if !(0.0..=1.0).contains(&self.crossover_rate) {
            return Err(format!(
                "crossover_rate must be within [0, 1], got {}",
                self.crossover_rate
            ));
        }
        if !(0.0..=1.0).contains(&self.solver.abandon_probability) {
            return Err(format!(
                "abandon_probability must be within [0, 1], got {}",
                self.solver.abandon_probability
            ));
        }
        if self.max_consecutive_failures == 0 {
            return Err("max_consecutive_failures must be at least 1".into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = GaConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.max_population + 1 - config.min_population, 901);
    }

    #[test]
    fn test_invalid_thresholds() {
        assert!(GaConfig::default().with_population(0, 10).validate().is_err());
        assert!(GaConfig::default().with_population(20, 10).validate().is_err());
        assert!(GaConfig::default()
            .with_population(5, 10)
            .with_eviction_batch(0)
            .validate()
            .is_err());
        assert!(GaConfig::default()
            .with_population(5, 10)
            .with_eviction_batch(6)
            .validate()
            .is_ok());
        assert!(GaConfig::default()
            .with_population(5, 10)
            .with_eviction_batch(7)
            .validate()
            .is_err());
    }

    #[test]
    fn test_invalid_rates() {
        assert!(GaConfig::default().with_crossover_rate(1.5).validate().is_err());
        let solver = SolverConfig::default().with_abandon_probability(-0.1);
        assert!(GaConfig::default().with_solver(solver).validate().is_err());
    }

    #[test]
    fn test_operators_follow_config() {
        let ops = GaConfig::default()
            .with_crossover_rate(0.25)
            .with_perturbations(4)
            .operators();
        assert_eq!(ops.crossover_rate, 0.25);
        assert_eq!(ops.perturbations, 4);
    }
}
