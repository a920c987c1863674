//! Steady-state GA configuration.
//!
//! [`AtspConfig`] holds all parameters that control the evolutionary loop.

use super::fitness::FitnessPolicy;

/// Configuration for the steady-state ATSP genetic algorithm.
///
/// # Defaults
///
/// ```
/// use u_atsp::ga::{AtspConfig, FitnessPolicy};
///
/// let config = AtspConfig::default();
/// assert_eq!(config.population_size, 10);
/// assert_eq!(config.children_per_generation, 1);
/// assert_eq!(config.fitness_policy, FitnessPolicy::CostInverse);
/// ```
///
/// # Builder Pattern
///
/// ```
/// use u_atsp::ga::{AtspConfig, FitnessPolicy};
///
/// let config = AtspConfig::default()
///     .with_children_per_generation(5)
///     .with_fitness_policy(FitnessPolicy::Ratio)
///     .with_mutation_rate(0.01)
///     .with_seed(7);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AtspConfig {
    /// Number of individuals in the population. Never changes during a run.
    pub population_size: usize,

    /// Children produced from the selected parent pair each generation.
    ///
    /// Each child replaces the current least-fit individual, so this is
    /// also the number of slots turned over per generation.
    pub children_per_generation: usize,

    /// Probability of applying swap mutation to a child (0.0–1.0).
    pub mutation_rate: f64,

    /// How tour costs are turned into selection weights.
    pub fitness_policy: FitnessPolicy,

    /// Maximum number of generations before the runner stops.
    pub max_generations: usize,

    /// Draws allowed when sampling a parent that must differ from another.
    ///
    /// After this many draws land on the excluded index, the smallest
    /// non-excluded index is returned instead.
    pub max_resample_attempts: usize,

    /// Whether to compute tour costs in parallel (requires the `parallel` feature).
    pub parallel: bool,

    /// Random seed for reproducibility.
    ///
    /// `None` uses a random seed.
    pub seed: Option<u64>,

    /// Optional wall-clock time limit in milliseconds.
    ///
    /// Checked at the start of each generation.
    pub time_limit_ms: Option<u64>,
}

impl Default for AtspConfig {
    fn default() -> Self {
        Self {
            population_size: 10,
            children_per_generation: 1,
            mutation_rate: 0.02,
            fitness_policy: FitnessPolicy::default(),
            max_generations: 1000,
            max_resample_attempts: 64,
            parallel: false,
            seed: None,
            time_limit_ms: None,
        }
    }
}

impl AtspConfig {
    /// Sets the population size.
    pub fn with_population_size(mut self, n: usize) -> Self {
        self.population_size = n;
        self
    }

    /// Sets the number of children per generation.
    pub fn with_children_per_generation(mut self, k: usize) -> Self {
        self.children_per_generation = k;
        self
    }

    /// Sets the mutation rate.
    pub fn with_mutation_rate(mut self, rate: f64) -> Self {
        self.mutation_rate = rate.clamp(0.0, 1.0);
        self
    }

    /// Sets the fitness policy.
    pub fn with_fitness_policy(mut self, policy: FitnessPolicy) -> Self {
        self.fitness_policy = policy;
        self
    }

    /// Sets the maximum number of generations.
    pub fn with_max_generations(mut self, n: usize) -> Self {
        self.max_generations = n;
        self
    }

    /// Sets the resampling bound for restricted selection.
    pub fn with_max_resample_attempts(mut self, n: usize) -> Self {
        self.max_resample_attempts = n;
        self
    }

    /// Enables or disables parallel cost evaluation.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Sets the random seed for reproducibility.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Sets the wall-clock time limit in milliseconds.
    pub fn with_time_limit_ms(mut self, ms: u64) -> Self {
        self.time_limit_ms = Some(ms);
        self
    }

    /// Preset with one child per generation and 2% mutation.
    pub fn steady() -> Self {
        Self::default()
    }

    /// Preset with five children per generation and 1% mutation.
    ///
    /// Turns genetic material over faster at the cost of losing weak
    /// but diverse individuals sooner.
    pub fn turnover() -> Self {
        Self {
            children_per_generation: 5,
            mutation_rate: 0.01,
            ..Self::default()
        }
    }

    /// Validates the configuration.
    ///
    /// Returns `Err` with a description if any parameter is invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.population_size < 2 {
            return Err("population_size must be at least 2".into());
        }
        if self.children_per_generation == 0 {
            return Err("children_per_generation must be at least 1".into());
        }
        if self.children_per_generation >= self.population_size {
            return Err("children_per_generation must be smaller than population_size".into());
        }
        if !(0.0..=1.0).contains(&self.mutation_rate) {
            return Err("mutation_rate must be within 0.0..=1.0".into());
        }
        if self.max_generations == 0 {
            return Err("max_generations must be at least 1".into());
        }
        if self.max_resample_attempts == 0 {
            return Err("max_resample_attempts must be at least 1".into());
        }
        if self.time_limit_ms == Some(0) {
            return Err("time_limit_ms must be positive or None".into());
        }
        Ok(())
    }
}
