//! Steady-state evolutionary loop.
//!
//! [`Evolution`] performs one generation at a time:
//! evaluate → select two parents → recombine → mutate → replace least fit.
//!
//! [`AtspRunner`] drives an [`Evolution`] until the generation budget, the
//! time limit or a cancellation flag stops it, and tracks the best tour seen.

use super::config::AtspConfig;
use super::fitness::{evaluate, CumulativeFitness};
use super::operators::{greedy_crossover, swap_mutation};
use super::population::Population;
use super::selection::{least_fit, sample};
use crate::instance::Instance;
use crate::report::{NoReport, Reporter};
use rand::Rng;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use u_numflow::random::create_rng;

/// What happened during one generation.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationStats {
    /// 1-based generation number.
    pub generation: usize,

    /// Slots of the two distinct parents.
    pub parents: (usize, usize),

    /// Replaced slots with the cost of the child installed in each.
    pub replaced: Vec<(usize, u64)>,

    /// Number of children that were mutated.
    pub mutated: usize,

    /// Total fitness of the population before replacement.
    pub total_fitness: u64,

    /// Lowest cost in the population before replacement.
    pub best_cost: u64,

    /// Mean cost of the population before replacement.
    pub average_cost: f64,
}

/// One steady-state GA over a borrowed instance.
///
/// The population is owned; the instance and config are borrowed
/// read-only for the lifetime of the evolution.
///
/// # Examples
///
/// ```
/// use u_atsp::ga::{AtspConfig, Evolution, Population};
/// use u_atsp::instance::Instance;
///
/// let instance = Instance::new(vec![
///     vec![0, 1, 9],
///     vec![9, 0, 1],
///     vec![1, 9, 0],
/// ]).unwrap();
/// let config = AtspConfig::default().with_population_size(4);
/// let mut rng = u_numflow::random::create_rng(42);
///
/// let population = Population::random(4, 3, &mut rng);
/// let mut evolution = Evolution::new(&instance, population, &config);
/// let stats = evolution.step(&mut rng);
///
/// assert_eq!(stats.generation, 1);
/// assert_ne!(stats.parents.0, stats.parents.1);
/// ```
#[derive(Debug)]
pub struct Evolution<'a> {
    instance: &'a Instance,
    config: &'a AtspConfig,
    population: Population,
    generation: usize,
}

impl<'a> Evolution<'a> {
    /// Creates an evolution from a seeded population.
    ///
    /// # Panics
    /// Panics if the config is invalid, if the population size differs from
    /// `config.population_size`, or if its tours do not match the instance size.
    pub fn new(instance: &'a Instance, population: Population, config: &'a AtspConfig) -> Self {
        config.validate().expect("invalid AtspConfig");
        assert_eq!(
            population.len(),
            config.population_size,
            "population size must match config.population_size"
        );
        assert_eq!(
            population.tour_len(),
            instance.size(),
            "tour length must match instance size"
        );

        Self {
            instance,
            config,
            population,
            generation: 0,
        }
    }

    /// The current population.
    pub fn population(&self) -> &Population {
        &self.population
    }

    /// Consumes the evolution and returns its population.
    pub fn into_population(self) -> Population {
        self.population
    }

    /// Number of generations performed so far.
    pub fn generation(&self) -> usize {
        self.generation
    }

    /// Refreshes every cached cost and fitness.
    pub fn evaluate<R: Rng>(&mut self, rng: &mut R) -> CumulativeFitness {
        evaluate(
            &mut self.population,
            self.instance,
            self.config.fitness_policy,
            self.config.parallel,
            rng,
        )
    }

    /// Runs one generation.
    ///
    /// All children of a generation come from the same parent pair and are
    /// built before any replacement, so a parent replaced by the first
    /// child still contributes to the following ones. Each child then
    /// replaces the current least-fit slot; slots replaced earlier in the
    /// same generation are not candidates.
    pub fn step<R: Rng>(&mut self, rng: &mut R) -> GenerationStats {
        let table = self.evaluate(rng);
        let best_cost = self
            .population
            .best()
            .and_then(|i| self.population.get(i).cost())
            .unwrap_or(self.instance.sentinel());
        let average_cost = self.population.average_cost().unwrap_or(0.0);

        let attempts = self.config.max_resample_attempts;
        let parent1 = sample(&table, None, attempts, rng);
        let parent2 = sample(&table, Some(parent1), attempts, rng);

        let mut mutated = 0;
        let mut children = Vec::with_capacity(self.config.children_per_generation);
        for _ in 0..self.config.children_per_generation {
            let mut child = greedy_crossover(
                self.instance,
                self.population.get(parent1).genes(),
                self.population.get(parent2).genes(),
                rng,
            );
            if rng.random_bool(self.config.mutation_rate) {
                swap_mutation(&mut child, rng);
                mutated += 1;
            }
            children.push(child);
        }

        let mut replaced = Vec::with_capacity(children.len());
        for child in children {
            let slot = least_fit(&self.population)
                .expect("fewer children than individuals leaves an evaluated slot");
            let cost = self.instance.tour_cost(&child);
            self.population.replace(slot, child);
            replaced.push((slot, cost));
        }

        self.generation += 1;

        tracing::debug!(
            generation = self.generation,
            parent1,
            parent2,
            replaced = ?replaced,
            mutated,
            best_cost,
            average_cost,
            "generation complete"
        );

        GenerationStats {
            generation: self.generation,
            parents: (parent1, parent2),
            replaced,
            mutated,
            total_fitness: table.total(),
            best_cost,
            average_cost,
        }
    }
}

/// Result of a GA run.
#[derive(Debug, Clone)]
pub struct AtspResult {
    /// The cheapest tour seen during the run.
    pub best_tour: Vec<usize>,

    /// Cost of `best_tour`.
    pub best_cost: u64,

    /// Number of generations executed.
    pub generations: usize,

    /// Whether the run was cancelled externally.
    pub cancelled: bool,

    /// Whether the run hit `time_limit_ms`.
    pub timed_out: bool,

    /// Best cost so far, before the first generation and after each one.
    pub cost_history: Vec<u64>,

    /// Final population, freshly evaluated.
    pub population: Population,
}

/// Drives the steady-state GA.
///
/// # Usage
///
/// ```
/// use u_atsp::ga::{AtspConfig, AtspRunner};
/// use u_atsp::instance::Instance;
///
/// let instance = Instance::new(vec![
///     vec![0, 1, 9, 9],
///     vec![9, 0, 1, 9],
///     vec![9, 9, 0, 1],
///     vec![1, 9, 9, 0],
/// ]).unwrap();
/// let config = AtspConfig::default().with_max_generations(200).with_seed(42);
///
/// let result = AtspRunner::run(&instance, &config);
/// assert!(instance.is_valid_tour(&result.best_tour));
/// assert_eq!(result.best_cost, instance.tour_cost(&result.best_tour));
/// ```
pub struct AtspRunner;

impl AtspRunner {
    /// Runs the GA from a random population.
    ///
    /// # Panics
    /// Panics if the configuration is invalid (call [`AtspConfig::validate`]
    /// first to get a descriptive error).
    pub fn run(instance: &Instance, config: &AtspConfig) -> AtspResult {
        let mut rng = seeded_rng(config);
        let population = Population::random(config.population_size, instance.size(), &mut rng);
        drive(instance, population, config, None, &mut NoReport, &mut rng)
    }

    /// Runs the GA from the given population.
    pub fn run_with_population(
        instance: &Instance,
        population: Population,
        config: &AtspConfig,
    ) -> AtspResult {
        Self::run_with_cancel(instance, population, config, None)
    }

    /// Runs the GA with an optional cancellation token.
    ///
    /// If `cancel` is `Some` and the flag is set to `true`, the GA stops
    /// before the next generation and returns the best tour found so far.
    pub fn run_with_cancel(
        instance: &Instance,
        population: Population,
        config: &AtspConfig,
        cancel: Option<Arc<AtomicBool>>,
    ) -> AtspResult {
        Self::run_with_reporter(instance, population, config, cancel, &mut NoReport)
    }

    /// Runs the GA, handing the best tour to `reporter` after each generation.
    pub fn run_with_reporter<W: Reporter>(
        instance: &Instance,
        population: Population,
        config: &AtspConfig,
        cancel: Option<Arc<AtomicBool>>,
        reporter: &mut W,
    ) -> AtspResult {
        let mut rng = seeded_rng(config);
        drive(instance, population, config, cancel, reporter, &mut rng)
    }
}

fn seeded_rng(config: &AtspConfig) -> impl Rng {
    match config.seed {
        Some(seed) => create_rng(seed),
        None => create_rng(rand::random()),
    }
}

fn drive<W: Reporter, R: Rng>(
    instance: &Instance,
    population: Population,
    config: &AtspConfig,
    cancel: Option<Arc<AtomicBool>>,
    reporter: &mut W,
    rng: &mut R,
) -> AtspResult {
    let mut evolution = Evolution::new(instance, population, config);
    let started = Instant::now();

    evolution.evaluate(rng);
    let (mut best_tour, mut best_cost) = current_best(&evolution);
    let mut cost_history = Vec::new();
    cost_history.push(best_cost);

    let mut cancelled = false;
    let mut timed_out = false;

    while evolution.generation() < config.max_generations {
        if let Some(ref flag) = cancel {
            if flag.load(Ordering::Relaxed) {
                cancelled = true;
                break;
            }
        }
        if let Some(limit) = config.time_limit_ms {
            if started.elapsed().as_millis() >= u128::from(limit) {
                timed_out = true;
                break;
            }
        }

        let stats = evolution.step(rng);

        for &(slot, cost) in &stats.replaced {
            if cost < best_cost {
                best_cost = cost;
                best_tour = evolution.population().get(slot).genes().to_vec();
            }
        }
        cost_history.push(best_cost);
        reporter.on_generation(&stats, &best_tour, best_cost);
    }

    evolution.evaluate(rng);
    let generations = evolution.generation();

    tracing::info!(
        generations,
        best_cost,
        cancelled,
        timed_out,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "evolution finished"
    );

    let result = AtspResult {
        best_tour,
        best_cost,
        generations,
        cancelled,
        timed_out,
        cost_history,
        population: evolution.into_population(),
    };
    reporter.on_finish(&result);
    result
}

/// Best tour of a freshly evaluated population.
fn current_best(evolution: &Evolution<'_>) -> (Vec<usize>, u64) {
    let population = evolution.population();
    let slot = population.best().unwrap_or(0);
    let ind = population.get(slot);
    (ind.genes().to_vec(), ind.cost().unwrap_or(u64::MAX))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ga::FitnessPolicy;
    use crate::instance::INFINITE_COST;

    const INF: u64 = INFINITE_COST;

    fn ring5() -> Instance {
        Instance::new(vec![
            vec![INF, 100, 3, 3, 100],
            vec![100, INF, 100, 3, 3],
            vec![3, 100, INF, 100, 3],
            vec![3, 3, 100, INF, 100],
            vec![100, 3, 3, 100, INF],
        ])
        .unwrap()
    }

    fn seed_population() -> Population {
        Population::from_tours(
            5,
            vec![
                vec![0, 1, 2, 3, 4],
                vec![1, 2, 3, 4, 0],
                vec![2, 3, 4, 0, 1],
                vec![3, 4, 0, 1, 2],
                vec![4, 0, 1, 2, 3],
                vec![3, 2, 1, 0, 4],
                vec![2, 1, 0, 3, 4],
                vec![1, 0, 4, 3, 2],
                vec![0, 4, 3, 1, 2],
                vec![0, 1, 2, 3, 4],
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_step_replaces_least_fit() {
        let instance = ring5();
        let config = AtspConfig::default();
        let mut rng = create_rng(42);
        let mut evolution = Evolution::new(&instance, seed_population(), &config);

        evolution.evaluate(&mut rng);
        let victim = least_fit(evolution.population()).unwrap();

        let stats = evolution.step(&mut rng);
        assert_eq!(stats.replaced.len(), 1);
        assert_eq!(stats.replaced[0].0, victim);
        assert_ne!(stats.parents.0, stats.parents.1);
        assert!(!evolution.population().get(victim).is_evaluated());
        assert_eq!(evolution.population().len(), 10);
    }

    #[test]
    fn test_step_multiple_children_distinct_slots() {
        let instance = ring5();
        let config = AtspConfig::turnover();
        let mut rng = create_rng(42);
        let mut evolution = Evolution::new(&instance, seed_population(), &config);

        for _ in 0..50 {
            let stats = evolution.step(&mut rng);
            assert_eq!(stats.replaced.len(), 5);
            let mut slots: Vec<usize> = stats.replaced.iter().map(|&(s, _)| s).collect();
            slots.sort_unstable();
            slots.dedup();
            assert_eq!(slots.len(), 5, "slots replaced twice: {:?}", stats.replaced);
        }
        assert_eq!(evolution.generation(), 50);
    }

    #[test]
    fn test_children_are_valid_tours() {
        let instance = ring5();
        let config = AtspConfig::default().with_mutation_rate(1.0);
        let mut rng = create_rng(7);
        let mut evolution = Evolution::new(&instance, seed_population(), &config);

        for _ in 0..200 {
            let stats = evolution.step(&mut rng);
            assert_eq!(stats.mutated, 1);
            for &(slot, cost) in &stats.replaced {
                let genes = evolution.population().get(slot).genes();
                assert!(instance.is_valid_tour(genes));
                assert_eq!(cost, instance.tour_cost(genes));
            }
        }
    }

    #[test]
    fn test_invalid_seeds_are_driven_out() {
        let instance = ring5();
        let config = AtspConfig::default();
        let mut rng = create_rng(3);
        let population = Population::from_tours(
            5,
            vec![
                vec![0, 0, 0, 0, 0],
                vec![1, 1, 1, 1, 1],
                vec![0, 1, 2, 3, 4],
                vec![4, 4, 4, 4, 4],
                vec![2, 2, 3, 3, 4],
                vec![0, 1, 2, 3, 3],
                vec![4, 3, 2, 1, 0],
                vec![0, 0, 1, 1, 2],
                vec![3, 3, 3, 3, 3],
                vec![9, 9, 9, 9, 9],
            ],
        )
        .unwrap();
        let mut evolution = Evolution::new(&instance, population, &config);

        for _ in 0..200 {
            evolution.step(&mut rng);
        }
        evolution.evaluate(&mut rng);

        for ind in evolution.population().individuals() {
            assert!(instance.is_valid_tour(ind.genes()), "invalid survivor {:?}", ind.genes());
        }
    }

    #[test]
    #[should_panic(expected = "population size must match config.population_size")]
    fn test_population_size_mismatch_panics() {
        let instance = ring5();
        let config = AtspConfig::default().with_population_size(12);
        Evolution::new(&instance, seed_population(), &config);
    }

    #[test]
    #[should_panic(expected = "tour length must match instance size")]
    fn test_tour_length_mismatch_panics() {
        let instance = Instance::new(vec![vec![0, 1], vec![1, 0]]).unwrap();
        let config = AtspConfig::default();
        Evolution::new(&instance, seed_population(), &config);
    }

    #[test]
    fn test_runner_finds_ring_optimum() {
        let instance = ring5();

        for seed in 1..=5 {
            let config = AtspConfig::turnover().with_seed(seed);
            let result = AtspRunner::run_with_population(&instance, seed_population(), &config);

            assert_eq!(result.generations, 1000);
            assert!(instance.is_valid_tour(&result.best_tour));
            assert_eq!(instance.tour_cost(&result.best_tour), result.best_cost);
            assert_eq!(result.best_cost, 15, "seed {seed}");
            assert!(result.population.individuals().iter().all(|i| i.is_evaluated()));

            let final_best = result.population.best().unwrap();
            assert_eq!(result.population.get(final_best).cost(), Some(15), "seed {seed}");
        }
    }

    #[test]
    fn test_history_non_increasing() {
        let instance = ring5();
        let config = AtspConfig::default().with_max_generations(100).with_seed(1);

        let result = AtspRunner::run_with_population(&instance, seed_population(), &config);

        assert_eq!(result.cost_history.len(), 101);
        for window in result.cost_history.windows(2) {
            assert!(window[1] <= window[0], "best cost went up: {window:?}");
        }
        assert_eq!(*result.cost_history.last().unwrap(), result.best_cost);
    }

    #[test]
    fn test_same_seed_same_result() {
        let instance = ring5();
        let config = AtspConfig::default()
            .with_max_generations(200)
            .with_fitness_policy(FitnessPolicy::Ratio)
            .with_seed(99);

        let a = AtspRunner::run_with_population(&instance, seed_population(), &config);
        let b = AtspRunner::run_with_population(&instance, seed_population(), &config);

        assert_eq!(a.best_tour, b.best_tour);
        assert_eq!(a.cost_history, b.cost_history);
        assert_eq!(a.population, b.population);
    }

    #[test]
    fn test_cancellation_before_start() {
        let instance = ring5();
        let config = AtspConfig::default().with_seed(42);
        let cancel = Arc::new(AtomicBool::new(true));

        let result =
            AtspRunner::run_with_cancel(&instance, seed_population(), &config, Some(cancel));

        assert!(result.cancelled);
        assert_eq!(result.generations, 0);
        assert_eq!(result.cost_history.len(), 1);
    }

    #[test]
    fn test_time_limit() {
        let instance = ring5();
        let config = AtspConfig::default()
            .with_max_generations(usize::MAX)
            .with_time_limit_ms(20)
            .with_seed(42);

        let result = AtspRunner::run_with_population(&instance, seed_population(), &config);

        assert!(result.timed_out);
        assert!(result.generations > 0);
    }

    #[derive(Default)]
    struct Recorder {
        generations: Vec<usize>,
        costs: Vec<u64>,
        finished: bool,
    }

    impl Reporter for Recorder {
        fn on_generation(&mut self, stats: &GenerationStats, best: &[usize], best_cost: u64) {
            self.generations.push(stats.generation);
            self.costs.push(best_cost);
            assert_eq!(best.len(), 5);
        }

        fn on_finish(&mut self, _result: &AtspResult) {
            self.finished = true;
        }
    }

    #[test]
    fn test_reporter_called_every_generation() {
        let instance = ring5();
        let config = AtspConfig::default().with_max_generations(30).with_seed(5);
        let mut recorder = Recorder::default();

        let result = AtspRunner::run_with_reporter(
            &instance,
            seed_population(),
            &config,
            None,
            &mut recorder,
        );

        assert_eq!(recorder.generations, (1..=30).collect::<Vec<_>>());
        assert_eq!(recorder.costs, result.cost_history[1..].to_vec());
        assert!(recorder.finished);
    }

    #[test]
    fn test_run_from_random_population() {
        let instance = ring5();
        let config = AtspConfig::default().with_max_generations(300).with_seed(11);
        let result = AtspRunner::run(&instance, &config);

        assert!(instance.is_valid_tour(&result.best_tour));
        assert_eq!(result.population.len(), 10);
        assert!(result.best_cost >= 15);
    }
}
