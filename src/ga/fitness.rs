//! Fitness evaluation.
//!
//! Fitness is a non-negative integer weight used only for parent sampling.
//! Lower tour cost never yields a lower weight. Two policies are available:
//!
//! - [`FitnessPolicy::CostInverse`]: `fitness_i = Σ cost − cost_i`.
//! - [`FitnessPolicy::Ratio`]: `fitness_i = ⌊avg / cost_i⌋`, rounded up with
//!   probability driven by the fractional part.
//!
//! Both feed the same [`CumulativeFitness`] table of raw running sums, so the
//! selector always draws on the integer scale `[0, total)`.
//!
//! When every weight comes out as zero (a single-individual population, or
//! every tour costs 0) each individual falls back to weight 1.

use super::population::{Individual, Population};
use crate::instance::Instance;
use rand::Rng;

/// How tour costs are turned into selection weights.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FitnessPolicy {
    /// `fitness_i = Σ cost − cost_i`.
    ///
    /// Deterministic. Differences between individuals are small relative
    /// to the total, so selection pressure is mild.
    #[default]
    CostInverse,

    /// `ratio_i = avg / cost_i`, stochastically rounded.
    ///
    /// The integer part is kept and one is added when
    /// `frac(ratio_i) * 10 >= t`, where `t` is drawn uniformly from `1..=10`
    /// once per evaluation round. Sharing `t` across the round keeps the
    /// weights monotonic in cost. A cost of 0 is divided as if it were 1.
    Ratio,
}

impl FitnessPolicy {
    /// Computes one weight per cost.
    ///
    /// Never returns an all-zero vector for non-empty input.
    pub fn assign<R: Rng>(&self, costs: &[u64], rng: &mut R) -> Vec<u64> {
        if costs.is_empty() {
            return Vec::new();
        }

        let total_cost = costs.iter().fold(0u64, |acc, &c| acc.saturating_add(c));

        let weights: Vec<u64> = match self {
            FitnessPolicy::CostInverse => costs.iter().map(|&c| total_cost - c).collect(),
            FitnessPolicy::Ratio => {
                let avg = total_cost as f64 / costs.len() as f64;
                let threshold = rng.random_range(1..=10u32) as f64;
                costs
                    .iter()
                    .map(|&c| {
                        let ratio = avg / c.max(1) as f64;
                        let whole = ratio.floor();
                        let round_up = (ratio - whole) * 10.0 >= threshold;
                        whole as u64 + u64::from(round_up)
                    })
                    .collect()
            }
        };

        if weights.iter().all(|&w| w == 0) {
            tracing::warn!(
                policy = ?self,
                individuals = costs.len(),
                "total fitness is zero, falling back to uniform weights"
            );
            return vec![1; costs.len()];
        }

        weights
    }
}

/// Running sums of fitness, used for proportional sampling.
///
/// Entry `i` is the sum of the weights of individuals `0..=i`. The table is
/// non-decreasing and its last entry is the total fitness.
///
/// ```
/// use u_atsp::ga::CumulativeFitness;
///
/// let table = CumulativeFitness::from_fitness(&[3, 0, 5]);
/// assert_eq!(table.as_slice(), &[3, 3, 8]);
/// assert_eq!(table.total(), 8);
/// assert_eq!(table.locate(2), 0);
/// assert_eq!(table.locate(3), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CumulativeFitness {
    sums: Vec<u64>,
}

impl CumulativeFitness {
    /// Builds the table from per-individual weights.
    pub fn from_fitness(fitness: &[u64]) -> Self {
        let sums = fitness
            .iter()
            .scan(0u64, |acc, &w| {
                *acc = acc.saturating_add(w);
                Some(*acc)
            })
            .collect();
        Self { sums }
    }

    /// Sum of all weights.
    pub fn total(&self) -> u64 {
        self.sums.last().copied().unwrap_or(0)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.sums.len()
    }

    /// Returns `true` if the table has no entries.
    pub fn is_empty(&self) -> bool {
        self.sums.is_empty()
    }

    /// The running sums.
    pub fn as_slice(&self) -> &[u64] {
        &self.sums
    }

    /// Index of the first entry whose running sum exceeds `draw`.
    ///
    /// For `draw` in `[0, total)` this is the individual owning that unit of
    /// weight. Larger draws map to the last index.
    ///
    /// # Panics
    /// Panics if the table is empty.
    pub fn locate(&self, draw: u64) -> usize {
        assert!(!self.sums.is_empty(), "cannot sample from empty table");
        self.sums
            .partition_point(|&s| s <= draw)
            .min(self.sums.len() - 1)
    }
}

/// Evaluates every individual and returns the sampling table.
///
/// Refreshes each individual's cached cost and fitness. Invalid gene
/// sequences are priced at the instance sentinel.
pub fn evaluate<R: Rng>(
    population: &mut Population,
    instance: &Instance,
    policy: FitnessPolicy,
    parallel: bool,
    rng: &mut R,
) -> CumulativeFitness {
    compute_costs(population.individuals_mut(), instance, parallel);

    let costs: Vec<u64> = population
        .individuals()
        .iter()
        .map(|ind| ind.cost().unwrap_or(instance.sentinel()))
        .collect();

    let weights = policy.assign(&costs, rng);
    for (ind, &w) in population.individuals_mut().iter_mut().zip(&weights) {
        ind.set_fitness(w);
    }

    CumulativeFitness::from_fitness(&weights)
}

#[cfg(feature = "parallel")]
fn compute_costs(individuals: &mut [Individual], instance: &Instance, parallel: bool) {
    use rayon::prelude::*;

    if parallel {
        individuals.par_iter_mut().for_each(|ind| {
            let cost = instance.tour_cost(ind.genes());
            ind.set_cost(cost);
        });
    } else {
        compute_costs_sequential(individuals, instance);
    }
}

#[cfg(not(feature = "parallel"))]
fn compute_costs(individuals: &mut [Individual], instance: &Instance, _parallel: bool) {
    compute_costs_sequential(individuals, instance);
}

fn compute_costs_sequential(individuals: &mut [Individual], instance: &Instance) {
    for ind in individuals.iter_mut() {
        let cost = instance.tour_cost(ind.genes());
        ind.set_cost(cost);
    }
}

// ============================================================================
// Tests
// ============================================================================
