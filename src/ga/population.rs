//! Population store.
//!
//! A [`Population`] is a fixed number of [`Individual`] slots. Slots are
//! never inserted or removed: a generation replaces the genes of a slot in
//! place and the previous occupant is dropped.
//!
//! Each individual caches its tour cost and fitness. Both caches are
//! cleared whenever the genes change and are refilled by
//! [`evaluate`](super::fitness::evaluate).

use rand::Rng;
use thiserror::Error;

/// Errors raised when seeding a [`Population`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PopulationError {
    #[error("population must contain at least one individual")]
    Empty,
    #[error("individual {index} has {found} genes, expected {expected}")]
    WrongLength {
        index: usize,
        expected: usize,
        found: usize,
    },
}

/// One candidate tour.
///
/// `genes` is a permutation of `0..n` when valid. Invalid gene sequences
/// are allowed; they are priced at the instance sentinel and selection
/// pressure drives them out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Individual {
    genes: Vec<usize>,
    cost: Option<u64>,
    fitness: Option<u64>,
}

impl Individual {
    /// Creates an unevaluated individual.
    pub fn new(genes: Vec<usize>) -> Self {
        Self {
            genes,
            cost: None,
            fitness: None,
        }
    }

    /// The visiting order.
    pub fn genes(&self) -> &[usize] {
        &self.genes
    }

    /// Cached tour cost, `None` until evaluated.
    pub fn cost(&self) -> Option<u64> {
        self.cost
    }

    /// Cached fitness, `None` until evaluated.
    pub fn fitness(&self) -> Option<u64> {
        self.fitness
    }

    /// Returns `true` if both caches reflect the current genes.
    pub fn is_evaluated(&self) -> bool {
        self.cost.is_some() && self.fitness.is_some()
    }

    pub(crate) fn set_cost(&mut self, cost: u64) {
        self.cost = Some(cost);
    }

    pub(crate) fn set_fitness(&mut self, fitness: u64) {
        self.fitness = Some(fitness);
    }

    /// Installs new genes and clears the caches.
    fn rebirth(&mut self, genes: Vec<usize>) {
        self.genes = genes;
        self.cost = None;
        self.fitness = None;
    }
}

/// Fixed-size collection of individuals over an `n`-node instance.
///
/// # Examples
///
/// ```
/// use u_atsp::ga::Population;
///
/// let population = Population::from_tours(3, vec![
///     vec![0, 1, 2],
///     vec![2, 1, 0],
/// ]).unwrap();
///
/// assert_eq!(population.len(), 2);
/// assert_eq!(population.tour_len(), 3);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Population {
    tour_len: usize,
    individuals: Vec<Individual>,
}

impl Population {
    /// Seeds a population from explicit gene sequences.
    ///
    /// Every sequence must have exactly `n` genes. Values need not form a
    /// permutation.
    pub fn from_tours(n: usize, tours: Vec<Vec<usize>>) -> Result<Self, PopulationError> {
        if tours.is_empty() {
            return Err(PopulationError::Empty);
        }
        if let Some((index, tour)) = tours.iter().enumerate().find(|(_, t)| t.len() != n) {
            return Err(PopulationError::WrongLength {
                index,
                expected: n,
                found: tour.len(),
            });
        }

        Ok(Self {
            tour_len: n,
            individuals: tours.into_iter().map(Individual::new).collect(),
        })
    }

    /// Seeds `size` uniformly shuffled permutations of `0..n`.
    ///
    /// # Panics
    /// Panics if `size == 0`.
    pub fn random<R: Rng>(size: usize, n: usize, rng: &mut R) -> Self {
        assert!(size > 0, "population must contain at least one individual");
        let individuals = (0..size)
            .map(|_| {
                let mut genes: Vec<usize> = (0..n).collect();
                u_numflow::random::shuffle(&mut genes, &mut *rng);
                Individual::new(genes)
            })
            .collect();
        Self {
            tour_len: n,
            individuals,
        }
    }

    /// Number of individuals.
    pub fn len(&self) -> usize {
        self.individuals.len()
    }

    /// Returns `true` if there are no individuals. Constructors never produce one.
    pub fn is_empty(&self) -> bool {
        self.individuals.is_empty()
    }

    /// Number of genes per individual.
    pub fn tour_len(&self) -> usize {
        self.tour_len
    }

    /// All individuals, in slot order.
    pub fn individuals(&self) -> &[Individual] {
        &self.individuals
    }

    pub(crate) fn individuals_mut(&mut self) -> &mut [Individual] {
        &mut self.individuals
    }

    /// The individual in `slot`.
    ///
    /// # Panics
    /// Panics if `slot` is out of range.
    pub fn get(&self, slot: usize) -> &Individual {
        &self.individuals[slot]
    }

    /// Replaces the genes of `slot`, dropping the previous occupant's genes.
    ///
    /// # Panics
    /// Panics if `slot` is out of range or `genes` has the wrong length.
    pub fn replace(&mut self, slot: usize, genes: Vec<usize>) {
        assert_eq!(genes.len(), self.tour_len, "child has wrong length");
        self.individuals[slot].rebirth(genes);
    }

    /// Index of the evaluated individual with the lowest cost.
    ///
    /// Ties go to the lowest index. Returns `None` if no individual has
    /// a cached cost.
    pub fn best(&self) -> Option<usize> {
        self.individuals
            .iter()
            .enumerate()
            .filter_map(|(i, ind)| ind.cost.map(|c| (i, c)))
            .fold(None, |best: Option<(usize, u64)>, (i, c)| match best {
                Some((_, bc)) if bc <= c => best,
                _ => Some((i, c)),
            })
            .map(|(i, _)| i)
    }

    /// Mean cached cost over evaluated individuals, `None` if none are.
    pub fn average_cost(&self) -> Option<f64> {
        let costs: Vec<u64> = self.individuals.iter().filter_map(|i| i.cost).collect();
        if costs.is_empty() {
            return None;
        }
        Some(costs.iter().map(|&c| c as f64).sum::<f64>() / costs.len() as f64)
    }
}
