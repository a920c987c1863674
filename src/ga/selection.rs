//! Parent and victim selection.
//!
//! Parents are drawn proportionally to fitness from a
//! [`CumulativeFitness`] table. The individual to be replaced is the one
//! with the lowest fitness.
//!
//! # References
//!
//! - Goldberg (1989), *Genetic Algorithms in Search, Optimization, and
//!   Machine Learning*, roulette wheel selection
//! - Syswerda (1991), "A Study of Reproduction in Generational and
//!   Steady-State Genetic Algorithms"

use super::fitness::CumulativeFitness;
use super::population::Population;
use rand::Rng;

/// Draws an index with probability proportional to its fitness.
///
/// A uniform draw in `[0, total)` is located in the cumulative table. If
/// the result equals `excluded`, the draw is repeated up to `max_attempts`
/// times in total; after that the smallest index other than `excluded` is
/// returned.
///
/// # Panics
/// Panics if the table is empty, or if `excluded` is the only index.
///
/// # Examples
///
/// ```
/// use u_atsp::ga::{sample, CumulativeFitness};
///
/// let table = CumulativeFitness::from_fitness(&[5, 5, 5]);
/// let mut rng = u_numflow::random::create_rng(1);
///
/// let first = sample(&table, None, 64, &mut rng);
/// let second = sample(&table, Some(first), 64, &mut rng);
/// assert_ne!(first, second);
/// ```
pub fn sample<R: Rng>(
    table: &CumulativeFitness,
    excluded: Option<usize>,
    max_attempts: usize,
    rng: &mut R,
) -> usize {
    let n = table.len();
    assert!(n > 0, "cannot select from empty population");
    if let Some(ex) = excluded {
        assert!(
            n > 1 || ex != 0,
            "cannot exclude the only individual in the population"
        );
    }

    let total = table.total();
    for _ in 0..max_attempts.max(1) {
        let idx = if total == 0 {
            rng.random_range(0..n)
        } else {
            table.locate(rng.random_range(0..total))
        };
        if Some(idx) != excluded {
            return idx;
        }
    }

    let fallback = if excluded == Some(0) { 1 } else { 0 };
    tracing::trace!(
        excluded,
        max_attempts,
        fallback,
        "restricted sampling exhausted its attempts"
    );
    fallback
}

/// Index of the evaluated individual with the lowest fitness.
///
/// Ties go to the lowest index. Individuals whose caches were cleared by a
/// replacement are skipped, so repeated calls within one generation never
/// pick a freshly inserted child. Returns `None` if no individual has a
/// cached fitness.
pub fn least_fit(population: &Population) -> Option<usize> {
    population
        .individuals()
        .iter()
        .enumerate()
        .filter_map(|(i, ind)| ind.fitness().map(|f| (i, f)))
        .fold(None, |worst: Option<(usize, u64)>, (i, f)| match worst {
            Some((_, wf)) if wf <= f => worst,
            _ => Some((i, f)),
        })
        .map(|(i, _)| i)
}
