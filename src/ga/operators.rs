//! Permutation operators for the ATSP.
//!
//! # Crossover
//!
//! - [`greedy_crossover`]: builds one child position by position, extending
//!   the partial tour with whichever parent's gene at that position is the
//!   cheaper next hop. No repair step is needed: duplicates are avoided as
//!   the child is built.
//!
//! # Mutation
//!
//! - [`swap_mutation`]: exchange two random positions — O(1)
//!
//! # References
//!
//! - Grefenstette et al. (1985), "Genetic Algorithms for the Traveling
//!   Salesman Problem" (greedy heuristic crossover)

use crate::instance::Instance;
use rand::Rng;

// ============================================================================
// Crossover
// ============================================================================

/// Greedy cost-aware crossover.
///
/// # Algorithm
///
/// 1. Gene 0 comes from `parent1[0]` or `parent2[0]`, chosen by a fair coin.
/// 2. For each position `i >= 1`, the candidates are `parent1[i]` and
///    `parent2[i]`, priced by the edge from the previous child gene.
///    The cheaper candidate wins; on equal cost `parent1` wins.
/// 3. A candidate already in the child (or outside `0..n`) is unavailable.
///    If the preferred candidate is unavailable the other one is used; if
///    both are, the smallest node id not yet in the child is used.
///
/// The child is always a valid permutation of `0..n`, whatever the parents
/// contain.
///
/// # Complexity
/// O(n²) worst case, from the smallest-unused-node fallback.
///
/// # Panics
/// Panics if the parents' lengths differ from the instance size.
///
/// # Examples
///
/// ```
/// use u_atsp::ga::greedy_crossover;
/// use u_atsp::instance::Instance;
///
/// let instance = Instance::new(vec![
///     vec![0, 1, 9, 9],
///     vec![9, 0, 1, 9],
///     vec![9, 9, 0, 1],
///     vec![1, 9, 9, 0],
/// ]).unwrap();
/// let mut rng = u_numflow::random::create_rng(42);
///
/// let child = greedy_crossover(&instance, &[0, 1, 3, 2], &[0, 2, 2, 3], &mut rng);
/// assert_eq!(child, vec![0, 1, 2, 3]);
/// ```
pub fn greedy_crossover<R: Rng>(
    instance: &Instance,
    parent1: &[usize],
    parent2: &[usize],
    rng: &mut R,
) -> Vec<usize> {
    let n = instance.size();
    assert_eq!(parent1.len(), n, "parent1 length must match instance size");
    assert_eq!(parent2.len(), n, "parent2 length must match instance size");

    let mut child = Vec::with_capacity(n);
    let mut used = vec![false; n];

    let (first, other) = if rng.random_bool(0.5) {
        (parent1[0], parent2[0])
    } else {
        (parent2[0], parent1[0])
    };
    let seed = if first < n {
        first
    } else if other < n {
        other
    } else {
        0
    };
    child.push(seed);
    used[seed] = true;

    for i in 1..n {
        let prev = child[i - 1];
        let a = parent1[i];
        let b = parent2[i];

        let a_free = a < n && !used[a];
        let b_free = b < n && !used[b];
        let a_cost = if a < n { instance.edge_cost(prev, a) } else { u64::MAX };
        let b_cost = if b < n { instance.edge_cost(prev, b) } else { u64::MAX };

        let (preferred, preferred_free, fallback, fallback_free) = if a_cost <= b_cost {
            (a, a_free, b, b_free)
        } else {
            (b, b_free, a, a_free)
        };

        let next = if preferred_free {
            preferred
        } else if fallback_free {
            fallback
        } else {
            first_unused(&used).expect("a partial tour always leaves an unused node")
        };

        child.push(next);
        used[next] = true;
    }

    child
}

/// Smallest node id not yet placed in the child.
fn first_unused(used: &[bool]) -> Option<usize> {
    used.iter().position(|&u| !u)
}

// ============================================================================
// Mutation
// ============================================================================

/// Swap mutation: exchange two random positions.
///
/// Both positions are drawn uniformly from `0..n` and may coincide, in
/// which case the tour is unchanged.
///
/// # Complexity
/// O(1)
pub fn swap_mutation<R: Rng>(perm: &mut [usize], rng: &mut R) {
    let n = perm.len();
    if n < 2 {
        return;
    }
    let i = rng.random_range(0..n);
    let j = rng.random_range(0..n);
    perm.swap(i, j);
}

// ============================================================================
// Tests
// ============================================================================
