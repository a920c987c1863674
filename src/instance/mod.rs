//! ATSP problem instances.
//!
//! An [`Instance`] is an immutable N×N matrix of directed edge costs.
//! `cost(i, j)` may differ from `cost(j, i)`. The diagonal always holds the
//! instance's sentinel cost, a value larger than any feasible tour, so a
//! self-loop is never an attractive extension.
//!
//! Instances are usually read from TSPLIB files via [`tsplib`], but can be
//! built directly from a nested `Vec` for tests and embedded problems.

pub mod tsplib;

use thiserror::Error;

/// Lower bound for the sentinel cost.
///
/// Invalid tours and self-loops are priced at the instance sentinel,
/// which is never below this value.
pub const INFINITE_COST: u64 = 999_999;

/// Errors raised when building an [`Instance`] from a raw matrix.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InstanceError {
    #[error("cost matrix must have at least one row")]
    Empty,
    #[error("cost matrix row {row} has {found} entries, expected {expected}")]
    NotSquare {
        row: usize,
        expected: usize,
        found: usize,
    },
}

/// An ATSP instance: `size` nodes and a directed cost matrix.
///
/// # Examples
///
/// ```
/// use u_atsp::instance::{Instance, INFINITE_COST};
///
/// let instance = Instance::new(vec![
///     vec![0, 2, 9],
///     vec![1, 0, 6],
///     vec![15, 7, 0],
/// ]).unwrap();
///
/// assert_eq!(instance.size(), 3);
/// assert_eq!(instance.edge_cost(0, 0), INFINITE_COST);
/// assert_eq!(instance.tour_cost(&[0, 1, 2]), 2 + 6 + 15);
/// assert_eq!(instance.tour_cost(&[0, 0, 2]), INFINITE_COST);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Instance {
    size: usize,
    costs: Vec<u64>,
    sentinel: u64,
}

impl Instance {
    /// Builds an instance from a square matrix.
    ///
    /// Diagonal entries are overwritten with the sentinel cost.
    pub fn new(matrix: Vec<Vec<u64>>) -> Result<Self, InstanceError> {
        let size = matrix.len();
        if size == 0 {
            return Err(InstanceError::Empty);
        }

        let mut costs = Vec::with_capacity(size * size);
        for (row, values) in matrix.into_iter().enumerate() {
            if values.len() != size {
                return Err(InstanceError::NotSquare {
                    row,
                    expected: size,
                    found: values.len(),
                });
            }
            costs.extend(values);
        }

        Ok(Self::from_row_major(size, costs))
    }

    /// Builds an instance from `size * size` row-major costs.
    ///
    /// # Panics
    /// Panics if `costs.len() != size * size` or `size == 0`.
    pub(crate) fn from_row_major(size: usize, mut costs: Vec<u64>) -> Self {
        assert!(size > 0, "instance must have at least one node");
        assert_eq!(costs.len(), size * size, "cost matrix must be square");

        // Any tour leaves every node exactly once, so the sum of the most
        // expensive outgoing edge per row bounds every feasible tour.
        let bound = (0..size)
            .map(|i| {
                (0..size)
                    .filter(|&j| j != i)
                    .map(|j| costs[i * size + j])
                    .max()
                    .unwrap_or(0)
            })
            .fold(0u64, |acc, c| acc.saturating_add(c))
            .saturating_add(1);
        let sentinel = bound.max(INFINITE_COST);

        for i in 0..size {
            costs[i * size + i] = sentinel;
        }

        Self {
            size,
            costs,
            sentinel,
        }
    }

    /// Number of nodes.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Cost assigned to invalid tours and self-loops.
    pub fn sentinel(&self) -> u64 {
        self.sentinel
    }

    /// Directed cost of the edge `from -> to`.
    ///
    /// # Panics
    /// Panics if either node is out of range.
    #[inline]
    pub fn edge_cost(&self, from: usize, to: usize) -> u64 {
        assert!(from < self.size && to < self.size, "node out of range");
        self.costs[from * self.size + to]
    }

    /// Returns `true` if `tour` contains every node of `0..size` exactly once.
    pub fn is_valid_tour(&self, tour: &[usize]) -> bool {
        if tour.len() != self.size {
            return false;
        }
        let mut seen = vec![false; self.size];
        for &node in tour {
            if node >= self.size || seen[node] {
                return false;
            }
            seen[node] = true;
        }
        true
    }

    /// Total cost of the closed tour, or the sentinel if `tour` is invalid.
    ///
    /// The tour is cyclic: the last node connects back to the first, so any
    /// rotation of the same tour has the same cost. A single-node tour has
    /// no edges and costs 0.
    pub fn tour_cost(&self, tour: &[usize]) -> u64 {
        if !self.is_valid_tour(tour) {
            return self.sentinel;
        }
        if self.size == 1 {
            return 0;
        }
        let n = tour.len();
        (0..n)
            .map(|i| self.costs[tour[i] * self.size + tour[(i + 1) % n]])
            .sum()
    }
}

// ============================================================================
// Tests
// ============================================================================
