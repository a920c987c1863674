//! Steady-state genetic algorithm for the ATSP.
//!
//! Each generation evaluates the population, draws two distinct parents
//! proportionally to fitness, builds one or more children with a greedy
//! cost-aware crossover, mutates them with a small probability, and
//! overwrites the least-fit individuals in place. The population size never
//! changes.
//!
//! # Key Types
//!
//! - [`AtspConfig`]: Algorithm parameters (population size, children per
//!   generation, mutation rate, fitness policy, stop conditions)
//! - [`Population`] / [`Individual`]: Fixed-size store with cached cost and fitness
//! - [`Evolution`]: Performs one generation at a time
//! - [`AtspRunner`]: Runs an [`Evolution`] to completion and returns an [`AtspResult`]
//!
//! # Operators
//!
//! - [`evaluate`] / [`FitnessPolicy`] / [`CumulativeFitness`]: fitness and sampling table
//! - [`sample`] / [`least_fit`]: parent and victim selection
//! - [`greedy_crossover`] / [`swap_mutation`]: variation
//!
//! # References
//!
//! - Whitley (1989), "The GENITOR Algorithm and Selection Pressure"
//! - Syswerda (1991), "A Study of Reproduction in Generational and
//!   Steady-State Genetic Algorithms"

mod config;
mod fitness;
mod operators;
mod population;
mod runner;
mod selection;

pub use config::AtspConfig;
pub use fitness::{evaluate, CumulativeFitness, FitnessPolicy};
pub use operators::{greedy_crossover, swap_mutation};
pub use population::{Individual, Population, PopulationError};
pub use runner::{AtspResult, AtspRunner, Evolution, GenerationStats};
pub use selection::{least_fit, sample};
