//! Steady-state genetic algorithm for the Asymmetric Traveling Salesman Problem.
//!
//! An ATSP instance is an N×N matrix of directed edge costs; a candidate
//! solution is a permutation of the N nodes read as a closed tour. The GA
//! keeps a small fixed-size population and, every generation, replaces its
//! least-fit members with children bred from two fitness-proportionally
//! selected parents.
//!
//! - [`instance`]: Cost matrices, tour validity and tour cost, TSPLIB loading
//! - [`ga`]: Population store, fitness evaluation, selection, crossover,
//!   mutation and the generation loop
//! - [`report`]: Formatting and printing of tours
//!
//! # Quick start
//!
//! ```
//! use u_atsp::ga::{AtspConfig, AtspRunner};
//! use u_atsp::instance::tsplib::parse_tsplib;
//!
//! let instance = parse_tsplib(
//!     "TYPE: ATSP\nDIMENSION: 3\nEDGE_WEIGHT_SECTION\n0 1 9\n9 0 1\n1 9 0\nEOF\n",
//! ).unwrap();
//!
//! let config = AtspConfig::default().with_max_generations(100).with_seed(42);
//! let result = AtspRunner::run(&instance, &config);
//!
//! assert_eq!(result.best_cost, 3);
//! ```

pub mod ga;
pub mod instance;
pub mod report;
