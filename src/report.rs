//! Tour reporting.
//!
//! The GA never prints. Drivers hand a [`Reporter`] to
//! [`AtspRunner::run_with_reporter`](crate::ga::AtspRunner::run_with_reporter),
//! which is called with the best tour after every generation and once more
//! at the end of the run.

use crate::ga::{AtspResult, GenerationStats};
use std::fmt;
use std::io::{self, Write};

/// Receives tours from the runner. Both methods default to no-ops.
pub trait Reporter {
    /// Called after each generation with the best tour found so far.
    fn on_generation(&mut self, _stats: &GenerationStats, _best: &[usize], _best_cost: u64) {}

    /// Called once when the run stops.
    fn on_finish(&mut self, _result: &AtspResult) {}
}

/// A reporter that ignores everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoReport;

impl Reporter for NoReport {}

/// A tour with its precomputed cost, formatted for humans.
///
/// ```
/// use u_atsp::report::TourReport;
///
/// let report = TourReport::new(&[0, 2, 4, 1, 3], 15);
/// assert_eq!(
///     report.to_string(),
///     "Solution: 0 -> 2 -> 4 -> 1 -> 3.\nTotal cost: 15."
/// );
/// ```
#[derive(Debug, Clone, Copy)]
pub struct TourReport<'a> {
    tour: &'a [usize],
    cost: u64,
}

impl<'a> TourReport<'a> {
    pub fn new(tour: &'a [usize], cost: u64) -> Self {
        Self { tour, cost }
    }
}

impl fmt::Display for TourReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Solution: ")?;
        for (i, node) in self.tour.iter().enumerate() {
            if i > 0 {
                write!(f, " -> ")?;
            }
            write!(f, "{node}")?;
        }
        write!(f, ".\nTotal cost: {}.", self.cost)
    }
}

/// Writes tours to any [`Write`] sink, stdout by default.
///
/// Write failures do not interrupt the run: the first error is kept and
/// returned by [`finish`](Self::finish), and nothing more is written.
pub struct ConsoleReporter<W: Write> {
    out: W,
    every_generation: bool,
    error: Option<io::Error>,
}

impl ConsoleReporter<io::Stdout> {
    /// Reporter printing to stdout.
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> ConsoleReporter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            every_generation: false,
            error: None,
        }
    }

    /// Also print the best tour after every generation.
    pub fn with_every_generation(mut self, enabled: bool) -> Self {
        self.every_generation = enabled;
        self
    }

    /// Returns the sink, or the first write error encountered.
    pub fn finish(self) -> io::Result<W> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(self.out),
        }
    }

    fn emit(&mut self, args: fmt::Arguments<'_>) {
        if self.error.is_some() {
            return;
        }
        if let Err(err) = self.out.write_fmt(args) {
            self.error = Some(err);
        }
    }
}

impl<W: Write> Reporter for ConsoleReporter<W> {
    fn on_generation(&mut self, stats: &GenerationStats, best: &[usize], best_cost: u64) {
        if self.every_generation {
            self.emit(format_args!(
                "\n@@@ Generation #{}:\n{}\n",
                stats.generation,
                TourReport::new(best, best_cost)
            ));
        }
    }

    fn on_finish(&mut self, result: &AtspResult) {
        self.emit(format_args!(
            "\nBest after {} generations:\n{}\n",
            result.generations,
            TourReport::new(&result.best_tour, result.best_cost)
        ));
    }
}
