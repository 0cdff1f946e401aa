//! Training progress logging.
//!
//! [`TrainingLogger`] filters messages by [`Verbosity`] and forwards them to
//! the `log` facade; the binary installs `env_logger` as the backend.

use std::time::Instant;

/// How much training progress to report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Hash)]
pub enum Verbosity {
    /// Nothing.
    #[default]
    Silent,
    /// Aborted regions and other anomalies.
    Warning,
    /// One line per discovered function and per finalized region.
    Info,
    /// Per-region guard statistics.
    Debug,
}

/// Verbosity-gated progress reporter.
#[derive(Debug)]
pub struct TrainingLogger {
    verbosity: Verbosity,
    started: Option<Instant>,
}

impl TrainingLogger {
    pub fn new(verbosity: Verbosity) -> Self {
        Self { verbosity, started: None }
    }

    #[inline]
    pub fn verbosity(&self) -> Verbosity {
        self.verbosity
    }

    #[inline]
    pub fn enabled(&self, level: Verbosity) -> bool {
        level != Verbosity::Silent && self.verbosity >= level
    }

    pub fn start_training(&mut self, n_samples: usize, n_features: usize) {
        self.started = Some(Instant::now());
        if self.enabled(Verbosity::Info) {
            log::info!("training on {n_samples} samples with {n_features} features");
        }
    }

    pub fn log_function(&self, index: usize, newly_covered: usize, remaining: usize) {
        if self.enabled(Verbosity::Info) {
            log::info!("[function {index}] covers {newly_covered} new points, {remaining} uncovered");
        }
    }

    pub fn log_region(&self, index: usize, positives: usize, negatives: usize) {
        if self.enabled(Verbosity::Info) {
            log::info!("[region {index}] {positives} positive / {negatives} negative labels");
        }
    }

    pub fn log_guard(&self, index: usize, rounds: usize, splits: usize, clauses: usize, terms: usize) {
        if self.enabled(Verbosity::Debug) {
            log::debug!("[region {index}] guard after {rounds} rounds, {splits} splits: {clauses} clauses, {terms} terms");
        }
    }

    pub fn info(&self, message: impl std::fmt::Display) {
        if self.enabled(Verbosity::Info) {
            log::info!("{message}");
        }
    }

    pub fn warn(&self, message: impl std::fmt::Display) {
        if self.enabled(Verbosity::Warning) {
            log::warn!("{message}");
        }
    }

    pub fn finish_training(&self, n_regions: usize) {
        if self.enabled(Verbosity::Info) {
            let elapsed = self.started.map(|t| t.elapsed().as_secs_f64()).unwrap_or_default();
            log::info!("finished: {n_regions} regions in {elapsed:.2}s");
        }
    }
}
