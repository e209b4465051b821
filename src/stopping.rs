//! The [`EarlyStopping`] policy and its builder.

use crate::error::{Error, Result};

/// Sink for human-readable progress messages.
///
/// Receives one formatted string per non-improving evaluation cycle when
/// `verbose` is enabled. Defaults to stdout.
pub type TraceFn = Box<dyn FnMut(&str)>;

/// Zero-argument hook fired whenever a new best score is recorded,
/// including on the very first observation.
///
/// The typical use is saving a checkpoint of the training state; the policy
/// itself never touches storage.
pub type ImprovementFn = Box<dyn FnMut()>;

const DEFAULT_PATIENCE: u64 = 7;

fn default_trace() -> TraceFn {
    Box::new(|msg: &str| println!("{msg}"))
}

/// Stops training when a monitored metric has not improved for `patience`
/// consecutive evaluation cycles.
///
/// The caller supplies a "lower is better" quantity (e.g. validation loss)
/// once per cycle via [`evaluate`](EarlyStopping::evaluate). Internally the
/// value is negated so that improvement is uniformly "score went up by at
/// least `delta`". An observation that fails to clear the margin increments
/// a counter; once the counter reaches `patience`, `evaluate` returns `true`
/// and the policy stays stopped.
///
/// A single instance serves a single sequential stream of observations. It
/// is mutated through `&mut self`; callers that share one across threads
/// must wrap it in a lock.
///
/// # Examples
///
/// ```
/// use early_stopping::EarlyStopping;
///
/// let mut policy = EarlyStopping::builder().patience(2).build().unwrap();
///
/// assert!(!policy.evaluate(0.5)); // baseline
/// assert!(!policy.evaluate(0.6)); // no improvement, counter = 1
/// assert!(policy.evaluate(0.6)); // counter = 2 → stop
/// ```
pub struct EarlyStopping {
    /// Tolerated consecutive non-improving cycles before stopping.
    patience: u64,
    /// Minimum score margin for an observation to count as an improvement.
    delta: f64,
    /// Whether counter progress is reported to the trace sink.
    verbose: bool,
    /// Consecutive non-improving cycles since the last recorded improvement.
    counter: u64,
    /// Best internal (negated) score seen so far; `None` before the first call.
    best_score: Option<f64>,
    /// Terminal flag; once set it never clears except via [`reset`](Self::reset).
    stopped: bool,
    on_improvement: Option<ImprovementFn>,
    trace: TraceFn,
}

impl EarlyStopping {
    /// Create a policy with the default configuration: `patience = 7`,
    /// `delta = 0.0`, `verbose = false`, no improvement callback, and a
    /// stdout trace sink.
    #[must_use]
    pub fn new() -> Self {
        Self {
            patience: DEFAULT_PATIENCE,
            delta: 0.0,
            verbose: false,
            counter: 0,
            best_score: None,
            stopped: false,
            on_improvement: None,
            trace: default_trace(),
        }
    }

    /// Return an [`EarlyStoppingBuilder`] for constructing a policy with a
    /// fluent API.
    ///
    /// # Examples
    ///
    /// ```
    /// use early_stopping::EarlyStopping;
    ///
    /// let policy = EarlyStopping::builder()
    ///     .patience(10)
    ///     .delta(1e-4)
    ///     .verbose(true)
    ///     .build()
    ///     .unwrap();
    /// assert_eq!(policy.patience(), 10);
    /// ```
    #[must_use]
    pub fn builder() -> EarlyStoppingBuilder {
        EarlyStoppingBuilder {
            patience: DEFAULT_PATIENCE,
            delta: 0.0,
            verbose: false,
            on_improvement: None,
            trace: None,
        }
    }

    /// Observe one evaluation-cycle measurement and decide whether to stop.
    ///
    /// `value` is "lower is better" (a loss-like quantity). Returns `true`
    /// when patience is exhausted; the decision is terminal, so every later
    /// call also returns `true` without further state changes.
    ///
    /// The first call ever records `-value` as the baseline, fires the
    /// improvement callback if one is configured, and returns `false`.
    ///
    /// NaN observations are never improvements (every float comparison with
    /// NaN is false) and therefore increment the counter.
    ///
    /// State updates happen strictly before the callback and trace sink are
    /// invoked, so a panicking hook unwinds with the policy's state already
    /// consistent.
    pub fn evaluate(&mut self, value: f64) -> bool {
        if self.stopped {
            return true;
        }

        let score = -value;

        let Some(best) = self.best_score else {
            self.best_score = Some(score);
            trace_debug!(score, "baseline recorded");
            if let Some(hook) = self.on_improvement.as_mut() {
                hook();
            }
            return false;
        };

        // Improvement means clearing the margin by at least `delta`; a tie at
        // exactly `best + delta` counts. NaN fails the comparison and falls
        // through to the non-improving path.
        if score >= best + self.delta {
            self.best_score = Some(score);
            self.counter = 0;
            trace_debug!(score, "new best score");
            if let Some(hook) = self.on_improvement.as_mut() {
                hook();
            }
            return false;
        }

        self.counter += 1;
        trace_debug!(counter = self.counter, patience = self.patience, "no improvement");
        if self.verbose {
            let msg = format!(
                "EarlyStopping counter: {} out of {}",
                self.counter, self.patience
            );
            (self.trace)(&msg);
        }
        if self.counter >= self.patience {
            self.stopped = true;
            trace_info!(patience = self.patience, "patience exhausted, stopping");
            return true;
        }
        false
    }

    /// The configured patience.
    #[must_use]
    pub fn patience(&self) -> u64 {
        self.patience
    }

    /// The configured improvement margin.
    #[must_use]
    pub fn delta(&self) -> f64 {
        self.delta
    }

    /// Consecutive non-improving cycles since the last improvement.
    #[must_use]
    pub fn counter(&self) -> u64 {
        self.counter
    }

    /// Whether patience has been exhausted.
    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    /// The best internal (negated) score observed so far.
    #[must_use]
    pub fn best_score(&self) -> Option<f64> {
        self.best_score
    }

    /// The best observed input value, i.e. the lowest loss seen so far.
    #[must_use]
    pub fn best_value(&self) -> Option<f64> {
        self.best_score.map(|score| -score)
    }

    /// Clear the counter, best score, and stopped flag so the policy can be
    /// reused across training restarts. Configuration and hooks are kept.
    pub fn reset(&mut self) {
        self.counter = 0;
        self.best_score = None;
        self.stopped = false;
    }
}

impl Default for EarlyStopping {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Debug for EarlyStopping {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("EarlyStopping")
            .field("patience", &self.patience)
            .field("delta", &self.delta)
            .field("verbose", &self.verbose)
            .field("counter", &self.counter)
            .field("best_score", &self.best_score)
            .field("stopped", &self.stopped)
            .field("on_improvement", &self.on_improvement.is_some())
            .finish_non_exhaustive()
    }
}

/// A builder for constructing [`EarlyStopping`] policies with a fluent API.
///
/// Created via [`EarlyStopping::builder()`].
///
/// # Defaults
///
/// - Patience: `7`
/// - Delta: `0.0`
/// - Verbose: `false`
/// - Improvement callback: none
/// - Trace sink: stdout via `println!`
///
/// # Examples
///
/// ```
/// use early_stopping::EarlyStopping;
///
/// let policy = EarlyStopping::builder()
///     .patience(5)
///     .delta(0.001)
///     .on_improvement(|| { /* save a checkpoint */ })
///     .build()
///     .unwrap();
/// assert!(!policy.is_stopped());
/// ```
pub struct EarlyStoppingBuilder {
    patience: u64,
    delta: f64,
    verbose: bool,
    on_improvement: Option<ImprovementFn>,
    trace: Option<TraceFn>,
}

impl EarlyStoppingBuilder {
    /// Set how many consecutive non-improving cycles to tolerate before
    /// stopping. Must be at least 1.
    #[must_use]
    pub fn patience(mut self, patience: u64) -> Self {
        self.patience = patience;
        self
    }

    /// Set the minimum margin an observation must clear, in internal score
    /// space, to count as an improvement. Must be finite; negative values
    /// are accepted and make the comparison more lenient.
    #[must_use]
    pub fn delta(mut self, delta: f64) -> Self {
        self.delta = delta;
        self
    }

    /// Enable or disable counter-progress messages on the trace sink.
    #[must_use]
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Set the callback fired on every recorded improvement, including the
    /// first observation.
    #[must_use]
    pub fn on_improvement(mut self, hook: impl FnMut() + 'static) -> Self {
        self.on_improvement = Some(Box::new(hook));
        self
    }

    /// Set the destination for human-readable progress messages.
    ///
    /// Defaults to stdout if not specified.
    #[must_use]
    pub fn trace(mut self, sink: impl FnMut(&str) + 'static) -> Self {
        self.trace = Some(Box::new(sink));
        self
    }

    /// Build the [`EarlyStopping`] policy with the configured options.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPatience`] if `patience` is zero and
    /// [`Error::NonFiniteDelta`] if `delta` is NaN or infinite.
    pub fn build(self) -> Result<EarlyStopping> {
        if self.patience == 0 {
            return Err(Error::InvalidPatience {
                patience: self.patience,
            });
        }
        if !self.delta.is_finite() {
            return Err(Error::NonFiniteDelta { delta: self.delta });
        }

        let trace = self.trace.unwrap_or_else(default_trace);

        Ok(EarlyStopping {
            patience: self.patience,
            delta: self.delta,
            verbose: self.verbose,
            counter: 0,
            best_score: None,
            stopped: false,
            on_improvement: self.on_improvement,
            trace,
        })
    }
}

#[cfg(test)]
mod tests {
    use core::cell::Cell;
    use std::rc::Rc;

    use super::*;

    fn policy(patience: u64) -> EarlyStopping {
        EarlyStopping::builder()
            .patience(patience)
            .build()
            .expect("valid configuration")
    }

    #[test]
    fn first_call_records_baseline() {
        let mut policy = policy(3);
        assert!(!policy.evaluate(0.45));
        assert_eq!(policy.best_score(), Some(-0.45));
        assert_eq!(policy.best_value(), Some(0.45));
        assert_eq!(policy.counter(), 0);
    }

    #[test]
    fn stops_after_exactly_patience_cycles() {
        let mut policy = policy(3);
        assert!(!policy.evaluate(1.0)); // baseline
        assert!(!policy.evaluate(1.1)); // counter=1
        assert!(!policy.evaluate(1.1)); // counter=2
        assert!(policy.evaluate(1.1)); // counter=3 → stop
        assert_eq!(policy.counter(), 3);
        assert!(policy.is_stopped());
    }

    #[test]
    fn improvement_resets_counter() {
        let mut policy = policy(3);
        policy.evaluate(1.0); // baseline
        policy.evaluate(1.1); // counter=1
        policy.evaluate(1.2); // counter=2
        assert!(!policy.evaluate(0.5)); // improvement → reset
        assert_eq!(policy.counter(), 0);
        assert_eq!(policy.best_score(), Some(-0.5));
    }

    #[test]
    fn tie_with_zero_delta_counts_as_improvement() {
        // An observation landing exactly on `best + delta` clears the
        // margin, so a repeat of the current best resets the counter.
        let mut policy = policy(3);
        policy.evaluate(1.0); // baseline
        policy.evaluate(1.1); // counter=1
        assert!(!policy.evaluate(1.0)); // tie with best → improvement
        assert_eq!(policy.counter(), 0);
        assert_eq!(policy.best_score(), Some(-1.0));
    }

    #[test]
    fn delta_margin_is_enforced() {
        let mut policy = EarlyStopping::builder()
            .patience(5)
            .delta(0.1)
            .build()
            .unwrap();

        policy.evaluate(-5.0); // baseline score 5.0
        assert!(!policy.evaluate(-5.05)); // score 5.05 < 5.0 + 0.1 → no improvement
        assert_eq!(policy.counter(), 1);
        assert!(!policy.evaluate(-5.2)); // score 5.2 ≥ 5.0 + 0.1 → improvement
        assert_eq!(policy.counter(), 0);
        assert_eq!(policy.best_score(), Some(5.2));
    }

    #[test]
    fn callback_fires_on_baseline_and_improvements_only() {
        let calls = Rc::new(Cell::new(0));
        let counter = Rc::clone(&calls);
        let mut policy = EarlyStopping::builder()
            .patience(5)
            .on_improvement(move || counter.set(counter.get() + 1))
            .build()
            .unwrap();

        policy.evaluate(1.0); // baseline → fires
        assert_eq!(calls.get(), 1);
        policy.evaluate(1.1); // no improvement
        assert_eq!(calls.get(), 1);
        policy.evaluate(0.5); // improvement → fires
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn terminal_state_is_idempotent() {
        let mut policy = policy(1);
        policy.evaluate(1.0); // baseline
        assert!(policy.evaluate(1.5)); // counter=1 → stop

        // Further calls keep returning true and leave the state alone,
        // even for values that would otherwise be improvements.
        assert!(policy.evaluate(0.1));
        assert_eq!(policy.best_score(), Some(-1.0));
        assert_eq!(policy.counter(), 1);
    }

    #[test]
    fn nan_observation_is_never_an_improvement() {
        let mut policy = policy(2);
        policy.evaluate(1.0); // baseline
        assert!(!policy.evaluate(f64::NAN)); // counter=1
        assert_eq!(policy.counter(), 1);
        assert_eq!(policy.best_score(), Some(-1.0));
    }

    #[test]
    fn reset_restores_pristine_state() {
        let mut policy = policy(1);
        policy.evaluate(1.0);
        assert!(policy.evaluate(1.5));

        policy.reset();
        assert!(!policy.is_stopped());
        assert_eq!(policy.counter(), 0);
        assert_eq!(policy.best_score(), None);
        assert!(!policy.evaluate(2.0)); // fresh baseline
        assert_eq!(policy.best_score(), Some(-2.0));
    }

    #[test]
    fn zero_patience_is_rejected() {
        let err = EarlyStopping::builder().patience(0).build().unwrap_err();
        assert!(matches!(err, Error::InvalidPatience { patience: 0 }));
    }

    #[test]
    fn non_finite_delta_is_rejected() {
        let err = EarlyStopping::builder().delta(f64::NAN).build().unwrap_err();
        assert!(matches!(err, Error::NonFiniteDelta { .. }));

        let err = EarlyStopping::builder()
            .delta(f64::INFINITY)
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::NonFiniteDelta { .. }));
    }

    #[test]
    fn negative_delta_is_accepted() {
        let mut policy = EarlyStopping::builder()
            .patience(3)
            .delta(-0.5)
            .build()
            .unwrap();

        policy.evaluate(1.0); // baseline score -1.0
        // Score -1.2 ≥ -1.0 + (-0.5), so a slightly worse value still
        // counts as an improvement under a negative margin.
        assert!(!policy.evaluate(1.2));
        assert_eq!(policy.counter(), 0);
        assert_eq!(policy.best_score(), Some(-1.2));
    }
}
