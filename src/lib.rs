#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![deny(unreachable_pub)]
#![deny(clippy::correctness)]
#![deny(clippy::suspicious)]
#![deny(clippy::style)]
#![deny(clippy::complexity)]
#![deny(clippy::perf)]
#![deny(clippy::pedantic)]
#![deny(clippy::std_instead_of_core)]

//! Patience-based early stopping for iterative training loops.
//!
//! A training loop feeds one "lower is better" measurement (typically
//! validation loss) per evaluation cycle into an [`EarlyStopping`] policy;
//! the policy tracks the best value seen so far and answers whether training
//! should halt because the metric has not improved for `patience`
//! consecutive cycles. An optional callback fires on every new best, which
//! is the natural place to hang a checkpoint save.
//!
//! # Getting Started
//!
//! ```
//! use early_stopping::EarlyStopping;
//!
//! let mut policy = EarlyStopping::builder()
//!     .patience(3)
//!     .delta(0.01)
//!     .on_improvement(|| println!("new best — checkpoint here"))
//!     .build()
//!     .unwrap();
//!
//! for val_loss in [0.9, 0.7, 0.71, 0.72, 0.72] {
//!     if policy.evaluate(val_loss) {
//!         println!("stopping early");
//!         break;
//!     }
//! }
//! assert!(policy.is_stopped());
//! ```
//!
//! # Core Concepts
//!
//! | Type | Role |
//! |------|------|
//! | [`EarlyStopping`] | The stopping policy: one `evaluate` call per cycle, `true` means halt. |
//! | [`EarlyStoppingBuilder`] | Fluent configuration: patience, delta, verbosity, hooks. |
//! | [`TraceFn`] | Injected sink for human-readable counter-progress messages. |
//! | [`ImprovementFn`] | Zero-argument hook fired whenever a new best is recorded. |
//!
//! # Semantics
//!
//! Observations are negated internally so improvement is always "score went
//! up by at least `delta`". The first observation records the baseline (and
//! fires the improvement hook); each later observation either beats
//! `best + delta` and resets the counter, or increments it. Reaching
//! `patience` is terminal: `evaluate` keeps returning `true` afterwards
//! without mutating any state, until [`reset`](EarlyStopping::reset).
//!
//! NaN observations pass through standard float comparison rules: they are
//! never improvements, so they increment the counter.
//!
//! # Feature Flags
//!
//! | Flag | What it enables | Default |
//! |------|----------------|---------|
//! | `tracing` | Structured log events via [`tracing`](https://docs.rs/tracing) on baseline, improvement, and stop | off |

/// Emit a `tracing::info!` event when the `tracing` feature is enabled.
/// No-op otherwise.
#[cfg(feature = "tracing")]
macro_rules! trace_info {
    ($($arg:tt)*) => { tracing::info!($($arg)*) };
}

#[cfg(not(feature = "tracing"))]
macro_rules! trace_info {
    ($($arg:tt)*) => {};
}

/// Emit a `tracing::debug!` event when the `tracing` feature is enabled.
/// No-op otherwise.
#[cfg(feature = "tracing")]
macro_rules! trace_debug {
    ($($arg:tt)*) => { tracing::debug!($($arg)*) };
}

#[cfg(not(feature = "tracing"))]
macro_rules! trace_debug {
    ($($arg:tt)*) => {};
}

mod error;
mod stopping;

pub use error::{Error, Result};
pub use stopping::{EarlyStopping, EarlyStoppingBuilder, ImprovementFn, TraceFn};

/// Convenient wildcard import for the most common types.
///
/// ```
/// use early_stopping::prelude::*;
/// ```
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::stopping::{EarlyStopping, EarlyStoppingBuilder, ImprovementFn, TraceFn};
}
