#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Returned when `patience` is zero.
    #[error("invalid patience: {patience} must be at least 1")]
    InvalidPatience {
        /// The rejected patience value.
        patience: u64,
    },

    /// Returned when `delta` is NaN or infinite.
    #[error("non-finite delta: {delta} cannot participate in improvement comparisons")]
    NonFiniteDelta {
        /// The rejected delta value.
        delta: f64,
    },
}

pub type Result<T> = core::result::Result<T, Error>;
