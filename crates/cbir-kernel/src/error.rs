//! The error taxonomy shared by every index strategy.

/// The uniform set of failure kinds surfaced at the public boundary.
///
/// Internal numerical edge cases (zero-norm vectors, floating-point drift
/// out of `[-1, 1]` in cosine similarity) are absorbed locally with defined
/// semantics and never produce an `Error` — see [`crate::vector::cosine_distance`].
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// A null/empty vector, a non-positive `k`, a non-positive constructor
    /// parameter, or some other malformed argument.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Two vectors (or a query and an index) disagree on dimension.
    #[error("dimension mismatch: expected {expected}, found {found}")]
    DimensionMismatch {
        /// The dimension the operation expected.
        expected: usize,
        /// The dimension actually supplied.
        found: usize,
    },

    /// A query was issued against a tree or LSH index before it was built.
    #[error("index not ready: no build has completed yet")]
    IndexNotReady,
}

/// The result type used throughout the kernel and index crates.
pub type Result<T> = core::result::Result<T, Error>;
