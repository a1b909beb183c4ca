//! The uniform operation surface shared by every index strategy.
//!
//! Rather than a closed enum of strategies dispatched by a runtime tag, the
//! strategy surface is expressed as three narrow traits plus a
//! compile-time [`Capabilities`] descriptor. A caller who wants to choose
//! among strategies at runtime holds a `Box<dyn Searchable>` (and, where
//! relevant, a `Box<dyn Insertable>`) and consults `capabilities()` to
//! decide which operations are safe to call — no reflection is needed
//! because every concrete type publishes its own capabilities as an
//! associated constant.

use cbir_kernel::{FeatureRecord, Result};

/// Which of the three operations a concrete index type supports.
///
/// This is a plain data descriptor, not a trait object query: every index
/// type exposes its own `CAPABILITIES` constant, so a caller can pick a
/// strategy before ever constructing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    /// Whether [`Insertable::insert`] is supported without a full rebuild.
    pub insertable: bool,
    /// Whether [`Buildable::build`] is supported.
    pub buildable: bool,
    /// Whether [`Searchable::query`] is supported.
    pub searchable: bool,
}

/// An index that can be (re)built from a batch of records.
///
/// A `build` call replaces any prior contents atomically with respect to
/// concurrent queries — see the per-index documentation for the exact
/// publication discipline.
pub trait Buildable {
    /// Replaces the index's contents with `records`.
    ///
    /// # Errors
    ///
    /// Returns [`cbir_kernel::Error::DimensionMismatch`] if `records` do
    /// not share a common dimension.
    fn build(&mut self, records: Vec<FeatureRecord>) -> Result<()>;
}

/// An index that supports appending a single record without a rebuild.
pub trait Insertable {
    /// Appends `record` to the index.
    ///
    /// # Errors
    ///
    /// Returns [`cbir_kernel::Error::DimensionMismatch`] if `record`'s
    /// dimension disagrees with the index's existing records.
    fn insert(&self, record: FeatureRecord) -> Result<()>;
}

/// An index that can answer k-nearest-neighbor queries.
pub trait Searchable {
    /// Returns up to `k` records nearest to `query`, in ascending distance
    /// order under the index's configured metric.
    ///
    /// # Errors
    ///
    /// Returns [`cbir_kernel::Error::InvalidArgument`] if `query` is empty
    /// or `k == 0`, and [`cbir_kernel::Error::IndexNotReady`] if the index
    /// has never been built (linear indexes never return this — an empty
    /// but initialized store simply yields no results).
    fn query(&self, query: &[f64], k: usize) -> Result<Vec<FeatureRecord>>;
}

pub(crate) fn require_nonempty_query(query: &[f64]) -> Result<()> {
    if query.is_empty() {
        Err(cbir_kernel::Error::InvalidArgument(
            "query vector must not be empty".to_string(),
        ))
    } else {
        Ok(())
    }
}

pub(crate) fn require_positive_k(k: usize) -> Result<()> {
    if k == 0 {
        Err(cbir_kernel::Error::InvalidArgument(
            "k must be positive".to_string(),
        ))
    } else {
        Ok(())
    }
}
