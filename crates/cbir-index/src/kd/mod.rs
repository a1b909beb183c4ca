//! The approximate KD-tree index: median-split construction plus bounded
//! best-bin-first search.

mod builder;
mod node;
mod search;

pub use node::KdNode;
pub use search::{BestBinFirst, KdMetric};

use cbir_kernel::{Error, FeatureRecord, Result};
use parking_lot::RwLock;

use crate::strategy::{require_nonempty_query, require_positive_k, Buildable, Capabilities, Searchable};

/// Capability descriptor for [`KdTreeIndex`].
pub const CAPABILITIES: Capabilities = Capabilities {
    insertable: false,
    buildable: true,
    searchable: true,
};

/// An approximate KD-tree index searched with [`BestBinFirst`].
///
/// The index is effectively immutable once built: a `build` call
/// constructs an entirely new tree and publishes it with a single write to
/// the guarding lock, so concurrent queries never observe a partially
/// constructed tree. Queries before the first `build` fail with
/// [`Error::IndexNotReady`].
pub struct KdTreeIndex {
    root: RwLock<Option<KdNode>>,
    dimension: RwLock<Option<usize>>,
    searcher: BestBinFirst,
}

impl KdTreeIndex {
    /// Creates an empty, unbuilt index that searches with `searcher`.
    #[must_use]
    pub fn new(searcher: BestBinFirst) -> Self {
        Self {
            root: RwLock::new(None),
            dimension: RwLock::new(None),
            searcher,
        }
    }

    /// Whether the index has completed at least one build.
    #[must_use]
    pub fn is_built(&self) -> bool {
        self.root.read().is_some()
    }
}

impl Default for KdTreeIndex {
    fn default() -> Self {
        Self::new(BestBinFirst::default())
    }
}

fn common_dimension(records: &[FeatureRecord]) -> Result<Option<usize>> {
    let Some(first) = records.first() else {
        return Ok(None);
    };
    let expected = first.dimension();
    for record in records {
        if record.dimension() != expected {
            return Err(Error::DimensionMismatch {
                expected,
                found: record.dimension(),
            });
        }
    }
    Ok(Some(expected))
}

impl Buildable for KdTreeIndex {
    fn build(&mut self, records: Vec<FeatureRecord>) -> Result<()> {
        let dimension = common_dimension(&records)?;
        ftlog::debug!("kd-tree index: build requested with {} records", records.len());

        let new_root = match dimension {
            Some(d) => builder::build(records, d),
            None => None,
        };

        *self.dimension.write() = dimension;
        *self.root.write() = new_root;
        Ok(())
    }
}

impl Searchable for KdTreeIndex {
    fn query(&self, query: &[f64], k: usize) -> Result<Vec<FeatureRecord>> {
        require_nonempty_query(query)?;
        require_positive_k(k)?;

        let root_guard = self.root.read();
        let Some(root) = root_guard.as_ref() else {
            return Err(Error::IndexNotReady);
        };

        self.searcher.search(root, query, k)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(id: &str, v: &[f64]) -> FeatureRecord {
        FeatureRecord::new(id, v.to_vec()).unwrap()
    }

    #[test]
    fn query_before_build_is_not_ready() {
        let index = KdTreeIndex::default();
        assert!(matches!(index.query(&[1.0, 2.0], 1), Err(Error::IndexNotReady)));
    }

    #[test]
    fn mismatched_dimensions_are_rejected() {
        let mut index = KdTreeIndex::default();
        let records = vec![rec("a", &[1.0, 2.0]), rec("b", &[1.0, 2.0, 3.0])];
        assert!(matches!(index.build(records), Err(Error::DimensionMismatch { .. })));
    }

    #[test]
    fn build_then_query_round_trips() {
        let mut index = KdTreeIndex::default();
        let records = vec![
            rec("a", &[1.0, 0.0]),
            rec("b", &[0.0, 1.0]),
            rec("c", &[5.0, 5.0]),
        ];
        index.build(records).unwrap();
        assert!(index.is_built());

        let results = index.query(&[1.0, 0.0], 1).unwrap();
        assert_eq!(results[0].id(), "a");
    }

    #[test]
    fn rebuild_replaces_prior_contents() {
        let mut index = KdTreeIndex::default();
        index.build(vec![rec("a", &[1.0, 0.0])]).unwrap();
        index.build(vec![rec("b", &[0.0, 1.0])]).unwrap();

        let results = index.query(&[0.0, 1.0], 1).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].id(), "b");
    }
}
