//! The approximate ball-tree index: farthest-pair-split construction plus
//! branch-and-bound search.

mod builder;
mod node;
mod search;

pub use node::BallNode;
pub use search::BallTreeSearch;

use cbir_kernel::{Error, FeatureRecord, Result};
use parking_lot::RwLock;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::strategy::{require_nonempty_query, Buildable, Capabilities, Searchable};

/// Capability descriptor for [`BallTreeIndex`].
pub const CAPABILITIES: Capabilities = Capabilities {
    insertable: false,
    buildable: true,
    searchable: true,
};

/// Default leaf size (spec.md §4.4).
pub const DEFAULT_LEAF_SIZE: usize = 50;

/// Configuration for [`BallTreeIndex::build`]: the maximum number of
/// records a leaf may hold, and the seed used for the random pole
/// selection and degenerate-split fallback, so construction is
/// reproducible.
#[derive(Debug, Clone, Copy)]
pub struct BallTreeBuilder {
    leaf_size: usize,
    seed: u64,
}

impl Default for BallTreeBuilder {
    fn default() -> Self {
        Self {
            leaf_size: DEFAULT_LEAF_SIZE,
            seed: 0,
        }
    }
}

impl BallTreeBuilder {
    /// Builds a configuration with an explicit `leaf_size` and RNG `seed`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if `leaf_size` is zero.
    pub fn new(leaf_size: usize, seed: u64) -> Result<Self> {
        if leaf_size == 0 {
            return Err(Error::InvalidArgument("leaf_size must be positive".to_string()));
        }
        Ok(Self { leaf_size, seed })
    }
}

/// An approximate ball-tree index searched with [`BallTreeSearch`].
///
/// Effectively immutable post-build: a `build` call constructs an entirely
/// new tree and publishes it with a single write to the guarding lock.
pub struct BallTreeIndex {
    root: RwLock<Option<BallNode>>,
    config: BallTreeBuilder,
}

impl BallTreeIndex {
    /// Creates an empty, unbuilt index configured by `config`.
    #[must_use]
    pub fn new(config: BallTreeBuilder) -> Self {
        Self {
            root: RwLock::new(None),
            config,
        }
    }

    /// Whether the index has completed at least one build.
    #[must_use]
    pub fn is_built(&self) -> bool {
        self.root.read().is_some()
    }

    /// The total number of records in the tree, or 0 if unbuilt.
    #[must_use]
    pub fn size(&self) -> usize {
        self.root.read().as_ref().map_or(0, |root| root.all_records().len())
    }
}

impl Default for BallTreeIndex {
    fn default() -> Self {
        Self::new(BallTreeBuilder::default())
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

impl Buildable for BallTreeIndex {
    fn build(&mut self, records: Vec<FeatureRecord>) -> Result<()> {
        let dimension = common_dimension(&records)?;
        ftlog::debug!(
            "ball-tree index: build requested with {} records, leaf_size {}",
            records.len(),
            self.config.leaf_size
        );

        let mut rng = StdRng::seed_from_u64(self.config.seed);
        let new_root = match dimension {
            Some(d) => builder::build(records, d, self.config.leaf_size, &mut rng),
            None => None,
        };

        *self.root.write() = new_root;
        Ok(())
    }
}

impl Searchable for BallTreeIndex {
    fn query(&self, query: &[f64], k: usize) -> Result<Vec<FeatureRecord>> {
        require_nonempty_query(query)?;
        if k == 0 {
            return Err(Error::InvalidArgument("k must be positive".to_string()));
        }

        let root_guard = self.root.read();
        let Some(root) = root_guard.as_ref() else {
            return Err(Error::IndexNotReady);
        };

        let clamped_k = k.min(root.all_records().len());
        if clamped_k == 0 {
            return Ok(Vec::new());
        }

        let searcher = BallTreeSearch;
        searcher.search(root, query, clamped_k)
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
        let index = BallTreeIndex::default();
        assert!(matches!(index.query(&[1.0, 2.0], 1), Err(Error::IndexNotReady)));
    }

    #[test]
    fn zero_leaf_size_is_rejected() {
        assert!(BallTreeBuilder::new(0, 0).is_err());
    }

    #[test]
    fn k_is_clamped_to_index_size() {
        let mut index = BallTreeIndex::default();
        index
            .build(vec![rec("a", &[1.0, 0.0]), rec("b", &[0.0, 1.0])])
            .unwrap();

        let results = index.query(&[1.0, 0.0], 50).unwrap();
        assert_eq!(results.len(), 2);
    }

    #[test]
    fn deterministic_given_fixed_seed() {
        let config = BallTreeBuilder::new(2, 99).unwrap();
        let records: Vec<_> = (0..40).map(|i| rec(&format!("r{i}"), &[i as f64, (i % 7) as f64])).collect();

        let mut first = BallTreeIndex::new(config);
        first.build(records.clone()).unwrap();
        let mut second = BallTreeIndex::new(config);
        second.build(records).unwrap();

        let q = [12.0, 3.0];
        let a: Vec<_> = first.query(&q, 5).unwrap().into_iter().map(|r| r.id().to_string()).collect();
        let b: Vec<_> = second.query(&q, 5).unwrap().into_iter().map(|r| r.id().to_string()).collect();
        assert_eq!(a, b);
    }
}
