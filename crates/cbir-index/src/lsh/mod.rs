//! The LSH (random-projection) index: `L` independent tables, each hashing
//! on `K` sign bits, ranked by exact cosine distance among the union of
//! candidate buckets.

mod table;

use std::collections::HashSet;

use cbir_kernel::{vector, Error, FeatureRecord, Result};
use parking_lot::RwLock;
use rand::rngs::StdRng;
use rand::SeedableRng;

use table::LshTable;

use crate::strategy::{require_nonempty_query, require_positive_k, Buildable, Capabilities, Searchable};
use crate::utils::SizedHeap;

/// Capability descriptor for [`LshIndex`].
///
/// LSH does not support insert: the random projections are calibrated at
/// build time, and re-hashing a single new record under the same
/// projections without disturbing the rest of the index is possible but
/// not offered here, to keep the index's semantics clean (spec.md §4.6).
pub const CAPABILITIES: Capabilities = Capabilities {
    insertable: false,
    buildable: true,
    searchable: true,
};

/// Default number of tables (spec.md §4.6).
pub const DEFAULT_L: usize = 10;
/// Default number of bits per table (spec.md §4.6).
pub const DEFAULT_K: usize = 8;

/// Configuration for [`LshIndex`]: `l` independent tables of `k` bits each,
/// drawn from a caller-supplied RNG seed so construction is reproducible.
#[derive(Debug, Clone, Copy)]
pub struct LshConfig {
    l: usize,
    k: usize,
    seed: u64,
}

impl Default for LshConfig {
    fn default() -> Self {
        Self {
            l: DEFAULT_L,
            k: DEFAULT_K,
            seed: 0,
        }
    }
}

impl LshConfig {
    /// Builds a configuration with `l` tables of `k` bits each, seeded by
    /// `seed`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if `l` or `k` is zero.
    pub fn new(l: usize, k: usize, seed: u64) -> Result<Self> {
        if l == 0 {
            return Err(Error::InvalidArgument("l (number of tables) must be positive".to_string()));
        }
        if k == 0 {
            return Err(Error::InvalidArgument("k (bits per table) must be positive".to_string()));
        }
        Ok(Self { l, k, seed })
    }
}

/// An approximate LSH index over random-projection sign hashes.
///
/// Effectively immutable post-build: a `build` call draws `l` fresh tables
/// and publishes them with a single write to the guarding lock, so a
/// concurrent query never observes a half-populated table set.
pub struct LshIndex {
    tables: RwLock<Option<Vec<LshTable>>>,
    config: LshConfig,
}

impl LshIndex {
    /// Creates an empty, unbuilt index configured by `config`.
    #[must_use]
    pub fn new(config: LshConfig) -> Self {
        Self {
            tables: RwLock::new(None),
            config,
        }
    }

    /// Whether the index has completed at least one build.
    #[must_use]
    pub fn is_built(&self) -> bool {
        self.tables.read().is_some()
    }
}

impl Default for LshIndex {
    fn default() -> Self {
        Self::new(LshConfig::default())
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

impl Buildable for LshIndex {
    /// Builds `l` tables, each drawing `k` fresh random-projection vectors
    /// from an independent slice of the configured RNG and hashing every
    /// record of `records` into its induced bucket (spec.md §4.6). Every
    /// feature ends up in exactly one bucket per table.
    fn build(&mut self, records: Vec<FeatureRecord>) -> Result<()> {
        let dimension = common_dimension(&records)?;
        ftlog::debug!(
            "lsh index: build requested with {} records, l={}, k={}",
            records.len(),
            self.config.l,
            self.config.k
        );

        let new_tables = dimension.map(|dimension| {
            let mut rng = StdRng::seed_from_u64(self.config.seed);
            (0..self.config.l)
                .map(|_| {
                    let mut table = LshTable::new_with_random_projections(self.config.k, dimension, &mut rng);
                    table.insert_all(&records);
                    table
                })
                .collect::<Vec<_>>()
        });

        *self.tables.write() = new_tables;
        Ok(())
    }
}

impl Searchable for LshIndex {
    /// Normalizes a copy of `query`, collects the union of bucket contents
    /// across every table, deduplicates by identifier, ranks the
    /// candidates by exact cosine distance, and returns the top `k`
    /// (spec.md §4.6). Returns an empty list if no table yields a
    /// candidate.
    fn query(&self, query: &[f64], k: usize) -> Result<Vec<FeatureRecord>> {
        require_nonempty_query(query)?;
        require_positive_k(k)?;

        let tables_guard = self.tables.read();
        let Some(tables) = tables_guard.as_ref() else {
            return Err(Error::IndexNotReady);
        };

        let normalized_query = vector::normalized_copy(query)?;

        let mut seen = HashSet::new();
        let mut candidates = Vec::new();
        for table in tables {
            for record in table.bucket_for(&normalized_query) {
                if seen.insert(record.id().to_string()) {
                    candidates.push(record.clone());
                }
            }
        }

        if candidates.is_empty() {
            return Ok(Vec::new());
        }

        let mut heap: SizedHeap<FeatureRecord> = SizedHeap::new(k);
        for record in candidates {
            let distance = vector::cosine_distance(&normalized_query, record.vector())?;
            heap.push(record, distance);
        }

        Ok(heap.into_sorted_vec().into_iter().map(|(record, _)| record).collect())
    }
}
