//! A single LSH table: `K` random-projection hyperplanes and the bucket
//! map they induce.

use std::collections::HashMap;

use cbir_kernel::{vector, FeatureRecord};
use rand::rngs::StdRng;
use rand_distr::{Distribution, StandardNormal};

/// One LSH table: a `K x D` matrix of L2-normalized random projection
/// vectors, and a map from `K`-bit signature strings to the features that
/// hash into that bucket.
pub(crate) struct LshTable {
    projections: Vec<Vec<f64>>,
    buckets: HashMap<String, Vec<FeatureRecord>>,
}

impl LshTable {
    /// Draws `k` random Gaussian projection vectors of dimension
    /// `dimension` from `rng`, L2-normalizes each, and returns an empty
    /// table ready to be populated by [`LshTable::insert_all`].
    pub(crate) fn new_with_random_projections(k: usize, dimension: usize, rng: &mut StdRng) -> Self {
        let projections = (0..k)
            .map(|_| {
                let mut row: Vec<f64> = (0..dimension).map(|_| StandardNormal.sample(rng)).collect();
                vector::normalize(&mut row).expect("projection row has the caller-supplied dimension, never empty");
                row
            })
            .collect();

        Self {
            projections,
            buckets: HashMap::new(),
        }
    }

    /// Computes the `K`-bit signature of `v` under this table's
    /// projections: `'1'` if the dot product with a projection row is
    /// `>= 0`, else `'0'`.
    fn signature(&self, v: &[f64]) -> String {
        self.projections
            .iter()
            .map(|row| {
                let dot: f64 = row.iter().zip(v.iter()).map(|(a, b)| a * b).sum();
                if dot >= 0.0 {
                    '1'
                } else {
                    '0'
                }
            })
            .collect()
    }

    /// Inserts every record of `records` into its bucket, normalizing a
    /// copy of each record's vector first (never mutating the caller's
    /// data) if it is not already unit-length.
    pub(crate) fn insert_all(&mut self, records: &[FeatureRecord]) {
        for record in records {
            let normalized = normalized_for_hashing(record);
            let key = self.signature(&normalized);
            self.buckets.entry(key).or_default().push(record.clone());
        }
    }

    /// Returns the bucket `query` (already normalized) hashes into.
    pub(crate) fn bucket_for(&self, normalized_query: &[f64]) -> &[FeatureRecord] {
        let key = self.signature(normalized_query);
        self.buckets.get(&key).map_or(&[], Vec::as_slice)
    }

    /// Total number of features across every bucket of this table —
    /// used to verify the bucket-count invariant (spec.md testable
    /// property 12).
    #[cfg(test)]
    pub(crate) fn total_bucket_size(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }
}

/// Normalizes a copy of `record`'s vector for hashing, without mutating
/// the caller's stored vector.
pub(crate) fn normalized_for_hashing(record: &FeatureRecord) -> Vec<f64> {
    vector::normalized_copy(record.vector()).expect("record vectors are validated non-empty at construction")
}
