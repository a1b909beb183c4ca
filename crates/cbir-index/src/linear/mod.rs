//! The exact linear index: an append-only, read-write-locked list of
//! [`FeatureRecord`]s searched by brute-force cosine distance.

use cbir_kernel::{vector, FeatureRecord, Result};
use parking_lot::RwLock;
use rayon::prelude::*;

use crate::strategy::{require_nonempty_query, require_positive_k, Buildable, Capabilities, Insertable, Searchable};

/// Capability descriptor for [`LinearIndex`].
pub const CAPABILITIES: Capabilities = Capabilities {
    insertable: true,
    buildable: true,
    searchable: true,
};

/// An append-only ordered list of [`FeatureRecord`]s guarded by a
/// read-write lock.
///
/// `build` and `insert` take exclusive write access; `query` and `size`
/// take shared read access, so multiple queries may run concurrently and
/// each sees a consistent snapshot of the feature list for its own
/// duration. Ordering is insertion order — it carries no search semantics,
/// but ties in distance are broken by it, matching the order records were
/// added.
#[derive(Default)]
pub struct LinearIndex {
    features: RwLock<Vec<FeatureRecord>>,
}

impl LinearIndex {
    /// Creates an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self {
            features: RwLock::new(Vec::new()),
        }
    }

    /// The number of records currently stored.
    #[must_use]
    pub fn size(&self) -> usize {
        self.features.read().len()
    }

    /// Removes all records from the index.
    pub fn clear(&self) {
        self.features.write().clear();
    }
}

impl Buildable for LinearIndex {
    /// Replaces the index's contents with `records` atomically. An empty
    /// `records` list is permitted and yields an empty index.
    fn build(&mut self, records: Vec<FeatureRecord>) -> Result<()> {
        ftlog::debug!("linear index: building from {} records", records.len());
        *self.features.write() = records;
        Ok(())
    }
}

impl Insertable for LinearIndex {
    fn insert(&self, record: FeatureRecord) -> Result<()> {
        self.features.write().push(record);
        Ok(())
    }
}

impl Searchable for LinearIndex {
    /// Computes cosine distance to every stored record — in parallel via
    /// `rayon` — sorts ascending, and returns the first `k`. An empty
    /// index returns an empty list rather than an error: the linear index
    /// never signals `IndexNotReady`.
    fn query(&self, query: &[f64], k: usize) -> Result<Vec<FeatureRecord>> {
        require_nonempty_query(query)?;
        require_positive_k(k)?;

        let features = self.features.read();
        if features.is_empty() {
            return Ok(Vec::new());
        }

        let mut scored = features
            .par_iter()
            .enumerate()
            .map(|(order, record)| {
                vector::cosine_distance(query, record.vector()).map(|d| (order, d, record.clone()))
            })
            .collect::<Result<Vec<_>>>()?;

        // Stable by insertion order on ties: sort_by is stable, and `order`
        // is the tiebreaker when distances compare equal.
        scored.sort_by(|(oa, da, _), (ob, db, _)| {
            da.partial_cmp(db)
                .unwrap_or(core::cmp::Ordering::Equal)
                .then(oa.cmp(ob))
        });

        Ok(scored.into_iter().take(k).map(|(_, _, record)| record).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(id: &str, v: &[f64]) -> FeatureRecord {
        FeatureRecord::new(id, v.to_vec()).unwrap()
    }

    #[test]
    fn empty_index_returns_no_results() {
        let index = LinearIndex::new();
        assert_eq!(index.size(), 0);
        let results = index.query(&[1.0, 2.0, 3.0], 5).unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn query_requires_nonempty_vector_and_positive_k() {
        let mut index = LinearIndex::new();
        index.build(vec![rec("a", &[1.0, 0.0])]).unwrap();
        assert!(index.query(&[], 1).is_err());
        assert!(index.query(&[1.0, 0.0], 0).is_err());
    }

    #[test]
    fn s1_tie_breaks_by_insertion_order() {
        let mut index = LinearIndex::new();
        index
            .build(vec![
                rec("A", &[1.0, 0.0, 0.0]),
                rec("B", &[0.0, 1.0, 0.0]),
                rec("C", &[0.0, 0.0, 1.0]),
            ])
            .unwrap();

        let results = index.query(&[1.0, 0.0, 0.0], 2).unwrap();
        let ids: Vec<_> = results.iter().map(FeatureRecord::id).collect();
        assert_eq!(ids, vec!["A", "B"]);
    }

    #[test]
    fn s2_ranking_matches_expected_distances() {
        let mut index = LinearIndex::new();
        index
            .build(vec![
                rec("A", &[1.0, 0.0]),
                rec("B", &[0.9, 0.1]),
                rec("C", &[-1.0, 0.0]),
            ])
            .unwrap();

        let results = index.query(&[1.0, 0.0], 3).unwrap();
        let ids: Vec<_> = results.iter().map(FeatureRecord::id).collect();
        assert_eq!(ids, vec!["A", "B", "C"]);
    }

    #[test]
    fn self_recall_holds_for_every_record() {
        let mut index = LinearIndex::new();
        let records = vec![
            rec("a", &[1.0, 0.0, 0.0, 0.0]),
            rec("b", &[0.0, 1.0, 0.0, 0.0]),
            rec("c", &[0.0, 0.0, 1.0, 0.0]),
            rec("d", &[0.0, 0.0, 0.0, 1.0]),
        ];
        index.build(records.clone()).unwrap();

        for record in &records {
            let results = index.query(record.vector(), 1).unwrap();
            assert_eq!(results[0].id(), record.id());
        }
    }

    #[test]
    fn s6_concurrent_inserts_from_many_threads() {
        use std::sync::Arc;

        let index = Arc::new(LinearIndex::new());
        assert_eq!(index.size(), 0);
        assert!(index.query(&[1.0, 2.0, 3.0], 5).unwrap().is_empty());

        let threads: Vec<_> = (0..8)
            .map(|t| {
                let index = Arc::clone(&index);
                std::thread::spawn(move || {
                    for i in 0..1000 {
                        let id = format!("t{t}-{i}");
                        index.insert(rec(&id, &[t as f64, i as f64])).unwrap();
                    }
                })
            })
            .collect();

        for handle in threads {
            handle.join().unwrap();
        }

        assert_eq!(index.size(), 8000);
    }

    #[test]
    fn results_are_sorted_ascending() {
        let mut index = LinearIndex::new();
        index
            .build(vec![
                rec("a", &[1.0, 0.0, 0.0]),
                rec("b", &[0.5, 0.5, 0.0]),
                rec("c", &[0.0, 1.0, 0.0]),
                rec("d", &[0.0, 0.0, 1.0]),
            ])
            .unwrap();

        let results = index.query(&[1.0, 0.0, 0.0], 4).unwrap();
        let mut last = -1.0;
        for record in &results {
            let d = vector::cosine_distance(&[1.0, 0.0, 0.0], record.vector()).unwrap();
            assert!(d >= last - 1e-12);
            last = d;
        }
    }
}
