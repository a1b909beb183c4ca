//! Branch-and-bound k-nearest-neighbor search over a ball tree.

use std::collections::BinaryHeap;

use cbir_kernel::{vector, FeatureRecord, Result};

use super::node::BallNode;
use crate::utils::{MinItem, SizedHeap};

/// Branch-and-bound KNN search over a ball tree.
///
/// Correctness of the pruning rule depends on the Euclidean triangle
/// inequality, so this searcher must only be used with Euclidean
/// distance — there is no cosine variant.
#[derive(Debug, Clone, Copy, Default)]
pub struct BallTreeSearch;

impl BallTreeSearch {
    /// Runs the search, returning up to `k` records in ascending Euclidean
    /// distance. `k` is clamped to the number of records in the tree.
    ///
    /// Implements spec.md §4.5: seed the frontier with `(root, 0)`; repeatedly
    /// pop the node of smallest lower bound; if `results` is already full
    /// and that lower bound is `>=` the current worst kept distance,
    /// terminate (every remaining node is provably worse); otherwise score
    /// a leaf's records exactly, or push both children of an internal node
    /// with their own lower bounds.
    pub(crate) fn search(&self, root: &BallNode, query: &[f64], k: usize) -> Result<Vec<FeatureRecord>> {
        let mut frontier: BinaryHeap<MinItem<&BallNode>> = BinaryHeap::new();
        let mut results: SizedHeap<FeatureRecord> = SizedHeap::new(k);

        frontier.push(MinItem(root, lower_bound(root, query)?));

        while let Some(MinItem(node, lower)) = frontier.pop() {
            if results.is_full() {
                if let Some(worst) = results.worst_distance() {
                    if lower >= worst {
                        break;
                    }
                }
            }

            match node.children() {
                None => {
                    for record in node.leaf_records().unwrap_or(&[]) {
                        let distance = vector::euclidean_distance(query, record.vector())?;
                        results.push(record.clone(), distance);
                    }
                }
                Some((left, right)) => {
                    frontier.push(MinItem(left, lower_bound(left, query)?));
                    frontier.push(MinItem(right, lower_bound(right, query)?));
                }
            }
        }

        Ok(results.into_sorted_vec().into_iter().map(|(record, _)| record).collect())
    }
}

/// `max(0, d(query, centroid) - radius)`: the minimum possible distance
/// from `query` to any feature contained in `node`.
fn lower_bound(node: &BallNode, query: &[f64]) -> Result<f64> {
    let to_centroid = vector::euclidean_distance(query, node.centroid())?;
    Ok((to_centroid - node.radius()).max(0.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ball::builder;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn rec(id: &str, v: &[f64]) -> FeatureRecord {
        FeatureRecord::new(id, v.to_vec()).unwrap()
    }

    #[test]
    fn self_recall_on_exact_search() {
        let records: Vec<_> = (0..80)
            .map(|i| rec(&format!("r{i}"), &[i as f64, (i * 3 % 17) as f64]))
            .collect();
        let mut rng = StdRng::seed_from_u64(5);
        let root = builder::build(records.clone(), 2, 8, &mut rng).unwrap();

        let searcher = BallTreeSearch;
        for record in &records {
            let results = searcher.search(&root, record.vector(), 1).unwrap();
            assert_eq!(results[0].id(), record.id());
        }
    }

    #[test]
    fn results_sorted_ascending() {
        let records: Vec<_> = (0..60).map(|i| rec(&format!("r{i}"), &[i as f64])).collect();
        let mut rng = StdRng::seed_from_u64(6);
        let root = builder::build(records, 1, 6, &mut rng).unwrap();

        let searcher = BallTreeSearch;
        let results = searcher.search(&root, &[30.0], 10).unwrap();
        let mut last = -1.0;
        for record in &results {
            let d = vector::euclidean_distance(&[30.0], record.vector()).unwrap();
            assert!(d >= last - 1e-12);
            last = d;
        }
    }

    #[test]
    fn matches_exhaustive_linear_scan() {
        let mut data_rng = StdRng::seed_from_u64(21);
        use rand::Rng;
        let records: Vec<_> = (0..120)
            .map(|i| {
                let v: Vec<f64> = (0..5).map(|_| data_rng.random_range(-20.0..20.0)).collect();
                rec(&format!("r{i}"), &v)
            })
            .collect();

        let mut build_rng = StdRng::seed_from_u64(22);
        let root = builder::build(records.clone(), 5, 8, &mut build_rng).unwrap();

        let query = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        let searcher = BallTreeSearch;
        let tree_results = searcher.search(&root, &query, 5).unwrap();

        let mut exhaustive: Vec<_> = records
            .iter()
            .map(|r| (r.clone(), vector::euclidean_distance(&query, r.vector()).unwrap()))
            .collect();
        exhaustive.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap());
        let expected_ids: Vec<_> = exhaustive.iter().take(5).map(|(r, _)| r.id().to_string()).collect();
        let actual_ids: Vec<_> = tree_results.iter().map(|r| r.id().to_string()).collect();

        assert_eq!(expected_ids, actual_ids);
    }
}
