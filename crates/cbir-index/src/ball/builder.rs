//! Farthest-pair-split ball-tree construction.

use cbir_kernel::{vector, FeatureRecord};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::Rng;

use super::node::{BallNode, Contents};

fn centroid_of(records: &[FeatureRecord], dimension: usize) -> Vec<f64> {
    let mut sum = vec![0.0; dimension];
    for record in records {
        for (acc, coord) in sum.iter_mut().zip(record.vector()) {
            *acc += coord;
        }
    }
    let n = records.len() as f64;
    for v in &mut sum {
        *v /= n;
    }
    sum
}

fn radius_of(records: &[FeatureRecord], centroid: &[f64]) -> f64 {
    records
        .iter()
        .map(|r| vector::euclidean_distance(centroid, r.vector()).unwrap_or(0.0))
        .fold(0.0_f64, f64::max)
}

/// Builds a ball tree over `records`, stopping recursion once a subset's
/// size is at most `leaf_size`. Returns `None` if `records` is empty.
///
/// See spec.md §4.4 for the farthest-pair split heuristic and the
/// degenerate-partition (all points equidistant) fallback.
pub fn build(records: Vec<FeatureRecord>, dimension: usize, leaf_size: usize, rng: &mut StdRng) -> Option<BallNode> {
    if records.is_empty() {
        return None;
    }
    ftlog::debug!("ball-tree: building from {} records, leaf_size {}", records.len(), leaf_size);
    Some(build_node(records, dimension, leaf_size, rng))
}

fn build_node(records: Vec<FeatureRecord>, dimension: usize, leaf_size: usize, rng: &mut StdRng) -> BallNode {
    let centroid = centroid_of(&records, dimension);
    let radius = radius_of(&records, &centroid);

    if records.len() <= leaf_size {
        return BallNode {
            centroid,
            radius,
            contents: Contents::Leaf(records),
        };
    }

    let (left_records, right_records) = split(records, rng);

    let left = build_node(left_records, dimension, leaf_size, rng);
    let right = build_node(right_records, dimension, leaf_size, rng);

    BallNode {
        centroid,
        radius,
        contents: Contents::Children(Box::new(left), Box::new(right)),
    }
}

/// Partitions `records` using the two-step farthest-pair heuristic,
/// falling back to a balanced random split if either side would be empty.
fn split(mut records: Vec<FeatureRecord>, rng: &mut StdRng) -> (Vec<FeatureRecord>, Vec<FeatureRecord>) {
    let p1_index = rng.random_range(0..records.len());
    let p1 = records[p1_index].vector().to_vec();

    let p2_index = farthest_from(&records, &p1);
    let p2 = records[p2_index].vector().to_vec();

    // Replace p1 with the element farthest from p2 to approximate a
    // diameter pair.
    let p1_index = farthest_from(&records, &p2);
    let p1 = records[p1_index].vector().to_vec();

    let mut left = Vec::new();
    let mut right = Vec::new();
    for record in records.drain(..) {
        let d1 = vector::euclidean_distance(&p1, record.vector()).unwrap_or(0.0);
        let d2 = vector::euclidean_distance(&p2, record.vector()).unwrap_or(0.0);
        if d1 <= d2 {
            left.push(record);
        } else {
            right.push(record);
        }
    }

    if left.is_empty() || right.is_empty() {
        ftlog::debug!("ball-tree: degenerate split, falling back to balanced random split");
        let mut all = left;
        all.extend(right);
        all.shuffle(rng);
        let mid = all.len() / 2;
        let right = all.split_off(mid);
        return (all, right);
    }

    (left, right)
}

fn farthest_from(records: &[FeatureRecord], point: &[f64]) -> usize {
    records
        .iter()
        .enumerate()
        .map(|(i, r)| (i, vector::euclidean_distance(point, r.vector()).unwrap_or(0.0)))
        .max_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap_or(core::cmp::Ordering::Equal))
        .map_or(0, |(i, _)| i)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn rec(id: &str, v: &[f64]) -> FeatureRecord {
        FeatureRecord::new(id, v.to_vec()).unwrap()
    }

    #[test]
    fn empty_input_yields_no_tree() {
        let mut rng = StdRng::seed_from_u64(0);
        assert!(build(vec![], 3, 10, &mut rng).is_none());
    }

    #[test]
    fn s4_unit_basis_root_centroid_and_radius() {
        let records = vec![
            rec("e0", &[1.0, 0.0, 0.0, 0.0]),
            rec("e1", &[0.0, 1.0, 0.0, 0.0]),
            rec("e2", &[0.0, 0.0, 1.0, 0.0]),
            rec("e3", &[0.0, 0.0, 0.0, 1.0]),
        ];
        let mut rng = StdRng::seed_from_u64(1);
        let root = build(records, 4, 2, &mut rng).unwrap();

        for (c, expected) in root.centroid().iter().zip([0.25, 0.25, 0.25, 0.25]) {
            assert!((c - expected).abs() < 1e-12);
        }
        assert!((root.radius() - 0.75_f64.sqrt()).abs() < 1e-9);
        assert!(root.check_bounding_invariant());
    }

    #[test]
    fn leaves_respect_leaf_size() {
        let records: Vec<_> = (0..37).map(|i| rec(&format!("r{i}"), &[i as f64])).collect();
        let mut rng = StdRng::seed_from_u64(3);
        let root = build(records, 1, 5, &mut rng).unwrap();

        fn check_leaves(node: &super::super::node::BallNode, leaf_size: usize) {
            match node.children() {
                None => assert!(node.leaf_records().unwrap().len() <= leaf_size),
                Some((l, r)) => {
                    check_leaves(l, leaf_size);
                    check_leaves(r, leaf_size);
                }
            }
        }
        check_leaves(&root, 5);
        assert!(root.check_bounding_invariant());
    }

    #[test]
    fn bounding_invariant_holds_on_random_data() {
        use rand::Rng as _;

        let mut data_rng = StdRng::seed_from_u64(11);
        let records: Vec<_> = (0..150)
            .map(|i| {
                let v: Vec<f64> = (0..6).map(|_| data_rng.random_range(-50.0..50.0)).collect();
                rec(&format!("r{i}"), &v)
            })
            .collect();

        let mut build_rng = StdRng::seed_from_u64(12);
        let root = build(records, 6, 10, &mut build_rng).unwrap();
        assert!(root.check_bounding_invariant());
    }
}
