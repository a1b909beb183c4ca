//! Median-split KD-tree construction.

use cbir_kernel::FeatureRecord;

use super::node::KdNode;

/// Builds a KD-tree over `records`, cycling split axes `0..dimension` by
/// depth. Returns `None` if `records` is empty.
///
/// At depth `d`, the axis is `a = d mod dimension`. Records are sorted by
/// their coordinate on `a` with a stable sort, the median index
/// `records.len() / 2` becomes the split point, and the builder recurses
/// on the strict left and right slices. A stable sort means ties on the
/// split coordinate end up on the right, by construction.
pub fn build(records: Vec<FeatureRecord>, dimension: usize) -> Option<KdNode> {
    ftlog::debug!("kd-tree: building from {} records, dimension {}", records.len(), dimension);
    build_at_depth(records, dimension, 0)
}

fn build_at_depth(mut records: Vec<FeatureRecord>, dimension: usize, depth: usize) -> Option<KdNode> {
    if records.is_empty() {
        return None;
    }

    let axis = depth % dimension;
    records.sort_by(|a, b| {
        a.vector()[axis]
            .partial_cmp(&b.vector()[axis])
            .unwrap_or(core::cmp::Ordering::Equal)
    });

    let median = records.len() / 2;
    let right_half = records.split_off(median);
    let mut right_half = right_half;
    let record = right_half.remove(0);
    let left_half = records;

    let left = build_at_depth(left_half, dimension, depth + 1).map(Box::new);
    let right = build_at_depth(right_half, dimension, depth + 1).map(Box::new);

    Some(KdNode {
        record,
        axis,
        left,
        right,
    })
}
