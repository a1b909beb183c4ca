//! The KD-tree node type.

use cbir_kernel::FeatureRecord;

/// One node of a KD-tree.
///
/// Holds a single [`FeatureRecord`], the axis this node splits on, and
/// optional left/right children. The invariant is: every descendant in the
/// left subtree has `vector[axis] <= self.vector[axis]`, and every
/// descendant in the right subtree has `vector[axis] > self.vector[axis]`.
/// Depth of a node is the number of ancestors; `axis = depth mod D`.
#[derive(Debug)]
pub struct KdNode {
    pub(crate) record: FeatureRecord,
    pub(crate) axis: usize,
    pub(crate) left: Option<Box<KdNode>>,
    pub(crate) right: Option<Box<KdNode>>,
}

impl KdNode {
    /// The record held at this node.
    #[must_use]
    pub fn record(&self) -> &FeatureRecord {
        &self.record
    }

    /// The axis this node splits on.
    #[must_use]
    pub fn axis(&self) -> usize {
        self.axis
    }

    /// The left child, if any.
    #[must_use]
    pub fn left(&self) -> Option<&KdNode> {
        self.left.as_deref()
    }

    /// The right child, if any.
    #[must_use]
    pub fn right(&self) -> Option<&KdNode> {
        self.right.as_deref()
    }

    /// Validates the KD invariant (§ testable property 10) recursively:
    /// every left descendant's coordinate on this node's axis is `<=` this
    /// node's, and every right descendant's is `>=`.
    #[cfg(test)]
    pub(crate) fn check_invariant(&self) -> bool {
        fn all_satisfy(node: &KdNode, axis: usize, pivot: f64, le: bool) -> bool {
            let coord = node.record.vector()[axis];
            let ok = if le { coord <= pivot } else { coord >= pivot };
            ok && node.left.as_deref().map_or(true, |n| all_satisfy(n, axis, pivot, le))
                && node.right.as_deref().map_or(true, |n| all_satisfy(n, axis, pivot, le))
        }

        let pivot = self.record.vector()[self.axis];
        let left_ok = self.left.as_deref().map_or(true, |n| all_satisfy(n, self.axis, pivot, true));
        let right_ok = self.right.as_deref().map_or(true, |n| all_satisfy(n, self.axis, pivot, false));

        let children_ok = self.left.as_deref().map_or(true, KdNode::check_invariant)
            && self.right.as_deref().map_or(true, KdNode::check_invariant);

        left_ok && right_ok && children_ok
    }
}
