//! The ball-tree node type: a hierarchy of bounding hyperspheres.

use cbir_kernel::FeatureRecord;

/// One node of a ball tree.
///
/// Every node carries a `centroid` and a non-negative `radius` such that
/// every feature reachable from the node lies within Euclidean distance
/// `radius` of `centroid`. A leaf owns a non-empty list of
/// [`FeatureRecord`]s directly; an internal node owns exactly two
/// children — a builder never returns an internal node with a missing
/// child.
#[derive(Debug)]
pub struct BallNode {
    pub(crate) centroid: Vec<f64>,
    pub(crate) radius: f64,
    pub(crate) contents: Contents,
}

#[derive(Debug)]
pub(crate) enum Contents {
    Leaf(Vec<FeatureRecord>),
    Children(Box<BallNode>, Box<BallNode>),
}

impl BallNode {
    /// The centroid of this node's bounding hypersphere.
    #[must_use]
    pub fn centroid(&self) -> &[f64] {
        &self.centroid
    }

    /// The radius of this node's bounding hypersphere.
    #[must_use]
    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Whether this node is a leaf.
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        matches!(self.contents, Contents::Leaf(_))
    }

    /// The records held directly in this node, if it is a leaf.
    #[must_use]
    pub fn leaf_records(&self) -> Option<&[FeatureRecord]> {
        match &self.contents {
            Contents::Leaf(records) => Some(records),
            Contents::Children(_, _) => None,
        }
    }

    /// The two children of this node, if it is internal.
    #[must_use]
    pub fn children(&self) -> Option<(&BallNode, &BallNode)> {
        match &self.contents {
            Contents::Leaf(_) => None,
            Contents::Children(left, right) => Some((left, right)),
        }
    }

    /// All records reachable from this node.
    #[must_use]
    pub fn all_records(&self) -> Vec<&FeatureRecord> {
        match &self.contents {
            Contents::Leaf(records) => records.iter().collect(),
            Contents::Children(left, right) => {
                let mut all = left.all_records();
                all.extend(right.all_records());
                all
            }
        }
    }

    /// Validates the bounding invariant (§ testable property 11): every
    /// descendant feature lies within `radius + 1e-9` of `centroid`.
    #[cfg(test)]
    pub(crate) fn check_bounding_invariant(&self) -> bool {
        let within_bound = self
            .all_records()
            .iter()
            .all(|r| euclidean(&self.centroid, r.vector()) <= self.radius + 1e-9);

        let children_ok = match &self.contents {
            Contents::Leaf(_) => true,
            Contents::Children(left, right) => left.check_bounding_invariant() && right.check_bounding_invariant(),
        };

        within_bound && children_ok
    }
}

#[cfg(test)]
fn euclidean(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b.iter()).map(|(x, y)| (x - y) * (x - y)).sum::<f64>().sqrt()
}
