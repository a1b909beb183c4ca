//! Immutable pairing of an image identifier and its feature vector.

use crate::error::{Error, Result};

/// An immutable pairing of an opaque identifier and a dense feature vector.
///
/// All records within one index share a common dimension `D`, though
/// `FeatureRecord` itself does not enforce cross-record agreement — that is
/// the responsibility of the index a record is built into. Equality and
/// hashing are by identifier alone, matching the spec's "unique within a
/// build" contract rather than comparing floating-point coordinates.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FeatureRecord {
    id: String,
    vector: Vec<f64>,
}

impl FeatureRecord {
    /// Builds a new record.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if `vector` is empty.
    pub fn new(id: impl Into<String>, vector: Vec<f64>) -> Result<Self> {
        if vector.is_empty() {
            return Err(Error::InvalidArgument(
                "feature vector must not be empty".to_string(),
            ));
        }
        Ok(Self {
            id: id.into(),
            vector,
        })
    }

    /// The record's identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The record's feature vector.
    #[must_use]
    pub fn vector(&self) -> &[f64] {
        &self.vector
    }

    /// The dimension of the record's feature vector.
    #[must_use]
    pub fn dimension(&self) -> usize {
        self.vector.len()
    }
}

impl PartialEq for FeatureRecord {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for FeatureRecord {}

impl core::hash::Hash for FeatureRecord {
    fn hash<H: core::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_vector_is_rejected() {
        assert!(FeatureRecord::new("a", vec![]).is_err());
    }

    #[test]
    fn equality_is_by_id_only() {
        let a = FeatureRecord::new("x", vec![1.0, 2.0]).unwrap();
        let b = FeatureRecord::new("x", vec![9.0, 9.0]).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn dimension_matches_vector_length() {
        let r = FeatureRecord::new("x", vec![1.0, 2.0, 3.0]).unwrap();
        assert_eq!(r.dimension(), 3);
    }
}
