//! The numeric foundation of the CBIR index: vector normalization,
//! distance metrics, vector statistics, the shared error taxonomy, and the
//! [`FeatureRecord`] data type that every index strategy in `cbir-index`
//! builds on.
//!
//! This crate has no notion of trees, hashing, or concurrency — it is the
//! dependency-light layer analogous to the teacher workspace's `distances`
//! crate, kept separate so that the numeric kernel can be reasoned about
//! (and tested) independently of any particular index structure.

pub mod error;
pub mod record;
pub mod vector;

pub use error::{Error, Result};
pub use record::FeatureRecord;
