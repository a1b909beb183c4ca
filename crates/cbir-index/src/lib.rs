//! Four interchangeable in-memory index strategies over [`FeatureRecord`]
//! vectors, sharing the uniform [`Buildable`]/[`Insertable`]/[`Searchable`]
//! operation surface of [`strategy`]:
//!
//! - [`linear::LinearIndex`] — exact brute-force cosine scan, concurrent
//!   insert, never `IndexNotReady`.
//! - [`kd::KdTreeIndex`] — median-split KD-tree searched by bounded
//!   best-bin-first traversal.
//! - [`ball::BallTreeIndex`] — farthest-pair-split ball tree searched by
//!   branch-and-bound over bounding hyperspheres.
//! - [`lsh::LshIndex`] — random-projection locality-sensitive hashing,
//!   ranked by exact cosine distance among hash-bucket candidates.
//!
//! Every index exposes a `const CAPABILITIES: Capabilities` descriptor so a
//! caller can pick a strategy at compile time without probing it at
//! runtime. None of the four persist to disk, shard across machines, or
//! learn a metric — those are explicit non-goals of the CORE this crate
//! implements.

pub mod ball;
pub mod kd;
pub mod linear;
pub mod lsh;
pub mod strategy;

mod utils;

pub use cbir_kernel::{Error, FeatureRecord, Result};
pub use strategy::{Buildable, Capabilities, Insertable, Searchable};
