//! Normalization, norms, and distance metrics over dense `f64` feature
//! vectors.
//!
//! Every function here fails with [`Error::InvalidArgument`] when an input
//! vector is empty, and with [`Error::DimensionMismatch`] when two vectors
//! differ in length. [`cosine_distance`] is the one exception: a near-zero
//! norm is treated as maximum dissimilarity rather than as an error, since
//! an all-zero descriptor is a legitimate (if degenerate) image feature.

use crate::error::{Error, Result};

/// Below this L2 norm a vector is treated as numerically zero.
const ZERO_NORM_EPSILON: f64 = 1e-12;

/// Default tolerance used by [`is_normalized`].
const DEFAULT_NORM_TOLERANCE: f64 = 1e-6;

fn check_nonempty(v: &[f64]) -> Result<()> {
    if v.is_empty() {
        Err(Error::InvalidArgument("vector must not be empty".to_string()))
    } else {
        Ok(())
    }
}

fn check_same_dimension(a: &[f64], b: &[f64]) -> Result<()> {
    check_nonempty(a)?;
    check_nonempty(b)?;
    if a.len() != b.len() {
        Err(Error::DimensionMismatch {
            expected: a.len(),
            found: b.len(),
        })
    } else {
        Ok(())
    }
}

/// The L2 (Euclidean) norm of `v`: `sqrt(sum(v_i^2))`.
///
/// # Errors
///
/// Returns [`Error::InvalidArgument`] if `v` is empty.
///
/// # Examples
///
/// ```
/// use cbir_kernel::vector::l2_norm;
///
/// let v = vec![3.0, 4.0];
/// assert!((l2_norm(&v).unwrap() - 5.0).abs() < 1e-12);
/// ```
pub fn l2_norm(v: &[f64]) -> Result<f64> {
    check_nonempty(v)?;
    Ok(v.iter().map(|x| x * x).sum::<f64>().sqrt())
}

/// L2-normalizes `v` in place.
///
/// If `||v|| < 1e-12`, `v` is left unchanged. This is intentional: an
/// all-zero descriptor has no direction to normalize toward, and silently
/// leaving it as the zero vector lets downstream cosine distance treat it
/// as maximally dissimilar from everything (see [`cosine_distance`]).
///
/// # Errors
///
/// Returns [`Error::InvalidArgument`] if `v` is empty.
pub fn normalize(v: &mut [f64]) -> Result<()> {
    check_nonempty(v)?;
    let norm = l2_norm(v)?;
    if norm >= ZERO_NORM_EPSILON {
        for x in v.iter_mut() {
            *x /= norm;
        }
    }
    Ok(())
}

/// Allocates a copy of `v` and L2-normalizes it.
///
/// # Errors
///
/// Returns [`Error::InvalidArgument`] if `v` is empty.
pub fn normalized_copy(v: &[f64]) -> Result<Vec<f64>> {
    let mut copy = v.to_vec();
    normalize(&mut copy)?;
    Ok(copy)
}

/// Whether `v` is already unit-length within `tol`.
///
/// `tol` defaults to `1e-6` when callers use [`is_normalized_default`].
///
/// # Errors
///
/// Returns [`Error::InvalidArgument`] if `v` is empty.
pub fn is_normalized(v: &[f64], tol: f64) -> Result<bool> {
    let norm = l2_norm(v)?;
    Ok((norm - 1.0).abs() <= tol)
}

/// [`is_normalized`] with the default tolerance of `1e-6`.
///
/// # Errors
///
/// Returns [`Error::InvalidArgument`] if `v` is empty.
pub fn is_normalized_default(v: &[f64]) -> Result<bool> {
    is_normalized(v, DEFAULT_NORM_TOLERANCE)
}

/// Cosine distance: `1 - clamp(<a,b> / (||a|| ||b||), -1, 1)`.
///
/// The clamp absorbs floating-point overshoot so the result always lies in
/// `[0, 2]`. When either vector has near-zero norm (`< 1e-12`), the pair is
/// defined as maximally dissimilar and `1.0` is returned rather than
/// signaling an error — a zero vector has no angle to compare.
///
/// # Errors
///
/// Returns [`Error::InvalidArgument`] if either vector is empty, or
/// [`Error::DimensionMismatch`] if they differ in length.
///
/// # Examples
///
/// ```
/// use cbir_kernel::vector::cosine_distance;
///
/// let a = vec![1.0, 0.0, 0.0];
/// let b = vec![0.0, 1.0, 0.0];
/// assert!((cosine_distance(&a, &b).unwrap() - 1.0).abs() < 1e-12);
/// ```
pub fn cosine_distance(a: &[f64], b: &[f64]) -> Result<f64> {
    check_same_dimension(a, b)?;

    let (na, nb) = (l2_norm(a)?, l2_norm(b)?);
    if na < ZERO_NORM_EPSILON || nb < ZERO_NORM_EPSILON {
        return Ok(1.0);
    }

    let dot: f64 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let cosine_similarity = (dot / (na * nb)).clamp(-1.0, 1.0);
    Ok(1.0 - cosine_similarity)
}

/// Euclidean (L2) distance: `sqrt(sum((a_i - b_i)^2))`.
///
/// # Errors
///
/// Returns [`Error::InvalidArgument`] if either vector is empty, or
/// [`Error::DimensionMismatch`] if they differ in length.
pub fn euclidean_distance(a: &[f64], b: &[f64]) -> Result<f64> {
    check_same_dimension(a, b)?;
    Ok(a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f64>()
        .sqrt())
}

/// Manhattan (L1) distance: `sum(|a_i - b_i|)`.
///
/// # Errors
///
/// Returns [`Error::InvalidArgument`] if either vector is empty, or
/// [`Error::DimensionMismatch`] if they differ in length.
pub fn manhattan_distance(a: &[f64], b: &[f64]) -> Result<f64> {
    check_same_dimension(a, b)?;
    Ok(a.iter().zip(b.iter()).map(|(x, y)| (x - y).abs()).sum())
}

/// Summary statistics over a vector's coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VectorStats {
    /// Arithmetic mean of the coordinates.
    pub mean: f64,
    /// Population standard deviation of the coordinates.
    pub std_dev: f64,
    /// Minimum coordinate.
    pub min: f64,
    /// Maximum coordinate.
    pub max: f64,
}

/// Computes [`VectorStats`] (mean, population standard deviation, min, max)
/// over `v`'s coordinates.
///
/// # Errors
///
/// Returns [`Error::InvalidArgument`] if `v` is empty.
pub fn statistics(v: &[f64]) -> Result<VectorStats> {
    check_nonempty(v)?;

    let n = v.len() as f64;
    let mean = v.iter().sum::<f64>() / n;
    let variance = v.iter().map(|x| (x - mean) * (x - mean)).sum::<f64>() / n;
    let min = v.iter().copied().fold(f64::INFINITY, f64::min);
    let max = v.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    Ok(VectorStats {
        mean,
        std_dev: variance.sqrt(),
        min,
        max,
    })
}
