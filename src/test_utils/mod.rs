//! This module provides data and utilities for testing the interpolants
//!
//--------------------------------------------------------------------------------------------------

use crate::utilities::GridIndexer;

/// Default tolerance of the interpolation checks, relative to the reference
/// values.
pub const TOL: f64 = 500.0 * f64::EPSILON;

/// `n` equally spaced abscissae on `[0, 1]`
pub fn uniform_axis(n: usize) -> Vec<f64>
{
    debug_assert!(n >= 2);
    (0..n).map(|i| i as f64 / (n - 1) as f64).collect()
}

/// Samples `f` over the grid spanned by `axes`, flat with the first axis
/// varying fastest.
pub fn grid_values<const D: usize>(
    axes: &[Vec<f64>; D],
    f: &dyn Fn(&[f64; D]) -> f64,
) -> Vec<f64>
{
    let dims: [usize; D] = std::array::from_fn(|a| axes[a].len());
    let indexer = GridIndexer::new(&dims);

    (0..indexer.len())
        .map(|q| {
            let idx = indexer.tuple_index(q);
            let point: [f64; D] = std::array::from_fn(|a| axes[a][idx[a]]);
            f(&point)
        })
        .collect()
}
