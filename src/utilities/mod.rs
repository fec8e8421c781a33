//! This module provides a miscellaneous set of utilities which are used throughout the crate
//!
//--------------------------------------------------------------------------------------------------

use num_traits::Float;

mod ndarray;

pub use ndarray::{GridIndexer, GridView};

/// Largest relative deviation between two equally long slices, with absolute
/// deviation used wherever the reference entry is zero.
pub fn sup_norm_rel<T: Float>(got: &[T], want: &[T]) -> T {
    debug_assert!(got.len() == want.len());

    let mut worst = T::zero();
    for (g, w) in got.iter().zip(want.iter()) {
        let denom = if w.abs() > T::zero() { w.abs() } else { T::one() };
        let dev = (*g - *w).abs() / denom;
        if dev > worst {
            worst = dev;
        }
    }
    worst
}
