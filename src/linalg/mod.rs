//! This module contains the linear algebra kernels backing the fit operations.
//!
//--------------------------------------------------------------------------------------------------

mod banded;

pub use banded::{BandedError, BandedLu};
