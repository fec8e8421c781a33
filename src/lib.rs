//! # Gridspline
//! ## Introduction
//! Gridspline fits tensor-product B-spline interpolants to scalar samples on
//! rectilinear grids of 2 to 6 dimensions and evaluates them, or any of their
//! mixed partial derivatives, at arbitrary points.


//---------------------------------------- Docs ------------------------------------------------- //


#[cfg(test)] mod test_utils;
mod splines;
mod utilities;
mod linalg;
pub mod common;
pub mod interp;
