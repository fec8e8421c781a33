//! This module contains the gridded-interpolation surface of the crate.
//!
//! [Bgrid] is a tensor-product B-spline interpolant of scalar samples on a
//! rectilinear grid in 2 to 6 dimensions: a fit builds it from a
//! [BgridDescriptor], evaluation collapses it one axis at a time to a scalar.
//--------------------------------------------------------------------------------------------------

mod bgrid;
mod colloc;

pub use bgrid::{Bgrid, Bgrid2, Bgrid3, Bgrid4, Bgrid5, Bgrid6, BgridDescriptor, EvalState, KnotMode};
pub(crate) use colloc::fit_axis;
