//! This module contains common types, constants and traits used throughout the crate.
//!
//--------------------------------------------------------------------------------------------------

//{{{ crate imports
//}}}
//{{{ std imports
//}}}
//{{{ dep imports
use static_assertions::const_assert;
use thiserror::Error;
//}}}
//--------------------------------------------------------------------------------------------------

//{{{ collection: limits
/// This is the maximum allowable order of a B-spline basis. It is an arbitrary number.
pub const KMAX: usize = 8;
/// Highest grid dimensionality served by the public surface.
pub const DMAX: usize = 6;

const_assert!(KMAX >= 2);
const_assert!(DMAX >= 2);
//}}}
//{{{ enum: FitError
/// Failure modes of a fit. The variants mirror the validation order of the
/// historical interface: per-axis sample count, order, abscissa monotonicity
/// and knot checks, then shape, then the factorization itself.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FitError
{
    #[error("spline dimension {0} is outside the supported range 1..={DMAX}")]
    UnsupportedDimension(usize),

    #[error("axis {axis}: need at least 3 samples, got {n}")]
    TooFewSamples
    {
        axis: usize, n: usize
    },

    #[error("axis {axis}: order {k} is outside 2..={max}")]
    BadOrder
    {
        axis: usize, k: usize, max: usize
    },

    #[error("axis {axis}: abscissae are not strictly increasing")]
    AbscissaeNotIncreasing
    {
        axis: usize
    },

    #[error("axis {axis}: supplied knots are not a nondecreasing vector of length n + k")]
    BadKnots
    {
        axis: usize
    },

    #[error("sample array holds {found} values but the grid has {expected} points")]
    BadSampleCount
    {
        expected: usize, found: usize
    },

    #[error("axis {axis}: abscissae and knots violate the Schoenberg-Whitney condition")]
    SchoenbergWhitney
    {
        axis: usize
    },
}
//}}}
//{{{ impl: FitError
impl FitError
{
    /// Numeric code of the historical interface, where axis `a` (counted from
    /// zero here) owns the four codes `4a+3 ..= 4a+6` for bad sample count,
    /// bad order, non-increasing abscissae and bad knots respectively.
    ///
    /// Code 2 (bad mode flag) cannot occur: the knot mode is an enum and
    /// admits no invalid value. Conditions the historical interface reported
    /// through its solver print path carry no code and yield `None`.
    pub fn compat_code(&self) -> Option<i32>
    {
        match self
        {
            FitError::TooFewSamples { axis, .. } => Some(4 * (*axis as i32) + 3),
            FitError::BadOrder { axis, .. } => Some(4 * (*axis as i32) + 4),
            FitError::AbscissaeNotIncreasing { axis } => Some(4 * (*axis as i32) + 5),
            FitError::BadKnots { axis } => Some(4 * (*axis as i32) + 6),
            _ => None,
        }
    }
}
//}}}
//{{{ enum: EvalError
/// Failure modes of a single-axis evaluation. The infallible evaluation
/// surface maps every one of these to a zero return; they are exposed for
/// introspection through the `try_` entry points.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvalError
{
    #[error("spline order must be at least 1, got {0}")]
    BadOrder(usize),

    #[error("derivative order {deriv} must be below the spline order {k}")]
    BadDerivative
    {
        deriv: usize, k: usize
    },

    #[error("query lies outside the spline domain")]
    OutOfDomain,

    #[error("no nonempty interval at the right endpoint")]
    EmptyEndpointInterval,
}
//}}}
//{{{ trait: Descriptor
/// Implemented by descriptor types which must be checked before an object is
/// built from them.
pub trait Descriptor
{
    type Error;

    fn is_valid(&self) -> Result<(), Self::Error>;
}
//}}}

//-------------------------------------------------------------------------------------------------
//{{{ mod: tests
#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn compat_codes()
    {
        assert_eq!(
            FitError::TooFewSamples { axis: 0, n: 2 }.compat_code(),
            Some(3)
        );
        assert_eq!(
            FitError::BadOrder {
                axis: 1,
                k: 9,
                max: 5
            }
            .compat_code(),
            Some(8)
        );
        assert_eq!(
            FitError::AbscissaeNotIncreasing { axis: 2 }.compat_code(),
            Some(13)
        );
        assert_eq!(FitError::BadKnots { axis: 5 }.compat_code(), Some(26));
        assert_eq!(FitError::SchoenbergWhitney { axis: 0 }.compat_code(), None);
    }

    #[test]
    fn error_display()
    {
        let err = FitError::BadOrder {
            axis: 3,
            k: 1,
            max: 5,
        };
        assert_eq!(format!("{}", err), "axis 3: order 1 is outside 2..=5");
        let err = EvalError::OutOfDomain;
        assert_eq!(format!("{}", err), "query lies outside the spline domain");
    }
}
//}}}
