//! This submodule builds and solves the 1D spline collocation systems: given
//! abscissae and a knot vector, it produces the B-spline coefficients whose
//! spline passes through prescribed values at every abscissa. One factorization
//! serves any number of right-hand sides over the same abscissae and knots,
//! which is what the axis sweeps of the tensor-product fit rely on.
//--------------------------------------------------------------------------------------------------

//{{{ crate imports
use crate::common::KMAX;
use crate::linalg::{BandedError, BandedLu};
use crate::splines::CoxDeBoor;
//}}}
//{{{ std imports
//}}}
//{{{ dep imports
use thiserror::Error;
//}}}
//--------------------------------------------------------------------------------------------------

//{{{ enum: CollocError
/// Both variants are failures of the Schoenberg-Whitney condition: an
/// abscissa outside the support of its basis function is caught while the
/// matrix is assembled, anything subtler surfaces as a zero pivot.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollocError
{
    #[error("abscissa {index} lies outside the support of its basis function")]
    OutsideSupport
    {
        index: usize
    },

    #[error(transparent)]
    Singular(#[from] BandedError),
}
//}}}
//{{{ struct: Collocation
/// The factored collocation matrix for one set of abscissae and knots.
pub struct Collocation
{
    lu: BandedLu,
}
//}}}
//{{{ impl: Collocation
impl Collocation
{
    /// Assembles and factorizes the collocation matrix `A[i][j] = b_j(x[i])`
    /// for order `k`. Row `i` holds the `k` basis values that are nonzero at
    /// `x[i]`, so the matrix is banded with `k - 1` diagonals on either side.
    pub fn new(
        x: &[f64],
        t: &[f64],
        k: usize,
    ) -> Result<Self, CollocError>
    {
        let n = x.len();
        debug_assert!(k >= 2 && k <= KMAX, "order out of range");
        debug_assert!(n >= k, "fewer abscissae than the order");
        debug_assert!(t.len() == n + k, "knot vector length mismatch");

        let mut lu = BandedLu::zeros(n, k - 1, k - 1);
        let mut basis = CoxDeBoor::new();
        let mut values = [0.0; KMAX];

        let mut left = k - 1;
        for i in 0..n
        {
            let xi = x[i];
            // the interval index must stay within [i, i + k), otherwise
            // b_i(x[i]) = 0 and the matrix cannot be inverted
            let lmax = (i + k).min(n);
            left = left.max(i);
            if xi < t[left]
            {
                return Err(CollocError::OutsideSupport { index: i });
            }
            while xi >= t[left + 1]
            {
                left += 1;
                if left == lmax
                {
                    left -= 1;
                    if xi > t[left + 1]
                    {
                        return Err(CollocError::OutsideSupport { index: i });
                    }
                    break;
                }
            }

            basis.start(t, xi, left, k, &mut values);
            for j in 0..k
            {
                *lu.entry_mut(i, left + 1 - k + j) = values[j];
            }
        }

        lu.factorize()?;
        Ok(Self { lu })
    }
    //..............................................................................................

    /// Number of abscissae the system was built over.
    pub fn order(&self) -> usize
    {
        self.lu.order()
    }
    //..............................................................................................

    /// Overwrites `b`, a vector of values at the abscissae, with the
    /// coefficients of the interpolating spline.
    pub fn solve(
        &self,
        b: &mut [f64],
    )
    {
        self.lu.solve(b);
    }
    //..............................................................................................
}
//}}}
//{{{ fun: fit_axis
/// Fits one axis of a tensor-product grid.
///
/// `src` holds `nf` independent lines of `n` values each, line `q` occupying
/// `src[q * n..(q + 1) * n]`; the collocation system is factorized once and
/// back-substituted per line. Coefficient `i` of line `q` is written to
/// `dst[q + nf * i]`: the transposed layout rotates the axis order by one, so
/// the next axis sweep again reads contiguous lines, and `d` sweeps restore
/// the original order.
pub fn fit_axis(
    x: &[f64],
    t: &[f64],
    k: usize,
    src: &[f64],
    dst: &mut [f64],
) -> Result<(), CollocError>
{
    let n = x.len();
    debug_assert!(src.len() == dst.len(), "buffer size mismatch");
    debug_assert!(src.len() % n == 0, "buffer not a whole number of lines");

    let colloc = Collocation::new(x, t, k)?;
    let nf = src.len() / n;
    let mut line = vec![0.0; n];

    for q in 0..nf
    {
        line.copy_from_slice(&src[q * n..(q + 1) * n]);
        colloc.solve(&mut line);
        for i in 0..n
        {
            dst[q + nf * i] = line[i];
        }
    }
    Ok(())
}
//}}}

//}}}
