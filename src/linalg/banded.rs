//! This submodule contains the banded LU factorization used to solve the
//! spline collocation systems.
//!
//--------------------------------------------------------------------------------------------------

//{{{ crate imports
//}}}
//{{{ std imports
//}}}
//{{{ dep imports
use nalgebra::DMatrix;
use thiserror::Error;
//}}}
//--------------------------------------------------------------------------------------------------

//{{{ enum: BandedError
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BandedError
{
    #[error("zero pivot in column {0}")]
    ZeroPivot(usize),
}
//}}}
//{{{ struct: BandedLu
/// A banded matrix of order `n` with `nl` subdiagonals and `nu`
/// superdiagonals, stored as an `(nl + nu + 1) x n` rectangle in which entry
/// `(i, j)` of the full matrix lives at rectangle row `nu + i - j` of column
/// `j`. The rectangle is column-major, so every elimination and substitution
/// loop below walks a single column contiguously.
///
/// [BandedLu::factorize] overwrites the rectangle with the unit-lower L and
/// upper U factors in the same band. No pivoting is performed: the
/// collocation matrices solved here are totally positive whenever the
/// Schoenberg-Whitney condition holds, and for those a zero pivot occurs
/// exactly when the condition fails.
pub struct BandedLu
{
    band: DMatrix<f64>,
    nl: usize,
    nu: usize,
}
//}}}
//{{{ impl: BandedLu
impl BandedLu
{
    pub fn zeros(
        n: usize,
        nl: usize,
        nu: usize,
    ) -> Self
    {
        debug_assert!(n >= 1, "matrix order must be positive");
        debug_assert!(nl < n && nu < n, "bandwidths exceed the matrix order");

        Self {
            band: DMatrix::zeros(nl + nu + 1, n),
            nl,
            nu,
        }
    }
    //..............................................................................................

    /// Order of the matrix
    pub fn order(&self) -> usize
    {
        self.band.ncols()
    }
    //..............................................................................................

    /// Mutable access to entry `(i, j)` of the full matrix, which must lie
    /// within the band.
    pub fn entry_mut(
        &mut self,
        i: usize,
        j: usize,
    ) -> &mut f64
    {
        debug_assert!(i < self.order() && j < self.order());
        debug_assert!(
            j <= i + self.nu && i <= j + self.nl,
            "entry outside the band"
        );

        &mut self.band[(self.nu + i - j, j)]
    }
    //..............................................................................................

    /// Factorizes the matrix in place into unit-lower and upper banded
    /// triangular factors. Fails iff a pivot on the main diagonal vanishes.
    pub fn factorize(&mut self) -> Result<(), BandedError>
    {
        let n = self.order();
        let mid = self.nu;

        if n == 1
        {
            return self.check_pivot(0);
        }

        if self.nl == 0
        {
            // already upper triangular
            for i in 0..n
            {
                self.check_pivot(i)?;
            }
            return Ok(());
        }

        if self.nu == 0
        {
            // already lower triangular: divide each column by its pivot
            for i in 0..n - 1
            {
                self.check_pivot(i)?;
                let pivot = self.band[(mid, i)];
                let jmax = self.nl.min(n - 1 - i);
                for j in 1..=jmax
                {
                    self.band[(mid + j, i)] /= pivot;
                }
            }
            return self.check_pivot(n - 1);
        }

        for i in 0..n - 1
        {
            self.check_pivot(i)?;
            let pivot = self.band[(mid, i)];

            // scale the multipliers below the pivot
            let jmax = self.nl.min(n - 1 - i);
            for j in 1..=jmax
            {
                self.band[(mid + j, i)] /= pivot;
            }

            // eliminate: subtract multiples of column i from the columns its
            // superdiagonal entries reach
            let kmax = self.nu.min(n - 1 - i);
            for kk in 1..=kmax
            {
                let ipk = i + kk;
                let midmk = mid - kk;
                let factor = self.band[(midmk, ipk)];
                for j in 1..=jmax
                {
                    let update = self.band[(mid + j, i)] * factor;
                    self.band[(midmk + j, ipk)] -= update;
                }
            }
        }
        self.check_pivot(n - 1)
    }
    //..............................................................................................

    /// Overwrites `b` with the solution of `A x = b` given the factored
    /// band: forward substitution through L, then back substitution through
    /// U, each touching only in-band entries. The purely triangular cases
    /// skip the pass they do not need.
    pub fn solve(
        &self,
        b: &mut [f64],
    )
    {
        let n = self.order();
        let mid = self.nu;
        debug_assert!(b.len() >= n, "right-hand side too short");

        if n > 1 && self.nl > 0
        {
            for i in 0..n - 1
            {
                let jmax = self.nl.min(n - 1 - i);
                for j in 1..=jmax
                {
                    b[i + j] -= b[i] * self.band[(mid + j, i)];
                }
            }
        }

        if self.nu == 0
        {
            for i in 0..n
            {
                b[i] /= self.band[(mid, i)];
            }
            return;
        }

        for i in (1..n).rev()
        {
            b[i] /= self.band[(mid, i)];
            let jmax = self.nu.min(i);
            for j in 1..=jmax
            {
                b[i - j] -= b[i] * self.band[(mid - j, i)];
            }
        }
        b[0] /= self.band[(mid, 0)];
    }
    //..............................................................................................

    fn check_pivot(
        &self,
        i: usize,
    ) -> Result<(), BandedError>
    {
        if self.band[(self.nu, i)] == 0.0
        {
            Err(BandedError::ZeroPivot(i))
        }
        else
        {
            Ok(())
        }
    }
    //..............................................................................................
}
//}}}

//-------------------------------------------------------------------------------------------------
//{{{ mod: tests
#[cfg(test)]
mod tests
{
    use super::*;
    use approx::assert_relative_eq;

    fn dense_mul(
        a: &[[f64; 5]; 5],
        x: &[f64; 5],
    ) -> [f64; 5]
    {
        let mut out = [0.0; 5];
        for i in 0..5
        {
            for j in 0..5
            {
                out[i] += a[i][j] * x[j];
            }
        }
        out
    }

    fn load_banded(
        a: &[[f64; 5]; 5],
        nl: usize,
        nu: usize,
    ) -> BandedLu
    {
        let mut lu = BandedLu::zeros(5, nl, nu);
        for i in 0..5
        {
            for j in 0..5
            {
                if j <= i + nu && i <= j + nl && a[i][j] != 0.0
                {
                    *lu.entry_mut(i, j) = a[i][j];
                }
            }
        }
        lu
    }

    #[test]
    fn tridiagonal_solve()
    {
        let a = [
            [2.0, -1.0, 0.0, 0.0, 0.0],
            [-1.0, 2.0, -1.0, 0.0, 0.0],
            [0.0, -1.0, 2.0, -1.0, 0.0],
            [0.0, 0.0, -1.0, 2.0, -1.0],
            [0.0, 0.0, 0.0, -1.0, 2.0],
        ];
        let x = [1.0, -2.0, 0.5, 3.0, 1.5];
        let mut b = dense_mul(&a, &x);

        let mut lu = load_banded(&a, 1, 1);
        lu.factorize().unwrap();
        lu.solve(&mut b);

        for i in 0..5
        {
            assert_relative_eq!(b[i], x[i], max_relative = 1e-12);
        }
    }

    #[test]
    fn wide_band_solve()
    {
        let a = [
            [4.0, 1.0, 0.5, 0.0, 0.0],
            [1.0, 4.0, 1.0, 0.5, 0.0],
            [0.5, 1.0, 4.0, 1.0, 0.5],
            [0.0, 0.5, 1.0, 4.0, 1.0],
            [0.0, 0.0, 0.5, 1.0, 4.0],
        ];
        let x = [0.3, 1.0, -1.0, 2.0, 0.7];
        let mut b = dense_mul(&a, &x);

        let mut lu = load_banded(&a, 2, 2);
        lu.factorize().unwrap();
        lu.solve(&mut b);

        for i in 0..5
        {
            assert_relative_eq!(b[i], x[i], max_relative = 1e-12);
        }
    }

    #[test]
    fn lower_triangular_fast_path()
    {
        let a = [
            [2.0, 0.0, 0.0, 0.0, 0.0],
            [1.0, 3.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 2.0, 0.0, 0.0],
            [0.0, 0.0, 2.0, 4.0, 0.0],
            [0.0, 0.0, 0.0, 1.0, 2.0],
        ];
        let x = [1.0, 1.0, -1.0, 0.5, 2.0];
        let mut b = dense_mul(&a, &x);

        let mut lu = load_banded(&a, 1, 0);
        lu.factorize().unwrap();
        lu.solve(&mut b);

        for i in 0..5
        {
            assert_relative_eq!(b[i], x[i], max_relative = 1e-12);
        }
    }

    #[test]
    fn upper_triangular_fast_path()
    {
        let a = [
            [2.0, 1.0, 0.0, 0.0, 0.0],
            [0.0, 3.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 2.0, 2.0, 0.0],
            [0.0, 0.0, 0.0, 4.0, 1.0],
            [0.0, 0.0, 0.0, 0.0, 2.0],
        ];
        let x = [1.0, -1.0, 2.0, 0.5, 1.0];
        let mut b = dense_mul(&a, &x);

        let mut lu = load_banded(&a, 0, 1);
        lu.factorize().unwrap();
        lu.solve(&mut b);

        for i in 0..5
        {
            assert_relative_eq!(b[i], x[i], max_relative = 1e-12);
        }
    }

    #[test]
    fn singular_matrix_is_detected()
    {
        let mut lu = BandedLu::zeros(3, 1, 1);
        *lu.entry_mut(0, 0) = 1.0;
        *lu.entry_mut(0, 1) = 2.0;
        *lu.entry_mut(1, 0) = 0.5;
        *lu.entry_mut(1, 1) = 1.0;
        *lu.entry_mut(1, 2) = 1.0;
        *lu.entry_mut(2, 1) = 1.0;
        *lu.entry_mut(2, 2) = 1.0;

        // row 1 is half of row 0 extended, the (1,1) pivot is eliminated away
        assert_eq!(lu.factorize(), Err(BandedError::ZeroPivot(1)));
    }

    #[test]
    fn refactor_is_bit_for_bit_deterministic()
    {
        let a = [
            [4.0, 1.0, 0.5, 0.0, 0.0],
            [1.0, 4.0, 1.0, 0.5, 0.0],
            [0.5, 1.0, 4.0, 1.0, 0.5],
            [0.0, 0.5, 1.0, 4.0, 1.0],
            [0.0, 0.0, 0.5, 1.0, 4.0],
        ];
        let rhs = [0.25, -1.0, 3.5, 0.1, 2.0];

        let mut first = rhs;
        let mut lu1 = load_banded(&a, 2, 2);
        lu1.factorize().unwrap();
        lu1.solve(&mut first);

        let mut second = rhs;
        let mut lu2 = load_banded(&a, 2, 2);
        lu2.factorize().unwrap();
        lu2.solve(&mut second);

        for i in 0..5
        {
            assert_eq!(first[i].to_bits(), second[i].to_bits());
        }
    }
}
//}}}
