//! This submodule contains the definition of the gridded tensor-product
//! B-spline interpolant.
//!
//! A [Bgrid] is fitted to scalar samples on a rectilinear grid and reproduces
//! every sample exactly. Fitting runs the 1D collocation solve along one axis
//! at a time; evaluation collapses the coefficient array one axis at a time
//! down to a scalar, touching only the `k` active coefficients per axis.
//--------------------------------------------------------------------------------------------------

//{{{ crate imports
use crate::common::{Descriptor, EvalError, FitError, DMAX, KMAX};
use crate::interp::fit_axis;
use crate::splines::{self as spl, SpanLocation};
use crate::utilities::GridIndexer;
//}}}
//{{{ std imports
use std::mem;
//}}}
//{{{ dep imports
use serde::{Deserialize, Serialize};
//}}}
//--------------------------------------------------------------------------------------------------

//{{{ enum: KnotMode
/// Source of the per-axis knot vectors of a fit.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(bound(
    serialize = "[Vec<f64>; D]: serde::Serialize",
    deserialize = "[Vec<f64>; D]: serde::Deserialize<'de>"
))]
pub enum KnotMode<const D: usize>
{
    /// Derive not-a-knot vectors from the abscissae.
    Automatic,
    /// Use the supplied vectors, one per axis, each of length `n + k` and
    /// nondecreasing.
    Supplied([Vec<f64>; D]),
}
//}}}
//{{{ impl: Default for KnotMode
impl<const D: usize> Default for KnotMode<D>
{
    fn default() -> Self
    {
        KnotMode::Automatic
    }
}
//}}}
//{{{ struct: BgridDescriptor
/// Everything a fit needs: per-axis abscissae and orders, the knot source,
/// and the sample array.
///
/// `values` is flat with the first axis varying fastest: the sample at grid
/// index $(i_{1}, ..., i_{D})$ lives at
/// $i_{1} + n_{1} i_{2} + n_{1} n_{2} i_{3} + ...$
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(bound(
    serialize = "[Vec<f64>; D]: serde::Serialize, [usize; D]: serde::Serialize",
    deserialize = "[Vec<f64>; D]: serde::Deserialize<'de>, [usize; D]: serde::Deserialize<'de>"
))]
pub struct BgridDescriptor<const D: usize>
{
    pub abscissae: [Vec<f64>; D],
    pub orders: [usize; D],
    pub knots: KnotMode<D>,
    pub values: Vec<f64>,
}
//}}}
//{{{ impl: Descriptor for BgridDescriptor
impl<const D: usize> Descriptor for BgridDescriptor<D>
{
    type Error = FitError;

    /// Checks the descriptor axis by axis: sample count, order, abscissa
    /// monotonicity, then the supplied knots if any; finally the sample
    /// array size.
    fn is_valid(&self) -> Result<(), FitError>
    {
        if D < 1 || D > DMAX
        {
            return Err(FitError::UnsupportedDimension(D));
        }

        for axis in 0..D
        {
            let n = self.abscissae[axis].len();
            if n < 3
            {
                return Err(FitError::TooFewSamples { axis, n });
            }

            let k = self.orders[axis];
            let max = (n - 1).min(KMAX);
            if k < 2 || k > max
            {
                return Err(FitError::BadOrder { axis, k, max });
            }

            if !self.abscissae[axis].windows(2).all(|w| w[0] < w[1])
            {
                return Err(FitError::AbscissaeNotIncreasing { axis });
            }

            if let KnotMode::Supplied(knots) = &self.knots
            {
                let t = &knots[axis];
                if t.len() != n + k || !t.windows(2).all(|w| w[0] <= w[1])
                {
                    return Err(FitError::BadKnots { axis });
                }
            }
        }

        let expected: usize = self.abscissae.iter().map(Vec::len).product();
        if self.values.len() != expected
        {
            return Err(FitError::BadSampleCount {
                expected,
                found: self.values.len(),
            });
        }
        Ok(())
    }
}
//}}}
//{{{ struct: Axis
/// One axis of a fitted grid: its order and knot vector. The number of
/// coefficients along the axis is `knots.len() - k`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
struct Axis
{
    k: usize,
    knots: Vec<f64>,
}
//}}}
//{{{ impl: Axis
impl Axis
{
    fn order(&self) -> usize
    {
        self.k
    }

    fn len(&self) -> usize
    {
        self.knots.len() - self.k
    }

    fn knots(&self) -> &[f64]
    {
        &self.knots
    }
}
//}}}
//{{{ collection: Bgrid
//{{{ struct: Bgrid
/// A tensor-product B-spline interpolant of scalar samples on a `D`
/// dimensional rectilinear grid.
///
/// Built once by [Bgrid::fit], then evaluated any number of times. The
/// coefficient array has the shape of the sample array but does not hold the
/// samples: it holds the B-spline coefficients whose tensor-product spline
/// passes through every sample. Neither the axes nor the coefficients change
/// after the fit.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(bound(
    serialize = "[Axis; D]: serde::Serialize",
    deserialize = "[Axis; D]: serde::Deserialize<'de>"
))]
pub struct Bgrid<const D: usize>
{
    axes: [Axis; D],
    coeffs: Vec<f64>,
}
//}}}
//{{{ types: Bgrid aliases
pub type Bgrid2 = Bgrid<2>;
pub type Bgrid3 = Bgrid<3>;
pub type Bgrid4 = Bgrid<4>;
pub type Bgrid5 = Bgrid<5>;
pub type Bgrid6 = Bgrid<6>;
//}}}
//{{{ impl: Bgrid
impl<const D: usize> Bgrid<D>
{
    //{{{ fun: fit
    /// Fits the interpolant to the descriptor.
    ///
    /// The sample array is swept once per axis: each sweep solves the 1D
    /// collocation system of that axis for every line of the array, writing
    /// coefficients transposed so the following axis is again contiguous.
    /// The sweeps alternate between two internal buffers; after `D` of them
    /// the axis order is back where it started.
    pub fn fit(desc: &BgridDescriptor<D>) -> Result<Self, FitError>
    {
        desc.is_valid()?;

        let axes: [Axis; D] = std::array::from_fn(|a| {
            let knots = match &desc.knots
            {
                KnotMode::Automatic =>
                {
                    spl::not_a_knot(&desc.abscissae[a], desc.orders[a])
                }
                KnotMode::Supplied(user) => user[a].clone(),
            };
            Axis {
                k: desc.orders[a],
                knots,
            }
        });

        let mut src = desc.values.clone();
        let mut dst = vec![0.0; src.len()];

        for a in 0..D
        {
            fit_axis(
                &desc.abscissae[a],
                axes[a].knots(),
                axes[a].order(),
                &src,
                &mut dst,
            )
            .map_err(|_| FitError::SchoenbergWhitney { axis: a })?;
            mem::swap(&mut src, &mut dst);
        }

        Ok(Self { axes, coeffs: src })
    }
    //..............................................................................................
    //}}}
    //{{{ fun: eval
    /// Evaluates the interpolant at `x`, returning 0 for any query outside
    /// the knot span of an axis.
    ///
    /// Builds a fresh [EvalState] per call; batches of queries should create
    /// one with [Bgrid::eval_state] and use [Bgrid::eval_with] instead.
    pub fn eval(
        &self,
        x: &[f64; D],
    ) -> f64
    {
        self.eval_with(&mut self.eval_state(), x)
    }
    //..............................................................................................
    //}}}
    //{{{ fun: eval_with
    /// Evaluates the interpolant at `x` using a caller-owned state.
    pub fn eval_with(
        &self,
        state: &mut EvalState<D>,
        x: &[f64; D],
    ) -> f64
    {
        self.eval_diff_with(state, x, &[0; D])
    }
    //..............................................................................................
    //}}}
    //{{{ fun: eval_diff
    /// Evaluates the mixed partial derivative of orders `deriv` at `x`,
    /// returning 0 for out-of-span or invalid queries.
    pub fn eval_diff(
        &self,
        x: &[f64; D],
        deriv: &[usize; D],
    ) -> f64
    {
        self.eval_diff_with(&mut self.eval_state(), x, deriv)
    }
    //..............................................................................................
    //}}}
    //{{{ fun: eval_diff_with
    /// Evaluates the mixed partial derivative of orders `deriv` at `x` using
    /// a caller-owned state. Every failure is reported as a zero return; the
    /// suppressed condition goes to the trace log.
    pub fn eval_diff_with(
        &self,
        state: &mut EvalState<D>,
        x: &[f64; D],
        deriv: &[usize; D],
    ) -> f64
    {
        match self.try_eval_diff_with(state, x, deriv)
        {
            Ok(v) => v,
            Err(err) =>
            {
                log::trace!("query {:?} suppressed: {}", x, err);
                0.0
            }
        }
    }
    //..............................................................................................
    //}}}
    //{{{ fun: try_eval_diff_with
    /// As [Bgrid::eval_diff_with], but surfaces the failure instead of
    /// folding it into a zero return.
    pub fn try_eval_diff_with(
        &self,
        state: &mut EvalState<D>,
        x: &[f64; D],
        deriv: &[usize; D],
    ) -> Result<f64, EvalError>
    {
        for a in 0..D
        {
            let k = self.axes[a].order();
            if deriv[a] >= k
            {
                return Err(EvalError::BadDerivative { deriv: deriv[a], k });
            }
        }

        // the in-range test runs against the full knot span of each axis, so
        // a single out-of-span coordinate silences the whole query
        for a in 0..D
        {
            let t = self.axes[a].knots();
            if x[a] < t[0] || x[a] > t[t.len() - 1]
            {
                return Err(EvalError::OutOfDomain);
            }
        }

        let EvalState {
            span_hints,
            eval_hints,
            work,
            stair,
        } = state;

        if D == 1
        {
            let ax = &self.axes[0];
            return spl::eval(
                ax.knots(),
                &self.coeffs,
                ax.order(),
                deriv[0],
                x[0],
                &mut eval_hints[0],
                work,
            );
        }

        // locate the knot interval of every axis above the first; the first
        // axis is located inside the 1D evaluations themselves
        let mut left = [0usize; D];
        for a in 1..D
        {
            let t = self.axes[a].knots();
            let ka = self.axes[a].order();
            let (i, loc) = spl::find_interval(t, x[a], &mut span_hints[a]);
            if loc != SpanLocation::Inside
            {
                return Err(EvalError::OutOfDomain);
            }
            if i + 1 < ka || i + 1 + ka > t.len()
            {
                return Err(EvalError::OutOfDomain);
            }
            left[a] = i;
        }

        let mut stride = [1usize; D];
        for a in 1..D
        {
            stride[a] = stride[a - 1] * self.axes[a - 1].len();
        }

        let n0 = self.axes[0].len();
        let k0 = self.axes[0].order();
        let t0 = self.axes[0].knots();

        // first stage: collapse the first axis once per combination of the
        // active coefficient columns of the higher axes. Decoding the line
        // counter with the first inner axis fastest keeps each later stage
        // reading contiguous runs of the staircase.
        let mut len1 = 1usize;
        for a in 1..D
        {
            len1 *= self.axes[a].order();
        }

        for q in 0..len1
        {
            let mut rem = q;
            let mut off = 0usize;
            for a in 1..D
            {
                let ka = self.axes[a].order();
                off += (left[a] + 1 - ka + rem % ka) * stride[a];
                rem /= ka;
            }
            stair[q] = spl::eval(
                t0,
                &self.coeffs[off..off + n0],
                k0,
                deriv[0],
                x[0],
                &mut eval_hints[0],
                work,
            )?;
        }

        // middle stages: each consumes the previous staircase region line by
        // line, collapsing one more axis against a 2k-knot window
        let mut in_off = 0usize;
        let mut in_len = len1;
        for a in 1..D - 1
        {
            let ka = self.axes[a].order();
            let ta = self.axes[a].knots();
            let tloc = &ta[left[a] + 1 - ka..left[a] + 1 + ka];
            let lines = in_len / ka;

            let (head, tail) = stair.split_at_mut(in_off + in_len);
            let src = &head[in_off..];
            for q in 0..lines
            {
                tail[q] = spl::eval(
                    tloc,
                    &src[q * ka..(q + 1) * ka],
                    ka,
                    deriv[a],
                    x[a],
                    &mut eval_hints[a],
                    work,
                )?;
            }
            in_off += in_len;
            in_len = lines;
        }

        // final stage: one line left
        let ka = self.axes[D - 1].order();
        debug_assert!(in_len == ka);
        let ta = self.axes[D - 1].knots();
        let tloc = &ta[left[D - 1] + 1 - ka..left[D - 1] + 1 + ka];
        spl::eval(
            tloc,
            &stair[in_off..in_off + ka],
            ka,
            deriv[D - 1],
            x[D - 1],
            &mut eval_hints[D - 1],
            work,
        )
    }
    //..............................................................................................
    //}}}
    //{{{ fun: eval_state
    /// Builds an evaluation state sized for this interpolant: the per-axis
    /// interval hints, the de Boor scratch and the staircase of intermediate
    /// tensors. Concurrent evaluators must hold distinct states.
    pub fn eval_state(&self) -> EvalState<D>
    {
        let kmax = self.axes.iter().map(Axis::order).max().unwrap_or(1);

        let mut stair_len = 0usize;
        let mut suffix = 1usize;
        for a in (1..D).rev()
        {
            suffix *= self.axes[a].order();
            stair_len += suffix;
        }

        EvalState {
            span_hints: [0; D],
            eval_hints: [0; D],
            work: vec![0.0; 3 * kmax],
            stair: vec![0.0; stair_len],
        }
    }
    //..............................................................................................
    //}}}
    //{{{ fun: accessors
    /// Order of the given axis
    pub fn order(
        &self,
        axis: usize,
    ) -> usize
    {
        self.axes[axis].order()
    }
    //..............................................................................................

    /// Knot vector of the given axis
    pub fn knots(
        &self,
        axis: usize,
    ) -> &[f64]
    {
        self.axes[axis].knots()
    }
    //..............................................................................................

    /// Number of coefficients along each axis
    pub fn shape(&self) -> [usize; D]
    {
        std::array::from_fn(|a| self.axes[a].len())
    }
    //..............................................................................................

    /// The flat coefficient array, first axis fastest
    pub fn coeffs(&self) -> &[f64]
    {
        &self.coeffs
    }
    //..............................................................................................

    /// Coefficient at a grid index
    pub fn coeff(
        &self,
        idx: &[usize; D],
    ) -> f64
    {
        let indexer = GridIndexer::new(&self.shape());
        self.coeffs[indexer.lin_index(idx)]
    }
    //..............................................................................................

    /// Whether `x` lies within the knot span of every axis, compared
    /// tolerantly. Queries for which this holds exactly evaluate to the
    /// spline value; all others evaluate to zero.
    pub fn is_inside(
        &self,
        x: &[f64; D],
    ) -> bool
    {
        (0..D).all(|a| spl::is_member(self.axes[a].knots(), x[a]))
    }
    //..............................................................................................
    //}}}
}
//}}}
//}}}
//{{{ struct: EvalState
/// Caller-owned evaluation state: the per-axis interval hints plus the
/// scratch buffers of one query.
///
/// The hints persist between queries so that sequences with temporal
/// locality find their knot intervals in amortised constant time; resetting
/// a state never changes any result, only the lookup cost. A state borrows
/// nothing and may be kept per thread to evaluate one interpolant from many
/// threads.
pub struct EvalState<const D: usize>
{
    /// interval hints of the higher axes, threaded into the span search
    span_hints: [usize; D],
    /// interval hints of the per-axis 1D evaluations
    eval_hints: [usize; D],
    /// de Boor scratch, `3 * k` wide: active coefficients and the two
    /// knot-distance buffers
    work: Vec<f64>,
    /// staircase of intermediate tensors, one region per collapsed axis
    stair: Vec<f64>,
}
//}}}

//-------------------------------------------------------------------------------------------------
//{{{ mod: tests
#[cfg(test)]
mod tests
{
    use super::*;
    use crate::common::{EvalError, FitError};
    use crate::test_utils::{grid_values, uniform_axis, TOL};
    use crate::utilities::{sup_norm_rel, GridIndexer, GridView};
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    fn descriptor<const D: usize>(
        n: usize,
        k: usize,
        f: &dyn Fn(&[f64; D]) -> f64,
    ) -> BgridDescriptor<D>
    {
        let abscissae: [Vec<f64>; D] = std::array::from_fn(|_| uniform_axis(n));
        let values = grid_values(&abscissae, f);
        BgridDescriptor {
            abscissae,
            orders: [k; D],
            knots: KnotMode::Automatic,
            values,
        }
    }

    /// Fits `f` on a uniform grid and checks the interpolation identity at
    /// the grid points listed by `picks` (all of them when `picks` is None).
    fn assert_interpolates<const D: usize>(
        n: usize,
        k: usize,
        f: &dyn Fn(&[f64; D]) -> f64,
        picks: Option<&dyn Fn(&[usize; D]) -> bool>,
    )
    {
        let desc = descriptor(n, k, f);
        let spline = Bgrid::fit(&desc).unwrap();
        let mut state = spline.eval_state();

        let samples = GridView::new(desc.values.as_slice(), &spline.shape());
        let indexer = GridIndexer::new(&spline.shape());
        let mut got = Vec::new();
        let mut want = Vec::new();
        for q in 0..indexer.len()
        {
            let idx = indexer.tuple_index(q);
            if let Some(keep) = picks
            {
                if !keep(&idx)
                {
                    continue;
                }
            }
            let point: [f64; D] = std::array::from_fn(|a| desc.abscissae[a][idx[a]]);
            got.push(spline.eval_with(&mut state, &point));
            want.push(samples[&idx]);
        }
        assert!(sup_norm_rel(&got, &want) <= TOL);
    }

    #[test]
    fn interpolates_2d()
    {
        let f = |p: &[f64; 2]| 0.5 * (p[1] * (-p[0]).exp() + (0.5 * PI * p[1]).sin());
        assert_interpolates(6, 4, &f, None);
    }

    #[test]
    fn interpolates_3d()
    {
        let f = |p: &[f64; 3]| {
            0.5 * (p[1] * (-p[0]).exp() + p[2] * (0.5 * PI * p[1]).sin())
        };
        assert_interpolates(6, 4, &f, None);
    }

    #[test]
    fn interpolates_4d()
    {
        let f = |p: &[f64; 4]| {
            0.5 * (p[1] * (-p[0]).exp() + p[2] * (0.5 * PI * p[1]).sin() + p[3])
        };
        assert_interpolates(6, 4, &f, None);
    }

    #[test]
    fn interpolates_5d()
    {
        let f = |p: &[f64; 5]| {
            0.5 * (p[1] * (-p[0]).exp() + p[2] * (0.5 * PI * p[1]).sin() + p[3] * p[4])
        };
        assert_interpolates(6, 4, &f, None);
    }

    #[test]
    fn interpolates_6d()
    {
        let f = |p: &[f64; 6]| {
            0.5 * (p[1] * (-p[0]).exp()
                + p[2] * (0.5 * PI * p[1]).sin()
                + p[3] * p[4]
                + 2.0 * p[5])
        };
        // the full grid has 6^6 points; spot-check a lattice plus the corners
        let keep = |idx: &[usize; 6]| {
            idx.iter().all(|&i| i % 2 == 0 || i == 5)
        };
        assert_interpolates(6, 4, &f, Some(&keep));
    }

    macro_rules! interpolates_orders_2d {
        ($test_name:ident, $order:expr) => {
            #[test]
            fn $test_name()
            {
                let f = |p: &[f64; 2]| (p[0] - 0.3) * (p[1] + 0.2) + (2.0 * p[0]).cos();
                assert_interpolates(7, $order, &f, None);
            }
        };
    }
    interpolates_orders_2d!(interpolates_2d_k2, 2);
    interpolates_orders_2d!(interpolates_2d_k3, 3);
    interpolates_orders_2d!(interpolates_2d_k5, 5);
    interpolates_orders_2d!(interpolates_2d_k6, 6);

    #[test]
    fn out_of_span_queries_return_zero()
    {
        let f = |p: &[f64; 2]| 0.5 * (p[1] * (-p[0]).exp() + (0.5 * PI * p[1]).sin());
        let desc = descriptor(6, 4, &f);
        let spline = Bgrid::fit(&desc).unwrap();

        assert_eq!(spline.eval(&[-0.1, 0.5]), 0.0);
        assert_eq!(spline.eval(&[0.5, -0.1]), 0.0);
        assert_eq!(spline.eval(&[0.5, 2.0]), 0.0);
        assert_eq!(spline.eval(&[2.0, 2.0]), 0.0);

        let mut state = spline.eval_state();
        assert_eq!(
            spline.try_eval_diff_with(&mut state, &[-0.1, 0.5], &[0, 0]),
            Err(EvalError::OutOfDomain)
        );
    }

    #[test]
    fn derivative_of_plane_is_constant()
    {
        let f = |p: &[f64; 2]| 2.0 * p[0] + 3.0 * p[1] + 1.0;
        let desc = descriptor(6, 4, &f);
        let spline = Bgrid::fit(&desc).unwrap();
        let mut state = spline.eval_state();

        for i in 0..=20
        {
            for j in 0..=20
            {
                let p = [i as f64 * 0.05, j as f64 * 0.05];
                let dx = spline.eval_diff_with(&mut state, &p, &[1, 0]);
                let dy = spline.eval_diff_with(&mut state, &p, &[0, 1]);
                assert_relative_eq!(dx, 2.0, max_relative = TOL);
                assert_relative_eq!(dy, 3.0, max_relative = TOL);
            }
        }
    }

    #[test]
    fn mixed_derivative_of_bilinear_is_constant()
    {
        let f = |p: &[f64; 2]| 4.0 * p[0] * p[1] + p[0] - p[1];
        let desc = descriptor(6, 4, &f);
        let spline = Bgrid::fit(&desc).unwrap();
        let mut state = spline.eval_state();

        for i in 0..=10
        {
            let p = [i as f64 * 0.1, 1.0 - i as f64 * 0.09];
            let dxy = spline.eval_diff_with(&mut state, &p, &[1, 1]);
            assert_relative_eq!(dxy, 4.0, max_relative = 1e-11);
        }
    }

    #[test]
    fn axis_permutation_is_immaterial()
    {
        let f = |p: &[f64; 2]| 0.5 * (p[1] * (-p[0]).exp() + (0.5 * PI * p[1]).sin());
        let ft = |p: &[f64; 2]| f(&[p[1], p[0]]);

        let spline = Bgrid::fit(&descriptor(6, 4, &f)).unwrap();
        let transposed = Bgrid::fit(&descriptor(6, 4, &ft)).unwrap();

        let mut s1 = spline.eval_state();
        let mut s2 = transposed.eval_state();
        for i in 0..=10
        {
            for j in 0..=10
            {
                let p = [i as f64 * 0.1, j as f64 * 0.1];
                let v1 = spline.eval_with(&mut s1, &p);
                let v2 = transposed.eval_with(&mut s2, &[p[1], p[0]]);
                assert_relative_eq!(v1, v2, max_relative = TOL, epsilon = TOL);
            }
        }
    }

    #[test]
    fn supplied_knots_match_automatic()
    {
        let f = |p: &[f64; 2]| p[0] * p[0] - p[1];
        let base = descriptor(6, 4, &f);
        let spline = Bgrid::fit(&base).unwrap();

        let supplied = BgridDescriptor {
            knots: KnotMode::Supplied(std::array::from_fn(|a| {
                spline.knots(a).to_vec()
            })),
            ..base
        };
        let respline = Bgrid::fit(&supplied).unwrap();

        assert_eq!(spline.coeffs().len(), respline.coeffs().len());
        for (a, b) in spline.coeffs().iter().zip(respline.coeffs().iter())
        {
            assert_eq!(a.to_bits(), b.to_bits());
        }
    }

    #[test]
    fn refit_is_deterministic()
    {
        let f = |p: &[f64; 3]| (p[0] + 2.0 * p[1]).sin() + p[2];
        let desc = descriptor(5, 3, &f);
        let one = Bgrid::fit(&desc).unwrap();
        let two = Bgrid::fit(&desc).unwrap();

        for (a, b) in one.coeffs().iter().zip(two.coeffs().iter())
        {
            assert_eq!(a.to_bits(), b.to_bits());
        }
    }

    #[test]
    fn validation_taxonomy()
    {
        let f = |p: &[f64; 2]| p[0] + p[1];

        let good = descriptor(6, 4, &f);
        assert!(good.is_valid().is_ok());

        let mut bad = good.clone();
        bad.abscissae[0] = vec![0.0, 1.0];
        let err = Bgrid::fit(&bad).unwrap_err();
        assert_eq!(err, FitError::TooFewSamples { axis: 0, n: 2 });
        assert_eq!(err.compat_code(), Some(3));

        let mut bad = good.clone();
        bad.orders[1] = 1;
        let err = Bgrid::fit(&bad).unwrap_err();
        assert_eq!(
            err,
            FitError::BadOrder {
                axis: 1,
                k: 1,
                max: 5
            }
        );
        assert_eq!(err.compat_code(), Some(8));

        let mut bad = good.clone();
        bad.abscissae[0][3] = 0.0;
        let err = Bgrid::fit(&bad).unwrap_err();
        assert_eq!(err, FitError::AbscissaeNotIncreasing { axis: 0 });
        assert_eq!(err.compat_code(), Some(5));

        let mut bad = good.clone();
        bad.knots = KnotMode::Supplied([vec![0.0; 10], vec![0.0; 3]]);
        let err = Bgrid::fit(&bad).unwrap_err();
        assert_eq!(err, FitError::BadKnots { axis: 1 });
        assert_eq!(err.compat_code(), Some(10));

        let mut bad = good.clone();
        bad.values.pop();
        let err = Bgrid::fit(&bad).unwrap_err();
        assert_eq!(
            err,
            FitError::BadSampleCount {
                expected: 36,
                found: 35
            }
        );
        assert_eq!(err.compat_code(), None);
    }

    #[test]
    fn schoenberg_whitney_violation_names_the_axis()
    {
        let f = |p: &[f64; 2]| p[0] + p[1];
        let mut desc = descriptor(6, 4, &f);

        let good_y = crate::splines::not_a_knot(&desc.abscissae[1], 4);
        let bad_x = vec![0.0, 0.0, 0.0, 0.0, 0.01, 0.02, 1.02, 1.02, 1.02, 1.02];
        desc.knots = KnotMode::Supplied([bad_x, good_y]);

        assert_eq!(
            Bgrid::fit(&desc).unwrap_err(),
            FitError::SchoenbergWhitney { axis: 0 }
        );
    }

    #[test]
    fn invalid_derivative_orders_are_silenced()
    {
        let f = |p: &[f64; 2]| p[0] + p[1];
        let spline = Bgrid::fit(&descriptor(6, 4, &f)).unwrap();
        let mut state = spline.eval_state();

        assert_eq!(spline.eval_diff(&[0.5, 0.5], &[4, 0]), 0.0);
        assert_eq!(
            spline.try_eval_diff_with(&mut state, &[0.5, 0.5], &[0, 7]),
            Err(EvalError::BadDerivative { deriv: 7, k: 4 })
        );
    }

    #[test]
    fn shared_state_matches_fresh_state()
    {
        let f = |p: &[f64; 3]| (3.0 * p[0]).sin() * p[1] + p[2] * p[2];
        let spline = Bgrid::fit(&descriptor(6, 4, &f)).unwrap();
        let mut shared = spline.eval_state();

        // a zig-zag sweep exercising the hint paths in both directions
        for i in 0..200
        {
            let s = i as f64 / 199.0;
            let p = [
                if i % 2 == 0 { s } else { 1.0 - s },
                (2.7 * s) % 1.0,
                1.0 - (1.3 * s) % 1.0,
            ];
            let a = spline.eval_with(&mut shared, &p);
            let b = spline.eval(&p);
            assert_eq!(a.to_bits(), b.to_bits());
        }
    }

    #[test]
    fn accessors()
    {
        let f = |p: &[f64; 2]| p[0] + p[1];
        let spline = Bgrid::fit(&descriptor(6, 4, &f)).unwrap();

        assert_eq!(spline.shape(), [6, 6]);
        assert_eq!(spline.order(0), 4);
        assert_eq!(spline.knots(0).len(), 10);
        assert_eq!(spline.coeffs().len(), 36);
        assert_eq!(spline.coeff(&[2, 3]), spline.coeffs()[3 * 6 + 2]);

        assert!(spline.is_inside(&[0.5, 1.0]));
        assert!(!spline.is_inside(&[-0.5, 0.5]));
    }

    #[test]
    fn serde_round_trip()
    {
        let f = |p: &[f64; 2]| 0.5 * (p[1] * (-p[0]).exp() + (0.5 * PI * p[1]).sin());
        let spline = Bgrid::fit(&descriptor(6, 4, &f)).unwrap();

        let text = serde_json::to_string(&spline).unwrap();
        let back: Bgrid<2> = serde_json::from_str(&text).unwrap();
        assert_eq!(spline, back);

        let p = [0.37, 0.81];
        assert_eq!(spline.eval(&p).to_bits(), back.eval(&p).to_bits());
    }
}
//}}}
