//! This is the splines module.
//! In it we compute:
//! - knot intervals, with a caller-owned hint for amortised O(1) lookup
//! - B-spline basis function values via the Cox-de Boor recurrence
//! - default interpolation knot vectors
//! - spline values and derivatives via the de Boor algorithm
//!
//!

use crate::common::{EvalError, KMAX};
use approx::ulps_eq;

/// This is the tolerance with which two knots are considered equal
pub const KNOT_ULPS: u32 = 32;

/// Tolerant less-than for knots
fn knot_lt(
    u1: f64,
    u2: f64,
) -> bool
{
    u1 < u2 || ulps_eq!(u1, u2, max_ulps = KNOT_ULPS)
}
//..............................................................................................

/// Tolerant greater-than for knots
fn knot_gt(
    u1: f64,
    u2: f64,
) -> bool
{
    u1 > u2 || ulps_eq!(u1, u2, max_ulps = KNOT_ULPS)
}
//..............................................................................................

/// Checks if a given parameter value is within the range of the knot vector,
/// using tolerant comparisons for floating-point values.
pub fn is_member(
    knots: &[f64],
    u: f64,
) -> bool
{
    let umin = knots.first().unwrap();
    let umax = knots.last().unwrap();
    knot_gt(u, *umin) && knot_lt(u, *umax)
}
//..............................................................................................

/// Position of a query relative to the span of a knot vector.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpanLocation
{
    /// `x < xt[0]`
    Below,
    /// `xt[0] <= x < xt[last]`
    Inside,
    /// `x >= xt[last]`
    Above,
}
//..............................................................................................

/// Finds the index of the interval of `xt` containing the query `x`.
///
/// Returns `(ileft, loc)` where, for `loc == Inside`,
/// `xt[ileft] <= x < xt[ileft + 1]`; when several left knots equal `x` the
/// largest such index is returned. Queries below the first knot yield
/// `(0, Below)` and queries at or above the last yield
/// `(xt.len() - 1, Above)`.
///
/// `ilo` is a caller-owned hint: the search gallops outward from it with
/// doubling steps until the query is bracketed, then bisects. The hint is
/// updated so that query sequences with temporal locality resolve in
/// amortised constant time; stale hints are clamped, never rejected.
///
/// # Parameters
///
/// - `xt`: a nondecreasing slice of at least two knots.
/// - `x`: the query value.
/// - `ilo`: the caller-owned hint.
pub fn find_interval(
    xt: &[f64],
    x: f64,
    ilo: &mut usize,
) -> (usize, SpanLocation)
{
    let lxt = xt.len();
    debug_assert!(lxt >= 2, "knot vector too short");

    if *ilo > lxt - 2
    {
        *ilo = lxt - 2;
    }

    let mut lo = *ilo;
    let mut hi = lo + 1;

    if hi >= lxt - 1
    {
        if x >= xt[lxt - 1]
        {
            *ilo = lxt - 2;
            return (lxt - 1, SpanLocation::Above);
        }
        if lxt == 2
        {
            *ilo = 0;
            return if x < xt[0]
            {
                (0, SpanLocation::Below)
            }
            else
            {
                (0, SpanLocation::Inside)
            };
        }
        lo = lxt - 2;
        hi = lxt - 1;
    }

    if x >= xt[hi]
    {
        // gallop upward until bracketed
        let mut step = 1;
        loop
        {
            lo = hi;
            hi = lo + step;
            if hi >= lxt - 1
            {
                if x >= xt[lxt - 1]
                {
                    *ilo = lxt - 2;
                    return (lxt - 1, SpanLocation::Above);
                }
                hi = lxt - 1;
                break;
            }
            if x < xt[hi]
            {
                break;
            }
            step *= 2;
        }
    }
    else
    {
        if x >= xt[lo]
        {
            *ilo = lo;
            return (lo, SpanLocation::Inside);
        }
        // gallop downward until bracketed
        let mut step = 1;
        loop
        {
            hi = lo;
            if hi <= step
            {
                lo = 0;
                if x < xt[0]
                {
                    *ilo = 0;
                    return (0, SpanLocation::Below);
                }
                break;
            }
            lo = hi - step;
            if x >= xt[lo]
            {
                break;
            }
            step *= 2;
        }
    }

    // bisect: xt[lo] <= x < xt[hi]
    loop
    {
        let mid = (lo + hi) / 2;
        if mid == lo
        {
            *ilo = lo;
            return (lo, SpanLocation::Inside);
        }
        if x < xt[mid]
        {
            hi = mid;
        }
        else
        {
            lo = mid;
        }
    }
}
//..............................................................................................

/// Evaluator for the nonzero B-spline basis functions at a point.
///
/// For a query `x` with `t[ileft] <= x <= t[ileft + 1]` and an order `k`,
/// [CoxDeBoor::start] fills `values[0..k]` with
/// $b_{ileft-k+1,k}(x), ..., b_{ileft,k}(x)$, the only basis functions which
/// can be nonzero there. The recurrence runs degree by degree over two
/// buffers of knot differences; [CoxDeBoor::extend] resumes it at a higher
/// order reusing the preserved buffers and the caller's `values` slice from
/// the preceding call.
pub struct CoxDeBoor
{
    deltap: [f64; KMAX],
    deltam: [f64; KMAX],
    reached: usize,
}
//..............................................................................................

impl CoxDeBoor
{
    pub fn new() -> Self
    {
        CoxDeBoor {
            deltap: [0.0; KMAX],
            deltam: [0.0; KMAX],
            reached: 0,
        }
    }
    //..............................................................................................

    /// Evaluates the basis functions of order `jhigh` from scratch.
    pub fn start(
        &mut self,
        t: &[f64],
        x: f64,
        ileft: usize,
        jhigh: usize,
        values: &mut [f64],
    )
    {
        debug_assert!(jhigh >= 1 && jhigh <= KMAX, "order out of range");
        debug_assert!(
            t[ileft] <= x && x <= t[ileft + 1],
            "x is outside the working interval"
        );

        self.reached = 1;
        values[0] = 1.0;
        self.raise(t, x, ileft, jhigh, values);
    }
    //..............................................................................................

    /// Continues a previous evaluation up to the higher order `jhigh`.
    /// `values` must hold the result of the preceding call at the same
    /// `(t, x, ileft)`.
    pub fn extend(
        &mut self,
        t: &[f64],
        x: f64,
        ileft: usize,
        jhigh: usize,
        values: &mut [f64],
    )
    {
        debug_assert!(self.reached >= 1, "no evaluation to continue");
        debug_assert!(jhigh >= self.reached && jhigh <= KMAX, "order out of range");

        self.raise(t, x, ileft, jhigh, values);
    }
    //..............................................................................................

    fn raise(
        &mut self,
        t: &[f64],
        x: f64,
        ileft: usize,
        jhigh: usize,
        values: &mut [f64],
    )
    {
        debug_assert!(values.len() >= jhigh, "buffer too small to hold results");
        debug_assert!(ileft + 1 >= jhigh, "interval index too small for order");

        while self.reached < jhigh
        {
            let j = self.reached;
            self.deltap[j - 1] = t[ileft + j] - x;
            self.deltam[j - 1] = x - t[ileft + 1 - j];

            let mut saved = 0.0;
            for l in 0..j
            {
                let dp = self.deltap[l];
                let dm = self.deltam[j - 1 - l];
                let m = values[l] / (dp + dm);
                values[l] = saved + dp * m;
                saved = dm * m;
            }
            values[j] = saved;
            self.reached = j + 1;
        }
    }
    //..............................................................................................
}
//..............................................................................................

/// Builds the default knot vector of length `n + k` for interpolation at the
/// abscissae `x` with order `k`.
///
/// The first `k` knots sit on the first abscissa. The last `k` knots sit a
/// tenth of the final spacing beyond the last abscissa, so that the last
/// abscissa is a strict interior point of the spline support and evaluation
/// there follows the same code path as everywhere else. Interior knots fall
/// on abscissae for even `k` and on abscissa midpoints for odd `k`, the
/// not-a-knot placement of de Boor. The result satisfies the
/// Schoenberg-Whitney condition for these abscissae.
pub fn not_a_knot(
    x: &[f64],
    k: usize,
) -> Vec<f64>
{
    let n = x.len();
    debug_assert!(n >= 3, "need at least 3 abscissae");
    debug_assert!(k >= 2 && k <= n - 1, "order out of range");

    let mut t = vec![0.0; n + k];
    let rnot = x[n - 1] + 0.1 * (x[n - 1] - x[n - 2]);
    for j in 0..k
    {
        t[j] = x[0];
        t[n + j] = rnot;
    }

    if k % 2 == 1
    {
        // odd order: interior knots between data points
        let off = (k + 1) / 2;
        for j in k..n
        {
            t[j] = 0.5 * (x[j - off] + x[j - off + 1]);
        }
    }
    else
    {
        // even order: interior knots at data points
        let off = k / 2;
        for j in k..n
        {
            t[j] = x[j - off];
        }
    }
    t
}
//..............................................................................................

/// Evaluates the `deriv`-th derivative at `x` of the B-spline of order `k`
/// with knots `t` and coefficients `a`.
///
/// The domain is `t[k - 1] <= x <= t[a.len()]`; values in the interior are
/// right limits, the right endpoint yields the left limit. `hint` is the
/// caller-owned interval hint threaded into [find_interval]. `work` is
/// scratch of length at least `3 * k`, partitioned into the active
/// coefficients and the two knot-distance buffers of the de Boor recurrence;
/// keeping the three regions contiguous with fixed offsets keeps the inner
/// collapse loop free of branches.
///
/// # Parameters
///
/// - `t`: knot vector of length `a.len() + k`.
/// - `a`: the B-spline coefficients.
/// - `k`: the spline order.
/// - `deriv`: derivative order, `0` for the plain value; must be below `k`.
/// - `x`: the query point.
/// - `hint`: caller-owned interval hint.
/// - `work`: scratch slice of length at least `3 * k`.
pub fn eval(
    t: &[f64],
    a: &[f64],
    k: usize,
    deriv: usize,
    x: f64,
    hint: &mut usize,
    work: &mut [f64],
) -> Result<f64, EvalError>
{
    let n = a.len();
    if k < 1
    {
        return Err(EvalError::BadOrder(k));
    }
    if deriv >= k
    {
        return Err(EvalError::BadDerivative { deriv, k });
    }
    debug_assert!(n >= k, "fewer coefficients than the order");
    debug_assert!(t.len() >= n + k, "knot vector too short");
    debug_assert!(work.len() >= 3 * k, "work buffer too small");

    // find i with t[i] <= x < t[i + 1]; the search runs over t[..n + 1] so
    // that Above means x has reached t[n], the end of the spline support
    let (mut i, loc) = find_interval(&t[..n + 1], x, hint);
    if x < t[k - 1]
    {
        return Err(EvalError::OutOfDomain);
    }
    if loc != SpanLocation::Inside
    {
        if x > t[n]
        {
            return Err(EvalError::OutOfDomain);
        }
        // x sits exactly on the right endpoint: step back across any
        // duplicate knots to the last nonempty interval and take the left
        // limit there
        loop
        {
            if i == k - 1
            {
                return Err(EvalError::EmptyEndpointInterval);
            }
            i -= 1;
            if x != t[i]
            {
                break;
            }
        }
    }

    let kmider = k - deriv;

    let (aj, rest) = work.split_at_mut(k);
    let (dp, dm) = rest.split_at_mut(k);

    aj[..k].copy_from_slice(&a[i + 1 - k..i + 1]);

    // difference passes: turn aj into the de Boor coefficients of the
    // deriv-th derivative spline
    for j in 1..=deriv
    {
        let kmj = k - j;
        let f = kmj as f64;
        for jj in 0..kmj
        {
            aj[jj] = (aj[jj + 1] - aj[jj]) * f / (t[i + jj + 1] - t[i + jj + 1 - kmj]);
        }
    }

    if kmider > 1
    {
        for j in 0..kmider
        {
            dp[j] = t[i + 1 + j] - x;
            dm[j] = x - t[i - j];
        }
        // convex-combination passes collapsing aj[0..m] to a single value
        for m in (2..=kmider).rev()
        {
            for jj in 0..m - 1
            {
                let hi = dp[jj];
                let lo = dm[m - 2 - jj];
                aj[jj] = (aj[jj + 1] * lo + aj[jj] * hi) / (lo + hi);
            }
        }
    }
    Ok(aj[0])
}
//..............................................................................................
