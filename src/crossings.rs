//! Zero crossings on a fixed-step trajectory
//!
//! A scalar function `g(t, y)` is watched while the state is stepped with
//! RK4. When `g` changes sign between two steps, the crossing time is located
//! with Brent's method on a cubic Hermite interpolant of the step, so no
//! extra RK4 steps are taken.
//!
//! The pendulum use is measuring the oscillation period: successive rising
//! crossings of θ are one period apart.

use thiserror::Error;

use crate::error::Result;
use crate::solver::{validate_inputs, OdeSystem, Rk4};

/// Scalar function of the state whose zeros are wanted
pub trait CrossingFunction<const N: usize> {
    /// Value of g at `(t, y)`
    fn eval(&self, t: f64, y: &[f64; N]) -> f64;
}

impl<const N: usize, F: Fn(f64, &[f64; N]) -> f64> CrossingFunction<N> for F {
    fn eval(&self, t: f64, y: &[f64; N]) -> f64 {
        self(t, y)
    }
}

/// Which sign changes count
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    /// Negative to positive
    Rising,
    /// Positive to negative
    Falling,
    /// Either way
    #[default]
    Any,
}

/// A located crossing
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Crossing<const N: usize> {
    /// Time of the crossing
    pub t: f64,
    /// Interpolated state at `t`
    pub y: [f64; N],
    /// Residual g(t, y), close to zero
    pub residual: f64,
}

/// Failures of the bracketing root finder
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RootError {
    /// f(a) and f(b) have the same sign
    #[error("root not bracketed: f({a}) = {fa}, f({b}) = {fb}")]
    NotBracketed {
        /// Left end
        a: f64,
        /// Right end
        b: f64,
        /// f(a)
        fa: f64,
        /// f(b)
        fb: f64,
    },
    /// Iteration budget ran out; `best` is the last estimate
    #[error("no convergence after {iterations} iterations (best {best}, f = {f_best})")]
    NoConvergence {
        /// Best estimate
        best: f64,
        /// f(best)
        f_best: f64,
        /// Iterations spent
        iterations: usize,
    },
}

/// Root of a bracketed scalar function
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Root {
    /// Location
    pub x: f64,
    /// f(x)
    pub fx: f64,
    /// Iterations used
    pub iterations: usize,
}

/// Brent's bracketing root finder.
///
/// Inverse quadratic interpolation or secant steps, with a bisection
/// fallback whenever the interpolated step is not clearly making progress.
///
/// Reference: Brent, R.P. (1973). "Algorithms for Minimization without
/// Derivatives". Prentice-Hall.
#[derive(Debug, Clone, Copy)]
pub struct Brent {
    /// Bracket width at which to stop
    pub tol: f64,
    /// Iteration budget
    pub max_iter: usize,
}

impl Default for Brent {
    fn default() -> Self {
        Self {
            tol: 1e-12,
            max_iter: 60,
        }
    }
}

impl Brent {
    /// Find a root of `f` in `[a, b]`; `f(a)` and `f(b)` must differ in sign.
    pub fn solve<F>(&self, mut f: F, a: f64, b: f64) -> std::result::Result<Root, RootError>
    where
        F: FnMut(f64) -> f64,
    {
        let (fa, fb) = (f(a), f(b));
        self.solve_with(f, a, b, fa, fb)
    }

    /// As [`solve`](Self::solve), reusing already known end values.
    pub fn solve_with<F>(
        &self,
        mut f: F,
        a: f64,
        b: f64,
        fa: f64,
        fb: f64,
    ) -> std::result::Result<Root, RootError>
    where
        F: FnMut(f64) -> f64,
    {
        if fa * fb > 0.0 {
            return Err(RootError::NotBracketed { a, b, fa, fb });
        }

        // `b` is the best estimate, `a` the contrapoint, `c` the previous b.
        let (mut a, mut b, mut fa, mut fb) = if fa.abs() < fb.abs() {
            (b, a, fb, fa)
        } else {
            (a, b, fa, fb)
        };
        let (mut c, mut fc) = (a, fa);
        let mut d = b - a;
        let mut bisected = true;

        for iteration in 1..=self.max_iter {
            if fb == 0.0 || (b - a).abs() <= self.tol {
                return Ok(Root {
                    x: b,
                    fx: fb,
                    iterations: iteration,
                });
            }

            let interpolated = if fa != fc && fb != fc {
                a * fb * fc / ((fa - fb) * (fa - fc))
                    + b * fa * fc / ((fb - fa) * (fb - fc))
                    + c * fa * fb / ((fc - fa) * (fc - fb))
            } else if fa != fb {
                b - fb * (b - a) / (fb - fa)
            } else {
                0.5 * (a + b)
            };

            let quarter = (3.0 * a + b) / 4.0;
            let last_gap = if bisected { (b - c).abs() } else { (c - d).abs() };
            let reject = (interpolated - quarter) * (interpolated - b) > 0.0
                || (interpolated - b).abs() >= 0.5 * last_gap
                || last_gap < self.tol;

            let s = if reject { 0.5 * (a + b) } else { interpolated };
            bisected = reject;

            let fs = f(s);
            d = c;
            c = b;
            fc = fb;

            if fa * fs < 0.0 {
                b = s;
                fb = fs;
            } else {
                a = s;
                fa = fs;
            }
            if fa.abs() < fb.abs() {
                std::mem::swap(&mut a, &mut b);
                std::mem::swap(&mut fa, &mut fb);
            }
        }

        Err(RootError::NoConvergence {
            best: b,
            f_best: fb,
            iterations: self.max_iter,
        })
    }
}

/// Whether the change from `g_old` to `g_new` is a crossing in `direction`.
///
/// Landing exactly on zero counts; leaving zero does not, so a root hit at a
/// step boundary is reported once.
pub fn sign_change(g_old: f64, g_new: f64, direction: Direction) -> bool {
    if g_old * g_new > 0.0 || g_old == 0.0 {
        return false;
    }
    if g_new == 0.0 {
        return true;
    }
    match direction {
        Direction::Rising => g_old < 0.0,
        Direction::Falling => g_old > 0.0,
        Direction::Any => true,
    }
}

/// Step `y0` from `t0` to `tf` with fixed step `h` and collect every crossing
/// of `g` in `direction`.
#[allow(clippy::too_many_arguments)]
pub fn find_crossings<S, G, const N: usize>(
    sys: &S,
    params: &S::Params,
    g: &G,
    direction: Direction,
    t0: f64,
    y0: &[f64; N],
    tf: f64,
    h: f64,
) -> Result<Vec<Crossing<N>>>
where
    S: OdeSystem<N>,
    G: CrossingFunction<N>,
{
    validate_inputs(t0, y0, tf, h)?;
    if tf < t0 || h < 0.0 {
        return Err(crate::error::Error::InvalidStep {
            h,
            reason: "crossing search only runs forward in time",
        });
    }

    let brent = Brent::default();
    let mut solver = Rk4::new();
    let mut crossings = Vec::new();

    let mut t = t0;
    let mut y = *y0;
    let mut g_prev = g.eval(t, &y);

    while t < tf {
        let h_step = h.min(tf - t);
        let y_prev = y;
        solver.step(sys, params, t, &mut y, h_step);
        let t_next = t + h_step;
        let g_next = g.eval(t_next, &y);

        if sign_change(g_prev, g_next, direction) {
            let segment = HermiteSegment::new(sys, params, t, &y_prev, t_next, &y);
            let g_at = |s: f64| g.eval(s, &segment.at(s));
            let crossing = match brent.solve_with(g_at, t, t_next, g_prev, g_next) {
                Ok(root) => Crossing {
                    t: root.x,
                    y: segment.at(root.x),
                    residual: root.fx,
                },
                Err(RootError::NoConvergence { best, f_best, .. }) => Crossing {
                    t: best,
                    y: segment.at(best),
                    residual: f_best,
                },
                // Unreachable after sign_change, but keep the step end.
                Err(RootError::NotBracketed { .. }) => Crossing {
                    t: t_next,
                    y,
                    residual: g_next,
                },
            };
            crossings.push(crossing);
        }

        t = t_next;
        g_prev = g_next;
    }

    Ok(crossings)
}

/// Mean spacing of successive rising zero crossings of `y[component]`.
///
/// Returns `None` when fewer than two crossings occur in `[t0, tf]`, and
/// `InvalidInput` when `component` is not an index into the state.
#[allow(clippy::too_many_arguments)]
pub fn measure_period<S, const N: usize>(
    sys: &S,
    params: &S::Params,
    component: usize,
    t0: f64,
    y0: &[f64; N],
    tf: f64,
    h: f64,
) -> Result<Option<f64>>
where
    S: OdeSystem<N>,
{
    if component >= N {
        return Err(crate::error::Error::InvalidInput {
            message: format!(
                "component {} out of range for a {}-dimensional state",
                component, N
            ),
        });
    }
    let g = move |_t: f64, y: &[f64; N]| y[component];
    let crossings = find_crossings(sys, params, &g, Direction::Rising, t0, y0, tf, h)?;
    if crossings.len() < 2 {
        return Ok(None);
    }
    let first = crossings[0].t;
    let last = crossings[crossings.len() - 1].t;
    Ok(Some((last - first) / (crossings.len() - 1) as f64))
}

/// Cubic Hermite interpolant of one step, O(h⁴) accurate in the state.
struct HermiteSegment<const N: usize> {
    t_a: f64,
    dt: f64,
    y_a: [f64; N],
    y_b: [f64; N],
    f_a: [f64; N],
    f_b: [f64; N],
}

impl<const N: usize> HermiteSegment<N> {
    fn new<S: OdeSystem<N>>(
        sys: &S,
        params: &S::Params,
        t_a: f64,
        y_a: &[f64; N],
        t_b: f64,
        y_b: &[f64; N],
    ) -> Self {
        let mut f_a = [0.0; N];
        let mut f_b = [0.0; N];
        sys.rhs(t_a, y_a, params, &mut f_a);
        sys.rhs(t_b, y_b, params, &mut f_b);
        Self {
            t_a,
            dt: t_b - t_a,
            y_a: *y_a,
            y_b: *y_b,
            f_a,
            f_b,
        }
    }

    fn at(&self, t: f64) -> [f64; N] {
        let s = (t - self.t_a) / self.dt;
        let s2 = s * s;
        let s3 = s2 * s;
        let h00 = 1.0 - 3.0 * s2 + 2.0 * s3;
        let h10 = s - 2.0 * s2 + s3;
        let h01 = 3.0 * s2 - 2.0 * s3;
        let h11 = s3 - s2;

        let mut y = [0.0; N];
        for (i, yi) in y.iter_mut().enumerate() {
            *yi = h00 * self.y_a[i]
                + h10 * self.dt * self.f_a[i]
                + h01 * self.y_b[i]
                + h11 * self.dt * self.f_b[i];
        }
        y
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DrivenPendulum, PendulumParameters};
    use std::f64::consts::PI;

    #[test]
    fn test_brent_sqrt2() {
        let root = Brent::default().solve(|x| x * x - 2.0, 0.0, 2.0).unwrap();
        assert!((root.x - 2.0_f64.sqrt()).abs() < 1e-12);
        assert!(root.fx.abs() < 1e-12);
    }

    #[test]
    fn test_brent_sine() {
        let root = Brent::default().solve(f64::sin, 3.0, 4.0).unwrap();
        assert!((root.x - PI).abs() < 1e-12);
    }

    #[test]
    fn test_brent_root_at_endpoint() {
        let root = Brent::default().solve(|x| x + 1.0, -1.0, 1.0).unwrap();
        assert_eq!(root.x, -1.0);
        assert_eq!(root.iterations, 1);
    }

    #[test]
    fn test_brent_triple_root() {
        let brent = Brent {
            tol: 1e-12,
            max_iter: 200,
        };
        let root = brent.solve(|x| (x - 1.0).powi(3), 0.0, 2.0).unwrap();
        assert!((root.x - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_brent_not_bracketed() {
        let err = Brent::default().solve(|x| x * x + 1.0, -1.0, 1.0).unwrap_err();
        assert!(matches!(err, RootError::NotBracketed { .. }));
    }

    #[test]
    fn test_brent_budget_exhausted() {
        let brent = Brent {
            tol: 0.0,
            max_iter: 3,
        };
        let err = brent.solve(|x| x.powi(3) - x - 2.0, 1.0, 2.0).unwrap_err();
        match err {
            RootError::NoConvergence { best, iterations, .. } => {
                assert_eq!(iterations, 3);
                assert!((1.0..=2.0).contains(&best));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_sign_change() {
        assert!(sign_change(-1.0, 1.0, Direction::Rising));
        assert!(!sign_change(1.0, -1.0, Direction::Rising));
        assert!(sign_change(1.0, -1.0, Direction::Falling));
        assert!(!sign_change(-1.0, 1.0, Direction::Falling));
        assert!(sign_change(-1.0, 1.0, Direction::Any));
        assert!(sign_change(1.0, 0.0, Direction::Any));
        assert!(!sign_change(0.0, 1.0, Direction::Any));
        assert!(!sign_change(1.0, 2.0, Direction::Any));
    }

    #[test]
    fn test_small_oscillation_period() {
        // Linear limit: T = 2π/ω0, with a finite-amplitude correction of
        // roughly θ0²/16 that is negligible at θ0 = 0.01.
        let params = PendulumParameters {
            omega0: 2.0,
            alpha: 0.0,
            f_ext: 0.0,
            theta0: 0.01,
            theta_dot0: 0.0,
            ..Default::default()
        };
        let period = measure_period(
            &DrivenPendulum,
            &params,
            0,
            0.0,
            &params.initial_state(),
            20.0,
            0.01,
        )
        .unwrap()
        .unwrap();
        let expected = 2.0 * PI / 2.0;
        assert!(
            (period - expected).abs() / expected < 1e-4,
            "period {} vs {}",
            period,
            expected
        );
    }

    #[test]
    fn test_falling_crossings_of_cosine() {
        // θ(t) = cos(t) for the undamped linear oscillator started at rest.
        struct Linear;
        impl OdeSystem<2> for Linear {
            type Params = ();
            fn derivative(&self, _t: f64, y: &[f64; 2], i: usize, _: &()) -> f64 {
                if i == 0 {
                    y[1]
                } else {
                    -y[0]
                }
            }
        }
        let g = |_t: f64, y: &[f64; 2]| y[0];
        let crossings =
            find_crossings(&Linear, &(), &g, Direction::Falling, 0.0, &[1.0, 0.0], 10.0, 0.05)
                .unwrap();
        // cos falls through zero at π/2 and 5π/2.
        assert_eq!(crossings.len(), 2);
        assert!((crossings[0].t - PI / 2.0).abs() < 1e-5);
        assert!((crossings[1].t - 5.0 * PI / 2.0).abs() < 1e-5);
        assert!((crossings[0].y[1] + 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_too_short_for_period() {
        let params = PendulumParameters {
            f_ext: 0.0,
            ..Default::default()
        };
        let period =
            measure_period(&DrivenPendulum, &params, 0, 0.0, &params.initial_state(), 1.0, 0.01)
                .unwrap();
        assert_eq!(period, None);
    }

    #[test]
    fn test_period_component_out_of_range() {
        let params = PendulumParameters::default();
        let result =
            measure_period(&DrivenPendulum, &params, 2, 0.0, &params.initial_state(), 10.0, 0.01);
        assert!(matches!(result, Err(crate::error::Error::InvalidInput { .. })));
    }

    #[test]
    fn test_crossing_search_step_below_time_resolution() {
        let params = PendulumParameters::default();
        let theta = |_t: f64, y: &[f64; 2]| y[0];
        let result = find_crossings(
            &DrivenPendulum,
            &params,
            &theta,
            Direction::Any,
            1.0e20,
            &params.initial_state(),
            1.0e20 + 1.0e5,
            0.01,
        );
        assert!(matches!(result, Err(crate::error::Error::InvalidStep { .. })));
    }
}
