//! Fixed-step Runge-Kutta 4 Integrator
//!
//! A classical 4-stage explicit Runge-Kutta stepper, generic over the state
//! dimension and over the system being integrated. The step size is chosen
//! by the caller and never adapted: there is no error estimate, no step
//! rejection and no guard against non-finite states.

use crate::coefficients::{A, B, C, STAGES};
use crate::error::{Error, Result};

/// System of ordinary differential equations: dy_i/dt = f_i(t, y; params)
///
/// The parameter block is an associated type, so a system and its
/// parameters are checked together at compile time.
pub trait OdeSystem<const N: usize> {
    /// Parameters the right-hand side reads (never mutated during a run)
    type Params;

    /// Evaluate component `i` of the derivative at `(t, y)`.
    ///
    /// # Arguments
    /// * `t` - Current time
    /// * `y` - Current state vector
    /// * `i` - Component index, `0 <= i < N`
    /// * `params` - System parameters
    fn derivative(&self, t: f64, y: &[f64; N], i: usize, params: &Self::Params) -> f64;

    /// Evaluate every component of the derivative into `dydt`.
    fn rhs(&self, t: f64, y: &[f64; N], params: &Self::Params, dydt: &mut [f64; N]) {
        for (i, d) in dydt.iter_mut().enumerate() {
            *d = self.derivative(t, y, i, params);
        }
    }
}

/// Integration statistics for diagnostics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Stats {
    /// Number of steps taken
    pub steps: u64,
    /// Number of full right-hand-side evaluations (STAGES per step)
    pub rhs_evals: u64,
}

/// Classical 4th-order Runge-Kutta stepper
///
/// # Type Parameters
/// * `N` - Dimension of the state vector
///
/// # Example
/// ```
/// use rk4_pendulum::{OdeSystem, Rk4};
///
/// struct Decay;
///
/// impl OdeSystem<1> for Decay {
///     type Params = f64;
///     fn derivative(&self, _t: f64, y: &[f64; 1], _i: usize, rate: &f64) -> f64 {
///         -rate * y[0]
///     }
/// }
///
/// let mut solver = Rk4::new();
/// let mut y = [1.0];
/// solver.step(&Decay, &0.5, 0.0, &mut y, 0.1);
/// assert!((y[0] - (-0.05_f64).exp()).abs() < 1e-9);
/// ```
#[derive(Debug, Clone)]
pub struct Rk4<const N: usize> {
    /// Stage derivatives (pre-allocated workspace)
    k: [[f64; N]; STAGES],
    /// Integration statistics
    pub stats: Stats,
}

impl<const N: usize> Default for Rk4<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> Rk4<N> {
    /// Create a new stepper with zeroed workspace
    pub fn new() -> Self {
        Self {
            k: [[0.0; N]; STAGES],
            stats: Stats::default(),
        }
    }

    /// Advance `y` from `t` to `t + h` in place.
    ///
    /// `h == 0` and `N == 0` are caller errors; they are checked in debug
    /// builds only.
    pub fn step<S: OdeSystem<N>>(
        &mut self,
        sys: &S,
        params: &S::Params,
        t: f64,
        y: &mut [f64; N],
        h: f64,
    ) {
        debug_assert!(N > 0, "state dimension must be positive");
        debug_assert!(h != 0.0, "step size must be non-zero");

        self.compute_stages(sys, params, t, y, h);
        self.apply_weights(y, h);

        self.stats.steps += 1;
        self.stats.rhs_evals += STAGES as u64;
    }

    /// Integrate from `t0` to `tf` with fixed step `h`.
    ///
    /// The last step is shortened so the integration lands exactly on `tf`.
    /// Backward integration works when `h` is negative and `tf < t0`.
    ///
    /// # Returns
    /// * `Ok((t_final, y_final))` on success
    /// * `Err(Error::InvalidStep | Error::InvalidInput)` on bad inputs
    pub fn integrate<S: OdeSystem<N>>(
        &mut self,
        sys: &S,
        params: &S::Params,
        t0: f64,
        y0: &[f64; N],
        tf: f64,
        h: f64,
    ) -> Result<(f64, [f64; N])> {
        validate_inputs(t0, y0, tf, h)?;
        if t0 == tf {
            return Ok((t0, *y0));
        }

        let direction = (tf - t0).signum();
        let mut t = t0;
        let mut y = *y0;

        while (tf - t) * direction > 0.0 {
            let h_step = if (t + h - tf) * direction > 0.0 {
                tf - t
            } else {
                h
            };
            self.step(sys, params, t, &mut y, h_step);
            t += h_step;
        }

        Ok((t, y))
    }

    /// Reset statistics
    pub fn reset_stats(&mut self) {
        self.stats = Stats::default();
    }

    /// Compute all stages.
    ///
    /// Stage i sees a stage input built from every component of the earlier
    /// stages, so no component is ever advanced with a half-updated neighbor.
    #[allow(clippy::needless_range_loop)]
    fn compute_stages<S: OdeSystem<N>>(
        &mut self,
        sys: &S,
        params: &S::Params,
        t: f64,
        y: &[f64; N],
        h: f64,
    ) {
        let mut y_stage = [0.0; N];

        sys.rhs(t, y, params, &mut self.k[0]);

        for i in 1..STAGES {
            for n in 0..N {
                let mut sum = 0.0;
                for j in 0..i {
                    sum += A[i][j] * self.k[j][n];
                }
                y_stage[n] = y[n] + h * sum;
            }
            sys.rhs(t + C[i] * h, &y_stage, params, &mut self.k[i]);
        }
    }

    /// y += h * sum_i b[i] * k_i
    #[allow(clippy::needless_range_loop)]
    fn apply_weights(&self, y: &mut [f64; N], h: f64) {
        for n in 0..N {
            let mut sum = 0.0;
            for i in 0..STAGES {
                sum += B[i] * self.k[i][n];
            }
            y[n] += h * sum;
        }
    }
}

pub(crate) fn validate_inputs<const N: usize>(t0: f64, y0: &[f64; N], tf: f64, h: f64) -> Result<()> {
    if !t0.is_finite() || !tf.is_finite() {
        return Err(Error::InvalidInput {
            message: "t0 and tf must be finite".to_string(),
        });
    }
    if !h.is_finite() || h == 0.0 {
        return Err(Error::InvalidStep {
            h,
            reason: "must be finite and non-zero",
        });
    }
    let direction = tf - t0;
    if direction != 0.0 && h.signum() != direction.signum() {
        return Err(Error::InvalidStep {
            h,
            reason: "sign must match integration direction (tf - t0)",
        });
    }
    // |t| peaks at an endpoint, so a step that moves both moves every t between.
    if t0 + h == t0 || tf + h == tf {
        return Err(Error::InvalidStep {
            h,
            reason: "too small to advance time over the span",
        });
    }
    for (i, &val) in y0.iter().enumerate() {
        if !val.is_finite() {
            return Err(Error::InvalidInput {
                message: format!("y0[{}] is not finite", i),
            });
        }
    }
    Ok(())
}
