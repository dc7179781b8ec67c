//! Classical Runge-Kutta 4 Coefficients
//!
//! Butcher tableau of the classical 4-stage, 4th-order explicit method:
//!
//! ```text
//!   0  |
//!  1/2 | 1/2
//!  1/2 |  0   1/2
//!   1  |  0    0    1
//! -----+--------------------
//!      | 1/6  1/3  1/3  1/6
//! ```
//!
//! The method has no embedded companion, so there is no error estimate:
//! the step size is fixed by the caller for the whole run.

/// Number of stages in the classical RK4 method
pub const STAGES: usize = 4;

/// Order of the method (global error is O(h^ORDER))
pub const ORDER: u8 = 4;

/// Node coefficients (c_i): stage i is evaluated at t_n + c[i]*h
pub const C: [f64; STAGES] = [0.0, 0.5, 0.5, 1.0];

/// Runge-Kutta matrix, lower triangular.
///
/// k_i = f(t_n + c_i*h, y_n + h * sum_{j<i} a_{i,j} * k_j)
///
/// Classical RK4 only couples each stage to the one before it, but the
/// solver treats the matrix generically.
pub const A: [[f64; STAGES - 1]; STAGES] = [
    [0.0, 0.0, 0.0],
    [0.5, 0.0, 0.0],
    [0.0, 0.5, 0.0],
    [0.0, 0.0, 1.0],
];

/// Quadrature weights (b_i)
///
/// y_{n+1} = y_n + h * sum_i b[i] * k_i
pub const B: [f64; STAGES] = [1.0 / 6.0, 1.0 / 3.0, 1.0 / 3.0, 1.0 / 6.0];

#[cfg(test)]
mod tests {
    use super::*;

    const TOL: f64 = 1e-15;

    #[test]
    fn test_row_sum_condition() {
        for i in 0..STAGES {
            let row_sum: f64 = A[i].iter().sum();
            assert!(
                (row_sum - C[i]).abs() < TOL,
                "Row {} sum = {}, expected c[{}] = {}",
                i,
                row_sum,
                i,
                C[i]
            );
        }
    }

    #[test]
    fn test_weights_sum_to_one() {
        let b_sum: f64 = B.iter().sum();
        assert!((b_sum - 1.0).abs() < TOL, "weights sum to {}", b_sum);
    }

    #[test]
    fn test_order_conditions() {
        // Conditions for order 4 (Butcher 1963): sum b c^(q-1) = 1/q, plus
        // the two mixed conditions involving A.
        let bc: f64 = (0..STAGES).map(|i| B[i] * C[i]).sum();
        let bc2: f64 = (0..STAGES).map(|i| B[i] * C[i] * C[i]).sum();
        let bc3: f64 = (0..STAGES).map(|i| B[i] * C[i].powi(3)).sum();
        assert!((bc - 1.0 / 2.0).abs() < TOL);
        assert!((bc2 - 1.0 / 3.0).abs() < TOL);
        assert!((bc3 - 1.0 / 4.0).abs() < TOL);

        let mut bac = 0.0;
        let mut bcac = 0.0;
        for i in 0..STAGES {
            for j in 0..i {
                bac += B[i] * A[i][j] * C[j];
                bcac += B[i] * C[i] * A[i][j] * C[j];
            }
        }
        assert!((bac - 1.0 / 6.0).abs() < TOL);
        assert!((bcac - 1.0 / 8.0).abs() < TOL);
    }
}
