//! Damped, driven pendulum
//!
//! θ'' = −ω0² sin θ − α θ' + f_ext cos(ω_ext t + φ_ext)
//!
//! written as the first-order system y = (θ, θ').

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

use crate::error::{Error, Result};
use crate::solver::OdeSystem;

/// Physical parameters and initial condition of a pendulum run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PendulumParameters {
    /// Natural frequency ω0
    pub omega0: f64,
    /// Damping coefficient α
    pub alpha: f64,
    /// Forcing amplitude f_ext
    pub f_ext: f64,
    /// Forcing frequency ω_ext
    pub omega_ext: f64,
    /// Forcing phase φ_ext
    pub phi_ext: f64,
    /// Initial angle θ0
    pub theta0: f64,
    /// Initial angular velocity θ'0
    pub theta_dot0: f64,
}

impl Default for PendulumParameters {
    fn default() -> Self {
        Self {
            omega0: 1.0,
            alpha: 0.2,
            f_ext: 0.2,
            omega_ext: 0.689,
            phi_ext: 0.0,
            theta0: 0.8,
            theta_dot0: 0.0,
        }
    }
}

impl PendulumParameters {
    /// Forcing period T_ext = 2π/ω_ext.
    ///
    /// Non-finite when ω_ext is zero; [`validate`](Self::validate) rejects
    /// that case before a run.
    pub fn forcing_period(&self) -> f64 {
        2.0 * PI / self.omega_ext
    }

    /// Initial state vector (θ0, θ'0)
    pub fn initial_state(&self) -> [f64; 2] {
        [self.theta0, self.theta_dot0]
    }

    /// Mechanical energy per unit inertia: ½θ'² + ω0²(1 − cos θ)
    pub fn energy(&self, y: &[f64; 2]) -> f64 {
        0.5 * y[1] * y[1] + self.omega0 * self.omega0 * (1.0 - y[0].cos())
    }

    /// Reject parameter sets that cannot start a run.
    pub fn validate(&self) -> Result<()> {
        if self.omega_ext == 0.0 {
            return Err(Error::ZeroForcingFrequency);
        }
        let fields = [
            ("omega0", self.omega0),
            ("alpha", self.alpha),
            ("f_ext", self.f_ext),
            ("omega_ext", self.omega_ext),
            ("phi_ext", self.phi_ext),
            ("theta0", self.theta0),
            ("theta_dot0", self.theta_dot0),
        ];
        for (name, value) in fields {
            if !value.is_finite() {
                return Err(Error::InvalidInput {
                    message: format!("{} must be finite, got {}", name, value),
                });
            }
        }
        Ok(())
    }
}

/// Right-hand side of the damped, driven pendulum
#[derive(Debug, Clone, Copy, Default)]
pub struct DrivenPendulum;

impl OdeSystem<2> for DrivenPendulum {
    type Params = PendulumParameters;

    fn derivative(&self, t: f64, y: &[f64; 2], i: usize, p: &PendulumParameters) -> f64 {
        match i {
            0 => y[1],
            1 => {
                let forcing = p.f_ext * (p.omega_ext * t + p.phi_ext).cos();
                -p.omega0 * p.omega0 * y[0].sin() - p.alpha * y[1] + forcing
            }
            _ => panic!("pendulum state has 2 components, got index {}", i),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_angle_derivative_is_velocity() {
        let p = PendulumParameters::default();
        assert_eq!(DrivenPendulum.derivative(3.0, &[0.4, -1.25], 0, &p), -1.25);
    }

    #[test]
    fn test_velocity_derivative() {
        let p = PendulumParameters {
            omega0: 2.0,
            alpha: 0.5,
            f_ext: 0.3,
            omega_ext: 1.5,
            phi_ext: 0.25,
            ..Default::default()
        };
        let (t, theta, theta_dot): (f64, f64, f64) = (0.7, 0.9, -0.4);
        let expected = -4.0 * theta.sin() - 0.5 * theta_dot + 0.3 * (1.5 * t + 0.25).cos();
        let got = DrivenPendulum.derivative(t, &[theta, theta_dot], 1, &p);
        assert!((got - expected).abs() < 1e-15);
    }

    #[test]
    fn test_rhs_fills_both_components() {
        let p = PendulumParameters {
            f_ext: 0.0,
            alpha: 0.0,
            ..Default::default()
        };
        let mut dydt = [0.0; 2];
        DrivenPendulum.rhs(0.0, &[std::f64::consts::FRAC_PI_2, 2.0], &p, &mut dydt);
        assert_eq!(dydt[0], 2.0);
        assert!((dydt[1] + 1.0).abs() < 1e-15);
    }

    #[test]
    #[should_panic(expected = "2 components")]
    fn test_index_out_of_range_panics() {
        DrivenPendulum.derivative(0.0, &[0.0, 0.0], 2, &PendulumParameters::default());
    }

    #[test]
    fn test_forcing_period() {
        let p = PendulumParameters::default();
        assert!((p.forcing_period() - 2.0 * PI / 0.689).abs() < 1e-12);
    }

    #[test]
    fn test_zero_forcing_frequency_rejected() {
        let p = PendulumParameters {
            omega_ext: 0.0,
            ..Default::default()
        };
        assert!(matches!(p.validate(), Err(Error::ZeroForcingFrequency)));
        assert!(!p.forcing_period().is_finite());
    }

    #[test]
    fn test_non_finite_parameter_rejected() {
        let p = PendulumParameters {
            theta0: f64::NAN,
            ..Default::default()
        };
        assert!(matches!(p.validate(), Err(Error::InvalidInput { .. })));
    }

    #[test]
    fn test_energy_at_rest_is_zero() {
        let p = PendulumParameters::default();
        assert_eq!(p.energy(&[0.0, 0.0]), 0.0);
        assert!((p.energy(&[PI, 0.0]) - 2.0).abs() < 1e-15);
    }

    #[test]
    fn test_defaults_deserialize_from_empty_object() {
        let p: PendulumParameters = serde_json::from_str("{}").unwrap();
        assert_eq!(p, PendulumParameters::default());
        let p: PendulumParameters = serde_json::from_str(r#"{"alpha": 0.5}"#).unwrap();
        assert_eq!(p.alpha, 0.5);
        assert_eq!(p.omega0, 1.0);
    }
}
