//! # rk4-pendulum: Forced, Damped Pendulum with a Fixed-Step RK4 Integrator
//!
//! Integrates
//!
//! ```text
//! θ'' = −ω0² sin θ − α θ' + f_ext cos(ω_ext t + φ_ext)
//! ```
//!
//! forward in time and splits the trajectory into two streams: a dense one
//! for the continuous phase-space curve, and a strobe one sampled every
//! `strobe_skip` points. With `h = T_ext / strobe_skip` the strobe stream
//! lands once per forcing period, a Poincaré section of the motion.
//!
//! ## Features
//!
//! - Classical 4-stage RK4, generic over state dimension and system
//! - Dense/strobe sampling with a plotting window, without buffering
//! - Results file in a fixed text format, plus a live gnuplot pipe
//! - Zero-crossing detection (Brent's method) for period measurement
//! - Relative-error comparison of two result files
//!
//! ## Basic Usage
//!
//! ```rust
//! use rk4_pendulum::{PendulumParameters, SamplingPolicy, Simulation, TimeSpan};
//!
//! let params = PendulumParameters::default();
//! let policy = SamplingPolicy::default();
//! let span = TimeSpan { t_min: 0.0, t_max: 10.0 };
//! let h = params.forcing_period() / f64::from(policy.strobe_skip);
//!
//! let sim = Simulation::new(params, policy, span, h).unwrap();
//! for sample in sim.samples().filter(|s| s.tag.is_dense()).take(3) {
//!     println!("{} {} {}", sample.t, sample.theta, sample.theta_dot);
//! }
//! ```
//!
//! ## Sinks
//!
//! [`Simulation::run_into`] pushes every emission into a [`PointSink`]. The
//! crate ships [`DataFileWriter`] (dense stream to a results file) and
//! [`GnuplotPipe`] (both streams, point by point, to a running gnuplot).
//! Pairs of sinks fan out and `Option<S>` is a sink that may be switched off:
//!
//! ```rust
//! use rk4_pendulum::{DataFileWriter, GnuplotSink, RunConfig};
//!
//! let config = RunConfig::default();
//! let sim = config.simulation().unwrap();
//!
//! let file = DataFileWriter::new(Vec::new(), &sim).unwrap();
//! let plot: Option<GnuplotSink<Vec<u8>>> = None;
//! let mut sinks = (file, plot);
//! let summary = sim.run_into(&mut sinks).unwrap();
//! assert_eq!(summary.strobe, 1 + summary.points_in_window / 1000);
//! ```
//!
//! ## Other Systems
//!
//! [`Rk4`] drives any [`OdeSystem`]; the pendulum is one implementation.
//!
//! ## References
//!
//! 1. Landau, R.H., Páez, M.J., & Bordeianu, C.C. "Computational Physics:
//!    Problem Solving with Computers". Wiley. (Driven nonlinear
//!    oscillators.)
//!
//! 2. Brent, R.P. (1973). "Algorithms for Minimization without
//!    Derivatives". Prentice-Hall.

#![deny(missing_docs)]
#![deny(unsafe_code)]

pub mod coefficients;
pub mod config;
pub mod crossings;
pub mod error;
pub mod menu;
pub mod model;
pub mod output;
pub mod runner;
pub mod sampling;
pub mod solver;
pub mod validation;

pub use config::{OutputConfig, PlotConfig, RunConfig};
pub use crossings::{
    find_crossings, measure_period, Brent, Crossing, CrossingFunction, Direction, Root, RootError,
};
pub use error::{Error, Result};
pub use menu::Menu;
pub use model::{DrivenPendulum, PendulumParameters};
pub use output::{
    default_terminal, read_data_file, wrap_angle, DataFileWriter, DataRecord, GnuplotPipe,
    GnuplotSink, PlotSettings,
};
pub use runner::{
    run, IntegrationState, PointSink, RunSummary, Samples, Simulation, TimeSpan, TrajectorySample,
};
pub use sampling::{SamplingController, SamplingPolicy, Stream, Tag};
pub use solver::{OdeSystem, Rk4, Stats};
pub use validation::{compare_files, compare_records, relative_error, RowComparison};
