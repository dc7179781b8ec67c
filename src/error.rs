//! Error types for rk4-pendulum
//!
//! Configuration and step errors are raised before any state is touched;
//! numerical divergence is never reported here (non-finite states flow
//! through to the sinks unchanged).

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the integration core and its collaborators
#[derive(Error, Debug)]
pub enum Error {
    /// Forcing frequency is zero, so the forcing period is undefined
    #[error("forcing frequency omega_ext must be non-zero (forcing period 2*pi/omega_ext is undefined)")]
    ZeroForcingFrequency,

    /// Step size cannot advance the integration clock
    #[error("invalid step size h = {h}: {reason}")]
    InvalidStep {
        /// Offending step size
        h: f64,
        /// Why it was rejected
        reason: &'static str,
    },

    /// A sampling skip count is zero
    #[error("{name} must be a positive integer, got 0")]
    InvalidSkip {
        /// Which counter (`plot_skip` or `strobe_skip`)
        name: &'static str,
    },

    /// Non-finite time bounds or initial state
    #[error("invalid input: {message}")]
    InvalidInput {
        /// Description of the invalid input
        message: String,
    },

    /// Malformed line in a results data file
    #[error("line {line}: {message}")]
    Parse {
        /// 1-based line number
        line: usize,
        /// What went wrong
        message: String,
    },

    /// IO error (sinks, data files, gnuplot pipe)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration file could not be decoded
    #[error("config error: {0}")]
    Config(#[from] serde_json::Error),
}
