//! Run configuration
//!
//! A serde-deserializable description of one pendulum run. Every field has a
//! default, so a config file only needs to name what it changes.
//!
//! # JSON format
//!
//! ```json
//! {
//!   "pendulum": {
//!     "omega0": 1.0,
//!     "alpha": 0.2,
//!     "f_ext": 0.2,
//!     "omega_ext": 0.689,
//!     "phi_ext": 0.0,
//!     "theta0": 0.8,
//!     "theta_dot0": 0.0
//!   },
//!   "span": { "t_min": 0.0, "t_max": 50.0 },
//!   "sampling": {
//!     "plot_min": 0.0,
//!     "plot_max": 50.0,
//!     "plot_skip": 10,
//!     "strobe_skip": 1000
//!   },
//!   "step": null,
//!   "output": { "path": "datafiles/diffeq_pendulum.dat" },
//!   "plot": {
//!     "enabled": true,
//!     "program": "gnuplot",
//!     "terminal": null,
//!     "delay_ms": 10,
//!     "theta_dot_range": [-3.0, 3.0]
//!   }
//! }
//! ```
//!
//! A `null` (or absent) step means `h = T_ext / strobe_skip`, one strobe
//! sample per forcing period. A `null` terminal is resolved from the target
//! OS by [`default_terminal`]. `delay_ms` is the pause after each point sent
//! to gnuplot.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::Result;
use crate::model::PendulumParameters;
use crate::output::{default_terminal, PlotSettings};
use crate::runner::{Simulation, TimeSpan};
use crate::sampling::SamplingPolicy;

/// Results file settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Where the dense stream is written (truncated on each run)
    pub path: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("datafiles/diffeq_pendulum.dat"),
        }
    }
}

/// Gnuplot pipe settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlotConfig {
    /// Spawn gnuplot for the run
    pub enabled: bool,
    /// Executable to spawn
    pub program: String,
    /// Terminal override; OS default when absent
    pub terminal: Option<String>,
    /// Pause after each plotted point, in milliseconds
    pub delay_ms: u64,
    /// Fixed θ' axis range
    pub theta_dot_range: (f64, f64),
}

impl Default for PlotConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            program: "gnuplot".to_string(),
            terminal: None,
            delay_ms: 10,
            theta_dot_range: (-3.0, 3.0),
        }
    }
}

impl PlotConfig {
    /// Terminal name to hand to gnuplot
    pub fn terminal(&self) -> String {
        self.terminal
            .clone()
            .unwrap_or_else(|| default_terminal().to_string())
    }

    /// Settings for the live plot
    pub fn settings(&self) -> PlotSettings {
        PlotSettings {
            terminal: self.terminal(),
            theta_dot_range: self.theta_dot_range,
            delay: Duration::from_millis(self.delay_ms),
        }
    }
}

/// Everything needed to start a run
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Physical parameters and initial condition
    pub pendulum: PendulumParameters,
    /// Integration span
    pub span: TimeSpan,
    /// Plotting window and skip counts
    pub sampling: SamplingPolicy,
    /// Explicit step size; derived from the forcing period when `None`
    pub step: Option<f64>,
    /// Results file
    pub output: OutputConfig,
    /// Gnuplot pipe
    pub plot: PlotConfig,
}

impl RunConfig {
    /// Parse a JSON config.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read and parse a JSON config file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Pretty-printed JSON, readable back by [`from_json_str`](Self::from_json_str)
    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Step size for the run: the explicit `step`, or `T_ext / strobe_skip`.
    ///
    /// The derived value is non-finite when ω_ext or strobe_skip is zero;
    /// [`simulation`](Self::simulation) reports those cases as errors.
    pub fn step_size(&self) -> f64 {
        self.step.unwrap_or_else(|| {
            self.pendulum.forcing_period() / f64::from(self.sampling.strobe_skip)
        })
    }

    /// Validate and build the run.
    pub fn simulation(&self) -> Result<Simulation> {
        // Check ω_ext and the skip counts first so a derived step does not
        // mask them as an InvalidStep.
        self.pendulum.validate()?;
        self.sampling.validate()?;
        Simulation::new(self.pendulum, self.sampling, self.span, self.step_size())
    }
}
