//! Simulation driver
//!
//! Owns the integration state for one run, steps it with [`Rk4`], passes
//! each post-step point through the [`SamplingController`] and hands the
//! emitted points to a [`PointSink`].
//!
//! A run is a value: build a [`Simulation`], then either pull samples from
//! [`Simulation::samples`] or push them into a sink with
//! [`Simulation::run_into`]. Nothing is shared between runs.

use serde::{Deserialize, Serialize};
use std::io;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::model::{DrivenPendulum, PendulumParameters};
use crate::sampling::{SamplingController, SamplingPolicy, Stream, Tag};
use crate::solver::Rk4;

/// Integration time span [t_min, t_max]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeSpan {
    /// Start time; the initial condition is set here
    pub t_min: f64,
    /// End time (inclusive, see [`Simulation::samples`])
    pub t_max: f64,
}

impl Default for TimeSpan {
    fn default() -> Self {
        Self {
            t_min: 0.0,
            t_max: 50.0,
        }
    }
}

/// Current time and state vector (θ, θ')
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntegrationState {
    /// Current time
    pub t: f64,
    /// State vector (θ, θ')
    pub y: [f64; 2],
}

/// A classified trajectory point
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrajectorySample {
    /// Time
    pub t: f64,
    /// Angle θ
    pub theta: f64,
    /// Angular velocity θ'
    pub theta_dot: f64,
    /// Which streams the point belongs to
    pub tag: Tag,
}

/// Receiver of classified points.
///
/// `emit` is called once per stream per point, in time order; `t` strictly
/// increases between calls for the same stream. `finish` is called once at
/// the end of a run. Failures are returned to the caller unchanged and are
/// never retried.
pub trait PointSink {
    /// Receive one point for `stream`
    fn emit(&mut self, stream: Stream, t: f64, theta: f64, theta_dot: f64) -> io::Result<()>;

    /// End of run
    fn finish(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<S: PointSink + ?Sized> PointSink for &mut S {
    fn emit(&mut self, stream: Stream, t: f64, theta: f64, theta_dot: f64) -> io::Result<()> {
        (**self).emit(stream, t, theta, theta_dot)
    }

    fn finish(&mut self) -> io::Result<()> {
        (**self).finish()
    }
}

impl<S: PointSink> PointSink for Option<S> {
    fn emit(&mut self, stream: Stream, t: f64, theta: f64, theta_dot: f64) -> io::Result<()> {
        match self {
            Some(sink) => sink.emit(stream, t, theta, theta_dot),
            None => Ok(()),
        }
    }

    fn finish(&mut self) -> io::Result<()> {
        match self {
            Some(sink) => sink.finish(),
            None => Ok(()),
        }
    }
}

/// Fan-out: the first sink sees each point before the second
impl<A: PointSink, B: PointSink> PointSink for (A, B) {
    fn emit(&mut self, stream: Stream, t: f64, theta: f64, theta_dot: f64) -> io::Result<()> {
        self.0.emit(stream, t, theta, theta_dot)?;
        self.1.emit(stream, t, theta, theta_dot)
    }

    fn finish(&mut self) -> io::Result<()> {
        self.0.finish()?;
        self.1.finish()
    }
}

/// What a finished run did
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunSummary {
    /// RK4 steps taken
    pub steps: u64,
    /// Points that fell inside the plotting window
    pub points_in_window: u64,
    /// Dense-stream emissions, seed included
    pub dense: u64,
    /// Strobe-stream emissions, seed included
    pub strobe: u64,
    /// State after the last step
    pub final_state: IntegrationState,
}

/// A validated, ready-to-run pendulum simulation
#[derive(Debug, Clone, PartialEq)]
pub struct Simulation {
    params: PendulumParameters,
    policy: SamplingPolicy,
    span: TimeSpan,
    h: f64,
}

impl Simulation {
    /// Validate the inputs of a run.
    ///
    /// Fails with [`Error::ZeroForcingFrequency`], [`Error::InvalidSkip`],
    /// [`Error::InvalidStep`] or [`Error::InvalidInput`] before any state is
    /// created.
    pub fn new(
        params: PendulumParameters,
        policy: SamplingPolicy,
        span: TimeSpan,
        h: f64,
    ) -> Result<Self> {
        params.validate()?;
        policy.validate()?;
        if !span.t_min.is_finite() || !span.t_max.is_finite() {
            return Err(Error::InvalidInput {
                message: format!(
                    "t_min and t_max must be finite, got [{}, {}]",
                    span.t_min, span.t_max
                ),
            });
        }
        if !h.is_finite() || h <= 0.0 {
            return Err(Error::InvalidStep {
                h,
                reason: "must be positive and finite",
            });
        }
        // The clock must move at both ends of the span or the loop never ends.
        if span.t_min + h == span.t_min || span.t_max + h == span.t_max {
            return Err(Error::InvalidStep {
                h,
                reason: "too small to advance time over the span",
            });
        }

        debug!(?params, ?policy, ?span, h, "simulation configured");
        Ok(Self {
            params,
            policy,
            span,
            h,
        })
    }

    /// Pendulum parameters
    pub fn params(&self) -> &PendulumParameters {
        &self.params
    }

    /// Sampling policy
    pub fn policy(&self) -> &SamplingPolicy {
        &self.policy
    }

    /// Time span
    pub fn span(&self) -> &TimeSpan {
        &self.span
    }

    /// Fixed step size
    pub fn step_size(&self) -> f64 {
        self.h
    }

    /// Lazily integrate the run, yielding only emitted points.
    ///
    /// The seed (initial condition at `t_min`) comes first when the window
    /// allows it. Stepping continues while the pre-step time is `<= t_max`,
    /// so the last point may lie up to one `h` past `t_max`.
    pub fn samples(&self) -> Samples<'_> {
        let y = self.params.initial_state();
        Samples {
            sim: self,
            solver: Rk4::new(),
            controller: SamplingController::new(self.policy),
            state: IntegrationState {
                t: self.span.t_min,
                y,
            },
            seeded: false,
        }
    }

    /// Run to completion, forwarding every emission to `sink`.
    ///
    /// Calls `sink.finish()` once the loop ends. The first sink error stops
    /// the run and is returned.
    pub fn run_into<S: PointSink>(&self, sink: &mut S) -> Result<RunSummary> {
        info!(
            t_min = self.span.t_min,
            t_max = self.span.t_max,
            h = self.h,
            "starting run"
        );

        let mut samples = self.samples();
        let mut dense = 0u64;
        let mut strobe = 0u64;

        for sample in samples.by_ref() {
            for stream in sample.tag.streams() {
                sink.emit(stream, sample.t, sample.theta, sample.theta_dot)?;
                match stream {
                    Stream::Dense => dense += 1,
                    Stream::Strobe => strobe += 1,
                }
            }
        }
        sink.finish()?;

        let summary = RunSummary {
            steps: samples.steps(),
            points_in_window: samples.points_in_window(),
            dense,
            strobe,
            final_state: samples.state(),
        };
        info!(
            steps = summary.steps,
            dense = summary.dense,
            strobe = summary.strobe,
            t_final = summary.final_state.t,
            "run complete"
        );
        Ok(summary)
    }
}

/// Iterator over the emitted points of one run. See [`Simulation::samples`].
#[derive(Debug, Clone)]
pub struct Samples<'a> {
    sim: &'a Simulation,
    solver: Rk4<2>,
    controller: SamplingController,
    state: IntegrationState,
    seeded: bool,
}

impl Samples<'_> {
    /// Current integration state
    pub fn state(&self) -> IntegrationState {
        self.state
    }

    /// RK4 steps taken so far
    pub fn steps(&self) -> u64 {
        self.solver.stats.steps
    }

    /// In-window points counted so far
    pub fn points_in_window(&self) -> u64 {
        self.controller.point_count()
    }

    fn sample(&self, tag: Tag) -> TrajectorySample {
        TrajectorySample {
            t: self.state.t,
            theta: self.state.y[0],
            theta_dot: self.state.y[1],
            tag,
        }
    }
}

impl Iterator for Samples<'_> {
    type Item = TrajectorySample;

    fn next(&mut self) -> Option<TrajectorySample> {
        if !self.seeded {
            self.seeded = true;
            let tag = self.controller.seed(self.sim.span.t_min);
            if tag != Tag::None {
                return Some(self.sample(tag));
            }
        }

        let h = self.sim.h;
        while self.state.t <= self.sim.span.t_max {
            self.solver.step(
                &DrivenPendulum,
                &self.sim.params,
                self.state.t,
                &mut self.state.y,
                h,
            );
            self.state.t += h;

            let tag = self.controller.classify(self.state.t);
            if tag != Tag::None {
                return Some(self.sample(tag));
            }
        }
        None
    }
}

/// Run a simulation and collect every emitted point.
///
/// Stateless: calling it twice with the same arguments gives bit-identical
/// results.
pub fn run(
    params: PendulumParameters,
    policy: SamplingPolicy,
    span: TimeSpan,
    h: f64,
) -> Result<Vec<TrajectorySample>> {
    let sim = Simulation::new(params, policy, span, h)?;
    Ok(sim.samples().collect())
}
