//! Dense/strobe sampling of an integrated trajectory
//!
//! Every integrated point inside the plotting window is counted. The dense
//! stream takes every `plot_skip`-th counted point and the strobe stream every
//! `strobe_skip`-th one. With `h = T_ext / strobe_skip` the strobe stream
//! samples the trajectory once per forcing period, which gives a
//! Poincaré-section view of the motion.
//!
//! The controller never buffers points: it keeps a single counter.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// One of the two output streams
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stream {
    /// Finely sampled continuous trajectory
    Dense,
    /// Coarse samples, one per `strobe_skip` points
    Strobe,
}

/// Classification of a single integrated point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tag {
    /// Not emitted
    #[default]
    None,
    /// Dense stream only
    Dense,
    /// Strobe stream only
    Strobe,
    /// Both streams
    Both,
}

impl Tag {
    fn from_flags(dense: bool, strobe: bool) -> Self {
        match (dense, strobe) {
            (false, false) => Tag::None,
            (true, false) => Tag::Dense,
            (false, true) => Tag::Strobe,
            (true, true) => Tag::Both,
        }
    }

    /// Point belongs to the dense stream
    pub fn is_dense(self) -> bool {
        matches!(self, Tag::Dense | Tag::Both)
    }

    /// Point belongs to the strobe stream
    pub fn is_strobe(self) -> bool {
        matches!(self, Tag::Strobe | Tag::Both)
    }

    /// Streams this point goes to, dense first
    pub fn streams(self) -> impl Iterator<Item = Stream> {
        let dense = self.is_dense().then_some(Stream::Dense);
        let strobe = self.is_strobe().then_some(Stream::Strobe);
        dense.into_iter().chain(strobe)
    }
}

/// Plotting window and skip counts, fixed for a run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplingPolicy {
    /// First time that may be emitted
    pub plot_min: f64,
    /// Last time that may be emitted
    pub plot_max: f64,
    /// Dense stream takes every `plot_skip`-th in-window point
    pub plot_skip: u32,
    /// Strobe stream takes every `strobe_skip`-th in-window point
    #[serde(alias = "T_skip", alias = "t_skip")]
    pub strobe_skip: u32,
}

impl Default for SamplingPolicy {
    fn default() -> Self {
        Self {
            plot_min: 0.0,
            plot_max: 50.0,
            plot_skip: 10,
            strobe_skip: 1000,
        }
    }
}

impl SamplingPolicy {
    /// Check the skip counts and window bounds.
    ///
    /// Infinite bounds are allowed (an open window); NaN is not.
    pub fn validate(&self) -> Result<()> {
        if self.plot_skip == 0 {
            return Err(Error::InvalidSkip { name: "plot_skip" });
        }
        if self.strobe_skip == 0 {
            return Err(Error::InvalidSkip {
                name: "strobe_skip",
            });
        }
        if self.plot_min.is_nan() || self.plot_max.is_nan() {
            return Err(Error::InvalidInput {
                message: "plot window bounds must not be NaN".to_string(),
            });
        }
        Ok(())
    }

    /// Whether `t` lies in [plot_min, plot_max]
    pub fn contains(&self, t: f64) -> bool {
        t >= self.plot_min && t <= self.plot_max
    }
}

/// Per-run counter that classifies integrated points
#[derive(Debug, Clone)]
pub struct SamplingController {
    policy: SamplingPolicy,
    point_count: u64,
}

impl SamplingController {
    /// Start a new run with the counter at zero
    pub fn new(policy: SamplingPolicy) -> Self {
        Self {
            policy,
            point_count: 0,
        }
    }

    /// Number of in-window points seen so far
    pub fn point_count(&self) -> u64 {
        self.point_count
    }

    /// The sampling policy in force
    pub fn policy(&self) -> &SamplingPolicy {
        &self.policy
    }

    /// Classification of the initial condition at `t_min`.
    ///
    /// The seed goes to both streams when `t_min >= plot_min`, whatever the
    /// skip counts. It is not checked against `plot_max` and is not counted.
    pub fn seed(&self, t_min: f64) -> Tag {
        if t_min >= self.policy.plot_min {
            Tag::Both
        } else {
            Tag::None
        }
    }

    /// Classify the next integrated point at time `t`.
    pub fn classify(&mut self, t: f64) -> Tag {
        if !self.policy.contains(t) {
            return Tag::None;
        }
        self.point_count += 1;

        let dense = self.point_count % u64::from(self.policy.plot_skip) == 0;
        let strobe = self.point_count % u64::from(self.policy.strobe_skip) == 0;
        Tag::from_flags(dense, strobe)
    }
}
