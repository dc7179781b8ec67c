//! Point sinks: results data file and live gnuplot pipe
//!
//! # Data file format
//!
//! ```text
//! # omega0=1, alpha=0.2
//! # theta0=0.8, theta_dot0=0
//! # t_start=0, t_end=50, h=0.00911928
//! #   t          theta(t)                 thetadot(t)
//! 0 8.000000000000000e-01 0.000000000000000e+00
//! <t> <theta> <theta_dot>
//! ...
//! ```
//!
//! Header values use C `%g` formatting. Data values use C++ `scientific`
//! formatting with 15 digits after the point. As with a C++ stream where the
//! `scientific` flag is sticky, the very first time value of a file is still
//! written in `%g` form and everything after it in scientific form. One line
//! is written per dense-stream point; a blank line closes the run.

use std::f64::consts::PI;
use std::io::{self, BufRead, Write};
use std::process::{Child, ChildStdin, Command, ExitStatus, Stdio};
use std::thread;
use std::time::Duration;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::runner::{PointSink, Simulation};
use crate::sampling::Stream;

const COLUMN_HEADER: &str = "#   t          theta(t)                 thetadot(t)       ";

/// Writes dense-stream points in the results file format
#[derive(Debug)]
pub struct DataFileWriter<W: Write> {
    inner: W,
    scientific: bool,
}

impl<W: Write> DataFileWriter<W> {
    /// Write the header for `sim` and return a writer ready for points.
    pub fn new(mut inner: W, sim: &Simulation) -> io::Result<Self> {
        let p = sim.params();
        let span = sim.span();
        writeln!(
            inner,
            "# omega0={}, alpha={}",
            fmt_general(p.omega0),
            fmt_general(p.alpha)
        )?;
        writeln!(
            inner,
            "# theta0={}, theta_dot0={}",
            fmt_general(p.theta0),
            fmt_general(p.theta_dot0)
        )?;
        writeln!(
            inner,
            "# t_start={}, t_end={}, h={}",
            fmt_general(span.t_min),
            fmt_general(span.t_max),
            fmt_general(sim.step_size())
        )?;
        writeln!(inner, "{}", COLUMN_HEADER)?;
        Ok(Self {
            inner,
            scientific: false,
        })
    }

    /// Recover the underlying writer
    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write> PointSink for DataFileWriter<W> {
    fn emit(&mut self, stream: Stream, t: f64, theta: f64, theta_dot: f64) -> io::Result<()> {
        if stream != Stream::Dense {
            return Ok(());
        }
        let t = if self.scientific {
            fmt_scientific(t)
        } else {
            fmt_general(t)
        };
        self.scientific = true;
        writeln!(
            self.inner,
            "{} {} {}",
            t,
            fmt_scientific(theta),
            fmt_scientific(theta_dot)
        )
    }

    fn finish(&mut self) -> io::Result<()> {
        writeln!(self.inner)?;
        self.inner.flush()
    }
}

/// Gnuplot terminal for the platform, resolved at compile time
pub fn default_terminal() -> &'static str {
    if cfg!(target_os = "windows") {
        "windows"
    } else if cfg!(target_os = "linux") {
        "x11"
    } else {
        "qt"
    }
}

/// How the live phase-space plot is drawn
#[derive(Debug, Clone, PartialEq)]
pub struct PlotSettings {
    /// Gnuplot terminal name
    pub terminal: String,
    /// Fixed θ' axis range; θ is always drawn over [-π, π]
    pub theta_dot_range: (f64, f64),
    /// Pause after each point so the plot animates; zero for none
    pub delay: Duration,
}

impl PlotSettings {
    /// Settings for `terminal` with θ' in [-3, 3] and no delay
    pub fn new(terminal: impl Into<String>) -> Self {
        Self {
            terminal: terminal.into(),
            theta_dot_range: (-3.0, 3.0),
            delay: Duration::ZERO,
        }
    }
}

/// Wrap an angle into [-π, π)
pub fn wrap_angle(theta: f64) -> f64 {
    (theta + PI).rem_euclid(2.0 * PI) - PI
}

/// Streams both sampling streams to gnuplot as a live phase-space plot.
///
/// The axes are fixed up front and the sink enters multiplot mode, so every
/// emitted point is drawn on its own as soon as it arrives and earlier points
/// stay on screen. [`finish`](PointSink::finish) leaves multiplot mode.
#[derive(Debug)]
pub struct GnuplotSink<W: Write> {
    inner: W,
    delay: Duration,
    sent: u64,
}

impl<W: Write> GnuplotSink<W> {
    /// Send the terminal, axis setup and `set multiplot` to `inner`.
    pub fn new(mut inner: W, settings: &PlotSettings) -> io::Result<Self> {
        let (lo, hi) = settings.theta_dot_range;
        writeln!(
            inner,
            "set terminal {} title 'Gnuplot: Visualizing Chaos' size 720,720",
            settings.terminal
        )?;
        writeln!(inner, "set title 'Pendulum Phase Space'")?;
        writeln!(inner, "set xlabel 'theta'")?;
        writeln!(inner, "set ylabel 'theta dot'")?;
        writeln!(inner, "set xrange [-pi:pi]")?;
        writeln!(inner, "set yrange [{}:{}]", lo, hi)?;
        writeln!(inner, "set multiplot")?;
        inner.flush()?;
        Ok(Self {
            inner,
            delay: settings.delay,
            sent: 0,
        })
    }

    /// Recover the underlying writer
    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write> PointSink for GnuplotSink<W> {
    fn emit(&mut self, stream: Stream, _t: f64, theta: f64, theta_dot: f64) -> io::Result<()> {
        let style = match stream {
            Stream::Dense => "pt 7 ps 0.3 lc rgb 'blue'",
            Stream::Strobe => "pt 7 ps 0.8 lc rgb 'red'",
        };
        writeln!(self.inner, "plot '-' with points {} notitle", style)?;
        writeln!(self.inner, "{} {}", wrap_angle(theta), theta_dot)?;
        writeln!(self.inner, "e")?;
        self.inner.flush()?;
        self.sent += 1;
        if !self.delay.is_zero() {
            thread::sleep(self.delay);
        }
        Ok(())
    }

    fn finish(&mut self) -> io::Result<()> {
        debug!(points = self.sent, "phase-space plot complete");
        writeln!(self.inner, "unset multiplot")?;
        self.inner.flush()
    }
}

/// A running gnuplot process fed through its stdin
#[derive(Debug)]
pub struct GnuplotPipe {
    child: Child,
    sink: GnuplotSink<ChildStdin>,
}

impl GnuplotPipe {
    /// Spawn `program -persist` and send the plot setup.
    pub fn spawn(program: &str, settings: &PlotSettings) -> io::Result<Self> {
        let mut command = Command::new(program);
        command.arg("-persist");
        let pipe = Self::from_command(command, settings)?;
        debug!(program, terminal = %settings.terminal, "gnuplot started");
        Ok(pipe)
    }

    /// Spawn `command` with a piped stdin and send the plot setup to it.
    pub fn from_command(mut command: Command, settings: &PlotSettings) -> io::Result<Self> {
        let mut child = command.stdin(Stdio::piped()).spawn()?;
        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| io::Error::new(io::ErrorKind::BrokenPipe, "gnuplot stdin unavailable"))?;
        let sink = GnuplotSink::new(stdin, settings)?;
        Ok(Self { child, sink })
    }

    /// Close the pipe and wait for gnuplot to exit.
    pub fn close(self) -> io::Result<ExitStatus> {
        let Self { mut child, sink } = self;
        drop(sink.into_inner());
        let status = child.wait()?;
        if !status.success() {
            warn!(%status, "gnuplot exited with failure");
        }
        Ok(status)
    }
}

impl PointSink for GnuplotPipe {
    fn emit(&mut self, stream: Stream, t: f64, theta: f64, theta_dot: f64) -> io::Result<()> {
        self.sink.emit(stream, t, theta, theta_dot)
    }

    fn finish(&mut self) -> io::Result<()> {
        self.sink.finish()
    }
}

/// One line of a results data file
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DataRecord {
    /// Time
    pub t: f64,
    /// Angle θ
    pub theta: f64,
    /// Angular velocity θ'
    pub theta_dot: f64,
}

/// Parse a results data file, skipping `#` comments and blank lines.
pub fn read_data_file<R: BufRead>(reader: R) -> Result<Vec<DataRecord>> {
    let mut records = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let parse_err = |message: String| Error::Parse {
            line: index + 1,
            message,
        };
        let fields: Vec<&str> = trimmed.split_whitespace().collect();
        if fields.len() != 3 {
            return Err(parse_err(format!("expected 3 columns, found {}", fields.len())));
        }
        let mut values = [0.0; 3];
        for (value, field) in values.iter_mut().zip(&fields) {
            *value = field
                .parse()
                .map_err(|e| parse_err(format!("{:?}: {}", field, e)))?;
        }
        records.push(DataRecord {
            t: values[0],
            theta: values[1],
            theta_dot: values[2],
        });
    }
    Ok(records)
}

/// C++ `std::scientific` with precision 15: `d.ddddddddddddddde±XX`
fn fmt_scientific(x: f64) -> String {
    if !x.is_finite() {
        return fmt_non_finite(x);
    }
    let s = format!("{:.15e}", x);
    cxx_exponent(&s)
}

/// C `%g` with the default precision of 6 significant digits
fn fmt_general(x: f64) -> String {
    const PRECISION: i32 = 6;

    if !x.is_finite() {
        return fmt_non_finite(x);
    }
    if x == 0.0 {
        let zero = if x.is_sign_negative() { "-0" } else { "0" };
        return zero.to_string();
    }

    // The exponent after rounding to PRECISION significant digits.
    let rounded = format!("{:.*e}", (PRECISION - 1) as usize, x);
    let exponent: i32 = rounded
        .rsplit('e')
        .next()
        .and_then(|e| e.parse().ok())
        .unwrap_or(0);

    if exponent < -4 || exponent >= PRECISION {
        let (mantissa, _) = rounded.split_once('e').unwrap_or((rounded.as_str(), ""));
        let mantissa = strip_fraction_zeros(mantissa);
        cxx_exponent(&format!("{}e{}", mantissa, exponent))
    } else {
        let decimals = (PRECISION - 1 - exponent) as usize;
        strip_fraction_zeros(&format!("{:.*}", decimals, x)).to_string()
    }
}

fn fmt_non_finite(x: f64) -> String {
    if x.is_nan() {
        "nan".to_string()
    } else if x > 0.0 {
        "inf".to_string()
    } else {
        "-inf".to_string()
    }
}

fn strip_fraction_zeros(s: &str) -> &str {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    } else {
        s
    }
}

/// Rewrite Rust's `1.5e-5` exponent as C's `1.5e-05`.
fn cxx_exponent(s: &str) -> String {
    match s.split_once('e') {
        Some((mantissa, exp)) => {
            let exp: i32 = exp.parse().unwrap_or(0);
            let sign = if exp < 0 { '-' } else { '+' };
            format!("{}e{}{:02}", mantissa, sign, exp.abs())
        }
        None => s.to_string(),
    }
}
