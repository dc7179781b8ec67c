//! Interactive parameter editor
//!
//! Shows the current run settings as a numbered list and lets the operator
//! change one at a time until they answer `0`. Generic over the input and
//! output streams so it can be driven from tests.
//!
//! Changing ω_ext (or the strobe skip) drops any explicit step size, so `h`
//! follows the forcing period again: `h = T_ext / strobe_skip`.

use std::io::{BufRead, Write};
use std::str::FromStr;
use tracing::debug;

use crate::config::RunConfig;
use crate::error::Result;

/// Menu entries, numbered from 1 in display order
const ENTRIES: [&str; 15] = [
    "omega0",
    "alpha",
    "f_ext",
    "w_ext",
    "phi_ext",
    "theta0",
    "theta_dot0",
    "t_start",
    "t_end",
    "h",
    "plot_start",
    "plot_end",
    "plot_skip",
    "Gnuplot_delay",
    "strobe_skip",
];

/// Line-oriented prompt over arbitrary streams
#[derive(Debug)]
pub struct Menu<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Menu<R, W> {
    /// Wrap an input and output stream
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Recover the streams
    pub fn into_inner(self) -> (R, W) {
        (self.input, self.output)
    }

    /// Edit `config` until the operator enters 0 or input ends.
    pub fn edit(&mut self, config: &mut RunConfig) -> Result<()> {
        loop {
            self.show(config)?;
            write!(self.output, "\nWhat do you want to change? [0 for none] ")?;
            self.output.flush()?;

            let Some(choice) = self.read_value::<usize>()? else {
                return Ok(());
            };
            writeln!(self.output)?;
            if choice == 0 {
                return Ok(());
            }
            let Some(&name) = ENTRIES.get(choice - 1) else {
                writeln!(self.output, "no option [{}]", choice)?;
                continue;
            };

            write!(self.output, "enter {}:\n>> ", name)?;
            self.output.flush()?;
            if !self.apply(choice, config)? {
                return Ok(());
            }
            debug!(option = name, "parameter changed");
        }
    }

    /// Ask whether to run again; anything but y/Y (or end of input) is no.
    pub fn ask_again(&mut self) -> Result<bool> {
        write!(self.output, "Again? Y/N\n>> ")?;
        self.output.flush()?;
        let mut line = String::new();
        self.input.read_line(&mut line)?;
        Ok(matches!(line.trim(), "y" | "Y"))
    }

    fn show(&mut self, config: &RunConfig) -> Result<()> {
        let p = &config.pendulum;
        let s = &config.sampling;
        let values = [
            p.omega0.to_string(),
            p.alpha.to_string(),
            p.f_ext.to_string(),
            p.omega_ext.to_string(),
            p.phi_ext.to_string(),
            p.theta0.to_string(),
            p.theta_dot0.to_string(),
            config.span.t_min.to_string(),
            config.span.t_max.to_string(),
            config.step_size().to_string(),
            s.plot_min.to_string(),
            s.plot_max.to_string(),
            s.plot_skip.to_string(),
            config.plot.delay_ms.to_string(),
            s.strobe_skip.to_string(),
        ];

        writeln!(self.output, "\nCurrent parameters:")?;
        for (i, (name, value)) in ENTRIES.iter().zip(&values).enumerate() {
            writeln!(self.output, "[{}] {} = {}", i + 1, name, value)?;
        }
        Ok(())
    }

    /// Read the new value for `choice` into `config`. False at end of input.
    fn apply(&mut self, choice: usize, config: &mut RunConfig) -> Result<bool> {
        let p = &mut config.pendulum;
        let s = &mut config.sampling;
        let target: &mut f64 = match choice {
            1 => &mut p.omega0,
            2 => &mut p.alpha,
            3 => &mut p.f_ext,
            4 => &mut p.omega_ext,
            5 => &mut p.phi_ext,
            6 => &mut p.theta0,
            7 => &mut p.theta_dot0,
            8 => &mut config.span.t_min,
            9 => &mut config.span.t_max,
            10 => {
                let Some(h) = self.read_value::<f64>()? else {
                    return Ok(false);
                };
                config.step = Some(h);
                return Ok(true);
            }
            11 => &mut s.plot_min,
            12 => &mut s.plot_max,
            13 | 15 => {
                let Some(n) = self.read_value::<u32>()? else {
                    return Ok(false);
                };
                if choice == 13 {
                    s.plot_skip = n;
                } else {
                    s.strobe_skip = n;
                    config.step = None;
                }
                return Ok(true);
            }
            14 => {
                let Some(ms) = self.read_value::<u64>()? else {
                    return Ok(false);
                };
                config.plot.delay_ms = ms;
                return Ok(true);
            }
            _ => unreachable!("menu choice checked against ENTRIES"),
        };

        let Some(value) = self.read_value::<f64>()? else {
            return Ok(false);
        };
        *target = value;
        if choice == 4 {
            config.step = None;
        }
        Ok(true)
    }

    /// Read one value, re-prompting on parse errors. `None` at end of input.
    fn read_value<T: FromStr>(&mut self) -> Result<Option<T>> {
        loop {
            let mut line = String::new();
            if self.input.read_line(&mut line)? == 0 {
                return Ok(None);
            }
            match line.trim().parse() {
                Ok(value) => return Ok(Some(value)),
                Err(_) => {
                    write!(self.output, "not a valid value: {:?}\n>> ", line.trim())?;
                    self.output.flush()?;
                }
            }
        }
    }
}
