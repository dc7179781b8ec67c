//! rk4-pendulum: run the forced, damped pendulum and plot its phase space
//!
//! ```text
//! rk4-pendulum [CONFIG.json] [--batch] [--no-plot]
//! rk4-pendulum compare ESTIMATE.dat EXACT.dat
//! ```
//!
//! Without `--batch` the parameter menu is shown before each run and the
//! operator is asked whether to run again. Log verbosity follows `RUST_LOG`.

use anyhow::{bail, Context, Result};
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use rk4_pendulum::validation::DEFAULT_CHECK_ROWS;
use rk4_pendulum::{
    compare_files, DataFileWriter, GnuplotPipe, Menu, RunConfig, RunSummary, Simulation,
};

#[derive(Debug, Default)]
struct Options {
    config: Option<PathBuf>,
    batch: bool,
    no_plot: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.first().map(String::as_str) == Some("compare") {
        return compare(&args[1..]);
    }

    let options = parse_options(&args)?;
    let mut config = match &options.config {
        Some(path) => RunConfig::from_json_file(path)
            .with_context(|| format!("reading config {}", path.display()))?,
        None => RunConfig::default(),
    };
    if options.no_plot {
        config.plot.enabled = false;
    }

    let stdin = io::stdin();
    let mut menu = Menu::new(stdin.lock(), io::stdout());
    loop {
        if !options.batch {
            menu.edit(&mut config)?;
        }
        match run_once(&config) {
            Ok(()) => {}
            Err(err) if !options.batch => eprintln!("run failed: {:#}", err),
            Err(err) => return Err(err),
        }
        if options.batch || !menu.ask_again()? {
            break;
        }
    }
    Ok(())
}

fn parse_options(args: &[String]) -> Result<Options> {
    let mut options = Options::default();
    for arg in args {
        match arg.as_str() {
            "--batch" => options.batch = true,
            "--no-plot" => options.no_plot = true,
            flag if flag.starts_with("--") => bail!("unknown option {}", flag),
            path if options.config.is_none() => options.config = Some(PathBuf::from(path)),
            extra => bail!("unexpected argument {}", extra),
        }
    }
    Ok(options)
}

fn run_once(config: &RunConfig) -> Result<()> {
    let sim = config.simulation().context("invalid run parameters")?;

    let path = &config.output.path;
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    }
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let writer = DataFileWriter::new(BufWriter::new(file), &sim)?;

    let pipe = if config.plot.enabled {
        match GnuplotPipe::spawn(&config.plot.program, &config.plot.settings()) {
            Ok(pipe) => Some(pipe),
            Err(err) => {
                warn!(program = %config.plot.program, %err, "plotting disabled");
                None
            }
        }
    } else {
        None
    };

    println!("Plotting now (wait until complete) . . .");
    let summary = run_with_plot(&sim, writer, pipe)?;

    info!(?summary, "run finished");
    println!("\n results added to {}\n", path.display());
    Ok(())
}

/// Run into the results file and the plot, closing the plot either way.
fn run_with_plot<W: Write>(
    sim: &Simulation,
    writer: DataFileWriter<W>,
    pipe: Option<GnuplotPipe>,
) -> Result<RunSummary> {
    let mut sinks = (writer, pipe);
    let result = sim.run_into(&mut sinks);
    let (_, pipe) = sinks;

    if let Some(pipe) = pipe {
        match (&result, pipe.close()) {
            (Ok(_), Ok(_)) => {}
            (Ok(_), Err(err)) => return Err(err).context("closing gnuplot"),
            (Err(_), Err(err)) => warn!(%err, "closing gnuplot after a failed run"),
            (Err(_), Ok(_)) => {}
        }
    }
    Ok(result?)
}

fn compare(args: &[String]) -> Result<()> {
    let [estimate, exact] = args else {
        bail!("usage: rk4-pendulum compare ESTIMATE.dat EXACT.dat");
    };
    let rows = compare_files(estimate, exact, &DEFAULT_CHECK_ROWS)
        .with_context(|| format!("comparing {} against {}", estimate, exact))?;
    for row in rows {
        println!("Calculating error at row: {}", row.row);
        println!("t: {}", row.t);
        println!("theta error: {}", row.theta);
        println!("thetadot error: {}", row.theta_dot);
        println!();
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rk4_pendulum::PlotSettings;

    /// Accepts `room` bytes, then fails every write
    struct Cramped {
        room: usize,
    }

    impl Write for Cramped {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if buf.len() > self.room {
                return Err(io::Error::other("no space left"));
            }
            self.room -= buf.len();
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_options() {
        let options = parse_options(&args(&["run.json", "--batch"])).unwrap();
        assert_eq!(options.config, Some(PathBuf::from("run.json")));
        assert!(options.batch);
        assert!(!options.no_plot);

        assert!(parse_options(&args(&["--fast"])).is_err());
        assert!(parse_options(&args(&["a.json", "b.json"])).is_err());
    }

    #[test]
    fn test_run_once_writes_results_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = RunConfig::default();
        config.span.t_max = 2.0;
        config.plot.enabled = false;
        config.output.path = dir.path().join("nested").join("out.dat");

        run_once(&config).unwrap();
        let text = fs::read_to_string(&config.output.path).unwrap();
        assert!(text.starts_with("# omega0=1, alpha=0.2\n"));
        assert!(text.ends_with("\n\n"));
    }

    #[cfg(unix)]
    #[test]
    fn test_failed_run_still_closes_plot() {
        use std::process::{Command, Stdio};

        let dir = tempfile::tempdir().unwrap();
        let sent = dir.path().join("sent.gp");
        let mut command = Command::new("tee");
        command.arg(&sent).stdout(Stdio::null());
        let pipe = GnuplotPipe::from_command(command, &PlotSettings::new("dumb")).unwrap();

        let sim = RunConfig::default().simulation().unwrap();
        let writer = DataFileWriter::new(Cramped { room: 600 }, &sim).unwrap();
        assert!(run_with_plot(&sim, writer, Some(pipe)).is_err());

        // The plotting process has been waited on, so everything it was sent is on disk.
        let text = fs::read_to_string(&sent).unwrap();
        assert!(text.contains("set multiplot\n"));
        assert!(text.contains("plot '-'"));
        assert!(!text.contains("unset multiplot"));
    }
}
