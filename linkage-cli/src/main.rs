use std::{
    hint::black_box,
    io::{self, Read},
    path::{Path, PathBuf},
    str::FromStr,
    time::Duration,
};

use anyhow::Context;
use clap::{ArgAction, Parser, ValueEnum};
use linkage::{
    Config, Scene, SolveReport, Strategy, Warning,
    datatypes::SceneState,
    textual::{Drag, Label, Problem},
};

const NUM_ITERS_BENCHMARK: u32 = 100;

#[derive(Parser)]
#[command(name = "linkage", version, about, long_about = None)]
struct Cli {
    /// Path to the scene file.
    /// Use '-' for stdin.
    #[arg(short = 'f', long)]
    filepath: PathBuf,

    /// Read the scene as JSON instead of the textual format.
    /// Implied by a `.json` extension.
    #[arg(long, default_value_t = false)]
    json: bool,

    /// Drag a point by an offset, after any drags in the file.
    /// Written NAME:DX,DY, e.g. `--drag c:50,0`. Repeatable.
    #[arg(long = "drag", value_parser = parse_drag)]
    drags: Vec<Drag>,

    /// Which solver to use.
    #[arg(long, value_enum, default_value_t = StrategyArg::Relaxation)]
    strategy: StrategyArg,

    /// Largest acceptable residual for each constraint.
    #[arg(long)]
    tolerance: Option<f64>,

    /// Fraction of each distance error corrected per relaxation pass.
    #[arg(long)]
    stiffness: Option<f64>,

    /// Fraction of each pin's error corrected per relaxation pass.
    #[arg(long = "pin-stiffness")]
    pin_stiffness: Option<f64>,

    /// Give up after this many iterations.
    #[arg(long = "max-iterations")]
    max_iterations: Option<usize>,

    /// Show the final position of each point.
    #[arg(long = "show-points")]
    show_points: bool,

    /// Print the solve reports as JSON instead of a summary.
    #[arg(long = "output-json")]
    output_json: bool,

    /// Log more. Repeat for even more.
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum StrategyArg {
    Relaxation,
    GaussNewton,
    Penalty,
}

impl From<StrategyArg> for Strategy {
    fn from(value: StrategyArg) -> Self {
        match value {
            StrategyArg::Relaxation => Strategy::Relaxation,
            StrategyArg::GaussNewton => Strategy::GaussNewton,
            StrategyArg::Penalty => Strategy::Penalty,
        }
    }
}

impl Cli {
    fn config(&self) -> Config {
        let mut config = Config::default().with_strategy(self.strategy.into());
        if let Some(tolerance) = self.tolerance {
            config = config.with_tolerance(tolerance);
        }
        if let Some(stiffness) = self.stiffness {
            config = config.with_distance_stiffness(stiffness);
        }
        if let Some(stiffness) = self.pin_stiffness {
            config = config.with_pin_stiffness(stiffness);
        }
        if let Some(max_iterations) = self.max_iterations {
            config = config.with_max_iterations(max_iterations);
        }
        config
    }

    fn is_json(&self) -> bool {
        self.json || self.filepath.extension().is_some_and(|ext| ext == "json")
    }
}

/// Parse a `NAME:DX,DY` drag.
fn parse_drag(s: &str) -> Result<Drag, String> {
    let (name, offset) = s
        .split_once(':')
        .ok_or_else(|| format!("expected NAME:DX,DY, got {s}"))?;
    let (dx, dy) = offset
        .split_once(',')
        .ok_or_else(|| format!("expected DX,DY after the colon, got {offset}"))?;
    let parse = |v: &str| {
        f64::from_str(v.trim()).map_err(|e| format!("could not parse {v} as a number: {e}"))
    };
    Ok(Drag::By {
        point: Label::from(name.trim()),
        dx: parse(dx)?,
        dy: parse(dy)?,
    })
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let (reports, duration) = match main_inner(&cli) {
        Ok(soln) => soln,
        Err(e) => {
            eprintln!("Error: {e:#}");
            std::process::exit(1);
        }
    };
    if cli.output_json {
        match serde_json::to_string_pretty(&reports) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                eprintln!("Error: {e}");
                std::process::exit(1);
            }
        }
    } else {
        print_output(&reports, duration, cli.show_points);
    }
    if reports.iter().any(|r| !r.converged()) {
        std::process::exit(1);
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_max_level(level)
        .init();
}

/// Build the scene, perform every drag, and time how long that takes.
fn main_inner(cli: &Cli) -> anyhow::Result<(Vec<SolveReport>, Duration)> {
    let txt = read_scene(&cli.filepath)?;
    let config = cli.config();
    let (scene, mut drags) = if cli.is_json() {
        let state: SceneState = serde_json::from_str(&txt).context("invalid scene JSON")?;
        (Scene::from_state(&state, config)?, Vec::new())
    } else {
        let problem = Problem::from_str(&txt)?;
        (problem.to_scene(config)?, problem.drags)
    };
    drags.extend(cli.drags.iter().cloned());

    let now = std::time::Instant::now();
    let reports = perform_drags(&mut scene.clone(), &drags)?;

    // It worked. Benchmark its perf.
    for _ in 0..NUM_ITERS_BENCHMARK {
        let _ = black_box(perform_drags(&mut scene.clone(), &drags));
    }
    let elapsed = now.elapsed();
    let duration_per_iter = elapsed / (NUM_ITERS_BENCHMARK + 1);
    Ok((reports, duration_per_iter))
}

/// One report per drag, or a single report from stabilizing the scene if there are none.
fn perform_drags(scene: &mut Scene, drags: &[Drag]) -> anyhow::Result<Vec<SolveReport>> {
    if drags.is_empty() {
        return Ok(vec![scene.solve()]);
    }
    drags
        .iter()
        .map(|drag| {
            let report = match drag {
                Drag::By { point, dx, dy } => scene.displace(point.as_str(), *dx, *dy),
                Drag::To { point, x, y } => scene.drag_to(point.as_str(), *x, *y),
            };
            report.map_err(anyhow::Error::from)
        })
        .collect()
}

/// Prints the output nicely to stdout.
fn print_output(reports: &[SolveReport], duration: Duration, show_points: bool) {
    use colored::Colorize;
    if let Some(first) = reports.first() {
        print_lints(first.warnings());
    }
    for (i, report) in reports.iter().enumerate() {
        let status = if report.converged() {
            "converged".green()
        } else {
            "did not converge".red()
        };
        println!(
            "Drag {}: {status} after {} iterations (max residual {:.2e})",
            i + 1,
            report.iterations(),
            report.max_residual()
        );
    }
    print_performance(duration);
    if show_points {
        if let Some(last) = reports.last() {
            println!("Points:");
            for (label, p) in last.positions() {
                println!("\t{label}: ({:.2}, {:.2})", p.x, p.y);
            }
        }
    }
}

fn print_performance(duration: Duration) {
    use colored::Colorize;
    let time = format!("{}μs", duration.as_micros());
    println!("Solved in {time} (mean over {NUM_ITERS_BENCHMARK} iterations)");
    let solves_per_second = Duration::from_secs(1).as_micros() / duration.as_micros().max(1);
    let solves_per_second = if solves_per_second <= 60 {
        solves_per_second.to_string().red()
    } else {
        solves_per_second.to_string().normal()
    };
    println!("i.e. {solves_per_second} solves per second");
}

fn print_lints(lints: &[Warning]) {
    use colored::Colorize;
    if !lints.is_empty() {
        println!("Lints:");
        for lint in lints {
            let content = lint.content.to_string();
            match lint.about_constraint {
                Some(i) => println!("\tConstraint {i}: {}", content.yellow()),
                None => println!("\t{}", content.yellow()),
            }
        }
    }
}

/// Read the scene from a file or stdin, depending on user args.
/// They pass a filename, or '-' for stdin.
fn read_scene(filepath: &Path) -> anyhow::Result<String> {
    // Read from file
    if filepath != Path::new("-") {
        return std::fs::read_to_string(filepath)
            .with_context(|| format!("could not read {}", filepath.display()));
    }

    // Read from stdin
    let mut txt = String::with_capacity(100);
    io::stdin().read_to_string(&mut txt)?;
    Ok(txt)
}

#[cfg(test)]
mod tests {
    use std::process::{Command, Stdio};

    use super::*;

    fn cli(filepath: &str) -> Cli {
        Cli {
            filepath: filepath.into(),
            json: false,
            drags: Vec::new(),
            strategy: StrategyArg::Relaxation,
            tolerance: None,
            stiffness: None,
            pin_stiffness: None,
            max_iterations: None,
            show_points: true,
            output_json: false,
            verbose: 0,
        }
    }

    #[test]
    fn test_cases_inner() {
        for case in ["four_bar", "triangle"] {
            let cli = cli(&format!("../test_cases/{case}/problem.txt"));
            let (reports, duration) = main_inner(&cli).unwrap();
            assert!(reports.iter().all(SolveReport::converged), "{case}");
            print_output(&reports, duration, cli.show_points);
        }
    }

    #[test]
    fn test_json_with_cli_drags() {
        let mut cli = cli("../test_cases/four_bar/scene.json");
        cli.drags = vec![parse_drag("c:50,0").unwrap(), parse_drag("d: -10, 5").unwrap()];
        for strategy in [
            StrategyArg::Relaxation,
            StrategyArg::GaussNewton,
            StrategyArg::Penalty,
        ] {
            cli.strategy = strategy;
            let (reports, _) = main_inner(&cli).unwrap();
            assert_eq!(reports.len(), 2);
            assert!(reports.iter().all(SolveReport::converged), "{strategy:?}");
        }
    }

    #[test]
    fn test_contradictory() {
        let mut cli = cli("../test_cases/contradictory/problem.txt");
        cli.max_iterations = Some(100);
        let (reports, _) = main_inner(&cli).unwrap();
        assert_eq!(reports.len(), 1);
        assert!(!reports[0].converged());
        assert!(!reports[0].warnings().is_empty());
    }

    #[test]
    fn test_bad_input() {
        let mut cli = cli("../test_cases/four_bar/problem.txt");
        cli.drags = vec![parse_drag("nope:1,1").unwrap()];
        let err = main_inner(&cli).unwrap_err();
        assert!(err.to_string().contains("nope"), "{err}");

        let mut cli2 = super::tests::cli("../test_cases/four_bar/problem.txt");
        cli2.stiffness = Some(2.0);
        assert!(main_inner(&cli2).is_err());

        assert!(parse_drag("c50,0").is_err());
        assert!(parse_drag("c:50").is_err());
        assert!(parse_drag("c:x,0").is_err());
    }

    #[test]
    fn test_four_bar() {
        let out = Command::new("cargo")
            .args([
                "run",
                "--quiet",
                "--",
                "-f",
                "../test_cases/four_bar/problem.txt",
            ])
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .unwrap()
            .wait_with_output()
            .unwrap();
        assert!(out.status.success());
        let stdout = String::from_utf8(out.stdout).unwrap();
        assert!(stdout.contains("Drag 1: "));
    }
}
