//! Solves a heat equation problem with backward Euler and writes a Geomview mesh.
//!
//! Usage: `heat-implicit <T> <n> <steps>`

use std::{fs::File, io::BufWriter, path::PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

use heat_implicit::{
    Driver, Float, GeomviewWriter, Logger, PivotGuard, ProblemKind, Report, Simulation,
};

#[derive(Parser)]
#[command(
    name = "heat-implicit",
    about = "Backward Euler solver for u_t = u_xx with Dirichlet boundary conditions"
)]
struct Cli {
    /// Final time, 0 ≤ t ≤ T
    #[arg(value_parser = parse_final_time)]
    final_time: Float,

    /// Interior grid points, a = x[0], x[1], ..., x[n], x[n+1] = b
    #[arg(value_parser = parse_interior)]
    interior: usize,

    /// Time steps, 0 = t[0], t[1], ..., t[steps] = T
    steps: usize,

    /// Problem to solve
    #[arg(long, value_enum, default_value_t = ProblemArg::Heat1)]
    problem: ProblemArg,

    /// Geomview file to write
    #[arg(long, short, default_value = "im1.gv")]
    output: PathBuf,

    /// Stop with an error when a pivot of the tridiagonal solve is not larger than this
    #[arg(long)]
    pivot_tolerance: Option<Float>,
}

#[derive(Clone, Copy, ValueEnum)]
enum ProblemArg {
    /// exp(-π²t/4) cos(πx/2) on [-1, 1]
    Heat1,
    /// rectangular bump on [-1, 1], no exact solution
    Bump,
}

impl From<ProblemArg> for ProblemKind {
    fn from(arg: ProblemArg) -> Self {
        match arg {
            ProblemArg::Heat1 => ProblemKind::Heat1,
            ProblemArg::Bump => ProblemKind::RectangularBump,
        }
    }
}

fn parse_final_time(s: &str) -> Result<Float, String> {
    let t: Float = s.parse().map_err(|e| format!("{e}"))?;
    if t.is_finite() && t > 0.0 {
        Ok(t)
    } else {
        Err(format!("T must be a positive number, got {s}"))
    }
}

fn parse_interior(s: &str) -> Result<usize, String> {
    let n: usize = s.parse().map_err(|e| format!("{e}"))?;
    if n >= 1 {
        Ok(n)
    } else {
        Err("n must be at least 1".to_string())
    }
}

fn run(cli: Cli) -> Result<Report> {
    let mut sim = Simulation::from_shared(
        ProblemKind::from(cli.problem).build(),
        cli.final_time,
        cli.interior,
        cli.steps,
    )
    .context("invalid parameters")?;
    if let Some(tolerance) = cli.pivot_tolerance {
        sim = sim.with_pivot_guard(PivotGuard::Checked { tolerance });
    }

    let output = File::create(&cli.output)
        .with_context(|| format!("cannot open `{}` for writing", cli.output.display()))?;

    println!("[{}]", sim.problem().name());

    let report = Driver::new(sim)
        .with_observer(Logger::new())
        .with_observer(GeomviewWriter::new(BufWriter::new(output)))
        .run()
        .context("simulation failed")?;

    println!("{report}");
    println!("geomview script written to {}", cli.output.display());

    Ok(report)
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    run(Cli::parse())?;
    Ok(())
}
