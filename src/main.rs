use std::{
    fs::File,
    io::{self, BufReader},
    path::PathBuf,
};

use anyhow::{Context, Result};
use clap::Parser;
use clap_verbosity_flag::{Verbosity, WarnLevel};
use env_logger::Builder;

use lar::{lar::lar_solver::LarStatus, problem_file::LarProblem};

/// Decides a conjunction of linear constraints over the reals, and prints a model or a proof of
/// infeasibility.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// Problem file: `var` declarations followed by one constraint per line.
    file: PathBuf,

    /// Skip the floating point pass that seeds the exact solve.
    #[arg(long)]
    exact_only: bool,

    /// Stop the exact solve after this many simplex iterations.
    #[arg(long, value_name = "N")]
    max_iterations: Option<usize>,

    #[command(flatten)]
    verbose: Verbosity<WarnLevel>,
}

pub fn main() -> Result<()> {
    let cli = Cli::parse();

    Builder::new()
        .filter_level(cli.verbose.log_level_filter())
        .init();

    log::info!("lar starting");

    let file = File::open(&cli.file).with_context(|| format!("opening {}", cli.file.display()))?;
    let mut reader = BufReader::new(file);
    let mut problem = LarProblem::import(&mut reader)
        .with_context(|| format!("reading {}", cli.file.display()))?;

    let settings = problem.solver.settings_mut();
    settings.use_approximate_pass = !cli.exact_only;
    settings.max_exact_iterations = cli.max_iterations;

    let status = problem.solver.check();
    log::info!(
        "{} after {} simplex iterations",
        status,
        problem.solver.get_total_iterations()
    );

    problem
        .write_outcome(&mut io::stdout().lock())
        .context("writing the outcome")?;

    if status == LarStatus::Unknown {
        log::warn!("the iteration limit was reached before the problem was decided");
    }
    Ok(())
}
