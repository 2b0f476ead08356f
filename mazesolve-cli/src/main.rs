use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use thiserror::Error;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use mazesolve_core::{
    BfsSolver, CellStore, DfsSolver, MtM1Solver, MtM2Solver, Phase, Position, SolveReport, SolverLimits,
};

#[derive(Error, Debug)]
enum CliError {
    #[error("unknown solver {0:?}, expected one of: bfs, dfs, mt-m2, mt-m1")]
    UnknownSolver(String),
}

#[derive(Parser, Debug)]
#[command(name = "mazesolve", version, about = "Solve a maze with BFS, DFS, or one of the cooperative multi-walker solvers")]
struct Args {
    /// Path to the binary maze file.
    #[arg(long = "maze", value_name = "PATH")]
    maze: PathBuf,

    /// Solver to run: bfs, dfs, mt-m2, mt-m1.
    #[arg(long = "solver", value_name = "NAME")]
    solver: String,

    /// Emit the report as JSON instead of a human-readable summary.
    #[arg(long)]
    json: bool,

    /// Override the default step budget (cells * 8).
    #[arg(long = "max-steps", value_name = "N")]
    max_steps: Option<u64>,
}

fn drive(mut cells: CellStore, solver: &str, limits: SolverLimits) -> Result<SolveReport> {
    let width = cells.width();
    let height = cells.height();
    let phases: Vec<Phase> = match solver {
        "bfs" => BfsSolver::with_limits(&mut cells, limits).step_by_step().collect(),
        "dfs" => DfsSolver::with_limits(&mut cells, limits).step_by_step().collect(),
        "mt-m2" => MtM2Solver::with_limits(&mut cells, limits).step_by_step().collect(),
        "mt-m1" => MtM1Solver::with_limits(&mut cells, limits).step_by_step().collect(),
        other => return Err(CliError::UnknownSolver(other.to_string()).into()),
    };
    let path = if matches!(phases.last(), Some(Phase::Finished)) {
        Some(
            (0..height)
                .flat_map(|row| (0..width).map(move |col| Position::new(row, col)))
                .filter(|&p| cells.is_on_path(p))
                .collect::<Vec<_>>(),
        )
    } else {
        None
    };
    Ok(SolveReport::build(solver, width, height, &phases, path))
}

fn run(args: Args) -> Result<()> {
    info!(?args, "starting mazesolve");

    let cells = mazesolve_core::load_maze_file(&args.maze)
        .with_context(|| format!("failed to load maze {:?}", args.maze))?;

    let limits = match args.max_steps {
        Some(max_steps) => SolverLimits { max_steps },
        None => SolverLimits::for_cells((cells.width() * cells.height()).max(0) as usize),
    };

    let report = drive(cells, args.solver.as_str(), limits)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!(
            "solver={} size={}x{} phases={} searching={} backtracking={} finished={}",
            report.solver,
            report.width,
            report.height,
            report.phases_emitted,
            report.searching_steps,
            report.backtracking_steps,
            report.finished,
        );
        match &report.path {
            Some(path) => println!("path ({} cells): {:?}", path.len(), path),
            None => println!("no path found"),
        }
    }

    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();

    // Logs go to stderr regardless of format so `--json`'s machine-readable
    // report on stdout is never interleaved with log lines.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if args.json {
        let subscriber =
            FmtSubscriber::builder().with_env_filter(filter).with_writer(std::io::stderr).json().finish();
        tracing::subscriber::set_global_default(subscriber).expect("failed to install json subscriber");
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
    }

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "mazesolve failed");
            ExitCode::FAILURE
        }
    }
}
