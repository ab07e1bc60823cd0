use std::path::PathBuf;

use clap::{Parser, Subcommand};

use perch_glider::{Backend, Formulation};

/// Perching trajectory optimizer for a flat-plate glider.
#[derive(Parser)]
#[command(
    name = "perch-glider",
    version,
    about = "Perching trajectory optimizer for a flat-plate glider"
)]
pub struct Cli {
    /// Increase verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Optimize a perching maneuver from a straight-glide guess.
    Solve(SolveArgs),
}

/// Arguments for the `solve` subcommand.
#[derive(clap::Args)]
pub struct SolveArgs {
    /// Path to the glider parameter TOML document.
    #[arg(short, long, default_value = "glider.toml")]
    pub params: PathBuf,

    /// Number of collocation knots.
    #[arg(short = 'n', long, default_value_t = 10)]
    pub knots: usize,

    /// Maneuver duration (s).
    #[arg(short, long, default_value_t = 1.0)]
    pub duration: f64,

    /// Start position `x,z` (m); also the anchor target.
    #[arg(long, value_parser = parse_point, default_value = "0,1", allow_hyphen_values = true)]
    pub start: [f64; 2],

    /// End position `x,z` (m) of the initial guess.
    #[arg(long, value_parser = parse_point, default_value = "1,0", allow_hyphen_values = true)]
    pub end: [f64; 2],

    /// Diagonal entry of the state weight Q.
    #[arg(long, default_value_t = 1.0)]
    pub state_weight: f64,

    /// Control weight R.
    #[arg(long, default_value_t = 1.0)]
    pub control_weight: f64,

    /// Objective evaluation budget.
    #[arg(long, default_value_t = 1000)]
    pub max_evals: usize,

    /// Wall-clock budget (s).
    #[arg(long, default_value_t = 0.5)]
    pub max_time: f64,

    /// NLP backend (cobyla, penalty).
    #[arg(long, default_value = "cobyla")]
    pub backend: Backend,

    /// Constraint formulation (inequality, equality).
    #[arg(long, default_value = "inequality")]
    pub formulation: Formulation,

    /// Leave angles, rates and velocities unbounded at the solver level;
    /// the box residuals still apply.
    #[arg(long)]
    pub free_variables: bool,

    /// Write the optimized trajectory as CSV.
    #[arg(long)]
    pub csv: Option<PathBuf>,

    /// Write a JSON solve summary.
    #[arg(long)]
    pub summary: Option<PathBuf>,
}

fn parse_point(s: &str) -> Result<[f64; 2], String> {
    let (x, z) = s
        .split_once(',')
        .ok_or_else(|| format!("expected `x,z`, got `{s}`"))?;
    let parse = |v: &str| {
        v.trim()
            .parse::<f64>()
            .map_err(|e| format!("bad coordinate `{v}`: {e}"))
    };
    Ok([parse(x)?, parse(z)?])
}
