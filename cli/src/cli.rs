use std::path::PathBuf;

/// Ring-weaving TSP heuristic (argument schema only)
#[derive(clap::Parser, Debug)]
#[command(name = "tourweave", version, about, propagate_version = true)]
pub struct Cli {
    /// Increase output verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// Build a tour for a TSPLIB instance
    Solve(SolveArgs),

    /// Write a random Euclidean instance in TSPLIB format
    Generate(GenerateArgs),
}

#[derive(clap::Args, Debug)]
pub struct SolveArgs {
    /// Input TSPLIB instance (.tsp)
    #[arg(value_hint = clap::ValueHint::FilePath)]
    pub input: PathBuf,

    /// Output connection report, defaults to "./report.tsv"
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    pub output: Option<PathBuf>,

    /// Also write the tour in TSPLIB TOUR format (complete runs only)
    #[arg(long, value_hint = clap::ValueHint::FilePath)]
    pub tour: Option<PathBuf>,

    /// Also write a JSON summary of the run
    #[arg(long, value_hint = clap::ValueHint::FilePath)]
    pub summary: Option<PathBuf>,

    /// Also render the rings as SVG
    #[arg(long, value_hint = clap::ValueHint::FilePath)]
    pub svg: Option<PathBuf>,

    /// Engine configuration (JSON); missing fields use defaults
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Directory for persisted distance tables, overrides the config
    #[arg(long, value_hint = clap::ValueHint::DirPath)]
    pub cache_dir: Option<PathBuf>,
}

#[derive(clap::Args, Debug)]
pub struct GenerateArgs {
    /// Number of points
    pub count: usize,

    /// Output instance file, defaults to "./random.tsp"
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    pub output: Option<PathBuf>,

    /// Random seed
    #[arg(long, default_value_t = 0)]
    pub seed: u64,

    /// Side length of the square the points are drawn from
    #[arg(long, default_value_t = 1000.0)]
    pub extent: f64,
}
