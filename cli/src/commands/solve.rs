use std::path::PathBuf;

use anyhow::{Context, Result};
use tourweave::{EngineConfig, Solver, io};

pub fn run(cli: &crate::cli::Cli, args: &crate::cli::SolveArgs) -> Result<()> {
    let out_path = args.output.clone().unwrap_or(PathBuf::from("./report.tsv"));

    let mut config = match &args.config {
        Some(path) => EngineConfig::from_json_file(path)?,
        None => EngineConfig::default(),
    };
    if let Some(dir) = &args.cache_dir {
        config.cache_dir = Some(dir.clone());
    }

    log::info!("[solve] reading instance from {}", args.input.display());
    let instance = io::read_tsplib(&args.input)?;

    let index = match &config.cache_dir {
        Some(dir) => io::DistanceCache::new(dir).load_or_build(&instance)?,
        None => instance.build_index()?,
    };

    let mut solver = Solver::new(index, config);
    let result = solver.solve()
        .with_context(|| format!("[solve] failed to solve {}", instance.name))?;

    log::info!("[solve] writing report to {}", out_path.display());
    io::write_report_file(&out_path, &instance.name, solver.index(), &result)?;

    if let Some(path) = &args.tour {
        io::write_tour_file(path, &instance.name, &result)?;
    }
    if let Some(path) = &args.summary {
        io::TourSummary::new(&instance.name, solver.index(), &result).write_json(path)?;
    }
    if let Some(path) = &args.svg {
        io::write_svg(path, solver.index(), &result)?;
    }

    if cli.verbose > 0 || !result.complete {
        eprintln!(
            "[solve] {}: {} points, {} rings, length {:.3}, {} unbalanced",
            instance.name, instance.len(), result.rings.len(), result.total_length, result.unbalanced(),
        );
    }

    Ok(())
}
