use std::path::PathBuf;

use anyhow::{Result, ensure};
use tourweave::io;

pub fn run(_cli: &crate::cli::Cli, args: &crate::cli::GenerateArgs) -> Result<()> {
    ensure!(args.extent.is_finite() && args.extent > 0.0, "[generate] extent must be positive, got {}", args.extent);
    let out_path = args.output.clone().unwrap_or(PathBuf::from("./random.tsp"));

    log::info!("[generate] {} points, seed {}, extent {}", args.count, args.seed, args.extent);
    let instance = io::random_instance(args.count, args.seed, args.extent);
    io::write_tsplib(&instance, &out_path)?;

    log::info!("[generate] wrote {}", out_path.display());
    Ok(())
}
