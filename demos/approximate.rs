use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use symbios_mosaic::{EvolutionConfig, approximate, io, render::render};

/// Approximate an RGB image with translucent triangles.
#[derive(Parser)]
#[command(name = "approximate")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Target image (3-channel RGB)
    target: PathBuf,

    /// Where to write the rendered best genome
    output: PathBuf,

    /// JSON run configuration; missing fields take their defaults
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the configured RNG seed
    #[arg(short, long)]
    seed: Option<u64>,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = match &cli.config {
        Some(p) => serde_json::from_str::<EvolutionConfig>(&std::fs::read_to_string(p)?)?,
        None => EvolutionConfig::default(),
    };
    if let Some(seed) = cli.seed {
        config.seed = seed;
    }

    let target = io::load_target(&cli.target)?;
    let outcome = approximate(&target, config)?;

    println!(
        "{:?} after {} generations, best fitness {:.6}",
        outcome.stop_reason, outcome.generations, outcome.best.fitness
    );

    let (w, h) = target.dimensions();
    io::save_canvas(&render(&outcome.best.genotype, w, h), &cli.output)?;
    Ok(())
}
