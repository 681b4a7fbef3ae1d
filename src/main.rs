use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use still_life::config::Config;

#[derive(Parser)]
#[command(name = "still-life", about = "A candlestick and a plate in a textured room")]
struct Cli {
    /// JSON configuration file; built-in defaults when absent
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Base directory of the models and textures
    #[arg(long, default_value = ".")]
    assets: PathBuf,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    still_life::flow::run(config.with_asset_root(&cli.assets))
}
