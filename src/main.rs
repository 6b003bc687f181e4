mod app;
mod audio;
mod backdrop;
mod captions;
mod config;
mod error;
mod fx;
mod heart;
mod input;
mod page;
mod petals;
mod render;
mod rng;
mod tween;

use anyhow::{Context, Result};
use clap::Parser;
use config::Args;
use std::fs::File;

fn main() -> Result<()> {
    let args = Args::parse();

    let mut logger =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if let Some(path) = &args.log_file {
        let file = File::create(path)
            .with_context(|| format!("failed to open log file {}", path.display()))?;
        logger.target(env_logger::Target::Pipe(Box::new(file)));
    }
    logger.init();

    let settings = config::resolve(&args);
    log::debug!("settings: {settings:?}");
    app::run(settings)
}
