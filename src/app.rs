use anyhow::Result;
use clap::Parser;
use std::time::{Duration, Instant};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::{Args, BoardConfig};
use crate::output::save_png;
use crate::render::Renderer;
use crate::sim::Simulator;

pub fn run() -> Result<()> {
    init_tracing();
    let config = BoardConfig::try_from(Args::parse())?;
    let elapsed = simulate_and_save(&config)?;
    println!(
        "Galton board simulation completed in {:?}. Image saved to {}",
        elapsed,
        config.output.display()
    );
    Ok(())
}

/// Runs the board described by `config` and writes the chart. Returns the time spent simulating.
pub fn simulate_and_save(config: &BoardConfig) -> Result<Duration> {
    let simulator = Simulator::new(config)?;

    let start = Instant::now();
    let histogram = simulator.run();
    let elapsed = start.elapsed();
    info!(?elapsed, peak = histogram.max_count(), "simulation finished");

    let img = Renderer::from_config(config).render(&histogram);
    save_png(&img, &config.output)?;
    info!(path = %config.output.display(), "image written");
    Ok(elapsed)
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
