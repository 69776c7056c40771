use anyhow::{ensure, Result};
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(about = "Drop balls through a Galton board and plot where they land")]
pub struct Args {
    /// number of bins (image width in pixels)
    #[arg(long, default_value_t = 800)]
    pub width: u32,

    /// rows of pegs each ball falls through (image height in pixels)
    #[arg(long, default_value_t = 400)]
    pub height: u32,

    /// number of balls to drop
    #[arg(long, default_value_t = 100_000)]
    pub balls: u64,

    /// worker threads
    #[arg(long, default_value_t = 16)]
    pub workers: usize,

    /// where to write the PNG
    #[arg(long, default_value = "galton_board.png")]
    pub output: PathBuf,

    /// fixed seed for a reproducible run (default: OS entropy)
    #[arg(long)]
    pub seed: Option<u64>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BoardConfig {
    pub width: u32,
    pub height: u32,
    pub num_balls: u64,
    pub num_workers: usize,
    pub output: PathBuf,
    pub seed: Option<u64>,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 400,
            num_balls: 100_000,
            num_workers: 16,
            output: PathBuf::from("galton_board.png"),
            seed: None,
        }
    }
}

impl BoardConfig {
    pub fn validate(&self) -> Result<()> {
        ensure!(self.width > 0, "--width must be at least 1");
        ensure!(self.height > 0, "--height must be at least 1");
        ensure!(self.num_workers > 0, "--workers must be at least 1");
        Ok(())
    }
}

impl TryFrom<Args> for BoardConfig {
    type Error = anyhow::Error;

    fn try_from(args: Args) -> Result<Self> {
        let config = Self {
            width: args.width,
            height: args.height,
            num_balls: args.balls,
            num_workers: args.workers,
            output: args.output,
            seed: args.seed,
        };
        config.validate()?;
        Ok(config)
    }
}
