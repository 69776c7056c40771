//! Parallel ball drops.
//!
//! Trials are split into one contiguous share per worker. Each worker owns its
//! generator, walks its balls down the board, and publishes the landing bins in
//! batches over a channel. The calling thread is the only writer of the
//! histogram.

use anyhow::Result;
use crossbeam_channel::bounded;
use rand::rngs::{OsRng, SmallRng};
use rand::{Rng, SeedableRng};
use std::thread;
use tracing::{debug, info};

use crate::config::BoardConfig;
use crate::histogram::Histogram;
use crate::seed::{fixed_seeds, worker_seeds};

const BATCH_SIZE: usize = 4096;

/// One ball: start at the middle bin, bounce left or right on each row, clamp to the board.
pub fn drop_ball<R: Rng>(rng: &mut R, width: usize, height: u32) -> usize {
    let mut position = (width / 2) as i64;
    for _ in 0..height {
        if rng.gen::<bool>() {
            position += 1;
        } else {
            position -= 1;
        }
    }
    position.clamp(0, width as i64 - 1) as usize
}

/// Number of balls each worker drops. The first `num_balls % num_workers` workers take one extra.
pub fn partition(num_balls: u64, num_workers: usize) -> Vec<u64> {
    let workers = num_workers as u64;
    let base = num_balls / workers;
    let extra = num_balls % workers;
    (0..workers)
        .map(|w| if w < extra { base + 1 } else { base })
        .collect()
}

pub struct Simulator {
    width: usize,
    height: u32,
    num_balls: u64,
    num_workers: usize,
    seed: Option<u64>,
}

impl Simulator {
    pub fn new(config: &BoardConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            width: config.width as usize,
            height: config.height,
            num_balls: config.num_balls,
            num_workers: config.num_workers,
            seed: config.seed,
        })
    }

    /// Seeds one `SmallRng` per worker (fixed seed if configured, OS entropy otherwise) and runs.
    pub fn run(&self) -> Histogram {
        let seeds = match self.seed {
            Some(seed) => fixed_seeds(seed, self.num_workers),
            None => worker_seeds(&mut OsRng, self.num_workers),
        };
        let rngs = seeds.into_iter().map(SmallRng::seed_from_u64).collect();
        self.run_with_rngs(rngs)
    }

    /// Runs with caller-supplied generators, one per worker. The worker count is `rngs.len()`.
    ///
    /// # Panics
    /// If `rngs` is empty while there are balls to drop.
    pub fn run_with_rngs<R: Rng + Send>(&self, rngs: Vec<R>) -> Histogram {
        let mut histogram = Histogram::new(self.width);
        if self.num_balls == 0 {
            return histogram;
        }
        assert!(!rngs.is_empty(), "at least one generator is required");

        let shares = partition(self.num_balls, rngs.len());
        let (width, height) = (self.width, self.height);
        let (tx, rx) = bounded::<Vec<usize>>(2 * rngs.len());

        info!(
            balls = self.num_balls,
            workers = rngs.len(),
            width,
            height,
            "dropping balls"
        );

        thread::scope(|scope| {
            for (worker, (mut rng, share)) in rngs.into_iter().zip(shares).enumerate() {
                let tx = tx.clone();
                scope.spawn(move || {
                    debug!(worker, share, "worker started");
                    let mut remaining = share;
                    while remaining > 0 {
                        let n = remaining.min(BATCH_SIZE as u64) as usize;
                        let batch: Vec<usize> =
                            (0..n).map(|_| drop_ball(&mut rng, width, height)).collect();
                        remaining -= n as u64;
                        if tx.send(batch).is_err() {
                            break;
                        }
                    }
                    debug!(worker, "worker finished");
                });
            }
            // The collector loop ends once every worker has dropped its sender.
            drop(tx);

            for batch in rx {
                for bin in batch {
                    histogram.record(bin);
                }
            }
        });

        histogram
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::RngCore;

    /// Plays back a fixed list of bounces; `true` is right.
    struct Scripted {
        bounces: Vec<bool>,
        next: usize,
    }

    impl Scripted {
        fn new(bounces: &[bool]) -> Self {
            Self {
                bounces: bounces.to_vec(),
                next: 0,
            }
        }

        fn bounce(&mut self) -> bool {
            let b = self.bounces[self.next % self.bounces.len()];
            self.next += 1;
            b
        }
    }

    impl RngCore for Scripted {
        // All-zero or all-one words, so any bit a `bool` draw looks at agrees.
        fn next_u32(&mut self) -> u32 {
            if self.bounce() {
                u32::MAX
            } else {
                0
            }
        }

        fn next_u64(&mut self) -> u64 {
            if self.bounce() {
                u64::MAX
            } else {
                0
            }
        }

        fn fill_bytes(&mut self, dest: &mut [u8]) {
            let byte = if self.bounce() { 0xFF } else { 0 };
            dest.fill(byte);
        }

        fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
            self.fill_bytes(dest);
            Ok(())
        }
    }

    fn board(width: u32, height: u32, num_balls: u64, num_workers: usize) -> Simulator {
        Simulator::new(&BoardConfig {
            width,
            height,
            num_balls,
            num_workers,
            ..BoardConfig::default()
        })
        .unwrap()
    }

    fn seeded(seeds: &[u64]) -> Vec<SmallRng> {
        seeds.iter().copied().map(SmallRng::seed_from_u64).collect()
    }

    #[test]
    fn single_row_left_then_right() {
        let sim = board(10, 1, 2, 1);
        let h = sim.run_with_rngs(vec![Scripted::new(&[false, true])]);
        let mut expected = vec![0u64; 10];
        expected[4] = 1;
        expected[6] = 1;
        assert_eq!(h.bins(), expected.as_slice());
        assert_eq!(h.total(), 2);
    }

    #[test]
    fn balls_always_left_pile_up_in_bin_zero() {
        let sim = board(10, 1000, 5, 1);
        let h = sim.run_with_rngs(vec![Scripted::new(&[false])]);
        assert_eq!(h.bins()[0], 5);
        assert_eq!(h.total(), 5);
    }

    #[test]
    fn balls_always_right_pile_up_in_last_bin() {
        let sim = board(10, 1000, 5, 1);
        let h = sim.run_with_rngs(vec![Scripted::new(&[true])]);
        assert_eq!(h.bins()[9], 5);
    }

    #[test]
    fn drop_ball_stays_on_board_when_rows_exceed_width() {
        let mut rng = SmallRng::seed_from_u64(3);
        for _ in 0..2000 {
            let bin = drop_ball(&mut rng, 10, 1000);
            assert!(bin < 10);
        }
    }

    #[test]
    fn single_bin_board() {
        let mut rng = SmallRng::seed_from_u64(9);
        assert_eq!(drop_ball(&mut rng, 1, 7), 0);
    }

    #[test]
    fn total_matches_ball_count() {
        for (balls, workers) in [(0, 1), (1, 1), (7, 3), (10_000, 4), (5, 16)] {
            let sim = board(50, 30, balls, workers);
            let seeds: Vec<u64> = (0..workers as u64).collect();
            let h = sim.run_with_rngs(seeded(&seeds));
            assert_eq!(h.total(), balls, "balls={balls} workers={workers}");
            assert_eq!(h.len(), 50);
        }
    }

    #[test]
    fn zero_balls_gives_empty_histogram() {
        let h = board(20, 10, 0, 4).run();
        assert_eq!(h.total(), 0);
        assert!(h.bins().iter().all(|&c| c == 0));
    }

    #[test]
    fn fixed_generators_are_reproducible() {
        let sim = board(100, 60, 20_000, 4);
        let a = sim.run_with_rngs(seeded(&[1, 2, 3, 4]));
        let b = sim.run_with_rngs(seeded(&[1, 2, 3, 4]));
        assert_eq!(a, b);
    }

    #[test]
    fn configured_seed_is_reproducible() {
        let sim = Simulator::new(&BoardConfig {
            width: 64,
            height: 32,
            num_balls: 5_000,
            num_workers: 3,
            seed: Some(99),
            ..BoardConfig::default()
        })
        .unwrap();
        assert_eq!(sim.run(), sim.run());
    }

    #[test]
    fn distribution_peaks_near_center() {
        let sim = board(800, 400, 10_000, 1);
        let h = sim.run_with_rngs(seeded(&[2024]));
        assert_eq!(h.total(), 10_000);

        // Even number of rows from an even start: only even bins are reachable.
        assert!(h.bins().iter().skip(1).step_by(2).all(|&c| c == 0));

        let peak = h
            .bins()
            .iter()
            .enumerate()
            .max_by_key(|&(_, &c)| c)
            .map(|(i, _)| i)
            .unwrap();
        assert!((380..=420).contains(&peak), "peak at {peak}");

        // std dev of the walk is sqrt(400) = 20 bins
        let left: u64 = h.bins()[..400].iter().sum();
        let right: u64 = h.bins()[401..].iter().sum();
        let diff = left.abs_diff(right);
        assert!(diff < 600, "left={left} right={right}");
        let within_3_sigma: u64 = h.bins()[340..=460].iter().sum();
        assert!(within_3_sigma > 9_900);
    }

    #[test]
    fn partition_spreads_remainder_over_first_workers() {
        assert_eq!(partition(10, 3), vec![4, 3, 3]);
        assert_eq!(partition(2, 5), vec![1, 1, 0, 0, 0]);
        assert_eq!(partition(0, 2), vec![0, 0]);
        assert_eq!(partition(12, 4).iter().sum::<u64>(), 12);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = BoardConfig {
            num_workers: 0,
            ..BoardConfig::default()
        };
        assert!(Simulator::new(&config).is_err());
    }
}
