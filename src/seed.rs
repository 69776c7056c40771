//! Per-worker seeds.
//!
//! Seeds come from the OS entropy source. If that source fails the worker still
//! gets a seed: the wall clock in nanoseconds, read once per seeding pass, plus
//! the worker index, so no two workers in the pass share one.

use rand::RngCore;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tracing::warn;

pub fn worker_seeds<E: RngCore>(entropy: &mut E, num_workers: usize) -> Vec<u64> {
    let mut base_time = None;
    (0..num_workers)
        .map(|worker| {
            let mut buf = [0u8; 8];
            match entropy.try_fill_bytes(&mut buf) {
                Ok(()) => u64::from_le_bytes(buf),
                Err(err) => {
                    warn!(
                        worker,
                        error = %err,
                        "could not read an entropy seed, falling back to a time-based seed"
                    );
                    let base = *base_time.get_or_insert_with(time_seed);
                    base.wrapping_add(worker as u64)
                }
            }
        })
        .collect()
}

/// Seeds for a reproducible run: worker `i` gets `seed + i`.
pub fn fixed_seeds(seed: u64, num_workers: usize) -> Vec<u64> {
    (0..num_workers)
        .map(|worker| seed.wrapping_add(worker as u64))
        .collect()
}

fn time_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or(Duration::from_secs(0))
        .as_nanos() as u64
}
