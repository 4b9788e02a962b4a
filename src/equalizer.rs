//! Rank equalization of potential samples for heat-map colouring.
//!
//! Each sample is replaced by its cumulative rank: the 1-based position of the
//! last sample in the sorted run of values equal to it. Ranks are then mapped
//! onto `[0, 1]` with `(r - r_min) / (M - r_min)`, so the smallest value lands
//! on `0` and the largest on `1`. Equal inputs always share an output and the
//! transform never reorders values.

use std::cmp::Ordering;

/// Rank-equalize `samples` into `[0, 1]`, preserving their order.
///
/// When every sample is equal there is no spread to distribute and all
/// outputs are `0`.
pub fn equalize(samples: &[f64]) -> Vec<f64> {
    let count = samples.len();
    if count == 0 {
        return Vec::new();
    }

    let mut order: Vec<usize> = (0..count).collect();
    order.sort_by(|&a, &b| samples[a].total_cmp(&samples[b]));

    let mut ranks = vec![0usize; count];
    let mut run_start = 0;
    while run_start < count {
        let value = samples[order[run_start]];
        let mut run_end = run_start + 1;
        while run_end < count && tied(samples[order[run_end]], value) {
            run_end += 1;
        }
        for &index in &order[run_start..run_end] {
            ranks[index] = run_end;
        }
        run_start = run_end;
    }

    let minimum_rank = ranks[order[0]];
    if minimum_rank == count {
        return vec![0.0; count];
    }
    let spread = (count - minimum_rank) as f64;
    ranks
        .into_iter()
        .map(|rank| (rank - minimum_rank) as f64 / spread)
        .collect()
}

/// Runs group equal values; NaN compares equal to itself here so it forms a
/// single run at the top of the order.
fn tied(a: f64, b: f64) -> bool {
    a == b || a.total_cmp(&b) == Ordering::Equal
}
