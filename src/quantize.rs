//! K-means color quantization in raw sRGB channel space.
//!
//! Centroids are seeded with k-means++ from a ChaCha8 generator, so a given
//! sample set, `k` and seed always produce the same palette. Lloyd iterations
//! then run until no sample changes cluster or the iteration cap is reached.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::debug;

use crate::{Color, Palette, PaletteError, Result};

pub const DEFAULT_MAX_ITERATIONS: usize = 300;
pub const DEFAULT_SEED: u64 = 0;

type Point = [f64; 3];

/// Tuning knobs for a single k-means run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KmeansOptions {
    /// Upper bound on assignment passes.
    pub max_iterations: usize,
    /// Seed for the k-means++ initializer.
    pub seed: u64,
}

impl Default for KmeansOptions {
    fn default() -> Self {
        Self {
            max_iterations: DEFAULT_MAX_ITERATIONS,
            seed: DEFAULT_SEED,
        }
    }
}

/// Cluster `samples` into exactly `k` representative colors.
///
/// The palette is returned in centroid-index order. Fails with
/// [`PaletteError::InvalidK`] when `k` is zero or exceeds the number of
/// samples; the count is never silently capped.
pub fn quantize(samples: &[Color], k: usize, options: &KmeansOptions) -> Result<Palette> {
    if k == 0 || k > samples.len() {
        return Err(PaletteError::InvalidK {
            k,
            min: 1,
            max: samples.len(),
        });
    }

    let points: Vec<Point> = samples.iter().map(to_point).collect();
    let mut rng = ChaCha8Rng::seed_from_u64(options.seed);
    let initial = init_plus_plus(&points, k, &mut rng);
    let (centroids, iterations, converged) = lloyd(&points, initial, options.max_iterations);

    debug!(k, samples = points.len(), iterations, converged, "k-means finished");

    Ok(Palette::new(centroids.iter().map(to_color).collect()))
}

fn to_point(c: &Color) -> Point {
    [c.red as f64, c.green as f64, c.blue as f64]
}

fn to_color(p: &Point) -> Color {
    let channel = |v: f64| v.round().clamp(0.0, 255.0) as u8;
    Color::new(channel(p[0]), channel(p[1]), channel(p[2]))
}

#[inline]
fn distance_squared(a: &Point, b: &Point) -> f64 {
    let dr = a[0] - b[0];
    let dg = a[1] - b[1];
    let db = a[2] - b[2];
    dr * dr + dg * dg + db * db
}

/// Index of the closest centroid; ties go to the lowest index.
#[inline]
fn nearest(point: &Point, centroids: &[Point]) -> usize {
    let mut best_idx = 0;
    let mut best_dist = f64::INFINITY;
    for (idx, c) in centroids.iter().enumerate() {
        let dist = distance_squared(point, c);
        if dist < best_dist {
            best_dist = dist;
            best_idx = idx;
        }
    }
    best_idx
}

/// k-means++ seeding: each new centroid is drawn with probability
/// proportional to its squared distance from the closest chosen one.
fn init_plus_plus(points: &[Point], k: usize, rng: &mut ChaCha8Rng) -> Vec<Point> {
    let first = points[draw_index(rng, points.len())];
    let mut centroids = Vec::with_capacity(k);
    centroids.push(first);

    let mut weights: Vec<f64> = points.iter().map(|p| distance_squared(p, &first)).collect();

    while centroids.len() < k {
        let total: f64 = weights.iter().sum();
        let idx = if total > 0.0 {
            pick_weighted(&weights, rng.gen_range(0.0..total))
        } else {
            // Every remaining sample duplicates a centroid.
            draw_index(rng, points.len())
        };

        let chosen = points[idx];
        centroids.push(chosen);
        for (w, p) in weights.iter_mut().zip(points) {
            *w = w.min(distance_squared(p, &chosen));
        }
    }

    centroids
}

/// Uniform index in `0..len`, drawn as `u64` so the stream is the same on
/// 32-bit and 64-bit targets.
fn draw_index(rng: &mut ChaCha8Rng, len: usize) -> usize {
    rng.gen_range(0..len as u64) as usize
}

fn pick_weighted(weights: &[f64], target: f64) -> usize {
    let mut cumulative = 0.0;
    for (idx, w) in weights.iter().enumerate() {
        cumulative += w;
        if target < cumulative {
            return idx;
        }
    }
    weights.iter().rposition(|w| *w > 0.0).unwrap_or(0)
}

/// Plain Lloyd iteration from the given starting centroids.
///
/// Returns the final centroids, the number of assignment passes, and whether
/// the run converged before hitting `max_iterations`.
pub(crate) fn lloyd(
    points: &[Point],
    mut centroids: Vec<Point>,
    max_iterations: usize,
) -> (Vec<Point>, usize, bool) {
    let k = centroids.len();
    let mut assignments = vec![usize::MAX; points.len()];
    let mut iterations = 0;

    while iterations < max_iterations {
        iterations += 1;

        let mut changed = 0usize;
        for (slot, p) in assignments.iter_mut().zip(points) {
            let idx = nearest(p, &centroids);
            if *slot != idx {
                *slot = idx;
                changed += 1;
            }
        }
        if changed == 0 {
            return (centroids, iterations, true);
        }

        // Sums are accumulated in sample order so results never depend on
        // anything but the input.
        let mut sums = vec![[0.0f64; 3]; k];
        let mut counts = vec![0usize; k];
        for (&idx, p) in assignments.iter().zip(points) {
            sums[idx][0] += p[0];
            sums[idx][1] += p[1];
            sums[idx][2] += p[2];
            counts[idx] += 1;
        }

        let mut live = Vec::with_capacity(k);
        for (idx, (sum, &n)) in sums.iter().zip(&counts).enumerate() {
            if n > 0 {
                let n = n as f64;
                centroids[idx] = [sum[0] / n, sum[1] / n, sum[2] / n];
            }
            live.push(n > 0);
        }

        for idx in 0..k {
            if !live[idx] {
                centroids[idx] = farthest_point(points, &centroids, &live);
                live[idx] = true;
                debug!(cluster = idx, iteration = iterations, "reseeded empty cluster");
            }
        }
    }

    (centroids, iterations, false)
}

/// The sample farthest from its closest live centroid; ties go to the lowest
/// sample index.
fn farthest_point(points: &[Point], centroids: &[Point], live: &[bool]) -> Point {
    let mut best = points[0];
    let mut best_dist = f64::NEG_INFINITY;
    for p in points {
        let dist = centroids
            .iter()
            .zip(live)
            .filter(|(_, alive)| **alive)
            .map(|(c, _)| distance_squared(p, c))
            .fold(f64::INFINITY, f64::min);
        if dist > best_dist {
            best_dist = dist;
            best = *p;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn spread(n: usize) -> Vec<Color> {
        (0..n)
            .map(|i| Color::new((i % 256) as u8, ((i * 7) % 256) as u8, ((i * 13) % 256) as u8))
            .collect()
    }

    fn sorted(colors: &[Color]) -> Vec<(u8, u8, u8)> {
        let mut v: Vec<_> = colors.iter().map(|c| (c.red, c.green, c.blue)).collect();
        v.sort();
        v
    }

    #[test]
    fn returns_exactly_k_colors() {
        let samples = spread(2_000);
        for k in [1, 2, 5, 16, 24] {
            let palette = quantize(&samples, k, &KmeansOptions::default()).unwrap();
            assert_eq!(palette.len(), k);
        }
    }

    #[test]
    fn same_seed_same_palette() {
        let samples = spread(5_000);
        let options = KmeansOptions { max_iterations: 300, seed: 42 };
        let a = quantize(&samples, 8, &options).unwrap();
        let b = quantize(&samples, 8, &options).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn seeded_palette_is_pinned() {
        let options = KmeansOptions { max_iterations: 300, seed: 42 };
        let palette = quantize(&spread(5_000), 8, &options).unwrap();
        assert_eq!(
            palette.hex_strings(),
            vec![
                "#507640", "#3adf84", "#4381be", "#8426c8", "#cc5c4c", "#d0b7c2", "#202b36",
                "#93df2b",
            ]
        );
    }

    #[test]
    fn index_draws_use_a_fixed_width_stream() {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let drawn: Vec<usize> = (0..3).map(|_| draw_index(&mut rng, 40_000)).collect();
        assert_eq!(drawn, vec![28363, 35164, 21981]);
    }

    #[test]
    fn uniform_samples_single_cluster() {
        let samples = vec![Color::new(12, 200, 99); 1_000];
        let palette = quantize(&samples, 1, &KmeansOptions::default()).unwrap();
        assert_eq!(palette.colors(), &[Color::new(12, 200, 99)]);
    }

    #[test]
    fn k_equal_to_sample_count_keeps_every_sample() {
        let samples = vec![
            Color::new(0, 0, 0),
            Color::new(255, 255, 255),
            Color::new(255, 0, 0),
            Color::new(0, 128, 0),
            Color::new(30, 60, 90),
        ];
        let palette = quantize(&samples, samples.len(), &KmeansOptions::default()).unwrap();
        assert_eq!(sorted(palette.colors()), sorted(&samples));
    }

    #[test]
    fn duplicate_samples_still_yield_k_entries() {
        let a = Color::new(10, 10, 10);
        let b = Color::new(240, 240, 240);
        let samples = vec![a, a, b];
        let palette = quantize(&samples, 3, &KmeansOptions::default()).unwrap();
        assert_eq!(palette.len(), 3);
        assert!(palette.colors().contains(&a));
        assert!(palette.colors().contains(&b));
    }

    #[test]
    fn empty_cluster_is_reseeded_to_farthest_sample() {
        let points = vec![[0.0, 0.0, 0.0], [10.0, 0.0, 0.0], [200.0, 200.0, 200.0]];
        // Cluster 1 receives nothing on the first pass.
        let start = vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [2.0, 0.0, 0.0]];
        let (centroids, _, converged) = lloyd(&points, start, 300);
        assert!(converged);
        assert_eq!(
            centroids,
            vec![[10.0, 0.0, 0.0], [200.0, 200.0, 200.0], [0.0, 0.0, 0.0]]
        );
    }

    #[test]
    fn ties_go_to_lowest_centroid() {
        let centroids = [[0.0, 0.0, 0.0], [10.0, 0.0, 0.0]];
        assert_eq!(nearest(&[5.0, 0.0, 0.0], &centroids), 0);
    }

    #[test]
    fn separated_groups_recover_exact_colors() {
        let mut samples = vec![Color::new(250, 5, 5); 300];
        samples.extend(vec![Color::new(5, 5, 250); 100]);
        let palette = quantize(&samples, 2, &KmeansOptions::default()).unwrap();
        assert_eq!(
            sorted(palette.colors()),
            vec![(5, 5, 250), (250, 5, 5)]
        );
    }

    #[test]
    fn iteration_cap_still_returns_k_colors() {
        let samples = spread(1_000);
        let options = KmeansOptions { max_iterations: 1, seed: 7 };
        assert_eq!(quantize(&samples, 6, &options).unwrap().len(), 6);
    }

    #[test]
    fn rejects_zero_k() {
        let err = quantize(&spread(10), 0, &KmeansOptions::default()).unwrap_err();
        assert!(matches!(err, PaletteError::InvalidK { k: 0, .. }));
    }

    #[test]
    fn rejects_k_above_sample_count() {
        let err = quantize(&spread(3), 4, &KmeansOptions::default()).unwrap_err();
        assert!(matches!(err, PaletteError::InvalidK { k: 4, min: 1, max: 3 }));
    }
}
